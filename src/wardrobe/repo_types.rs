use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;

/// Free-form item attributes, conventionally `style`, `category`, `material`
/// and a list-valued `properties`.
pub type ItemMetadata = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, FromRow)]
pub struct WardrobeItemRow {
    pub id: i64,
    pub name: String,
    pub metadata: Json<ItemMetadata>,
    pub owner_id: i64,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardrobeItem {
    pub id: i64,
    pub name: String,
    pub metadata: ItemMetadata,
    pub owner_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<WardrobeItemRow> for WardrobeItem {
    fn from(r: WardrobeItemRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            metadata: r.metadata.0,
            owner_id: r.owner_id,
            created_at: r.created_at,
        }
    }
}

/// Fields supplied by a partial update; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub metadata: Option<ItemMetadata>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.metadata.is_none()
    }

    pub fn apply(self, item: &mut WardrobeItem) {
        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(metadata) = self.metadata {
            item.metadata = metadata;
        }
    }
}
