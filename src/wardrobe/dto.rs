use serde::Deserialize;

use super::repo_types::{ItemMetadata, ItemPatch};

#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    #[serde(default, alias = "item_metadata")]
    pub metadata: ItemMetadata,
}

/// Body of `PUT /wardrobe/{id}`; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateItemRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "item_metadata")]
    pub metadata: Option<ItemMetadata>,
}

impl From<UpdateItemRequest> for ItemPatch {
    fn from(r: UpdateItemRequest) -> Self {
        Self {
            name: r.name,
            metadata: r.metadata,
        }
    }
}
