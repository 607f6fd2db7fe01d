use async_trait::async_trait;
use sqlx::types::Json;

use super::repo_types::{ItemMetadata, ItemPatch, WardrobeItem, WardrobeItemRow};
use crate::db::PgStore;

/// Owner-scoped persistence for wardrobe items. Every lookup filters on the
/// owner, so another user's item reads as missing.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn add_item(
        &self,
        owner_id: i64,
        name: &str,
        metadata: &ItemMetadata,
    ) -> anyhow::Result<WardrobeItem>;

    /// Items owned by `owner_id` in insertion order.
    async fn list_items(&self, owner_id: i64) -> anyhow::Result<Vec<WardrobeItem>>;

    async fn update_item(
        &self,
        owner_id: i64,
        item_id: i64,
        patch: ItemPatch,
    ) -> anyhow::Result<Option<WardrobeItem>>;

    async fn delete_item(&self, owner_id: i64, item_id: i64)
        -> anyhow::Result<Option<WardrobeItem>>;
}

#[async_trait]
impl InventoryStore for PgStore {
    async fn add_item(
        &self,
        owner_id: i64,
        name: &str,
        metadata: &ItemMetadata,
    ) -> anyhow::Result<WardrobeItem> {
        let row = sqlx::query_as::<_, WardrobeItemRow>(
            r#"
            INSERT INTO wardrobe_items (name, metadata, owner_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, metadata, owner_id, created_at
            "#,
        )
        .bind(name)
        .bind(Json(metadata))
        .bind(owner_id)
        .fetch_one(self.pool())
        .await?;
        Ok(row.into())
    }

    async fn list_items(&self, owner_id: i64) -> anyhow::Result<Vec<WardrobeItem>> {
        let rows = sqlx::query_as::<_, WardrobeItemRow>(
            r#"
            SELECT id, name, metadata, owner_id, created_at
            FROM wardrobe_items
            WHERE owner_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn update_item(
        &self,
        owner_id: i64,
        item_id: i64,
        patch: ItemPatch,
    ) -> anyhow::Result<Option<WardrobeItem>> {
        let row = sqlx::query_as::<_, WardrobeItemRow>(
            r#"
            UPDATE wardrobe_items
               SET name = COALESCE($3, name),
                   metadata = COALESCE($4, metadata)
             WHERE id = $1 AND owner_id = $2
            RETURNING id, name, metadata, owner_id, created_at
            "#,
        )
        .bind(item_id)
        .bind(owner_id)
        .bind(patch.name)
        .bind(patch.metadata.map(Json))
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Into::into))
    }

    async fn delete_item(
        &self,
        owner_id: i64,
        item_id: i64,
    ) -> anyhow::Result<Option<WardrobeItem>> {
        let row = sqlx::query_as::<_, WardrobeItemRow>(
            r#"
            DELETE FROM wardrobe_items
             WHERE id = $1 AND owner_id = $2
            RETURNING id, name, metadata, owner_id, created_at
            "#,
        )
        .bind(item_id)
        .bind(owner_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row.map(Into::into))
    }
}
