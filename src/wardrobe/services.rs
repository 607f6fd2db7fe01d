use tracing::{debug, info};

use super::{
    repo::InventoryStore,
    repo_types::{ItemMetadata, ItemPatch, WardrobeItem},
};
use crate::error::{AppError, AppResult};

fn not_found() -> AppError {
    AppError::NotFound("Item not found".into())
}

pub async fn add_item(
    store: &dyn InventoryStore,
    owner_id: i64,
    name: &str,
    metadata: &ItemMetadata,
) -> AppResult<WardrobeItem> {
    let item = store.add_item(owner_id, name, metadata).await?;
    info!(owner_id, item_id = item.id, "wardrobe item added");
    Ok(item)
}

pub async fn list_items(store: &dyn InventoryStore, owner_id: i64) -> AppResult<Vec<WardrobeItem>> {
    let items = store.list_items(owner_id).await?;
    debug!(owner_id, count = items.len(), "wardrobe listed");
    Ok(items)
}

/// Merge `patch` into the caller's item. Missing and foreign items are both `NotFound`.
pub async fn update_item(
    store: &dyn InventoryStore,
    owner_id: i64,
    item_id: i64,
    patch: ItemPatch,
) -> AppResult<WardrobeItem> {
    let item = store
        .update_item(owner_id, item_id, patch)
        .await?
        .ok_or_else(not_found)?;
    info!(owner_id, item_id, "wardrobe item updated");
    Ok(item)
}

pub async fn delete_item(
    store: &dyn InventoryStore,
    owner_id: i64,
    item_id: i64,
) -> AppResult<WardrobeItem> {
    let item = store
        .delete_item(owner_id, item_id)
        .await?
        .ok_or_else(not_found)?;
    info!(owner_id, item_id, "wardrobe item deleted");
    Ok(item)
}
