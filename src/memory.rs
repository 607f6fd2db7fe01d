//! In-process store implementing both [`CredentialStore`] and
//! [`InventoryStore`]. Used by tests and by `DATABASE_URL=memory` local runs.
//! Nothing survives a restart.

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::auth::{repo::CredentialStore, repo_types::User};
use crate::wardrobe::{
    repo::InventoryStore,
    repo_types::{ItemMetadata, ItemPatch, WardrobeItem},
};

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    items: Vec<WardrobeItem>,
    next_user_id: i64,
    next_item_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> anyhow::Result<Option<User>> {
        let mut inner = self.inner.write().await;
        if inner.users.iter().any(|u| u.username == username) {
            return Ok(None);
        }
        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        inner.users.push(user.clone());
        Ok(Some(user))
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn add_item(
        &self,
        owner_id: i64,
        name: &str,
        metadata: &ItemMetadata,
    ) -> anyhow::Result<WardrobeItem> {
        let mut inner = self.inner.write().await;
        inner.next_item_id += 1;
        let item = WardrobeItem {
            id: inner.next_item_id,
            name: name.to_string(),
            metadata: metadata.clone(),
            owner_id,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.items.push(item.clone());
        Ok(item)
    }

    async fn list_items(&self, owner_id: i64) -> anyhow::Result<Vec<WardrobeItem>> {
        let inner = self.inner.read().await;
        Ok(inner
            .items
            .iter()
            .filter(|i| i.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update_item(
        &self,
        owner_id: i64,
        item_id: i64,
        patch: ItemPatch,
    ) -> anyhow::Result<Option<WardrobeItem>> {
        let mut inner = self.inner.write().await;
        let Some(item) = inner
            .items
            .iter_mut()
            .find(|i| i.id == item_id && i.owner_id == owner_id)
        else {
            return Ok(None);
        };
        patch.apply(item);
        Ok(Some(item.clone()))
    }

    async fn delete_item(
        &self,
        owner_id: i64,
        item_id: i64,
    ) -> anyhow::Result<Option<WardrobeItem>> {
        let mut inner = self.inner.write().await;
        let pos = inner
            .items
            .iter()
            .position(|i| i.id == item_id && i.owner_id == owner_id);
        Ok(pos.map(|p| inner.items.remove(p)))
    }
}
