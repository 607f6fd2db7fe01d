use std::sync::Arc;

use crate::auth::repo::CredentialStore;
use crate::config::AppConfig;
use crate::db::PgStore;
use crate::memory::MemoryStore;
use crate::stylist::{
    embedding::{create_embedder, Embedder},
    llm::{ChatModel, OpenAiChat},
};
use crate::wardrobe::repo::InventoryStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn CredentialStore>,
    pub wardrobe: Arc<dyn InventoryStore>,
    pub embedder: Arc<dyn Embedder>,
    pub chat: Arc<dyn ChatModel>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let (users, wardrobe): (Arc<dyn CredentialStore>, Arc<dyn InventoryStore>) =
            if config.database_url == "memory" {
                tracing::warn!("DATABASE_URL=memory; data is kept in-process only");
                let store = Arc::new(MemoryStore::new());
                (
                    store.clone() as Arc<dyn CredentialStore>,
                    store as Arc<dyn InventoryStore>,
                )
            } else {
                let store = Arc::new(PgStore::connect(&config.database_url).await?);
                store.migrate().await?;
                (
                    store.clone() as Arc<dyn CredentialStore>,
                    store as Arc<dyn InventoryStore>,
                )
            };

        let embedder: Arc<dyn Embedder> = Arc::from(create_embedder(&config.stylist));
        let chat = Arc::new(OpenAiChat::new(
            &config.stylist.api_base,
            &config.stylist.api_key,
        )) as Arc<dyn ChatModel>;

        tracing::info!(
            embedder = embedder.model_name(),
            chat_model = %config.stylist.chat_model,
            "stylist configured"
        );

        Ok(Self::from_parts(config, users, wardrobe, embedder, chat))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn CredentialStore>,
        wardrobe: Arc<dyn InventoryStore>,
        embedder: Arc<dyn Embedder>,
        chat: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            config,
            users,
            wardrobe,
            embedder,
            chat,
        }
    }
}
