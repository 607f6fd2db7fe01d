use std::sync::Arc;

use axum::extract::FromRef;
use tracing::{error, info};

use super::{
    embedding::Embedder,
    index::build_index,
    llm::{ChatMessage, ChatModel, ChatRequest},
};
use crate::{
    error::{AppError, AppResult},
    state::AppState,
    wardrobe::{repo::InventoryStore, repo_types::WardrobeItem},
};

pub const EMPTY_WARDROBE_MESSAGE: &str =
    "Your wardrobe is empty! Please add some items before getting styled.";

pub const SYSTEM_PROMPT: &str = "You are an expert fashion stylist. Your task is to create a \
complete, stylish outfit that is practical and comfortable for the user's specific request \
and weather.";

/// Sampling temperature for every suggestion.
pub const TEMPERATURE: f32 = 0.5;

const UNAVAILABLE: &str = "The AI styling service is currently unavailable.";

pub fn retrieval_query(user_query: &str, weather_context: &str) -> String {
    format!("{user_query} suitable for {weather_context}")
}

pub fn render_user_prompt(user_query: &str, weather_context: &str, retrieved: &[String]) -> String {
    let items = retrieved
        .iter()
        .map(|d| format!("- {d}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "User Request: '{user_query}'\n\
         Current Weather Context: '{weather_context}'\n\
         \n\
         Here are the most relevant items from my wardrobe:\n\
         {items}\n\
         \n\
         Please suggest one complete outfit using only the available items. Your reasoning \
         MUST be based on both style and the functional properties of the items as they relate \
         to the weather. After the outfit, add a section called 'Suggested Additions'. In this \
         section, identify if any critical pieces (like shoes) are missing or if any enhancement \
         pieces (like an accessory) would elevate the look. If nothing is needed, state 'None'.\n"
    )
}

/// Retrieval + generation over one user's wardrobe.
#[derive(Clone)]
pub struct Stylist {
    embedder: Arc<dyn Embedder>,
    chat: Arc<dyn ChatModel>,
    model: String,
    top_n: usize,
}

impl FromRef<AppState> for Stylist {
    fn from_ref(state: &AppState) -> Self {
        Self::new(
            state.embedder.clone(),
            state.chat.clone(),
            state.config.stylist.chat_model.clone(),
            state.config.stylist.top_n,
        )
    }
}

impl Stylist {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        chat: Arc<dyn ChatModel>,
        model: String,
        top_n: usize,
    ) -> Self {
        // zero would send the model an empty item list
        Self { embedder, chat, model, top_n: top_n.max(1) }
    }

    /// Index `items`, pull the most relevant ones for the request and ask the
    /// model for an outfit. `items` must be non-empty.
    pub async fn recommend(
        &self,
        user_id: i64,
        items: &[WardrobeItem],
        user_query: &str,
        weather_context: &str,
    ) -> AppResult<String> {
        let index = build_index(self.embedder.as_ref(), user_id, items)
            .await
            .map_err(|e| unavailable("index build", e))?;

        let query = retrieval_query(user_query, weather_context);
        let retrieved = index
            .query(self.embedder.as_ref(), &query, self.top_n)
            .await
            .map_err(|e| unavailable("retrieval", e))?;
        info!(user_id, indexed = index.len(), retrieved = retrieved.len(), "wardrobe retrieved");

        self.suggest(user_query, weather_context, &retrieved).await
    }

    /// Single generation attempt; any failure is `ServiceUnavailable`.
    pub async fn suggest(
        &self,
        user_query: &str,
        weather_context: &str,
        retrieved: &[String],
    ) -> AppResult<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(render_user_prompt(user_query, weather_context, retrieved)),
            ],
            temperature: TEMPERATURE,
        };
        self.chat
            .complete(&request)
            .await
            .map_err(|e| unavailable("generation", e))
    }
}

fn unavailable(stage: &str, e: anyhow::Error) -> AppError {
    error!(stage, error = %e, "styling pipeline failed");
    AppError::ServiceUnavailable(UNAVAILABLE.into())
}

/// Load the caller's wardrobe and style it. An empty wardrobe short-circuits
/// with [`EMPTY_WARDROBE_MESSAGE`] before any retrieval or generation.
pub async fn style_me(
    store: &dyn InventoryStore,
    stylist: &Stylist,
    user_id: i64,
    occasion: &str,
    weather_context: &str,
) -> AppResult<String> {
    let items = store.list_items(user_id).await?;
    if items.is_empty() {
        info!(user_id, "style request on empty wardrobe");
        return Ok(EMPTY_WARDROBE_MESSAGE.to_string());
    }
    stylist.recommend(user_id, &items, occasion, weather_context).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::stylist::embedding::LocalEmbedder;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records requests and replies with the user message.
    #[derive(Default)]
    struct EchoChat {
        seen: Mutex<Vec<ChatRequest>>,
    }

    #[async_trait]
    impl ChatModel for EchoChat {
        async fn complete(&self, request: &ChatRequest) -> anyhow::Result<String> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(request.messages[1].content.clone())
        }
    }

    struct FailingChat;

    #[async_trait]
    impl ChatModel for FailingChat {
        async fn complete(&self, _request: &ChatRequest) -> anyhow::Result<String> {
            anyhow::bail!("quota exceeded")
        }
    }

    #[derive(Default)]
    struct CountingEmbedder {
        calls: AtomicUsize,
        inner: LocalEmbedder,
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        fn model_name(&self) -> &str {
            "counting"
        }
        async fn embed(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.embed(texts).await
        }
    }

    fn meta(v: serde_json::Value) -> crate::wardrobe::repo_types::ItemMetadata {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn retrieval_query_combines_request_and_weather() {
        assert_eq!(
            retrieval_query("hiking", "cold and rainy"),
            "hiking suitable for cold and rainy"
        );
    }

    #[test]
    fn user_prompt_lists_items_and_asks_for_additions() {
        let p = render_user_prompt(
            "hiking",
            "cold and rainy",
            &["Item Name: Blue Jacket.".into(), "Item Name: Boots.".into()],
        );
        assert!(p.starts_with("User Request: 'hiking'\nCurrent Weather Context: 'cold and rainy'\n"));
        assert!(p.contains("- Item Name: Blue Jacket.\n- Item Name: Boots."));
        assert!(p.contains("'Suggested Additions'"));
        assert!(p.contains("state 'None'"));
    }

    #[tokio::test]
    async fn suggest_sends_fixed_prompt_and_temperature() {
        let chat = Arc::new(EchoChat::default());
        let stylist = Stylist::new(
            Arc::new(LocalEmbedder::default()),
            chat.clone(),
            "gpt-4-turbo".into(),
            7,
        );
        stylist
            .suggest("party", "warm evening", &["Item Name: Silk Shirt.".into()])
            .await
            .unwrap();

        let seen = chat.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "gpt-4-turbo");
        assert_eq!(seen[0].temperature, 0.5);
        assert_eq!(seen[0].messages[0], ChatMessage::system(SYSTEM_PROMPT));
        assert!(seen[0].messages[1].content.contains("- Item Name: Silk Shirt."));
    }

    #[tokio::test]
    async fn generation_failure_is_service_unavailable() {
        let stylist = Stylist::new(
            Arc::new(LocalEmbedder::default()),
            Arc::new(FailingChat),
            "m".into(),
            7,
        );
        let err = stylist.suggest("x", "y", &[]).await.unwrap_err();
        assert!(matches!(err, AppError::ServiceUnavailable(_)));
    }

    #[tokio::test]
    async fn empty_wardrobe_never_touches_pipeline() {
        let store = MemoryStore::new();
        let embedder = Arc::new(CountingEmbedder::default());
        let chat = Arc::new(EchoChat::default());
        let stylist = Stylist::new(embedder.clone(), chat.clone(), "m".into(), 7);

        let out = style_me(&store, &stylist, 1, "hiking", "cold").await.unwrap();
        assert_eq!(out, EMPTY_WARDROBE_MESSAGE);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
        assert!(chat.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn style_me_only_uses_callers_items() {
        let store = MemoryStore::new();
        store
            .add_item(1, "Blue Jacket", &meta(json!({"style": "casual", "category": "outerwear"})))
            .await
            .unwrap();
        store
            .add_item(2, "Someone Else's Parka", &meta(json!({"category": "outerwear"})))
            .await
            .unwrap();

        let chat = Arc::new(EchoChat::default());
        let stylist = Stylist::new(Arc::new(LocalEmbedder::default()), chat.clone(), "m".into(), 7);
        let out = style_me(&store, &stylist, 1, "hiking", "cold and rainy").await.unwrap();

        assert!(out.contains("Blue Jacket"));
        assert!(!out.contains("Parka"));
    }

    #[tokio::test]
    async fn zero_depth_still_retrieves_one_item() {
        let store = MemoryStore::new();
        store.add_item(1, "Tee", &meta(json!({}))).await.unwrap();
        let chat = Arc::new(EchoChat::default());
        let stylist = Stylist::new(Arc::new(LocalEmbedder::default()), chat.clone(), "m".into(), 0);
        let out = style_me(&store, &stylist, 1, "errands", "mild").await.unwrap();
        assert_eq!(out.matches("- Item Name:").count(), 1);
    }

    #[tokio::test]
    async fn retrieval_depth_is_bounded_by_top_n() {
        let store = MemoryStore::new();
        for name in ["Tee", "Jeans", "Sneakers", "Cap"] {
            store.add_item(1, name, &meta(json!({}))).await.unwrap();
        }
        let chat = Arc::new(EchoChat::default());
        let stylist = Stylist::new(Arc::new(LocalEmbedder::default()), chat.clone(), "m".into(), 2);
        let out = style_me(&store, &stylist, 1, "errands", "mild").await.unwrap();
        assert_eq!(out.matches("- Item Name:").count(), 2);
    }
}
