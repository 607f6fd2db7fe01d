use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".into(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".into(), content: content.into() }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

/// A hosted text-generation service.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<String>;
}

/// OpenAI-compatible `chat/completions` client. One attempt per call.
pub struct OpenAiChat {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl OpenAiChat {
    pub fn new(api_base: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: format!("{}/chat/completions", api_base.trim_end_matches('/')),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl ChatModel for OpenAiChat {
    async fn complete(&self, request: &ChatRequest) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .context("chat completion request")?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            bail!("chat API error {}: {}", status, body_text);
        }

        let parsed: CompletionResponse =
            response.json().await.context("decode chat completion")?;
        let text = first_content(parsed)?;
        debug!(model = %request.model, chars = text.len(), "chat completion received");
        Ok(text)
    }
}

fn first_content(parsed: CompletionResponse) -> Result<String> {
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("chat completion had no content"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_in_openai_shape() {
        let req = ChatRequest {
            model: "gpt-4-turbo".into(),
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hi")],
            temperature: 0.5,
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["model"], "gpt-4-turbo");
        assert_eq!(v["messages"][0]["role"], "system");
        assert_eq!(v["messages"][1]["content"], "hi");
        assert_eq!(v["temperature"], 0.5);
    }

    #[test]
    fn first_content_picks_first_choice() {
        let parsed: CompletionResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": "Wear the jacket."}}]
        }))
        .unwrap();
        assert_eq!(first_content(parsed).unwrap(), "Wear the jacket.");
    }

    #[test]
    fn missing_or_blank_content_is_an_error() {
        let none: CompletionResponse =
            serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(first_content(none).is_err());

        let blank: CompletionResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": "   "}}]
        }))
        .unwrap();
        assert!(first_content(blank).is_err());

        let null: CompletionResponse = serde_json::from_value(json!({
            "choices": [{"message": {"content": null}}]
        }))
        .unwrap();
        assert!(first_content(null).is_err());
    }

    #[test]
    fn endpoint_joins_base() {
        let c = OpenAiChat::new("http://localhost:9999/v1/", "k");
        assert_eq!(c.endpoint, "http://localhost:9999/v1/chat/completions");
    }
}
