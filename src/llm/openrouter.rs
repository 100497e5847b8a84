//! OpenRouter-backed completion gateway.

use async_trait::async_trait;
use serde::Deserialize;

use super::{ChatMessage, CompletionGateway, GatewayError};

const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";

/// Chat-completions client for OpenRouter.
pub struct OpenRouterGateway {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenRouterGateway {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl CompletionGateway for OpenRouterGateway {
    async fn complete(&self, history: &[ChatMessage]) -> Result<String, GatewayError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": history,
        });

        tracing::debug!("Requesting completion for {} messages", history.len());

        let response = self
            .client
            .post(OPENROUTER_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Unavailable(e.to_string()))?;

        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(GatewayError::EmptyResponse)
    }
}
