//! Completion gateway: the external language-model service.
//!
//! The orchestrator treats the service as an opaque function from ordered
//! history to one candidate text response. It assumes nothing about
//! retries or streaming behind the call; every gateway failure is fatal
//! for the run.

mod openrouter;

pub use openrouter::OpenRouterGateway;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message role on the completion wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message of gateway history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Failure reaching or using the completion service. The caller may retry
/// the whole run with fresh state; the loop itself never retries.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("completion request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("completion service unavailable: {0}")]
    Unavailable(String),

    #[error("completion service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("completion response carried no content")]
    EmptyResponse,
}

/// The external completion service: full ordered history in, one raw
/// candidate text out.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, history: &[ChatMessage]) -> Result<String, GatewayError>;
}
