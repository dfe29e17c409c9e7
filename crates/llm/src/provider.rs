use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A chat message for the reasoning backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// The reasoning collaborator: one operation, injected into each pipeline
/// stage. Takes a fixed instruction plus a structured payload and returns
/// the collaborator's raw text reply; normalization happens downstream.
/// Timeout and retry policy belong to the implementation, not the caller.
#[async_trait]
pub trait Assessor: Send + Sync {
    async fn assess(
        &self,
        instruction: &str,
        payload: &serde_json::Value,
    ) -> Result<String, AssessError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AssessError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error: {status}: {body}")]
    Api { status: u16, body: String },
    #[error("failed to parse response: {0}")]
    Parse(String),
    #[error("provider not configured: {0}")]
    NotConfigured(String),
}
