use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::provider::{AssessError, Assessor, Role};
use crate::providers::chat_messages;

pub struct OllamaAssessor {
    client: reqwest::Client,
    url: String,
    model: String,
    temperature: f32,
}

impl OllamaAssessor {
    pub fn new(url: String, model: String, temperature: f32) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            model,
            temperature,
        }
    }
}

#[async_trait]
impl Assessor for OllamaAssessor {
    async fn assess(
        &self,
        instruction: &str,
        payload: &serde_json::Value,
    ) -> Result<String, AssessError> {
        let url = format!("{}/api/chat", self.url);

        let api_messages: Vec<serde_json::Value> = chat_messages(instruction, payload)
            .iter()
            .map(|m| {
                json!({
                    "role": match m.role {
                        Role::System => "system",
                        Role::User => "user",
                        Role::Assistant => "assistant",
                    },
                    "content": m.content,
                })
            })
            .collect();

        let body = json!({
            "model": self.model,
            "messages": api_messages,
            "stream": false,
            "options": {
                "temperature": self.temperature,
            },
        });

        debug!("Ollama request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(AssessError::Api { status, body });
        }

        let resp: serde_json::Value = response.json().await?;
        let content = resp["message"]["content"]
            .as_str()
            .ok_or_else(|| AssessError::Parse("missing message.content".into()))?
            .to_string();

        Ok(content)
    }
}
