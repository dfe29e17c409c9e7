use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::provider::{AssessError, Assessor, Role};
use crate::providers::chat_messages;

pub struct AnthropicAssessor {
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl AnthropicAssessor {
    pub fn new(api_key: String, model: String, temperature: f32, max_tokens: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            temperature,
            max_tokens,
        }
    }
}

#[async_trait]
impl Assessor for AnthropicAssessor {
    async fn assess(
        &self,
        instruction: &str,
        payload: &serde_json::Value,
    ) -> Result<String, AssessError> {
        let url = "https://api.anthropic.com/v1/messages";

        // The messages API takes the system text as a separate parameter.
        let messages = chat_messages(instruction, payload);
        let system_msg = messages
            .iter()
            .find(|m| matches!(m.role, Role::System))
            .map(|m| m.content.clone());

        let api_messages: Vec<serde_json::Value> = messages
            .iter()
            .filter(|m| !matches!(m.role, Role::System))
            .map(|m| {
                json!({
                    "role": match m.role {
                        Role::User => "user",
                        Role::Assistant => "assistant",
                        Role::System => unreachable!(),
                    },
                    "content": m.content,
                })
            })
            .collect();

        let mut body = json!({
            "model": self.model,
            "messages": api_messages,
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        if let Some(system) = system_msg {
            body["system"] = json!(system);
        }

        debug!("Anthropic request to {}", url);

        let response = self
            .client
            .post(url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
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
        let content = resp["content"][0]["text"]
            .as_str()
            .ok_or_else(|| AssessError::Parse("missing content[0].text".into()))?
            .to_string();

        Ok(content)
    }
}
