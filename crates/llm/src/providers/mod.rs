pub mod anthropic;
pub mod ollama;
pub mod openai;

use serde_json::Value;

use sift_core::config::{LlmConfig, OllamaConfig};

use crate::provider::{AssessError, Assessor, Message, Role};

/// Build the chat messages every provider sends: the fixed instruction as
/// the system message and the pretty-printed payload as the user message.
fn chat_messages(instruction: &str, payload: &Value) -> Vec<Message> {
    vec![
        Message {
            role: Role::System,
            content: instruction.to_string(),
        },
        Message {
            role: Role::User,
            content: serde_json::to_string_pretty(payload).unwrap_or_default(),
        },
    ]
}

/// Create the appropriate assessor based on config.
pub fn create_assessor(
    llm_config: &LlmConfig,
    ollama_config: &OllamaConfig,
) -> Result<Box<dyn Assessor>, AssessError> {
    match llm_config.provider.as_str() {
        "openai" => {
            let api_key = llm_config
                .openai_api_key
                .as_ref()
                .ok_or_else(|| AssessError::NotConfigured("OPENAI_API_KEY not set".into()))?;
            let base_url = llm_config
                .openai_base_url
                .as_deref()
                .unwrap_or("https://api.openai.com");
            Ok(Box::new(openai::OpenAiAssessor::new(
                api_key.clone(),
                llm_config.openai_model.clone(),
                base_url.to_string(),
                llm_config.temperature,
                llm_config.max_tokens,
            )))
        }
        "anthropic" | "claude" => {
            let api_key = llm_config
                .anthropic_api_key
                .as_ref()
                .ok_or_else(|| AssessError::NotConfigured("ANTHROPIC_API_KEY not set".into()))?;
            Ok(Box::new(anthropic::AnthropicAssessor::new(
                api_key.clone(),
                llm_config.anthropic_model.clone(),
                llm_config.temperature,
                llm_config.max_tokens,
            )))
        }
        "ollama" => Ok(Box::new(ollama::OllamaAssessor::new(
            ollama_config.url.clone(),
            ollama_config.model.clone(),
            llm_config.temperature,
        ))),
        other => Err(AssessError::NotConfigured(format!(
            "unknown LLM provider: '{}'",
            other
        ))),
    }
}
