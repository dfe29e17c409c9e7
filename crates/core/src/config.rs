use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_i64(key: &str, default: i64) -> i64 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub engine: EngineConfig,
    pub llm: LlmConfig,
    pub ollama: OllamaConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            engine: EngineConfig::from_env(),
            llm: LlmConfig::from_env(),
            ollama: OllamaConfig::from_env(),
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!(
            "  engine:  window_secs={}, max_known_issues={}",
            self.engine.window_secs,
            self.engine.max_known_issues
        );
        tracing::info!(
            "  llm:     provider={}, configured={}",
            self.llm.provider,
            self.llm.is_configured()
        );
        tracing::info!("  ollama:  url={}, model={}", self.ollama.url, self.ollama.model);
    }
}

// ── Engine knobs ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Time-window grouper span in seconds.
    pub window_secs: i64,
    /// Cap on known-issue context entries sent with the causal payload.
    pub max_known_issues: usize,
}

impl EngineConfig {
    fn from_env() -> Self {
        Self {
            window_secs: env_i64("SIFT_WINDOW_SECS", 60),
            max_known_issues: env_usize("SIFT_MAX_KNOWN_ISSUES", 10),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_secs: 60,
            max_known_issues: 10,
        }
    }
}

// ── LLM (OpenAI / Anthropic / Ollama) ─────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "openai", "anthropic", "ollama"
    pub provider: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub anthropic_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    fn from_env() -> Self {
        Self {
            provider: env_or("LLM_PROVIDER", "ollama"),
            openai_api_key: env_opt("OPENAI_API_KEY"),
            openai_model: env_or("OPENAI_MODEL", "gpt-4o"),
            openai_base_url: env_opt("OPENAI_BASE_URL"),
            anthropic_api_key: env_opt("ANTHROPIC_API_KEY"),
            anthropic_model: env_or("ANTHROPIC_MODEL", "claude-sonnet-4-5-20250929"),
            temperature: env_or("LLM_TEMPERATURE", "0.1").parse().unwrap_or(0.1),
            max_tokens: env_u32("LLM_MAX_TOKENS", 4096),
        }
    }

    pub fn is_configured(&self) -> bool {
        match self.provider.as_str() {
            "openai" => self.openai_api_key.is_some(),
            "anthropic" => self.anthropic_api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }
}

// ── Ollama (local models) ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub url: String,
    pub model: String,
}

impl OllamaConfig {
    fn from_env() -> Self {
        Self {
            url: env_or("OLLAMA_URL", "http://localhost:11434"),
            model: env_or("OLLAMA_MODEL", "llama3.2"),
        }
    }
}
