//! Validation and repair of the reasoning collaborator's raw replies.
//!
//! The collaborator is asked for a bare JSON array but replies arrive
//! fenced, malformed, or with fields missing. Everything here degrades
//! instead of failing: a reply that cannot be parsed yields an empty result
//! plus a recoverable error string, and individual fields are repaired to
//! safe defaults.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How much of an unparsable reply is quoted back in the error string.
const ERROR_EXCERPT_CHARS: usize = 200;

/// A normalized collaborator reply: the repaired items plus the recoverable
/// parse error, if any. Exactly one of the two is interesting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Normalized<T> {
    pub items: Vec<T>,
    pub error: Option<String>,
}

impl<T> Normalized<T> {
    fn ok(items: Vec<T>) -> Self {
        Self { items, error: None }
    }

    fn failed(error: String) -> Self {
        Self {
            items: Vec::new(),
            error: Some(error),
        }
    }
}

// ── Normalized shapes ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeHorizon {
    Minutes,
    Hours,
    Eventual,
    Unknown,
}

/// A single risk forecast for one service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskPrediction {
    pub service: String,
    pub risk_level: RiskLevel,
    pub prediction: String,
    pub evidence: Vec<String>,
    pub preventive_action: String,
    pub time_horizon: TimeHorizon,
}

/// One step of a causal chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainEvent {
    pub service: String,
    pub event: String,
    pub timestamp: String,
    pub line_number: u64,
}

/// A directed causal chain across services, root first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CausalChain {
    pub chain: Vec<ChainEvent>,
    pub root_cause: String,
    pub blast_radius: u64,
    pub affected_services: Vec<String>,
    pub confidence: Confidence,
    pub summary: String,
}

// ── Fence stripping and array parsing ───────────────────────────────

/// Strip a leading triple-backtick fence (with optional language tag) and
/// its trailing counterpart. Unfenced text passes through untouched.
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '_');
    let rest = rest.strip_prefix('\n').unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.strip_suffix('\n').unwrap_or(rest)
}

/// Parse a collaborator reply as a JSON array, fence-stripped. The error
/// string quotes the first 200 characters of the offending text.
fn parse_array(raw: &str, what: &str) -> Result<Vec<Value>, String> {
    let text = strip_code_fence(raw);
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Array(items)) => Ok(items),
        Ok(_) | Err(_) => Err(format!(
            "{} returned invalid JSON: {}",
            what,
            head(text, ERROR_EXCERPT_CHARS)
        )),
    }
}

fn head(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

// ── Field repair helpers ────────────────────────────────────────────

fn str_field(item: &Map<String, Value>, key: &str, default: &str) -> String {
    item.get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

fn list_field(item: &Map<String, Value>, key: &str) -> Vec<String> {
    item.get(key)
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .map(|v| match v.as_str() {
                    Some(s) => s.to_string(),
                    None => v.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn risk_level_field(item: &Map<String, Value>) -> RiskLevel {
    match str_field(item, "risk_level", "").to_uppercase().as_str() {
        "HIGH" => RiskLevel::High,
        "LOW" => RiskLevel::Low,
        _ => RiskLevel::Medium,
    }
}

fn confidence_field(item: &Map<String, Value>) -> Confidence {
    match str_field(item, "confidence", "").to_uppercase().as_str() {
        "HIGH" => Confidence::High,
        "LOW" => Confidence::Low,
        _ => Confidence::Medium,
    }
}

fn time_horizon_field(item: &Map<String, Value>) -> TimeHorizon {
    match str_field(item, "time_horizon", "").to_lowercase().as_str() {
        "minutes" => TimeHorizon::Minutes,
        "hours" => TimeHorizon::Hours,
        "eventual" => TimeHorizon::Eventual,
        _ => TimeHorizon::Unknown,
    }
}

// ── Per-shape normalization ─────────────────────────────────────────

/// Normalize a risk-assessment reply. Non-object array elements are
/// dropped; missing or invalid fields are repaired to defaults.
pub fn normalize_risk_predictions(raw: &str) -> Normalized<RiskPrediction> {
    let items = match parse_array(raw, "risk assessment") {
        Ok(items) => items,
        Err(error) => return Normalized::failed(error),
    };

    let predictions = items
        .iter()
        .filter_map(Value::as_object)
        .map(|item| RiskPrediction {
            service: str_field(item, "service", "unknown"),
            risk_level: risk_level_field(item),
            prediction: str_field(item, "prediction", ""),
            evidence: list_field(item, "evidence"),
            preventive_action: str_field(item, "preventive_action", ""),
            time_horizon: time_horizon_field(item),
        })
        .collect();

    Normalized::ok(predictions)
}

/// Normalize a causal-chain reply. `blast_radius` falls back to the number
/// of affected services when the collaborator omits it.
pub fn normalize_causal_chains(raw: &str) -> Normalized<CausalChain> {
    let items = match parse_array(raw, "causal assessment") {
        Ok(items) => items,
        Err(error) => return Normalized::failed(error),
    };

    let chains = items
        .iter()
        .filter_map(Value::as_object)
        .map(|item| {
            let chain: Vec<ChainEvent> = item
                .get("chain")
                .and_then(Value::as_array)
                .map(|events| {
                    events
                        .iter()
                        .filter_map(Value::as_object)
                        .map(|event| ChainEvent {
                            service: str_field(event, "service", "unknown"),
                            event: str_field(event, "event", ""),
                            timestamp: str_field(event, "timestamp", ""),
                            line_number: event
                                .get("line_number")
                                .and_then(Value::as_u64)
                                .unwrap_or(0),
                        })
                        .collect()
                })
                .unwrap_or_default();

            let affected_services = list_field(item, "affected_services");
            let blast_radius = item
                .get("blast_radius")
                .and_then(Value::as_u64)
                .unwrap_or(affected_services.len() as u64);

            CausalChain {
                chain,
                root_cause: str_field(item, "root_cause", ""),
                blast_radius,
                affected_services,
                confidence: confidence_field(item),
                summary: str_field(item, "summary", ""),
            }
        })
        .collect();

    Normalized::ok(chains)
}
