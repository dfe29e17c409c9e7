use serde::{Deserialize, Serialize};

/// Which detector produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalType {
    FrequencyAcceleration,
    NumericTrend,
    KnownPattern,
}

/// A deterministic detection of an escalation-relevant pattern for one
/// service. Produced by exactly one detector, never mutated afterwards,
/// consumed only by the reasoning collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub service: String,
    pub signal_type: SignalType,
    /// Metric name, set by the numeric-trend detector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    /// Signature name, set by the known-pattern detector.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    pub evidence: Vec<String>,
    /// Number of time-parsable records behind a frequency signal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_count: Option<usize>,
}

/// Cap an evidence excerpt at `max` characters (characters, not bytes, so
/// multi-byte text never splits mid-codepoint).
pub fn excerpt(message: &str, max: usize) -> String {
    message.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_type_serializes_snake_case() {
        let json = serde_json::to_string(&SignalType::FrequencyAcceleration).unwrap();
        assert_eq!(json, "\"frequency_acceleration\"");
        let json = serde_json::to_string(&SignalType::NumericTrend).unwrap();
        assert_eq!(json, "\"numeric_trend\"");
        let json = serde_json::to_string(&SignalType::KnownPattern).unwrap();
        assert_eq!(json, "\"known_pattern\"");
    }

    #[test]
    fn absent_optionals_are_omitted() {
        let signal = Signal {
            service: "api".to_string(),
            signal_type: SignalType::KnownPattern,
            metric: None,
            pattern: Some("brute_force".to_string()),
            evidence: vec!["3 auth failure entries detected".to_string()],
            entry_count: None,
        };

        let json = serde_json::to_value(&signal).unwrap();
        assert!(json.get("metric").is_none());
        assert!(json.get("entry_count").is_none());
        assert_eq!(json["pattern"], "brute_force");
    }

    #[test]
    fn excerpt_caps_characters_not_bytes() {
        let long = "x".repeat(200);
        assert_eq!(excerpt(&long, 80).len(), 80);

        let accented = "é".repeat(100);
        let cut = excerpt(&accented, 80);
        assert_eq!(cut.chars().count(), 80);
    }

    #[test]
    fn excerpt_keeps_short_messages_whole() {
        assert_eq!(excerpt("short", 80), "short");
    }
}
