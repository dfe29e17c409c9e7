//! Risk path: detectors over the actionable partition, then one
//! collaborator call to turn signals into forecasts.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use sift_core::{partition_by_service, LogRecord};
use sift_detect::{frequency, known, trend, PatternLibrary, Signal};
use sift_llm::normalize::normalize_risk_predictions;
use sift_llm::{Assessor, RiskPrediction};

/// Fixed instruction for the risk assessment call. The payload it refers to
/// is `{"signals": [...]}`, serialized by the provider.
pub const RISK_INSTRUCTION: &str = "\
You are a predictive risk assessor for a DevOps incident analysis pipeline.

You receive detected escalation signals from log analysis as JSON:
{\"signals\": [...]}. Each signal includes:
- The service affected
- The type of signal (frequency_acceleration, numeric_trend, known_pattern)
- Supporting evidence (specific log entries and values)

Assess each signal and predict what will happen next if no action is taken.

For each risk prediction, return:
- service: affected service name
- risk_level: HIGH, MEDIUM, or LOW
- prediction: what will likely happen next (be specific)
- evidence: list of evidence strings (log excerpts, values)
- preventive_action: concrete step to prevent escalation
- time_horizon: \"minutes\", \"hours\", or \"eventual\"

Risk level guidelines:
- HIGH: Imminent failure likely (accelerating errors, resources near exhaustion)
- MEDIUM: Degradation probable if trend continues (slow climb, intermittent warnings)
- LOW: Worth monitoring but not urgent (single signals, stable patterns)

Return a JSON array. If no risks are predicted, return [].
Do NOT wrap the JSON in markdown code fences. Return ONLY valid JSON.";

/// What the risk path produced: the deterministic signals, the normalized
/// forecasts, and the recoverable collaborator error if one occurred.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskStageOutput {
    pub signals: Vec<Signal>,
    pub predictions: Vec<RiskPrediction>,
    pub error: Option<String>,
}

impl RiskStageOutput {
    fn empty() -> Self {
        Self {
            signals: Vec::new(),
            predictions: Vec::new(),
            error: None,
        }
    }
}

/// Run the risk path over a batch.
///
/// Short-circuits to an empty output, without calling the collaborator,
/// when the batch has no actionable records or no detector fires.
pub async fn run(
    records: &[LogRecord],
    library: &PatternLibrary,
    assessor: &dyn Assessor,
) -> RiskStageOutput {
    let partition = partition_by_service(records);
    if partition.is_empty() {
        info!("no actionable records, risk stage skipped");
        return RiskStageOutput::empty();
    }

    let mut signals = frequency::detect(&partition);
    signals.extend(trend::detect(&partition, library));
    signals.extend(known::detect(&partition, library));

    if signals.is_empty() {
        info!("no escalation signals detected, risk stage skipped");
        return RiskStageOutput::empty();
    }

    info!(signals = signals.len(), "requesting risk assessment");
    let payload = json!({ "signals": signals });

    match assessor.assess(RISK_INSTRUCTION, &payload).await {
        Ok(reply) => {
            let normalized = normalize_risk_predictions(&reply);
            if let Some(error) = &normalized.error {
                warn!(error = %error, "risk assessment reply did not normalize");
            }
            RiskStageOutput {
                signals,
                predictions: normalized.items,
                error: normalized.error,
            }
        }
        Err(e) => {
            warn!(error = %e, "risk assessment call failed");
            RiskStageOutput {
                signals,
                predictions: Vec::new(),
                error: Some(format!("risk assessment failed: {}", e)),
            }
        }
    }
}
