//! Causal-chain path: grouping and merging into candidate clusters, then
//! one collaborator call to reason about causation.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use sift_core::config::EngineConfig;
use sift_core::{known_services, LogRecord};
use sift_detect::{crossref, merge, window, Cluster};
use sift_llm::normalize::normalize_causal_chains;
use sift_llm::{Assessor, CausalChain};

/// Fixed instruction for the causal assessment call. The payload it refers
/// to is `{"event_clusters": [...], "known_issues": [...]}`.
pub const CAUSAL_INSTRUCTION: &str = "\
You are a root cause correlator for a DevOps incident analysis pipeline.

You receive clusters of temporally-close, cross-referenced log events as
JSON: {\"event_clusters\": [...], \"known_issues\": [...]}.
Identify directed causal chains: which event caused which.

For each causal chain you find, return:
- chain: ordered list of events (earliest/root first), each with service, event, timestamp, line_number
- root_cause: description of the originating event
- blast_radius: number of distinct services affected
- affected_services: list of service names
- confidence: HIGH, MEDIUM, or LOW
- summary: one plain-English sentence explaining the chain

Confidence guidelines:
- HIGH: Clear temporal ordering + explicit cross-service references in log messages
- MEDIUM: Temporal correlation exists but causation is inferred
- LOW: Events are in the same time window but causal link is uncertain

Return a JSON array of chain objects. If events are independent (no causal
link), return an empty array [].
Do NOT wrap the JSON in markdown code fences. Return ONLY valid JSON.";

/// What the causal path produced: the candidate clusters, the normalized
/// chains, and the recoverable collaborator error if one occurred.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CausalStageOutput {
    pub clusters: Vec<Cluster>,
    pub chains: Vec<CausalChain>,
    pub error: Option<String>,
}

impl CausalStageOutput {
    fn empty() -> Self {
        Self {
            clusters: Vec::new(),
            chains: Vec::new(),
            error: None,
        }
    }
}

/// Run the causal path over a batch.
///
/// Short-circuits to an empty output, without calling the collaborator,
/// when fewer than two actionable records exist or the merger proposes no
/// candidates.
pub async fn run(
    records: &[LogRecord],
    known_issues: &[Value],
    config: &EngineConfig,
    assessor: &dyn Assessor,
) -> CausalStageOutput {
    let actionable: Vec<LogRecord> = records
        .iter()
        .filter(|r| r.level.is_actionable())
        .cloned()
        .collect();

    if actionable.len() < 2 {
        info!("fewer than two actionable records, causal stage skipped");
        return CausalStageOutput::empty();
    }

    let services = known_services(records);

    let time_groups = window::group_by_time_window(&actionable, config.window_secs);
    let cross_refs = crossref::find_cross_references(&actionable, &services);
    let clusters = merge::merge_candidates(&time_groups, &cross_refs);

    if clusters.is_empty() {
        info!("no candidate clusters, causal stage skipped");
        return CausalStageOutput::empty();
    }

    let issues = &known_issues[..known_issues.len().min(config.max_known_issues)];

    info!(clusters = clusters.len(), issues = issues.len(), "requesting causal assessment");
    let payload = json!({
        "event_clusters": clusters,
        "known_issues": issues,
    });

    match assessor.assess(CAUSAL_INSTRUCTION, &payload).await {
        Ok(reply) => {
            let normalized = normalize_causal_chains(&reply);
            if let Some(error) = &normalized.error {
                warn!(error = %error, "causal assessment reply did not normalize");
            }
            CausalStageOutput {
                clusters,
                chains: normalized.items,
                error: normalized.error,
            }
        }
        Err(e) => {
            warn!(error = %e, "causal assessment call failed");
            CausalStageOutput {
                clusters,
                chains: Vec::new(),
                error: Some(format!("causal assessment failed: {}", e)),
            }
        }
    }
}
