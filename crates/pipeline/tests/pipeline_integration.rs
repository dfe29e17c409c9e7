//! End-to-end pipeline tests with a canned-response assessor double.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use sift_core::config::EngineConfig;
use sift_core::{Level, LogRecord};
use sift_detect::{PatternLibrary, SignalType};
use sift_llm::{AssessError, Assessor, Confidence, RiskLevel};
use sift_pipeline::{causal, risk, Pipeline};

// ── Test double ─────────────────────────────────────────────────────

/// Canned-response collaborator: replies per stage, records every payload.
struct CannedAssessor {
    risk_reply: String,
    causal_reply: String,
    calls: AtomicUsize,
    payloads: Mutex<Vec<Value>>,
}

impl CannedAssessor {
    fn new(risk_reply: &str, causal_reply: &str) -> Self {
        Self {
            risk_reply: risk_reply.to_string(),
            causal_reply: causal_reply.to_string(),
            calls: AtomicUsize::new(0),
            payloads: Mutex::new(Vec::new()),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Assessor for CannedAssessor {
    async fn assess(&self, instruction: &str, payload: &Value) -> Result<String, AssessError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().unwrap().push(payload.clone());
        if instruction.contains("predictive risk") {
            Ok(self.risk_reply.clone())
        } else {
            Ok(self.causal_reply.clone())
        }
    }
}

// ── Fixtures ────────────────────────────────────────────────────────

fn make_record(service: &str, timestamp: &str, level: Level, message: &str, line: u64) -> LogRecord {
    LogRecord {
        timestamp: timestamp.to_string(),
        service: service.to_string(),
        level,
        message: message.to_string(),
        line_number: line,
    }
}

/// A batch with an accelerating error burst on api and a critical disk
/// record on db, cross-referencing each other within one minute.
fn incident_batch() -> Vec<LogRecord> {
    vec![
        make_record("db", "2025-03-14 10:00:00", Level::Error, "disk at 91%, writes stalling", 1),
        make_record("api", "2025-03-14 10:00:20", Level::Error, "db query timeout", 2),
        make_record("api", "2025-03-14 10:02:00", Level::Error, "db connection refused", 3),
        make_record("api", "2025-03-14 10:03:00", Level::Error, "db connection refused", 4),
        make_record("api", "2025-03-14 10:03:20", Level::Error, "upstream db unavailable", 5),
        make_record("web", "2025-03-14 10:00:30", Level::Info, "served 200 OK", 6),
    ]
}

// ── Risk path ───────────────────────────────────────────────────────

#[tokio::test]
async fn risk_stage_detects_signals_and_normalizes_reply() {
    let reply = "```json\n[{\"service\": \"db\", \"risk_level\": \"critical\", \"prediction\": \"disk full\"}]\n```";
    let assessor = CannedAssessor::new(reply, "[]");
    let library = PatternLibrary::new();

    let output = risk::run(&incident_batch(), &library, &assessor).await;

    assert_eq!(assessor.call_count(), 1);
    assert!(output.error.is_none());

    // api error gaps are 100s, 60s, 20s: acceleration fires; db has the
    // disk_critical signature and the disk_percent metric.
    let types: BTreeSet<&str> = output
        .signals
        .iter()
        .map(|s| match s.signal_type {
            SignalType::FrequencyAcceleration => "freq",
            SignalType::NumericTrend => "trend",
            SignalType::KnownPattern => "known",
        })
        .collect();
    assert!(types.contains("freq"));
    assert!(types.contains("known"));

    assert_eq!(output.predictions.len(), 1);
    let prediction = &output.predictions[0];
    assert_eq!(prediction.service, "db");
    assert_eq!(prediction.risk_level, RiskLevel::Medium); // "critical" repaired
    assert_eq!(prediction.prediction, "disk full");
}

#[tokio::test]
async fn risk_stage_skips_without_actionable_records() {
    let records = vec![
        make_record("api", "2025-03-14 10:00:00", Level::Info, "all fine", 1),
        make_record("db", "2025-03-14 10:00:10", Level::Debug, "cache warm", 2),
    ];
    let assessor = CannedAssessor::new("[]", "[]");
    let library = PatternLibrary::new();

    let output = risk::run(&records, &library, &assessor).await;

    assert_eq!(assessor.call_count(), 0);
    assert!(output.signals.is_empty());
    assert!(output.predictions.is_empty());
    assert!(output.error.is_none());
}

#[tokio::test]
async fn risk_stage_surfaces_malformed_reply_as_recoverable_error() {
    let assessor = CannedAssessor::new("I see no risks here, have a nice day.", "[]");
    let library = PatternLibrary::new();

    let output = risk::run(&incident_batch(), &library, &assessor).await;

    assert!(!output.signals.is_empty());
    assert!(output.predictions.is_empty());
    let error = output.error.unwrap();
    assert!(error.contains("invalid JSON"));
    assert!(error.contains("I see no risks"));
}

// ── Causal path ─────────────────────────────────────────────────────

#[tokio::test]
async fn causal_stage_clusters_and_normalizes_reply() {
    let reply = r#"[{
        "chain": [
            {"service": "db", "event": "disk filled", "timestamp": "2025-03-14 10:00:00", "line_number": 1},
            {"service": "api", "event": "query timeouts", "timestamp": "2025-03-14 10:00:20", "line_number": 2}
        ],
        "root_cause": "db disk exhaustion",
        "affected_services": ["db", "api"],
        "confidence": "HIGH",
        "summary": "db disk filled and api timed out."
    }]"#;
    let assessor = CannedAssessor::new("[]", reply);

    let records = incident_batch();
    let output = causal::run(&records, &[], &EngineConfig::default(), &assessor).await;

    assert_eq!(assessor.call_count(), 1);
    assert!(output.error.is_none());
    assert!(!output.clusters.is_empty());

    // Every clustered record exists verbatim in the actionable input.
    let actionable_lines: BTreeSet<u64> = records
        .iter()
        .filter(|r| r.level.is_actionable())
        .map(|r| r.line_number)
        .collect();
    for cluster in &output.clusters {
        assert!(cluster.len() >= 2);
        assert!(cluster.line_numbers().is_subset(&actionable_lines));
    }

    assert_eq!(output.chains.len(), 1);
    let chain = &output.chains[0];
    assert_eq!(chain.confidence, Confidence::High);
    assert_eq!(chain.blast_radius, 2);
    assert_eq!(chain.chain[0].service, "db");
}

#[tokio::test]
async fn causal_stage_skips_below_two_actionable_records() {
    let records = vec![
        make_record("api", "2025-03-14 10:00:00", Level::Error, "db down", 1),
        make_record("db", "2025-03-14 10:00:05", Level::Info, "compaction done", 2),
    ];
    let assessor = CannedAssessor::new("[]", "[]");

    let output = causal::run(&records, &[], &EngineConfig::default(), &assessor).await;

    assert_eq!(assessor.call_count(), 0);
    assert!(output.clusters.is_empty());
    assert!(output.chains.is_empty());
}

#[tokio::test]
async fn causal_stage_caps_known_issues_in_payload() {
    let assessor = CannedAssessor::new("[]", "[]");
    let issues: Vec<Value> = (0..15).map(|i| json!({"id": i})).collect();

    let output = causal::run(&incident_batch(), &issues, &EngineConfig::default(), &assessor).await;
    assert!(output.error.is_none());

    let payloads = assessor.payloads.lock().unwrap();
    assert_eq!(payloads.len(), 1);
    let sent = payloads[0]["known_issues"].as_array().unwrap();
    assert_eq!(sent.len(), 10);
    assert_eq!(sent[0]["id"], 0);
}

// ── Full pipeline ───────────────────────────────────────────────────

#[tokio::test]
async fn analyze_runs_both_paths() {
    let risk_reply = r#"[{"service": "api", "risk_level": "HIGH", "prediction": "cascade", "time_horizon": "minutes"}]"#;
    let causal_reply = r#"[{"root_cause": "db disk", "affected_services": ["db", "api"], "confidence": "MEDIUM"}]"#;
    let assessor = CannedAssessor::new(risk_reply, causal_reply);

    let pipeline = Pipeline::new(Box::new(assessor), EngineConfig::default());
    let result = pipeline.analyze(&incident_batch(), &[]).await;

    assert!(!result.risk.signals.is_empty());
    assert_eq!(result.risk.predictions.len(), 1);
    assert_eq!(result.risk.predictions[0].risk_level, RiskLevel::High);
    assert!(!result.causal.clusters.is_empty());
    assert_eq!(result.causal.chains.len(), 1);
    assert_eq!(result.causal.chains[0].blast_radius, 2);
}

#[tokio::test]
async fn empty_batch_produces_empty_result() {
    let assessor = CannedAssessor::new("[]", "[]");
    let pipeline = Pipeline::new(Box::new(assessor), EngineConfig::default());

    let result = pipeline.analyze(&[], &[]).await;

    assert!(result.risk.signals.is_empty());
    assert!(result.risk.predictions.is_empty());
    assert!(result.causal.clusters.is_empty());
    assert!(result.causal.chains.is_empty());
    assert!(result.risk.error.is_none());
    assert!(result.causal.error.is_none());
}
