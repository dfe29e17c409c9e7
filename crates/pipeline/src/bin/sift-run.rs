//! sift-run: one-shot escalation analysis over a JSONL batch of records.
//!
//! Reads already-structured log records (one JSON object per line), runs
//! both pipeline paths, and prints the combined result as pretty JSON on
//! stdout. Malformed lines are skipped with a warning, never fatal.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use sift_core::config::{load_dotenv, Config};
use sift_core::LogRecord;
use sift_llm::create_assessor;
use sift_pipeline::Pipeline;

// ── CLI ─────────────────────────────────────────────────────────────

/// Detect escalation signals and propose causal-chain candidates for one
/// batch of structured log records.
#[derive(Parser, Debug)]
#[command(name = "sift-run", version, about)]
struct Cli {
    /// Path to a JSONL file of structured log records.
    #[arg(long, env = "SIFT_INPUT")]
    input: PathBuf,

    /// Optional path to a JSON array of known issues for causal context.
    #[arg(long, env = "SIFT_ISSUES")]
    issues: Option<PathBuf>,
}

// ── Input loading ───────────────────────────────────────────────────

fn read_records(path: &Path) -> anyhow::Result<Vec<LogRecord>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open record batch at {}", path.display()))?;

    let mut records = Vec::new();
    for (line_no, line) in BufReader::new(file).lines().enumerate() {
        let line = line.with_context(|| format!("failed to read line {}", line_no + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<LogRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => warn!(line = line_no + 1, error = %e, "skipping malformed record"),
        }
    }

    Ok(records)
}

fn read_issues(path: &Path) -> anyhow::Result<Vec<serde_json::Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read known issues at {}", path.display()))?;
    let issues: Vec<serde_json::Value> =
        serde_json::from_str(&content).context("known issues file must be a JSON array")?;
    Ok(issues)
}

// ── Main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    load_dotenv();
    let cli = Cli::parse();
    let config = Config::from_env();
    config.log_summary();

    let records = read_records(&cli.input)?;
    let issues = match &cli.issues {
        Some(path) => read_issues(path)?,
        None => Vec::new(),
    };
    info!(records = records.len(), issues = issues.len(), "batch loaded");

    let assessor = create_assessor(&config.llm, &config.ollama)?;
    let pipeline = Pipeline::new(assessor, config.engine.clone());

    let result = pipeline.analyze(&records, &issues).await;
    info!(
        signals = result.risk.signals.len(),
        predictions = result.risk.predictions.len(),
        clusters = result.causal.clusters.len(),
        chains = result.causal.chains.len(),
        "analysis complete"
    );

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
