//! Known escalation-signature detector.
//!
//! Four independent checks per service, each yielding at most one signal;
//! the first qualifying record wins, scanning in record order. Thresholds
//! are strict inequalities and malformed numeric captures are skipped
//! without aborting the scan.

use indexmap::IndexMap;
use tracing::debug;

use sift_core::LogRecord;

use crate::patterns::PatternLibrary;
use crate::signal::{excerpt, Signal, SignalType};

/// Auth-failure records required before brute force is called.
const BRUTE_FORCE_MIN: usize = 3;

/// Disk usage percent above which disk_critical fires (exclusive).
const DISK_CRITICAL_PCT: i64 = 80;

/// Pool utilization ratio above which pool_exhaustion fires (exclusive).
const POOL_EXHAUSTION_RATIO: f64 = 0.75;

/// Scan each service's records against the known signature table.
pub fn detect(
    partition: &IndexMap<String, Vec<LogRecord>>,
    library: &PatternLibrary,
) -> Vec<Signal> {
    let mut signals = Vec::new();

    for (service, records) in partition {
        if let Some(signal) = check_brute_force(service, records, library) {
            signals.push(signal);
        }
        if let Some(signal) = check_disk_critical(service, records, library) {
            signals.push(signal);
        }
        if let Some(signal) = check_pool_exhaustion(service, records, library) {
            signals.push(signal);
        }
        if let Some(signal) = check_circuit_breaker(service, records, library) {
            signals.push(signal);
        }
    }

    debug!(services = partition.len(), signals = signals.len(), "known-pattern scan complete");
    signals
}

fn known_signal(service: &str, pattern: &str, evidence: Vec<String>) -> Signal {
    Signal {
        service: service.to_string(),
        signal_type: SignalType::KnownPattern,
        metric: None,
        pattern: Some(pattern.to_string()),
        evidence,
        entry_count: None,
    }
}

fn check_brute_force(
    service: &str,
    records: &[LogRecord],
    library: &PatternLibrary,
) -> Option<Signal> {
    let failures: Vec<&LogRecord> = records
        .iter()
        .filter(|r| library.brute_force.is_match(&r.message))
        .collect();

    if failures.len() < BRUTE_FORCE_MIN {
        return None;
    }

    Some(known_signal(
        service,
        "brute_force",
        vec![
            format!("{} auth failure entries detected", failures.len()),
            format!("Sample: {}", excerpt(&failures[0].message, 80)),
        ],
    ))
}

fn check_disk_critical(
    service: &str,
    records: &[LogRecord],
    library: &PatternLibrary,
) -> Option<Signal> {
    for record in records {
        let Some(caps) = library.disk_critical.captures(&record.message) else {
            continue;
        };
        let Ok(pct) = caps[1].parse::<i64>() else {
            continue;
        };
        if pct > DISK_CRITICAL_PCT {
            return Some(known_signal(
                service,
                "disk_critical",
                vec![
                    format!("Disk usage at {}% (threshold: {}%)", pct, DISK_CRITICAL_PCT),
                    format!("Entry: {}", excerpt(&record.message, 80)),
                ],
            ));
        }
    }
    None
}

fn check_pool_exhaustion(
    service: &str,
    records: &[LogRecord],
    library: &PatternLibrary,
) -> Option<Signal> {
    for record in records {
        if !library.pool_exhaustion.is_match(&record.message) {
            continue;
        }
        let Some(caps) = library.ratio.captures(&record.message) else {
            continue;
        };
        let (Ok(current), Ok(total)) = (caps[1].parse::<i64>(), caps[2].parse::<i64>()) else {
            continue;
        };
        if total > 0 && current as f64 / total as f64 > POOL_EXHAUSTION_RATIO {
            return Some(known_signal(
                service,
                "pool_exhaustion",
                vec![
                    format!("Pool at {}/{} ({}%)", current, total, 100 * current / total),
                    format!("Entry: {}", excerpt(&record.message, 80)),
                ],
            ));
        }
    }
    None
}

fn check_circuit_breaker(
    service: &str,
    records: &[LogRecord],
    library: &PatternLibrary,
) -> Option<Signal> {
    records
        .iter()
        .find(|r| library.circuit_breaker.is_match(&r.message))
        .map(|record| {
            known_signal(
                service,
                "circuit_breaker",
                vec![
                    "Circuit breaker or retry exhaustion detected".to_string(),
                    format!("Entry: {}", excerpt(&record.message, 80)),
                ],
            )
        })
}
