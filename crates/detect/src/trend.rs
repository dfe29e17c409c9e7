//! Numeric-trend detector: extract metric series from message text and flag
//! upward movement.

use indexmap::IndexMap;
use tracing::debug;

use sift_core::LogRecord;

use crate::patterns::PatternLibrary;
use crate::signal::{Signal, SignalType};

/// Detect per-service upward numeric trends.
///
/// Every numeric pattern in the library is applied to every message; each
/// match contributes its first capture group, paired with the record's raw
/// timestamp string, to that metric's series in record order. A signal fires
/// per (service, metric) once the series has at least two values and the
/// last is strictly greater than the first; first-vs-last only, tolerant of
/// noisy middles. Unparsable captures are skipped.
pub fn detect(
    partition: &IndexMap<String, Vec<LogRecord>>,
    library: &PatternLibrary,
) -> Vec<Signal> {
    let mut signals = Vec::new();

    for (service, records) in partition {
        let mut series: IndexMap<&'static str, Vec<(String, f64)>> = IndexMap::new();

        for record in records {
            for (name, pattern) in library.numeric_metrics() {
                let Some(caps) = pattern.captures(&record.message) else {
                    continue;
                };
                let Some(group) = caps.get(1) else {
                    continue;
                };
                if let Ok(value) = group.as_str().parse::<f64>() {
                    series
                        .entry(name)
                        .or_default()
                        .push((record.timestamp.clone(), value));
                }
            }
        }

        for (name, values) in &series {
            if values.len() < 2 {
                continue;
            }
            let (first_ts, first) = &values[0];
            let (last_ts, last) = &values[values.len() - 1];
            if last > first {
                signals.push(Signal {
                    service: service.clone(),
                    signal_type: SignalType::NumericTrend,
                    metric: Some(name.to_string()),
                    pattern: None,
                    evidence: vec![
                        format!("{}: {} -> {} (trending up)", name, first, last),
                        format!("From entries at {} to {}", first_ts, last_ts),
                    ],
                    entry_count: None,
                });
            }
        }
    }

    debug!(services = partition.len(), signals = signals.len(), "trend scan complete");
    signals
}
