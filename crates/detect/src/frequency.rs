//! Frequency-acceleration detector: are actionable events for a service
//! arriving faster and faster?

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use tracing::debug;

use sift_core::{parse_timestamp, LogRecord};

use crate::signal::{excerpt, Signal, SignalType};

/// Minimum time-parsable records per service before gaps mean anything.
const MIN_RECORDS: usize = 3;

/// Detect services whose actionable events are accelerating.
///
/// Per service with at least three time-parsable records, sorted by instant:
/// compute the inter-arrival gaps and count how many consecutive gap pairs
/// strictly shrink. A signal fires when at least half of the comparisons
/// (integer floor) shrink and at least one does. A majority vote rather
/// than a monotonic-decrease requirement, so a noisy middle does not hide
/// a real speed-up.
pub fn detect(partition: &IndexMap<String, Vec<LogRecord>>) -> Vec<Signal> {
    let mut signals = Vec::new();

    for (service, records) in partition {
        let mut timed: Vec<(NaiveDateTime, &LogRecord)> = records
            .iter()
            .filter_map(|r| parse_timestamp(&r.timestamp).map(|t| (t, r)))
            .collect();
        timed.sort_by_key(|(t, _)| *t);

        if timed.len() < MIN_RECORDS {
            continue;
        }

        let gaps: Vec<i64> = timed
            .windows(2)
            .map(|pair| pair[1].0.signed_duration_since(pair[0].0).num_seconds())
            .collect();

        let decreasing = gaps.windows(2).filter(|pair| pair[1] < pair[0]).count();
        let comparisons = gaps.len() - 1;

        if decreasing >= comparisons / 2 && decreasing >= 1 {
            let gap_list = gaps
                .iter()
                .map(|g| format!("{}s", g))
                .collect::<Vec<_>>()
                .join(", ");
            let latest: Vec<String> = timed
                .iter()
                .rev()
                .take(3)
                .rev()
                .map(|(_, r)| excerpt(&r.message, 80))
                .collect();

            signals.push(Signal {
                service: service.clone(),
                signal_type: SignalType::FrequencyAcceleration,
                metric: None,
                pattern: None,
                evidence: vec![
                    format!("Event gaps: [{}]", gap_list),
                    format!("Latest entries: {:?}", latest),
                ],
                entry_count: Some(timed.len()),
            });
        }
    }

    debug!(services = partition.len(), signals = signals.len(), "frequency scan complete");
    signals
}
