//! Cross-service reference clustering.
//!
//! A record that names another service in its message text ties the two
//! services together. Association keys iterate in first-seen order, which
//! fixes the cluster-building order; the output is reproducible for a
//! given batch.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use sift_core::LogRecord;

/// Cluster records that textually reference other services.
///
/// For each record, every known service name (case-insensitive) other than
/// the record's own that appears as a substring of the message associates
/// the record's index with both that service and the record's own service.
/// Index sets are then consumed greedily in first-seen key order: indices
/// already claimed by an earlier cluster are excluded, and a cluster
/// survives only if at least two indices remain.
pub fn find_cross_references(
    records: &[LogRecord],
    known_services: &[String],
) -> Vec<Vec<LogRecord>> {
    let mut associations: IndexMap<String, IndexSet<usize>> = IndexMap::new();

    for (index, record) in records.iter().enumerate() {
        let message = record.message.to_lowercase();
        let own_service = record.service.to_lowercase();

        for service in known_services {
            let service = service.to_lowercase();
            if service != own_service && message.contains(service.as_str()) {
                associations.entry(service).or_default().insert(index);
                associations
                    .entry(own_service.clone())
                    .or_default()
                    .insert(index);
            }
        }
    }

    let mut claimed: HashSet<usize> = HashSet::new();
    let mut clusters = Vec::new();

    for indices in associations.values() {
        let mut remaining: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|i| !claimed.contains(i))
            .collect();
        remaining.sort_unstable();

        if remaining.len() >= 2 {
            clusters.push(remaining.iter().map(|&i| records[i].clone()).collect());
            claimed.extend(remaining);
        }
    }

    debug!(
        records = records.len(),
        services = known_services.len(),
        clusters = clusters.len(),
        "cross-reference clustering complete"
    );
    clusters
}
