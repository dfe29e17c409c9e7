//! Candidate merging: combine time-window groups and cross-reference
//! clusters into the final causal-chain candidates.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use sift_core::{parse_timestamp, LogRecord};

/// Minimum shared line numbers before a cross-ref cluster and a time group
/// are considered the same incident.
const MIN_OVERLAP: usize = 2;

/// A deduplicated group of two or more related records, proposed as a
/// causal-chain candidate. Serializes as a bare record array; the shape
/// the reasoning collaborator receives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cluster {
    pub records: Vec<LogRecord>,
}

impl Cluster {
    /// The member identity set; records are deduplicated by line number.
    pub fn line_numbers(&self) -> BTreeSet<u64> {
        self.records.iter().map(|r| r.line_number).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Merge grouper outputs through a three-tier fallback. Tiers are mutually
/// exclusive; a later tier runs only when the previous produced nothing:
///
/// 1. union every (cross-ref cluster, time group) pair sharing at least two
///    line numbers; confirmed by both proximity and explicit reference;
/// 2. cross-ref clusters alone (textual reference beats time alone);
/// 3. time groups alone.
///
/// Candidates are deduplicated by their full line-number set throughout.
pub fn merge_candidates(
    time_groups: &[Vec<LogRecord>],
    cross_refs: &[Vec<LogRecord>],
) -> Vec<Cluster> {
    let mut candidates: Vec<Vec<LogRecord>> = Vec::new();
    let mut seen_sets: Vec<BTreeSet<u64>> = Vec::new();

    // Tier 1: overlap merge.
    for cluster in cross_refs {
        let cluster_lines: BTreeSet<u64> = cluster.iter().map(|r| r.line_number).collect();
        for group in time_groups {
            let group_lines: BTreeSet<u64> = group.iter().map(|r| r.line_number).collect();
            if cluster_lines.intersection(&group_lines).count() < MIN_OVERLAP {
                continue;
            }

            let mut merged: IndexMap<u64, LogRecord> = IndexMap::new();
            for record in cluster.iter().chain(group.iter()) {
                merged
                    .entry(record.line_number)
                    .or_insert_with(|| record.clone());
            }
            let merged_set: BTreeSet<u64> = merged.keys().copied().collect();
            if !seen_sets.contains(&merged_set) {
                candidates.push(merged.into_values().collect());
                seen_sets.push(merged_set);
            }
        }
    }

    // Tier 2: cross-references alone.
    if candidates.is_empty() {
        for cluster in cross_refs {
            let lines: BTreeSet<u64> = cluster.iter().map(|r| r.line_number).collect();
            if !seen_sets.contains(&lines) {
                candidates.push(cluster.clone());
                seen_sets.push(lines);
            }
        }
    }

    // Tier 3: time groups alone.
    if candidates.is_empty() {
        for group in time_groups {
            let lines: BTreeSet<u64> = group.iter().map(|r| r.line_number).collect();
            if !seen_sets.contains(&lines) {
                candidates.push(group.clone());
                seen_sets.push(lines);
            }
        }
    }

    let clusters: Vec<Cluster> = candidates
        .into_iter()
        .map(|mut records| {
            // Timestamped records ascend; unparsable ones sort first, line
            // number breaks ties either way.
            records.sort_by_key(|r| (parse_timestamp(&r.timestamp), r.line_number));
            Cluster { records }
        })
        .collect();

    debug!(
        time_groups = time_groups.len(),
        cross_refs = cross_refs.len(),
        candidates = clusters.len(),
        "candidate merge complete"
    );
    clusters
}
