//! Fixed-anchor time-window grouping.

use chrono::NaiveDateTime;
use tracing::debug;

use sift_core::{parse_timestamp, LogRecord};

/// Default grouping window in seconds.
pub const DEFAULT_WINDOW_SECS: i64 = 60;

/// Group time-parsable records into temporally-dense clusters.
///
/// Records are sorted ascending by instant, then consumed in a single greedy
/// pass: a record joins the open group iff it falls within `window_secs` of
/// the group's *first* member; the window is anchored, not sliding, so a
/// slow steady drizzle splits into multiple groups even when consecutive
/// records are close. Groups smaller than two are dropped. Records without
/// a parsable timestamp never participate.
pub fn group_by_time_window(records: &[LogRecord], window_secs: i64) -> Vec<Vec<LogRecord>> {
    let mut timed: Vec<(NaiveDateTime, LogRecord)> = records
        .iter()
        .filter_map(|r| parse_timestamp(&r.timestamp).map(|t| (t, r.clone())))
        .collect();
    timed.sort_by_key(|(t, _)| *t);

    let mut groups: Vec<Vec<LogRecord>> = Vec::new();
    let mut timed = timed.into_iter();
    let Some((mut anchor, first)) = timed.next() else {
        return groups;
    };
    let mut current = vec![first];

    for (instant, record) in timed {
        if instant.signed_duration_since(anchor).num_seconds() <= window_secs {
            current.push(record);
        } else {
            if current.len() >= 2 {
                groups.push(current);
            }
            current = vec![record];
            anchor = instant;
        }
    }
    if current.len() >= 2 {
        groups.push(current);
    }

    debug!(records = records.len(), groups = groups.len(), "time-window grouping complete");
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::Level;

    fn make_record(timestamp: &str, line: u64) -> LogRecord {
        LogRecord {
            timestamp: timestamp.to_string(),
            service: "api".to_string(),
            level: Level::Error,
            message: format!("event {}", line),
            line_number: line,
        }
    }

    #[test]
    fn groups_within_window_and_drops_singletons() {
        // t0, t0+50s, t0+130s: first two group, the straggler is dropped.
        let records = vec![
            make_record("2025-03-14 10:00:00", 1),
            make_record("2025-03-14 10:00:50", 2),
            make_record("2025-03-14 10:02:10", 3),
        ];

        let groups = group_by_time_window(&records, DEFAULT_WINDOW_SECS);
        assert_eq!(groups.len(), 1);
        let lines: Vec<u64> = groups[0].iter().map(|r| r.line_number).collect();
        assert_eq!(lines, [1, 2]);
    }

    #[test]
    fn window_is_anchored_not_sliding() {
        // Consecutive records 40s apart: each is close to its neighbor but
        // the third is 80s past the anchor, so it starts a new group.
        let records = vec![
            make_record("2025-03-14 10:00:00", 1),
            make_record("2025-03-14 10:00:40", 2),
            make_record("2025-03-14 10:01:20", 3),
            make_record("2025-03-14 10:02:00", 4),
        ];

        let groups = group_by_time_window(&records, 60);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].iter().map(|r| r.line_number).collect::<Vec<_>>(), [1, 2]);
        assert_eq!(groups[1].iter().map(|r| r.line_number).collect::<Vec<_>>(), [3, 4]);
    }

    #[test]
    fn boundary_is_inclusive() {
        let records = vec![
            make_record("2025-03-14 10:00:00", 1),
            make_record("2025-03-14 10:01:00", 2),
        ];

        let groups = group_by_time_window(&records, 60);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn unparsable_timestamps_are_excluded() {
        let records = vec![
            make_record("2025-03-14 10:00:00", 1),
            make_record("not-a-time", 2),
            make_record("2025-03-14 10:00:10", 3),
        ];

        let groups = group_by_time_window(&records, 60);
        assert_eq!(groups.len(), 1);
        let lines: Vec<u64> = groups[0].iter().map(|r| r.line_number).collect();
        assert_eq!(lines, [1, 3]);
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(group_by_time_window(&[], 60).is_empty());
    }
}
