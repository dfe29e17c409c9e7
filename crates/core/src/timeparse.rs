use chrono::NaiveDateTime;

/// The only timestamp shape the ingestion collaborator emits.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a `YYYY-MM-DD HH:MM:SS` timestamp, trimming surrounding whitespace.
///
/// Anything else yields `None`; a record with an unparsable timestamp is
/// excluded from time-ordered operations but stays available for text-based
/// ones, so this never surfaces as an error.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).ok()
}
