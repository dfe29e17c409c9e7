use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Sentinel service name assigned to records that arrive without one.
pub const UNKNOWN_SERVICE: &str = "unknown";

/// Severity of a log record.
///
/// Unknown level strings deserialize to [`Level::Other`] rather than failing
/// the batch; a malformed level demotes the record to non-actionable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", from = "String")]
pub enum Level {
    Critical,
    Error,
    Warn,
    Warning,
    Info,
    Debug,
    Trace,
    Other,
}

impl From<String> for Level {
    fn from(value: String) -> Self {
        match value.as_str() {
            "CRITICAL" => Level::Critical,
            "ERROR" => Level::Error,
            "WARN" => Level::Warn,
            "WARNING" => Level::Warning,
            "INFO" => Level::Info,
            "DEBUG" => Level::Debug,
            "TRACE" => Level::Trace,
            _ => Level::Other,
        }
    }
}

impl Level {
    /// Whether this severity is worth detector attention.
    pub fn is_actionable(&self) -> bool {
        matches!(
            self,
            Level::Critical | Level::Error | Level::Warn | Level::Warning
        )
    }
}

/// A structured log record as supplied by the ingestion collaborator.
///
/// Immutable once created; ordering across records is established only by
/// `timestamp`, and `line_number` is the identity used for deduplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub timestamp: String,
    pub service: String,
    pub level: Level,
    pub message: String,
    pub line_number: u64,
}

/// Filter a batch to actionable severities and partition by service.
///
/// Records without a service land under the `"unknown"` sentinel. The map
/// preserves first-seen service order so detector output is deterministic.
pub fn partition_by_service(records: &[LogRecord]) -> IndexMap<String, Vec<LogRecord>> {
    let mut by_service: IndexMap<String, Vec<LogRecord>> = IndexMap::new();

    for record in records {
        if !record.level.is_actionable() {
            continue;
        }
        let service = if record.service.is_empty() {
            UNKNOWN_SERVICE.to_string()
        } else {
            record.service.clone()
        };
        by_service.entry(service).or_default().push(record.clone());
    }

    by_service
}

/// Collect the distinct service names seen across the whole batch, in
/// first-seen order. The `"unknown"` sentinel and empty names are excluded;
/// cross-referencing against them would match nothing meaningful.
pub fn known_services(records: &[LogRecord]) -> Vec<String> {
    let mut services: Vec<String> = Vec::new();
    for record in records {
        if record.service.is_empty() || record.service == UNKNOWN_SERVICE {
            continue;
        }
        if !services.contains(&record.service) {
            services.push(record.service.clone());
        }
    }
    services
}
