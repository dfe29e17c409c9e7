//! Fixed regular-expression tables for metric extraction and known
//! escalation signatures.
//!
//! The tables are compiled once and never mutated. The numeric table is
//! ordered; detectors apply the patterns in this order, which keeps
//! "which pattern fires first" deterministic.

use regex::Regex;

/// Immutable pattern tables shared by the detectors.
pub struct PatternLibrary {
    /// Named numeric-metric extractors, in fixed evaluation order.
    /// Each extracts its first capture group as the metric value.
    numeric: Vec<(&'static str, Regex)>,
    /// Credential / auth-failure / lockout signature.
    pub brute_force: Regex,
    /// Disk usage with a percentage; captures the percent.
    pub disk_critical: Regex,
    /// Connection-pool utilization phrase.
    pub pool_exhaustion: Regex,
    /// Circuit breaker tripped or retries exhausted.
    pub circuit_breaker: Regex,
    /// Bare `current/total` ratio, used alongside `pool_exhaustion`.
    pub ratio: Regex,
}

impl PatternLibrary {
    /// Compile the tables. Pattern construction failures are programming
    /// errors, so this panics at startup rather than returning a Result.
    pub fn new() -> Self {
        let compile = |pattern: &str| {
            Regex::new(pattern).expect("pattern library regex must compile")
        };

        Self {
            numeric: vec![
                ("disk_percent", compile(r"(\d+)%")),
                ("latency_ms", compile(r"(\d+)\s*ms")),
                ("retry_count", compile(r"(?i)retry\s*(\d+)")),
                ("pool_usage", compile(r"(?i)(\d+)/(\d+)\s*connections?")),
                ("rate_value", compile(r"(?i)(\d+)/(\d+)\s*req")),
            ],
            brute_force: compile(
                r"(?i)failed.*(?:auth|login|credentials)|brute\s*force|locked|failed\s*attempts",
            ),
            disk_critical: compile(r"(?i)disk.*?(\d+)%"),
            pool_exhaustion: compile(r"(?i)connection\s*pool|pool\s*utilization"),
            circuit_breaker: compile(r"(?i)circuit\s*breaker|retries?\s*exhausted"),
            ratio: compile(r"(\d+)/(\d+)"),
        }
    }

    /// Iterate the numeric-metric table in its fixed order.
    pub fn numeric_metrics(&self) -> impl Iterator<Item = (&'static str, &Regex)> {
        self.numeric.iter().map(|(name, re)| (*name, re))
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::new()
    }
}
