use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

/// Caller-facing consistency selector, carried by a filter's `$consistency`
/// key. Omission means the store's default (bounded) behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsistencyLevel {
    /// Do not wait for the index at all. Fastest; may miss recent writes.
    NotBounded,
    /// Wait until this node's mutations are indexed.
    RequestPlus,
    /// Wait until cluster-wide mutations are indexed. Strongest, slowest.
    StatementPlus,
}

/// Native scan-consistency setting handed to the store with read statements.
/// Write operations never carry one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanConsistency {
    /// Store default: bounded staleness.
    #[default]
    Bounded,
    NotBounded,
    RequestPlus,
    StatementPlus,
}

/// Map the symbolic level to the store's native setting. `None` (level
/// unspecified) resolves to the store default.
pub fn resolve(level: Option<ConsistencyLevel>) -> ScanConsistency {
    match level {
        None => ScanConsistency::Bounded,
        Some(ConsistencyLevel::NotBounded) => ScanConsistency::NotBounded,
        Some(ConsistencyLevel::RequestPlus) => ScanConsistency::RequestPlus,
        Some(ConsistencyLevel::StatementPlus) => ScanConsistency::StatementPlus,
    }
}

/// Parse a `$consistency` value. Unrecognized symbols (and non-symbol values)
/// are treated as unspecified, not as errors.
pub fn parse_level(value: &Json) -> Option<ConsistencyLevel> {
    serde_json::from_value(value.clone()).ok()
}
