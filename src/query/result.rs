//! Query result requests
//!
//! Running a saved query creates a result handle that the caller polls
//! until the raw response reports `complete: true`.

use serde::{Deserialize, Serialize};

/// Series data is returned unless the caller disables it.
pub const DEFAULT_DISABLE_SERIES: bool = false;

/// Secondary per-aggregate totals are suppressed unless requested.
pub const DEFAULT_DISABLE_TOTAL_BY_AGGREGATE: bool = true;

/// Result-group limit applied when the caller sets none (the remote maximum).
pub const DEFAULT_RESULT_LIMIT: u64 = 10_000;

/// Caller-supplied result flags; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueryResultOptions {
    #[serde(default)]
    pub disable_series: Option<bool>,
    #[serde(default)]
    pub disable_total_by_aggregate: Option<bool>,
    #[serde(default)]
    pub limit: Option<u64>,
}

impl QueryResultOptions {
    /// Resolve the flags against their documented defaults.
    pub fn resolve(&self, query_id: impl Into<String>) -> QueryResultRequest {
        QueryResultRequest {
            query_id: query_id.into(),
            disable_series: self.disable_series.unwrap_or(DEFAULT_DISABLE_SERIES),
            disable_total_by_aggregate: self
                .disable_total_by_aggregate
                .unwrap_or(DEFAULT_DISABLE_TOTAL_BY_AGGREGATE),
            limit: self.limit.unwrap_or(DEFAULT_RESULT_LIMIT),
        }
    }
}

/// Body of a "run query" request, with every flag spelled out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResultRequest {
    pub query_id: String,
    pub disable_series: bool,
    pub disable_total_by_aggregate: bool,
    pub limit: u64,
}
