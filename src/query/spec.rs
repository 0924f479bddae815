//! Query specification types
//!
//! Field names and operator spellings follow the remote API's query JSON
//! exactly, so a decoded specification serializes back to the wire format.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Aggregation applied by a calculation, a having clause or an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalculationOp {
    Count,
    Concurrency,
    Sum,
    Avg,
    CountDistinct,
    Heatmap,
    Max,
    Min,
    P001,
    P01,
    P05,
    P10,
    P20,
    P25,
    P50,
    P75,
    P80,
    P90,
    P95,
    P99,
    P999,
    RateAvg,
    RateSum,
    RateMax,
}

impl CalculationOp {
    /// Every supported aggregation, in advertisement order
    pub const ALL: [CalculationOp; 24] = [
        CalculationOp::Count,
        CalculationOp::Concurrency,
        CalculationOp::Sum,
        CalculationOp::Avg,
        CalculationOp::CountDistinct,
        CalculationOp::Heatmap,
        CalculationOp::Max,
        CalculationOp::Min,
        CalculationOp::P001,
        CalculationOp::P01,
        CalculationOp::P05,
        CalculationOp::P10,
        CalculationOp::P20,
        CalculationOp::P25,
        CalculationOp::P50,
        CalculationOp::P75,
        CalculationOp::P80,
        CalculationOp::P90,
        CalculationOp::P95,
        CalculationOp::P99,
        CalculationOp::P999,
        CalculationOp::RateAvg,
        CalculationOp::RateSum,
        CalculationOp::RateMax,
    ];

    /// Wire spelling of the aggregation
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationOp::Count => "COUNT",
            CalculationOp::Concurrency => "CONCURRENCY",
            CalculationOp::Sum => "SUM",
            CalculationOp::Avg => "AVG",
            CalculationOp::CountDistinct => "COUNT_DISTINCT",
            CalculationOp::Heatmap => "HEATMAP",
            CalculationOp::Max => "MAX",
            CalculationOp::Min => "MIN",
            CalculationOp::P001 => "P001",
            CalculationOp::P01 => "P01",
            CalculationOp::P05 => "P05",
            CalculationOp::P10 => "P10",
            CalculationOp::P20 => "P20",
            CalculationOp::P25 => "P25",
            CalculationOp::P50 => "P50",
            CalculationOp::P75 => "P75",
            CalculationOp::P80 => "P80",
            CalculationOp::P90 => "P90",
            CalculationOp::P95 => "P95",
            CalculationOp::P99 => "P99",
            CalculationOp::P999 => "P999",
            CalculationOp::RateAvg => "RATE_AVG",
            CalculationOp::RateSum => "RATE_SUM",
            CalculationOp::RateMax => "RATE_MAX",
        }
    }
}

impl fmt::Display for CalculationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Comparison used by filters and having clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "starts-with")]
    StartsWith,
    #[serde(rename = "does-not-start-with")]
    DoesNotStartWith,
    #[serde(rename = "ends-with")]
    EndsWith,
    #[serde(rename = "does-not-end-with")]
    DoesNotEndWith,
    #[serde(rename = "exists")]
    Exists,
    #[serde(rename = "does-not-exist")]
    DoesNotExist,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "does-not-contain")]
    DoesNotContain,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "not-in")]
    NotIn,
}

impl FilterOp {
    /// Every supported comparison, in advertisement order
    pub const ALL: [FilterOp; 16] = [
        FilterOp::Eq,
        FilterOp::NotEq,
        FilterOp::Gt,
        FilterOp::Gte,
        FilterOp::Lt,
        FilterOp::Lte,
        FilterOp::StartsWith,
        FilterOp::DoesNotStartWith,
        FilterOp::EndsWith,
        FilterOp::DoesNotEndWith,
        FilterOp::Exists,
        FilterOp::DoesNotExist,
        FilterOp::Contains,
        FilterOp::DoesNotContain,
        FilterOp::In,
        FilterOp::NotIn,
    ];

    /// Wire spelling of the comparison
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::NotEq => "!=",
            FilterOp::Gt => ">",
            FilterOp::Gte => ">=",
            FilterOp::Lt => "<",
            FilterOp::Lte => "<=",
            FilterOp::StartsWith => "starts-with",
            FilterOp::DoesNotStartWith => "does-not-start-with",
            FilterOp::EndsWith => "ends-with",
            FilterOp::DoesNotEndWith => "does-not-end-with",
            FilterOp::Exists => "exists",
            FilterOp::DoesNotExist => "does-not-exist",
            FilterOp::Contains => "contains",
            FilterOp::DoesNotContain => "does-not-contain",
            FilterOp::In => "in",
            FilterOp::NotIn => "not-in",
        }
    }

    /// Existence checks are the only comparisons without an operand
    pub fn is_existence_check(&self) -> bool {
        matches!(self, FilterOp::Exists | FilterOp::DoesNotExist)
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How multiple filters combine. The remote API applies `AND` when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FilterCombination {
    #[default]
    And,
    Or,
}

/// Sort direction of an order clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Ascending,
    Descending,
}

/// One aggregation to compute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calculation {
    pub op: CalculationOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
}

/// Raw-event filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Ordering over a breakdown column or a calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<CalculationOp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderDirection>,
}

/// Post-aggregation filter over a computed calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Having {
    pub calculate_op: CalculationOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    pub op: FilterOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Shape violations detected while decoding a query
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryShapeError {
    #[error("filter on column '{column}' with operator '{op}' requires a value")]
    MissingFilterValue { column: String, op: FilterOp },

    #[error("having on {calculate_op} with operator '{op}' requires a value")]
    MissingHavingValue {
        calculate_op: CalculationOp,
        op: FilterOp,
    },
}

/// A declarative analytical query, forwarded verbatim to the remote API.
///
/// Absent lists stay absent and empty lists stay empty, so decoding and
/// re-encoding never adds or drops a key. Keys this model does not know
/// about are kept in `extra` in their original order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuerySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculations: Option<Vec<Calculation>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Vec<Filter>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_combination: Option<FilterCombination>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakdowns: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orders: Option<Vec<Order>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub havings: Option<Vec<Having>>,

    /// Relative window, seconds before now
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<u64>,

    /// Absolute window start, unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,

    /// Absolute window end, unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<i64>,

    /// Bucket width in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub granularity: Option<u64>,

    /// Maximum distinct result groups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl QuerySpec {
    /// Decode a query from a JSON value and check its local shape rules.
    pub fn from_value(value: Value) -> Result<Self, String> {
        let spec: QuerySpec =
            serde_json::from_value(value).map_err(|e| format!("Invalid query: {}", e))?;
        spec.check_shape().map_err(|e| format!("Invalid query: {}", e))?;
        Ok(spec)
    }

    /// Operand presence rules: every comparison except existence checks
    /// needs a value.
    pub fn check_shape(&self) -> Result<(), QueryShapeError> {
        for filter in self.filters.iter().flatten() {
            if filter.value.is_none() && !filter.op.is_existence_check() {
                return Err(QueryShapeError::MissingFilterValue {
                    column: filter.column.clone(),
                    op: filter.op,
                });
            }
        }
        for having in self.havings.iter().flatten() {
            if having.value.is_none() && !having.op.is_existence_check() {
                return Err(QueryShapeError::MissingHavingValue {
                    calculate_op: having.calculate_op,
                    op: having.op,
                });
            }
        }
        Ok(())
    }

    /// Length of the queried window in seconds, if one can be derived.
    ///
    /// A relative `time_range` wins over an absolute pair here; the remote
    /// API arbitrates when both are supplied.
    pub fn window_seconds(&self) -> Option<u64> {
        if let Some(range) = self.time_range {
            return Some(range);
        }
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) if end > start => Some(start.abs_diff(end)),
            _ => None,
        }
    }

    /// Granularity bounds accepted by the remote API for this window:
    /// `[window / 1000, window / 10]`.
    pub fn granularity_bounds(&self) -> Option<(u64, u64)> {
        self.window_seconds()
            .map(|window| (window / 1000, window / 10))
    }

    /// False when a granularity is set and falls outside the window bounds.
    pub fn granularity_in_bounds(&self) -> bool {
        match (self.granularity, self.granularity_bounds()) {
            (Some(granularity), Some((min, max))) => granularity >= min && granularity <= max,
            _ => true,
        }
    }

    /// Advertised input shape of a query, used by the operation registry.
    pub fn json_schema() -> Value {
        let calculation_ops: Vec<&str> = CalculationOp::ALL.iter().map(|op| op.as_str()).collect();
        let filter_ops: Vec<&str> = FilterOp::ALL.iter().map(|op| op.as_str()).collect();

        json!({
            "type": "object",
            "description": "Query specification with calculations, filters, breakdowns, orders and a time window",
            "properties": {
                "calculations": {
                    "type": "array",
                    "description": "Aggregations to compute",
                    "items": {
                        "type": "object",
                        "properties": {
                            "op": { "type": "string", "enum": calculation_ops },
                            "column": { "type": "string" }
                        },
                        "required": ["op"]
                    }
                },
                "filters": {
                    "type": "array",
                    "description": "Raw-event filters; value is required unless op is exists/does-not-exist",
                    "items": {
                        "type": "object",
                        "properties": {
                            "column": { "type": "string" },
                            "op": { "type": "string", "enum": filter_ops },
                            "value": {}
                        },
                        "required": ["column", "op"]
                    }
                },
                "filter_combination": {
                    "type": "string",
                    "enum": ["AND", "OR"],
                    "description": "How filters combine (remote default: AND)"
                },
                "breakdowns": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Columns to group by"
                },
                "orders": {
                    "type": "array",
                    "description": "Orderings; each must reference a calculation or breakdown",
                    "items": {
                        "type": "object",
                        "properties": {
                            "column": { "type": "string" },
                            "op": { "type": "string", "enum": calculation_ops },
                            "order": { "type": "string", "enum": ["ascending", "descending"] }
                        }
                    }
                },
                "havings": {
                    "type": "array",
                    "description": "Post-aggregation filters over computed results",
                    "items": {
                        "type": "object",
                        "properties": {
                            "calculate_op": { "type": "string", "enum": calculation_ops },
                            "column": { "type": "string" },
                            "op": { "type": "string", "enum": filter_ops },
                            "value": {}
                        },
                        "required": ["calculate_op", "op"]
                    }
                },
                "time_range": {
                    "type": "integer",
                    "description": "Relative window in seconds before now"
                },
                "start_time": {
                    "type": "integer",
                    "description": "Absolute window start (unix seconds)"
                },
                "end_time": {
                    "type": "integer",
                    "description": "Absolute window end (unix seconds)"
                },
                "granularity": {
                    "type": "integer",
                    "description": "Bucket width in seconds, between time_range/1000 and time_range/10"
                },
                "limit": {
                    "type": "integer",
                    "description": "Maximum number of result groups"
                }
            }
        })
    }
}

/// A shape-checked query that serializes exactly as the caller wrote it.
///
/// The typed [`QuerySpec`] is only consulted locally (shape rules,
/// granularity bounds). The wire body is the caller's own JSON, so key
/// order and unknown keys survive untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedQuery {
    spec: QuerySpec,
    raw: Value,
}

impl ValidatedQuery {
    pub fn from_value(value: Value) -> Result<Self, String> {
        let spec = QuerySpec::from_value(value.clone())?;
        Ok(Self { spec, raw: value })
    }

    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    /// The JSON forwarded to the remote API
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl Serialize for ValidatedQuery {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ValidatedQuery {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_basic_query() {
        let spec = QuerySpec::from_value(json!({
            "calculations": [{"op": "P99", "column": "duration_ms"}],
            "filters": [{"column": "status", "op": ">=", "value": 500}],
            "breakdowns": ["service.name"],
            "time_range": 7200
        }))
        .unwrap();

        let calcs = spec.calculations.as_ref().unwrap();
        assert_eq!(calcs[0].op, CalculationOp::P99);
        assert_eq!(calcs[0].column.as_deref(), Some("duration_ms"));
        assert_eq!(spec.filters.as_ref().unwrap()[0].op, FilterOp::Gte);
        assert_eq!(spec.time_range, Some(7200));
        assert!(spec.filter_combination.is_none());
    }

    #[test]
    fn test_operator_spellings_round_trip() {
        for op in FilterOp::ALL {
            let encoded = serde_json::to_value(op).unwrap();
            assert_eq!(encoded, json!(op.as_str()));
        }
        for op in CalculationOp::ALL {
            let encoded = serde_json::to_value(op).unwrap();
            assert_eq!(encoded, json!(op.as_str()));
        }
    }

    #[test]
    fn test_unknown_operator_rejected() {
        let err = QuerySpec::from_value(json!({
            "filters": [{"column": "status", "op": "like", "value": "5%"}]
        }))
        .unwrap_err();
        assert!(err.contains("Invalid query"));
    }

    #[test]
    fn test_filter_without_value_rejected() {
        let err = QuerySpec::from_value(json!({
            "filters": [{"column": "status", "op": "="}]
        }))
        .unwrap_err();
        assert!(err.contains("status"));
        assert!(err.contains("requires a value"));
    }

    #[test]
    fn test_existence_filter_needs_no_value() {
        let spec = QuerySpec::from_value(json!({
            "calculations": [{"op": "COUNT"}],
            "filters": [{"column": "trace.parent_id", "op": "does-not-exist"}]
        }))
        .unwrap();
        assert!(spec.filters.unwrap()[0].value.is_none());
    }

    #[test]
    fn test_having_without_value_rejected() {
        let spec: QuerySpec = serde_json::from_value(json!({
            "havings": [{"calculate_op": "COUNT", "op": ">"}]
        }))
        .unwrap();
        assert!(matches!(
            spec.check_shape(),
            Err(QueryShapeError::MissingHavingValue { .. })
        ));
    }

    #[test]
    fn test_reencoding_is_byte_identical() {
        // Key order deliberately differs from the struct's field order
        let text = r#"{"id":"abc123","time_range":3600,"filters":[{"value":500,"op":"=","column":"status"}],"query_annotation":{"name":"errors"},"calculations":[{"column":"duration_ms","op":"AVG"},{"op":"COUNT"}],"breakdowns":[],"granularity":60}"#;
        let value: Value = serde_json::from_str(text).unwrap();

        let query = ValidatedQuery::from_value(value).unwrap();
        assert_eq!(serde_json::to_string(&query).unwrap(), text);
        assert_eq!(query.spec().time_range, Some(3600));

        let again: ValidatedQuery = serde_json::from_str(text).unwrap();
        assert_eq!(serde_json::to_string(&again).unwrap(), text);
    }

    #[test]
    fn test_validated_query_rejects_bad_shape() {
        let err = serde_json::from_str::<ValidatedQuery>(
            r#"{"filters":[{"column":"status","op":">"}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("Invalid query"), "{}", err);
    }

    #[test]
    fn test_extreme_absolute_window_does_not_overflow() {
        let spec = QuerySpec {
            start_time: Some(i64::MIN),
            end_time: Some(i64::MAX),
            granularity: Some(60),
            ..Default::default()
        };
        assert_eq!(spec.window_seconds(), Some(u64::MAX));
        assert!(!spec.granularity_in_bounds());

        let reversed = QuerySpec {
            start_time: Some(i64::MAX),
            end_time: Some(i64::MIN),
            granularity: Some(60),
            ..Default::default()
        };
        assert_eq!(reversed.window_seconds(), None);
        assert!(reversed.granularity_in_bounds());
    }

    #[test]
    fn test_window_and_granularity_bounds() {
        let relative = QuerySpec {
            time_range: Some(3600),
            granularity: Some(60),
            ..Default::default()
        };
        assert_eq!(relative.granularity_bounds(), Some((3, 360)));
        assert!(relative.granularity_in_bounds());

        let absolute = QuerySpec {
            start_time: Some(1_000),
            end_time: Some(101_000),
            granularity: Some(5),
            ..Default::default()
        };
        assert_eq!(absolute.window_seconds(), Some(100_000));
        assert!(!absolute.granularity_in_bounds());

        let unbounded = QuerySpec {
            granularity: Some(1),
            ..Default::default()
        };
        assert!(unbounded.granularity_in_bounds());
    }

    #[test]
    fn test_schema_lists_every_operator() {
        let schema = QuerySpec::json_schema();
        let ops = &schema["properties"]["filters"]["items"]["properties"]["op"]["enum"];
        assert_eq!(ops.as_array().unwrap().len(), FilterOp::ALL.len());
        assert_eq!(
            schema["properties"]["calculations"]["items"]["required"],
            json!(["op"])
        );
    }
}
