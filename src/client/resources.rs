//! Request bodies for the remote API's write operations
//!
//! Optional fields are omitted from the wire when unset so the remote API
//! applies its own defaults. Bodies that belong to a dataset but address it
//! in the body rather than the path are wrapped in [`DatasetBound`].
//!
//! Every body carries an `extra` map: keys the typed fields do not name are
//! forwarded as the caller sent them.

use chrono::DateTime;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

use crate::query::ValidatedQuery;

/// Dataset create/update body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand_json_depth: Option<u8>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Listing options for dataset definitions
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PageOptions {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
    #[serde(default)]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// A query placed on a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardQuery {
    pub query_id: String,
}

/// Board create/update body
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoardBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_layout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queries: Option<Vec<BoardQuery>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Marker timestamp in unix seconds.
///
/// Accepts either an integer or an RFC 3339 string on input; always
/// emits an integer, which is what the remote API stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MarkerTime(pub i64);

impl<'de> Deserialize<'de> for MarkerTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Unix(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Unix(secs) => Ok(MarkerTime(secs)),
            Raw::Text(text) => {
                if let Ok(secs) = text.parse::<i64>() {
                    return Ok(MarkerTime(secs));
                }
                DateTime::parse_from_rfc3339(&text)
                    .map(|dt| MarkerTime(dt.timestamp()))
                    .map_err(|e| {
                        serde::de::Error::custom(format!(
                            "invalid marker time '{}': {}",
                            text, e
                        ))
                    })
            }
        }
    }
}

/// Marker create/update body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkerBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub marker_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<MarkerTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<MarkerTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reference to the service-level indicator column of an SLO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliRef {
    pub alias: String,
}

/// SLO create/update body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SloBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sli: Option<SliRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_per_million: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_period_days: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThresholdOp {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
}

/// Trigger threshold: fire when the query result crosses `value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerThreshold {
    pub op: ThresholdOp,
    pub value: Number,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exceeded_limit: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    OnChange,
    OnTrue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationScheduleType {
    Frequency,
    Window,
}

/// Days and hours during which a window-scheduled trigger evaluates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleWindow {
    pub days_of_week: Vec<String>,
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSchedule {
    pub window: ScheduleWindow,
}

/// Trigger create/update body.
///
/// `query_id` and an inline `query` are both forwarded when supplied;
/// the remote API decides which one wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriggerBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<ValidatedQuery>,
    /// Evaluation interval in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<TriggerThreshold>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_type: Option<AlertType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipients: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_schedule_type: Option<EvaluationScheduleType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_schedule: Option<EvaluationSchedule>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body that names its owning dataset inline: `{...body, "dataset": slug}`
#[derive(Debug, Serialize)]
pub struct DatasetBound<'a, T: Serialize> {
    #[serde(flatten)]
    pub body: &'a T,
    pub dataset: &'a str,
}
