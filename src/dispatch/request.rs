//! Typed operation calls
//!
//! An argument bag is checked for required fields against the operation's
//! declared shape, then decoded into the parameter struct for that
//! operation. After decoding, routing is an exhaustive match.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::client::{
    BoardBody, BoardQuery, DatasetBody, DatasetScope, MarkerBody, PageOptions, SloBody,
    TriggerBody,
};
use crate::query::{QueryResultOptions, QuerySpec, ValidatedQuery};
use crate::registry::{InputShape, OperationKind};

use super::errors::{DispatchError, DispatchResult};

/// Arguments naming only a dataset
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatasetArgs {
    #[serde(rename = "datasetSlug")]
    pub dataset_slug: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DatasetUpdateArgs {
    #[serde(rename = "datasetSlug")]
    pub dataset_slug: String,
    #[serde(flatten)]
    pub body: DatasetBody,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColumnsArgs {
    #[serde(rename = "datasetSlug")]
    pub dataset_slug: String,
    #[serde(default)]
    pub key_name: Option<String>,
}

/// `query` stays raw here so its own decoder can report shape errors
#[derive(Debug, Clone, PartialEq, Deserialize)]
struct RawQueryCreateArgs {
    #[serde(rename = "datasetSlug")]
    dataset_slug: String,
    query: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryCreateArgs {
    pub dataset_slug: String,
    pub query: ValidatedQuery,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryGetArgs {
    #[serde(rename = "datasetSlug")]
    pub dataset_slug: String,
    #[serde(rename = "queryId")]
    pub query_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryResultCreateArgs {
    #[serde(rename = "datasetSlug")]
    pub dataset_slug: String,
    #[serde(rename = "queryId")]
    pub query_id: String,
    #[serde(flatten)]
    pub options: QueryResultOptions,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryResultGetArgs {
    #[serde(rename = "datasetSlug")]
    pub dataset_slug: String,
    #[serde(rename = "queryResultId")]
    pub query_result_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DefinitionsArgs {
    #[serde(rename = "datasetSlug")]
    pub dataset_slug: String,
    #[serde(flatten)]
    pub page: PageOptions,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventArgs {
    #[serde(rename = "datasetSlug")]
    pub dataset_slug: String,
    pub event: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EventBatchArgs {
    #[serde(rename = "datasetSlug")]
    pub dataset_slug: String,
    pub events: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BoardIdArgs {
    #[serde(rename = "boardId")]
    pub board_id: String,
}

/// Board fields as the caller spells them; `query_ids` become `queries`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BoardFields {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub column_layout: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub query_ids: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BoardFields {
    pub fn into_body(self) -> BoardBody {
        BoardBody {
            name: self.name,
            description: self.description,
            column_layout: self.column_layout,
            style: self.style,
            queries: self.query_ids.map(|ids| {
                ids.into_iter()
                    .map(|query_id| BoardQuery { query_id })
                    .collect()
            }),
            extra: self.extra,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BoardUpdateArgs {
    #[serde(rename = "boardId")]
    pub board_id: String,
    #[serde(flatten)]
    pub fields: BoardFields,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarkerIdArgs {
    #[serde(rename = "datasetSlug")]
    pub dataset_slug: String,
    #[serde(rename = "markerId")]
    pub marker_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarkerCreateArgs {
    #[serde(rename = "datasetSlug")]
    pub dataset_slug: String,
    #[serde(flatten)]
    pub body: MarkerBody,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MarkerUpdateArgs {
    #[serde(rename = "datasetSlug")]
    pub dataset_slug: String,
    #[serde(rename = "markerId")]
    pub marker_id: String,
    #[serde(flatten)]
    pub body: MarkerBody,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SloIdArgs {
    #[serde(rename = "sloId")]
    pub slo_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SloCreateArgs {
    #[serde(rename = "datasetSlug")]
    pub dataset_slug: String,
    #[serde(flatten)]
    pub body: SloBody,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SloUpdateArgs {
    #[serde(rename = "sloId")]
    pub slo_id: String,
    #[serde(flatten)]
    pub body: SloBody,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TriggerIdArgs {
    #[serde(rename = "datasetSlug")]
    pub dataset_slug: String,
    #[serde(rename = "triggerId")]
    pub trigger_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TriggerCreateArgs {
    #[serde(rename = "datasetSlug")]
    pub dataset_slug: String,
    #[serde(flatten)]
    pub body: TriggerBody,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TriggerUpdateArgs {
    #[serde(rename = "datasetSlug")]
    pub dataset_slug: String,
    #[serde(rename = "triggerId")]
    pub trigger_id: String,
    #[serde(flatten)]
    pub body: TriggerBody,
}

/// A validated call, one variant per operation
#[derive(Debug, Clone, PartialEq)]
pub enum OperationCall {
    Auth,
    DatasetsList,
    DatasetGet(DatasetArgs),
    DatasetCreate(DatasetBody),
    DatasetUpdate(DatasetUpdateArgs),
    DatasetDelete(DatasetArgs),
    ColumnsList(ColumnsArgs),
    QueryCreate(QueryCreateArgs),
    QueryGet(QueryGetArgs),
    QueryResultCreate(QueryResultCreateArgs),
    QueryResultGet(QueryResultGetArgs),
    DatasetDefinitionsList(DefinitionsArgs),
    EventCreate(EventArgs),
    EventsBatchCreate(EventBatchArgs),
    BoardsList,
    BoardGet(BoardIdArgs),
    BoardCreate(BoardFields),
    BoardUpdate(BoardUpdateArgs),
    BoardDelete(BoardIdArgs),
    MarkersList { scope: DatasetScope },
    MarkerGet { scope: DatasetScope, marker_id: String },
    MarkerCreate { scope: DatasetScope, body: MarkerBody },
    MarkerUpdate { scope: DatasetScope, marker_id: String, body: MarkerBody },
    MarkerDelete { scope: DatasetScope, marker_id: String },
    SlosList(DatasetArgs),
    SloGet(SloIdArgs),
    SloCreate(SloCreateArgs),
    SloUpdate(SloUpdateArgs),
    SloDelete(SloIdArgs),
    TriggersList(DatasetArgs),
    TriggerGet(TriggerIdArgs),
    TriggerCreate(TriggerCreateArgs),
    TriggerUpdate(TriggerUpdateArgs),
    TriggerDelete(TriggerIdArgs),
}

/// Arguments that become URL path segments
const PATH_FIELDS: &[&str] = &[
    "datasetSlug",
    "queryId",
    "queryResultId",
    "boardId",
    "markerId",
    "sloId",
    "triggerId",
];

/// Present: key exists, is not null, and is not an empty string
fn is_present(bag: &Map<String, Value>, field: &str) -> bool {
    match bag.get(field) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(_) => true,
    }
}

/// Every required field of `shape` missing from `bag`, in declaration order
pub fn missing_fields(shape: &InputShape, bag: &Map<String, Value>) -> Vec<String> {
    shape
        .required_fields()
        .filter(|field| !is_present(bag, field))
        .map(str::to_string)
        .collect()
}

/// Validate an argument bag against `shape` and return it as an object.
///
/// An absent bag is accepted only for operations with no required fields.
pub fn validate_arguments(
    kind: OperationKind,
    shape: &InputShape,
    arguments: Option<Value>,
) -> DispatchResult<Map<String, Value>> {
    let bag = match arguments {
        None | Some(Value::Null) if shape.has_required_fields() => {
            return Err(DispatchError::validation(format!(
                "No arguments provided for {}",
                kind
            )));
        }
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(DispatchError::validation(format!(
                "Arguments for {} must be a JSON object, got {}",
                kind,
                json_type_name(&other)
            )));
        }
    };

    let missing = missing_fields(shape, &bag);
    if !missing.is_empty() {
        return Err(DispatchError::MissingField(missing));
    }

    for field in PATH_FIELDS {
        if let Some(Value::String(id)) = bag.get(*field) {
            if id == "." || id == ".." {
                return Err(DispatchError::validation(format!(
                    "{} cannot be '{}'",
                    field, id
                )));
            }
        }
    }
    Ok(bag)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn decode<T: DeserializeOwned>(kind: OperationKind, bag: Map<String, Value>) -> DispatchResult<T> {
    serde_json::from_value(Value::Object(bag))
        .map_err(|e| DispatchError::validation(format!("Invalid arguments for {}: {}", kind, e)))
}

/// Bodies that name their dataset inline get it from `datasetSlug` only
fn without_inline_dataset(mut bag: Map<String, Value>) -> Map<String, Value> {
    bag.remove("dataset");
    bag
}

/// Decode trigger arguments apart from their inline query, which gets the
/// same shape check as a saved query
fn decode_trigger<T: DeserializeOwned>(
    kind: OperationKind,
    mut bag: Map<String, Value>,
) -> DispatchResult<(T, Option<ValidatedQuery>)> {
    let query = bag
        .remove("query")
        .filter(|v| !v.is_null())
        .map(ValidatedQuery::from_value)
        .transpose()
        .map_err(DispatchError::Validation)?;

    let args = decode(kind, without_inline_dataset(bag))?;
    Ok((args, query))
}

impl OperationCall {
    /// Decode a validated argument bag into the call for `kind`
    pub fn decode(kind: OperationKind, bag: Map<String, Value>) -> DispatchResult<Self> {
        use OperationKind as K;

        let call = match kind {
            K::Auth => OperationCall::Auth,
            K::DatasetsList => OperationCall::DatasetsList,
            K::DatasetGet => OperationCall::DatasetGet(decode(kind, bag)?),
            K::DatasetCreate => OperationCall::DatasetCreate(decode(kind, bag)?),
            K::DatasetUpdate => OperationCall::DatasetUpdate(decode(kind, bag)?),
            K::DatasetDelete => OperationCall::DatasetDelete(decode(kind, bag)?),
            K::ColumnsList => OperationCall::ColumnsList(decode(kind, bag)?),
            K::QueryCreate => {
                let raw: RawQueryCreateArgs = decode(kind, bag)?;
                let query =
                    ValidatedQuery::from_value(raw.query).map_err(DispatchError::Validation)?;
                OperationCall::QueryCreate(QueryCreateArgs {
                    dataset_slug: raw.dataset_slug,
                    query,
                })
            }
            K::QueryGet => OperationCall::QueryGet(decode(kind, bag)?),
            K::QueryResultCreate => OperationCall::QueryResultCreate(decode(kind, bag)?),
            K::QueryResultGet => OperationCall::QueryResultGet(decode(kind, bag)?),
            K::DatasetDefinitionsList => OperationCall::DatasetDefinitionsList(decode(kind, bag)?),
            K::EventCreate => OperationCall::EventCreate(decode(kind, bag)?),
            K::EventsBatchCreate => OperationCall::EventsBatchCreate(decode(kind, bag)?),
            K::BoardsList => OperationCall::BoardsList,
            K::BoardGet => OperationCall::BoardGet(decode(kind, bag)?),
            K::BoardCreate => OperationCall::BoardCreate(decode(kind, bag)?),
            K::BoardUpdate => OperationCall::BoardUpdate(decode(kind, bag)?),
            K::BoardDelete => OperationCall::BoardDelete(decode(kind, bag)?),
            K::MarkersList => {
                let args: DatasetArgs = decode(kind, bag)?;
                OperationCall::MarkersList {
                    scope: DatasetScope::from_slug(&args.dataset_slug),
                }
            }
            K::MarkerGet => {
                let args: MarkerIdArgs = decode(kind, bag)?;
                OperationCall::MarkerGet {
                    scope: DatasetScope::from_slug(&args.dataset_slug),
                    marker_id: args.marker_id,
                }
            }
            K::MarkerCreate => {
                let args: MarkerCreateArgs = decode(kind, bag)?;
                OperationCall::MarkerCreate {
                    scope: DatasetScope::from_slug(&args.dataset_slug),
                    body: args.body,
                }
            }
            K::MarkerUpdate => {
                let args: MarkerUpdateArgs = decode(kind, bag)?;
                OperationCall::MarkerUpdate {
                    scope: DatasetScope::from_slug(&args.dataset_slug),
                    marker_id: args.marker_id,
                    body: args.body,
                }
            }
            K::MarkerDelete => {
                let args: MarkerIdArgs = decode(kind, bag)?;
                OperationCall::MarkerDelete {
                    scope: DatasetScope::from_slug(&args.dataset_slug),
                    marker_id: args.marker_id,
                }
            }
            K::SlosList => OperationCall::SlosList(decode(kind, bag)?),
            K::SloGet => OperationCall::SloGet(decode(kind, bag)?),
            K::SloCreate => OperationCall::SloCreate(decode(kind, without_inline_dataset(bag))?),
            K::SloUpdate => OperationCall::SloUpdate(decode(kind, bag)?),
            K::SloDelete => OperationCall::SloDelete(decode(kind, bag)?),
            K::TriggersList => OperationCall::TriggersList(decode(kind, bag)?),
            K::TriggerGet => OperationCall::TriggerGet(decode(kind, bag)?),
            K::TriggerCreate => {
                let (mut args, query): (TriggerCreateArgs, _) = decode_trigger(kind, bag)?;
                args.body.query = query;
                OperationCall::TriggerCreate(args)
            }
            K::TriggerUpdate => {
                let (mut args, query): (TriggerUpdateArgs, _) = decode_trigger(kind, bag)?;
                args.body.query = query;
                OperationCall::TriggerUpdate(args)
            }
            K::TriggerDelete => OperationCall::TriggerDelete(decode(kind, bag)?),
        };

        Ok(call)
    }

    /// Query carried by this call, if any
    pub fn query(&self) -> Option<&QuerySpec> {
        match self {
            OperationCall::QueryCreate(args) => Some(args.query.spec()),
            OperationCall::TriggerCreate(args) => {
                args.body.query.as_ref().map(ValidatedQuery::spec)
            }
            OperationCall::TriggerUpdate(args) => {
                args.body.query.as_ref().map(ValidatedQuery::spec)
            }
            _ => None,
        }
    }
}
