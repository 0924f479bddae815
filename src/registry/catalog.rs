//! The fixed catalog of callable operations

use std::fmt;

use super::types::{FieldDef, FieldType, InputShape};

/// Every operation the gateway can dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Auth,
    DatasetsList,
    DatasetGet,
    DatasetCreate,
    DatasetUpdate,
    DatasetDelete,
    ColumnsList,
    QueryCreate,
    QueryGet,
    QueryResultCreate,
    QueryResultGet,
    DatasetDefinitionsList,
    EventCreate,
    EventsBatchCreate,
    BoardsList,
    BoardGet,
    BoardCreate,
    BoardUpdate,
    BoardDelete,
    MarkersList,
    MarkerGet,
    MarkerCreate,
    MarkerUpdate,
    MarkerDelete,
    SlosList,
    SloGet,
    SloCreate,
    SloUpdate,
    SloDelete,
    TriggersList,
    TriggerGet,
    TriggerCreate,
    TriggerUpdate,
    TriggerDelete,
}

impl OperationKind {
    /// Registration order
    pub const ALL: [OperationKind; 34] = [
        OperationKind::Auth,
        OperationKind::DatasetsList,
        OperationKind::DatasetGet,
        OperationKind::DatasetCreate,
        OperationKind::DatasetUpdate,
        OperationKind::DatasetDelete,
        OperationKind::ColumnsList,
        OperationKind::QueryCreate,
        OperationKind::QueryGet,
        OperationKind::QueryResultCreate,
        OperationKind::QueryResultGet,
        OperationKind::DatasetDefinitionsList,
        OperationKind::EventCreate,
        OperationKind::EventsBatchCreate,
        OperationKind::BoardsList,
        OperationKind::BoardGet,
        OperationKind::BoardCreate,
        OperationKind::BoardUpdate,
        OperationKind::BoardDelete,
        OperationKind::MarkersList,
        OperationKind::MarkerGet,
        OperationKind::MarkerCreate,
        OperationKind::MarkerUpdate,
        OperationKind::MarkerDelete,
        OperationKind::SlosList,
        OperationKind::SloGet,
        OperationKind::SloCreate,
        OperationKind::SloUpdate,
        OperationKind::SloDelete,
        OperationKind::TriggersList,
        OperationKind::TriggerGet,
        OperationKind::TriggerCreate,
        OperationKind::TriggerUpdate,
        OperationKind::TriggerDelete,
    ];

    /// Name the caller uses to invoke the operation
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Auth => "honeycomb_auth",
            OperationKind::DatasetsList => "honeycomb_datasets_list",
            OperationKind::DatasetGet => "honeycomb_dataset_get",
            OperationKind::DatasetCreate => "honeycomb_datasets_create",
            OperationKind::DatasetUpdate => "honeycomb_datasets_update",
            OperationKind::DatasetDelete => "honeycomb_dataset_delete",
            OperationKind::ColumnsList => "honeycomb_columns_list",
            OperationKind::QueryCreate => "honeycomb_query_create",
            OperationKind::QueryGet => "honeycomb_query_get",
            OperationKind::QueryResultCreate => "honeycomb_query_result_create",
            OperationKind::QueryResultGet => "honeycomb_query_result_get",
            OperationKind::DatasetDefinitionsList => "honeycomb_dataset_definitions_list",
            OperationKind::EventCreate => "honeycomb_event_create",
            OperationKind::EventsBatchCreate => "honeycomb_events_batch_create",
            OperationKind::BoardsList => "honeycomb_boards_list",
            OperationKind::BoardGet => "honeycomb_board_get",
            OperationKind::BoardCreate => "honeycomb_board_create",
            OperationKind::BoardUpdate => "honeycomb_board_update",
            OperationKind::BoardDelete => "honeycomb_board_delete",
            OperationKind::MarkersList => "honeycomb_markers_list",
            OperationKind::MarkerGet => "honeycomb_marker_get",
            OperationKind::MarkerCreate => "honeycomb_marker_create",
            OperationKind::MarkerUpdate => "honeycomb_marker_update",
            OperationKind::MarkerDelete => "honeycomb_marker_delete",
            OperationKind::SlosList => "honeycomb_slos_list",
            OperationKind::SloGet => "honeycomb_slo_get",
            OperationKind::SloCreate => "honeycomb_slo_create",
            OperationKind::SloUpdate => "honeycomb_slo_update",
            OperationKind::SloDelete => "honeycomb_slo_delete",
            OperationKind::TriggersList => "honeycomb_triggers_list",
            OperationKind::TriggerGet => "honeycomb_trigger_get",
            OperationKind::TriggerCreate => "honeycomb_trigger_create",
            OperationKind::TriggerUpdate => "honeycomb_trigger_update",
            OperationKind::TriggerDelete => "honeycomb_trigger_delete",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    pub fn description(&self) -> &'static str {
        match self {
            OperationKind::Auth => "Validate the API key and return the team and environment it belongs to",
            OperationKind::DatasetsList => "List all datasets in the environment",
            OperationKind::DatasetGet => "Get a single dataset by slug",
            OperationKind::DatasetCreate => "Create a dataset",
            OperationKind::DatasetUpdate => "Update a dataset's name, description or JSON expansion depth",
            OperationKind::DatasetDelete => "Delete a dataset",
            OperationKind::ColumnsList => "List the columns of a dataset, optionally filtered by key name",
            OperationKind::QueryCreate => "Create a query specification in a dataset and return its id",
            OperationKind::QueryGet => "Get a previously created query specification",
            OperationKind::QueryResultCreate => "Run a saved query; poll the returned result id until complete",
            OperationKind::QueryResultGet => "Get a query result; check the complete flag and poll again if false",
            OperationKind::DatasetDefinitionsList => "List a dataset's column definitions (paginated, sortable)",
            OperationKind::EventCreate => "Send a single event to a dataset",
            OperationKind::EventsBatchCreate => "Send a batch of events to a dataset",
            OperationKind::BoardsList => "List all boards",
            OperationKind::BoardGet => "Get a board by id",
            OperationKind::BoardCreate => "Create a board",
            OperationKind::BoardUpdate => "Update a board",
            OperationKind::BoardDelete => "Delete a board",
            OperationKind::MarkersList => "List markers for a dataset, or for every dataset with 'all'",
            OperationKind::MarkerGet => "Get a marker by id",
            OperationKind::MarkerCreate => "Create a marker on a dataset's timeline, or environment-wide with 'all'",
            OperationKind::MarkerUpdate => "Update a marker",
            OperationKind::MarkerDelete => "Delete a marker",
            OperationKind::SlosList => "List the SLOs defined on a dataset",
            OperationKind::SloGet => "Get an SLO by id",
            OperationKind::SloCreate => "Create an SLO over a service-level indicator column",
            OperationKind::SloUpdate => "Update an SLO",
            OperationKind::SloDelete => "Delete an SLO",
            OperationKind::TriggersList => "List the triggers defined on a dataset",
            OperationKind::TriggerGet => "Get a trigger by id",
            OperationKind::TriggerCreate => "Create a trigger that evaluates a query against a threshold on a schedule",
            OperationKind::TriggerUpdate => "Update a trigger",
            OperationKind::TriggerDelete => "Delete a trigger",
        }
    }

    /// Declared arguments for this operation
    pub fn input_shape(&self) -> InputShape {
        use OperationKind::*;

        match self {
            Auth | DatasetsList | BoardsList => InputShape::new(),
            DatasetGet | DatasetDelete => InputShape::new().with(dataset_slug()),
            DatasetCreate => dataset_body(
                InputShape::new().with(FieldDef::required_string("name", "Dataset name")),
            ),
            DatasetUpdate => dataset_body(
                InputShape::new()
                    .with(dataset_slug())
                    .with(FieldDef::optional_string("name", "Dataset name")),
            ),
            ColumnsList => InputShape::new()
                .with(dataset_slug())
                .with(FieldDef::optional_string("key_name", "Only return the column with this name")),
            QueryCreate => InputShape::new()
                .with(dataset_slug())
                .with(FieldDef::required("query", FieldType::Query, "Query specification")),
            QueryGet => InputShape::new()
                .with(dataset_slug())
                .with(FieldDef::required_string("queryId", "Query id")),
            QueryResultCreate => InputShape::new()
                .with(dataset_slug())
                .with(FieldDef::required_string("queryId", "Id of the saved query to run"))
                .with(FieldDef::optional_bool(
                    "disable_series",
                    "Suppress time-series data (default false)",
                ))
                .with(FieldDef::optional_bool(
                    "disable_total_by_aggregate",
                    "Suppress totals per aggregate (default true)",
                ))
                .with(FieldDef::optional_int(
                    "limit",
                    "Maximum result groups (default 10000)",
                )),
            QueryResultGet => InputShape::new()
                .with(dataset_slug())
                .with(FieldDef::required_string("queryResultId", "Query result id")),
            DatasetDefinitionsList => InputShape::new()
                .with(dataset_slug())
                .with(FieldDef::optional_int("page", "Page number, starting at 1"))
                .with(FieldDef::optional_int("page_size", "Entries per page"))
                .with(FieldDef::optional_string("sort_by", "Field to sort by"))
                .with(FieldDef::optional(
                    "sort_order",
                    FieldType::Enum(&["asc", "desc"]),
                    "Sort direction",
                )),
            EventCreate => InputShape::new().with(dataset_slug()).with(FieldDef::required(
                "event",
                FieldType::Object,
                "Event fields, sent as-is",
            )),
            EventsBatchCreate => InputShape::new().with(dataset_slug()).with(FieldDef::required(
                "events",
                FieldType::Array(Box::new(FieldType::Object)),
                "Events, sent as-is",
            )),
            BoardGet | BoardDelete => InputShape::new().with(board_id()),
            BoardCreate => board_body(
                InputShape::new().with(FieldDef::required_string("name", "Board name")),
            ),
            BoardUpdate => board_body(
                InputShape::new()
                    .with(board_id())
                    .with(FieldDef::optional_string("name", "Board name")),
            ),
            MarkersList => InputShape::new().with(marker_scope()),
            MarkerGet | MarkerDelete => InputShape::new().with(marker_scope()).with(marker_id()),
            MarkerCreate => marker_times(
                InputShape::new()
                    .with(marker_scope())
                    .with(FieldDef::required_string("message", "Marker message"))
                    .with(FieldDef::required_string("type", "Marker type, e.g. deploy"))
                    .with(FieldDef::required(
                        "start_time",
                        FieldType::Timestamp,
                        "Start time (unix seconds or RFC 3339)",
                    )),
            ),
            MarkerUpdate => marker_times(
                InputShape::new()
                    .with(marker_scope())
                    .with(marker_id())
                    .with(FieldDef::optional_string("message", "Marker message"))
                    .with(FieldDef::optional_string("type", "Marker type, e.g. deploy"))
                    .with(FieldDef::optional(
                        "start_time",
                        FieldType::Timestamp,
                        "Start time (unix seconds or RFC 3339)",
                    )),
            ),
            SlosList => InputShape::new().with(dataset_slug()),
            SloGet | SloDelete => InputShape::new().with(slo_id()),
            SloCreate => InputShape::new()
                .with(dataset_slug())
                .with(FieldDef::required_string("name", "SLO name"))
                .with(FieldDef::optional_string("description", "SLO description"))
                .with(FieldDef::required("sli", sli_type(), "Service-level indicator column"))
                .with(FieldDef::required_int(
                    "target_per_million",
                    "Target success rate per million events",
                ))
                .with(FieldDef::required_int("time_period_days", "Rolling window in days")),
            SloUpdate => InputShape::new()
                .with(slo_id())
                .with(FieldDef::optional_string("name", "SLO name"))
                .with(FieldDef::optional_string("description", "SLO description"))
                .with(FieldDef::optional("sli", sli_type(), "Service-level indicator column"))
                .with(FieldDef::optional_int(
                    "target_per_million",
                    "Target success rate per million events",
                ))
                .with(FieldDef::optional_int("time_period_days", "Rolling window in days")),
            TriggersList => InputShape::new().with(dataset_slug()),
            TriggerGet | TriggerDelete => InputShape::new().with(dataset_slug()).with(trigger_id()),
            TriggerCreate => trigger_body(
                InputShape::new()
                    .with(dataset_slug())
                    .with(FieldDef::required_string("name", "Trigger name")),
                true,
            ),
            TriggerUpdate => trigger_body(
                InputShape::new()
                    .with(dataset_slug())
                    .with(trigger_id())
                    .with(FieldDef::optional_string("name", "Trigger name")),
                false,
            ),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn dataset_slug() -> FieldDef {
    FieldDef::required_string("datasetSlug", "Dataset slug")
}

fn board_id() -> FieldDef {
    FieldDef::required_string("boardId", "Board id")
}

fn marker_id() -> FieldDef {
    FieldDef::required_string("markerId", "Marker id")
}

fn slo_id() -> FieldDef {
    FieldDef::required_string("sloId", "SLO id")
}

fn trigger_id() -> FieldDef {
    FieldDef::required_string("triggerId", "Trigger id")
}

fn marker_scope() -> FieldDef {
    FieldDef::required_string(
        "datasetSlug",
        "Dataset slug, or 'all' for environment-wide markers",
    )
}

fn sli_type() -> FieldType {
    FieldType::Record(vec![FieldDef::required_string(
        "alias",
        "Derived column that evaluates to true for good events",
    )])
}

fn dataset_body(shape: InputShape) -> InputShape {
    shape
        .with(FieldDef::optional_string("description", "Dataset description"))
        .with(FieldDef::optional_int(
            "expand_json_depth",
            "Depth to which nested JSON is unpacked into columns (0-10)",
        ))
}

fn board_body(shape: InputShape) -> InputShape {
    shape
        .with(FieldDef::optional_string("description", "Board description"))
        .with(FieldDef::optional(
            "column_layout",
            FieldType::Enum(&["multi", "single"]),
            "Board layout",
        ))
        .with(FieldDef::optional(
            "style",
            FieldType::Enum(&["list", "visual"]),
            "Board style",
        ))
        .with(FieldDef::optional(
            "query_ids",
            FieldType::Array(Box::new(FieldType::String)),
            "Saved query ids to place on the board",
        ))
}

fn marker_times(shape: InputShape) -> InputShape {
    shape
        .with(FieldDef::optional(
            "end_time",
            FieldType::Timestamp,
            "End time (unix seconds or RFC 3339)",
        ))
        .with(FieldDef::optional_string("url", "Link shown with the marker"))
        .with(FieldDef::optional_string("color", "Hex display color"))
}

fn trigger_body(shape: InputShape, create: bool) -> InputShape {
    let threshold = FieldType::Record(vec![
        FieldDef::required("op", FieldType::Enum(&[">", ">=", "<", "<="]), ""),
        FieldDef::required("value", FieldType::Number, ""),
        FieldDef::optional_int("exceeded_limit", "Consecutive breaches before alerting"),
    ]);
    let threshold = if create {
        FieldDef::required("threshold", threshold, "Alert threshold")
    } else {
        FieldDef::optional("threshold", threshold, "Alert threshold")
    };
    let window = FieldType::Record(vec![FieldDef::required(
        "window",
        FieldType::Record(vec![
            FieldDef::required(
                "days_of_week",
                FieldType::Array(Box::new(FieldType::String)),
                "",
            ),
            FieldDef::required_string("start_time", "HH:MM"),
            FieldDef::required_string("end_time", "HH:MM"),
        ]),
        "",
    )]);

    shape
        .with(FieldDef::optional_string("description", "Trigger description"))
        .with(FieldDef::optional_bool("disabled", "Create or leave the trigger disabled"))
        .with(FieldDef::optional_string(
            "query_id",
            "Saved query to evaluate (alternative to an inline query)",
        ))
        .with(FieldDef::optional("query", FieldType::Query, "Inline query to evaluate"))
        .with(FieldDef::optional_int("frequency", "Evaluation interval in seconds"))
        .with(threshold)
        .with(FieldDef::optional(
            "alert_type",
            FieldType::Enum(&["on_change", "on_true"]),
            "When to notify",
        ))
        .with(FieldDef::optional(
            "recipients",
            FieldType::Array(Box::new(FieldType::Object)),
            "Notification recipients",
        ))
        .with(FieldDef::optional(
            "evaluation_schedule_type",
            FieldType::Enum(&["frequency", "window"]),
            "Evaluate continuously or only inside a window",
        ))
        .with(FieldDef::optional(
            "evaluation_schedule",
            window,
            "Evaluation window",
        ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_unique_and_resolvable() {
        let names: HashSet<_> = OperationKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names.len(), OperationKind::ALL.len());

        for kind in OperationKind::ALL {
            assert_eq!(OperationKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(OperationKind::from_name("honeycomb_nope"), None);
    }

    #[test]
    fn test_required_fields_match_catalog() {
        let required = |kind: OperationKind| -> Vec<&'static str> {
            kind.input_shape().required_fields().collect()
        };

        assert!(required(OperationKind::Auth).is_empty());
        assert_eq!(required(OperationKind::QueryCreate), vec!["datasetSlug", "query"]);
        assert_eq!(
            required(OperationKind::MarkerCreate),
            vec!["datasetSlug", "message", "type", "start_time"]
        );
        assert_eq!(
            required(OperationKind::SloCreate),
            vec!["datasetSlug", "name", "sli", "target_per_million", "time_period_days"]
        );
        assert_eq!(
            required(OperationKind::TriggerCreate),
            vec!["datasetSlug", "name", "threshold"]
        );
        assert_eq!(required(OperationKind::TriggerUpdate), vec!["datasetSlug", "triggerId"]);
    }

    #[test]
    fn test_field_names_unique_per_operation() {
        for kind in OperationKind::ALL {
            let shape = kind.input_shape();
            let names: HashSet<_> = shape.fields().iter().map(|f| f.name).collect();
            assert_eq!(names.len(), shape.fields().len(), "{}", kind);
        }
    }

    #[test]
    fn test_descriptions_present() {
        for kind in OperationKind::ALL {
            assert!(!kind.description().is_empty());
        }
    }
}
