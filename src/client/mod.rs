//! Remote client for the observability platform's REST API
//!
//! Translates each validated operation into exactly one HTTP request and
//! normalizes the response. No retries, no caching, no sessions: every
//! call is a single stateless exchange.

#[allow(clippy::module_inception)]
mod client;
mod errors;
mod request;
mod resources;
mod transport;

pub use client::RemoteClient;
pub use errors::{ClientError, ClientResult, TransportFailure};
pub use request::{DatasetScope, HttpMethod, RemoteRequest};
pub use resources::{
    AlertType, BoardBody, BoardQuery, DatasetBody, DatasetBound, EvaluationSchedule,
    EvaluationScheduleType, MarkerBody, MarkerTime, PageOptions, ScheduleWindow, SliRef, SloBody,
    SortOrder, ThresholdOp, TriggerBody, TriggerThreshold,
};
pub use transport::{HttpTransport, RawResponse, StubTransport, Transport, API_KEY_HEADER};
