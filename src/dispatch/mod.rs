//! Operation dispatch
//!
//! Validates `(operation name, argument bag)` pairs, routes them to the
//! remote client and wraps every outcome, success or failure, in the same
//! content envelope.

mod errors;
mod handler;
mod request;
mod response;

pub use errors::{DispatchError, DispatchResult};
pub use handler::Dispatcher;
pub use request::{missing_fields, validate_arguments, OperationCall};
pub use response::{ContentEnvelope, ContentItem};
