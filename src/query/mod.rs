//! Query specification model
//!
//! Typed shape of an ad-hoc analytical query: calculations, filters,
//! breakdowns, orderings, time window and result-shaping flags.
//!
//! # Design Principles
//!
//! - The gateway shapes and forwards queries, it never evaluates them
//! - Consistency rules (orders referencing calculations, time window
//!   arbitration) belong to the remote API
//! - Queries go out as the caller wrote them; the typed model only checks them

mod result;
mod spec;

pub use result::{QueryResultOptions, QueryResultRequest};
pub use spec::{
    Calculation, CalculationOp, Filter, FilterCombination, FilterOp, Having, Order,
    OrderDirection, QueryShapeError, QuerySpec, ValidatedQuery,
};
