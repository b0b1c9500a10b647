//! # Query Modifier Pipeline
//!
//! Turns raw request parameters into a progressively narrowed collection
//! query: filtering, ordering, field selection and pagination, applied in a
//! fixed sequence over the [`Queryable`] seam. The pipeline composes a query;
//! it never executes one.

pub mod features;
pub mod predicate;
pub mod request;

pub use features::{
    Projection, QueryFeatures, Queryable, SortKey, CREATED_AT_FIELD, DEFAULT_LIMIT, DEFAULT_PAGE,
    VERSION_FIELD,
};
pub use predicate::{build_predicate, Predicate, RESERVED_KEYS};
pub use request::{ParamValue, RawQuery};
