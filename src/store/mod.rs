//! # In-Memory Document Store
//!
//! The persistence collaborator the query pipeline composes against:
//! collections of JSON documents with unique-field constraints, optimistic
//! version bookkeeping and always-hidden fields, plus the [`Query`] handle
//! that executes composed scans.

pub mod collection;
pub mod errors;
pub mod matcher;
pub mod query;

pub use collection::Collection;
pub use errors::{StoreError, StoreResult};
pub use query::Query;
