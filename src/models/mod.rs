//! # Domain Models
//!
//! Tour and user declarations: deserialization targets for request bodies,
//! the validation rules attached to each field, and construction of the
//! stored documents with their declared defaults. Validation collects every
//! violation in one pass so the error layer can report them all together.

pub mod tour;
pub mod user;

pub use tour::{TourDraft, DIFFICULTIES};
pub use user::{changed_password_after, LoginRequest, SignupDraft, ROLES};
