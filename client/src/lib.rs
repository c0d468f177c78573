//! Typed HTTP client for the LMS REST backend.
//!
//! Every endpoint the student-facing pages read from gets a typed method on
//! [`ApiClient`]; responses deserialize into the records in [`models`].
//! Nothing in here derives state or aggregates across courses, that lives in
//! the `aggregator` crate.

pub mod api;
pub mod error;
pub mod models;

pub use api::ApiClient;
pub use error::{ApiError, ApiResult};
