use client::ApiError;
use thiserror::Error;

/// Result type for aggregation operations
pub type AggregateResult<T> = Result<T, AggregateError>;

/// Errors that surface from a page-level aggregation.
///
/// Per-course failures never appear here; they are logged and contribute
/// empty sub-lists. An empty aggregate (`Ok(vec![])`) is a valid outcome,
/// distinct from both variants below.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// Identity or enrollment resolution failed; nothing can render.
    #[error(transparent)]
    Root(#[from] ApiError),

    /// The caller tore the view down before the aggregate settled.
    #[error("aggregation cancelled")]
    Cancelled,
}
