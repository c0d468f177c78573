//! Client-side aggregation over the LMS REST API.
//!
//! The backend exposes flat per-course resources; the student pages need
//! cross-course views (all assignments with their statuses, all quizzes with
//! best scores, a dashboard of deadlines). This crate fans read requests out
//! per enrolled course with bounded concurrency, isolates per-course
//! failures, derives item statuses against a caller-supplied clock and
//! assembles the sorted, facetable view models the pages render.
//!
//! Layering, bottom up:
//! - [`fanout`]: bounded concurrent fetch over independent keys.
//! - [`resolver`]: who the student is and what they are enrolled in.
//! - [`status`]: pure status/best-attempt derivation.
//! - [`assembler`]: pure view-model assembly (rows, facets, sorting).
//! - [`service`]: the page-level compositions callers actually invoke.

pub mod assembler;
pub mod error;
pub mod fanout;
pub mod resolver;
pub mod service;
pub mod status;
pub mod types;

pub use error::{AggregateError, AggregateResult};
pub use fanout::{fan_out, FanOutOptions};
pub use service::StudentService;
