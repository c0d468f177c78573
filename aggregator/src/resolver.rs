//! Identity root of every page composition.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use client::models::Enrollment;
use client::ApiClient;

use crate::error::{AggregateError, AggregateResult};

/// Resolves who the student is and which sections they are enrolled in.
///
/// Failures here are root failures: no page can render without them, so
/// they propagate instead of degrading. Zero enrollments is a valid `Ok`
/// outcome, distinct from any error.
#[derive(Debug, Clone)]
pub struct EnrollmentResolver {
    client: Arc<ApiClient>,
}

impl EnrollmentResolver {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub async fn resolve(&self, cancel: &CancellationToken) -> AggregateResult<Vec<Enrollment>> {
        let me = tokio::select! {
            res = self.client.me() => res?,
            () = cancel.cancelled() => return Err(AggregateError::Cancelled),
        };
        tracing::debug!(user_id = me.id, "resolving enrollments");

        let enrollments = tokio::select! {
            res = self.client.enrollments(me.id) => res?,
            () = cancel.cancelled() => return Err(AggregateError::Cancelled),
        };
        Ok(enrollments)
    }
}
