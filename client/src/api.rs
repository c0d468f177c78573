//! The HTTP client proper.
//!
//! One [`ApiClient`] per program, explicitly constructed and shared by
//! reference; callers inject it instead of reaching for a global. All
//! endpoint methods decode via [`ApiClient::decode`], which reads the body
//! as text first so failed decodes and error statuses can both report what
//! the backend actually sent.

use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use common::config;

use crate::error::{ApiError, ApiResult};
use crate::models::{
    Announcement, Assignment, AttendanceRecord, Enrollment, GradeSubmissionRequest, Material, Me,
    Quiz, QuizAttempt, Submission,
};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Builds a client against `base_url`. The bearer `token`, when present,
    /// is attached to every request.
    pub fn new(base_url: Url, token: Option<String>, timeout: Duration) -> ApiResult<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    /// Builds a client from the global configuration. An empty `API_TOKEN`
    /// means unauthenticated.
    pub fn from_config() -> ApiResult<Self> {
        let base_url = Url::parse(&config::api_base_url())?;
        let token = Some(config::api_token()).filter(|t| !t.is_empty());
        let timeout = Duration::from_secs(config::http_timeout_seconds());
        Self::new(base_url, token, timeout)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // --- Endpoint methods ---

    pub async fn me(&self) -> ApiResult<Me> {
        self.get_json("/auth/me").await
    }

    pub async fn enrollments(&self, user_id: i64) -> ApiResult<Vec<Enrollment>> {
        self.get_json(&format!("/users/{user_id}/enrollments"))
            .await
    }

    pub async fn course_assignments(&self, course_id: i64) -> ApiResult<Vec<Assignment>> {
        self.get_json(&format!("/assignments/course/{course_id}"))
            .await
    }

    /// The student's submission for one assignment. The backend answers 404
    /// when nothing has been handed in yet; that is a valid `None`, not an
    /// error.
    pub async fn my_submission(&self, assignment_id: i64) -> ApiResult<Option<Submission>> {
        let path = format!("/assignments/{assignment_id}/my-submission");
        match self.get_json(&path).await {
            Ok(submission) => Ok(Some(submission)),
            Err(err) if err.is_status(StatusCode::NOT_FOUND) => Ok(None),
            Err(err) => Err(err),
        }
    }

    pub async fn course_quizzes(&self, course_id: i64) -> ApiResult<Vec<Quiz>> {
        self.get_json(&format!("/quizzes/course/{course_id}")).await
    }

    pub async fn my_attempts(&self, quiz_id: i64) -> ApiResult<Vec<QuizAttempt>> {
        self.get_json(&format!("/quizzes/{quiz_id}/my-attempts"))
            .await
    }

    pub async fn course_announcements(&self, course_id: i64) -> ApiResult<Vec<Announcement>> {
        self.get_json(&format!("/announcements/course/{course_id}"))
            .await
    }

    pub async fn course_materials(&self, course_id: i64) -> ApiResult<Vec<Material>> {
        self.get_json(&format!("/courses/{course_id}/materials"))
            .await
    }

    pub async fn my_attendance(&self) -> ApiResult<Vec<AttendanceRecord>> {
        self.get_json("/attendance/my-records").await
    }

    /// Grades a submission and returns the updated record. Failures carry
    /// the backend's `detail` text for inline display.
    pub async fn grade_submission(
        &self,
        submission_id: i64,
        req: &GradeSubmissionRequest,
    ) -> ApiResult<Submission> {
        self.post_json(&format!("/assignments/submissions/{submission_id}/grade"), req)
            .await
    }

    // --- Request plumbing ---

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let url = self.base_url.join(path)?;
        tracing::debug!(method = "GET", %url, "sending API request");
        let mut request = self.http.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        Self::decode(path, response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.base_url.join(path)?;
        tracing::debug!(method = "POST", %url, "sending API request");
        let mut request = self.http.post(url).json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        Self::decode(path, response).await
    }

    async fn decode<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> ApiResult<T> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status,
                detail: extract_detail(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

/// Pulls the message out of a FastAPI-style `{"detail": "..."}` error body,
/// falling back to the raw body text.
fn extract_detail(body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(detail) = v.get("detail").and_then(|d| d.as_str()) {
            return detail.to_string();
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no detail provided".to_string()
    } else {
        trimmed.to_string()
    }
}
