//! Wire records for the LMS REST API.
//!
//! Shapes mirror the backend's JSON responses one-to-one; anything computed
//! (derived statuses, best scores, facet counts) lives in the `aggregator`
//! crate instead. Ids are `i64`, timestamps RFC 3339 UTC, optional deadlines
//! `Option<DateTime<Utc>>`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The authenticated user, from `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Me {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

/// One enrolled section, flattened with its course and teacher fields the way
/// the backend's enrollment listing returns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i64,
    pub course_id: i64,
    pub course_title: String,
    pub course_code: String,
    pub course_description: Option<String>,
    pub section_id: i64,
    pub section_name: String,
    pub teacher_name: String,
    pub teacher_email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub max_points: f64,
}

/// The student's latest submission for one assignment. The backend keeps at
/// most one per (assignment, student) and answers 404 when none exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub assignment_id: i64,
    pub student_id: i64,
    pub content: String,
    pub submitted_at: DateTime<Utc>,
    pub grade: Option<f64>,
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub time_limit_minutes: u32,
    pub max_attempts: u32,
    pub passing_score: f64,
    pub available_from: Option<DateTime<Utc>>,
    pub available_until: Option<DateTime<Utc>>,
    pub show_correct_answers: bool,
}

/// One attempt at a quiz. `submitted_at == None` means still in progress;
/// the backend allows at most one in-progress attempt per (quiz, student).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: i64,
    pub quiz_id: i64,
    pub student_id: i64,
    pub attempt_number: u32,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub score: f64,
    pub max_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub creator_name: String,
    pub is_pinned: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub file_path: String,
    pub uploaded_at: DateTime<Utc>,
}

/// One attendance record of the current student, joined with section and
/// course labels the way `GET /attendance/my-records` returns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: i64,
    pub date: DateTime<Utc>,
    pub status: AttendanceStatus,
    pub section_name: String,
    pub course_title: String,
    pub course_code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
}

/// Body of `POST /assignments/submissions/{id}/grade`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeSubmissionRequest {
    pub grade: f64,
    pub feedback: Option<String>,
}

/// Status of an assignment or quiz as shown to the student. Never sent by
/// the backend; computed from the records above against the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedStatus {
    /// Assignment open, nothing handed in yet
    Pending,
    /// Handed in on time, not yet graded
    Submitted,
    /// Past due without a submission, or handed in after the deadline
    Late,
    /// Submission received a grade
    Graded,
    /// Quiz attempt started and not yet handed in
    InProgress,
    /// At least one attempt handed in
    Completed,
    /// Availability window elapsed without an open attempt
    Expired,
    /// Completed attempts used up the allowed maximum
    MaxAttempts,
    /// Quiz open for a fresh attempt
    Available,
}

impl std::fmt::Display for DerivedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status_str = match self {
            DerivedStatus::Pending => "pending",
            DerivedStatus::Submitted => "submitted",
            DerivedStatus::Late => "late",
            DerivedStatus::Graded => "graded",
            DerivedStatus::InProgress => "in_progress",
            DerivedStatus::Completed => "completed",
            DerivedStatus::Expired => "expired",
            DerivedStatus::MaxAttempts => "max_attempts",
            DerivedStatus::Available => "available",
        };
        write!(f, "{}", status_str)
    }
}
