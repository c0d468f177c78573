//! Fetched bundles and assembled view models.
//!
//! Bundles are the raw products of the fan-out stages (resource plus its
//! per-student sub-state, labelled with the owning course). The view models
//! below them are what the pages render; they serialize for any frontend
//! that wants them as JSON.

use chrono::{DateTime, Utc};
use serde::Serialize;

use client::models::{
    Announcement, Assignment, DerivedStatus, Enrollment, Material, Quiz, QuizAttempt, Submission,
};

/// An assignment with the student's submission for it, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentBundle {
    pub course_id: i64,
    pub course_title: String,
    pub assignment: Assignment,
    pub submission: Option<Submission>,
}

/// A quiz with the student's attempts at it.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizBundle {
    pub course_id: i64,
    pub course_title: String,
    pub quiz: Quiz,
    pub attempts: Vec<QuizAttempt>,
}

/// One row of the assignments page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentOverview {
    pub id: i64,
    pub course_id: i64,
    pub course_title: String,
    pub title: String,
    pub due_date: Option<DateTime<Utc>>,
    pub max_points: f64,
    pub status: DerivedStatus,
    pub grade: Option<f64>,
    pub feedback: Option<String>,
}

/// The best completed attempt's score, echoed on a quiz row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestScore {
    pub score: f64,
    pub max_score: f64,
    pub percentage: f64,
}

/// One row of the quizzes page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizOverview {
    pub id: i64,
    pub course_id: i64,
    pub course_title: String,
    pub title: String,
    pub time_limit_minutes: u32,
    pub max_attempts: u32,
    pub available_until: Option<DateTime<Utc>>,
    pub status: DerivedStatus,
    pub attempt_count: usize,
    pub best_score: Option<BestScore>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GradableKind {
    Assignment,
    Quiz,
}

impl std::fmt::Display for GradableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GradableKind::Assignment => write!(f, "assignment"),
            GradableKind::Quiz => write!(f, "quiz"),
        }
    }
}

/// Deadline row shared by assignments and quizzes on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradableItem {
    pub kind: GradableKind,
    pub id: i64,
    pub course_id: i64,
    pub course_title: String,
    pub title: String,
    pub due_at: Option<DateTime<Utc>>,
    pub max_score: Option<f64>,
}

impl GradableItem {
    pub fn from_assignment(course_title: &str, assignment: &Assignment) -> Self {
        Self {
            kind: GradableKind::Assignment,
            id: assignment.id,
            course_id: assignment.course_id,
            course_title: course_title.to_string(),
            title: assignment.title.clone(),
            due_at: assignment.due_date,
            max_score: Some(assignment.max_points),
        }
    }

    /// A quiz's deadline is the end of its availability window; its score
    /// ceiling is per attempt and not known up front.
    pub fn from_quiz(course_title: &str, quiz: &Quiz) -> Self {
        Self {
            kind: GradableKind::Quiz,
            id: quiz.id,
            course_id: quiz.course_id,
            course_title: course_title.to_string(),
            title: quiz.title.clone(),
            due_at: quiz.available_until,
            max_score: None,
        }
    }
}

/// Attendance totals of the current student, all sections combined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceSummary {
    pub total_classes: usize,
    pub attended: usize,
    pub percentage: f64,
}

/// Everything the dashboard landing page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub course_count: usize,
    pub deadlines: Vec<GradableItem>,
    pub announcements: Vec<Announcement>,
    /// `None` when attendance records could not be loaded, as opposed to a
    /// summary over zero records.
    pub attendance: Option<AttendanceSummary>,
}

/// An assignment that has received a grade, as listed on the grades page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradedAssignment {
    pub title: String,
    pub max_points: f64,
    pub grade: f64,
    pub percentage: f64,
}

/// The best completed attempt at one quiz, as listed on the grades page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizResult {
    pub quiz_title: String,
    pub score: f64,
    pub max_score: f64,
    pub percentage: f64,
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Per-course section of the grades page. Courses with no graded work keep
/// an entry with empty lists and no overall percentage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseGradeReport {
    pub course_id: i64,
    pub course_title: String,
    pub course_code: String,
    pub assignments: Vec<GradedAssignment>,
    pub quizzes: Vec<QuizResult>,
    pub overall_percentage: Option<f64>,
}

/// One card of the course catalog page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CourseOverview {
    pub enrollment: Enrollment,
    pub materials: Vec<Material>,
}

/// One filter tab over a status-bearing row list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusFacet {
    All,
    Status(DerivedStatus),
}

impl std::fmt::Display for StatusFacet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFacet::All => write!(f, "all"),
            StatusFacet::Status(status) => write!(f, "{}", status),
        }
    }
}

/// Filter tabs of the assignments page.
pub const ASSIGNMENT_FACETS: [StatusFacet; 5] = [
    StatusFacet::All,
    StatusFacet::Status(DerivedStatus::Pending),
    StatusFacet::Status(DerivedStatus::Submitted),
    StatusFacet::Status(DerivedStatus::Graded),
    StatusFacet::Status(DerivedStatus::Late),
];

/// Filter tabs of the quizzes page.
pub const QUIZ_FACETS: [StatusFacet; 6] = [
    StatusFacet::All,
    StatusFacet::Status(DerivedStatus::Available),
    StatusFacet::Status(DerivedStatus::InProgress),
    StatusFacet::Status(DerivedStatus::Completed),
    StatusFacet::Status(DerivedStatus::Expired),
    StatusFacet::Status(DerivedStatus::MaxAttempts),
];
