//! Pure view-model assembly.
//!
//! Functions here turn fetched bundles into the rows, facets and summaries
//! the pages render. No I/O and no clock reads: `now` comes in as an
//! argument, so assembling the same bundles twice yields identical views.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use client::models::{Announcement, AttendanceRecord, AttendanceStatus, DerivedStatus, Enrollment};

use crate::status;
use crate::types::{
    AssignmentBundle, AssignmentOverview, AttendanceSummary, BestScore, CourseGradeReport,
    GradableItem, GradedAssignment, QuizBundle, QuizOverview, QuizResult, StatusFacet,
};

/// Rows that carry a derived status and can be counted and filtered by it.
pub trait StatusFaceted {
    fn status(&self) -> DerivedStatus;
}

/// Rows that sort by a possibly-absent deadline.
pub trait Deadlined {
    fn deadline(&self) -> Option<DateTime<Utc>>;
}

impl StatusFaceted for AssignmentOverview {
    fn status(&self) -> DerivedStatus {
        self.status
    }
}

impl StatusFaceted for QuizOverview {
    fn status(&self) -> DerivedStatus {
        self.status
    }
}

impl Deadlined for AssignmentOverview {
    fn deadline(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }
}

impl Deadlined for QuizOverview {
    fn deadline(&self) -> Option<DateTime<Utc>> {
        self.available_until
    }
}

impl Deadlined for GradableItem {
    fn deadline(&self) -> Option<DateTime<Utc>> {
        self.due_at
    }
}

/// Assignment rows with derived statuses, sorted by due date.
pub fn assignment_rows(bundles: &[AssignmentBundle], now: DateTime<Utc>) -> Vec<AssignmentOverview> {
    let mut rows: Vec<AssignmentOverview> = bundles
        .iter()
        .map(|b| AssignmentOverview {
            id: b.assignment.id,
            course_id: b.course_id,
            course_title: b.course_title.clone(),
            title: b.assignment.title.clone(),
            due_date: b.assignment.due_date,
            max_points: b.assignment.max_points,
            status: status::assignment_status(now, b.assignment.due_date, b.submission.as_ref()),
            grade: b.submission.as_ref().and_then(|s| s.grade),
            feedback: b.submission.as_ref().and_then(|s| s.feedback.clone()),
        })
        .collect();
    sort_by_deadline(&mut rows);
    rows
}

/// Quiz rows with derived statuses and best scores, sorted by window end.
pub fn quiz_rows(bundles: &[QuizBundle], now: DateTime<Utc>) -> Vec<QuizOverview> {
    let mut rows: Vec<QuizOverview> = bundles
        .iter()
        .map(|b| {
            let best_score = status::best_attempt(&b.attempts).map(|a| BestScore {
                score: a.score,
                max_score: a.max_score,
                percentage: percentage(a.score, a.max_score),
            });
            QuizOverview {
                id: b.quiz.id,
                course_id: b.course_id,
                course_title: b.course_title.clone(),
                title: b.quiz.title.clone(),
                time_limit_minutes: b.quiz.time_limit_minutes,
                max_attempts: b.quiz.max_attempts,
                available_until: b.quiz.available_until,
                status: status::quiz_status(now, b.quiz.available_until, &b.attempts, b.quiz.max_attempts),
                attempt_count: status::completed_attempts(&b.attempts),
                best_score,
            }
        })
        .collect();
    sort_by_deadline(&mut rows);
    rows
}

/// Badge counts for every facet tab, always over the unfiltered list.
pub fn facet_counts<R: StatusFaceted>(rows: &[R], facets: &[StatusFacet]) -> Vec<(StatusFacet, usize)> {
    facets
        .iter()
        .map(|facet| {
            let count = match facet {
                StatusFacet::All => rows.len(),
                StatusFacet::Status(status) => {
                    rows.iter().filter(|r| r.status() == *status).count()
                }
            };
            (*facet, count)
        })
        .collect()
}

/// The rows a selected facet tab displays. `All` is the identity filter.
pub fn apply_facet<R: StatusFaceted + Clone>(rows: &[R], facet: StatusFacet) -> Vec<R> {
    match facet {
        StatusFacet::All => rows.to_vec(),
        StatusFacet::Status(status) => rows
            .iter()
            .filter(|r| r.status() == status)
            .cloned()
            .collect(),
    }
}

/// Ascending by deadline; rows without one go last. Stable, so rows that
/// compare equal keep their incoming order.
pub fn sort_by_deadline<R: Deadlined>(rows: &mut [R]) {
    rows.sort_by(|a, b| match (a.deadline(), b.deadline()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Future-dated items only, soonest first, capped at `limit`. Undated items
/// never appear; nothing without a deadline can be upcoming.
pub fn upcoming_deadlines(
    items: &[GradableItem],
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<GradableItem> {
    let mut upcoming: Vec<GradableItem> = items
        .iter()
        .filter(|item| matches!(item.due_at, Some(at) if at > now))
        .cloned()
        .collect();
    sort_by_deadline(&mut upcoming);
    upcoming.truncate(limit);
    upcoming
}

/// Pinned announcements first, newest first within each group, capped at
/// `limit`.
pub fn recent_announcements(announcements: &[Announcement], limit: usize) -> Vec<Announcement> {
    let mut sorted = announcements.to_vec();
    sorted.sort_by(|a, b| {
        b.is_pinned
            .cmp(&a.is_pinned)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    sorted.truncate(limit);
    sorted
}

/// Attendance totals over the student's records. Only `present` counts as
/// attended; the percentage is rounded and zero when there are no records.
pub fn attendance_summary(records: &[AttendanceRecord]) -> AttendanceSummary {
    let total_classes = records.len();
    let attended = records
        .iter()
        .filter(|r| r.status == AttendanceStatus::Present)
        .count();
    let percentage = if total_classes == 0 {
        0.0
    } else {
        (attended as f64 / total_classes as f64 * 100.0).round()
    };
    AttendanceSummary {
        total_classes,
        attended,
        percentage,
    }
}

/// Per-course grade reports in enrollment order. A course with no graded
/// work still gets a report, with empty lists and no overall percentage.
pub fn grade_reports(
    enrollments: &[Enrollment],
    assignment_bundles: &[AssignmentBundle],
    quiz_bundles: &[QuizBundle],
) -> Vec<CourseGradeReport> {
    enrollments
        .iter()
        .map(|enrollment| {
            let assignments: Vec<GradedAssignment> = assignment_bundles
                .iter()
                .filter(|b| b.course_id == enrollment.course_id)
                .filter_map(|b| {
                    let grade = b.submission.as_ref().and_then(|s| s.grade)?;
                    Some(GradedAssignment {
                        title: b.assignment.title.clone(),
                        max_points: b.assignment.max_points,
                        grade,
                        percentage: percentage(grade, b.assignment.max_points),
                    })
                })
                .collect();

            let quizzes: Vec<QuizResult> = quiz_bundles
                .iter()
                .filter(|b| b.course_id == enrollment.course_id)
                .filter_map(|b| {
                    let best = status::best_attempt(&b.attempts)?;
                    Some(QuizResult {
                        quiz_title: b.quiz.title.clone(),
                        score: best.score,
                        max_score: best.max_score,
                        percentage: percentage(best.score, best.max_score),
                        submitted_at: best.submitted_at,
                    })
                })
                .collect();

            let all_percentages: Vec<f64> = assignments
                .iter()
                .map(|a| a.percentage)
                .chain(quizzes.iter().map(|q| q.percentage))
                .collect();
            let overall_percentage = if all_percentages.is_empty() {
                None
            } else {
                Some(
                    (all_percentages.iter().sum::<f64>() / all_percentages.len() as f64).round(),
                )
            };

            CourseGradeReport {
                course_id: enrollment.course_id,
                course_title: enrollment.course_title.clone(),
                course_code: enrollment.course_code.clone(),
                assignments,
                quizzes,
                overall_percentage,
            }
        })
        .collect()
}

fn percentage(score: f64, max: f64) -> f64 {
    if max == 0.0 {
        0.0
    } else {
        (score / max * 100.0).round()
    }
}
