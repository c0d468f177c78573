//! Derived status rules.
//!
//! Everything here is pure: the clock is a parameter, never read inside, so
//! the same inputs always derive the same status.

use chrono::{DateTime, Utc};

use client::models::{DerivedStatus, QuizAttempt, Submission};

/// Status of one assignment for the student.
///
/// With a submission: a grade wins, then a hand-in after the deadline is
/// late, otherwise submitted. Without one: past-due is late, otherwise
/// pending. An assignment without a due date is never late.
pub fn assignment_status(
    now: DateTime<Utc>,
    due_date: Option<DateTime<Utc>>,
    submission: Option<&Submission>,
) -> DerivedStatus {
    match submission {
        Some(sub) => {
            if sub.grade.is_some() {
                DerivedStatus::Graded
            } else if matches!(due_date, Some(due) if sub.submitted_at > due) {
                DerivedStatus::Late
            } else {
                DerivedStatus::Submitted
            }
        }
        None => match due_date {
            Some(due) if now > due => DerivedStatus::Late,
            _ => DerivedStatus::Pending,
        },
    }
}

/// Status of one quiz for the student.
///
/// Precedence: an open attempt beats everything, including an elapsed
/// availability window; then expiry, then attempts exhausted, then
/// completed, then available. A quiz without `available_until` never
/// expires.
pub fn quiz_status(
    now: DateTime<Utc>,
    available_until: Option<DateTime<Utc>>,
    attempts: &[QuizAttempt],
    max_attempts: u32,
) -> DerivedStatus {
    if attempts.iter().any(|a| a.submitted_at.is_none()) {
        return DerivedStatus::InProgress;
    }
    if matches!(available_until, Some(until) if now > until) {
        return DerivedStatus::Expired;
    }

    let completed = completed_attempts(attempts);
    if completed >= max_attempts as usize {
        DerivedStatus::MaxAttempts
    } else if completed > 0 {
        DerivedStatus::Completed
    } else {
        DerivedStatus::Available
    }
}

/// The completed attempt with the highest score; the first one seen wins a
/// tie. In-progress attempts never count, whatever their running score.
pub fn best_attempt(attempts: &[QuizAttempt]) -> Option<&QuizAttempt> {
    let mut best: Option<&QuizAttempt> = None;
    for attempt in attempts.iter().filter(|a| a.submitted_at.is_some()) {
        match best {
            Some(current) if attempt.score > current.score => best = Some(attempt),
            None => best = Some(attempt),
            _ => {}
        }
    }
    best
}

pub fn completed_attempts(attempts: &[QuizAttempt]) -> usize {
    attempts.iter().filter(|a| a.submitted_at.is_some()).count()
}
