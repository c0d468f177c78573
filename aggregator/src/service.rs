//! Page-level compositions.
//!
//! Each operation here backs one student page: resolve enrollments, fan out
//! across courses (and again across per-course resources where the page
//! needs per-item sub-state), then hand everything to the assembler. The
//! fan-out stages run one after the other; concurrency lives inside each
//! stage, bounded by the shared options.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use client::models::Enrollment;
use client::{ApiClient, ApiError};

use crate::assembler;
use crate::error::{AggregateError, AggregateResult};
use crate::fanout::{fan_out, FanOutOptions};
use crate::resolver::EnrollmentResolver;
use crate::types::{
    AssignmentBundle, AssignmentOverview, CourseGradeReport, CourseOverview, DashboardView,
    GradableItem, QuizBundle, QuizOverview,
};

/// Items shown per dashboard section.
pub const DASHBOARD_SECTION_LIMIT: usize = 5;

/// The read API behind the student pages.
///
/// The HTTP client is injected at construction so callers (and tests) decide
/// where requests go. Every operation threads the caller's cancellation
/// token through each fetch level and returns fully assembled view models.
pub struct StudentService {
    client: Arc<ApiClient>,
    resolver: EnrollmentResolver,
    opts: FanOutOptions,
}

impl StudentService {
    pub fn new(client: Arc<ApiClient>, opts: FanOutOptions) -> Self {
        let resolver = EnrollmentResolver::new(Arc::clone(&client));
        Self {
            client,
            resolver,
            opts,
        }
    }

    /// All assignments across enrolled courses, with the student's
    /// submissions folded in, statuses derived against `now` and rows
    /// sorted by due date.
    pub async fn my_assignments(
        &self,
        cancel: &CancellationToken,
        now: DateTime<Utc>,
    ) -> AggregateResult<Vec<AssignmentOverview>> {
        let enrollments = self.resolver.resolve(cancel).await?;
        let shells = self.assignment_shells(&enrollments, cancel).await?;
        let bundles = self.with_submissions(shells, cancel).await?;
        Ok(assembler::assignment_rows(&bundles, now))
    }

    /// All quizzes across enrolled courses, with the student's attempts
    /// folded in.
    pub async fn my_quizzes(
        &self,
        cancel: &CancellationToken,
        now: DateTime<Utc>,
    ) -> AggregateResult<Vec<QuizOverview>> {
        let enrollments = self.resolver.resolve(cancel).await?;
        let shells = self.quiz_shells(&enrollments, cancel).await?;
        let bundles = self.with_attempts(shells, cancel).await?;
        Ok(assembler::quiz_rows(&bundles, now))
    }

    /// The landing page: upcoming deadlines, recent announcements and the
    /// attendance summary. Deadlines only need the per-course listings, so
    /// no per-item sub-state is fetched here.
    pub async fn my_dashboard(
        &self,
        cancel: &CancellationToken,
        now: DateTime<Utc>,
    ) -> AggregateResult<DashboardView> {
        let enrollments = self.resolver.resolve(cancel).await?;

        let assignment_shells = self.assignment_shells(&enrollments, cancel).await?;
        let quiz_shells = self.quiz_shells(&enrollments, cancel).await?;

        let mut items: Vec<GradableItem> = Vec::new();
        for b in &assignment_shells {
            items.push(GradableItem::from_assignment(&b.course_title, &b.assignment));
        }
        for b in &quiz_shells {
            items.push(GradableItem::from_quiz(&b.course_title, &b.quiz));
        }
        let deadlines = assembler::upcoming_deadlines(&items, now, DASHBOARD_SECTION_LIMIT);

        let course_ids: Vec<i64> = enrollments.iter().map(|e| e.course_id).collect();
        let all_announcements = {
            let client = Arc::clone(&self.client);
            fan_out(course_ids, &self.opts, cancel, |course_id| {
                let client = Arc::clone(&client);
                async move { client.course_announcements(course_id).await }
            })
            .await?
        };
        let announcements =
            assembler::recent_announcements(&all_announcements, DASHBOARD_SECTION_LIMIT);

        let attendance = tokio::select! {
            res = self.client.my_attendance() => match res {
                Ok(records) => Some(assembler::attendance_summary(&records)),
                Err(err) => {
                    tracing::warn!(error = %err, "failed to load attendance records; hiding the section");
                    None
                }
            },
            () = cancel.cancelled() => return Err(AggregateError::Cancelled),
        };

        Ok(DashboardView {
            course_count: enrollments.len(),
            deadlines,
            announcements,
            attendance,
        })
    }

    /// Per-course grade reports over everything graded so far.
    pub async fn my_grades(
        &self,
        cancel: &CancellationToken,
    ) -> AggregateResult<Vec<CourseGradeReport>> {
        let enrollments = self.resolver.resolve(cancel).await?;

        let assignment_shells = self.assignment_shells(&enrollments, cancel).await?;
        let assignment_bundles = self.with_submissions(assignment_shells, cancel).await?;

        let quiz_shells = self.quiz_shells(&enrollments, cancel).await?;
        let quiz_bundles = self.with_attempts(quiz_shells, cancel).await?;

        Ok(assembler::grade_reports(
            &enrollments,
            &assignment_bundles,
            &quiz_bundles,
        ))
    }

    /// The course catalog: every enrollment with its course materials.
    pub async fn my_courses(
        &self,
        cancel: &CancellationToken,
    ) -> AggregateResult<Vec<CourseOverview>> {
        let enrollments = self.resolver.resolve(cancel).await?;

        let client = Arc::clone(&self.client);
        fan_out(enrollments, &self.opts, cancel, |enrollment| {
            let client = Arc::clone(&client);
            async move {
                let materials = match client.course_materials(enrollment.course_id).await {
                    Ok(materials) => materials,
                    Err(err) => {
                        tracing::warn!(
                            course_id = enrollment.course_id,
                            error = %err,
                            "failed to load materials; showing the course without them"
                        );
                        Vec::new()
                    }
                };
                Ok::<_, ApiError>(vec![CourseOverview {
                    enrollment,
                    materials,
                }])
            }
        })
        .await
    }

    // --- Fetch stages ---

    /// Level 1: every course's assignment list, no submissions yet. A
    /// failing course contributes no rows; its siblings are unaffected.
    async fn assignment_shells(
        &self,
        enrollments: &[Enrollment],
        cancel: &CancellationToken,
    ) -> AggregateResult<Vec<AssignmentBundle>> {
        let client = Arc::clone(&self.client);
        let courses: Vec<(i64, String)> = enrollments
            .iter()
            .map(|e| (e.course_id, e.course_title.clone()))
            .collect();

        fan_out(courses, &self.opts, cancel, |(course_id, course_title)| {
            let client = Arc::clone(&client);
            async move {
                let assignments = client.course_assignments(course_id).await?;
                Ok(assignments
                    .into_iter()
                    .map(|assignment| AssignmentBundle {
                        course_id,
                        course_title: course_title.clone(),
                        assignment,
                        submission: None,
                    })
                    .collect())
            }
        })
        .await
    }

    /// Level 2: the student's submission per assignment. A failing lookup
    /// keeps the assignment, shown as not handed in.
    async fn with_submissions(
        &self,
        shells: Vec<AssignmentBundle>,
        cancel: &CancellationToken,
    ) -> AggregateResult<Vec<AssignmentBundle>> {
        let client = Arc::clone(&self.client);
        fan_out(shells, &self.opts, cancel, |mut bundle| {
            let client = Arc::clone(&client);
            async move {
                match client.my_submission(bundle.assignment.id).await {
                    Ok(submission) => bundle.submission = submission,
                    Err(err) => {
                        tracing::warn!(
                            assignment_id = bundle.assignment.id,
                            error = %err,
                            "failed to load submission; showing assignment without one"
                        );
                    }
                }
                Ok::<_, ApiError>(vec![bundle])
            }
        })
        .await
    }

    /// Level 1 for quizzes: every course's quiz list, no attempts yet.
    async fn quiz_shells(
        &self,
        enrollments: &[Enrollment],
        cancel: &CancellationToken,
    ) -> AggregateResult<Vec<QuizBundle>> {
        let client = Arc::clone(&self.client);
        let courses: Vec<(i64, String)> = enrollments
            .iter()
            .map(|e| (e.course_id, e.course_title.clone()))
            .collect();

        fan_out(courses, &self.opts, cancel, |(course_id, course_title)| {
            let client = Arc::clone(&client);
            async move {
                let quizzes = client.course_quizzes(course_id).await?;
                Ok(quizzes
                    .into_iter()
                    .map(|quiz| QuizBundle {
                        course_id,
                        course_title: course_title.clone(),
                        quiz,
                        attempts: Vec::new(),
                    })
                    .collect())
            }
        })
        .await
    }

    /// Level 2 for quizzes: the student's attempts per quiz. A failing
    /// lookup keeps the quiz with no attempts.
    async fn with_attempts(
        &self,
        shells: Vec<QuizBundle>,
        cancel: &CancellationToken,
    ) -> AggregateResult<Vec<QuizBundle>> {
        let client = Arc::clone(&self.client);
        fan_out(shells, &self.opts, cancel, |mut bundle| {
            let client = Arc::clone(&client);
            async move {
                match client.my_attempts(bundle.quiz.id).await {
                    Ok(attempts) => bundle.attempts = attempts,
                    Err(err) => {
                        tracing::warn!(
                            quiz_id = bundle.quiz.id,
                            error = %err,
                            "failed to load attempts; showing quiz without them"
                        );
                    }
                }
                Ok::<_, ApiError>(vec![bundle])
            }
        })
        .await
    }
}
