#![allow(dead_code)]

//! In-process LMS backend for integration tests.
//!
//! Serves the same routes and JSON shapes as the real backend, seeded from
//! plain structs. Failure injection is per-course (`failing_courses`) or
//! per-endpoint (`fail_me`, `fail_attendance`); the assignment listing
//! additionally tracks in-flight request counts so tests can observe the
//! fan-out concurrency cap.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use tokio::net::TcpListener;
use url::Url;

use aggregator::{FanOutOptions, StudentService};
use client::models::{
    Announcement, Assignment, AttendanceRecord, AttendanceStatus, Enrollment,
    GradeSubmissionRequest, Material, Me, Quiz, QuizAttempt, Role, Submission,
};
use client::ApiClient;

#[derive(Default)]
pub struct MockLms {
    pub me: Option<Me>,
    pub enrollments: Vec<Enrollment>,
    /// Assignments by course id.
    pub assignments: HashMap<i64, Vec<Assignment>>,
    /// The student's submission by assignment id.
    pub submissions: HashMap<i64, Submission>,
    /// Quizzes by course id.
    pub quizzes: HashMap<i64, Vec<Quiz>>,
    /// The student's attempts by quiz id.
    pub attempts: HashMap<i64, Vec<QuizAttempt>>,
    /// Announcements by course id.
    pub announcements: HashMap<i64, Vec<Announcement>>,
    /// Materials by course id.
    pub materials: HashMap<i64, Vec<Material>>,
    pub attendance: Vec<AttendanceRecord>,

    /// Courses whose listing routes answer 500.
    pub failing_courses: HashSet<i64>,
    pub fail_me: bool,
    pub fail_attendance: bool,
    /// When set, every route demands this bearer token.
    pub require_token: Option<String>,

    /// Concurrency bookkeeping on the assignment listing route.
    pub in_flight: AtomicUsize,
    pub peak_in_flight: AtomicUsize,
    pub fetch_delay: Duration,
}

impl MockLms {
    /// Two courses with assignments, quizzes, announcements, materials and
    /// attendance for student 1.
    pub fn seeded() -> Self {
        let mut lms = MockLms {
            me: Some(me(1)),
            enrollments: vec![
                enrollment(1, "Intro to Programming", "CS101"),
                enrollment(2, "Linear Algebra", "MATH201"),
            ],
            ..Default::default()
        };

        lms.assignments.insert(
            1,
            vec![
                assignment(11, 1, Some(at(20, 12)), 100.0),
                assignment(12, 1, Some(at(5, 12)), 50.0),
            ],
        );
        lms.assignments
            .insert(2, vec![assignment(21, 2, None, 80.0)]);
        lms.submissions
            .insert(11, submission(1100, 11, Some(85.0), at(10, 9)));

        lms.quizzes
            .insert(1, vec![quiz(31, 1, Some(at(25, 12)), 3)]);
        lms.quizzes.insert(2, vec![quiz(41, 2, None, 2)]);
        lms.attempts.insert(
            31,
            vec![
                attempt(310, 31, 12.0, 20.0, Some(at(9, 10))),
                attempt(311, 31, 16.0, 20.0, Some(at(10, 10))),
            ],
        );

        lms.announcements.insert(
            1,
            vec![
                announcement(51, 1, "Welcome", false, at(2, 9)),
                announcement(52, 1, "Exam moved", true, at(3, 9)),
            ],
        );
        lms.materials
            .insert(1, vec![material(61, 1, "Lecture 1 slides")]);

        lms.attendance = vec![
            attendance_record(71, AttendanceStatus::Present),
            attendance_record(72, AttendanceStatus::Present),
            attendance_record(73, AttendanceStatus::Absent),
            attendance_record(74, AttendanceStatus::Late),
        ];

        lms
    }
}

/// Spawns an Axum app on a random local port.
pub async fn spawn_app(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    addr
}

/// Spawns the mock backend on a random local port.
pub async fn spawn_lms(state: Arc<MockLms>) -> SocketAddr {
    spawn_app(router(state)).await
}

pub fn test_client(addr: SocketAddr) -> Arc<ApiClient> {
    test_client_with_token(addr, None)
}

pub fn test_client_with_token(addr: SocketAddr, token: Option<String>) -> Arc<ApiClient> {
    let base_url = Url::parse(&format!("http://{addr}")).unwrap();
    Arc::new(ApiClient::new(base_url, token, Duration::from_secs(5)).unwrap())
}

pub fn test_service(addr: SocketAddr) -> StudentService {
    StudentService::new(test_client(addr), FanOutOptions::default())
}

// --- Record builders ---

pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
}

pub fn me(id: i64) -> Me {
    Me {
        id,
        email: "alex@studenthub.test".to_string(),
        full_name: "Alex Mokoena".to_string(),
        role: Role::Student,
        is_active: true,
    }
}

pub fn enrollment(course_id: i64, title: &str, code: &str) -> Enrollment {
    Enrollment {
        id: course_id * 10,
        course_id,
        course_title: title.to_string(),
        course_code: code.to_string(),
        course_description: Some(format!("All about {title}")),
        section_id: course_id * 10 + 1,
        section_name: "A".to_string(),
        teacher_name: "T. Teacher".to_string(),
        teacher_email: "teacher@studenthub.test".to_string(),
    }
}

pub fn assignment(
    id: i64,
    course_id: i64,
    due_date: Option<DateTime<Utc>>,
    max_points: f64,
) -> Assignment {
    Assignment {
        id,
        course_id,
        title: format!("Assignment {id}"),
        description: "Do the thing".to_string(),
        due_date,
        max_points,
    }
}

pub fn submission(
    id: i64,
    assignment_id: i64,
    grade: Option<f64>,
    submitted_at: DateTime<Utc>,
) -> Submission {
    Submission {
        id,
        assignment_id,
        student_id: 1,
        content: "answer.pdf".to_string(),
        submitted_at,
        grade,
        feedback: grade.map(|_| "Well done".to_string()),
    }
}

pub fn quiz(id: i64, course_id: i64, available_until: Option<DateTime<Utc>>, max_attempts: u32) -> Quiz {
    Quiz {
        id,
        course_id,
        title: format!("Quiz {id}"),
        description: "Quick check".to_string(),
        time_limit_minutes: 30,
        max_attempts,
        passing_score: 50.0,
        available_from: Some(at(1, 8)),
        available_until,
        show_correct_answers: false,
    }
}

pub fn attempt(
    id: i64,
    quiz_id: i64,
    score: f64,
    max_score: f64,
    submitted_at: Option<DateTime<Utc>>,
) -> QuizAttempt {
    QuizAttempt {
        id,
        quiz_id,
        student_id: 1,
        attempt_number: 1,
        started_at: at(9, 9),
        submitted_at,
        score,
        max_score,
    }
}

pub fn announcement(
    id: i64,
    course_id: i64,
    title: &str,
    is_pinned: bool,
    created_at: DateTime<Utc>,
) -> Announcement {
    Announcement {
        id,
        course_id,
        title: title.to_string(),
        content: "Please read".to_string(),
        created_at,
        creator_name: "T. Teacher".to_string(),
        is_pinned,
    }
}

pub fn material(id: i64, course_id: i64, title: &str) -> Material {
    Material {
        id,
        course_id,
        title: title.to_string(),
        file_path: format!("/files/{id}.pdf"),
        uploaded_at: at(2, 10),
    }
}

pub fn attendance_record(id: i64, status: AttendanceStatus) -> AttendanceRecord {
    AttendanceRecord {
        id,
        date: at(4, 9),
        status,
        section_name: "A".to_string(),
        course_title: "Intro to Programming".to_string(),
        course_code: "CS101".to_string(),
    }
}

// --- Routes ---

fn router(state: Arc<MockLms>) -> Router {
    Router::new()
        .route("/auth/me", get(get_me))
        .route("/users/{user_id}/enrollments", get(get_enrollments))
        .route("/assignments/course/{course_id}", get(get_course_assignments))
        .route("/assignments/{assignment_id}/my-submission", get(get_my_submission))
        .route("/assignments/submissions/{submission_id}/grade", post(post_grade))
        .route("/quizzes/course/{course_id}", get(get_course_quizzes))
        .route("/quizzes/{quiz_id}/my-attempts", get(get_my_attempts))
        .route("/announcements/course/{course_id}", get(get_course_announcements))
        .route("/courses/{course_id}/materials", get(get_course_materials))
        .route("/attendance/my-records", get(get_my_attendance))
        .with_state(state)
}

fn error_response(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

fn check_auth(state: &MockLms, headers: &HeaderMap) -> Result<(), Response> {
    if let Some(expected) = &state.require_token {
        let ok = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v == format!("Bearer {expected}"))
            .unwrap_or(false);
        if !ok {
            return Err(error_response(StatusCode::UNAUTHORIZED, "Not authenticated"));
        }
    }
    Ok(())
}

async fn get_me(State(state): State<Arc<MockLms>>, headers: HeaderMap) -> Response {
    if let Err(resp) = check_auth(&state, &headers) {
        return resp;
    }
    if state.fail_me {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "identity service down");
    }
    match &state.me {
        Some(me) => Json(me.clone()).into_response(),
        None => error_response(StatusCode::UNAUTHORIZED, "Not authenticated"),
    }
}

async fn get_enrollments(
    State(state): State<Arc<MockLms>>,
    headers: HeaderMap,
    Path(_user_id): Path<i64>,
) -> Response {
    if let Err(resp) = check_auth(&state, &headers) {
        return resp;
    }
    Json(state.enrollments.clone()).into_response()
}

async fn get_course_assignments(
    State(state): State<Arc<MockLms>>,
    headers: HeaderMap,
    Path(course_id): Path<i64>,
) -> Response {
    if let Err(resp) = check_auth(&state, &headers) {
        return resp;
    }

    let now = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    state.peak_in_flight.fetch_max(now, Ordering::SeqCst);
    if !state.fetch_delay.is_zero() {
        tokio::time::sleep(state.fetch_delay).await;
    }
    state.in_flight.fetch_sub(1, Ordering::SeqCst);

    if state.failing_courses.contains(&course_id) {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "course backend exploded");
    }
    Json(state.assignments.get(&course_id).cloned().unwrap_or_default()).into_response()
}

async fn get_my_submission(
    State(state): State<Arc<MockLms>>,
    headers: HeaderMap,
    Path(assignment_id): Path<i64>,
) -> Response {
    if let Err(resp) = check_auth(&state, &headers) {
        return resp;
    }
    match state.submissions.get(&assignment_id) {
        Some(submission) => Json(submission.clone()).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Submission not found"),
    }
}

async fn post_grade(
    State(state): State<Arc<MockLms>>,
    headers: HeaderMap,
    Path(submission_id): Path<i64>,
    Json(req): Json<GradeSubmissionRequest>,
) -> Response {
    if let Err(resp) = check_auth(&state, &headers) {
        return resp;
    }
    let found = state
        .submissions
        .values()
        .find(|s| s.id == submission_id)
        .cloned();
    match found {
        Some(mut submission) => {
            submission.grade = Some(req.grade);
            submission.feedback = req.feedback;
            Json(submission).into_response()
        }
        None => error_response(StatusCode::NOT_FOUND, "Submission not found"),
    }
}

async fn get_course_quizzes(
    State(state): State<Arc<MockLms>>,
    headers: HeaderMap,
    Path(course_id): Path<i64>,
) -> Response {
    if let Err(resp) = check_auth(&state, &headers) {
        return resp;
    }
    if state.failing_courses.contains(&course_id) {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "course backend exploded");
    }
    Json(state.quizzes.get(&course_id).cloned().unwrap_or_default()).into_response()
}

async fn get_my_attempts(
    State(state): State<Arc<MockLms>>,
    headers: HeaderMap,
    Path(quiz_id): Path<i64>,
) -> Response {
    if let Err(resp) = check_auth(&state, &headers) {
        return resp;
    }
    Json(state.attempts.get(&quiz_id).cloned().unwrap_or_default()).into_response()
}

async fn get_course_announcements(
    State(state): State<Arc<MockLms>>,
    headers: HeaderMap,
    Path(course_id): Path<i64>,
) -> Response {
    if let Err(resp) = check_auth(&state, &headers) {
        return resp;
    }
    if state.failing_courses.contains(&course_id) {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "course backend exploded");
    }
    Json(
        state
            .announcements
            .get(&course_id)
            .cloned()
            .unwrap_or_default(),
    )
    .into_response()
}

async fn get_course_materials(
    State(state): State<Arc<MockLms>>,
    headers: HeaderMap,
    Path(course_id): Path<i64>,
) -> Response {
    if let Err(resp) = check_auth(&state, &headers) {
        return resp;
    }
    Json(state.materials.get(&course_id).cloned().unwrap_or_default()).into_response()
}

async fn get_my_attendance(State(state): State<Arc<MockLms>>, headers: HeaderMap) -> Response {
    if let Err(resp) = check_auth(&state, &headers) {
        return resp;
    }
    if state.fail_attendance {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, "attendance service down");
    }
    Json(state.attendance.clone()).into_response()
}
