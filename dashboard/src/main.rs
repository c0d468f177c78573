use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use aggregator::assembler;
use aggregator::types::{
    AssignmentOverview, CourseGradeReport, CourseOverview, DashboardView, QuizOverview,
    ASSIGNMENT_FACETS, QUIZ_FACETS,
};
use aggregator::{AggregateError, FanOutOptions, StudentService};
use client::ApiClient;
use common::config;
use common::logger::init_logging;

#[tokio::main]
async fn main() {
    // Load configuration and initialize logging
    let _log_guard = init_logging(&config::log_file(), &config::log_level());

    let client = Arc::new(ApiClient::from_config().expect("Invalid API configuration"));
    let service = StudentService::new(Arc::clone(&client), FanOutOptions::from_config());

    println!(
        "{} talking to {}",
        config::project_name(),
        client.base_url()
    );

    // Cancel in-flight aggregation on Ctrl-C instead of committing partial views
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received; cancelling in-flight work");
                cancel.cancel();
            }
        });
    }

    match client.me().await {
        Ok(me) => println!("Signed in as {} <{}>\n", me.full_name, me.email),
        Err(err) => {
            eprintln!("couldn't sign in: {err}");
            return;
        }
    }

    let now = Utc::now();

    match service.my_dashboard(&cancel, now).await {
        Ok(view) => print_dashboard(&view),
        Err(err) => print_failure("dashboard", &err),
    }

    match service.my_assignments(&cancel, now).await {
        Ok(rows) => print_assignments(&rows),
        Err(err) => print_failure("assignments", &err),
    }

    match service.my_quizzes(&cancel, now).await {
        Ok(rows) => print_quizzes(&rows),
        Err(err) => print_failure("quizzes", &err),
    }

    match service.my_grades(&cancel).await {
        Ok(reports) => print_grades(&reports),
        Err(err) => print_failure("grades", &err),
    }

    // Zero enrollments and a failed load are different outcomes; say so.
    match service.my_courses(&cancel).await {
        Ok(overviews) if overviews.is_empty() => println!("== Courses ==\n  no courses yet\n"),
        Ok(overviews) => print_courses(&overviews),
        Err(AggregateError::Cancelled) => println!("courses: cancelled before it finished\n"),
        Err(err) => println!("couldn't load your courses: {err}\n"),
    }
}

fn print_failure(section: &str, err: &AggregateError) {
    match err {
        AggregateError::Cancelled => println!("{section}: cancelled before it finished\n"),
        AggregateError::Root(root) => println!("couldn't load your {section}: {root}\n"),
    }
}

fn format_due(due: Option<chrono::DateTime<Utc>>) -> String {
    match due {
        Some(at) => at.format("%Y-%m-%d %H:%M").to_string(),
        None => "no deadline".to_string(),
    }
}

fn print_dashboard(view: &DashboardView) {
    println!("== Dashboard ==");
    println!("Enrolled courses: {}", view.course_count);

    println!("Upcoming deadlines:");
    if view.deadlines.is_empty() {
        println!("  (nothing due soon)");
    }
    for item in &view.deadlines {
        println!(
            "  {}  [{}] {} ({})",
            format_due(item.due_at),
            item.kind,
            item.title,
            item.course_title
        );
    }

    println!("Recent announcements:");
    if view.announcements.is_empty() {
        println!("  (none)");
    }
    for announcement in &view.announcements {
        let pin = if announcement.is_pinned { "* " } else { "" };
        println!(
            "  {pin}{} ({})",
            announcement.title,
            announcement.created_at.format("%Y-%m-%d")
        );
    }

    match &view.attendance {
        Some(att) => println!(
            "Attendance: {}/{} classes ({}%)",
            att.attended, att.total_classes, att.percentage
        ),
        None => println!("Attendance: unavailable"),
    }
    println!();
}

fn print_assignments(rows: &[AssignmentOverview]) {
    println!("== Assignments ==");
    let badges: Vec<String> = assembler::facet_counts(rows, &ASSIGNMENT_FACETS)
        .into_iter()
        .map(|(facet, count)| format!("{facet}: {count}"))
        .collect();
    println!("  {}", badges.join("  "));

    for row in rows {
        let grade = match row.grade {
            Some(grade) => format!("  {grade}/{}", row.max_points),
            None => String::new(),
        };
        println!(
            "  [{}] {} ({})  due {}{grade}",
            row.status,
            row.title,
            row.course_title,
            format_due(row.due_date)
        );
    }
    println!();
}

fn print_quizzes(rows: &[QuizOverview]) {
    println!("== Quizzes ==");
    let badges: Vec<String> = assembler::facet_counts(rows, &QUIZ_FACETS)
        .into_iter()
        .map(|(facet, count)| format!("{facet}: {count}"))
        .collect();
    println!("  {}", badges.join("  "));

    for row in rows {
        let best = match &row.best_score {
            Some(best) => format!("  best {}/{} ({}%)", best.score, best.max_score, best.percentage),
            None => String::new(),
        };
        println!(
            "  [{}] {} ({})  closes {}  attempts {}/{}{best}",
            row.status,
            row.title,
            row.course_title,
            format_due(row.available_until),
            row.attempt_count,
            row.max_attempts
        );
    }
    println!();
}

fn print_grades(reports: &[CourseGradeReport]) {
    println!("== Grades ==");
    for report in reports {
        let overall = match report.overall_percentage {
            Some(percentage) => format!("{percentage}%"),
            None => "no grades yet".to_string(),
        };
        println!("  {} ({}): {overall}", report.course_title, report.course_code);
        for graded in &report.assignments {
            println!(
                "    {}: {}/{} ({}%)",
                graded.title, graded.grade, graded.max_points, graded.percentage
            );
        }
        for quiz in &report.quizzes {
            println!(
                "    {}: {}/{} ({}%)",
                quiz.quiz_title, quiz.score, quiz.max_score, quiz.percentage
            );
        }
    }
    println!();
}

fn print_courses(overviews: &[CourseOverview]) {
    println!("== Courses ==");
    for overview in overviews {
        let e = &overview.enrollment;
        println!(
            "  {} ({}) section {} with {}",
            e.course_title, e.course_code, e.section_name, e.teacher_name
        );
        for material in &overview.materials {
            println!(
                "    {} (uploaded {})",
                material.title,
                material.uploaded_at.format("%Y-%m-%d")
            );
        }
    }
    println!();
}
