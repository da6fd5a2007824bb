use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::models::User;
use crate::repositories;
use crate::repositories::task_statuses::TeacherStatusView;
use crate::test_support::{self, TestContext};

/// Teacher assigned to a class/subject, one weak student, one fanned-out task.
/// Returns (teacher user, student user, status id).
async fn task_for_student(ctx: &TestContext) -> (User, User, String) {
    let db = ctx.state.db();
    let class = test_support::insert_class(db, "10-A").await;
    let maths = test_support::insert_subject(db, "Mathematics").await;
    let (student_user, _) = test_support::insert_student(
        db,
        "Weak Willa",
        "10A-01",
        &class.id,
        "willa@school.edu",
        &[(maths.id.clone(), 35.0)],
    )
    .await;

    let (teacher_user, _) = test_support::insert_teacher(db, "Ms. Nair", "nair@school.edu").await;
    test_support::add_assignment(db, &teacher_user.id, &class.id, &maths.id).await;

    let teacher_token = test_support::bearer_token(&teacher_user, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/teacher/tasks",
            Some(&teacher_token),
            Some(json!({
                "description": "Practice fractions",
                "classId": class.id,
                "subjectId": maths.id,
                "targetCategory": "Weak"
            })),
        ))
        .await
        .expect("create task");
    assert_eq!(response.status(), StatusCode::CREATED);

    let pending = repositories::task_statuses::list_for_teacher(
        db,
        &teacher_user.id,
        TeacherStatusView::Pending,
    )
    .await
    .expect("pending rows");

    (teacher_user, student_user, pending[0].id.clone())
}

#[tokio::test]
async fn student_lists_completes_and_teacher_confirms() {
    let ctx = test_support::setup_test_context().await;
    let (teacher_user, student_user, status_id) = task_for_student(&ctx).await;
    let token = test_support::bearer_token(&student_user, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/student/tasks", Some(&token), None))
        .await
        .expect("list tasks");

    let status = response.status();
    let tasks = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {tasks}");
    assert_eq!(tasks.as_array().expect("tasks").len(), 1);
    assert_eq!(tasks[0]["description"], "Practice fractions");
    assert_eq!(tasks[0]["completion_status"], "pending");
    assert_eq!(tasks[0]["teacher_name"], "Ms. Nair");

    // Completion is idempotent.
    for _ in 0..2 {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                &format!("/api/student/tasks/{status_id}/complete"),
                Some(&token),
                None,
            ))
            .await
            .expect("complete task");
        assert_eq!(response.status(), StatusCode::OK);
    }

    let awaiting = repositories::task_statuses::list_for_teacher(
        ctx.state.db(),
        &teacher_user.id,
        TeacherStatusView::AwaitingConfirmation,
    )
    .await
    .expect("awaiting rows");
    assert_eq!(awaiting.len(), 1);

    let teacher_token = test_support::bearer_token(&teacher_user, ctx.state.settings());
    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/teacher/confirm-completion/{status_id}"),
            Some(&teacher_token),
            None,
        ))
        .await
        .expect("confirm completion");
    assert_eq!(response.status(), StatusCode::OK);

    let confirmed = repositories::task_statuses::list_for_teacher(
        ctx.state.db(),
        &teacher_user.id,
        TeacherStatusView::Confirmed,
    )
    .await
    .expect("confirmed rows");
    assert_eq!(confirmed.len(), 1);

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, "/api/student/tasks", Some(&token), None))
        .await
        .expect("list tasks after confirm");
    let tasks = test_support::read_json(response).await;
    assert_eq!(tasks[0]["completion_status"], "completed");
    assert_eq!(tasks[0]["teacher_confirmed"], true);
}

#[tokio::test]
async fn student_cannot_complete_a_foreign_status() {
    let ctx = test_support::setup_test_context().await;
    let (_, _, status_id) = task_for_student(&ctx).await;

    let class = test_support::insert_class(ctx.state.db(), "10-B").await;
    let (other_user, _) = test_support::insert_student(
        ctx.state.db(),
        "Other Omar",
        "10B-01",
        &class.id,
        "omar@school.edu",
        &[],
    )
    .await;
    let token = test_support::bearer_token(&other_user, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/student/tasks/{status_id}/complete"),
            Some(&token),
            None,
        ))
        .await
        .expect("foreign complete");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_status_returns_404() {
    let ctx = test_support::setup_test_context().await;

    let class = test_support::insert_class(ctx.state.db(), "10-C").await;
    let (student_user, _) = test_support::insert_student(
        ctx.state.db(),
        "Lone Lena",
        "10C-01",
        &class.id,
        "lena@school.edu",
        &[],
    )
    .await;
    let token = test_support::bearer_token(&student_user, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/student/tasks/no-such-status/complete",
            Some(&token),
            None,
        ))
        .await
        .expect("unknown status");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn student_routes_reject_other_roles() {
    let ctx = test_support::setup_test_context().await;

    let (teacher_user, _) =
        test_support::insert_teacher(ctx.state.db(), "Ms. Nair", "nair@school.edu").await;
    let token = test_support::bearer_token(&teacher_user, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, "/api/student/tasks", Some(&token), None))
        .await
        .expect("teacher on student route");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
