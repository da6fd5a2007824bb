use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::models::{SchoolClass, Subject, User};
use crate::repositories;
use crate::repositories::task_statuses::TeacherStatusView;
use crate::test_support::{self, TestContext};

/// One class, one subject, three students across all bands, and a teacher
/// assigned to the pair.
async fn banded_class(ctx: &TestContext) -> (User, SchoolClass, Subject) {
    let db = ctx.state.db();
    let class = test_support::insert_class(db, "10-A").await;
    let maths = test_support::insert_subject(db, "Mathematics").await;

    test_support::insert_student(
        db,
        "Weak Willa",
        "10A-01",
        &class.id,
        "willa@school.edu",
        &[(maths.id.clone(), 35.0)],
    )
    .await;
    test_support::insert_student(
        db,
        "Good Gita",
        "10A-02",
        &class.id,
        "gita@school.edu",
        &[(maths.id.clone(), 45.0)],
    )
    .await;
    test_support::insert_student(
        db,
        "Brilliant Bala",
        "10A-03",
        &class.id,
        "bala@school.edu",
        &[(maths.id.clone(), 75.0)],
    )
    .await;

    let (teacher_user, _) = test_support::insert_teacher(db, "Ms. Nair", "nair@school.edu").await;
    test_support::add_assignment(db, &teacher_user.id, &class.id, &maths.id).await;

    (teacher_user, class, maths)
}

#[tokio::test]
async fn students_are_grouped_by_band() {
    let ctx = test_support::setup_test_context().await;
    let (teacher_user, class, maths) = banded_class(&ctx).await;
    let token = test_support::bearer_token(&teacher_user, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/teacher/students?classId={}&subjectId={}", class.id, maths.id),
            Some(&token),
            None,
        ))
        .await
        .expect("grouped students");

    let status = response.status();
    let grouped = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {grouped}");
    assert_eq!(grouped["Weak"][0]["name"], "Weak Willa");
    assert_eq!(grouped["Good"][0]["name"], "Good Gita");
    assert_eq!(grouped["Brilliant"][0]["name"], "Brilliant Bala");
    assert_eq!(grouped["Weak"].as_array().expect("weak").len(), 1);
    assert_eq!(grouped["Good"].as_array().expect("good").len(), 1);
    assert_eq!(grouped["Brilliant"].as_array().expect("brilliant").len(), 1);
}

#[tokio::test]
async fn students_listing_requires_an_assignment() {
    let ctx = test_support::setup_test_context().await;
    let (_, class, maths) = banded_class(&ctx).await;

    let (other_user, _) =
        test_support::insert_teacher(ctx.state.db(), "Mr. Other", "other@school.edu").await;
    let token = test_support::bearer_token(&other_user, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            &format!("/api/teacher/students?classId={}&subjectId={}", class.id, maths.id),
            Some(&token),
            None,
        ))
        .await
        .expect("unassigned teacher");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn task_fanout_targets_exactly_the_matching_band() {
    let ctx = test_support::setup_test_context().await;
    let (teacher_user, class, maths) = banded_class(&ctx).await;
    let token = test_support::bearer_token(&teacher_user, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/teacher/tasks",
            Some(&token),
            Some(json!({
                "description": "Extra practice set",
                "classId": class.id,
                "subjectId": maths.id,
                "targetCategory": "Weak"
            })),
        ))
        .await
        .expect("create task");

    let status = response.status();
    let task = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {task}");
    assert_eq!(task["status"], "assigned");
    assert_eq!(task["assigned_to"].as_array().expect("assigned").len(), 1);

    let task_id = task["id"].as_str().expect("task id");
    let statuses = repositories::task_statuses::count_for_task(ctx.state.db(), task_id)
        .await
        .expect("status count");
    assert_eq!(statuses, 1);

    let pending = repositories::task_statuses::list_for_teacher(
        ctx.state.db(),
        &teacher_user.id,
        TeacherStatusView::Pending,
    )
    .await
    .expect("pending rows");
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].student_name, "Weak Willa");
}

#[tokio::test]
async fn task_fanout_with_no_matching_students_is_valid() {
    let ctx = test_support::setup_test_context().await;
    let db = ctx.state.db();

    let class = test_support::insert_class(db, "10-B").await;
    let maths = test_support::insert_subject(db, "Mathematics").await;
    test_support::insert_student(
        db,
        "Only Weak",
        "10B-01",
        &class.id,
        "only@school.edu",
        &[(maths.id.clone(), 20.0)],
    )
    .await;

    let (teacher_user, _) = test_support::insert_teacher(db, "Ms. Nair", "nair@school.edu").await;
    test_support::add_assignment(db, &teacher_user.id, &class.id, &maths.id).await;
    let token = test_support::bearer_token(&teacher_user, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/teacher/tasks",
            Some(&token),
            Some(json!({
                "description": "Stretch goals",
                "classId": class.id,
                "subjectId": maths.id,
                "targetCategory": "Brilliant"
            })),
        ))
        .await
        .expect("create task");

    let status = response.status();
    let task = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {task}");
    assert!(task["assigned_to"].as_array().expect("assigned").is_empty());
}

#[tokio::test]
async fn task_creation_is_open_to_any_teacher() {
    let ctx = test_support::setup_test_context().await;
    let (_, class, maths) = banded_class(&ctx).await;

    let (other_user, _) =
        test_support::insert_teacher(ctx.state.db(), "Mr. Other", "other@school.edu").await;
    let token = test_support::bearer_token(&other_user, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/teacher/tasks",
            Some(&token),
            Some(json!({
                "description": "Cross-class drill",
                "classId": class.id,
                "subjectId": maths.id,
                "targetCategory": "Weak"
            })),
        ))
        .await
        .expect("unassigned teacher task");

    let status = response.status();
    let task = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {task}");
    assert_eq!(task["teacher_user_id"], other_user.id.as_str());
    assert_eq!(task["assigned_to"].as_array().expect("assigned").len(), 1);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/teacher/tasks",
            Some(&token),
            Some(json!({
                "description": "Nowhere",
                "classId": "missing-class",
                "subjectId": maths.id,
                "targetCategory": "Weak"
            })),
        ))
        .await
        .expect("unknown class");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn confirm_completion_conflicts_while_pending() {
    let ctx = test_support::setup_test_context().await;
    let (teacher_user, class, maths) = banded_class(&ctx).await;
    let token = test_support::bearer_token(&teacher_user, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/teacher/tasks",
            Some(&token),
            Some(json!({
                "description": "Revision sheet",
                "classId": class.id,
                "subjectId": maths.id,
                "targetCategory": "Good"
            })),
        ))
        .await
        .expect("create task");
    assert_eq!(response.status(), StatusCode::CREATED);

    let pending = repositories::task_statuses::list_for_teacher(
        ctx.state.db(),
        &teacher_user.id,
        TeacherStatusView::Pending,
    )
    .await
    .expect("pending rows");
    let status_id = pending[0].id.clone();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/teacher/confirm-completion/{status_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("confirm pending");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // A different teacher cannot confirm even after completion.
    let (other_user, _) =
        test_support::insert_teacher(ctx.state.db(), "Mr. Other", "other@school.edu").await;
    let other_token = test_support::bearer_token(&other_user, ctx.state.settings());

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/teacher/confirm-completion/{status_id}"),
            Some(&other_token),
            None,
        ))
        .await
        .expect("foreign confirm");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn delete_task_is_owner_only() {
    let ctx = test_support::setup_test_context().await;
    let (teacher_user, class, maths) = banded_class(&ctx).await;
    let token = test_support::bearer_token(&teacher_user, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/teacher/tasks",
            Some(&token),
            Some(json!({
                "description": "To be deleted",
                "classId": class.id,
                "subjectId": maths.id,
                "targetCategory": "Weak"
            })),
        ))
        .await
        .expect("create task");
    let task = test_support::read_json(response).await;
    let task_id = task["id"].as_str().expect("task id").to_string();

    let (other_user, _) =
        test_support::insert_teacher(ctx.state.db(), "Mr. Other", "other@school.edu").await;
    let other_token = test_support::bearer_token(&other_user, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/teacher/tasks/{task_id}"),
            Some(&other_token),
            None,
        ))
        .await
        .expect("foreign delete");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/teacher/tasks/{task_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("owner delete");
    assert_eq!(response.status(), StatusCode::OK);

    let statuses = repositories::task_statuses::count_for_task(ctx.state.db(), &task_id)
        .await
        .expect("status count");
    assert_eq!(statuses, 0);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/teacher/tasks/{task_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("delete again");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn teacher_sees_own_assignments_and_catalogs() {
    let ctx = test_support::setup_test_context().await;
    let (teacher_user, class, maths) = banded_class(&ctx).await;
    let token = test_support::bearer_token(&teacher_user, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/teacher/assignments",
            Some(&token),
            None,
        ))
        .await
        .expect("assignments");
    let status = response.status();
    let assignments = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {assignments}");
    assert_eq!(assignments.as_array().expect("assignments").len(), 1);
    assert_eq!(assignments[0]["class_id"], class.id.as_str());
    assert_eq!(assignments[0]["subject_id"], maths.id.as_str());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/teacher/all-classes",
            Some(&token),
            None,
        ))
        .await
        .expect("all classes");
    let classes = test_support::read_json(response).await;
    assert_eq!(classes.as_array().expect("classes").len(), 1);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/teacher/all-subjects",
            Some(&token),
            None,
        ))
        .await
        .expect("all subjects");
    let subjects = test_support::read_json(response).await;
    assert_eq!(subjects.as_array().expect("subjects").len(), 1);
}
