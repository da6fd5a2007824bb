use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::{Category, UserRole};
use crate::repositories;
use crate::test_support;

async fn admin_token(ctx: &test_support::TestContext) -> String {
    let admin = test_support::insert_user(
        ctx.state.db(),
        "admin",
        "admin@school.edu",
        "admin-pass-123",
        UserRole::Admin,
    )
    .await;
    test_support::bearer_token(&admin, ctx.state.settings())
}

#[tokio::test]
async fn create_student_seeds_marks_and_classifications() {
    let ctx = test_support::setup_test_context().await;
    let token = admin_token(&ctx).await;

    let class = test_support::insert_class(ctx.state.db(), "10-A").await;
    let maths = test_support::insert_subject(ctx.state.db(), "Mathematics").await;
    let physics = test_support::insert_subject(ctx.state.db(), "Physics").await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/admin/students",
            Some(&token),
            Some(json!({
                "name": "Asha Rao",
                "rollNumber": "10A-01",
                "classId": class.id,
                "email": "asha@school.edu",
                "password": "student-pass-123",
                "previousMarks": [
                    { "subjectId": maths.id, "marks": 35.0 },
                    { "subjectId": physics.id, "marks": 75.0 }
                ]
            })),
        ))
        .await
        .expect("create student");

    let status = response.status();
    let created = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {created}");
    let student_id = created["id"].as_str().expect("student id").to_string();
    assert_eq!(created["previous_marks"].as_array().expect("marks").len(), 2);

    let weak = repositories::classifications::find_for_student_subject(
        ctx.state.db(),
        &student_id,
        &maths.id,
    )
    .await
    .expect("classification")
    .expect("maths classification");
    assert_eq!(weak.category, Category::Weak);

    let brilliant = repositories::classifications::find_for_student_subject(
        ctx.state.db(),
        &student_id,
        &physics.id,
    )
    .await
    .expect("classification")
    .expect("physics classification");
    assert_eq!(brilliant.category, Category::Brilliant);
}

#[tokio::test]
async fn create_student_duplicate_email_returns_conflict() {
    let ctx = test_support::setup_test_context().await;
    let token = admin_token(&ctx).await;

    let class = test_support::insert_class(ctx.state.db(), "10-A").await;
    test_support::insert_student(ctx.state.db(), "First", "10A-01", &class.id, "dup@school.edu", &[])
        .await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/admin/students",
            Some(&token),
            Some(json!({
                "name": "Second",
                "rollNumber": "10A-02",
                "classId": class.id,
                "email": "dup@school.edu",
                "password": "student-pass-123"
            })),
        ))
        .await
        .expect("duplicate student");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_student_rejects_duplicate_mark_subjects() {
    let ctx = test_support::setup_test_context().await;
    let token = admin_token(&ctx).await;

    let class = test_support::insert_class(ctx.state.db(), "10-A").await;
    let maths = test_support::insert_subject(ctx.state.db(), "Mathematics").await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/admin/students",
            Some(&token),
            Some(json!({
                "name": "Dupe Dana",
                "rollNumber": "10A-09",
                "classId": class.id,
                "email": "dana@school.edu",
                "password": "student-pass-123",
                "previousMarks": [
                    { "subjectId": maths.id, "marks": 35.0 },
                    { "subjectId": maths.id, "marks": 40.0 }
                ]
            })),
        ))
        .await
        .expect("duplicate mark subjects");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_student_with_unknown_class_is_rejected() {
    let ctx = test_support::setup_test_context().await;
    let token = admin_token(&ctx).await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/admin/students",
            Some(&token),
            Some(json!({
                "name": "Orphan",
                "rollNumber": "00-00",
                "classId": "missing-class",
                "email": "orphan@school.edu",
                "password": "student-pass-123"
            })),
        ))
        .await
        .expect("create student");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_student_replaces_marks_without_touching_classifications() {
    let ctx = test_support::setup_test_context().await;
    let token = admin_token(&ctx).await;

    let class = test_support::insert_class(ctx.state.db(), "10-B").await;
    let maths = test_support::insert_subject(ctx.state.db(), "Mathematics").await;
    let (_, student) = test_support::insert_student(
        ctx.state.db(),
        "Ben",
        "10B-01",
        &class.id,
        "ben@school.edu",
        &[(maths.id.clone(), 35.0)],
    )
    .await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::PUT,
            &format!("/api/admin/students/{}", student.id),
            Some(&token),
            Some(json!({
                "name": "Benjamin",
                "previousMarks": [ { "subjectId": maths.id, "marks": 45.0 } ]
            })),
        ))
        .await
        .expect("update student");

    let status = response.status();
    let updated = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {updated}");
    assert_eq!(updated["name"], "Benjamin");
    assert_eq!(updated["previous_marks"][0]["marks"], 45.0);

    // Classifications stay stale until the rebuild endpoint runs.
    let classification = repositories::classifications::find_for_student_subject(
        ctx.state.db(),
        &student.id,
        &maths.id,
    )
    .await
    .expect("classification")
    .expect("classification row");
    assert_eq!(classification.category, Category::Weak);
}

#[tokio::test]
async fn classify_rebuilds_all_bands_and_is_idempotent() {
    let ctx = test_support::setup_test_context().await;
    let token = admin_token(&ctx).await;

    let class = test_support::insert_class(ctx.state.db(), "10-C").await;
    let maths = test_support::insert_subject(ctx.state.db(), "Mathematics").await;
    let (_, student) = test_support::insert_student(
        ctx.state.db(),
        "Carla",
        "10C-01",
        &class.id,
        "carla@school.edu",
        &[(maths.id.clone(), 35.0)],
    )
    .await;

    repositories::students::replace_marks(
        ctx.state.db(),
        &student.id,
        &[(maths.id.clone(), 45.0)],
    )
    .await
    .expect("replace marks");

    for _ in 0..2 {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/admin/classify",
                Some(&token),
                None,
            ))
            .await
            .expect("classify");

        let status = response.status();
        let body = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::OK, "response: {body}");
        assert_eq!(body["message"], "Classified 1 student marks");
    }

    let classification = repositories::classifications::find_for_student_subject(
        ctx.state.db(),
        &student.id,
        &maths.id,
    )
    .await
    .expect("classification")
    .expect("classification row");
    assert_eq!(classification.category, Category::Good);

    let total = repositories::classifications::count(ctx.state.db()).await.expect("count");
    assert_eq!(total, 1);
}

#[tokio::test]
async fn teacher_crud_and_catalog_routes() {
    let ctx = test_support::setup_test_context().await;
    let token = admin_token(&ctx).await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/admin/teachers",
            Some(&token),
            Some(json!({
                "name": "Mr. Iyer",
                "email": "iyer@school.edu",
                "password": "teacher-pass-123"
            })),
        ))
        .await
        .expect("create teacher");

    let status = response.status();
    let teacher = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::CREATED, "response: {teacher}");
    let teacher_id = teacher["id"].as_str().expect("teacher id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::PUT,
            &format!("/api/admin/teachers/{teacher_id}"),
            Some(&token),
            Some(json!({ "name": "Dr. Iyer" })),
        ))
        .await
        .expect("rename teacher");

    let status = response.status();
    let renamed = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::OK, "response: {renamed}");
    assert_eq!(renamed["name"], "Dr. Iyer");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/admin/subjects",
            Some(&token),
            Some(json!({ "name": "Chemistry" })),
        ))
        .await
        .expect("create subject");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/admin/subjects",
            Some(&token),
            Some(json!({ "name": "Chemistry" })),
        ))
        .await
        .expect("duplicate subject");
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/admin/teachers/{teacher_id}"),
            Some(&token),
            None,
        ))
        .await
        .expect("delete teacher");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn assignment_requires_a_teacher_role_user() {
    let ctx = test_support::setup_test_context().await;
    let token = admin_token(&ctx).await;

    let class = test_support::insert_class(ctx.state.db(), "10-D").await;
    let subject = test_support::insert_subject(ctx.state.db(), "Biology").await;
    let (student_user, _) = test_support::insert_student(
        ctx.state.db(),
        "Dev",
        "10D-01",
        &class.id,
        "dev@school.edu",
        &[],
    )
    .await;

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/admin/assignments",
            Some(&token),
            Some(json!({
                "teacherUserId": student_user.id,
                "classId": class.id,
                "subjectId": subject.id
            })),
        ))
        .await
        .expect("assignment with student user");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (teacher_user, _) =
        test_support::insert_teacher(ctx.state.db(), "Ms. Devi", "devi@school.edu").await;

    let response = ctx
        .app
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/admin/assignments",
            Some(&token),
            Some(json!({
                "teacherUserId": teacher_user.id,
                "classId": class.id,
                "subjectId": subject.id
            })),
        ))
        .await
        .expect("assignment with teacher user");
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn admin_routes_reject_other_roles() {
    let ctx = test_support::setup_test_context().await;

    let (teacher_user, _) =
        test_support::insert_teacher(ctx.state.db(), "Mr. Roy", "roy@school.edu").await;
    let token = test_support::bearer_token(&teacher_user, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::GET,
            "/api/admin/students",
            Some(&token),
            None,
        ))
        .await
        .expect("teacher on admin route");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .app
        .oneshot(test_support::json_request(Method::GET, "/api/admin/students", None, None))
        .await
        .expect("anonymous on admin route");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
