use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentTeacher;
use crate::api::validation::validate_required;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::User;
use crate::db::types::{Category, CompletionStatus};
use crate::repositories;
use crate::repositories::task_statuses::TeacherStatusView;
use crate::schemas::catalog::{AssignmentResponse, ClassResponse, SubjectResponse};
use crate::schemas::student::{GroupedStudents, StudentSummary};
use crate::schemas::task::{TaskCreate, TaskResponse, TeacherStatusResponse};
use crate::schemas::MessageResponse;
use crate::services::task_fanout;

#[derive(Debug, Deserialize)]
pub(crate) struct StudentListQuery {
    #[serde(alias = "classId")]
    class_id: String,
    #[serde(alias = "subjectId")]
    subject_id: String,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/assignments", get(list_assignments))
        .route("/students", get(list_students))
        .route("/tasks", post(create_task).get(list_tasks))
        .route("/tasks/:task_id", delete(delete_task))
        .route("/pending-confirmations", get(pending_confirmations))
        .route("/completed-students", get(completed_students))
        .route("/not-completed-students", get(not_completed_students))
        .route("/confirm-completion/:status_id", post(confirm_completion))
        .route("/all-classes", get(all_classes))
        .route("/all-subjects", get(all_subjects))
}

/// 403 unless the teacher holds an assignment for the class/subject pair.
async fn require_assignment(
    state: &AppState,
    user: &User,
    class_id: &str,
    subject_id: &str,
) -> Result<(), ApiError> {
    let assignments = repositories::teacher_assignments::list_for_teacher(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch teacher assignments"))?;

    let assigned = assignments
        .iter()
        .any(|assignment| assignment.class_id == class_id && assignment.subject_id == subject_id);

    if assigned {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Not assigned to this class and subject"))
    }
}

async fn list_assignments(
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<Vec<AssignmentResponse>>, ApiError> {
    let assignments = repositories::teacher_assignments::list_for_teacher(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch teacher assignments"))?;

    Ok(Json(assignments.into_iter().map(AssignmentResponse::from_db).collect()))
}

async fn list_students(
    Query(params): Query<StudentListQuery>,
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<GroupedStudents>, ApiError> {
    require_assignment(&state, &user, &params.class_id, &params.subject_id).await?;

    let students = repositories::students::list_by_class(state.db(), &params.class_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list students"))?;

    let student_ids: Vec<String> = students.iter().map(|student| student.id.clone()).collect();
    let classifications = repositories::classifications::list_for_subject_students(
        state.db(),
        &params.subject_id,
        &student_ids,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to fetch classifications"))?;

    let categories: HashMap<&str, Category> = classifications
        .iter()
        .map(|classification| (classification.student_id.as_str(), classification.category))
        .collect();

    // Students without a classification for this subject are left out; they
    // have no marks yet or the rebuild has not run since enrollment.
    let mut grouped = GroupedStudents::default();
    for student in &students {
        match categories.get(student.id.as_str()) {
            Some(Category::Weak) => grouped.weak.push(StudentSummary::from_db(student)),
            Some(Category::Good) => grouped.good.push(StudentSummary::from_db(student)),
            Some(Category::Brilliant) => grouped.brilliant.push(StudentSummary::from_db(student)),
            None => {}
        }
    }

    Ok(Json(grouped))
}

async fn create_task(
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<TaskCreate>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    validate_required("description", &payload.description)?;

    // Any teacher may post a task; only the grouped listing is scoped to
    // assignments. Unknown ids are caught here rather than by the database.
    let class = repositories::classes::find_by_id(state.db(), &payload.class_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch class"))?;
    if class.is_none() {
        return Err(ApiError::BadRequest(format!("Unknown class {}", payload.class_id)));
    }

    let subject = repositories::subjects::find_by_id(state.db(), &payload.subject_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch subject"))?;
    if subject.is_none() {
        return Err(ApiError::BadRequest(format!("Unknown subject {}", payload.subject_id)));
    }

    let (task, assigned_to) = task_fanout::assign_task(
        state.db(),
        task_fanout::AssignTask {
            description: &payload.description,
            class_id: &payload.class_id,
            subject_id: &payload.subject_id,
            target_category: payload.target_category,
            teacher_user_id: &user.id,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to assign task"))?;

    Ok((StatusCode::CREATED, Json(TaskResponse::from_db(task, assigned_to))))
}

async fn list_tasks(
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let tasks = repositories::tasks::list_for_teacher(state.db(), &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list tasks"))?;

    let mut responses = Vec::with_capacity(tasks.len());
    for task in tasks {
        let assigned_to = repositories::tasks::assigned_student_ids(state.db(), &task.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch assigned students"))?;
        responses.push(TaskResponse::from_db(task, assigned_to));
    }

    Ok(Json(responses))
}

async fn delete_task(
    Path(task_id): Path<String>,
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let task = repositories::tasks::find_by_id(state.db(), &task_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch task"))?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if task.teacher_user_id != user.id {
        return Err(ApiError::Forbidden("Not your task"));
    }

    repositories::tasks::delete_owned(state.db(), &task_id, &user.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete task"))?;

    Ok(Json(MessageResponse { message: "Task deleted".to_string() }))
}

async fn pending_confirmations(
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<Vec<TeacherStatusResponse>>, ApiError> {
    status_view(&state, &user, TeacherStatusView::AwaitingConfirmation).await
}

async fn completed_students(
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<Vec<TeacherStatusResponse>>, ApiError> {
    status_view(&state, &user, TeacherStatusView::Confirmed).await
}

async fn not_completed_students(
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<Vec<TeacherStatusResponse>>, ApiError> {
    status_view(&state, &user, TeacherStatusView::Pending).await
}

async fn status_view(
    state: &AppState,
    user: &User,
    view: TeacherStatusView,
) -> Result<Json<Vec<TeacherStatusResponse>>, ApiError> {
    let rows = repositories::task_statuses::list_for_teacher(state.db(), &user.id, view)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list task statuses"))?;

    Ok(Json(rows.into_iter().map(TeacherStatusResponse::from_row).collect()))
}

async fn confirm_completion(
    Path(status_id): Path<String>,
    CurrentTeacher(user): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let status = repositories::task_statuses::find_by_id(state.db(), &status_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch task status"))?
        .ok_or_else(|| ApiError::NotFound("Task status not found".to_string()))?;

    let task = repositories::tasks::find_by_id(state.db(), &status.task_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch task"))?
        .ok_or_else(|| ApiError::NotFound("Task not found".to_string()))?;

    if task.teacher_user_id != user.id {
        return Err(ApiError::Forbidden("Not your task"));
    }

    if status.completion_status == CompletionStatus::Pending {
        return Err(ApiError::Conflict(
            "Student has not completed this task yet".to_string(),
        ));
    }

    repositories::task_statuses::confirm(state.db(), &status_id, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to confirm completion"))?;

    Ok(Json(MessageResponse { message: "Completion confirmed".to_string() }))
}

async fn all_classes(
    CurrentTeacher(_user): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<Vec<ClassResponse>>, ApiError> {
    let classes = repositories::classes::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list classes"))?;

    Ok(Json(classes.into_iter().map(ClassResponse::from_db).collect()))
}

async fn all_subjects(
    CurrentTeacher(_user): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubjectResponse>>, ApiError> {
    let subjects = repositories::subjects::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list subjects"))?;

    Ok(Json(subjects.into_iter().map(SubjectResponse::from_db).collect()))
}

#[cfg(test)]
mod tests;
