use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentStudent;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Student;
use crate::repositories;
use crate::schemas::task::StudentTaskResponse;
use crate::schemas::MessageResponse;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks))
        .route("/tasks/:status_id/complete", post(complete_task))
}

async fn own_student_record(state: &AppState, user_id: &str) -> Result<Student, ApiError> {
    repositories::students::find_by_user_id(state.db(), user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch student record"))?
        .ok_or_else(|| ApiError::NotFound("Student record not found".to_string()))
}

async fn list_tasks(
    CurrentStudent(user): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentTaskResponse>>, ApiError> {
    let student = own_student_record(&state, &user.id).await?;

    let rows = repositories::task_statuses::list_for_student(state.db(), &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list tasks"))?;

    Ok(Json(rows.into_iter().map(StudentTaskResponse::from_row).collect()))
}

async fn complete_task(
    Path(status_id): Path<String>,
    CurrentStudent(user): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let student = own_student_record(&state, &user.id).await?;

    let status = repositories::task_statuses::find_by_id(state.db(), &status_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch task status"))?
        .ok_or_else(|| ApiError::NotFound("Task status not found".to_string()))?;

    if status.student_id != student.id {
        return Err(ApiError::Forbidden("Not your task"));
    }

    repositories::task_statuses::mark_completed(state.db(), &status_id, primitive_now_utc())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to mark task completed"))?;

    Ok(Json(MessageResponse { message: "Task marked as completed".to_string() }))
}

#[cfg(test)]
mod tests;
