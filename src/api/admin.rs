use std::collections::HashSet;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::validation::{validate_email, validate_password_len, validate_required};
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::catalog::{
    AssignmentCreate, AssignmentResponse, ClassResponse, NamedCreate, SubjectResponse,
};
use crate::schemas::student::{MarkEntry, StudentCreate, StudentResponse, StudentUpdate};
use crate::schemas::teacher::{TeacherCreate, TeacherResponse, TeacherUpdate};
use crate::schemas::MessageResponse;
use crate::services::{classification, enrollment};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/students", post(create_student).get(list_students))
        .route(
            "/students/:student_id",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/teachers", post(create_teacher).get(list_teachers))
        .route(
            "/teachers/:teacher_id",
            get(get_teacher).put(update_teacher).delete(delete_teacher),
        )
        .route("/classes", post(create_class).get(list_classes))
        .route("/classes/:class_id", get(get_class).put(update_class).delete(delete_class))
        .route("/subjects", post(create_subject).get(list_subjects))
        .route("/subjects/:subject_id", get(get_subject).put(update_subject).delete(delete_subject))
        .route("/assignments", post(create_assignment).get(list_assignments))
        .route("/assignments/:assignment_id", delete(delete_assignment))
        .route("/classify", post(run_classification))
}

async fn validate_marks(state: &AppState, marks: &[MarkEntry]) -> Result<(), ApiError> {
    let mut seen = HashSet::new();
    for entry in marks {
        if !seen.insert(entry.subject_id.as_str()) {
            return Err(ApiError::BadRequest(format!(
                "Duplicate subject {} in marks",
                entry.subject_id
            )));
        }
        let subject = repositories::subjects::find_by_id(state.db(), &entry.subject_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch subject"))?;
        if subject.is_none() {
            return Err(ApiError::BadRequest(format!("Unknown subject {}", entry.subject_id)));
        }
    }
    Ok(())
}

async fn create_student(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<StudentCreate>,
) -> Result<(StatusCode, Json<StudentResponse>), ApiError> {
    validate_required("name", &payload.name)?;
    validate_required("rollNumber", &payload.roll_number)?;
    validate_email(&payload.email)?;
    validate_password_len(&payload.password)?;

    let class = repositories::classes::find_by_id(state.db(), &payload.class_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch class"))?;
    if class.is_none() {
        return Err(ApiError::BadRequest(format!("Unknown class {}", payload.class_id)));
    }
    validate_marks(&state, &payload.previous_marks).await?;

    let existing = repositories::users::exists_by_email(state.db(), &payload.email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing user"))?;
    if existing.is_some() {
        return Err(ApiError::Conflict("User with this email already exists".to_string()));
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let marks: Vec<(String, f64)> = payload
        .previous_marks
        .iter()
        .map(|entry| (entry.subject_id.clone(), entry.marks))
        .collect();

    let student = enrollment::enroll_student(
        state.db(),
        enrollment::NewStudent {
            name: &payload.name,
            roll_number: &payload.roll_number,
            class_id: &payload.class_id,
            email: &payload.email,
            hashed_password,
            marks: &marks,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create student"))?;

    let marks = repositories::students::list_marks(state.db(), &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch student marks"))?;

    Ok((StatusCode::CREATED, Json(StudentResponse::from_db(student, marks))))
}

async fn list_students(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<StudentResponse>>, ApiError> {
    let students = repositories::students::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list students"))?;

    let mut responses = Vec::with_capacity(students.len());
    for student in students {
        let marks = repositories::students::list_marks(state.db(), &student.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch student marks"))?;
        responses.push(StudentResponse::from_db(student, marks));
    }

    Ok(Json(responses))
}

async fn get_student(
    Path(student_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<StudentResponse>, ApiError> {
    let student = repositories::students::find_by_id(state.db(), &student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch student"))?
        .ok_or_else(|| ApiError::NotFound("Student not found".to_string()))?;

    let marks = repositories::students::list_marks(state.db(), &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch student marks"))?;

    Ok(Json(StudentResponse::from_db(student, marks)))
}

async fn update_student(
    Path(student_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<StudentUpdate>,
) -> Result<Json<StudentResponse>, ApiError> {
    if let Some(class_id) = payload.class_id.as_deref() {
        let class = repositories::classes::find_by_id(state.db(), class_id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch class"))?;
        if class.is_none() {
            return Err(ApiError::BadRequest(format!("Unknown class {class_id}")));
        }
    }
    if let Some(marks) = payload.previous_marks.as_deref() {
        validate_marks(&state, marks).await?;
    }

    let student = repositories::students::update(
        state.db(),
        &student_id,
        repositories::students::UpdateStudent {
            name: payload.name,
            roll_number: payload.roll_number,
            class_id: payload.class_id,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update student"))?
    .ok_or_else(|| ApiError::NotFound("Student not found".to_string()))?;

    if let Some(entries) = payload.previous_marks {
        let marks: Vec<(String, f64)> =
            entries.iter().map(|entry| (entry.subject_id.clone(), entry.marks)).collect();
        repositories::students::replace_marks(state.db(), &student.id, &marks)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to replace student marks"))?;
    }

    let marks = repositories::students::list_marks(state.db(), &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch student marks"))?;

    Ok(Json(StudentResponse::from_db(student, marks)))
}

async fn delete_student(
    Path(student_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::students::delete(state.db(), &student_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete student"))?;

    if deleted {
        Ok(Json(MessageResponse { message: "Student deleted".to_string() }))
    } else {
        Err(ApiError::NotFound("Student not found".to_string()))
    }
}

async fn create_teacher(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<TeacherCreate>,
) -> Result<(StatusCode, Json<TeacherResponse>), ApiError> {
    validate_required("name", &payload.name)?;
    validate_email(&payload.email)?;
    validate_password_len(&payload.password)?;

    let existing = repositories::users::exists_by_email(state.db(), &payload.email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing user"))?;
    if existing.is_some() {
        return Err(ApiError::Conflict("User with this email already exists".to_string()));
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let teacher = enrollment::enroll_teacher(
        state.db(),
        enrollment::NewTeacher { name: &payload.name, email: &payload.email, hashed_password },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create teacher"))?;

    Ok((StatusCode::CREATED, Json(TeacherResponse::from_db(teacher))))
}

async fn list_teachers(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<TeacherResponse>>, ApiError> {
    let teachers = repositories::teachers::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list teachers"))?;

    Ok(Json(teachers.into_iter().map(TeacherResponse::from_db).collect()))
}

async fn get_teacher(
    Path(teacher_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<TeacherResponse>, ApiError> {
    let teacher = repositories::teachers::find_by_id(state.db(), &teacher_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch teacher"))?
        .ok_or_else(|| ApiError::NotFound("Teacher not found".to_string()))?;

    Ok(Json(TeacherResponse::from_db(teacher)))
}

async fn update_teacher(
    Path(teacher_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<TeacherUpdate>,
) -> Result<Json<TeacherResponse>, ApiError> {
    let Some(name) = payload.name else {
        return Err(ApiError::BadRequest("name is required".to_string()));
    };
    validate_required("name", &name)?;

    let teacher =
        repositories::teachers::update_name(state.db(), &teacher_id, Some(name), primitive_now_utc())
            .await
            .map_err(|e| ApiError::internal(e, "Failed to update teacher"))?
            .ok_or_else(|| ApiError::NotFound("Teacher not found".to_string()))?;

    Ok(Json(TeacherResponse::from_db(teacher)))
}

async fn delete_teacher(
    Path(teacher_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::teachers::delete(state.db(), &teacher_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete teacher"))?;

    if deleted {
        Ok(Json(MessageResponse { message: "Teacher deleted".to_string() }))
    } else {
        Err(ApiError::NotFound("Teacher not found".to_string()))
    }
}

async fn create_class(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<NamedCreate>,
) -> Result<(StatusCode, Json<ClassResponse>), ApiError> {
    validate_required("name", &payload.name)?;

    let class = repositories::classes::create(
        state.db(),
        &Uuid::new_v4().to_string(),
        &payload.name,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create class"))?;

    Ok((StatusCode::CREATED, Json(ClassResponse::from_db(class))))
}

async fn list_classes(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<ClassResponse>>, ApiError> {
    let classes = repositories::classes::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list classes"))?;

    Ok(Json(classes.into_iter().map(ClassResponse::from_db).collect()))
}

async fn get_class(
    Path(class_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<ClassResponse>, ApiError> {
    let class = repositories::classes::find_by_id(state.db(), &class_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch class"))?
        .ok_or_else(|| ApiError::NotFound("Class not found".to_string()))?;

    Ok(Json(ClassResponse::from_db(class)))
}

async fn update_class(
    Path(class_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<NamedCreate>,
) -> Result<Json<ClassResponse>, ApiError> {
    validate_required("name", &payload.name)?;

    let class = repositories::classes::update_name(
        state.db(),
        &class_id,
        &payload.name,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update class"))?
    .ok_or_else(|| ApiError::NotFound("Class not found".to_string()))?;

    Ok(Json(ClassResponse::from_db(class)))
}

async fn delete_class(
    Path(class_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::classes::delete(state.db(), &class_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete class"))?;

    if deleted {
        Ok(Json(MessageResponse { message: "Class deleted".to_string() }))
    } else {
        Err(ApiError::NotFound("Class not found".to_string()))
    }
}

async fn create_subject(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<NamedCreate>,
) -> Result<(StatusCode, Json<SubjectResponse>), ApiError> {
    validate_required("name", &payload.name)?;

    let existing = repositories::subjects::exists_by_name(state.db(), &payload.name)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing subject"))?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Subject with this name already exists".to_string()));
    }

    let subject = repositories::subjects::create(
        state.db(),
        &Uuid::new_v4().to_string(),
        &payload.name,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create subject"))?;

    Ok((StatusCode::CREATED, Json(SubjectResponse::from_db(subject))))
}

async fn list_subjects(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubjectResponse>>, ApiError> {
    let subjects = repositories::subjects::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list subjects"))?;

    Ok(Json(subjects.into_iter().map(SubjectResponse::from_db).collect()))
}

async fn get_subject(
    Path(subject_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<SubjectResponse>, ApiError> {
    let subject = repositories::subjects::find_by_id(state.db(), &subject_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch subject"))?
        .ok_or_else(|| ApiError::NotFound("Subject not found".to_string()))?;

    Ok(Json(SubjectResponse::from_db(subject)))
}

async fn update_subject(
    Path(subject_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<NamedCreate>,
) -> Result<Json<SubjectResponse>, ApiError> {
    validate_required("name", &payload.name)?;

    let subject = repositories::subjects::update_name(
        state.db(),
        &subject_id,
        &payload.name,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update subject"))?
    .ok_or_else(|| ApiError::NotFound("Subject not found".to_string()))?;

    Ok(Json(SubjectResponse::from_db(subject)))
}

async fn delete_subject(
    Path(subject_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::subjects::delete(state.db(), &subject_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete subject"))?;

    if deleted {
        Ok(Json(MessageResponse { message: "Subject deleted".to_string() }))
    } else {
        Err(ApiError::NotFound("Subject not found".to_string()))
    }
}

async fn create_assignment(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<AssignmentCreate>,
) -> Result<(StatusCode, Json<AssignmentResponse>), ApiError> {
    let teacher_user = repositories::users::find_by_id(state.db(), &payload.teacher_user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?;
    match teacher_user {
        Some(user) if user.role == UserRole::Teacher => {}
        _ => {
            return Err(ApiError::BadRequest(format!(
                "Unknown teacher {}",
                payload.teacher_user_id
            )))
        }
    }

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

    let assignment = repositories::teacher_assignments::create(
        state.db(),
        repositories::teacher_assignments::CreateAssignment {
            id: &Uuid::new_v4().to_string(),
            teacher_user_id: &payload.teacher_user_id,
            class_id: &payload.class_id,
            subject_id: &payload.subject_id,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create assignment"))?;

    Ok((StatusCode::CREATED, Json(AssignmentResponse::from_db(assignment))))
}

async fn list_assignments(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<AssignmentResponse>>, ApiError> {
    let assignments = repositories::teacher_assignments::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list assignments"))?;

    Ok(Json(assignments.into_iter().map(AssignmentResponse::from_db).collect()))
}

async fn delete_assignment(
    Path(assignment_id): Path<String>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = repositories::teacher_assignments::delete(state.db(), &assignment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete assignment"))?;

    if deleted {
        Ok(Json(MessageResponse { message: "Assignment deleted".to_string() }))
    } else {
        Err(ApiError::NotFound("Assignment not found".to_string()))
    }
}

async fn run_classification(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let count = classification::rebuild_classifications(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to rebuild classifications"))?;

    Ok(Json(MessageResponse { message: format!("Classified {count} student marks") }))
}

#[cfg(test)]
mod tests;
