use sqlx::{FromRow, PgPool};
use time::PrimitiveDateTime;

use crate::db::models::StudentTaskStatus;
use crate::db::types::{Category, CompletionStatus};

const COLUMNS: &str =
    "id, student_id, task_id, completion_status, teacher_confirmed, created_at, updated_at";

/// Disjoint views over a teacher's status rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TeacherStatusView {
    Pending,
    AwaitingConfirmation,
    Confirmed,
}

/// Status row joined with student and task context for teacher listings.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct TeacherStatusRow {
    pub(crate) id: String,
    pub(crate) completion_status: CompletionStatus,
    pub(crate) teacher_confirmed: bool,
    pub(crate) student_id: String,
    pub(crate) student_name: String,
    pub(crate) roll_number: String,
    pub(crate) task_id: String,
    pub(crate) task_description: String,
    pub(crate) class_name: String,
    pub(crate) subject_name: String,
}

/// Task joined with the student's own status row for student listings.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct StudentTaskRow {
    pub(crate) status_id: String,
    pub(crate) completion_status: CompletionStatus,
    pub(crate) teacher_confirmed: bool,
    pub(crate) task_id: String,
    pub(crate) description: String,
    pub(crate) target_category: Category,
    pub(crate) class_name: String,
    pub(crate) subject_name: String,
    pub(crate) teacher_name: String,
    pub(crate) assigned_at: PrimitiveDateTime,
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<StudentTaskStatus>, sqlx::Error> {
    sqlx::query_as::<_, StudentTaskStatus>(&format!(
        "SELECT {COLUMNS} FROM student_task_statuses WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Idempotent: re-marking a completed status leaves it completed.
pub(crate) async fn mark_completed(
    pool: &PgPool,
    id: &str,
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE student_task_statuses SET completion_status = $1, updated_at = $2 WHERE id = $3",
    )
    .bind(CompletionStatus::Completed)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn confirm(
    pool: &PgPool,
    id: &str,
    now: PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE student_task_statuses SET teacher_confirmed = TRUE, updated_at = $1 WHERE id = $2",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn list_for_teacher(
    pool: &PgPool,
    teacher_user_id: &str,
    view: TeacherStatusView,
) -> Result<Vec<TeacherStatusRow>, sqlx::Error> {
    let filter = match view {
        TeacherStatusView::Pending => "s.completion_status = 'pending'",
        TeacherStatusView::AwaitingConfirmation => {
            "s.completion_status = 'completed' AND NOT s.teacher_confirmed"
        }
        TeacherStatusView::Confirmed => {
            "s.completion_status = 'completed' AND s.teacher_confirmed"
        }
    };

    sqlx::query_as::<_, TeacherStatusRow>(&format!(
        "SELECT s.id, s.completion_status, s.teacher_confirmed,
                st.id AS student_id, st.name AS student_name, st.roll_number,
                t.id AS task_id, t.description AS task_description,
                c.name AS class_name, subj.name AS subject_name
         FROM student_task_statuses s
         JOIN tasks t ON t.id = s.task_id
         JOIN students st ON st.id = s.student_id
         JOIN classes c ON c.id = t.class_id
         JOIN subjects subj ON subj.id = t.subject_id
         WHERE t.teacher_user_id = $1 AND {filter}
         ORDER BY s.updated_at DESC"
    ))
    .bind(teacher_user_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_for_student(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<StudentTaskRow>, sqlx::Error> {
    sqlx::query_as::<_, StudentTaskRow>(
        "SELECT s.id AS status_id, s.completion_status, s.teacher_confirmed,
                t.id AS task_id, t.description, t.target_category,
                c.name AS class_name, subj.name AS subject_name,
                COALESCE(te.name, u.username) AS teacher_name,
                t.created_at AS assigned_at
         FROM student_task_statuses s
         JOIN tasks t ON t.id = s.task_id
         JOIN classes c ON c.id = t.class_id
         JOIN subjects subj ON subj.id = t.subject_id
         JOIN users u ON u.id = t.teacher_user_id
         LEFT JOIN teachers te ON te.user_id = t.teacher_user_id
         WHERE s.student_id = $1
         ORDER BY t.created_at DESC",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn count_for_task(pool: &PgPool, task_id: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM student_task_statuses WHERE task_id = $1")
        .bind(task_id)
        .fetch_one(pool)
        .await
}
