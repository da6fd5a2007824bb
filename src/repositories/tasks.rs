use sqlx::PgPool;

use crate::db::models::Task;

const COLUMNS: &str =
    "id, description, teacher_user_id, class_id, subject_id, target_category, created_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!("SELECT {COLUMNS} FROM tasks WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_for_teacher(
    pool: &PgPool,
    teacher_user_id: &str,
) -> Result<Vec<Task>, sqlx::Error> {
    sqlx::query_as::<_, Task>(&format!(
        "SELECT {COLUMNS} FROM tasks WHERE teacher_user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(teacher_user_id)
    .fetch_all(pool)
    .await
}

/// Deletes a task owned by the teacher; status rows go with it via cascade.
pub(crate) async fn delete_owned(
    pool: &PgPool,
    id: &str,
    teacher_user_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND teacher_user_id = $2")
        .bind(id)
        .bind(teacher_user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn assigned_student_ids(
    pool: &PgPool,
    task_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT student_id FROM student_task_statuses WHERE task_id = $1 ORDER BY student_id",
    )
    .bind(task_id)
    .fetch_all(pool)
    .await
}
