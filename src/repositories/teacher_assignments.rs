use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::TeacherAssignment;

const COLUMNS: &str = "id, teacher_user_id, class_id, subject_id, created_at";

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<TeacherAssignment>, sqlx::Error> {
    sqlx::query_as::<_, TeacherAssignment>(&format!(
        "SELECT {COLUMNS} FROM teacher_assignments ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_for_teacher(
    pool: &PgPool,
    teacher_user_id: &str,
) -> Result<Vec<TeacherAssignment>, sqlx::Error> {
    sqlx::query_as::<_, TeacherAssignment>(&format!(
        "SELECT {COLUMNS} FROM teacher_assignments
         WHERE teacher_user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(teacher_user_id)
    .fetch_all(pool)
    .await
}

pub(crate) struct CreateAssignment<'a> {
    pub id: &'a str,
    pub teacher_user_id: &'a str,
    pub class_id: &'a str,
    pub subject_id: &'a str,
    pub created_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateAssignment<'_>,
) -> Result<TeacherAssignment, sqlx::Error> {
    sqlx::query_as::<_, TeacherAssignment>(&format!(
        "INSERT INTO teacher_assignments (id, teacher_user_id, class_id, subject_id, created_at)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.teacher_user_id)
    .bind(params.class_id)
    .bind(params.subject_id)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM teacher_assignments WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}
