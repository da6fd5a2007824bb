use sqlx::PgPool;

use crate::db::models::Classification;

const COLUMNS: &str = "id, student_id, subject_id, category, created_at";

pub(crate) async fn list_for_subject_students(
    pool: &PgPool,
    subject_id: &str,
    student_ids: &[String],
) -> Result<Vec<Classification>, sqlx::Error> {
    sqlx::query_as::<_, Classification>(&format!(
        "SELECT {COLUMNS} FROM classifications
         WHERE subject_id = $1 AND student_id = ANY($2)"
    ))
    .bind(subject_id)
    .bind(student_ids)
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_for_student_subject(
    pool: &PgPool,
    student_id: &str,
    subject_id: &str,
) -> Result<Option<Classification>, sqlx::Error> {
    sqlx::query_as::<_, Classification>(&format!(
        "SELECT {COLUMNS} FROM classifications WHERE student_id = $1 AND subject_id = $2"
    ))
    .bind(student_id)
    .bind(subject_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM classifications").fetch_one(pool).await
}
