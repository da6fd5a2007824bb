use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::SchoolClass;

const COLUMNS: &str = "id, name, created_at, updated_at";

pub(crate) async fn find_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<SchoolClass>, sqlx::Error> {
    sqlx::query_as::<_, SchoolClass>(&format!("SELECT {COLUMNS} FROM classes WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<SchoolClass>, sqlx::Error> {
    sqlx::query_as::<_, SchoolClass>(&format!("SELECT {COLUMNS} FROM classes ORDER BY name"))
        .fetch_all(pool)
        .await
}

pub(crate) async fn create(
    pool: &PgPool,
    id: &str,
    name: &str,
    now: PrimitiveDateTime,
) -> Result<SchoolClass, sqlx::Error> {
    sqlx::query_as::<_, SchoolClass>(&format!(
        "INSERT INTO classes (id, name, created_at, updated_at)
         VALUES ($1,$2,$3,$3)
         RETURNING {COLUMNS}",
    ))
    .bind(id)
    .bind(name)
    .bind(now)
    .fetch_one(pool)
    .await
}

pub(crate) async fn update_name(
    pool: &PgPool,
    id: &str,
    name: &str,
    updated_at: PrimitiveDateTime,
) -> Result<Option<SchoolClass>, sqlx::Error> {
    sqlx::query_as::<_, SchoolClass>(&format!(
        "UPDATE classes SET name = $1, updated_at = $2 WHERE id = $3 RETURNING {COLUMNS}",
    ))
    .bind(name)
    .bind(updated_at)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM classes WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
