use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Teacher;

const COLUMNS: &str = "id, user_id, name, created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Teacher>, sqlx::Error> {
    sqlx::query_as::<_, Teacher>(&format!("SELECT {COLUMNS} FROM teachers WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<Teacher>, sqlx::Error> {
    sqlx::query_as::<_, Teacher>(&format!(
        "SELECT {COLUMNS} FROM teachers ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) struct CreateTeacher<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub name: &'a str,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateTeacher<'_>,
) -> Result<Teacher, sqlx::Error> {
    sqlx::query_as::<_, Teacher>(&format!(
        "INSERT INTO teachers (id, user_id, name, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.name)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn update_name(
    pool: &PgPool,
    id: &str,
    name: Option<String>,
    updated_at: PrimitiveDateTime,
) -> Result<Option<Teacher>, sqlx::Error> {
    sqlx::query_as::<_, Teacher>(&format!(
        "UPDATE teachers SET name = COALESCE($1, name), updated_at = $2
         WHERE id = $3
         RETURNING {COLUMNS}",
    ))
    .bind(name)
    .bind(updated_at)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM teachers WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
