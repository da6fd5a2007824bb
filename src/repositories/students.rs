use sqlx::PgPool;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::db::models::{Student, StudentMark};

const COLUMNS: &str = "id, user_id, name, roll_number, class_id, created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_user_id(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!("SELECT {COLUMNS} FROM students WHERE user_id = $1"))
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "SELECT {COLUMNS} FROM students ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_by_class(
    pool: &PgPool,
    class_id: &str,
) -> Result<Vec<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "SELECT {COLUMNS} FROM students WHERE class_id = $1 ORDER BY roll_number"
    ))
    .bind(class_id)
    .fetch_all(pool)
    .await
}

pub(crate) struct CreateStudent<'a> {
    pub id: &'a str,
    pub user_id: &'a str,
    pub name: &'a str,
    pub roll_number: &'a str,
    pub class_id: &'a str,
    pub created_at: PrimitiveDateTime,
    pub updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateStudent<'_>,
) -> Result<Student, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "INSERT INTO students (id, user_id, name, roll_number, class_id, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6,$7)
         RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.name)
    .bind(params.roll_number)
    .bind(params.class_id)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateStudent {
    pub name: Option<String>,
    pub roll_number: Option<String>,
    pub class_id: Option<String>,
    pub updated_at: PrimitiveDateTime,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateStudent,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as::<_, Student>(&format!(
        "UPDATE students SET
            name = COALESCE($1, name),
            roll_number = COALESCE($2, roll_number),
            class_id = COALESCE($3, class_id),
            updated_at = $4
         WHERE id = $5
         RETURNING {COLUMNS}",
    ))
    .bind(params.name)
    .bind(params.roll_number)
    .bind(params.class_id)
    .bind(params.updated_at)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM students WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn list_marks(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<StudentMark>, sqlx::Error> {
    sqlx::query_as::<_, StudentMark>(
        "SELECT id, student_id, subject_id, marks FROM student_marks
         WHERE student_id = $1 ORDER BY subject_id",
    )
    .bind(student_id)
    .fetch_all(pool)
    .await
}

/// Drops and re-inserts the student's per-subject marks.
pub(crate) async fn replace_marks(
    pool: &PgPool,
    student_id: &str,
    marks: &[(String, f64)],
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM student_marks WHERE student_id = $1")
        .bind(student_id)
        .execute(&mut *tx)
        .await?;

    for (subject_id, value) in marks {
        sqlx::query(
            "INSERT INTO student_marks (id, student_id, subject_id, marks) VALUES ($1,$2,$3,$4)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(student_id)
        .bind(subject_id)
        .bind(value)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}
