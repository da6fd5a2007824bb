use sqlx::PgPool;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::{Student, Teacher, User};
use crate::db::types::UserRole;
use crate::services::classification::classify;

pub(crate) struct NewStudent<'a> {
    pub name: &'a str,
    pub roll_number: &'a str,
    pub class_id: &'a str,
    pub email: &'a str,
    pub hashed_password: String,
    /// (subject_id, marks) pairs; each also seeds a classification row.
    pub marks: &'a [(String, f64)],
}

/// Creates the login user, the student record, its marks, and one
/// classification per mark as a single transactional unit.
pub(crate) async fn enroll_student(
    pool: &PgPool,
    params: NewStudent<'_>,
) -> Result<Student, sqlx::Error> {
    let now = primitive_now_utc();
    let mut tx = pool.begin().await?;

    let user_id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO users (id, username, email, hashed_password, role, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6,$6)",
    )
    .bind(&user_id)
    .bind(params.email)
    .bind(params.email)
    .bind(&params.hashed_password)
    .bind(UserRole::Student)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let student = sqlx::query_as::<_, Student>(
        "INSERT INTO students (id, user_id, name, roll_number, class_id, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6,$6)
         RETURNING id, user_id, name, roll_number, class_id, created_at, updated_at",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&user_id)
    .bind(params.name)
    .bind(params.roll_number)
    .bind(params.class_id)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    for (subject_id, marks) in params.marks {
        sqlx::query(
            "INSERT INTO student_marks (id, student_id, subject_id, marks) VALUES ($1,$2,$3,$4)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&student.id)
        .bind(subject_id)
        .bind(marks)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO classifications (id, student_id, subject_id, category, created_at)
             VALUES ($1,$2,$3,$4,$5)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&student.id)
        .bind(subject_id)
        .bind(classify(*marks))
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(student)
}

pub(crate) struct NewTeacher<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub hashed_password: String,
}

/// Creates the login user and the teacher profile together.
pub(crate) async fn enroll_teacher(
    pool: &PgPool,
    params: NewTeacher<'_>,
) -> Result<Teacher, sqlx::Error> {
    let now = primitive_now_utc();
    let mut tx = pool.begin().await?;

    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (id, username, email, hashed_password, role, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6,$6)
         RETURNING id, username, email, hashed_password, role, created_at, updated_at",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(params.email)
    .bind(params.email)
    .bind(&params.hashed_password)
    .bind(UserRole::Teacher)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    let teacher = sqlx::query_as::<_, Teacher>(
        "INSERT INTO teachers (id, user_id, name, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$4)
         RETURNING id, user_id, name, created_at, updated_at",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&user.id)
    .bind(params.name)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(teacher)
}
