use sqlx::PgPool;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::Task;
use crate::db::types::{Category, CompletionStatus};

pub(crate) struct AssignTask<'a> {
    pub description: &'a str,
    pub class_id: &'a str,
    pub subject_id: &'a str,
    pub target_category: Category,
    pub teacher_user_id: &'a str,
}

/// Creates a task targeted at one classification band and fans out one
/// pending status row per matching student.
///
/// The matching set is the snapshot of students in the class whose current
/// classification for the subject equals the target category; an empty set is
/// valid. Task and status rows are written in one transaction so a partial
/// fan-out can never be observed.
pub(crate) async fn assign_task(
    pool: &PgPool,
    params: AssignTask<'_>,
) -> Result<(Task, Vec<String>), sqlx::Error> {
    let class_student_ids = sqlx::query_scalar::<_, String>(
        "SELECT id FROM students WHERE class_id = $1",
    )
    .bind(params.class_id)
    .fetch_all(pool)
    .await?;

    let assigned_to = sqlx::query_scalar::<_, String>(
        "SELECT student_id FROM classifications
         WHERE subject_id = $1 AND category = $2 AND student_id = ANY($3)
         ORDER BY student_id",
    )
    .bind(params.subject_id)
    .bind(params.target_category)
    .bind(&class_student_ids)
    .fetch_all(pool)
    .await?;

    let now = primitive_now_utc();
    let mut tx = pool.begin().await?;

    let task = sqlx::query_as::<_, Task>(
        "INSERT INTO tasks (id, description, teacher_user_id, class_id, subject_id,
                            target_category, created_at)
         VALUES ($1,$2,$3,$4,$5,$6,$7)
         RETURNING id, description, teacher_user_id, class_id, subject_id,
                   target_category, created_at",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(params.description)
    .bind(params.teacher_user_id)
    .bind(params.class_id)
    .bind(params.subject_id)
    .bind(params.target_category)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;

    for student_id in &assigned_to {
        sqlx::query(
            "INSERT INTO student_task_statuses
                (id, student_id, task_id, completion_status, teacher_confirmed,
                 created_at, updated_at)
             VALUES ($1,$2,$3,$4,FALSE,$5,$5)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(student_id)
        .bind(&task.id)
        .bind(CompletionStatus::Pending)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        task_id = %task.id,
        students = assigned_to.len(),
        category = ?params.target_category,
        "Task fan-out completed"
    );

    Ok((task, assigned_to))
}
