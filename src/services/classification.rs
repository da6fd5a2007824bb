use sqlx::PgPool;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::StudentMark;
use crate::db::types::Category;

/// Maps a numeric mark to its performance band.
///
/// Bands: below 40 is Weak, 40 through 70 inclusive is Good, above 70 is
/// Brilliant. Both boundaries belong to Good.
pub(crate) fn classify(marks: f64) -> Category {
    if marks < 40.0 {
        Category::Weak
    } else if marks <= 70.0 {
        Category::Good
    } else {
        Category::Brilliant
    }
}

/// Full rebuild: drops every classification row and recreates one per stored
/// mark, all inside a single transaction. Returns the number of rows written.
///
/// Tasks created before a rebuild keep their assignment snapshot; they are
/// not retroactively updated.
pub(crate) async fn rebuild_classifications(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM classifications").execute(&mut *tx).await?;

    let marks = sqlx::query_as::<_, StudentMark>(
        "SELECT id, student_id, subject_id, marks FROM student_marks ORDER BY student_id",
    )
    .fetch_all(&mut *tx)
    .await?;

    let now = primitive_now_utc();
    let mut written = 0u64;

    for mark in &marks {
        sqlx::query(
            "INSERT INTO classifications (id, student_id, subject_id, category, created_at)
             VALUES ($1,$2,$3,$4,$5)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&mark.student_id)
        .bind(&mark.subject_id)
        .bind(classify(mark.marks))
        .bind(now)
        .execute(&mut *tx)
        .await?;
        written += 1;
    }

    tx.commit().await?;

    tracing::info!(rows = written, "Classification rebuild completed");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_below_forty_are_weak() {
        assert_eq!(classify(0.0), Category::Weak);
        assert_eq!(classify(35.0), Category::Weak);
        assert_eq!(classify(39.9), Category::Weak);
    }

    #[test]
    fn boundaries_forty_and_seventy_are_good() {
        assert_eq!(classify(40.0), Category::Good);
        assert_eq!(classify(55.0), Category::Good);
        assert_eq!(classify(70.0), Category::Good);
    }

    #[test]
    fn marks_above_seventy_are_brilliant() {
        assert_eq!(classify(70.1), Category::Brilliant);
        assert_eq!(classify(100.0), Category::Brilliant);
    }
}
