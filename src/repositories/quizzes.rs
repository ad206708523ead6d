use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Quiz;

const QUIZ_COLUMNS: &str = "id, course_id, section_id, title, passing_score, max_attempts, \
     time_limit_minutes, is_required, sort_order, created_at, updated_at";

pub(crate) struct AppendQuiz<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    /// None makes a "general" quiz not tied to any section.
    pub(crate) section_id: Option<&'a str>,
    pub(crate) title: &'a str,
    pub(crate) passing_score: f64,
    pub(crate) max_attempts: i32,
    pub(crate) time_limit_minutes: Option<i32>,
    pub(crate) is_required: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) struct UpdateQuiz {
    /// None detaches the quiz back into the course's general slot.
    pub(crate) section_id: Option<String>,
    pub(crate) title: String,
    pub(crate) passing_score: f64,
    pub(crate) max_attempts: i32,
    pub(crate) time_limit_minutes: Option<i32>,
    pub(crate) is_required: bool,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// Siblings are the quizzes of the same course in the same section slot;
/// general quizzes (NULL section) count among themselves.
pub(crate) async fn append(pool: &PgPool, params: AppendQuiz<'_>) -> Result<Quiz, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let siblings: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM quizzes
         WHERE course_id = $1 AND section_id IS NOT DISTINCT FROM $2",
    )
    .bind(params.course_id)
    .bind(params.section_id)
    .fetch_one(&mut *tx)
    .await?;

    let quiz = sqlx::query_as::<_, Quiz>(&format!(
        "INSERT INTO quizzes (
            id, course_id, section_id, title, passing_score, max_attempts,
            time_limit_minutes, is_required, sort_order, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
         RETURNING {QUIZ_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.section_id)
    .bind(params.title)
    .bind(params.passing_score)
    .bind(params.max_attempts)
    .bind(params.time_limit_minutes)
    .bind(params.is_required)
    .bind(siblings as i32)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(quiz)
}

pub(crate) async fn find_by_id(pool: &PgPool, quiz_id: &str) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = $1"))
        .bind(quiz_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_for_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(&format!(
        "SELECT {QUIZ_COLUMNS} FROM quizzes
         WHERE course_id = $1
         ORDER BY sort_order, id",
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn update(
    pool: &PgPool,
    quiz_id: &str,
    params: UpdateQuiz,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE quizzes SET
            section_id = $1,
            title = $2,
            passing_score = $3,
            max_attempts = $4,
            time_limit_minutes = $5,
            is_required = $6,
            updated_at = $7
         WHERE id = $8",
    )
    .bind(params.section_id)
    .bind(params.title)
    .bind(params.passing_score)
    .bind(params.max_attempts)
    .bind(params.time_limit_minutes)
    .bind(params.is_required)
    .bind(params.updated_at)
    .bind(quiz_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn delete(pool: &PgPool, quiz_id: &str) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM quizzes WHERE id = $1").bind(quiz_id).execute(pool).await?;
    Ok(result.rows_affected())
}
