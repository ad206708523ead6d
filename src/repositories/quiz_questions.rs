use sqlx::types::Json;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::QuizQuestion;
use crate::db::types::QuestionType;

const QUESTION_COLUMNS: &str = "id, quiz_id, question_text, question_type, options, \
     correct_answer, explanation, points, sort_order, created_at, updated_at";

pub(crate) struct AppendQuestion<'a> {
    pub(crate) id: &'a str,
    pub(crate) quiz_id: &'a str,
    pub(crate) question_text: &'a str,
    pub(crate) question_type: QuestionType,
    pub(crate) options: Option<Vec<String>>,
    pub(crate) correct_answer: &'a str,
    pub(crate) explanation: Option<&'a str>,
    pub(crate) points: f64,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) struct UpdateQuestion {
    pub(crate) question_text: String,
    pub(crate) question_type: QuestionType,
    pub(crate) options: Option<Vec<String>>,
    pub(crate) correct_answer: String,
    pub(crate) explanation: Option<String>,
    pub(crate) points: f64,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn append(
    pool: &PgPool,
    params: AppendQuestion<'_>,
) -> Result<QuizQuestion, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let siblings: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM quiz_questions WHERE quiz_id = $1")
            .bind(params.quiz_id)
            .fetch_one(&mut *tx)
            .await?;

    let question = sqlx::query_as::<_, QuizQuestion>(&format!(
        "INSERT INTO quiz_questions (
            id, quiz_id, question_text, question_type, options, correct_answer,
            explanation, points, sort_order, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
         RETURNING {QUESTION_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.quiz_id)
    .bind(params.question_text)
    .bind(params.question_type)
    .bind(params.options.map(Json))
    .bind(params.correct_answer)
    .bind(params.explanation)
    .bind(params.points)
    .bind(siblings as i32)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(question)
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    question_id: &str,
) -> Result<Option<QuizQuestion>, sqlx::Error> {
    sqlx::query_as::<_, QuizQuestion>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM quiz_questions WHERE id = $1",
    ))
    .bind(question_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_for_quiz(
    pool: &PgPool,
    quiz_id: &str,
) -> Result<Vec<QuizQuestion>, sqlx::Error> {
    sqlx::query_as::<_, QuizQuestion>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM quiz_questions
         WHERE quiz_id = $1
         ORDER BY sort_order, id",
    ))
    .bind(quiz_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn update(
    pool: &PgPool,
    question_id: &str,
    params: UpdateQuestion,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE quiz_questions SET
            question_text = $1,
            question_type = $2,
            options = $3,
            correct_answer = $4,
            explanation = $5,
            points = $6,
            updated_at = $7
         WHERE id = $8",
    )
    .bind(params.question_text)
    .bind(params.question_type)
    .bind(params.options.map(Json))
    .bind(params.correct_answer)
    .bind(params.explanation)
    .bind(params.points)
    .bind(params.updated_at)
    .bind(question_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn delete(pool: &PgPool, question_id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM quiz_questions WHERE id = $1")
        .bind(question_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
