use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Lesson;
use crate::db::types::LessonType;

const LESSON_COLUMNS: &str = "id, section_id, course_id, title, lesson_type, content_url, \
     duration_minutes, is_preview, sort_order, created_at, updated_at";

pub(crate) struct AppendLesson<'a> {
    pub(crate) id: &'a str,
    pub(crate) section_id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) lesson_type: LessonType,
    pub(crate) content_url: Option<&'a str>,
    pub(crate) duration_minutes: i32,
    pub(crate) is_preview: bool,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) struct UpdateLesson {
    pub(crate) title: String,
    pub(crate) lesson_type: LessonType,
    pub(crate) content_url: Option<String>,
    pub(crate) duration_minutes: i32,
    pub(crate) is_preview: bool,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn append(pool: &PgPool, params: AppendLesson<'_>) -> Result<Lesson, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let siblings: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM course_lessons WHERE section_id = $1")
            .bind(params.section_id)
            .fetch_one(&mut *tx)
            .await?;

    let lesson = sqlx::query_as::<_, Lesson>(&format!(
        "INSERT INTO course_lessons (
            id, section_id, course_id, title, lesson_type, content_url,
            duration_minutes, is_preview, sort_order, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
         RETURNING {LESSON_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.section_id)
    .bind(params.course_id)
    .bind(params.title)
    .bind(params.lesson_type)
    .bind(params.content_url)
    .bind(params.duration_minutes)
    .bind(params.is_preview)
    .bind(siblings as i32)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(lesson)
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    lesson_id: &str,
) -> Result<Option<Lesson>, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(&format!(
        "SELECT {LESSON_COLUMNS} FROM course_lessons WHERE id = $1",
    ))
    .bind(lesson_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_for_section(
    pool: &PgPool,
    section_id: &str,
) -> Result<Vec<Lesson>, sqlx::Error> {
    sqlx::query_as::<_, Lesson>(&format!(
        "SELECT {LESSON_COLUMNS} FROM course_lessons
         WHERE section_id = $1
         ORDER BY sort_order, id",
    ))
    .bind(section_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn update(
    pool: &PgPool,
    lesson_id: &str,
    params: UpdateLesson,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE course_lessons SET
            title = $1,
            lesson_type = $2,
            content_url = $3,
            duration_minutes = $4,
            is_preview = $5,
            updated_at = $6
         WHERE id = $7",
    )
    .bind(params.title)
    .bind(params.lesson_type)
    .bind(params.content_url)
    .bind(params.duration_minutes)
    .bind(params.is_preview)
    .bind(params.updated_at)
    .bind(lesson_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn delete(pool: &PgPool, lesson_id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM course_lessons WHERE id = $1")
        .bind(lesson_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
