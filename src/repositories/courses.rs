use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Course;
use crate::db::types::CourseStatus;

const COURSE_COLUMNS: &str = "id, name, slug, description, status, price, sale_price, \
     sale_starts_at, sale_ends_at, access_duration_days, allow_repurchase, \
     evaluation_enabled, passing_grade, instructor_id, published_at, created_at, updated_at";

pub(crate) struct CreateCourse<'a> {
    pub(crate) id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) slug: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) status: CourseStatus,
    pub(crate) price: f64,
    pub(crate) instructor_id: Option<&'a str>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// Full-row update; every column is written from the submitted form.
pub(crate) struct UpdateCourse {
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) description: Option<String>,
    pub(crate) status: CourseStatus,
    pub(crate) price: f64,
    pub(crate) sale_price: Option<f64>,
    pub(crate) sale_starts_at: Option<PrimitiveDateTime>,
    pub(crate) sale_ends_at: Option<PrimitiveDateTime>,
    pub(crate) access_duration_days: Option<i32>,
    pub(crate) allow_repurchase: bool,
    pub(crate) evaluation_enabled: bool,
    pub(crate) passing_grade: f64,
    pub(crate) instructor_id: Option<String>,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateCourse<'_>) -> Result<Course, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "INSERT INTO courses (
            id, name, slug, description, status, price, instructor_id, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)
         RETURNING {COURSE_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.slug)
    .bind(params.description)
    .bind(params.status)
    .bind(params.price)
    .bind(params.instructor_id)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    course_id: &str,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"))
        .bind(course_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_published_by_slug(
    pool: &PgPool,
    slug: &str,
) -> Result<Option<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses WHERE slug = $1 AND status = 'published'",
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn exists_by_slug(pool: &PgPool, slug: &str) -> Result<bool, sqlx::Error> {
    let found: Option<i32> = sqlx::query_scalar("SELECT 1 FROM courses WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

pub(crate) async fn list_all(pool: &PgPool) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses ORDER BY created_at DESC, id",
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_published(pool: &PgPool) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses
         WHERE status = 'published'
         ORDER BY published_at DESC NULLS LAST, id",
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_published_for_instructor(
    pool: &PgPool,
    instructor_id: &str,
) -> Result<Vec<Course>, sqlx::Error> {
    sqlx::query_as::<_, Course>(&format!(
        "SELECT {COURSE_COLUMNS} FROM courses
         WHERE instructor_id = $1 AND status = 'published'
         ORDER BY published_at DESC NULLS LAST, id",
    ))
    .bind(instructor_id)
    .fetch_all(pool)
    .await
}

/// `published_at` is written exactly once, on the first transition into
/// `published`; later updates leave it untouched.
pub(crate) async fn update(
    pool: &PgPool,
    course_id: &str,
    params: UpdateCourse,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE courses SET
            name = $1,
            slug = $2,
            description = $3,
            status = $4,
            price = $5,
            sale_price = $6,
            sale_starts_at = $7,
            sale_ends_at = $8,
            access_duration_days = $9,
            allow_repurchase = $10,
            evaluation_enabled = $11,
            passing_grade = $12,
            instructor_id = $13,
            published_at = CASE
                WHEN $4 = 'published'::coursestatus AND published_at IS NULL THEN $14
                ELSE published_at
            END,
            updated_at = $14
         WHERE id = $15",
    )
    .bind(params.name)
    .bind(params.slug)
    .bind(params.description)
    .bind(params.status)
    .bind(params.price)
    .bind(params.sale_price)
    .bind(params.sale_starts_at)
    .bind(params.sale_ends_at)
    .bind(params.access_duration_days)
    .bind(params.allow_repurchase)
    .bind(params.evaluation_enabled)
    .bind(params.passing_grade)
    .bind(params.instructor_id)
    .bind(params.updated_at)
    .bind(course_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn delete(pool: &PgPool, course_id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM courses WHERE id = $1")
        .bind(course_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
