use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{Instructor, InstructorStats};

const INSTRUCTOR_COLUMNS: &str =
    "id, name, slug, bio, avatar_url, cover_url, is_featured, sort_order, created_at, updated_at";

const STATS_COLUMNS: &str = "id, name, slug, bio, avatar_url, cover_url, is_featured, \
     sort_order, total_courses, total_reviews, average_rating";

pub(crate) struct CreateInstructor<'a> {
    pub(crate) id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) slug: &'a str,
    pub(crate) bio: Option<&'a str>,
    pub(crate) avatar_url: Option<&'a str>,
    pub(crate) cover_url: Option<&'a str>,
    pub(crate) is_featured: bool,
    pub(crate) sort_order: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) struct UpdateInstructor {
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) bio: Option<String>,
    pub(crate) avatar_url: Option<String>,
    pub(crate) cover_url: Option<String>,
    pub(crate) is_featured: bool,
    pub(crate) sort_order: i32,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateInstructor<'_>,
) -> Result<Instructor, sqlx::Error> {
    sqlx::query_as::<_, Instructor>(&format!(
        "INSERT INTO instructors (
            id, name, slug, bio, avatar_url, cover_url, is_featured, sort_order,
            created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
         RETURNING {INSTRUCTOR_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.slug)
    .bind(params.bio)
    .bind(params.avatar_url)
    .bind(params.cover_url)
    .bind(params.is_featured)
    .bind(params.sort_order)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    instructor_id: &str,
) -> Result<Option<Instructor>, sqlx::Error> {
    sqlx::query_as::<_, Instructor>(&format!(
        "SELECT {INSTRUCTOR_COLUMNS} FROM instructors WHERE id = $1",
    ))
    .bind(instructor_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_all(pool: &PgPool) -> Result<Vec<Instructor>, sqlx::Error> {
    sqlx::query_as::<_, Instructor>(&format!(
        "SELECT {INSTRUCTOR_COLUMNS} FROM instructors
         ORDER BY is_featured DESC, sort_order, id",
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn update(
    pool: &PgPool,
    instructor_id: &str,
    params: UpdateInstructor,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE instructors SET
            name = $1,
            slug = $2,
            bio = $3,
            avatar_url = $4,
            cover_url = $5,
            is_featured = $6,
            sort_order = $7,
            updated_at = $8
         WHERE id = $9",
    )
    .bind(params.name)
    .bind(params.slug)
    .bind(params.bio)
    .bind(params.avatar_url)
    .bind(params.cover_url)
    .bind(params.is_featured)
    .bind(params.sort_order)
    .bind(params.updated_at)
    .bind(instructor_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn delete(pool: &PgPool, instructor_id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM instructors WHERE id = $1")
        .bind(instructor_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Directory listing backed by the precomputed `instructor_stats` view.
pub(crate) async fn list_stats(pool: &PgPool) -> Result<Vec<InstructorStats>, sqlx::Error> {
    sqlx::query_as::<_, InstructorStats>(&format!(
        "SELECT {STATS_COLUMNS} FROM instructor_stats
         ORDER BY is_featured DESC, sort_order, id",
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_stats_by_slug(
    pool: &PgPool,
    slug: &str,
) -> Result<Option<InstructorStats>, sqlx::Error> {
    sqlx::query_as::<_, InstructorStats>(&format!(
        "SELECT {STATS_COLUMNS} FROM instructor_stats WHERE slug = $1",
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await
}
