use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Tag;

const TAG_COLUMNS: &str = "id, name, slug, created_at, updated_at";

pub(crate) struct CreateTag<'a> {
    pub(crate) id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) slug: &'a str,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) struct UpdateTag {
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateTag<'_>) -> Result<Tag, sqlx::Error> {
    sqlx::query_as::<_, Tag>(&format!(
        "INSERT INTO course_tags (id, name, slug, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5)
         RETURNING {TAG_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.slug)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, tag_id: &str) -> Result<Option<Tag>, sqlx::Error> {
    sqlx::query_as::<_, Tag>(&format!("SELECT {TAG_COLUMNS} FROM course_tags WHERE id = $1"))
        .bind(tag_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_all(pool: &PgPool) -> Result<Vec<Tag>, sqlx::Error> {
    sqlx::query_as::<_, Tag>(&format!("SELECT {TAG_COLUMNS} FROM course_tags ORDER BY name, id"))
        .fetch_all(pool)
        .await
}

pub(crate) async fn update(
    pool: &PgPool,
    tag_id: &str,
    params: UpdateTag,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE course_tags SET name = $1, slug = $2, updated_at = $3 WHERE id = $4")
        .bind(params.name)
        .bind(params.slug)
        .bind(params.updated_at)
        .bind(tag_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub(crate) async fn delete(pool: &PgPool, tag_id: &str) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM course_tags WHERE id = $1").bind(tag_id).execute(pool).await?;
    Ok(result.rows_affected())
}
