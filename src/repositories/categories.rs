use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Category;

const CATEGORY_COLUMNS: &str = "id, name, slug, parent_id, created_at, updated_at";

pub(crate) struct CreateCategory<'a> {
    pub(crate) id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) slug: &'a str,
    pub(crate) parent_id: Option<&'a str>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) struct UpdateCategory {
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) parent_id: Option<String>,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateCategory<'_>,
) -> Result<Category, sqlx::Error> {
    sqlx::query_as::<_, Category>(&format!(
        "INSERT INTO categories (id, name, slug, parent_id, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6)
         RETURNING {CATEGORY_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.slug)
    .bind(params.parent_id)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    category_id: &str,
) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1",
    ))
    .bind(category_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_all(pool: &PgPool) -> Result<Vec<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name, id",
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn update(
    pool: &PgPool,
    category_id: &str,
    params: UpdateCategory,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE categories SET name = $1, slug = $2, parent_id = $3, updated_at = $4 WHERE id = $5",
    )
    .bind(params.name)
    .bind(params.slug)
    .bind(params.parent_id)
    .bind(params.updated_at)
    .bind(category_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub(crate) async fn delete(pool: &PgPool, category_id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(category_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
