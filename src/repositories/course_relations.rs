use std::collections::BTreeSet;

use sqlx::PgPool;

/// Replace the category set of a course. Delete-then-insert, but inside one
/// transaction so the relations are never observable half-gone.
pub(crate) async fn replace_categories(
    pool: &PgPool,
    course_id: &str,
    category_ids: &[String],
) -> Result<(), sqlx::Error> {
    replace_relations(pool, "course_categories", "category_id", course_id, category_ids).await
}

/// Replace the tag set of a course, same contract as [`replace_categories`].
pub(crate) async fn replace_tags(
    pool: &PgPool,
    course_id: &str,
    tag_ids: &[String],
) -> Result<(), sqlx::Error> {
    replace_relations(pool, "course_tag_map", "tag_id", course_id, tag_ids).await
}

async fn replace_relations(
    pool: &PgPool,
    table: &str,
    related_column: &str,
    course_id: &str,
    related_ids: &[String],
) -> Result<(), sqlx::Error> {
    // Dedupe so a repeated id in the form payload cannot violate the PK.
    let desired: BTreeSet<&String> = related_ids.iter().collect();

    let mut tx = pool.begin().await?;

    sqlx::query(&format!("DELETE FROM {table} WHERE course_id = $1"))
        .bind(course_id)
        .execute(&mut *tx)
        .await?;

    for related_id in desired {
        sqlx::query(&format!(
            "INSERT INTO {table} (course_id, {related_column}) VALUES ($1, $2)",
        ))
        .bind(course_id)
        .bind(related_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

pub(crate) async fn list_category_ids(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT category_id FROM course_categories WHERE course_id = $1 ORDER BY category_id",
    )
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_tag_ids(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT tag_id FROM course_tag_map WHERE course_id = $1 ORDER BY tag_id")
        .bind(course_id)
        .fetch_all(pool)
        .await
}
