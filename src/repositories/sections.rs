use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Section;

const SECTION_COLUMNS: &str = "id, course_id, title, description, sort_order, created_at, updated_at";

pub(crate) struct AppendSection<'a> {
    pub(crate) id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) description: Option<&'a str>,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) struct UpdateSection {
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// Appends at the end: sort_order is the current sibling count. Count and
/// insert run in one transaction; concurrent appends from separate
/// connections can still tie, which reads tolerate (see `list_for_course`).
pub(crate) async fn append(
    pool: &PgPool,
    params: AppendSection<'_>,
) -> Result<Section, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let siblings: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM course_sections WHERE course_id = $1")
            .bind(params.course_id)
            .fetch_one(&mut *tx)
            .await?;

    let section = sqlx::query_as::<_, Section>(&format!(
        "INSERT INTO course_sections (
            id, course_id, title, description, sort_order, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7)
         RETURNING {SECTION_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.course_id)
    .bind(params.title)
    .bind(params.description)
    .bind(siblings as i32)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(section)
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    section_id: &str,
) -> Result<Option<Section>, sqlx::Error> {
    sqlx::query_as::<_, Section>(&format!(
        "SELECT {SECTION_COLUMNS} FROM course_sections WHERE id = $1",
    ))
    .bind(section_id)
    .fetch_optional(pool)
    .await
}

/// Sort order may contain gaps and ties; the id tie-break keeps reads stable.
pub(crate) async fn list_for_course(
    pool: &PgPool,
    course_id: &str,
) -> Result<Vec<Section>, sqlx::Error> {
    sqlx::query_as::<_, Section>(&format!(
        "SELECT {SECTION_COLUMNS} FROM course_sections
         WHERE course_id = $1
         ORDER BY sort_order, id",
    ))
    .bind(course_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn update(
    pool: &PgPool,
    section_id: &str,
    params: UpdateSection,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE course_sections SET title = $1, description = $2, updated_at = $3 WHERE id = $4",
    )
    .bind(params.title)
    .bind(params.description)
    .bind(params.updated_at)
    .bind(section_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Siblings keep their sort_order; gaps are acceptable because ordering is
/// only ever read via ORDER BY, never by positional index.
pub(crate) async fn delete(pool: &PgPool, section_id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM course_sections WHERE id = $1")
        .bind(section_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
