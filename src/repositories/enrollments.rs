use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Enrollment;
use crate::db::types::EnrollmentStatus;

const ENROLLMENT_COLUMNS: &str =
    "id, user_id, course_id, status, progress, enrolled_at, updated_at";

pub(crate) struct CreateEnrollment<'a> {
    pub(crate) id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) course_id: &'a str,
    pub(crate) status: EnrollmentStatus,
    pub(crate) progress: f64,
    pub(crate) enrolled_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) struct UpdateEnrollment {
    pub(crate) status: EnrollmentStatus,
    pub(crate) progress: f64,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateEnrollment<'_>,
) -> Result<Enrollment, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "INSERT INTO enrollments (
            id, user_id, course_id, status, progress, enrolled_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7)
         RETURNING {ENROLLMENT_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.course_id)
    .bind(params.status)
    .bind(params.progress)
    .bind(params.enrolled_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    enrollment_id: &str,
) -> Result<Option<Enrollment>, sqlx::Error> {
    sqlx::query_as::<_, Enrollment>(&format!(
        "SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = $1",
    ))
    .bind(enrollment_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn update(
    pool: &PgPool,
    enrollment_id: &str,
    params: UpdateEnrollment,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE enrollments SET status = $1, progress = $2, updated_at = $3 WHERE id = $4",
    )
    .bind(params.status)
    .bind(params.progress)
    .bind(params.updated_at)
    .bind(enrollment_id)
    .execute(pool)
    .await?;
    Ok(())
}
