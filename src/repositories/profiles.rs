use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::Profile;
use crate::db::types::UserRole;

const PROFILE_COLUMNS: &str =
    "id, email, hashed_password, display_name, role, created_at, updated_at";

pub(crate) struct CreateProfile<'a> {
    pub(crate) id: &'a str,
    pub(crate) email: &'a str,
    pub(crate) hashed_password: &'a str,
    pub(crate) display_name: &'a str,
    pub(crate) role: UserRole,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) struct UpdateProfile {
    pub(crate) display_name: Option<String>,
    pub(crate) role: Option<UserRole>,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateProfile<'_>,
) -> Result<Profile, sqlx::Error> {
    sqlx::query_as::<_, Profile>(&format!(
        "INSERT INTO profiles (
            id, email, hashed_password, display_name, role, created_at, updated_at
         ) VALUES ($1,$2,$3,$4,$5,$6,$7)
         RETURNING {PROFILE_COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.email)
    .bind(params.hashed_password)
    .bind(params.display_name)
    .bind(params.role)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    profile_id: &str,
) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as::<_, Profile>(&format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"))
        .bind(profile_id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as::<_, Profile>(&format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles WHERE email = $1",
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn update(
    pool: &PgPool,
    profile_id: &str,
    params: UpdateProfile,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE profiles SET
            display_name = COALESCE($1, display_name),
            role = COALESCE($2, role),
            updated_at = $3
         WHERE id = $4",
    )
    .bind(params.display_name)
    .bind(params.role)
    .bind(params.updated_at)
    .bind(profile_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Admin-level deletion; enrollments cascade at the storage layer.
pub(crate) async fn delete(pool: &PgPool, profile_id: &str) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM profiles WHERE id = $1").bind(profile_id).execute(pool).await?;
    Ok(result.rows_affected())
}
