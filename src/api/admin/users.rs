use axum::{
    extract::{Form, Path, Query, State},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};

use crate::api::errors::ApiError;
use crate::api::guards::AdminUser;
use crate::core::state::AppState;
use crate::core::time;
use crate::db::models::Profile;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::user::{AdminUserForm, ProfileResponse};

#[derive(Debug, Deserialize)]
pub(crate) struct UserListQuery {
    #[serde(default)]
    skip: i64,
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<UserRole>,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:user_id", post(update_user))
        .route("/users/:user_id/delete", post(delete_user))
}

async fn list_users(
    AdminUser(_admin): AdminUser,
    Query(params): Query<UserListQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProfileResponse>>, ApiError> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT id, email, hashed_password, display_name, role, created_at, updated_at
         FROM profiles",
    );
    let mut has_where = false;

    if let Some(email) = params.email.as_ref() {
        builder.push(" WHERE ");
        has_where = true;
        builder.push("email = ");
        builder.push_bind(email);
    }
    if let Some(role) = params.role {
        if !has_where {
            builder.push(" WHERE ");
        } else {
            builder.push(" AND ");
        }
        builder.push("role = ");
        builder.push_bind(role);
    }

    builder.push(" ORDER BY created_at DESC, id");
    builder.push(" OFFSET ");
    builder.push_bind(params.skip.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(params.limit.clamp(1, 1000));

    let profiles = builder
        .build_query_as::<Profile>()
        .fetch_all(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list profiles"))?;

    Ok(Json(profiles.into_iter().map(ProfileResponse::from_db).collect()))
}

async fn update_user(
    AdminUser(admin): AdminUser,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    Form(payload): Form<AdminUserForm>,
) -> Result<Redirect, ApiError> {
    let profile = repositories::profiles::find_by_id(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch profile"))?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    repositories::profiles::update(
        state.db(),
        &profile.id,
        repositories::profiles::UpdateProfile {
            display_name: payload.display_name,
            role: payload.role,
            updated_at: time::primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update profile"))?;

    tracing::info!(
        admin_id = %admin.id,
        user_id = %profile.id,
        action = "user_update",
        "Admin updated profile"
    );

    Ok(Redirect::to("/admin/users"))
}

async fn delete_user(
    AdminUser(admin): AdminUser,
    Path(user_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, ApiError> {
    let deleted = repositories::profiles::delete(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete profile"))?;

    if deleted == 0 {
        return Err(ApiError::NotFound("Profile not found".to_string()));
    }

    tracing::info!(
        admin_id = %admin.id,
        user_id = %user_id,
        action = "user_delete",
        "Admin deleted profile"
    );

    Ok(Redirect::to("/admin/users"))
}

fn default_limit() -> i64 {
    100
}
