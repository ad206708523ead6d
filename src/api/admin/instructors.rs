use axum::{
    extract::{Form, Path, State},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::AdminUser;
use crate::core::state::AppState;
use crate::core::time;
use crate::repositories;
use crate::schemas::instructor::{InstructorForm, InstructorResponse};
use crate::services::slug;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/instructors", get(list_instructors).post(create_instructor))
        .route("/instructors/:instructor_id", post(update_instructor))
        .route("/instructors/:instructor_id/delete", post(delete_instructor))
}

async fn list_instructors(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<InstructorResponse>>, ApiError> {
    let instructors = repositories::instructors::list_all(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list instructors"))?;

    Ok(Json(instructors.into_iter().map(InstructorResponse::from_db).collect()))
}

async fn create_instructor(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Form(payload): Form<InstructorForm>,
) -> Result<Redirect, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let now = time::primitive_now_utc();
    let instructor = repositories::instructors::create(
        state.db(),
        repositories::instructors::CreateInstructor {
            id: &Uuid::new_v4().to_string(),
            name: payload.name.trim(),
            slug: &slug::slugify(&payload.name),
            bio: payload.bio.as_deref(),
            avatar_url: payload.avatar_url.as_deref(),
            cover_url: payload.cover_url.as_deref(),
            is_featured: payload.is_featured,
            sort_order: payload.sort_order,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create instructor"))?;

    tracing::info!(
        admin_id = %admin.id,
        instructor_id = %instructor.id,
        action = "instructor_create",
        "Admin created instructor"
    );

    Ok(Redirect::to("/admin/instructors"))
}

async fn update_instructor(
    AdminUser(admin): AdminUser,
    Path(instructor_id): Path<String>,
    State(state): State<AppState>,
    Form(payload): Form<InstructorForm>,
) -> Result<Redirect, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let instructor = repositories::instructors::find_by_id(state.db(), &instructor_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch instructor"))?
        .ok_or_else(|| ApiError::NotFound("Instructor not found".to_string()))?;

    repositories::instructors::update(
        state.db(),
        &instructor.id,
        repositories::instructors::UpdateInstructor {
            name: payload.name.trim().to_string(),
            slug: slug::slugify(&payload.name),
            bio: payload.bio,
            avatar_url: payload.avatar_url,
            cover_url: payload.cover_url,
            is_featured: payload.is_featured,
            sort_order: payload.sort_order,
            updated_at: time::primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update instructor"))?;

    tracing::info!(
        admin_id = %admin.id,
        instructor_id = %instructor.id,
        action = "instructor_update",
        "Admin updated instructor"
    );

    Ok(Redirect::to("/admin/instructors"))
}

async fn delete_instructor(
    AdminUser(admin): AdminUser,
    Path(instructor_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, ApiError> {
    let deleted = repositories::instructors::delete(state.db(), &instructor_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete instructor"))?;

    if deleted == 0 {
        return Err(ApiError::NotFound("Instructor not found".to_string()));
    }

    tracing::info!(
        admin_id = %admin.id,
        instructor_id = %instructor_id,
        action = "instructor_delete",
        "Admin deleted instructor"
    );

    Ok(Redirect::to("/admin/instructors"))
}
