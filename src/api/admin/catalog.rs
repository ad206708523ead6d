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
use crate::schemas::catalog::{CategoryForm, CategoryResponse, TagForm, TagResponse};
use crate::services::slug;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/:category_id", post(update_category))
        .route("/categories/:category_id/delete", post(delete_category))
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/:tag_id", post(update_tag))
        .route("/tags/:tag_id/delete", post(delete_tag))
}

async fn list_categories(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let categories = repositories::categories::list_all(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list categories"))?;

    Ok(Json(categories.into_iter().map(CategoryResponse::from_db).collect()))
}

async fn create_category(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Form(payload): Form<CategoryForm>,
) -> Result<Redirect, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let category_id = Uuid::new_v4().to_string();
    validate_parent(&state, payload.parent_id.as_deref(), &category_id).await?;

    let now = time::primitive_now_utc();
    let category = repositories::categories::create(
        state.db(),
        repositories::categories::CreateCategory {
            id: &category_id,
            name: payload.name.trim(),
            slug: &slug::slugify(&payload.name),
            parent_id: payload.parent_id.as_deref(),
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create category"))?;

    tracing::info!(
        admin_id = %admin.id,
        category_id = %category.id,
        action = "category_create",
        "Admin created category"
    );

    Ok(Redirect::to("/admin/categories"))
}

async fn update_category(
    AdminUser(admin): AdminUser,
    Path(category_id): Path<String>,
    State(state): State<AppState>,
    Form(payload): Form<CategoryForm>,
) -> Result<Redirect, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let category = repositories::categories::find_by_id(state.db(), &category_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch category"))?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    validate_parent(&state, payload.parent_id.as_deref(), &category.id).await?;

    repositories::categories::update(
        state.db(),
        &category.id,
        repositories::categories::UpdateCategory {
            name: payload.name.trim().to_string(),
            slug: slug::slugify(&payload.name),
            parent_id: payload.parent_id,
            updated_at: time::primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update category"))?;

    tracing::info!(
        admin_id = %admin.id,
        category_id = %category.id,
        action = "category_update",
        "Admin updated category"
    );

    Ok(Redirect::to("/admin/categories"))
}

async fn delete_category(
    AdminUser(admin): AdminUser,
    Path(category_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, ApiError> {
    let deleted = repositories::categories::delete(state.db(), &category_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete category"))?;

    if deleted == 0 {
        return Err(ApiError::NotFound("Category not found".to_string()));
    }

    tracing::info!(
        admin_id = %admin.id,
        category_id = %category_id,
        action = "category_delete",
        "Admin deleted category"
    );

    Ok(Redirect::to("/admin/categories"))
}

/// One level of nesting only: a parent must itself be a root category, and a
/// category can never be its own parent.
async fn validate_parent(
    state: &AppState,
    parent_id: Option<&str>,
    category_id: &str,
) -> Result<(), ApiError> {
    let Some(parent_id) = parent_id else {
        return Ok(());
    };

    if parent_id == category_id {
        return Err(ApiError::BadRequest("Category cannot be its own parent".to_string()));
    }

    let parent = repositories::categories::find_by_id(state.db(), parent_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch parent category"))?
        .ok_or_else(|| ApiError::BadRequest("Parent category does not exist".to_string()))?;

    if parent.parent_id.is_some() {
        return Err(ApiError::BadRequest("Parent must be a root category".to_string()));
    }

    Ok(())
}

async fn list_tags(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<TagResponse>>, ApiError> {
    let tags = repositories::tags::list_all(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list tags"))?;

    Ok(Json(tags.into_iter().map(TagResponse::from_db).collect()))
}

async fn create_tag(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Form(payload): Form<TagForm>,
) -> Result<Redirect, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let now = time::primitive_now_utc();
    let tag = repositories::tags::create(
        state.db(),
        repositories::tags::CreateTag {
            id: &Uuid::new_v4().to_string(),
            name: payload.name.trim(),
            slug: &slug::slugify(&payload.name),
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create tag"))?;

    tracing::info!(
        admin_id = %admin.id,
        tag_id = %tag.id,
        action = "tag_create",
        "Admin created tag"
    );

    Ok(Redirect::to("/admin/tags"))
}

async fn update_tag(
    AdminUser(admin): AdminUser,
    Path(tag_id): Path<String>,
    State(state): State<AppState>,
    Form(payload): Form<TagForm>,
) -> Result<Redirect, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let tag = repositories::tags::find_by_id(state.db(), &tag_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch tag"))?
        .ok_or_else(|| ApiError::NotFound("Tag not found".to_string()))?;

    repositories::tags::update(
        state.db(),
        &tag.id,
        repositories::tags::UpdateTag {
            name: payload.name.trim().to_string(),
            slug: slug::slugify(&payload.name),
            updated_at: time::primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update tag"))?;

    tracing::info!(
        admin_id = %admin.id,
        tag_id = %tag.id,
        action = "tag_update",
        "Admin updated tag"
    );

    Ok(Redirect::to("/admin/tags"))
}

async fn delete_tag(
    AdminUser(admin): AdminUser,
    Path(tag_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, ApiError> {
    let deleted = repositories::tags::delete(state.db(), &tag_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete tag"))?;

    if deleted == 0 {
        return Err(ApiError::NotFound("Tag not found".to_string()));
    }

    tracing::info!(
        admin_id = %admin.id,
        tag_id = %tag_id,
        action = "tag_delete",
        "Admin deleted tag"
    );

    Ok(Redirect::to("/admin/tags"))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    use crate::repositories;
    use crate::test_support;

    #[tokio::test]
    async fn category_parent_must_be_root() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db()).await;
        let token = test_support::bearer_token(&admin.id, ctx.state.settings());

        let root = test_support::insert_category(ctx.state.db(), "Root").await;

        // A child under a root is fine.
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::form_request(
                Method::POST,
                "/admin/categories",
                Some(&token),
                &[("name", "Child"), ("parent_id", &root.id)],
            ))
            .await
            .expect("create child");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let categories = repositories::categories::list_all(ctx.state.db()).await.expect("list");
        let child = categories.iter().find(|c| c.name == "Child").expect("child row");

        // Nesting under the child is rejected.
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::form_request(
                Method::POST,
                "/admin/categories",
                Some(&token),
                &[("name", "Grandchild"), ("parent_id", &child.id)],
            ))
            .await
            .expect("create grandchild");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn category_cannot_be_its_own_parent() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db()).await;
        let token = test_support::bearer_token(&admin.id, ctx.state.settings());

        let category = test_support::insert_category(ctx.state.db(), "Solo").await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::form_request(
                Method::POST,
                &format!("/admin/categories/{}", category.id),
                Some(&token),
                &[("name", "Solo"), ("parent_id", &category.id)],
            ))
            .await
            .expect("self-parent update");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn thai_names_keep_thai_slugs() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db()).await;
        let token = test_support::bearer_token(&admin.id, ctx.state.settings());

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::form_request(
                Method::POST,
                "/admin/tags",
                Some(&token),
                &[("name", "ภาษาไทย")],
            ))
            .await
            .expect("create tag");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let tags = repositories::tags::list_all(ctx.state.db()).await.expect("list");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].slug, "ภาษาไทย");
    }
}
