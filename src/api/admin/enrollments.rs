use axum::{
    extract::{Form, Path, Query, State},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::AdminUser;
use crate::core::state::AppState;
use crate::core::time;
use crate::db::models::Enrollment;
use crate::db::types::EnrollmentStatus;
use crate::repositories;
use crate::schemas::enrollment::{
    EnrollmentCreateForm, EnrollmentResponse, EnrollmentUpdateForm,
};

#[derive(Debug, Deserialize)]
pub(crate) struct EnrollmentListQuery {
    #[serde(default)]
    skip: i64,
    #[serde(default = "default_limit")]
    limit: i64,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    course_id: Option<String>,
    #[serde(default)]
    status: Option<EnrollmentStatus>,
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/enrollments", get(list_enrollments).post(create_enrollment))
        .route("/enrollments/:enrollment_id", post(update_enrollment))
}

async fn list_enrollments(
    AdminUser(_admin): AdminUser,
    Query(params): Query<EnrollmentListQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<EnrollmentResponse>>, ApiError> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT id, user_id, course_id, status, progress, enrolled_at, updated_at
         FROM enrollments",
    );
    let mut has_where = false;

    if let Some(user_id) = params.user_id.as_ref() {
        builder.push(" WHERE ");
        has_where = true;
        builder.push("user_id = ");
        builder.push_bind(user_id);
    }
    if let Some(course_id) = params.course_id.as_ref() {
        if !has_where {
            builder.push(" WHERE ");
            has_where = true;
        } else {
            builder.push(" AND ");
        }
        builder.push("course_id = ");
        builder.push_bind(course_id);
    }
    if let Some(status) = params.status {
        if !has_where {
            builder.push(" WHERE ");
        } else {
            builder.push(" AND ");
        }
        builder.push("status = ");
        builder.push_bind(status);
    }

    builder.push(" ORDER BY enrolled_at DESC, id");
    builder.push(" OFFSET ");
    builder.push_bind(params.skip.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(params.limit.clamp(1, 1000));

    let enrollments = builder
        .build_query_as::<Enrollment>()
        .fetch_all(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list enrollments"))?;

    Ok(Json(enrollments.into_iter().map(EnrollmentResponse::from_db).collect()))
}

async fn create_enrollment(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Form(payload): Form<EnrollmentCreateForm>,
) -> Result<Redirect, ApiError> {
    let profile = repositories::profiles::find_by_id(state.db(), &payload.user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch profile"))?;
    if profile.is_none() {
        return Err(ApiError::BadRequest("Profile does not exist".to_string()));
    }

    let course = repositories::courses::find_by_id(state.db(), &payload.course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?;
    if course.is_none() {
        return Err(ApiError::BadRequest("Course does not exist".to_string()));
    }

    let now = time::primitive_now_utc();
    let enrollment = repositories::enrollments::create(
        state.db(),
        repositories::enrollments::CreateEnrollment {
            id: &Uuid::new_v4().to_string(),
            user_id: &payload.user_id,
            course_id: &payload.course_id,
            status: EnrollmentStatus::Active,
            progress: 0.0,
            enrolled_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create enrollment"))?;

    tracing::info!(
        admin_id = %admin.id,
        enrollment_id = %enrollment.id,
        user_id = %enrollment.user_id,
        course_id = %enrollment.course_id,
        action = "enrollment_create",
        "Admin enrolled user"
    );

    Ok(Redirect::to("/admin/enrollments"))
}

async fn update_enrollment(
    AdminUser(admin): AdminUser,
    Path(enrollment_id): Path<String>,
    State(state): State<AppState>,
    Form(payload): Form<EnrollmentUpdateForm>,
) -> Result<Redirect, ApiError> {
    let enrollment = repositories::enrollments::find_by_id(state.db(), &enrollment_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch enrollment"))?
        .ok_or_else(|| ApiError::NotFound("Enrollment not found".to_string()))?;

    repositories::enrollments::update(
        state.db(),
        &enrollment.id,
        repositories::enrollments::UpdateEnrollment {
            status: payload.status,
            progress: payload.progress.clamp(0.0, 100.0),
            updated_at: time::primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update enrollment"))?;

    tracing::info!(
        admin_id = %admin.id,
        enrollment_id = %enrollment.id,
        action = "enrollment_update",
        "Admin updated enrollment"
    );

    Ok(Redirect::to("/admin/enrollments"))
}

fn default_limit() -> i64 {
    100
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    use crate::db::types::{EnrollmentStatus, UserRole};
    use crate::repositories;
    use crate::test_support;

    #[tokio::test]
    async fn progress_is_clamped_to_hundred() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db()).await;
        let token = test_support::bearer_token(&admin.id, ctx.state.settings());

        let learner = test_support::insert_profile(
            ctx.state.db(),
            "learner@example.com",
            "Learner",
            UserRole::User,
            "learner-pass",
        )
        .await;
        let course = test_support::insert_course(ctx.state.db(), "Clamped").await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::form_request(
                Method::POST,
                "/admin/enrollments",
                Some(&token),
                &[("user_id", &learner.id), ("course_id", &course.id)],
            ))
            .await
            .expect("create enrollment");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                &format!("/admin/enrollments?user_id={}", learner.id),
                Some(&token),
                None,
            ))
            .await
            .expect("list enrollments");
        let listed = test_support::read_json(response).await;
        let enrollment_id = listed[0]["id"].as_str().expect("id").to_string();
        assert_eq!(listed[0]["progress"], 0.0);

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::form_request(
                Method::POST,
                &format!("/admin/enrollments/{enrollment_id}"),
                Some(&token),
                &[("status", "completed"), ("progress", "250")],
            ))
            .await
            .expect("update enrollment");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let updated = repositories::enrollments::find_by_id(ctx.state.db(), &enrollment_id)
            .await
            .expect("find")
            .expect("enrollment");
        assert_eq!(updated.status, EnrollmentStatus::Completed);
        assert_eq!(updated.progress, 100.0);
    }

    #[tokio::test]
    async fn enrollment_requires_existing_profile() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db()).await;
        let token = test_support::bearer_token(&admin.id, ctx.state.settings());
        let course = test_support::insert_course(ctx.state.db(), "Orphan").await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::form_request(
                Method::POST,
                "/admin/enrollments",
                Some(&token),
                &[("user_id", "ghost"), ("course_id", &course.id)],
            ))
            .await
            .expect("create enrollment");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
