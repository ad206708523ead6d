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
use crate::db::types::CourseStatus;
use crate::repositories;
use crate::schemas::course::{
    AdminCourseResponse, CourseCreateForm, CourseResponse, CourseUpdateForm,
};
use crate::services::slug;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/:course_id", get(get_course).post(update_course))
        .route("/courses/:course_id/delete", post(delete_course))
}

async fn list_courses(
    AdminUser(_admin): AdminUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let courses = repositories::courses::list_all(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list courses"))?;

    Ok(Json(courses.into_iter().map(CourseResponse::from_db).collect()))
}

async fn get_course(
    AdminUser(_admin): AdminUser,
    Path(course_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AdminCourseResponse>, ApiError> {
    let course = repositories::courses::find_by_id(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    let category_ids = repositories::course_relations::list_category_ids(state.db(), &course.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list course categories"))?;
    let tag_ids = repositories::course_relations::list_tag_ids(state.db(), &course.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list course tags"))?;

    Ok(Json(AdminCourseResponse {
        course: CourseResponse::from_db(course),
        category_ids,
        tag_ids,
    }))
}

async fn create_course(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    Form(payload): Form<CourseCreateForm>,
) -> Result<Redirect, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let course_slug = slug::slugify(&payload.name);
    let taken = repositories::courses::exists_by_slug(state.db(), &course_slug)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check course slug"))?;
    if taken {
        return Err(ApiError::Conflict("Course with this slug already exists".to_string()));
    }

    let now = time::primitive_now_utc();
    let course = repositories::courses::create(
        state.db(),
        repositories::courses::CreateCourse {
            id: &Uuid::new_v4().to_string(),
            name: payload.name.trim(),
            slug: &course_slug,
            description: payload.description.as_deref(),
            status: CourseStatus::Draft,
            price: payload.price,
            instructor_id: payload.instructor_id.as_deref(),
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| map_course_save_error(e, "Failed to create course"))?;

    tracing::info!(
        admin_id = %admin.id,
        course_id = %course.id,
        action = "course_create",
        "Admin created course"
    );

    Ok(Redirect::to("/admin/courses"))
}

/// Full-row update followed by category/tag reconciliation. The course row is
/// committed first; a reconciliation failure surfaces as a 500 and leaves the
/// row updated.
async fn update_course(
    AdminUser(admin): AdminUser,
    Path(course_id): Path<String>,
    State(state): State<AppState>,
    Form(payload): Form<CourseUpdateForm>,
) -> Result<Redirect, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let course = repositories::courses::find_by_id(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    let course_slug = slug::slugify(&payload.name);
    if course_slug != course.slug {
        let taken = repositories::courses::exists_by_slug(state.db(), &course_slug)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to check course slug"))?;
        if taken {
            return Err(ApiError::Conflict("Course with this slug already exists".to_string()));
        }
    }

    repositories::courses::update(
        state.db(),
        &course.id,
        repositories::courses::UpdateCourse {
            name: payload.name.trim().to_string(),
            slug: course_slug,
            description: payload.description,
            status: payload.status,
            price: payload.price,
            sale_price: payload.sale_price,
            sale_starts_at: payload.sale_starts_at,
            sale_ends_at: payload.sale_ends_at,
            access_duration_days: payload.access_duration_days,
            allow_repurchase: payload.allow_repurchase,
            evaluation_enabled: payload.evaluation_enabled,
            passing_grade: payload.passing_grade,
            instructor_id: payload.instructor_id,
            updated_at: time::primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| map_course_save_error(e, "Failed to update course"))?;

    repositories::course_relations::replace_categories(
        state.db(),
        &course.id,
        &payload.category_ids,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update course categories"))?;

    repositories::course_relations::replace_tags(state.db(), &course.id, &payload.tag_ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to update course tags"))?;

    tracing::info!(
        admin_id = %admin.id,
        course_id = %course.id,
        action = "course_update",
        "Admin updated course"
    );

    Ok(Redirect::to("/admin/courses"))
}

/// The slug pre-check races with concurrent writers; a unique violation on
/// `courses.slug` at insert/update time is still a conflict, not a 500.
fn map_course_save_error(err: sqlx::Error, context: &str) -> ApiError {
    match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => {
            ApiError::Conflict("Course with this slug already exists".to_string())
        }
        _ => ApiError::internal(err, context),
    }
}

async fn delete_course(
    AdminUser(admin): AdminUser,
    Path(course_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, ApiError> {
    let deleted = repositories::courses::delete(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete course"))?;

    if deleted == 0 {
        return Err(ApiError::NotFound("Course not found".to_string()));
    }

    tracing::info!(
        admin_id = %admin.id,
        course_id = %course_id,
        action = "course_delete",
        "Admin deleted course"
    );

    Ok(Redirect::to("/admin/courses"))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    use crate::repositories;
    use crate::test_support;

    #[tokio::test]
    async fn create_course_slugifies_name_and_redirects() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db()).await;
        let token = test_support::bearer_token(&admin.id, ctx.state.settings());

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::form_request(
                Method::POST,
                "/admin/courses",
                Some(&token),
                &[("name", "My Course!!"), ("price", "49.99")],
            ))
            .await
            .expect("create course");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let courses = repositories::courses::list_all(ctx.state.db()).await.expect("list");
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].slug, "my-course");
        assert_eq!(courses[0].name, "My Course!!");
        assert!(courses[0].published_at.is_none());
    }

    #[tokio::test]
    async fn duplicate_slug_is_rejected() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db()).await;
        let token = test_support::bearer_token(&admin.id, ctx.state.settings());

        for expected in [StatusCode::SEE_OTHER, StatusCode::CONFLICT] {
            let response = ctx
                .app
                .clone()
                .oneshot(test_support::form_request(
                    Method::POST,
                    "/admin/courses",
                    Some(&token),
                    &[("name", "Same Name")],
                ))
                .await
                .expect("create course");
            assert_eq!(response.status(), expected);
        }
    }

    #[tokio::test]
    async fn update_reconciles_categories_and_sets_published_at_once() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db()).await;
        let token = test_support::bearer_token(&admin.id, ctx.state.settings());

        let course = test_support::insert_course(ctx.state.db(), "Rust Basics").await;
        let cat_a = test_support::insert_category(ctx.state.db(), "Programming").await;
        let cat_b = test_support::insert_category(ctx.state.db(), "Backend").await;

        let category_ids = format!("[\"{}\",\"{}\"]", cat_a.id, cat_b.id);
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::form_request(
                Method::POST,
                &format!("/admin/courses/{}", course.id),
                Some(&token),
                &[
                    ("name", "Rust Basics"),
                    ("status", "published"),
                    ("price", "10"),
                    ("category_ids", &category_ids),
                ],
            ))
            .await
            .expect("update course");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let mut linked =
            repositories::course_relations::list_category_ids(ctx.state.db(), &course.id)
                .await
                .expect("category ids");
        linked.sort();
        let mut expected = vec![cat_a.id.clone(), cat_b.id.clone()];
        expected.sort();
        assert_eq!(linked, expected);

        let updated = repositories::courses::find_by_id(ctx.state.db(), &course.id)
            .await
            .expect("find")
            .expect("course");
        let first_published_at = updated.published_at.expect("published_at set");

        // Shrink the category set and publish again; published_at must not move.
        let only_b = format!("[\"{}\"]", cat_b.id);
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::form_request(
                Method::POST,
                &format!("/admin/courses/{}", course.id),
                Some(&token),
                &[
                    ("name", "Rust Basics"),
                    ("status", "published"),
                    ("price", "10"),
                    ("category_ids", &only_b),
                ],
            ))
            .await
            .expect("second update");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let linked = repositories::course_relations::list_category_ids(ctx.state.db(), &course.id)
            .await
            .expect("category ids");
        assert_eq!(linked, vec![cat_b.id.clone()]);

        let updated = repositories::courses::find_by_id(ctx.state.db(), &course.id)
            .await
            .expect("find")
            .expect("course");
        assert_eq!(updated.published_at, Some(first_published_at));
    }

    #[tokio::test]
    async fn empty_category_list_clears_existing_links() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db()).await;
        let token = test_support::bearer_token(&admin.id, ctx.state.settings());

        let course = test_support::insert_course(ctx.state.db(), "Linked").await;
        let cat_a = test_support::insert_category(ctx.state.db(), "One").await;
        let cat_b = test_support::insert_category(ctx.state.db(), "Two").await;

        let both = format!("[\"{}\",\"{}\"]", cat_a.id, cat_b.id);
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::form_request(
                Method::POST,
                &format!("/admin/courses/{}", course.id),
                Some(&token),
                &[
                    ("name", "Linked"),
                    ("status", "draft"),
                    ("price", "10"),
                    ("category_ids", &both),
                ],
            ))
            .await
            .expect("link categories");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let linked = repositories::course_relations::list_category_ids(ctx.state.db(), &course.id)
            .await
            .expect("category ids");
        assert_eq!(linked.len(), 2);

        // Posting an empty array detaches everything.
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::form_request(
                Method::POST,
                &format!("/admin/courses/{}", course.id),
                Some(&token),
                &[
                    ("name", "Linked"),
                    ("status", "draft"),
                    ("price", "10"),
                    ("category_ids", "[]"),
                ],
            ))
            .await
            .expect("clear categories");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let linked = repositories::course_relations::list_category_ids(ctx.state.db(), &course.id)
            .await
            .expect("category ids");
        assert!(linked.is_empty());
    }

    #[tokio::test]
    async fn repeated_category_ids_link_once() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db()).await;
        let token = test_support::bearer_token(&admin.id, ctx.state.settings());

        let course = test_support::insert_course(ctx.state.db(), "Deduped").await;
        let category = test_support::insert_category(ctx.state.db(), "Repeated").await;

        let twice = format!("[\"{}\",\"{}\"]", category.id, category.id);
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::form_request(
                Method::POST,
                &format!("/admin/courses/{}", course.id),
                Some(&token),
                &[
                    ("name", "Deduped"),
                    ("status", "draft"),
                    ("price", "10"),
                    ("category_ids", &twice),
                ],
            ))
            .await
            .expect("update course");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let linked = repositories::course_relations::list_category_ids(ctx.state.db(), &course.id)
            .await
            .expect("category ids");
        assert_eq!(linked, vec![category.id.clone()]);
    }

    #[tokio::test]
    async fn slug_unique_violation_surfaces_as_conflict() {
        let ctx = test_support::setup_test_context().await;
        let existing = test_support::insert_course(ctx.state.db(), "Taken Name").await;

        // Insert straight through the repository to bypass the handler's
        // pre-check, the way a concurrent writer would.
        let now = crate::core::time::primitive_now_utc();
        let err = repositories::courses::create(
            ctx.state.db(),
            repositories::courses::CreateCourse {
                id: &uuid::Uuid::new_v4().to_string(),
                name: "Taken Name",
                slug: &existing.slug,
                description: None,
                status: crate::db::types::CourseStatus::Draft,
                price: 0.0,
                instructor_id: None,
                created_at: now,
                updated_at: now,
            },
        )
        .await
        .expect_err("duplicate slug");

        let mapped = super::map_course_save_error(err, "Failed to create course");
        assert!(matches!(mapped, crate::api::errors::ApiError::Conflict(_)), "got {mapped:?}");
    }

    #[tokio::test]
    async fn update_missing_course_is_404() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db()).await;
        let token = test_support::bearer_token(&admin.id, ctx.state.settings());

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::form_request(
                Method::POST,
                "/admin/courses/does-not-exist",
                Some(&token),
                &[("name", "Anything"), ("status", "draft")],
            ))
            .await
            .expect("update course");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
