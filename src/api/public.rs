use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::course::CourseResponse;
use crate::schemas::curriculum::{CurriculumResponse, PublicQuestionResponse};
use crate::schemas::instructor::InstructorStatsResponse;
use crate::services::curriculum;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses))
        .route("/courses/:slug", get(get_course))
        .route("/instructors", get(list_instructors))
        .route("/instructors/:slug", get(get_instructor))
}

#[derive(Debug, Serialize)]
struct PublicCourseDetail {
    #[serde(flatten)]
    course: CourseResponse,
    curriculum: CurriculumResponse<PublicQuestionResponse>,
}

#[derive(Debug, Serialize)]
struct InstructorDetail {
    #[serde(flatten)]
    instructor: InstructorStatsResponse,
    courses: Vec<CourseResponse>,
}

async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<CourseResponse>>, ApiError> {
    let courses = repositories::courses::list_published(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list courses"))?;

    Ok(Json(courses.into_iter().map(CourseResponse::from_db).collect()))
}

/// Only published courses resolve here; drafts and archived courses answer 404
/// no matter who asks.
async fn get_course(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PublicCourseDetail>, ApiError> {
    let course = repositories::courses::find_published_by_slug(state.db(), &slug)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    let curriculum = curriculum::load(state.db(), &course.id, PublicQuestionResponse::from_db)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load curriculum"))?;

    Ok(Json(PublicCourseDetail { course: CourseResponse::from_db(course), curriculum }))
}

async fn list_instructors(
    State(state): State<AppState>,
) -> Result<Json<Vec<InstructorStatsResponse>>, ApiError> {
    let instructors = repositories::instructors::list_stats(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list instructors"))?;

    Ok(Json(instructors.into_iter().map(InstructorStatsResponse::from_db).collect()))
}

async fn get_instructor(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<InstructorDetail>, ApiError> {
    let stats = repositories::instructors::find_stats_by_slug(state.db(), &slug)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load instructor"))?
        .ok_or_else(|| ApiError::NotFound("Instructor not found".to_string()))?;

    let courses = repositories::courses::list_published_for_instructor(state.db(), &stats.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list instructor courses"))?;

    Ok(Json(InstructorDetail {
        instructor: InstructorStatsResponse::from_db(stats),
        courses: courses.into_iter().map(CourseResponse::from_db).collect(),
    }))
}
