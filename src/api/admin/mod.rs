use axum::Router;

use crate::core::state::AppState;

pub(crate) mod catalog;
pub(crate) mod courses;
pub(crate) mod curriculum;
pub(crate) mod enrollments;
pub(crate) mod instructors;
pub(crate) mod users;

/// Back-office routes. Every handler takes the `AdminUser` guard, so the
/// whole surface redirects non-admins away instead of serving errors.
pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .merge(courses::router())
        .merge(catalog::router())
        .merge(instructors::router())
        .merge(curriculum::router())
        .merge(users::router())
        .merge(enrollments::router())
}
