use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::Course;
use crate::db::types::CourseStatus;
use crate::schemas::forms;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CourseCreateForm {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub(crate) name: String,
    #[serde(default, deserialize_with = "forms::empty_as_none")]
    pub(crate) description: Option<String>,
    #[serde(default, deserialize_with = "forms::f64_or_zero")]
    pub(crate) price: f64,
    #[serde(default, deserialize_with = "forms::empty_as_none")]
    pub(crate) instructor_id: Option<String>,
}

/// Full-row update command; the edit form posts every field, and the
/// category/tag sets ride along as JSON-encoded id arrays.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CourseUpdateForm {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub(crate) name: String,
    #[serde(default, deserialize_with = "forms::empty_as_none")]
    pub(crate) description: Option<String>,
    pub(crate) status: CourseStatus,
    #[serde(default, deserialize_with = "forms::f64_or_zero")]
    pub(crate) price: f64,
    #[serde(default, deserialize_with = "forms::opt_f64")]
    pub(crate) sale_price: Option<f64>,
    #[serde(default, deserialize_with = "forms::opt_datetime")]
    pub(crate) sale_starts_at: Option<time::PrimitiveDateTime>,
    #[serde(default, deserialize_with = "forms::opt_datetime")]
    pub(crate) sale_ends_at: Option<time::PrimitiveDateTime>,
    #[serde(default, deserialize_with = "forms::opt_i32")]
    pub(crate) access_duration_days: Option<i32>,
    #[serde(default, deserialize_with = "forms::checkbox")]
    pub(crate) allow_repurchase: bool,
    #[serde(default, deserialize_with = "forms::checkbox")]
    pub(crate) evaluation_enabled: bool,
    #[serde(default, deserialize_with = "forms::f64_or_zero")]
    pub(crate) passing_grade: f64,
    #[serde(default, deserialize_with = "forms::empty_as_none")]
    pub(crate) instructor_id: Option<String>,
    #[serde(default, deserialize_with = "forms::id_list")]
    pub(crate) category_ids: Vec<String>,
    #[serde(default, deserialize_with = "forms::id_list")]
    pub(crate) tag_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) description: Option<String>,
    pub(crate) status: CourseStatus,
    pub(crate) price: f64,
    pub(crate) sale_price: Option<f64>,
    pub(crate) sale_starts_at: Option<String>,
    pub(crate) sale_ends_at: Option<String>,
    pub(crate) access_duration_days: Option<i32>,
    pub(crate) allow_repurchase: bool,
    pub(crate) evaluation_enabled: bool,
    pub(crate) passing_grade: f64,
    pub(crate) instructor_id: Option<String>,
    pub(crate) published_at: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl CourseResponse {
    pub(crate) fn from_db(course: Course) -> Self {
        Self {
            id: course.id,
            name: course.name,
            slug: course.slug,
            description: course.description,
            status: course.status,
            price: course.price,
            sale_price: course.sale_price,
            sale_starts_at: course.sale_starts_at.map(format_primitive),
            sale_ends_at: course.sale_ends_at.map(format_primitive),
            access_duration_days: course.access_duration_days,
            allow_repurchase: course.allow_repurchase,
            evaluation_enabled: course.evaluation_enabled,
            passing_grade: course.passing_grade,
            instructor_id: course.instructor_id,
            published_at: course.published_at.map(format_primitive),
            created_at: format_primitive(course.created_at),
            updated_at: format_primitive(course.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminCourseResponse {
    #[serde(flatten)]
    pub(crate) course: CourseResponse,
    pub(crate) category_ids: Vec<String>,
    pub(crate) tag_ids: Vec<String>,
}
