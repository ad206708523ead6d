use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Instructor, InstructorStats};
use crate::schemas::forms;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct InstructorForm {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub(crate) name: String,
    #[serde(default, deserialize_with = "forms::empty_as_none")]
    pub(crate) bio: Option<String>,
    #[serde(default, deserialize_with = "forms::empty_as_none")]
    pub(crate) avatar_url: Option<String>,
    #[serde(default, deserialize_with = "forms::empty_as_none")]
    pub(crate) cover_url: Option<String>,
    #[serde(default, deserialize_with = "forms::checkbox")]
    pub(crate) is_featured: bool,
    #[serde(default, deserialize_with = "forms::i32_or_zero")]
    pub(crate) sort_order: i32,
}

#[derive(Debug, Serialize)]
pub(crate) struct InstructorResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) bio: Option<String>,
    pub(crate) avatar_url: Option<String>,
    pub(crate) cover_url: Option<String>,
    pub(crate) is_featured: bool,
    pub(crate) sort_order: i32,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl InstructorResponse {
    pub(crate) fn from_db(instructor: Instructor) -> Self {
        Self {
            id: instructor.id,
            name: instructor.name,
            slug: instructor.slug,
            bio: instructor.bio,
            avatar_url: instructor.avatar_url,
            cover_url: instructor.cover_url,
            is_featured: instructor.is_featured,
            sort_order: instructor.sort_order,
            created_at: format_primitive(instructor.created_at),
            updated_at: format_primitive(instructor.updated_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct InstructorStatsResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) bio: Option<String>,
    pub(crate) avatar_url: Option<String>,
    pub(crate) cover_url: Option<String>,
    pub(crate) is_featured: bool,
    pub(crate) total_courses: i64,
    pub(crate) total_reviews: i64,
    pub(crate) average_rating: f64,
}

impl InstructorStatsResponse {
    pub(crate) fn from_db(stats: InstructorStats) -> Self {
        Self {
            id: stats.id,
            name: stats.name,
            slug: stats.slug,
            bio: stats.bio,
            avatar_url: stats.avatar_url,
            cover_url: stats.cover_url,
            is_featured: stats.is_featured,
            total_courses: stats.total_courses,
            total_reviews: stats.total_reviews,
            average_rating: stats.average_rating,
        }
    }
}
