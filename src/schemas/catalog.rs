use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::core::time::format_primitive;
use crate::db::models::{Category, Tag};
use crate::schemas::forms;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct CategoryForm {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub(crate) name: String,
    #[serde(default, deserialize_with = "forms::empty_as_none")]
    pub(crate) parent_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CategoryResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) parent_id: Option<String>,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl CategoryResponse {
    pub(crate) fn from_db(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
            parent_id: category.parent_id,
            created_at: format_primitive(category.created_at),
            updated_at: format_primitive(category.updated_at),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct TagForm {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub(crate) name: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TagResponse {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl TagResponse {
    pub(crate) fn from_db(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            slug: tag.slug,
            created_at: format_primitive(tag.created_at),
            updated_at: format_primitive(tag.updated_at),
        }
    }
}
