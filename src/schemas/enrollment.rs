use serde::{Deserialize, Serialize};

use crate::core::time::format_primitive;
use crate::db::models::Enrollment;
use crate::db::types::EnrollmentStatus;
use crate::schemas::forms;

#[derive(Debug, Deserialize)]
pub(crate) struct EnrollmentCreateForm {
    pub(crate) user_id: String,
    pub(crate) course_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EnrollmentUpdateForm {
    pub(crate) status: EnrollmentStatus,
    #[serde(default, deserialize_with = "forms::f64_or_zero")]
    pub(crate) progress: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct EnrollmentResponse {
    pub(crate) id: String,
    pub(crate) user_id: String,
    pub(crate) course_id: String,
    pub(crate) status: EnrollmentStatus,
    pub(crate) progress: f64,
    pub(crate) enrolled_at: String,
}

impl EnrollmentResponse {
    pub(crate) fn from_db(enrollment: Enrollment) -> Self {
        Self {
            id: enrollment.id,
            user_id: enrollment.user_id,
            course_id: enrollment.course_id,
            status: enrollment.status,
            progress: enrollment.progress,
            enrolled_at: format_primitive(enrollment.enrolled_at),
        }
    }
}
