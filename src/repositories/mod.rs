pub(crate) mod categories;
pub(crate) mod course_relations;
pub(crate) mod courses;
pub(crate) mod enrollments;
pub(crate) mod instructors;
pub(crate) mod lessons;
pub(crate) mod profiles;
pub(crate) mod quiz_questions;
pub(crate) mod quizzes;
pub(crate) mod sections;
pub(crate) mod tags;
