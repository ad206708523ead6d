use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::db::models::{Lesson, Quiz, QuizQuestion, Section};
use crate::db::types::{LessonType, QuestionType};
use crate::schemas::forms;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct SectionForm {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub(crate) title: String,
    #[serde(default, deserialize_with = "forms::empty_as_none")]
    pub(crate) description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct LessonForm {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub(crate) title: String,
    #[serde(default = "default_lesson_type")]
    pub(crate) lesson_type: LessonType,
    #[serde(default, deserialize_with = "forms::empty_as_none")]
    pub(crate) content_url: Option<String>,
    #[serde(default, deserialize_with = "forms::i32_or_zero")]
    pub(crate) duration_minutes: i32,
    #[serde(default, deserialize_with = "forms::checkbox")]
    pub(crate) is_preview: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuizForm {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub(crate) title: String,
    #[serde(default, deserialize_with = "forms::empty_as_none")]
    pub(crate) section_id: Option<String>,
    #[serde(default, deserialize_with = "forms::f64_or_zero")]
    pub(crate) passing_score: f64,
    #[serde(default, deserialize_with = "forms::i32_or_one")]
    pub(crate) max_attempts: i32,
    #[serde(default, deserialize_with = "forms::opt_i32")]
    pub(crate) time_limit_minutes: Option<i32>,
    #[serde(default, deserialize_with = "forms::checkbox")]
    pub(crate) is_required: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct QuestionForm {
    #[validate(length(min = 1, message = "question_text must not be empty"))]
    pub(crate) question_text: String,
    #[serde(default = "default_question_type")]
    pub(crate) question_type: QuestionType,
    /// JSON-encoded array of answer options; empty for short-answer questions.
    #[serde(default, deserialize_with = "forms::id_list")]
    pub(crate) options: Vec<String>,
    #[validate(length(min = 1, message = "correct_answer must not be empty"))]
    pub(crate) correct_answer: String,
    #[serde(default, deserialize_with = "forms::empty_as_none")]
    pub(crate) explanation: Option<String>,
    #[serde(default, deserialize_with = "forms::f64_or_one")]
    pub(crate) points: f64,
}

fn default_lesson_type() -> LessonType {
    LessonType::Video
}

fn default_question_type() -> QuestionType {
    QuestionType::MultipleChoice
}

#[derive(Debug, Serialize)]
pub(crate) struct LessonResponse {
    pub(crate) id: String,
    pub(crate) section_id: String,
    pub(crate) title: String,
    pub(crate) lesson_type: LessonType,
    pub(crate) content_url: Option<String>,
    pub(crate) duration_minutes: i32,
    pub(crate) is_preview: bool,
    pub(crate) sort_order: i32,
}

impl LessonResponse {
    pub(crate) fn from_db(lesson: Lesson) -> Self {
        Self {
            id: lesson.id,
            section_id: lesson.section_id,
            title: lesson.title,
            lesson_type: lesson.lesson_type,
            content_url: lesson.content_url,
            duration_minutes: lesson.duration_minutes,
            is_preview: lesson.is_preview,
            sort_order: lesson.sort_order,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuestionResponse {
    pub(crate) id: String,
    pub(crate) question_text: String,
    pub(crate) question_type: QuestionType,
    pub(crate) options: Option<Vec<String>>,
    pub(crate) correct_answer: String,
    pub(crate) explanation: Option<String>,
    pub(crate) points: f64,
    pub(crate) sort_order: i32,
}

impl QuestionResponse {
    pub(crate) fn from_db(question: QuizQuestion) -> Self {
        Self {
            id: question.id,
            question_text: question.question_text,
            question_type: question.question_type,
            options: question.options.map(|options| options.0),
            correct_answer: question.correct_answer,
            explanation: question.explanation,
            points: question.points,
            sort_order: question.sort_order,
        }
    }
}

/// Question as shown to learners: no answer key, no explanation.
#[derive(Debug, Serialize)]
pub(crate) struct PublicQuestionResponse {
    pub(crate) id: String,
    pub(crate) question_text: String,
    pub(crate) question_type: QuestionType,
    pub(crate) options: Option<Vec<String>>,
    pub(crate) points: f64,
    pub(crate) sort_order: i32,
}

impl PublicQuestionResponse {
    pub(crate) fn from_db(question: QuizQuestion) -> Self {
        Self {
            id: question.id,
            question_text: question.question_text,
            question_type: question.question_type,
            options: question.options.map(|options| options.0),
            points: question.points,
            sort_order: question.sort_order,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizNode<Q> {
    pub(crate) id: String,
    pub(crate) section_id: Option<String>,
    pub(crate) title: String,
    pub(crate) passing_score: f64,
    pub(crate) max_attempts: i32,
    pub(crate) time_limit_minutes: Option<i32>,
    pub(crate) is_required: bool,
    pub(crate) sort_order: i32,
    pub(crate) questions: Vec<Q>,
}

impl<Q> QuizNode<Q> {
    pub(crate) fn from_db(quiz: Quiz, questions: Vec<Q>) -> Self {
        Self {
            id: quiz.id,
            section_id: quiz.section_id,
            title: quiz.title,
            passing_score: quiz.passing_score,
            max_attempts: quiz.max_attempts,
            time_limit_minutes: quiz.time_limit_minutes,
            is_required: quiz.is_required,
            sort_order: quiz.sort_order,
            questions,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SectionNode<Q> {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) sort_order: i32,
    pub(crate) lessons: Vec<LessonResponse>,
    pub(crate) quizzes: Vec<QuizNode<Q>>,
}

impl<Q> SectionNode<Q> {
    pub(crate) fn from_db(
        section: Section,
        lessons: Vec<LessonResponse>,
        quizzes: Vec<QuizNode<Q>>,
    ) -> Self {
        Self {
            id: section.id,
            title: section.title,
            description: section.description,
            sort_order: section.sort_order,
            lessons,
            quizzes,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CurriculumResponse<Q> {
    pub(crate) course_id: String,
    pub(crate) sections: Vec<SectionNode<Q>>,
    /// Quizzes not attached to any section.
    pub(crate) general_quizzes: Vec<QuizNode<Q>>,
}
