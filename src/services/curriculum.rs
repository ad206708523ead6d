use std::collections::HashMap;

use sqlx::PgPool;

use crate::db::models::QuizQuestion;
use crate::repositories;
use crate::schemas::curriculum::{CurriculumResponse, LessonResponse, QuizNode, SectionNode};

/// Assemble the full curriculum tree of a course: sections with their lessons
/// and quizzes, plus the quizzes that hang off the course directly. Every
/// level comes back ordered by `sort_order` with the id as tie-break, so the
/// tree is stable even when appends raced and produced duplicate positions.
///
/// `map_question` decides how much of each question is exposed; the admin
/// surface keeps the answer key, the public one strips it.
pub(crate) async fn load<Q, F>(
    pool: &PgPool,
    course_id: &str,
    map_question: F,
) -> Result<CurriculumResponse<Q>, sqlx::Error>
where
    F: Fn(QuizQuestion) -> Q,
{
    let sections = repositories::sections::list_for_course(pool, course_id).await?;
    let quizzes = repositories::quizzes::list_for_course(pool, course_id).await?;

    let mut section_quizzes: HashMap<String, Vec<QuizNode<Q>>> = HashMap::new();
    let mut general_quizzes = Vec::new();

    for quiz in quizzes {
        let questions = repositories::quiz_questions::list_for_quiz(pool, &quiz.id)
            .await?
            .into_iter()
            .map(&map_question)
            .collect();

        let section_id = quiz.section_id.clone();
        let node = QuizNode::from_db(quiz, questions);
        match section_id {
            Some(section_id) => section_quizzes.entry(section_id).or_default().push(node),
            None => general_quizzes.push(node),
        }
    }

    let mut section_nodes = Vec::with_capacity(sections.len());
    for section in sections {
        let lessons = repositories::lessons::list_for_section(pool, &section.id)
            .await?
            .into_iter()
            .map(LessonResponse::from_db)
            .collect();
        let quizzes = section_quizzes.remove(&section.id).unwrap_or_default();
        section_nodes.push(SectionNode::from_db(section, lessons, quizzes));
    }

    Ok(CurriculumResponse {
        course_id: course_id.to_string(),
        sections: section_nodes,
        general_quizzes,
    })
}
