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
use crate::db::models::{Lesson, Quiz, QuizQuestion, Section};
use crate::repositories;
use crate::schemas::curriculum::{
    CurriculumResponse, LessonForm, QuestionForm, QuestionResponse, QuizForm, SectionForm,
};
use crate::services::curriculum;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/courses/:course_id/curriculum", get(get_curriculum))
        .route("/courses/:course_id/sections", post(create_section))
        .route("/sections/:section_id", post(update_section))
        .route("/sections/:section_id/delete", post(delete_section))
        .route("/sections/:section_id/lessons", post(create_lesson))
        .route("/lessons/:lesson_id", post(update_lesson))
        .route("/lessons/:lesson_id/delete", post(delete_lesson))
        .route("/courses/:course_id/quizzes", post(create_quiz))
        .route("/quizzes/:quiz_id", post(update_quiz))
        .route("/quizzes/:quiz_id/delete", post(delete_quiz))
        .route("/quizzes/:quiz_id/questions", post(create_question))
        .route("/questions/:question_id", post(update_question))
        .route("/questions/:question_id/delete", post(delete_question))
}

fn curriculum_url(course_id: &str) -> String {
    format!("/admin/courses/{course_id}/curriculum")
}

async fn get_curriculum(
    AdminUser(_admin): AdminUser,
    Path(course_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<CurriculumResponse<QuestionResponse>>, ApiError> {
    let course = repositories::courses::find_by_id(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    let tree = curriculum::load(state.db(), &course.id, QuestionResponse::from_db)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load curriculum"))?;

    Ok(Json(tree))
}

async fn create_section(
    AdminUser(admin): AdminUser,
    Path(course_id): Path<String>,
    State(state): State<AppState>,
    Form(payload): Form<SectionForm>,
) -> Result<Redirect, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let course = repositories::courses::find_by_id(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    let now = time::primitive_now_utc();
    let section = repositories::sections::append(
        state.db(),
        repositories::sections::AppendSection {
            id: &Uuid::new_v4().to_string(),
            course_id: &course.id,
            title: payload.title.trim(),
            description: payload.description.as_deref(),
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create section"))?;

    tracing::info!(
        admin_id = %admin.id,
        section_id = %section.id,
        course_id = %course.id,
        action = "section_create",
        "Admin created section"
    );

    Ok(Redirect::to(&curriculum_url(&course.id)))
}

async fn update_section(
    AdminUser(admin): AdminUser,
    Path(section_id): Path<String>,
    State(state): State<AppState>,
    Form(payload): Form<SectionForm>,
) -> Result<Redirect, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let section = fetch_section(&state, &section_id).await?;

    repositories::sections::update(
        state.db(),
        &section.id,
        repositories::sections::UpdateSection {
            title: payload.title.trim().to_string(),
            description: payload.description,
            updated_at: time::primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update section"))?;

    tracing::info!(
        admin_id = %admin.id,
        section_id = %section.id,
        action = "section_update",
        "Admin updated section"
    );

    Ok(Redirect::to(&curriculum_url(&section.course_id)))
}

async fn delete_section(
    AdminUser(admin): AdminUser,
    Path(section_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, ApiError> {
    let section = fetch_section(&state, &section_id).await?;

    repositories::sections::delete(state.db(), &section.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete section"))?;

    tracing::info!(
        admin_id = %admin.id,
        section_id = %section.id,
        action = "section_delete",
        "Admin deleted section"
    );

    Ok(Redirect::to(&curriculum_url(&section.course_id)))
}

async fn create_lesson(
    AdminUser(admin): AdminUser,
    Path(section_id): Path<String>,
    State(state): State<AppState>,
    Form(payload): Form<LessonForm>,
) -> Result<Redirect, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let section = fetch_section(&state, &section_id).await?;

    let now = time::primitive_now_utc();
    let lesson = repositories::lessons::append(
        state.db(),
        repositories::lessons::AppendLesson {
            id: &Uuid::new_v4().to_string(),
            section_id: &section.id,
            course_id: &section.course_id,
            title: payload.title.trim(),
            lesson_type: payload.lesson_type,
            content_url: payload.content_url.as_deref(),
            duration_minutes: payload.duration_minutes,
            is_preview: payload.is_preview,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create lesson"))?;

    tracing::info!(
        admin_id = %admin.id,
        lesson_id = %lesson.id,
        section_id = %section.id,
        action = "lesson_create",
        "Admin created lesson"
    );

    Ok(Redirect::to(&curriculum_url(&section.course_id)))
}

async fn update_lesson(
    AdminUser(admin): AdminUser,
    Path(lesson_id): Path<String>,
    State(state): State<AppState>,
    Form(payload): Form<LessonForm>,
) -> Result<Redirect, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let lesson = fetch_lesson(&state, &lesson_id).await?;

    repositories::lessons::update(
        state.db(),
        &lesson.id,
        repositories::lessons::UpdateLesson {
            title: payload.title.trim().to_string(),
            lesson_type: payload.lesson_type,
            content_url: payload.content_url,
            duration_minutes: payload.duration_minutes,
            is_preview: payload.is_preview,
            updated_at: time::primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update lesson"))?;

    tracing::info!(
        admin_id = %admin.id,
        lesson_id = %lesson.id,
        action = "lesson_update",
        "Admin updated lesson"
    );

    Ok(Redirect::to(&curriculum_url(&lesson.course_id)))
}

async fn delete_lesson(
    AdminUser(admin): AdminUser,
    Path(lesson_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, ApiError> {
    let lesson = fetch_lesson(&state, &lesson_id).await?;

    repositories::lessons::delete(state.db(), &lesson.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete lesson"))?;

    tracing::info!(
        admin_id = %admin.id,
        lesson_id = %lesson.id,
        action = "lesson_delete",
        "Admin deleted lesson"
    );

    Ok(Redirect::to(&curriculum_url(&lesson.course_id)))
}

async fn create_quiz(
    AdminUser(admin): AdminUser,
    Path(course_id): Path<String>,
    State(state): State<AppState>,
    Form(payload): Form<QuizForm>,
) -> Result<Redirect, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let course = repositories::courses::find_by_id(state.db(), &course_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch course"))?
        .ok_or_else(|| ApiError::NotFound("Course not found".to_string()))?;

    validate_quiz_section(&state, &course.id, payload.section_id.as_deref()).await?;

    let now = time::primitive_now_utc();
    let quiz = repositories::quizzes::append(
        state.db(),
        repositories::quizzes::AppendQuiz {
            id: &Uuid::new_v4().to_string(),
            course_id: &course.id,
            section_id: payload.section_id.as_deref(),
            title: payload.title.trim(),
            passing_score: payload.passing_score,
            max_attempts: payload.max_attempts,
            time_limit_minutes: payload.time_limit_minutes,
            is_required: payload.is_required,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create quiz"))?;

    tracing::info!(
        admin_id = %admin.id,
        quiz_id = %quiz.id,
        course_id = %course.id,
        action = "quiz_create",
        "Admin created quiz"
    );

    Ok(Redirect::to(&curriculum_url(&course.id)))
}

async fn update_quiz(
    AdminUser(admin): AdminUser,
    Path(quiz_id): Path<String>,
    State(state): State<AppState>,
    Form(payload): Form<QuizForm>,
) -> Result<Redirect, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let quiz = fetch_quiz(&state, &quiz_id).await?;

    validate_quiz_section(&state, &quiz.course_id, payload.section_id.as_deref()).await?;

    repositories::quizzes::update(
        state.db(),
        &quiz.id,
        repositories::quizzes::UpdateQuiz {
            section_id: payload.section_id,
            title: payload.title.trim().to_string(),
            passing_score: payload.passing_score,
            max_attempts: payload.max_attempts,
            time_limit_minutes: payload.time_limit_minutes,
            is_required: payload.is_required,
            updated_at: time::primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update quiz"))?;

    tracing::info!(
        admin_id = %admin.id,
        quiz_id = %quiz.id,
        action = "quiz_update",
        "Admin updated quiz"
    );

    Ok(Redirect::to(&curriculum_url(&quiz.course_id)))
}

async fn delete_quiz(
    AdminUser(admin): AdminUser,
    Path(quiz_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, ApiError> {
    let quiz = fetch_quiz(&state, &quiz_id).await?;

    repositories::quizzes::delete(state.db(), &quiz.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete quiz"))?;

    tracing::info!(
        admin_id = %admin.id,
        quiz_id = %quiz.id,
        action = "quiz_delete",
        "Admin deleted quiz"
    );

    Ok(Redirect::to(&curriculum_url(&quiz.course_id)))
}

async fn create_question(
    AdminUser(admin): AdminUser,
    Path(quiz_id): Path<String>,
    State(state): State<AppState>,
    Form(payload): Form<QuestionForm>,
) -> Result<Redirect, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let quiz = fetch_quiz(&state, &quiz_id).await?;

    let options = if payload.options.is_empty() { None } else { Some(payload.options) };

    let now = time::primitive_now_utc();
    let question = repositories::quiz_questions::append(
        state.db(),
        repositories::quiz_questions::AppendQuestion {
            id: &Uuid::new_v4().to_string(),
            quiz_id: &quiz.id,
            question_text: payload.question_text.trim(),
            question_type: payload.question_type,
            options,
            correct_answer: &payload.correct_answer,
            explanation: payload.explanation.as_deref(),
            points: payload.points,
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create question"))?;

    tracing::info!(
        admin_id = %admin.id,
        question_id = %question.id,
        quiz_id = %quiz.id,
        action = "question_create",
        "Admin created question"
    );

    Ok(Redirect::to(&curriculum_url(&quiz.course_id)))
}

async fn update_question(
    AdminUser(admin): AdminUser,
    Path(question_id): Path<String>,
    State(state): State<AppState>,
    Form(payload): Form<QuestionForm>,
) -> Result<Redirect, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let question = fetch_question(&state, &question_id).await?;
    let quiz = fetch_quiz(&state, &question.quiz_id).await?;

    let options = if payload.options.is_empty() { None } else { Some(payload.options) };

    repositories::quiz_questions::update(
        state.db(),
        &question.id,
        repositories::quiz_questions::UpdateQuestion {
            question_text: payload.question_text.trim().to_string(),
            question_type: payload.question_type,
            options,
            correct_answer: payload.correct_answer,
            explanation: payload.explanation,
            points: payload.points,
            updated_at: time::primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update question"))?;

    tracing::info!(
        admin_id = %admin.id,
        question_id = %question.id,
        action = "question_update",
        "Admin updated question"
    );

    Ok(Redirect::to(&curriculum_url(&quiz.course_id)))
}

async fn delete_question(
    AdminUser(admin): AdminUser,
    Path(question_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, ApiError> {
    let question = fetch_question(&state, &question_id).await?;
    let quiz = fetch_quiz(&state, &question.quiz_id).await?;

    repositories::quiz_questions::delete(state.db(), &question.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete question"))?;

    tracing::info!(
        admin_id = %admin.id,
        question_id = %question.id,
        action = "question_delete",
        "Admin deleted question"
    );

    Ok(Redirect::to(&curriculum_url(&quiz.course_id)))
}

/// A quiz may sit in one of its own course's sections or in the general slot
/// (no section); anything else is a client error.
async fn validate_quiz_section(
    state: &AppState,
    course_id: &str,
    section_id: Option<&str>,
) -> Result<(), ApiError> {
    let Some(section_id) = section_id else {
        return Ok(());
    };

    let section = fetch_section(state, section_id).await.map_err(|err| match err {
        ApiError::NotFound(_) => ApiError::BadRequest("Section does not exist".to_string()),
        other => other,
    })?;

    if section.course_id != course_id {
        return Err(ApiError::BadRequest("Section belongs to a different course".to_string()));
    }

    Ok(())
}

async fn fetch_section(state: &AppState, section_id: &str) -> Result<Section, ApiError> {
    repositories::sections::find_by_id(state.db(), section_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch section"))?
        .ok_or_else(|| ApiError::NotFound("Section not found".to_string()))
}

async fn fetch_lesson(state: &AppState, lesson_id: &str) -> Result<Lesson, ApiError> {
    repositories::lessons::find_by_id(state.db(), lesson_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch lesson"))?
        .ok_or_else(|| ApiError::NotFound("Lesson not found".to_string()))
}

async fn fetch_quiz(state: &AppState, quiz_id: &str) -> Result<Quiz, ApiError> {
    repositories::quizzes::find_by_id(state.db(), quiz_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch quiz"))?
        .ok_or_else(|| ApiError::NotFound("Quiz not found".to_string()))
}

async fn fetch_question(state: &AppState, question_id: &str) -> Result<QuizQuestion, ApiError> {
    repositories::quiz_questions::find_by_id(state.db(), question_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch question"))?
        .ok_or_else(|| ApiError::NotFound("Question not found".to_string()))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    use crate::repositories;
    use crate::test_support;

    #[tokio::test]
    async fn sections_append_at_end_and_deletes_leave_gaps() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db()).await;
        let token = test_support::bearer_token(&admin.id, ctx.state.settings());
        let course = test_support::insert_course(ctx.state.db(), "Ordered Course").await;

        for title in ["Intro", "Middle", "Outro"] {
            let response = ctx
                .app
                .clone()
                .oneshot(test_support::form_request(
                    Method::POST,
                    &format!("/admin/courses/{}/sections", course.id),
                    Some(&token),
                    &[("title", title)],
                ))
                .await
                .expect("create section");
            assert_eq!(response.status(), StatusCode::SEE_OTHER);
        }

        let sections =
            repositories::sections::list_for_course(ctx.state.db(), &course.id).await.expect("list");
        let orders: Vec<i32> = sections.iter().map(|s| s.sort_order).collect();
        assert_eq!(orders, vec![0, 1, 2]);

        // Deleting the middle section must not renumber the survivors.
        let middle = sections[1].id.clone();
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::form_request(
                Method::POST,
                &format!("/admin/sections/{middle}/delete"),
                Some(&token),
                &[],
            ))
            .await
            .expect("delete section");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let sections =
            repositories::sections::list_for_course(ctx.state.db(), &course.id).await.expect("list");
        let orders: Vec<i32> = sections.iter().map(|s| s.sort_order).collect();
        assert_eq!(orders, vec![0, 2]);
    }

    #[tokio::test]
    async fn quiz_section_must_belong_to_course() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db()).await;
        let token = test_support::bearer_token(&admin.id, ctx.state.settings());

        let course_a = test_support::insert_course(ctx.state.db(), "Course A").await;
        let course_b = test_support::insert_course(ctx.state.db(), "Course B").await;
        let section_b = test_support::insert_section(ctx.state.db(), &course_b.id, "B1").await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::form_request(
                Method::POST,
                &format!("/admin/courses/{}/quizzes", course_a.id),
                Some(&token),
                &[("title", "Misplaced"), ("section_id", &section_b.id)],
            ))
            .await
            .expect("create quiz");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn quiz_update_moves_it_into_a_section() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db()).await;
        let token = test_support::bearer_token(&admin.id, ctx.state.settings());

        let course = test_support::insert_course(ctx.state.db(), "Movable").await;
        let section = test_support::insert_section(ctx.state.db(), &course.id, "S1").await;
        let other_course = test_support::insert_course(ctx.state.db(), "Elsewhere").await;
        let foreign_section =
            test_support::insert_section(ctx.state.db(), &other_course.id, "X1").await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::form_request(
                Method::POST,
                &format!("/admin/courses/{}/quizzes", course.id),
                Some(&token),
                &[("title", "Checkpoint")],
            ))
            .await
            .expect("create quiz");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let quizzes =
            repositories::quizzes::list_for_course(ctx.state.db(), &course.id).await.expect("list");
        let quiz_id = quizzes[0].id.clone();
        assert!(quizzes[0].section_id.is_none());

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::form_request(
                Method::POST,
                &format!("/admin/quizzes/{quiz_id}"),
                Some(&token),
                &[("title", "Checkpoint"), ("section_id", &section.id)],
            ))
            .await
            .expect("move quiz");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let moved = repositories::quizzes::find_by_id(ctx.state.db(), &quiz_id)
            .await
            .expect("find")
            .expect("quiz");
        assert_eq!(moved.section_id.as_deref(), Some(section.id.as_str()));

        // A section from another course is rejected and the quiz stays put.
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::form_request(
                Method::POST,
                &format!("/admin/quizzes/{quiz_id}"),
                Some(&token),
                &[("title", "Checkpoint"), ("section_id", &foreign_section.id)],
            ))
            .await
            .expect("foreign move");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let unchanged = repositories::quizzes::find_by_id(ctx.state.db(), &quiz_id)
            .await
            .expect("find")
            .expect("quiz");
        assert_eq!(unchanged.section_id.as_deref(), Some(section.id.as_str()));
    }

    #[tokio::test]
    async fn curriculum_tree_groups_general_quizzes_separately() {
        let ctx = test_support::setup_test_context().await;
        let admin = test_support::insert_admin(ctx.state.db()).await;
        let token = test_support::bearer_token(&admin.id, ctx.state.settings());

        let course = test_support::insert_course(ctx.state.db(), "Tree Course").await;
        let section = test_support::insert_section(ctx.state.db(), &course.id, "S1").await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::form_request(
                Method::POST,
                &format!("/admin/courses/{}/quizzes", course.id),
                Some(&token),
                &[("title", "Final Exam")],
            ))
            .await
            .expect("general quiz");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::form_request(
                Method::POST,
                &format!("/admin/courses/{}/quizzes", course.id),
                Some(&token),
                &[("title", "Section Check"), ("section_id", &section.id)],
            ))
            .await
            .expect("section quiz");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::GET,
                &format!("/admin/courses/{}/curriculum", course.id),
                Some(&token),
                None,
            ))
            .await
            .expect("curriculum");
        let status = response.status();
        let tree = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::OK, "response: {tree}");

        assert_eq!(tree["course_id"], course.id);
        assert_eq!(tree["general_quizzes"].as_array().expect("general").len(), 1);
        assert_eq!(tree["general_quizzes"][0]["title"], "Final Exam");
        let sections = tree["sections"].as_array().expect("sections");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0]["quizzes"][0]["title"], "Section Check");
    }
}
