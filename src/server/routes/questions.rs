use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::auth::RequireAuth;
use crate::db::queries::{categories, questions};
use crate::db::Question;
use crate::server::app::AppState;
use crate::server::error::ApiError;

use super::ApiResponse;

#[derive(Deserialize)]
struct NewQuestion {
    category: i64,
    question: String,
    answer: String,
}

#[derive(Deserialize)]
struct QuestionUpdate {
    question: String,
    answer: String,
}

#[derive(Deserialize)]
struct QuestionsQuery {
    category_id: Option<i64>,
}

fn validate_texts(question: &str, answer: &str) -> Result<(), ApiError> {
    if question.trim().is_empty() || answer.trim().is_empty() {
        return Err(ApiError::Validation(
            "question text and answer text are required".into(),
        ));
    }
    Ok(())
}

async fn questions_list(
    State(pool): State<SqlitePool>,
    Query(QuestionsQuery { category_id }): Query<QuestionsQuery>,
) -> ApiResponse<Json<Vec<Question>>> {
    let questions = match category_id {
        Some(id) => questions::get_questions_for_category(&pool, id).await?,
        None => questions::get_questions(&pool).await?,
    };
    Ok(Json(questions))
}

async fn question(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> ApiResponse<Json<Question>> {
    Ok(Json(questions::get_question(&pool, id).await?))
}

/// A question is created together with its single answer.
async fn create_question(
    RequireAuth(_): RequireAuth,
    State(pool): State<SqlitePool>,
    Json(new_question): Json<NewQuestion>,
) -> ApiResponse<(StatusCode, Json<Question>)> {
    validate_texts(&new_question.question, &new_question.answer)?;
    categories::get_category(&pool, new_question.category)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => ApiError::NotFound("category"),
            other => other.into(),
        })?;

    let id = questions::create_question(
        &pool,
        new_question.category,
        new_question.question.trim(),
        new_question.answer.trim(),
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(questions::get_question(&pool, id).await?),
    ))
}

async fn update_question(
    RequireAuth(_): RequireAuth,
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(update): Json<QuestionUpdate>,
) -> ApiResponse<Json<Question>> {
    validate_texts(&update.question, &update.answer)?;
    questions::update_question(&pool, id, update.question.trim(), update.answer.trim()).await?;
    Ok(Json(questions::get_question(&pool, id).await?))
}

/// The embedded answer goes with the question row.
async fn delete_question(
    RequireAuth(_): RequireAuth,
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> ApiResponse<StatusCode> {
    questions::delete_question(&pool, id).await?;
    Ok(StatusCode::OK)
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(questions_list).post(create_question))
        .route(
            "/questions/{id}",
            get(question).put(update_question).delete(delete_question),
        )
        .with_state(state)
}
