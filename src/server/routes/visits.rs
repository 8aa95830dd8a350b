use axum::{
    extract::{Path, Query, State},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::auth::RequireAuth;
use crate::db::queries::questions;
use crate::db::queries::questions::QuestionStats;
use crate::server::app::AppState;
use crate::server::error::ApiError;
use crate::telemetry::VISIT_CNTR;

use super::ApiResponse;

/// Counts one answer reveal. Not idempotent: every call increments. The
/// browsing UI fires this without blocking on the result, so a vanished
/// question is only worth a warning here.
async fn record_visit(
    State(pool): State<SqlitePool>,
    Path(question_id): Path<i64>,
) -> ApiResponse<Json<QuestionStats>> {
    questions::increment_visits(&pool, question_id)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                tracing::warn!(question_id, "visit recorded for missing question");
                ApiError::NotFound("question")
            }
            other => other.into(),
        })?;

    let stats = questions::get_question_stats(&pool, question_id).await?;
    VISIT_CNTR
        .with_label_values(&[stats.category_name.as_str(), stats.question.as_str()])
        .inc();
    Ok(Json(stats))
}

#[derive(Deserialize)]
struct VisitsQuery {
    limit: Option<i64>,
}

/// Statistics feed for the admin dashboard: questions with category name
/// and answer, most-visited first, optionally capped with `?limit=`.
async fn visit_stats(
    RequireAuth(_): RequireAuth,
    State(pool): State<SqlitePool>,
    Query(VisitsQuery { limit }): Query<VisitsQuery>,
) -> ApiResponse<Json<Vec<QuestionStats>>> {
    Ok(Json(
        questions::get_questions_by_visits(&pool, limit).await?,
    ))
}

pub fn visits_router(state: AppState) -> Router {
    Router::new()
        .route("/visits", get(visit_stats))
        .route("/visits/{question_id}", put(record_visit))
        .with_state(state)
}
