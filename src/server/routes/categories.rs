use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::auth::RequireAuth;
use crate::db::queries::categories;
use crate::db::queries::categories::CategoryWithCount;
use crate::db::Category;
use crate::server::app::AppState;
use crate::server::error::ApiError;

use super::ApiResponse;

#[derive(Deserialize)]
struct NewCategory {
    name: String,
}

impl NewCategory {
    fn validated_name(&self) -> Result<&str, ApiError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ApiError::Validation("category name is required".into()));
        }
        Ok(name)
    }
}

async fn get_categories(
    State(pool): State<SqlitePool>,
) -> ApiResponse<Json<Vec<CategoryWithCount>>> {
    Ok(Json(categories::get_categories(&pool).await?))
}

async fn category(
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> ApiResponse<Json<Category>> {
    Ok(Json(categories::get_category(&pool, id).await?))
}

async fn create_category(
    RequireAuth(_): RequireAuth,
    State(pool): State<SqlitePool>,
    Json(new_category): Json<NewCategory>,
) -> ApiResponse<(StatusCode, Json<Category>)> {
    let name = new_category.validated_name()?;
    if categories::get_category_by_name(&pool, name).await?.is_some() {
        return Err(ApiError::Conflict("category already exists".into()));
    }

    let id = categories::create_category(&pool, name).await?;
    Ok((
        StatusCode::CREATED,
        Json(categories::get_category(&pool, id).await?),
    ))
}

async fn update_category(
    RequireAuth(_): RequireAuth,
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(update): Json<NewCategory>,
) -> ApiResponse<Json<Category>> {
    let name = update.validated_name()?;
    categories::update_category(&pool, id, name).await?;
    Ok(Json(categories::get_category(&pool, id).await?))
}

/// Deletion is blocked at the application layer while the category still
/// owns questions; the category stays queryable after a rejected delete.
async fn delete_category(
    RequireAuth(_): RequireAuth,
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> ApiResponse<StatusCode> {
    if categories::count_questions(&pool, id).await? > 0 {
        return Err(ApiError::Conflict(
            "category has questions, delete questions before deleting category".into(),
        ));
    }
    categories::delete_category(&pool, id).await?;
    Ok(StatusCode::OK)
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(category).put(update_category).delete(delete_category),
        )
        .with_state(state)
}
