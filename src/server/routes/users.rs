use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::auth::{password, RequireAuth};
use crate::db::queries::users;
use crate::db::User;
use crate::server::app::AppState;
use crate::server::error::ApiError;

use super::ApiResponse;

#[derive(Deserialize)]
struct NewUser {
    name: String,
    surname: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct UserUpdate {
    name: String,
    surname: String,
    email: String,
}

// Not RFC 5322; rejects the obviously malformed without bouncing real
// addresses.
fn is_valid_email(email: &str) -> bool {
    if email.len() < 5 || email.len() > 254 {
        return false;
    }
    let mut parts = email.split('@');
    let local = parts.next().unwrap_or_default();
    let domain = parts.next().unwrap_or_default();
    parts.next().is_none()
        && !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

impl NewUser {
    fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() || self.surname.trim().is_empty() {
            return Err(ApiError::Validation("name and surname are required".into()));
        }
        if !is_valid_email(self.email.trim()) {
            return Err(ApiError::Validation("invalid email address".into()));
        }
        if self.password.len() < 8 || self.password.len() > 128 {
            return Err(ApiError::Validation(
                "password must be between 8 and 128 characters".into(),
            ));
        }
        Ok(())
    }
}

impl UserUpdate {
    fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() || self.surname.trim().is_empty() {
            return Err(ApiError::Validation("name and surname are required".into()));
        }
        if !is_valid_email(self.email.trim()) {
            return Err(ApiError::Validation("invalid email address".into()));
        }
        Ok(())
    }
}

async fn create_user(
    State(pool): State<SqlitePool>,
    Json(new_user): Json<NewUser>,
) -> ApiResponse<(StatusCode, Json<User>)> {
    new_user.validate()?;

    let email = new_user.email.trim().to_owned();
    if users::get_user_by_email(&pool, &email).await?.is_some() {
        return Err(ApiError::Conflict("email already exists".into()));
    }

    let password = new_user.password;
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| ApiError::Internal(e.into()))?
        .map_err(|e| ApiError::Internal(e.into()))?;

    let id = users::create_user(
        &pool,
        new_user.name.trim(),
        new_user.surname.trim(),
        &email,
        &password_hash,
        "user",
    )
    .await?;

    Ok((StatusCode::CREATED, Json(users::get_user(&pool, id).await?)))
}

async fn list_users(
    RequireAuth(_): RequireAuth,
    State(pool): State<SqlitePool>,
) -> ApiResponse<Json<Vec<User>>> {
    Ok(Json(users::get_users(&pool).await?))
}

async fn user(
    RequireAuth(_): RequireAuth,
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> ApiResponse<Json<User>> {
    Ok(Json(users::get_user(&pool, id).await?))
}

async fn update_user(
    RequireAuth(_): RequireAuth,
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
    Json(update): Json<UserUpdate>,
) -> ApiResponse<Json<User>> {
    update.validate()?;
    users::update_user(
        &pool,
        id,
        update.name.trim(),
        update.surname.trim(),
        update.email.trim(),
    )
    .await?;
    Ok(Json(users::get_user(&pool, id).await?))
}

async fn delete_user(
    RequireAuth(admin): RequireAuth,
    State(pool): State<SqlitePool>,
    Path(id): Path<i64>,
) -> ApiResponse<StatusCode> {
    users::delete_user(&pool, id).await?;
    tracing::info!(by = %admin.email, user_id = id, "user deleted");
    Ok(StatusCode::OK)
}

pub fn users_router(state: AppState) -> Router {
    Router::new()
        .route("/users", post(create_user).get(list_users))
        .route("/users/{id}", get(user).put(update_user).delete(delete_user))
        .with_state(state)
}
