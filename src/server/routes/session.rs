use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::SqlitePool;

use crate::auth::{authenticate, session, AuthSession, SessionKeys};
use crate::server::app::AppState;
use crate::server::error::ApiError;

use super::ApiResponse;

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

/// Credential sign-in. On success the session token travels back as an
/// HttpOnly cookie; the body carries the identity for the client UI.
async fn create_session(
    State(pool): State<SqlitePool>,
    State(keys): State<SessionKeys>,
    jar: CookieJar,
    Json(credentials): Json<Credentials>,
) -> ApiResponse<(CookieJar, Json<Value>)> {
    let identity = authenticate(&pool, credentials.email.trim(), &credentials.password).await?;
    let token = session::issue(&keys, &identity).map_err(|e| ApiError::Internal(e.into()))?;

    tracing::info!(email = %identity.email, "session issued");
    let jar = jar.add(session::session_cookie(token, keys.ttl));
    Ok((jar, Json(json!({ "user": identity }))))
}

/// Whoami. Anonymous requests get `{"user": null}`, not an error.
async fn current_session(AuthSession(identity): AuthSession) -> Json<Value> {
    Json(json!({ "user": identity }))
}

async fn delete_session(jar: CookieJar) -> (CookieJar, StatusCode) {
    (
        jar.remove(session::clear_session_cookie()),
        StatusCode::OK,
    )
}

pub fn session_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/session",
            post(create_session)
                .get(current_session)
                .delete(delete_session),
        )
        .with_state(state)
}
