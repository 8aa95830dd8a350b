use axum::body::Body;
use axum::http::header;
use axum::response::Response;
use axum::{extract::FromRef, http::StatusCode, routing::get, Router};
use prometheus::{Encoder, TextEncoder};
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::routes::{
    category_router, questions_router, session_router, users_router, visits_router,
};
use crate::auth::SessionKeys;
use crate::configuration::Settings;

#[derive(FromRef, Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub session_keys: SessionKeys,
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(users_router(state.clone()))
        .merge(session_router(state.clone()))
        .merge(category_router(state.clone()))
        .merge(questions_router(state.clone()))
        .merge(visits_router(state))
        .fallback(|| async {
            tracing::info!("Fallback");
            StatusCode::NOT_FOUND
        })
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(pool: SqlitePool, settings: &Settings) -> anyhow::Result<()> {
    let addr = format!(
        "{}:{}",
        settings.application.host, settings.application.port
    );
    let state = AppState {
        pool,
        session_keys: SessionKeys::new(&settings.session),
    };

    let app = app_router(state);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("Serving on {addr}");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metrics = prometheus::gather();
    let mut buf = vec![];
    encoder.encode(&metrics, &mut buf).unwrap();
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, encoder.format_type())
        .body(Body::from(buf))
        .unwrap()
}
