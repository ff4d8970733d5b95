//! Plant leaf disease diagnosis service.
//!
//! A leaf photograph uploaded to `POST /predict` is normalized, run
//! through a pre-trained PlantVillage classifier and answered with the
//! detected condition, a confidence and a remedy suggestion.

pub mod config;
pub mod download;
pub mod labels;
pub mod model;
pub mod predict;
pub mod preprocess;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::model::Engine;

pub struct AppState {
    pub engine: Engine,
}

impl AppState {
    pub fn new(engine: Engine) -> Self {
        Self { engine }
    }
}

pub type SharedState = Arc<AppState>;

/// Build the HTTP routes around an already initialized engine.
pub fn app(state: SharedState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/predict", post(predict::predict))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
    pub version: &'static str,
}

/// GET /health
async fn health_check(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model_loaded: state.engine.is_ready(),
        version: env!("CARGO_PKG_VERSION"),
    })
}
