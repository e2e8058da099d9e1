pub mod config;
pub mod generate;
pub mod request;

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use paragraph_core::{Decision, ParagraphIndex, ScoredSentence, FALLBACK_ANSWER};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Settings;
use crate::generate::{ContextEcho, Generator, HttpGenerator};
use crate::request::{parse_question, RequestError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    BadRequest(#[from] RequestError),
    #[error("model {0} not found")]
    NotFound(String),
    #[error("generation failed: {0}")]
    Generation(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Generation(_) => StatusCode::BAD_GATEWAY,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PredictResponse {
    pub answer: String,
    pub context: String,
    pub similarity: f64,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_k")]
    pub k: usize,
}
fn default_k() -> usize { 5 }

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub took_s: f64,
    pub results: Vec<ScoredSentence>,
}

/// Shared, read-only request state. The index is built before the router exists.
#[derive(Clone)]
pub struct AppState {
    pub index: Arc<ParagraphIndex>,
    pub generator: Arc<dyn Generator>,
    pub threshold: f64,
    pub model_name: String,
}

pub fn build_app(settings: &Settings) -> Result<Router> {
    settings.validate()?;
    let index = ParagraphIndex::load(&settings.paragraph)?;
    let generator: Arc<dyn Generator> = match &settings.generation.generator_url {
        Some(url) => {
            tracing::info!(%url, model = %settings.generation.model, "using remote generator");
            Arc::new(HttpGenerator::new(url, &settings.generation)?)
        }
        None => {
            tracing::info!("no generator endpoint configured, answers are extractive");
            Arc::new(ContextEcho)
        }
    };
    let state = AppState {
        index: Arc::new(index),
        generator,
        threshold: settings.threshold,
        model_name: settings.model_name.clone(),
    };
    Ok(router(state).layer(cors_from_env()))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/v1/models/:model", get(ready_handler))
        .route("/v1/models/:model/predict", post(model_predict_handler))
        .route("/predict", post(predict_handler))
        .route("/search", get(search_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

// CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
fn cors_from_env() -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                base.allow_origin(Any)
            } else {
                base.allow_origin(AllowOrigin::list(origins))
            }
        }
        Err(_) => base.allow_origin(Any),
    }
}

async fn ready_handler(State(state): State<AppState>, Path(model): Path<String>) -> Result<Json<serde_json::Value>, ApiError> {
    if model != state.model_name {
        return Err(ApiError::NotFound(model));
    }
    Ok(Json(serde_json::json!({ "name": model, "ready": true })))
}

async fn model_predict_handler(
    State(state): State<AppState>,
    Path(model): Path<String>,
    body: Bytes,
) -> Result<Json<PredictResponse>, ApiError> {
    if model != state.model_name {
        return Err(ApiError::NotFound(model));
    }
    predict(&state, &body).await.map(Json)
}

pub async fn predict_handler(State(state): State<AppState>, body: Bytes) -> Result<Json<PredictResponse>, ApiError> {
    predict(&state, &body).await.map(Json)
}

pub async fn predict(state: &AppState, body: &[u8]) -> Result<PredictResponse, ApiError> {
    let question = parse_question(body)?;
    match state.index.decide(&question, state.threshold) {
        Decision::Answerable { context, similarity, .. } => {
            let answer = state
                .generator
                .generate(&question, &context)
                .await
                .map_err(ApiError::Generation)?;
            Ok(PredictResponse { answer, context, similarity })
        }
        Decision::NoAnswer { similarity } => Ok(PredictResponse {
            answer: FALLBACK_ANSWER.to_string(),
            context: String::new(),
            similarity,
        }),
    }
}

pub async fn search_handler(State(state): State<AppState>, Query(params): Query<SearchParams>) -> Json<SearchResponse> {
    let start = std::time::Instant::now();
    let k = params.k.clamp(1, 100);
    let results = state.index.rank(&params.q, k);
    let elapsed = start.elapsed();
    Json(SearchResponse { query: params.q, took_s: elapsed.as_secs_f64(), results })
}
