// src/api.rs
//! HTTP adapter over the presenter boundary: serves the latest gauge
//! reading and lets a client request an immediate cycle.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::aggregate::Aggregator;
use crate::present::{FanoutPresenter, LogPresenter, MeterPresenter, SnapshotPresenter};
use crate::scheduler::CycleRunner;

#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<CycleRunner>,
    pub snapshot: Arc<SnapshotPresenter>,
}

impl AppState {
    /// Wire an aggregator to the log + snapshot presenters.
    pub fn new(aggregator: Aggregator) -> Self {
        let snapshot = Arc::new(SnapshotPresenter::new());
        let presenter: Arc<dyn MeterPresenter> = Arc::new(FanoutPresenter::new(vec![
            Arc::new(LogPresenter),
            snapshot.clone(),
        ]));
        Self {
            runner: Arc::new(CycleRunner::new(aggregator, presenter)),
            snapshot,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/meter", get(meter))
        .route("/refresh", post(refresh))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn meter(State(state): State<AppState>) -> Response {
    match state.snapshot.latest() {
        Some(reading) => Json(reading.gauge()).into_response(),
        // nothing rendered yet
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn refresh(State(state): State<AppState>) -> Response {
    match state.runner.try_run().await {
        Some(reading) => Json(reading.gauge()).into_response(),
        None => (StatusCode::CONFLICT, "cycle already in flight").into_response(),
    }
}
