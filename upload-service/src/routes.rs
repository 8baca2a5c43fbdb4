//! HTTP surface
//!
//! `POST /run` executes one reconciliation-and-upload run, with an optional
//! JSON body of settings overrides taking precedence over the environment.
//! `GET /healthz` answers liveness probes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use bridge_traits::settings::MapSettings;
use core_runtime::settings::SettingsResolver;
use core_upload::{UploadCoordinator, UploadError};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{error, info};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/run", post(run))
        .route("/healthz", get(healthz))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorBody { error: message })).into_response()
}

fn status_for(error: &UploadError) -> StatusCode {
    match error {
        UploadError::Config(_) => StatusCode::BAD_REQUEST,
        UploadError::Auth(_) => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn healthz() -> &'static str {
    "ok"
}

/// Execute one run. The request body, when present, is a flat map of
/// settings overrides (`root_folder_id`, `post_upload_action`, ...).
async fn run(
    State(state): State<AppState>,
    overrides: Option<Json<HashMap<String, String>>>,
) -> Response {
    let mut resolver = SettingsResolver::new();
    if let Some(Json(overrides)) = overrides {
        resolver = resolver.with_source(Arc::new(
            overrides.into_iter().collect::<MapSettings>(),
        ));
    }
    resolver = resolver.with_source(state.settings.clone());

    let settings = match resolver.resolve().await {
        Ok(settings) => settings,
        Err(e) => {
            let e: UploadError = e.into();
            error!(error = %e, "Settings resolution failed");
            return error_response(status_for(&e), e.to_string());
        }
    };

    info!(root = %settings.root_folder_id, "Run requested");

    let coordinator = UploadCoordinator::new(
        state.storage.clone(),
        state.platform.clone(),
        state.log_sink.clone(),
    );

    match coordinator.run(&settings).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            error!(error = %e, "Run failed");
            error_response(status_for(&e), e.to_string())
        }
    }
}
