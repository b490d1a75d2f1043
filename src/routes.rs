use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::warn;

use crate::error::GatewayError;
use crate::gateway::MediaGateway;
use crate::media::ResolvedMedia;
use crate::platform::PlatformId;
use crate::relay::RelayDownloader;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<MediaGateway>,
    pub relay: Arc<RelayDownloader>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/analyze", post(analyze))
        .route("/api/download", post(download))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct AnalyzeRequest {
    url: String,
    platform: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DownloadRequest {
    url: String,
    title: Option<String>,
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "message": "ReelSpot gateway is running"
    }))
}

async fn analyze(State(state): State<AppState>, Json(payload): Json<AnalyzeRequest>) -> Response {
    let platform_label = payload.platform.as_deref();

    match state.gateway.resolve(&payload.url, platform_label).await {
        Ok(media) => (StatusCode::OK, Json(media)).into_response(),
        Err(error @ (GatewayError::InvalidUrl(_) | GatewayError::UnsupportedPlatform(_))) => {
            error.into_response()
        }
        Err(error) => {
            // Request validation already passed, so the target platform is
            // recomputable without I/O for the failure record.
            let platform = MediaGateway::target_platform(&payload.url, platform_label)
                .unwrap_or(PlatformId::Other);
            warn!(
                platform = platform.display_name(),
                kind = error.kind(),
                %error,
                "resolution failed"
            );
            (
                error.status(),
                Json(ResolvedMedia::failure(platform, error.kind())),
            )
                .into_response()
        }
    }
}

async fn download(
    State(state): State<AppState>,
    Json(payload): Json<DownloadRequest>,
) -> Result<Response, GatewayError> {
    state
        .relay
        .relay(&payload.url, payload.title.as_deref())
        .await
}
