mod adapters;
mod config;
mod error;
mod gateway;
mod media;
mod platform;
mod relay;
mod routes;

use std::{collections::HashSet, sync::Arc};

use axum::http::{HeaderValue, Method, header::CONTENT_DISPOSITION};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::GatewayConfig;
use crate::gateway::MediaGateway;
use crate::relay::RelayDownloader;
use crate::routes::{AppState, build_router};

type BoxError = Box<dyn std::error::Error>;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "reelspot_backend=info,tower_http=info".to_string()),
        )
        .init();

    if let Err(error) = run().await {
        eprintln!("Server error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BoxError> {
    let config = GatewayConfig::from_env()?;

    let resolve_client = reqwest::Client::builder()
        .timeout(config.resolve_timeout)
        .user_agent(&config.user_agent)
        .build()?;
    let relay_client = reqwest::Client::builder()
        .timeout(config.relay_timeout)
        .user_agent(&config.user_agent)
        .build()?;

    info!(
        resolve_timeout_ms = config.resolve_timeout.as_millis() as u64,
        relay_timeout_ms = config.relay_timeout.as_millis() as u64,
        max_file_size = config.max_file_size,
        "gateway configuration loaded"
    );

    let state = AppState {
        gateway: Arc::new(MediaGateway::new(resolve_client, &config)),
        relay: Arc::new(RelayDownloader::new(relay_client, config.max_file_size)),
    };

    let cors = build_cors_layer()?;
    let app = build_router(state).layer(cors);

    let addr = resolve_bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|error| format!("could not bind {addr}: {error}"))?;

    info!("ReelSpot gateway listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}

fn resolve_bind_addr() -> String {
    if let Some(configured) = std::env::var("APP_ADDR")
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
    {
        return configured;
    }

    if let Some(port) = std::env::var("PORT")
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
    {
        return format!("0.0.0.0:{port}");
    }

    "127.0.0.1:8787".to_string()
}

fn build_cors_layer() -> Result<CorsLayer, BoxError> {
    let configured = std::env::var("ALLOWED_ORIGINS")
        .ok()
        .map(|value| {
            value
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(ToString::to_string)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let origins = if configured.is_empty() {
        warn!("ALLOWED_ORIGINS is not set; falling back to development origins.");
        vec![
            "http://127.0.0.1:5173".to_string(),
            "http://localhost:5173".to_string(),
        ]
    } else {
        configured
    };

    let normalized_origins = origins
        .iter()
        .map(|origin| {
            normalize_origin(origin).ok_or_else(|| {
                format!(
                    "invalid origin in ALLOWED_ORIGINS: {origin}. Use values like https://example.com"
                )
            })
        })
        .collect::<Result<HashSet<_>, _>>()?;
    let allowed_origins = Arc::new(normalized_origins);
    let allow_origin = AllowOrigin::predicate({
        let allowed_origins = Arc::clone(&allowed_origins);
        move |origin: &HeaderValue, _| {
            let normalized = origin.to_str().ok().and_then(normalize_origin);
            let allowed = normalized
                .as_ref()
                .is_some_and(|value| allowed_origins.contains(value));
            debug!(
                "CORS origin check raw={:?} normalized={:?} allowed={}",
                origin, normalized, allowed
            );
            allowed
        }
    });
    info!(
        "CORS allow-list loaded with {} origin(s)",
        allowed_origins.len()
    );

    Ok(CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
        .expose_headers([CONTENT_DISPOSITION]))
}

fn normalize_origin(value: &str) -> Option<String> {
    let parsed = Url::parse(value).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    let scheme = parsed.scheme();
    let default_port = match scheme {
        "http" => 80,
        "https" => 443,
        _ => return None,
    };
    let port = parsed.port();

    if parsed.path() != "/" || parsed.query().is_some() || parsed.fragment().is_some() {
        return None;
    }

    let include_port = port.is_some_and(|explicit| explicit != default_port);

    if include_port {
        Some(format!("{scheme}://{host}:{}", port?))
    } else {
        Some(format!("{scheme}://{host}"))
    }
}
