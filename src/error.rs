use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Every failure the gateway can surface to a caller. Adapters translate
/// transport and parse failures into these kinds; nothing below the route
/// layer returns a raw error to the client.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("input is not a valid absolute http(s) URL: {0}")]
    InvalidUrl(String),
    #[error("no supported platform matches the URL: {0}")]
    UnsupportedPlatform(String),
    #[error("{0}")]
    UpstreamUnavailable(String),
    #[error("{0}")]
    ParseError(String),
    #[error("transfer exceeds the configured limit of {limit} bytes")]
    FileTooLarge { limit: u64 },
    #[error("{0}")]
    DownloadFailed(String),
}

impl GatewayError {
    /// Stable machine-readable kind, used as the `error` field on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "InvalidUrl",
            Self::UnsupportedPlatform(_) => "UnsupportedPlatform",
            Self::UpstreamUnavailable(_) => "UpstreamUnavailable",
            Self::ParseError(_) => "ParseError",
            Self::FileTooLarge { .. } => "FileTooLarge",
            Self::DownloadFailed(_) => "DownloadFailed",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidUrl(_) | Self::UnsupportedPlatform(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            Self::ParseError(_) | Self::DownloadFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        });
        (self.status(), body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_matches_kinds() {
        let cases = [
            (GatewayError::InvalidUrl("x".into()), StatusCode::BAD_REQUEST),
            (
                GatewayError::UnsupportedPlatform("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                GatewayError::UpstreamUnavailable("x".into()),
                StatusCode::BAD_GATEWAY,
            ),
            (
                GatewayError::ParseError("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                GatewayError::FileTooLarge { limit: 1 },
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                GatewayError::DownloadFailed("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status(), expected, "kind {}", error.kind());
        }
    }
}
