//! Per-platform resolver adapters. Each adapter shapes the outbound request
//! for its third-party resolver endpoint and parses that endpoint's
//! idiosyncratic JSON into the canonical [`ResolvedMedia`] record.

mod facebook;
mod instagram;
mod tiktok;
mod twitter;
mod youtube;

pub use facebook::FacebookAdapter;
pub use instagram::InstagramAdapter;
pub use tiktok::TiktokAdapter;
pub use twitter::TwitterAdapter;
pub use youtube::YoutubeAdapter;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;
use url::Url;

use crate::config::EndpointConfig;
use crate::error::GatewayError;
use crate::media::ResolvedMedia;
use crate::platform::PlatformId;

#[async_trait]
pub trait ResolverAdapter: Send + Sync {
    /// Resolves a platform URL to a canonical media record. Transport and
    /// parse failures come back as [`GatewayError`] kinds, never as raw
    /// errors from the HTTP client.
    async fn resolve(&self, url: &str) -> Result<ResolvedMedia, GatewayError>;
}

/// Shared provider plumbing: issues the shaped request against the primary
/// endpoint and retries exactly once against the backup (when configured) on
/// transport failure, non-2xx status, or a body that does not deserialize.
/// No further retries happen at or above this layer.
pub(crate) struct ProviderClient {
    client: Client,
    endpoints: EndpointConfig,
    platform: PlatformId,
}

impl ProviderClient {
    pub(crate) fn new(client: Client, endpoints: EndpointConfig, platform: PlatformId) -> Self {
        Self {
            client,
            endpoints,
            platform,
        }
    }

    pub(crate) async fn post_json<B, T>(&self, body: &B) -> Result<T, GatewayError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        self.fetch(|endpoint| self.client.post(endpoint.clone()).json(body))
            .await
    }

    pub(crate) async fn post_form<T>(&self, form: &[(&str, String)]) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
    {
        self.fetch(|endpoint| self.client.post(endpoint.clone()).form(form))
            .await
    }

    async fn fetch<T, F>(&self, build: F) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
        F: Fn(&Url) -> RequestBuilder,
    {
        let primary_error = match self.attempt(build(&self.endpoints.primary)).await {
            Ok(parsed) => return Ok(parsed),
            Err(error) => error,
        };

        let Some(backup) = &self.endpoints.backup else {
            return Err(primary_error);
        };

        warn!(
            platform = self.platform.display_name(),
            error = %primary_error,
            "primary resolver endpoint failed, falling back to backup"
        );
        self.attempt(build(backup)).await
    }

    async fn attempt<T>(&self, request: RequestBuilder) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
    {
        let response = request.send().await.map_err(|error| {
            GatewayError::UpstreamUnavailable(format!("provider request failed: {error}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::UpstreamUnavailable(format!(
                "provider responded with status {status}"
            )));
        }

        response.json::<T>().await.map_err(|error| {
            GatewayError::ParseError(format!(
                "provider body did not match the expected shape: {error}"
            ))
        })
    }
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|inner| inner.trim().to_string())
        .filter(|inner| !inner.is_empty())
}
