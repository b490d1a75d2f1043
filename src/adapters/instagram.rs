use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{ProviderClient, ResolverAdapter, non_empty};
use crate::config::EndpointConfig;
use crate::error::GatewayError;
use crate::media::ResolvedMedia;
use crate::platform::PlatformId;

/// Flat-shape resolver: JSON request `{url}`, response carries the direct
/// media URL at the top level.
pub struct InstagramAdapter {
    provider: ProviderClient,
}

impl InstagramAdapter {
    pub fn new(client: Client, endpoints: EndpointConfig) -> Self {
        Self {
            provider: ProviderClient::new(client, endpoints, PlatformId::Instagram),
        }
    }
}

#[derive(Debug, Deserialize)]
struct InstagramResponse {
    title: Option<String>,
    thumbnail: Option<String>,
    duration: Option<u64>,
    url: String,
}

#[async_trait]
impl ResolverAdapter for InstagramAdapter {
    async fn resolve(&self, url: &str) -> Result<ResolvedMedia, GatewayError> {
        let response: InstagramResponse = self.provider.post_json(&json!({ "url": url })).await?;

        let download_url = non_empty(Some(response.url)).ok_or_else(|| {
            GatewayError::ParseError("provider returned an empty Instagram media URL".to_string())
        })?;

        Ok(ResolvedMedia::resolved(
            PlatformId::Instagram,
            response.title,
            response.thumbnail,
            response.duration,
            vec!["Original".to_string()],
            download_url,
            None,
        ))
    }
}
