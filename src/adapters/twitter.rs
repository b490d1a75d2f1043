use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{ProviderClient, ResolverAdapter, non_empty};
use crate::config::EndpointConfig;
use crate::error::GatewayError;
use crate::media::ResolvedMedia;
use crate::platform::PlatformId;

/// Variant-list resolver: JSON request `{url}`, response carries media items
/// whose video variants are ranked by bitrate.
pub struct TwitterAdapter {
    provider: ProviderClient,
}

impl TwitterAdapter {
    pub fn new(client: Client, endpoints: EndpointConfig) -> Self {
        Self {
            provider: ProviderClient::new(client, endpoints, PlatformId::Twitter),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TwitterResponse {
    text: Option<String>,
    duration_ms: Option<u64>,
    media: Vec<TwitterMedia>,
}

#[derive(Debug, Deserialize)]
struct TwitterMedia {
    thumbnail: Option<String>,
    variants: Vec<TwitterVariant>,
}

#[derive(Debug, Deserialize)]
struct TwitterVariant {
    bitrate: Option<u64>,
    url: String,
}

#[async_trait]
impl ResolverAdapter for TwitterAdapter {
    async fn resolve(&self, url: &str) -> Result<ResolvedMedia, GatewayError> {
        let response: TwitterResponse = self.provider.post_json(&json!({ "url": url })).await?;

        let media = response
            .media
            .into_iter()
            .find(|item| !item.variants.is_empty())
            .ok_or_else(|| {
                GatewayError::ParseError("provider returned no Twitter video media".to_string())
            })?;

        let mut variants = media.variants;
        variants.sort_by(|a, b| b.bitrate.unwrap_or(0).cmp(&a.bitrate.unwrap_or(0)));

        let qualities = variants
            .iter()
            .map(|variant| match variant.bitrate {
                Some(bitrate) if bitrate > 0 => format!("{} kbps", bitrate / 1000),
                _ => "variable".to_string(),
            })
            .collect::<Vec<_>>();

        let best = variants.into_iter().next().ok_or_else(|| {
            GatewayError::ParseError("provider returned no Twitter variants".to_string())
        })?;
        let download_url = non_empty(Some(best.url)).ok_or_else(|| {
            GatewayError::ParseError("provider returned an empty Twitter variant URL".to_string())
        })?;

        Ok(ResolvedMedia::resolved(
            PlatformId::Twitter,
            response.text,
            media.thumbnail,
            response.duration_ms.map(|ms| ms / 1000),
            qualities,
            download_url,
            None,
        ))
    }
}
