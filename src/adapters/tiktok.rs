use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{ProviderClient, ResolverAdapter, non_empty};
use crate::config::EndpointConfig;
use crate::error::GatewayError;
use crate::media::ResolvedMedia;
use crate::platform::PlatformId;

/// tikwm-style resolver: form-encoded request, payload nested under `data`,
/// separate HD / SD / watermarked play URLs.
pub struct TiktokAdapter {
    provider: ProviderClient,
}

impl TiktokAdapter {
    pub fn new(client: Client, endpoints: EndpointConfig) -> Self {
        Self {
            provider: ProviderClient::new(client, endpoints, PlatformId::Tiktok),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TiktokResponse {
    data: TiktokData,
}

#[derive(Debug, Deserialize)]
struct TiktokData {
    title: Option<String>,
    cover: Option<String>,
    duration: Option<u64>,
    play: Option<String>,
    hdplay: Option<String>,
    wmplay: Option<String>,
    size: Option<u64>,
    hd_size: Option<u64>,
}

#[async_trait]
impl ResolverAdapter for TiktokAdapter {
    async fn resolve(&self, url: &str) -> Result<ResolvedMedia, GatewayError> {
        let form = [("url", url.to_string()), ("hd", "1".to_string())];
        let response: TiktokResponse = self.provider.post_form(&form).await?;
        let data = response.data;

        let hd = non_empty(data.hdplay);
        let sd = non_empty(data.play);
        let watermarked = non_empty(data.wmplay);

        let mut qualities = Vec::new();
        if hd.is_some() {
            qualities.push("HD".to_string());
        }
        if sd.is_some() {
            qualities.push("SD".to_string());
        }
        if watermarked.is_some() {
            qualities.push("Watermarked".to_string());
        }

        let approx_size_bytes = if hd.is_some() {
            data.hd_size.or(data.size)
        } else {
            data.size
        };
        let download_url = hd.or(sd).or(watermarked).ok_or_else(|| {
            GatewayError::ParseError("provider returned no playable TikTok source".to_string())
        })?;

        Ok(ResolvedMedia::resolved(
            PlatformId::Tiktok,
            data.title,
            data.cover,
            data.duration,
            qualities,
            download_url,
            approx_size_bytes,
        ))
    }
}
