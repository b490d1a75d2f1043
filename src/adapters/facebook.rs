use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{ProviderClient, ResolverAdapter, non_empty};
use crate::config::EndpointConfig;
use crate::error::GatewayError;
use crate::media::ResolvedMedia;
use crate::platform::PlatformId;

/// Link-map resolver: JSON request `{url}`, response carries HD/SD links in
/// a keyed object plus an explicit success flag.
pub struct FacebookAdapter {
    provider: ProviderClient,
}

impl FacebookAdapter {
    pub fn new(client: Client, endpoints: EndpointConfig) -> Self {
        Self {
            provider: ProviderClient::new(client, endpoints, PlatformId::Facebook),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FacebookResponse {
    success: Option<bool>,
    title: Option<String>,
    thumbnail: Option<String>,
    duration: Option<u64>,
    links: FacebookLinks,
}

#[derive(Debug, Deserialize)]
struct FacebookLinks {
    #[serde(rename = "HD")]
    hd: Option<String>,
    #[serde(rename = "SD")]
    sd: Option<String>,
}

#[async_trait]
impl ResolverAdapter for FacebookAdapter {
    async fn resolve(&self, url: &str) -> Result<ResolvedMedia, GatewayError> {
        let response: FacebookResponse = self.provider.post_json(&json!({ "url": url })).await?;

        if response.success == Some(false) {
            return Err(GatewayError::UpstreamUnavailable(
                "provider reported it could not resolve the Facebook URL".to_string(),
            ));
        }

        let hd = non_empty(response.links.hd);
        let sd = non_empty(response.links.sd);

        let mut qualities = Vec::new();
        if hd.is_some() {
            qualities.push("HD".to_string());
        }
        if sd.is_some() {
            qualities.push("SD".to_string());
        }

        let download_url = hd.or(sd).ok_or_else(|| {
            GatewayError::ParseError("provider returned no Facebook links".to_string())
        })?;

        Ok(ResolvedMedia::resolved(
            PlatformId::Facebook,
            response.title,
            response.thumbnail,
            response.duration,
            qualities,
            download_url,
            None,
        ))
    }
}
