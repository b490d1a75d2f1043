use reqwest::Client;
use url::Url;

use crate::adapters::{
    FacebookAdapter, InstagramAdapter, ResolverAdapter, TiktokAdapter, TwitterAdapter,
    YoutubeAdapter,
};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::media::ResolvedMedia;
use crate::platform::{PlatformId, classify};

/// Resolution orchestrator. Owns one adapter per supported platform and
/// dispatches each request to exactly one of them; it adds no retries beyond
/// the single primary-to-backup fallback the adapters already perform, and
/// keeps no state between requests.
pub struct MediaGateway {
    instagram: InstagramAdapter,
    youtube: YoutubeAdapter,
    tiktok: TiktokAdapter,
    facebook: FacebookAdapter,
    twitter: TwitterAdapter,
}

impl MediaGateway {
    pub fn new(client: Client, config: &GatewayConfig) -> Self {
        Self {
            instagram: InstagramAdapter::new(client.clone(), config.instagram.clone()),
            youtube: YoutubeAdapter::new(client.clone(), config.youtube.clone()),
            tiktok: TiktokAdapter::new(client.clone(), config.tiktok.clone()),
            facebook: FacebookAdapter::new(client.clone(), config.facebook.clone()),
            twitter: TwitterAdapter::new(client, config.twitter.clone()),
        }
    }

    /// Validates the request and determines the target platform without any
    /// network I/O. Explicit labels win over classification.
    pub fn target_platform(url: &str, platform: Option<&str>) -> Result<PlatformId, GatewayError> {
        require_absolute_http_url(url)?;

        let platform = match platform {
            Some(label) => PlatformId::from_label(label)
                .ok_or_else(|| GatewayError::UnsupportedPlatform(label.to_string()))?,
            None => classify(url),
        };

        if platform == PlatformId::Other {
            return Err(GatewayError::UnsupportedPlatform(url.to_string()));
        }

        Ok(platform)
    }

    pub async fn resolve(
        &self,
        url: &str,
        platform: Option<&str>,
    ) -> Result<ResolvedMedia, GatewayError> {
        let platform = Self::target_platform(url, platform)?;
        self.adapter_for(platform).resolve(url).await
    }

    fn adapter_for(&self, platform: PlatformId) -> &dyn ResolverAdapter {
        match platform {
            PlatformId::Instagram => &self.instagram,
            PlatformId::Youtube => &self.youtube,
            PlatformId::Tiktok => &self.tiktok,
            PlatformId::Facebook => &self.facebook,
            PlatformId::Twitter => &self.twitter,
            // target_platform never lets Other through.
            PlatformId::Other => unreachable!("no adapter exists for PlatformId::Other"),
        }
    }
}

pub(crate) fn require_absolute_http_url(input: &str) -> Result<Url, GatewayError> {
    let parsed =
        Url::parse(input.trim()).map_err(|_| GatewayError::InvalidUrl(input.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(GatewayError::InvalidUrl(input.to_string()));
    }
    Ok(parsed)
}
