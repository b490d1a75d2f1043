use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{ProviderClient, ResolverAdapter, non_empty};
use crate::config::EndpointConfig;
use crate::error::GatewayError;
use crate::media::ResolvedMedia;
use crate::platform::PlatformId;

/// Format-list resolver: JSON request `{url}`, response carries an ordered
/// format array (best first) with per-format quality labels.
pub struct YoutubeAdapter {
    provider: ProviderClient,
}

impl YoutubeAdapter {
    pub fn new(client: Client, endpoints: EndpointConfig) -> Self {
        Self {
            provider: ProviderClient::new(client, endpoints, PlatformId::Youtube),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YoutubeResponse {
    title: Option<String>,
    thumbnail: Option<String>,
    duration: Option<u64>,
    formats: Vec<YoutubeFormat>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YoutubeFormat {
    quality_label: Option<String>,
    url: String,
    content_length: Option<u64>,
}

#[async_trait]
impl ResolverAdapter for YoutubeAdapter {
    async fn resolve(&self, url: &str) -> Result<ResolvedMedia, GatewayError> {
        let response: YoutubeResponse = self.provider.post_json(&json!({ "url": url })).await?;

        let qualities = response
            .formats
            .iter()
            .filter_map(|format| non_empty(format.quality_label.clone()))
            .collect::<Vec<_>>();

        // The provider lists formats best-first; the head is the download.
        let best = response.formats.into_iter().next().ok_or_else(|| {
            GatewayError::ParseError("provider returned no YouTube formats".to_string())
        })?;
        let download_url = non_empty(Some(best.url)).ok_or_else(|| {
            GatewayError::ParseError("provider returned an empty YouTube format URL".to_string())
        })?;

        Ok(ResolvedMedia::resolved(
            PlatformId::Youtube,
            response.title,
            response.thumbnail,
            response.duration,
            qualities,
            download_url,
            best.content_length,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use url::Url;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn adapter_for(server: &MockServer) -> YoutubeAdapter {
        let client = Client::builder()
            .timeout(Duration::from_millis(500))
            .build()
            .unwrap();
        YoutubeAdapter::new(
            client,
            EndpointConfig {
                primary: Url::parse(&server.uri()).unwrap(),
                backup: None,
            },
        )
    }

    #[tokio::test]
    async fn picks_head_format_and_collects_quality_labels() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "title": "Video",
                "thumbnail": "https://i.ytimg.com/t.jpg",
                "duration": 605,
                "formats": [
                    {"qualityLabel": "1080p", "url": "https://cdn/1080.mp4", "contentLength": 52_428_800u64},
                    {"qualityLabel": "720p", "url": "https://cdn/720.mp4"},
                    {"qualityLabel": "360p", "url": "https://cdn/360.mp4"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let media = adapter_for(&server)
            .resolve("https://www.youtube.com/watch?v=dQw4")
            .await
            .unwrap();

        assert!(media.success);
        assert_eq!(media.download_url.as_deref(), Some("https://cdn/1080.mp4"));
        assert_eq!(media.qualities, vec!["1080p", "720p", "360p"]);
        assert_eq!(media.duration, "10:05");
        assert_eq!(media.approx_size_bytes, Some(52_428_800));
    }

    #[tokio::test]
    async fn empty_format_list_is_a_parse_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"title": "Video", "formats": []})),
            )
            .mount(&server)
            .await;

        let error = adapter_for(&server)
            .resolve("https://www.youtube.com/watch?v=dQw4")
            .await
            .unwrap_err();

        assert_eq!(error.kind(), "ParseError");
    }
}
