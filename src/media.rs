use serde::{Deserialize, Serialize};

use crate::platform::PlatformId;

/// Canonical media record every adapter produces, regardless of provider
/// quirks. Invariants: `success == true` implies `download_url` is present;
/// `error` is present only when `success == false`. Use the constructors to
/// keep them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMedia {
    pub success: bool,
    pub platform: PlatformId,
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<u64>,
    /// Display form of the duration, `M:SS` or `"Unknown"`.
    pub duration: String,
    pub qualities: Vec<String>,
    pub download_url: Option<String>,
    /// Best-effort size. Left unset when the provider does not report one;
    /// never estimated.
    pub approx_size_bytes: Option<u64>,
    pub error: Option<String>,
}

impl ResolvedMedia {
    pub fn resolved(
        platform: PlatformId,
        title: Option<String>,
        thumbnail_url: Option<String>,
        duration_seconds: Option<u64>,
        qualities: Vec<String>,
        download_url: String,
        approx_size_bytes: Option<u64>,
    ) -> Self {
        // Providers report 0 when they do not know the duration.
        let duration_seconds = duration_seconds.filter(|seconds| *seconds > 0);
        Self {
            success: true,
            platform,
            title: title
                .and_then(non_blank)
                .unwrap_or_else(|| default_title(platform)),
            thumbnail_url: thumbnail_url.and_then(non_blank),
            duration_seconds,
            duration: format_duration(duration_seconds),
            qualities,
            download_url: Some(download_url),
            approx_size_bytes,
            error: None,
        }
    }

    pub fn failure(platform: PlatformId, error_kind: &str) -> Self {
        Self {
            success: false,
            platform,
            title: default_title(platform),
            thumbnail_url: None,
            duration_seconds: None,
            duration: format_duration(None),
            qualities: Vec::new(),
            download_url: None,
            approx_size_bytes: None,
            error: Some(error_kind.to_string()),
        }
    }
}

fn default_title(platform: PlatformId) -> String {
    format!("{} Video", platform.display_name())
}

/// `M:SS` with zero-padded seconds; absent or zero duration is `"Unknown"`.
pub fn format_duration(seconds: Option<u64>) -> String {
    match seconds {
        Some(total) if total > 0 => format!("{}:{:02}", total / 60, total % 60),
        _ => "Unknown".to_string(),
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
