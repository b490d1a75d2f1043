use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformId {
    Instagram,
    Youtube,
    Tiktok,
    Facebook,
    Twitter,
    Other,
}

impl PlatformId {
    /// Human-readable name, used for the generic "<Platform> Video" title.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Instagram => "Instagram",
            Self::Youtube => "YouTube",
            Self::Tiktok => "TikTok",
            Self::Facebook => "Facebook",
            Self::Twitter => "Twitter",
            Self::Other => "Unknown",
        }
    }

    /// Parses an explicitly supplied platform label from a request body.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "instagram" => Some(Self::Instagram),
            "youtube" => Some(Self::Youtube),
            "tiktok" => Some(Self::Tiktok),
            "facebook" => Some(Self::Facebook),
            "twitter" | "x" => Some(Self::Twitter),
            _ => None,
        }
    }
}

/// Ordered fragment table. First match wins, so more specific fragments must
/// come before generic ones if platforms with overlapping domains are added.
/// The bare `x.com` host gets anchored fragments to avoid matching hosts
/// that merely end in those letters.
const DOMAIN_FRAGMENTS: &[(&str, PlatformId)] = &[
    ("instagram.com", PlatformId::Instagram),
    ("instagr.am", PlatformId::Instagram),
    ("youtube.com", PlatformId::Youtube),
    ("youtu.be", PlatformId::Youtube),
    ("tiktok.com", PlatformId::Tiktok),
    ("facebook.com", PlatformId::Facebook),
    ("fb.watch", PlatformId::Facebook),
    ("twitter.com", PlatformId::Twitter),
    ("//x.com", PlatformId::Twitter),
    (".x.com", PlatformId::Twitter),
];

/// Maps a URL to a platform by case-insensitive substring matching. Pure and
/// infallible: anything unmatched is `Other`.
pub fn classify(url: &str) -> PlatformId {
    let haystack = url.to_ascii_lowercase();
    DOMAIN_FRAGMENTS
        .iter()
        .find(|(fragment, _)| haystack.contains(fragment))
        .map(|(_, platform)| *platform)
        .unwrap_or(PlatformId::Other)
}
