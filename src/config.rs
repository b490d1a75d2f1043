use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0.0.0 Safari/537.36";
const DEFAULT_RESOLVE_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_RELAY_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 250 * 1024 * 1024;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ConfigError(String);

/// Primary resolver endpoint for a platform, plus the single optional backup
/// tried once when the primary fails.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub primary: Url,
    pub backup: Option<Url>,
}

/// Immutable gateway configuration, read from the environment once at startup
/// and injected everywhere it is needed. Adapter logic never reads ambient
/// environment state.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub instagram: EndpointConfig,
    pub youtube: EndpointConfig,
    pub tiktok: EndpointConfig,
    pub facebook: EndpointConfig,
    pub twitter: EndpointConfig,
    pub user_agent: String,
    pub resolve_timeout: Duration,
    pub relay_timeout: Duration,
    pub max_file_size: u64,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            instagram: endpoints_from_env(
                "INSTAGRAM",
                "https://api.instasave.website/media",
                Some("https://backup.instasave.website/media"),
            )?,
            youtube: endpoints_from_env(
                "YOUTUBE",
                "https://api.ytstream.app/v1/video",
                Some("https://backup.ytstream.app/v1/video"),
            )?,
            tiktok: endpoints_from_env(
                "TIKTOK",
                "https://api.tikwm.com/api/",
                Some("https://tikwm.hnn.workers.dev/api/"),
            )?,
            facebook: endpoints_from_env("FACEBOOK", "https://api.fdown.net/resolve", None)?,
            twitter: endpoints_from_env(
                "TWITTER",
                "https://api.twitsave.com/info",
                Some("https://backup.twitsave.com/info"),
            )?,
            user_agent: read_env("OUTBOUND_USER_AGENT")
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            resolve_timeout: Duration::from_millis(read_u64_env(
                "RESOLVE_TIMEOUT_MS",
                DEFAULT_RESOLVE_TIMEOUT_MS,
            )?),
            relay_timeout: Duration::from_millis(read_u64_env(
                "RELAY_TIMEOUT_MS",
                DEFAULT_RELAY_TIMEOUT_MS,
            )?),
            max_file_size: read_u64_env("MAX_FILE_SIZE_BYTES", DEFAULT_MAX_FILE_SIZE_BYTES)?,
        })
    }
}

fn endpoints_from_env(
    platform: &str,
    default_primary: &str,
    default_backup: Option<&str>,
) -> Result<EndpointConfig, ConfigError> {
    let primary_var = format!("{platform}_API_URL");
    let backup_var = format!("{platform}_BACKUP_API_URL");

    let primary = match read_env(&primary_var) {
        Some(value) => parse_endpoint(&primary_var, &value)?,
        None => parse_endpoint(&primary_var, default_primary)?,
    };
    let backup = match read_env(&backup_var) {
        Some(value) => Some(parse_endpoint(&backup_var, &value)?),
        None => default_backup
            .map(|value| parse_endpoint(&backup_var, value))
            .transpose()?,
    };

    Ok(EndpointConfig { primary, backup })
}

fn parse_endpoint(name: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value)
        .map_err(|error| ConfigError(format!("{name} is not a valid URL ({value:?}): {error}")))
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn read_u64_env(name: &str, default: u64) -> Result<u64, ConfigError> {
    match read_env(name) {
        Some(value) => value
            .parse::<u64>()
            .map_err(|_| ConfigError(format!("{name} must be a non-negative integer, got {value:?}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        // Environment-dependent overrides are covered implicitly; the default
        // path must always produce a usable config.
        let config = GatewayConfig::from_env().unwrap();

        assert_eq!(config.resolve_timeout, Duration::from_secs(15));
        assert_eq!(config.relay_timeout, Duration::from_secs(60));
        assert_eq!(config.max_file_size, 250 * 1024 * 1024);
        assert!(config.tiktok.backup.is_some());
        assert_eq!(config.tiktok.primary.scheme(), "https");
        assert!(!config.user_agent.is_empty());
    }
}
