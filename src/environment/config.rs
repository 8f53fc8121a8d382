use std::time::Duration;

use strum_macros::{Display, EnumString};

/// Set this while developing against a fixed backend. Wins over everything.
const DEV_OVERRIDE: Option<&str> = None;
const PRODUCTION_URL: &str = "https://api.partners.loanreferral.in";
const DEFAULT_DEV_HOST: &str = "localhost";
const ANDROID_LOOPBACK: &str = "10.0.2.2";

pub const BASE_URL_VAR: &str = "EXPO_PUBLIC_API_BASE_URL";
pub const PORT_VAR: &str = "EXPO_PUBLIC_API_PORT";
pub const DEV_HOST_VAR: &str = "EXPO_PUBLIC_DEV_HOST";
pub const PLATFORM_VAR: &str = "PARTNER_PLATFORM";

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
pub const REGISTRATION_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Platform {
    Android,
    Ios,
    Web,
    #[default]
    Desktop,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Config {
    pub base_url: String,
    pub platform: Platform,
    pub request_timeout: Duration,
    pub registration_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self::with_base_url(PRODUCTION_URL)
    }
}

impl Config {
    pub fn with_base_url(url: &str) -> Self {
        Self {
            base_url: url.trim_end_matches('/').to_string(),
            platform: Platform::default(),
            request_timeout: REQUEST_TIMEOUT,
            registration_timeout: REGISTRATION_TIMEOUT,
        }
    }

    /// Reads the process environment (after `.env` has been loaded).
    pub fn from_env() -> Self {
        Self::from_lookup(DEV_OVERRIDE, |key| std::env::var(key).ok())
    }

    pub fn from_lookup(dev_override: Option<&str>, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let platform = lookup(PLATFORM_VAR)
            .and_then(|p| p.parse().ok())
            .unwrap_or_default();
        let base_url = resolve_base_url(dev_override, &lookup, platform);
        log::info!("Using API at {base_url} ({platform})");
        Self {
            base_url,
            platform,
            ..Self::default()
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Priority: hard-coded override, explicit base url, local dev server,
/// production.
pub fn resolve_base_url(
    dev_override: Option<&str>,
    lookup: &impl Fn(&str) -> Option<String>,
    platform: Platform,
) -> String {
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    let url = if let Some(url) = dev_override {
        url.to_string()
    } else if let Some(url) = non_empty(BASE_URL_VAR) {
        url
    } else if let Some(port) = non_empty(PORT_VAR) {
        let host = non_empty(DEV_HOST_VAR).unwrap_or_else(|| DEFAULT_DEV_HOST.to_string());
        format!("http://{}:{}", loopback_for(&host, platform), port.trim())
    } else {
        PRODUCTION_URL.to_string()
    };
    url.trim().trim_end_matches('/').to_string()
}

/// The Android emulator reaches the host machine through a fixed address.
fn loopback_for(host: &str, platform: Platform) -> &str {
    match (platform, host) {
        (Platform::Android, "localhost" | "127.0.0.1") => ANDROID_LOOPBACK,
        _ => host,
    }
}
