//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_API_BASE_URL` - Remote catalog API (default: <https://ecomm.braventra.in/api>)
//! - `STOREFRONT_ASSET_BASE_URL` - Host serving API images (default: API base without `/api`)
//! - `STOREFRONT_API_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `STOREFRONT_API_CACHE_TTL_SECS` - Catalog cache TTL, 0 disables (default: 60)
//! - `STOREFRONT_IMAGE_FALLBACK` - Placeholder image path
//! - `STOREFRONT_CURRENCY_SYMBOL` - Price prefix (default: `$`)
//! - `STOREFRONT_HERO_AUTOPLAY_MS` - Hero banner interval (default: 5000)
//! - `STOREFRONT_STRIP_AUTOPLAY_MS` - Category strip interval (default: 3500)
//! - `STOREFRONT_MENU_HIDE_GRACE_MS` - Mega-menu hide delay (default: 200)
//! - `STOREFRONT_AUTH_RATE_LIMIT` - Rate limit login/register (default: true)
//! - `STOREFRONT_CONTENT_DIR` - Markdown content root
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "https://ecomm.braventra.in/api";
const DEFAULT_IMAGE_FALLBACK: &str = "/static/images/product-fallback.svg";
const DEFAULT_CONTENT_DIR: &str = "crates/storefront/content";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Remote catalog API configuration
    pub api: ApiConfig,
    /// Image and price presentation
    pub display: DisplayConfig,
    /// Carousel and menu timings
    pub ui: UiConfig,
    /// Whether `POST /login` and `POST /register` are rate limited
    pub auth_rate_limit: bool,
    /// Directory holding `pages/` and `blog/` markdown
    pub content_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
    pub sentry_sample_rate: f32,
    pub sentry_traces_sample_rate: f32,
}

/// Remote API client configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to (no trailing slash)
    pub base_url: String,
    pub timeout: Duration,
    /// Catalog cache TTL; `Duration::ZERO` disables caching
    pub cache_ttl: Duration,
}

/// Presentation settings.
#[derive(Debug, Clone)]
pub struct DisplayConfig {
    /// Origin that relative image paths are resolved against
    pub asset_base_url: String,
    pub image_fallback: String,
    pub currency_symbol: String,
}

/// Timings for the interactive widgets.
#[derive(Debug, Clone, Copy)]
pub struct UiConfig {
    pub hero_autoplay: Duration,
    pub strip_autoplay: Duration,
    pub menu_hide_grace: Duration,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            hero_autoplay: Duration::from_millis(5000),
            strip_autoplay: Duration::from_millis(3500),
            menu_hide_grace: Duration::from_millis(200),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let host = env.parsed("STOREFRONT_HOST", "127.0.0.1")?;
        let port = env.parsed("STOREFRONT_PORT", "3000")?;
        let base_url = env.required_url("STOREFRONT_BASE_URL")?;

        let api_base_url = env.url_or_default("STOREFRONT_API_BASE_URL", DEFAULT_API_BASE_URL)?;
        let asset_base_url = match env.optional("STOREFRONT_ASSET_BASE_URL") {
            Some(value) => validate_url("STOREFRONT_ASSET_BASE_URL", &value)?,
            None => derive_asset_base(&api_base_url),
        };

        let api = ApiConfig {
            base_url: api_base_url,
            timeout: Duration::from_secs(env.parsed("STOREFRONT_API_TIMEOUT_SECS", "10")?),
            cache_ttl: Duration::from_secs(env.parsed("STOREFRONT_API_CACHE_TTL_SECS", "60")?),
        };

        let display = DisplayConfig {
            asset_base_url,
            image_fallback: env.or_default("STOREFRONT_IMAGE_FALLBACK", DEFAULT_IMAGE_FALLBACK),
            currency_symbol: env.or_default("STOREFRONT_CURRENCY_SYMBOL", "$"),
        };

        let ui = UiConfig {
            hero_autoplay: Duration::from_millis(env.parsed("STOREFRONT_HERO_AUTOPLAY_MS", "5000")?),
            strip_autoplay: Duration::from_millis(
                env.parsed("STOREFRONT_STRIP_AUTOPLAY_MS", "3500")?,
            ),
            menu_hide_grace: Duration::from_millis(
                env.parsed("STOREFRONT_MENU_HIDE_GRACE_MS", "200")?,
            ),
        };

        let sample_rate = env.parsed("SENTRY_SAMPLE_RATE", "1.0")?;
        let traces_sample_rate = env.parsed("SENTRY_TRACES_SAMPLE_RATE", "0.1")?;

        Ok(Self {
            host,
            port,
            base_url,
            api,
            display,
            ui,
            auth_rate_limit: env.parsed("STOREFRONT_AUTH_RATE_LIMIT", "true")?,
            content_dir: PathBuf::from(env.or_default("STOREFRONT_CONTENT_DIR", DEFAULT_CONTENT_DIR)),
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: sample_rate,
            sentry_traces_sample_rate: traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable, treating blank values as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.or_default(key, default)
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    fn required_url(&self, key: &str) -> Result<String, ConfigError> {
        let value = self.required(key)?;
        validate_url(key, &value)
    }

    fn url_or_default(&self, key: &str, default: &str) -> Result<String, ConfigError> {
        let value = self.or_default(key, default);
        validate_url(key, &value)
    }
}

/// Check that `value` is an absolute http(s) URL and strip any trailing slash.
fn validate_url(key: &str, value: &str) -> Result<String, ConfigError> {
    let url = Url::parse(value.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(value.trim().trim_end_matches('/').to_string())
}

/// `https://host/api` serves images from `https://host`.
fn derive_asset_base(api_base_url: &str) -> String {
    api_base_url
        .strip_suffix("/api")
        .unwrap_or(api_base_url)
        .to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("STOREFRONT_BASE_URL", "http://localhost:3000/")]).unwrap();

        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.api.base_url, "https://ecomm.braventra.in/api");
        assert_eq!(config.display.asset_base_url, "https://ecomm.braventra.in");
        assert_eq!(config.api.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.ui.hero_autoplay, Duration::from_millis(5000));
        assert_eq!(config.ui.strip_autoplay, Duration::from_millis(3500));
        assert_eq!(config.ui.menu_hide_grace, Duration::from_millis(200));
        assert_eq!(config.display.currency_symbol, "$");
        assert!(config.auth_rate_limit);
        assert!(!config.is_secure());
    }

    #[test]
    fn test_missing_base_url() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "STOREFRONT_BASE_URL"));
    }

    #[test]
    fn test_invalid_port() {
        let err = load(&[
            ("STOREFRONT_BASE_URL", "http://localhost:3000"),
            ("STOREFRONT_PORT", "eighty"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "STOREFRONT_PORT"));
    }

    #[test]
    fn test_api_base_must_be_http() {
        let err = load(&[
            ("STOREFRONT_BASE_URL", "http://localhost:3000"),
            ("STOREFRONT_API_BASE_URL", "ftp://files.example.com"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_explicit_asset_base_and_zero_ttl() {
        let config = load(&[
            ("STOREFRONT_BASE_URL", "https://shop.example.com"),
            ("STOREFRONT_API_BASE_URL", "http://127.0.0.1:9000/api"),
            ("STOREFRONT_ASSET_BASE_URL", "https://cdn.example.com/"),
            ("STOREFRONT_API_CACHE_TTL_SECS", "0"),
        ])
        .unwrap();

        assert_eq!(config.display.asset_base_url, "https://cdn.example.com");
        assert_eq!(config.api.cache_ttl, Duration::ZERO);
        assert!(config.is_secure());
    }

    #[test]
    fn test_socket_addr() {
        let config = load(&[
            ("STOREFRONT_BASE_URL", "http://localhost:3000"),
            ("STOREFRONT_HOST", "0.0.0.0"),
            ("STOREFRONT_PORT", "8080"),
        ])
        .unwrap();

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "0.0.0.0");
        assert_eq!(addr.port(), 8080);
    }
}
