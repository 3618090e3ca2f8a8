// ============================================================================
// PocketConfig — Runtime Configuration
// ============================================================================
// Endpoints, callback address, file paths and timeouts. Defaults match the
// public Pocket service; every field can be overridden from the environment
// (POCKET_* variables) and then by CLI flags.
// ============================================================================

use std::net::ToSocketAddrs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::types::PocketError;

pub const DEFAULT_API_BASE_URL: &str = "https://getpocket.com";
pub const DEFAULT_AUTHORIZE_URL: &str = "https://getpocket.com/auth/authorize";
pub const DEFAULT_CALLBACK_HOST: &str = "localhost";
pub const DEFAULT_CALLBACK_PORT: u16 = 6969;
pub const DEFAULT_CREDENTIALS_PATH: &str = "pocket_access_token.json";
pub const DEFAULT_ARTICLES_PATH: &str = "articles.json";
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Route the Pocket redirect lands on
pub const CALLBACK_PATH: &str = "/pocketapp";
/// Route that ends the callback wait
pub const STOP_PATH: &str = "/stop";

/// Application configuration
#[derive(Debug, Clone)]
pub struct PocketConfig {
    /// Application key issued by Pocket (required)
    pub consumer_key: String,
    pub api_base_url: String,
    pub authorize_url: String,
    pub callback_host: String,
    pub callback_port: u16,
    /// How long to wait for the browser to hit the stop route
    pub callback_timeout: Duration,
    /// Total timeout applied to each API request
    pub request_timeout: Duration,
    pub credentials_path: PathBuf,
    pub articles_path: PathBuf,
    pub page_size: u32,
}

impl Default for PocketConfig {
    fn default() -> Self {
        Self {
            consumer_key: String::new(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            authorize_url: DEFAULT_AUTHORIZE_URL.to_string(),
            callback_host: DEFAULT_CALLBACK_HOST.to_string(),
            callback_port: DEFAULT_CALLBACK_PORT,
            callback_timeout: Duration::from_secs(300),
            request_timeout: Duration::from_secs(30),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            articles_path: PathBuf::from(DEFAULT_ARTICLES_PATH),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PocketConfig {
    /// Defaults overridden by any POCKET_* environment variables that are set.
    pub fn from_env() -> Result<Self, PocketError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`PocketConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PocketError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = lookup("POCKET_CONSUMER_KEY") {
            config.consumer_key = v;
        }
        if let Some(v) = lookup("POCKET_API_URL") {
            config.api_base_url = v;
        }
        if let Some(v) = lookup("POCKET_AUTHORIZE_URL") {
            config.authorize_url = v;
        }
        if let Some(v) = lookup("POCKET_CALLBACK_HOST") {
            config.callback_host = v;
        }
        if let Some(v) = lookup("POCKET_CALLBACK_PORT") {
            config.callback_port = parse_var("POCKET_CALLBACK_PORT", &v)?;
        }
        if let Some(v) = lookup("POCKET_CALLBACK_TIMEOUT_SECS") {
            config.callback_timeout =
                Duration::from_secs(parse_var("POCKET_CALLBACK_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = lookup("POCKET_REQUEST_TIMEOUT_SECS") {
            config.request_timeout =
                Duration::from_secs(parse_var("POCKET_REQUEST_TIMEOUT_SECS", &v)?);
        }
        if let Some(v) = lookup("POCKET_CREDENTIALS_PATH") {
            config.credentials_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("POCKET_ARTICLES_PATH") {
            config.articles_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("POCKET_PAGE_SIZE") {
            config.page_size = parse_var("POCKET_PAGE_SIZE", &v)?;
        }

        Ok(config)
    }

    /// Redirect URI registered with Pocket for the authorization step.
    pub fn redirect_uri(&self) -> String {
        format!(
            "http://{}:{}{}",
            self.callback_host, self.callback_port, CALLBACK_PATH
        )
    }

    pub fn validate(&self) -> Result<(), PocketError> {
        if self.consumer_key.trim().is_empty() {
            return Err(PocketError::Config(
                "consumer key is not set (POCKET_CONSUMER_KEY or --consumer-key)".to_string(),
            ));
        }
        if self.page_size == 0 {
            return Err(PocketError::Config("page size must be at least 1".to_string()));
        }
        self.check_loopback_callback()
    }

    /// The callback routes are unauthenticated, so every address the host
    /// resolves to must be loopback.
    fn check_loopback_callback(&self) -> Result<(), PocketError> {
        let addrs: Vec<_> = (self.callback_host.as_str(), self.callback_port)
            .to_socket_addrs()
            .map_err(|e| {
                PocketError::Config(format!(
                    "cannot resolve callback host '{}': {}",
                    self.callback_host, e
                ))
            })?
            .collect();

        if addrs.is_empty() {
            return Err(PocketError::Config(format!(
                "callback host '{}' resolves to no address",
                self.callback_host
            )));
        }
        if let Some(addr) = addrs.iter().find(|a| !a.ip().is_loopback()) {
            return Err(PocketError::Config(format!(
                "callback host '{}' is not loopback ({})",
                self.callback_host,
                addr.ip()
            )));
        }
        Ok(())
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T, PocketError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| PocketError::Config(format!("invalid {} '{}': {}", name, value, e)))
}
