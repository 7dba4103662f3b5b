//! Client configuration.
//!
//! `ClientConfig` is built with consuming setters and turned into a client by
//! `PhishNetClient::new`. Everything except the authorization is fixed once
//! the client exists.

use std::time::Duration;

use crate::auth::Authorization;
use crate::error::ApiError;
use crate::request::DEFAULT_RETRIES;

pub const DEFAULT_BASE_URL: &str = "https://api.phish.net/";
pub const DEFAULT_VERSION: &str = "2.0";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub const ENV_API_KEY: &str = "PHISHNET_API_KEY";
pub const ENV_BASE_URL: &str = "PHISHNET_BASE_URL";
pub const ENV_API_VERSION: &str = "PHISHNET_API_VERSION";
pub const ENV_TIMEOUT_SECS: &str = "PHISHNET_TIMEOUT_SECS";
pub const ENV_VERIFY_TLS: &str = "PHISHNET_VERIFY_TLS";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub(crate) api_key: Option<String>,
    pub(crate) base_url: String,
    pub(crate) version: String,
    pub(crate) verify_tls: bool,
    pub(crate) timeout: Option<Duration>,
    pub(crate) retries: u32,
    pub(crate) authorization: Option<Authorization>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            version: DEFAULT_VERSION.to_string(),
            verify_tls: true,
            timeout: Some(DEFAULT_TIMEOUT),
            retries: DEFAULT_RETRIES,
            authorization: None,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the `PHISHNET_*` environment variables on top of the defaults.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let mut config = Self::default();
        if let Some(key) = lookup(ENV_API_KEY) {
            config = config.api_key(key);
        }
        if let Some(url) = lookup(ENV_BASE_URL) {
            config = config.base_url(&url);
        }
        if let Some(version) = lookup(ENV_API_VERSION) {
            config = config.version(version);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config = config.timeout(parse_timeout(&raw)?);
        }
        if let Some(raw) = lookup(ENV_VERIFY_TLS) {
            config = config.verify_tls(parse_flag(ENV_VERIFY_TLS, &raw)?);
        }
        Ok(config)
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the base URL. It is stored with exactly one trailing `/`.
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Disabling verification accepts invalid TLS certificates.
    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    /// Per-attempt timeout. `None` waits indefinitely.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Starts the client already authorized with a previously issued authkey.
    pub fn authorization(mut self, username: impl Into<String>, authkey: impl Into<String>) -> Self {
        self.authorization = Some(Authorization::new(username, authkey));
        self
    }
}

fn normalize_base_url(base_url: &str) -> String {
    format!("{}/", base_url.trim_end_matches('/'))
}

fn parse_timeout(raw: &str) -> Result<Option<Duration>, ApiError> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    let secs: f64 = raw
        .parse()
        .map_err(|_| ApiError::Config(format!("{ENV_TIMEOUT_SECS}={raw:?} is not a number")))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(ApiError::Config(format!(
            "{ENV_TIMEOUT_SECS}={raw:?} must be a non-negative number"
        )));
    }
    if secs == 0.0 {
        return Ok(None);
    }
    Ok(Some(Duration::from_secs_f64(secs)))
}

fn parse_flag(name: &str, raw: &str) -> Result<bool, ApiError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ApiError::Config(format!("{name}={raw:?} is not a boolean"))),
    }
}
