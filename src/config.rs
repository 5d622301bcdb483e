// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Site configuration.
//!
//! A Mount Kelvin installation is addressed by a single site key. Everything
//! else has a default that matches the public API.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

/// Secret key identifying one Mount Kelvin site.
///
/// The key is part of every request URL, so it is redacted when formatted
/// with `Debug` or `Display`. Use [`expose`](Self::expose) to read it.
///
/// # Examples
///
/// ```
/// use mount_kelvin::SiteKey;
///
/// let key = SiteKey::new("abcdef123456").unwrap();
/// assert_eq!(key.expose(), "abcdef123456");
/// assert_eq!(key.to_string(), "ab****");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SiteKey(String);

impl SiteKey {
    /// Creates a site key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptySiteKey` if the key is empty or whitespace.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into().trim().to_string();
        if key.is_empty() {
            return Err(ConfigError::EmptySiteKey);
        }
        Ok(Self(key))
    }

    /// Returns the key in plaintext.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Returns a short redacted form suitable for logs.
    #[must_use]
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(2).collect();
        format!("{prefix}****")
    }
}

impl fmt::Debug for SiteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SiteKey").field(&self.redacted()).finish()
    }
}

impl fmt::Display for SiteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

/// Engine.IO protocol revision spoken by the realtime socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineIoVersion {
    /// Socket.IO 2.x servers. The client drives the heartbeat.
    V3,
    /// Socket.IO 3.x and later. The server drives the heartbeat.
    #[default]
    V4,
}

impl EngineIoVersion {
    /// Returns the value of the `EIO` query parameter.
    #[must_use]
    pub const fn as_query(&self) -> &'static str {
        match self {
            Self::V3 => "3",
            Self::V4 => "4",
        }
    }
}

impl FromStr for EngineIoVersion {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "3" | "v3" | "V3" => Ok(Self::V3),
            "4" | "v4" | "V4" => Ok(Self::V4),
            other => Err(ConfigError::UnsupportedEngineIo(other.to_string())),
        }
    }
}

/// Reconnection behaviour once a realtime session is lost.
///
/// Delays start at `delay` and double on every failed attempt, capped at
/// `max_delay`. Attempts are unlimited unless
/// [`with_max_attempts`](Self::with_max_attempts) is set. A session the
/// server ends on purpose is never resumed.
///
/// # Examples
///
/// ```
/// use mount_kelvin::ReconnectPolicy;
/// use std::time::Duration;
///
/// let policy = ReconnectPolicy::new(Duration::from_secs(1), Duration::from_secs(5))
///     .with_max_attempts(4);
///
/// assert_eq!(policy.delay(1), Some(Duration::from_secs(1)));
/// assert_eq!(policy.delay(3), Some(Duration::from_secs(4)));
/// assert_eq!(policy.delay(4), Some(Duration::from_secs(5)));
/// assert_eq!(policy.delay(5), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    enabled: bool,
    delay: Duration,
    max_delay: Duration,
    max_attempts: Option<u32>,
}

impl ReconnectPolicy {
    /// Delay before the first attempt.
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(1);
    /// Upper bound for the delay between attempts.
    pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(5);

    /// Creates an unlimited policy with the given delays.
    #[must_use]
    pub const fn new(delay: Duration, max_delay: Duration) -> Self {
        Self {
            enabled: true,
            delay,
            max_delay,
            max_attempts: None,
        }
    }

    /// Creates a policy that never reconnects.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(Self::DEFAULT_DELAY, Self::DEFAULT_MAX_DELAY)
        }
    }

    /// Limits the number of attempts per lost session.
    #[must_use]
    pub const fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Returns `true` if lost sessions are resumed at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled && self.max_attempts != Some(0)
    }

    /// Returns the delay before the given attempt, counted from 1, or
    /// `None` once no further attempt should be made.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Option<Duration> {
        if !self.is_enabled() || attempt == 0 {
            return None;
        }
        if self.max_attempts.is_some_and(|max| attempt > max) {
            return None;
        }
        let factor = 2_u32.saturating_pow(attempt - 1);
        Some(self.delay.saturating_mul(factor).min(self.max_delay))
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY, Self::DEFAULT_MAX_DELAY)
    }
}

/// Configuration for one Mount Kelvin site.
///
/// # Examples
///
/// ```
/// use mount_kelvin::SiteConfig;
/// use std::time::Duration;
///
/// let config = SiteConfig::new("site-key")
///     .unwrap()
///     .with_request_timeout(Duration::from_secs(5));
///
/// assert_eq!(config.base_url().as_str(), "https://api.mountkelvin.com/");
/// assert_eq!(config.request_timeout(), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct SiteConfig {
    site_key: SiteKey,
    base_url: Url,
    request_timeout: Duration,
    connect_timeout: Duration,
    engine_io: EngineIoVersion,
    reconnect: ReconnectPolicy,
}

impl SiteConfig {
    /// Public API endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.mountkelvin.com";
    /// Default timeout for command requests.
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
    /// Default timeout for the socket handshake.
    pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Environment variable holding the site key.
    pub const ENV_SITE_KEY: &'static str = "MOUNT_KELVIN_SITE_KEY";
    /// Environment variable overriding the API base URL.
    pub const ENV_BASE_URL: &'static str = "MOUNT_KELVIN_BASE_URL";
    /// Environment variable selecting the Engine.IO version.
    pub const ENV_ENGINE_IO: &'static str = "MOUNT_KELVIN_ENGINE_IO";

    /// Creates a configuration for the given site key with default settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::EmptySiteKey` if the key is empty.
    pub fn new(site_key: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            site_key: SiteKey::new(site_key)?,
            base_url: parse_base_url(Self::DEFAULT_BASE_URL)?,
            request_timeout: Self::DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: Self::DEFAULT_CONNECT_TIMEOUT,
            engine_io: EngineIoVersion::default(),
            reconnect: ReconnectPolicy::default(),
        })
    }

    /// Loads the configuration from `MOUNT_KELVIN_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the site key variable is missing or empty, or if
    /// an optional variable holds an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup.
    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let key =
            lookup(Self::ENV_SITE_KEY).ok_or(ConfigError::MissingVariable(Self::ENV_SITE_KEY))?;
        let mut config = Self::new(key)?;

        if let Some(base_url) = lookup(Self::ENV_BASE_URL) {
            config = config.with_base_url(&base_url)?;
        }
        if let Some(version) = lookup(Self::ENV_ENGINE_IO) {
            config = config.with_engine_io_version(version.parse()?);
        }

        Ok(config)
    }

    /// Sets a custom API base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBaseUrl` if the URL cannot be parsed or is
    /// not `http`/`https`.
    pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ConfigError> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    /// Sets the command request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the socket connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Sets the Engine.IO protocol version.
    #[must_use]
    pub fn with_engine_io_version(mut self, version: EngineIoVersion) -> Self {
        self.engine_io = version;
        self
    }

    /// Sets how lost realtime sessions are resumed.
    #[must_use]
    pub fn with_reconnect(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    /// Returns the site key.
    #[must_use]
    pub fn site_key(&self) -> &SiteKey {
        &self.site_key
    }

    /// Returns the API base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the command request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns the socket connect timeout.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Returns the Engine.IO protocol version.
    #[must_use]
    pub fn engine_io_version(&self) -> EngineIoVersion {
        self.engine_io
    }

    /// Returns the reconnect policy.
    #[must_use]
    pub fn reconnect(&self) -> ReconnectPolicy {
        self.reconnect
    }
}

fn parse_base_url(base_url: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl(format!(
            "unsupported scheme {}",
            url.scheme()
        )));
    }
    Ok(url)
}
