use super::cast::ReadinessPolicy;
use super::constants::DEFAULT_TIMEOUT;
use super::directory::Pattern;
use super::error::{ClientError, Error, Result};

use reqwest::Url;

use std::time::Duration;

/// Connection and behavior settings shared by [`Client`](crate::Client),
/// [`Directory`](crate::Directory) and [`Caster`](crate::Caster)
///
/// Nothing here is read from the environment; the binary collects the values and
/// passes them in, which keeps every component testable against a fake server.
///
/// # Example
///
/// ```
/// # use cast_proxy::Config;
/// # fn config() -> Result<Config, cast_proxy::Error> {
/// let config = Config::new("http://homeassistant.local:8123", "long-lived-token")?
///     .with_include_pattern("living|bedroom")?;
/// # Ok(config)
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    base_url: Url,
    token: String,
    include_pattern: Option<Pattern>,
    readiness: ReadinessPolicy,
    request_timeout: Duration,
}

impl Config {
    /// Both values are required; an empty string counts as absent
    pub fn new<S: AsRef<str>>(base_url: S, token: S) -> Result<Self> {
        let base_url = base_url.as_ref().trim();
        let token = token.as_ref().trim();

        if base_url.is_empty() {
            return Err(Error::missing_config("HOME_ASSISTANT_URL"));
        }
        if token.is_empty() {
            return Err(Error::missing_config("HOME_ASSISTANT_TOKEN"));
        }

        let parsed = Url::parse(base_url)
            .map_err(|_| Error::from(ClientError::InvalidBaseUrl(base_url.into())))?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.into()).into());
        }

        Ok(Self {
            base_url: parsed,
            token: token.into(),
            include_pattern: None,
            readiness: ReadinessPolicy::default(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT),
        })
    }

    /// Restrict the directory to entity ids matching `pattern`.
    ///
    /// The pattern is compiled here so a bad value fails at startup, not on the first request.
    pub fn with_include_pattern<S: AsRef<str>>(mut self, pattern: S) -> Result<Self> {
        self.include_pattern = Some(Pattern::new(pattern)?);
        Ok(self)
    }

    pub fn with_readiness(mut self, readiness: ReadinessPolicy) -> Self {
        self.readiness = readiness;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn include_pattern(&self) -> Option<&Pattern> {
        self.include_pattern.as_ref()
    }

    pub fn readiness(&self) -> &ReadinessPolicy {
        &self.readiness
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}
