use std::fmt::{Debug, Display};
use std::time::Duration;

use serde_json::Value;

use crate::cast::Phase;

/// Result for calls made through [`Client`](super::Client) and the components built on it
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// Errors reported by Home Assistant
    Api(ApiError),
    /// Errors from configuration or caller input
    Client(ClientError),
    /// A cast failed in one of its phases
    Cast(CastError),
    /// The state snapshot could not be fetched
    DirectoryUnavailable(Box<Error>),
    /// Error from http client
    Reqwest(reqwest::Error),
    /// Error processing json
    Json(serde_json::Error),
    #[doc(hidden)]
    Other(String),
}

impl Error {
    pub fn is_api(&self) -> bool {
        matches!(self, Error::Api(_))
    }

    pub fn is_client(&self) -> bool {
        matches!(self, Error::Client(_))
    }

    pub fn is_cast(&self) -> bool {
        matches!(self, Error::Cast(_))
    }

    pub fn is_reqwest(&self) -> bool {
        matches!(self, Error::Reqwest(_))
    }

    pub fn is_serde(&self) -> bool {
        matches!(self, Error::Json(_))
    }

    pub fn is_directory_unavailable(&self) -> bool {
        matches!(self, Error::DirectoryUnavailable(_))
    }

    /// Response body sent back by Home Assistant, if this error carries one
    pub fn detail(&self) -> Option<&Value> {
        match self {
            Self::Api(ApiError::Rejected { detail, .. }) => detail.as_ref(),
            Self::Cast(e) => e.detail(),
            Self::DirectoryUnavailable(e) => e.detail(),
            _ => None,
        }
    }

    pub fn missing_config(name: &'static str) -> Error {
        ClientError::MissingConfig(name).into()
    }

    pub fn missing_field(name: &'static str) -> Error {
        ClientError::MissingRequiredField(name).into()
    }

    pub fn invalid_pattern(pattern: String, error: regex::Error) -> Error {
        ClientError::InvalidFilterPattern(pattern, error).into()
    }

    pub fn directory_unavailable(source: Error) -> Error {
        Error::DirectoryUnavailable(Box::new(source))
    }
}

impl From<ApiError> for Error {
    fn from(e: ApiError) -> Self {
        Error::Api(e)
    }
}

impl From<ClientError> for Error {
    fn from(e: ClientError) -> Self {
        Error::Client(e)
    }
}

impl From<CastError> for Error {
    fn from(e: CastError) -> Self {
        Error::Cast(e)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Error {
        Error::Reqwest(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Error {
        Error::Json(e)
    }
}

impl From<String> for Error {
    fn from(e: String) -> Error {
        Error::Other(e)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Api(e) => write!(f, "{}", e),
            Self::Client(e) => write!(f, "{}", e),
            Self::Cast(e) => write!(f, "{}", e),
            Self::DirectoryUnavailable(e) => {
                write!(f, "Failed to fetch media players from Home Assistant: {}", e)
            }
            Self::Reqwest(e) => write!(f, "{}", e),
            Self::Json(e) => write!(f, "{}", e),
            Self::Other(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {}

/// Errors reported by Home Assistant
#[derive(Debug)]
pub enum ApiError {
    /// Bearer token was refused
    Unauthorized,
    /// Endpoint or entity does not exist
    NotFound(String),
    /// Any other non-success status, with the response body if there was one
    Rejected { status: u16, detail: Option<Value> },
}

impl Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "Home Assistant refused the access token"),
            Self::NotFound(path) => write!(f, "Not found: '{}'", path),
            Self::Rejected {
                status,
                detail: Some(detail),
            } => write!(f, "Request rejected with status {}: {}", status, detail),
            Self::Rejected {
                status,
                detail: None,
            } => write!(f, "Request rejected with status {}", status),
        }
    }
}

#[derive(Debug)]
pub enum ClientError {
    /// A required configuration value is absent or empty
    MissingConfig(&'static str),
    /// Base address could not be parsed as a URL
    InvalidBaseUrl(String),
    /// Filter pattern is not a valid regular expression
    InvalidFilterPattern(String, regex::Error),
    /// A required request field is absent or empty
    MissingRequiredField(&'static str),
}

impl Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self {
            Self::MissingConfig(name) => write!(f, "{} must be set", name),

            Self::InvalidBaseUrl(url) => write!(f, "Invalid Home Assistant url: '{}'", url),

            Self::InvalidFilterPattern(pattern, e) => {
                write!(f, "Invalid filter pattern '{}': {}", pattern, e)
            }

            Self::MissingRequiredField(name) => write!(f, "{} is required", name),
        }
    }
}

/// Phase specific failure of [`Caster::cast()`](crate::Caster::cast)
#[derive(Debug)]
pub enum CastError {
    /// The power on command could not be delivered or was refused
    PowerOnFailed {
        entity_id: String,
        source: Box<Error>,
    },
    /// The device never reported a usable state before the deadline
    ReadinessTimeout {
        entity_id: String,
        elapsed: Duration,
        last_state: Option<String>,
    },
    /// The device came up but the play command failed
    PlaybackFailed {
        entity_id: String,
        detail: Option<Value>,
        source: Box<Error>,
    },
}

impl CastError {
    /// Phase in which the cast failed
    pub fn phase(&self) -> Phase {
        match self {
            Self::PowerOnFailed { .. } => Phase::PoweringOn,
            Self::ReadinessTimeout { .. } => Phase::AwaitingReady,
            Self::PlaybackFailed { .. } => Phase::Playing,
        }
    }

    pub fn entity_id(&self) -> &str {
        match self {
            Self::PowerOnFailed { entity_id, .. }
            | Self::ReadinessTimeout { entity_id, .. }
            | Self::PlaybackFailed { entity_id, .. } => entity_id,
        }
    }

    /// Downstream detail for a rejected play command
    pub fn detail(&self) -> Option<&Value> {
        match self {
            Self::PlaybackFailed { detail, .. } => detail.as_ref(),
            Self::PowerOnFailed { source, .. } => source.detail(),
            Self::ReadinessTimeout { .. } => None,
        }
    }

    pub fn is_power_on_failed(&self) -> bool {
        matches!(self, Self::PowerOnFailed { .. })
    }

    pub fn is_readiness_timeout(&self) -> bool {
        matches!(self, Self::ReadinessTimeout { .. })
    }

    pub fn is_playback_failed(&self) -> bool {
        matches!(self, Self::PlaybackFailed { .. })
    }
}

impl Display for CastError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PowerOnFailed { entity_id, source } => {
                write!(f, "Failed to turn on {}: {}", entity_id, source)
            }
            Self::ReadinessTimeout {
                entity_id,
                elapsed,
                last_state,
            } => {
                write!(
                    f,
                    "Media player {} did not become ready within {:.1} seconds",
                    entity_id,
                    elapsed.as_secs_f32()
                )?;
                match last_state {
                    Some(state) => write!(f, " (last state: {})", state),
                    None => Ok(()),
                }
            }
            Self::PlaybackFailed {
                entity_id, source, ..
            } => write!(f, "Failed to play media on {}: {}", entity_id, source),
        }
    }
}

impl std::error::Error for CastError {}
