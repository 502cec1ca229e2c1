use super::client::Downstream;
use super::constants::DEFAULT_MEDIA_CONTENT_TYPE;
use super::error::{CastError, Error, Result};

mod readiness;

pub use self::readiness::{wait_until_ready, Readiness, ReadinessPolicy};

use std::fmt::{self, Display};

/// Step of a cast, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    PoweringOn,
    AwaitingReady,
    Playing,
    Succeeded,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PoweringOn => "powering_on",
            Self::AwaitingReady => "awaiting_ready",
            Self::Playing => "playing",
            Self::Succeeded => "succeeded",
        }
    }
}

impl Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What to play and where
#[derive(Debug, Clone, PartialEq)]
pub struct CastRequest {
    entity_id: String,
    media_url: String,
    media_content_type: String,
}

impl CastRequest {
    /// Build a request with the default media content type (`video`).
    ///
    /// Both values are required; an empty string counts as missing.
    pub fn new<S: Into<String>>(entity_id: S, media_url: S) -> Result<Self> {
        let entity_id = entity_id.into();
        let media_url = media_url.into();

        if entity_id.is_empty() {
            return Err(Error::missing_field("entity_id"));
        }
        if media_url.is_empty() {
            return Err(Error::missing_field("media_url"));
        }

        Ok(Self {
            entity_id,
            media_url,
            media_content_type: DEFAULT_MEDIA_CONTENT_TYPE.into(),
        })
    }

    /// Content type passed to Home Assistant, e.g. `video`, `music` or `image/jpeg`
    pub fn with_media_content_type<S: Into<String>>(mut self, media_content_type: S) -> Self {
        let media_content_type = media_content_type.into();
        if !media_content_type.is_empty() {
            self.media_content_type = media_content_type;
        }
        self
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn media_url(&self) -> &str {
        &self.media_url
    }

    pub fn media_content_type(&self) -> &str {
        &self.media_content_type
    }
}

/// Result of a successful cast
#[derive(Debug, Clone, PartialEq)]
pub struct CastReceipt {
    pub entity_id: String,
    /// State the device reported when it was found ready
    pub ready_state: String,
}

impl CastReceipt {
    pub fn message(&self) -> String {
        format!("Cast command sent successfully to {}", self.entity_id)
    }
}

/// Turns devices on, waits for them and starts playback
///
/// A cast runs three phases in order: power on, wait until ready, play. Each phase fails
/// with its own [`CastError`] variant so callers can tell an unreachable device from a slow
/// one from one that refused the media. Readiness is observed fresh on every call.
///
/// Concurrent casts to the *same* device are not serialized. Each runs its own poll loop
/// against the same entity, and one cast can undo what the other waits for (for example a
/// second caller turning the device off). Callers that need exclusivity must provide it.
#[derive(Debug, Clone)]
pub struct Caster<D> {
    downstream: D,
    policy: ReadinessPolicy,
}

impl<D: Downstream> Caster<D> {
    pub fn new(downstream: D, policy: ReadinessPolicy) -> Self {
        Self { downstream, policy }
    }

    pub fn policy(&self) -> &ReadinessPolicy {
        &self.policy
    }

    pub fn downstream(&self) -> &D {
        &self.downstream
    }

    /// Cast `request` to its device
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use cast_proxy::{CastRequest, Caster, Client, Config};
    /// # async fn cast() -> Result<(), cast_proxy::Error> {
    /// let config = Config::new("http://homeassistant.local:8123", "long-lived-token")?;
    /// let caster = Caster::new(Client::new(&config)?, config.readiness().clone());
    ///
    /// let request = CastRequest::new("media_player.living_room", "http://example.com/movie.mp4")?;
    /// let receipt = caster.cast(&request).await?;
    /// println!("{}", receipt.message());
    /// // > "Cast command sent successfully to media_player.living_room"
    /// # Ok(())
    /// # }
    /// ```
    pub async fn cast(&self, request: &CastRequest) -> std::result::Result<CastReceipt, CastError> {
        let entity_id = request.entity_id();

        log::info!(target: "cast_proxy::cast", "[{}] Turning on {}...", Phase::PoweringOn, entity_id);
        if let Err(e) = self.downstream.turn_on(entity_id).await {
            log::error!(target: "cast_proxy::cast", "Failed to turn on {}: {}", entity_id, e);
            return Err(CastError::PowerOnFailed {
                entity_id: entity_id.into(),
                source: Box::new(e),
            });
        }

        log::info!(
            target: "cast_proxy::cast",
            "[{}] Waiting for media player {} to become ready...",
            Phase::AwaitingReady,
            entity_id
        );
        let ready_state = match wait_until_ready(&self.downstream, entity_id, &self.policy).await {
            Readiness::Ready(state) => state,
            Readiness::TimedOut {
                elapsed,
                last_state,
            } => {
                let e = CastError::ReadinessTimeout {
                    entity_id: entity_id.into(),
                    elapsed,
                    last_state,
                };
                log::error!(target: "cast_proxy::cast", "{}", e);
                return Err(e);
            }
        };

        log::info!(
            target: "cast_proxy::cast",
            "[{}] Casting {} to {}...",
            Phase::Playing,
            request.media_url(),
            entity_id
        );
        if let Err(e) = self
            .downstream
            .play_media(entity_id, request.media_url(), request.media_content_type())
            .await
        {
            log::error!(target: "cast_proxy::cast", "Failed to play media on {}: {}", entity_id, e);
            return Err(CastError::PlaybackFailed {
                entity_id: entity_id.into(),
                detail: e.detail().cloned(),
                source: Box::new(e),
            });
        }

        let receipt = CastReceipt {
            entity_id: entity_id.into(),
            ready_state,
        };
        log::info!(target: "cast_proxy::cast", "[{}] {}", Phase::Succeeded, receipt.message());
        Ok(receipt)
    }
}
