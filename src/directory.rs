use super::client::{Device, Downstream};
use super::constants::MEDIA_PLAYER_PREFIX;
use super::error::{Error, Result};

use regex::{Regex, RegexBuilder};
use serde::Serialize;

use std::fmt;

/// A case-insensitive regular expression tested against entity ids
///
/// Matching is a search, not a full match: `living` matches `media_player.living_room`.
#[derive(Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    pub fn new<S: AsRef<str>>(pattern: S) -> Result<Self> {
        let pattern = pattern.as_ref();
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(|regex| Self { regex })
            .map_err(|e| Error::invalid_pattern(pattern.into(), e))
    }

    pub fn is_match(&self, entity_id: &str) -> bool {
        self.regex.is_match(entity_id)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.as_str()).finish()
    }
}

/// A media player as listed to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaPlayer {
    pub entity_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
}

impl From<Device> for MediaPlayer {
    fn from(device: Device) -> Self {
        Self {
            entity_id: device.id().to_string(),
            friendly_name: device.display_name().map(String::from),
        }
    }
}

/// Lists the media players known to Home Assistant
///
/// Every call fetches a fresh snapshot. Nothing is cached and nothing is retried; a failed
/// fetch is reported as [`Error::DirectoryUnavailable`] and the caller may simply ask again.
#[derive(Debug, Clone)]
pub struct Directory<D> {
    downstream: D,
    include: Option<Pattern>,
}

impl<D: Downstream> Directory<D> {
    /// `include` is applied to every listing, on top of any per-call pattern
    pub fn new(downstream: D, include: Option<Pattern>) -> Self {
        Self {
            downstream,
            include,
        }
    }

    /// List media players, in the order Home Assistant reports them
    ///
    /// When `pattern` is given only entity ids matching it (and the configured include
    /// pattern, if any) are returned. No match is an empty list, not an error.
    pub async fn list_devices(&self, pattern: Option<&Pattern>) -> Result<Vec<MediaPlayer>> {
        let snapshot = self
            .downstream
            .states()
            .await
            .map_err(Error::directory_unavailable)?;

        let players: Vec<MediaPlayer> = snapshot
            .into_iter()
            .filter(|device| device.id().starts_with(MEDIA_PLAYER_PREFIX))
            .filter(|device| self.matches(pattern, device.id()))
            .map(MediaPlayer::from)
            .collect();

        log::debug!(target: "cast_proxy::directory", "Listing {} media players", players.len());
        Ok(players)
    }

    pub fn downstream(&self) -> &D {
        &self.downstream
    }

    fn matches(&self, pattern: Option<&Pattern>, entity_id: &str) -> bool {
        self.include
            .iter()
            .chain(pattern)
            .all(|p| p.is_match(entity_id))
    }
}
