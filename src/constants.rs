/// Per-request timeout for Home Assistant calls, in seconds
pub const DEFAULT_TIMEOUT: u64 = 10;

/// Entity id prefix of the media player domain
pub const MEDIA_PLAYER_PREFIX: &str = "media_player.";

pub const DEFAULT_MEDIA_CONTENT_TYPE: &str = "video";

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_READY_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_NOT_READY_STATES: [&str; 2] = ["unavailable", "off"];

pub const DEFAULT_PORT: u16 = 3000;
