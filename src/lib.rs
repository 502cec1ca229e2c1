//! Power on a Home Assistant media player, wait until it is ready and cast media to it.
//!
//! The crate has two independent parts built on the [`Downstream`] trait:
//!
//! * [`Directory`] lists the `media_player.*` entities Home Assistant knows about.
//! * [`Caster`] runs a cast: turn the device on, poll it until it reports a usable state,
//!   then send the play command. Each step fails with its own [`CastError`] variant.
//!
//! [`server`] puts both behind a small HTTP API.

mod cast;
mod client;
mod config;
mod constants;
mod directory;
mod error;
pub mod server;

pub use cast::{wait_until_ready, CastReceipt, CastRequest, Caster, Phase, Readiness, ReadinessPolicy};
pub use client::{Client, Device, Downstream};
pub use config::Config;
pub use constants::{
    DEFAULT_MEDIA_CONTENT_TYPE, DEFAULT_NOT_READY_STATES, DEFAULT_POLL_INTERVAL_MS, DEFAULT_PORT,
    DEFAULT_READY_TIMEOUT_SECS, DEFAULT_TIMEOUT, MEDIA_PLAYER_PREFIX,
};
pub use directory::{Directory, MediaPlayer, Pattern};
pub use error::{ApiError, CastError, ClientError, Error, Result};
pub use server::Proxy;
