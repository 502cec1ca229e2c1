use super::config::Config;
use super::error::{ApiError, ClientError, Result};

mod command;
mod device;
mod response;

pub use self::device::Device;

use self::command::{Command, CommandDetail};
use self::response::Response;

use async_trait::async_trait;
use reqwest::Url;

use std::future::Future;
use std::sync::Arc;

/// The operations the directory and the orchestrator need from Home Assistant
///
/// [`Client`] is the real implementation. Anything else implementing this trait can stand in
/// for Home Assistant, which is how the orchestrator is tested without a network.
#[async_trait]
pub trait Downstream: Send + Sync {
    /// Full state snapshot, in the order Home Assistant returned it
    async fn states(&self) -> Result<Vec<Device>>;

    /// Current state of one entity
    async fn state(&self, entity_id: &str) -> Result<Device>;

    /// Ask Home Assistant to turn the entity on. Returns once the call is accepted,
    /// not once the device is actually on.
    async fn turn_on(&self, entity_id: &str) -> Result<()>;

    async fn play_media(
        &self,
        entity_id: &str,
        media_content_id: &str,
        media_content_type: &str,
    ) -> Result<()>;
}

/// A Home Assistant REST API client
///
/// Cloning `Client` is cheap; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<ClientRef>,
}

impl Client {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            inner: Arc::new(ClientRef {
                base_url: config.base_url().clone(),
                token: config.token().to_string(),
                http: reqwest::Client::builder()
                    .timeout(config.request_timeout())
                    .build()?,
            }),
        })
    }

    /// Base address of the Home Assistant instance
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    pub(crate) fn token(&self) -> &str {
        &self.inner.token
    }

    /// Join an API path onto the base url, keeping any path prefix the base url has
    fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{}{}", base, endpoint))
            .map_err(|_| ClientError::InvalidBaseUrl(self.inner.base_url.to_string()).into())
    }

    fn send_command(&self, detail: CommandDetail) -> impl Future<Output = Result<Response>> {
        Command::new(self.clone(), detail).send()
    }
}

#[async_trait]
impl Downstream for Client {
    async fn states(&self) -> Result<Vec<Device>> {
        let res = self.send_command(CommandDetail::GetStates).await?;
        res.states()
    }

    async fn state(&self, entity_id: &str) -> Result<Device> {
        let res = self
            .send_command(CommandDetail::GetState(entity_id.into()))
            .await?;
        res.device()
    }

    async fn turn_on(&self, entity_id: &str) -> Result<()> {
        self.send_command(CommandDetail::TurnOn {
            entity_id: entity_id.into(),
        })
        .await?;
        Ok(())
    }

    async fn play_media(
        &self,
        entity_id: &str,
        media_content_id: &str,
        media_content_type: &str,
    ) -> Result<()> {
        self.send_command(CommandDetail::PlayMedia {
            entity_id: entity_id.into(),
            media_content_id: media_content_id.into(),
            media_content_type: media_content_type.into(),
        })
        .await?;
        Ok(())
    }
}

#[derive(Debug)]
struct ClientRef {
    base_url: Url,
    token: String,
    http: reqwest::Client,
}
