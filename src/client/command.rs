use super::response::{self, Response};
use super::{Client, Result};

use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum RequestType {
    Get,
    Post,
}

#[derive(Debug)]
pub(super) enum CommandDetail {
    GetStates,
    GetState(String),
    TurnOn {
        entity_id: String,
    },
    PlayMedia {
        entity_id: String,
        media_content_id: String,
        media_content_type: String,
    },
}

impl CommandDetail {
    /// Get the endpoint of the command
    pub fn endpoint(&self) -> String {
        match self {
            Self::GetStates => "/api/states".into(),
            Self::GetState(entity_id) => format!("/api/states/{}", entity_id),
            Self::TurnOn { .. } => "/api/services/homeassistant/turn_on".into(),
            Self::PlayMedia { .. } => "/api/services/media_player/play_media".into(),
        }
    }

    /// Get the request type of the command
    pub fn request_type(&self) -> RequestType {
        match self {
            Self::GetStates | Self::GetState(_) => RequestType::Get,
            Self::TurnOn { .. } | Self::PlayMedia { .. } => RequestType::Post,
        }
    }

    /// Service call payload
    pub fn body(&self) -> Option<Value> {
        match self {
            Self::GetStates | Self::GetState(_) => None,
            Self::TurnOn { entity_id } => Some(json!({ "entity_id": entity_id })),
            Self::PlayMedia {
                entity_id,
                media_content_id,
                media_content_type,
            } => Some(json!({
                "entity_id": entity_id,
                "media_content_id": media_content_id,
                "media_content_type": media_content_type,
            })),
        }
    }
}

pub(super) struct Command {
    client: Client,
    detail: CommandDetail,
}

impl Command {
    pub fn new(client: Client, detail: CommandDetail) -> Self {
        Self { client, detail }
    }

    pub async fn send(self) -> Result<Response> {
        let url = self.client.endpoint_url(&self.detail.endpoint())?;
        log::debug!(target: "cast_proxy::client", "{:?} {}", self.detail.request_type(), url);

        let request = match self.detail.request_type() {
            RequestType::Get => self.client.http().get(url),
            RequestType::Post => {
                let body = self.detail.body().unwrap_or(Value::Null);
                self.client.http().post(url).json(&body)
            }
        };

        let res = request.bearer_auth(self.client.token()).send().await?;
        response::process(res).await
    }
}
