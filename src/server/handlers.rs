use super::Proxy;
use crate::cast::CastRequest;
use crate::client::Downstream;
use crate::directory::Pattern;
use crate::error::{CastError, Error};

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use warp::reply::{self, Json, WithStatus};
use warp::Rejection;

use std::convert::Infallible;
use std::sync::Arc;

pub(super) const MISSING_FIELDS: &str = "entity_id and media_url are required.";
const DIRECTORY_FAILED: &str = "Failed to fetch media players from Home Assistant.";
const NO_RESPONSE: &str = "No response from Home Assistant";

pub(super) type Reply = WithStatus<Json>;

/// Body of every non-200 reply
#[derive(Debug, Serialize)]
pub(super) struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    phase: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl ErrorBody {
    pub fn new<S: Into<String>>(error: S) -> Self {
        Self {
            error: error.into(),
            phase: None,
            details: None,
        }
    }

    pub fn reply(&self, status: StatusCode) -> Reply {
        reply::with_status(reply::json(self), status)
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct PlayersQuery {
    pattern: Option<String>,
}

/// Fields are optional so that a missing one is reported as such, not as a parse error
#[derive(Debug, Deserialize)]
pub(super) struct CastBody {
    entity_id: Option<String>,
    media_url: Option<String>,
    media_content_type: Option<String>,
}

impl CastBody {
    fn into_request(self) -> crate::Result<CastRequest> {
        let entity_id = self.entity_id.unwrap_or_default();
        let media_url = self.media_url.unwrap_or_default();
        let request = CastRequest::new(entity_id, media_url)?;

        Ok(match self.media_content_type {
            Some(kind) => request.with_media_content_type(kind),
            None => request,
        })
    }
}

/// `GET /cast-proxy/media-players`
pub(super) async fn list_media_players<D: Downstream>(
    query: PlayersQuery,
    proxy: Arc<Proxy<D>>,
) -> Result<Reply, Infallible> {
    let pattern = match query
        .pattern
        .filter(|p| !p.is_empty())
        .map(Pattern::new)
        .transpose()
    {
        Ok(pattern) => pattern,
        Err(e) => {
            log::warn!(target: "cast_proxy::server", "{}", e);
            return Ok(ErrorBody::new(e.to_string()).reply(StatusCode::BAD_REQUEST));
        }
    };

    match proxy.directory().list_devices(pattern.as_ref()).await {
        Ok(players) => Ok(reply::with_status(reply::json(&players), StatusCode::OK)),
        Err(e) => {
            log::error!(target: "cast_proxy::server", "Error fetching media players: {}", e);
            Ok(ErrorBody::new(DIRECTORY_FAILED).reply(StatusCode::INTERNAL_SERVER_ERROR))
        }
    }
}

/// `POST /cast-proxy/cast`
pub(super) async fn cast<D: Downstream>(
    body: CastBody,
    proxy: Arc<Proxy<D>>,
) -> Result<Reply, Infallible> {
    let request = match body.into_request() {
        Ok(request) => request,
        Err(e) => {
            log::warn!(target: "cast_proxy::server", "Rejected cast request: {}", e);
            return Ok(ErrorBody::new(MISSING_FIELDS).reply(StatusCode::BAD_REQUEST));
        }
    };

    match proxy.caster().cast(&request).await {
        Ok(receipt) => Ok(reply::with_status(
            reply::json(&json!({ "message": receipt.message() })),
            StatusCode::OK,
        )),
        Err(e) => Ok(cast_failure(&e).reply(StatusCode::INTERNAL_SERVER_ERROR)),
    }
}

/// `GET /api-docs`
pub(super) async fn api_docs() -> Result<Reply, Infallible> {
    Ok(reply::with_status(
        reply::json(&super::docs::openapi()),
        StatusCode::OK,
    ))
}

fn cast_failure(e: &CastError) -> ErrorBody {
    let (error, details) = match e {
        CastError::PowerOnFailed { entity_id, source } => (
            format!("Failed to turn on {}.", entity_id),
            Some(failure_details(source)),
        ),
        CastError::ReadinessTimeout { .. } => (e.to_string(), None),
        CastError::PlaybackFailed {
            entity_id,
            detail,
            source,
        } => (
            format!("Failed to play media on {}.", entity_id),
            Some(detail.clone().unwrap_or_else(|| failure_details(source))),
        ),
    };

    ErrorBody {
        error,
        phase: Some(e.phase().as_str()),
        details,
    }
}

/// What Home Assistant said, or a note that it said nothing
fn failure_details(source: &Error) -> Value {
    match source.detail() {
        Some(detail) => detail.clone(),
        None if source.is_api() => Value::String(source.to_string()),
        None => Value::String(NO_RESPONSE.into()),
    }
}

/// Turn warp's own rejections into JSON replies
pub(super) async fn handle_rejection(err: Rejection) -> Result<Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Not found")
    } else if err
        .find::<warp::filters::body::BodyDeserializeError>()
        .is_some()
        || err.find::<warp::reject::UnsupportedMediaType>().is_some()
        || err.find::<warp::reject::LengthRequired>().is_some()
    {
        (StatusCode::BAD_REQUEST, MISSING_FIELDS)
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large.")
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid query string.")
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
    } else {
        log::error!(target: "cast_proxy::server", "Unhandled rejection: {:?}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    };

    Ok(ErrorBody::new(message).reply(status))
}
