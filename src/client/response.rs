use super::{ApiError, Device, Result};

use reqwest::StatusCode;
use serde_json::Value;

#[derive(Debug)]
pub struct Response {
    pub value: Value,
}

impl Response {
    pub fn states(self) -> Result<Vec<Device>> {
        Ok(serde_json::from_value(self.value)?)
    }

    pub fn device(self) -> Result<Device> {
        Ok(serde_json::from_value(self.value)?)
    }
}

pub(super) async fn process(res: reqwest::Response) -> Result<Response> {
    let status = res.status();
    let path = res.url().path().to_string();
    let body = res.text().await?;

    if status.is_success() {
        let value = if body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body)?
        };
        return Ok(Response { value });
    }

    log::debug!(target: "cast_proxy::client", "{} returned {}: {}", path, status, body);

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized,
        StatusCode::NOT_FOUND => ApiError::NotFound(path),
        status => ApiError::Rejected {
            status: status.as_u16(),
            detail: detail(body),
        },
    }
    .into())
}

/// Body of a failed call, kept verbatim. JSON bodies are passed through as values,
/// anything else as a string.
pub(super) fn detail(body: String) -> Option<Value> {
    if body.trim().is_empty() {
        None
    } else {
        Some(serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }
}

#[cfg(test)]
mod tests {
    use super::detail;

    use serde_json::{json, Value};

    #[test]
    fn detail_text() {
        assert_eq!(
            detail("unsupported codec".into()),
            Some(Value::String("unsupported codec".into()))
        );
    }

    #[test]
    fn detail_json() {
        assert_eq!(
            detail(r#"{"message": "Entity not found"}"#.into()),
            Some(json!({ "message": "Entity not found" }))
        );
    }

    #[test]
    fn detail_empty() {
        assert_eq!(detail(String::new()), None);
        assert_eq!(detail(" \n".into()), None);
    }
}
