use serde_json::{json, Value};

/// OpenAPI description of the routes served by [`routes()`](super::routes)
pub fn openapi() -> Value {
    let error = json!({
        "type": "object",
        "properties": {
            "error": { "type": "string" },
            "phase": {
                "type": "string",
                "enum": ["powering_on", "awaiting_ready", "playing"]
            },
            "details": {}
        },
        "required": ["error"]
    });

    let media_players = json!({
        "get": {
            "summary": "List media players known to Home Assistant",
            "parameters": [{
                "name": "pattern",
                "in": "query",
                "required": false,
                "description": "Case-insensitive regular expression matched against entity ids",
                "schema": { "type": "string" }
            }],
            "responses": {
                "200": { "description": "Media players", "content": json_schema(player_list()) },
                "400": { "description": "Invalid pattern", "content": json_schema(error.clone()) },
                "500": {
                    "description": "Home Assistant could not be queried",
                    "content": json_schema(error.clone())
                }
            }
        }
    });

    let cast_body = json!({
        "type": "object",
        "properties": {
            "entity_id": { "type": "string" },
            "media_url": { "type": "string" },
            "media_content_type": { "type": "string", "default": "video" }
        },
        "required": ["entity_id", "media_url"]
    });

    let cast = json!({
        "post": {
            "summary": "Turn a media player on, wait until it is ready and play media on it",
            "requestBody": { "required": true, "content": json_schema(cast_body) },
            "responses": {
                "200": {
                    "description": "Playback started",
                    "content": json_schema(json!({
                        "type": "object",
                        "properties": { "message": { "type": "string" } }
                    }))
                },
                "400": {
                    "description": "entity_id or media_url missing",
                    "content": json_schema(error.clone())
                },
                "500": {
                    "description": "The cast failed; `phase` tells which step",
                    "content": json_schema(error)
                }
            }
        }
    });

    json!({
        "openapi": "3.0.0",
        "info": {
            "title": "Cast Proxy",
            "version": env!("CARGO_PKG_VERSION"),
            "description": env!("CARGO_PKG_DESCRIPTION")
        },
        "paths": {
            "/cast-proxy/media-players": media_players,
            "/cast-proxy/cast": cast
        }
    })
}

fn player_list() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "entity_id": { "type": "string" },
                "friendly_name": { "type": "string" }
            },
            "required": ["entity_id"]
        }
    })
}

fn json_schema(schema: Value) -> Value {
    json!({ "application/json": { "schema": schema } })
}
