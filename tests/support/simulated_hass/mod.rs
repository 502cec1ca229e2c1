use http::{Response, StatusCode};
use serde_json::{json, Value};
use warp::{filters::BoxedFilter, Filter, Reply};

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};

/// A request the simulated instance received
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    States,
    State(String),
    TurnOn(Value),
    PlayMedia(Value),
}

/// How a service call is answered
#[derive(Debug, Clone)]
pub enum Behavior {
    Accept,
    Reject(u16, String),
}

impl Behavior {
    fn respond(&self) -> Response<String> {
        match self {
            Self::Accept => json_response(StatusCode::OK, json!([])),
            Self::Reject(status, body) => Response::builder()
                .status(*status)
                .header("Content-Type", "text/plain")
                .body(body.clone())
                .unwrap(),
        }
    }
}

/// Simulated Home Assistant REST API which tests point the client at
///
/// `GET /api/states` serves the entity list. `GET /api/states/<id>` replays the entity's
/// script if it has one (the last entry repeats, `None` answers 404), otherwise the entity's
/// snapshot state.
#[derive(Debug, Clone)]
pub struct SimulatedHass {
    inner: Arc<SimulatedHassRef>,
}

impl SimulatedHass {
    pub fn new(token: &str) -> Self {
        Self {
            inner: Arc::new(SimulatedHassRef {
                token: token.to_string(),
                entities: RwLock::new(Vec::new()),
                scripts: RwLock::new(HashMap::new()),
                states_fail: RwLock::new(false),
                turn_on: RwLock::new(Behavior::Accept),
                play_media: RwLock::new(Behavior::Accept),
                calls: RwLock::new(Vec::new()),
            }),
        }
    }

    pub fn entity(self, entity_id: &str, friendly_name: Option<&str>, state: &str) -> Self {
        let mut attributes = json!({});
        if let Some(name) = friendly_name {
            attributes["friendly_name"] = json!(name);
        }
        self.inner.entities.write().unwrap().push(json!({
            "entity_id": entity_id,
            "state": state,
            "attributes": attributes,
            "last_changed": "2024-01-01T00:00:00+00:00",
            "last_updated": "2024-01-01T00:00:00+00:00"
        }));
        self
    }

    pub fn script(self, entity_id: &str, states: Vec<Option<&str>>) -> Self {
        self.inner.scripts.write().unwrap().insert(
            entity_id.to_string(),
            states.into_iter().map(|s| s.map(String::from)).collect(),
        );
        self
    }

    pub fn states_fail(self) -> Self {
        *self.inner.states_fail.write().unwrap() = true;
        self
    }

    pub fn turn_on(self, behavior: Behavior) -> Self {
        *self.inner.turn_on.write().unwrap() = behavior;
        self
    }

    pub fn play_media(self, behavior: Behavior) -> Self {
        *self.inner.play_media.write().unwrap() = behavior;
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.calls.read().unwrap().clone()
    }

    pub fn count(&self, f: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| f(c)).count()
    }

    /// Start the API server on a free port
    pub fn serve(&self) -> SocketAddr {
        let (addr, server) = warp::serve(self.api()).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        log::info!(target: "test::simulated_hass::serve", "Starting API server on {}", addr);
        addr
    }

    fn api(&self) -> BoxedFilter<(impl Reply,)> {
        self.states()
            .or(self.state())
            .unify()
            .or(self.service())
            .unify()
            .with(warp::log("test::simulated_hass::api"))
            .boxed()
    }

    fn record(&self, call: Call) {
        self.inner.calls.write().unwrap().push(call);
    }

    fn authorized(&self, header: &Option<String>) -> bool {
        header.as_deref() == Some(format!("Bearer {}", self.inner.token).as_str())
    }

    /// `GET /api/states`
    fn states(&self) -> BoxedFilter<(Response<String>,)> {
        warp::path!("api" / "states")
            .and(warp::get())
            .and(warp::header::optional::<String>("authorization"))
            .map({
                let hass = self.clone();
                move |auth: Option<String>| {
                    if !hass.authorized(&auth) {
                        return unauthorized();
                    }
                    hass.record(Call::States);
                    if *hass.inner.states_fail.read().unwrap() {
                        return text_response(StatusCode::INTERNAL_SERVER_ERROR, "500: Internal Server Error");
                    }
                    let entities = hass.inner.entities.read().unwrap().clone();
                    json_response(StatusCode::OK, Value::Array(entities))
                }
            })
            .boxed()
    }

    /// `GET /api/states/<entity_id>`
    fn state(&self) -> BoxedFilter<(Response<String>,)> {
        warp::path!("api" / "states" / String)
            .and(warp::get())
            .and(warp::header::optional::<String>("authorization"))
            .map({
                let hass = self.clone();
                move |entity_id: String, auth: Option<String>| {
                    if !hass.authorized(&auth) {
                        return unauthorized();
                    }
                    hass.record(Call::State(entity_id.clone()));

                    let scripted = hass
                        .inner
                        .scripts
                        .write()
                        .unwrap()
                        .get_mut(&entity_id)
                        .map(|script| {
                            if script.len() > 1 {
                                script.pop_front().flatten()
                            } else {
                                script.front().cloned().flatten()
                            }
                        });

                    let state = match scripted {
                        Some(state) => state,
                        None => hass
                            .inner
                            .entities
                            .read()
                            .unwrap()
                            .iter()
                            .find(|e| e["entity_id"] == entity_id.as_str())
                            .and_then(|e| e["state"].as_str().map(String::from)),
                    };

                    match state {
                        Some(state) => json_response(
                            StatusCode::OK,
                            json!({
                                "entity_id": entity_id,
                                "state": state,
                                "attributes": {}
                            }),
                        ),
                        None => json_response(
                            StatusCode::NOT_FOUND,
                            json!({ "message": "Entity not found." }),
                        ),
                    }
                }
            })
            .boxed()
    }

    /// `POST /api/services/<domain>/<service>`
    fn service(&self) -> BoxedFilter<(Response<String>,)> {
        warp::path!("api" / "services" / String / String)
            .and(warp::post())
            .and(warp::header::optional::<String>("authorization"))
            .and(warp::body::json())
            .map({
                let hass = self.clone();
                move |domain: String, service: String, auth: Option<String>, body: Value| {
                    if !hass.authorized(&auth) {
                        return unauthorized();
                    }
                    match (domain.as_str(), service.as_str()) {
                        ("homeassistant", "turn_on") => {
                            hass.record(Call::TurnOn(body));
                            hass.inner.turn_on.read().unwrap().respond()
                        }
                        ("media_player", "play_media") => {
                            hass.record(Call::PlayMedia(body));
                            hass.inner.play_media.read().unwrap().respond()
                        }
                        _ => text_response(StatusCode::BAD_REQUEST, "400: Bad Request"),
                    }
                }
            })
            .boxed()
    }
}

#[derive(Debug)]
struct SimulatedHassRef {
    token: String,
    entities: RwLock<Vec<Value>>,
    scripts: RwLock<HashMap<String, VecDeque<Option<String>>>>,
    states_fail: RwLock<bool>,
    turn_on: RwLock<Behavior>,
    play_media: RwLock<Behavior>,
    calls: RwLock<Vec<Call>>,
}

fn json_response(status: StatusCode, value: Value) -> Response<String> {
    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(value.to_string())
        .unwrap()
}

fn text_response(status: StatusCode, body: &str) -> Response<String> {
    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain")
        .body(body.to_string())
        .unwrap()
}

fn unauthorized() -> Response<String> {
    text_response(StatusCode::UNAUTHORIZED, "401: Unauthorized")
}
