#![allow(dead_code)]

mod simulated_hass;

pub use simulated_hass::{Behavior, Call, SimulatedHass};

use cast_proxy::{Client, Config, Proxy, ReadinessPolicy};

use tokio::time::{sleep, Sleep};

use std::future::Future;
use std::net::{SocketAddr, TcpListener};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

/// Interval used by tests that wait for a device
pub const POLL_INTERVAL: Duration = Duration::from_millis(20);
/// Deadline used by tests that wait for a device
pub const READY_DEADLINE: Duration = Duration::from_millis(400);

/// Starts the [`SimulatedHass`] then runs the test passed in. Panics after 10 seconds.
pub struct Test {
    test: Pin<Box<dyn Future<Output = ()>>>,
    timeout: Pin<Box<Sleep>>,
}

impl Test {
    pub async fn simulate<F, Fut: 'static>(hass: SimulatedHass, func: F)
    where
        F: FnOnce(Fixture) -> Fut,
        Fut: Future<Output = ()>,
    {
        init_logger();

        let addr = hass.serve();
        let fixture = Fixture {
            hass,
            base_url: format!("http://{}", addr),
            token: TOKEN.to_string(),
        };

        Test {
            test: Box::pin(func(fixture)),
            timeout: Box::pin(sleep(Duration::from_secs(10))),
        }
        .await
    }
}

impl Future for Test {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.timeout.as_mut().poll(cx).is_ready() {
            panic!("Test took too long");
        }

        self.test.as_mut().poll(cx)
    }
}

/// Token the simulated instance accepts
pub const TOKEN: &str = "test-token";

/// Everything a test needs to talk to a running [`SimulatedHass`]
pub struct Fixture {
    pub hass: SimulatedHass,
    pub base_url: String,
    pub token: String,
}

impl Fixture {
    /// Config with a short readiness policy
    pub fn config(&self) -> Config {
        Config::new(self.base_url.as_str(), self.token.as_str())
            .unwrap()
            .with_readiness(ReadinessPolicy::new(POLL_INTERVAL, READY_DEADLINE))
            .with_request_timeout(Duration::from_secs(2))
    }

    pub fn client(&self) -> Client {
        Client::new(&self.config()).unwrap()
    }

    pub fn proxy(&self) -> Proxy<Client> {
        Proxy::from_config(&self.config()).unwrap()
    }
}

pub fn init_logger() {
    if let Err(e) = pretty_env_logger::try_init() {
        log::warn!(target: "test::support::init_logger", "Logger init() returned '{}'", e);
    }
}

/// An address nothing is listening on
pub fn dead_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Config pointing at [`dead_addr()`]
pub fn unreachable_config() -> Config {
    Config::new(format!("http://{}", dead_addr()), TOKEN.to_string())
        .unwrap()
        .with_readiness(ReadinessPolicy::new(POLL_INTERVAL, READY_DEADLINE))
        .with_request_timeout(Duration::from_secs(2))
}

/// Random data helpers
pub mod rand_data {
    use rand::{distributions::Alphanumeric, Rng};

    pub fn string(len: usize) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .map(char::from)
            .take(len)
            .collect()
    }

    /// A random `media_player.*` entity id
    pub fn entity_id() -> String {
        format!("media_player.{}", string(12).to_lowercase())
    }
}
