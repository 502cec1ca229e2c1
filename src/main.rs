use std::net::SocketAddr;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use cast_proxy::{server, Config, Proxy, ReadinessPolicy};

/// Cast proxy - power on Home Assistant media players and cast media to them
#[derive(Parser, Debug)]
#[command(name = "cast-proxy", version, about)]
struct Cli {
    /// Home Assistant base url, e.g. http://homeassistant.local:8123
    #[arg(long, env = "HOME_ASSISTANT_URL")]
    home_assistant_url: String,

    /// Home Assistant long-lived access token
    #[arg(long, env = "HOME_ASSISTANT_TOKEN", hide_env_values = true)]
    home_assistant_token: String,

    /// Only list media players whose entity id matches this regex (case-insensitive)
    #[arg(long, env = "MEDIA_PLAYER_INCLUDE_REGEX")]
    include_regex: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = cast_proxy::DEFAULT_PORT)]
    port: u16,

    /// Address to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: std::net::IpAddr,

    /// Milliseconds between state polls while waiting for a device
    #[arg(long, env = "CAST_POLL_INTERVAL_MS", default_value_t = cast_proxy::DEFAULT_POLL_INTERVAL_MS)]
    poll_interval_ms: u64,

    /// Seconds to wait for a device to become ready
    #[arg(long, env = "CAST_READY_TIMEOUT_SECS", default_value_t = cast_proxy::DEFAULT_READY_TIMEOUT_SECS)]
    ready_timeout_secs: u64,

    /// States that mean a device is not ready yet
    #[arg(
        long,
        env = "CAST_NOT_READY_STATES",
        value_delimiter = ',',
        default_value = "unavailable,off"
    )]
    not_ready_states: Vec<String>,

    /// Timeout for each Home Assistant request, in seconds
    #[arg(long, env = "HOME_ASSISTANT_TIMEOUT_SECS", default_value_t = cast_proxy::DEFAULT_TIMEOUT)]
    request_timeout_secs: u64,
}

impl Cli {
    fn config(&self) -> cast_proxy::Result<Config> {
        let readiness = ReadinessPolicy::new(
            Duration::from_millis(self.poll_interval_ms),
            Duration::from_secs(self.ready_timeout_secs),
        )
        .with_not_ready_states(
            self.not_ready_states
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty()),
        );

        let config = Config::new(&self.home_assistant_url, &self.home_assistant_token)?
            .with_readiness(readiness)
            .with_request_timeout(Duration::from_secs(self.request_timeout_secs));

        match self.include_regex.as_deref().filter(|p| !p.is_empty()) {
            Some(pattern) => config.with_include_pattern(pattern),
            None => Ok(config),
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    let cli = Cli::parse();

    let config = match cli.config() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let proxy = match Proxy::from_config(&config) {
        Ok(proxy) => proxy,
        Err(e) => {
            log::error!("Failed to create Home Assistant client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        log::info!("Shutting down");
    };

    let addr = SocketAddr::new(cli.host, cli.port);
    match server::bind(proxy, addr, shutdown) {
        Ok((addr, server)) => {
            log::info!("Proxy server listening at http://{}", addr);
            log::info!(
                "Forwarding to Home Assistant at {} (ready timeout {:?}, poll interval {:?})",
                config.base_url(),
                config.readiness().deadline(),
                config.readiness().interval()
            );
            server.await;
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
