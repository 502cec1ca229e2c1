mod docs;
mod handlers;

pub use self::docs::openapi;

use crate::cast::Caster;
use crate::client::{Client, Downstream};
use crate::config::Config;
use crate::directory::Directory;
use crate::error::{Error, Result};

use warp::{filters::BoxedFilter, Filter, Reply};

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

/// Largest accepted cast request body, in bytes
const MAX_BODY: u64 = 16 * 1024;

/// The directory and the orchestrator, sharing one Home Assistant connection
#[derive(Debug)]
pub struct Proxy<D> {
    directory: Directory<D>,
    caster: Caster<D>,
}

impl Proxy<Client> {
    /// Build a proxy talking to the Home Assistant instance described by `config`
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(Client::new(config)?, config))
    }
}

impl<D: Downstream + Clone> Proxy<D> {
    pub fn new(downstream: D, config: &Config) -> Self {
        Self {
            directory: Directory::new(downstream.clone(), config.include_pattern().cloned()),
            caster: Caster::new(downstream, config.readiness().clone()),
        }
    }
}

impl<D> Proxy<D> {
    pub fn directory(&self) -> &Directory<D> {
        &self.directory
    }

    pub fn caster(&self) -> &Caster<D> {
        &self.caster
    }
}

/// All routes, with JSON replies for rejections
pub fn routes<D>(proxy: Arc<Proxy<D>>) -> BoxedFilter<(impl Reply,)>
where
    D: Downstream + 'static,
{
    media_players(proxy.clone())
        .or(cast(proxy))
        .unify()
        .or(api_docs())
        .unify()
        .recover(handlers::handle_rejection)
        .unify()
        .with(warp::log("cast_proxy::server"))
        .boxed()
}

/// `GET /cast-proxy/media-players[?pattern=]`
fn media_players<D>(proxy: Arc<Proxy<D>>) -> BoxedFilter<(handlers::Reply,)>
where
    D: Downstream + 'static,
{
    warp::path!("cast-proxy" / "media-players")
        .and(warp::get())
        .and(warp::query::<handlers::PlayersQuery>())
        .and(with_proxy(proxy))
        .and_then(handlers::list_media_players::<D>)
        .boxed()
}

/// `POST /cast-proxy/cast`
fn cast<D>(proxy: Arc<Proxy<D>>) -> BoxedFilter<(handlers::Reply,)>
where
    D: Downstream + 'static,
{
    warp::path!("cast-proxy" / "cast")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY))
        .and(warp::body::json::<handlers::CastBody>())
        .and(with_proxy(proxy))
        .and_then(handlers::cast::<D>)
        .boxed()
}

/// `GET /api-docs`
fn api_docs() -> BoxedFilter<(handlers::Reply,)> {
    warp::path("api-docs")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(handlers::api_docs)
        .boxed()
}

fn with_proxy<D>(
    proxy: Arc<Proxy<D>>,
) -> impl Filter<Extract = (Arc<Proxy<D>>,), Error = std::convert::Infallible> + Clone
where
    D: Downstream + 'static,
{
    warp::any().map(move || proxy.clone())
}

/// Bind the proxy to `addr` and return the bound address with the server future
///
/// The server stops when `shutdown` resolves. Binding to port 0 picks a free port.
pub fn bind<D, F>(
    proxy: Proxy<D>,
    addr: SocketAddr,
    shutdown: F,
) -> Result<(SocketAddr, impl Future<Output = ()>)>
where
    D: Downstream + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    warp::serve(routes(Arc::new(proxy)))
        .try_bind_with_graceful_shutdown(addr, shutdown)
        .map_err(|e| Error::Other(format!("Failed to bind {}: {}", addr, e)))
}
