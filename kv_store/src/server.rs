use std::{future::Future, net::SocketAddr, sync::Arc};

use bytes::Bytes;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use warp::{
    http::StatusCode,
    reply::{self, Reply, Response},
    Filter, Rejection,
};

use crate::{KvStore, StoreError, StoreResult};

/// Body of a successful `POST /evict`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvictResponse {
    pub removed: usize,
}

impl StoreError {
    fn status(&self) -> StatusCode {
        match self {
            StoreError::InvalidPattern(_) | StoreError::NonUtf8Pattern | StoreError::InvalidKey(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

fn error_reply(err: StoreError) -> Response {
    warn!("store request failed: {err}");
    let status = err.status();
    reply::with_status(err.to_string(), status).into_response()
}

fn handle_put<S: KvStore>(key: String, body: Bytes, store: Arc<S>) -> Response {
    debug!("PUT {key} ({} bytes)", body.len());
    match store.put(&key, body) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => error_reply(e),
    }
}

fn handle_get<S: KvStore>(key: String, store: Arc<S>) -> Response {
    debug!("GET {key}");
    match store.get(&key) {
        Ok(Some(value)) => Response::new(value.into()),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => error_reply(e),
    }
}

fn handle_delete<S: KvStore>(key: String, store: Arc<S>) -> Response {
    debug!("DELETE {key}");
    match store.remove(&key) {
        Ok(true) => StatusCode::OK.into_response(),
        Ok(false) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => error_reply(e),
    }
}

fn handle_evict<S: KvStore>(body: Bytes, store: Arc<S>) -> Response {
    let pattern = match std::str::from_utf8(&body) {
        Ok(pattern) => pattern,
        Err(_) => return error_reply(StoreError::NonUtf8Pattern),
    };
    match store.remove_by_regex(pattern) {
        Ok(removed) => {
            if removed > 0 {
                info!("evicted {removed} keys matching {pattern:?}");
            }
            reply::json(&EvictResponse { removed }).into_response()
        }
        Err(e) => error_reply(e),
    }
}

/// All store routes over a shared store
pub fn routes<S: KvStore + 'static>(
    store: Arc<S>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let with_store = warp::any().map(move || store.clone());

    let ready_time = chrono::offset::Utc::now();
    let ready = warp::get().and(warp::path!("ready")).map(move || {
        debug!("Received ready request.");
        reply::with_status(format!("Ready since {:?}", ready_time), StatusCode::OK)
    });

    let put = warp::put()
        .and(warp::path!("kv" / String))
        .and(warp::body::bytes())
        .and(with_store.clone())
        .map(handle_put::<S>);
    let get = warp::get()
        .and(warp::path!("kv" / String))
        .and(with_store.clone())
        .map(handle_get::<S>);
    let delete = warp::delete()
        .and(warp::path!("kv" / String))
        .and(with_store.clone())
        .map(handle_delete::<S>);
    let evict = warp::post()
        .and(warp::path!("evict"))
        .and(warp::body::bytes())
        .and(with_store)
        .map(handle_evict::<S>);

    ready.or(put).or(get).or(delete).or(evict)
}

/// Bind the store routes to `addr`.
///
/// Returns the bound address (useful with port 0) and the future that serves requests until
/// `shutdown` resolves.
pub fn bind<S, F>(
    store: Arc<S>,
    addr: SocketAddr,
    shutdown: F,
) -> StoreResult<(SocketAddr, impl Future<Output = ()> + Send + 'static)>
where
    S: KvStore + 'static,
    F: Future<Output = ()> + Send + 'static,
{
    let (bound, server) =
        warp::serve(routes(store)).try_bind_with_graceful_shutdown(addr, shutdown)?;
    info!("store server listening on {bound}");
    Ok((bound, server))
}
