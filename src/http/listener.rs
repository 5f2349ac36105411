//! The HTTP listener.

use std::convert::Infallible;
use std::future::Future;
use std::net::{SocketAddr, TcpListener as StdListener};
use std::sync::Arc;
use hyper::Server;
use hyper::service::{make_service_fn, service_fn};
use log::{error, info};
use crate::config::Config;
use crate::error::ExitError;
use super::LintService;


//------------ http_listener -------------------------------------------------

/// Returns a future for the HTTP server.
///
/// The listening socket is bound right away so that problems show up
/// before the runtime is started.
pub fn http_listener(
    service: Arc<LintService>,
    config: &Config,
) -> Result<impl Future<Output = ()>, ExitError> {
    let listener = bind_listener(config.socket_addr())?;
    Ok(serve(listener, service))
}

/// Binds a non-blocking listening socket to the given address.
pub fn bind_listener(addr: SocketAddr) -> Result<StdListener, ExitError> {
    let listener = match StdListener::bind(addr) {
        Ok(listener) => listener,
        Err(err) => {
            error!("Fatal: error listening on {}: {}", addr, err);
            return Err(ExitError::Generic);
        }
    };
    if let Err(err) = listener.set_nonblocking(true) {
        error!("Fatal: error switching {} to nonblocking: {}", addr, err);
        return Err(ExitError::Generic);
    }
    Ok(listener)
}

/// Serves requests arriving at `listener`.
///
/// The future will never resolve unless an error happens that breaks the
/// listener, in which case it will log an error and resolve.
pub async fn serve(listener: StdListener, service: Arc<LintService>) {
    let make_service = make_service_fn(|_conn| {
        let service = service.clone();
        async move {
            Ok::<_, Infallible>(service_fn(move |req| {
                let service = service.clone();
                async move {
                    Ok::<_, Infallible>(service.handle_request(req).await)
                }
            }))
        }
    });
    if let Ok(addr) = listener.local_addr() {
        info!("Listening for HTTP connections on {}.", addr);
    }
    let server = match Server::from_tcp(listener) {
        Ok(server) => server,
        Err(err) => {
            error!("Failed on HTTP listener: {}", err);
            return
        }
    };
    if let Err(err) = server.serve(make_service).await {
        error!("HTTP server error: {}", err);
    }
}
