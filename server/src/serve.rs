//! Accept loop: one task per connection, capped by a semaphore, each
//! connection served by hyper over the router with a request timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use hyper::Request;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tower::Layer;
use tracing::{debug, info, warn};

use crate::AppState;
use crate::handlers::http::routes::Router;
use crate::tower_middle::TimeoutLayer;

#[derive(Debug, Clone, Copy)]
pub struct ConnectionLimits {
    pub max_connections: usize,
    pub request_timeout: Duration,
}

/// Serve until `shutdown` resolves. Connections already handed to a task
/// keep running; only the accept loop stops.
pub async fn serve<F>(
    listener: TcpListener,
    state: AppState,
    router: Arc<Router>,
    limits: ConnectionLimits,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()>,
{
    let connections = Arc::new(Semaphore::new(limits.max_connections));
    tokio::pin!(shutdown);

    loop {
        let (stream, peer) = tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                    continue;
                }
            },
        };

        // At the cap the accepted socket waits here for a free slot.
        let permit = tokio::select! {
            _ = &mut shutdown => break,
            permit = connections.clone().acquire_owned() => {
                permit.context("Connection limiter closed")?
            }
        };

        let router = router.clone();
        let state = state.clone();

        tokio::task::spawn(async move {
            let _permit = permit;

            let service = tower::service_fn(move |req: Request<Incoming>| {
                let router = router.clone();
                let state = state.clone();
                async move { router.handle(req, state).await }
            });
            let service =
                TowerToHyperService::new(TimeoutLayer::new(limits.request_timeout).layer(service));

            if let Err(err) = http1::Builder::new()
                .timer(TokioTimer::new())
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                debug!("Error serving connection from {}: {:?}", peer, err);
            }
        });
    }

    info!("Stopped accepting connections");
    Ok(())
}
