//! Listener setup and the serve loop.

use std::net::SocketAddr;

use axum::Router;
use dojang_store::SubmissionService;
use tokio::net::TcpListener;

use crate::error::{ApiError, Result};
use crate::routes::{router, AppState};

/// Dojang API server.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Creates a server around `service`.
    pub fn new(service: SubmissionService) -> Self {
        Self {
            state: AppState::new(service),
        }
    }

    /// The router this server runs.
    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// Binds a listener on `addr` (`host:port`).
    pub async fn bind(self, addr: &str) -> Result<BoundServer> {
        let listener = TcpListener::bind(addr).await.map_err(|source| ApiError::Bind {
            addr: addr.to_string(),
            source,
        })?;
        Ok(BoundServer {
            listener,
            router: self.router(),
        })
    }
}

/// A server with a bound listener, ready to serve.
pub struct BoundServer {
    listener: TcpListener,
    router: Router,
}

impl BoundServer {
    /// Address actually bound; useful with port 0.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().map_err(ApiError::Serve)
    }

    /// Serves until Ctrl-C.
    pub async fn serve(self) -> Result<()> {
        if let Ok(addr) = self.listener.local_addr() {
            tracing::info!(%addr, "Dojang API listening");
        }
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(ApiError::Serve)?;
        tracing::info!("Dojang API stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Cannot listen for Ctrl-C; serving until killed");
        std::future::pending::<()>().await;
    }
}
