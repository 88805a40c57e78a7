//! Startup orchestration.
//!
//! Order: metrics endpoint, HTTP server construction, listener bind, serve.
//! Any startup error is fatal.

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::validation::ValidationError;
use crate::config::AdapterConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

/// Fatal error while bringing the adapter up.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration rejected: {0}")]
    Config(#[from] ValidationError),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Start the adapter and block until it has shut down.
pub async fn run(config: AdapterConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let address = config.bind_address();
    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;

    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_watcher(&shutdown);

    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}
