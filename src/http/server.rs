//! HTTP server setup and the adapter handler.
//!
//! # Responsibilities
//! - Create the Axum router (every path, every method goes to one handler)
//! - Wire up middleware (request ID, tracing, timeout)
//! - Translate, bound concurrency, forward, stream back
//! - Serve until the shutdown signal fires

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use futures_util::StreamExt;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, OwnedSemaphorePermit, Semaphore};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::validation::ValidationError;
use crate::config::AdapterConfig;
use crate::http::proxy::Forwarder;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::http::response::ForwardError;
use crate::imaginary::Translator;
use crate::observability::metrics;

/// Application state injected into handlers.
///
/// Everything here is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub translator: Arc<Translator>,
    pub forwarder: Forwarder,
    pub limiter: Arc<Semaphore>,
}

/// HTTP server for the adapter.
pub struct HttpServer {
    router: Router,
    config: AdapterConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails when the imaginary host cannot be parsed.
    pub fn new(config: AdapterConfig) -> Result<Self, ValidationError> {
        let translator = Arc::new(Translator::from_config(&config.imaginary)?);
        let forwarder = Forwarder::new(&config.timeouts);
        let limiter = Arc::new(Semaphore::new(config.listener.max_concurrent_requests));

        let state = AppState {
            translator,
            forwarder,
            limiter,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AdapterConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            imaginary_host = %self.config.imaginary.host,
            file_path_prefix = %self.config.imaginary.file_path_prefix,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }
}

/// Main adapter handler.
/// Translates the request, forwards it to imaginary and streams the answer.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let (parts, _body) = request.into_parts();
    let request_id = parts.headers.request_id().to_string();

    let params = match state.translator.translate(&parts.uri) {
        Ok(params) => params,
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                client = %addr,
                request_url = %parts.uri,
                error = %e,
                "Invalid request"
            );
            metrics::record_request("rejected", e.code(), start_time);
            return e.into_response();
        }
    };

    let permit = match state.limiter.clone().try_acquire_owned() {
        Ok(permit) => permit,
        Err(_) => {
            tracing::warn!(request_id = %request_id, "Concurrency limit reached");
            let e = ForwardError::Overloaded;
            metrics::record_request("overloaded", e.status().as_u16(), start_time);
            return e.into_response();
        }
    };

    let url = params.build_url();
    tracing::debug!(
        request_id = %request_id,
        method = %params.method(),
        file = %params.file(),
        backend_url = %url,
        "Forwarding to imaginary"
    );

    match state.forwarder.forward(&url, &parts.headers).await {
        Ok(response) => {
            let status = response.status();
            tracing::debug!(request_id = %request_id, status = %status, "Imaginary responded");
            metrics::record_request("proxied", status.as_u16(), start_time);
            hold_until_streamed(response, permit)
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                backend_url = %url,
                error = %e,
                "Error on getting image from imaginary"
            );
            metrics::record_request("backend_error", e.status().as_u16(), start_time);
            e.into_response()
        }
    }
}

/// Keep the concurrency permit alive until the body finishes or is dropped.
fn hold_until_streamed(response: Response<Body>, permit: OwnedSemaphorePermit) -> Response {
    let (parts, body) = response.into_parts();
    let stream = body.into_data_stream().map(move |chunk| {
        let _permit = &permit;
        if let Err(e) = &chunk {
            tracing::error!(error = %e, "Error on write response");
        }
        chunk
    });
    Response::from_parts(parts, Body::from_stream(stream))
}
