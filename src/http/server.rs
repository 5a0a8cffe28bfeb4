//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with one handler per RPC endpoint plus `/healthz`
//! - Wire up middleware (request ID, tracing, timeout, body limit, compression)
//! - Resolve each request's version and forward it to the matching instance
//! - Serve until the shutdown signal fires

use axum::{
    body::Body,
    extract::State,
    http::{header, request::Parts, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RouterConfig;
use crate::http::error::RouteError;
use crate::http::forward::Forwarder;
use crate::http::request::{request_id, UuidRequestId};
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::routing::{resolve, DistroSigImageConfig, Endpoint, LatestSigImageConfig, NodeBootstrapData};
use crate::versions::{Version, VersionMapping};

/// Path of the liveness probe.
pub const HEALTHZ_PATH: &str = "/healthz";

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub mapping: Arc<VersionMapping>,
    pub forwarder: Forwarder,
}

/// HTTP front end that routes RPCs to version instances.
pub struct HttpServer {
    router: Router,
    config: RouterConfig,
}

impl HttpServer {
    /// Create a new HTTP server over a finished version mapping.
    pub fn new(config: RouterConfig, mapping: VersionMapping) -> Self {
        let state = AppState {
            mapping: Arc::new(mapping),
            forwarder: Forwarder::new(&config.timeouts),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RouterConfig, state: AppState) -> Router {
        Router::new()
            .route(NodeBootstrapData::PATH, post(rpc_handler::<NodeBootstrapData>))
            .route(LatestSigImageConfig::PATH, post(rpc_handler::<LatestSigImageConfig>))
            .route(DistroSigImageConfig::PATH, post(rpc_handler::<DistroSigImageConfig>))
            .route(HEALTHZ_PATH, get(healthz))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
                    .layer(CompressionLayer::new())
                    // Innermost: its timeout response needs a `Default` body.
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// The fully layered router, for serving on a custom listener.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("HTTP server draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }
}

/// Liveness probe. Does not touch any instance.
async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "ok",
    )
}

/// Shared handler for every RPC endpoint.
async fn rpc_handler<E: Endpoint>(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(&request);
    let (parts, body) = request.into_parts();

    let outcome = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => dispatch::<E>(&state, &parts, &bytes).await,
        Err(e) => Err(RouteError::Body(e)),
    };

    let (version_label, response) = match outcome {
        Ok((version, response)) => (version.to_string(), response),
        Err(e) => {
            let label = e.version_label();
            if e.status_code().is_server_error() {
                tracing::error!(request_id = %request_id, endpoint = E::NAME, error = %e, "Forward failed");
            } else {
                tracing::warn!(request_id = %request_id, endpoint = E::NAME, error = %e, "Request rejected");
            }
            (label, e.into_response())
        }
    };

    metrics::record_request(E::NAME, &version_label, response.status().as_u16(), start_time);
    response
}

/// Resolve, look up and forward one request.
async fn dispatch<E: Endpoint>(
    state: &AppState,
    parts: &Parts,
    body: &[u8],
) -> Result<(Version, Response), RouteError> {
    let resolved = resolve::<E::Payload>(body)?;
    let version = resolved.version;

    let base = state
        .mapping
        .base(&version)
        .ok_or_else(|| RouteError::VersionNotFound(version.clone()))?;

    // Re-encode: the payload may have been unwrapped from an envelope.
    let out = serde_json::to_vec(&resolved.payload).map_err(|source| RouteError::Encode {
        version: version.clone(),
        source,
    })?;

    tracing::debug!(
        endpoint = E::NAME,
        version = %version,
        base = %base,
        "Forwarding request"
    );

    let response = state
        .forwarder
        .forward(&version, base, &parts.uri, &parts.headers, out)
        .await?;
    Ok((version, response))
}
