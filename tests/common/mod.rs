//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{body::Bytes, extract::State, http::HeaderMap, http::StatusCode, http::Uri, Router};
use tokio::net::TcpListener;

use bakery_router::config::RouterConfig;
use bakery_router::lifecycle::ShutdownSignal;
use bakery_router::{HttpServer, Shutdown, VersionMapping};

/// A request as seen by a mock instance.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Recorded {
    pub path: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// A mock instance that records every request it receives.
#[derive(Clone)]
pub struct MockInstance {
    pub addr: SocketAddr,
    pub requests: Arc<Mutex<Vec<Recorded>>>,
}

#[allow(dead_code)]
impl MockInstance {
    pub fn received(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: &'static str,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

async fn record(State(state): State<MockState>, uri: Uri, headers: HeaderMap, body: Bytes) -> (StatusCode, &'static str) {
    state.requests.lock().unwrap().push(Recorded {
        path: uri.path().to_string(),
        headers,
        body,
    });
    (state.status, state.body)
}

/// Start a mock instance on an ephemeral port that answers every request
/// with `status` and `body`.
pub async fn start_mock_instance(status: u16, body: &'static str) -> MockInstance {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));

    let state = MockState {
        status: StatusCode::from_u16(status).unwrap(),
        body,
        requests: requests.clone(),
    };
    let app = Router::new().fallback(record).with_state(state);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockInstance { addr, requests }
}

/// A port with nothing listening on it.
#[allow(dead_code)]
pub async fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

/// Start the router over `mapping` on an ephemeral port.
pub async fn start_router(config: RouterConfig, mapping: VersionMapping) -> (SocketAddr, Shutdown) {
    let shutdown = Shutdown::new();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(config, mapping);
    let server_shutdown: ShutdownSignal = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
