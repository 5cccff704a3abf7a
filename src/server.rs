//! Mock server life-cycle
//!
//! Each `MockServer` owns its own store and listens on its own port, so tests
//! running in parallel never see each other's bots or deals.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::application::handlers::api_routes;
use crate::application::services::fixture_loader::{FixtureLoader, IngestReport};
use crate::config::MockServerConfig;
use crate::domain::errors::MockResult;
use crate::persistence::InMemoryStore;

/// Build the full router: API routes under `api_prefix`, with request tracing.
pub fn build_router(store: Arc<InMemoryStore>, api_prefix: &str) -> Router {
    let routes = api_routes(store);
    let app = if api_prefix.is_empty() {
        routes
    } else {
        Router::new().nest(api_prefix, routes)
    };

    app.layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}

pub struct MockServer {
    addr: SocketAddr,
    api_prefix: String,
    store: Arc<InMemoryStore>,
    loader: FixtureLoader,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl MockServer {
    /// Start on an ephemeral localhost port with the default `/ver1` prefix.
    pub async fn start() -> MockResult<Self> {
        Self::start_with_config(MockServerConfig::default()).await
    }

    pub async fn start_with_config(config: MockServerConfig) -> MockResult<Self> {
        let api_prefix = MockServerConfig::normalize_prefix(&config.api_prefix);
        let store = Arc::new(InMemoryStore::new());
        let app = build_router(Arc::clone(&store), &api_prefix);

        let listener = TcpListener::bind(SocketAddr::new(config.host, config.port)).await?;
        let addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let shutdown_signal = async {
                // A dropped sender also means shut down
                let _ = shutdown_rx.await;
            };
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal)
                .await
            {
                error!("Mock server on {} stopped with error: {}", addr, e);
            }
        });

        info!("Mock server listening on http://{}{}", addr, api_prefix);

        Ok(Self {
            addr,
            api_prefix,
            loader: FixtureLoader::new(Arc::clone(&store)),
            store,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// `http://host:port`, without the API prefix
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Base URL including the API prefix, e.g. `http://127.0.0.1:53122/ver1`
    pub fn url(&self) -> String {
        format!("{}{}", self.base_url(), self.api_prefix)
    }

    /// State-management API shared with the request handlers
    pub fn state(&self) -> &Arc<InMemoryStore> {
        &self.store
    }

    pub async fn load_cassette(&self, path: impl AsRef<Path>) -> MockResult<IngestReport> {
        self.loader.load_cassette(path).await
    }

    pub async fn load_cassettes<P: AsRef<Path>>(&self, paths: &[P]) -> MockResult<IngestReport> {
        self.loader.load_cassettes(paths).await
    }

    /// Stop accepting connections and wait for in-flight requests to finish.
    pub async fn close(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Mock server task failed: {}", e);
            }
        }
        info!("Mock server on {} closed", self.addr);
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}
