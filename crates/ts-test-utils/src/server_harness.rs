//! Test server harness for E2E testing
//!
//! Provides `TestTranslationServer` for spawning real Translation Service
//! instances in tests.

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;
use translation_service::auth::{HmacJwtValidator, TokenIntrospector, TokenValidator};
use translation_service::config::Config;
use translation_service::observability::metrics::init_metrics_recorder;
use translation_service::repositories::{InMemoryTranslationStore, TranslationStore};
use translation_service::routes::{self, AppState};
use translation_service::services::TranslationService;

/// HS256 secret used by servers spawned with [`TestTranslationServer::spawn`].
pub const TEST_JWT_SECRET: &str = "test-secret-0123456789abcdefghijklmnop";

/// Test harness for spawning the Translation Service in E2E tests.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_health_e2e() -> Result<(), anyhow::Error> {
///     let server = TestTranslationServer::spawn().await?;
///
///     let response = reqwest::get(format!("{}/actuator/health", server.url())).await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestTranslationServer {
    addr: SocketAddr,
    config: Config,
    translations: Arc<TranslationService>,
    _handle: JoinHandle<()>,
}

impl TestTranslationServer {
    /// Spawn a server with an in-memory store and HS256 validation using
    /// [`TEST_JWT_SECRET`].
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        let validator = Arc::new(HmacJwtValidator::new(TEST_JWT_SECRET.as_bytes(), 0));
        Self::spawn_with(validator, Arc::new(InMemoryTranslationStore::new())).await
    }

    /// Spawn a server with a custom token validator and store.
    ///
    /// The server will:
    /// - Bind to a random available port (127.0.0.1:0)
    /// - Start the HTTP server in the background
    pub async fn spawn_with(
        validator: Arc<dyn TokenValidator>,
        store: Arc<dyn TranslationStore>,
    ) -> Result<Self, anyhow::Error> {
        let vars = HashMap::from([
            ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
            ("JWT_SECRET".to_string(), TEST_JWT_SECRET.to_string()),
            ("JWT_LEEWAY_SECONDS".to_string(), "0".to_string()),
            ("REQUEST_TIMEOUT_SECONDS".to_string(), "5".to_string()),
        ]);

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let translations = Arc::new(TranslationService::new(store));
        let state = Arc::new(AppState {
            config: config.clone(),
            translations: translations.clone(),
            introspector: Arc::new(TokenIntrospector::new(validator)),
        });

        // Build routes using the service's real route builder
        let app = routes::build_routes(state, test_metrics_handle());

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        // Spawn server in background
        let handle = tokio::spawn(async move {
            let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
            if let Err(e) = axum::serve(listener, make_service).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            config,
            translations,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get reference to the server configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The service backing the server, for seeding and inspecting data.
    pub fn translations(&self) -> &TranslationService {
        &self.translations
    }
}

impl Drop for TestTranslationServer {
    fn drop(&mut self) {
        self._handle.abort();
    }
}

/// Global metrics handle for test servers
static TEST_METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics handle shared by every test server in the process.
///
/// The global recorder can be installed once per process. If another caller
/// already installed it, a standalone recorder is used instead.
pub fn test_metrics_handle() -> PrometheusHandle {
    TEST_METRICS_HANDLE
        .get_or_init(|| {
            init_metrics_recorder()
                .unwrap_or_else(|_| PrometheusBuilder::new().build_recorder().handle())
        })
        .clone()
}
