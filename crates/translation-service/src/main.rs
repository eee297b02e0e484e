//! Translation Service
//!
//! Entry point for the translation entry API.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use translation_service::auth::{HmacJwtValidator, TokenIntrospector};
use translation_service::config::Config;
use translation_service::observability::metrics::init_metrics_recorder;
use translation_service::repositories::{
    ElasticsearchTranslationStore, InMemoryTranslationStore, TranslationStore,
};
use translation_service::routes::{self, AppState};
use translation_service::services::{seed_translations, TranslationService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "translation_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Translation Service");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        jwt_leeway_seconds = config.jwt_leeway_seconds,
        elasticsearch_index = %config.elasticsearch_index,
        request_timeout_seconds = config.request_timeout_seconds,
        "Configuration loaded successfully"
    );

    // Prometheus recorder must be installed before any metric is recorded
    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics recorder: {}", e);
        e
    })?;

    let store: Arc<dyn TranslationStore> = match &config.elasticsearch_url {
        Some(url) => {
            info!(url = %url, index = %config.elasticsearch_index, "Using Elasticsearch store");
            let store = ElasticsearchTranslationStore::new(
                url,
                &config.elasticsearch_index,
                Duration::from_secs(config.request_timeout_seconds),
            )?;
            store.ensure_index().await.map_err(|e| {
                error!("Failed to prepare search index: {}", e);
                e
            })?;
            Arc::new(store)
        }
        None => {
            warn!("ELASTICSEARCH_URL not set, using in-memory store");
            Arc::new(InMemoryTranslationStore::new())
        }
    };

    let translations = Arc::new(TranslationService::new(store));

    if config.seed_translations > 0 {
        info!(count = config.seed_translations, "Seeding synthetic translations");
        seed_translations(&translations, config.seed_translations)
            .await
            .map_err(|e| {
                error!("Failed to seed translations: {}", e);
                e
            })?;
    }

    let validator = Arc::new(HmacJwtValidator::new(
        config.jwt_secret.as_bytes(),
        config.jwt_leeway_seconds,
    ));
    let introspector = Arc::new(TokenIntrospector::new(validator));

    // Parse bind address before moving config
    let bind_address = config.bind_address.clone();

    let state = Arc::new(AppState {
        config,
        translations,
        introspector,
    });

    let app = routes::build_routes(state, metrics_handle);

    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Translation Service listening on {}", addr);

    // Start server with graceful shutdown support
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Translation Service shutdown complete");

    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
/// Returns when a shutdown signal is received and drain period is complete.
async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    let drain_secs: u64 = std::env::var("TS_DRAIN_SECONDS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(30);

    if drain_secs > 0 {
        warn!("Draining connections for {} seconds...", drain_secs);
        tokio::time::sleep(Duration::from_secs(drain_secs)).await;
        info!("Drain period complete");
    } else {
        info!("Skipping drain period (TS_DRAIN_SECONDS=0)");
    }
}
