//! HTTP surface for upload-driven callers
//!
//! The workbook is POSTed as the raw request body and the consolidated
//! dataset comes back as JSON or CSV. Outcomes are memoized per payload in a
//! [`ContentCache`] owned here, never by the engine.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use super::handlers;
use crate::cache::ContentCache;
use crate::config::EngineConfig;
use crate::core::Consolidator;
use crate::error::{ConsolidationError, ConsolidationResult};

/// Listener, limits and the engine configuration for one server process
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted upload in bytes
    pub max_upload_bytes: usize,
    /// Number of distinct uploads kept in the cache
    pub cache_capacity: usize,
    pub engine: EngineConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_upload_bytes: 50 * 1024 * 1024,
            cache_capacity: 32,
            engine: EngineConfig::default(),
        }
    }
}

impl ApiConfig {
    pub fn bind_addr(&self) -> ConsolidationResult<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| {
                ConsolidationError::Config(format!(
                    "Invalid listen address {}:{}: {}",
                    self.host, self.port, e
                ))
            })
    }
}

/// State shared by every handler
pub struct AppState {
    pub version: String,
    pub consolidator: Consolidator,
    pub cache: ContentCache,
}

impl AppState {
    pub fn new(config: &ApiConfig) -> ConsolidationResult<Self> {
        Ok(Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            consolidator: Consolidator::new(config.engine.clone())?,
            cache: ContentCache::new(config.cache_capacity),
        })
    }
}

/// Routes and layers; tests drive this directly without a listener
pub fn build_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        .route("/api/v1/consolidate", post(handlers::consolidate))
        .with_state(state)
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

pub async fn run_api_server(config: ApiConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "portfolio_server=info,portfolio_consolidator=info,tower_http=info".into()
            }),
        )
        .init();

    let addr = config.bind_addr()?;
    let state = Arc::new(AppState::new(&config)?);
    let app = build_router(state, config.max_upload_bytes);

    info!("📊 Portfolio API Server listening on http://{}", addr);
    info!(
        amc = %config.engine.amc_name,
        date = %config.engine.reporting_date,
        header_offset = config.engine.header_offset,
        cache_capacity = config.cache_capacity,
        "batch configuration"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Portfolio API Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown requested, draining connections");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_listen_locally() {
        let config = ApiConfig::default();
        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(config.cache_capacity, 32);
        assert_eq!(config.max_upload_bytes, 50 * 1024 * 1024);
    }

    #[test]
    fn test_bind_addr_rejects_bad_host() {
        let config = ApiConfig {
            host: "not a host".to_string(),
            ..ApiConfig::default()
        };
        assert!(matches!(
            config.bind_addr(),
            Err(ConsolidationError::Config(_))
        ));
    }

    #[test]
    fn test_state_starts_with_empty_cache() {
        let state = AppState::new(&ApiConfig::default()).unwrap();
        assert_eq!(state.version, env!("CARGO_PKG_VERSION"));
        assert!(state.cache.is_empty());
        assert_eq!(state.consolidator.config().header_offset, 3);
    }

    #[test]
    fn test_state_rejects_blank_fund_house() {
        let config = ApiConfig {
            engine: EngineConfig::default().with_amc_name("  "),
            ..ApiConfig::default()
        };
        assert!(AppState::new(&config).is_err());
    }
}
