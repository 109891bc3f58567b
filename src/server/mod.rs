//! HTTP façade over the coupon sources
//!
//! ```text
//! GET /craw/genshin            Genshin Impact
//! GET /craw/honkai-star-rail   Honkai Star Rail
//! GET /craw/blox-fruits        Blox Fruits
//! GET /craw/play-together      Play Together
//! GET /craw/fc-mobile          FC Mobile
//! GET /craw/health             liveness
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use coupon_scraper::{config::Config, server::ScraperServer, sources::SourceRegistry};
//!
//! let config = Config::default();
//! let registry = SourceRegistry::from_config(&config)?;
//! ScraperServer::new(&config, registry)?.start().await?;
//! ```

pub mod api;
pub mod health;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::sources::SourceRegistry;

pub use api::create_router;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Adapters by source
    pub registry: Arc<SourceRegistry>,
}

impl AppState {
    pub fn new(registry: SourceRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}

/// Server errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to bind: {0}")]
    BindError(String),

    #[error("Server error: {0}")]
    ServeError(String),
}

/// The coupon API server
pub struct ScraperServer {
    bind_address: SocketAddr,
    enable_cors: bool,
    enable_request_logging: bool,
    state: AppState,
}

impl ScraperServer {
    pub fn new(config: &Config, registry: SourceRegistry) -> Result<Self, ServerError> {
        let bind_address = config
            .bind_address()
            .map_err(|e| ServerError::ConfigError(e.to_string()))?;

        Ok(Self {
            bind_address,
            enable_cors: config.server.enable_cors,
            enable_request_logging: config.server.enable_request_logging,
            state: AppState::new(registry),
        })
    }

    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    pub fn bind_address(&self) -> SocketAddr {
        self.bind_address
    }

    /// Build the router with all routes and layers
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone());

        if self.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        if self.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Serve until the process is stopped
    pub async fn start(&self) -> Result<(), ServerError> {
        self.start_with_shutdown(std::future::pending::<()>()).await
    }

    /// Serve until `shutdown_signal` resolves, then drain in-flight requests
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let router = self.build_router();

        let listener = tokio::net::TcpListener::bind(self.bind_address)
            .await
            .map_err(|e| ServerError::BindError(e.to_string()))?;

        tracing::info!(
            address = %self.bind_address,
            sources = self.state.registry.len(),
            "Coupon API listening"
        );

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::ServeError(e.to_string()))?;

        tracing::info!("Coupon API shutdown complete");
        Ok(())
    }
}
