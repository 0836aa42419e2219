//! Router configuration for the conversion service.
//!
//! This module defines the HTTP routes and applies middleware for API key
//! authentication, upload size limits and CORS.
//!
//! # Route Structure
//!
//! ```text
//! /health           - Health check (public)
//! /api/convert      - Conversion endpoint (requires x-api-key)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use pdf_converter::server::routes::{create_router, RouterConfig};
//!
//! let pool = InstancePool::new(PdfiumFactory::bind(None)?, PoolConfig::default())?;
//! let service = ConversionService::new(Rasterizer::new(pool));
//!
//! let config = RouterConfig::new("my-api-key")
//!     .with_cors_origins(vec!["https://example.com".to_string()]);
//!
//! let router = create_router(service, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use http::header::{HeaderName, CONTENT_TYPE};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::{auth_middleware, ApiKeyAuth, API_KEY_HEADER};
use super::handlers::{convert_handler, health_handler, AppState};
use crate::convert::ConversionService;
use crate::raster::InstanceFactory;

/// Default request body limit for uploads (32 MiB).
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 32 * 1024 * 1024;

// =============================================================================
// Router Configuration
// =============================================================================

/// Configuration for the HTTP router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Key expected in the `x-api-key` header
    pub api_key: String,

    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Maximum request body size in bytes for `/api` routes
    pub max_upload_size: usize,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a new router configuration with the given API key.
    ///
    /// By default:
    /// - CORS allows any origin
    /// - Uploads are limited to [`DEFAULT_MAX_UPLOAD_SIZE`]
    /// - Tracing is enabled
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            cors_origins: None,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            enable_tracing: true,
        }
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass an empty vec to disallow all cross-origin requests.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Set the upload body limit in bytes.
    pub fn with_max_upload_size(mut self, bytes: usize) -> Self {
        self.max_upload_size = bytes;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

impl std::fmt::Debug for RouterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouterConfig")
            .field("api_key", &"<redacted>")
            .field("cors_origins", &self.cors_origins)
            .field("max_upload_size", &self.max_upload_size)
            .field("enable_tracing", &self.enable_tracing)
            .finish()
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// - `GET /health` is public
/// - `POST /api/convert` sits behind the API key middleware and the upload
///   body limit
/// - CORS and (optionally) request tracing wrap everything
pub fn create_router<F: InstanceFactory>(
    conversion_service: ConversionService<F>,
    config: RouterConfig,
) -> Router {
    let app_state = AppState::new(conversion_service);
    let auth = ApiKeyAuth::new(&config.api_key);
    let cors = build_cors_layer(&config);

    // Auth runs before the body limit, so unauthenticated uploads are never read.
    // As a route layer it leaves unknown /api paths to the 404 fallback.
    let api_routes = Router::new()
        .route("/convert", post(convert_handler::<F>))
        .layer(DefaultBodyLimit::max(config.max_upload_size))
        .route_layer(middleware::from_fn_with_state(auth, auth_middleware))
        .with_state(app_state.clone());

    let public_routes = Router::new()
        .route("/health", get(health_handler::<F>))
        .with_state(app_state);

    let router = Router::new()
        .nest("/api", api_routes)
        .merge(public_routes)
        .layer(cors);

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(API_KEY_HEADER)])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
