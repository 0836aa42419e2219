//! # PDF Converter
//!
//! An HTTP service that converts uploaded PDFs into base64-encoded PNG pages.
//!
//! Pages are rendered at 150 DPI with PDFium through a bounded pool of engine
//! instances. PNG and JPEG uploads are returned as base64 of their raw bytes.
//! Every conversion request must carry a shared-secret `x-api-key` header.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`raster`] - Rendering engine traits, instance pool, PDFium binding
//! - [`convert`] - Upload validation and conversion dispatch
//! - [`server`] - Axum-based HTTP server, API key middleware and routes
//! - [`config`] - CLI and environment configuration
//! - [`error`] - Error types for every layer
//!
//! ## Example
//!
//! ```rust,no_run
//! use pdf_converter::{
//!     create_router, ConversionService, InstancePool, PdfiumFactory, PoolConfig, Rasterizer,
//!     RouterConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let factory = PdfiumFactory::bind(None)?;
//!     let pool = InstancePool::new(factory, PoolConfig::default())?;
//!     let service = ConversionService::new(Rasterizer::new(pool));
//!
//!     let router = create_router(service, RouterConfig::new("my-api-key"));
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod raster;
pub mod server;

// Re-export commonly used types
pub use config::Config;
pub use convert::{
    validate_upload, ConversionResult, ConversionService, FileKind, ImageFormat, UploadedFile,
};
pub use error::{ConvertError, EngineError, PoolError, RasterError};
pub use raster::{
    InstanceFactory, InstanceLease, InstancePool, PdfiumFactory, PoolConfig, PoolStats,
    Rasterizer, RenderDocument, RenderInstance, DEFAULT_RENDER_DPI,
};
pub use server::{
    auth_middleware, convert_handler, create_router, health_handler, ApiKeyAuth, ApiResponse,
    AppState, AuthError, HealthResponse, RouterConfig,
};
