//! Configuration management for the conversion service.
//!
//! Settings come from command-line arguments or environment variables (a
//! `.env` file in the working directory is loaded first by `main`), with
//! defaults for everything except the API key.
//!
//! # Example
//!
//! ```ignore
//! use pdf_converter::config::Config;
//!
//! let config = Config::parse();
//! config.validate()?;
//! println!("Listening on {}", config.bind_address());
//! ```
//!
//! # Environment Variables
//!
//! - `HOST` - Server bind address (default: 0.0.0.0)
//! - `PORT` - Server port (default: 8080)
//! - `API_KEY` - Shared secret expected in the `x-api-key` header (required)
//! - `PDFIUM_LIBRARY_PATH` - Path to the PDFium shared library (default: system library)
//! - `POOL_MIN_IDLE` - Instances created at startup (default: 1)
//! - `POOL_MAX_IDLE` - Released instances kept for reuse (default: 3)
//! - `POOL_MAX_TOTAL` - Maximum concurrent instances (default: 10)
//! - `POOL_TIMEOUT_SECS` - Seconds to wait for a free instance (default: 30)
//! - `MAX_UPLOAD_SIZE` - Request body limit in bytes (default: 32 MiB)
//! - `CORS_ORIGINS` - Allowed CORS origins, comma-separated (default: any)

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::raster::{
    PoolConfig, DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_MAX_IDLE, DEFAULT_MAX_TOTAL, DEFAULT_MIN_IDLE,
};
use crate::server::DEFAULT_MAX_UPLOAD_SIZE;

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default instance acquisition timeout in seconds.
pub const DEFAULT_POOL_TIMEOUT_SECS: u64 = DEFAULT_ACQUIRE_TIMEOUT.as_secs();

// =============================================================================
// CLI Arguments
// =============================================================================

/// PDF Converter - Converts uploaded PDFs to base64 PNG pages.
///
/// Renders every page of an uploaded PDF at 150 DPI with PDFium and returns
/// the pages as base64-encoded PNGs. PNG and JPEG uploads are returned as
/// base64 unchanged.
#[derive(Parser, Clone)]
#[command(name = "pdf-converter")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "PORT")]
    pub port: u16,

    /// Maximum upload size in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_SIZE, env = "MAX_UPLOAD_SIZE")]
    pub max_upload_size: usize,

    // =========================================================================
    // Authentication Configuration
    // =========================================================================
    /// API key clients must send in the `x-api-key` header.
    ///
    /// The server refuses to start without one.
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    // =========================================================================
    // Rendering Configuration
    // =========================================================================
    /// Path to the PDFium shared library.
    ///
    /// If not specified, PDFium is loaded from the system library path.
    #[arg(long, env = "PDFIUM_LIBRARY_PATH")]
    pub pdfium_library: Option<PathBuf>,

    /// Number of PDFium instances created at startup.
    #[arg(long, default_value_t = DEFAULT_MIN_IDLE, env = "POOL_MIN_IDLE")]
    pub pool_min_idle: usize,

    /// Maximum number of idle PDFium instances kept for reuse.
    #[arg(long, default_value_t = DEFAULT_MAX_IDLE, env = "POOL_MAX_IDLE")]
    pub pool_max_idle: usize,

    /// Maximum number of PDFium instances in use at once.
    #[arg(long, default_value_t = DEFAULT_MAX_TOTAL, env = "POOL_MAX_TOTAL")]
    pub pool_max_total: usize,

    /// Seconds to wait for a free PDFium instance before failing a request.
    #[arg(long, default_value_t = DEFAULT_POOL_TIMEOUT_SECS, env = "POOL_TIMEOUT_SECS")]
    pub pool_timeout: u64,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key().is_empty() {
            return Err("API key is required. Set --api-key or API_KEY".to_string());
        }

        if self.max_upload_size == 0 {
            return Err("max_upload_size must be greater than 0".to_string());
        }

        self.pool_config()
            .validate()
            .map_err(|e| format!("{}. Check the --pool-* options", e))?;

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The configured API key, or an empty string (call validate() first).
    pub fn api_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or("")
    }

    /// Rendering pool settings.
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::default()
            .with_min_idle(self.pool_min_idle)
            .with_max_idle(self.pool_max_idle)
            .with_max_total(self.pool_max_total)
            .with_acquire_timeout(Duration::from_secs(self.pool_timeout))
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("max_upload_size", &self.max_upload_size)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("pdfium_library", &self.pdfium_library)
            .field("pool_min_idle", &self.pool_min_idle)
            .field("pool_max_idle", &self.pool_max_idle)
            .field("pool_max_total", &self.pool_max_total)
            .field("pool_timeout", &self.pool_timeout)
            .field("cors_origins", &self.cors_origins)
            .field("verbose", &self.verbose)
            .field("no_tracing", &self.no_tracing)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
