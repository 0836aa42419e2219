//! PDF Converter - Converts uploaded PDFs to base64 PNG pages.
//!
//! This binary starts the HTTP server and configures all components.

use clap::Parser;
use std::process::ExitCode;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdf_converter::{
    config::Config,
    convert::ConversionService,
    raster::{InstancePool, PdfiumFactory, Rasterizer, DEFAULT_RENDER_DPI},
    server::{create_router, RouterConfig},
};

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    let config = Config::parse();

    init_logging(config.verbose);

    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {
            warn!(".env file not found, using process environment variables")
        }
        Err(e) => warn!("Failed to load .env file: {}", e),
    }

    run_serve(config).await
}

// =============================================================================
// Serve
// =============================================================================

async fn run_serve(config: Config) -> ExitCode {
    // Validate configuration
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    print_banner();

    info!("Configuration:");
    match &config.pdfium_library {
        Some(path) => info!("  PDFium library: {}", path.display()),
        None => info!("  PDFium library: system"),
    }
    info!(
        "  Pool: {} min idle, {} max idle, {} max total, {}s timeout",
        config.pool_min_idle, config.pool_max_idle, config.pool_max_total, config.pool_timeout
    );
    info!("  Render DPI: {}", DEFAULT_RENDER_DPI);
    info!(
        "  Max upload size: {}MB",
        config.max_upload_size / (1024 * 1024)
    );
    match &config.cors_origins {
        Some(origins) => info!("  CORS origins: {}", origins.join(", ")),
        None => info!("  CORS origins: any"),
    }

    // Bind PDFium and warm up the pool
    let factory = match PdfiumFactory::bind(config.pdfium_library.as_deref()) {
        Ok(factory) => factory,
        Err(e) => {
            error!("Failed to initialize PDFium: {}", e);
            error!("");
            error!("  Please check:");
            error!("    - The PDFium shared library is installed");
            error!("    - --pdfium-library / PDFIUM_LIBRARY_PATH points at it");
            return ExitCode::FAILURE;
        }
    };

    let pool = match InstancePool::new(factory, config.pool_config()) {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize PDFium pool: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let conversion_service = ConversionService::new(Rasterizer::new(pool.clone()));
    let router = create_router(conversion_service, build_router_config(&config));

    // Bind and serve
    let addr = config.bind_address();

    info!("");
    info!("────────────────────────────────────────────────────────────────");
    info!("  Server listening on: http://{}", addr);
    info!("");
    info!("  Try these endpoints:");
    info!("    curl http://{}/health", addr);
    info!(
        "    curl -H 'x-api-key: <key>' -F file=@document.pdf http://{}/api/convert",
        addr
    );
    info!("────────────────────────────────────────────────────────────────");
    info!("");

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            pool.close();
            return ExitCode::FAILURE;
        }
    };

    let result = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    pool.close();

    if let Err(e) = result {
        error!("Server error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Server shutdown complete");
    ExitCode::SUCCESS
}

/// Print the startup banner.
fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    info!("");
    info!("┌─┐┌┬┐┌─┐   ┌─┐┌─┐┌┐┌┬  ┬┌─┐┬─┐┌┬┐┌─┐┬─┐");
    info!("├─┘ ││├┤ ───│  │ ││││└┐┌┘├┤ ├┬┘ │ ├┤ ├┬┘");
    info!("┴  ─┴┘└     └─┘└─┘┘└┘ └┘ └─┘┴└─ ┴ └─┘┴└─");
    info!("                                  v{}", version);
    info!("");
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "pdf_converter=debug,tower_http=debug"
    } else {
        "pdf_converter=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build RouterConfig from the application Config.
fn build_router_config(config: &Config) -> RouterConfig {
    let mut router_config = RouterConfig::new(config.api_key())
        .with_max_upload_size(config.max_upload_size)
        .with_tracing(!config.no_tracing);

    if let Some(ref origins) = config.cors_origins {
        router_config = router_config.with_cors_origins(origins.clone());
    }

    router_config
}

/// Resolve when Ctrl+C or SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}
