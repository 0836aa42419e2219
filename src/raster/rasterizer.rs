//! PDF to base64 PNG rasterization on top of the instance pool.
//!
//! # Pipeline
//!
//! ```text
//! acquire lease ──► open document ──► page count ──► for each page:
//!      │                 │                              render @ dpi
//!      │                 │                              encode PNG
//!      │                 │                              base64
//!      ▼                 ▼
//!  released on drop   closed on drop
//! ```
//!
//! The first failing page aborts the whole document; no partial output is
//! returned.

use bytes::Bytes;
use tracing::debug;

use crate::error::RasterError;

use super::encode::{encode_png, to_base64};
use super::engine::{InstanceFactory, RenderDocument, RenderInstance};
use super::pool::{InstancePool, PoolStats};

/// Resolution pages are rendered at.
pub const DEFAULT_RENDER_DPI: u16 = 150;

/// Renders PDF documents using instances checked out from a pool.
pub struct Rasterizer<F: InstanceFactory> {
    pool: InstancePool<F>,
}

impl<F: InstanceFactory> Clone for Rasterizer<F> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
        }
    }
}

impl<F: InstanceFactory> Rasterizer<F> {
    /// Create a rasterizer rendering at [`DEFAULT_RENDER_DPI`].
    pub fn new(pool: InstancePool<F>) -> Self {
        Self { pool }
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Render every page of `data` to a base64 PNG, in page order.
    ///
    /// The wait for an instance is async; rendering itself runs on the
    /// blocking thread pool.
    pub async fn rasterize(&self, data: Bytes) -> Result<Vec<String>, RasterError> {
        let mut lease = self.pool.acquire().await?;

        tokio::task::spawn_blocking(move || {
            render_document(&mut *lease, &data, DEFAULT_RENDER_DPI)
        })
            .await
            .map_err(|e| RasterError::Worker(e.to_string()))?
    }
}

/// Render all pages of a document on an already checked-out instance.
///
/// Pages are visited in ascending index order. Errors report 1-based page
/// numbers.
pub fn render_document<I: RenderInstance>(
    instance: &mut I,
    data: &[u8],
    dpi: u16,
) -> Result<Vec<String>, RasterError> {
    let document = instance
        .open_document(data)
        .map_err(RasterError::DocumentOpen)?;

    let page_count = document.page_count().map_err(RasterError::PageCount)?;
    debug!(pages = page_count, dpi = dpi, "PDF opened");

    let mut pages = Vec::with_capacity(page_count);
    for index in 0..page_count {
        let page = index + 1;

        let image = document
            .render_page(index, dpi)
            .map_err(|source| RasterError::Render { page, source })?;

        let png = encode_png(&image).map_err(|e| RasterError::Encode {
            page,
            message: e.to_string(),
        })?;

        debug!(
            page = page,
            width = image.width(),
            height = image.height(),
            png_bytes = png.len(),
            "Rendered page"
        );

        pages.push(to_base64(&png));
    }

    Ok(pages)
}

// =============================================================================
// Tests
// =============================================================================
