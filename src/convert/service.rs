//! Conversion service.
//!
//! Validates an upload and dispatches it by [`FileKind`]:
//!
//! ```text
//! UploadedFile ──► validate_upload ──► Image ──► base64(raw bytes)     ─┐
//!                                  └─► Pdf   ──► Rasterizer::rasterize ─┴─► ConversionResult
//! ```

use std::time::Instant;

use tracing::{debug, info};

use crate::error::ConvertError;
use crate::raster::{to_base64, InstanceFactory, PoolStats, Rasterizer};

use super::validate::{validate_upload, FileKind, UploadedFile};

/// Output of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    /// Base64 strings in page order; exactly one for images
    pub pages: Vec<String>,
}

impl ConversionResult {
    pub fn into_pages(self) -> Vec<String> {
        self.pages
    }
}

/// Converts uploaded files into base64 payloads.
///
/// # Type Parameters
///
/// * `F` - The rendering engine factory (PDFium in production)
pub struct ConversionService<F: InstanceFactory> {
    rasterizer: Rasterizer<F>,
}

impl<F: InstanceFactory> Clone for ConversionService<F> {
    fn clone(&self) -> Self {
        Self {
            rasterizer: self.rasterizer.clone(),
        }
    }
}

impl<F: InstanceFactory> ConversionService<F> {
    pub fn new(rasterizer: Rasterizer<F>) -> Self {
        Self { rasterizer }
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.rasterizer.pool_stats()
    }

    /// Validate and convert one uploaded file.
    ///
    /// # Errors
    ///
    /// Validation errors are returned before any engine instance is touched.
    /// For PDFs, the first pool, open, render or encode failure aborts the
    /// conversion and no partial pages are returned.
    pub async fn convert(&self, file: UploadedFile) -> Result<ConversionResult, ConvertError> {
        let kind = validate_upload(&file.filename, &file.data)?;
        let started = Instant::now();

        debug!(
            filename = %file.filename,
            kind = kind.name(),
            bytes = file.data.len(),
            "Converting upload"
        );

        let pages = match kind {
            FileKind::Image(_) => vec![to_base64(&file.data)],
            FileKind::Pdf => self.rasterizer.rasterize(file.data).await?,
        };

        info!(
            kind = kind.name(),
            pages = pages.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Conversion complete"
        );

        Ok(ConversionResult { pages })
    }
}
