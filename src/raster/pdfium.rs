//! PDFium-backed rendering engine.
//!
//! PDFium is bound once per process; every pooled [`PdfiumInstance`] shares
//! that binding. `pdfium-render` serializes calls into the library
//! (`thread_safe` feature), so the pool bounds how many requests hold an
//! instance while the library itself is entered by one thread at a time.

use std::path::Path;
use std::sync::Arc;

use image::DynamicImage;
use pdfium_render::prelude::*;
use tracing::info;

use crate::error::EngineError;

use super::engine::{points_to_pixels, InstanceFactory, RenderDocument, RenderInstance};

/// Creates instances that share one PDFium binding.
#[derive(Clone)]
pub struct PdfiumFactory {
    pdfium: Arc<Pdfium>,
}

impl PdfiumFactory {
    /// Bind PDFium from `library_path`, or from the system library search path
    /// when `None`.
    pub fn bind(library_path: Option<&Path>) -> Result<Self, EngineError> {
        let bindings = match library_path {
            Some(path) => {
                info!("Binding PDFium from {}", path.display());
                Pdfium::bind_to_library(path).map_err(|e| {
                    EngineError::Unavailable(format!(
                        "failed to load PDFium from '{}': {}",
                        path.display(),
                        e
                    ))
                })?
            }
            None => {
                info!("Binding PDFium from the system library path");
                Pdfium::bind_to_system_library().map_err(|e| {
                    EngineError::Unavailable(format!("failed to load system PDFium: {}", e))
                })?
            }
        };

        Ok(Self {
            pdfium: Arc::new(Pdfium::new(bindings)),
        })
    }
}

impl InstanceFactory for PdfiumFactory {
    type Instance = PdfiumInstance;

    fn create(&self) -> Result<PdfiumInstance, EngineError> {
        Ok(PdfiumInstance {
            pdfium: Arc::clone(&self.pdfium),
        })
    }
}

/// A pooled handle onto the shared PDFium binding.
pub struct PdfiumInstance {
    pdfium: Arc<Pdfium>,
}

impl RenderInstance for PdfiumInstance {
    type Document<'a> = PdfiumDocument<'a>;

    fn open_document<'a>(&'a mut self, data: &'a [u8]) -> Result<PdfiumDocument<'a>, EngineError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(data, None)
            .map_err(|e| EngineError::Open(e.to_string()))?;

        Ok(PdfiumDocument { document })
    }
}

/// An open PDFium document. PDFium closes it when this is dropped.
pub struct PdfiumDocument<'a> {
    document: PdfDocument<'a>,
}

impl RenderDocument for PdfiumDocument<'_> {
    fn page_count(&self) -> Result<usize, EngineError> {
        Ok(self.document.pages().len() as usize)
    }

    fn render_page(&self, index: usize, dpi: u16) -> Result<DynamicImage, EngineError> {
        let page_index = u16::try_from(index)
            .map_err(|_| EngineError::Render(format!("page index {} out of range", index)))?;

        let page = self
            .document
            .pages()
            .get(page_index)
            .map_err(|e| EngineError::Render(e.to_string()))?;

        let width = points_to_pixels(page.width().value, dpi);
        let height = points_to_pixels(page.height().value, dpi);
        let config = PdfRenderConfig::new()
            .set_target_width(width as i32)
            .set_target_height(height as i32);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| EngineError::Render(e.to_string()))?;

        Ok(bitmap.as_image())
    }
}

// =============================================================================
// Tests
// =============================================================================
