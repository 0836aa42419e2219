//! Rendering engine abstraction.
//!
//! The pool and rasterizer are generic over these traits so that the PDFium
//! binding can be swapped for an in-memory fake in tests.
//!
//! # Lifecycle
//!
//! ```text
//! InstanceFactory::create()        -> Instance        (pool warm-up / growth)
//! Instance::open_document(&mut, ..) -> Document        (one at a time per instance)
//! Document::page_count()
//! Document::render_page(i, dpi)   -> DynamicImage
//! drop(Document)                                      (document closed)
//! drop(Instance)                                      (instance closed)
//! ```
//!
//! `open_document` takes `&mut self` and the returned document borrows the
//! instance, so an instance can never have two documents open at once.

use image::DynamicImage;

use crate::error::EngineError;

/// Creates rendering instances for the pool.
pub trait InstanceFactory: Send + Sync + 'static {
    /// The instance type handed out by the pool.
    type Instance: RenderInstance;

    /// Create a new instance.
    fn create(&self) -> Result<Self::Instance, EngineError>;
}

/// A single rendering engine worker.
pub trait RenderInstance: Send + 'static {
    /// An open document. Closing happens when it is dropped.
    type Document<'a>: RenderDocument
    where
        Self: 'a;

    /// Open a document from an in-memory buffer.
    fn open_document<'a>(&'a mut self, data: &'a [u8]) -> Result<Self::Document<'a>, EngineError>;
}

/// An open document on a rendering instance.
pub trait RenderDocument {
    /// Number of pages in the document.
    fn page_count(&self) -> Result<usize, EngineError>;

    /// Rasterize the page at `index` (0-based) at the given resolution.
    fn render_page(&self, index: usize, dpi: u16) -> Result<DynamicImage, EngineError>;
}

/// Convert a length in PDF points to pixels at the given DPI.
///
/// PDF user space has 72 points per inch.
#[inline]
pub fn points_to_pixels(points: f32, dpi: u16) -> u32 {
    (points * f32::from(dpi) / 72.0).round().max(1.0) as u32
}
