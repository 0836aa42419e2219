//! PDF rasterization layer.
//!
//! Turns PDF bytes into one base64-encoded PNG per page using a bounded pool
//! of rendering engine instances.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            Conversion Service           │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │               Rasterizer                │
//! │  ┌──────────────┐  ┌─────────────────┐  │
//! │  │ InstancePool │  │  PNG / base64   │  │
//! │  │  (leases)    │  │  encoding       │  │
//! │  └──────┬───────┘  └─────────────────┘  │
//! └─────────┼───────────────────────────────┘
//!           │
//!           ▼
//! ┌─────────────────────────────────────────┐
//! │   InstanceFactory (PDFium or a fake)    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`Rasterizer`]: Checks out an instance and renders every page in order
//! - [`InstancePool`]: Bounded pool with idle reuse, warm-up and acquire timeout
//! - [`InstanceLease`]: RAII guard that returns an instance to the pool
//! - [`InstanceFactory`], [`RenderInstance`], [`RenderDocument`]: Engine seam
//! - [`PdfiumFactory`]: Production engine backed by PDFium

mod encode;
mod engine;
mod pdfium;
mod pool;
mod rasterizer;

pub use encode::{encode_png, to_base64};
pub use engine::{points_to_pixels, InstanceFactory, RenderDocument, RenderInstance};
pub use pdfium::{PdfiumDocument, PdfiumFactory, PdfiumInstance};
pub use pool::{
    InstanceLease, InstancePool, PoolConfig, PoolStats, DEFAULT_ACQUIRE_TIMEOUT,
    DEFAULT_MAX_IDLE, DEFAULT_MAX_TOTAL, DEFAULT_MIN_IDLE,
};
pub use rasterizer::{render_document, Rasterizer, DEFAULT_RENDER_DPI};
