//! Upload validation and conversion.
//!
//! - [`validate_upload`]: Classifies an upload by extension and PDF signature
//! - [`ConversionService`]: Turns a validated upload into base64 pages

mod service;
mod validate;

pub use service::{ConversionResult, ConversionService};
pub use validate::{
    file_extension, is_pdf_header, validate_upload, FileKind, ImageFormat, UploadedFile, PDF_MAGIC,
};
