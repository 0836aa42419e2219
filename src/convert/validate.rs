//! Upload validation.
//!
//! Classifies an upload by its filename extension and, for PDFs, checks the
//! leading signature bytes. Images are not sniffed; their bytes are passed
//! through untouched.

use bytes::Bytes;

use crate::error::ConvertError;

// =============================================================================
// File Kinds
// =============================================================================

/// Signature every PDF file starts with.
pub const PDF_MAGIC: &[u8] = b"%PDF";

/// Image formats accepted for passthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    pub const fn name(&self) -> &'static str {
        match self {
            ImageFormat::Png => "PNG",
            ImageFormat::Jpeg => "JPEG",
        }
    }
}

/// What an accepted upload will be converted as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Returned as base64 of the raw bytes
    Image(ImageFormat),

    /// Rasterized page by page
    Pdf,
}

impl FileKind {
    /// Map a lowercase extension (without the dot) to a kind.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "pdf" => Some(FileKind::Pdf),
            "png" => Some(FileKind::Image(ImageFormat::Png)),
            "jpg" | "jpeg" => Some(FileKind::Image(ImageFormat::Jpeg)),
            _ => None,
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            FileKind::Image(format) => format.name(),
            FileKind::Pdf => "PDF",
        }
    }
}

/// A file received from the `file` form field.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied filename, possibly empty
    pub filename: String,

    /// Complete file contents
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Lowercased extension of the final path component, if any.
///
/// `"report.PDF"` gives `pdf`; `"archive.tar.gz"` gives `gz`; `"README"` and
/// `"dir.v2/README"` give `None`.
pub fn file_extension(filename: &str) -> Option<String> {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Whether `data` starts with the PDF signature.
#[inline]
pub fn is_pdf_header(data: &[u8]) -> bool {
    data.len() >= PDF_MAGIC.len() && &data[..PDF_MAGIC.len()] == PDF_MAGIC
}

/// Decide how an upload should be converted.
///
/// # Errors
///
/// - [`ConvertError::UnsupportedType`] when the extension is missing or not
///   one of pdf, png, jpg, jpeg
/// - [`ConvertError::InvalidContent`] when a `.pdf` upload does not start
///   with `%PDF`
pub fn validate_upload(filename: &str, data: &[u8]) -> Result<FileKind, ConvertError> {
    let extension = file_extension(filename);

    let kind = extension
        .as_deref()
        .and_then(FileKind::from_extension)
        .ok_or_else(|| ConvertError::UnsupportedType {
            extension: extension.clone(),
        })?;

    match kind {
        FileKind::Image(_) => Ok(kind),
        FileKind::Pdf if is_pdf_header(data) => Ok(kind),
        FileKind::Pdf => Err(ConvertError::InvalidContent),
    }
}
