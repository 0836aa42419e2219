use std::time::Duration;

use thiserror::Error;

/// Errors reported by a rendering engine instance.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// The engine library could not be loaded or an instance could not be created
    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    /// The engine rejected the document structure
    #[error("{0}")]
    Open(String),

    /// The engine could not report the page count
    #[error("{0}")]
    PageCount(String),

    /// The engine failed to rasterize a page
    #[error("{0}")]
    Render(String),
}

/// Errors from the rendering instance pool
#[derive(Debug, Clone, Error)]
pub enum PoolError {
    /// No instance became available within the acquisition timeout
    #[error("Timed out after {0:?} waiting for a rendering instance")]
    Timeout(Duration),

    /// The pool has been closed
    #[error("Rendering pool is closed")]
    Closed,

    /// The engine could not create a new instance for the pool
    #[error("Failed to create rendering instance: {0}")]
    Create(#[from] EngineError),

    /// Pool bounds are inconsistent
    #[error("Invalid pool configuration: {0}")]
    InvalidConfig(String),
}

/// Errors that can occur while rasterizing a PDF into base64 PNG pages.
///
/// Page numbers are 1-based.
#[derive(Debug, Clone, Error)]
pub enum RasterError {
    /// Could not get an instance from the pool
    #[error("failed to get PDFium instance: {0}")]
    Pool(#[from] PoolError),

    /// The document could not be opened
    #[error("failed to open PDF document: {0}")]
    DocumentOpen(EngineError),

    /// The page count could not be read
    #[error("failed to get page count: {0}")]
    PageCount(EngineError),

    /// A page could not be rendered
    #[error("failed to render page {page}: {source}")]
    Render { page: usize, source: EngineError },

    /// A rendered page could not be encoded as PNG
    #[error("failed to encode page {page} to PNG: {message}")]
    Encode { page: usize, message: String },

    /// The blocking render task panicked or was cancelled
    #[error("rendering task failed: {0}")]
    Worker(String),
}

/// Every way a conversion request can fail after authentication.
///
/// Each variant maps to exactly one HTTP status and message in
/// `server::handlers`.
#[derive(Debug, Clone, Error)]
pub enum ConvertError {
    /// No `file` field in the multipart body
    #[error("File is required. Please upload a file with key 'file'")]
    MissingFile,

    /// Extension is not one of pdf, png, jpg, jpeg
    #[error("Invalid file type. Only PDF and image files (PNG, JPG, JPEG) are allowed")]
    UnsupportedType { extension: Option<String> },

    /// A `.pdf` upload without the `%PDF` signature
    #[error("Invalid file content. The file is not a valid PDF")]
    InvalidContent,

    /// The uploaded field could not be read
    #[error("Failed to read uploaded file")]
    ReadFailure { message: String },

    /// The request body exceeded the upload limit
    #[error("File exceeds the maximum upload size")]
    PayloadTooLarge,

    /// No pooled instance could be obtained (pool closed or instance creation failed)
    #[error("Failed to convert PDF: {0}")]
    PoolExhausted(RasterError),

    /// Waiting for a pooled instance exceeded the timeout
    #[error("Failed to convert PDF: {0}")]
    PoolTimeout(RasterError),

    #[error("Failed to convert PDF: {0}")]
    DocumentOpenFailed(RasterError),

    #[error("Failed to convert PDF: {0}")]
    PageCountFailed(RasterError),

    #[error("Failed to convert PDF: {0}")]
    RenderFailed(RasterError),

    #[error("Failed to convert PDF: {0}")]
    EncodeFailed(RasterError),

    /// The blocking render task did not complete
    #[error("Failed to convert PDF: {message}")]
    Internal { message: String },
}

impl ConvertError {
    /// Stable identifier for logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            ConvertError::MissingFile => "missing_file",
            ConvertError::UnsupportedType { .. } => "unsupported_type",
            ConvertError::InvalidContent => "invalid_content",
            ConvertError::ReadFailure { .. } => "read_failure",
            ConvertError::PayloadTooLarge => "payload_too_large",
            ConvertError::PoolExhausted(_) => "pool_exhausted",
            ConvertError::PoolTimeout(_) => "pool_timeout",
            ConvertError::DocumentOpenFailed(_) => "document_open_failed",
            ConvertError::PageCountFailed(_) => "page_count_failed",
            ConvertError::RenderFailed(_) => "render_failed",
            ConvertError::EncodeFailed(_) => "encode_failed",
            ConvertError::Internal { .. } => "internal",
        }
    }

    /// Whether the failure was caused by the client's input.
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            ConvertError::MissingFile
                | ConvertError::UnsupportedType { .. }
                | ConvertError::InvalidContent
                | ConvertError::PayloadTooLarge
        )
    }
}

impl From<RasterError> for ConvertError {
    fn from(err: RasterError) -> Self {
        match &err {
            RasterError::Pool(PoolError::Timeout(_)) => ConvertError::PoolTimeout(err),
            RasterError::Pool(_) => ConvertError::PoolExhausted(err),
            RasterError::DocumentOpen(_) => ConvertError::DocumentOpenFailed(err),
            RasterError::PageCount(_) => ConvertError::PageCountFailed(err),
            RasterError::Render { .. } => ConvertError::RenderFailed(err),
            RasterError::Encode { .. } => ConvertError::EncodeFailed(err),
            RasterError::Worker(_) => ConvertError::Internal {
                message: err.to_string(),
            },
        }
    }
}
