//! HTTP request handlers for the conversion API.
//!
//! # Endpoints
//!
//! - `POST /api/convert` - Convert an uploaded PDF or image to base64
//! - `GET /health` - Health check endpoint

use std::sync::Arc;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::convert::{ConversionService, UploadedFile};
use crate::error::ConvertError;
use crate::raster::{InstanceFactory, PoolStats};

/// Name of the multipart field holding the upload.
pub const FILE_FIELD: &str = "file";

// =============================================================================
// Application State
// =============================================================================

/// Shared application state containing the conversion service.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<F: InstanceFactory> {
    pub conversion_service: Arc<ConversionService<F>>,
}

impl<F: InstanceFactory> AppState<F> {
    pub fn new(conversion_service: ConversionService<F>) -> Self {
        Self {
            conversion_service: Arc::new(conversion_service),
        }
    }
}

impl<F: InstanceFactory> Clone for AppState<F> {
    fn clone(&self) -> Self {
        Self {
            conversion_service: Arc::clone(&self.conversion_service),
        }
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// JSON envelope used by every `/api` response.
///
/// `data` is serialized as `null` on errors.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub message: String,
    pub data: Option<Vec<String>>,
}

impl ApiResponse {
    pub fn success(data: Vec<String>) -> Self {
        Self {
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: None,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Rendering pool occupancy
    pub pool: PoolHealth,
}

#[derive(Debug, Serialize)]
pub struct PoolHealth {
    pub idle: usize,
    pub in_use: usize,
    pub max_total: usize,
}

impl From<PoolStats> for PoolHealth {
    fn from(stats: PoolStats) -> Self {
        Self {
            idle: stats.idle,
            in_use: stats.in_use,
            max_total: stats.max_total,
        }
    }
}

// =============================================================================
// Error Handling
// =============================================================================

impl ConvertError {
    /// HTTP status this error is reported with.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ConvertError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            err if err.is_client_error() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Convert ConvertError to HTTP response.
///
/// The body is always `{"message": ..., "data": null}`.
impl IntoResponse for ConvertError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_type = self.kind();
        let message = self.to_string();

        if status.is_server_error() {
            match &self {
                ConvertError::ReadFailure { message: cause } => error!(
                    error_type = error_type,
                    status = status.as_u16(),
                    "Server error: {}: {}",
                    message,
                    cause
                ),
                _ => error!(
                    error_type = error_type,
                    status = status.as_u16(),
                    "Server error: {}",
                    message
                ),
            }
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        (status, Json(ApiResponse::error(message))).into_response()
    }
}

fn field_error(err: MultipartError) -> ConvertError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ConvertError::PayloadTooLarge
    } else {
        ConvertError::MissingFile
    }
}

fn read_error(err: MultipartError) -> ConvertError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ConvertError::PayloadTooLarge
    } else {
        ConvertError::ReadFailure {
            message: err.body_text(),
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Handle conversion requests.
///
/// # Endpoint
///
/// `POST /api/convert` with a `multipart/form-data` body
///
/// # Form Fields
///
/// - `file`: The PDF, PNG, JPG or JPEG to convert. It must be a file part
///   (with a filename). Other fields are ignored.
///
/// # Response
///
/// `200 OK` with one base64 PNG per PDF page, or the base64 of an image upload:
/// ```json
/// {
///   "message": "success",
///   "data": ["iVBORw0KGgo..."]
/// }
/// ```
///
/// A body that is not valid multipart is reported the same way as a missing
/// `file` field.
pub async fn convert_handler<F: InstanceFactory>(
    State(state): State<AppState<F>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse>, ConvertError> {
    let mut multipart = multipart.map_err(|rejection| {
        debug!("Rejected multipart body: {}", rejection.body_text());
        ConvertError::MissingFile
    })?;

    let upload = loop {
        let Some(field) = multipart.next_field().await.map_err(field_error)? else {
            return Err(ConvertError::MissingFile);
        };

        // Plain form values named `file` are not uploads
        let filename = match (field.name(), field.file_name()) {
            (Some(FILE_FIELD), Some(filename)) => filename.to_string(),
            _ => continue,
        };
        let data = field.bytes().await.map_err(read_error)?;
        break UploadedFile::new(filename, data);
    };

    let result = state.conversion_service.convert(upload).await?;

    Ok(Json(ApiResponse::success(result.into_pages())))
}

/// Handle health check requests.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response
///
/// `200 OK` with JSON body:
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "pool": { "idle": 1, "in_use": 0, "max_total": 10 }
/// }
/// ```
pub async fn health_handler<F: InstanceFactory>(
    State(state): State<AppState<F>>,
) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        pool: state.conversion_service.pool_stats().into(),
    })
}
