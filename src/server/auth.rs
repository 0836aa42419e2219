//! Shared-secret API key authentication.
//!
//! Protected routes require an `x-api-key` header whose value equals the
//! configured key byte for byte:
//!
//! ```text
//! POST /api/convert
//! x-api-key: <key>
//! ```
//!
//! The comparison uses [`subtle::ConstantTimeEq`], so equal-length keys are
//! compared in constant time. Key length is not hidden.
//!
//! # Example
//!
//! ```rust
//! use pdf_converter::server::auth::ApiKeyAuth;
//!
//! let auth = ApiKeyAuth::new("s3cret");
//! assert!(auth.verify(Some(&b"s3cret"[..])).is_ok());
//! assert!(auth.verify(Some(&b"guess"[..])).is_err());
//! assert!(auth.verify(None).is_err());
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};

use super::handlers::ApiResponse;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

// =============================================================================
// Types
// =============================================================================

/// Authentication error types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No key header, or an empty one
    MissingKey,

    /// A key was sent but does not match
    InvalidKey,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingKey => write!(f, "API key is required"),
            AuthError::InvalidKey => write!(f, "Invalid API key"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = StatusCode::UNAUTHORIZED;
        let message = self.to_string();

        // Wrong keys may be probing; missing keys are usually misconfigured clients
        match self {
            AuthError::InvalidKey => {
                warn!(
                    error_type = "invalid_key",
                    status = status.as_u16(),
                    "Authentication failed: {}",
                    message
                );
            }
            AuthError::MissingKey => {
                debug!(
                    error_type = "missing_key",
                    status = status.as_u16(),
                    "Authentication failed: {}",
                    message
                );
            }
        }

        (status, Json(ApiResponse::error(message))).into_response()
    }
}

// =============================================================================
// API Key Authentication
// =============================================================================

/// Verifies request keys against the configured one.
#[derive(Clone)]
pub struct ApiKeyAuth {
    key: Arc<[u8]>,
}

impl ApiKeyAuth {
    pub fn new(key: impl AsRef<[u8]>) -> Self {
        Self {
            key: Arc::from(key.as_ref()),
        }
    }

    /// Check a presented key.
    ///
    /// `None` and an empty value are both treated as missing.
    pub fn verify(&self, presented: Option<&[u8]>) -> Result<(), AuthError> {
        let presented = match presented {
            Some(value) if !value.is_empty() => value,
            _ => return Err(AuthError::MissingKey),
        };

        if bool::from(presented.ct_eq(&self.key)) {
            Ok(())
        } else {
            Err(AuthError::InvalidKey)
        }
    }
}

impl std::fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyAuth")
            .field("key", &"<redacted>")
            .finish()
    }
}

// =============================================================================
// Middleware
// =============================================================================

/// Reject requests without a valid `x-api-key` header.
///
/// Use with `axum::middleware::from_fn_with_state`. The raw header bytes are
/// compared, so keys outside ASCII work too.
pub async fn auth_middleware(
    State(auth): State<ApiKeyAuth>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let presented = request.headers().get(API_KEY_HEADER).map(|v| v.as_bytes());

    auth.verify(presented)?;

    Ok(next.run(request).await)
}

// =============================================================================
// Tests
// =============================================================================
