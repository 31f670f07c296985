//! Access Gate
//!
//! Optional shared access code for the `/api` routes. When no code is
//! configured every request passes through.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::handlers::ErrorResponse;
use crate::state::AppState;

pub const ACCESS_CODE_HEADER: &str = "x-access-code";
pub const ENV_ACCESS_CODE: &str = "ADVISOR_ACCESS_CODE";

/// Access gate configuration
#[derive(Clone, Debug, Default)]
pub struct AccessGate {
    code: Option<Arc<str>>,
}

impl AccessGate {
    /// Gate that lets every request through
    pub fn open() -> Self {
        Self::default()
    }

    /// Gate requiring `code`; a blank code leaves the gate open
    pub fn with_code(code: impl AsRef<str>) -> Self {
        let code = code.as_ref().trim();
        if code.is_empty() {
            Self::open()
        } else {
            Self { code: Some(Arc::from(code)) }
        }
    }

    /// Read `ADVISOR_ACCESS_CODE`
    pub fn from_env() -> Self {
        std::env::var(ENV_ACCESS_CODE)
            .map(Self::with_code)
            .unwrap_or_default()
    }

    pub fn is_enabled(&self) -> bool {
        self.code.is_some()
    }

    /// Check the request headers against the configured code
    pub fn check(&self, headers: &HeaderMap) -> Result<(), AccessError> {
        let Some(expected) = self.code.as_deref() else {
            return Ok(());
        };

        let provided = headers
            .get(ACCESS_CODE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .ok_or(AccessError::MissingCode)?;

        if provided == expected {
            Ok(())
        } else {
            Err(AccessError::InvalidCode)
        }
    }
}

/// Access errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum AccessError {
    #[error("Missing access code")]
    MissingCode,

    #[error("Invalid access code")]
    InvalidCode,
}

impl AccessError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCode => "MISSING_ACCESS_CODE",
            Self::InvalidCode => "INVALID_ACCESS_CODE",
        }
    }
}

impl IntoResponse for AccessError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
            code: self.code().into(),
        };
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

/// Middleware rejecting `/api` requests without the configured access code
pub async fn require_access_code(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AccessError> {
    match state.access.check(request.headers()) {
        Ok(()) => {
            debug!(path = %request.uri().path(), "Access granted");
            Ok(next.run(request).await)
        }
        Err(e) => {
            warn!(path = %request.uri().path(), "Access denied: {}", e);
            Err(e)
        }
    }
}
