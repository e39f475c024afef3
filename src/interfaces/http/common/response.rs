//! Response envelope and error mapping shared by all handlers

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::domain::DomainError;

/// Standard API response envelope
///
/// Every REST endpoint wraps its payload in this type.
/// On success: `{"success": true, "data": {...}}`,
/// on failure: `{"success": false, "error": "description"}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    /// Payload, `null` on failure
    pub data: Option<T>,
    /// Error description, omitted on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Empty response for operations without return data
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmptyData {}

/// Error half of every handler result.
pub type ApiError<T> = (StatusCode, Json<ApiResponse<T>>);

pub fn status_for(e: &DomainError) -> StatusCode {
    match e {
        DomainError::NotFound { .. } | DomainError::UnknownUser(_) | DomainError::UnknownGroup(_) => {
            StatusCode::NOT_FOUND
        }
        DomainError::DuplicateName(_)
        | DomainError::DuplicateDutyForDay { .. }
        | DomainError::AlreadyMarkedToday { .. }
        | DomainError::AlreadyGrouped { .. }
        | DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::UnknownMember(_) | DomainError::NotAMember { .. } | DomainError::Validation(_) => {
            StatusCode::BAD_REQUEST
        }
        DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Turn a domain failure into a status and an error envelope.
/// Storage failures are logged and their details hidden from the client.
pub fn domain_error<T>(e: DomainError) -> ApiError<T> {
    let status = status_for(&e);
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(error = %e, "Request failed");
        "Internal server error".to_string()
    } else {
        e.to_string()
    };
    (status, Json(ApiResponse::error(message)))
}

pub fn forbidden<T>() -> ApiError<T> {
    (
        StatusCode::FORBIDDEN,
        Json(ApiResponse::error("Insufficient permissions")),
    )
}
