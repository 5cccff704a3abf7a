use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::entities::EntityKind;

/// Errors returned by the state-management API and the fixture loader
#[derive(Debug, Error)]
pub enum MockError {
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i64 },

    #[error("duplicate {kind} ID {id} found in cassette")]
    DuplicateEntity { kind: EntityKind, id: i64 },

    #[error("URL does not match deal show pattern: {0}")]
    PatternMismatch(String),

    #[error("failed to unmarshal {what}: {source}")]
    Deserialization {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to load cassette {path}: {reason}")]
    CassetteLoad { path: String, reason: String },

    #[error("failed to process interaction {index} from {cassette}: {source}")]
    Interaction {
        index: usize,
        cassette: String,
        #[source]
        source: Box<MockError>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MockError {
    pub fn not_found(kind: EntityKind, id: i64) -> Self {
        MockError::NotFound { kind, id }
    }

    /// The innermost error, unwrapping interaction context
    pub fn root(&self) -> &MockError {
        match self {
            MockError::Interaction { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type MockResult<T> = Result<T, MockError>;

/// A failure configured by test code for a specific bot or deal.
///
/// Kept as plain data rather than an error object so it can be cloned out of
/// the store and served any number of times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InjectedFault {
    pub kind: String,
    pub message: String,
}

impl InjectedFault {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// JSON error body, shaped like the real API's
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
}

/// Failures the HTTP handlers turn into responses
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("injected {}: {}", .0.kind, .0.message)]
    Forced(InjectedFault),

    #[error("Rate limit exceeded")]
    RateLimited { retry_after: u64 },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(message) => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: message,
                    error_description: None,
                }),
            )
                .into_response(),
            ApiError::Forced(fault) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: fault.message,
                    error_description: None,
                }),
            )
                .into_response(),
            ApiError::RateLimited { retry_after } => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(ErrorResponse {
                        error: "rate limit exceeded".to_string(),
                        error_description: Some(
                            "You have exceeded the rate limit. Please try again later."
                                .to_string(),
                        ),
                    }),
                )
                    .into_response();
                if retry_after > 0 {
                    response
                        .headers_mut()
                        .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
                }
                response
            }
        }
    }
}
