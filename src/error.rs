//! REST error type and its JSON response body

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::compiler::coerce::ConversionError;
use crate::compiler::selector::SelectorViolation;
use crate::engine::EngineError;

/// Errors surfaced to REST clients
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RestError {
    /// Malformed or contradictory request parameters
    #[error("{0}")]
    InvalidRequest(String),

    /// A value could not be converted to its declared type
    #[error("{message}")]
    Conversion {
        message: String,
        source: ConversionError,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Authorization(String),

    /// Any other failure reported by the engine
    #[error("{0}")]
    Engine(String),
}

impl RestError {
    pub fn invalid(message: impl Into<String>) -> Self {
        RestError::InvalidRequest(message.into())
    }

    /// Value of the `type` field of the error body
    pub fn kind(&self) -> &'static str {
        match self {
            RestError::InvalidRequest(_) | RestError::Conversion { .. } => {
                "InvalidRequestException"
            }
            RestError::NotFound(_) => "NotFoundException",
            RestError::Authorization(_) => "AuthorizationException",
            RestError::Engine(_) => "ProcessEngineException",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RestError::InvalidRequest(_) | RestError::Conversion { .. } => StatusCode::BAD_REQUEST,
            RestError::NotFound(_) => StatusCode::NOT_FOUND,
            RestError::Authorization(_) => StatusCode::FORBIDDEN,
            RestError::Engine(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ConversionError> for RestError {
    fn from(source: ConversionError) -> Self {
        RestError::Conversion {
            message: source.to_string(),
            source,
        }
    }
}

impl From<SelectorViolation> for RestError {
    fn from(violation: SelectorViolation) -> Self {
        RestError::InvalidRequest(violation.to_string())
    }
}

impl From<EngineError> for RestError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NotFound(message) => RestError::NotFound(message),
            EngineError::Authorization(message) => RestError::Authorization(message),
            EngineError::Other(message) => RestError::Engine(message),
        }
    }
}

/// JSON body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub message: String,
}

impl IntoResponse for RestError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(kind = self.kind(), error = %self, "Engine call failed");
        } else {
            tracing::debug!(kind = self.kind(), error = %self, "Request rejected");
        }

        let body = ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
