//! API error types with JSON rendering and Sentry capture.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::{AuthError, MIN_PASSWORD_LENGTH};

/// Convenience alias for handler results.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Application error type for all route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body failed domain validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Request is malformed (bad multipart, bad path parameter)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid bearer token
    #[error("Unauthorized")]
    Unauthorized,

    /// Wrong email or password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Authenticated but not allowed to touch this resource
    #[error("Forbidden")]
    Forbidden,

    /// Resource does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Unique constraint violation (duplicate email, coupon code)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Checkout state rejects submission (unbalanced plan, no address)
    #[error("Checkout error: {0}")]
    Checkout(String),

    /// An upstream lookup service failed or returned garbage
    #[error("Upstream service error: {0}")]
    Upstream(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem error (image uploads)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Wire shape of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Checkout(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Database(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Stable machine-readable code for the `error` field.
    const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized => "unauthorized",
            Self::InvalidCredentials => "invalid_credentials",
            Self::Forbidden => "forbidden",
            Self::NotFound(_) => "not_found",
            Self::Conflict(_) => "conflict",
            Self::Checkout(_) => "checkout",
            Self::Upstream(_) => "upstream",
            Self::Database(_) | Self::Io(_) | Self::Internal(_) => "internal",
        }
    }

    /// Client-safe message. Server-class errors never leak details.
    fn client_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::BadRequest(msg) | Self::Conflict(msg)
            | Self::Checkout(msg) => msg.clone(),
            Self::Unauthorized => "Autenticação necessária".to_string(),
            Self::InvalidCredentials => "E-mail ou senha inválidos".to_string(),
            Self::Forbidden => "Acesso negado".to_string(),
            Self::NotFound(what) => format!("{what} não encontrado"),
            Self::Upstream(_) => "Serviço externo indisponível, tente novamente".to_string(),
            Self::Database(_) | Self::Io(_) | Self::Internal(_) => {
                "Erro interno do servidor".to_string()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Report server-class errors to Sentry and the log before the
        // details are replaced with a generic client message.
        if status.is_server_error() {
            sentry::capture_error(&self);
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = %status, "request rejected");
        }

        let body = ErrorBody {
            error: self.code(),
            message: self.client_message(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<RepositoryError> for ApiError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound("Recurso"),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            RepositoryError::Database(e) => Self::Database(e),
            RepositoryError::DataCorruption(msg) => Self::Internal(msg),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => Self::InvalidCredentials,
            AuthError::EmailTaken => Self::Conflict("E-mail já cadastrado".to_string()),
            AuthError::PasswordTooShort => Self::Validation(format!(
                "Senha deve ter pelo menos {MIN_PASSWORD_LENGTH} caracteres"
            )),
            AuthError::InvalidEmail(_) => Self::Validation("E-mail inválido".to_string()),
            AuthError::Token => Self::Unauthorized,
            AuthError::Hashing => Self::Internal("password hashing failed".to_string()),
            AuthError::Repository(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Validation("x".to_string()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::NotFound("Produto").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Conflict("x".to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Upstream("x".to_string()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::Internal("x".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_server_errors_hide_details() {
        let err = ApiError::Internal("connection pool exhausted".to_string());
        assert_eq!(err.client_message(), "Erro interno do servidor");
        assert!(!err.client_message().contains("pool"));
    }

    #[test]
    fn test_client_errors_keep_message() {
        let err = ApiError::Validation("Quantidade deve ser positiva".to_string());
        assert_eq!(err.client_message(), "Quantidade deve ser positiva");
    }

    #[test]
    fn test_not_found_names_resource() {
        let err = ApiError::NotFound("Produto");
        assert_eq!(err.client_message(), "Produto não encontrado");
    }

    #[test]
    fn test_repository_error_mapping() {
        let err: ApiError = RepositoryError::NotFound.into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err: ApiError = RepositoryError::Conflict("E-mail já cadastrado".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.client_message(), "E-mail já cadastrado");

        let err: ApiError = RepositoryError::DataCorruption("bad row".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
