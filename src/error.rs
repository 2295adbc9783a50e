/// Application Error Handling
///
/// Every fallible path in the crate returns `AppError`. Domain errors are
/// grouped in their own enums and folded into `AppError` through `From`
/// impls, so `?` works across layers. At the HTTP boundary `AppError`
/// renders a JSON `ErrorResponse` and logs itself with a request id.
///
/// Credential failures are collapsed: missing, malformed,
/// expired and revoked credentials all render the same 401 body.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// ============================================================================
/// 1. DOMAIN-SPECIFIC ERROR TYPES
/// ============================================================================

/// Validation errors for input data
#[derive(Debug, Clone)]
pub enum ValidationError {
    EmptyField(String),
    TooLong(String, usize),
    InvalidFormat(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} is empty", field),
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(field) => write!(f, "{} has invalid format", field),
        }
    }
}

impl StdError for ValidationError {}

/// Storage errors
#[derive(Debug)]
pub enum DatabaseError {
    UniqueConstraintViolation(String),
    NotFound(String),
    /// The store cannot be reached. Surfaced to the caller, never retried.
    Unavailable(String),
    UnexpectedError(String),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::UniqueConstraintViolation(msg) => {
                write!(f, "Duplicate entry: {}", msg)
            }
            DatabaseError::NotFound(msg) => write!(f, "Not found: {}", msg),
            DatabaseError::Unavailable(msg) => write!(f, "Storage unavailable: {}", msg),
            DatabaseError::UnexpectedError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl StdError for DatabaseError {}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    MissingRequired(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRequired(msg) => write!(f, "Missing required config: {}", msg),
        }
    }
}

impl StdError for ConfigError {}

/// Authentication and authorization errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// Bad, expired, revoked or unknown credential
    Unauthenticated,
    /// No credential was presented at all
    MissingCredentials,
    /// Credential header present but not in the expected scheme
    Malformed,
    /// Authenticated but not entitled to the target resource
    Forbidden,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Unauthenticated => write!(f, "Unauthenticated"),
            AuthError::MissingCredentials => write!(f, "Missing credentials"),
            AuthError::Malformed => write!(f, "Malformed credentials"),
            AuthError::Forbidden => write!(f, "Forbidden"),
        }
    }
}

impl StdError for AuthError {}

/// ============================================================================
/// 2. UNIFIED APPLICATION ERROR TYPE
/// ============================================================================

#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Database(DatabaseError),
    Auth(AuthError),
    Config(ConfigError),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Database(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Config(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

// ============================================================================
// FROM IMPLEMENTATIONS
// ============================================================================

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::Database(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

/// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => {
                AppError::Database(DatabaseError::NotFound("Record not found".to_string()))
            }
            sqlx::Error::Database(db_err)
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                AppError::Database(DatabaseError::UniqueConstraintViolation(
                    db_err.message().to_string(),
                ))
            }
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => {
                AppError::Database(DatabaseError::Unavailable(err.to_string()))
            }
            _ => AppError::Database(DatabaseError::UnexpectedError(err.to_string())),
        }
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Unique error ID for correlating with server logs
    pub error_id: String,
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    pub status: u16,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: String, status: u16) -> Self {
        Self {
            error_id,
            message,
            code,
            status,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse);
    fn log_error(&self, request_id: &str);
}

impl ErrorHandler for AppError {
    fn error_response(&self, request_id: &str) -> (StatusCode, ErrorResponse) {
        let (status, code, message) = match self {
            AppError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR".to_string(),
                e.to_string(),
            ),

            AppError::Database(e) => match e {
                DatabaseError::UniqueConstraintViolation(_) => (
                    StatusCode::CONFLICT,
                    "DUPLICATE_ENTRY".to_string(),
                    "Resource already exists".to_string(),
                ),
                DatabaseError::NotFound(_) => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND".to_string(),
                    "Resource not found".to_string(),
                ),
                DatabaseError::Unavailable(_) => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORAGE_UNAVAILABLE".to_string(),
                    "Storage temporarily unavailable".to_string(),
                ),
                DatabaseError::UnexpectedError(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR".to_string(),
                    "Database error occurred".to_string(),
                ),
            },

            // No root cause leaks into the body for credential failures
            AppError::Auth(AuthError::Forbidden) => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN".to_string(),
                "Forbidden".to_string(),
            ),
            AppError::Auth(_) => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED".to_string(),
                "Access denied".to_string(),
            ),

            AppError::Config(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR".to_string(),
                "Server configuration error".to_string(),
            ),

            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR".to_string(),
                "Internal server error".to_string(),
            ),
        };

        let error_response =
            ErrorResponse::new(request_id.to_string(), message, code, status.as_u16());

        (status, error_response)
    }

    fn log_error(&self, request_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Validation error");
            }
            AppError::Database(DatabaseError::UniqueConstraintViolation(_)) => {
                tracing::warn!(request_id = request_id, error = %self, "Duplicate entry attempt");
            }
            AppError::Database(DatabaseError::NotFound(_)) => {
                tracing::info!(request_id = request_id, error = %self, "Record not found");
            }
            AppError::Database(e) => {
                tracing::error!(request_id = request_id, error = %e, "Database error");
            }
            AppError::Auth(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Authentication error");
            }
            AppError::Config(e) => {
                tracing::error!(request_id = request_id, error = %e, "Configuration error");
            }
            AppError::Internal(msg) => {
                tracing::error!(request_id = request_id, error = %msg, "Internal error");
            }
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let request_id = uuid::Uuid::new_v4().to_string();
        self.log_error(&request_id);

        let (status, error_response) = <Self as ErrorHandler>::error_response(self, &request_id);

        HttpResponse::build(status).json(error_response)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(e) => match e {
                DatabaseError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,
                DatabaseError::NotFound(_) => StatusCode::NOT_FOUND,
                DatabaseError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                DatabaseError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Auth(AuthError::Forbidden) => StatusCode::FORBIDDEN,
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// ============================================================================
// 4. ERROR CONTEXT ENRICHMENT
// ============================================================================

/// Per-operation context carried through a handler for log correlation
#[derive(Debug, Clone)]
pub struct ErrorContext {
    pub request_id: String,
    pub user_id: Option<String>,
    pub operation: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ErrorContext {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            request_id: uuid::Uuid::new_v4().to_string(),
            user_id: None,
            operation: operation.into(),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn with_user_id(mut self, user_id: String) -> Self {
        self.user_id = Some(user_id);
        self
    }
}
