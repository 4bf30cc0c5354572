/// Application Error Handling
///
/// Every handler failure is mapped to one of five categories before it
/// reaches the client:
/// 1. Validation errors (400)
/// 2. Conflict errors - duplicate username/email (400)
/// 3. Authentication errors - credentials and tokens (401/403)
/// 4. Not-found errors (404)
/// 5. Upstream errors - storage, configuration, hashing (500)
///
/// All error bodies share the `{ "message": ..., "error": ... }` shape.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;

use crate::logger::RequestId;
use std::fmt;

/// ============================================================================
/// 1. DOMAIN-SPECIFIC ERROR TYPES
/// ============================================================================

/// Validation errors for request input
#[derive(Debug, Clone)]
pub enum ValidationError {
    MissingFields,
    InvalidEmail,
    PasswordTooShort(usize),
    TooLong(&'static str, usize),
    SuspiciousContent(&'static str),
    MissingBuildFields,
    MalformedBody(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MissingFields => write!(f, "Please provide all required fields"),
            ValidationError::InvalidEmail => write!(f, "Please provide a valid email address"),
            ValidationError::PasswordTooShort(min) => {
                write!(f, "Password must be at least {} characters long", min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::SuspiciousContent(field) => {
                write!(f, "{} contains suspicious content", field)
            }
            ValidationError::MissingBuildFields => write!(f, "Please fill in all required fields"),
            ValidationError::MalformedBody(_) => write!(f, "Invalid request body"),
        }
    }
}

impl StdError for ValidationError {}

/// Uniqueness conflicts on user records
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictError {
    UsernameTaken,
    EmailTaken,
}

impl fmt::Display for ConflictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictError::UsernameTaken => write!(f, "Username already exists"),
            ConflictError::EmailTaken => write!(f, "Email already exists"),
        }
    }
}

impl StdError for ConflictError {}

/// Database operation errors
#[derive(Debug)]
pub enum DatabaseError {
    QueryExecution(String),
    ConnectionPool(String),
    UnexpectedError(String),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::QueryExecution(msg) => write!(f, "Query error: {}", msg),
            DatabaseError::ConnectionPool(msg) => write!(f, "Database connection error: {}", msg),
            DatabaseError::UnexpectedError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl StdError for DatabaseError {}

/// Configuration errors
#[derive(Debug)]
pub enum ConfigError {
    MissingRequired(String),
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRequired(msg) => write!(f, "Missing required config: {}", msg),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid config value: {}", msg),
        }
    }
}

impl StdError for ConfigError {}

/// Authentication errors
///
/// Token variants carry the verifier's message, which is surfaced to the
/// caller in the `error` field.
#[derive(Debug)]
pub enum AuthError {
    InvalidCredentials,
    MissingAccessToken,
    InvalidAccessToken(String),
    MissingRefreshToken,
    InvalidRefreshToken(String),
    UnknownUser,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthError::MissingAccessToken => write!(f, "You need to sign in before continuing"),
            AuthError::InvalidAccessToken(_) => write!(f, "Invalid token"),
            AuthError::MissingRefreshToken => write!(f, "No refresh token provided"),
            AuthError::InvalidRefreshToken(_) => write!(f, "Invalid refresh token"),
            AuthError::UnknownUser => write!(f, "User not found"),
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
    Conflict(ConflictError),
    Auth(AuthError),
    NotFound(&'static str),
    /// A path id that cannot name any record; `detail` is the parse error.
    InvalidId { message: &'static str, detail: String },
    Database(DatabaseError),
    Config(ConfigError),
    Internal(String),
    /// An upstream failure already summarised for the client by an
    /// [`ErrorContext`]; `detail` is the underlying error message.
    Upstream { message: &'static str, detail: String },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Conflict(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::NotFound(msg) => write!(f, "{}", msg),
            AppError::InvalidId { message, detail } => write!(f, "{}: {}", message, detail),
            AppError::Database(e) => write!(f, "{}", e),
            AppError::Config(e) => write!(f, "{}", e),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::Upstream { message, detail } => write!(f, "{}: {}", message, detail),
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

impl From<ConflictError> for AppError {
    fn from(err: ConflictError) -> Self {
        AppError::Conflict(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::Database(err)
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                // Unique index names come from migrations/: users_username_key, users_email_key
                let constraint = db_err.constraint().unwrap_or_default();
                if constraint.contains("email") {
                    AppError::Conflict(ConflictError::EmailTaken)
                } else {
                    AppError::Conflict(ConflictError::UsernameTaken)
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                AppError::Database(DatabaseError::ConnectionPool(err.to_string()))
            }
            sqlx::Error::Database(_) => {
                AppError::Database(DatabaseError::QueryExecution(err.to_string()))
            }
            _ => AppError::Database(DatabaseError::UnexpectedError(err.to_string())),
        }
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Internal(msg)
    }
}

// ============================================================================
// 3. HTTP RESPONSE MAPPING
// ============================================================================

/// Body of every error response
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub message: String,
    /// Underlying error detail, when there is one worth surfacing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            message: message.into(),
            error,
        }
    }
}

/// Trait for converting errors to HTTP responses with proper logging
pub trait ErrorHandler {
    fn error_response(&self) -> (StatusCode, ErrorResponse);
    fn log_error(&self, request_id: &str);
}

impl ErrorHandler for AppError {
    fn error_response(&self) -> (StatusCode, ErrorResponse) {
        let status = <Self as ResponseError>::status_code(self);

        let body = match self {
            AppError::Validation(ValidationError::MalformedBody(detail)) => {
                ErrorResponse::new("Invalid request body", Some(detail.clone()))
            }
            AppError::Validation(e) => ErrorResponse::new(e.to_string(), None),
            AppError::Conflict(e) => ErrorResponse::new(e.to_string(), None),
            AppError::Auth(e) => match e {
                AuthError::InvalidAccessToken(detail) | AuthError::InvalidRefreshToken(detail) => {
                    ErrorResponse::new(e.to_string(), Some(detail.clone()))
                }
                _ => ErrorResponse::new(e.to_string(), None),
            },
            AppError::NotFound(msg) => ErrorResponse::new(*msg, None),
            AppError::InvalidId { message, detail } => {
                ErrorResponse::new(*message, Some(detail.clone()))
            }
            AppError::Database(e) => {
                ErrorResponse::new("Database error occurred", Some(e.to_string()))
            }
            AppError::Config(_) => ErrorResponse::new("Server configuration error", None),
            AppError::Internal(msg) => {
                ErrorResponse::new("Internal server error", Some(msg.clone()))
            }
            AppError::Upstream { message, detail } => {
                ErrorResponse::new(*message, Some(detail.clone()))
            }
        };

        (status, body)
    }

    fn log_error(&self, request_id: &str) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Validation error");
            }
            AppError::Conflict(e) => {
                tracing::warn!(request_id = request_id, error = %e, "Duplicate entry attempt");
            }
            AppError::Auth(e) => match e {
                AuthError::InvalidCredentials => {
                    tracing::warn!(request_id = request_id, error = %e, "Invalid credentials attempt");
                }
                _ => {
                    tracing::warn!(request_id = request_id, error = ?e, "Authentication error");
                }
            },
            AppError::NotFound(msg) => {
                tracing::info!(request_id = request_id, error = %msg, "Resource not found");
            }
            AppError::InvalidId { detail, .. } => {
                tracing::info!(request_id = request_id, error = %detail, "Unparseable id in path");
            }
            AppError::Database(e) => {
                tracing::error!(request_id = request_id, error = %e, "Database error");
            }
            AppError::Config(e) => {
                tracing::error!(request_id = request_id, error = %e, "Configuration error");
            }
            AppError::Internal(msg) => {
                tracing::error!(request_id = request_id, error = %msg, "Internal error");
            }
            AppError::Upstream { message, detail } => {
                tracing::error!(request_id = request_id, error = %detail, "{}", message);
            }
        }
    }
}

/// Implement ResponseError for Actix-web integration
impl ResponseError for AppError {
    // Logged by `LoggerMiddleware`, which knows the request id
    fn error_response(&self) -> HttpResponse {
        let (status, body) = <Self as ErrorHandler>::error_response(self);

        HttpResponse::build(status).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
            AppError::Auth(e) => match e {
                AuthError::MissingAccessToken | AuthError::InvalidAccessToken(_) => {
                    StatusCode::FORBIDDEN
                }
                _ => StatusCode::UNAUTHORIZED,
            },
            AppError::NotFound(_) | AppError::InvalidId { .. } => StatusCode::NOT_FOUND,
            AppError::Database(_)
            | AppError::Config(_)
            | AppError::Internal(_)
            | AppError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// ============================================================================
// 4. ERROR CONTEXT ENRICHMENT
// ============================================================================

/// Per-operation context used by handlers to log failures and to give
/// upstream errors an operation-specific client message.
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

    /// Use the id `LoggerMiddleware` assigned to the request.
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id.0;
        self
    }

    pub fn with_user_id(mut self, user_id: String) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Keep client-facing errors as they are; fold storage, configuration
    /// and internal failures into `summary` with the original message as
    /// detail.
    pub fn summarize(&self, error: AppError, summary: &'static str) -> AppError {
        match error {
            AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                self.log_error(&error);
                AppError::Upstream {
                    message: summary,
                    detail: error.to_string(),
                }
            }
            other => other,
        }
    }

    pub fn log_error(&self, error: &AppError) {
        let context = serde_json::json!({
            "request_id": self.request_id,
            "operation": self.operation,
            "user_id": self.user_id,
            "timestamp": self.timestamp.to_rfc3339(),
        });

        tracing::error!(
            error = %error,
            context = ?context,
            "Operation failed"
        );
    }
}
