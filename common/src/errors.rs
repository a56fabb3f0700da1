// Error handling framework: one enum per failure domain

use thiserror::Error;

/// Marketplace lookup failures. Always transient from the core's point of
/// view: the vehicle is skipped for the cycle and retried on the next tick.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Marketplace request failed: {0}")]
    RequestFailed(String),

    #[error("Marketplace returned status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Failed to decode marketplace response: {0}")]
    DecodeFailed(String),
}

/// Database-specific errors for the vehicle ledger and subscriber directory.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Database health check failed: {0}")]
    HealthCheckFailed(String),

    #[error("Query execution failed: {0}")]
    QueryFailed(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Duplicate key violation: {0}")]
    DuplicateKey(String),

    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

/// Per-subscriber notification delivery failures. Logged and dropped; never
/// propagated past the dispatcher.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Alert delivery request failed: {0}")]
    RequestFailed(String),

    #[error("Alert consumer responded with status {0}, expected 204")]
    UnexpectedStatus(u16),
}

/// Validation errors for inbound subscription requests.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Subscription service failures surfaced to the API layer.
#[derive(Error, Debug)]
pub enum SubscriptionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// API response error type for HTTP responses
#[derive(Debug, serde::Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::new("VALIDATION_ERROR", err.to_string())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        let code = match err {
            DatabaseError::NotFound(_) => "NOT_FOUND",
            DatabaseError::DuplicateKey(_) => "CONFLICT",
            _ => "DATABASE_ERROR",
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<SubscriptionError> for ApiError {
    fn from(err: SubscriptionError) -> Self {
        match err {
            SubscriptionError::Validation(e) => e.into(),
            SubscriptionError::Database(e) => e.into(),
        }
    }
}

// Implement From for common external errors
impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(code) = db_err.code() {
                    match code.as_ref() {
                        "23505" => DatabaseError::DuplicateKey(db_err.message().to_string()),
                        "23503" => DatabaseError::ForeignKeyViolation(db_err.message().to_string()),
                        _ => DatabaseError::QueryFailed(db_err.message().to_string()),
                    }
                } else {
                    DatabaseError::QueryFailed(db_err.message().to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::DecodeFailed(err.to_string())
        } else {
            FetchError::RequestFailed(err.to_string())
        }
    }
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        DeliveryError::RequestFailed(err.to_string())
    }
}
