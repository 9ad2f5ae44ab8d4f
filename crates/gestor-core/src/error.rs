//! Error types for gestor-core
//!
//! This module provides error handling for the ledger: error codes,
//! severities, detailed messages with suggestions, and a logger seam.

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

use crate::validation::FormErrors;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Transaction not found
    TransactionNotFound,
    /// Fixed expense not found
    FixedExpenseNotFound,
    /// Monthly report not found
    ReportNotFound,
    /// Form validation failed
    ValidationError,
    /// Month already has a closing
    MonthAlreadyClosed,
    /// Month has no transactions to close
    NothingToClose,
    /// Duplicate entry
    DuplicateEntry,
    /// IO error
    IoError,
    /// Invalid data format
    InvalidFormat,
    /// Configuration error
    ConfigError,
    /// Internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::TransactionNotFound => write!(f, "TRANSACTION_NOT_FOUND"),
            ErrorCode::FixedExpenseNotFound => write!(f, "FIXED_EXPENSE_NOT_FOUND"),
            ErrorCode::ReportNotFound => write!(f, "REPORT_NOT_FOUND"),
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::MonthAlreadyClosed => write!(f, "MONTH_ALREADY_CLOSED"),
            ErrorCode::NothingToClose => write!(f, "NOTHING_TO_CLOSE"),
            ErrorCode::DuplicateEntry => write!(f, "DUPLICATE_ENTRY"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
            ErrorCode::InvalidFormat => write!(f, "INVALID_FORMAT"),
            ErrorCode::ConfigError => write!(f, "CONFIG_ERROR"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational
    Info,
    /// Warning - operation rejected, state unchanged
    Warning,
    /// Error - operation failed
    Error,
    /// Critical - application may be unstable
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for gestor-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Transaction not found: {id}")]
    TransactionNotFound { id: String },

    #[error("Fixed expense not found: {id}")]
    FixedExpenseNotFound { id: String },

    #[error("Monthly report not found: {id}")]
    ReportNotFound { id: String },

    #[error("Validation error: {errors}")]
    ValidationError { errors: FormErrors },

    #[error("Month {month} is already closed")]
    MonthAlreadyClosed { month: String },

    #[error("Month {month} has no transactions to close")]
    NothingToClose { month: String },

    #[error("Duplicate entry: {entry}")]
    DuplicateEntry { entry: String },

    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::TransactionNotFound { .. } => ErrorCode::TransactionNotFound,
            CoreError::FixedExpenseNotFound { .. } => ErrorCode::FixedExpenseNotFound,
            CoreError::ReportNotFound { .. } => ErrorCode::ReportNotFound,
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::MonthAlreadyClosed { .. } => ErrorCode::MonthAlreadyClosed,
            CoreError::NothingToClose { .. } => ErrorCode::NothingToClose,
            CoreError::DuplicateEntry { .. } => ErrorCode::DuplicateEntry,
            CoreError::IoError { .. } => ErrorCode::IoError,
            CoreError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            CoreError::ConfigError { .. } => ErrorCode::ConfigError,
            CoreError::InternalError { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::TransactionNotFound { .. }
            | CoreError::FixedExpenseNotFound { .. }
            | CoreError::ReportNotFound { .. } => ErrorSeverity::Info,
            CoreError::ValidationError { .. }
            | CoreError::MonthAlreadyClosed { .. }
            | CoreError::NothingToClose { .. }
            | CoreError::DuplicateEntry { .. } => ErrorSeverity::Warning,
            CoreError::IoError { .. } | CoreError::InvalidFormat { .. } => ErrorSeverity::Error,
            CoreError::ConfigError { .. } | CoreError::InternalError { .. } => {
                ErrorSeverity::Critical
            }
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::TransactionNotFound { .. } => {
                details = details
                    .with_suggestion("Check if the transaction ID is correct.".to_string())
                    .with_suggestion(
                        "Use the /api/transactions endpoint to list all transactions.".to_string(),
                    );
            }
            CoreError::FixedExpenseNotFound { .. } => {
                details = details.with_suggestion(
                    "Use the /api/fixed endpoint to list all fixed expenses.".to_string(),
                );
            }
            CoreError::ValidationError { errors } => {
                details = details.with_detail(serde_json::json!({ "fields": errors }));
                details = details
                    .with_suggestion("Correct the highlighted fields and try again.".to_string());
            }
            CoreError::MonthAlreadyClosed { month } => {
                details = details.with_suggestion(format!(
                    "Delete the existing closing for {} in the history view first.",
                    month
                ));
            }
            CoreError::NothingToClose { .. } => {
                details = details.with_suggestion(
                    "Add transactions dated in that month before closing it.".to_string(),
                );
            }
            CoreError::InvalidFormat { .. } => {
                details = details
                    .with_suggestion("Check that the ledger file is valid JSON.".to_string())
                    .with_suggestion(
                        "Restore the .bak copy next to the ledger file if one exists.".to_string(),
                    );
            }
            CoreError::IoError { .. } => {
                details = details.with_suggestion(
                    "Ensure the data directory exists and is writable.".to_string(),
                );
            }
            _ => {}
        }

        details
    }

    /// Field-scoped messages for errors a form can show next to its inputs
    ///
    /// A date in an already closed month is reported on the `date` field.
    pub fn into_form_errors(self) -> Result<FormErrors, CoreError> {
        match self {
            CoreError::ValidationError { errors } => Ok(errors),
            CoreError::MonthAlreadyClosed { month } => {
                let mut errors = FormErrors::new();
                errors.insert(
                    "date",
                    &format!("O mês {} já foi fechado; escolha outra data", month),
                );
                Ok(errors)
            }
            other => Err(other),
        }
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<io::Error> for CoreError {
    fn from(error: io::Error) -> Self {
        CoreError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(error: serde_json::Error) -> Self {
        CoreError::InvalidFormat {
            message: error.to_string(),
        }
    }
}

impl From<FormErrors> for CoreError {
    fn from(errors: FormErrors) -> Self {
        CoreError::ValidationError { errors }
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Request ID for tracing
    pub request_id: Option<String>,
    /// Operation being performed
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: String) -> Self {
        Self {
            request_id: None,
            operation,
            data: serde_json::json!({}),
        }
    }

    /// Add request ID
    pub fn with_request_id(mut self, request_id: String) -> Self {
        self.request_id = Some(request_id);
        self
    }

    /// Add context data
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log a warning
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        match error.severity() {
            ErrorSeverity::Info | ErrorSeverity::Warning => log::warn!(
                target: "gestor::error",
                "{} [{}] {} - Operation: {} - Data: {}",
                error.severity(),
                error.code(),
                error,
                context.operation,
                context.data
            ),
            ErrorSeverity::Error | ErrorSeverity::Critical => log::error!(
                target: "gestor::error",
                "{} [{}] {} - Operation: {} - Data: {}",
                error.severity(),
                error.code(),
                error.to_details(),
                context.operation,
                context.data
            ),
        }
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "gestor::error",
            "WARNING: {} - Operation: {} - Request: {:?}",
            message,
            context.operation,
            context.request_id
        );
    }
}

// ==================== Tests ====================
