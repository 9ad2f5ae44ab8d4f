//! Error types for gestor-api

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use gestor_core::validation::FormErrors;
use gestor_core::{CoreError, ErrorCode, ErrorSeverity};
use gestor_export::ExportError;
use gestor_utils::escape_html;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Internal server error: {message}")]
    InternalError { message: String },
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FormErrors>,
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        ApiError::NotFound {
            resource: resource.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
        }
    }

    pub fn code(&self) -> String {
        match self {
            ApiError::NotFound { .. } => "NOT_FOUND".to_string(),
            ApiError::BadRequest { .. } => "BAD_REQUEST".to_string(),
            ApiError::Core(e) => e.code().to_string(),
            ApiError::Export(e) => e.code().to_string(),
            ApiError::InternalError { .. } => "INTERNAL_ERROR".to_string(),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ApiError::NotFound { .. } | ApiError::BadRequest { .. } => ErrorSeverity::Warning,
            ApiError::Core(e) => e.severity(),
            ApiError::Export(e) => e.severity(),
            ApiError::InternalError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Core(e) => match e.code() {
                ErrorCode::TransactionNotFound
                | ErrorCode::FixedExpenseNotFound
                | ErrorCode::ReportNotFound => StatusCode::NOT_FOUND,
                ErrorCode::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::MonthAlreadyClosed
                | ErrorCode::NothingToClose
                | ErrorCode::DuplicateEntry => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Export(ExportError::Empty { .. }) => StatusCode::NOT_FOUND,
            ApiError::Export(_) | ApiError::InternalError { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to the user on pages
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NotFound { .. } => "Registro não encontrado.".to_string(),
            ApiError::BadRequest { message } => message.clone(),
            ApiError::Core(CoreError::MonthAlreadyClosed { month }) => {
                format!("O mês {} já foi fechado.", month)
            }
            ApiError::Core(CoreError::NothingToClose { month }) => {
                format!("Não há transações em {} para fechar.", month)
            }
            ApiError::Core(CoreError::ValidationError { .. }) => {
                "Corrija os campos destacados.".to_string()
            }
            ApiError::Core(e) if e.code() == ErrorCode::IoError => {
                "Não foi possível salvar os dados.".to_string()
            }
            ApiError::Core(_) | ApiError::InternalError { .. } => {
                "Ocorreu um erro inesperado.".to_string()
            }
            ApiError::Export(e) => e.user_message().to_string(),
        }
    }

    pub fn body(&self) -> ErrorBody {
        let (suggestions, fields) = match self {
            ApiError::Core(e) => {
                let fields = match e {
                    CoreError::ValidationError { errors } => Some(errors.clone()),
                    _ => None,
                };
                (e.to_details().suggestions, fields)
            }
            _ => (Vec::new(), None),
        };
        ErrorBody {
            code: self.code(),
            message: self.to_string(),
            suggestions,
            fields,
        }
    }

    fn log(&self) {
        match self.severity() {
            ErrorSeverity::Info => log::debug!("[{}] {}", self.code(), self),
            ErrorSeverity::Warning => log::warn!("[{}] {}", self.code(), self),
            ErrorSeverity::Error | ErrorSeverity::Critical => {
                log::error!(target: "gestor::error", "[{}] {}", self.code(), self)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();
        (self.status(), Json(self.body())).into_response()
    }
}

/// Error rendered as an HTML alert, for pages and HTMX partials
#[derive(Debug)]
pub struct PageError(pub ApiError);

impl From<ApiError> for PageError {
    fn from(error: ApiError) -> Self {
        PageError(error)
    }
}

impl From<CoreError> for PageError {
    fn from(error: CoreError) -> Self {
        PageError(ApiError::Core(error))
    }
}

impl From<ExportError> for PageError {
    fn from(error: ExportError) -> Self {
        PageError(ApiError::Export(error))
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        self.0.log();
        // The base page swaps retargeted error responses into the toast container
        let fragment = error_alert(&self.0.user_message());
        let mut response = (self.0.status(), Html(fragment)).into_response();
        if let Ok(value) = axum::http::HeaderValue::from_str("#toasts") {
            response.headers_mut().insert("hx-retarget", value);
        }
        if let Ok(value) = axum::http::HeaderValue::from_str("beforeend") {
            response.headers_mut().insert("hx-reswap", value);
        }
        response
    }
}

/// Red alert box
pub fn error_alert(message: &str) -> String {
    format!(
        r#"<div class='toast bg-red-50 border border-red-200 rounded-lg p-4 shadow' role='alert'><div class='flex items-center gap-2'><span class='text-red-600'>✗</span><span class='font-medium text-red-800'>{}</span></div></div>"#,
        escape_html(message)
    )
}
