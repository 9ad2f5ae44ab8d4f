//! Error types for gestor-export

use gestor_core::ErrorSeverity;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for export failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExportErrorCode {
    /// Nothing to export
    EmptyExport,
    /// CSV writer failed
    CsvError,
    /// PDF rendering failed
    PdfError,
}

impl std::fmt::Display for ExportErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportErrorCode::EmptyExport => write!(f, "EMPTY_EXPORT"),
            ExportErrorCode::CsvError => write!(f, "CSV_ERROR"),
            ExportErrorCode::PdfError => write!(f, "PDF_ERROR"),
        }
    }
}

/// Export error type
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Nothing to export: {what}")]
    Empty { what: String },

    #[error("CSV export failed: {message}")]
    Csv { message: String },

    #[error("PDF export failed: {message}")]
    Pdf { message: String },
}

impl ExportError {
    pub fn code(&self) -> ExportErrorCode {
        match self {
            ExportError::Empty { .. } => ExportErrorCode::EmptyExport,
            ExportError::Csv { .. } => ExportErrorCode::CsvError,
            ExportError::Pdf { .. } => ExportErrorCode::PdfError,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ExportError::Empty { .. } => ErrorSeverity::Info,
            ExportError::Csv { .. } | ExportError::Pdf { .. } => ErrorSeverity::Error,
        }
    }

    /// Message suitable for showing to the user
    pub fn user_message(&self) -> &'static str {
        match self {
            ExportError::Empty { .. } => "Não há dados para exportar com os filtros atuais.",
            ExportError::Csv { .. } => "Erro ao gerar CSV.",
            ExportError::Pdf { .. } => "Erro ao gerar PDF.",
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(error: csv::Error) -> Self {
        ExportError::Csv {
            message: error.to_string(),
        }
    }
}

impl From<printpdf::Error> for ExportError {
    fn from(error: printpdf::Error) -> Self {
        ExportError::Pdf {
            message: error.to_string(),
        }
    }
}

/// Result type with ExportError
pub type ExportResult<T> = Result<T, ExportError>;
