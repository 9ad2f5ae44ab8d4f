//! Gestor Export - CSV and PDF downloads

pub mod csv_export;
pub mod error;
pub mod pdf_export;

pub use csv_export::{csv_filename, transactions_csv, write_transactions_csv, CSV_HEADER};
pub use error::{ExportError, ExportErrorCode, ExportResult};
pub use pdf_export::{annual_report_pdf, pdf_filename, report_row, PDF_COLUMNS};
