//! History routes - Monthly closings and PDF export
//!
//! Structure:
//! - api.rs: JSON API, close/delete actions and PDF download
//! - page.rs: Page and content partial

pub mod api;
pub mod page;

pub use api::{api_history, export_history_pdf, htmx_close_month, htmx_report_delete};

pub use page::{htmx_history_content, page_history};
