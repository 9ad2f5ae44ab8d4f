//! Route modules for the API server
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API endpoints, HTMX form posts and downloads
//! - page.rs: HTMX page rendering

pub mod annual;
pub mod dashboard;
pub mod fixed;
pub mod history;
pub mod insights;
pub mod settings;
pub mod transactions;
