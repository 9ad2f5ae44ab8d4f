//! Insights routes - Spending advice

pub mod api;
pub mod page;

pub use api::htmx_generate_insights;
pub use page::page_insights;
