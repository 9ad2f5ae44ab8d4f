//! Dashboard routes - Summary cards, charts, quick add

pub mod api;
pub mod page;

pub use api::{api_dashboard, api_summary, htmx_quick_add};
pub use page::{htmx_dashboard_panels, page_dashboard};
