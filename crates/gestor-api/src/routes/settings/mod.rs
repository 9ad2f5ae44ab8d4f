//! Settings routes - Configuration view and monthly goal

pub mod api;
pub mod page;

pub use api::{api_settings, htmx_set_goal};
pub use page::page_settings;
