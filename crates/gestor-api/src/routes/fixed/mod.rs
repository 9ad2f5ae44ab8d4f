//! Fixed expense routes - Recurring expenses and due dates
//!
//! Structure:
//! - api.rs: JSON API and form posts
//! - page.rs: Page, list partial and forms

pub mod api;
pub mod page;

pub use api::{api_fixed, api_upcoming, htmx_fixed_delete, htmx_fixed_store, htmx_fixed_update};

pub use page::{htmx_fixed_create_form, htmx_fixed_edit_form, htmx_fixed_list, page_fixed};
