//! Transaction routes - Filterable list, forms, CSV export
//!
//! Structure:
//! - api.rs: JSON API, form posts and download
//! - page.rs: Page, list partials and forms

pub mod api;
pub mod page;

pub use api::{
    api_transaction_create, api_transaction_delete, api_transaction_detail, api_transactions,
    export_transactions_csv, htmx_transaction_delete, htmx_transaction_store,
    htmx_transaction_update,
};

pub use page::{
    htmx_category_options, htmx_transaction_create_form, htmx_transaction_edit_form,
    htmx_transactions_list, htmx_transactions_rows, page_transactions,
};
