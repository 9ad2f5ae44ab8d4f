//! Annual routes - Year rollup of monthly closings

pub mod api;
pub mod page;

pub use api::api_annual;
pub use page::page_annual;
