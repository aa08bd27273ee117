//! Notion backend integration
//!
//! Wire-level types and the HTTP client for the Notion API. The rest of
//! the server talks to Notion through [`crate::store`]; nothing above the
//! store layer should build Notion payloads directly.

pub mod client;
pub mod page;
pub mod property;

pub use client::{NotionClient, NotionError};
pub use page::{NewPage, Page, PageIcon};
pub use property::{PageFilter, PropertyValue};

/// Build the create-page endpoint URL
pub fn pages_url(base_url: &str) -> String {
    format!("{}/v1/pages", base_url)
}

/// Build the update/archive endpoint URL for one page
pub fn page_url(base_url: &str, page_id: &str) -> String {
    format!("{}/v1/pages/{}", base_url, page_id)
}

/// Build the query endpoint URL for one database
pub fn database_query_url(base_url: &str, database_id: &str) -> String {
    format!("{}/v1/databases/{}/query", base_url, database_id)
}
