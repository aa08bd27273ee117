//! Persistence gateways over the Notion backend
//!
//! One [`Database`] per Notion collection, generic over a [`Schema`] that
//! maps generic record attributes to that collection's columns. Attributes
//! the schema does not map are dropped silently, so extractors are free to
//! attach diagnostic fields without affecting persistence.
//!
//! The sync commands depend on the object-safe [`PageStore`] trait rather
//! than on `Database` directly; tests substitute an in-memory store.

use async_trait::async_trait;
use serde_json::Value;
use std::marker::PhantomData;
use tracing::debug;

use shelfsync_common::Record;

use crate::notion::{NewPage, NotionClient, NotionError, Page, PageFilter, PageIcon, PropertyValue};

pub mod schema;

pub use schema::{BookSchema, PersonSchema, PodcastSchema, SourceSchema};

/// Attribute-to-column mapping for one collection.
pub trait Schema: Send + Sync + 'static {
    /// Attribute name used for exact-match deduplication lookups.
    const NATURAL_KEY: &'static str;

    /// Column the natural key lives in on the Notion side.
    const NATURAL_KEY_COLUMN: &'static str;

    /// Map one attribute to its column and wire value. `None` drops the
    /// attribute.
    fn property(name: &str, value: &Value) -> Option<(&'static str, PropertyValue)>;
}

/// Backend persistence capability, one instance per collection.
#[async_trait]
pub trait PageStore: Send + Sync {
    async fn create_page(&self, record: &Record) -> Result<Page, NotionError>;

    /// Exact-match query; empty vec (never an error) when nothing matches.
    async fn query_pages(&self, filter: &PageFilter) -> Result<Vec<Page>, NotionError>;

    async fn update_page(&self, page_id: &str, record: &Record) -> Result<Page, NotionError>;

    /// Soft delete: the page is archived, not removed.
    async fn delete_page(&self, page_id: &str) -> Result<(), NotionError>;
}

/// A Notion database holding one entity kind.
#[derive(Debug, Clone)]
pub struct Database<S: Schema> {
    client: NotionClient,
    database_id: String,
    _schema: PhantomData<S>,
}

impl<S: Schema> Database<S> {
    pub fn new(client: NotionClient, database_id: impl Into<String>) -> Self {
        Self {
            client,
            database_id: database_id.into(),
            _schema: PhantomData,
        }
    }

    /// Format a record into a page payload: mapped attributes become
    /// properties, the icon/cover attributes become page decoration.
    fn to_new_page(&self, record: &Record) -> NewPage {
        let mut page = NewPage::new(&self.database_id);

        for (name, value) in record.iter() {
            match S::property(name, value) {
                Some((column, property)) => {
                    page = page.property(column, property);
                }
                None => debug!(attribute = %name, "attribute not mapped by schema, dropping"),
            }
        }

        let icon = record
            .get_str("icon_url")
            .map(|url| PageIcon::External(url.to_string()))
            .or_else(|| {
                record
                    .get_str("icon_emoji")
                    .map(|emoji| PageIcon::Emoji(emoji.to_string()))
            });

        page.icon(icon)
            .cover_url(record.get_str("cover_url").map(str::to_string))
    }
}

#[async_trait]
impl<S: Schema> PageStore for Database<S> {
    async fn create_page(&self, record: &Record) -> Result<Page, NotionError> {
        let payload = self.to_new_page(record).to_json();
        self.client.create_page(&payload).await
    }

    async fn query_pages(&self, filter: &PageFilter) -> Result<Vec<Page>, NotionError> {
        self.client
            .query_database(&self.database_id, &filter.to_json())
            .await
    }

    async fn update_page(&self, page_id: &str, record: &Record) -> Result<Page, NotionError> {
        let properties = self.to_new_page(record).properties_json();
        let payload = serde_json::json!({ "properties": properties });
        self.client.update_page(page_id, &payload).await
    }

    async fn delete_page(&self, page_id: &str) -> Result<(), NotionError> {
        self.client.archive_page(page_id).await
    }
}
