//! Sync commands
//!
//! The orchestration layer between extracted records and the persistence
//! gateways:
//!
//! - [`resolve::ResolveIdCommand`] — find-or-create one entity by natural
//!   key, returning its stable page id
//! - [`create::CreateRecordCommand`] — persist one composite record,
//!   resolving its source facet and embedded people first
//! - [`dispatch::DispatchCommand`] — pick the extractor that claims an
//!   identifier and route the extracted record to the right creation
//!   command
//!
//! Commands are wired once at startup; per-call registration does not
//! exist.

pub mod create;
pub mod dispatch;
pub mod resolve;

pub use create::{CreateRecordCommand, CreateRecordError};
pub use dispatch::{DispatchCommand, DispatchError};
pub use resolve::{ResolveIdCommand, ResolveError};

#[cfg(test)]
pub(crate) mod testing {
    //! In-memory [`PageStore`] for command tests.

    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    use shelfsync_common::Record;

    use crate::notion::{NotionError, Page, PageFilter};
    use crate::store::PageStore;

    #[derive(Default)]
    struct Inner {
        pages: Vec<(String, Record)>,
        creates: usize,
    }

    /// A fake collection keyed like its Notion counterpart: filters on
    /// `key_column` match records by `key_attr`.
    pub struct MemoryStore {
        prefix: &'static str,
        key_attr: &'static str,
        key_column: &'static str,
        inner: Mutex<Inner>,
    }

    impl MemoryStore {
        pub fn new(
            prefix: &'static str,
            key_attr: &'static str,
            key_column: &'static str,
        ) -> Arc<Self> {
            Arc::new(Self {
                prefix,
                key_attr,
                key_column,
                inner: Mutex::new(Inner::default()),
            })
        }

        /// Seed a row without counting it as a command-driven create.
        pub async fn seed(&self, record: Record) -> String {
            let mut inner = self.inner.lock().await;
            let id = format!("{}-{}", self.prefix, inner.pages.len() + 1);
            inner.pages.push((id.clone(), record));
            id
        }

        /// Rows created through `create_page` since construction.
        pub async fn created(&self) -> usize {
            self.inner.lock().await.creates
        }

        pub async fn rows(&self) -> Vec<(String, Record)> {
            self.inner.lock().await.pages.clone()
        }

        fn page_for(id: &str, record: &Record) -> Page {
            Page {
                id: id.to_string(),
                archived: false,
                properties: serde_json::to_value(record).unwrap_or(json!({})),
                url: None,
            }
        }
    }

    #[async_trait]
    impl PageStore for MemoryStore {
        async fn create_page(&self, record: &Record) -> Result<Page, NotionError> {
            let mut inner = self.inner.lock().await;
            inner.creates += 1;
            let id = format!("{}-{}", self.prefix, inner.pages.len() + 1);
            inner.pages.push((id.clone(), record.clone()));
            Ok(Self::page_for(&id, record))
        }

        async fn query_pages(&self, filter: &PageFilter) -> Result<Vec<Page>, NotionError> {
            let inner = self.inner.lock().await;
            if filter.column != self.key_column {
                return Ok(Vec::new());
            }
            Ok(inner
                .pages
                .iter()
                .filter(|(_, record)| record.get_str(self.key_attr) == Some(filter.equals.as_str()))
                .map(|(id, record)| Self::page_for(id, record))
                .collect())
        }

        async fn update_page(&self, page_id: &str, record: &Record) -> Result<Page, NotionError> {
            let mut inner = self.inner.lock().await;
            for (id, stored) in inner.pages.iter_mut() {
                if id == page_id {
                    *stored = record.clone();
                    return Ok(Self::page_for(id, stored));
                }
            }
            Err(NotionError::Api {
                status: 404,
                code: "object_not_found".to_string(),
                message: format!("no page {page_id}"),
            })
        }

        async fn delete_page(&self, page_id: &str) -> Result<(), NotionError> {
            let mut inner = self.inner.lock().await;
            inner.pages.retain(|(id, _)| id != page_id);
            Ok(())
        }
    }

    /// A store whose every call fails with a backend error, for
    /// propagation tests.
    pub struct FailingStore;

    impl FailingStore {
        fn error() -> NotionError {
            NotionError::Api {
                status: 503,
                code: "service_unavailable".to_string(),
                message: "notion is down".to_string(),
            }
        }
    }

    #[async_trait]
    impl PageStore for FailingStore {
        async fn create_page(&self, _record: &Record) -> Result<Page, NotionError> {
            Err(Self::error())
        }

        async fn query_pages(&self, _filter: &PageFilter) -> Result<Vec<Page>, NotionError> {
            Err(Self::error())
        }

        async fn update_page(&self, _page_id: &str, _record: &Record) -> Result<Page, NotionError> {
            Err(Self::error())
        }

        async fn delete_page(&self, _page_id: &str) -> Result<(), NotionError> {
            Err(Self::error())
        }
    }
}
