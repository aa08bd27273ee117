//! Composite record creation
//!
//! Persists one composite record (podcast episode, book) into its target
//! collection, deduplicating on title. Embedded references are resolved
//! first, in a fixed order: source facet, then authors, then translators.
//! Rows created by those earlier steps stay in the backend even when a
//! later step fails; there is no compensating rollback.

use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use shelfsync_common::{record::attr, Record, ShelfsyncError};

use super::resolve::{ResolveError, ResolveIdCommand};
use crate::notion::{NotionError, Page, PageFilter};
use crate::store::PageStore;

/// Errors from composite creation
#[derive(Debug, Error)]
pub enum CreateRecordError {
    #[error("record has no title")]
    MissingTitle,

    #[error("record is malformed: {0}")]
    Invalid(#[from] ShelfsyncError),

    #[error("reference resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Store(#[from] NotionError),
}

/// Find-or-create one composite record in a target collection.
pub struct CreateRecordCommand {
    resolve_source: Arc<ResolveIdCommand>,
    resolve_person: Arc<ResolveIdCommand>,
    store: Arc<dyn PageStore>,
    /// Column holding the title in the target collection.
    title_column: &'static str,
    /// Serializes the title query+create window so two concurrent
    /// dispatches of one identifier cannot both miss and both create.
    lock: Mutex<()>,
}

impl CreateRecordCommand {
    pub fn new(
        resolve_source: Arc<ResolveIdCommand>,
        resolve_person: Arc<ResolveIdCommand>,
        store: Arc<dyn PageStore>,
    ) -> Self {
        Self {
            resolve_source,
            resolve_person,
            store,
            title_column: "Title",
            lock: Mutex::new(()),
        }
    }

    /// Persist the record, resolving references first. Returns the
    /// existing row untouched when one with the same title is already
    /// present; a repeat call with different embedded data does not
    /// refresh it.
    #[tracing::instrument(skip(self, record), fields(title = record.title().unwrap_or("<none>")))]
    pub async fn execute(&self, record: &Record) -> Result<Page, CreateRecordError> {
        // The source facet is resolved unconditionally, before the title
        // check: a found-existing composite still finds-or-creates its
        // source row.
        let source_id = self.resolve_source.execute(record).await?;

        let authors = record.people(attr::AUTHOR)?.unwrap_or_default();
        let author_ids = self.resolve_person.execute_all(&authors).await?;

        let translator_ids = match record.people(attr::TRANSLATOR)? {
            Some(translators) => Some(self.resolve_person.execute_all(&translators).await?),
            None => None,
        };

        let resolved = Self::resolve_references(record, &source_id, author_ids, translator_ids);

        let title = record.title().ok_or(CreateRecordError::MissingTitle)?;

        let _guard = self.lock.lock().await;

        let existing = self
            .store
            .query_pages(&PageFilter::equals(self.title_column, title))
            .await?;
        if let Some(page) = existing.into_iter().next() {
            debug!(%title, id = %page.id, "composite already present, returning stored row");
            return Ok(page);
        }

        let page = self.store.create_page(&resolved).await?;
        debug!(%title, id = %page.id, "composite created");
        Ok(page)
    }

    /// Build the persistable form of the record: people lists become id
    /// lists and the source relation is attached. The input record is left
    /// untouched.
    fn resolve_references(
        record: &Record,
        source_id: &str,
        author_ids: Vec<String>,
        translator_ids: Option<Vec<String>>,
    ) -> Record {
        let mut resolved = record.clone();
        resolved.set(attr::AUTHOR, json!(author_ids));
        if let Some(translator_ids) = translator_ids {
            resolved.set(attr::TRANSLATOR, json!(translator_ids));
        }
        resolved.set(attr::SOURCE_ID, source_id);
        resolved
    }
}
