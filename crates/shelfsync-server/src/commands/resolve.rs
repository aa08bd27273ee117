//! Identity resolution
//!
//! Find-or-create for deduplicated entities (sources, people). Every call
//! re-queries the backend; there is no cache of previously resolved ids.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use shelfsync_common::{Person, Record};

use crate::notion::{NotionError, PageFilter};
use crate::store::{PageStore, PersonSchema, Schema, SourceSchema};

/// Errors from identity resolution
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("record is missing its natural key attribute '{0}'")]
    MissingNaturalKey(&'static str),

    #[error(transparent)]
    Store(#[from] NotionError),
}

/// Find-or-create one entity by natural key; returns its page id.
pub struct ResolveIdCommand {
    store: Arc<dyn PageStore>,
    key_attr: &'static str,
    key_column: &'static str,
    /// Serializes the query+create window so two concurrent resolutions of
    /// the same key cannot both miss and both create.
    lock: Mutex<()>,
}

impl ResolveIdCommand {
    pub fn new(
        store: Arc<dyn PageStore>,
        key_attr: &'static str,
        key_column: &'static str,
    ) -> Self {
        Self {
            store,
            key_attr,
            key_column,
            lock: Mutex::new(()),
        }
    }

    /// Resolver for the sources collection (keyed by title).
    pub fn for_sources(store: Arc<dyn PageStore>) -> Self {
        Self::new(
            store,
            SourceSchema::NATURAL_KEY,
            SourceSchema::NATURAL_KEY_COLUMN,
        )
    }

    /// Resolver for the people collection (keyed by name).
    pub fn for_people(store: Arc<dyn PageStore>) -> Self {
        Self::new(
            store,
            PersonSchema::NATURAL_KEY,
            PersonSchema::NATURAL_KEY_COLUMN,
        )
    }

    /// Resolve one candidate to a stable id, creating a row when no
    /// exact-match row exists. Multiple matches are not an error; the
    /// first row the backend returns wins.
    #[tracing::instrument(skip(self, record), fields(key_attr = self.key_attr))]
    pub async fn execute(&self, record: &Record) -> Result<String, ResolveError> {
        let key = record
            .get_str(self.key_attr)
            .ok_or(ResolveError::MissingNaturalKey(self.key_attr))?;

        let _guard = self.lock.lock().await;

        let filter = PageFilter::equals(self.key_column, key);
        let pages = self.store.query_pages(&filter).await?;
        if let Some(page) = pages.into_iter().next() {
            debug!(%key, id = %page.id, "entity already present");
            return Ok(page.id);
        }

        let page = self.store.create_page(record).await?;
        debug!(%key, id = %page.id, "entity created");
        Ok(page.id)
    }

    /// Resolve an ordered list of people to an equally ordered list of
    /// ids.
    pub async fn execute_all(&self, people: &[Person]) -> Result<Vec<String>, ResolveError> {
        let mut ids = Vec::with_capacity(people.len());
        for person in people {
            ids.push(self.execute(&person.to_record()).await?);
        }
        Ok(ids)
    }
}
