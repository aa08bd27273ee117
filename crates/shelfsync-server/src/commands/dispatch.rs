//! Identifier dispatch
//!
//! Walks the registered extractors in order, asks the first claimant to
//! extract, and routes the resulting record to the creation command for
//! its kind. An extractor that claims an identifier but finds nothing
//! behind it does not end the scan; later extractors still get a look.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use shelfsync_common::{RecordKind, ShelfsyncError};

use super::create::{CreateRecordCommand, CreateRecordError};
use crate::extract::{ExtractError, Extractor};
use crate::notion::Page;

/// Errors from dispatching an identifier
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The extracted record carries a kind no creation command is wired
    /// for. This is a deployment problem, not a caller problem.
    #[error("no handler registered: {0}")]
    UnregisteredKind(ShelfsyncError),

    /// The extracted record has no usable `type` discriminator at all,
    /// pointing at a broken extractor rather than missing wiring.
    #[error("extracted record is malformed: {0}")]
    MalformedRecord(ShelfsyncError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Create(#[from] CreateRecordError),
}

/// Routes an identifier through extraction into the right collection.
pub struct DispatchCommand {
    extractors: Vec<Box<dyn Extractor>>,
    create_podcast: Arc<CreateRecordCommand>,
    create_book: Arc<CreateRecordCommand>,
}

impl DispatchCommand {
    pub fn new(
        extractors: Vec<Box<dyn Extractor>>,
        create_podcast: Arc<CreateRecordCommand>,
        create_book: Arc<CreateRecordCommand>,
    ) -> Self {
        Self {
            extractors,
            create_podcast,
            create_book,
        }
    }

    /// Try each extractor in registration order. `Ok(None)` means no
    /// extractor produced a record for this identifier.
    #[tracing::instrument(skip(self))]
    pub async fn execute(&self, identifier: &str) -> Result<Option<Page>, DispatchError> {
        for extractor in &self.extractors {
            if !extractor.matches(identifier) {
                continue;
            }

            let Some(record) = extractor.extract(identifier).await? else {
                debug!(%identifier, "extractor claimed the identifier but found nothing");
                continue;
            };

            let kind = record.kind().map_err(|e| match e {
                ShelfsyncError::UnknownRecordKind(_) => DispatchError::UnregisteredKind(e),
                other => DispatchError::MalformedRecord(other),
            })?;
            info!(%identifier, ?kind, "record extracted, persisting");
            let page = match kind {
                RecordKind::Podcast => self.create_podcast.execute(&record).await?,
                RecordKind::Book => self.create_book.execute(&record).await?,
            };
            return Ok(Some(page));
        }

        info!(%identifier, "no extractor produced a record");
        Ok(None)
    }
}
