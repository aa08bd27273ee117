//! Metadata extractors
//!
//! An [`Extractor`] claims identifiers via [`Extractor::matches`] and pulls
//! a normalized [`Record`] for them. `Ok(None)` is the first-class "absent"
//! outcome: the identifier looked right but the upstream source had nothing
//! for it, and dispatch should keep scanning other extractors.

use async_trait::async_trait;
use thiserror::Error;

use shelfsync_common::Record;

pub mod douban;
pub mod zhongdu;

pub use douban::DoubanBookExtractor;
pub use zhongdu::ZhongduExtractor;

/// Errors from an extractor's upstream fetch or parse
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("upstream request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to parse upstream response: {0}")]
    Parse(String),
}

/// Capability to turn an external identifier into a record.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Whether this extractor understands the identifier's shape. Cheap
    /// and purely syntactic; no network traffic.
    fn matches(&self, identifier: &str) -> bool;

    /// Fetch and normalize metadata. `Ok(None)` when the upstream source
    /// has no data for this identifier.
    async fn extract(&self, identifier: &str) -> Result<Option<Record>, ExtractError>;
}
