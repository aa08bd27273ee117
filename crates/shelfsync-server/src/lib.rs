//! Shelfsync Server Library
//!
//! HTTP service that syncs book and podcast metadata into a Notion
//! workspace.
//!
//! # Overview
//!
//! An identifier (a share URL or an ISBN) comes in over HTTP, an extractor
//! pulls a metadata record from the platform behind it, and the command
//! layer persists that record into the right Notion collection:
//!
//! - **Extractors**: per-platform scrapers that turn an identifier into a
//!   metadata record
//! - **Commands**: find-or-create orchestration over the Notion collections
//! - **Stores**: typed gateways mapping records onto Notion page properties
//! - **API**: the ingestion endpoint and response envelopes
//!
//! # Idempotency
//!
//! Every collection is deduplicated on a natural key (title for sources and
//! composites, name for people). Posting the same identifier twice returns
//! the row created the first time; nothing is updated in place.
//!
//! ## Framework Stack
//!
//! - **Axum**: Modern, ergonomic web framework
//! - **Reqwest**: HTTP client for the Notion API and metadata sources
//! - **Tower**: Middleware and service abstractions

pub mod api;
pub mod commands;
pub mod config;
pub mod extract;
pub mod notion;
pub mod store;

// Re-export commonly used types
pub use api::{AppError, AppState};
pub use commands::{CreateRecordCommand, DispatchCommand, ResolveIdCommand};
