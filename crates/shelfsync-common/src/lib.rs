//! Shelfsync Common Library
//!
//! Shared types, logging, and error handling for the shelfsync workspace.
//!
//! # Overview
//!
//! This crate provides functionality used across all shelfsync members:
//!
//! - **Error Handling**: the workspace-wide error type
//! - **Logging**: tracing subscriber configuration and initialization
//! - **Records**: the in-flight record and person types that extractors
//!   produce and the sync commands consume

pub mod error;
pub mod logging;
pub mod record;

// Re-export commonly used types
pub use error::{Result, ShelfsyncError};
pub use record::{Person, Record, RecordKind};
