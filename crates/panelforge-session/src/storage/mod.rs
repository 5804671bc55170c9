//! Session storage abstraction and implementations
//!
//! Provides trait-based storage for session persistence with a
//! local filesystem implementation.

mod local;

pub use local::LocalSessionStore;

use crate::session::{Session, SessionSummary};
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid session data: {0}")]
    InvalidData(String),

    #[error("Invalid session config: {0}")]
    InvalidConfig(String),

    #[error("Storage path not available")]
    PathUnavailable,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Why a session was left out of a listing
#[derive(Debug)]
pub enum SkipReason {
    /// Directory present but no record file inside
    MissingRecord(PathBuf),

    /// Record present but unreadable or unparsable
    Unreadable(PathBuf, StorageError),
}

/// Result of enumerating a store
///
/// Listing is lenient: a corrupt session must not block enumeration of the
/// others. Skipped entries are tallied here instead of raised, so callers
/// that care can still see them.
#[derive(Debug, Default)]
pub struct SessionListing {
    /// Summaries of readable sessions, sorted by last update, newest first
    pub summaries: Vec<SessionSummary>,

    /// Sessions omitted from the listing, with the reason for each
    pub skipped: Vec<SkipReason>,
}

impl SessionListing {
    /// Number of sessions omitted from the listing
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Session storage trait for different backends
///
/// No locking or version check is performed anywhere: concurrent
/// load-mutate-save sequences on the same identifier race, and the later
/// save wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Overwrite the persisted record for the session's identifier
    ///
    /// Not atomic: a crash mid-save may leave the record truncated.
    async fn save(&self, session: &Session) -> StorageResult<()>;

    /// Load a session by ID, failing with `NotFound` if no record exists
    async fn load(&self, id: &str) -> StorageResult<Session>;

    /// Remove the session's entire subtree; no-op if already absent
    async fn delete(&self, id: &str) -> StorageResult<()>;

    /// Check if a session record exists
    async fn exists(&self, id: &str) -> StorageResult<bool>;

    /// Enumerate all persisted sessions, newest first
    async fn list(&self) -> StorageResult<SessionListing>;

    /// Directory a session's record and image folders live under
    fn session_dir(&self, id: &str) -> PathBuf;
}
