//! Session management and persistence for Panelforge
//!
//! This crate provides the generation-context core:
//! - Sessions with bounded conversation history and image ledgers
//! - Context selection for generation calls
//! - Durable per-session storage with a local filesystem backend
//! - Session lifecycle coordination (create, list, delete, cleanup)

pub mod manager;
pub mod session;
pub mod storage;

pub use manager::SessionManager;
pub use session::{
    ApiMessage, Message, Role, Session, SessionConfig, SessionMetadata, SessionSummary,
    DEFAULT_MAX_HISTORY, DEFAULT_TIMEOUT_HOURS, SESSION_ID_LENGTH, TIMESTAMP_FORMAT,
};
pub use storage::{
    LocalSessionStore, SessionListing, SessionStore, SkipReason, StorageError, StorageResult,
};
