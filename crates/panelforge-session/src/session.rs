//! Session data structures
//!
//! Defines the core types for generation-context management:
//! - Session: conversation history plus image ledgers for one generation context
//! - SessionConfig: per-session tuning, fixed for the session's lifetime
//! - Message / ApiMessage: stored message vs. the projection sent to the API
//! - SessionSummary: lightweight session info for listing

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::storage::{StorageError, StorageResult};

/// Default number of user/assistant exchanges retained per session
pub const DEFAULT_MAX_HISTORY: usize = 10;

/// Default age in hours after which a session is considered stale
pub const DEFAULT_TIMEOUT_HOURS: i64 = 24;

/// Length of generated session identifiers
pub const SESSION_ID_LENGTH: usize = 8;

/// Timestamp format used in file names (reference copies, generated images)
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Session configuration
///
/// Fixed once the session is created; reloaded verbatim from the
/// persisted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Maximum number of exchanges to keep in history.
    /// The raw message cap is twice this value (user + assistant per exchange).
    pub max_history: usize,

    /// Copy reference images into the session's `references/` directory
    pub save_references: bool,

    /// Whether the session is eligible for automatic cleanup sweeps
    pub auto_cleanup: bool,

    /// Age in hours before the session counts as stale
    pub timeout_hours: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
            save_references: true,
            auto_cleanup: false,
            timeout_hours: DEFAULT_TIMEOUT_HOURS,
        }
    }
}

impl SessionConfig {
    /// Create a validated configuration
    pub fn new(
        max_history: usize,
        save_references: bool,
        auto_cleanup: bool,
        timeout_hours: i64,
    ) -> StorageResult<Self> {
        let config = Self {
            max_history,
            save_references,
            auto_cleanup,
            timeout_hours,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration values
    pub fn validate(&self) -> StorageResult<()> {
        if self.max_history == 0 {
            return Err(StorageError::InvalidConfig(
                "maxHistory must be at least 1".to_string(),
            ));
        }
        if self.timeout_hours <= 0 {
            return Err(StorageError::InvalidConfig(
                "timeoutHours must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Maximum raw message count retained in history
    pub fn message_cap(&self) -> usize {
        self.max_history * 2
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User prompt
    User,
    /// Model response
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// A stored conversation message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message role
    pub role: Role,

    /// Message content
    pub content: String,

    /// When the message was recorded
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a new message stamped with the current time
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Project to the shape generation calls expect
    pub fn to_api(&self) -> ApiMessage {
        ApiMessage {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// Message projection sent to the generation API (timestamps stripped)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Message role
    pub role: Role,
    /// Message content
    pub content: String,
}

/// Session metadata tracked across mutations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Refreshed on every mutation
    pub last_updated_at: DateTime<Utc>,

    /// Number of completed generation calls recorded against this session
    pub generation_count: u64,
}

impl Default for SessionMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            last_updated_at: now,
            generation_count: 0,
        }
    }
}

impl SessionMetadata {
    /// Refresh the last-updated timestamp
    pub fn touch(&mut self) {
        self.last_updated_at = Utc::now();
    }
}

/// Lightweight session projection for listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Session identifier
    pub id: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last mutation timestamp
    pub last_updated_at: DateTime<Utc>,

    /// Completed generation calls
    pub generation_count: u64,

    /// Messages currently retained
    pub message_count: usize,

    /// Generated images recorded
    pub generated_image_count: usize,

    /// Reference images recorded
    pub reference_image_count: usize,

    /// Directory holding the session's record and image folders
    pub path: PathBuf,
}

/// A generation session: bounded conversation history, image ledgers,
/// and metadata, bound to an on-disk directory
///
/// Sessions are created and reloaded through a [`crate::SessionManager`];
/// the on-disk record is the durable projection of this struct. At most one
/// in-memory copy per identifier should be mutated at a time: saves are
/// last-writer-wins, with no locking or version check.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Unique session identifier
    pub(crate) id: String,

    /// Conversation history, bounded by `config.max_history * 2`
    #[serde(default)]
    pub(crate) messages: Vec<Message>,

    /// Paths of images produced during this session, append only
    #[serde(default)]
    pub(crate) generated_images: Vec<PathBuf>,

    /// Paths of input reference images, append only
    #[serde(default)]
    pub(crate) reference_images: Vec<PathBuf>,

    /// Timestamps and generation counter
    #[serde(default)]
    pub(crate) metadata: SessionMetadata,

    /// Per-session configuration, fixed at creation
    #[serde(default)]
    pub(crate) config: SessionConfig,

    /// Directory assigned by the owning store; not part of the record
    #[serde(skip)]
    pub(crate) root: PathBuf,
}

impl Session {
    /// Create a fresh session bound to a directory
    pub fn new(id: impl Into<String>, config: SessionConfig, root: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            messages: Vec::new(),
            generated_images: Vec::new(),
            reference_images: Vec::new(),
            metadata: SessionMetadata::default(),
            config,
            root: root.into(),
        }
    }

    /// Session identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Directory holding this session's record and image folders
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn bind_root(&mut self, root: PathBuf) {
        self.root = root;
    }

    /// Directory for generated images
    pub fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    /// Directory for copied reference images
    pub fn references_dir(&self) -> PathBuf {
        self.root.join("references")
    }

    /// Session configuration
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Session metadata
    pub fn metadata(&self) -> &SessionMetadata {
        &self.metadata
    }

    /// Retained conversation history
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Recorded generated-image paths
    pub fn generated_images(&self) -> &[PathBuf] {
        &self.generated_images
    }

    /// Recorded reference-image paths
    pub fn reference_images(&self) -> &[PathBuf] {
        &self.reference_images
    }

    /// Append a message to the conversation history
    ///
    /// Enforces the history bound: when the raw message count exceeds
    /// `max_history * 2`, the oldest messages are dropped. The bound applies
    /// to raw count, not exchange pairs.
    pub fn add_message(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));

        let cap = self.config.message_cap();
        if self.messages.len() > cap {
            let excess = self.messages.len() - cap;
            self.messages.drain(..excess);
        }

        self.metadata.touch();
    }

    /// Record a generated image, optionally copying it into the session's
    /// `images/` directory under its original file name
    ///
    /// Returns the recorded path: the session-local copy when
    /// `copy_into_session` is set, the given path otherwise.
    pub async fn add_generated_image(
        &mut self,
        path: impl AsRef<Path>,
        copy_into_session: bool,
    ) -> StorageResult<PathBuf> {
        let path = path.as_ref();

        let recorded = if copy_into_session {
            let file_name = path.file_name().ok_or_else(|| {
                StorageError::InvalidData(format!("image path has no file name: {}", path.display()))
            })?;
            let dir = self.images_dir();
            fs::create_dir_all(&dir).await?;
            let dest = dir.join(file_name);
            fs::copy(path, &dest).await?;
            dest
        } else {
            path.to_path_buf()
        };

        self.generated_images.push(recorded.clone());
        self.metadata.touch();
        Ok(recorded)
    }

    /// Record a reference image
    ///
    /// With `save_references` enabled the file is copied into the session's
    /// `references/` directory under a timestamp-prefixed name, so repeated
    /// additions of the same base name do not collide. Otherwise the path is
    /// recorded as given.
    pub async fn add_reference_image(&mut self, path: impl AsRef<Path>) -> StorageResult<PathBuf> {
        let path = path.as_ref();

        let recorded = if self.config.save_references {
            let file_name = path.file_name().ok_or_else(|| {
                StorageError::InvalidData(format!("image path has no file name: {}", path.display()))
            })?;
            let stamp = Utc::now().format(TIMESTAMP_FORMAT);
            let dir = self.references_dir();
            fs::create_dir_all(&dir).await?;
            let dest = dir.join(format!("{}_{}", stamp, file_name.to_string_lossy()));
            fs::copy(path, &dest).await?;
            dest
        } else {
            path.to_path_buf()
        };

        self.reference_images.push(recorded.clone());
        self.metadata.touch();
        Ok(recorded)
    }

    /// Message history projected to the shape generation calls expect
    pub fn messages_for_api(&self) -> Vec<ApiMessage> {
        self.messages.iter().map(Message::to_api).collect()
    }

    /// Select the context to send with a new generation call
    ///
    /// Binary policy: when history use is requested and more than one message
    /// exists, the full bounded history is sent; otherwise only the new
    /// prompt, as a one-element history. Expects the prompt to have already
    /// been recorded with [`Session::add_message`].
    pub fn context_for_prompt(&self, prompt: &str, use_history: bool) -> Vec<ApiMessage> {
        if use_history && self.messages.len() > 1 {
            self.messages_for_api()
        } else {
            vec![ApiMessage {
                role: Role::User,
                content: prompt.to_string(),
            }]
        }
    }

    /// Most recently generated image, if any
    pub fn latest_generated_image(&self) -> Option<&Path> {
        self.generated_images.last().map(PathBuf::as_path)
    }

    /// Record one completed generation call
    pub fn increment_generation_count(&mut self) {
        self.metadata.generation_count += 1;
        self.metadata.touch();
    }

    /// Read-only projection of identity, counts, and timestamps
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id.clone(),
            created_at: self.metadata.created_at,
            last_updated_at: self.metadata.last_updated_at,
            generation_count: self.metadata.generation_count,
            message_count: self.messages.len(),
            generated_image_count: self.generated_images.len(),
            reference_image_count: self.reference_images.len(),
            path: self.root.clone(),
        }
    }
}
