//! Local filesystem session storage
//!
//! Each session owns an exclusive subtree named by its identifier:
//! the JSON record plus parallel `images/` and `references/` directories.
//!
//! ```text
//! <base>/<id>/session.json
//! <base>/<id>/images/
//! <base>/<id>/references/
//! ```

use super::{SessionListing, SessionStore, SkipReason, StorageError, StorageResult};
use crate::session::Session;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, warn};

/// File name of the per-session record document
const RECORD_FILE: &str = "session.json";

/// Local filesystem session storage
///
/// Sessions are stored under:
/// - `~/.panelforge/sessions/` (default)
/// - Custom path if specified
pub struct LocalSessionStore {
    /// Base directory for session subtrees
    base_path: PathBuf,
}

impl LocalSessionStore {
    /// Create storage with the default path (~/.panelforge/sessions)
    pub fn new() -> StorageResult<Self> {
        let base_path = dirs::home_dir()
            .ok_or(StorageError::PathUnavailable)?
            .join(".panelforge")
            .join("sessions");

        Ok(Self { base_path })
    }

    /// Create storage with a custom base path
    pub fn with_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Base directory for session subtrees
    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }

    /// Ensure the base directory exists
    async fn ensure_dir(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.base_path).await?;
        Ok(())
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.session_dir(id).join(RECORD_FILE)
    }
}

#[async_trait]
impl SessionStore for LocalSessionStore {
    async fn save(&self, session: &Session) -> StorageResult<()> {
        let dir = self.session_dir(session.id());
        fs::create_dir_all(dir.join("images")).await?;
        fs::create_dir_all(dir.join("references")).await?;

        let content = serde_json::to_string_pretty(session)?;
        let path = self.record_path(session.id());
        fs::write(&path, content).await?;
        debug!("Saved session {} to {:?}", session.id(), path);

        Ok(())
    }

    async fn load(&self, id: &str) -> StorageResult<Session> {
        let path = self.record_path(id);

        if !path.exists() {
            return Err(StorageError::NotFound(id.to_string()));
        }

        let content = fs::read_to_string(&path).await?;
        let mut session: Session = serde_json::from_str(&content)?;
        session.config.validate()?;

        // The directory name is authoritative for identity.
        session.id = id.to_string();
        session.bind_root(self.session_dir(id));

        debug!("Loaded session {} from {:?}", id, path);
        Ok(session)
    }

    async fn delete(&self, id: &str) -> StorageResult<()> {
        let dir = self.session_dir(id);

        if dir.exists() {
            fs::remove_dir_all(&dir).await?;
            debug!("Deleted session {} at {:?}", id, dir);
        }

        Ok(())
    }

    async fn exists(&self, id: &str) -> StorageResult<bool> {
        Ok(self.record_path(id).exists())
    }

    async fn list(&self) -> StorageResult<SessionListing> {
        self.ensure_dir().await?;

        let mut entries = fs::read_dir(&self.base_path).await?;
        let mut listing = SessionListing::default();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            let Some(id) = path.file_name().and_then(|n| n.to_str()).map(String::from) else {
                continue;
            };

            if !self.record_path(&id).exists() {
                listing.skipped.push(SkipReason::MissingRecord(path));
                continue;
            }

            match self.load(&id).await {
                Ok(session) => listing.summaries.push(session.summary()),
                Err(e) => {
                    warn!("Skipping unreadable session record in {:?}: {}", path, e);
                    listing.skipped.push(SkipReason::Unreadable(path, e));
                }
            }
        }

        // Newest first
        listing
            .summaries
            .sort_by(|a, b| b.last_updated_at.cmp(&a.last_updated_at));

        Ok(listing)
    }

    fn session_dir(&self, id: &str) -> PathBuf {
        self.base_path.join(id)
    }
}
