//! Session manager
//!
//! Coordinates sessions against a storage backend: identity generation,
//! creation, lookup, listing, and bulk age-based cleanup. The manager and
//! store are pure state custodians; generation calls never pass through
//! them.

use chrono::{Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::session::{Session, SessionConfig, SESSION_ID_LENGTH};
use crate::storage::{LocalSessionStore, SessionListing, SessionStore, StorageResult};

/// Manages multiple sessions against a storage backend
pub struct SessionManager {
    store: Box<dyn SessionStore>,
}

impl SessionManager {
    /// Create a manager over the default local store (~/.panelforge/sessions)
    pub fn new() -> StorageResult<Self> {
        Ok(Self {
            store: Box::new(LocalSessionStore::new()?),
        })
    }

    /// Create a manager over a local store rooted at the given path
    pub fn with_root(base_path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            store: Box::new(LocalSessionStore::with_path(base_path)),
        }
    }

    /// Create a manager over a custom storage backend
    pub fn with_store(store: Box<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Generate a short random session identifier
    fn generate_id() -> String {
        Uuid::new_v4().simple().to_string()[..SESSION_ID_LENGTH].to_string()
    }

    /// Create a new session and persist it immediately
    ///
    /// An identifier is generated when none is supplied. The configuration
    /// is validated before anything touches disk.
    pub async fn create(
        &self,
        id: Option<String>,
        config: Option<SessionConfig>,
    ) -> StorageResult<Session> {
        let id = id.unwrap_or_else(Self::generate_id);
        let config = config.unwrap_or_default();
        config.validate()?;

        let session = Session::new(id.clone(), config, self.store.session_dir(&id));
        self.store.save(&session).await?;
        debug!("Created session {}", id);

        Ok(session)
    }

    /// Load an existing session
    pub async fn load(&self, id: &str) -> StorageResult<Session> {
        self.store.load(id).await
    }

    /// Persist a session, overwriting its record
    pub async fn save(&self, session: &Session) -> StorageResult<()> {
        self.store.save(session).await
    }

    /// Enumerate all sessions, newest first
    ///
    /// Unreadable records are skipped and tallied in the listing rather
    /// than raised.
    pub async fn list(&self) -> StorageResult<SessionListing> {
        self.store.list().await
    }

    /// Delete a session and all its files; no-op if already absent
    pub async fn delete(&self, id: &str) -> StorageResult<()> {
        self.store.delete(id).await
    }

    /// Delete every session last updated before `now - hours`
    ///
    /// Full scan of the listing, linear in session count. Returns the
    /// number of sessions deleted.
    pub async fn cleanup_older_than(&self, hours: i64) -> StorageResult<usize> {
        let cutoff = Utc::now() - Duration::hours(hours);
        let mut deleted = 0;

        for summary in self.list().await?.summaries {
            if summary.last_updated_at < cutoff {
                self.delete(&summary.id).await?;
                deleted += 1;
            }
        }

        if deleted > 0 {
            info!("Cleaned up {} stale session(s)", deleted);
        }
        Ok(deleted)
    }

    /// Total number of listable sessions
    pub async fn session_count(&self) -> StorageResult<usize> {
        Ok(self.list().await?.summaries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;
    use tempfile::TempDir;

    fn create_test_manager() -> (SessionManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let manager = SessionManager::with_root(temp_dir.path());
        (manager, temp_dir)
    }

    #[tokio::test]
    async fn test_create_generates_short_id() {
        let (manager, _temp) = create_test_manager();

        let session = manager.create(None, None).await.unwrap();
        assert_eq!(session.id().len(), SESSION_ID_LENGTH);

        // Persisted immediately.
        let loaded = manager.load(session.id()).await.unwrap();
        assert_eq!(loaded.id(), session.id());
    }

    #[tokio::test]
    async fn test_create_with_explicit_id() {
        let (manager, _temp) = create_test_manager();

        let session = manager.create(Some("abc".to_string()), None).await.unwrap();
        assert_eq!(session.id(), "abc");

        let loaded = manager.load("abc").await.unwrap();
        assert_eq!(loaded.messages(), session.messages());
        assert_eq!(loaded.metadata(), session.metadata());
        assert_eq!(loaded.config(), session.config());
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_config() {
        let (manager, _temp) = create_test_manager();

        let config = SessionConfig {
            max_history: 0,
            ..SessionConfig::default()
        };
        let result = manager.create(None, Some(config)).await;
        assert!(result.is_err());
        assert_eq!(manager.session_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_mutate_save_reload() {
        let (manager, _temp) = create_test_manager();

        let mut session = manager.create(Some("work".to_string()), None).await.unwrap();
        session.add_message(Role::User, "a fox in the snow");
        session.increment_generation_count();
        manager.save(&session).await.unwrap();

        let reloaded = manager.load("work").await.unwrap();
        assert_eq!(reloaded.messages().len(), 1);
        assert_eq!(reloaded.metadata().generation_count, 1);
    }

    #[tokio::test]
    async fn test_list_sorted_by_last_update() {
        let (manager, _temp) = create_test_manager();

        manager.create(Some("older".to_string()), None).await.unwrap();
        let mut newer = manager.create(Some("newer".to_string()), None).await.unwrap();
        newer.add_message(Role::User, "later activity");
        manager.save(&newer).await.unwrap();

        let listing = manager.list().await.unwrap();
        assert_eq!(listing.summaries.len(), 2);
        assert_eq!(listing.summaries[0].id, "newer");
    }

    #[tokio::test]
    async fn test_delete_idempotent() {
        let (manager, _temp) = create_test_manager();

        manager.create(Some("gone".to_string()), None).await.unwrap();
        manager.delete("gone").await.unwrap();
        manager.delete("gone").await.unwrap();

        assert_eq!(manager.session_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cleanup_older_than() {
        let (manager, _temp) = create_test_manager();

        // Three sessions last updated 48h, 2h, and 1h ago.
        for (id, age_hours) in [("stale", 48), ("recent", 2), ("fresh", 1)] {
            let mut session = manager.create(Some(id.to_string()), None).await.unwrap();
            session.metadata.last_updated_at = Utc::now() - Duration::hours(age_hours);
            manager.save(&session).await.unwrap();
        }

        let deleted = manager.cleanup_older_than(24).await.unwrap();
        assert_eq!(deleted, 1);

        let listing = manager.list().await.unwrap();
        let ids: Vec<_> = listing.summaries.iter().map(|s| s.id.as_str()).collect();
        assert!(!ids.contains(&"stale"));
        assert!(ids.contains(&"recent"));
        assert!(ids.contains(&"fresh"));
    }

    #[tokio::test]
    async fn test_cleanup_empty_store() {
        let (manager, _temp) = create_test_manager();
        assert_eq!(manager.cleanup_older_than(24).await.unwrap(), 0);
    }
}
