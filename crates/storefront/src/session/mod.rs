//! Session store shared by every view model.
//!
//! Two physical namespaces sit behind one handle: a tab scope that lives as
//! long as the process, and a longer-lived scope (a JSON file for the CLI).
//! Reads prefer the tab scope. Each mutation bumps a generation counter on a
//! `watch` channel so independently constructed view models know to re-read.

mod backend;

pub use backend::{FileStore, MemoryStore, StorageBackend};

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use voltmart_core::{UserId, UserRole};

/// Well-known session keys.
pub mod keys {
    pub const TOKEN: &str = "token";
    pub const USER_ID: &str = "userId";
    pub const NAME: &str = "name";
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
    pub const GENDER: &str = "gender";
    pub const USER_ROLE: &str = "user_role";
    pub const CART_COUNT: &str = "cartCount";

    /// Keys removed from both scopes on logout.
    pub const AUTH_KEYS: [&str; 8] = [
        TOKEN, USER_ID, NAME, EMAIL, PHONE, GENDER, USER_ROLE, CART_COUNT,
    ];
}

/// Errors raised by the session store.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading or writing the backing file failed.
    #[error("session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file does not hold a JSON string map.
    #[error("session file {} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },
}

/// Which namespace a write goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Cleared when the process exits.
    Tab,
    /// Survives restarts.
    Persistent,
}

/// Cloneable handle over the two session namespaces.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

struct SessionStoreInner {
    tab: Box<dyn StorageBackend>,
    persistent: Box<dyn StorageBackend>,
    changes: watch::Sender<u64>,
}

impl SessionStore {
    /// Build a store over explicit backends.
    #[must_use]
    pub fn new(tab: impl StorageBackend + 'static, persistent: impl StorageBackend + 'static) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            inner: Arc::new(SessionStoreInner {
                tab: Box::new(tab),
                persistent: Box::new(persistent),
                changes,
            }),
        }
    }

    /// Both scopes in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryStore::new(), MemoryStore::new())
    }

    /// Tab scope in memory, persistent scope in the JSON file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the file exists but cannot be loaded.
    pub fn with_file(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        Ok(Self::new(MemoryStore::new(), FileStore::open(path)?))
    }

    /// Read `key`, preferring the tab scope.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner
            .tab
            .get(key)
            .or_else(|| self.inner.persistent.get(key))
    }

    /// Write `key` into `scope` and notify subscribers.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the backend could not persist the value.
    pub fn set(&self, key: &str, value: &str, scope: Scope) -> Result<(), SessionError> {
        self.backend(scope).set(key, value)?;
        self.notify();
        Ok(())
    }

    /// Remove `key` from both scopes and notify subscribers.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if a backend could not persist the removal.
    pub fn remove(&self, key: &str) -> Result<(), SessionError> {
        let tab = self.inner.tab.remove(key);
        let persistent = self.inner.persistent.remove(key);
        self.notify();
        tab.and(persistent)
    }

    /// Remove every authentication-related key from both scopes.
    ///
    /// This is the logout operation. Subscribers are notified once.
    ///
    /// # Errors
    ///
    /// Returns the first backend failure; removal is still attempted for
    /// every key.
    pub fn clear(&self) -> Result<(), SessionError> {
        let mut result = Ok(());
        for key in keys::AUTH_KEYS {
            for backend in [&self.inner.tab, &self.inner.persistent] {
                if let Err(e) = backend.remove(key) {
                    tracing::warn!(key, error = %e, "Failed to clear session key");
                    if result.is_ok() {
                        result = Err(e);
                    }
                }
            }
        }
        self.notify();
        tracing::debug!("Session cleared");
        result
    }

    /// Change notifications: the value is a generation counter, bumped on
    /// every mutation. Receivers re-read whatever keys they care about.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.changes.subscribe()
    }

    // =========================================================================
    // Typed accessors
    // =========================================================================

    /// Logged-in user, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.get(keys::USER_ID)
            .filter(|id| !id.is_empty())
            .map(UserId::new)
    }

    /// Bearer token, if any.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.get(keys::TOKEN).filter(|token| !token.is_empty())
    }

    /// Stored role; customer when absent or unrecognised.
    #[must_use]
    pub fn role(&self) -> UserRole {
        self.get(keys::USER_ROLE)
            .and_then(|role| role.parse().ok())
            .unwrap_or_default()
    }

    /// Cached number of cart lines; 0 when absent or unparsable.
    #[must_use]
    pub fn cart_count(&self) -> usize {
        self.get(keys::CART_COUNT)
            .and_then(|count| count.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Record the number of cart lines in the tab scope.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] if the backend rejects the write.
    pub fn set_cart_count(&self, count: usize) -> Result<(), SessionError> {
        self.set(keys::CART_COUNT, &count.to_string(), Scope::Tab)
    }

    /// Whether a user id is present.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.user_id().is_some()
    }

    fn backend(&self, scope: Scope) -> &dyn StorageBackend {
        match scope {
            Scope::Tab => self.inner.tab.as_ref(),
            Scope::Persistent => self.inner.persistent.as_ref(),
        }
    }

    fn notify(&self) {
        self.inner.changes.send_modify(|generation| {
            *generation = generation.wrapping_add(1);
        });
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("user_id", &self.user_id())
            .field("generation", &*self.inner.changes.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn logged_in() -> SessionStore {
        let session = SessionStore::in_memory();
        for (key, value) in [
            (keys::TOKEN, "jwt"),
            (keys::USER_ID, "u-42"),
            (keys::NAME, "Asha"),
            (keys::EMAIL, "asha@voltmart.in"),
            (keys::PHONE, "+919876543210"),
            (keys::GENDER, "Female"),
            (keys::USER_ROLE, "admin"),
        ] {
            session.set(key, value, Scope::Persistent).unwrap();
        }
        session.set_cart_count(3).unwrap();
        session
    }

    #[test]
    fn test_reads_prefer_tab_scope() {
        let session = SessionStore::in_memory();
        session.set(keys::USER_ID, "persistent", Scope::Persistent).unwrap();
        assert_eq!(session.get(keys::USER_ID).as_deref(), Some("persistent"));

        session.set(keys::USER_ID, "tab", Scope::Tab).unwrap();
        assert_eq!(session.get(keys::USER_ID).as_deref(), Some("tab"));
    }

    #[test]
    fn test_typed_accessors() {
        let session = logged_in();
        assert_eq!(session.user_id(), Some(UserId::new("u-42")));
        assert_eq!(session.token().as_deref(), Some("jwt"));
        assert_eq!(session.role(), UserRole::Admin);
        assert_eq!(session.cart_count(), 3);
        assert!(session.is_logged_in());
    }

    #[test]
    fn test_cart_count_defaults_to_zero() {
        let session = SessionStore::in_memory();
        assert_eq!(session.cart_count(), 0);
        session.set(keys::CART_COUNT, "lots", Scope::Tab).unwrap();
        assert_eq!(session.cart_count(), 0);
    }

    #[test]
    fn test_clear_removes_auth_keys_from_both_scopes() {
        let session = logged_in();
        session.set(keys::TOKEN, "tab-jwt", Scope::Tab).unwrap();
        session.set("theme", "dark", Scope::Persistent).unwrap();

        session.clear().unwrap();

        for key in keys::AUTH_KEYS {
            assert_eq!(session.get(key), None, "{key} survived clear");
        }
        assert_eq!(session.cart_count(), 0);
        assert!(!session.is_logged_in());
        assert_eq!(session.role(), UserRole::Customer);
        assert_eq!(session.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_remove_hits_both_scopes() {
        let session = logged_in();
        session.set(keys::USER_ID, "tab", Scope::Tab).unwrap();
        session.remove(keys::USER_ID).unwrap();
        assert_eq!(session.user_id(), None);
    }

    #[tokio::test]
    async fn test_subscribers_see_mutations() {
        let session = SessionStore::in_memory();
        let mut changes = session.subscribe();
        assert!(!changes.has_changed().unwrap());

        let writer = session.clone();
        writer.set_cart_count(1).unwrap();

        changes.changed().await.unwrap();
        assert_eq!(*changes.borrow_and_update(), 1);
        assert_eq!(session.cart_count(), 1);

        writer.clear().unwrap();
        changes.changed().await.unwrap();
        assert_eq!(session.cart_count(), 0);
    }
}
