// session/mod.rs
pub mod token_store;

use std::sync::{Arc, RwLock};

use tokio::sync::watch;

use crate::error::ClientError;
use crate::models::usermodel::{Profile, Session, User};
use token_store::TokenStore;

/// Holds the current identity. The only writer of the auth token; every
/// other component reads a snapshot through `current()` or `token()`.
#[derive(Debug)]
pub struct SessionStore {
    store: Arc<dyn TokenStore>,
    current: watch::Sender<Option<Session>>,
    profile: RwLock<Option<Profile>>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            store,
            current,
            profile: RwLock::new(None),
        }
    }

    /// Loads the persisted session once at start. A missing file means
    /// signed out; an unreadable one is discarded.
    pub fn restore(&self) -> Option<Session> {
        let restored = match self.store.load() {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!("Discarding unreadable persisted session: {}", e);
                if let Err(e) = self.store.clear() {
                    tracing::warn!("Failed to remove persisted session: {}", e);
                }
                None
            }
        };

        match &restored {
            Some(session) => tracing::info!(
                "Restored session for user {} ({})",
                session.user.id,
                session.user.role.to_str()
            ),
            None => tracing::info!("No persisted session, starting signed out"),
        }

        self.current.send_replace(restored.clone());
        restored
    }

    /// Persists then publishes. Nothing changes in memory if persisting fails.
    pub fn sign_in(&self, user: User, token: impl Into<String>) -> Result<Session, ClientError> {
        let session = Session::new(user, token);
        self.store.save(&session)?;
        self.clear_profile();
        self.current.send_replace(Some(session.clone()));
        tracing::info!("Signed in as user {}", session.user.id);
        Ok(session)
    }

    pub fn sign_up(&self, user: User, token: impl Into<String>) -> Result<Session, ClientError> {
        self.sign_in(user, token)
    }

    /// Local half of sign-out; always leaves the store signed out.
    pub fn clear(&self) {
        if let Err(e) = self.store.clear() {
            tracing::error!("Failed to clear persisted session: {}", e);
        }
        self.clear_profile();
        self.current.send_replace(None);
        tracing::info!("Session cleared");
    }

    pub fn current(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.current.borrow().as_ref().map(|s| s.auth_token.clone())
    }

    pub fn require(&self) -> Result<Session, ClientError> {
        self.current().ok_or(ClientError::Unauthenticated)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.current.subscribe()
    }

    pub fn cached_profile(&self) -> Option<Profile> {
        self.profile.read().ok().and_then(|p| p.clone())
    }

    pub fn set_profile(&self, profile: Profile) {
        if let Ok(mut slot) = self.profile.write() {
            *slot = Some(profile);
        }
    }

    fn clear_profile(&self) {
        if let Ok(mut slot) = self.profile.write() {
            *slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::usermodel::UserRole;
    use token_store::{FileTokenStore, MemoryTokenStore};

    fn user() -> User {
        User {
            id: 7,
            name: "Omar".to_string(),
            email: "omar@example.com".to_string(),
            role: UserRole::Client,
            phone: None,
        }
    }

    #[derive(Debug)]
    struct FailingStore;

    impl TokenStore for FailingStore {
        fn load(&self) -> Result<Option<Session>, ClientError> {
            Ok(None)
        }
        fn save(&self, _: &Session) -> Result<(), ClientError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into())
        }
        fn clear(&self) -> Result<(), ClientError> {
            Ok(())
        }
    }

    #[test]
    fn restore_without_token_is_signed_out() {
        let store = SessionStore::new(Arc::new(MemoryTokenStore::new()));
        assert_eq!(store.restore(), None);
        assert!(store.current().is_none());
        assert!(matches!(store.require(), Err(ClientError::Unauthenticated)));
    }

    #[test]
    fn sign_in_publishes_and_persists() {
        let persisted = Arc::new(MemoryTokenStore::new());
        let store = SessionStore::new(persisted.clone());
        let mut rx = store.subscribe();

        store.sign_in(user(), "tok").unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_ref().map(|s| s.user.id), Some(7));
        assert_eq!(store.token().as_deref(), Some("tok"));
        assert_eq!(persisted.load().unwrap().map(|s| s.auth_token), Some("tok".to_string()));
    }

    #[test]
    fn failed_persist_leaves_state_untouched() {
        let store = SessionStore::new(Arc::new(FailingStore));
        assert!(store.sign_in(user(), "tok").is_err());
        assert!(store.current().is_none());
    }

    #[test]
    fn restore_discards_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"garbage").unwrap();
        let store = SessionStore::new(Arc::new(FileTokenStore::new(path.clone())));
        assert_eq!(store.restore(), None);
        assert!(!path.exists());
    }

    #[test]
    fn clear_drops_session_and_profile() {
        let store = SessionStore::new(Arc::new(MemoryTokenStore::new()));
        store.sign_in(user(), "tok").unwrap();
        store.set_profile(Profile {
            user_id: 7,
            role: UserRole::Client,
            bio: None,
            categories: vec![],
            skills: vec![],
            city: None,
            phone: Some("+966512345678".to_string()),
            rating: None,
            completed_jobs: None,
        });
        store.clear();
        assert!(store.current().is_none());
        assert!(store.cached_profile().is_none());
    }
}
