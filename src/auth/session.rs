//! Session storage for ManageMe.
//!
//! [`SessionStore`] owns the current credential, its decoded claims and the
//! signed-in user's profile snapshot. Every mutation replaces the whole
//! session under one write lock, so readers never observe a credential
//! paired with another session's user. Changes are written through to a
//! [`SessionStorage`] backend so a reload can pick the session up again.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, info, warn};

use super::credential::{decode_claims, Claims};
use crate::model::User;
use crate::Result;

/// Storage key of the credential.
pub const CREDENTIAL_KEY: &str = "jwt";

/// Storage key of the user snapshot (JSON).
pub const USER_KEY: &str = "user";

/// Storage key of the "hide the introduction banner" preference.
pub const HIDE_INTRO_KEY: &str = "hideIntro";

/// Key/value backend that outlives a single page of the client.
///
/// Values are opaque strings without schema versioning.
pub trait SessionStorage: Send + Sync {
    /// Read a value.
    fn get_item(&self, key: &str) -> Option<String>;
    /// Write a value.
    fn set_item(&self, key: &str, value: &str);
    /// Delete a value.
    fn remove_item(&self, key: &str);
}

/// In-process storage backend.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Bearer credential issued at login.
    pub credential: String,
    /// Claims decoded from the credential.
    pub claims: Claims,
    /// Snapshot of the signed-in user's profile.
    pub user: User,
}

impl Session {
    /// Build a session, decoding the credential's claims.
    pub fn new(credential: impl Into<String>, user: User) -> Result<Self> {
        let credential = credential.into();
        let claims = decode_claims(&credential)?;
        Ok(Self {
            credential,
            claims,
            user,
        })
    }

    /// Build a session from the credential alone.
    ///
    /// The user is a placeholder carrying only the claims' subject and no
    /// permissions, until the profile is fetched again.
    pub fn from_credential(credential: impl Into<String>) -> Result<Self> {
        let credential = credential.into();
        let claims = decode_claims(&credential)?;
        let user = User {
            id: claims.subject.clone(),
            username: String::new(),
            email: String::new(),
            role: 0,
            preferred_hours: None,
        };
        Ok(Self {
            credential,
            claims,
            user,
        })
    }

    /// ID of the signed-in user.
    pub fn user_id(&self) -> &str {
        &self.user.id
    }
}

/// Process-wide holder of the current session.
pub struct SessionStore {
    current: RwLock<Option<Session>>,
    generation: AtomicU64,
    storage: Arc<dyn SessionStorage>,
}

impl SessionStore {
    /// Create a store backed by `storage`. Starts signed out; see [`SessionStore::restore`].
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            current: RwLock::new(None),
            generation: AtomicU64::new(0),
            storage,
        }
    }

    /// Create a store backed by fresh in-memory storage.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()))
    }

    /// Counter bumped every time the session is replaced or cleared.
    ///
    /// A response requested under one generation must not be applied
    /// under another.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Replace the session with `credential` and `user`.
    ///
    /// Fails with `MalformedCredential` if the credential cannot be decoded;
    /// the previous session is left untouched in that case.
    pub fn set(&self, credential: impl Into<String>, user: User) -> Result<()> {
        let session = Session::new(credential, user)?;
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);

        self.storage.set_item(CREDENTIAL_KEY, &session.credential);
        self.persist_user(&session.user);
        info!(
            user_id = %session.user.id,
            username = %session.user.username,
            "Session established"
        );
        *current = Some(session);
        self.generation.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Current session, if signed in.
    pub fn get(&self) -> Option<Session> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a session is present.
    pub fn is_signed_in(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Current credential, if signed in.
    pub fn credential(&self) -> Option<String> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.credential.clone())
    }

    /// Signed-in user's cached profile.
    pub fn current_user(&self) -> Option<User> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.user.clone())
    }

    /// Refresh the cached profile of the signed-in user.
    ///
    /// Returns `false` (and changes nothing) when signed out or when `user`
    /// is somebody else.
    pub fn update_user(&self, user: User) -> bool {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        match current.as_mut() {
            Some(session) if session.user.id == user.id => {
                self.persist_user(&user);
                debug!(user_id = %user.id, "Cached user refreshed");
                session.user = user;
                true
            }
            _ => false,
        }
    }

    /// Drop the session and its persisted keys.
    pub fn clear(&self) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        self.storage.remove_item(CREDENTIAL_KEY);
        self.storage.remove_item(USER_KEY);
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(session) = current.take() {
            info!(user_id = %session.user.id, "Session cleared");
        }
    }

    /// Load a session persisted by an earlier page.
    ///
    /// A credential that no longer decodes is discarded and the store stays
    /// signed out. A credential without a usable user snapshot is restored
    /// on its own; see [`Session::from_credential`].
    pub fn restore(&self) -> Option<Session> {
        let credential = self.storage.get_item(CREDENTIAL_KEY)?;
        let user = self
            .storage
            .get_item(USER_KEY)
            .and_then(|json| serde_json::from_str::<User>(&json).ok());

        let restored = match user {
            Some(user) => Session::new(credential, user),
            None => {
                debug!("No usable user snapshot, restoring from the credential");
                Session::from_credential(credential)
            }
        };

        match restored {
            Ok(session) => {
                let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
                *current = Some(session.clone());
                self.generation.fetch_add(1, Ordering::SeqCst);
                debug!(user_id = %session.user.id, "Session restored from storage");
                Some(session)
            }
            Err(e) => {
                warn!(error = %e, "Persisted credential is malformed, discarding");
                self.clear();
                None
            }
        }
    }

    /// Whether the user asked to hide the introduction banner for good.
    pub fn hide_intro(&self) -> bool {
        self.storage.get_item(HIDE_INTRO_KEY).as_deref() == Some("true")
    }

    /// Store the introduction banner preference.
    pub fn set_hide_intro(&self, hide: bool) {
        self.storage
            .set_item(HIDE_INTRO_KEY, if hide { "true" } else { "false" });
    }

    fn persist_user(&self, user: &User) {
        match serde_json::to_string(user) {
            Ok(json) => self.storage.set_item(USER_KEY, &json),
            Err(e) => warn!(error = %e, "Failed to serialize user snapshot"),
        }
    }
}
