//! Session and account management
//!
//! Local user records and the active-session marker. The session is either
//! "guest" or "authenticated as user U"; switching swaps which namespace
//! the persistence gateway reads and writes.
//!
//! ## Security
//!
//! Accounts here are a convenience for sharing one machine, not an access
//! control mechanism: passwords are stored and compared in **plain text**
//! in the local store. Anything beyond a toy deployment must hash
//! credentials before storing them. Do not reuse a real password.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::ids;
use crate::storage::{
    Gateway, KeyValueBackend, Namespace, StorageError, ACCOUNTS_KEY, ACTIVE_USER_KEY, THEME_KEY,
};

/// A locally registered user
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub id: String,
    pub name: String,
    /// Unique across accounts, compared case-sensitively
    pub email: String,
    /// Plain text. See the module docs before touching this field.
    pub password: String,
    /// Creation timestamp in epoch milliseconds
    pub created_at: i64,
}

/// The logged-in user as stored in the session marker (no password)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveUser {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Account operation failures, returned as values for the caller to surface
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("an account with this email already exists")]
    DuplicateEmail,

    #[error("email or password is incorrect")]
    InvalidCredentials,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Color theme preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(format!("unknown theme '{}' (expected dark or light)", other)),
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Dark => write!(f, "dark"),
            Theme::Light => write!(f, "light"),
        }
    }
}

/// Manages accounts, the active session, and guest-data migration
pub struct SessionManager {
    backend: Arc<dyn KeyValueBackend>,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    /// A persistence gateway over the same backend
    pub fn gateway(&self) -> Gateway {
        Gateway::new(self.backend.clone())
    }

    /// The currently logged-in user, if any
    ///
    /// A corrupt marker is treated as logged out.
    pub fn active_user(&self) -> Option<ActiveUser> {
        let raw = self.backend.get(ACTIVE_USER_KEY).ok()??;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "active session marker is corrupt, treating as guest");
                None
            }
        }
    }

    /// The namespace the persistence gateway should operate on
    pub fn namespace(&self) -> Namespace {
        match self.active_user() {
            Some(user) => Namespace::User(user.id),
            None => Namespace::Guest,
        }
    }

    /// Register a new account
    ///
    /// Fails with [`AuthError::DuplicateEmail`] when an account with the
    /// same email (exact, case-sensitive match) already exists. Does not
    /// log the new account in.
    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserAccount, AuthError> {
        let mut accounts = self.accounts();

        if accounts.iter().any(|a| a.email == email) {
            return Err(AuthError::DuplicateEmail);
        }

        let account = UserAccount {
            id: ids::generate(),
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            created_at: ids::timestamp_millis(),
        };
        accounts.push(account.clone());
        self.save_accounts(&accounts)?;

        info!(email = %account.email, "account registered");
        Ok(account)
    }

    /// Log in with email and password
    ///
    /// Both fields must match an existing account exactly. On success the
    /// active-session marker is set; the caller must reload the library
    /// for the new namespace (in-memory state is replaced wholesale).
    pub fn login(&self, email: &str, password: &str) -> Result<ActiveUser, AuthError> {
        let accounts = self.accounts();
        let account = accounts
            .iter()
            .find(|a| a.email == email && a.password == password)
            .ok_or(AuthError::InvalidCredentials)?;

        let user = ActiveUser {
            id: account.id.clone(),
            name: account.name.clone(),
            email: account.email.clone(),
        };
        self.backend
            .set(ACTIVE_USER_KEY, &serde_json::to_string(&user).map_err(StorageError::from)?)
            .map_err(AuthError::Storage)?;

        info!(email = %user.email, "logged in");
        Ok(user)
    }

    /// Log out, returning the session to guest
    ///
    /// The caller is responsible for flushing the current library first;
    /// every library mutation already persists synchronously, so there is
    /// normally nothing left to write.
    pub fn logout(&self) -> Result<(), StorageError> {
        self.backend.remove(ACTIVE_USER_KEY)?;
        info!("logged out");
        Ok(())
    }

    /// One-time, one-way copy of guest data into a user's namespace
    ///
    /// Non-empty guest book and vocabulary blobs are copied verbatim; the
    /// guest stats blob is copied whenever present. Any existing data in
    /// the user's namespace is silently overwritten. The guest namespace
    /// is cleared afterwards so logout returns to a clean slate.
    pub fn migrate_guest_data(&self, user_id: &str) -> Result<(), StorageError> {
        let guest = Namespace::Guest;
        let user = Namespace::User(user_id.to_string());

        if let Some(raw) = self.backend.get(&guest.books_key())? {
            if raw != "[]" {
                self.backend.set(&user.books_key(), &raw)?;
                info!("migrated guest books to user namespace");
            }
        }
        if let Some(raw) = self.backend.get(&guest.vocabulary_key())? {
            if raw != "[]" {
                self.backend.set(&user.vocabulary_key(), &raw)?;
                info!("migrated guest vocabulary to user namespace");
            }
        }
        if let Some(raw) = self.backend.get(&guest.stats_key())? {
            self.backend.set(&user.stats_key(), &raw)?;
        }

        self.backend.remove(&guest.books_key())?;
        self.backend.remove(&guest.vocabulary_key())?;
        self.backend.remove(&guest.stats_key())?;
        Ok(())
    }

    /// Stored theme preference, defaulting to dark
    pub fn theme(&self) -> Theme {
        self.backend
            .get(THEME_KEY)
            .ok()
            .flatten()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    /// Persist the theme preference
    pub fn set_theme(&self, theme: Theme) -> Result<(), StorageError> {
        self.backend.set(THEME_KEY, &theme.to_string())
    }

    fn accounts(&self) -> Vec<UserAccount> {
        let raw = match self.backend.get(ACCOUNTS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "failed to read account directory");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(accounts) => accounts,
            Err(e) => {
                warn!(error = %e, "account directory is corrupt, starting empty");
                Vec::new()
            }
        }
    }

    fn save_accounts(&self, accounts: &[UserAccount]) -> Result<(), StorageError> {
        self.backend
            .set(ACCOUNTS_KEY, &serde_json::to_string(accounts)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gamification::UserStats;
    use crate::models::{Book, BookDraft, Category};
    use crate::storage::MemoryBackend;

    fn manager() -> SessionManager {
        SessionManager::new(Arc::new(MemoryBackend::new()))
    }

    #[test]
    fn test_register_and_login() {
        let session = manager();

        let account = session
            .register("Ana", "ana@example.com", "secreta")
            .unwrap();
        assert_eq!(account.name, "Ana");
        assert!(!account.id.is_empty());

        // Registration alone does not log in
        assert!(session.active_user().is_none());
        assert_eq!(session.namespace(), Namespace::Guest);

        let user = session.login("ana@example.com", "secreta").unwrap();
        assert_eq!(user.id, account.id);
        assert_eq!(session.namespace(), Namespace::User(account.id));
    }

    #[test]
    fn test_register_duplicate_email() {
        let session = manager();
        session
            .register("Ana", "ana@example.com", "secreta")
            .unwrap();

        let result = session.register("Otra Ana", "ana@example.com", "otra");
        assert!(matches!(result, Err(AuthError::DuplicateEmail)));

        // Case differs: allowed (exact-match semantics)
        assert!(session.register("Ana", "Ana@example.com", "x").is_ok());
    }

    #[test]
    fn test_login_invalid_credentials() {
        let session = manager();
        session
            .register("Ana", "ana@example.com", "secreta")
            .unwrap();

        assert!(matches!(
            session.login("ana@example.com", "wrong"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            session.login("nobody@example.com", "secreta"),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(session.active_user().is_none());
    }

    #[test]
    fn test_logout_returns_to_guest() {
        let session = manager();
        session
            .register("Ana", "ana@example.com", "secreta")
            .unwrap();
        session.login("ana@example.com", "secreta").unwrap();

        session.logout().unwrap();
        assert!(session.active_user().is_none());
        assert_eq!(session.namespace(), Namespace::Guest);
    }

    #[test]
    fn test_active_session_marker_excludes_password() {
        let session = manager();
        session
            .register("Ana", "ana@example.com", "secreta")
            .unwrap();
        session.login("ana@example.com", "secreta").unwrap();

        let raw = session
            .gateway()
            .backend()
            .get(ACTIVE_USER_KEY)
            .unwrap()
            .unwrap();
        assert!(!raw.contains("secreta"));
    }

    #[test]
    fn test_migrate_guest_data() {
        let session = manager();
        let gateway = session.gateway();

        let guest_books = vec![Book::new(BookDraft {
            title: "Guest book".to_string(),
            author: "Guest".to_string(),
            category: Category::Reading,
            ..BookDraft::default()
        })];
        let stats = UserStats {
            xp: 25,
            ..UserStats::default()
        };
        gateway
            .save(&Namespace::Guest, &guest_books, &[], &stats)
            .unwrap();

        let account = session
            .register("Ana", "ana@example.com", "secreta")
            .unwrap();
        session.migrate_guest_data(&account.id).unwrap();

        let user_ns = Namespace::User(account.id.clone());
        let migrated = gateway.load(&user_ns);
        assert_eq!(migrated.books, guest_books);
        assert_eq!(migrated.stats.xp, 25);

        // Guest namespace is cleared
        let guest = gateway.load(&Namespace::Guest);
        assert!(guest.books.is_empty());
        assert_eq!(guest.stats, UserStats::default());
    }

    #[test]
    fn test_migrate_skips_empty_guest_collections() {
        let session = manager();
        let gateway = session.gateway();

        // Guest namespace persisted, but with empty collections
        gateway
            .save(&Namespace::Guest, &[], &[], &UserStats::default())
            .unwrap();

        let user_books = vec![Book::new(BookDraft {
            title: "Mine".to_string(),
            author: "User".to_string(),
            ..BookDraft::default()
        })];
        let user_ns = Namespace::User("u1".to_string());
        gateway
            .save(&user_ns, &user_books, &[], &UserStats::default())
            .unwrap();

        session.migrate_guest_data("u1").unwrap();

        // Empty guest blobs must not clobber the user's books
        assert_eq!(gateway.load(&user_ns).books, user_books);
    }

    #[test]
    fn test_corrupt_marker_treated_as_guest() {
        let session = manager();
        session
            .gateway()
            .backend()
            .set(ACTIVE_USER_KEY, "{broken")
            .unwrap();
        assert!(session.active_user().is_none());
        assert_eq!(session.namespace(), Namespace::Guest);
    }

    #[test]
    fn test_theme_roundtrip() {
        let session = manager();
        assert_eq!(session.theme(), Theme::Dark);

        session.set_theme(Theme::Light).unwrap();
        assert_eq!(session.theme(), Theme::Light);
    }
}
