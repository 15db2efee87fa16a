//! Persistence gateway
//!
//! Serializes the stores and stats to the key-value backend under three
//! derived keys per namespace. Loading fails closed: a missing or corrupt
//! blob becomes an empty collection or fresh stats, never an error
//! surfaced to the caller.

use std::sync::Arc;

use tracing::warn;

use super::backend::KeyValueBackend;
use super::error::StorageResult;
use crate::gamification::UserStats;
use crate::models::{Book, VocabularyWord};

/// Key for the account directory
pub const ACCOUNTS_KEY: &str = "tomo_users";
/// Key for the active-session marker
pub const ACTIVE_USER_KEY: &str = "tomo_current_user";
/// Key for the theme preference
pub const THEME_KEY: &str = "tomo_theme";

/// Storage key scope: guest data or a specific user's data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Namespace {
    Guest,
    User(String),
}

impl Namespace {
    fn prefix(&self) -> String {
        match self {
            Namespace::Guest => "tomo_guest".to_string(),
            Namespace::User(id) => format!("tomo_user_{}", id),
        }
    }

    pub fn books_key(&self) -> String {
        format!("{}_books", self.prefix())
    }

    pub fn vocabulary_key(&self) -> String {
        format!("{}_vocabulary", self.prefix())
    }

    pub fn stats_key(&self) -> String {
        format!("{}_stats", self.prefix())
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Namespace::Guest => write!(f, "guest"),
            Namespace::User(id) => write!(f, "user {}", id),
        }
    }
}

/// Everything persisted under one namespace
#[derive(Debug, Default, Clone, PartialEq)]
pub struct NamespaceData {
    pub books: Vec<Book>,
    pub vocabulary: Vec<VocabularyWord>,
    pub stats: UserStats,
}

/// Gateway between the in-memory stores and the key-value backend
#[derive(Clone)]
pub struct Gateway {
    backend: Arc<dyn KeyValueBackend>,
}

impl Gateway {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    /// The underlying backend
    pub fn backend(&self) -> &Arc<dyn KeyValueBackend> {
        &self.backend
    }

    /// Persist the full store triple for a namespace
    ///
    /// Each collection is serialized independently to its own key.
    pub fn save(
        &self,
        namespace: &Namespace,
        books: &[Book],
        vocabulary: &[VocabularyWord],
        stats: &UserStats,
    ) -> StorageResult<()> {
        self.backend
            .set(&namespace.books_key(), &serde_json::to_string(books)?)?;
        self.backend
            .set(&namespace.vocabulary_key(), &serde_json::to_string(vocabulary)?)?;
        self.backend
            .set(&namespace.stats_key(), &serde_json::to_string(stats)?)?;
        Ok(())
    }

    /// Load the full store triple for a namespace
    ///
    /// Missing or corrupt blobs degrade to defaults; corruption is logged
    /// and otherwise treated as absent data.
    pub fn load(&self, namespace: &Namespace) -> NamespaceData {
        NamespaceData {
            books: self.read_or_default(&namespace.books_key()),
            vocabulary: self.read_or_default(&namespace.vocabulary_key()),
            stats: self.read_or_default(&namespace.stats_key()),
        }
    }

    /// Whether the namespace holds any non-empty book or vocabulary blob
    pub fn has_data(&self, namespace: &Namespace) -> bool {
        let non_empty = |key: &str| {
            matches!(
                self.backend.get(key),
                Ok(Some(ref raw)) if !raw.is_empty() && raw != "[]"
            )
        };
        non_empty(&namespace.books_key()) || non_empty(&namespace.vocabulary_key())
    }

    /// Remove all three blobs for a namespace
    pub fn clear(&self, namespace: &Namespace) -> StorageResult<()> {
        self.backend.remove(&namespace.books_key())?;
        self.backend.remove(&namespace.vocabulary_key())?;
        self.backend.remove(&namespace.stats_key())?;
        Ok(())
    }

    fn read_or_default<T>(&self, key: &str) -> T
    where
        T: serde::de::DeserializeOwned + Default,
    {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(e) => {
                warn!(key, error = %e, "failed to read stored data, starting empty");
                return T::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "stored data is corrupt, starting empty");
                T::default()
            }
        }
    }
}
