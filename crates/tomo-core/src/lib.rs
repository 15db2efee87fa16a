//! TOMO Core Library
//!
//! This crate provides the core functionality for TOMO, a local-first
//! book-tracking and vocabulary-learning tool.
//!
//! # Architecture
//!
//! All data lives in memory in the [`store::Library`] and is persisted
//! synchronously after every mutation to a string-keyed local store,
//! scoped by the active session's namespace (guest, or a registered
//! user). Displayed orderings are derived by the query engine; they are
//! never stored.
//!
//! # Quick Start
//!
//! ```text
//! let backend = Arc::new(FileBackend::new(config.store_dir())?);
//! let session = SessionManager::new(backend);
//! let mut library = Library::load(session.gateway(), session.namespace());
//!
//! library.run_daily_streak()?;
//! let book = library.add_book(draft)?;
//! let view = query::query_books(library.books(), filter, "", None, None);
//! ```
//!
//! # Modules
//!
//! - `store`: unified store for the active namespace (main entry point)
//! - `models`: books, vocabulary words, drafts and patches
//! - `query`: filter/search/sort/paginate views
//! - `gamification`: XP, levels, and the daily streak
//! - `storage`: key-value backends and the persistence gateway
//! - `session`: accounts, the active session, guest migration
//! - `snapshot`: JSON backup export/import
//! - `catalog`: tabular (CSV) catalog import
//! - `config`: application configuration

pub mod catalog;
pub mod config;
pub mod gamification;
pub mod ids;
pub mod models;
pub mod query;
pub mod session;
pub mod snapshot;
pub mod storage;
pub mod store;

pub use catalog::CatalogError;
pub use config::Config;
pub use gamification::{Notification, Notifier, UserStats, XpReason};
pub use models::{
    Book, BookDraft, BookPatch, Category, Language, VocabularyWord, WordDraft, WordPatch,
};
pub use query::{BookFilter, Page, SortKey};
pub use session::{ActiveUser, AuthError, SessionManager, Theme, UserAccount};
pub use snapshot::{Snapshot, SnapshotError};
pub use storage::{
    FileBackend, Gateway, KeyValueBackend, MemoryBackend, Namespace, StorageError,
};
pub use store::{CategoryCounts, Library};
