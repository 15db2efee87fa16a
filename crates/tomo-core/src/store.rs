//! Unified store for the active namespace
//!
//! The `Library` holds the in-memory book and vocabulary collections plus
//! the gamification stats, and coordinates:
//! - mutation (create/update/delete with input normalization)
//! - gamification side effects (XP grants, lifetime counters)
//! - synchronous persistence (every mutator flushes the full namespace
//!   before returning)
//!
//! ## Usage
//!
//! ```ignore
//! let mut library = Library::load(gateway, Namespace::Guest);
//!
//! let book = library.add_book(draft)?;
//! let visible = query::query_books(library.books(), filter, "", None, None);
//! ```

use chrono::Local;
use serde::Serialize;
use tracing::info;

use crate::gamification::{
    NoopNotifier, Notifier, UserStats, XpReason, XP_BOOK_ADDED, XP_BOOK_FINISHED, XP_WORD_ADDED,
};
use crate::models::{Book, BookDraft, BookPatch, Category, VocabularyWord, WordDraft, WordPatch};
use crate::storage::{Gateway, Namespace, StorageResult};

/// Book totals per category
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub total: usize,
    pub want_to_read: usize,
    pub reading: usize,
    pub completed: usize,
    pub abandoned: usize,
}

/// The active namespace's data and its operations
pub struct Library {
    books: Vec<Book>,
    vocabulary: Vec<VocabularyWord>,
    stats: UserStats,
    gateway: Gateway,
    namespace: Namespace,
    notifier: Box<dyn Notifier>,
}

impl Library {
    /// Load the library for a namespace, with events discarded
    pub fn load(gateway: Gateway, namespace: Namespace) -> Self {
        Self::with_notifier(gateway, namespace, Box::new(NoopNotifier))
    }

    /// Load the library for a namespace with a notification sink
    ///
    /// Missing or corrupt persisted data degrades to an empty library.
    pub fn with_notifier(
        gateway: Gateway,
        namespace: Namespace,
        notifier: Box<dyn Notifier>,
    ) -> Self {
        let data = gateway.load(&namespace);
        info!(
            %namespace,
            books = data.books.len(),
            words = data.vocabulary.len(),
            "library loaded"
        );
        Self {
            books: data.books,
            vocabulary: data.vocabulary,
            stats: data.stats,
            gateway,
            namespace,
            notifier,
        }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn vocabulary(&self) -> &[VocabularyWord] {
        &self.vocabulary
    }

    pub fn stats(&self) -> &UserStats {
        &self.stats
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    // ==================== Book Operations ====================

    /// Create a book from the draft and insert it at the head
    ///
    /// Grants the book-added XP; a book added directly in the completed
    /// category also gets the completion XP and counts as read.
    pub fn add_book(&mut self, draft: BookDraft) -> StorageResult<Book> {
        let book = Book::new(draft);
        self.books.insert(0, book.clone());

        self.stats
            .grant_xp(XP_BOOK_ADDED, XpReason::BookAdded, self.notifier.as_ref());
        if book.category == Category::Completed {
            self.stats.grant_xp(
                XP_BOOK_FINISHED,
                XpReason::BookFinished,
                self.notifier.as_ref(),
            );
            self.stats.books_read += 1;
        }

        self.flush()?;
        Ok(book)
    }

    /// Merge a partial update into a book
    ///
    /// Returns the updated book, or `None` when the id is absent (no-op).
    /// Transitioning into the completed category grants the completion XP
    /// exactly once per transition; an update that keeps the category at
    /// completed grants nothing.
    pub fn update_book(&mut self, id: &str, patch: &BookPatch) -> StorageResult<Option<Book>> {
        let Some(index) = self.books.iter().position(|b| b.id == id) else {
            return Ok(None);
        };

        let was_completed = self.books[index].category == Category::Completed;
        self.books[index].apply(patch);
        let updated = self.books[index].clone();

        if !was_completed && updated.category == Category::Completed {
            self.stats.grant_xp(
                XP_BOOK_FINISHED,
                XpReason::BookFinished,
                self.notifier.as_ref(),
            );
            self.stats.books_read += 1;
        }

        self.flush()?;
        Ok(Some(updated))
    }

    /// Delete a book by id; absent ids are a no-op
    ///
    /// Returns whether a book was removed. Idempotent.
    pub fn delete_book(&mut self, id: &str) -> StorageResult<bool> {
        let before = self.books.len();
        self.books.retain(|b| b.id != id);
        let removed = self.books.len() < before;
        self.flush()?;
        Ok(removed)
    }

    /// Look up a book by id
    pub fn book(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|b| b.id == id)
    }

    /// Set a book's cover image URL
    ///
    /// Targeted write used by the cover-enrichment sweep; persists per
    /// completed item. Returns whether the book exists.
    pub fn set_cover(&mut self, id: &str, cover_url: &str) -> StorageResult<bool> {
        let Some(book) = self.books.iter_mut().find(|b| b.id == id) else {
            return Ok(false);
        };
        book.cover_url = cover_url.to_string();
        self.flush()?;
        Ok(true)
    }

    // ==================== Vocabulary Operations ====================

    /// Create a vocabulary entry from the draft and append it
    ///
    /// Grants the word-added XP and counts the word as learned.
    pub fn add_word(&mut self, draft: WordDraft) -> StorageResult<VocabularyWord> {
        let word = VocabularyWord::new(draft);
        self.vocabulary.push(word.clone());

        self.stats
            .grant_xp(XP_WORD_ADDED, XpReason::WordAdded, self.notifier.as_ref());
        self.stats.words_learned += 1;

        self.flush()?;
        Ok(word)
    }

    /// Merge a partial update into a vocabulary entry
    pub fn update_word(
        &mut self,
        id: &str,
        patch: &WordPatch,
    ) -> StorageResult<Option<VocabularyWord>> {
        let Some(word) = self.vocabulary.iter_mut().find(|w| w.id == id) else {
            return Ok(None);
        };
        word.apply(patch);
        let updated = word.clone();
        self.flush()?;
        Ok(Some(updated))
    }

    /// Delete a vocabulary entry by id; absent ids are a no-op
    pub fn delete_word(&mut self, id: &str) -> StorageResult<bool> {
        let before = self.vocabulary.len();
        self.vocabulary.retain(|w| w.id != id);
        let removed = self.vocabulary.len() < before;
        self.flush()?;
        Ok(removed)
    }

    /// Look up a vocabulary entry by id
    pub fn word(&self, id: &str) -> Option<&VocabularyWord> {
        self.vocabulary.iter().find(|w| w.id == id)
    }

    // ==================== Bulk and Derived ====================

    /// Replace both collections wholesale (snapshot import)
    pub fn replace_all(
        &mut self,
        books: Vec<Book>,
        vocabulary: Vec<VocabularyWord>,
    ) -> StorageResult<()> {
        self.books = books;
        self.vocabulary = vocabulary;
        self.flush()
    }

    /// Book totals per category
    pub fn category_counts(&self) -> CategoryCounts {
        let mut counts = CategoryCounts {
            total: self.books.len(),
            ..CategoryCounts::default()
        };
        for book in &self.books {
            match book.category {
                Category::WantToRead => counts.want_to_read += 1,
                Category::Reading => counts.reading += 1,
                Category::Completed => counts.completed += 1,
                Category::Abandoned => counts.abandoned += 1,
            }
        }
        counts
    }

    /// Run the daily streak check against the local calendar date
    ///
    /// Call once per session activation, before the first render.
    pub fn run_daily_streak(&mut self) -> StorageResult<bool> {
        self.run_daily_streak_on(Local::now().date_naive())
    }

    /// Streak check against an explicit date
    pub fn run_daily_streak_on(&mut self, today: chrono::NaiveDate) -> StorageResult<bool> {
        let changed = self
            .stats
            .check_daily_streak(today, self.notifier.as_ref());
        if changed {
            self.flush()?;
        }
        Ok(changed)
    }

    fn flush(&self) -> StorageResult<()> {
        self.gateway
            .save(&self.namespace, &self.books, &self.vocabulary, &self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gamification::{Notification, XP_DAILY_VISIT};
    use crate::models::Language;
    use crate::storage::MemoryBackend;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn gateway() -> Gateway {
        Gateway::new(Arc::new(MemoryBackend::new()))
    }

    fn library(gateway: &Gateway) -> Library {
        Library::load(gateway.clone(), Namespace::Guest)
    }

    fn draft(title: &str, category: Category) -> BookDraft {
        BookDraft {
            title: title.to_string(),
            author: "Author".to_string(),
            total_pages: 100,
            category,
            ..BookDraft::default()
        }
    }

    #[test]
    fn test_add_book_inserts_at_head_and_grants_xp() {
        let gw = gateway();
        let mut lib = library(&gw);

        lib.add_book(draft("First", Category::Reading)).unwrap();
        lib.add_book(draft("Second", Category::Reading)).unwrap();

        assert_eq!(lib.books()[0].title, "Second");
        assert_eq!(lib.books()[1].title, "First");
        assert_eq!(lib.stats().xp, 2 * XP_BOOK_ADDED);
        assert_eq!(lib.stats().books_read, 0);
    }

    #[test]
    fn test_add_completed_book_grants_completion() {
        let gw = gateway();
        let mut lib = library(&gw);

        lib.add_book(draft("Done", Category::Completed)).unwrap();

        assert_eq!(lib.stats().xp, XP_BOOK_ADDED + XP_BOOK_FINISHED);
        assert_eq!(lib.stats().books_read, 1);
    }

    #[test]
    fn test_add_word_appends_and_counts() {
        let gw = gateway();
        let mut lib = library(&gw);

        lib.add_word(WordDraft {
            word: "uno".to_string(),
            definition: "one".to_string(),
            ..WordDraft::default()
        })
        .unwrap();
        lib.add_word(WordDraft {
            word: "dos".to_string(),
            definition: "two".to_string(),
            ..WordDraft::default()
        })
        .unwrap();

        assert_eq!(lib.vocabulary()[0].word, "uno");
        assert_eq!(lib.vocabulary()[1].word, "dos");
        assert_eq!(lib.stats().xp, 2 * XP_WORD_ADDED);
        assert_eq!(lib.stats().words_learned, 2);
    }

    #[test]
    fn test_completion_transition_grants_once() {
        let gw = gateway();
        let mut lib = library(&gw);
        let book = lib.add_book(draft("WIP", Category::Reading)).unwrap();
        let xp_before = lib.stats().xp;

        // reading -> completed: one grant
        lib.update_book(
            &book.id,
            &BookPatch {
                category: Some(Category::Completed),
                ..BookPatch::default()
            },
        )
        .unwrap();
        assert_eq!(lib.stats().xp, xp_before + XP_BOOK_FINISHED);
        assert_eq!(lib.stats().books_read, 1);

        // completed -> completed: no re-grant
        lib.update_book(
            &book.id,
            &BookPatch {
                category: Some(Category::Completed),
                rating: Some(9.0),
                ..BookPatch::default()
            },
        )
        .unwrap();
        assert_eq!(lib.stats().xp, xp_before + XP_BOOK_FINISHED);
        assert_eq!(lib.stats().books_read, 1);

        // leaving and re-entering completed grants again
        lib.update_book(
            &book.id,
            &BookPatch {
                category: Some(Category::Reading),
                ..BookPatch::default()
            },
        )
        .unwrap();
        lib.update_book(
            &book.id,
            &BookPatch {
                category: Some(Category::Completed),
                ..BookPatch::default()
            },
        )
        .unwrap();
        assert_eq!(lib.stats().books_read, 2);
    }

    #[test]
    fn test_update_recomputes_percentage() {
        let gw = gateway();
        let mut lib = library(&gw);
        let book = lib.add_book(draft("Pages", Category::Reading)).unwrap();

        let updated = lib
            .update_book(
                &book.id,
                &BookPatch {
                    current_page: Some(50),
                    ..BookPatch::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.percentage, 50);
    }

    #[test]
    fn test_update_absent_id_is_noop() {
        let gw = gateway();
        let mut lib = library(&gw);
        let result = lib
            .update_book(
                "missing",
                &BookPatch {
                    title: Some("x".to_string()),
                    ..BookPatch::default()
                },
            )
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let gw = gateway();
        let mut lib = library(&gw);
        let book = lib.add_book(draft("Gone", Category::Reading)).unwrap();

        assert!(lib.delete_book(&book.id).unwrap());
        let after_first = lib.books().to_vec();

        assert!(!lib.delete_book(&book.id).unwrap());
        assert_eq!(lib.books(), after_first.as_slice());

        // Lifetime counters are unaffected by deletion
        assert_eq!(lib.stats().xp, XP_BOOK_ADDED);
    }

    #[test]
    fn test_mutations_persist_immediately() {
        let gw = gateway();
        let mut lib = library(&gw);
        let book = lib.add_book(draft("Persisted", Category::Reading)).unwrap();

        // A second library over the same backend sees the write
        let reloaded = library(&gw);
        assert_eq!(reloaded.books().len(), 1);
        assert_eq!(reloaded.books()[0].id, book.id);
        assert_eq!(reloaded.stats().xp, XP_BOOK_ADDED);
    }

    #[test]
    fn test_set_cover_persists() {
        let gw = gateway();
        let mut lib = library(&gw);
        let book = lib.add_book(draft("Covered", Category::Reading)).unwrap();

        assert!(lib.set_cover(&book.id, "https://covers.example/1.jpg").unwrap());
        assert!(!lib.set_cover("missing", "https://covers.example/2.jpg").unwrap());

        let reloaded = library(&gw);
        assert_eq!(
            reloaded.book(&book.id).unwrap().cover_url,
            "https://covers.example/1.jpg"
        );
    }

    #[test]
    fn test_replace_all() {
        let gw = gateway();
        let mut lib = library(&gw);
        lib.add_book(draft("Old", Category::Reading)).unwrap();

        let new_books = vec![Book::new(draft("New", Category::WantToRead))];
        lib.replace_all(new_books, Vec::new()).unwrap();

        assert_eq!(lib.books().len(), 1);
        assert_eq!(lib.books()[0].title, "New");
        assert!(lib.vocabulary().is_empty());

        let reloaded = library(&gw);
        assert_eq!(reloaded.books()[0].title, "New");
    }

    #[test]
    fn test_category_counts() {
        let gw = gateway();
        let mut lib = library(&gw);
        lib.add_book(draft("A", Category::Reading)).unwrap();
        lib.add_book(draft("B", Category::Completed)).unwrap();
        lib.add_book(draft("C", Category::Completed)).unwrap();

        let counts = lib.category_counts();
        assert_eq!(counts.total, 3);
        assert_eq!(counts.reading, 1);
        assert_eq!(counts.completed, 2);
        assert_eq!(counts.want_to_read, 0);
    }

    #[test]
    fn test_daily_streak_runs_once_and_persists() {
        let gw = gateway();
        let mut lib = library(&gw);
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();

        assert!(lib.run_daily_streak_on(today).unwrap());
        assert!(!lib.run_daily_streak_on(today).unwrap());

        assert_eq!(lib.stats().streak, 1);
        assert_eq!(lib.stats().xp, XP_DAILY_VISIT);

        let reloaded = library(&gw);
        assert_eq!(reloaded.stats().streak, 1);
    }

    #[test]
    fn test_notifier_receives_events() {
        use crate::gamification::test_support::RecordingNotifier;

        let gw = gateway();
        let notifier = Arc::new(RecordingNotifier::new());

        struct Forward(Arc<RecordingNotifier>);
        impl crate::gamification::Notifier for Forward {
            fn notify(&self, n: Notification) {
                self.0.notify(n);
            }
        }

        let mut lib = Library::with_notifier(
            gw.clone(),
            Namespace::Guest,
            Box::new(Forward(notifier.clone())),
        );
        lib.add_word(WordDraft {
            word: "hola".to_string(),
            definition: "hello".to_string(),
            language: Language::Es,
            context: String::new(),
        })
        .unwrap();

        assert_eq!(
            notifier.events(),
            vec![Notification::XpGained {
                amount: XP_WORD_ADDED,
                reason: XpReason::WordAdded
            }]
        );
    }
}
