//! Data models for TOMO
//!
//! Defines the core data structures: Book, VocabularyWord, and their
//! draft/patch companions. Field names serialize in camelCase so snapshots
//! stay interchangeable with the legacy export format.

use serde::{Deserialize, Serialize};

use crate::ids;

/// Reading status of a book
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    WantToRead,
    Reading,
    Completed,
    Abandoned,
}

impl Category {
    /// Short machine code, matching the serialized form
    pub fn code(&self) -> &'static str {
        match self {
            Category::WantToRead => "want_to_read",
            Category::Reading => "reading",
            Category::Completed => "completed",
            Category::Abandoned => "abandoned",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Category::WantToRead => "Want to read",
            Category::Reading => "Reading",
            Category::Completed => "Completed",
            Category::Abandoned => "Abandoned",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "want_to_read" => Ok(Category::WantToRead),
            "reading" => Ok(Category::Reading),
            "completed" => Ok(Category::Completed),
            "abandoned" => Ok(Category::Abandoned),
            other => Err(format!(
                "unknown category '{}' (expected want_to_read, reading, completed, abandoned)",
                other
            )),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Language of a book or vocabulary entry
///
/// Defaults to Spanish: legacy data blobs predate the language field and
/// were all Spanish-language entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
    Fr,
    De,
    It,
    Pt,
    Other,
}

impl Language {
    /// Two-letter code, or "other"
    pub fn code(&self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
            Language::Fr => "fr",
            Language::De => "de",
            Language::It => "it",
            Language::Pt => "pt",
            Language::Other => "other",
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Language::Es => "Spanish",
            Language::En => "English",
            Language::Fr => "French",
            Language::De => "German",
            Language::It => "Italian",
            Language::Pt => "Portuguese",
            Language::Other => "Other",
        }
    }

    /// Map an arbitrary language code onto the supported set
    ///
    /// Codes outside the supported set collapse to `Other`, mirroring how
    /// remote lookup results are folded into the app's language choices.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "es" => Language::Es,
            "en" => Language::En,
            "fr" => Language::Fr,
            "de" => Language::De,
            "it" => Language::It,
            "pt" => Language::Pt,
            _ => Language::Other,
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "es" | "en" | "fr" | "de" | "it" | "pt" | "other" => Ok(Language::from_code(s)),
            other => Err(format!(
                "unknown language '{}' (expected es, en, fr, de, it, pt, other)",
                other
            )),
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A book in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Opaque unique identifier
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub total_pages: u32,
    /// Current reading position; not capped at `total_pages`
    #[serde(default)]
    pub current_page: u32,
    pub category: Category,
    #[serde(default)]
    pub language: Language,
    /// 0 means unrated, otherwise a 10-point scale
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub comments: String,
    /// External cover image URL, empty when none
    #[serde(default)]
    pub cover_url: String,
    #[serde(default)]
    pub isbn: String,
    /// Creation timestamp in epoch milliseconds, used for ordering
    pub date_added: i64,
    /// Derived from `current_page` / `total_pages`; never set directly
    #[serde(default)]
    pub percentage: u32,
}

/// Input fields for creating a book
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub total_pages: u32,
    pub current_page: u32,
    pub category: Category,
    pub language: Language,
    pub rating: f64,
    pub comments: String,
    pub cover_url: String,
    pub isbn: String,
}

/// Partial update for a book
///
/// Only the populated fields are applied; the derived `percentage` is
/// recomputed whenever `total_pages` or `current_page` is touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub total_pages: Option<u32>,
    pub current_page: Option<u32>,
    pub category: Option<Category>,
    pub language: Option<Language>,
    pub rating: Option<f64>,
    pub comments: Option<String>,
    pub cover_url: Option<String>,
    pub isbn: Option<String>,
}

impl Book {
    /// Create a new book from draft fields
    ///
    /// Trims all text fields, assigns a fresh id and creation timestamp,
    /// and computes the reading percentage.
    pub fn new(draft: BookDraft) -> Self {
        let mut book = Self {
            id: ids::generate(),
            title: draft.title.trim().to_string(),
            author: draft.author.trim().to_string(),
            total_pages: draft.total_pages,
            current_page: draft.current_page,
            category: draft.category,
            language: draft.language,
            rating: if draft.rating.is_finite() {
                draft.rating
            } else {
                0.0
            },
            comments: draft.comments.trim().to_string(),
            cover_url: draft.cover_url.trim().to_string(),
            isbn: draft.isbn.trim().to_string(),
            date_added: ids::timestamp_millis(),
            percentage: 0,
        };
        book.refresh_percentage();
        book
    }

    /// Apply a partial update, re-deriving `percentage` when relevant
    pub fn apply(&mut self, patch: &BookPatch) {
        if let Some(ref title) = patch.title {
            self.title = title.clone();
        }
        if let Some(ref author) = patch.author {
            self.author = author.clone();
        }
        if let Some(ref comments) = patch.comments {
            self.comments = comments.clone();
        }
        if let Some(ref cover_url) = patch.cover_url {
            self.cover_url = cover_url.clone();
        }
        if let Some(ref isbn) = patch.isbn {
            self.isbn = isbn.clone();
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(language) = patch.language {
            self.language = language;
        }
        if let Some(rating) = patch.rating {
            self.rating = if rating.is_finite() { rating } else { 0.0 };
        }
        if patch.total_pages.is_some() || patch.current_page.is_some() {
            if let Some(total) = patch.total_pages {
                self.total_pages = total;
            }
            if let Some(current) = patch.current_page {
                self.current_page = current;
            }
            self.refresh_percentage();
        }
    }

    fn refresh_percentage(&mut self) {
        self.percentage = compute_percentage(self.current_page, self.total_pages);
    }
}

/// Percentage read, rounded to the nearest whole point
///
/// Zero when `total_pages` is zero. `current_page` beyond `total_pages`
/// yields values over 100.
pub fn compute_percentage(current_page: u32, total_pages: u32) -> u32 {
    if total_pages == 0 {
        return 0;
    }
    (current_page as f64 / total_pages as f64 * 100.0).round() as u32
}

/// A vocabulary entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyWord {
    /// Opaque unique identifier
    pub id: String,
    pub word: String,
    #[serde(default)]
    pub language: Language,
    pub definition: String,
    /// Example sentence the word was encountered in
    #[serde(default)]
    pub context: String,
    /// Creation timestamp in epoch milliseconds
    pub date_added: i64,
}

/// Input fields for creating a vocabulary entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordDraft {
    pub word: String,
    pub language: Language,
    pub definition: String,
    pub context: String,
}

/// Partial update for a vocabulary entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordPatch {
    pub word: Option<String>,
    pub language: Option<Language>,
    pub definition: Option<String>,
    pub context: Option<String>,
}

impl VocabularyWord {
    /// Create a new vocabulary entry from draft fields
    pub fn new(draft: WordDraft) -> Self {
        Self {
            id: ids::generate(),
            word: draft.word.trim().to_string(),
            language: draft.language,
            definition: draft.definition.trim().to_string(),
            context: draft.context.trim().to_string(),
            date_added: ids::timestamp_millis(),
        }
    }

    /// Apply a partial update
    pub fn apply(&mut self, patch: &WordPatch) {
        if let Some(ref word) = patch.word {
            self.word = word.clone();
        }
        if let Some(language) = patch.language {
            self.language = language;
        }
        if let Some(ref definition) = patch.definition {
            self.definition = definition.clone();
        }
        if let Some(ref context) = patch.context {
            self.context = context.clone();
        }
    }
}
