//! JSON snapshot export/import
//!
//! A snapshot is a full-fidelity backup of the book and vocabulary
//! collections: `{ books, vocabulary, exportDate }`. For backward
//! compatibility the importer also accepts a bare book array (the original
//! export format, before vocabulary existed).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Book, VocabularyWord};

/// A full export of books and vocabulary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub books: Vec<Book>,
    #[serde(default)]
    pub vocabulary: Vec<VocabularyWord>,
    pub export_date: DateTime<Utc>,
}

/// The collections recovered from a snapshot file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotData {
    pub books: Vec<Book>,
    pub vocabulary: Vec<VocabularyWord>,
}

/// Snapshot import failures; nothing is imported on error
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("invalid snapshot JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Build a snapshot of the given collections, stamped with the export time
pub fn export(books: &[Book], vocabulary: &[VocabularyWord]) -> Snapshot {
    Snapshot {
        books: books.to_vec(),
        vocabulary: vocabulary.to_vec(),
        export_date: Utc::now(),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawSnapshot {
    Full {
        books: Vec<Book>,
        #[serde(default)]
        vocabulary: Vec<VocabularyWord>,
    },
    // Legacy exports were a bare book array
    Legacy(Vec<Book>),
}

/// Parse snapshot text in either the object or the legacy bare-array form
///
/// On error the original state is untouched and zero entities are
/// imported; applying the result is the caller's decision (wholesale
/// replacement via `Library::replace_all`).
pub fn parse(raw: &str) -> Result<SnapshotData, SnapshotError> {
    let parsed: RawSnapshot = serde_json::from_str(raw)?;
    Ok(match parsed {
        RawSnapshot::Full { books, vocabulary } => SnapshotData { books, vocabulary },
        RawSnapshot::Legacy(books) => SnapshotData {
            books,
            vocabulary: Vec::new(),
        },
    })
}
