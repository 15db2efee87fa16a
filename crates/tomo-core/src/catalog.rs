//! Tabular catalog import
//!
//! Parses the CSV export format used by the big book-cataloging sites
//! (Goodreads-shaped): a header row locates the columns, data rows become
//! book drafts. The drafts are fed through the normal `add_book` path so
//! imported books receive the same gamification side effects as manual
//! adds.

use csv::ReaderBuilder;
use thiserror::Error;
use tracing::debug;

use crate::models::{BookDraft, Category, Language};

/// Catalog import failures; zero rows are imported on error
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("catalog file is empty")]
    Empty,

    #[error("missing required column(s): {0}")]
    MissingColumns(String),

    #[error("failed to read catalog: {0}")]
    Csv(#[from] csv::Error),
}

struct Columns {
    title: usize,
    author: usize,
    pages: Option<usize>,
    rating: Option<usize>,
    shelf: Option<usize>,
    isbn: Option<usize>,
    isbn13: Option<usize>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self, CatalogError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let title = find("title");
        let author = find("author");

        let missing: Vec<&str> = [("Title", title), ("Author", author)]
            .iter()
            .filter(|(_, idx)| idx.is_none())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(CatalogError::MissingColumns(missing.join(", ")));
        }

        Ok(Self {
            title: title.unwrap(),
            author: author.unwrap(),
            pages: find("number of pages"),
            rating: find("my rating"),
            shelf: find("exclusive shelf"),
            isbn: find("isbn"),
            isbn13: find("isbn13"),
        })
    }
}

/// Parse catalog text into book drafts
///
/// Rows with a blank title or author are skipped silently. Shelf values
/// map onto categories (`read` -> completed, `currently-reading` ->
/// reading, anything else -> want to read); the 5-point source rating is
/// doubled onto the 10-point scale; completed books get their current
/// page set to the full page count; the language defaults to English for
/// this import path.
pub fn parse(text: &str) -> Result<Vec<BookDraft>, CatalogError> {
    if text.trim().is_empty() {
        return Err(CatalogError::Empty);
    }

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let columns = Columns::locate(&headers)?;

    let mut drafts = Vec::new();
    for record in reader.records() {
        let record = record?;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();

        let title = field(columns.title);
        let author = field(columns.author);
        if title.is_empty() || author.is_empty() {
            continue;
        }

        let shelf = columns.shelf.map(field).unwrap_or("").to_lowercase();
        let category = match shelf.as_str() {
            "read" => Category::Completed,
            "currently-reading" => Category::Reading,
            _ => Category::WantToRead,
        };

        let total_pages: u32 = columns
            .pages
            .map(field)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let source_rating: u32 = columns
            .rating
            .map(field)
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);

        // ISBN13 preferred, plain ISBN as fallback
        let isbn = columns
            .isbn13
            .map(field)
            .map(strip_isbn_artifact)
            .filter(|v| !v.is_empty())
            .or_else(|| {
                columns
                    .isbn
                    .map(field)
                    .map(strip_isbn_artifact)
                    .filter(|v| !v.is_empty())
            })
            .unwrap_or_default();

        drafts.push(BookDraft {
            title: title.to_string(),
            author: author.to_string(),
            total_pages,
            current_page: if category == Category::Completed {
                total_pages
            } else {
                0
            },
            category,
            language: Language::En,
            rating: (source_rating * 2) as f64,
            comments: String::new(),
            cover_url: String::new(),
            isbn,
        });
    }

    debug!(count = drafts.len(), "parsed catalog rows");
    Ok(drafts)
}

// Spreadsheet exports wrap ISBNs as `="..."` to stop digit mangling.
fn strip_isbn_artifact(value: &str) -> String {
    let value = value.strip_prefix("=\"").unwrap_or(value);
    let value = value.strip_suffix('"').unwrap_or(value);
    value.to_string()
}
