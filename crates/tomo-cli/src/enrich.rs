//! Background cover enrichment
//!
//! After a catalog import, books arrive without cover images. The sweep
//! looks each one up in sequence, writing `cover_url` back through the
//! library (which persists per completed item). A fixed delay between
//! requests respects the lookup service's rate limits.
//!
//! The sweep is fire-and-forget: cancelling (or dropping the process)
//! simply stops further writes, and partial enrichment is a valid
//! terminal state. A sweep write can race an edit made after the sweep
//! began; whole-collection writes mean the last flush wins.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use tomo_core::{Book, Library};

use crate::lookup::LookupClient;

/// Delay between lookup requests
pub const REQUEST_DELAY: Duration = Duration::from_millis(300);

/// What the sweep needs to know about one imported book
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichTarget {
    pub id: String,
    pub title: String,
    pub author: String,
    pub isbn: String,
}

impl EnrichTarget {
    pub fn from_book(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
        }
    }

    /// Lookup query: ISBN when one is usable, title + author otherwise
    pub fn query(&self) -> String {
        let isbn = clean_isbn(&self.isbn);
        if isbn.len() >= 10 {
            format!("isbn:{}", isbn)
        } else {
            format!("{} {}", self.title, self.author)
        }
    }
}

/// Handle to a running sweep
pub struct EnrichmentHandle {
    cancel: Arc<AtomicBool>,
    thread: JoinHandle<usize>,
}

impl EnrichmentHandle {
    /// Stop the sweep after the in-flight item
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Wait for the sweep to finish; returns the number of covers written
    pub fn join(self) -> usize {
        self.thread.join().unwrap_or(0)
    }
}

/// Spawn a background sweep over the given targets
///
/// Targets that already have a cover should be filtered out by the
/// caller. Books deleted while the sweep runs are skipped.
pub fn spawn(
    library: Arc<Mutex<Library>>,
    targets: Vec<EnrichTarget>,
    client: LookupClient,
) -> EnrichmentHandle {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();

    let thread = thread::spawn(move || {
        let mut updated = 0;
        for target in targets {
            if flag.load(Ordering::Relaxed) {
                debug!("enrichment sweep cancelled");
                break;
            }

            if let Some(url) = client.cover_for(&target.query()) {
                let Ok(mut library) = library.lock() else {
                    break;
                };
                match library.set_cover(&target.id, &url) {
                    Ok(true) => updated += 1,
                    Ok(false) => debug!(id = %target.id, "book gone, skipping cover"),
                    Err(e) => warn!(id = %target.id, error = %e, "failed to persist cover"),
                }
            }

            thread::sleep(REQUEST_DELAY);
        }
        updated
    });

    EnrichmentHandle { cancel, thread }
}

fn clean_isbn(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit() || *c == 'X' || *c == 'x')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(title: &str, isbn: &str) -> EnrichTarget {
        EnrichTarget {
            id: "id1".to_string(),
            title: title.to_string(),
            author: "Author".to_string(),
            isbn: isbn.to_string(),
        }
    }

    #[test]
    fn test_query_prefers_isbn() {
        assert_eq!(
            target("Dune", "978-0-441-47812-5").query(),
            "isbn:9780441478125"
        );
    }

    #[test]
    fn test_query_falls_back_to_title_author() {
        assert_eq!(target("Dune", "").query(), "Dune Author");
        // Too short after cleaning
        assert_eq!(target("Dune", "12-34").query(), "Dune Author");
    }

    #[test]
    fn test_clean_isbn_keeps_check_digit() {
        assert_eq!(clean_isbn("0-8044-2957-X"), "080442957X");
    }
}
