//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use tomo_core::gamification::level_title;
use tomo_core::{Book, CategoryCounts, Notification, Notifier, UserStats, VocabularyWord};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Check if output is in JSON mode
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Whether interactive confirmation prompts should be shown
    pub fn should_prompt(&self) -> bool {
        matches!(self.format, OutputFormat::Human)
    }

    /// Print a success message (human mode only)
    pub fn success(&self, message: &str) {
        if matches!(self.format, OutputFormat::Human) {
            println!("{}", message);
        }
    }

    /// Print a single book with full details
    pub fn print_book(&self, book: &Book) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:        {}", book.id);
                println!("Title:     {}", book.title);
                println!("Author:    {}", book.author);
                println!("Category:  {}", book.category.label());
                println!("Language:  {}", book.language.name());
                println!(
                    "Progress:  {} / {} pages ({}%)",
                    book.current_page, book.total_pages, book.percentage
                );
                if book.rating > 0.0 {
                    println!("Rating:    {}/10", book.rating);
                }
                if !book.isbn.is_empty() {
                    println!("ISBN:      {}", book.isbn);
                }
                if !book.cover_url.is_empty() {
                    println!("Cover:     {}", book.cover_url);
                }
                if !book.comments.is_empty() {
                    println!("Comments:  {}", book.comments);
                }
                if let Some(added) = format_date_added(book.date_added) {
                    println!("Added:     {}", added);
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(book).unwrap());
            }
            OutputFormat::Quiet => {
                println!("{}", book.id);
            }
        }
    }

    /// Print a page of books
    pub fn print_books(&self, books: &[Book], total: usize, page: usize, pages: usize) {
        match self.format {
            OutputFormat::Human => {
                if books.is_empty() {
                    println!("No books found.");
                    return;
                }
                for book in books {
                    println!(
                        "{} | {} | {} | {} | {:>3}%",
                        &book.id[..8.min(book.id.len())],
                        truncate(&book.title, 32),
                        truncate(&book.author, 24),
                        book.category.code(),
                        book.percentage
                    );
                }
                if pages > 1 {
                    println!("\n{} book(s), page {} of {}", total, page, pages);
                } else {
                    println!("\n{} book(s)", total);
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(books).unwrap());
            }
            OutputFormat::Quiet => {
                for book in books {
                    println!("{}", book.id);
                }
            }
        }
    }

    /// Print a single vocabulary entry with full details
    pub fn print_word(&self, word: &VocabularyWord) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:         {}", word.id);
                println!("Word:       {}", word.word);
                println!("Language:   {}", word.language.name());
                println!("Definition: {}", word.definition);
                if !word.context.is_empty() {
                    println!("Context:    \"{}\"", word.context);
                }
                if let Some(added) = format_date_added(word.date_added) {
                    println!("Added:      {}", added);
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(word).unwrap());
            }
            OutputFormat::Quiet => {
                println!("{}", word.id);
            }
        }
    }

    /// Print a page of vocabulary entries
    pub fn print_words(&self, words: &[VocabularyWord], total: usize, page: usize, pages: usize) {
        match self.format {
            OutputFormat::Human => {
                if words.is_empty() {
                    println!("No words found.");
                    return;
                }
                for word in words {
                    println!(
                        "{} | {} | {} | {}",
                        &word.id[..8.min(word.id.len())],
                        truncate(&word.word, 20),
                        word.language.code(),
                        truncate(&word.definition, 48)
                    );
                }
                if pages > 1 {
                    println!("\n{} word(s), page {} of {}", total, page, pages);
                } else {
                    println!("\n{} word(s)", total);
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(words).unwrap());
            }
            OutputFormat::Quiet => {
                for word in words {
                    println!("{}", word.id);
                }
            }
        }
    }

    /// Print the statistics panel
    pub fn print_stats(&self, counts: &CategoryCounts, stats: &UserStats, streak_label: &str) {
        match self.format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "books": counts,
                        "xp": stats.xp,
                        "level": stats.level,
                        "title": level_title(stats.level),
                        "nextThreshold": stats.next_threshold(),
                        "streak": stats.streak,
                        "booksRead": stats.books_read,
                        "wordsLearned": stats.words_learned,
                    })
                );
            }
            OutputFormat::Quiet => {
                println!("{}", stats.xp);
            }
            OutputFormat::Human => {
                println!("Library");
                println!("  Total:        {}", counts.total);
                println!("  Want to read: {}", counts.want_to_read);
                println!("  Reading:      {}", counts.reading);
                println!("  Completed:    {}", counts.completed);
                println!("  Abandoned:    {}", counts.abandoned);
                println!();
                println!(
                    "Level {} ({}) - {} XP{}",
                    stats.level,
                    level_title(stats.level),
                    stats.xp,
                    match stats.next_threshold() {
                        Some(next) => format!(" / {} to next level", next),
                        None => String::new(),
                    }
                );
                println!(
                    "Books read: {} | Words learned: {} | Streak: {}",
                    stats.books_read, stats.words_learned, streak_label
                );
            }
        }
    }
}

/// Notifier that renders gamification events as toasts
///
/// Only the human format prints; JSON and quiet output stay clean for
/// scripting.
pub struct ToastNotifier {
    format: OutputFormat,
}

impl ToastNotifier {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

impl Notifier for ToastNotifier {
    fn notify(&self, notification: Notification) {
        if !matches!(self.format, OutputFormat::Human) {
            return;
        }
        match notification {
            Notification::XpGained { amount, reason } => {
                println!("+{} XP: {}", amount, reason);
            }
            Notification::LevelUp { level } => {
                println!("Level up! You are now level {} ({})", level, level_title(level));
            }
        }
    }
}

fn format_date_added(millis: i64) -> Option<String> {
    use chrono::{Local, TimeZone};
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// Truncate a string for column display
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        // Quiet wins over json
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a longer title here", 10), "a longer …");
    }
}
