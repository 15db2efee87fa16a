//! Derived views over the entity stores
//!
//! Filter, search, sort, and paginate, applied in that fixed order. The
//! stores keep insertion order; every displayed ordering is derived here.

use crate::models::{Book, Category, Language, VocabularyWord};

/// Default page size for the book view
pub const BOOKS_PAGE_SIZE: usize = 12;
/// Default page size for the vocabulary view
pub const WORDS_PAGE_SIZE: usize = 20;

/// Filter state for the book view; `None` means "all"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub category: Option<Category>,
    pub language: Option<Language>,
}

/// Sort order for the book view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    DateDesc,
    DateAsc,
    TitleAsc,
    TitleDesc,
    AuthorAsc,
    AuthorDesc,
    RatingAsc,
    RatingDesc,
}

impl SortKey {
    /// Parse a sort key string
    ///
    /// Unrecognized keys yield `None`; passing `None` to [`query_books`]
    /// leaves the order unchanged.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "date_desc" => Some(SortKey::DateDesc),
            "date_asc" => Some(SortKey::DateAsc),
            "title_asc" => Some(SortKey::TitleAsc),
            "title_desc" => Some(SortKey::TitleDesc),
            "author_asc" => Some(SortKey::AuthorAsc),
            "author_desc" => Some(SortKey::AuthorDesc),
            "rating_asc" => Some(SortKey::RatingAsc),
            "rating_desc" => Some(SortKey::RatingDesc),
            _ => None,
        }
    }
}

/// A 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: usize,
    pub size: usize,
}

impl Page {
    /// Page of the book view at the default size
    pub fn books(number: usize) -> Self {
        Self {
            number,
            size: BOOKS_PAGE_SIZE,
        }
    }

    /// Page of the vocabulary view at the default size
    pub fn words(number: usize) -> Self {
        Self {
            number,
            size: WORDS_PAGE_SIZE,
        }
    }
}

/// Query the book collection
///
/// Pipeline: category filter, language filter, case-insensitive substring
/// search over title OR author OR comments, sort, then the page slice.
/// `sort` of `None` keeps the incoming order (stable no-op); `page` of
/// `None` returns the whole result.
pub fn query_books(
    books: &[Book],
    filter: BookFilter,
    search: &str,
    sort: Option<SortKey>,
    page: Option<Page>,
) -> Vec<Book> {
    let needle = search.trim().to_lowercase();

    let mut result: Vec<Book> = books
        .iter()
        .filter(|book| match filter.category {
            Some(category) => book.category == category,
            None => true,
        })
        .filter(|book| match filter.language {
            Some(language) => book.language == language,
            None => true,
        })
        .filter(|book| {
            needle.is_empty()
                || book.title.to_lowercase().contains(&needle)
                || book.author.to_lowercase().contains(&needle)
                || book.comments.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();

    if let Some(sort) = sort {
        match sort {
            SortKey::DateDesc => result.sort_by(|a, b| b.date_added.cmp(&a.date_added)),
            SortKey::DateAsc => result.sort_by(|a, b| a.date_added.cmp(&b.date_added)),
            SortKey::TitleAsc => result.sort_by(|a, b| fold(&a.title).cmp(&fold(&b.title))),
            SortKey::TitleDesc => result.sort_by(|a, b| fold(&b.title).cmp(&fold(&a.title))),
            SortKey::AuthorAsc => result.sort_by(|a, b| fold(&a.author).cmp(&fold(&b.author))),
            SortKey::AuthorDesc => result.sort_by(|a, b| fold(&b.author).cmp(&fold(&a.author))),
            SortKey::RatingAsc => result.sort_by(|a, b| a.rating.total_cmp(&b.rating)),
            SortKey::RatingDesc => result.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        }
    }

    paginate(result, page)
}

/// Query the vocabulary collection
///
/// Language filter, search over word OR definition OR context, fixed
/// most-recent-first sort, then the page slice.
pub fn query_vocabulary(
    words: &[VocabularyWord],
    language: Option<Language>,
    search: &str,
    page: Option<Page>,
) -> Vec<VocabularyWord> {
    let needle = search.trim().to_lowercase();

    let mut result: Vec<VocabularyWord> = words
        .iter()
        .filter(|word| match language {
            Some(language) => word.language == language,
            None => true,
        })
        .filter(|word| {
            needle.is_empty()
                || word.word.to_lowercase().contains(&needle)
                || word.definition.to_lowercase().contains(&needle)
                || word.context.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();

    result.sort_by(|a, b| b.date_added.cmp(&a.date_added));

    paginate(result, page)
}

/// Number of pages a result set spans at the given page size
pub fn page_count(total: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

fn paginate<T>(items: Vec<T>, page: Option<Page>) -> Vec<T> {
    let Some(page) = page else {
        return items;
    };
    let start = page.number.saturating_sub(1).saturating_mul(page.size);
    if start >= items.len() || page.size == 0 {
        return Vec::new();
    }
    let end = (start + page.size).min(items.len());
    items.into_iter().skip(start).take(end - start).collect()
}

// Case-insensitive comparison stands in for locale collation.
fn fold(s: &str) -> String {
    s.to_lowercase()
}
