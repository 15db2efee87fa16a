//! Remote book metadata lookup
//!
//! Queries a Google-Books-style volumes API for title, authors, page
//! count, language, and cover image. Used for manual search-and-fill and
//! for the background cover-enrichment sweep.

use std::time::Duration;

use anyhow::Result;
use serde_json::Value;
use tracing::debug;

use tomo_core::Language;

/// Volumes API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://www.googleapis.com/books/v1/volumes";

/// Fetch timeout in seconds
const FETCH_TIMEOUT: u64 = 10;

/// A candidate book returned by the lookup service
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct BookMatch {
    pub title: String,
    pub authors: Vec<String>,
    pub page_count: u32,
    pub language: Language,
    pub description: String,
    pub cover_url: Option<String>,
    /// Publication year, when reported
    pub published: Option<String>,
}

impl BookMatch {
    /// Authors joined for display and form fill
    pub fn author_line(&self) -> String {
        self.authors.join(", ")
    }
}

/// Blocking client for the volumes API
pub struct LookupClient {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl LookupClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT))
            .user_agent("Mozilla/5.0 (compatible; TOMO/0.1)")
            .build()?;
        Ok(Self {
            client,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    /// Search for books matching a free-text or `isbn:` query
    ///
    /// Returns an empty list on failure (graceful degradation).
    pub fn search(&self, query: &str, max_results: usize) -> Vec<BookMatch> {
        match self.search_inner(query, max_results) {
            Ok(matches) => matches,
            Err(e) => {
                debug!(error = %e, query, "lookup failed");
                Vec::new()
            }
        }
    }

    fn search_inner(&self, query: &str, max_results: usize) -> Result<Vec<BookMatch>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("maxResults", &max_results.to_string())])
            .send()?;

        if !response.status().is_success() {
            return Ok(Vec::new());
        }

        let body: Value = response.json()?;
        Ok(parse_volumes(&body))
    }

    /// Cover image URL of the best match for a query, if any
    pub fn cover_for(&self, query: &str) -> Option<String> {
        self.search(query, 1).into_iter().next()?.cover_url
    }
}

/// Parse a volumes API response body
fn parse_volumes(body: &Value) -> Vec<BookMatch> {
    let Some(items) = body.get("items").and_then(Value::as_array) else {
        return Vec::new();
    };
    items.iter().filter_map(parse_volume).collect()
}

fn parse_volume(item: &Value) -> Option<BookMatch> {
    let info = item.get("volumeInfo")?;

    let title = info.get("title")?.as_str()?.to_string();

    let authors = info
        .get("authors")
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let page_count = info
        .get("pageCount")
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32;

    // Missing language defaults to Spanish; unsupported codes fold to Other
    let language = info
        .get("language")
        .and_then(Value::as_str)
        .map(Language::from_code)
        .unwrap_or(Language::Es);

    let description = info
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();

    let image_links = info.get("imageLinks");
    let cover_url = image_links
        .and_then(|links| links.get("thumbnail").or_else(|| links.get("smallThumbnail")))
        .and_then(Value::as_str)
        .map(str::to_string);

    let published = info
        .get("publishedDate")
        .and_then(Value::as_str)
        .map(|d| d.chars().take(4).collect());

    Some(BookMatch {
        title,
        authors,
        page_count,
        language,
        description,
        cover_url,
        published,
    })
}
