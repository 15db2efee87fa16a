//! Online search command handler
//!
//! Search-and-fill against the remote metadata lookup: print candidates,
//! or add one directly to the library as want-to-read.

use anyhow::{bail, Result};

use tomo_core::{BookDraft, Category, Config, Library};

use crate::lookup::LookupClient;
use crate::output::{Output, OutputFormat};

const MAX_RESULTS: usize = 10;

pub fn run(
    query: &str,
    add: Option<usize>,
    library: &mut Library,
    config: &Config,
    output: &Output,
) -> Result<()> {
    if config.offline {
        bail!("Online search is disabled (offline = true in the config).");
    }

    let client = LookupClient::new()?;
    let matches = client.search(query, MAX_RESULTS);

    if matches.is_empty() {
        if !output.is_quiet() {
            println!("No results found.");
        }
        return Ok(());
    }

    let Some(pick) = add else {
        print_matches(&matches, output);
        return Ok(());
    };

    let selected = pick
        .checked_sub(1)
        .and_then(|i| matches.get(i))
        .ok_or_else(|| anyhow::anyhow!("No result #{} (got {} results)", pick, matches.len()))?;

    let book = library.add_book(BookDraft {
        title: selected.title.clone(),
        author: selected.author_line(),
        total_pages: selected.page_count,
        current_page: 0,
        category: Category::WantToRead,
        language: selected.language,
        rating: 0.0,
        comments: selected.description.clone(),
        cover_url: selected.cover_url.clone().unwrap_or_default(),
        isbn: String::new(),
    })?;

    output.success(&format!("Added book: {}", book.id));
    output.print_book(&book);

    Ok(())
}

fn print_matches(matches: &[crate::lookup::BookMatch], output: &Output) {
    match output.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(matches).unwrap());
        }
        OutputFormat::Quiet | OutputFormat::Human => {
            for (i, m) in matches.iter().enumerate() {
                let year = m
                    .published
                    .as_deref()
                    .map(|y| format!(", {}", y))
                    .unwrap_or_default();
                println!(
                    "{:>2}. {} - {} ({} pages, {}{})",
                    i + 1,
                    m.title,
                    m.author_line(),
                    m.page_count,
                    m.language.code(),
                    year
                );
            }
            if !output.is_quiet() {
                println!("\nUse --add N to add a result to your library.");
            }
        }
    }
}
