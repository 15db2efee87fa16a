//! Book command handlers

use anyhow::{anyhow, bail, Result};

use tomo_core::query::{self, Page};
use tomo_core::{Book, BookDraft, BookFilter, BookPatch, Library, SortKey};

use crate::commands::parse_opt;
use crate::output::Output;
use crate::prompt::confirm;
use crate::{AddBookArgs, BookCommands, EditBookArgs, ListBooksArgs};

pub fn handle(command: BookCommands, library: &mut Library, output: &Output) -> Result<()> {
    match command {
        BookCommands::Add(args) => add(library, args, output),
        BookCommands::List(args) => list(library, args, output),
        BookCommands::Show { id } => show(library, &id, output),
        BookCommands::Edit(args) => edit(library, args, output),
        BookCommands::Delete { id, yes } => delete(library, &id, yes, output),
    }
}

/// Add a book
fn add(library: &mut Library, args: AddBookArgs, output: &Output) -> Result<()> {
    let category = args.category.parse().map_err(anyhow::Error::msg)?;
    let language = args.language.parse().map_err(anyhow::Error::msg)?;

    let book = library.add_book(BookDraft {
        title: args.title,
        author: args.author,
        total_pages: args.pages,
        current_page: args.current_page,
        category,
        language,
        rating: args.rating,
        comments: args.comments,
        cover_url: args.cover_url,
        isbn: args.isbn,
    })?;

    output.success(&format!("Added book: {}", book.id));
    output.print_book(&book);

    Ok(())
}

/// List books through the query pipeline
fn list(library: &Library, args: ListBooksArgs, output: &Output) -> Result<()> {
    let filter = BookFilter {
        category: parse_opt(args.category)?,
        language: parse_opt(args.language)?,
    };
    let search = args.search.unwrap_or_default();
    // Unrecognized sort keys leave the order unchanged
    let sort = SortKey::parse(&args.sort);

    let everything = query::query_books(library.books(), filter, &search, sort, None);
    let total = everything.len();

    if args.all {
        output.print_books(&everything, total, 1, 1);
        return Ok(());
    }

    let pages = query::page_count(total, args.page_size).max(1);
    let page_items = query::query_books(
        library.books(),
        filter,
        &search,
        sort,
        Some(Page {
            number: args.page,
            size: args.page_size,
        }),
    );
    output.print_books(&page_items, total, args.page, pages);

    Ok(())
}

/// Show a single book
fn show(library: &Library, id: &str, output: &Output) -> Result<()> {
    let id = resolve_book_id(library, id)?;
    let book = library
        .book(&id)
        .ok_or_else(|| anyhow!("Book not found: {}", id))?;
    output.print_book(book);
    Ok(())
}

/// Edit a book
fn edit(library: &mut Library, args: EditBookArgs, output: &Output) -> Result<()> {
    let id = resolve_book_id(library, &args.id)?;
    let existing = library
        .book(&id)
        .cloned()
        .ok_or_else(|| anyhow!("Book not found: {}", id))?;

    // --percent is a convenience: derive the page number from the
    // percentage when no explicit page was given.
    let current_page = match (args.current_page, args.percent) {
        (Some(page), _) => Some(page),
        (None, Some(percent)) => {
            let total = args.pages.unwrap_or(existing.total_pages);
            Some((percent as f64 / 100.0 * total as f64).round() as u32)
        }
        (None, None) => None,
    };

    let patch = BookPatch {
        title: args.title,
        author: args.author,
        total_pages: args.pages,
        current_page,
        category: parse_opt(args.category)?,
        language: parse_opt(args.language)?,
        rating: args.rating,
        comments: args.comments,
        cover_url: args.cover_url,
        isbn: args.isbn,
    };

    let updated = library
        .update_book(&id, &patch)?
        .ok_or_else(|| anyhow!("Book not found: {}", id))?;

    output.success("Book updated");
    output.print_book(&updated);

    Ok(())
}

/// Delete a book
fn delete(library: &mut Library, id: &str, yes: bool, output: &Output) -> Result<()> {
    let id = resolve_book_id(library, id)?;
    let book = library
        .book(&id)
        .cloned()
        .ok_or_else(|| anyhow!("Book not found: {}", id))?;

    if !yes && output.should_prompt() {
        println!(
            "Delete book: {} - {}",
            &book.id[..8.min(book.id.len())],
            book.title
        );
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    library.delete_book(&id)?;
    output.success(&format!("Deleted book: {}", id));

    Ok(())
}

/// Resolve a book ID (supports full ID or prefix)
fn resolve_book_id(library: &Library, id: &str) -> Result<String> {
    if library.book(id).is_some() {
        return Ok(id.to_string());
    }

    let matches: Vec<&Book> = library
        .books()
        .iter()
        .filter(|b| b.id.starts_with(id))
        .collect();

    match matches.len() {
        0 => bail!("No book found matching: {}", id),
        1 => Ok(matches[0].id.clone()),
        _ => {
            eprintln!("Multiple books match '{}':", id);
            for book in &matches {
                eprintln!("  {} - {}", book.id, book.title);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}
