//! Import/export command handlers

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};

use tomo_core::{catalog, snapshot, Config, Library};

use crate::enrich::{self, EnrichTarget};
use crate::lookup::LookupClient;
use crate::output::Output;
use crate::prompt::confirm;
use crate::ImportCommands;

/// Write (or print) a JSON snapshot of the library
pub fn export(library: &Library, file: Option<&Path>, output: &Output) -> Result<()> {
    let snapshot = snapshot::export(library.books(), library.vocabulary());
    let json = serde_json::to_string_pretty(&snapshot)?;

    match file {
        Some(path) => {
            fs::write(path, &json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            output.success(&format!(
                "Exported {} book(s) and {} word(s) to {}",
                snapshot.books.len(),
                snapshot.vocabulary.len(),
                path.display()
            ));
        }
        None => println!("{}", json),
    }

    Ok(())
}

pub fn import(
    command: ImportCommands,
    library: Library,
    config: &Config,
    output: &Output,
) -> Result<()> {
    match command {
        ImportCommands::Snapshot { file, yes } => import_snapshot(library, &file, yes, output),
        ImportCommands::Catalog { file, skip_covers } => {
            import_catalog(library, &file, skip_covers, config, output)
        }
    }
}

/// Restore a snapshot, replacing the current collections wholesale
fn import_snapshot(mut library: Library, path: &Path, yes: bool, output: &Output) -> Result<()> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let data = snapshot::parse(&text).context("Failed to parse snapshot")?;

    if !yes && output.should_prompt() {
        println!(
            "Importing replaces your current collection ({} book(s), {} word(s)).",
            library.books().len(),
            library.vocabulary().len()
        );
        if !confirm("Continue?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let (book_count, word_count) = (data.books.len(), data.vocabulary.len());
    library.replace_all(data.books, data.vocabulary)?;

    output.success(&format!(
        "Imported {} book(s) and {} word(s)",
        book_count, word_count
    ));
    Ok(())
}

/// Import a tabular catalog export through the normal add path
///
/// Each row becomes a book with the usual gamification side effects.
/// Afterwards, a background sweep fetches covers for the imported books
/// that lack one; the import itself is already complete and persisted
/// when the sweep starts.
fn import_catalog(
    mut library: Library,
    path: &Path,
    skip_covers: bool,
    config: &Config,
    output: &Output,
) -> Result<()> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let drafts = catalog::parse(&text).context("Catalog import failed")?;

    if drafts.is_empty() {
        bail!("No importable rows found in the catalog.");
    }

    let mut imported = Vec::with_capacity(drafts.len());
    for draft in drafts {
        imported.push(library.add_book(draft)?);
    }
    output.success(&format!(
        "Imported {} book(s) from the catalog",
        imported.len()
    ));

    let targets: Vec<EnrichTarget> = imported
        .iter()
        .filter(|b| b.cover_url.is_empty())
        .map(EnrichTarget::from_book)
        .collect();

    if skip_covers || config.offline || targets.is_empty() {
        return Ok(());
    }

    let client = LookupClient::new()?;
    let shared = Arc::new(Mutex::new(library));
    let handle = enrich::spawn(shared, targets, client);

    output.success("Looking up covers in the background...");
    let updated = handle.join();
    output.success(&format!("Covers updated ({} new)", updated));

    Ok(())
}
