//! Vocabulary command handlers

use anyhow::{anyhow, bail, Result};

use tomo_core::query::{self, Page};
use tomo_core::{Library, VocabularyWord, WordDraft, WordPatch};

use crate::commands::parse_opt;
use crate::output::Output;
use crate::prompt::confirm;
use crate::{AddWordArgs, EditWordArgs, ListWordsArgs, WordCommands};

pub fn handle(command: WordCommands, library: &mut Library, output: &Output) -> Result<()> {
    match command {
        WordCommands::Add(args) => add(library, args, output),
        WordCommands::List(args) => list(library, args, output),
        WordCommands::Show { id } => show(library, &id, output),
        WordCommands::Edit(args) => edit(library, args, output),
        WordCommands::Delete { id, yes } => delete(library, &id, yes, output),
    }
}

/// Add a vocabulary entry
fn add(library: &mut Library, args: AddWordArgs, output: &Output) -> Result<()> {
    let language = args.language.parse().map_err(anyhow::Error::msg)?;

    let word = library.add_word(WordDraft {
        word: args.word,
        language,
        definition: args.definition,
        context: args.context,
    })?;

    output.success(&format!("Added word: {}", word.id));
    output.print_word(&word);

    Ok(())
}

/// List vocabulary entries, most recent first
fn list(library: &Library, args: ListWordsArgs, output: &Output) -> Result<()> {
    let language = parse_opt(args.language)?;
    let search = args.search.unwrap_or_default();

    let everything = query::query_vocabulary(library.vocabulary(), language, &search, None);
    let total = everything.len();

    if args.all {
        output.print_words(&everything, total, 1, 1);
        return Ok(());
    }

    let pages = query::page_count(total, args.page_size).max(1);
    let page_items = query::query_vocabulary(
        library.vocabulary(),
        language,
        &search,
        Some(Page {
            number: args.page,
            size: args.page_size,
        }),
    );
    output.print_words(&page_items, total, args.page, pages);

    Ok(())
}

/// Show a single vocabulary entry
fn show(library: &Library, id: &str, output: &Output) -> Result<()> {
    let id = resolve_word_id(library, id)?;
    let word = library
        .word(&id)
        .ok_or_else(|| anyhow!("Word not found: {}", id))?;
    output.print_word(word);
    Ok(())
}

/// Edit a vocabulary entry
fn edit(library: &mut Library, args: EditWordArgs, output: &Output) -> Result<()> {
    let id = resolve_word_id(library, &args.id)?;

    let patch = WordPatch {
        word: args.word,
        language: parse_opt(args.language)?,
        definition: args.definition,
        context: args.context,
    };

    let updated = library
        .update_word(&id, &patch)?
        .ok_or_else(|| anyhow!("Word not found: {}", id))?;

    output.success("Word updated");
    output.print_word(&updated);

    Ok(())
}

/// Delete a vocabulary entry
fn delete(library: &mut Library, id: &str, yes: bool, output: &Output) -> Result<()> {
    let id = resolve_word_id(library, id)?;
    let word = library
        .word(&id)
        .cloned()
        .ok_or_else(|| anyhow!("Word not found: {}", id))?;

    if !yes && output.should_prompt() {
        println!(
            "Delete word: {} - {}",
            &word.id[..8.min(word.id.len())],
            word.word
        );
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    library.delete_word(&id)?;
    output.success(&format!("Deleted word: {}", id));

    Ok(())
}

/// Resolve a word ID (supports full ID or prefix)
fn resolve_word_id(library: &Library, id: &str) -> Result<String> {
    if library.word(id).is_some() {
        return Ok(id.to_string());
    }

    let matches: Vec<&VocabularyWord> = library
        .vocabulary()
        .iter()
        .filter(|w| w.id.starts_with(id))
        .collect();

    match matches.len() {
        0 => bail!("No word found matching: {}", id),
        1 => Ok(matches[0].id.clone()),
        _ => {
            eprintln!("Multiple words match '{}':", id);
            for word in &matches {
                eprintln!("  {} - {}", word.id, word.word);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}
