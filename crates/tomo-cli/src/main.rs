//! TOMO CLI
//!
//! Command-line interface for TOMO - book tracking and vocabulary
//! learning.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tomo_core::query::{BOOKS_PAGE_SIZE, WORDS_PAGE_SIZE};
use tomo_core::{Config, FileBackend, KeyValueBackend, Library, SessionManager, Theme};

mod commands;
mod enrich;
mod lookup;
mod output;
mod prompt;

use output::{Output, OutputFormat, ToastNotifier};

#[derive(Parser)]
#[command(name = "tomo")]
#[command(about = "TOMO - Local-first book tracking and vocabulary learning")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage books
    Book {
        #[command(subcommand)]
        command: BookCommands,
    },
    /// Manage vocabulary
    Word {
        #[command(subcommand)]
        command: WordCommands,
    },
    /// Show library statistics and reading progress
    Stats,
    /// Search for a book online
    Search {
        /// Free-text query, or isbn:<number>
        query: String,
        /// Add the Nth result to the library (1-based)
        #[arg(long)]
        add: Option<usize>,
    },
    /// Export a JSON snapshot of books and vocabulary
    Export {
        /// Output file (prints to stdout when omitted)
        file: Option<PathBuf>,
    },
    /// Import data
    Import {
        #[command(subcommand)]
        command: ImportCommands,
    },
    /// Local accounts
    Account {
        #[command(subcommand)]
        command: AccountCommands,
    },
    /// Show or set the color theme
    Theme {
        /// dark or light
        value: Option<String>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand)]
enum BookCommands {
    /// Add a book
    #[command(alias = "create")]
    Add(AddBookArgs),
    /// List books
    #[command(alias = "ls")]
    List(ListBooksArgs),
    /// Show book details
    Show {
        /// Book ID (full or prefix)
        id: String,
    },
    /// Edit a book
    Edit(EditBookArgs),
    /// Delete a book
    #[command(alias = "rm")]
    Delete {
        /// Book ID (full or prefix)
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args)]
struct AddBookArgs {
    /// Book title
    title: String,
    /// Author name(s)
    #[arg(short, long)]
    author: String,
    /// Total page count
    #[arg(short, long, default_value_t = 0)]
    pages: u32,
    /// want_to_read, reading, completed, or abandoned
    #[arg(short, long, default_value = "want_to_read")]
    category: String,
    /// Language code (es, en, fr, de, it, pt, other)
    #[arg(short, long, default_value = "es")]
    language: String,
    /// Current reading position
    #[arg(long, default_value_t = 0)]
    current_page: u32,
    /// Rating on a 10-point scale (0 = unrated)
    #[arg(short, long, default_value_t = 0.0)]
    rating: f64,
    /// Free-text comments
    #[arg(long, default_value = "")]
    comments: String,
    /// ISBN
    #[arg(long, default_value = "")]
    isbn: String,
    /// Cover image URL
    #[arg(long, default_value = "")]
    cover_url: String,
}

#[derive(Args)]
struct ListBooksArgs {
    /// Filter by category
    #[arg(short, long)]
    category: Option<String>,
    /// Filter by language code
    #[arg(short, long)]
    language: Option<String>,
    /// Case-insensitive search over title, author, and comments
    #[arg(short, long)]
    search: Option<String>,
    /// date_desc, date_asc, title_asc, title_desc, author_asc,
    /// author_desc, rating_asc, or rating_desc
    #[arg(long, default_value = "date_desc")]
    sort: String,
    /// Page number (1-based)
    #[arg(short, long, default_value_t = 1)]
    page: usize,
    /// Books per page
    #[arg(long, default_value_t = BOOKS_PAGE_SIZE)]
    page_size: usize,
    /// Show everything on one page
    #[arg(long)]
    all: bool,
}

#[derive(Args)]
struct EditBookArgs {
    /// Book ID (full or prefix)
    id: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(short, long)]
    author: Option<String>,
    /// Total page count
    #[arg(short, long)]
    pages: Option<u32>,
    /// Current reading position
    #[arg(long)]
    current_page: Option<u32>,
    /// Set progress as a percentage instead of a page number
    #[arg(long)]
    percent: Option<u32>,
    #[arg(short, long)]
    category: Option<String>,
    #[arg(short, long)]
    language: Option<String>,
    #[arg(short, long)]
    rating: Option<f64>,
    #[arg(long)]
    comments: Option<String>,
    #[arg(long)]
    isbn: Option<String>,
    #[arg(long)]
    cover_url: Option<String>,
}

#[derive(Subcommand)]
enum WordCommands {
    /// Add a vocabulary word
    #[command(alias = "create")]
    Add(AddWordArgs),
    /// List vocabulary, most recent first
    #[command(alias = "ls")]
    List(ListWordsArgs),
    /// Show word details
    Show {
        /// Word ID (full or prefix)
        id: String,
    },
    /// Edit a word
    Edit(EditWordArgs),
    /// Delete a word
    #[command(alias = "rm")]
    Delete {
        /// Word ID (full or prefix)
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args)]
struct AddWordArgs {
    /// The word or phrase
    word: String,
    /// What it means
    #[arg(short, long)]
    definition: String,
    /// Language code (es, en, fr, de, it, pt, other)
    #[arg(short, long, default_value = "es")]
    language: String,
    /// Example sentence
    #[arg(short, long, default_value = "")]
    context: String,
}

#[derive(Args)]
struct ListWordsArgs {
    /// Filter by language code
    #[arg(short, long)]
    language: Option<String>,
    /// Case-insensitive search over word, definition, and context
    #[arg(short, long)]
    search: Option<String>,
    /// Page number (1-based)
    #[arg(short, long, default_value_t = 1)]
    page: usize,
    /// Words per page
    #[arg(long, default_value_t = WORDS_PAGE_SIZE)]
    page_size: usize,
    /// Show everything on one page
    #[arg(long)]
    all: bool,
}

#[derive(Args)]
struct EditWordArgs {
    /// Word ID (full or prefix)
    id: String,
    #[arg(short, long)]
    word: Option<String>,
    #[arg(short, long)]
    definition: Option<String>,
    #[arg(short, long)]
    language: Option<String>,
    #[arg(short, long)]
    context: Option<String>,
}

#[derive(Subcommand)]
enum ImportCommands {
    /// Restore a JSON snapshot (replaces current collections)
    Snapshot {
        file: PathBuf,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Import a CSV catalog export (Goodreads-compatible)
    Catalog {
        file: PathBuf,
        /// Skip the background cover lookup
        #[arg(long)]
        skip_covers: bool,
    },
}

#[derive(Subcommand)]
enum AccountCommands {
    /// Create a local account and switch to it
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log in to a local account
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Log out, returning to the guest library
    Logout,
    /// Show the active account
    Show,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, offline)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands don't need the store
    if let Commands::Config { command } = &cli.command {
        return commands::config::handle(command.clone(), &output);
    }

    let config = Config::load().context("Failed to load configuration")?;
    let backend: Arc<dyn KeyValueBackend> =
        Arc::new(FileBackend::new(config.store_dir()).context("Failed to open local store")?);
    let session = SessionManager::new(backend);

    match cli.command {
        Commands::Config { .. } => unreachable!(), // Handled above
        // Session-level commands operate without loading the library
        Commands::Account { command } => commands::account::handle(command, &session, &output),
        Commands::Theme { value } => handle_theme(value, &session, &output),
        command => {
            // Startup sequence for data commands: resolve the active
            // namespace, load its library, run the streak check once.
            let mut library = Library::with_notifier(
                session.gateway(),
                session.namespace(),
                Box::new(ToastNotifier::new(output.format)),
            );
            library
                .run_daily_streak()
                .context("Failed to update the daily streak")?;

            match command {
                Commands::Book { command } => {
                    commands::book::handle(command, &mut library, &output)
                }
                Commands::Word { command } => {
                    commands::word::handle(command, &mut library, &output)
                }
                Commands::Stats => commands::stats::show(&library, &output),
                Commands::Search { query, add } => {
                    commands::search::run(&query, add, &mut library, &config, &output)
                }
                Commands::Export { file } => {
                    commands::transfer::export(&library, file.as_deref(), &output)
                }
                Commands::Import { command } => {
                    commands::transfer::import(command, library, &config, &output)
                }
                _ => unreachable!(),
            }
        }
    }
}

fn handle_theme(value: Option<String>, session: &SessionManager, output: &Output) -> Result<()> {
    match value {
        Some(raw) => {
            let theme: Theme = raw.parse().map_err(anyhow::Error::msg)?;
            session.set_theme(theme)?;
            output.success(&format!("Theme set to {}", theme));
        }
        None => println!("{}", session.theme()),
    }
    Ok(())
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
