mod app;
use hanzi_srs::*;

use anyhow::Context;
use app::App;
use clap::{Parser, Subcommand};
use database::db::{SqliteStore, add_flashcard, get_all_decks, get_current_date, new_deck};
use std::io;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Spaced repetition scheduler for vocabulary flashcards
#[derive(Parser)]
#[command(name = "srs", version)]
struct Cli {
    /// SQLite database holding decks and review records
    #[arg(long, env = "SRS_DB", default_value = "db.sqlite3", global = true)]
    db: PathBuf,

    /// Use the stored simulated date (see `next-day`) instead of the system clock
    #[arg(long, env = "SRS_SIMULATED_CLOCK", global = true)]
    simulated_clock: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List decks with their due counts
    Decks,
    /// Import a deck from a JSON file
    ImportDeck { file: PathBuf },
    /// Export a deck to a JSON file
    ExportDeck { deck: String, file: PathBuf },
    /// Show the cards of a deck that are due, in study order
    Due { deck: String },
    /// Rate one item: again, hard, good, easy (or 1-4)
    Rate { identity: String, rating: String },
    /// Study the due cards of a deck interactively
    Study { deck: String },
    /// Show learning progress for a deck
    Stats { deck: String },
    /// Forget an item's review history
    Reset { identity: String },
    /// Write all review records to a JSON file
    ExportRecords { file: PathBuf },
    /// Replace all review records with the contents of a JSON file
    ImportRecords { file: PathBuf },
    /// Advance the simulated date by one day
    NextDay,
    /// Print the current date
    Today,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let store = SqliteStore::open(&cli.db)
        .with_context(|| format!("Failed to open database {}", cli.db.display()))?;

    if get_all_decks(store.conn())?.is_empty() {
        seed_sample_deck(&store)?;
    }

    let clock: Box<dyn Clock> = if cli.simulated_clock {
        Box::new(FixedClock::new(get_current_date(store.conn())?))
    } else {
        Box::new(SystemClock)
    };

    let mut app = App::new(store, clock);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    match cli.command {
        Commands::Decks => app.list_decks(&mut stdout)?,
        Commands::ImportDeck { file } => app.import_deck(&file, &mut stdout)?,
        Commands::ExportDeck { deck, file } => app.export_deck(&deck, &file, &mut stdout)?,
        Commands::Due { deck } => app.show_due(&deck, &mut stdout)?,
        Commands::Rate { identity, rating } => app.rate(&identity, &rating, &mut stdout)?,
        Commands::Study { deck } => app.study(&deck, &mut stdin.lock(), &mut stdout)?,
        Commands::Stats { deck } => app.show_stats(&deck, &mut stdout)?,
        Commands::Reset { identity } => app.reset(&identity, &mut stdout)?,
        Commands::ExportRecords { file } => app.export_records(&file, &mut stdout)?,
        Commands::ImportRecords { file } => app.import_records(&file, &mut stdout)?,
        Commands::NextDay => app.next_day(&mut stdout)?,
        Commands::Today => app.today(&mut stdout)?,
    }

    Ok(())
}

fn seed_sample_deck(store: &SqliteStore) -> Result<()> {
    let conn = store.conn();
    new_deck("HSK 1", conn)?;
    for (term, definition) in [
        ("爱", "to love"),
        ("八", "eight"),
        ("爸爸", "dad"),
        ("杯子", "cup"),
        ("北京", "Beijing"),
    ] {
        add_flashcard("HSK 1", term, definition, conn)?;
    }
    info!("Sample deck created");
    Ok(())
}
