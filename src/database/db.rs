//! Database operations for the scheduler
//!
//! Handles SQLite database initialization, the flashcard catalog (decks and
//! their cards), review record persistence and the simulated current date.

use crate::clock::{Clock, DAY_MS, SystemClock, Timestamp};
use crate::error::Result;
use crate::models::record_store::check_put;
use crate::models::{Deck, Flashcard, RecordMap, RecordStore, ReviewRecord};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use tracing::{debug, info};

/// Opens (or creates) the database file and ensures the schema exists.
pub fn init_database(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    let conn = Connection::open(path)?;
    init_schema(&conn)?;
    info!(path = %path.display(), "Database initialized");
    Ok(conn)
}

/// Creates tables for decks, flashcards, review records and app state.
/// Sets the simulated current date to now if not already initialized.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS decks (
            name TEXT PRIMARY KEY
        )",
        (),
    )?;

    // Auto-increment id preserves catalog order within a deck
    conn.execute(
        "CREATE TABLE IF NOT EXISTS flashcards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            deck_name TEXT NOT NULL,
            term TEXT NOT NULL,
            definition TEXT NOT NULL,
            FOREIGN KEY (deck_name) REFERENCES decks(name),
            UNIQUE(deck_name, term)
        )",
        (),
    )?;

    // One row per reviewed term; terms never rated have no row
    conn.execute(
        "CREATE TABLE IF NOT EXISTS review_records (
            identity TEXT PRIMARY KEY,
            next_review INTEGER NOT NULL,
            interval_days REAL NOT NULL,
            ease REAL NOT NULL,
            reviews_count INTEGER NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value INTEGER NOT NULL
        )",
        (),
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO app_state (key, value) VALUES ('current_date', ?1)",
        params![SystemClock.now()],
    )?;

    Ok(())
}

/// Retrieves the simulated current date from the database
pub fn get_current_date(conn: &Connection) -> Result<Timestamp> {
    let timestamp = conn.query_row(
        "SELECT value FROM app_state WHERE key = 'current_date'",
        [],
        |row| row.get(0),
    )?;
    Ok(timestamp)
}

/// Advances the simulated date by 24 hours and returns the new date
pub fn advance_day(conn: &Connection) -> Result<Timestamp> {
    let next_day = get_current_date(conn)? + DAY_MS;
    conn.execute(
        "UPDATE app_state SET value = ?1 WHERE key = 'current_date'",
        params![next_day],
    )?;
    info!(current_date = next_day, "Advanced simulated date by one day");
    Ok(next_day)
}

/// Creates a new deck in the database. Existing decks are left alone.
pub fn new_deck(name: &str, conn: &Connection) -> Result<()> {
    conn.execute("INSERT OR IGNORE INTO decks (name) VALUES (?1)", params![name])?;
    debug!(deck = name, "Deck created");
    Ok(())
}

/// Adds a flashcard to a deck
///
/// Returns the flashcard ID. If the flashcard already exists (same deck + term),
/// it's ignored due to UNIQUE constraint. No review record is created: a term
/// gets one on its first rating.
pub fn add_flashcard(
    deck_name: &str,
    term: &str,
    definition: &str,
    conn: &Connection,
) -> Result<i64> {
    conn.execute(
        "INSERT OR IGNORE INTO flashcards (deck_name, term, definition) VALUES (?1, ?2, ?3)",
        params![deck_name, term, definition],
    )?;

    let flashcard_id = conn.query_row(
        "SELECT id FROM flashcards WHERE deck_name = ?1 AND term = ?2",
        params![deck_name, term],
        |row| row.get(0),
    )?;

    Ok(flashcard_id)
}

/// Retrieves all flashcards for a given deck in catalog (insertion) order
pub fn get_flashcards_for_deck(deck_name: &str, conn: &Connection) -> Result<Vec<Flashcard>> {
    let mut stmt = conn.prepare(
        "SELECT term, definition FROM flashcards WHERE deck_name = ?1 ORDER BY id ASC",
    )?;

    let flashcards = stmt
        .query_map(params![deck_name], |row| {
            Ok(Flashcard {
                term: row.get(0)?,
                definition: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<Flashcard>>>()?;

    Ok(flashcards)
}

/// Retrieves all deck names from database
pub fn get_all_decks(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM decks ORDER BY name")?;
    let decks = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(decks)
}

/// Loads one deck with its flashcards, or None if no such deck exists
pub fn load_deck(name: &str, conn: &Connection) -> Result<Option<Deck>> {
    let exists = conn
        .query_row("SELECT 1 FROM decks WHERE name = ?1", params![name], |_| Ok(()))
        .optional()?
        .is_some();
    if !exists {
        return Ok(None);
    }

    Ok(Some(Deck {
        name: name.to_string(),
        flashcards: get_flashcards_for_deck(name, conn)?,
    }))
}

/// Stores a whole deck, e.g. after a JSON import. Cards already in the deck
/// keep their position and definition.
pub fn save_deck(deck: &Deck, conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    new_deck(&deck.name, &tx)?;
    for card in &deck.flashcards {
        add_flashcard(&deck.name, &card.term, &card.definition, &tx)?;
    }
    tx.commit()?;
    info!(deck = %deck.name, cards = deck.flashcards.len(), "Deck saved");
    Ok(())
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<ReviewRecord> {
    Ok(ReviewRecord {
        identity: row.get(0)?,
        next_review_at: row.get(1)?,
        interval_days: row.get(2)?,
        ease: row.get(3)?,
        review_count: row.get(4)?,
    })
}

/// Retrieves the review record for a term, failing if it is malformed
pub fn get_review_record(identity: &str, conn: &Connection) -> Result<Option<ReviewRecord>> {
    let record = conn
        .query_row(
            "SELECT identity, next_review, interval_days, ease, reviews_count
             FROM review_records WHERE identity = ?1",
            params![identity],
            record_from_row,
        )
        .optional()?;

    if let Some(record) = &record {
        record.validate_for(identity)?;
    }
    Ok(record)
}

/// Inserts or replaces the review record for `record.identity`
pub fn upsert_review_record(record: &ReviewRecord, conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT INTO review_records (identity, next_review, interval_days, ease, reviews_count)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(identity) DO UPDATE SET
            next_review = excluded.next_review,
            interval_days = excluded.interval_days,
            ease = excluded.ease,
            reviews_count = excluded.reviews_count",
        params![
            record.identity,
            record.next_review_at,
            record.interval_days,
            record.ease,
            record.review_count
        ],
    )?;
    Ok(())
}

/// Deletes a term's review record. Returns whether one existed.
pub fn delete_review_record(identity: &str, conn: &Connection) -> Result<bool> {
    let deleted = conn.execute(
        "DELETE FROM review_records WHERE identity = ?1",
        params![identity],
    )?;
    Ok(deleted > 0)
}

/// Loads every review record into memory, validating each one
pub fn load_review_records(conn: &Connection) -> Result<RecordMap> {
    let mut stmt = conn.prepare(
        "SELECT identity, next_review, interval_days, ease, reviews_count FROM review_records",
    )?;
    let records = stmt
        .query_map([], record_from_row)?
        .collect::<rusqlite::Result<Vec<ReviewRecord>>>()?;

    for record in &records {
        record.validate()?;
    }
    Ok(records.into_iter().collect())
}

/// Replaces the stored review records with the contents of `records`.
pub fn replace_review_records(records: &RecordMap, conn: &mut Connection) -> Result<()> {
    records.validate()?;
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM review_records", ())?;
    for (_, record) in records.iter() {
        upsert_review_record(record, &tx)?;
    }
    tx.commit()?;
    info!(records = records.len(), "Review records replaced");
    Ok(())
}

/// Review record store backed by the `review_records` table.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(init_database(path)?))
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }
}

impl RecordStore for SqliteStore {
    fn get(&self, identity: &str) -> Result<Option<ReviewRecord>> {
        get_review_record(identity, &self.conn)
    }

    fn put(&mut self, identity: &str, record: ReviewRecord) -> Result<()> {
        let previous = get_review_record(identity, &self.conn)?;
        check_put(identity, &record, previous.as_ref())?;
        upsert_review_record(&record, &self.conn)?;
        debug!(
            identity,
            next_review = record.next_review_at,
            reviews = record.review_count,
            "Review record stored"
        );
        Ok(())
    }

    fn remove(&mut self, identity: &str) -> Result<bool> {
        let removed = delete_review_record(identity, &self.conn)?;
        if removed {
            info!(identity, "Review record reset");
        }
        Ok(removed)
    }
}
