//! JSON import/export for decks and review records.
//! Record files hold one object keyed by term, the same layout the browser
//! version keeps under its `hanzi-srs` storage key.

use crate::error::Result;
use crate::models::{Deck, RecordMap};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;
use tracing::{info, warn};

fn write_pretty<T: serde::Serialize>(value: &T, path: &Path) -> Result<()> {
    let json_string = serde_json::to_string_pretty(value)?;
    let mut file = File::create(path)?;
    file.write_all(json_string.as_bytes())?;
    Ok(())
}

/// Exports a deck to a JSON file at the specified path.
pub fn export_json_to_path(deck: &Deck, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    write_pretty(deck, path)?;
    info!(deck = %deck.name, path = %path.display(), "Deck exported");
    Ok(())
}

/// Imports a deck from a JSON file.
/// Returns an error if the file doesn't exist or contains invalid JSON.
pub fn import_json(path: impl AsRef<Path>) -> Result<Deck> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let deck: Deck = serde_json::from_reader(BufReader::new(file))?;

    info!(deck = %deck.name, path = %path.display(), "Deck imported");
    Ok(deck)
}

/// Writes the whole record map to `path`.
pub fn export_records_to_path(records: &RecordMap, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    write_pretty(records, path)?;
    info!(records = records.len(), path = %path.display(), "Review records exported");
    Ok(())
}

/// Reads a record map, failing on the first record that breaks an invariant.
pub fn import_records(path: impl AsRef<Path>) -> Result<RecordMap> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let records: RecordMap = serde_json::from_reader(BufReader::new(file))?;

    if let Err(e) = records.validate() {
        warn!(path = %path.display(), error = %e, "Rejected review record file");
        return Err(e);
    }

    info!(records = records.len(), path = %path.display(), "Review records imported");
    Ok(records)
}
