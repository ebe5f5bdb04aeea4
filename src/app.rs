//! Command handlers for the terminal front end.
//! Each command loads what it needs from the database, runs the scheduler
//! against the injected clock and reports to the given writer.

use anyhow::{Context, Result, bail};
use hanzi_srs::Clock;
use hanzi_srs::clock::format_date;
use hanzi_srs::database::db::{self, SqliteStore};
use hanzi_srs::export::json::{
    export_json_to_path, export_records_to_path, import_json, import_records,
};
use hanzi_srs::models::{
    Deck, LearningSession, Rating, RecordStore, StudyStats, apply_rating, due_items,
};
use std::io::{BufRead, Write};
use std::path::Path;

pub struct App {
    store: SqliteStore,
    clock: Box<dyn Clock>,
}

impl App {
    pub fn new(store: SqliteStore, clock: Box<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn load_deck(&self, name: &str) -> Result<Deck> {
        match db::load_deck(name, self.store.conn())? {
            Some(deck) => Ok(deck),
            None => bail!("No deck named '{}'", name),
        }
    }

    pub fn list_decks(&self, out: &mut impl Write) -> Result<()> {
        let now = self.clock.now();
        for name in db::get_all_decks(self.store.conn())? {
            let deck = self.load_deck(&name)?;
            let due = due_items(&deck.flashcards, &self.store, now)?.len();
            writeln!(
                out,
                "{} ({} cards, {} due)",
                deck.name,
                deck.flashcards.len(),
                due
            )?;
        }
        Ok(())
    }

    pub fn import_deck(&mut self, file: &Path, out: &mut impl Write) -> Result<()> {
        let deck = import_json(file)
            .with_context(|| format!("Failed to import deck from {}", file.display()))?;
        db::save_deck(&deck, self.store.conn_mut())?;
        writeln!(
            out,
            "Deck '{}' imported ({} cards)",
            deck.name,
            deck.flashcards.len()
        )?;
        Ok(())
    }

    pub fn export_deck(&self, name: &str, file: &Path, out: &mut impl Write) -> Result<()> {
        let deck = self.load_deck(name)?;
        export_json_to_path(&deck, file)?;
        writeln!(out, "Deck '{}' exported to {}", deck.name, file.display())?;
        Ok(())
    }

    pub fn show_due(&self, name: &str, out: &mut impl Write) -> Result<()> {
        let deck = self.load_deck(name)?;
        let due = due_items(&deck.flashcards, &self.store, self.clock.now())?;
        if due.is_empty() {
            writeln!(out, "No cards due for review!")?;
            return Ok(());
        }

        writeln!(out, "{} cards due", due.len())?;
        for card in due {
            match self.store.get(&card.term)? {
                Some(record) => writeln!(
                    out,
                    "  {}  {}  (reviewed {}x{})",
                    card.term,
                    card.definition,
                    record.review_count,
                    record
                        .interval_badge()
                        .map(|badge| format!(", {badge}"))
                        .unwrap_or_default()
                )?,
                None => writeln!(out, "  {}  {}  (new)", card.term, card.definition)?,
            }
        }
        Ok(())
    }

    pub fn rate(&mut self, identity: &str, rating: &str, out: &mut impl Write) -> Result<()> {
        let rating: Rating = rating.parse()?;
        let now = self.clock.now();

        let previous = self.store.get(identity)?;
        let updated = apply_rating(identity, previous.as_ref(), rating, now)?;
        self.store.put(identity, updated.clone())?;

        writeln!(
            out,
            "{} rated {}: next review {} (interval {:.1} days, ease {:.2})",
            identity,
            rating,
            format_date(updated.next_review_at),
            updated.interval_days,
            updated.ease
        )?;
        Ok(())
    }

    /// Runs a study session reading commands line by line: an empty line
    /// reveals the definition, 1-4 or a rating name rates the card, `p` goes
    /// back, `s` skips and `q` quits.
    pub fn study(&mut self, name: &str, input: &mut impl BufRead, out: &mut impl Write) -> Result<()> {
        let deck = self.load_deck(name)?;
        let mut session = LearningSession::new_from_due_cards(
            deck.name.clone(),
            &deck.flashcards,
            &self.store,
            self.clock.now(),
        )?;

        if session.is_completed() {
            writeln!(out, "No cards due for review!")?;
            return Ok(());
        }

        let mut line = String::new();
        while let Some(card) = session.current_card().cloned() {
            writeln!(out, "[{}] {}", session.progress_message(), card.term)?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }
            match line.trim() {
                "" => {
                    writeln!(out, "    {}", card.definition)?;
                    writeln!(out, "    1 again  2 hard  3 good  4 easy")?;
                }
                "q" => break,
                "p" => session.previous_card(),
                "s" => session.next_card(),
                answer => match answer.parse::<Rating>() {
                    Ok(rating) => {
                        session.grade_current_card(&mut self.store, rating, self.clock.now())?;
                    }
                    Err(e) => writeln!(out, "{e}")?,
                },
            }
        }

        writeln!(out, "{}", session.progress_message())?;
        Ok(())
    }

    pub fn show_stats(&self, name: &str, out: &mut impl Write) -> Result<()> {
        let deck = self.load_deck(name)?;
        let stats = StudyStats::collect(&deck.flashcards, &self.store)?;
        writeln!(out, "New:       {}", stats.new)?;
        writeln!(out, "Learning:  {}", stats.learning)?;
        writeln!(out, "Reviewing: {}", stats.reviewing)?;
        writeln!(out, "Mastered:  {}", stats.mastered)?;
        writeln!(out, "Mastery:   {}%", stats.mastery_percentage())?;
        Ok(())
    }

    pub fn reset(&mut self, identity: &str, out: &mut impl Write) -> Result<()> {
        if self.store.remove(identity)? {
            writeln!(out, "Review history for '{}' cleared", identity)?;
        } else {
            writeln!(out, "'{}' has no review history", identity)?;
        }
        Ok(())
    }

    pub fn export_records(&self, file: &Path, out: &mut impl Write) -> Result<()> {
        let records = db::load_review_records(self.store.conn())?;
        export_records_to_path(&records, file)?;
        writeln!(out, "{} review records exported", records.len())?;
        Ok(())
    }

    pub fn import_records(&mut self, file: &Path, out: &mut impl Write) -> Result<()> {
        let records = import_records(file)
            .with_context(|| format!("Failed to import review records from {}", file.display()))?;
        db::replace_review_records(&records, self.store.conn_mut())?;
        writeln!(out, "{} review records imported", records.len())?;
        Ok(())
    }

    pub fn next_day(&self, out: &mut impl Write) -> Result<()> {
        let date = db::advance_day(self.store.conn())?;
        writeln!(out, "Simulated date is now {}", format_date(date))?;
        Ok(())
    }

    pub fn today(&self, out: &mut impl Write) -> Result<()> {
        writeln!(out, "{}", format_date(self.clock.now()))?;
        Ok(())
    }
}
