//! Learning session: a snapshot of the due list taken at session start.
//! Items rated "again" are queued once more at the end of the session.

use super::{Rating, RecordStore, ReviewRecord, Reviewable, scheduler};
use crate::clock::Timestamp;
use crate::error::Result;
use tracing::{debug, info};

/// A forward/backward cursor over a fixed study queue.
///
/// The queue holds indices into `cards`, so re-queued items are not cloned.
/// Due-ness is not re-evaluated while the session runs.
pub struct LearningSession<T> {
    pub deck_name: String,
    cards: Vec<T>,
    queue: Vec<usize>,
    current_index: usize,
}

impl<T: Reviewable> LearningSession<T> {
    /// Creates a session over `cards`, which are studied in the given order.
    pub fn new(deck_name: impl Into<String>, cards: Vec<T>) -> Self {
        let queue = (0..cards.len()).collect();
        let session = Self {
            deck_name: deck_name.into(),
            cards,
            queue,
            current_index: 0,
        };
        info!(
            deck = %session.deck_name,
            cards = session.cards.len(),
            "Learning session started"
        );
        session
    }

    /// Creates a session from the cards of `candidates` that are due at `now`.
    pub fn new_from_due_cards<S>(
        deck_name: impl Into<String>,
        candidates: &[T],
        store: &S,
        now: Timestamp,
    ) -> Result<Self>
    where
        T: Clone,
        S: RecordStore + ?Sized,
    {
        let due = scheduler::due_items(candidates, store, now)?
            .into_iter()
            .cloned()
            .collect();
        Ok(Self::new(deck_name, due))
    }

    pub fn current_card(&self) -> Option<&T> {
        self.queue
            .get(self.current_index)
            .and_then(|&idx| self.cards.get(idx))
    }

    /// Moves to the next card without rating the current one.
    pub fn next_card(&mut self) {
        if self.current_index < self.queue.len() {
            self.current_index += 1;
        }
    }

    pub fn previous_card(&mut self) {
        self.current_index = self.current_index.saturating_sub(1);
    }

    /// Applies a rating to the session order only: "again" queues the current
    /// card at the end, then the cursor advances.
    pub fn record_rating(&mut self, rating: Rating) {
        if let Some(&idx) = self.queue.get(self.current_index) {
            if rating == Rating::Again {
                self.queue.push(idx);
            }
            self.current_index += 1;
        }
    }

    /// Rates the current card, stores the updated record and advances.
    ///
    /// Returns `None` when the session is already complete. If the store
    /// rejects the record the cursor stays where it is.
    pub fn grade_current_card<S>(
        &mut self,
        store: &mut S,
        rating: Rating,
        now: Timestamp,
    ) -> Result<Option<ReviewRecord>>
    where
        S: RecordStore + ?Sized,
    {
        let Some(card) = self.current_card() else {
            return Ok(None);
        };
        let identity = card.identity().to_string();

        let previous = store.get(&identity)?;
        let updated = scheduler::apply_rating(&identity, previous.as_ref(), rating, now)?;
        store.put(&identity, updated.clone())?;

        debug!(
            identity = %identity,
            rating = %rating,
            interval_days = updated.interval_days,
            ease = updated.ease,
            "Card graded"
        );

        self.record_rating(rating);
        if self.is_completed() {
            info!(deck = %self.deck_name, reviews = self.queue.len(), "Learning session completed");
        }
        Ok(Some(updated))
    }

    /// Zero-based position of the cursor.
    pub fn position(&self) -> usize {
        self.current_index
    }

    /// Number of entries in the queue, including re-queued cards.
    pub fn total_count(&self) -> usize {
        self.queue.len()
    }

    pub fn remaining_count(&self) -> usize {
        self.queue.len().saturating_sub(self.current_index)
    }

    pub fn is_completed(&self) -> bool {
        self.current_index >= self.queue.len()
    }

    pub fn progress_message(&self) -> String {
        if self.is_completed() {
            format!("Session complete: {} reviews", self.total_count())
        } else {
            format!("Card {} of {}", self.current_index + 1, self.total_count())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::DAY_MS;
    use crate::models::{Flashcard, RecordMap};

    const NOW: Timestamp = 1_700_000_000_000;

    fn cards(terms: &[&str]) -> Vec<Flashcard> {
        terms.iter().map(|t| Flashcard::new(*t, "")).collect()
    }

    fn current_term<T: Reviewable>(session: &LearningSession<T>) -> Option<String> {
        session.current_card().map(|c| c.identity().to_string())
    }

    #[test]
    fn test_empty_session_is_completed() {
        let session: LearningSession<Flashcard> = LearningSession::new("empty", Vec::new());
        assert!(session.is_completed());
        assert!(session.current_card().is_none());
        assert_eq!(session.remaining_count(), 0);
    }

    #[test]
    fn test_ratings_advance_cursor() {
        let mut session = LearningSession::new("deck", cards(&["一", "二"]));
        assert_eq!(current_term(&session).as_deref(), Some("一"));

        session.record_rating(Rating::Good);
        assert_eq!(current_term(&session).as_deref(), Some("二"));
        assert_eq!(session.progress_message(), "Card 2 of 2");

        session.record_rating(Rating::Easy);
        assert!(session.is_completed());
        assert_eq!(session.progress_message(), "Session complete: 2 reviews");
    }

    #[test]
    fn test_again_requeues_at_end() {
        let mut session = LearningSession::new("deck", cards(&["一", "二", "三"]));

        session.record_rating(Rating::Again);
        assert_eq!(session.total_count(), 4);
        assert_eq!(current_term(&session).as_deref(), Some("二"));

        session.record_rating(Rating::Good);
        session.record_rating(Rating::Hard);
        assert_eq!(current_term(&session).as_deref(), Some("一"));

        session.record_rating(Rating::Again);
        assert_eq!(current_term(&session).as_deref(), Some("一"));

        session.record_rating(Rating::Good);
        assert!(session.is_completed());
        assert_eq!(session.total_count(), 5);
    }

    #[test]
    fn test_navigation() {
        let mut session = LearningSession::new("deck", cards(&["一", "二"]));
        session.previous_card();
        assert_eq!(session.position(), 0);

        session.next_card();
        assert_eq!(current_term(&session).as_deref(), Some("二"));
        session.previous_card();
        assert_eq!(current_term(&session).as_deref(), Some("一"));

        session.next_card();
        session.next_card();
        session.next_card();
        assert!(session.is_completed());
        assert_eq!(session.position(), 2);

        // rating past the end changes nothing
        session.record_rating(Rating::Again);
        assert_eq!(session.total_count(), 2);
    }

    #[test]
    fn test_session_snapshot_from_due_cards() {
        let catalog = cards(&["旧", "新", "未"]);
        let mut store = RecordMap::new();
        for (term, next_review_at) in [("旧", NOW - 1), ("未", NOW + DAY_MS)] {
            let record = ReviewRecord {
                next_review_at,
                interval_days: 1.0,
                review_count: 1,
                ..ReviewRecord::new(term)
            };
            store.put(term, record).unwrap();
        }

        let session = LearningSession::new_from_due_cards("deck", &catalog, &store, NOW).unwrap();
        assert_eq!(session.total_count(), 2);
        assert_eq!(current_term(&session).as_deref(), Some("新"));
    }

    #[test]
    fn test_grade_stores_records() {
        let mut store = RecordMap::new();
        let mut session = LearningSession::new("deck", cards(&["一", "二"]));

        let first = session
            .grade_current_card(&mut store, Rating::Again, NOW)
            .unwrap()
            .unwrap();
        assert_eq!(first.identity, "一");
        assert_eq!(first.next_review_at, NOW);

        session.grade_current_card(&mut store, Rating::Good, NOW).unwrap();

        // "一" comes back within the same session even though its record is
        // only due again right now.
        let again = session
            .grade_current_card(&mut store, Rating::Good, NOW + 1_000)
            .unwrap()
            .unwrap();
        assert_eq!(again.identity, "一");
        assert_eq!(again.review_count, 2);
        assert_eq!(again.interval_days, 1.0);

        assert!(session.is_completed());
        assert!(session.grade_current_card(&mut store, Rating::Good, NOW).unwrap().is_none());
        assert_eq!(store.get("二").unwrap().unwrap().review_count, 1);
    }

    #[test]
    fn test_rejected_write_keeps_cursor() {
        let json = r#"{"坏":{"simplified":"坏","nextReview":0,"interval":1,"ease":1.0,"reviewsCount":1}}"#;
        let mut store: RecordMap = serde_json::from_str(json).unwrap();
        let mut session = LearningSession::new("deck", cards(&["坏"]));

        assert!(session.grade_current_card(&mut store, Rating::Good, NOW).is_err());
        assert_eq!(session.position(), 0);
        assert!(!session.is_completed());
    }
}
