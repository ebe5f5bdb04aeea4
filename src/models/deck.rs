//! Deck is a named set of flashcards, the catalog a study queue is drawn from
use super::Flashcard;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Deck {
    pub name: String,
    pub flashcards: Vec<Flashcard>,
}
