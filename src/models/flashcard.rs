//! Flashcard is a pair <term, definition>. The term is the headword and doubles
//! as the item identity in the review record store.
use serde::{Deserialize, Serialize};

/// Anything the scheduler can order: it only needs a stable identity.
pub trait Reviewable {
    fn identity(&self) -> &str;
}

impl<T: Reviewable + ?Sized> Reviewable for &T {
    fn identity(&self) -> &str {
        (**self).identity()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flashcard {
    pub term: String,
    pub definition: String,
}

impl Flashcard {
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
        }
    }
}

impl Reviewable for Flashcard {
    fn identity(&self) -> &str {
        &self.term
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flashcard_creation() {
        let card = Flashcard::new("你好", "hello");

        assert_eq!(card.term, "你好");
        assert_eq!(card.definition, "hello");
    }

    #[test]
    fn test_identity_is_term() {
        let card = Flashcard::new("谢谢", "thank you");
        assert_eq!(card.identity(), "谢谢");
        assert_eq!((&card).identity(), "谢谢");
    }
}
