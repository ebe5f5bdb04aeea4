pub mod deck;
pub mod flashcard;
pub mod learning_session;
pub mod rating;
pub mod record_store;
pub mod review_record;
pub mod scheduler;
pub mod stats;

pub use deck::Deck;
pub use flashcard::{Flashcard, Reviewable};
pub use learning_session::LearningSession;
pub use rating::Rating;
pub use record_store::{RecordMap, RecordStore};
pub use review_record::{ReviewRecord, Stage};
pub use scheduler::{apply_rating, due_items, is_due};
pub use stats::StudyStats;
