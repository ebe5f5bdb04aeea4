pub mod clock;
pub mod database;
pub mod error;
pub mod export;
pub mod models;

pub use clock::{Clock, FixedClock, SystemClock, Timestamp};
pub use error::{Result, SrsError};
pub use models::{
    Deck, Flashcard, LearningSession, Rating, RecordMap, RecordStore, ReviewRecord, Reviewable,
    StudyStats,
};
