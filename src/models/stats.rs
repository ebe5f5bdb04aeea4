//! Progress counts over a study list.
use super::{RecordStore, Reviewable, Stage};
use crate::error::Result;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StudyStats {
    pub new: usize,
    pub learning: usize,
    pub reviewing: usize,
    pub mastered: usize,
}

impl StudyStats {
    pub fn collect<T, S>(items: &[T], store: &S) -> Result<Self>
    where
        T: Reviewable,
        S: RecordStore + ?Sized,
    {
        let mut stats = Self::default();
        for item in items {
            let stage = match store.get(item.identity())? {
                Some(record) => record.stage(),
                None => Stage::New,
            };
            stats.count(stage);
        }
        Ok(stats)
    }

    fn count(&mut self, stage: Stage) {
        match stage {
            Stage::New => self.new += 1,
            Stage::Learning => self.learning += 1,
            Stage::Reviewing => self.reviewing += 1,
            Stage::Mastered => self.mastered += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.new + self.learning + self.reviewing + self.mastered
    }

    /// Share of items at least in the reviewing stage, rounded to a whole percent.
    pub fn mastery_percentage(&self) -> u32 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        (((self.reviewing + self.mastered) as f64 / total as f64) * 100.0).round() as u32
    }
}
