//! Review record store: the caller-owned map from item identity to its
//! scheduling state. The scheduler only reads from it; callers commit the
//! records it returns.

use super::ReviewRecord;
use crate::error::{Result, SrsError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub trait RecordStore {
    /// Returns the stored record, failing if it violates an invariant.
    fn get(&self, identity: &str) -> Result<Option<ReviewRecord>>;

    /// Stores `record` under `identity`. Rejects a record keyed by a
    /// different item or one whose review count goes backwards.
    fn put(&mut self, identity: &str, record: ReviewRecord) -> Result<()>;

    /// Forgets an item's history. Returns whether a record existed.
    fn remove(&mut self, identity: &str) -> Result<bool>;
}

/// Checks a write against the record it replaces.
pub(crate) fn check_put(
    identity: &str,
    record: &ReviewRecord,
    previous: Option<&ReviewRecord>,
) -> Result<()> {
    if record.identity != identity {
        return Err(SrsError::IdentityMismatch {
            expected: identity.to_string(),
            found: record.identity.clone(),
        });
    }
    record.validate()?;

    if let Some(previous) = previous {
        if record.review_count < previous.review_count {
            return Err(SrsError::malformed(
                identity,
                format!(
                    "review count would drop from {} to {}",
                    previous.review_count, record.review_count
                ),
            ));
        }
    }
    Ok(())
}

/// In-memory store. Serializes as a JSON object keyed by identity.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordMap {
    records: BTreeMap<String, ReviewRecord>,
}

impl RecordMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReviewRecord)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Validates every entry, e.g. after deserializing an untrusted file.
    pub fn validate(&self) -> Result<()> {
        for (identity, record) in &self.records {
            record.validate_for(identity)?;
        }
        Ok(())
    }
}

impl RecordStore for RecordMap {
    fn get(&self, identity: &str) -> Result<Option<ReviewRecord>> {
        match self.records.get(identity) {
            Some(record) => {
                record.validate_for(identity)?;
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    fn put(&mut self, identity: &str, record: ReviewRecord) -> Result<()> {
        check_put(identity, &record, self.records.get(identity))?;
        self.records.insert(identity.to_string(), record);
        Ok(())
    }

    fn remove(&mut self, identity: &str) -> Result<bool> {
        Ok(self.records.remove(identity).is_some())
    }
}

impl FromIterator<ReviewRecord> for RecordMap {
    fn from_iter<I: IntoIterator<Item = ReviewRecord>>(iter: I) -> Self {
        Self {
            records: iter
                .into_iter()
                .map(|record| (record.identity.clone(), record))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(identity: &str, review_count: u32) -> ReviewRecord {
        ReviewRecord {
            review_count,
            ..ReviewRecord::new(identity)
        }
    }

    #[test]
    fn test_get_missing_is_none() {
        let store = RecordMap::new();
        assert!(store.get("猫").unwrap().is_none());
    }

    #[test]
    fn test_put_then_get() {
        let mut store = RecordMap::new();
        store.put("猫", record("猫", 1)).unwrap();

        let stored = store.get("猫").unwrap().unwrap();
        assert_eq!(stored.review_count, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_put_rejects_identity_mismatch() {
        let mut store = RecordMap::new();
        let result = store.put("狗", record("猫", 1));
        assert!(matches!(result, Err(SrsError::IdentityMismatch { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn test_put_rejects_decreasing_review_count() {
        let mut store = RecordMap::new();
        store.put("猫", record("猫", 4)).unwrap();

        let result = store.put("猫", record("猫", 3));
        assert!(matches!(result, Err(SrsError::MalformedRecord { .. })));
        assert_eq!(store.get("猫").unwrap().unwrap().review_count, 4);
    }

    #[test]
    fn test_put_rejects_invalid_record() {
        let mut store = RecordMap::new();
        let mut bad = record("猫", 1);
        bad.ease = 1.0;
        assert!(store.put("猫", bad).is_err());
    }

    #[test]
    fn test_get_fails_on_malformed_entry() {
        let json = r#"{"鱼":{"simplified":"鱼","nextReview":0,"interval":-1,"ease":2.5,"reviewsCount":1}}"#;
        let store: RecordMap = serde_json::from_str(json).unwrap();

        assert!(matches!(
            store.get("鱼"),
            Err(SrsError::MalformedRecord { .. })
        ));
        assert!(store.validate().is_err());
    }

    #[test]
    fn test_remove() {
        let mut store = RecordMap::new();
        store.put("猫", record("猫", 1)).unwrap();

        assert!(store.remove("猫").unwrap());
        assert!(!store.remove("猫").unwrap());
        assert!(store.get("猫").unwrap().is_none());

        // a reset item starts over from zero
        store.put("猫", record("猫", 0)).unwrap();
    }

    #[test]
    fn test_collect_keys_by_identity() {
        let store: RecordMap = vec![record("一", 1), record("二", 2)].into_iter().collect();
        let keys: Vec<&str> = store.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["一", "二"]);
    }
}
