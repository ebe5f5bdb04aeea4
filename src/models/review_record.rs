//! Per-item scheduling state, created lazily on the first rating.
use crate::clock::Timestamp;
use crate::error::{Result, SrsError};
use serde::{Deserialize, Deserializer, Serialize, de};

/// Lower bound for the easiness factor.
pub const MIN_EASE: f64 = 1.3;
/// Easiness factor of a never-reviewed item.
pub const INITIAL_EASE: f64 = 2.5;

/// Serialized with the field names of the browser app's `hanzi-srs` map so
/// exported files stay interchangeable with it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewRecord {
    #[serde(rename = "simplified")]
    pub identity: String,
    #[serde(rename = "nextReview", deserialize_with = "timestamp_from_number")]
    pub next_review_at: Timestamp,
    #[serde(rename = "interval")]
    pub interval_days: f64,
    pub ease: f64,
    #[serde(rename = "reviewsCount")]
    pub review_count: u32,
}

/// Accepts fractional milliseconds, which the browser app writes whenever a
/// fractional interval is converted to a due time.
fn timestamp_from_number<'de, D>(deserializer: D) -> std::result::Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = f64::deserialize(deserializer)?;
    if !millis.is_finite() {
        return Err(de::Error::custom("nextReview must be a finite number"));
    }
    Ok(millis.round() as Timestamp)
}

/// Learning stage derived from the current interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    New,
    Learning,
    Reviewing,
    Mastered,
}

impl ReviewRecord {
    /// Default state of an item that has never been rated. `next_review_at`
    /// of 0 keeps it due at any time.
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            next_review_at: 0,
            interval_days: 0.0,
            ease: INITIAL_EASE,
            review_count: 0,
        }
    }

    /// Checks the invariants every stored record must hold.
    pub fn validate(&self) -> Result<()> {
        if !self.ease.is_finite() || self.ease < MIN_EASE {
            return Err(SrsError::malformed(
                &self.identity,
                format!("ease {} is below {}", self.ease, MIN_EASE),
            ));
        }
        if !self.interval_days.is_finite() || self.interval_days < 0.0 {
            return Err(SrsError::malformed(
                &self.identity,
                format!("interval {} is negative", self.interval_days),
            ));
        }
        Ok(())
    }

    /// Like [`validate`](Self::validate), and also requires the record to
    /// sit under its own identity.
    pub fn validate_for(&self, key: &str) -> Result<()> {
        if self.identity != key {
            return Err(SrsError::malformed(
                key,
                format!("stored under '{}' but carries identity '{}'", key, self.identity),
            ));
        }
        self.validate()
    }

    pub fn stage(&self) -> Stage {
        if self.interval_days < 3.0 {
            Stage::Learning
        } else if self.interval_days < 21.0 {
            Stage::Reviewing
        } else {
            Stage::Mastered
        }
    }

    /// Whole-day interval label, e.g. "6d". None while unscheduled.
    pub fn interval_badge(&self) -> Option<String> {
        if self.interval_days > 0.0 {
            Some(format!("{}d", self.interval_days.floor() as u64))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_defaults() {
        let record = ReviewRecord::new("你");
        assert_eq!(record.identity, "你");
        assert_eq!(record.next_review_at, 0);
        assert_eq!(record.interval_days, 0.0);
        assert_eq!(record.ease, 2.5);
        assert_eq!(record.review_count, 0);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_low_ease() {
        let mut record = ReviewRecord::new("好");
        record.ease = 1.29;
        assert!(matches!(
            record.validate(),
            Err(SrsError::MalformedRecord { .. })
        ));

        record.ease = f64::NAN;
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_negative_interval() {
        let mut record = ReviewRecord::new("好");
        record.interval_days = -0.5;
        assert!(matches!(
            record.validate(),
            Err(SrsError::MalformedRecord { .. })
        ));

        record.interval_days = f64::INFINITY;
        assert!(record.validate().is_err());
    }

    #[test]
    fn test_validate_for_checks_key() {
        let record = ReviewRecord::new("我");
        assert!(record.validate_for("我").is_ok());
        match record.validate_for("你") {
            Err(SrsError::MalformedRecord { identity, .. }) => assert_eq!(identity, "你"),
            other => panic!("expected MalformedRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_stage_thresholds() {
        let mut record = ReviewRecord::new("学");
        for (interval, stage) in [
            (0.0, Stage::Learning),
            (2.9, Stage::Learning),
            (3.0, Stage::Reviewing),
            (20.5, Stage::Reviewing),
            (21.0, Stage::Mastered),
            (400.0, Stage::Mastered),
        ] {
            record.interval_days = interval;
            assert_eq!(record.stage(), stage, "interval {interval}");
        }
    }

    #[test]
    fn test_interval_badge() {
        let mut record = ReviewRecord::new("学");
        assert_eq!(record.interval_badge(), None);

        record.interval_days = 1.2;
        assert_eq!(record.interval_badge().as_deref(), Some("1d"));

        record.interval_days = 26.0;
        assert_eq!(record.interval_badge().as_deref(), Some("26d"));
    }

    #[test]
    fn test_json_field_names() {
        let record = ReviewRecord {
            identity: "水".to_string(),
            next_review_at: 1_700_000_000_000,
            interval_days: 6.25,
            ease: 2.35,
            review_count: 3,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["simplified"], "水");
        assert_eq!(value["nextReview"], 1_700_000_000_000i64);
        assert_eq!(value["interval"], 6.25);
        assert_eq!(value["ease"], 2.35);
        assert_eq!(value["reviewsCount"], 3);
    }

    #[test]
    fn test_fractional_next_review_is_rounded() {
        let json = r#"{"simplified":"火","nextReview":1700000000000.6,"interval":1.2,"ease":2.35,"reviewsCount":2}"#;
        let record: ReviewRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.next_review_at, 1_700_000_000_001);
        assert_eq!(record.interval_days, 1.2);
    }
}
