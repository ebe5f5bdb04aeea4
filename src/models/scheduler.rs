//! Spaced repetition scheduling.
//!
//! Each item carries an interval (days) and an ease factor:
//! - again: interval drops to 0 and the item is due immediately, ease -0.2
//! - hard: interval grows by 20% (at least 1 day), ease -0.15
//! - good: interval multiplied by ease (first success: 1 day)
//! - easy: interval multiplied by ease and a 1.3 bonus (first success: 4 days), ease +0.15
//! - ease never falls below 1.3 and has no ceiling
//!
//! Everything here is a pure function of its inputs. Callers persist the
//! returned records themselves.

use super::review_record::MIN_EASE;
use super::{Rating, RecordStore, ReviewRecord, Reviewable};
use crate::clock::{DAY_MS, Timestamp};
use crate::error::{Result, SrsError};

const HARD_INTERVAL_FACTOR: f64 = 1.2;
const EASY_BONUS: f64 = 1.3;
const AGAIN_EASE_PENALTY: f64 = 0.2;
const HARD_EASE_PENALTY: f64 = 0.15;
const EASY_EASE_BONUS: f64 = 0.15;
const GOOD_FIRST_INTERVAL: f64 = 1.0;
const EASY_FIRST_INTERVAL: f64 = 4.0;

/// Computes the record that results from rating an item at `now`.
///
/// `record` is the item's stored state, or `None` if it was never rated, in
/// which case the default record is created and updated in one step.
pub fn apply_rating(
    identity: &str,
    record: Option<&ReviewRecord>,
    rating: Rating,
    now: Timestamp,
) -> Result<ReviewRecord> {
    let current = match record {
        Some(record) => {
            if record.identity != identity {
                return Err(SrsError::IdentityMismatch {
                    expected: identity.to_string(),
                    found: record.identity.clone(),
                });
            }
            record.validate()?;
            record.clone()
        }
        None => ReviewRecord::new(identity),
    };

    let interval = current.interval_days;
    let ease = current.ease;

    let (new_interval, new_ease) = match rating {
        Rating::Again => (0.0, ease - AGAIN_EASE_PENALTY),
        Rating::Hard => (
            (interval * HARD_INTERVAL_FACTOR).max(1.0),
            ease - HARD_EASE_PENALTY,
        ),
        Rating::Good => {
            let next = if interval == 0.0 {
                GOOD_FIRST_INTERVAL
            } else {
                interval * ease
            };
            (next, ease)
        }
        Rating::Easy => {
            let next = if interval == 0.0 {
                EASY_FIRST_INTERVAL
            } else {
                interval * ease * EASY_BONUS
            };
            (next, ease + EASY_EASE_BONUS)
        }
    };

    let next_review_at = match rating {
        Rating::Again => now,
        _ => now.saturating_add(interval_to_millis(new_interval)),
    };

    let review_count = current
        .review_count
        .checked_add(1)
        .ok_or_else(|| SrsError::malformed(identity, "review count overflow"))?;

    Ok(ReviewRecord {
        identity: current.identity,
        next_review_at,
        interval_days: new_interval,
        ease: new_ease.max(MIN_EASE),
        review_count,
    })
}

fn interval_to_millis(interval_days: f64) -> i64 {
    (interval_days * DAY_MS as f64).round() as i64
}

/// An item is due if it was never reviewed or its next review time has come.
pub fn is_due(record: Option<&ReviewRecord>, now: Timestamp) -> bool {
    record.is_none_or(|record| record.next_review_at <= now)
}

/// Filters `candidates` down to due items and orders them for study: never
/// reviewed items first in catalog order, then reviewed items most overdue
/// first. Equal keys keep catalog order.
pub fn due_items<'a, T, S>(candidates: &'a [T], store: &S, now: Timestamp) -> Result<Vec<&'a T>>
where
    T: Reviewable,
    S: RecordStore + ?Sized,
{
    let mut due = Vec::with_capacity(candidates.len());
    for item in candidates {
        let record = store.get(item.identity())?;
        if is_due(record.as_ref(), now) {
            due.push((record.map(|r| r.next_review_at), item));
        }
    }

    // None sorts before Some, so new items lead; sort_by_key is stable.
    due.sort_by_key(|(next_review_at, _)| *next_review_at);

    Ok(due.into_iter().map(|(_, item)| item).collect())
}
