//! Commit - applies a new daily position to a record.
//!
//! This is a pure transformation. Persisting the result is the caller's job
//! (see [`crate::Compass::commit`]); the returned record must be stored as a
//! whole so counters never land without the matching position and date.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::error::CommitError;
use crate::gate::LockGate;
use crate::record::{CompassRecord, Position};

/// Produce the record that results from committing `proposed` at `now`.
///
/// Calling this twice on the same reference day is a caller error and is
/// rejected, never absorbed: a second accepted commit would double-count.
///
/// # Errors
///
/// - [`CommitError::InvalidPosition`] if `proposed` is outside `0..=100`
/// - [`CommitError::CommitWhileLocked`] if today is already committed
/// - [`CommitError::DateRegressed`] if the last commit is dated after today
/// - [`CommitError::NotYetWritable`] if it is before the cutoff
pub fn commit(
    record: &CompassRecord,
    proposed: i64,
    now: DateTime<Utc>,
    gate: &LockGate,
) -> Result<CompassRecord, CommitError> {
    let position = Position::new(proposed)?;
    gate.check(record, now)?;

    let today = gate.calendar_date(now);
    let mut next = record.clone();

    match position.get().cmp(&crate::record::NEUTRAL) {
        Ordering::Greater => next.ban_count = next.ban_count.saturating_add(1),
        Ordering::Less => next.mum_count = next.mum_count.saturating_add(1),
        Ordering::Equal => {}
    }

    next.streak = if today.pred_opt() == Some(record.last_updated_date) {
        record.streak.saturating_add(1)
    } else {
        1
    };
    next.position = position;
    next.last_updated_date = today;

    Ok(next)
}
