//! Lock Gate - decides whether today's position may still be committed.
//!
//! All wall-clock questions are answered in a single fixed reference zone
//! (India Standard Time by default), not in the caller's local zone. The daily
//! boundary and the morning cutoff are therefore the same instant for every
//! caller.
//!
//! ## States
//!
//! - **Open**: no commit yet today and the cutoff has passed
//! - **NotYet**: no commit yet today, but it is still before the cutoff
//! - **Locked**: today's commit already happened (or the stored date is later
//!   than today); the value is read-only

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CommitError, ConfigError};
use crate::record::{CompassRecord, Position};
use crate::storage::GateConfig;

/// UTC offset of India Standard Time, in minutes.
pub const IST_OFFSET_MINUTES: i32 = 5 * 60 + 30;

/// Default time of day after which commits open.
pub const DEFAULT_CUTOFF: &str = "09:15";

/// Whether a commit may be offered right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    Open,
    NotYet,
    Locked,
}

impl GateStatus {
    pub fn can_commit(self) -> bool {
        self == GateStatus::Open
    }

    /// The input control stays adjustable unless today is already committed.
    pub fn is_adjustable(self) -> bool {
        self != GateStatus::Locked
    }
}

/// Fixed-zone daily lock with a morning cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockGate {
    reference_offset: FixedOffset,
    cutoff: NaiveTime,
}

impl Default for LockGate {
    fn default() -> Self {
        let offset = FixedOffset::east_opt(IST_OFFSET_MINUTES * 60).unwrap_or_else(|| Utc.fix());
        let cutoff = NaiveTime::from_hms_opt(9, 15, 0).unwrap_or(NaiveTime::MIN);
        Self::new(offset, cutoff)
    }
}

impl LockGate {
    pub fn new(reference_offset: FixedOffset, cutoff: NaiveTime) -> Self {
        Self {
            reference_offset,
            cutoff,
        }
    }

    /// Build a gate from the `[gate]` config section.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the offset is out of range or
    /// the cutoff is not `HH:MM` / `HH:MM:SS`.
    pub fn from_config(config: &GateConfig) -> Result<Self, ConfigError> {
        let offset = FixedOffset::east_opt(config.utc_offset_minutes * 60).ok_or_else(|| {
            ConfigError::InvalidValue {
                key: "gate.utc_offset_minutes".into(),
                message: format!("{} is not a valid UTC offset", config.utc_offset_minutes),
            }
        })?;
        let cutoff = parse_cutoff(&config.cutoff)?;
        Ok(Self::new(offset, cutoff))
    }

    pub fn reference_offset(&self) -> FixedOffset {
        self.reference_offset
    }

    pub fn cutoff(&self) -> NaiveTime {
        self.cutoff
    }

    /// `now` expressed in the reference zone.
    pub fn reference_time(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        now.with_timezone(&self.reference_offset)
    }

    /// Calendar date of `now` in the reference zone.
    pub fn calendar_date(&self, now: DateTime<Utc>) -> NaiveDate {
        self.reference_time(now).date_naive()
    }

    /// True iff the record was already committed on today's reference date.
    pub fn is_locked_for_today(&self, record: &CompassRecord, now: DateTime<Utc>) -> bool {
        record.last_updated_date == self.calendar_date(now)
    }

    /// True iff the reference time of day is at or past the cutoff.
    pub fn is_writable_now(&self, now: DateTime<Utc>) -> bool {
        self.reference_time(now).time() >= self.cutoff
    }

    /// True iff the stored commit date lies after today's reference date.
    pub fn is_regressed(&self, record: &CompassRecord, now: DateTime<Utc>) -> bool {
        record.last_updated_date > self.calendar_date(now)
    }

    pub fn status(&self, record: &CompassRecord, now: DateTime<Utc>) -> GateStatus {
        if self.is_locked_for_today(record, now) || self.is_regressed(record, now) {
            GateStatus::Locked
        } else if self.is_writable_now(now) {
            GateStatus::Open
        } else {
            GateStatus::NotYet
        }
    }

    /// Reject a commit the gate does not allow.
    ///
    /// # Errors
    ///
    /// [`CommitError::CommitWhileLocked`] when today is already committed,
    /// [`CommitError::DateRegressed`] when the stored date is after today,
    /// [`CommitError::NotYetWritable`] when it is before the cutoff.
    pub fn check(&self, record: &CompassRecord, now: DateTime<Utc>) -> Result<(), CommitError> {
        if self.is_regressed(record, now) {
            return Err(CommitError::DateRegressed {
                stored: record.last_updated_date,
                today: self.calendar_date(now),
            });
        }
        match self.status(record, now) {
            GateStatus::Open => Ok(()),
            GateStatus::Locked => Err(CommitError::CommitWhileLocked {
                date: record.last_updated_date,
            }),
            GateStatus::NotYet => Err(CommitError::NotYetWritable {
                cutoff: self.cutoff,
                now: self.reference_time(now).time(),
            }),
        }
    }

    /// Value the input control should start at.
    ///
    /// A locked day shows what was committed; any other day starts from the
    /// neutral midpoint. The stored position is left untouched either way.
    pub fn candidate_position(&self, record: &CompassRecord, now: DateTime<Utc>) -> Position {
        if self.is_locked_for_today(record, now) {
            record.position
        } else {
            Position::NEUTRAL
        }
    }
}

fn parse_cutoff(raw: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|e| ConfigError::InvalidValue {
            key: "gate.cutoff".into(),
            message: format!("'{raw}' is not a time of day: {e}"),
        })
}
