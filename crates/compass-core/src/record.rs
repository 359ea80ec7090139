//! The persisted compass record.
//!
//! There is exactly one record per installation. It is created with defaults
//! on first read and replaced as a whole on every write.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CommitError;

/// Neutral midpoint between the two poles.
pub const NEUTRAL: u8 = 50;

/// Highest valid position.
pub const MAX_POSITION: u8 = 100;

/// A compass position, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Position(u8);

impl Position {
    pub const NEUTRAL: Position = Position(NEUTRAL);

    /// Validate a raw value coming from a caller.
    pub fn new(value: i64) -> Result<Self, CommitError> {
        if (0..=i64::from(MAX_POSITION)).contains(&value) {
            Ok(Position(value as u8))
        } else {
            Err(CommitError::InvalidPosition { value })
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Signed distance from the neutral midpoint, in `-50..=50`.
    pub fn offset(self) -> i16 {
        i16::from(self.0) - i16::from(NEUTRAL)
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::NEUTRAL
    }
}

impl TryFrom<i64> for Position {
    type Error = CommitError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Position::new(value)
    }
}

impl From<Position> for u8 {
    fn from(position: Position) -> Self {
        position.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Date written into a fresh record; no real commit can carry it.
pub fn epoch_sentinel() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// The sole persisted entity.
///
/// Missing fields fall back to their defaults on load. Older state files that
/// spell the date `last_updated` are read through [`CompassRecord::from_json_str`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompassRecord {
    /// Last committed position.
    pub position: Position,

    /// Reference-zone date of the last accepted commit.
    pub last_updated_date: NaiveDate,

    /// Days committed with a position above 50.
    pub ban_count: u32,

    /// Days committed with a position below 50.
    pub mum_count: u32,

    /// Month token (`YYYY-MM`) of the last surfaced monthly summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_summarized_month: Option<String>,

    /// Consecutive days with a commit, ending at `last_updated_date`.
    pub streak: u32,
}

impl Default for CompassRecord {
    fn default() -> Self {
        Self {
            position: Position::NEUTRAL,
            last_updated_date: epoch_sentinel(),
            ban_count: 0,
            mum_count: 0,
            last_summarized_month: None,
            streak: 0,
        }
    }
}

impl CompassRecord {
    /// True until the first commit lands.
    pub fn is_pristine(&self) -> bool {
        self.last_updated_date == epoch_sentinel()
    }

    /// Parse a stored record, accepting the legacy `last_updated` key.
    ///
    /// When a file carries both keys, `lastUpdatedDate` wins and the legacy
    /// value is dropped.
    ///
    /// # Errors
    ///
    /// Returns the underlying JSON error for malformed documents or invalid
    /// field values.
    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        let mut value: serde_json::Value = serde_json::from_str(content)?;
        if let Some(object) = value.as_object_mut() {
            if let Some(legacy) = object.remove(LEGACY_DATE_KEY) {
                object.entry(DATE_KEY).or_insert(legacy);
            }
        }
        serde_json::from_value(value)
    }
}

const DATE_KEY: &str = "lastUpdatedDate";
const LEGACY_DATE_KEY: &str = "last_updated";
