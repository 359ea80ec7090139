//! Derived View - everything shown about the compass, computed from the record.
//!
//! Nothing here has side effects. The one piece of derived state that must be
//! remembered (which month was last summarized) is returned as an updated
//! record for the caller to persist.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::gate::{GateStatus, LockGate};
use crate::messages::fill_poles;
use crate::record::{CompassRecord, Position};
use crate::storage::{Config, Poles};

/// Degrees of needle travel per position step.
const DEGREES_PER_STEP: f64 = 1.8;

/// Qualitative lean of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bias {
    TowardLow,
    Balanced,
    TowardHigh,
}

impl Bias {
    pub fn label(self, poles: &Poles) -> String {
        match self {
            Bias::TowardLow => format!("Bias → {}", poles.low),
            Bias::Balanced => "Balanced / Midway".to_string(),
            Bias::TowardHigh => format!("Bias → {}", poles.high),
        }
    }
}

/// Band boundaries for [`classify`].
///
/// Positions `<= low_max` lean low, `>= high_min` lean high, the rest are
/// balanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiasBands {
    #[serde(default = "default_low_max")]
    pub low_max: u8,
    #[serde(default = "default_high_min")]
    pub high_min: u8,
}

fn default_low_max() -> u8 {
    33
}
fn default_high_min() -> u8 {
    67
}

impl Default for BiasBands {
    fn default() -> Self {
        Self {
            low_max: default_low_max(),
            high_min: default_high_min(),
        }
    }
}

impl BiasBands {
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] unless `low_max < high_min <= 100`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.low_max >= self.high_min || self.high_min > crate::record::MAX_POSITION {
            return Err(ConfigError::InvalidValue {
                key: "bands".into(),
                message: format!(
                    "need low_max < high_min <= 100, got {} and {}",
                    self.low_max, self.high_min
                ),
            });
        }
        Ok(())
    }
}

pub fn classify(position: Position, bands: &BiasBands) -> Bias {
    let p = position.get();
    if p <= bands.low_max {
        Bias::TowardLow
    } else if p >= bands.high_min {
        Bias::TowardHigh
    } else {
        Bias::Balanced
    }
}

/// Needle angle in degrees: -90 at 0, 0 at 50, +90 at 100.
pub fn needle_angle(position: Position) -> f64 {
    f64::from(position.offset()) * DEGREES_PER_STEP
}

/// Proleptic ordinal day number (0001-01-01 is day 1).
pub fn day_seed(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce())
}

/// Pick the entry for `seed`; the same seed always yields the same entry.
pub fn select_message<T>(pool: &[T], seed: i64) -> Option<&T> {
    if pool.is_empty() {
        return None;
    }
    let len = i64::try_from(pool.len()).unwrap_or(i64::MAX);
    let index = usize::try_from(seed.rem_euclid(len)).unwrap_or(0);
    pool.get(index)
}

/// `YYYY-MM` token for the month containing `date`.
pub fn month_token(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Which pole led the cumulative counters at a month boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthlyOutcome {
    HighPoleLeads,
    LowPoleLeads,
    Tied,
}

/// One-time comparison shown when a new month is first seen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub month: String,
    pub outcome: MonthlyOutcome,
    pub ban_count: u32,
    pub mum_count: u32,
}

impl MonthlySummary {
    pub fn headline(&self, poles: &Poles) -> String {
        match self.outcome {
            MonthlyOutcome::HighPoleLeads => format!(
                "{} has the upper hand: {} days to {}.",
                poles.high, self.ban_count, self.mum_count
            ),
            MonthlyOutcome::LowPoleLeads => format!(
                "{} has the upper hand: {} days to {}.",
                poles.low, self.mum_count, self.ban_count
            ),
            MonthlyOutcome::Tied => format!(
                "Dead heat between {} and {}: {} days each.",
                poles.low, poles.high, self.ban_count
            ),
        }
    }
}

/// First day of the month named by a `YYYY-MM` token.
pub fn parse_month_token(token: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{token}-01"), "%Y-%m-%d").ok()
}

/// Summary due for `today`, if its month is later than the last summarized one.
///
/// A clock that moved back into an earlier month neither re-fires nor rewinds
/// the token. An unparseable token counts as never summarized.
pub fn monthly_summary_due(record: &CompassRecord, today: NaiveDate) -> Option<MonthlySummary> {
    let month = month_token(today);
    let last = record.last_summarized_month.as_deref().and_then(parse_month_token);
    if last.is_some_and(|last| (last.year(), last.month()) >= (today.year(), today.month())) {
        return None;
    }

    let outcome = match record.ban_count.cmp(&record.mum_count) {
        std::cmp::Ordering::Greater => MonthlyOutcome::HighPoleLeads,
        std::cmp::Ordering::Less => MonthlyOutcome::LowPoleLeads,
        std::cmp::Ordering::Equal => MonthlyOutcome::Tied,
    };

    Some(MonthlySummary {
        month,
        outcome,
        ban_count: record.ban_count,
        mum_count: record.mum_count,
    })
}

/// Record with the month token advanced past `summary`.
pub fn mark_summarized(record: &CompassRecord, summary: &MonthlySummary) -> CompassRecord {
    CompassRecord {
        last_summarized_month: Some(summary.month.clone()),
        ..record.clone()
    }
}

/// Everything a renderer needs to draw the compass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompassView {
    pub date: NaiveDate,
    pub gate: GateStatus,
    pub position: Position,
    pub candidate_position: Position,
    pub bias: Bias,
    pub bias_label: String,
    pub needle_angle: f64,
    pub quote: Option<String>,
    pub message: Option<String>,
    pub ban_count: u32,
    pub mum_count: u32,
    pub streak: u32,
    pub last_updated: Option<NaiveDate>,
    pub poles: Poles,
}

impl CompassView {
    pub fn build(
        record: &CompassRecord,
        now: DateTime<Utc>,
        gate: &LockGate,
        config: &Config,
    ) -> Self {
        let date = gate.calendar_date(now);
        let seed = day_seed(date);
        let poles = &config.poles;
        let bias = classify(record.position, &config.bands);

        let quotes = config.messages.quotes();
        let playful = match bias {
            Bias::TowardLow => config.messages.toward_low(),
            Bias::Balanced => config.messages.balanced(),
            Bias::TowardHigh => config.messages.toward_high(),
        };

        Self {
            date,
            gate: gate.status(record, now),
            position: record.position,
            candidate_position: gate.candidate_position(record, now),
            bias,
            bias_label: bias.label(poles),
            needle_angle: needle_angle(record.position),
            quote: select_message(&quotes, seed).cloned(),
            message: select_message(&playful, seed).map(|m| fill_poles(m, &poles.low, &poles.high)),
            ban_count: record.ban_count,
            mum_count: record.mum_count,
            streak: record.streak,
            last_updated: (!record.is_pristine()).then_some(record.last_updated_date),
            poles: poles.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn pos(p: i64) -> Position {
        Position::new(p).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn classify_default_band_edges() {
        let bands = BiasBands::default();
        assert_eq!(classify(pos(0), &bands), Bias::TowardLow);
        assert_eq!(classify(pos(33), &bands), Bias::TowardLow);
        assert_eq!(classify(pos(34), &bands), Bias::Balanced);
        assert_eq!(classify(pos(66), &bands), Bias::Balanced);
        assert_eq!(classify(pos(67), &bands), Bias::TowardHigh);
        assert_eq!(classify(pos(100), &bands), Bias::TowardHigh);
    }

    #[test]
    fn classify_respects_custom_bands() {
        let bands = BiasBands {
            low_max: 45,
            high_min: 55,
        };
        assert_eq!(classify(pos(40), &bands), Bias::TowardLow);
        assert_eq!(classify(pos(50), &bands), Bias::Balanced);
        assert_eq!(classify(pos(60), &bands), Bias::TowardHigh);
    }

    #[test]
    fn bands_validation() {
        assert!(BiasBands::default().validate().is_ok());
        assert!(BiasBands { low_max: 50, high_min: 50 }.validate().is_err());
        assert!(BiasBands { low_max: 10, high_min: 101 }.validate().is_err());
    }

    #[test]
    fn needle_angle_endpoints() {
        assert_eq!(needle_angle(pos(0)), -90.0);
        assert_eq!(needle_angle(pos(50)), 0.0);
        assert_eq!(needle_angle(pos(100)), 90.0);
        assert!((needle_angle(pos(75)) - 45.0).abs() < 1e-9);
    }

    #[test]
    fn day_seed_is_proleptic_ordinal() {
        assert_eq!(day_seed(date(1, 1, 1)), 1);
        assert_eq!(day_seed(date(1970, 1, 1)), 719_163);
    }

    #[test]
    fn select_message_is_stable_within_a_day() {
        let pool = ["a", "b", "c"];
        let seed = day_seed(date(2024, 3, 9));
        assert_eq!(select_message(&pool, seed), select_message(&pool, seed));
        assert_eq!(select_message(&pool, 3), Some(&"a"));
        assert_eq!(select_message(&pool, 4), Some(&"b"));
        assert_eq!(select_message::<&str>(&[], 4), None);
    }

    #[test]
    fn select_message_changes_at_day_boundary() {
        let pool = ["a", "b"];
        let today = day_seed(date(2024, 3, 9));
        let tomorrow = day_seed(date(2024, 3, 10));
        assert_ne!(select_message(&pool, today), select_message(&pool, tomorrow));
    }

    #[test]
    fn monthly_summary_fires_once_per_month() {
        let record = CompassRecord {
            ban_count: 4,
            mum_count: 2,
            last_summarized_month: Some("2024-02".into()),
            ..Default::default()
        };

        let summary = monthly_summary_due(&record, date(2024, 3, 1)).unwrap();
        assert_eq!(summary.month, "2024-03");
        assert_eq!(summary.outcome, MonthlyOutcome::HighPoleLeads);

        let updated = mark_summarized(&record, &summary);
        assert!(monthly_summary_due(&updated, date(2024, 3, 1)).is_none());
        assert!(monthly_summary_due(&updated, date(2024, 3, 31)).is_none());
        assert!(monthly_summary_due(&updated, date(2024, 4, 1)).is_some());
    }

    #[test]
    fn earlier_month_never_fires_summary() {
        let record = CompassRecord {
            ban_count: 3,
            last_summarized_month: Some("2024-04".into()),
            ..Default::default()
        };
        assert!(monthly_summary_due(&record, date(2024, 3, 31)).is_none());
        assert!(monthly_summary_due(&record, date(2023, 12, 1)).is_none());
        assert!(monthly_summary_due(&record, date(2024, 4, 15)).is_none());
        assert_eq!(monthly_summary_due(&record, date(2024, 5, 1)).unwrap().month, "2024-05");

        let garbled = CompassRecord {
            last_summarized_month: Some("soon".into()),
            ..Default::default()
        };
        assert!(monthly_summary_due(&garbled, date(2024, 3, 1)).is_some());
    }

    #[test]
    fn monthly_summary_outcomes() {
        let mut record = CompassRecord {
            ban_count: 1,
            mum_count: 3,
            ..Default::default()
        };
        let day = date(2024, 5, 2);
        assert_eq!(
            monthly_summary_due(&record, day).unwrap().outcome,
            MonthlyOutcome::LowPoleLeads
        );
        record.ban_count = 3;
        let tied = monthly_summary_due(&record, day).unwrap();
        assert_eq!(tied.outcome, MonthlyOutcome::Tied);
        assert!(tied.headline(&Poles::default()).contains("Dead heat"));
    }

    #[test]
    fn mark_summarized_only_touches_month_token() {
        let record = CompassRecord {
            position: pos(12),
            ban_count: 5,
            ..Default::default()
        };
        let summary = monthly_summary_due(&record, date(2024, 6, 1)).unwrap();
        let updated = mark_summarized(&record, &summary);
        assert_eq!(updated.position, record.position);
        assert_eq!(updated.ban_count, record.ban_count);
        assert_eq!(updated.last_updated_date, record.last_updated_date);
        assert_eq!(updated.last_summarized_month.as_deref(), Some("2024-06"));
    }

    #[test]
    fn view_uses_stored_position_and_resets_candidate() {
        let config = Config::default();
        let gate = LockGate::default();
        let record = CompassRecord {
            position: pos(90),
            last_updated_date: date(2024, 3, 8),
            ban_count: 1,
            ..Default::default()
        };
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 6, 0, 0).unwrap();

        let view = CompassView::build(&record, now, &gate, &config);

        assert_eq!(view.gate, GateStatus::Open);
        assert_eq!(view.position.get(), 90);
        assert_eq!(view.candidate_position.get(), 50);
        assert_eq!(view.bias, Bias::TowardHigh);
        assert_eq!(view.bias_label, "Bias → Bangalore");
        assert!((view.needle_angle - 72.0).abs() < 1e-9);
        assert!(view.quote.is_some());
        assert!(!view.message.as_deref().unwrap_or("{").contains('{'));
        assert_eq!(view.last_updated, Some(date(2024, 3, 8)));
    }

    #[test]
    fn pristine_record_has_no_last_updated() {
        let view = CompassView::build(
            &CompassRecord::default(),
            Utc.with_ymd_and_hms(2024, 3, 9, 6, 0, 0).unwrap(),
            &LockGate::default(),
            &Config::default(),
        );
        assert_eq!(view.last_updated, None);
        assert_eq!(view.bias, Bias::Balanced);
    }

    proptest! {
        #[test]
        fn classify_is_monotonic(a in 0i64..=100, b in 0i64..=100) {
            let bands = BiasBands::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(classify(pos(lo), &bands) <= classify(pos(hi), &bands));
        }

        #[test]
        fn needle_angle_is_strictly_increasing_and_bounded(a in 0i64..100) {
            let here = needle_angle(pos(a));
            let next = needle_angle(pos(a + 1));
            prop_assert!(next > here);
            prop_assert!((-90.0..=90.0).contains(&here));
            prop_assert!(((next - here) - DEGREES_PER_STEP).abs() < 1e-9);
        }

        #[test]
        fn select_message_always_in_pool(seed in any::<i64>(), len in 1usize..20) {
            let pool: Vec<usize> = (0..len).collect();
            let picked = select_message(&pool, seed).copied();
            prop_assert_eq!(picked, Some(seed.rem_euclid(len as i64) as usize));
        }
    }
}
