//! Application instance tying the store, the gate and the config together.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::commit::commit;
use crate::error::Result;
use crate::gate::{GateStatus, LockGate};
use crate::record::CompassRecord;
use crate::storage::{load_or_default, Config, JsonFileStore, StateStore};
use crate::view::{mark_summarized, monthly_summary_due, CompassView, MonthlySummary};

/// One compass: a store plus the gate and config that govern it.
///
/// Every method takes `now` explicitly; nothing reads the clock internally.
#[derive(Debug)]
pub struct Compass<S: StateStore> {
    store: S,
    gate: LockGate,
    config: Config,
}

impl Compass<JsonFileStore> {
    /// Open the compass stored in `dir`, loading `config.toml` from there.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded or is invalid.
    pub fn open(dir: &Path) -> Result<Self> {
        let config = Config::load_from(&Config::path_in(dir))?;
        let store = JsonFileStore::new(dir.join(&config.store.file));
        Self::new(store, config)
    }
}

impl<S: StateStore> Compass<S> {
    /// # Errors
    ///
    /// Returns an error if the `[gate]` section does not describe a valid gate.
    pub fn new(store: S, config: Config) -> Result<Self> {
        let gate = config.lock_gate()?;
        Ok(Self {
            store,
            gate,
            config,
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn gate(&self) -> &LockGate {
        &self.gate
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current record, or defaults if none is usable yet.
    ///
    /// # Errors
    ///
    /// Propagates unexpected read failures.
    pub fn record(&self) -> Result<CompassRecord> {
        Ok(load_or_default(&self.store)?)
    }

    /// # Errors
    ///
    /// Propagates unexpected read failures.
    pub fn status(&self, now: DateTime<Utc>) -> Result<GateStatus> {
        Ok(self.gate.status(&self.record()?, now))
    }

    /// # Errors
    ///
    /// Propagates unexpected read failures.
    pub fn view(&self, now: DateTime<Utc>) -> Result<CompassView> {
        let record = self.record()?;
        Ok(CompassView::build(&record, now, &self.gate, &self.config))
    }

    /// Commit `proposed` for today's reference date and persist it.
    ///
    /// The new record is written with a single `store` call. If that write
    /// fails the commit is lost and the error is returned.
    ///
    /// # Errors
    ///
    /// [`crate::CommitError`] if the position or the gate refuses the commit,
    /// [`crate::StoreError`] if the record could not be written.
    pub fn commit(&self, proposed: i64, now: DateTime<Utc>) -> Result<CompassRecord> {
        let current = self.record()?;
        let next = match commit(&current, proposed, now, &self.gate) {
            Ok(next) => next,
            Err(err) => {
                tracing::warn!(proposed, error = %err, "commit rejected");
                return Err(err.into());
            }
        };

        if let Err(err) = self.store.store(&next) {
            tracing::error!(proposed, error = %err, "commit lost: state write failed");
            return Err(err.into());
        }

        tracing::info!(
            position = next.position.get(),
            date = %next.last_updated_date,
            ban_count = next.ban_count,
            mum_count = next.mum_count,
            "commit accepted"
        );
        Ok(next)
    }

    /// Return the monthly summary if one is due, recording that it was shown.
    ///
    /// A second call within the same reference month returns `None`.
    ///
    /// # Errors
    ///
    /// Propagates read failures and failures to persist the month token.
    pub fn take_monthly_summary(&self, now: DateTime<Utc>) -> Result<Option<MonthlySummary>> {
        let record = self.record()?;
        let today = self.gate.calendar_date(now);
        let Some(summary) = monthly_summary_due(&record, today) else {
            return Ok(None);
        };

        self.store.store(&mark_summarized(&record, &summary))?;
        tracing::info!(month = %summary.month, outcome = ?summary.outcome, "monthly summary surfaced");
        Ok(Some(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CommitError, CoreError, StoreError};
    use crate::record::Position;
    use crate::storage::MemoryStore;
    use chrono::{NaiveDate, TimeZone};
    use tempfile::TempDir;

    fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 6, 30, 0).unwrap()
    }

    fn memory_compass(record: Option<CompassRecord>) -> Compass<MemoryStore> {
        let store = record.map(MemoryStore::with_record).unwrap_or_default();
        Compass::new(store, Config::default()).unwrap()
    }

    #[test]
    fn commit_persists_whole_record() {
        let compass = memory_compass(None);

        let next = compass.commit(64, noon(2024, 3, 9)).unwrap();

        assert_eq!(compass.store().snapshot(), Some(next.clone()));
        assert_eq!(next.ban_count, 1);
        assert_eq!(compass.status(noon(2024, 3, 9)).unwrap(), GateStatus::Locked);
    }

    #[test]
    fn second_commit_same_day_fails_loudly() {
        let compass = memory_compass(None);
        compass.commit(20, noon(2024, 3, 9)).unwrap();

        let err = compass.commit(80, noon(2024, 3, 9)).unwrap_err();

        assert!(matches!(
            err,
            CoreError::Commit(CommitError::CommitWhileLocked { .. })
        ));
        let stored = compass.store().snapshot().unwrap();
        assert_eq!((stored.ban_count, stored.mum_count), (0, 1));
        assert_eq!(stored.position.get(), 20);
    }

    #[test]
    fn commit_after_clock_moves_back_is_rejected() {
        let compass = memory_compass(None);
        compass.commit(80, noon(2024, 3, 10)).unwrap();

        let err = compass.commit(80, noon(2024, 3, 9)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Commit(CommitError::DateRegressed { .. })
        ));
        assert_eq!(compass.status(noon(2024, 3, 9)).unwrap(), GateStatus::Locked);

        // Back on the 10th the day is still locked.
        assert!(compass.commit(80, noon(2024, 3, 10)).is_err());
        let stored = compass.store().snapshot().unwrap();
        assert_eq!(stored.ban_count, 1);
        assert_eq!(stored.last_updated_date, NaiveDate::from_ymd_opt(2024, 3, 10).unwrap());
    }

    #[test]
    fn failed_write_surfaces_and_keeps_previous_record() {
        let before = CompassRecord {
            position: Position::new(70).unwrap(),
            last_updated_date: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            ban_count: 2,
            mum_count: 1,
            ..Default::default()
        };
        let compass = memory_compass(Some(before.clone()));
        compass.store().set_fail_writes(true);

        let err = compass.commit(80, noon(2024, 3, 9)).unwrap_err();

        assert!(matches!(err, CoreError::Store(StoreError::WriteFailed { .. })));
        assert_eq!(compass.store().snapshot(), Some(before));
        assert_eq!(compass.status(noon(2024, 3, 9)).unwrap(), GateStatus::Open);
    }

    #[test]
    fn monthly_summary_taken_once() {
        let compass = memory_compass(Some(CompassRecord {
            ban_count: 1,
            mum_count: 4,
            last_summarized_month: Some("2024-02".into()),
            ..Default::default()
        }));

        let first = compass.take_monthly_summary(noon(2024, 3, 1)).unwrap();
        let second = compass.take_monthly_summary(noon(2024, 3, 20)).unwrap();

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(
            compass.store().snapshot().unwrap().last_summarized_month.as_deref(),
            Some("2024-03")
        );
    }

    #[test]
    fn month_token_never_rewinds() {
        let compass = memory_compass(None);
        assert!(compass.take_monthly_summary(noon(2024, 4, 2)).unwrap().is_some());

        assert!(compass.take_monthly_summary(noon(2024, 3, 28)).unwrap().is_none());
        assert_eq!(
            compass.store().snapshot().unwrap().last_summarized_month.as_deref(),
            Some("2024-04")
        );
        assert!(compass.take_monthly_summary(noon(2024, 4, 3)).unwrap().is_none());
    }

    #[test]
    fn view_reflects_just_committed_value() {
        let compass = memory_compass(None);
        compass.commit(0, noon(2024, 3, 9)).unwrap();

        let view = compass.view(noon(2024, 3, 9)).unwrap();

        assert_eq!(view.needle_angle, -90.0);
        assert_eq!(view.candidate_position.get(), 0);
        assert_eq!(view.gate, GateStatus::Locked);
    }

    #[test]
    fn open_uses_files_in_directory() {
        let temp_dir = TempDir::new().unwrap();
        let compass = Compass::open(temp_dir.path()).unwrap();

        compass.commit(99, noon(2024, 3, 9)).unwrap();

        let reopened = Compass::open(temp_dir.path()).unwrap();
        assert_eq!(reopened.record().unwrap().position.get(), 99);
        assert!(temp_dir.path().join("config.toml").exists());
        assert!(temp_dir.path().join("compass_state.json").exists());
    }

    #[test]
    fn open_honors_configured_gate() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.set("gate.utc_offset_minutes", "0").unwrap();
        config.set("gate.cutoff", "12:00").unwrap();
        config.save_to(&Config::path_in(temp_dir.path())).unwrap();

        let compass = Compass::open(temp_dir.path()).unwrap();

        let morning = Utc.with_ymd_and_hms(2024, 3, 9, 11, 59, 0).unwrap();
        assert_eq!(compass.status(morning).unwrap(), GateStatus::NotYet);
        assert!(compass.commit(40, morning).is_err());
    }
}
