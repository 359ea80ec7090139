use chrono::{DateTime, Utc};
use serde::Serialize;

use compass_core::GateStatus;

use super::open_compass;

#[derive(Serialize)]
struct StatusReport {
    status: GateStatus,
    can_commit: bool,
    adjustable: bool,
    date: chrono::NaiveDate,
    reference_time: String,
    cutoff: String,
    candidate_position: u8,
}

pub fn run(now: DateTime<Utc>) -> Result<(), Box<dyn std::error::Error>> {
    let compass = open_compass()?;
    let record = compass.record()?;
    let gate = compass.gate();
    let status = gate.status(&record, now);

    let report = StatusReport {
        status,
        can_commit: status.can_commit(),
        adjustable: status.is_adjustable(),
        date: gate.calendar_date(now),
        reference_time: gate.reference_time(now).format("%H:%M:%S %:z").to_string(),
        cutoff: gate.cutoff().format("%H:%M").to_string(),
        candidate_position: gate.candidate_position(&record, now).get(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
