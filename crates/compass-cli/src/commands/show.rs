use chrono::{DateTime, Utc};
use serde::Serialize;

use compass_core::render::postcard_text;
use compass_core::{CompassView, GateStatus, MonthlySummary};

use super::open_compass;

#[derive(Serialize)]
struct ShowReport {
    view: CompassView,
    monthly_summary: Option<MonthlySummary>,
}

pub fn run(now: DateTime<Utc>, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let compass = open_compass()?;
    let monthly_summary = compass.take_monthly_summary(now)?;
    let view = compass.view(now)?;

    if json {
        let report = ShowReport {
            view,
            monthly_summary,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if let Some(summary) = &monthly_summary {
        println!("New month ({}): {}", summary.month, summary.headline(&view.poles));
        println!();
    }
    println!("{}", postcard_text(&view));
    println!();
    match view.last_updated {
        Some(date) => println!("Last adjusted: {date}"),
        None => println!("Last adjusted: never"),
    }
    match view.gate {
        GateStatus::Locked => {
            println!("Compass is locked for today. You can adjust again tomorrow.")
        }
        GateStatus::NotYet => println!(
            "Not yet: today's position opens at {} reference time (candidate {}).",
            compass.gate().cutoff().format("%H:%M"),
            view.candidate_position
        ),
        GateStatus::Open => println!(
            "Open: commit today's position with `compass commit <0-100>` (candidate {}).",
            view.candidate_position
        ),
    }
    Ok(())
}
