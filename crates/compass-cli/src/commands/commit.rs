use chrono::{DateTime, Utc};

use super::open_compass;

pub fn run(now: DateTime<Utc>, position: i64) -> Result<(), Box<dyn std::error::Error>> {
    let compass = open_compass()?;
    let record = compass.commit(position, now)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
