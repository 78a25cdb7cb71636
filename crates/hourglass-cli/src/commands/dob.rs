use chrono::Local;
use hourglass_core::input::parse_date;

use super::{ensure_saved, open_engine};

pub fn run(date: &str) -> Result<(), Box<dyn std::error::Error>> {
    let dob = parse_date(date)?;
    let mut engine = open_engine()?;
    let event = engine.set_birth_date(dob, &Local::now())?;
    ensure_saved(&engine)?;
    println!("{}", serde_json::to_string_pretty(&event)?);
    Ok(())
}
