//! One-shot snapshot for scripts and status bars.

use chrono::Local;

use crate::commands::open_engine;
use crate::report;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;
    let now = Local::now();
    let snapshot = engine.snapshot(&now)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        for line in report::lines(&snapshot) {
            println!("{line}");
        }
    }

    engine.checkpoint(&now);
    Ok(())
}
