//! Full-screen dashboard.
//!
//! Shows DAY, YEAR and LIFE columns side by side, plus a column for each
//! configured timer:
//! - `space` freezes the displayed values
//! - `h` opens the settings pane (timers, controls, config path)
//! - `q` quits
//!
//! Sand falls into every column while the display is live.

mod app;
mod runner;
mod sand;
mod views;

pub use app::App;
pub use runner::Runner;

use std::io::{self, BufRead, Stdout, Write};

use chrono::Local;
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use hourglass_core::input::parse_date;
use hourglass_core::{JsonFileStore, ProgressEngine, StateStore};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

/// Tracing target of key events, enabled with `HOURGLASS_KEYDEBUG=1`.
pub const KEY_TARGET: &str = "hourglass::keys";

/// Terminal type alias
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

pub fn keydebug_enabled() -> bool {
    std::env::var("HOURGLASS_KEYDEBUG").is_ok_and(|v| v == "1")
}

/// Initialize the terminal for TUI mode
pub fn init() -> io::Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, crossterm::cursor::Hide)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

/// Restore the terminal to normal mode
pub fn restore() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen, crossterm::cursor::Show)?;
    Ok(())
}

/// Run the dashboard against the default config file until the user quits.
pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let store = JsonFileStore::open_default()?;
    let config_path = store.path().display().to_string();
    let mut engine = ProgressEngine::open(store, &Local::now());

    if engine.dob().is_none() {
        let stdin = io::stdin();
        prompt_birth_date(&mut engine, &mut stdin.lock(), &mut io::stdout())?;
    }

    let terminal = init()?;

    // Restore the terminal even on early return/error
    struct TerminalGuard;
    impl Drop for TerminalGuard {
        fn drop(&mut self) {
            let _ = restore();
        }
    }
    let _guard = TerminalGuard;

    let app = App::new(config_path, keydebug_enabled());
    let mut runner = Runner::new(terminal, app, engine);
    runner.run()?;
    info!("dashboard closed");
    Ok(())
}

/// Ask for a date of birth until a valid one is entered. End of input leaves
/// Life mode unconfigured.
pub fn prompt_birth_date<S: StateStore>(
    engine: &mut ProgressEngine<S>,
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<()> {
    loop {
        write!(output, "Enter date of birth (YYYY-MM-DD): ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            return Ok(());
        }
        let result = parse_date(line.trim())
            .map_err(hourglass_core::CoreError::from)
            .and_then(|dob| engine.set_birth_date(dob, &Local::now()));
        match result {
            Ok(_) => return Ok(()),
            Err(e) => writeln!(output, "{e}. Try again.")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hourglass_core::MemoryStore;

    #[test]
    fn prompt_retries_until_valid() {
        let mut engine = ProgressEngine::open(MemoryStore::new(), &Local::now());
        let mut input = io::Cursor::new("tomorrow\n1990-05-20\n");
        let mut output = Vec::new();
        prompt_birth_date(&mut engine, &mut input, &mut output).unwrap();

        assert_eq!(engine.dob(), chrono::NaiveDate::from_ymd_opt(1990, 5, 20));
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("not a valid date"));
        assert_eq!(shown.matches("Enter date of birth").count(), 2);
    }

    #[test]
    fn prompt_gives_up_at_end_of_input() {
        let mut engine = ProgressEngine::open(MemoryStore::new(), &Local::now());
        let mut input = io::Cursor::new("");
        prompt_birth_date(&mut engine, &mut input, &mut Vec::new()).unwrap();
        assert!(engine.dob().is_none());
    }
}
