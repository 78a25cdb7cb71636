//! Hourglass - terminal dashboard for day, year, life and timer progress.
//!
//! Without a subcommand the full-screen dashboard starts; `--headless`
//! prints a single snapshot instead.

use std::fs;
use std::path::Path;

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

mod commands;
mod headless;
mod report;
mod tui;

#[derive(Parser)]
#[command(
    name = "hourglass",
    version,
    about = "Full-screen terminal day/year/life dashboard",
    after_help = "Controls (interactive): q quit, space freeze/unfreeze, h help/settings."
)]
struct Cli {
    /// Print a numbers-only snapshot and exit
    #[arg(long)]
    headless: bool,
    /// With --headless, print the snapshot as JSON
    #[arg(long, requires = "headless")]
    json: bool,
    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Set the date of birth used by Life mode
    Dob {
        /// Date of birth (YYYY-MM-DD)
        date: String,
    },
    /// Countdown and deadline control
    Timer {
        #[command(subcommand)]
        action: commands::timer::TimerAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn setup_logging(verbose: bool, log_file: Option<&Path>) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let mut filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .with_env_var("HOURGLASS_LOG")
        .from_env_lossy();
    if tui::keydebug_enabled() {
        if let Ok(directive) = format!("{}=debug", tui::KEY_TARGET).parse() {
            filter = filter.add_directive(directive);
        }
    }

    // The dashboard owns the terminal, so its logs go to a file next to the config.
    if let Some(path) = log_file {
        let file = path
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| fs::File::create(path));
        if let Ok(file) = file {
            tracing_subscriber::fmt()
                .with_writer(file)
                .with_ansi(false)
                .with_env_filter(filter)
                .init();
            return;
        }
        eprintln!("warning: cannot open log file {}, logging disabled", path.display());
        return;
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let dashboard = cli.command.is_none() && !cli.headless;
    let log_file = if dashboard {
        hourglass_core::storage::config_path()
            .ok()
            .and_then(|path| path.parent().map(|dir| dir.join("hourglass.log")))
    } else {
        None
    };
    setup_logging(cli.verbose, log_file.as_deref());
    info!(version = env!("CARGO_PKG_VERSION"), "hourglass starting");

    let result = match cli.command {
        Some(Commands::Dob { date }) => commands::dob::run(&date),
        Some(Commands::Timer { action }) => commands::timer::run(action),
        Some(Commands::Config { action }) => commands::config::run(action),
        None if cli.headless => headless::run(cli.json),
        None => tui::run(),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
