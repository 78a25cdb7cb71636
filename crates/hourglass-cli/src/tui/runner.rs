//! Runner - main loop that owns the terminal and the engine
//!
//! Each frame the runner:
//! - Takes a snapshot at the current wall-clock instant
//! - Draws it, advancing the falling sand by the time since the last frame
//! - Waits up to one frame for a key and hands it to the App
//! - Checkpoints the engine every `checkpoint_secs`

use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{self, Event, KeyEventKind};
use hourglass_core::{ProgressEngine, StateStore};
use tracing::{debug, warn};

use super::app::App;
use super::sand::Sand;
use super::views;
use super::Tui;

/// Border flash period of finished timers.
const FLASH_INTERVAL: Duration = Duration::from_millis(500);

pub struct Runner<S> {
    terminal: Tui,
    app: App,
    engine: ProgressEngine<S>,
    frame: Duration,
    checkpoint_every: Duration,
    last_checkpoint: Instant,
    last_flash: Instant,
    last_frame: Instant,
    sand: Sand,
    /// Last snapshot error, shown on the bottom line.
    snapshot_error: Option<String>,
}

impl<S: StateStore> Runner<S> {
    pub fn new(terminal: Tui, app: App, engine: ProgressEngine<S>) -> Self {
        let settings = engine.settings();
        let frame = Duration::from_secs(1) / settings.frame_rate.max(1);
        let checkpoint_every = Duration::from_secs(settings.checkpoint_secs.max(1));
        Self {
            terminal,
            app,
            engine,
            frame,
            checkpoint_every,
            last_checkpoint: Instant::now(),
            last_flash: Instant::now(),
            last_frame: Instant::now(),
            sand: Sand::new(),
            snapshot_error: None,
        }
    }

    /// Run the main loop until the user quits, then save once more.
    pub fn run(&mut self) -> std::io::Result<()> {
        let result = self.event_loop();
        self.engine.checkpoint(&Local::now());
        result
    }

    fn event_loop(&mut self) -> std::io::Result<()> {
        loop {
            self.refresh();
            self.draw()?;

            if event::poll(self.frame)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.app.handle_key(key, &mut self.engine, &Local::now());
                    }
                }
            }

            if self.app.should_quit() {
                return Ok(());
            }

            if self.last_checkpoint.elapsed() >= self.checkpoint_every {
                if self.engine.checkpoint(&Local::now()) {
                    debug!("checkpoint saved");
                }
                self.last_checkpoint = Instant::now();
            }
        }
    }

    fn refresh(&mut self) {
        if self.last_flash.elapsed() >= FLASH_INTERVAL {
            self.app.toggle_flash();
            self.last_flash = Instant::now();
        }

        match self.engine.snapshot(&Local::now()) {
            Ok(snapshot) => {
                self.app.update(snapshot);
                self.snapshot_error = None;
            }
            Err(e) => {
                // Keep drawing the last good snapshot.
                if self.snapshot_error.is_none() {
                    warn!(error = %e, "snapshot failed");
                }
                self.snapshot_error = Some(e.to_string());
            }
        }
    }

    fn draw(&mut self) -> std::io::Result<()> {
        let Some(snapshot) = self.app.displayed() else {
            return Ok(());
        };
        let status = self
            .snapshot_error
            .as_deref()
            .or_else(|| self.engine.storage_error())
            .map(|e| format!("error: {e}"));
        // A stalled frame drops at most one grain per column.
        let dt = self.last_frame.elapsed().as_secs_f64().min(1.0);
        self.last_frame = Instant::now();

        let app = &self.app;
        let sand = &mut self.sand;
        self.terminal
            .draw(|frame| views::render(app, &snapshot, status.as_deref(), sand, dt, frame))?;
        Ok(())
    }
}
