//! Dashboard state and key handling.
//!
//! The App owns what the dashboard shows: the settings pane, the input
//! modals and the frozen snapshot. Every key that changes a timer is turned
//! into a [`ProgressEngine`] command. It does not render; that is `views`.

use chrono::{DateTime, TimeZone};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use hourglass_core::input::{parse_countdown, parse_deadline, COUNTDOWN_DIGITS, DEADLINE_DIGITS};
use hourglass_core::{ProgressEngine, ProgressSnapshot, StateStore, TimerKind};
use tracing::debug;

use super::KEY_TARGET;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneView {
    Menu,
    Controls,
    ConfigPath,
    Countdown,
    Deadline,
    CountdownInput,
    DeadlineInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Resume,
    ManageCountdown,
    ManageDeadline,
    Controls,
    ConfigPath,
    SetDuration,
    StartPause,
    Rewind,
    ClearTimer,
    SetDeadline,
    Back,
}

impl MenuItem {
    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Resume => "Resume",
            MenuItem::ManageCountdown => "Set/Manage Countdown Timer",
            MenuItem::ManageDeadline => "Set/Manage Deadline Timer",
            MenuItem::Controls => "Controls",
            MenuItem::ConfigPath => "Config path info",
            MenuItem::SetDuration => "Set duration (HH:MM:SS)",
            MenuItem::StartPause => "Start/Pause",
            MenuItem::Rewind => "Reset to original duration",
            MenuItem::ClearTimer => "Clear timer",
            MenuItem::SetDeadline => "Set deadline (YYYY-MM-DD HH:MM)",
            MenuItem::Back => "Back",
        }
    }
}

impl PaneView {
    pub fn items(self) -> &'static [MenuItem] {
        match self {
            PaneView::Menu => &[
                MenuItem::Resume,
                MenuItem::ManageCountdown,
                MenuItem::ManageDeadline,
                MenuItem::Controls,
                MenuItem::ConfigPath,
            ],
            PaneView::Countdown => &[
                MenuItem::SetDuration,
                MenuItem::StartPause,
                MenuItem::Rewind,
                MenuItem::ClearTimer,
                MenuItem::Back,
            ],
            PaneView::Deadline => &[MenuItem::SetDeadline, MenuItem::ClearTimer, MenuItem::Back],
            PaneView::Controls | PaneView::ConfigPath => &[MenuItem::Back],
            PaneView::CountdownInput | PaneView::DeadlineInput => &[],
        }
    }

    pub fn is_input(self) -> bool {
        matches!(self, PaneView::CountdownInput | PaneView::DeadlineInput)
    }

    fn max_digits(self) -> usize {
        match self {
            PaneView::DeadlineInput => DEADLINE_DIGITS,
            _ => COUNTDOWN_DIGITS,
        }
    }
}

/// Settings pane, open over the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pane {
    pub view: PaneView,
    pub index: usize,
    pub error: Option<String>,
    /// Digits typed into an input modal.
    pub input: String,
    pub input_error: Option<String>,
    /// View an input modal returns to.
    input_prev: PaneView,
}

impl Pane {
    pub fn for_view(view: PaneView) -> Self {
        Self {
            view,
            index: 0,
            error: None,
            input: String::new(),
            input_error: None,
            input_prev: PaneView::Menu,
        }
    }

    fn show(&mut self, view: PaneView) {
        self.view = view;
        self.index = 0;
        self.error = None;
    }

    fn open_input(&mut self, view: PaneView) {
        self.input_prev = self.view;
        self.view = view;
        self.input.clear();
        self.input_error = None;
    }

    fn close_input(&mut self) {
        self.view = self.input_prev;
        self.input.clear();
        self.input_error = None;
    }
}

#[derive(Debug)]
pub struct App {
    pane: Option<Pane>,
    live: Option<ProgressSnapshot>,
    /// Values shown while the display is frozen with space.
    frozen: Option<ProgressSnapshot>,
    refreeze: bool,
    flash_on: bool,
    should_quit: bool,
    keydebug: bool,
    last_key: Option<String>,
    config_path: String,
}

impl App {
    pub fn new(config_path: String, keydebug: bool) -> Self {
        Self {
            pane: None,
            live: None,
            frozen: None,
            refreeze: false,
            flash_on: false,
            should_quit: false,
            keydebug,
            last_key: None,
            config_path,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn pane(&self) -> Option<&Pane> {
        self.pane.as_ref()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.is_some()
    }

    pub fn flash_on(&self) -> bool {
        self.flash_on
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn config_path(&self) -> &str {
        &self.config_path
    }

    /// Last key as seen by the terminal, when key debugging is on.
    pub fn last_key(&self) -> Option<&str> {
        self.last_key.as_deref()
    }

    /// Snapshot to draw. While frozen, the countdown keeps running since it
    /// has its own start/pause control.
    pub fn displayed(&self) -> Option<ProgressSnapshot> {
        match (&self.frozen, &self.live) {
            (Some(frozen), Some(live)) => {
                let mut shown = frozen.clone();
                shown.countdown = live.countdown.clone();
                Some(shown)
            }
            (Some(frozen), None) => Some(frozen.clone()),
            (None, live) => live.clone(),
        }
    }

    // ── Updates ──────────────────────────────────────────────────────

    pub fn update(&mut self, live: ProgressSnapshot) {
        if self.refreeze {
            self.frozen = Some(live.clone());
            self.refreeze = false;
        }
        self.live = Some(live);
    }

    pub fn toggle_flash(&mut self) {
        self.flash_on = !self.flash_on;
    }

    /// Handle a key press. Timer changes go straight to `engine`.
    pub fn handle_key<S: StateStore, Tz: TimeZone>(
        &mut self,
        key: KeyEvent,
        engine: &mut ProgressEngine<S>,
        now: &DateTime<Tz>,
    ) {
        if self.keydebug {
            let seen = format!("code={:?} modifiers={:?}", key.code, key.modifiers);
            debug!(target: KEY_TARGET, code = ?key.code, modifiers = ?key.modifiers, kind = ?key.kind, "key");
            self.last_key = Some(seen);
        }

        let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
        if ctrl_c || matches!(key.code, KeyCode::Char('q' | 'Q')) {
            self.should_quit = true;
            return;
        }

        let Some(mut pane) = self.pane.take() else {
            self.handle_dashboard_key(key);
            return;
        };
        let keep_open = if pane.view.is_input() {
            self.handle_input_key(&mut pane, key, engine, now)
        } else {
            self.handle_menu_key(&mut pane, key, engine, now)
        };
        if keep_open {
            self.pane = Some(pane);
        }
    }

    fn handle_dashboard_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char(' ') => {
                self.frozen = match self.frozen {
                    Some(_) => None,
                    None => self.live.clone(),
                };
            }
            KeyCode::Char('h' | 'H') => self.pane = Some(Pane::for_view(PaneView::Menu)),
            _ => {}
        }
    }

    /// Returns whether the pane stays open.
    fn handle_menu_key<S: StateStore, Tz: TimeZone>(
        &mut self,
        pane: &mut Pane,
        key: KeyEvent,
        engine: &mut ProgressEngine<S>,
        now: &DateTime<Tz>,
    ) -> bool {
        let items = pane.view.items();
        match key.code {
            KeyCode::Char('h' | 'H') | KeyCode::Esc => return false,
            KeyCode::Up => pane.index = (pane.index + items.len() - 1) % items.len(),
            KeyCode::Down => pane.index = (pane.index + 1) % items.len(),
            KeyCode::Enter => {
                let Some(&item) = items.get(pane.index) else {
                    return true;
                };
                pane.error = None;
                return self.select(pane, item, engine, now);
            }
            _ => {}
        }
        true
    }

    fn select<S: StateStore, Tz: TimeZone>(
        &mut self,
        pane: &mut Pane,
        item: MenuItem,
        engine: &mut ProgressEngine<S>,
        now: &DateTime<Tz>,
    ) -> bool {
        let result = match item {
            MenuItem::Resume => return false,
            MenuItem::ManageCountdown => {
                pane.show(PaneView::Countdown);
                Ok(())
            }
            MenuItem::ManageDeadline => {
                pane.show(PaneView::Deadline);
                Ok(())
            }
            MenuItem::Controls => {
                pane.show(PaneView::Controls);
                Ok(())
            }
            MenuItem::ConfigPath => {
                pane.show(PaneView::ConfigPath);
                Ok(())
            }
            MenuItem::Back => {
                pane.show(PaneView::Menu);
                Ok(())
            }
            MenuItem::SetDuration => {
                pane.open_input(PaneView::CountdownInput);
                Ok(())
            }
            MenuItem::SetDeadline => {
                pane.open_input(PaneView::DeadlineInput);
                Ok(())
            }
            MenuItem::StartPause => engine.toggle(TimerKind::Countdown, now).map(drop),
            MenuItem::Rewind => engine.rewind(TimerKind::Countdown, now).map(drop),
            MenuItem::ClearTimer => {
                let kind = match pane.view {
                    PaneView::Deadline => TimerKind::Deadline,
                    _ => TimerKind::Countdown,
                };
                engine.reset(kind, now);
                if kind == TimerKind::Deadline {
                    self.refresh_frozen();
                }
                Ok(())
            }
        };
        if let Err(e) = result {
            pane.error = Some(e.to_string());
        }
        true
    }

    /// Returns whether the pane stays open.
    fn handle_input_key<S: StateStore, Tz: TimeZone>(
        &mut self,
        pane: &mut Pane,
        key: KeyEvent,
        engine: &mut ProgressEngine<S>,
        now: &DateTime<Tz>,
    ) -> bool {
        match key.code {
            KeyCode::Char(ch) if ch.is_ascii_digit() => {
                if pane.input.len() < pane.view.max_digits() {
                    pane.input.push(ch);
                }
            }
            KeyCode::Backspace | KeyCode::Delete => {
                pane.input.pop();
            }
            KeyCode::Esc => pane.close_input(),
            KeyCode::Enter => return self.submit_input(pane, engine, now),
            _ => {}
        }
        true
    }

    fn submit_input<S: StateStore, Tz: TimeZone>(
        &mut self,
        pane: &mut Pane,
        engine: &mut ProgressEngine<S>,
        now: &DateTime<Tz>,
    ) -> bool {
        if pane.view == PaneView::CountdownInput {
            let secs = match parse_countdown(&pane.input) {
                Ok(secs) => secs,
                Err(e) => {
                    pane.input_error = Some(e.to_string());
                    return true;
                }
            };
            engine.configure_countdown(secs, now);
            if let Err(e) = engine.start(TimerKind::Countdown, now) {
                pane.error = Some(e.to_string());
                pane.close_input();
                return true;
            }
            return false;
        }

        let target = match parse_deadline(&pane.input, &now.timezone()) {
            Ok(target) => target,
            Err(e) => {
                pane.input_error = Some(e.to_string());
                return true;
            }
        };
        engine.configure_deadline(&target, now);
        if let Err(e) = engine.start(TimerKind::Deadline, now) {
            pane.error = Some(e.to_string());
        }
        self.refresh_frozen();
        pane.close_input();
        pane.index = 0;
        true
    }

    fn refresh_frozen(&mut self) {
        if self.frozen.is_some() {
            self.refreeze = true;
        }
    }
}
