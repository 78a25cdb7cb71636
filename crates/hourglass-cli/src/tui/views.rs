//! Dashboard rendering.

use hourglass_core::calendar::format_hms;
use hourglass_core::input::{countdown_mask, deadline_mask};
use hourglass_core::{ProgressSnapshot, TimerConfig, TimerKind};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::border;
use ratatui::text::Line;
use ratatui::widgets::{Block, Clear, Paragraph, Widget};
use ratatui::Frame;

use super::app::{App, Pane, PaneView};
use super::sand::Sand;
use crate::report::{self, Row};

const MIN_INNER_WIDTH: u16 = 10;
const MAX_INNER_WIDTH: u16 = 25;
const COLUMN_GAP: u16 = 4;
const HEADER_LINES: u16 = 1;
const LABEL_LINES: u16 = 3;
const MIN_COLUMN_HEIGHT: u16 = 8;
const BOTTOM_PADDING: u16 = 1;

/// Main render function. `status` is shown on the bottom line; `dt` is the
/// time since the previous frame, in seconds, for the falling sand.
pub fn render(
    app: &App,
    snapshot: &ProgressSnapshot,
    status: Option<&str>,
    sand: &mut Sand,
    dt: f64,
    frame: &mut Frame,
) {
    let area = frame.area();
    let rows = report::rows(snapshot);

    let mut header = report::header(snapshot);
    if app.is_frozen() {
        header.push_str("  [frozen]");
    }

    let min_rows = HEADER_LINES + LABEL_LINES + MIN_COLUMN_HEIGHT + BOTTOM_PADDING;
    match layout_columns(area.width, rows.len()) {
        Some(columns) if area.height >= min_rows => {
            frame.render_widget(Paragraph::new(header), Rect { height: HEADER_LINES, ..area });
            // Sand stands still while the display is frozen.
            let dt = (!app.is_frozen()).then_some(dt);
            render_columns(app, &rows, &columns, area, sand, dt, frame);
        }
        _ => {
            sand.reset();
            render_numbers_only(header, &rows, area, frame);
        }
    }

    if let Some(status) = status {
        let bottom = Rect {
            y: area.bottom().saturating_sub(1),
            height: 1,
            ..area
        };
        frame.render_widget(Paragraph::new(status).style(Style::default().fg(Color::Red)), bottom);
    }

    if let Some(pane) = app.pane() {
        if pane.view.is_input() {
            render_input_modal(app, pane, area, frame);
        } else {
            render_box(pane_lines(pane, snapshot, app.config_path()), None, area, frame);
        }
    }
}

/// Positions `(x, width)` of `count` bordered columns, or `None` when the
/// terminal is too narrow for all of them.
pub fn layout_columns(total_width: u16, count: usize) -> Option<Vec<(u16, u16)>> {
    let count_u16 = u16::try_from(count).ok().filter(|c| *c > 0)?;
    let gaps = COLUMN_GAP * (count_u16 - 1);
    let available = total_width.checked_sub(gaps)?.checked_sub(2 * count_u16)?;
    let mut extra = available.checked_sub(MIN_INNER_WIDTH * count_u16)?;

    // Hand out extra width one cell at a time until every column is full.
    let mut inner = vec![MIN_INNER_WIDTH; count];
    while extra > 0 && inner.iter().any(|w| *w < MAX_INNER_WIDTH) {
        for width in inner.iter_mut() {
            if extra > 0 && *width < MAX_INNER_WIDTH {
                *width += 1;
                extra -= 1;
            }
        }
    }

    let mut x = 0;
    let positions = inner
        .into_iter()
        .map(|w| {
            let column = (x, w + 2);
            x += w + 2 + COLUMN_GAP;
            column
        })
        .collect();
    Some(positions)
}

fn render_columns(
    app: &App,
    rows: &[Row],
    columns: &[(u16, u16)],
    area: Rect,
    sand: &mut Sand,
    dt: Option<f64>,
    frame: &mut Frame,
) {
    let top = area.y + HEADER_LINES + LABEL_LINES;
    let height = area.height - HEADER_LINES - LABEL_LINES - BOTTOM_PADDING;

    for (row, &(x, width)) in rows.iter().zip(columns) {
        let x = area.x + x;
        let label = Paragraph::new(vec![
            Line::from(row.label).style(Style::default().add_modifier(Modifier::BOLD)),
            Line::from(format!("done: {}", row.percent())),
            Line::from(format!("remaining: {}", row.remaining)),
        ])
        .centered();
        frame.render_widget(label, Rect::new(x, area.y + HEADER_LINES, width, LABEL_LINES));

        let flash = row.done && app.flash_on();
        let block = if flash {
            Block::bordered()
                .border_set(border::Set {
                    top_left: "*",
                    top_right: "*",
                    bottom_left: "*",
                    bottom_right: "*",
                    vertical_left: "!",
                    vertical_right: "!",
                    horizontal_top: "=",
                    horizontal_bottom: "=",
                })
                .border_style(Style::default().fg(Color::Yellow))
        } else {
            Block::bordered().border_set(border::Set {
                top_left: "+",
                top_right: "+",
                bottom_left: "+",
                bottom_right: "+",
                vertical_left: "|",
                vertical_right: "|",
                horizontal_top: "-",
                horizontal_bottom: "-",
            })
        };
        let column = Rect::new(x, top, width, height);
        let inner = block.inner(column);
        frame.render_widget(block, column);
        frame.render_widget(
            Fill {
                fraction: row.fraction,
                flash,
            },
            inner,
        );

        if let Some(dt) = dt {
            let surface = inner.height - fill_rows(inner.height, row.fraction);
            sand.update(row.label, dt, inner.width, surface);
        }
        if let Some(column) = sand.column(row.label) {
            frame.render_widget(column, inner);
        }
    }

    let labels: Vec<&str> = rows.iter().map(|row| row.label).collect();
    sand.retain(&labels);
}

fn render_numbers_only(header: String, rows: &[Row], area: Rect, frame: &mut Frame) {
    let mut lines = vec![Line::from(header)];
    lines.extend(rows.iter().map(|row| {
        let mut line = row.line();
        if row.done {
            line.push_str(" (DONE)");
        }
        Line::from(line)
    }));
    frame.render_widget(Paragraph::new(lines), area);
}

/// Body text above the menu items of the settings pane.
pub fn pane_lines(pane: &Pane, snapshot: &ProgressSnapshot, config_path: &str) -> Vec<String> {
    let mut lines: Vec<String> = match pane.view {
        PaneView::Controls => [
            "Controls:",
            "q: quit",
            "space: freeze/unfreeze day/year/life/deadline",
            "h: open/close help/settings",
            "Arrow keys + Enter: select menu items",
            "Countdown has its own start/pause control.",
            "Life mode clamps Feb 29 to Feb 28 in non-leap years.",
        ]
        .into_iter()
        .map(String::from)
        .collect(),
        PaneView::ConfigPath => vec![format!("Config: {config_path}")],
        PaneView::Countdown => match snapshot.timer(TimerKind::Countdown) {
            Some(timer) => {
                let duration = match timer.config {
                    TimerConfig::Countdown { duration_secs } => i64::try_from(duration_secs).unwrap_or(i64::MAX),
                    TimerConfig::Deadline { .. } => 0,
                };
                let remaining = if timer.done {
                    "DONE".to_string()
                } else {
                    format_hms(timer.remaining_secs())
                };
                vec![
                    "Countdown Timer".to_string(),
                    "Configured: yes".to_string(),
                    format!("Duration: {}", format_hms(duration)),
                    format!("Remaining: {remaining}"),
                    format!("Status: {}", timer.status),
                ]
            }
            None => vec!["Countdown Timer".to_string(), "Configured: no".to_string()],
        },
        PaneView::Deadline => match snapshot.timer(TimerKind::Deadline) {
            Some(timer) => {
                let mut lines = vec!["Deadline Timer".to_string(), "Configured: yes".to_string()];
                if let TimerConfig::Deadline { target, set_at } = timer.config {
                    let tz = snapshot.at.timezone();
                    lines.push(format!("Target: {}", target.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S")));
                    lines.push(format!("Set at: {}", set_at.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S")));
                }
                let remaining = report::rows(snapshot)
                    .into_iter()
                    .find(|row| row.label == TimerKind::Deadline.label())
                    .map_or_else(|| "DONE".to_string(), |row| row.remaining);
                lines.push(format!("Remaining: {remaining}"));
                lines
            }
            None => vec!["Deadline Timer".to_string(), "Configured: no".to_string()],
        },
        PaneView::Menu | PaneView::CountdownInput | PaneView::DeadlineInput => vec![
            "Help / Settings".to_string(),
            "Use arrow keys to select and Enter to activate.".to_string(),
        ],
    };

    lines.push(String::new());
    for (idx, item) in pane.view.items().iter().enumerate() {
        let prefix = if idx == pane.index { ">" } else { " " };
        lines.push(format!("{prefix} {}", item.label()));
    }
    if let Some(error) = &pane.error {
        lines.push(String::new());
        lines.push(format!("Error: {error}"));
    }
    lines
}

fn render_input_modal(app: &App, pane: &Pane, area: Rect, frame: &mut Frame) {
    let (title, formatted) = match pane.view {
        PaneView::DeadlineInput => ("ENTER DEADLINE (YYYY-MM-DD HH:MM)", deadline_mask(&pane.input)),
        _ => ("ENTER DURATION (HH:MM:SS)", countdown_mask(&pane.input)),
    };
    let caret = if app.flash_on() { ">" } else { " " };
    let mut lines = vec![
        title.to_string(),
        String::new(),
        format!("{caret} {formatted}"),
        String::new(),
        "Digits only. Backspace delete. Enter confirm. Esc cancel.".to_string(),
    ];
    if let Some(error) = &pane.input_error {
        lines.push(String::new());
        lines.push(format!("Error: {error}"));
    }
    if let Some(key) = app.last_key() {
        lines.push(String::new());
        lines.push(format!("Key: {key}"));
    }
    render_box(lines, Some(2), area, frame);
}

/// Bordered box sized to its text, centered in `area`.
fn render_box(lines: Vec<String>, centered_line: Option<usize>, area: Rect, frame: &mut Frame) {
    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let width = u16::try_from(longest + 4).unwrap_or(u16::MAX).min(area.width.saturating_sub(2));
    let height = u16::try_from(lines.len() + 2).unwrap_or(u16::MAX).min(area.height);
    let popup = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    );

    let text: Vec<Line> = lines
        .into_iter()
        .enumerate()
        .map(|(idx, line)| {
            let line = Line::from(format!(" {line}"));
            if Some(idx) == centered_line {
                line.centered()
            } else {
                line
            }
        })
        .collect();

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(text).block(Block::bordered()), popup);
}

/// Column fill rising from the bottom: `.` at the surface, then `+`, then `#`.
/// Falling sand is drawn over it.
struct Fill {
    fraction: f64,
    flash: bool,
}

/// Filled rows of a column `height` rows tall.
fn fill_rows(height: u16, fraction: f64) -> u16 {
    ((f64::from(height) * fraction.clamp(0.0, 1.0)) as u16).min(height)
}

impl Widget for Fill {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = fill_rows(area.height, self.fraction);
        for i in 0..rows {
            let y = area.bottom() - 1 - i;
            let from_surface = rows - i;
            let ch = if self.flash {
                '*'
            } else if from_surface <= 2 {
                '.'
            } else if from_surface <= 5 {
                '+'
            } else {
                '#'
            };
            for x in area.left()..area.right() {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_char(ch);
                }
            }
        }
    }
}
