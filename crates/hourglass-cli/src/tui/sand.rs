//! Falling sand drawn over each column's fill.
//!
//! A grain drops from the top of a column once per second, drifts sideways
//! as it falls and leaves a short-lived sparkle where it lands on the fill.
//! Positions are relative to the column's inner area.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;

/// Rows per second.
const FALL_SPEED: f64 = 6.0;
/// Seconds between two grains in one column.
const SPAWN_INTERVAL: f64 = 1.0;
/// Sideways speed limit, in cells per frame.
const MAX_DRIFT: f64 = 0.6;

const GRAIN_CHAR: char = '.';
const SPARKLE_CHAR: char = '*';

#[derive(Debug, Clone, PartialEq)]
struct Grain {
    x: f64,
    y: f64,
    vx: f64,
}

#[derive(Debug, Clone, PartialEq)]
struct Sparkle {
    x: u16,
    y: u16,
    /// Seconds left on screen.
    ttl: f64,
}

/// Grains and sparkles of a single column.
#[derive(Debug, Default)]
pub struct SandColumn {
    grains: Vec<Grain>,
    sparkles: Vec<Sparkle>,
    spawn_accum: f64,
}

impl SandColumn {
    /// Advance by `dt` seconds in a column `width` cells wide whose fill
    /// starts at row `surface` (the inner height when the column is empty).
    pub fn update(&mut self, dt: f64, width: u16, surface: u16, rng: &mut impl Rng) {
        if width == 0 {
            return;
        }
        let right = f64::from(width - 1);

        self.sparkles.retain_mut(|sparkle| {
            sparkle.ttl -= dt;
            sparkle.ttl > 0.0
        });

        self.spawn_accum += dt;
        while self.spawn_accum >= SPAWN_INTERVAL {
            self.spawn_accum -= SPAWN_INTERVAL;
            let x = (right / 2.0 + rng.random_range(-1.0..=1.0)).clamp(0.0, right);
            self.grains.push(Grain {
                x,
                y: 0.0,
                vx: rng.random_range(-0.4..=0.4),
            });
        }

        let landing = f64::from(surface) - 1.0;
        let sparkle_row = surface.saturating_sub(1);
        let mut landed = Vec::new();
        self.grains.retain_mut(|grain| {
            grain.vx = (grain.vx + rng.random_range(-0.6..=0.6) * dt).clamp(-MAX_DRIFT, MAX_DRIFT);
            let mut next_x = grain.x + grain.vx;
            if next_x < 0.0 && grain.vx < 0.0 {
                grain.vx = -grain.vx;
                next_x = 1.0;
            } else if next_x > right && grain.vx > 0.0 {
                grain.vx = -grain.vx;
                next_x = right - 1.0;
            }
            grain.x = next_x.clamp(0.0, right);
            grain.y += FALL_SPEED * dt;

            if grain.y >= landing {
                landed.push(grain.x);
                return false;
            }
            true
        });
        for x in landed {
            self.sparkles.push(Sparkle {
                x: x.round() as u16,
                y: sparkle_row,
                ttl: rng.random_range(0.5..=1.5),
            });
        }
    }
}

impl Widget for &SandColumn {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let cells = self
            .grains
            .iter()
            .map(|grain| (grain.x.round(), grain.y.round(), GRAIN_CHAR))
            .chain(
                self.sparkles
                    .iter()
                    .map(|sparkle| (f64::from(sparkle.x), f64::from(sparkle.y), SPARKLE_CHAR)),
            );
        for (x, y, ch) in cells {
            if x < 0.0 || y < 0.0 || x >= f64::from(area.width) || y >= f64::from(area.height) {
                continue;
            }
            if let Some(cell) = buf.cell_mut((area.x + x as u16, area.y + y as u16)) {
                cell.set_char(ch);
            }
        }
    }
}

/// Sand of every drawn column, keyed by column label.
#[derive(Debug)]
pub struct Sand {
    columns: BTreeMap<&'static str, SandColumn>,
    rng: StdRng,
}

impl Sand {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_rng(&mut rand::rng()))
    }

    /// Reproducible sand for tests.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            columns: BTreeMap::new(),
            rng,
        }
    }

    pub fn column(&self, label: &str) -> Option<&SandColumn> {
        self.columns.get(label)
    }

    pub fn update(&mut self, label: &'static str, dt: f64, width: u16, surface: u16) {
        let column = self.columns.entry(label).or_default();
        column.update(dt, width, surface, &mut self.rng);
    }

    /// Drop columns that are no longer drawn, such as a cleared timer.
    pub fn retain(&mut self, labels: &[&str]) {
        self.columns.retain(|label, _| labels.contains(label));
    }

    pub fn reset(&mut self) {
        self.columns.clear();
    }
}

impl Default for Sand {
    fn default() -> Self {
        Self::new()
    }
}
