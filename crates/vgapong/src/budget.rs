//! Tick cost model
//!
//! A tick must finish inside one timer period, otherwise the next interrupt
//! arrives while the previous frame is still being flipped. The cost of a
//! tick is dominated by two things the engine can count: pixel writes made by
//! the renderer, and busy polls spent waiting for the display controller.
//!
//! `tick cycles = pixels_written * cycles_per_pixel + flip_polls * cycles_per_poll`
//!
//! [`worst_case_pixels`] bounds the first term for a configuration; a
//! [`FlipPolicy::Bounded`](crate::hw::FlipPolicy::Bounded) policy bounds
//! the second. Together they let initialization refuse a configuration that
//! cannot keep up.

use crate::config::GameConfig;
use crate::error::{InitError, InitResult};
use crate::font;
use crate::hw::Geometry;
use crate::render::{self, ScoreStyle};
use crate::tick::TickReport;
use crate::types::Side;

/// Cycle cost of the two counted operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostModel {
    pub cycles_per_pixel: u32,
    pub cycles_per_poll: u32,
}

impl CostModel {
    /// Byte stores through the data cache, one uncached status read per poll
    pub const DEFAULT: CostModel = CostModel {
        cycles_per_pixel: 4,
        cycles_per_poll: 6,
    };

    #[inline]
    pub const fn render_cycles(&self, pixels: u32) -> u64 {
        pixels as u64 * self.cycles_per_pixel as u64
    }

    #[inline]
    pub const fn flip_cycles(&self, polls: u32) -> u64 {
        polls as u64 * self.cycles_per_poll as u64
    }

    /// Cost of one measured tick
    #[inline]
    pub const fn tick_cycles(&self, report: &TickReport) -> u64 {
        self.render_cycles(report.pixels_written) + self.flip_cycles(report.flip_polls)
    }

    /// Whether a measured tick finished strictly inside `period`
    #[inline]
    pub const fn fits(&self, report: &TickReport, period: u32) -> bool {
        self.tick_cycles(report) < period as u64
    }
}

impl Default for CostModel {
    fn default() -> Self {
        CostModel::DEFAULT
    }
}

/// Upper bound on pixel writes in one rendered frame
pub fn worst_case_pixels(geometry: Geometry, config: &GameConfig) -> u64 {
    let rules = &config.rules;
    let area = |w: i32, h: i32| u64::from(w.max(0).unsigned_abs()) * u64::from(h.max(0).unsigned_abs());
    let glyph_cell = u64::from((font::GLYPH_WIDTH * font::GLYPH_HEIGHT).unsigned_abs());

    let mut pixels = geometry.frame_bytes() as u64;

    if config.render.center_net {
        let dashes = u64::from(geometry.height.div_ceil(render::NET_PITCH.unsigned_abs()));
        pixels += dashes * area(render::NET_WIDTH, render::NET_DASH);
    }

    pixels += 2 * area(rules.paddle_width, rules.paddle_height);
    pixels += area(rules.ball_size, rules.ball_size);

    pixels += match config.render.score_style {
        ScoreStyle::Pips => 2 * u64::from(rules.win_threshold) * area(render::PIP_SIZE, render::PIP_SIZE),
        ScoreStyle::Digits => 2 * 3 * glyph_cell * area(render::DIGIT_SCALE, render::DIGIT_SCALE),
    };

    let banner = render::winner_message(Side::Left).len() as u64;
    pixels + banner * glyph_cell
}

/// Upper bound on tick cycles, if the flip policy bounds the wait
pub fn worst_case_cycles(geometry: Geometry, config: &GameConfig) -> Option<u64> {
    let max_polls = config.flip_policy.max_polls()?;
    let model = &config.cost_model;
    let render = worst_case_pixels(geometry, config) * u64::from(model.cycles_per_pixel);
    Some(render + model.flip_cycles(max_polls))
}

/// Refuse a bounded configuration whose worst case does not fit the period
///
/// An unbounded flip wait cannot be proven to fit; the board relies on the
/// handler running with its interrupt masked instead.
pub fn check(geometry: Geometry, config: &GameConfig) -> InitResult<Option<u64>> {
    let Some(cycles) = worst_case_cycles(geometry, config) else {
        return Ok(None);
    };
    if cycles >= u64::from(config.timer_period) {
        return Err(InitError::TickBudgetExceeded {
            cycles,
            period: config.timer_period,
        });
    }
    Ok(Some(cycles))
}
