//! Run the engine against the fake board for a number of ticks

use tracing::{info, warn};
use vgapong::game::Score;
use vgapong::prelude::*;

use crate::script::InputScript;

/// What to simulate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub geometry: Geometry,
    pub ticks: u32,
    /// Busy polls the fake controller reports for every flip
    pub flip_latency: u32,
    pub game: GameConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            geometry: Geometry::new(320, 240),
            ticks: 250,
            flip_latency: 0,
            game: GameConfig::DEFAULT,
        }
    }
}

/// Outcome of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    /// Timer interrupts delivered
    pub ticks: u32,
    pub score: Score,
    /// Most expensive tick under the configured cost model
    pub max_tick_cycles: u64,
    /// Ticks whose cost reached the timer period
    pub over_budget: u32,
    pub period: u32,
    pub flips: u32,
    pub halted: Option<FlipError>,
    pub geometry: Geometry,
    /// Copy of the frame on screen when the run ended
    pub frame: Vec<u8>,
}

impl SessionSummary {
    pub fn winner(&self) -> Option<Side> {
        self.score.winner
    }
}

/// Initialize the engine on a fresh fake board and deliver `config.ticks` interrupts
pub fn run(config: &SessionConfig, script: &InputScript) -> InitResult<SessionSummary> {
    let model = config.game.cost_model;
    let mut port = FakePort::new(config.geometry)
        .with_flip_latency(config.flip_latency)
        .with_cycles_per_poll(u64::from(model.cycles_per_poll));
    let mut vram = vec![0u8; config.geometry.frame_bytes().saturating_mul(2)];
    let memory = VideoMemory::new(&mut vram, config.game.vram_base);

    let mut dispatcher = TickDispatcher::init(&mut port, memory, config.game)?;

    let period = config.game.timer_period;
    let mut max_tick_cycles: u64 = 0;
    let mut over_budget = 0;

    for tick in 1..=config.ticks {
        if let Some(input) = script.level_at(tick) {
            dispatcher.port_mut().set_input(input);
        }

        let report = dispatcher.on_timer();
        let cycles = model.tick_cycles(&report);
        max_tick_cycles = max_tick_cycles.max(cycles);
        if !model.fits(&report, period) {
            over_budget += 1;
            warn!(tick, cycles, period, "tick overran the timer period");
        }
    }

    let summary = SessionSummary {
        ticks: dispatcher.ticks(),
        score: dispatcher.state().score,
        max_tick_cycles,
        over_budget,
        period,
        flips: dispatcher.flip().flips(),
        halted: dispatcher.halted(),
        geometry: dispatcher.state().geometry(),
        frame: dispatcher.flip().front_pixels().to_vec(),
    };

    info!(
        ticks = summary.ticks,
        left = summary.score.left,
        right = summary.score.right,
        max_tick_cycles,
        "session finished"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_run_presents_every_tick() {
        let summary = run(&SessionConfig::default(), &InputScript::default()).unwrap();
        assert_eq!(summary.ticks, 250);
        assert_eq!(summary.flips, 250);
        assert_eq!(summary.over_budget, 0);
        assert_eq!(summary.halted, None);
        assert_eq!(summary.frame.len(), 320 * 240);
        assert!(summary.max_tick_cycles > 320 * 240 * 4);
    }

    #[test]
    fn test_idle_players_concede() {
        let config = SessionConfig { ticks: 1000, ..SessionConfig::default() };
        let summary = run(&config, &InputScript::default()).unwrap();
        assert!(summary.score.right >= 1);
    }

    #[test]
    fn test_slow_flips_blow_the_budget() {
        let config = SessionConfig {
            ticks: 10,
            flip_latency: 400_000,
            ..SessionConfig::default()
        };
        let summary = run(&config, &InputScript::default()).unwrap();
        assert_eq!(summary.over_budget, 10);
        assert!(summary.max_tick_cycles > u64::from(summary.period));
    }

    #[test]
    fn test_script_reset_restarts_game() {
        let script = InputScript::parse("1 0 0\n30 0 1\n31 0 0\n").unwrap();
        let config = SessionConfig { ticks: 31, ..SessionConfig::default() };
        let summary = run(&config, &script).unwrap();
        assert_eq!(summary.score, Score::default());
    }

    #[test]
    fn test_summary_reports_the_geometry_the_engine_saw() {
        // The resolution register holds 16 bits per dimension.
        let config = SessionConfig {
            geometry: Geometry::new(70_000, 40),
            ticks: 2,
            ..SessionConfig::default()
        };
        let summary = run(&config, &InputScript::default()).unwrap();
        assert_eq!(summary.geometry, Geometry::new(70_000 & 0xFFFF, 40));
        assert_eq!(summary.frame.len(), summary.geometry.frame_bytes());

        let mut pgm = Vec::new();
        crate::report::write_pgm(&mut pgm, summary.geometry, &summary.frame).unwrap();
        assert!(pgm.starts_with(b"P5\n4464 40\n255\n"));
    }

    #[test]
    fn test_degenerate_geometry_fails_init() {
        let config = SessionConfig {
            geometry: Geometry::new(0, 240),
            ..SessionConfig::default()
        };
        let err = run(&config, &InputScript::default()).unwrap_err();
        assert_eq!(err, InitError::ZeroGeometry { width: 0, height: 240 });
    }
}
