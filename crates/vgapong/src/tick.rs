//! Tick Dispatcher
//!
//! The timer interrupt entry point. One call to [`TickDispatcher::on_timer`]
//! is one tick and always runs in the same order:
//!
//! 1. acknowledge the timer
//! 2. sample the inputs
//! 3. advance the simulation
//! 4. render into the back buffer
//! 5. publish the back buffer and wait for the swap
//!
//! The dispatcher owns every piece of mutable state the handler touches, so
//! the board glue only has to keep one of them in its interrupt slot.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use tracing::{debug, error, info, trace, warn};

use crate::budget;
use crate::config::GameConfig;
use crate::error::{InitError, InitResult};
use crate::flip::{FlipController, VideoMemory};
use crate::game::{GameState, TickEvents};
use crate::hw::{FlipError, HardwarePort};
use crate::input::InputSampler;
use crate::render::Renderer;

/// How a tick ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A new frame is on screen
    Presented,
    /// The display is halted; only the timer was acknowledged
    Halted,
}

/// What one tick did, for logging and budget accounting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// 1-based tick number since init
    pub tick: u32,
    pub pixels_written: u32,
    /// Busy polls spent waiting for the swap
    pub flip_polls: u32,
    pub events: TickEvents,
    pub outcome: TickOutcome,
}

impl TickReport {
    fn halted(tick: u32) -> Self {
        TickReport {
            tick,
            pixels_written: 0,
            flip_polls: 0,
            events: TickEvents::NONE,
            outcome: TickOutcome::Halted,
        }
    }
}

/// Everything the timer handler works on
pub struct TickDispatcher<'fb, P: HardwarePort> {
    port: P,
    sampler: InputSampler,
    state: GameState,
    renderer: Renderer,
    flip: FlipController<'fb>,
    config: GameConfig,
    ticks: u32,
    halted: Option<FlipError>,
}

impl<'fb, P: HardwarePort> TickDispatcher<'fb, P> {
    /// One-time initialization
    ///
    /// Validates the geometry, splits `memory` into the buffer pair, clears
    /// both, puts the front buffer on screen and starts the timer. Interrupts
    /// are left for the caller to enable, and only if this returns `Ok`.
    pub fn init(mut port: P, memory: VideoMemory<'fb>, config: GameConfig) -> InitResult<Self> {
        let geometry = port.read_geometry();
        if geometry.is_degenerate() {
            error!(width = geometry.width, height = geometry.height, "degenerate display geometry");
            return Err(InitError::zero_geometry(geometry));
        }
        if let Err(err) = config.rules.validate() {
            error!(%err, "rules rejected");
            return Err(err);
        }
        if !config.rules.fits(geometry) {
            error!(width = geometry.width, height = geometry.height, "playfield does not fit the display");
            return Err(InitError::geometry_too_small(geometry));
        }

        let mut flip = FlipController::new(memory, geometry, config.flip_policy)?;

        if let Some(cycles) = budget::check(geometry, &config)? {
            debug!(cycles, period = config.timer_period, "worst-case tick fits the period");
        }

        flip.clear_all(config.boot_color);
        flip.show_front(&mut port)?;

        port.configure_timer(config.timer_period);
        port.set_leds(config.input.paddle_switch_mask());

        let state = GameState::new(geometry, config.rules);

        info!(
            width = geometry.width,
            height = geometry.height,
            front = flip.front_address(),
            back = flip.back_address(),
            period = config.timer_period,
            "display initialized"
        );

        Ok(TickDispatcher {
            port,
            sampler: InputSampler::new(config.input),
            state,
            renderer: Renderer::new(config.render),
            flip,
            config,
            ticks: 0,
            halted: None,
        })
    }

    /// Handle one timer interrupt
    pub fn on_timer(&mut self) -> TickReport {
        self.port.ack_timer();
        self.ticks = self.ticks.wrapping_add(1);
        let tick = self.ticks;

        if self.halted.is_some() {
            return TickReport::halted(tick);
        }

        let input = self.sampler.sample(&mut self.port);
        let events = self.state.step(&input);
        self.log_events(tick, events);

        let mut frame = self.flip.current_back_buffer();
        let stats = self.renderer.render(&self.state, &mut frame);

        let (flip_polls, outcome) = match self.flip.publish(&mut self.port) {
            Ok(polls) => (polls, TickOutcome::Presented),
            Err(err) => {
                error!(tick, error = %err, "display flip stalled, halting");
                let FlipError::Stalled { polls } = err;
                self.halted = Some(err);
                (polls, TickOutcome::Halted)
            }
        };

        trace!(tick, pixels = stats.pixels_written, polls = flip_polls, "tick");

        TickReport {
            tick,
            pixels_written: stats.pixels_written,
            flip_polls,
            events,
            outcome,
        }
    }

    fn log_events(&self, tick: u32, events: TickEvents) {
        let score = &self.state.score;
        if events.contains(TickEvents::RESET) {
            debug!(tick, serve = ?self.state.last_serve(), "reset");
        }
        if events.contains(TickEvents::POINT) {
            debug!(tick, left = score.left, right = score.right, "point");
        }
        if events.contains(TickEvents::GAME_WON) {
            if let Some(winner) = score.winner {
                info!(tick, player = winner.player(), "game over");
            }
        }
    }

    #[inline]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[inline]
    pub fn flip(&self) -> &FlipController<'fb> {
        &self.flip
    }

    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[inline]
    pub fn port(&self) -> &P {
        &self.port
    }

    #[inline]
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Ticks handled since init
    #[inline]
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// The flip failure that halted the display, if any
    #[inline]
    pub fn halted(&self) -> Option<FlipError> {
        self.halted
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }
}

/// Busy flag for the interrupt handler
///
/// The handler runs on a single core and a nested interrupt runs to
/// completion before the interrupted one resumes, so plain loads and stores
/// are enough; the core has no read-modify-write atomics to rely on.
pub struct ReentryGuard {
    busy: AtomicBool,
    overruns: AtomicU32,
}

impl ReentryGuard {
    pub const fn new() -> Self {
        ReentryGuard {
            busy: AtomicBool::new(false),
            overruns: AtomicU32::new(0),
        }
    }

    /// Claim the handler, or record an overrun if it is already running
    pub fn enter(&self) -> Option<GuardToken<'_>> {
        if self.busy.load(Ordering::Acquire) {
            let overruns = self.overruns.load(Ordering::Relaxed).wrapping_add(1);
            self.overruns.store(overruns, Ordering::Relaxed);
            warn!(overruns, "timer fired while the previous tick was still running");
            return None;
        }
        self.busy.store(true, Ordering::Release);
        Some(GuardToken { guard: self })
    }

    /// Nested entries refused so far
    pub fn overruns(&self) -> u32 {
        self.overruns.load(Ordering::Relaxed)
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Default for ReentryGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Held while the handler runs; releases the guard on drop
pub struct GuardToken<'g> {
    guard: &'g ReentryGuard,
}

impl Drop for GuardToken<'_> {
    fn drop(&mut self) {
        self.guard.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::{FakePort, FlipPolicy, Geometry};
    use crate::input::InputMap;
    use pretty_assertions::assert_eq;

    const BASE: u32 = 0x0800_0000;
    const FRAME: usize = 320 * 240;

    fn vram() -> Vec<u8> {
        vec![0xEE; 2 * FRAME]
    }

    #[test]
    fn test_init_programs_hardware() {
        let mut port = FakePort::new(Geometry::new(320, 240));
        let mut memory = vram();
        let dispatcher = TickDispatcher::init(&mut port, VideoMemory::new(&mut memory, BASE), GameConfig::DEFAULT).unwrap();
        assert_eq!(dispatcher.ticks(), 0);
        assert!(dispatcher.flip().front_pixels().iter().all(|&p| p == 0));
        drop(dispatcher);

        assert_eq!(port.displayed(), Some(BASE));
        assert_eq!(port.timer_period(), Some(1_200_000));
        assert_eq!(port.timer_ctrl(), 0b111);
        assert_eq!(port.leds(), InputMap::BOARD.paddle_switch_mask());
        assert_eq!(port.timer_acks(), 0);
        assert!(memory.iter().all(|&p| p == 0));
    }

    #[test]
    fn test_init_rejects_zero_geometry() {
        let port = FakePort::with_resolution_register(0x00F0_0000);
        let mut memory = vram();
        let err = TickDispatcher::init(port, VideoMemory::new(&mut memory, BASE), GameConfig::DEFAULT)
            .err()
            .unwrap();
        assert_eq!(err, InitError::ZeroGeometry { width: 0, height: 240 });
    }

    #[test]
    fn test_init_rejects_tiny_screen() {
        let mut port = FakePort::new(Geometry::new(20, 240));
        let mut memory = vram();
        let err = TickDispatcher::init(&mut port, VideoMemory::new(&mut memory, BASE), GameConfig::DEFAULT)
            .err()
            .unwrap();
        assert_eq!(err, InitError::GeometryTooSmall { width: 20, height: 240 });
        assert_eq!(port.timer_period(), None);
    }

    #[test]
    fn test_init_rejects_backwards_ball() {
        let mut port = FakePort::new(Geometry::new(320, 240));
        let mut memory = vram();
        let mut config = GameConfig::DEFAULT;
        config.rules.ball_step_x = -3;
        let err = TickDispatcher::init(&mut port, VideoMemory::new(&mut memory, BASE), config)
            .err()
            .unwrap();
        assert_eq!(err, InitError::InvalidRule { rule: "ball_step_x", value: -3 });
        assert_eq!(port.timer_period(), None);
        assert_eq!(port.displayed(), None);
    }

    #[test]
    fn test_init_rejects_short_memory() {
        let port = FakePort::new(Geometry::new(320, 240));
        let mut memory = vec![0u8; FRAME];
        let err = TickDispatcher::init(port, VideoMemory::new(&mut memory, BASE), GameConfig::DEFAULT)
            .err()
            .unwrap();
        assert_eq!(err, InitError::BufferTooSmall { required: 2 * FRAME, available: FRAME });
    }

    #[test]
    fn test_init_rejects_bounded_policy_over_budget() {
        let port = FakePort::new(Geometry::new(320, 240));
        let mut memory = vram();
        let config = GameConfig {
            timer_period: 100_000,
            flip_policy: FlipPolicy::Bounded { max_polls: 10 },
            ..GameConfig::DEFAULT
        };
        let err = TickDispatcher::init(port, VideoMemory::new(&mut memory, BASE), config)
            .err()
            .unwrap();
        assert!(matches!(err, InitError::TickBudgetExceeded { period: 100_000, .. }));
    }

    #[test]
    fn test_init_fails_when_first_flip_stalls() {
        let port = FakePort::new(Geometry::new(320, 240)).stalled();
        let mut memory = vram();
        let config = GameConfig {
            flip_policy: FlipPolicy::Bounded { max_polls: 2 },
            ..GameConfig::DEFAULT
        };
        let err = TickDispatcher::init(port, VideoMemory::new(&mut memory, BASE), config)
            .err()
            .unwrap();
        assert_eq!(err, InitError::Flip(FlipError::Stalled { polls: 3 }));
    }

    #[test]
    fn test_tick_acks_renders_and_flips() {
        let mut port = FakePort::new(Geometry::new(320, 240)).with_flip_latency(5);
        let mut memory = vram();
        let mut dispatcher = TickDispatcher::init(&mut port, VideoMemory::new(&mut memory, BASE), GameConfig::DEFAULT).unwrap();

        let report = dispatcher.on_timer();
        assert_eq!(report.tick, 1);
        assert_eq!(report.outcome, TickOutcome::Presented);
        assert_eq!(report.flip_polls, 5);
        assert!(report.pixels_written >= FRAME as u32);
        assert_eq!(dispatcher.port().timer_acks(), 1);
        assert_eq!(dispatcher.port().displayed(), Some(BASE + FRAME as u32));

        // Ball moved one step from the centre serve toward the right.
        assert_eq!((dispatcher.state().ball.x, dispatcher.state().ball.y), (161, 121));

        dispatcher.on_timer();
        assert_eq!(dispatcher.port().displayed(), Some(BASE));
        assert_eq!(dispatcher.flip().flips(), 2);
    }

    #[test]
    fn test_rendered_frame_shows_ball() {
        let mut port = FakePort::new(Geometry::new(320, 240));
        let mut memory = vram();
        let mut dispatcher = TickDispatcher::init(&mut port, VideoMemory::new(&mut memory, BASE), GameConfig::DEFAULT).unwrap();
        dispatcher.on_timer();

        let ball = dispatcher.state().ball;
        let front = dispatcher.flip().front_pixels();
        let at = |x: i32, y: i32| front[y as usize * 320 + x as usize];
        assert_eq!(at(ball.x, ball.y), GameConfig::DEFAULT.render.palette.ball);
        assert_eq!(at(0, 239), GameConfig::DEFAULT.render.palette.background);
    }

    #[test]
    fn test_stall_halts_display_but_acks_timer() {
        let mut port = FakePort::new(Geometry::new(320, 240));
        let mut memory = vram();
        let config = GameConfig {
            flip_policy: FlipPolicy::Bounded { max_polls: 4 },
            ..GameConfig::DEFAULT
        };
        let mut dispatcher = TickDispatcher::init(&mut port, VideoMemory::new(&mut memory, BASE), config).unwrap();
        dispatcher.on_timer();

        dispatcher.port_mut().set_stalled(true);
        let report = dispatcher.on_timer();
        assert_eq!(report.outcome, TickOutcome::Halted);
        assert_eq!(report.flip_polls, 5);
        assert_eq!(dispatcher.halted(), Some(FlipError::Stalled { polls: 5 }));

        let ball = dispatcher.state().ball;
        let report = dispatcher.on_timer();
        assert_eq!(report, TickReport::halted(3));
        assert_eq!(dispatcher.state().ball, ball);
        assert_eq!(dispatcher.port().timer_acks(), 3);
        assert_eq!(dispatcher.port().flip_requests(), 3);
    }

    #[test]
    fn test_reset_button_reaches_game() {
        let mut port = FakePort::new(Geometry::new(320, 240));
        let mut memory = vram();
        let mut dispatcher = TickDispatcher::init(&mut port, VideoMemory::new(&mut memory, BASE), GameConfig::DEFAULT).unwrap();
        dispatcher.on_timer();
        dispatcher.port_mut().set_buttons(1);
        let report = dispatcher.on_timer();
        assert!(report.events.contains(TickEvents::RESET));
        assert_eq!(dispatcher.state().ball.x, 158);
        assert_eq!(dispatcher.state().ball.dx, -3);
    }

    #[test]
    fn test_guard_refuses_nested_entry() {
        let guard = ReentryGuard::new();
        {
            let _outer = guard.enter().unwrap();
            assert!(guard.is_busy());
            assert!(guard.enter().is_none());
            assert!(guard.enter().is_none());
        }
        assert!(!guard.is_busy());
        assert_eq!(guard.overruns(), 2);
        assert!(guard.enter().is_some());
    }
}
