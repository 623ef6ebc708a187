//! # vgapong - interrupt-driven Pong for a double-buffered VGA display
//!
//! The whole game runs inside a periodic timer interrupt. Each tick samples
//! the switches and button, advances a two-paddle ball simulation, draws the
//! scene into the off-screen frame buffer and asks the display controller to
//! swap buffers, waiting until it confirms.
//!
//! ## Features
//!
//! - **Hardware Port**: one trait over the board registers, with a volatile
//!   MMIO implementation and an in-memory fake for tests and the simulator
//! - **Simulation**: paddles, wall and paddle bounces without tunnelling,
//!   scoring, win detection and reset
//! - **Rendering**: clipped rectangles, score pips or digits, optional centre
//!   net, game-over banner
//! - **Double buffering**: explicit front/back roles swapped only after the
//!   hardware confirms
//! - **Tick budget**: a cycle model that rejects configurations that cannot
//!   finish a tick inside one timer period
//!
//! ## Quick Start
//!
//! ```
//! use vgapong::prelude::*;
//!
//! let mut port = FakePort::new(Geometry::new(320, 240)).with_flip_latency(3);
//! let mut vram = vec![0u8; 2 * 320 * 240];
//! let memory = VideoMemory::new(&mut vram, 0x0800_0000);
//!
//! let mut dispatcher = TickDispatcher::init(&mut port, memory, GameConfig::DEFAULT)?;
//! let report = dispatcher.on_timer();
//! assert_eq!(report.flip_polls, 3);
//! # Ok::<(), InitError>(())
//! ```
//!
//! ## Modules
//!
//! - [`hw`] - register access, MMIO and fake ports
//! - [`input`] - switch/button role table and sampling
//! - [`game`] - game state and the per-tick step
//! - [`render`] - scene drawing, [`font`] glyphs, [`frame`] surface
//! - [`flip`] - frame buffer pair and the flip handshake
//! - [`tick`] - the interrupt dispatcher and re-entry guard
//! - [`budget`] - tick cost model
//! - [`config`] - the single configuration surface

#![cfg_attr(not(test), no_std)]

pub mod budget;
pub mod config;
pub mod error;
pub mod flip;
pub mod font;
pub mod frame;
pub mod game;
pub mod hw;
pub mod input;
pub mod render;
pub mod tick;
pub mod types;

#[cfg(all(feature = "board", target_os = "none"))]
pub mod board;

/// Convenient re-exports for common usage
///
/// ```
/// use vgapong::prelude::*;
/// ```
pub mod prelude {
    pub use crate::budget::CostModel;
    pub use crate::config::GameConfig;
    pub use crate::error::{InitError, InitResult};
    pub use crate::flip::{FlipController, FlipState, VideoMemory};
    pub use crate::game::{GameState, Rules, TickEvents};
    pub use crate::hw::{FakePort, FlipError, FlipPolicy, Geometry, HardwarePort, MmioPort, RawInput};
    pub use crate::input::{InputMap, InputSampler, InputSnapshot};
    pub use crate::render::{RenderOptions, Renderer, ScoreStyle};
    pub use crate::tick::{ReentryGuard, TickDispatcher, TickOutcome, TickReport};
    pub use crate::types::{Rect, Side};
}

/// Crate version information
pub mod version {
    /// Version as string
    pub const STRING: &str = env!("CARGO_PKG_VERSION");
}
