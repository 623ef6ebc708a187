//! Configuration surface
//!
//! Everything the board variants used to hard-code in separate copies of the
//! program lives here: speeds, sizes, the switch table, how the score is
//! drawn, the timer period and how long a flip may take.

use crate::budget::CostModel;
use crate::game::Rules;
use crate::hw::FlipPolicy;
use crate::hw::mmio::VRAM_BASE;
use crate::input::InputMap;
use crate::render::RenderOptions;

/// Timer reload value used on the board (30 MHz clock, 25 ticks per second)
pub const DEFAULT_TIMER_PERIOD: u32 = 1_200_000;

/// Complete engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    pub rules: Rules,
    pub input: InputMap,
    pub render: RenderOptions,
    /// Timer reload value in CPU cycles
    pub timer_period: u32,
    pub flip_policy: FlipPolicy,
    /// Cost estimates used to check a bounded flip policy against the period
    pub cost_model: CostModel,
    /// Bus address of the first frame buffer
    pub vram_base: u32,
    /// Colour both buffers are cleared to before the first tick
    pub boot_color: u8,
}

impl GameConfig {
    /// Board configuration
    pub const DEFAULT: GameConfig = GameConfig {
        rules: Rules::DEFAULT,
        input: InputMap::BOARD,
        render: RenderOptions::DEFAULT,
        timer_period: DEFAULT_TIMER_PERIOD,
        flip_policy: FlipPolicy::Unbounded,
        cost_model: CostModel::DEFAULT,
        vram_base: VRAM_BASE,
        boot_color: 0x00,
    };
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::DEFAULT
    }
}
