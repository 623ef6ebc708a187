//! Input Sampler
//!
//! Turns the raw switch and button registers into an [`InputSnapshot`]
//! through a fixed [`InputMap`]. There is no debouncing and no edge
//! detection: the registers are level-sampled once per tick, so a held
//! control repeats its effect every tick.
//!
//! # Example
//!
//! ```
//! use vgapong::hw::RawInput;
//! use vgapong::input::{InputMap, InputSampler};
//!
//! let sampler = InputSampler::new(InputMap::BOARD);
//!
//! // Switch 9 on, switch 0 off, button 0 pressed
//! let snapshot = sampler.decode(RawInput::new(1 << 9, 1));
//! assert!(snapshot.paddle1_up);
//! assert!(snapshot.paddle2_down);
//! assert!(snapshot.reset);
//! ```

use crate::hw::{HardwarePort, RawInput};

/// Register an input bit lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Switches,
    Buttons,
}

/// Level at which an input bit counts as asserted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    High,
    Low,
}

/// One entry of the bit-to-role table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputBit {
    pub source: InputSource,
    pub bit: u8,
    pub active: Level,
}

impl InputBit {
    /// Switch `bit`, asserted when on
    #[inline]
    pub const fn switch(bit: u8) -> Self {
        InputBit { source: InputSource::Switches, bit, active: Level::High }
    }

    /// Switch `bit`, asserted when off
    #[inline]
    pub const fn switch_off(bit: u8) -> Self {
        InputBit { source: InputSource::Switches, bit, active: Level::Low }
    }

    /// Button `bit`, asserted while pressed
    #[inline]
    pub const fn button(bit: u8) -> Self {
        InputBit { source: InputSource::Buttons, bit, active: Level::High }
    }

    /// Mask of this bit within its register (zero for out-of-range bits)
    #[inline]
    pub const fn mask(self) -> u32 {
        match 1u32.checked_shl(self.bit as u32) {
            Some(mask) => mask,
            None => 0,
        }
    }

    /// Evaluate against a raw sample
    #[inline]
    pub const fn is_active(self, raw: RawInput) -> bool {
        let mask = self.mask();
        if mask == 0 {
            return false;
        }
        let register = match self.source {
            InputSource::Switches => raw.switches,
            InputSource::Buttons => raw.buttons,
        };
        let set = (register & mask) != 0;
        match self.active {
            Level::High => set,
            Level::Low => !set,
        }
    }
}

/// Bit-to-role table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputMap {
    pub paddle1_up: InputBit,
    pub paddle1_down: InputBit,
    pub paddle2_up: InputBit,
    pub paddle2_down: InputBit,
    pub reset: InputBit,
}

impl InputMap {
    /// Board mapping
    ///
    /// Each paddle hangs off one slide switch: on moves it up, off moves it
    /// down. Player 1 (left paddle) uses switch 9, the leftmost switch on
    /// the board; player 2 (right paddle) uses switch 0, the rightmost.
    /// Button 0 resets.
    pub const BOARD: InputMap = InputMap {
        paddle1_up: InputBit::switch(9),
        paddle1_down: InputBit::switch_off(9),
        paddle2_up: InputBit::switch(0),
        paddle2_down: InputBit::switch_off(0),
        reset: InputBit::button(0),
    };

    /// Four independent switches, paddles stand still when both are off
    ///
    /// Player 1 uses switches 9 (up) and 8 (down), player 2 switches 1 (up)
    /// and 0 (down).
    pub const FOUR_SWITCH: InputMap = InputMap {
        paddle1_up: InputBit::switch(9),
        paddle1_down: InputBit::switch(8),
        paddle2_up: InputBit::switch(1),
        paddle2_down: InputBit::switch(0),
        reset: InputBit::button(0),
    };

    /// Switches bound to a paddle, in LED bank layout
    pub const fn paddle_switch_mask(&self) -> u32 {
        let mut mask = 0;
        let bits = [self.paddle1_up, self.paddle1_down, self.paddle2_up, self.paddle2_down];
        let mut i = 0;
        while i < bits.len() {
            if let InputSource::Switches = bits[i].source {
                mask |= bits[i].mask();
            }
            i += 1;
        }
        mask
    }
}

impl Default for InputMap {
    fn default() -> Self {
        InputMap::BOARD
    }
}

/// Role-level view of one tick's input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub paddle1_up: bool,
    pub paddle1_down: bool,
    pub paddle2_up: bool,
    pub paddle2_down: bool,
    pub reset: bool,
}

impl InputSnapshot {
    /// Nothing asserted
    pub const NONE: InputSnapshot = InputSnapshot {
        paddle1_up: false,
        paddle1_down: false,
        paddle2_up: false,
        paddle2_down: false,
        reset: false,
    };

    /// Only reset asserted
    pub const RESET: InputSnapshot = InputSnapshot { reset: true, ..InputSnapshot::NONE };
}

/// Reads the input registers and applies the role table
#[derive(Debug, Clone, Copy)]
pub struct InputSampler {
    map: InputMap,
}

impl InputSampler {
    pub const fn new(map: InputMap) -> Self {
        InputSampler { map }
    }

    pub const fn map(&self) -> &InputMap {
        &self.map
    }

    /// Sample the port for this tick
    pub fn sample<P: HardwarePort + ?Sized>(&self, port: &mut P) -> InputSnapshot {
        self.decode(port.read_input())
    }

    /// Apply the role table to an already-read sample
    pub const fn decode(&self, raw: RawInput) -> InputSnapshot {
        InputSnapshot {
            paddle1_up: self.map.paddle1_up.is_active(raw),
            paddle1_down: self.map.paddle1_down.is_active(raw),
            paddle2_up: self.map.paddle2_up.is_active(raw),
            paddle2_down: self.map.paddle2_down.is_active(raw),
            reset: self.map.reset.is_active(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::{FakePort, Geometry};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_board_map_switches_off_drive_down() {
        let sampler = InputSampler::new(InputMap::BOARD);
        let snap = sampler.decode(RawInput::new(0, 0));
        assert_eq!(
            snap,
            InputSnapshot {
                paddle1_up: false,
                paddle1_down: true,
                paddle2_up: false,
                paddle2_down: true,
                reset: false,
            }
        );
    }

    #[test]
    fn test_board_map_switches_on_drive_up() {
        let sampler = InputSampler::new(InputMap::BOARD);
        let snap = sampler.decode(RawInput::new((1 << 9) | 1, 0));
        assert!(snap.paddle1_up && !snap.paddle1_down);
        assert!(snap.paddle2_up && !snap.paddle2_down);
    }

    #[test]
    fn test_unrelated_bits_are_ignored() {
        let sampler = InputSampler::new(InputMap::FOUR_SWITCH);
        let snap = sampler.decode(RawInput::new(0b0011_1111_00, 0b10));
        assert_eq!(snap, InputSnapshot::NONE);
    }

    #[test]
    fn test_out_of_range_bit_never_asserts() {
        let bit = InputBit::switch_off(40);
        assert_eq!(bit.mask(), 0);
        assert!(!bit.is_active(RawInput::new(0, 0)));
    }

    #[test]
    fn test_sample_reads_port() {
        let mut port = FakePort::new(Geometry::new(320, 240));
        port.set_buttons(1);
        let sampler = InputSampler::new(InputMap::BOARD);
        assert!(sampler.sample(&mut port).reset);
    }

    #[test]
    fn test_paddle_switch_mask() {
        assert_eq!(InputMap::BOARD.paddle_switch_mask(), (1 << 9) | 1);
        assert_eq!(InputMap::FOUR_SWITCH.paddle_switch_mask(), 0b11_0000_0011);
    }
}
