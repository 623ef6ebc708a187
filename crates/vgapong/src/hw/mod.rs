//! Hardware Port
//!
//! Every register the engine touches goes through [`HardwarePort`]. The
//! board implementation ([`MmioPort`]) maps the calls onto volatile accesses;
//! [`FakePort`] keeps the same registers in memory so the whole tick can be
//! exercised on a host.
//!
//! # Register groups
//!
//! | Group   | Register          | Access | Meaning                                   |
//! |---------|-------------------|--------|-------------------------------------------|
//! | Display | buffer            | write  | any write starts the swap                 |
//! | Display | back buffer       | write  | address shown after the next swap         |
//! | Display | resolution        | read   | low 16 bits width, high 16 bits height    |
//! | Display | status            | read   | bit 0 = swap in progress                  |
//! | Timer   | status            | write  | any write clears the pending interrupt    |
//! | Timer   | control           | write  | bit 0 enable, 1 continuous, 2 irq enable  |
//! | Timer   | period low / high | write  | two 16-bit halves of the tick count       |
//! | Input   | switches          | read   | 10 slide switches                         |
//! | Input   | buttons           | read   | push button 0                             |
//! | LEDs    | leds              | write  | 10 LEDs above the switches                |

pub mod fake;
pub mod mmio;

pub use fake::FakePort;
pub use mmio::MmioPort;

use thiserror::Error;

/// Timer control register bits
pub mod timer_ctrl {
    /// Count down
    pub const ENABLE: u32 = 1 << 0;
    /// Reload the period on underflow instead of stopping
    pub const CONTINUOUS: u32 = 1 << 1;
    /// Raise the interrupt line on underflow
    pub const IRQ_ENABLE: u32 = 1 << 2;

    /// Control word used by the game: periodic interrupting timer
    pub const PERIODIC_IRQ: u32 = ENABLE | CONTINUOUS | IRQ_ENABLE;
}

/// Display status register bits
pub mod display_status {
    /// Set while the controller is swapping buffers
    pub const FLIP_BUSY: u32 = 1 << 0;
}

/// Raw input registers sampled in one go
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawInput {
    /// Slide switch bitfield
    pub switches: u32,
    /// Momentary push button bitfield
    pub buttons: u32,
}

impl RawInput {
    /// Create from switch and button bitfields
    #[inline]
    pub const fn new(switches: u32, buttons: u32) -> Self {
        RawInput { switches, buttons }
    }
}

/// Display resolution in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    /// Create from explicit dimensions
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Geometry { width, height }
    }

    /// Decode the packed resolution register (low half width, high half height)
    #[inline]
    pub const fn from_packed(raw: u32) -> Self {
        Geometry {
            width: raw & 0xFFFF,
            height: (raw >> 16) & 0xFFFF,
        }
    }

    /// Encode into the resolution register layout
    #[inline]
    pub const fn packed(self) -> u32 {
        (self.width & 0xFFFF) | ((self.height & 0xFFFF) << 16)
    }

    /// True when either dimension is zero
    #[inline]
    pub const fn is_degenerate(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Bytes in one 8-bit frame
    #[inline]
    pub const fn frame_bytes(self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Width as a signed screen coordinate
    #[inline]
    pub const fn w(self) -> i32 {
        self.width as i32
    }

    /// Height as a signed screen coordinate
    #[inline]
    pub const fn h(self) -> i32 {
        self.height as i32
    }
}

/// How long [`HardwarePort::wait_flip`] may spin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlipPolicy {
    /// Wait until the controller reports completion, however long it takes
    #[default]
    Unbounded,
    /// Give up after `max_polls` busy polls
    Bounded { max_polls: u32 },
}

impl FlipPolicy {
    /// Upper bound on busy polls, if there is one
    #[inline]
    pub const fn max_polls(self) -> Option<u32> {
        match self {
            FlipPolicy::Unbounded => None,
            FlipPolicy::Bounded { max_polls } => Some(max_polls),
        }
    }
}

/// Display flip failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FlipError {
    #[error("display controller still busy after {polls} polls")]
    Stalled { polls: u32 },
}

/// Register-level access to the board
///
/// Implementations must not have side effects beyond the named register
/// access; the engine relies on that to reason about tick cost.
pub trait HardwarePort {
    /// Sample switches and buttons
    fn read_input(&mut self) -> RawInput;

    /// Read the display resolution register
    fn read_geometry(&mut self) -> Geometry;

    /// Clear the timer's pending interrupt flag
    fn ack_timer(&mut self);

    /// Program the period and start the timer in periodic interrupt mode
    fn configure_timer(&mut self, period: u32);

    /// Point the controller at `buffer_address` and start the swap
    fn start_flip(&mut self, buffer_address: u32);

    /// True while the controller is still swapping
    fn flip_in_progress(&mut self) -> bool;

    /// Drive the LED bank
    fn set_leds(&mut self, bits: u32);

    /// Block until the swap started by [`start_flip`](Self::start_flip) completes
    ///
    /// Returns the number of polls that observed the controller busy.
    fn wait_flip(&mut self, policy: FlipPolicy) -> Result<u32, FlipError> {
        let mut polls: u32 = 0;
        while self.flip_in_progress() {
            polls = polls.saturating_add(1);
            if let Some(max_polls) = policy.max_polls() {
                if polls > max_polls {
                    return Err(FlipError::Stalled { polls });
                }
            }
            core::hint::spin_loop();
        }
        Ok(polls)
    }
}

impl<P: HardwarePort + ?Sized> HardwarePort for &mut P {
    fn read_input(&mut self) -> RawInput {
        (**self).read_input()
    }

    fn read_geometry(&mut self) -> Geometry {
        (**self).read_geometry()
    }

    fn ack_timer(&mut self) {
        (**self).ack_timer();
    }

    fn configure_timer(&mut self, period: u32) {
        (**self).configure_timer(period);
    }

    fn start_flip(&mut self, buffer_address: u32) {
        (**self).start_flip(buffer_address);
    }

    fn flip_in_progress(&mut self) -> bool {
        (**self).flip_in_progress()
    }

    fn set_leds(&mut self, bits: u32) {
        (**self).set_leds(bits);
    }

    fn wait_flip(&mut self, policy: FlipPolicy) -> Result<u32, FlipError> {
        (**self).wait_flip(policy)
    }
}
