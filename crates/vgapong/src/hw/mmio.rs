//! Memory-mapped register access for the board
//!
//! The only place in the crate that turns integers into pointers.

use super::{Geometry, HardwarePort, RawInput, display_status};

/// Display controller: write starts the swap
const VGA_CTRL_BUFFER: *mut u32 = 0x0400_0100 as *mut u32;
/// Display controller: address shown after the next swap
const VGA_CTRL_BACKBUFFER: *mut u32 = 0x0400_0104 as *mut u32;
/// Display controller: packed resolution
const VGA_CTRL_RESOLUTION: *const u32 = 0x0400_0108 as *const u32;
/// Display controller: status
const VGA_CTRL_STATUS: *const u32 = 0x0400_010C as *const u32;

/// Timer status (any write acknowledges)
const TIMER_STATUS: *mut u32 = 0x0400_0020 as *mut u32;
/// Timer control
const TIMER_CTRL: *mut u32 = 0x0400_0024 as *mut u32;
/// Timer period, low 16 bits
const TIMER_PERIOD_LO: *mut u32 = 0x0400_0028 as *mut u32;
/// Timer period, high 16 bits
const TIMER_PERIOD_HI: *mut u32 = 0x0400_002C as *mut u32;

/// Slide switches
const SWITCHES: *const u32 = 0x0400_0010 as *const u32;
/// Push buttons
const BUTTONS: *const u32 = 0x0400_00D0 as *const u32;
/// LED bank
const LEDS: *mut u32 = 0x0400_0000 as *mut u32;

/// Ten slide switches are wired
pub const SWITCH_MASK: u32 = 0x3FF;
/// One push button is wired
pub const BUTTON_MASK: u32 = 0x1;
/// Ten LEDs are wired
pub const LED_MASK: u32 = 0x3FF;

/// Start of video memory as seen by both the CPU and the display DMA
pub const VRAM_BASE: u32 = 0x0800_0000;
/// Bytes of video memory (two 320x240 8-bit frames)
pub const VRAM_BYTES: usize = 0x2_5800;

/// Board register block
///
/// Zero-sized; every call is a volatile access to a fixed address.
pub struct MmioPort {
    _private: (),
}

impl MmioPort {
    /// Take the register block
    ///
    /// # Safety
    ///
    /// Only valid on the board, where the addresses above are the device
    /// registers. The caller must make sure register accesses from different
    /// handles cannot interleave (the interrupt handler is the sole user).
    #[inline]
    pub const unsafe fn new() -> Self {
        MmioPort { _private: () }
    }

    /// Borrow the whole of video memory
    ///
    /// # Safety
    ///
    /// Only valid on the board. Must be called at most once; the returned
    /// slice is the unique handle to the frame buffers for the rest of the
    /// program.
    pub unsafe fn video_memory() -> &'static mut [u8] {
        // SAFETY: caller guarantees we run on the board and hold the only
        // reference to VRAM.
        unsafe { core::slice::from_raw_parts_mut(VRAM_BASE as *mut u8, VRAM_BYTES) }
    }
}

impl HardwarePort for MmioPort {
    #[inline]
    fn read_input(&mut self) -> RawInput {
        // SAFETY: fixed, always-readable device registers.
        unsafe {
            RawInput {
                switches: SWITCHES.read_volatile() & SWITCH_MASK,
                buttons: BUTTONS.read_volatile() & BUTTON_MASK,
            }
        }
    }

    #[inline]
    fn read_geometry(&mut self) -> Geometry {
        // SAFETY: read-only resolution register.
        Geometry::from_packed(unsafe { VGA_CTRL_RESOLUTION.read_volatile() })
    }

    #[inline]
    fn ack_timer(&mut self) {
        // SAFETY: any write clears the timer's pending flag.
        unsafe { TIMER_STATUS.write_volatile(0) }
    }

    fn configure_timer(&mut self, period: u32) {
        // SAFETY: timer registers; period halves first, then start.
        unsafe {
            TIMER_PERIOD_LO.write_volatile(period & 0xFFFF);
            TIMER_PERIOD_HI.write_volatile((period >> 16) & 0xFFFF);
            TIMER_CTRL.write_volatile(super::timer_ctrl::PERIODIC_IRQ);
        }
    }

    #[inline]
    fn start_flip(&mut self, buffer_address: u32) {
        // SAFETY: display controller registers. The back pointer must be in
        // place before the swap command.
        unsafe {
            VGA_CTRL_BACKBUFFER.write_volatile(buffer_address);
            VGA_CTRL_BUFFER.write_volatile(0);
        }
    }

    #[inline]
    fn flip_in_progress(&mut self) -> bool {
        // SAFETY: read-only status register.
        unsafe { (VGA_CTRL_STATUS.read_volatile() & display_status::FLIP_BUSY) != 0 }
    }

    #[inline]
    fn set_leds(&mut self, bits: u32) {
        // SAFETY: LED bank register.
        unsafe { LEDS.write_volatile(bits & LED_MASK) }
    }
}
