//! Display Flip Controller
//!
//! Owns the two frame buffers and which one is front. The renderer only
//! ever sees the back buffer, through [`FlipController::current_back_buffer`].
//! [`FlipController::publish`] hands the back buffer to the display DMA,
//! spins until the controller confirms the swap, and then swaps the labels.
//!
//! ```text
//!  Idle ──publish()──▶ FlipPending ──status clear──▶ Swapped
//!   ▲                                                  │
//!   └────────────── current_back_buffer() ◀────────────┘
//! ```

use core::sync::atomic::{Ordering, compiler_fence};

use crate::error::{InitError, InitResult};
use crate::frame::FrameView;
use crate::hw::{FlipError, FlipPolicy, Geometry, HardwarePort};

/// Video memory handed to the controller at init
///
/// `bytes` must start at bus address `base` and hold at least two frames.
pub struct VideoMemory<'fb> {
    pub bytes: &'fb mut [u8],
    pub base: u32,
}

impl<'fb> VideoMemory<'fb> {
    pub fn new(bytes: &'fb mut [u8], base: u32) -> Self {
        VideoMemory { bytes, base }
    }
}

/// Where the controller is in the per-tick cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipState {
    /// Back buffer is free for drawing
    Idle,
    /// Swap command issued, waiting for the controller
    FlipPending,
    /// Controller confirmed the swap and the labels were exchanged
    Swapped,
}

struct FrameBuffer<'fb> {
    pixels: &'fb mut [u8],
    address: u32,
}

/// Front/back buffer pair
pub struct FlipController<'fb> {
    buffers: [FrameBuffer<'fb>; 2],
    front: usize,
    geometry: Geometry,
    policy: FlipPolicy,
    state: FlipState,
    flips: u32,
}

impl<'fb> FlipController<'fb> {
    /// Split `memory` into two frames of `geometry`
    ///
    /// The first frame starts out as front.
    pub fn new(memory: VideoMemory<'fb>, geometry: Geometry, policy: FlipPolicy) -> InitResult<Self> {
        let frame = geometry.frame_bytes();
        let required = frame.saturating_mul(2);
        let available = memory.bytes.len();
        let too_small = InitError::BufferTooSmall { required, available };
        if available < required {
            return Err(too_small);
        }
        let back_address = u32::try_from(frame)
            .ok()
            .and_then(|offset| memory.base.checked_add(offset))
            .ok_or(too_small)?;

        let (first, rest) = memory.bytes.split_at_mut(frame);
        let second = &mut rest[..frame];

        Ok(FlipController {
            buffers: [
                FrameBuffer { pixels: first, address: memory.base },
                FrameBuffer { pixels: second, address: back_address },
            ],
            front: 0,
            geometry,
            policy,
            state: FlipState::Idle,
            flips: 0,
        })
    }

    #[inline]
    pub fn state(&self) -> FlipState {
        self.state
    }

    #[inline]
    pub fn policy(&self) -> FlipPolicy {
        self.policy
    }

    /// Completed swaps since init
    #[inline]
    pub fn flips(&self) -> u32 {
        self.flips
    }

    #[inline]
    pub fn front_address(&self) -> u32 {
        self.buffers[self.front].address
    }

    #[inline]
    pub fn back_address(&self) -> u32 {
        self.buffers[self.front ^ 1].address
    }

    /// Pixels currently on screen (read-only)
    #[inline]
    pub fn front_pixels(&self) -> &[u8] {
        &self.buffers[self.front].pixels[..]
    }

    /// Drawing surface for this tick
    pub fn current_back_buffer(&mut self) -> FrameView<'_> {
        self.state = FlipState::Idle;
        let Geometry { width, height } = self.geometry;
        let back = &mut self.buffers[self.front ^ 1];
        FrameView::fit(back.pixels, width, height)
    }

    /// Fill both frames; only used before the display is running
    pub fn clear_all(&mut self, color: u8) {
        for buffer in &mut self.buffers {
            buffer.pixels.fill(color);
        }
    }

    /// Make the controller scan out the current front buffer
    ///
    /// Used once at init so the display starts on a known, cleared frame.
    pub fn show_front<P: HardwarePort + ?Sized>(&mut self, port: &mut P) -> Result<u32, FlipError> {
        compiler_fence(Ordering::SeqCst);
        port.start_flip(self.front_address());
        port.wait_flip(self.policy)
    }

    /// Present the back buffer and swap roles
    ///
    /// Returns the number of busy polls. On error the labels are left as
    /// they were: the old front buffer is still the one on screen as far as
    /// the engine knows.
    pub fn publish<P: HardwarePort + ?Sized>(&mut self, port: &mut P) -> Result<u32, FlipError> {
        // Every pixel store of the frame must be issued before the command.
        compiler_fence(Ordering::SeqCst);

        self.state = FlipState::FlipPending;
        port.start_flip(self.back_address());
        let polls = port.wait_flip(self.policy)?;

        self.front ^= 1;
        self.flips = self.flips.wrapping_add(1);
        self.state = FlipState::Swapped;
        Ok(polls)
    }
}
