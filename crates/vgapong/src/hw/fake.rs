//! In-memory stand-in for the board registers
//!
//! The fake models the display controller's swap as taking a fixed number
//! of status polls, and keeps a virtual cycle clock that advances by
//! `cycles_per_poll` for every poll that observes the controller busy. This
//! is what the tick-budget tests measure against.

use super::{Geometry, HardwarePort, RawInput};

/// Fake board with configurable input, resolution and flip latency
#[derive(Debug, Clone)]
pub struct FakePort {
    input: RawInput,
    resolution: u32,
    flip_latency: u32,
    cycles_per_poll: u64,
    stalled: bool,

    busy_remaining: u32,
    pending: Option<u32>,
    displayed: Option<u32>,
    flip_requests: u32,
    flips_completed: u32,

    timer_acks: u32,
    timer_period: Option<u32>,
    timer_ctrl: u32,
    leds: u32,
    clock: u64,
}

impl FakePort {
    /// Fake board reporting `geometry`, instant flips, no input
    pub fn new(geometry: Geometry) -> Self {
        Self::with_resolution_register(geometry.packed())
    }

    /// Fake board with an arbitrary raw resolution register value
    pub fn with_resolution_register(raw: u32) -> Self {
        FakePort {
            input: RawInput::default(),
            resolution: raw,
            flip_latency: 0,
            cycles_per_poll: 1,
            stalled: false,
            busy_remaining: 0,
            pending: None,
            displayed: None,
            flip_requests: 0,
            flips_completed: 0,
            timer_acks: 0,
            timer_period: None,
            timer_ctrl: 0,
            leds: 0,
            clock: 0,
        }
    }

    /// Every flip keeps the status busy for `polls` polls
    pub fn with_flip_latency(mut self, polls: u32) -> Self {
        self.flip_latency = polls;
        self
    }

    /// Each busy poll costs `cycles` on the virtual clock
    pub fn with_cycles_per_poll(mut self, cycles: u64) -> Self {
        self.cycles_per_poll = cycles;
        self
    }

    /// The controller never finishes a swap
    pub fn stalled(mut self) -> Self {
        self.stalled = true;
        self
    }

    /// Make the controller hang (or recover) from the next poll on
    pub fn set_stalled(&mut self, stalled: bool) {
        self.stalled = stalled;
    }

    /// Change the flip latency for subsequent flips
    pub fn set_flip_latency(&mut self, polls: u32) {
        self.flip_latency = polls;
    }

    /// Set the level of the slide switches
    pub fn set_switches(&mut self, switches: u32) {
        self.input.switches = switches;
    }

    /// Set the level of the push buttons
    pub fn set_buttons(&mut self, buttons: u32) {
        self.input.buttons = buttons;
    }

    /// Set both input registers
    pub fn set_input(&mut self, input: RawInput) {
        self.input = input;
    }

    /// Address the controller is currently scanning out, if any swap completed
    pub fn displayed(&self) -> Option<u32> {
        self.displayed
    }

    /// Number of swap commands issued
    pub fn flip_requests(&self) -> u32 {
        self.flip_requests
    }

    /// Number of swaps that completed
    pub fn flips_completed(&self) -> u32 {
        self.flips_completed
    }

    /// Number of timer acknowledgements
    pub fn timer_acks(&self) -> u32 {
        self.timer_acks
    }

    /// Period programmed by the last `configure_timer`
    pub fn timer_period(&self) -> Option<u32> {
        self.timer_period
    }

    /// Last value written to the timer control register
    pub fn timer_ctrl(&self) -> u32 {
        self.timer_ctrl
    }

    /// Last value written to the LED bank
    pub fn leds(&self) -> u32 {
        self.leds
    }

    /// Virtual cycles spent polling the display controller
    pub fn clock(&self) -> u64 {
        self.clock
    }
}

impl HardwarePort for FakePort {
    fn read_input(&mut self) -> RawInput {
        self.input
    }

    fn read_geometry(&mut self) -> Geometry {
        Geometry::from_packed(self.resolution)
    }

    fn ack_timer(&mut self) {
        self.timer_acks += 1;
    }

    fn configure_timer(&mut self, period: u32) {
        self.timer_period = Some(period);
        self.timer_ctrl = super::timer_ctrl::PERIODIC_IRQ;
    }

    fn start_flip(&mut self, buffer_address: u32) {
        self.flip_requests += 1;
        self.pending = Some(buffer_address);
        self.busy_remaining = self.flip_latency;
    }

    fn flip_in_progress(&mut self) -> bool {
        if self.stalled && self.pending.is_some() {
            self.clock += self.cycles_per_poll;
            return true;
        }
        if self.busy_remaining > 0 {
            self.busy_remaining -= 1;
            self.clock += self.cycles_per_poll;
            return true;
        }
        if let Some(address) = self.pending.take() {
            self.displayed = Some(address);
            self.flips_completed += 1;
        }
        false
    }

    fn set_leds(&mut self, bits: u32) {
        self.leds = bits;
    }
}
