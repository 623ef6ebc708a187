//! Board entry points
//!
//! The boot code installs the trap vector, calls [`labinit`] once and then
//! idles. Every trap afterwards lands in [`handle_interrupt`]. The only
//! interrupt source that is ever enabled is the timer, so the cause is not
//! inspected.

use core::cell::UnsafeCell;

use tracing::error;

use crate::config::GameConfig;
use crate::flip::VideoMemory;
use crate::hw::{HardwarePort, MmioPort};
use crate::tick::{ReentryGuard, TickDispatcher};

unsafe extern "C" {
    /// Unmask interrupts in the CPU; provided by the boot code
    fn enable_interrupt();
}

/// The dispatcher, written once by `labinit` before interrupts are enabled
struct Slot(UnsafeCell<Option<TickDispatcher<'static, MmioPort>>>);

// SAFETY: single core; the slot is written before the interrupt is enabled
// and afterwards only touched by the handler, behind `GUARD`.
unsafe impl Sync for Slot {}

static DISPATCHER: Slot = Slot(UnsafeCell::new(None));
static GUARD: ReentryGuard = ReentryGuard::new();

/// One-time initialization, called by the boot code
///
/// Interrupts are enabled only if the engine came up.
#[unsafe(no_mangle)]
pub extern "C" fn labinit() {
    // SAFETY: we are on the board and nothing else holds the registers or
    // video memory yet.
    let (port, vram) = unsafe { (MmioPort::new(), MmioPort::video_memory()) };
    let config = GameConfig::DEFAULT;
    let memory = VideoMemory::new(vram, config.vram_base);

    match TickDispatcher::init(port, memory, config) {
        Ok(dispatcher) => {
            // SAFETY: the interrupt is still masked, so the handler cannot
            // observe the slot while it is written.
            unsafe { *DISPATCHER.0.get() = Some(dispatcher) };
            // SAFETY: provided by the boot code, called exactly once.
            unsafe { enable_interrupt() };
        }
        Err(err) => error!(error = %err, "initialization failed, interrupts stay masked"),
    }
}

/// Trap handler, called by the boot code for every interrupt
#[unsafe(no_mangle)]
pub extern "C" fn handle_interrupt(_cause: u32) {
    let Some(_token) = GUARD.enter() else {
        // Nested tick: acknowledge so the timer does not fire again at once.
        // SAFETY: a zero-sized handle to the same registers; the outer tick
        // is suspended for the duration of this write.
        unsafe { MmioPort::new() }.ack_timer();
        return;
    };

    // SAFETY: the guard makes this the only live reference to the slot.
    let slot = unsafe { &mut *DISPATCHER.0.get() };
    if let Some(dispatcher) = slot.as_mut() {
        dispatcher.on_timer();
    }
}
