//! Host-side simulator for the vgapong engine
//!
//! Runs the real dispatcher against [`FakePort`](vgapong::hw::FakePort) so a
//! configuration can be checked against the tick budget, and a game replayed
//! from a script of switch and button levels, without the board.

pub mod report;
pub mod script;
pub mod session;

pub use script::{InputScript, ScriptError, ScriptEvent};
pub use session::{SessionConfig, SessionSummary, run};
