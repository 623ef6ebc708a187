//! Error types
//!
//! Only initialization can fail in a recoverable way. Once the timer is
//! running, every register access is assumed to succeed; the single runtime
//! failure, a display controller that never finishes a swap, is reported as
//! [`FlipError`](crate::hw::FlipError) and handled by the dispatcher.

use thiserror::Error;

use crate::hw::{FlipError, Geometry};

/// Reasons one-time initialization refuses to start the game
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    #[error("display reported degenerate geometry {width}x{height}")]
    ZeroGeometry { width: u32, height: u32 },

    #[error("rule `{rule}` must be positive, got {value}")]
    InvalidRule { rule: &'static str, value: i32 },

    #[error("display geometry {width}x{height} is too small for the playfield")]
    GeometryTooSmall { width: u32, height: u32 },

    #[error("video memory holds {available} bytes, double buffer needs {required}")]
    BufferTooSmall { required: usize, available: usize },

    #[error("worst-case tick of {cycles} cycles does not fit the timer period of {period} cycles")]
    TickBudgetExceeded { cycles: u64, period: u32 },

    #[error("initial display flip failed: {0}")]
    Flip(#[from] FlipError),
}

impl InitError {
    pub fn zero_geometry(geometry: Geometry) -> Self {
        Self::ZeroGeometry {
            width: geometry.width,
            height: geometry.height,
        }
    }

    pub fn geometry_too_small(geometry: Geometry) -> Self {
        Self::GeometryTooSmall {
            width: geometry.width,
            height: geometry.height,
        }
    }
}

pub type InitResult<T> = Result<T, InitError>;
