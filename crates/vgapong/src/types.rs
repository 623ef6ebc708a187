//! Common type definitions shared by the simulation and the renderer
//!
//! Everything here is plain screen-space integer math; the board has no FPU
//! and the game never needs sub-pixel positions.

/// One side of the playfield
///
/// The left side belongs to player 1, the right side to player 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// The other side
    #[inline]
    pub const fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Player number shown on screen (1 = left, 2 = right)
    #[inline]
    pub const fn player(self) -> u8 {
        match self {
            Side::Left => 1,
            Side::Right => 2,
        }
    }

    /// Sign of a horizontal velocity heading toward this side
    #[inline]
    pub const fn direction(self) -> i32 {
        match self {
            Side::Left => -1,
            Side::Right => 1,
        }
    }
}

/// Axis-aligned rectangle in screen space
///
/// `width` and `height` may be zero or negative; such rectangles are empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create new rectangle
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect { x, y, width, height }
    }

    /// Exclusive right edge
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Exclusive bottom edge
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Area in pixels (zero for empty rectangles)
    #[inline]
    pub const fn area(&self) -> u32 {
        if self.width <= 0 || self.height <= 0 {
            0
        } else {
            (self.width as u32).saturating_mul(self.height as u32)
        }
    }

    /// Check if point is inside rectangle
    #[inline]
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Intersect with the `[0, width) x [0, height)` surface
    ///
    /// Each edge is clipped on its own, so a rectangle hanging off the top
    /// left corner and one hanging off the bottom right are both trimmed
    /// rather than rejected. Returns `None` when nothing is left.
    pub fn clip_to(&self, width: u32, height: u32) -> Option<Rect> {
        let max_x = i32::try_from(width).unwrap_or(i32::MAX);
        let max_y = i32::try_from(height).unwrap_or(i32::MAX);

        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self.right().min(max_x);
        let y1 = self.bottom().min(max_y);

        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
    }
}
