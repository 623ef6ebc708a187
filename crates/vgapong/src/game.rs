//! Simulation Engine
//!
//! [`GameState`] is the single aggregate the tick mutates: two paddles, the
//! ball and the score. [`GameState::step`] advances it by one tick given an
//! [`InputSnapshot`].
//!
//! Order inside a tick:
//!
//! 1. reset input wins over everything else and ends the tick
//! 2. a finished game is frozen
//! 3. paddles move one step (up beats down), clamped to the screen
//! 4. ball moves, bounces off the top and bottom walls, then off a paddle
//! 5. a ball leaving the screen scores for the opposite side
//!
//! Score state machine: `Playing --(win threshold)--> GameOver --(reset)--> Playing`.

use crate::error::{InitError, InitResult};
use crate::hw::Geometry;
use crate::input::InputSnapshot;
use crate::types::{Rect, Side};

/// Playfield dimensions and speeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub paddle_width: i32,
    pub paddle_height: i32,
    /// Gap between the screen edge and a paddle's outer edge
    pub paddle_margin: i32,
    /// Pixels a paddle moves per tick
    pub paddle_step: i32,
    /// Side of the square ball
    pub ball_size: i32,
    /// Horizontal ball speed in pixels per tick
    pub ball_step_x: i32,
    /// Vertical ball speed in pixels per tick
    pub ball_step_y: i32,
    /// Points needed to win
    pub win_threshold: u8,
    /// Also centre both paddles when a point is scored, not only on reset
    pub recentre_paddles_on_point: bool,
}

impl Rules {
    /// Board defaults
    pub const DEFAULT: Rules = Rules {
        paddle_width: 5,
        paddle_height: 40,
        paddle_margin: 10,
        paddle_step: 5,
        ball_size: 5,
        ball_step_x: 3,
        ball_step_y: 3,
        win_threshold: 5,
        recentre_paddles_on_point: false,
    };

    /// Reject sizes and speeds the simulation cannot use
    ///
    /// Sizes, the paddle step and both ball steps must be positive; the
    /// direction of travel comes from the serve, never from the sign of a
    /// step. The margin may be zero.
    pub fn validate(&self) -> InitResult<()> {
        let positive = [
            ("paddle_width", self.paddle_width),
            ("paddle_height", self.paddle_height),
            ("paddle_step", self.paddle_step),
            ("ball_size", self.ball_size),
            ("ball_step_x", self.ball_step_x),
            ("ball_step_y", self.ball_step_y),
            ("win_threshold", i32::from(self.win_threshold)),
        ];
        if let Some(&(rule, value)) = positive.iter().find(|(_, value)| *value <= 0) {
            return Err(InitError::InvalidRule { rule, value });
        }
        if self.paddle_margin < 0 {
            return Err(InitError::InvalidRule { rule: "paddle_margin", value: self.paddle_margin });
        }
        Ok(())
    }

    /// Whether the playfield fits on a screen of this size
    ///
    /// Both paddles, their margins and a ball must fit side by side, and a
    /// paddle must fit vertically.
    pub fn fits(&self, geometry: Geometry) -> bool {
        let needed_width = 2 * (self.paddle_margin + self.paddle_width) + self.ball_size;
        i32::try_from(geometry.width).is_ok_and(|w| w > needed_width)
            && i32::try_from(geometry.height)
                .is_ok_and(|h| h >= self.paddle_height && h >= self.ball_size)
    }
}

impl Default for Rules {
    fn default() -> Self {
        Rules::DEFAULT
    }
}

/// One paddle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paddle {
    pub side: Side,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Paddle {
    fn new(side: Side, geometry: Geometry, rules: &Rules) -> Self {
        let x = match side {
            Side::Left => rules.paddle_margin,
            Side::Right => geometry.w() - rules.paddle_margin - rules.paddle_width,
        };
        Paddle {
            side,
            x,
            y: centred(geometry.h(), rules.paddle_height),
            width: rules.paddle_width,
            height: rules.paddle_height,
        }
    }

    #[inline]
    pub const fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    /// X coordinate of the edge facing the playfield
    #[inline]
    pub const fn face(&self) -> i32 {
        match self.side {
            Side::Left => self.x + self.width,
            Side::Right => self.x,
        }
    }

    /// Inclusive vertical overlap with `[top, top + size]`
    #[inline]
    fn overlaps_vertically(&self, top: i32, size: i32) -> bool {
        top + size >= self.y && top <= self.y + self.height
    }
}

/// The ball
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ball {
    pub x: i32,
    pub y: i32,
    pub dx: i32,
    pub dy: i32,
    pub size: i32,
}

impl Ball {
    #[inline]
    pub const fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.size, self.size)
    }
}

/// Whether the game is running or waiting for a reset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Playing,
    GameOver,
}

/// Points and win state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Score {
    pub left: u8,
    pub right: u8,
    pub game_over: bool,
    pub winner: Option<Side>,
}

impl Score {
    /// Points of one side
    #[inline]
    pub const fn of(&self, side: Side) -> u8 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub const fn phase(&self) -> Phase {
        if self.game_over { Phase::GameOver } else { Phase::Playing }
    }

    fn award(&mut self, side: Side, threshold: u8) -> bool {
        let points = match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        };
        *points = points.saturating_add(1);
        if *points >= threshold {
            self.game_over = true;
            self.winner = Some(side);
        }
        self.game_over
    }
}

/// Things that happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(transparent)]
pub struct TickEvents(pub u8);

impl TickEvents {
    pub const NONE: TickEvents = TickEvents(0);
    /// Reset input honoured
    pub const RESET: TickEvents = TickEvents(1 << 0);
    /// Ball bounced off the top or bottom wall
    pub const WALL_BOUNCE: TickEvents = TickEvents(1 << 1);
    /// Ball bounced off a paddle
    pub const PADDLE_HIT: TickEvents = TickEvents(1 << 2);
    /// A point was scored
    pub const POINT: TickEvents = TickEvents(1 << 3);
    /// The point ended the game
    pub const GAME_WON: TickEvents = TickEvents(1 << 4);
    /// Nothing moved because the game is over
    pub const FROZEN: TickEvents = TickEvents(1 << 5);

    #[inline]
    pub const fn contains(self, other: TickEvents) -> bool {
        (self.0 & other.0) == other.0 && other.0 != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl core::ops::BitOr for TickEvents {
    type Output = TickEvents;
    fn bitor(self, other: TickEvents) -> TickEvents {
        TickEvents(self.0 | other.0)
    }
}

impl core::ops::BitOrAssign for TickEvents {
    fn bitor_assign(&mut self, other: TickEvents) {
        self.0 |= other.0;
    }
}

/// Complete simulation state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    geometry: Geometry,
    rules: Rules,
    pub left: Paddle,
    pub right: Paddle,
    pub ball: Ball,
    pub score: Score,
    last_serve: Side,
}

#[inline]
const fn centred(extent: i32, size: i32) -> i32 {
    extent / 2 - size / 2
}

impl GameState {
    /// Fresh game, equivalent to a reset
    ///
    /// The first serve heads right.
    pub fn new(geometry: Geometry, rules: Rules) -> Self {
        let mut state = GameState {
            geometry,
            rules,
            left: Paddle::new(Side::Left, geometry, &rules),
            right: Paddle::new(Side::Right, geometry, &rules),
            ball: Ball { x: 0, y: 0, dx: 0, dy: 0, size: rules.ball_size },
            score: Score::default(),
            last_serve: Side::Left,
        };
        state.reset();
        state
    }

    #[inline]
    pub const fn geometry(&self) -> Geometry {
        self.geometry
    }

    #[inline]
    pub const fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Direction of the most recent serve
    #[inline]
    pub const fn last_serve(&self) -> Side {
        self.last_serve
    }

    #[inline]
    pub const fn paddle(&self, side: Side) -> &Paddle {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Highest y a paddle may take
    #[inline]
    pub fn paddle_limit(&self) -> i32 {
        (self.geometry.h() - self.rules.paddle_height).max(0)
    }

    /// Clear the score, centre the paddles and serve
    ///
    /// The serve heads the other way from the previous one.
    pub fn reset(&mut self) {
        self.score = Score::default();
        self.centre_paddles();
        self.serve(self.last_serve.opposite());
    }

    fn centre_paddles(&mut self) {
        let centre = centred(self.geometry.h(), self.rules.paddle_height);
        self.left.y = centre;
        self.right.y = centre;
    }

    /// Put the ball in the centre heading toward `toward`
    fn serve(&mut self, toward: Side) {
        self.ball.x = centred(self.geometry.w(), self.rules.ball_size);
        self.ball.y = centred(self.geometry.h(), self.rules.ball_size);
        self.ball.dx = toward.direction() * self.rules.ball_step_x;
        self.ball.dy = self.rules.ball_step_y;
        self.last_serve = toward;
    }

    /// Advance one tick
    pub fn step(&mut self, input: &InputSnapshot) -> TickEvents {
        if input.reset {
            self.reset();
            return TickEvents::RESET;
        }
        if self.score.game_over {
            return TickEvents::FROZEN;
        }

        self.move_paddles(input);
        self.move_ball()
    }

    fn move_paddles(&mut self, input: &InputSnapshot) {
        let step = self.rules.paddle_step;
        let limit = self.paddle_limit();
        for (paddle, up, down) in [
            (&mut self.left, input.paddle1_up, input.paddle1_down),
            (&mut self.right, input.paddle2_up, input.paddle2_down),
        ] {
            if up {
                paddle.y -= step;
            } else if down {
                paddle.y += step;
            }
            paddle.y = paddle.y.clamp(0, limit);
        }
    }

    fn move_ball(&mut self) -> TickEvents {
        let mut events = TickEvents::NONE;
        let prev_x = self.ball.x;
        let size = self.ball.size;

        self.ball.x += self.ball.dx;
        self.ball.y += self.ball.dy;

        let floor = (self.geometry.h() - size).max(0);
        if self.ball.y <= 0 {
            self.ball.y = 0;
            self.ball.dy = self.ball.dy.abs();
            events |= TickEvents::WALL_BOUNCE;
        } else if self.ball.y >= floor {
            self.ball.y = floor;
            self.ball.dy = -self.ball.dy.abs();
            events |= TickEvents::WALL_BOUNCE;
        }

        if self.bounce_off_paddles(prev_x) {
            events |= TickEvents::PADDLE_HIT;
        }

        let scorer = if self.ball.x < 0 {
            Some(Side::Right)
        } else if self.ball.x + size > self.geometry.w() {
            Some(Side::Left)
        } else {
            None
        };

        if let Some(side) = scorer {
            events |= TickEvents::POINT;
            if self.score.award(side, self.rules.win_threshold) {
                events |= TickEvents::GAME_WON;
            }
            if self.rules.recentre_paddles_on_point {
                self.centre_paddles();
            }
            // Away from the side that conceded.
            self.serve(side);
        }
        events
    }

    /// Reflect the ball off whichever paddle it reached this tick
    ///
    /// A hit needs the ball's leading edge to have been at or in front of
    /// the paddle face before the move and at or behind it after, with the
    /// vertical extents overlapping. Testing the crossing instead of the
    /// overlap keeps fast balls from skipping a thin paddle.
    fn bounce_off_paddles(&mut self, prev_x: i32) -> bool {
        let size = self.ball.size;

        if self.ball.dx < 0 {
            let face = self.left.face();
            if prev_x >= face
                && self.ball.x <= face
                && self.left.overlaps_vertically(self.ball.y, size)
            {
                self.ball.x = face;
                self.ball.dx = self.ball.dx.abs();
                return true;
            }
        } else if self.ball.dx > 0 {
            let face = self.right.face();
            if prev_x + size <= face
                && self.ball.x + size >= face
                && self.right.overlaps_vertically(self.ball.y, size)
            {
                self.ball.x = face - size;
                self.ball.dx = -self.ball.dx.abs();
                return true;
            }
        }
        false
    }
}
