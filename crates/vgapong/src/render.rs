//! Renderer
//!
//! Draws a [`GameState`] into whatever back buffer the flip controller hands
//! out for the tick. The renderer never talks to the hardware.
//!
//! Layers, back to front: background, optional centre net, paddles, ball,
//! score indicator, and the winner banner once the game is over.

use crate::font;
use crate::frame::FrameView;
use crate::game::GameState;
use crate::types::{Rect, Side};

/// Score indicator style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScoreStyle {
    /// One 8x8 block per point, growing inward from each top corner
    #[default]
    Pips,
    /// Decimal digits centred over each half
    Digits,
}

/// Palette indices used by the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: u8,
    pub paddle: u8,
    pub ball: u8,
    pub score: u8,
    pub text: u8,
    pub net: u8,
}

impl Palette {
    /// Black field, white paddles, grey ball
    pub const DEFAULT: Palette = Palette {
        background: 0x00,
        paddle: 0xFF,
        ball: 0xAA,
        score: 0xFF,
        text: 0xFF,
        net: 0x49,
    };
}

impl Default for Palette {
    fn default() -> Self {
        Palette::DEFAULT
    }
}

/// Scene options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub score_style: ScoreStyle,
    /// Draw a dashed line down the middle
    pub center_net: bool,
    pub palette: Palette,
}

impl RenderOptions {
    pub const DEFAULT: RenderOptions = RenderOptions {
        score_style: ScoreStyle::Pips,
        center_net: false,
        palette: Palette::DEFAULT,
    };
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions::DEFAULT
    }
}

/// Pip layout
pub const PIP_SIZE: i32 = 8;
pub const PIP_PITCH: i32 = 10;
pub const PIP_INSET: i32 = 30;
pub const PIP_TOP: i32 = 8;

/// Digit score layout
pub const DIGIT_SCALE: i32 = 2;
pub const DIGIT_TOP: i32 = 8;

/// Net layout
pub const NET_WIDTH: i32 = 4;
pub const NET_DASH: i32 = 16;
pub const NET_PITCH: i32 = 24;

const LEFT_WON: &str = "PLAYER 1 WON!";
const RIGHT_WON: &str = "PLAYER 2 WON!";

/// Winner banner for `side`
pub const fn winner_message(side: Side) -> &'static str {
    match side {
        Side::Left => LEFT_WON,
        Side::Right => RIGHT_WON,
    }
}

/// Work done by one [`Renderer::render`] call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub pixels_written: u32,
}

/// Scene renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    options: RenderOptions,
}

impl Renderer {
    pub const fn new(options: RenderOptions) -> Self {
        Renderer { options }
    }

    pub const fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Draw the full scene into `target`
    pub fn render(&self, state: &GameState, target: &mut FrameView<'_>) -> RenderStats {
        let palette = &self.options.palette;
        let before = target.pixels_written();

        target.clear(palette.background);

        if self.options.center_net {
            draw_net(target, palette.net);
        }

        target.fill_rect(state.left.rect(), palette.paddle);
        target.fill_rect(state.right.rect(), palette.paddle);
        target.fill_rect(state.ball.rect(), palette.ball);

        match self.options.score_style {
            ScoreStyle::Pips => draw_pips(target, state, palette.score),
            ScoreStyle::Digits => draw_digits(target, state, palette.score),
        }

        if let (true, Some(winner)) = (state.score.game_over, state.score.winner) {
            let message = winner_message(winner);
            let width = font::text_width(message.len(), 1);
            let x = (target.width() as i32 - width) / 2;
            let y = target.height() as i32 / 4;
            draw_text(target, x, y, message.chars(), 1, palette.text);
        }

        RenderStats {
            pixels_written: target.pixels_written() - before,
        }
    }
}

fn draw_net(target: &mut FrameView<'_>, color: u8) {
    let x = target.width() as i32 / 2 - NET_WIDTH / 2;
    let mut y = 0;
    while y < target.height() as i32 {
        target.fill_rect(Rect::new(x, y, NET_WIDTH, NET_DASH), color);
        y += NET_PITCH;
    }
}

/// Top-left corner of pip `index` for `side`
pub fn pip_rect(side: Side, index: u8, screen_width: i32) -> Rect {
    let offset = PIP_INSET + i32::from(index) * PIP_PITCH;
    let x = match side {
        Side::Left => offset,
        Side::Right => screen_width - offset - PIP_SIZE,
    };
    Rect::new(x, PIP_TOP, PIP_SIZE, PIP_SIZE)
}

fn draw_pips(target: &mut FrameView<'_>, state: &GameState, color: u8) {
    let width = target.width() as i32;
    for side in [Side::Left, Side::Right] {
        for i in 0..state.score.of(side) {
            target.fill_rect(pip_rect(side, i, width), color);
        }
    }
}

/// Decimal digits of `n`, most significant first
fn decimal(n: u8, buf: &mut [char; 3]) -> &[char] {
    let digit = |d: u8| char::from(b'0' + d);
    if n >= 100 {
        *buf = [digit(n / 100), digit(n / 10 % 10), digit(n % 10)];
        &buf[..]
    } else if n >= 10 {
        buf[0] = digit(n / 10);
        buf[1] = digit(n % 10);
        &buf[..2]
    } else {
        buf[0] = digit(n);
        &buf[..1]
    }
}

fn draw_digits(target: &mut FrameView<'_>, state: &GameState, color: u8) {
    let width = target.width() as i32;
    for (side, centre) in [(Side::Left, width / 4), (Side::Right, width * 3 / 4)] {
        let mut buf = ['0'; 3];
        let digits = decimal(state.score.of(side), &mut buf);
        let x = centre - font::text_width(digits.len(), DIGIT_SCALE) / 2;
        draw_text(target, x, DIGIT_TOP, digits.iter().copied(), DIGIT_SCALE, color);
    }
}

/// Draw a string with the 5x7 font, each font pixel `scale` screen pixels wide
///
/// Characters without a glyph leave a blank cell.
pub fn draw_text<I>(target: &mut FrameView<'_>, x: i32, y: i32, text: I, scale: i32, color: u8)
where
    I: IntoIterator<Item = char>,
{
    let mut cx = x;
    for c in text {
        if let Some(rows) = font::glyph(c) {
            for (row, bits) in rows.iter().enumerate() {
                for col in 0..font::GLYPH_WIDTH {
                    if bits & (1 << (font::GLYPH_WIDTH - 1 - col)) == 0 {
                        continue;
                    }
                    let px = cx + col * scale;
                    let py = y + row as i32 * scale;
                    if scale == 1 {
                        target.put_pixel(px, py, color);
                    } else {
                        target.fill_rect(Rect::new(px, py, scale, scale), color);
                    }
                }
            }
        }
        cx += font::ADVANCE * scale;
    }
}
