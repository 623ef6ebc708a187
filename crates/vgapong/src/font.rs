//! 5x7 bitmap font
//!
//! Each glyph is seven rows of five bits, most significant of the five bits
//! on the left. Only the characters the game prints are present.

/// Glyph width in font pixels
pub const GLYPH_WIDTH: i32 = 5;
/// Glyph height in font pixels
pub const GLYPH_HEIGHT: i32 = 7;
/// Horizontal advance per character (one column of spacing)
pub const ADVANCE: i32 = 6;

/// Rows of one glyph
pub type Glyph = [u8; 7];

/// Look up the glyph for `c`
pub const fn glyph(c: char) -> Option<&'static Glyph> {
    Some(match c {
        '0' => &[0x1E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x1E],
        '1' => &[0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => &[0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => &[0x1E, 0x01, 0x01, 0x0E, 0x01, 0x01, 0x1E],
        '4' => &[0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => &[0x1F, 0x10, 0x10, 0x1E, 0x01, 0x01, 0x1E],
        '6' => &[0x0E, 0x10, 0x10, 0x1E, 0x11, 0x11, 0x1E],
        '7' => &[0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => &[0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        '9' => &[0x1E, 0x11, 0x11, 0x1F, 0x01, 0x01, 0x0E],
        'A' => &[0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'E' => &[0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'L' => &[0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'N' => &[0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
        'O' => &[0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => &[0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'R' => &[0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => &[0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => &[0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'W' => &[0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'Y' => &[0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04],
        '!' => &[0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        ':' => &[0x00, 0x04, 0x00, 0x00, 0x00, 0x04, 0x00],
        ' ' => &[0x00; 7],
        _ => return None,
    })
}

/// Width in screen pixels of `len` characters at `scale`
///
/// The trailing spacing column of the last character is not counted.
pub const fn text_width(len: usize, scale: i32) -> i32 {
    if len == 0 {
        return 0;
    }
    ((len as i32 - 1) * ADVANCE + GLYPH_WIDTH) * scale
}

/// Lit font pixels of `c` (zero for unknown characters)
pub fn lit_pixels(c: char) -> u32 {
    glyph(c).map_or(0, |rows| rows.iter().map(|row| (row & 0x1F).count_ones()).sum())
}
