//! Drawing surface over one 8-bit frame buffer
//!
//! Pixels are one palette byte each, row-major, `width` bytes per row. Every
//! primitive clips against the surface; nothing is ever written outside the
//! `width * height` bytes the view was created over.

use crate::types::Rect;

/// Mutable view of one frame buffer
pub struct FrameView<'a> {
    pixels: &'a mut [u8],
    width: u32,
    height: u32,
    written: u32,
}

impl<'a> FrameView<'a> {
    /// Wrap the first `width * height` bytes of `pixels`
    ///
    /// Returns `None` if the slice is too short.
    pub fn new(pixels: &'a mut [u8], width: u32, height: u32) -> Option<Self> {
        let len = (width as usize).checked_mul(height as usize)?;
        let pixels = pixels.get_mut(..len)?;
        Some(FrameView { pixels, width, height, written: 0 })
    }

    /// Wrap `pixels`, dropping rows the slice is too short to hold
    pub fn fit(pixels: &'a mut [u8], width: u32, height: u32) -> Self {
        let rows = match width {
            0 => 0,
            w => (pixels.len() / w as usize).min(height as usize) as u32,
        };
        let len = width as usize * rows as usize;
        FrameView { pixels: &mut pixels[..len], width, height: rows, written: 0 }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw pixel bytes
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels[..]
    }

    /// Pixel at `(x, y)`, `None` outside the surface
    pub fn pixel(&self, x: i32, y: i32) -> Option<u8> {
        let index = self.index(x, y)?;
        Some(self.pixels[index])
    }

    /// Pixel writes issued through this view so far
    #[inline]
    pub fn pixels_written(&self) -> u32 {
        self.written
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = u32::try_from(x).ok().filter(|&x| x < self.width)?;
        let y = u32::try_from(y).ok().filter(|&y| y < self.height)?;
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Fill the whole surface
    pub fn clear(&mut self, color: u8) {
        self.pixels.fill(color);
        self.written = self.written.saturating_add(self.pixels.len() as u32);
    }

    /// Set a single pixel, ignoring coordinates outside the surface
    pub fn put_pixel(&mut self, x: i32, y: i32, color: u8) {
        if let Some(index) = self.index(x, y) {
            self.pixels[index] = color;
            self.written = self.written.saturating_add(1);
        }
    }

    /// Fill a rectangle, clipped to the surface on every edge
    pub fn fill_rect(&mut self, rect: Rect, color: u8) {
        let Some(clipped) = rect.clip_to(self.width, self.height) else {
            return;
        };
        let stride = self.width as usize;
        let x0 = clipped.x as usize;
        let x1 = x0 + clipped.width as usize;
        for y in clipped.y..clipped.bottom() {
            let row = y as usize * stride;
            self.pixels[row + x0..row + x1].fill(color);
        }
        self.written = self.written.saturating_add(clipped.area());
    }
}
