//! Frame dumps and text summaries

use std::fmt;
use std::io::{self, Write};

use vgapong::hw::Geometry;

use crate::session::SessionSummary;

/// Write `pixels` as a binary greyscale PGM (P5)
pub fn write_pgm<W: Write>(mut out: W, geometry: Geometry, pixels: &[u8]) -> io::Result<()> {
    let frame = geometry.frame_bytes();
    if pixels.len() < frame {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("frame holds {} bytes, {}x{} needs {frame}", pixels.len(), geometry.width, geometry.height),
        ));
    }
    write!(out, "P5\n{} {}\n255\n", geometry.width, geometry.height)?;
    out.write_all(&pixels[..frame])?;
    out.flush()
}

/// Coarse text rendering of a frame, at most `columns` characters wide
///
/// Each character covers a block of pixels and is `#` if any of them
/// differs from `background`. Blocks are twice as tall as wide to
/// compensate for terminal cell shape.
pub fn ascii_preview(geometry: Geometry, pixels: &[u8], background: u8, columns: u32) -> String {
    let Geometry { width, height } = geometry;
    let mut text = String::new();
    if width == 0 || height == 0 || columns == 0 {
        return text;
    }

    let block_w = width.div_ceil(columns) as usize;
    let block_h = block_w * 2;
    let (width, height) = (width as usize, height as usize);

    for top in (0..height).step_by(block_h) {
        for left in (0..width).step_by(block_w) {
            let lit = (top..(top + block_h).min(height)).any(|y| {
                let row = y * width;
                pixels
                    .get(row + left..row + (left + block_w).min(width))
                    .is_some_and(|span| span.iter().any(|&p| p != background))
            });
            text.push(if lit { '#' } else { '.' });
        }
        text.push('\n');
    }
    text
}

/// Human-readable run summary
pub fn summary_text(summary: &SessionSummary) -> String {
    summary.to_string()
}

/// Write the run summary, one `name: value` line per field
pub fn write_summary<W: fmt::Write>(out: &mut W, summary: &SessionSummary) -> fmt::Result {
    let score = &summary.score;
    writeln!(out, "ticks:        {}", summary.ticks)?;
    writeln!(out, "flips:        {}", summary.flips)?;
    writeln!(out, "score:        {} - {}", score.left, score.right)?;
    match summary.winner() {
        Some(side) => writeln!(out, "winner:       player {}", side.player())?,
        None => writeln!(out, "winner:       none")?,
    }
    writeln!(
        out,
        "worst tick:   {} cycles of {} ({:.1}%)",
        summary.max_tick_cycles,
        summary.period,
        percent(summary.max_tick_cycles, summary.period)
    )?;
    writeln!(out, "over budget:  {}", summary.over_budget)?;
    if let Some(err) = summary.halted {
        writeln!(out, "halted:       {err}")?;
    }
    Ok(())
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_summary(f, self)
    }
}

fn percent(cycles: u64, period: u32) -> f64 {
    if period == 0 {
        return f64::INFINITY;
    }
    cycles as f64 * 100.0 / f64::from(period)
}
