//! Indexed pixel buffers and the palettes they are drawn with.
//!
//! Widgets do not store RGB. They write small palette indices into a
//! fixed-size [`PixelBuffer`], and the display layer looks each index up in
//! the widget's [`Palette`] when painting. Index 0 is always transparent.

use crate::Color;
use crate::spectrum::{COLD_F, HOT_F, color_for};
use std::fmt;

// ── Pixel buffer ─────────────────────────────────────────────────────

/// A `W x H` grid of palette indices.
///
/// # Rust concept: const generics
/// The dimensions are part of the type, so a 2x16 temperature bar can
/// never be passed where the 20x16 sun path is expected.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer<const W: usize, const H: usize> {
    pixels: [[u8; W]; H],
}

impl<const W: usize, const H: usize> PixelBuffer<W, H> {
    pub fn new() -> Self {
        Self {
            pixels: [[0; W]; H],
        }
    }

    pub fn fill(&mut self, index: u8) {
        for row in &mut self.pixels {
            row.fill(index);
        }
    }

    pub fn clear(&mut self) {
        self.fill(0);
    }

    /// Index at `(x, y)`, or `None` when out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.pixels.get(y).and_then(|row| row.get(x)).copied()
    }

    /// Write `index` at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, x: usize, y: usize, index: u8) {
        if let Some(px) = self.pixels.get_mut(y).and_then(|row| row.get_mut(x)) {
            *px = index;
        }
    }

    pub fn fill_row(&mut self, y: usize, index: u8) {
        if let Some(row) = self.pixels.get_mut(y) {
            row.fill(index);
        }
    }

    pub fn row(&self, y: usize) -> Option<&[u8; W]> {
        self.pixels.get(y)
    }

    /// Every non-transparent pixel as `(x, y, index)`.
    pub fn painted(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        self.pixels.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|(_, index)| **index != 0)
                .map(move |(x, index)| (x, y, *index))
        })
    }
}

impl<const W: usize, const H: usize> Default for PixelBuffer<W, H> {
    fn default() -> Self {
        Self::new()
    }
}

/// One line per row, one hex digit per pixel, `.` for transparent.
/// Used for debug logging on the headless surface and in test failures.
impl<const W: usize, const H: usize> fmt::Display for PixelBuffer<W, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.pixels {
            for &index in row {
                match index {
                    0 => write!(f, ".")?,
                    i => write!(f, "{i:x}")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl<const W: usize, const H: usize> fmt::Debug for PixelBuffer<W, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PixelBuffer<{W}x{H}>")?;
        fmt::Display::fmt(self, f)
    }
}

// ── Palette ──────────────────────────────────────────────────────────

/// An ordered color table. Index 0 is transparent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Color>,
}

impl Palette {
    pub fn new(colors: Vec<Color>) -> Self {
        Self { colors }
    }

    /// Color for `index`. Transparent and unknown indices yield `None`.
    pub fn color(&self, index: u8) -> Option<Color> {
        match index {
            0 => None,
            i => self.colors.get(usize::from(i)).copied(),
        }
    }
}

// ── Temperature range palette ────────────────────────────────────────

/// Number of gradient bins in the temperature bar (indices 1..=12).
pub const TEMP_BINS: u8 = 12;
/// Reserved for min/max tick marks.
pub const TEMP_MIN_MAX_MARKER: u8 = 13;
/// Row marking the current temperature.
pub const TEMP_CURRENT_MARKER: u8 = 14;

/// 16-entry palette for the temperature bar.
///
/// Bin `i` (counting from the cold end) is stored at index `12 - i`, so
/// index 1 is the hottest color and index 12 the coldest.
pub fn temp_range_palette() -> Palette {
    let mut colors = vec![Color::BLACK; 16];
    let bins = f64::from(TEMP_BINS);
    for i in 0..TEMP_BINS {
        let temp = COLD_F + f64::from(i) * (HOT_F - COLD_F) / (bins - 1.0);
        colors[usize::from(TEMP_BINS - i)] = Color::from_rgb24(color_for(temp));
    }
    colors[usize::from(TEMP_MIN_MAX_MARKER)] = Color::WHITE;
    colors[usize::from(TEMP_CURRENT_MARKER)] = Color::WHITE;
    Palette::new(colors)
}

// ── Sun path palette ─────────────────────────────────────────────────

pub const SUN_ARC: u8 = 1;
pub const SUN_CORE: u8 = 2;
/// Orthogonal neighbours of the sun.
pub const SUN_GLOW_INNER: u8 = 3;
/// Diagonal neighbours of the sun.
pub const SUN_GLOW_OUTER: u8 = 4;

pub fn sun_palette() -> Palette {
    Palette::new(vec![
        Color::BLACK,
        Color::from_rgb24(0x444444),
        Color::from_rgb24(0xFFAA00),
        Color::from_rgb24(0xCC7A00),
        Color::from_rgb24(0x553300),
    ])
}
