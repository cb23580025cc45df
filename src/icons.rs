//! Weather condition icons.
//!
//! OpenWeather reports conditions as a two-digit code plus a `d`/`n`
//! suffix (`"13d"` = snow, daytime). The sprite sheet holds 16x16 tiles in
//! the same order as [`ICON_CODES`]: day and night interleaved, one
//! condition per row.

use crate::Color;
use image::{ImageReader, RgbImage};
use std::path::Path;

pub const TILE_SIZE: u32 = 16;

/// Icon codes in sprite-sheet order; the position is the tile index.
pub const ICON_CODES: [&str; 18] = [
    "01d", "01n", // clear
    "02d", "02n", // partly cloudy
    "03d", "03n", // cloudy
    "04d", "04n", // broken clouds
    "09d", "09n", // shower rain
    "10d", "10n", // rain
    "11d", "11n", // thunderstorm
    "13d", "13n", // snow
    "50d", "50n", // mist
];

/// The tile shown when a code is not recognised at all.
pub const DEFAULT_ICON: usize = 0;

/// Resolve an icon code to a tile index.
///
/// Precedence:
/// 1. an exact match (`"10n"`),
/// 2. the daytime variant of the same condition (`"10x"` → `"10d"`),
/// 3. [`DEFAULT_ICON`] (clear day).
pub fn icon_index(code: &str) -> usize {
    exact(code)
        .or_else(|| {
            let condition = code.get(..2)?;
            exact(&format!("{condition}d"))
        })
        .unwrap_or(DEFAULT_ICON)
}

fn exact(code: &str) -> Option<usize> {
    ICON_CODES.iter().position(|c| *c == code)
}

// ── Sprite sheet ─────────────────────────────────────────────────────

/// A decoded sprite sheet of 16x16 weather icons.
pub struct IconSheet {
    image: RgbImage,
}

impl IconSheet {
    /// Load a BMP or PNG sprite sheet from disk.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let image = ImageReader::open(path)?.decode()?.to_rgb8();
        let sheet = Self::from_image(image);
        if sheet.tile_count() == 0 {
            return Err(format!(
                "{} is smaller than one {TILE_SIZE}x{TILE_SIZE} tile",
                path.display()
            )
            .into());
        }
        Ok(sheet)
    }

    pub fn from_image(image: RgbImage) -> Self {
        Self { image }
    }

    fn tiles_per_row(&self) -> u32 {
        self.image.width() / TILE_SIZE
    }

    pub fn tile_count(&self) -> usize {
        (self.tiles_per_row() * (self.image.height() / TILE_SIZE)) as usize
    }

    /// Lit pixels of tile `index` as `(x, y, color)` relative to the
    /// tile's top-left corner. Black pixels are left out, and an index
    /// past the end of the sheet yields nothing.
    pub fn tile_pixels(&self, index: usize) -> impl Iterator<Item = (u32, u32, Color)> + '_ {
        let per_row = self.tiles_per_row().max(1) as usize;
        let in_range = index < self.tile_count();
        let origin_x = (index % per_row) as u32 * TILE_SIZE;
        let origin_y = (index / per_row) as u32 * TILE_SIZE;
        let size = if in_range { TILE_SIZE } else { 0 };

        (0..size).flat_map(move |y| {
            (0..size).filter_map(move |x| {
                let px = self.image.get_pixel(origin_x + x, origin_y + y);
                let color = Color::new(px[0], px[1], px[2]);
                (!color.is_black()).then_some((x, y, color))
            })
        })
    }
}
