//! Temperature to color mapping.
//!
//! Temperatures are mapped onto a purple → blue → green → yellow → dark red
//! spectrum between [`COLD_F`] and [`HOT_F`]. Anything outside that window
//! is pinned to the end colors.

use crate::Color;

/// At or below this temperature the color is pinned to purple.
pub const COLD_F: f64 = 20.0;
/// At or above this temperature the color is pinned to dark red.
pub const HOT_F: f64 = 90.0;

const PURPLE: u32 = 0x800080;
const DARK_RED: u32 = 0x800000;

/// Map a Fahrenheit temperature to a packed `0xRRGGBB` color.
///
/// Within each band the channels are interpolated linearly from
/// `(temp - lower) / band_width` and truncated to 8 bits:
///
/// | band    | red       | green     | blue      |
/// |---------|-----------|-----------|-----------|
/// | 20..35  | 128 → 0   | 0         | 128 → 255 |
/// | 35..50  | 0         | 0 → 255   | 255 → 0   |
/// | 50..70  | 0 → 255   | 255       | 0         |
/// | 70..90  | 255 → 128 | 255 → 0   | 0         |
///
/// # Rust concept: match guards
/// The bands are tried top to bottom; the first guard that holds wins.
/// A NaN fails every comparison and falls through to the cold end.
pub fn color_for(temp_f: f64) -> u32 {
    match temp_f {
        t if t >= HOT_F => DARK_RED,
        t if t < 35.0 && t > COLD_F => {
            let ratio = (t - COLD_F) / 15.0;
            let r = channel(128.0 * (1.0 - ratio));
            let b = channel(128.0 + 127.0 * ratio);
            pack(r, 0, b)
        }
        t if (35.0..50.0).contains(&t) => {
            let ratio = (t - 35.0) / 15.0;
            let g = channel(255.0 * ratio);
            let b = channel(255.0 * (1.0 - ratio));
            pack(0, g, b)
        }
        t if (50.0..70.0).contains(&t) => {
            let ratio = (t - 50.0) / 20.0;
            pack(channel(255.0 * ratio), 255, 0)
        }
        t if (70.0..HOT_F).contains(&t) => {
            let ratio = (t - 70.0) / 20.0;
            let r = channel(255.0 * (1.0 - ratio / 2.0));
            let g = channel(255.0 * (1.0 - ratio));
            pack(r, g, 0)
        }
        _ => PURPLE,
    }
}

/// [`color_for`] as a [`Color`], for drawing labels.
pub fn label_color(temp_f: i32) -> Color {
    Color::from_rgb24(color_for(f64::from(temp_f)))
}

fn channel(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

fn pack(r: u8, g: u8, b: u8) -> u32 {
    Color::new(r, g, b).to_rgb24()
}
