//! The day's temperature range as a vertical gradient bar.
//!
//! The bar spans rows [`TOP`]..=[`BOTTOM`]: the top row is the day's high,
//! the bottom row the day's low. Each row is colored by the temperature it
//! represents, and the current temperature is drawn as a white row on top.

use crate::palette::{PixelBuffer, TEMP_BINS, TEMP_CURRENT_MARKER};
use crate::spectrum::{COLD_F, HOT_F};

pub const WIDTH: usize = 2;
pub const HEIGHT: usize = 16;
/// First row of the bar (daily max).
pub const TOP: usize = 2;
/// Last row of the bar (daily min).
pub const BOTTOM: usize = 13;

pub type TempRangeBuffer = PixelBuffer<WIDTH, HEIGHT>;

/// Palette bin for a temperature: 1 for the hottest, 12 for the coldest.
pub fn bin_for(temp_f: f64) -> u8 {
    let bins = f64::from(TEMP_BINS);
    let raw = bins - (temp_f - COLD_F) * (bins - 1.0) / (HOT_F - COLD_F);
    raw.round().clamp(1.0, bins) as u8
}

/// Redraw the whole bar for `current` within the day's `[min, max]`.
///
/// Bounds given in the wrong order are swapped. When `min == max` the bar
/// is flat: every row gets the same bin and the marker sits at the bottom
/// unless `current` is above the range.
pub fn draw_temp_range(buf: &mut TempRangeBuffer, current: i32, min: i32, max: i32) {
    buf.clear();

    let (low, high) = if min <= max { (min, max) } else { (max, min) };

    if low == high {
        let index = bin_for(f64::from(low));
        for y in TOP..=BOTTOM {
            buf.fill_row(y, index);
        }
        let marker = if current > high { TOP } else { BOTTOM };
        buf.fill_row(marker, TEMP_CURRENT_MARKER);
        return;
    }

    let low = f64::from(low);
    let high = f64::from(high);
    let scale = (BOTTOM - TOP) as f64 / (high - low);

    for y in TOP..=BOTTOM {
        let temp = high - (y - TOP) as f64 / scale;
        buf.fill_row(y, bin_for(temp));
    }

    buf.fill_row(marker_row(f64::from(current), low, scale), TEMP_CURRENT_MARKER);
}

fn marker_row(current: f64, low: f64, scale: f64) -> usize {
    let y = (BOTTOM as f64 - (current - low) * scale).round();
    y.clamp(TOP as f64, BOTTOM as f64) as usize
}

/// Row the current-temperature marker was drawn on, if any.
pub fn find_marker(buf: &TempRangeBuffer) -> Option<usize> {
    (0..HEIGHT).find(|&y| {
        buf.row(y)
            .is_some_and(|row| row.iter().all(|&i| i == TEMP_CURRENT_MARKER))
    })
}
