//! Sun position along a sunrise-to-sunset arc.
//!
//! The arc is half a sine wave across the buffer. While the sun is up it is
//! drawn as a bright pixel with a two-tier glow, sitting just above the arc
//! at `x = progress * 19`.

use crate::palette::{PixelBuffer, SUN_ARC, SUN_CORE, SUN_GLOW_INNER, SUN_GLOW_OUTER};
use std::f64::consts::PI;

pub const WIDTH: usize = 20;
pub const HEIGHT: usize = 16;

/// Row of the arc's end points.
const BASELINE: f64 = 8.0;
/// Height of the arc above the baseline at its midpoint.
const AMPLITUDE: f64 = 6.0;
/// Rows the sun is lifted above the arc.
const SUN_LIFT: usize = 2;

pub type SunPathBuffer = PixelBuffer<WIDTH, HEIGHT>;

/// Arc row for column `x`.
pub fn arc_y(x: usize) -> usize {
    let last = (WIDTH - 1) as f64;
    let angle = x as f64 / last * PI;
    (BASELINE - AMPLITUDE * angle.sin()).round().max(0.0) as usize
}

/// Where the sun should be drawn, or `None` while it is down.
///
/// An inverted or empty daylight window (`sunset <= sunrise`) never shows
/// the sun.
pub fn sun_position(now: i64, sunrise: i64, sunset: i64) -> Option<(usize, usize)> {
    if sunset <= sunrise || now < sunrise || now > sunset {
        return None;
    }

    // Any pair of i64 timestamps subtracts without overflow in i128.
    let elapsed = i128::from(now) - i128::from(sunrise);
    let daylight = i128::from(sunset) - i128::from(sunrise);
    let progress = (elapsed as f64 / daylight as f64).clamp(0.0, 1.0);
    let x = (progress * (WIDTH - 1) as f64).round() as usize;
    let y = arc_y(x)
        .saturating_sub(SUN_LIFT)
        .clamp(SUN_LIFT, HEIGHT - 2);
    Some((x, y))
}

/// Redraw the arc and, if it is daytime, the sun.
pub fn draw_sun_path(buf: &mut SunPathBuffer, now: i64, sunrise: i64, sunset: i64) {
    buf.clear();

    if let Some((sun_x, sun_y)) = sun_position(now, sunrise, sunset) {
        draw_sun(buf, sun_x, sun_y);
    }

    // The arc only fills pixels the sun left empty.
    for x in 0..WIDTH {
        let y = arc_y(x);
        if buf.get(x, y) == Some(0) {
            buf.set(x, y, SUN_ARC);
        }
    }
}

fn draw_sun(buf: &mut SunPathBuffer, x: usize, y: usize) {
    for dy in -1isize..=1 {
        for dx in -1isize..=1 {
            let (Some(gx), Some(gy)) = (x.checked_add_signed(dx), y.checked_add_signed(dy)) else {
                continue;
            };
            let glow = if dx == 0 || dy == 0 {
                SUN_GLOW_INNER
            } else {
                SUN_GLOW_OUTER
            };
            buf.set(gx, gy, glow);
        }
    }
    buf.set(x, y, SUN_CORE);
}
