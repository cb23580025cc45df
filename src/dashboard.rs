//! Everything the panel shows, as plain data.
//!
//! The scheduler updates a [`Dashboard`]; a [`Surface`](crate::surface::Surface)
//! turns it into pixels. Nothing in here knows about the LED hardware.

use crate::Color;
use crate::clock::ClockState;
use crate::icons::{DEFAULT_ICON, icon_index};
use crate::spectrum::label_color;
use crate::sun_path::{SunPathBuffer, draw_sun_path};
use crate::temp_range::{TempRangeBuffer, draw_temp_range};
use crate::weather::WeatherReading;

/// Fixed positions on the 64x32 panel. Label positions are text baselines,
/// everything else is a top-left corner.
pub mod layout {
    pub const TIME_LABEL: (i32, i32) = (2, 10);
    pub const TEMP_LABEL: (i32, i32) = (5, 27);
    pub const ICON: (i32, i32) = (44, 0);
    pub const TEMP_RANGE: (i32, i32) = (2, 16);
    pub const SUN_PATH: (i32, i32) = (42, 22);
    pub const LOADING_DOT: (i32, i32) = (63, 0);
}

#[derive(Clone, Debug, PartialEq)]
pub struct Dashboard {
    pub time_label: String,
    pub temp_label: String,
    pub temp_color: Color,
    /// Tile index into the icon sprite sheet
    pub icon: usize,
    pub temp_range: TempRangeBuffer,
    pub sun_path: SunPathBuffer,
}

impl Dashboard {
    /// Placeholder contents shown before the first reading arrives.
    pub fn new() -> Self {
        Self {
            time_label: "00:00".to_string(),
            temp_label: "--°F".to_string(),
            temp_color: Color::WHITE,
            icon: DEFAULT_ICON,
            temp_range: TempRangeBuffer::new(),
            sun_path: SunPathBuffer::new(),
        }
    }

    pub fn show_time(&mut self, clock: ClockState) {
        self.time_label = clock.to_string();
    }

    /// Redraw every weather-derived widget from `reading`.
    pub fn show_weather(&mut self, reading: &WeatherReading) {
        self.icon = icon_index(&reading.icon_code);
        self.temp_label = format!("{}°F", reading.temperature_f);
        self.temp_color = label_color(reading.temperature_f);
        draw_sun_path(
            &mut self.sun_path,
            reading.observed_at,
            reading.sunrise,
            reading.sunset,
        );
        draw_temp_range(
            &mut self.temp_range,
            reading.temperature_f,
            reading.daily_min,
            reading.daily_max,
        );
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}
