//! Where the dashboard ends up.
//!
//! The scheduler only talks to a [`Surface`]. On the Pi that is the LED
//! matrix (`render::MatrixSurface`); without the `hardware` feature it is
//! [`LogSurface`], which writes what would be shown to the log.

use crate::dashboard::Dashboard;

pub trait Surface {
    /// Show or hide the "fetching weather" indicator. Called around the
    /// blocking fetch, so implementations should draw immediately.
    fn set_loading(&mut self, loading: bool);

    /// Draw the whole dashboard.
    fn present(&mut self, dashboard: &Dashboard);
}

/// Headless surface for running without a panel.
#[derive(Default)]
pub struct LogSurface;

impl LogSurface {
    pub fn new() -> Self {
        Self
    }
}

impl Surface for LogSurface {
    fn set_loading(&mut self, loading: bool) {
        if loading {
            tracing::debug!("Fetching weather...");
        }
    }

    fn present(&mut self, dashboard: &Dashboard) {
        tracing::info!(
            "{}  {} (#{:06x})  icon {}",
            dashboard.time_label,
            dashboard.temp_label,
            dashboard.temp_color.to_rgb24(),
            dashboard.icon
        );
        tracing::debug!("Temperature range:\n{}", dashboard.temp_range);
        tracing::debug!("Sun path:\n{}", dashboard.sun_path);
    }
}
