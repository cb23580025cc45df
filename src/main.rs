//! Weather Matrix
//!
//! Shows the time, current temperature, condition icon, the day's
//! temperature range and the sun's position on a 64x32 LED panel.
//!
//! ## Architecture
//! A single thread runs a polling loop. Each iteration asks the
//! `RefreshScheduler` whether the clock or the weather is due; the scheduler
//! fetches (blocking) when needed and hands the dashboard to the surface.
//!
//! Without the `hardware` feature the dashboard is written to the log
//! instead, which is handy together with `--fake-data`.
//!
//! ## Usage
//! ```sh
//! sudo ./target/release/weather-matrix --secrets secrets.json --fonts-dir fonts/bdf
//! cargo run --no-default-features -- --fake-data
//! ```

use clap::Parser;
use std::process::ExitCode;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use weather_matrix::config::{Args, Config};
use weather_matrix::scheduler::RefreshScheduler;
use weather_matrix::weather::WeatherSource;
use weather_matrix::{is_running, setup_signal_handler};

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false) // Disable ANSI color codes for systemd/journald
        .compact()
        .init();

    let config = match Args::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Weather Matrix v{}", env!("CARGO_PKG_VERSION"));

    let running = setup_signal_handler()?;

    #[cfg(feature = "hardware")]
    let mut surface = weather_matrix::render::MatrixSurface::new(&config.display)?;
    #[cfg(not(feature = "hardware"))]
    let mut surface = weather_matrix::surface::LogSurface::new();

    let source = WeatherSource::from_config(&config.source)?;
    let mut scheduler = RefreshScheduler::new(source, config.intervals, config.utc_offset_seconds);
    scheduler.start(Instant::now(), &mut surface);

    while is_running(&running) {
        scheduler.tick(Instant::now(), &mut surface);
        if !config.poll_interval.is_zero() {
            std::thread::sleep(config.poll_interval);
        }
    }

    tracing::info!("Shutting down.");
    Ok(())
}
