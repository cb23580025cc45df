//! Command-line and secrets-file configuration.
//!
//! Everything can be given as a flag. The API key and coordinates can also
//! come from the environment or from a JSON secrets file:
//!
//! ```json
//! { "openweather_token": "...", "lat": 37.21, "long": -80.03, "use_fake_data": false }
//! ```
//!
//! Flags and environment variables win over the secrets file.

use crate::PanelConfig;
use crate::scheduler::Intervals;
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Clock and weather dashboard for a 64x32 RGB LED matrix
#[derive(Parser, Debug)]
#[command(name = "weather-matrix")]
#[command(version)]
pub struct Args {
    /// JSON file with openweather_token, lat, long and use_fake_data
    #[arg(long)]
    pub secrets: Option<PathBuf>,

    /// OpenWeather API key
    #[arg(long, env = "OPENWEATHER_TOKEN", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Latitude of the forecast location
    #[arg(long, env = "WEATHER_LAT", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude of the forecast location
    #[arg(long, env = "WEATHER_LON", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Hours from UTC for the clock (e.g. -5 for EST, 5.5 for IST)
    #[arg(long, default_value = "-5", allow_hyphen_values = true)]
    pub utc_offset: f64,

    /// Use the bundled fake response instead of calling the API
    #[arg(long)]
    pub fake_data: bool,

    /// Use this JSON file as the weather response (implies --fake-data)
    #[arg(long)]
    pub fixture: Option<PathBuf>,

    /// Seconds between weather refreshes
    #[arg(long, default_value = "300", value_parser = clap::value_parser!(u64).range(1..))]
    pub weather_interval: u64,

    /// Seconds between clock redraws
    #[arg(long, default_value = "60", value_parser = clap::value_parser!(u64).range(1..))]
    pub clock_interval: u64,

    /// HTTP timeout in seconds for the weather request
    #[arg(long, default_value = "10")]
    pub timeout: u64,

    /// Milliseconds to sleep between scheduler ticks (0 polls continuously)
    #[arg(long, default_value = "0")]
    pub poll_ms: u64,

    /// Path to BDF font directory
    #[arg(long, default_value = "fonts/bdf")]
    pub fonts_dir: PathBuf,

    /// BDF font name (without .bdf) for the labels
    #[arg(long, default_value = "6x10")]
    pub font: String,

    /// Sprite sheet of 16x16 weather icons
    #[arg(long, default_value = "weather-icons.bmp")]
    pub icons: PathBuf,

    /// Display brightness (0-100)
    #[arg(long, default_value = "100", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub brightness: u8,

    /// Number of rows on the LED panel
    #[arg(long, default_value = "32")]
    pub rows: u32,

    /// Number of columns on the LED panel
    #[arg(long, default_value = "64")]
    pub cols: u32,

    /// PWM bits per color channel (1-11)
    #[arg(long, default_value = "4")]
    pub pwm_bits: u8,
}

/// Contents of the optional secrets file. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Secrets {
    pub openweather_token: Option<String>,
    pub lat: Option<f64>,
    pub long: Option<f64>,
    #[serde(default)]
    pub use_fake_data: bool,
}

impl Secrets {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read secrets file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid secrets file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("live weather needs {0} (or use --fake-data)")]
    Missing(&'static str),

    #[error("UTC offset {0} is outside -14..=14 hours")]
    UtcOffset(f64),
}

// ── Resolved configuration ───────────────────────────────────────────

/// Where weather readings come from.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceConfig {
    Live {
        api_key: String,
        lat: f64,
        lon: f64,
        timeout: Duration,
    },
    /// `None` uses the bundled fixture.
    Fixture(Option<PathBuf>),
}

/// Everything the display layer needs.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayConfig {
    pub panel: PanelConfig,
    pub brightness: u8,
    pub fonts_dir: PathBuf,
    pub font: String,
    pub icons: PathBuf,
}

impl DisplayConfig {
    pub fn font_path(&self) -> PathBuf {
        self.fonts_dir.join(format!("{}.bdf", self.font))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub source: SourceConfig,
    pub utc_offset_seconds: i32,
    pub intervals: Intervals,
    pub poll_interval: Duration,
    pub display: DisplayConfig,
}

impl Args {
    /// Merge flags with the secrets file and validate.
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let secrets = match &self.secrets {
            Some(path) => Secrets::load(path)?,
            None => Secrets::default(),
        };

        if !(-14.0..=14.0).contains(&self.utc_offset) {
            return Err(ConfigError::UtcOffset(self.utc_offset));
        }

        let fake = self.fake_data || self.fixture.is_some() || secrets.use_fake_data;
        let source = if fake {
            SourceConfig::Fixture(self.fixture)
        } else {
            SourceConfig::Live {
                api_key: self
                    .api_key
                    .or(secrets.openweather_token)
                    .ok_or(ConfigError::Missing("an API key"))?,
                lat: self.lat.or(secrets.lat).ok_or(ConfigError::Missing("a latitude"))?,
                lon: self.lon.or(secrets.long).ok_or(ConfigError::Missing("a longitude"))?,
                timeout: Duration::from_secs(self.timeout),
            }
        };

        Ok(Config {
            source,
            utc_offset_seconds: (self.utc_offset * 3600.0).round() as i32,
            intervals: Intervals {
                weather: Duration::from_secs(self.weather_interval),
                clock: Duration::from_secs(self.clock_interval),
            },
            poll_interval: Duration::from_millis(self.poll_ms),
            display: DisplayConfig {
                panel: PanelConfig {
                    rows: self.rows,
                    cols: self.cols,
                    pwm_bits: self.pwm_bits,
                },
                brightness: self.brightness,
                fonts_dir: self.fonts_dir,
                font: self.font,
                icons: self.icons,
            },
        })
    }
}
