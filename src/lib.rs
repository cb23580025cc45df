//! Clock and weather dashboard for a 64x32 RGB LED matrix.
//!
//! The crate is split so that everything except the panel driver can be
//! tested on a laptop (`cargo test --no-default-features`):
//! - Pure renderers: temperature color, temperature range bar, sun path
//! - Weather fetching with a fixed fallback reading
//! - The refresh scheduler that decides what to redraw on each tick
//! - Panel configuration, the shared `Color` type and signal handling
//!
//! The `render` module (behind the `hardware` feature) paints the dashboard
//! onto the real LED matrix.

pub mod clock;
pub mod config;
pub mod dashboard;
pub mod icons;
pub mod palette;
#[cfg(feature = "hardware")]
pub mod render;
pub mod scheduler;
pub mod spectrum;
pub mod sun_path;
pub mod surface;
pub mod temp_range;
pub mod weather;

#[cfg(feature = "hardware")]
use rpi_led_matrix::{LedMatrix, LedMatrixOptions, LedRuntimeOptions};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

// ── Panel configuration ────────────────────────────────────────────

/// Configuration for the LED panel.
///
/// # Rust concept: derive macros
/// `Clone, Copy` make this cheaply copyable. `Debug` gives us `{:?}`
/// formatting. `PartialEq, Eq` let us compare in tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelConfig {
    pub rows: u32,
    pub cols: u32,
    /// PWM bits per color channel (1-11). Lower values trade color depth
    /// for refresh rate.
    pub pwm_bits: u8,
}

impl PanelConfig {
    /// Whether `(x, y)` falls on the panel.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.cols && (y as u32) < self.rows
    }
}

impl Default for PanelConfig {
    /// The dashboard layout is drawn for a 64 wide, 32 tall panel.
    fn default() -> Self {
        Self {
            rows: 32,
            cols: 64,
            pwm_bits: 4,
        }
    }
}

// ── Color ──────────────────────────────────────────────────────────

/// Our own color type, decoupled from the hardware crate.
///
/// This lets us test color logic without needing `rpi-led-matrix`.
/// At the hardware boundary, we convert via `Into<LedColor>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Unpack a 24-bit `0xRRGGBB` value. Bits above 24 are ignored.
    ///
    /// # Rust concept: const fn
    /// A `const fn` can run at compile time, so palettes can be written
    /// as `const` tables of hex literals.
    pub const fn from_rgb24(packed: u32) -> Self {
        Self {
            r: ((packed >> 16) & 0xFF) as u8,
            g: ((packed >> 8) & 0xFF) as u8,
            b: (packed & 0xFF) as u8,
        }
    }

    /// Pack into `0xRRGGBB`, red in the high byte.
    pub const fn to_rgb24(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    pub fn is_black(self) -> bool {
        self == Self::BLACK
    }

    /// Apply brightness scaling (0-100) to this color.
    pub fn apply_brightness(self, brightness: u8) -> Self {
        if brightness >= 100 {
            return self;
        }
        Self {
            r: ((self.r as u16 * brightness as u16) / 100) as u8,
            g: ((self.g as u16 * brightness as u16) / 100) as u8,
            b: ((self.b as u16 * brightness as u16) / 100) as u8,
        }
    }
}

/// Convert our Color to the hardware crate's LedColor at the boundary.
#[cfg(feature = "hardware")]
impl From<Color> for rpi_led_matrix::LedColor {
    fn from(c: Color) -> Self {
        rpi_led_matrix::LedColor {
            red: c.r,
            green: c.g,
            blue: c.b,
        }
    }
}

// ── Matrix initialization ──────────────────────────────────────────

/// Create a matrix configured for our hardware:
/// Pi + Adafruit Bonnet + a 64x32 panel.
///
/// # Rust concept: Result and the ? operator
/// Matrix initialization can fail (not running as root, GPIO unavailable,
/// an out-of-range PWM setting), so the caller gets a `Result`.
#[cfg(feature = "hardware")]
pub fn create_matrix(panel: PanelConfig) -> Result<LedMatrix, Box<dyn std::error::Error>> {
    let mut options = LedMatrixOptions::new();
    options.set_rows(panel.rows);
    options.set_cols(panel.cols);
    options.set_hardware_mapping("adafruit-hat");
    options.set_pwm_bits(panel.pwm_bits)?;
    options.set_pwm_lsb_nanoseconds(130);

    let mut rt_options = LedRuntimeOptions::new();
    rt_options.set_gpio_slowdown(2); // Pi Zero 2 W requires slowdown=2

    let matrix = LedMatrix::new(Some(options), Some(rt_options))?;

    Ok(matrix)
}

/// Set up a Ctrl+C handler that sets `running` to false.
///
/// # Rust concept: Arc and AtomicBool
/// The flag is shared between the main loop and the signal handler.
/// `AtomicBool` is a thread-safe boolean, so no mutex is needed.
pub fn setup_signal_handler() -> Result<Arc<AtomicBool>, ctrlc::Error> {
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    Ok(running)
}

/// Check if the main loop should keep running.
pub fn is_running(running: &AtomicBool) -> bool {
    running.load(Ordering::SeqCst)
}

// ── Tests ──────────────────────────────────────────────────────────
