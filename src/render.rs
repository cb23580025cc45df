//! LED matrix surface: paints a [`Dashboard`] onto the panel.
//!
//! Every present redraws the whole frame on an offscreen canvas and swaps
//! it in, so there is no tearing and no incremental state to get wrong.
//!
//! ## Rust concepts
//! - `Option::take()` to move the canvas out of `self` for `matrix.swap()`
//! - Const generics: one `draw_buffer` for both widget buffer sizes
//! - Degrading to "no labels" / "no icon" instead of failing when an asset is missing

use crate::config::DisplayConfig;
use crate::dashboard::{Dashboard, layout};
use crate::icons::IconSheet;
use crate::palette::{Palette, PixelBuffer, sun_palette, temp_range_palette};
use crate::surface::Surface;
use crate::{Color, PanelConfig, create_matrix};
use rpi_led_matrix::{LedCanvas, LedFont, LedMatrix};

pub struct MatrixSurface {
    matrix: LedMatrix,
    canvas: Option<LedCanvas>,
    font: Option<LedFont>,
    icons: Option<IconSheet>,
    temp_palette: Palette,
    sun_palette: Palette,
    panel: PanelConfig,
    brightness: u8,
    loading: bool,
    last: Option<Dashboard>,
}

impl MatrixSurface {
    /// Bring up the panel and load the font and icon sheet.
    ///
    /// Only the panel itself is required; a missing font or sprite sheet
    /// is logged and that part of the dashboard is left blank.
    pub fn new(config: &DisplayConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let matrix = create_matrix(config.panel)?;
        let canvas = matrix.offscreen_canvas();

        let font_path = config.font_path();
        let font = match LedFont::new(&font_path) {
            Ok(f) => Some(f),
            Err(e) => {
                tracing::warn!("Failed to load font {}: {}", font_path.display(), e);
                None
            }
        };

        let icons = match IconSheet::load(&config.icons) {
            Ok(sheet) => {
                tracing::info!(
                    "Loaded {} icons from {}",
                    sheet.tile_count(),
                    config.icons.display()
                );
                Some(sheet)
            }
            Err(e) => {
                tracing::warn!("Failed to load icons {}: {}", config.icons.display(), e);
                None
            }
        };

        tracing::info!(
            "Panel: {}x{} ({} PWM bits, brightness {})",
            config.panel.cols,
            config.panel.rows,
            config.panel.pwm_bits,
            config.brightness
        );

        Ok(Self {
            matrix,
            canvas: Some(canvas),
            font,
            icons,
            temp_palette: temp_range_palette(),
            sun_palette: sun_palette(),
            panel: config.panel,
            brightness: config.brightness,
            loading: false,
            last: None,
        })
    }

    /// Draw the current state onto the offscreen canvas and swap it in.
    fn repaint(&mut self) {
        let Some(mut canvas) = self.canvas.take() else {
            return;
        };
        canvas.clear();

        if let Some(dashboard) = &self.last {
            self.draw_dashboard(&mut canvas, dashboard);
        }
        if self.loading {
            let (x, y) = layout::LOADING_DOT;
            self.put(&mut canvas, x, y, Color::WHITE);
        }

        self.canvas = Some(self.matrix.swap(canvas));
    }

    fn draw_dashboard(&self, canvas: &mut LedCanvas, dashboard: &Dashboard) {
        if let Some(font) = &self.font {
            let time = &dashboard.time_label;
            self.text(canvas, font, time, layout::TIME_LABEL, Color::WHITE);
            let temp = &dashboard.temp_label;
            self.text(canvas, font, temp, layout::TEMP_LABEL, dashboard.temp_color);
        }

        if let Some(icons) = &self.icons {
            let (ox, oy) = layout::ICON;
            for (x, y, color) in icons.tile_pixels(dashboard.icon) {
                self.put(canvas, ox + x as i32, oy + y as i32, color);
            }
        }

        self.draw_buffer(canvas, &dashboard.temp_range, &self.temp_palette, layout::TEMP_RANGE);
        self.draw_buffer(canvas, &dashboard.sun_path, &self.sun_palette, layout::SUN_PATH);
    }

    fn draw_buffer<const W: usize, const H: usize>(
        &self,
        canvas: &mut LedCanvas,
        buffer: &PixelBuffer<W, H>,
        palette: &Palette,
        (ox, oy): (i32, i32),
    ) {
        for (x, y, index) in buffer.painted() {
            if let Some(color) = palette.color(index) {
                self.put(canvas, ox + x as i32, oy + y as i32, color);
            }
        }
    }

    fn text(&self, canvas: &mut LedCanvas, font: &LedFont, text: &str, at: (i32, i32), color: Color) {
        let color = color.apply_brightness(self.brightness);
        canvas.draw_text(font, text, at.0, at.1, &color.into(), 0, false);
    }

    /// Set one pixel, clipped to the panel and scaled by brightness.
    fn put(&self, canvas: &mut LedCanvas, x: i32, y: i32, color: Color) {
        if self.panel.contains(x, y) {
            canvas.set(x, y, &color.apply_brightness(self.brightness).into());
        }
    }
}

impl Surface for MatrixSurface {
    fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        self.repaint();
    }

    fn present(&mut self, dashboard: &Dashboard) {
        self.last = Some(dashboard.clone());
        self.repaint();
    }
}
