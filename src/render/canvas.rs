use crossterm::style::Color;

/// How to render sub-cell pixels to terminal characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RenderMode {
    /// Unicode braille characters (2x4 per cell = highest resolution)
    Braille,
    /// Half-block characters ▀▄█ (1x2 per cell)
    HalfBlock,
}

/// Color output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ColorMode {
    /// No color — monochrome
    Mono,
    /// ANSI 16 colors
    Ansi16,
    /// 256-color palette
    Ansi256,
    /// 24-bit true color (RGB)
    TrueColor,
}

/// A pixel-level canvas that gets rendered to terminal characters.
/// Coordinates are in "sub-cell" pixel space.
pub struct Canvas {
    /// Width in pixels (sub-cell)
    pub width: usize,
    /// Height in pixels (sub-cell)
    pub height: usize,
    /// Pixel data: brightness 0.0..=1.0
    pub pixels: Vec<f64>,
    /// Per-pixel color (used when color mode != Mono)
    pub colors: Vec<(u8, u8, u8)>,
    pub render_mode: RenderMode,
    pub color_mode: ColorMode,
}

impl Canvas {
    pub fn new(
        term_cols: usize,
        term_rows: usize,
        render_mode: RenderMode,
        color_mode: ColorMode,
    ) -> Self {
        let (px_w, px_h) = match render_mode {
            RenderMode::Braille => (term_cols * 2, term_rows * 4),
            RenderMode::HalfBlock => (term_cols, term_rows * 2),
        };
        let size = px_w * px_h;
        Canvas {
            width: px_w,
            height: px_h,
            pixels: vec![0.0; size],
            colors: vec![(255, 255, 255); size],
            render_mode,
            color_mode,
        }
    }

    pub fn clear(&mut self) {
        self.pixels.fill(0.0);
        self.colors.fill((255, 255, 255));
    }

    /// Set a pixel with color. Bounds-checked.
    #[inline]
    pub fn set_colored(&mut self, x: usize, y: usize, brightness: f64, r: u8, g: u8, b: u8) {
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            // Brighter entities win when circles overlap
            if brightness >= self.pixels[idx] {
                self.pixels[idx] = brightness;
                self.colors[idx] = (r, g, b);
            }
        }
    }

    /// Draw a filled circle centered at (cx, cy) in pixel space.
    /// Sub-pixel radii degrade to a single pixel so small entities stay visible.
    pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, brightness: f64, r: u8, g: u8, b: u8) {
        if radius < 0.5 {
            if cx >= 0.0 && cy >= 0.0 {
                self.set_colored(cx as usize, cy as usize, brightness, r, g, b);
            }
            return;
        }
        let x0 = (cx - radius).floor().max(0.0) as usize;
        let x1 = (cx + radius).ceil().min(self.width as f64 - 1.0) as usize;
        let y0 = (cy - radius).floor().max(0.0) as usize;
        let y1 = (cy + radius).ceil().min(self.height as f64 - 1.0) as usize;
        if x0 > x1 || y0 > y1 || cx + radius < 0.0 || cy + radius < 0.0 {
            return;
        }
        let r2 = radius * radius;
        for py in y0..=y1 {
            for px in x0..=x1 {
                let dx = px as f64 + 0.5 - cx;
                let dy = py as f64 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.set_colored(px, py, brightness, r, g, b);
                }
            }
        }
    }

    /// Terminal dimensions needed for this canvas
    pub fn term_size(&self) -> (usize, usize) {
        match self.render_mode {
            RenderMode::Braille => (self.width / 2, self.height / 4),
            RenderMode::HalfBlock => (self.width, self.height / 2),
        }
    }

    /// Render the canvas to a string buffer for output
    pub fn render(&self) -> String {
        match self.render_mode {
            RenderMode::Braille => super::braille::render(self),
            RenderMode::HalfBlock => super::halfblock::render(self),
        }
    }

    pub fn map_color(&self, r: u8, g: u8, b: u8) -> Color {
        match self.color_mode {
            ColorMode::Mono => Color::White,
            ColorMode::TrueColor => Color::Rgb { r, g, b },
            ColorMode::Ansi256 => {
                // Approximate RGB to 256-color
                let idx = 16 + (36 * (r as u16 / 51)) + (6 * (g as u16 / 51)) + (b as u16 / 51);
                Color::AnsiValue(idx as u8)
            }
            ColorMode::Ansi16 => {
                // Simple mapping to basic colors
                let brightness = (r as u16 + g as u16 + b as u16) / 3;
                if brightness < 64 {
                    Color::Black
                } else if r > g && r > b {
                    if brightness > 180 {
                        Color::Red
                    } else {
                        Color::DarkRed
                    }
                } else if g > r && g > b {
                    if brightness > 180 {
                        Color::Green
                    } else {
                        Color::DarkGreen
                    }
                } else if b > r && b > g {
                    if brightness > 180 {
                        Color::Blue
                    } else {
                        Color::DarkBlue
                    }
                } else if brightness > 180 {
                    Color::White
                } else {
                    Color::Grey
                }
            }
        }
    }
}

pub fn color_to_fg(color: Color) -> String {
    match color {
        Color::Rgb { r, g, b } => format!("38;2;{};{};{}", r, g, b),
        Color::AnsiValue(v) => format!("38;5;{}", v),
        Color::Black => "30".into(),
        Color::DarkRed => "31".into(),
        Color::DarkGreen => "32".into(),
        Color::DarkYellow => "33".into(),
        Color::DarkBlue => "34".into(),
        Color::DarkMagenta => "35".into(),
        Color::DarkCyan => "36".into(),
        Color::Grey => "37".into(),
        Color::DarkGrey => "90".into(),
        Color::Red => "91".into(),
        Color::Green => "92".into(),
        Color::Yellow => "93".into(),
        Color::Blue => "94".into(),
        Color::Magenta => "95".into(),
        Color::Cyan => "96".into(),
        Color::White => "97".into(),
        _ => "37".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> Canvas {
        Canvas::new(20, 10, RenderMode::Braille, ColorMode::TrueColor)
    }

    #[test]
    fn test_fill_circle_hits_center() {
        let mut c = canvas();
        c.fill_circle(10.0, 10.0, 3.0, 1.0, 255, 0, 0);
        let idx = 10 * c.width + 10;
        assert_eq!(c.pixels[idx], 1.0);
        assert_eq!(c.colors[idx], (255, 0, 0));
    }

    #[test]
    fn test_fill_circle_subpixel_radius_single_pixel() {
        let mut c = canvas();
        c.fill_circle(5.0, 5.0, 0.2, 0.8, 0, 255, 0);
        let lit = c.pixels.iter().filter(|&&p| p > 0.0).count();
        assert_eq!(lit, 1);
    }

    #[test]
    fn test_fill_circle_off_canvas_is_noop() {
        let mut c = canvas();
        c.fill_circle(-50.0, -50.0, 3.0, 1.0, 255, 255, 255);
        c.fill_circle(5000.0, 5000.0, 3.0, 1.0, 255, 255, 255);
        assert!(c.pixels.iter().all(|&p| p == 0.0));
    }

    #[test]
    fn test_clear_resets_pixels_and_colors() {
        let mut c = canvas();
        c.fill_circle(10.0, 10.0, 2.0, 1.0, 10, 20, 30);
        c.clear();
        assert!(c.pixels.iter().all(|&p| p == 0.0));
        assert!(c.colors.iter().all(|&col| col == (255, 255, 255)));
    }
}
