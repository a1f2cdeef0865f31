use rand::RngExt;

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Pick a vivid random color: random hue, high saturation and value.
    pub fn vivid<R: RngExt>(rng: &mut R) -> Rgb {
        let hue = rng.random_range(0.0..1.0);
        let saturation = rng.random_range(0.85..1.0);
        let value = rng.random_range(0.8..1.0);
        hsv_to_rgb(hue, saturation, value)
    }

    /// Blend toward white. Intensity 1.0 returns the base color unchanged,
    /// 0.0 returns pure white.
    pub fn glow(self, intensity: f64) -> Rgb {
        let blend = |c: u8| -> u8 {
            (c as f64 * intensity + 255.0 * (1.0 - intensity)).min(255.0) as u8
        };
        Rgb(blend(self.0), blend(self.1), blend(self.2))
    }

    /// Fade toward black by a factor in 0.0..=1.0.
    pub fn scaled(self, alpha: f64) -> Rgb {
        let alpha = alpha.clamp(0.0, 1.0);
        Rgb(
            (self.0 as f64 * alpha) as u8,
            (self.1 as f64 * alpha) as u8,
            (self.2 as f64 * alpha) as u8,
        )
    }
}

/// HSV (all components 0.0..=1.0) to 8-bit RGB.
fn hsv_to_rgb(h: f64, s: f64, v: f64) -> Rgb {
    let h = (h.rem_euclid(1.0)) * 360.0;
    let c = v * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = v - c;

    let (r1, g1, b1) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    Rgb(
        ((r1 + m) * 255.0).clamp(0.0, 255.0) as u8,
        ((g1 + m) * 255.0).clamp(0.0, 255.0) as u8,
        ((b1 + m) * 255.0).clamp(0.0, 255.0) as u8,
    )
}
