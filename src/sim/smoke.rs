use noise::{NoiseFn, Perlin};
use rand::RngExt;

use super::color::Rgb;
use super::vec2::Vec2;
use super::{TRAIL_LIFESPAN, Viewport};
use crate::render::Canvas;

const SMOKE_COLOR: Rgb = Rgb(100, 100, 120);

/// Decorative smoke puff. No force model — pure procedural drift that grows
/// and fades until the hard lifespan cutoff.
#[derive(Debug, Clone)]
pub struct Smoke {
    pub pos: Vec2,
    pub life: u32,
    pub size: f64,
    pub remove: bool,
}

impl Smoke {
    pub fn new(pos: Vec2, size: f64) -> Self {
        Smoke {
            pos,
            life: 0,
            size,
            remove: false,
        }
    }

    fn lifespan() -> f64 {
        TRAIL_LIFESPAN * 1.5
    }

    pub fn update<R: RngExt>(&mut self, wind: &Perlin, time: f64, rng: &mut R) {
        if self.remove {
            return;
        }
        self.life += 1;
        // Random drift plus a faint coherent wind so nearby puffs lean together
        let breeze = wind.get([self.pos.x * 0.01, self.pos.y * 0.01, time * 0.2]) * 0.2;
        self.pos += Vec2::new(rng.random_range(-0.5..0.5) + breeze, rng.random_range(-0.3..0.3));
        self.size += 0.1;
        if self.life as f64 > Self::lifespan() {
            self.remove = true;
        }
    }

    pub fn draw(&self, canvas: &mut Canvas, view: &Viewport) {
        let alpha = (1.0 - self.life as f64 / Self::lifespan()).max(0.0);
        let c = SMOKE_COLOR.scaled(alpha);
        let (cx, cy) = view.map(self.pos);
        canvas.fill_circle(cx, cy, view.radius(self.size), alpha * 0.6, c.0, c.1, c.2);
    }
}
