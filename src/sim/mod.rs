pub mod color;
pub mod firework;
pub mod glyph;
pub mod particle;
pub mod smoke;
pub mod vec2;

use std::time::{Duration, Instant};

use noise::Perlin;
use rand::RngExt;

use crate::render::Canvas;
use firework::Firework;
use particle::Particle;
use smoke::Smoke;
use vec2::Vec2;

// The simulation runs in a fixed virtual space; the viewport maps it onto
// whatever pixel canvas the terminal currently provides.
pub const SIM_WIDTH: f64 = 1500.0;
pub const SIM_HEIGHT: f64 = 1000.0;

pub const SHELL_GRAVITY: Vec2 = Vec2::new(0.0, 0.25);
pub const PARTICLE_GRAVITY: f64 = 0.05;
pub const SHELL_SPEED_MIN: u32 = 16;
pub const SHELL_SPEED_MAX: u32 = 20;
pub const SHELL_SIZE: f64 = 5.0;

pub const PARTICLE_LIFESPAN: u32 = 150;
pub const X_SPREAD: f64 = 0.95;
pub const Y_SPREAD: f64 = 0.95;
pub const SPARK_SIZE_MIN: u32 = 1;
pub const SPARK_SIZE_MAX: u32 = 4;
pub const MIN_SPARKS: usize = 300;
pub const MAX_SPARKS: usize = 450;
pub const X_WIGGLE_SCALE: f64 = 25.0;
pub const Y_WIGGLE_SCALE: f64 = 15.0;
pub const SPARK_RADIUS_MIN: u32 = 35;
pub const SPARK_RADIUS_MAX: u32 = 50;
pub const GLOW_INTENSITY: f64 = 0.7;

pub const TRAIL_LIFESPAN: f64 = PARTICLE_LIFESPAN as f64 / 2.5;
pub const TRAIL_FREQUENCY: i32 = 8;

pub const GLYPH_SIZE: usize = 50;
pub const DEFAULT_MESSAGE: &str = " Happy Every Day!";

/// Horizontal launch slots. Slot 0 means "random x".
pub const SLOTS: [f64; 6] = [100.0, 350.0, 600.0, 850.0, 1100.0, 1350.0];

/// Wall-clock pause triggered by a space in the message.
pub const PAUSE_DURATION: Duration = Duration::from_secs(3);

/// Feature toggles lifted from the original's compile-time constants.
#[derive(Debug, Clone, Copy)]
pub struct ShowOptions {
    pub trails: bool,
    pub smoke: bool,
    /// Draw burst sparks from a 3-color palette instead of one color.
    pub colorful: bool,
}

impl Default for ShowOptions {
    fn default() -> Self {
        ShowOptions {
            trails: true,
            smoke: true,
            colorful: true,
        }
    }
}

/// Maps simulation space onto canvas pixels, preserving circle roundness by
/// scaling radii uniformly.
pub struct Viewport {
    sx: f64,
    sy: f64,
    rs: f64,
}

impl Viewport {
    pub fn new(canvas_width: usize, canvas_height: usize) -> Self {
        let sx = canvas_width as f64 / SIM_WIDTH;
        let sy = canvas_height as f64 / SIM_HEIGHT;
        Viewport {
            sx,
            sy,
            rs: sx.min(sy),
        }
    }

    pub fn map(&self, pos: Vec2) -> (f64, f64) {
        (pos.x * self.sx, pos.y * self.sy)
    }

    pub fn radius(&self, r: f64) -> f64 {
        r * self.rs
    }
}

/// The whole show: active fireworks, the shared trail and smoke pools, and
/// the scripted message state. Everything is owned here and mutated only in
/// `tick`, in a fixed order, so a collection is never pruned while an entity
/// is reaching into it.
pub struct Show {
    fireworks: Vec<Firework>,
    trails: Vec<Particle>,
    smoke: Vec<Smoke>,
    message: Vec<char>,
    cursor: usize,
    slot: usize,
    paused_at: Option<Instant>,
    wind: Perlin,
    ticks: u64,
    pub options: ShowOptions,
}

impl Show {
    pub fn new(message: &str, options: ShowOptions) -> Self {
        Show {
            fireworks: Vec::new(),
            trails: Vec::new(),
            smoke: Vec::new(),
            message: message.chars().collect(),
            cursor: 0,
            slot: 0,
            paused_at: None,
            wind: Perlin::new(1),
            ticks: 0,
            options,
        }
    }

    /// Restart the scripted message without dropping live entities.
    pub fn restart(&mut self) {
        self.cursor = 0;
        self.slot = 0;
        self.paused_at = None;
    }

    pub fn message_done(&self) -> bool {
        self.cursor >= self.message.len()
    }

    pub fn firework_count(&self) -> usize {
        self.fireworks.len()
    }

    /// Advance one frame: script, trails, smoke, fireworks — in that order.
    /// The caller presents the canvas afterwards.
    pub fn tick<R: RngExt>(&mut self, canvas: &mut Canvas, now: Instant, rng: &mut R) {
        canvas.clear();
        let view = Viewport::new(canvas.width, canvas.height);
        self.ticks += 1;

        self.advance_script(now, rng);

        // Trails render first so live sparks draw over their own remnants.
        // Render-then-decay keeps a trail visible on its final tick.
        for t in &mut self.trails {
            t.draw(canvas, &view);
            t.decay_trail(rng);
        }
        self.trails.retain(|t| !t.remove);

        let time = self.ticks as f64 / 60.0;
        for s in &mut self.smoke {
            s.update(&self.wind, time, rng);
            s.draw(canvas, &view);
        }
        self.smoke.retain(|s| !s.remove);

        let opts = self.options;
        let (fireworks, trails, smoke) = (&mut self.fireworks, &mut self.trails, &mut self.smoke);
        for fw in fireworks.iter_mut() {
            fw.update(canvas, &view, trails, smoke, &opts, rng);
        }
        self.fireworks.retain_mut(|fw| !fw.removable());
    }

    /// Scripted sequence: one glyph firework per character, a wall-clock
    /// pause on spaces, then sparse random plain fireworks once the message
    /// is spent. Pausing stops spawning only — live entities keep moving.
    fn advance_script<R: RngExt>(&mut self, now: Instant, rng: &mut R) {
        if let Some(started) = self.paused_at {
            if now.duration_since(started) < PAUSE_DURATION {
                return;
            }
            self.paused_at = None;
        }

        if self.cursor < self.message.len() {
            let ch = self.message[self.cursor];
            self.cursor += 1;
            if ch == ' ' {
                self.paused_at = Some(now);
                self.slot = 0;
            } else {
                let x = self.slot_x(rng);
                self.fireworks.push(Firework::new(Some(ch), x, rng));
                self.slot = (self.slot + 1) % SLOTS.len();
            }
        } else if rng.random_range(0..51) == 0 {
            self.slot = 0;
            let x = self.slot_x(rng);
            self.fireworks.push(Firework::new(None, x, rng));
        }
    }

    fn slot_x<R: RngExt>(&self, rng: &mut R) -> f64 {
        if self.slot == 0 {
            rng.random_range(0.0..SIM_WIDTH)
        } else {
            SLOTS[self.slot]
        }
    }
}
