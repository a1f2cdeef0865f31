use rand::RngExt;

use super::color::Rgb;
use super::smoke::Smoke;
use super::vec2::Vec2;
use super::{
    GLOW_INTENSITY, PARTICLE_GRAVITY, PARTICLE_LIFESPAN, SHELL_SIZE, SPARK_RADIUS_MAX,
    SPARK_RADIUS_MIN, SPARK_SIZE_MAX, SPARK_SIZE_MIN, SHELL_SPEED_MAX, SHELL_SPEED_MIN,
    ShowOptions, TRAIL_FREQUENCY, TRAIL_LIFESPAN, Viewport, X_SPREAD, X_WIGGLE_SCALE, Y_SPREAD,
    Y_WIGGLE_SCALE,
};
use crate::render::Canvas;

/// What a particle is, which picks its decay and render strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    /// Rising firework shell. No velocity damping, driven by its Firework.
    Shell,
    /// Burst spark after an explosion.
    Spark,
    /// Detached remnant left behind by a spark. Never force-updated,
    /// only fades in place.
    Trail,
}

/// Visual style of an explosion, chosen per firework.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplosionStyle {
    Burst,
    Sparkler,
    Twinkle,
}

impl ExplosionStyle {
    pub fn random<R: RngExt>(rng: &mut R) -> Self {
        match rng.random_range(0..3) {
            0 => ExplosionStyle::Burst,
            1 => ExplosionStyle::Sparkler,
            _ => ExplosionStyle::Twinkle,
        }
    }
}

/// A single physical point: shells, burst sparks, and trail remnants are all
/// the same struct with a kind tag.
#[derive(Debug, Clone)]
pub struct Particle {
    pub kind: ParticleKind,
    pub pos: Vec2,
    /// Spawn point, fixed at construction.
    pub origin: Vec2,
    pub vel: Vec2,
    /// Accumulated force. Always zero at the start of a tick.
    pub acc: Vec2,
    pub size: f64,
    pub color: Rgb,
    pub glow: Rgb,
    /// Tick counter. Only ever increases.
    pub life: u32,
    pub style: ExplosionStyle,
    pub explosion_radius: f64,
    trail_every: u32,
    pub remove: bool,
}

/// Normal draw via Box-Muller over two uniform samples.
fn gauss<R: RngExt>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.random_range(f64::EPSILON..1.0);
    let u2: f64 = rng.random_range(0.0..1.0);
    mean + std_dev * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

impl Particle {
    fn base(kind: ParticleKind, pos: Vec2, color: Rgb, style: ExplosionStyle) -> Self {
        Particle {
            kind,
            pos,
            origin: pos,
            vel: Vec2::ZERO,
            acc: Vec2::ZERO,
            size: 1.0,
            color,
            glow: color.glow(GLOW_INTENSITY),
            life: 0,
            style,
            explosion_radius: 0.0,
            trail_every: 0,
            remove: false,
        }
    }

    /// Rising shell: straight up at a random speed, fixed size.
    pub fn shell<R: RngExt>(pos: Vec2, color: Rgb, rng: &mut R) -> Self {
        let speed = rng.random_range(SHELL_SPEED_MIN..=SHELL_SPEED_MAX) as f64;
        let mut p = Particle::base(ParticleKind::Shell, pos, color, ExplosionStyle::Burst);
        p.vel = Vec2::new(0.0, -speed);
        p.size = SHELL_SIZE;
        p.trail_every = Self::trail_cadence(rng);
        p
    }

    /// Radial burst spark: random direction, speed drawn around a tenth of the
    /// explosion radius, scaled by the style.
    pub fn spark_radial<R: RngExt>(
        pos: Vec2,
        color: Rgb,
        style: ExplosionStyle,
        rng: &mut R,
    ) -> Self {
        let radius = rng.random_range(SPARK_RADIUS_MIN..=SPARK_RADIUS_MAX) as f64;
        let angle = rng.random_range(0.0..std::f64::consts::TAU);
        let mut speed = gauss(rng, radius * 0.1, radius * 0.05);
        speed *= match style {
            ExplosionStyle::Burst => 1.0,
            ExplosionStyle::Sparkler => rng.random_range(1.2..1.5),
            ExplosionStyle::Twinkle => rng.random_range(0.5..0.8),
        };

        let mut p = Particle::base(ParticleKind::Spark, pos, color, style);
        p.vel = Vec2::new(angle.cos() * speed, angle.sin() * speed);
        p.explosion_radius = radius;
        p.size = rng.random_range(SPARK_SIZE_MIN..=SPARK_SIZE_MAX) as f64;
        p.trail_every = Self::trail_cadence(rng);
        p.step(rng);
        let _ = p.outside_spawn_radius(); // advisory only
        p
    }

    /// Directed burst spark for glyph contours: flies outward along its
    /// assigned offset from the glyph origin.
    pub fn spark_directed<R: RngExt>(
        pos: Vec2,
        offset: Vec2,
        color: Rgb,
        style: ExplosionStyle,
        rng: &mut R,
    ) -> Self {
        let mut p = Particle::base(ParticleKind::Spark, pos, color, style);
        p.vel = offset * 0.7;
        p.explosion_radius = offset.magnitude();
        p.size = rng.random_range(SPARK_SIZE_MIN..=SPARK_SIZE_MAX) as f64;
        p.trail_every = Self::trail_cadence(rng);
        p.step(rng);
        let _ = p.outside_spawn_radius();
        p
    }

    /// Trail remnant: built like a zero-offset spark (one random nudge at
    /// birth), then retagged with a size one below its parent, floored at 1.
    pub fn trail<R: RngExt>(pos: Vec2, color: Rgb, parent_size: f64, rng: &mut R) -> Self {
        let mut p = Particle::spark_radial(pos, color, ExplosionStyle::Burst, rng);
        p.kind = ParticleKind::Trail;
        p.size = (parent_size - 1.0).max(1.0);
        p
    }

    fn trail_cadence<R: RngExt>(rng: &mut R) -> u32 {
        (TRAIL_FREQUENCY + rng.random_range(-2..=2)).max(1) as u32
    }

    /// Per-tick update for sparks. Shells are driven by their Firework and
    /// trails only decay.
    pub fn update<R: RngExt>(
        &mut self,
        trails: &mut Vec<Particle>,
        smoke: &mut Vec<Smoke>,
        opts: &ShowOptions,
        rng: &mut R,
    ) {
        if self.remove {
            return;
        }
        self.life += 1;

        if self.life % self.trail_every == 0 {
            if opts.trails {
                trails.push(Particle::trail(self.pos, self.color, self.size, rng));
            }
            if opts.smoke && rng.random_range(0..6) == 0 {
                smoke.push(Smoke::new(self.pos, self.size));
            }
        }

        if self.style == ExplosionStyle::Twinkle && rng.random_range(0..21) == 0 {
            self.size = rng.random_range(SPARK_SIZE_MIN..=SPARK_SIZE_MAX + 2) as f64;
        }

        let force = Vec2::new(
            rng.random_range(-1.0..1.0) / X_WIGGLE_SCALE,
            PARTICLE_GRAVITY + rng.random_range(-1.0..1.0) / Y_WIGGLE_SCALE,
        );
        self.apply_force(force);
        self.step(rng);
    }

    pub fn apply_force(&mut self, force: Vec2) {
        self.acc += force;
    }

    /// Integrate one tick: damp (non-shell), apply accumulated force, move,
    /// zero the accumulator, then decay.
    pub fn step<R: RngExt>(&mut self, rng: &mut R) {
        if self.kind != ParticleKind::Shell {
            self.vel.x *= X_SPREAD;
            self.vel.y *= Y_SPREAD;
        }
        self.vel += self.acc;
        self.pos += self.vel;
        self.acc = Vec2::ZERO;
        if self.kind == ParticleKind::Spark {
            self.decay_spark(rng);
        }
    }

    /// Whether the particle has drifted past its explosion radius.
    /// Computed for parity with the burst bookkeeping but never acted on.
    pub fn outside_spawn_radius(&self) -> bool {
        let d = Vec2::new(self.pos.x - self.origin.x, self.pos.y - self.origin.y);
        d.magnitude() > self.explosion_radius
    }

    /// Two-threshold fade: past the lifespan each tick has a 1-in-11 chance
    /// of removal, past 1.5x it is unconditional.
    fn decay_spark<R: RngExt>(&mut self, rng: &mut R) {
        if self.life > PARTICLE_LIFESPAN && rng.random_range(0..11) == 0 {
            self.remove = true;
        }
        if self.life as f64 > PARTICLE_LIFESPAN as f64 * 1.5 {
            self.remove = true;
        }
    }

    /// Trail-specific decay: shrink every 50 ticks, then the same
    /// probability-gated removal against the shorter trail lifespan.
    pub fn decay_trail<R: RngExt>(&mut self, rng: &mut R) {
        self.life += 1;
        if self.life % 50 == 0 {
            self.size = (self.size - 1.0).max(0.0);
        }
        if self.life as f64 > TRAIL_LIFESPAN && rng.random_range(0..11) == 0 {
            self.remove = true;
        }
        if self.life as f64 > TRAIL_LIFESPAN * 1.2 {
            self.remove = true;
        }
    }

    /// Draw glow halo then solid core, faded by remaining life.
    pub fn draw(&self, canvas: &mut Canvas, view: &Viewport) {
        let (cx, cy) = view.map(self.pos);
        match self.kind {
            ParticleKind::Shell => {
                canvas.fill_circle(cx, cy, view.radius(self.size + 2.0), 0.9, self.glow.0, self.glow.1, self.glow.2);
                canvas.fill_circle(cx, cy, view.radius(self.size), 1.0, self.color.0, self.color.1, self.color.2);
            }
            ParticleKind::Spark => {
                let alpha = (1.0 - self.life as f64 / PARTICLE_LIFESPAN as f64).max(0.0);
                let halo = if self.style == ExplosionStyle::Twinkle {
                    self.size + 4.0
                } else {
                    self.size + 2.0
                };
                let g = self.glow.scaled(alpha);
                let c = self.color.scaled(alpha);
                canvas.fill_circle(cx, cy, view.radius(halo), alpha * 0.9, g.0, g.1, g.2);
                canvas.fill_circle(cx, cy, view.radius(self.size), alpha, c.0, c.1, c.2);
            }
            ParticleKind::Trail => {
                if self.size <= 0.0 {
                    return;
                }
                let alpha = (1.0 - self.life as f64 / TRAIL_LIFESPAN).max(0.0);
                let c = self.color.scaled(alpha);
                canvas.fill_circle(cx, cy, view.radius(self.size + 1.0), alpha * 0.9, self.glow.0, self.glow.1, self.glow.2);
                canvas.fill_circle(cx, cy, view.radius(self.size), alpha, c.0, c.1, c.2);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn opts() -> ShowOptions {
        ShowOptions::default()
    }

    #[test]
    fn test_life_is_monotone() {
        let mut rng = rng();
        let mut p = Particle::spark_radial(Vec2::new(700.0, 400.0), Rgb(255, 0, 0), ExplosionStyle::Burst, &mut rng);
        let (mut trails, mut smoke) = (Vec::new(), Vec::new());
        let mut last = p.life;
        for _ in 0..300 {
            p.update(&mut trails, &mut smoke, &opts(), &mut rng);
            assert!(p.life >= last);
            last = p.life;
        }
    }

    #[test]
    fn test_acc_zero_after_every_step() {
        let mut rng = rng();
        let mut p = Particle::shell(Vec2::new(700.0, 1000.0), Rgb(0, 255, 0), &mut rng);
        for _ in 0..50 {
            p.apply_force(Vec2::new(0.0, 0.25));
            p.step(&mut rng);
            assert_eq!(p.acc, Vec2::ZERO);
        }
    }

    #[test]
    fn test_shell_rises() {
        let mut rng = rng();
        let p = Particle::shell(Vec2::new(100.0, 1000.0), Rgb(0, 255, 0), &mut rng);
        assert!(p.vel.y <= -(SHELL_SPEED_MIN as f64));
        assert!(p.vel.y >= -(SHELL_SPEED_MAX as f64));
        assert_eq!(p.vel.x, 0.0);
        assert_eq!(p.size, SHELL_SIZE);
    }

    #[test]
    fn test_directed_spark_velocity_follows_offset() {
        let mut rng = rng();
        let offset = Vec2::new(10.0, -20.0);
        let p = Particle::spark_directed(
            Vec2::new(500.0, 500.0),
            offset,
            Rgb(255, 255, 0),
            ExplosionStyle::Burst,
            &mut rng,
        );
        // One construction step already happened, damping velocity once.
        assert!((p.vel.x - 0.7 * offset.x * X_SPREAD).abs() < 1e-9);
        assert!((p.vel.y - 0.7 * offset.y * Y_SPREAD).abs() < 1e-9);
        assert!((p.explosion_radius - offset.magnitude()).abs() < 1e-9);
    }

    #[test]
    fn test_radial_speed_follows_gauss_formula() {
        for (seed, style) in [
            (21u64, ExplosionStyle::Burst),
            (22, ExplosionStyle::Sparkler),
            (23, ExplosionStyle::Twinkle),
        ] {
            // Replay the constructor's draw order on an identically seeded rng
            let mut shadow = StdRng::seed_from_u64(seed);
            let radius = shadow.random_range(SPARK_RADIUS_MIN..=SPARK_RADIUS_MAX) as f64;
            let angle = shadow.random_range(0.0..std::f64::consts::TAU);
            let u1: f64 = shadow.random_range(f64::EPSILON..1.0);
            let u2: f64 = shadow.random_range(0.0..1.0);
            let gauss_speed = radius * 0.1
                + radius * 0.05 * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
            let multiplier = match style {
                ExplosionStyle::Burst => 1.0,
                ExplosionStyle::Sparkler => shadow.random_range(1.2..1.5),
                ExplosionStyle::Twinkle => shadow.random_range(0.5..0.8),
            };
            let speed = gauss_speed * multiplier;
            match style {
                ExplosionStyle::Burst => assert_eq!(multiplier, 1.0),
                ExplosionStyle::Sparkler => assert!((1.2..1.5).contains(&multiplier)),
                ExplosionStyle::Twinkle => assert!((0.5..0.8).contains(&multiplier)),
            }

            let mut rng = StdRng::seed_from_u64(seed);
            let p = Particle::spark_radial(Vec2::new(700.0, 400.0), Rgb(255, 0, 0), style, &mut rng);
            // One construction step already damped the velocity once
            assert!((p.vel.x - angle.cos() * speed * X_SPREAD).abs() < 1e-9);
            assert!((p.vel.y - angle.sin() * speed * Y_SPREAD).abs() < 1e-9);
            assert!((p.vel.magnitude() - speed.abs() * X_SPREAD).abs() < 1e-9);
            assert!((p.explosion_radius - radius).abs() < 1e-9);
        }
    }

    #[test]
    fn test_trail_size_clamped_at_one() {
        let mut rng = rng();
        let t = Particle::trail(Vec2::new(10.0, 10.0), Rgb(1, 2, 3), 1.0, &mut rng);
        assert!(t.size >= 1.0);
        assert_eq!(t.kind, ParticleKind::Trail);
    }

    #[test]
    fn test_spark_decay_thresholds() {
        let mut rng = rng();
        let (mut trails, mut smoke) = (Vec::new(), Vec::new());
        let mut p = Particle::spark_radial(Vec2::new(0.0, 0.0), Rgb(9, 9, 9), ExplosionStyle::Burst, &mut rng);
        while p.life <= PARTICLE_LIFESPAN && !p.remove {
            p.update(&mut trails, &mut smoke, &opts(), &mut rng);
            if p.life <= PARTICLE_LIFESPAN {
                assert!(!p.remove, "removed too early at life {}", p.life);
            }
        }
        // The hard ceiling always wins eventually
        for _ in 0..200 {
            if p.remove {
                break;
            }
            p.update(&mut trails, &mut smoke, &opts(), &mut rng);
        }
        assert!(p.remove);
        assert!(p.life as f64 <= PARTICLE_LIFESPAN as f64 * 1.5 + 1.0);
    }

    #[test]
    fn test_marked_particle_is_never_updated() {
        let mut rng = rng();
        let (mut trails, mut smoke) = (Vec::new(), Vec::new());
        let mut p = Particle::spark_radial(Vec2::new(0.0, 0.0), Rgb(9, 9, 9), ExplosionStyle::Burst, &mut rng);
        p.remove = true;
        let life = p.life;
        let pos = p.pos;
        p.update(&mut trails, &mut smoke, &opts(), &mut rng);
        assert_eq!(p.life, life);
        assert_eq!(p.pos, pos);
    }

    #[test]
    fn test_sparks_emit_trails_on_cadence() {
        let mut rng = rng();
        let (mut trails, mut smoke) = (Vec::new(), Vec::new());
        let mut p = Particle::spark_radial(Vec2::new(0.0, 0.0), Rgb(9, 9, 9), ExplosionStyle::Burst, &mut rng);
        for _ in 0..40 {
            p.update(&mut trails, &mut smoke, &opts(), &mut rng);
        }
        assert!(!trails.is_empty());
    }

    #[test]
    fn test_trails_disabled_suppresses_emission() {
        let mut rng = rng();
        let (mut trails, mut smoke) = (Vec::new(), Vec::new());
        let opts = ShowOptions {
            trails: false,
            smoke: false,
            colorful: true,
        };
        let mut p = Particle::spark_radial(Vec2::new(0.0, 0.0), Rgb(9, 9, 9), ExplosionStyle::Burst, &mut rng);
        for _ in 0..40 {
            p.update(&mut trails, &mut smoke, &opts, &mut rng);
        }
        assert!(trails.is_empty());
        assert!(smoke.is_empty());
    }
}
