use rand::RngExt;

use super::color::Rgb;
use super::glyph;
use super::particle::{ExplosionStyle, Particle};
use super::smoke::Smoke;
use super::vec2::Vec2;
use super::{
    GLYPH_SIZE, MAX_SPARKS, MIN_SPARKS, SHELL_GRAVITY, SIM_HEIGHT, ShowOptions, Viewport,
};
use crate::render::Canvas;

/// One firework: a rising shell that explodes at apex into a radial burst or
/// a glyph-shaped burst, then lives on as its spark collection until every
/// spark has decayed.
pub struct Firework {
    color: Rgb,
    palette: [Rgb; 3],
    style: ExplosionStyle,
    /// Present only while ascending.
    shell: Option<Particle>,
    sparks: Vec<Particle>,
    /// Glyph fireworks keep their shape even when the contour came back
    /// empty — they just burst into nothing.
    glyph: bool,
    contour: Vec<Vec2>,
}

impl Firework {
    /// Launch from the bottom of sim space at horizontal position `x`.
    /// `ch = Some(c)` makes a glyph firework tracing that character.
    pub fn new<R: RngExt>(ch: Option<char>, x: f64, rng: &mut R) -> Self {
        let contour = ch.map(|c| glyph::contour_points(c, GLYPH_SIZE)).unwrap_or_default();
        Firework::with_contour(ch.is_some(), contour, x, rng)
    }

    fn with_contour<R: RngExt>(glyph: bool, contour: Vec<Vec2>, x: f64, rng: &mut R) -> Self {
        let color = Rgb::vivid(rng);
        let palette = [Rgb::vivid(rng), Rgb::vivid(rng), Rgb::vivid(rng)];
        let shell = Particle::shell(Vec2::new(x, SIM_HEIGHT), color, rng);
        Firework {
            color,
            palette,
            style: ExplosionStyle::random(rng),
            shell: Some(shell),
            sparks: Vec::new(),
            glyph,
            contour,
        }
    }

    #[cfg(test)]
    pub fn exploded(&self) -> bool {
        self.shell.is_none()
    }

    #[cfg(test)]
    pub fn sparks(&self) -> &[Particle] {
        &self.sparks
    }

    /// One tick: drive the shell until apex, then drive the sparks.
    pub fn update<R: RngExt>(
        &mut self,
        canvas: &mut Canvas,
        view: &Viewport,
        trails: &mut Vec<Particle>,
        smoke: &mut Vec<Smoke>,
        opts: &ShowOptions,
        rng: &mut R,
    ) {
        if let Some(shell) = &mut self.shell {
            shell.apply_force(SHELL_GRAVITY);
            shell.step(rng);
            shell.draw(canvas, view);
            // Apex: vertical velocity flips non-negative under gravity
            if shell.vel.y >= 0.0 {
                let at = shell.pos;
                self.shell = None;
                self.explode(at, opts, rng);
            }
        } else {
            for spark in &mut self.sparks {
                spark.update(trails, smoke, opts, rng);
                spark.draw(canvas, view);
            }
        }
    }

    fn explode<R: RngExt>(&mut self, at: Vec2, opts: &ShowOptions, rng: &mut R) {
        let style = self.style;
        if self.glyph {
            // Shape fidelity over density: one spark per contour point,
            // regardless of the radial burst count bounds.
            for i in 0..self.contour.len() {
                let offset = self.contour[i];
                let color = self.spark_color(opts, rng);
                self.sparks.push(Particle::spark_directed(at, offset, color, style, rng));
            }
        } else {
            let count = rng.random_range(MIN_SPARKS..=MAX_SPARKS);
            for _ in 0..count {
                let color = self.spark_color(opts, rng);
                self.sparks.push(Particle::spark_radial(at, color, style, rng));
            }
        }
    }

    fn spark_color<R: RngExt>(&self, opts: &ShowOptions, rng: &mut R) -> Rgb {
        if opts.colorful {
            self.palette[rng.random_range(0..self.palette.len())]
        } else {
            self.color
        }
    }

    /// Prune decayed sparks, then report whether the firework is spent.
    /// Never true while ascending.
    pub fn removable(&mut self) -> bool {
        if self.shell.is_some() {
            return false;
        }
        self.sparks.retain(|p| !p.remove);
        self.sparks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{ColorMode, RenderMode};
    use crate::sim::particle::ParticleKind;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn scene() -> (Canvas, Viewport, Vec<Particle>, Vec<Smoke>, ShowOptions, StdRng) {
        let canvas = Canvas::new(40, 20, RenderMode::Braille, ColorMode::TrueColor);
        let view = Viewport::new(canvas.width, canvas.height);
        (canvas, view, Vec::new(), Vec::new(), ShowOptions::default(), StdRng::seed_from_u64(11))
    }

    fn tick_until_exploded(
        fw: &mut Firework,
        canvas: &mut Canvas,
        view: &Viewport,
        trails: &mut Vec<Particle>,
        smoke: &mut Vec<Smoke>,
        opts: &ShowOptions,
        rng: &mut StdRng,
    ) {
        for _ in 0..500 {
            if fw.exploded() {
                return;
            }
            fw.update(canvas, view, trails, smoke, opts, rng);
        }
        panic!("shell never reached apex");
    }

    #[test]
    fn test_no_sparks_while_ascending() {
        let (mut canvas, view, mut trails, mut smoke, opts, mut rng) = scene();
        let mut fw = Firework::new(Some('A'), 700.0, &mut rng);
        while !fw.exploded() {
            assert!(fw.sparks().is_empty());
            assert!(!fw.removable());
            fw.update(&mut canvas, &view, &mut trails, &mut smoke, &opts, &mut rng);
        }
    }

    #[test]
    fn test_contour_burst_spawns_one_spark_per_point() {
        let (mut canvas, view, mut trails, mut smoke, opts, mut rng) = scene();
        let contour = vec![
            Vec2::new(4.0, 0.0),
            Vec2::new(-4.0, 0.0),
            Vec2::new(0.0, 4.0),
            Vec2::new(0.0, -4.0),
        ];
        let mut fw = Firework::with_contour(true, contour.clone(), 700.0, &mut rng);
        tick_until_exploded(&mut fw, &mut canvas, &view, &mut trails, &mut smoke, &opts, &mut rng);
        assert_eq!(fw.sparks().len(), contour.len());
        for (spark, offset) in fw.sparks().iter().zip(&contour) {
            assert_eq!(spark.kind, ParticleKind::Spark);
            // Directed velocity = 0.7 * offset, damped once at construction
            assert!((spark.vel.x - 0.7 * offset.x * crate::sim::X_SPREAD).abs() < 1e-9);
            assert!((spark.vel.y - 0.7 * offset.y * crate::sim::Y_SPREAD).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty_contour_is_immediately_removable() {
        let (mut canvas, view, mut trails, mut smoke, opts, mut rng) = scene();
        // Space has no glyph: still a glyph firework, bursts into nothing
        let mut fw = Firework::new(Some(' '), 700.0, &mut rng);
        tick_until_exploded(&mut fw, &mut canvas, &view, &mut trails, &mut smoke, &opts, &mut rng);
        assert!(fw.removable());
    }

    #[test]
    fn test_plain_burst_count_within_bounds() {
        let (mut canvas, view, mut trails, mut smoke, opts, mut rng) = scene();
        let mut fw = Firework::new(None, 700.0, &mut rng);
        tick_until_exploded(&mut fw, &mut canvas, &view, &mut trails, &mut smoke, &opts, &mut rng);
        let n = fw.sparks().len();
        assert!((MIN_SPARKS..=MAX_SPARKS).contains(&n));
    }

    #[test]
    fn test_removable_iff_exploded_and_empty() {
        let (mut canvas, view, mut trails, mut smoke, opts, mut rng) = scene();
        let mut fw = Firework::new(None, 700.0, &mut rng);
        assert!(!fw.removable());
        tick_until_exploded(&mut fw, &mut canvas, &view, &mut trails, &mut smoke, &opts, &mut rng);
        assert!(!fw.removable());
        // Run the sparks out; the hard decay ceiling bounds this loop
        for _ in 0..400 {
            fw.update(&mut canvas, &view, &mut trails, &mut smoke, &opts, &mut rng);
            if fw.removable() {
                break;
            }
        }
        assert!(fw.removable());
    }

    #[test]
    fn test_removable_prune_is_idempotent() {
        let (mut canvas, view, mut trails, mut smoke, opts, mut rng) = scene();
        let mut fw = Firework::new(None, 700.0, &mut rng);
        tick_until_exploded(&mut fw, &mut canvas, &view, &mut trails, &mut smoke, &opts, &mut rng);
        let _ = fw.removable();
        let before = fw.sparks().len();
        let _ = fw.removable();
        assert_eq!(fw.sparks().len(), before);
    }
}
