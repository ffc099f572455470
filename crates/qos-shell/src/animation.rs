//! The animated particle and wave surface behind the home screen.
//!
//! All state lives in logical units within `[0, width] × [0, height]`;
//! the painter maps that space onto whatever region the canvas offers.

use crate::error::TickError;
use qos_core::{Canvas, Color, Palette, Point, Rect, Size, TextStyle};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// What happens when a particle leaves the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryMode {
    /// Re-enter from the opposite edge.
    #[default]
    Wrap,
    /// Reflect off the edge and invert velocity.
    Bounce,
}

/// Largest accepted surface width or height, in logical units.
pub const MAX_SURFACE_EXTENT: f32 = 100_000.0;

/// Most points one wave polyline may have.
pub const MAX_WAVE_SAMPLES: usize = 10_000;

/// Surface dimensions and motion parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SurfaceConfig {
    pub width: f32,
    pub height: f32,
    pub particle_count: usize,
    pub wave_count: usize,
    /// Largest initial speed per axis, units per tick.
    pub max_speed: f32,
    /// Largest random displacement per axis added each tick.
    pub jitter: f32,
    pub boundary: BoundaryMode,
    /// Chance per particle per tick of tunnelling to a random position.
    pub tunneling_probability: f64,
    /// Horizontal distance between wave polyline samples.
    pub wave_step: f32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 300.0,
            particle_count: 50,
            wave_count: 3,
            max_speed: 2.0,
            jitter: 0.5,
            boundary: BoundaryMode::Wrap,
            tunneling_probability: 0.01,
            wave_step: 5.0,
        }
    }
}

/// A moving dot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Point,
    pub velocity: Point,
    /// Drawn radius is `1 + energy`.
    pub energy: f32,
    pub color: Palette,
    /// Spinning particles curve their heading a little every tick.
    pub spin: bool,
}

/// A travelling sine wave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wave {
    pub amplitude: f32,
    pub frequency: f32,
    /// Advances by `speed` every tick; never wrapped.
    pub phase: f32,
    pub speed: f32,
    pub baseline: f32,
    pub color: Palette,
}

impl Wave {
    /// Polyline `y = baseline + amplitude * sin(frequency * x + phase)` sampled
    /// every `step` units from `0` to `width` inclusive.
    ///
    /// The step is widened when needed so the polyline never has more
    /// than [`MAX_WAVE_SAMPLES`] segments.
    #[must_use]
    pub fn sample(&self, width: f32, step: f32) -> Vec<Point> {
        if !width.is_finite() || width <= 0.0 {
            return Vec::new();
        }
        let step = if step.is_finite() && step > 0.0 { step } else { width };
        let step = step.max(width / MAX_WAVE_SAMPLES as f32);
        let count = ((width / step).ceil() as usize).min(MAX_WAVE_SAMPLES);
        (0..=count)
            .map(|i| {
                let x = (i as f32 * step).min(width);
                let y = self.amplitude.mul_add((self.frequency * x + self.phase).sin(), self.baseline);
                Point::new(x, y)
            })
            .collect()
    }
}

const SPIN_RADIANS: f32 = 0.05;

/// Particles and waves advanced once per animation tick.
#[derive(Debug, Clone)]
pub struct AnimationSurface {
    config: SurfaceConfig,
    title: String,
    particles: Vec<Particle>,
    waves: Vec<Wave>,
    wave_paths: Vec<Vec<Point>>,
    ticks: u64,
}

impl AnimationSurface {
    /// Random particle pool and evenly spaced waves.
    pub fn new<R: Rng + ?Sized>(config: SurfaceConfig, title: impl Into<String>, rng: &mut R) -> Self {
        let size = Size::new(config.width, config.height);
        let particles = (0..config.particle_count)
            .map(|i| Particle {
                position: random_point(rng, size),
                velocity: Point::new(
                    symmetric(rng, config.max_speed),
                    symmetric(rng, config.max_speed),
                ),
                energy: rng.gen_range(0.5..=3.0),
                color: Palette::cycle(i),
                spin: rng.gen_bool(0.3),
            })
            .collect();
        let wave_count = config.wave_count;
        let waves = (0..wave_count)
            .map(|i| {
                let band = config.height / (wave_count + 1) as f32;
                Wave {
                    amplitude: band * rng.gen_range(0.3..=0.6),
                    frequency: TAU / config.width.max(1.0) * rng.gen_range(1.0..=3.0),
                    phase: rng.gen_range(0.0..TAU),
                    speed: rng.gen_range(0.02..=0.08),
                    baseline: band * (i + 1) as f32,
                    color: Palette::cycle(i + 2),
                }
            })
            .collect();
        Self::with_parts(config, title, particles, waves)
    }

    /// Surface with exactly the given particles and waves.
    #[must_use]
    pub fn with_parts(
        config: SurfaceConfig,
        title: impl Into<String>,
        particles: Vec<Particle>,
        waves: Vec<Wave>,
    ) -> Self {
        Self {
            config,
            title: title.into(),
            particles,
            waves,
            wave_paths: Vec::new(),
            ticks: 0,
        }
    }

    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[must_use]
    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    #[must_use]
    pub const fn config(&self) -> &SurfaceConfig {
        &self.config
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.config.width, self.config.height)
    }

    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance the simulation one step, then redraw it on `canvas`.
    ///
    /// The frame is painted even when a particle had to be reset, and the
    /// reset is reported as the error.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R, canvas: &mut dyn Canvas) -> Result<(), TickError> {
        let advanced = self.advance(rng);
        self.paint(canvas);
        advanced
    }

    /// Move waves and particles without painting.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), TickError> {
        let step = self.config.wave_step;
        let width = self.config.width;
        self.wave_paths = self
            .waves
            .iter_mut()
            .map(|wave| {
                let path = wave.sample(width, step);
                wave.phase += wave.speed;
                path
            })
            .collect();

        let size = Size::new(self.config.width, self.config.height);
        let tunneling = self.config.tunneling_probability.clamp(0.0, 1.0);
        let mut first_bad = None;

        for (index, particle) in self.particles.iter_mut().enumerate() {
            if particle.spin {
                particle.velocity = rotate(particle.velocity, SPIN_RADIANS);
            }
            let jitter = Point::new(
                symmetric(rng, self.config.jitter),
                symmetric(rng, self.config.jitter),
            );
            let moved = particle.position + particle.velocity + jitter;

            if !moved.is_finite() || !particle.velocity.is_finite() {
                particle.position = Point::new(size.width / 2.0, size.height / 2.0);
                particle.velocity = Point::ORIGIN;
                first_bad.get_or_insert(index);
                continue;
            }

            let (x, vx) = confine(moved.x, particle.velocity.x, size.width, self.config.boundary);
            let (y, vy) = confine(moved.y, particle.velocity.y, size.height, self.config.boundary);
            particle.position = Point::new(x, y);
            particle.velocity = Point::new(vx, vy);

            if tunneling > 0.0 && rng.gen_bool(tunneling) {
                particle.position = random_point(rng, size);
                particle.color = Palette::cycle(particle.color as usize + 1);
            }
        }

        self.ticks += 1;
        match first_bad {
            Some(index) => Err(TickError::NonFinite { index }),
            None => Ok(()),
        }
    }

    /// Clear the previous frame and draw waves, particles and the title.
    pub fn paint(&self, canvas: &mut dyn Canvas) {
        canvas.fill_rect(self.bounds(), Color::VOID);
        for (wave, path) in self.waves.iter().zip(&self.wave_paths) {
            canvas.draw_path(path, wave.color.color().with_alpha(0.8), 2.0);
        }
        for particle in &self.particles {
            canvas.fill_circle(particle.position, 1.0 + particle.energy, particle.color.color());
        }
        canvas.draw_text(
            &self.title,
            Point::new(self.config.width / 2.0, self.config.height / 2.0),
            &TextStyle::new(Color::WHITE).bold().sized(32.0),
        );
    }
}

/// Keep one coordinate inside `[0, extent]`, returning the new coordinate and velocity.
fn confine(pos: f32, vel: f32, extent: f32, mode: BoundaryMode) -> (f32, f32) {
    if extent <= 0.0 {
        return (0.0, vel);
    }
    if (0.0..=extent).contains(&pos) {
        return (pos, vel);
    }
    match mode {
        BoundaryMode::Wrap => (pos.rem_euclid(extent).clamp(0.0, extent), vel),
        BoundaryMode::Bounce => {
            let (reflected, vel) = if pos < 0.0 {
                (-pos, vel.abs())
            } else {
                (2.0f32.mul_add(extent, -pos), -vel.abs())
            };
            (reflected.clamp(0.0, extent), vel)
        }
    }
}

fn rotate(v: Point, radians: f32) -> Point {
    let (sin, cos) = radians.sin_cos();
    Point::new(v.x.mul_add(cos, -v.y * sin), v.x.mul_add(sin, v.y * cos))
}

fn symmetric<R: Rng + ?Sized>(rng: &mut R, magnitude: f32) -> f32 {
    if magnitude > 0.0 {
        rng.gen_range(-magnitude..=magnitude)
    } else {
        0.0
    }
}

fn random_point<R: Rng + ?Sized>(rng: &mut R, size: Size) -> Point {
    let x = if size.width > 0.0 { rng.gen_range(0.0..=size.width) } else { 0.0 };
    let y = if size.height > 0.0 { rng.gen_range(0.0..=size.height) } else { 0.0 };
    Point::new(x, y)
}
