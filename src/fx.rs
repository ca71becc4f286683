use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const DEFAULT_PARTICLES: usize = 70;
const INITIAL_SPEED: f64 = 0.3;
const MAX_SPEED: f64 = 1.8;
/// Particles leaving the area by more than this reappear on the other side.
const WRAP_MARGIN: f64 = 5.0;

/// Drift speed for a given net WPM: faster typing, faster background.
pub fn speed_for_wpm(wpm: u32) -> f64 {
    (0.25 + wpm as f64 / 200.0).min(MAX_SPEED)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub alpha: f64,
}

impl Particle {
    fn update(&mut self, width: f64, height: f64) {
        self.x += self.vel_x;
        self.y += self.vel_y;

        if self.x < -WRAP_MARGIN {
            self.x = width + WRAP_MARGIN;
        } else if self.x > width + WRAP_MARGIN {
            self.x = -WRAP_MARGIN;
        }
        if self.y < -WRAP_MARGIN {
            self.y = height + WRAP_MARGIN;
        } else if self.y > height + WRAP_MARGIN {
            self.y = -WRAP_MARGIN;
        }
    }

    pub fn speed(&self) -> f64 {
        self.vel_x.hypot(self.vel_y)
    }
}

/// Decorative particles drifting behind the typing area.
#[derive(Debug)]
pub struct ParticleField {
    particles: Vec<Particle>,
    width: f64,
    height: f64,
    base_speed: f64,
    rng: StdRng,
}

impl ParticleField {
    pub fn new(width: u16, height: u16) -> Self {
        Self::with_rng(width, height, StdRng::from_entropy())
    }

    pub fn seeded(width: u16, height: u16, seed: u64) -> Self {
        Self::with_rng(width, height, StdRng::seed_from_u64(seed))
    }

    fn with_rng(width: u16, height: u16, rng: StdRng) -> Self {
        let mut field = Self {
            particles: Vec::new(),
            width: width as f64,
            height: height as f64,
            base_speed: INITIAL_SPEED,
            rng,
        };
        field.spawn(DEFAULT_PARTICLES);
        field
    }

    pub fn spawn(&mut self, count: usize) {
        let (width, height, speed) = (self.width.max(1.0), self.height.max(1.0), self.base_speed);
        let rng = &mut self.rng;
        self.particles = (0..count)
            .map(|_| Particle {
                x: rng.gen_range(0.0..width),
                y: rng.gen_range(0.0..height),
                radius: rng.gen_range(0.5..2.5),
                vel_x: rng.gen_range(-1.0..1.0) * speed,
                vel_y: rng.gen_range(-1.0..1.0) * speed,
                alpha: rng.gen_range(0.2..0.8),
            })
            .collect();
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width as f64;
        self.height = height as f64;
    }

    /// Re-scale every particle's velocity, keeping its direction.
    pub fn set_speed_from_wpm(&mut self, wpm: u32) {
        self.base_speed = speed_for_wpm(wpm);
        for particle in self.particles.iter_mut() {
            let angle = particle.vel_y.atan2(particle.vel_x);
            let jitter_x = self.rng.gen_range(0.6..1.8);
            let jitter_y = self.rng.gen_range(0.6..1.8);
            particle.vel_x = angle.cos() * self.base_speed * jitter_x;
            particle.vel_y = angle.sin() * self.base_speed * jitter_y;
        }
    }

    /// Advance one animation frame.
    pub fn update(&mut self) {
        let (width, height) = (self.width, self.height);
        for particle in self.particles.iter_mut() {
            particle.update(width, height);
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn base_speed(&self) -> f64 {
        self.base_speed
    }
}
