use std::f64::consts::PI;

pub const PARTICLE_RGB: (u8, u8, u8) = (100, 200, 255);
pub const FULL_CIRCLE: f64 = 2.0 * PI;
const MAX_SPEED: f64 = 0.5;
const MIN_RADIUS: f64 = 1.0;
const RADIUS_SPREAD: f64 = 3.0;
const MIN_ALPHA: f64 = 0.1;
const ALPHA_SPREAD: f64 = 0.3;

/// Drawing target for the particle field. Implemented for the browser's
/// 2D canvas context and by recorders in tests.
pub trait Surface {
    fn clear(&mut self, width: f64, height: f64);
    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: &str);
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub dx: f64,
    pub dy: f64,
    pub radius: f64,
    pub alpha: f64,
}

impl Particle {
    /// `random` yields values in `[0, 1)`.
    pub fn random(width: f64, height: f64, random: &mut dyn FnMut() -> f64) -> Self {
        Self {
            x: wrap(random() * width, width),
            y: wrap(random() * height, height),
            radius: random() * RADIUS_SPREAD + MIN_RADIUS,
            dx: random() * 2.0 * MAX_SPEED - MAX_SPEED,
            dy: random() * 2.0 * MAX_SPEED - MAX_SPEED,
            alpha: random() * ALPHA_SPREAD + MIN_ALPHA,
        }
    }

    pub fn update(&mut self, width: f64, height: f64) {
        self.x = wrap(self.x + self.dx, width);
        self.y = wrap(self.y + self.dy, height);
    }

    pub fn color(&self) -> String {
        let (r, g, b) = PARTICLE_RGB;
        format!("rgba({r}, {g}, {b}, {:.3})", self.alpha)
    }
}

/// Folds `value` into `[0, extent)`, re-entering from the opposite edge.
fn wrap(value: f64, extent: f64) -> f64 {
    if extent <= 0.0 || !value.is_finite() {
        return 0.0;
    }

    let wrapped = value.rem_euclid(extent);
    // rem_euclid can round up to `extent` for tiny negative inputs.
    if wrapped >= extent {
        0.0
    } else {
        wrapped
    }
}

pub fn particle_count(width: f64, height: f64, area_per_particle: f64) -> usize {
    if width <= 0.0 || height <= 0.0 || area_per_particle <= 0.0 {
        return 0;
    }

    (width * height / area_per_particle).floor() as usize
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParticleField {
    width: f64,
    height: f64,
    area_per_particle: f64,
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn generate(
        width: f64,
        height: f64,
        area_per_particle: f64,
        random: &mut dyn FnMut() -> f64,
    ) -> Self {
        let count = particle_count(width, height, area_per_particle);
        let particles = (0..count)
            .map(|_| Particle::random(width, height, random))
            .collect();

        Self {
            width,
            height,
            area_per_particle,
            particles,
        }
    }

    /// Discards every particle and regenerates for the new size.
    pub fn resize(&mut self, width: f64, height: f64, random: &mut dyn FnMut() -> f64) {
        *self = Self::generate(width, height, self.area_per_particle, random);
    }

    pub fn step(&mut self) {
        for particle in &mut self.particles {
            particle.update(self.width, self.height);
        }
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        surface.clear(self.width, self.height);
        for particle in &self.particles {
            surface.fill_circle(particle.x, particle.y, particle.radius, &particle.color());
        }
    }

    /// One animation frame: move, then draw.
    pub fn frame(&mut self, surface: &mut dyn Surface) {
        self.step();
        self.render(surface);
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}
