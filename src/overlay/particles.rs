//! Rising point sprites that live for about a hundred ticks.

use rand::Rng;

use super::composite::source_over;
use crate::frame::PixelBuffer;

/// Sprite color; alpha comes from the particle's remaining life.
const PARTICLE_RGB: [u8; 3] = [0, 243, 255];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    /// Remaining life in [0, 1]; the particle is culled once this reaches 0
    pub life: f32,
    /// Radius in pixels
    pub size: f32,
}

impl Particle {
    /// A fresh particle at (x, y) with full life.
    pub fn new(x: f32, y: f32, vx: f32, vy: f32, size: f32) -> Self {
        Self {
            x,
            y,
            vx,
            vy,
            life: 1.0,
            size,
        }
    }
}

/// Owned live set with retain-on-update culling. Iteration order is insertion order.
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    spawn_chance: f32,
    decay: f32,
}

impl Default for ParticleSystem {
    fn default() -> Self {
        Self {
            particles: Vec::new(),
            spawn_chance: 0.3,
            decay: 0.01,
        }
    }
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the per-tick spawn probability.
    pub fn with_spawn_chance(mut self, chance: f32) -> Self {
        self.spawn_chance = chance;
        self
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

    pub fn push(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// One tick: maybe spawn at the bottom edge of a `width` x `height` area, then step.
    pub fn update<R: Rng + ?Sized>(&mut self, width: u32, height: u32, rng: &mut R) {
        if rng.random::<f32>() < self.spawn_chance {
            let x = rng.random::<f32>() * width as f32;
            let vx = rng.random_range(-1.0..=1.0);
            let vy = rng.random_range(-4.0..=-1.0);
            let size = rng.random_range(2.0..=6.0);
            self.particles.push(Particle::new(x, height as f32, vx, vy, size));
        }
        self.step();
    }

    /// Integrate positions, decay life, and drop every particle with `life <= 0`.
    pub fn step(&mut self) {
        let decay = self.decay;
        self.particles.retain_mut(|p| {
            p.x += p.vx;
            p.y += p.vy;
            p.life -= decay;
            p.life > 0.0
        });
    }

    /// Draw every live particle as a filled circle onto `layer`, oldest first.
    pub fn draw(&self, layer: &mut PixelBuffer) {
        let (w, h) = (layer.width() as i64, layer.height() as i64);
        let src = [PARTICLE_RGB[0], PARTICLE_RGB[1], PARTICLE_RGB[2], 255];

        for p in &self.particles {
            let r = p.size.max(0.0);
            let x0 = ((p.x - r).floor() as i64).max(0);
            let x1 = ((p.x + r).ceil() as i64).min(w - 1);
            let y0 = ((p.y - r).floor() as i64).max(0);
            let y1 = ((p.y + r).ceil() as i64).min(h - 1);
            let r2 = r * r;

            for y in y0..=y1 {
                let dy = y as f32 + 0.5 - p.y;
                for x in x0..=x1 {
                    let dx = x as f32 + 0.5 - p.x;
                    if dx * dx + dy * dy > r2 {
                        continue;
                    }
                    if let Some(px) = layer.pixel_mut(x as u32, y as u32) {
                        source_over(px, src, p.life);
                    }
                }
            }
        }
    }
}
