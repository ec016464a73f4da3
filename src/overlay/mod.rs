//! Creative-mode overlays.
//!
//! Every mode except pixelate renders onto a transparent layer the size of the
//! base buffer, which is then blended over the base. Pixelate rewrites the base
//! buffer directly and leaves the layer empty. The particle set persists across
//! ticks and is only advanced while particles mode is active.

pub mod composite;
pub mod modes;
pub mod particles;

use rand::Rng;

pub use composite::{blend_over, source_over};
pub use particles::{Particle, ParticleSystem};

use crate::error::PipelineError;
use crate::frame::PixelBuffer;
use crate::params::CreativeMode;

/// Number of kaleidoscope copies.
pub const KALEIDOSCOPE_SEGMENTS: u32 = 8;

/// Result of one overlay pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayOutcome {
    /// Whether the layer was blended onto the base
    pub composited: bool,
    /// Draw calls issued for the mode (kaleidoscope copies, ghost copies, ...)
    pub draws: u32,
}

pub struct OverlayCompositor {
    layer: PixelBuffer,
    particles: ParticleSystem,
    last_mode: Option<CreativeMode>,
    segments: u32,
}

impl Default for OverlayCompositor {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayCompositor {
    pub fn new() -> Self {
        Self {
            layer: PixelBuffer::default(),
            particles: ParticleSystem::new(),
            last_mode: None,
            segments: KALEIDOSCOPE_SEGMENTS,
        }
    }

    pub fn with_particles(mut self, particles: ParticleSystem) -> Self {
        self.particles = particles;
        self
    }

    pub fn with_segments(mut self, segments: u32) -> Self {
        self.segments = segments;
        self
    }

    /// Overlay layer as drawn on the last call.
    pub fn layer(&self) -> &PixelBuffer {
        &self.layer
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut ParticleSystem {
        &mut self.particles
    }

    /// Render `mode` for this tick and composite it onto `base`.
    ///
    /// `face-ar` clears the layer and returns [`PipelineError::UnsupportedMode`];
    /// the base buffer is left as it was.
    pub fn render<R: Rng + ?Sized>(
        &mut self,
        mode: Option<CreativeMode>,
        base: &mut PixelBuffer,
        rng: &mut R,
    ) -> Result<OverlayOutcome, PipelineError> {
        let entering = mode != self.last_mode;
        self.last_mode = mode;
        if entering {
            match mode {
                Some(mode) => log::debug!("creative mode: {}", mode),
                None => log::debug!("creative mode: off"),
            }
        }

        if self.layer.resize(base.width(), base.height()) {
            log::debug!("overlay layer resized to {}x{}", base.width(), base.height());
        } else {
            self.layer.clear();
        }

        let Some(mode) = mode else {
            return Ok(OverlayOutcome::default());
        };

        let draws = match mode {
            CreativeMode::FaceAr => {
                if entering {
                    log::warn!("creative mode '{}' is not available", mode);
                }
                return Err(PipelineError::UnsupportedMode { mode });
            }
            CreativeMode::Pixelate => {
                let draws = modes::pixelate(base, modes::PIXELATE_BLOCK);
                return Ok(OverlayOutcome {
                    composited: false,
                    draws,
                });
            }
            CreativeMode::Particles => {
                self.particles.update(base.width(), base.height(), rng);
                self.particles.draw(&mut self.layer);
                self.particles.len() as u32
            }
            CreativeMode::DoubleExposure => modes::double_exposure(base, &mut self.layer),
            CreativeMode::Portrait => modes::portrait(&mut self.layer),
            CreativeMode::Kaleidoscope => modes::kaleidoscope(base, &mut self.layer, self.segments),
        };

        let composited = blend_over(base, &self.layer);
        Ok(OverlayOutcome { composited, draws })
    }
}
