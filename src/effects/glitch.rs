//! Stochastic glitch: random horizontal block displacement and RGB split.
//!
//! Every pixel draws its own random numbers from the injected generator, so a
//! seeded generator gives a reproducible frame. Reads always come from an
//! unmodified copy of the input.

use rand::Rng;

use crate::frame::{PixelBuffer, BYTES_PER_PIXEL};

/// Tunables for the glitch filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlitchParams {
    /// Per-pixel probability of copying RGB from a horizontally displaced pixel
    pub block_chance: f32,
    /// Per-pixel probability of the red/blue channel split
    pub split_chance: f32,
    /// Maximum displacement in pixels, either direction
    pub max_offset: i64,
    /// Distance in pixels of the red (right) and blue (left) split sources
    pub split_distance: usize,
}

impl Default for GlitchParams {
    fn default() -> Self {
        Self {
            block_chance: 0.05,
            split_chance: 0.01,
            max_offset: 10,
            split_distance: 8,
        }
    }
}

impl GlitchParams {
    /// Both probabilities zero: the filter cannot change anything.
    pub fn is_inert(&self) -> bool {
        self.block_chance <= 0.0 && self.split_chance <= 0.0
    }
}

/// What one glitch pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlitchStats {
    /// Pixels whose RGB came from a displaced pixel
    pub displaced: usize,
    /// Pixels that received the red/blue split
    pub split: usize,
}

/// Apply the glitch filter in place.
///
/// Pixel positions are flat row-major indices, so displacement near a row end
/// may sample the neighbouring row; every source index is clamped to the buffer.
pub fn apply<R: Rng + ?Sized>(buffer: &mut PixelBuffer, params: &GlitchParams, rng: &mut R) -> GlitchStats {
    let mut stats = GlitchStats::default();
    let n = buffer.len();
    if n == 0 || params.is_inert() {
        return stats;
    }

    let source = buffer.as_bytes().to_vec();
    let data = buffer.as_bytes_mut();
    let last = n - 1;
    let max_offset = params.max_offset.max(0);

    for i in 0..n {
        let d = i * BYTES_PER_PIXEL;

        if rng.random::<f32>() < params.block_chance {
            let offset = rng.random_range(-max_offset..=max_offset);
            let src = (i as i64 + offset).clamp(0, last as i64) as usize * BYTES_PER_PIXEL;
            data[d..d + 3].copy_from_slice(&source[src..src + 3]);
            stats.displaced += 1;
        }

        if rng.random::<f32>() < params.split_chance {
            let right = (i + params.split_distance).min(last) * BYTES_PER_PIXEL;
            let left = i.saturating_sub(params.split_distance) * BYTES_PER_PIXEL;
            data[d] = source[right];
            data[d + 2] = source[left + 2];
            stats.split += 1;
        }
    }

    stats
}
