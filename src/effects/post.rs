//! Post-processing: separable Gaussian blur and radial vignette.

use crate::frame::{clamp_channel, PixelBuffer, BYTES_PER_PIXEL};
use crate::params::{EffectParameters, BLUR_MAX_PX};

/// Inner and outer vignette radii as fractions of the larger half-dimension.
const VIGNETTE_INNER: f32 = 0.3;
const VIGNETTE_OUTER: f32 = 0.7;

/// Radial alpha ramp: 0 inside `inner`, linear up to `max_alpha` at `outer`, flat beyond.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialGradient {
    pub cx: f32,
    pub cy: f32,
    pub inner: f32,
    pub outer: f32,
    pub max_alpha: f32,
}

impl RadialGradient {
    /// Gradient centered on a `width` x `height` buffer with radii relative to `reference`.
    pub fn centered(width: u32, height: u32, reference: f32, inner: f32, outer: f32, max_alpha: f32) -> Self {
        Self {
            cx: width as f32 / 2.0,
            cy: height as f32 / 2.0,
            inner: reference * inner,
            outer: reference * outer,
            max_alpha,
        }
    }

    /// Interpolated alpha at pixel (x, y), sampled at the pixel center.
    pub fn alpha_at(&self, x: u32, y: u32) -> f32 {
        let dx = x as f32 + 0.5 - self.cx;
        let dy = y as f32 + 0.5 - self.cy;
        let d = (dx * dx + dy * dy).sqrt();
        if d <= self.inner {
            0.0
        } else if d >= self.outer || self.outer <= self.inner {
            self.max_alpha
        } else {
            self.max_alpha * (d - self.inner) / (self.outer - self.inner)
        }
    }
}

/// Run blur then vignette according to the parameters.
pub fn apply(buffer: &mut PixelBuffer, params: &EffectParameters) {
    if params.blur_radius_px > 0 {
        blur(buffer, params.blur_radius_px);
    }
    if params.vignette_strength > 0.0 {
        vignette(buffer, params.vignette_strength);
    }
}

/// Normalized 1-D Gaussian with sigma = `radius` and half-width ceil(3 sigma).
pub fn gaussian_kernel(radius: u32) -> Vec<f32> {
    if radius == 0 {
        return vec![1.0];
    }
    let sigma = radius as f32;
    let half = (3.0 * sigma).ceil() as i32;
    let denom = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (-half..=half)
        .map(|i| (-((i * i) as f32) / denom).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    for w in kernel.iter_mut() {
        *w /= sum;
    }
    kernel
}

/// Separable Gaussian blur of the RGB channels, edges clamped. Alpha is untouched.
pub fn blur(buffer: &mut PixelBuffer, radius: u32) {
    let radius = radius.min(BLUR_MAX_PX);
    if radius == 0 || buffer.is_empty() {
        return;
    }

    let w = buffer.width() as usize;
    let h = buffer.height() as usize;
    let kernel = gaussian_kernel(radius);
    let half = (kernel.len() / 2) as isize;

    // Horizontal pass into f32 scratch, 3 floats per pixel
    let src = buffer.as_bytes();
    let mut tmp = vec![0.0f32; w * h * 3];
    for y in 0..h {
        let row = y * w;
        for x in 0..w {
            let mut acc = [0.0f32; 3];
            for (k, weight) in kernel.iter().enumerate() {
                let sx = (x as isize + k as isize - half).clamp(0, w as isize - 1) as usize;
                let s = (row + sx) * BYTES_PER_PIXEL;
                acc[0] += src[s] as f32 * weight;
                acc[1] += src[s + 1] as f32 * weight;
                acc[2] += src[s + 2] as f32 * weight;
            }
            tmp[(row + x) * 3..(row + x) * 3 + 3].copy_from_slice(&acc);
        }
    }

    // Vertical pass back into the buffer
    let data = buffer.as_bytes_mut();
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 3];
            for (k, weight) in kernel.iter().enumerate() {
                let sy = (y as isize + k as isize - half).clamp(0, h as isize - 1) as usize;
                let t = (sy * w + x) * 3;
                acc[0] += tmp[t] * weight;
                acc[1] += tmp[t + 1] * weight;
                acc[2] += tmp[t + 2] * weight;
            }
            let d = (y * w + x) * BYTES_PER_PIXEL;
            data[d] = clamp_channel(acc[0]);
            data[d + 1] = clamp_channel(acc[1]);
            data[d + 2] = clamp_channel(acc[2]);
        }
    }
}

/// Darken toward black: `out = pixel * (1 - alpha)`.
pub fn vignette(buffer: &mut PixelBuffer, strength: f32) {
    if strength.is_nan() || strength <= 0.0 {
        return;
    }
    let strength = strength.min(1.0);
    let (w, h) = (buffer.width(), buffer.height());
    let half = w.max(h) as f32 / 2.0;
    let gradient = RadialGradient::centered(w, h, half, VIGNETTE_INNER, VIGNETTE_OUTER, strength);

    for y in 0..h {
        for x in 0..w {
            let alpha = gradient.alpha_at(x, y);
            if alpha <= 0.0 {
                continue;
            }
            if let Some(px) = buffer.pixel_mut(x, y) {
                let keep = 1.0 - alpha;
                for c in px.iter_mut().take(3) {
                    *c = clamp_channel(*c as f32 * keep);
                }
            }
        }
    }
}
