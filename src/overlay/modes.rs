//! Creative-mode renderers. All but [`pixelate`] draw onto the overlay layer.

use std::f32::consts::TAU;

use super::composite::source_over;
use crate::effects::RadialGradient;
use crate::frame::PixelBuffer;

/// Ghost copy scale and offset, as fractions of the buffer size.
const GHOST_SCALE: f32 = 0.8;
const GHOST_OFFSET: f32 = 0.1;
const GHOST_OPACITY: f32 = 0.5;

/// Portrait depth cue: transparent inside 0.3, 60% black at 0.6 of the larger dimension.
const PORTRAIT_INNER: f32 = 0.3;
const PORTRAIT_OUTER: f32 = 0.6;
const PORTRAIT_ALPHA: f32 = 0.6;

/// Pixelate block size in pixels.
pub const PIXELATE_BLOCK: u32 = 10;

/// Draw `base` scaled to 80% at a 10% offset, half transparent.
pub fn double_exposure(base: &PixelBuffer, layer: &mut PixelBuffer) -> u32 {
    let (w, h) = (base.width(), base.height());
    let x0 = (w as f32 * GHOST_OFFSET).round() as u32;
    let y0 = (h as f32 * GHOST_OFFSET).round() as u32;
    let dw = ((w as f32 * GHOST_SCALE).round() as u32).max(1);
    let dh = ((h as f32 * GHOST_SCALE).round() as u32).max(1);

    for y in 0..dh {
        let sy = (y as u64 * h as u64 / dh as u64) as u32;
        for x in 0..dw {
            let sx = (x as u64 * w as u64 / dw as u64) as u32;
            let Some(src) = base.get(sx, sy) else {
                continue;
            };
            if let Some(dst) = layer.pixel_mut(x0 + x, y0 + y) {
                source_over(dst, src, GHOST_OPACITY);
            }
        }
    }
    1
}

/// Fill the layer with a radial black gradient around the center.
pub fn portrait(layer: &mut PixelBuffer) -> u32 {
    let (w, h) = (layer.width(), layer.height());
    let reference = w.max(h) as f32;
    let gradient = RadialGradient::centered(w, h, reference, PORTRAIT_INNER, PORTRAIT_OUTER, PORTRAIT_ALPHA);

    for y in 0..h {
        for x in 0..w {
            let alpha = gradient.alpha_at(x, y);
            if alpha <= 0.0 {
                continue;
            }
            if let Some(dst) = layer.pixel_mut(x, y) {
                source_over(dst, [0, 0, 0, 255], alpha);
            }
        }
    }
    1
}

/// Draw `segments` copies of `base`, copy `i` rotated by `i * 2pi / segments`
/// about the center and mirrored horizontally when `i` is odd. Later copies
/// land on top. Returns the number of copies drawn.
pub fn kaleidoscope(base: &PixelBuffer, layer: &mut PixelBuffer, segments: u32) -> u32 {
    let (w, h) = (base.width(), base.height());
    if w == 0 || h == 0 {
        return 0;
    }
    let cx = w as f32 / 2.0;
    let cy = h as f32 / 2.0;

    for i in 0..segments {
        let theta = i as f32 * TAU / segments as f32;
        let (sin, cos) = theta.sin_cos();
        let mirror = i % 2 == 1;

        // Inverse mapping: destination pixel center back into source space
        for y in 0..h {
            let dy = y as f32 + 0.5 - cy;
            for x in 0..w {
                let dx = x as f32 + 0.5 - cx;
                let mut ux = dx * cos + dy * sin;
                let uy = -dx * sin + dy * cos;
                if mirror {
                    ux = -ux;
                }
                let sx = (cx + ux).floor();
                let sy = (cy + uy).floor();
                if sx < 0.0 || sy < 0.0 || sx >= w as f32 || sy >= h as f32 {
                    continue;
                }
                let Some(src) = base.get(sx as u32, sy as u32) else {
                    continue;
                };
                if let Some(dst) = layer.pixel_mut(x, y) {
                    source_over(dst, src, 1.0);
                }
            }
        }
    }
    segments
}

/// Nearest-neighbor downsample by `block` and back up, in place on the base buffer.
pub fn pixelate(base: &mut PixelBuffer, block: u32) -> u32 {
    let (w, h) = (base.width(), base.height());
    if w == 0 || h == 0 || block <= 1 {
        return 0;
    }
    let sw = (w / block).max(1);
    let sh = (h / block).max(1);

    let mut small = PixelBuffer::new(sw, sh);
    for y in 0..sh {
        let src_y = (y as u64 * h as u64 / sh as u64) as u32;
        for x in 0..sw {
            let src_x = (x as u64 * w as u64 / sw as u64) as u32;
            if let Some(px) = base.get(src_x, src_y) {
                small.set(x, y, px);
            }
        }
    }

    for y in 0..h {
        let src_y = (y as u64 * sh as u64 / h as u64) as u32;
        for x in 0..w {
            let src_x = (x as u64 * sw as u64 / w as u64) as u32;
            if let Some(px) = small.get(src_x, src_y) {
                base.set(x, y, px);
            }
        }
    }
    1
}
