//! Straight-alpha source-over blending.

use crate::frame::{clamp_channel, PixelBuffer};

/// Blend `src` (straight RGBA) over `dst` in place, with `opacity` in [0, 1]
/// multiplied into the source alpha.
#[inline]
pub fn source_over(dst: &mut [u8], src: [u8; 4], opacity: f32) {
    let sa = src[3] as f32 / 255.0 * opacity.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }
    for c in 0..3 {
        let v = (src[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
        dst[c] = clamp_channel(v);
    }
    dst[3] = clamp_channel(out_a * 255.0);
}

/// Composite `layer` over `base`, pixel for pixel. Both must be the same size;
/// returns false and leaves `base` alone otherwise.
pub fn blend_over(base: &mut PixelBuffer, layer: &PixelBuffer) -> bool {
    if !base.same_size(layer) {
        return false;
    }
    for (dst, src) in base.pixels_mut().zip(layer.pixels()) {
        if src[3] == 0 {
            continue;
        }
        source_over(dst, [src[0], src[1], src[2], src[3]], 1.0);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opaque_source_replaces() {
        let mut dst = [10, 20, 30, 255];
        source_over(&mut dst, [200, 100, 50, 255], 1.0);
        assert_eq!(dst, [200, 100, 50, 255]);
    }

    #[test]
    fn test_transparent_source_is_noop() {
        let mut dst = [10, 20, 30, 255];
        source_over(&mut dst, [200, 100, 50, 0], 1.0);
        source_over(&mut dst, [200, 100, 50, 255], 0.0);
        assert_eq!(dst, [10, 20, 30, 255]);
    }

    #[test]
    fn test_half_opacity_over_opaque() {
        let mut dst = [0, 0, 0, 255];
        source_over(&mut dst, [200, 100, 50, 255], 0.5);
        assert_eq!(dst, [100, 50, 25, 255]);
    }

    #[test]
    fn test_over_transparent_keeps_color() {
        let mut dst = [0, 0, 0, 0];
        source_over(&mut dst, [0, 243, 255, 255], 0.5);
        assert_eq!(&dst[..3], &[0, 243, 255]);
        assert_eq!(dst[3], 128);
    }

    #[test]
    fn test_blend_over_size_mismatch() {
        let mut base = PixelBuffer::filled(2, 2, [1, 1, 1, 255]);
        let layer = PixelBuffer::filled(3, 2, [9, 9, 9, 255]);
        assert!(!blend_over(&mut base, &layer));
        assert_eq!(base.get(0, 0), Some([1, 1, 1, 255]));
    }
}
