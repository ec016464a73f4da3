//! Photographic styles: per-channel gain/offset, or a luminance split for `dramatic`.

use crate::frame::{clamp_channel, luminance, PixelBuffer};
use crate::params::StyleId;

/// Luminance threshold separating shadows from highlights in the dramatic style.
const MID_GRAY: f32 = 128.0;

/// How a style maps one pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StyleTransform {
    /// `out = in * gain + offset` per RGB channel
    Linear { gain: [f32; 3], offset: [f32; 3] },
    /// Pixels darker than mid-gray scaled by `shadows`, the rest by `highlights`
    Split { shadows: f32, highlights: f32 },
}

impl StyleTransform {
    /// Transform for a style, or `None` for the no-op standard style.
    pub fn for_style(style: StyleId) -> Option<Self> {
        let linear = |gain, offset| Some(Self::Linear { gain, offset });
        match style {
            StyleId::Standard => None,
            StyleId::Vibrant => linear([1.15, 1.10, 1.15], [0.0; 3]),
            StyleId::Warm => linear([1.10, 1.00, 0.90], [10.0, 5.0, 0.0]),
            StyleId::Cool => linear([0.90, 1.00, 1.10], [0.0, 0.0, 10.0]),
            StyleId::Natural => linear([1.02, 1.02, 0.98], [0.0; 3]),
            StyleId::Dramatic => Some(Self::Split {
                shadows: 0.7,
                highlights: 1.3,
            }),
        }
    }

    #[inline]
    fn map(&self, px: &mut [u8]) {
        match *self {
            Self::Linear { gain, offset } => {
                for c in 0..3 {
                    px[c] = clamp_channel(px[c] as f32 * gain[c] + offset[c]);
                }
            }
            Self::Split { shadows, highlights } => {
                let l = luminance(px[0] as f32, px[1] as f32, px[2] as f32);
                let k = if l < MID_GRAY { shadows } else { highlights };
                for c in px.iter_mut().take(3) {
                    *c = clamp_channel(*c as f32 * k);
                }
            }
        }
    }
}

/// Apply a style in place.
pub fn apply(buffer: &mut PixelBuffer, style: StyleId) {
    let Some(transform) = StyleTransform::for_style(style) else {
        return;
    };
    for px in buffer.pixels_mut() {
        transform.map(px);
    }
}
