//! Tonal adjustment: exposure, contrast, brightness and saturation in a single pass.

use crate::frame::{clamp_channel, luminance, PixelBuffer};
use crate::params::{EffectParameters, BRIGHTNESS_RANGE, CONTRAST_RANGE, EXPOSURE_RANGE, SATURATION_RANGE};

/// Contrast multiplier for a contrast percentage.
///
/// `c = (contrast - 100) * 2.55`, `factor = 259 (c + 255) / (255 (259 - c))`.
/// The input is clamped to [0, 200] so `c` stays within [-255, 255] and the
/// denominator never reaches zero.
pub fn contrast_factor(contrast: i32) -> f32 {
    let contrast = contrast.clamp(CONTRAST_RANGE.0, CONTRAST_RANGE.1);
    let c = (contrast - 100) as f32 * 2.55;
    (259.0 * (c + 255.0)) / (255.0 * (259.0 - c))
}

/// Apply the tone stage in place. Alpha is untouched.
///
/// Per channel: exposure gain, contrast around 128, brightness offset, then
/// saturation against the luminance of the adjusted pixel, then clamp.
pub fn apply(buffer: &mut PixelBuffer, params: &EffectParameters) {
    if params.is_neutral_tone() {
        return;
    }

    let exposure = if params.exposure.is_finite() {
        params.exposure.clamp(EXPOSURE_RANGE.0, EXPOSURE_RANGE.1)
    } else {
        0.0
    };
    let gain = 1.0 + exposure * 0.5;
    let factor = contrast_factor(params.contrast);
    let brightness = params.brightness.clamp(BRIGHTNESS_RANGE.0, BRIGHTNESS_RANGE.1) as f32;
    let saturation = params.saturation.clamp(SATURATION_RANGE.0, SATURATION_RANGE.1) as f32 / 100.0;

    for px in buffer.pixels_mut() {
        let mut rgb = [px[0] as f32, px[1] as f32, px[2] as f32];
        for v in rgb.iter_mut() {
            *v *= gain;
            *v = factor * (*v - 128.0) + 128.0;
            *v += brightness;
        }

        let gray = luminance(rgb[0], rgb[1], rgb[2]);
        for (channel, v) in px.iter_mut().zip(rgb) {
            *channel = clamp_channel(gray + (v - gray) * saturation);
        }
    }
}
