//! Stylistic filter catalog. One filter per tick, `none` leaves the buffer alone.

use rand::Rng;

use super::glitch::{self, GlitchParams};
use crate::frame::{clamp_channel, luminance, PixelBuffer};
use crate::params::FilterId;

/// Average-brightness breakpoints of the thermal false-color ramp.
const THERMAL_LOW: f32 = 85.0;
const THERMAL_HIGH: f32 = 170.0;

/// Apply `filter` in place. Glitch draws from `rng`; every other filter is deterministic.
pub fn apply<R: Rng + ?Sized>(buffer: &mut PixelBuffer, filter: FilterId, glitch: &GlitchParams, rng: &mut R) {
    match filter {
        FilterId::None => {}
        FilterId::Glitch => {
            let stats = glitch::apply(buffer, glitch, rng);
            log::trace!(
                "glitch: {} displaced, {} split",
                stats.displaced,
                stats.split
            );
        }
        _ => {
            for px in buffer.pixels_mut() {
                let [r, g, b] = remap(filter, px[0] as f32, px[1] as f32, px[2] as f32);
                px[0] = clamp_channel(r);
                px[1] = clamp_channel(g);
                px[2] = clamp_channel(b);
            }
        }
    }
}

/// Per-pixel channel remap of the deterministic filters. Output is unclamped.
pub fn remap(filter: FilterId, r: f32, g: f32, b: f32) -> [f32; 3] {
    match filter {
        FilterId::Vintage => [
            r * 0.9 + g * 0.5 + b * 0.1,
            r * 0.3 + g * 0.8 + b * 0.1,
            r * 0.2 + g * 0.3 + b * 0.5,
        ],
        FilterId::Cyberpunk => [r * 0.5, g * 1.2, b * 1.5],
        FilterId::Vaporwave => [r * 1.3, g * 0.8, b * 1.5],
        FilterId::Neon => [r * 1.5, g * 1.3, b * 1.8],
        FilterId::Noir => {
            let gray = luminance(r, g, b);
            [gray; 3]
        }
        FilterId::Thermal => thermal((r + g + b) / 3.0),
        FilterId::None | FilterId::Glitch => [r, g, b],
    }
}

/// Three-band false color: dark to blue, mid to a red/green ramp, bright to red/yellow.
fn thermal(avg: f32) -> [f32; 3] {
    if avg < THERMAL_LOW {
        [0.0, 0.0, avg * 3.0]
    } else if avg < THERMAL_HIGH {
        [(avg - THERMAL_LOW) * 3.0, avg * 1.5, 0.0]
    } else {
        [255.0, (255.0 - avg) * 3.0, 0.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn run(filter: FilterId, rgb: [u8; 3]) -> [u8; 4] {
        let mut buffer = PixelBuffer::filled(1, 1, [rgb[0], rgb[1], rgb[2], 255]);
        apply(
            &mut buffer,
            filter,
            &GlitchParams::default(),
            &mut StdRng::seed_from_u64(0),
        );
        buffer.get(0, 0).unwrap()
    }

    #[test]
    fn test_none_is_bitwise_noop() {
        let mut buffer = PixelBuffer::new(5, 3);
        for (i, px) in buffer.pixels_mut().enumerate() {
            px.copy_from_slice(&[i as u8, (i * 7) as u8, (i * 13) as u8, (i * 3) as u8]);
        }
        let before = buffer.clone();
        apply(
            &mut buffer,
            FilterId::None,
            &GlitchParams::default(),
            &mut StdRng::seed_from_u64(0),
        );
        assert_eq!(buffer, before);
    }

    #[test]
    fn test_noir_gray() {
        assert_eq!(run(FilterId::Noir, [200, 100, 50]), [124, 124, 124, 255]);
    }

    #[test]
    fn test_multiplicative_filters_clamp() {
        assert_eq!(run(FilterId::Neon, [200, 200, 200]), [255, 255, 255, 255]);
        assert_eq!(run(FilterId::Cyberpunk, [200, 100, 200]), [100, 120, 255, 255]);
        assert_eq!(run(FilterId::Vaporwave, [100, 100, 200]), [130, 80, 255, 255]);
    }

    #[test]
    fn test_vintage_mixes_and_clamps() {
        // 255 * (0.9 + 0.5 + 0.1) = 382.5 -> 255
        assert_eq!(run(FilterId::Vintage, [255, 255, 255]), [255, 255, 255, 255]);
        assert_eq!(run(FilterId::Vintage, [100, 0, 0]), [90, 30, 20, 255]);
    }

    #[test]
    fn test_thermal_bands() {
        // dark: avg 30 -> blue 90
        assert_eq!(run(FilterId::Thermal, [30, 30, 30]), [0, 0, 90, 255]);
        // mid: avg 100 -> r 45, g 150
        assert_eq!(run(FilterId::Thermal, [100, 100, 100]), [45, 150, 0, 255]);
        // bright: avg 200 -> r 255, g 165
        assert_eq!(run(FilterId::Thermal, [200, 200, 200]), [255, 165, 0, 255]);
    }

    #[test]
    fn test_thermal_breakpoints() {
        assert_eq!(thermal(84.9)[0], 0.0);
        assert_eq!(thermal(85.0)[2], 0.0);
        assert_eq!(thermal(170.0)[0], 255.0);
    }
}
