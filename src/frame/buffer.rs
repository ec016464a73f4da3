//! RGBA working buffer shared by every pipeline stage.

use std::slice::{ChunksExact, ChunksExactMut};

use super::source::Frame;
use crate::error::PipelineError;

/// Bytes per RGBA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Luminance weights used for saturation and grayscale conversion.
const LUMA_R: f32 = 0.2989;
const LUMA_G: f32 = 0.5870;
const LUMA_B: f32 = 0.1140;

/// Saturating cast of a channel value to [0, 255].
///
/// Rounds to nearest. NaN maps to 0 so a bad input can never leak into a pixel.
#[inline]
pub fn clamp_channel(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

/// Weighted luminance `0.2989R + 0.5870G + 0.1140B`.
#[inline]
pub fn luminance(r: f32, g: f32, b: f32) -> f32 {
    LUMA_R * r + LUMA_G * g + LUMA_B * b
}

/// A width x height array of RGBA samples.
///
/// Invariant: `data.len() == width * height * 4`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; pixel_count(width, height) * BYTES_PER_PIXEL],
        }
    }

    /// Create a buffer with every pixel set to `rgba`.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut buffer = Self::new(width, height);
        buffer.fill(rgba);
        buffer
    }

    /// Wrap existing RGBA bytes, checking the length against the dimensions.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, PipelineError> {
        let expected = pixel_count(width, height) * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(PipelineError::BufferSizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() / BYTES_PER_PIXEL
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn same_size(&self, other: &PixelBuffer) -> bool {
        self.width == other.width && self.height == other.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Iterate pixels as 4-byte RGBA slices in row-major order.
    pub fn pixels(&self) -> ChunksExact<'_, u8> {
        self.data.chunks_exact(BYTES_PER_PIXEL)
    }

    pub fn pixels_mut(&mut self) -> ChunksExactMut<'_, u8> {
        self.data.chunks_exact_mut(BYTES_PER_PIXEL)
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some((y as usize * self.width as usize + x as usize) * BYTES_PER_PIXEL)
        } else {
            None
        }
    }

    /// Read the pixel at (x, y), or `None` when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let i = self.offset(x, y)?;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Write the pixel at (x, y). Out-of-bounds writes are ignored and return false.
    pub fn set(&mut self, x: u32, y: u32, rgba: [u8; 4]) -> bool {
        match self.offset(x, y) {
            Some(i) => {
                self.data[i..i + BYTES_PER_PIXEL].copy_from_slice(&rgba);
                true
            }
            None => false,
        }
    }

    /// Mutable view of one pixel's four bytes.
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> Option<&mut [u8]> {
        let i = self.offset(x, y)?;
        Some(&mut self.data[i..i + BYTES_PER_PIXEL])
    }

    pub fn fill(&mut self, rgba: [u8; 4]) {
        for px in self.pixels_mut() {
            px.copy_from_slice(&rgba);
        }
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Reallocate to new dimensions. Contents are reset to transparent black
    /// when the size changes. Returns true if a resize happened.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == self.width && height == self.height {
            return false;
        }
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data
            .resize(pixel_count(width, height) * BYTES_PER_PIXEL, 0);
        true
    }

    /// Blit a source frame into this buffer.
    ///
    /// The working size is the frame size multiplied by `scale` (at least 1x1 for a
    /// non-empty frame). If that differs from the current size the buffer is resized
    /// first; it never truncates. Resampling is nearest-neighbor. With `mirror` the
    /// horizontal coordinate is flipped during the copy.
    ///
    /// Returns `Ok(true)` when the buffer had to be resized.
    pub fn copy_from(&mut self, frame: &Frame, mirror: bool, scale: f32) -> Result<bool, PipelineError> {
        let bpp = frame.bytes_per_pixel();
        let expected = pixel_count(frame.width, frame.height) * bpp;
        if frame.data.len() != expected {
            return Err(PipelineError::BufferSizeMismatch {
                expected,
                actual: frame.data.len(),
            });
        }

        let (width, height) = scaled_size(frame.width, frame.height, scale);
        let resized = self.resize(width, height);
        if self.is_empty() {
            return Ok(resized);
        }

        let src_w = frame.width as usize;
        let src_h = frame.height as usize;
        let dst_w = width as usize;
        let dst_h = height as usize;

        for y in 0..dst_h {
            let sy = y * src_h / dst_h;
            let src_row = sy * src_w;
            let dst_row = y * dst_w;
            for x in 0..dst_w {
                let mut sx = x * src_w / dst_w;
                if mirror {
                    sx = src_w - 1 - sx;
                }
                let s = (src_row + sx) * bpp;
                let d = (dst_row + x) * BYTES_PER_PIXEL;
                self.data[d] = frame.data[s];
                self.data[d + 1] = frame.data[s + 1];
                self.data[d + 2] = frame.data[s + 2];
                self.data[d + 3] = if bpp == 4 { frame.data[s + 3] } else { 255 };
            }
        }

        Ok(resized)
    }
}

#[inline]
fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// Apply a resolution scale, keeping a non-empty frame at least 1x1.
fn scaled_size(width: u32, height: u32, scale: f32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }
    if !(scale.is_finite() && scale > 0.0) || scale == 1.0 {
        return (width, height);
    }
    let w = ((width as f32 * scale).round() as u32).max(1);
    let h = ((height as f32 * scale).round() as u32).max(1);
    (w, h)
}
