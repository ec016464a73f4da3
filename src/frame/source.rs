//! Live frame sources feeding the pipeline.

use std::path::Path;
use std::time::Instant;

/// Pixel format of a source frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// RGB format (3 bytes per pixel)
    Rgb,
    /// RGBA format (4 bytes per pixel)
    Rgba,
}

impl FrameFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            FrameFormat::Rgb => 3,
            FrameFormat::Rgba => 4,
        }
    }
}

/// A frame pulled from a video source.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw pixel data, row-major
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel format
    pub format: FrameFormat,
    /// Timestamp when the frame was produced
    pub timestamp: Instant,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, format: FrameFormat) -> Self {
        Self {
            data,
            width,
            height,
            format,
            timestamp: Instant::now(),
        }
    }

    pub fn bytes_per_pixel(&self) -> usize {
        self.format.bytes_per_pixel()
    }
}

/// Something that can hand the pipeline one frame per active tick.
pub trait FrameSource {
    /// Pull the next frame, or `None` if nothing is available right now.
    fn next_frame(&mut self) -> Option<Frame>;
}

impl<F> FrameSource for F
where
    F: FnMut() -> Option<Frame>,
{
    fn next_frame(&mut self) -> Option<Frame> {
        self()
    }
}

/// Errors opening a frame source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),

    #[error("image has zero width or height")]
    EmptyImage,
}

/// Synthetic test pattern layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PatternKind {
    /// Diagonal color gradient that drifts one pixel per frame
    #[default]
    Gradient,
    /// Classic eight vertical color bars
    Bars,
}

const BAR_COLORS: [[u8; 3]; 8] = [
    [235, 235, 235],
    [235, 235, 16],
    [16, 235, 235],
    [16, 235, 16],
    [235, 16, 235],
    [235, 16, 16],
    [16, 16, 235],
    [16, 16, 16],
];

/// Generated frames for running the pipeline without a camera.
#[derive(Debug, Clone)]
pub struct TestPattern {
    width: u32,
    height: u32,
    kind: PatternKind,
    frame: u64,
}

impl TestPattern {
    pub fn new(width: u32, height: u32, kind: PatternKind) -> Self {
        Self {
            width,
            height,
            kind,
            frame: 0,
        }
    }

    fn render(&self) -> Vec<u8> {
        let w = self.width as usize;
        let h = self.height as usize;
        let mut data = Vec::with_capacity(w * h * 3);
        let shift = self.frame as usize;

        for y in 0..h {
            for x in 0..w {
                let rgb = match self.kind {
                    PatternKind::Gradient => {
                        let u = ((x + shift) % w.max(1)) * 255 / w.max(1);
                        let v = y * 255 / h.max(1);
                        [u as u8, v as u8, (255 - (u + v) / 2) as u8]
                    }
                    PatternKind::Bars => BAR_COLORS[x * BAR_COLORS.len() / w.max(1)],
                };
                data.extend_from_slice(&rgb);
            }
        }

        data
    }
}

impl FrameSource for TestPattern {
    fn next_frame(&mut self) -> Option<Frame> {
        let frame = Frame::new(self.render(), self.width, self.height, FrameFormat::Rgb);
        self.frame = self.frame.wrapping_add(1);
        Some(frame)
    }
}

/// A still image served as a frame on every tick.
#[derive(Debug, Clone)]
pub struct StillImage {
    frame: Frame,
}

impl StillImage {
    /// Decode an image file (PNG or JPEG).
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let image = image::open(path)?.to_rgba8();
        if image.width() == 0 || image.height() == 0 {
            return Err(SourceError::EmptyImage);
        }
        let (width, height) = image.dimensions();
        Ok(Self {
            frame: Frame::new(image.into_raw(), width, height, FrameFormat::Rgba),
        })
    }

    pub fn from_frame(frame: Frame) -> Self {
        Self { frame }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.frame.width, self.frame.height)
    }
}

impl FrameSource for StillImage {
    fn next_frame(&mut self) -> Option<Frame> {
        let mut frame = self.frame.clone();
        frame.timestamp = Instant::now();
        Some(frame)
    }
}
