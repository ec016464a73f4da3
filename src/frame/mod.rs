//! Pixel buffers and the frame sources that fill them.
//!
//! - [`PixelBuffer`] is the RGBA working surface every stage reads and writes
//! - [`Frame`] is what a [`FrameSource`] hands over once per active tick

mod buffer;
mod source;

pub use buffer::{clamp_channel, luminance, PixelBuffer, BYTES_PER_PIXEL};
pub use source::{Frame, FrameFormat, FrameSource, PatternKind, SourceError, StillImage, TestPattern};
