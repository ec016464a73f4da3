//! Error types for the frame pipeline.
//!
//! None of these are fatal. The pipeline reports them per tick and keeps
//! running with the offending stage skipped or its input clamped.

use crate::params::CreativeMode;

/// Non-fatal conditions raised while processing a tick.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PipelineError {
    /// The requested creative mode has no implementation on this build.
    #[error("creative mode '{mode}' is not available")]
    UnsupportedMode { mode: CreativeMode },

    /// A parameter was outside its valid range and has been clamped.
    #[error("parameter {name} = {value} is out of range, clamped to {clamped}")]
    InvalidParameter {
        name: &'static str,
        value: f32,
        clamped: f32,
    },

    /// A source frame's data length does not match its declared dimensions.
    #[error("frame data is {actual} bytes, expected {expected} for its dimensions")]
    BufferSizeMismatch { expected: usize, actual: usize },

    /// The frame source had nothing to deliver this tick.
    #[error("frame source produced no frame")]
    NoFrame,
}
