//! camfx library crate.
//!
//! Real-time camera frame pipeline: tone, style, filter, post-processing and
//! creative overlays over an RGBA working buffer, driven by a frame-skipping
//! scheduler. This module exposes the components for the binary and for
//! integration testing.

pub mod capture;
pub mod cli;
pub mod config;
pub mod effects;
pub mod error;
pub mod frame;
pub mod histogram;
pub mod overlay;
pub mod params;
pub mod pipeline;
pub mod scheduler;

pub use error::PipelineError;
pub use frame::{Frame, FrameFormat, FrameSource, PixelBuffer};
pub use histogram::Histogram;
pub use params::{CreativeMode, EffectParameters, FilterId, StyleId};
pub use pipeline::{Pipeline, PipelineSettings, SharedPipeline, TickReport};
pub use scheduler::{DeviceClass, FrameScheduler, TickKind};
