//! Per-pixel effect stages applied to the base buffer, in pipeline order:
//!
//! 1. **Tone** - exposure, contrast, brightness, saturation in one pass
//! 2. **Style** - optional photographic color transform
//! 3. **Filter** - one stylistic filter from a fixed catalog (glitch is stochastic)
//! 4. **Post** - Gaussian blur and radial vignette

pub mod filter;
pub mod glitch;
pub mod post;
pub mod style;
pub mod tone;

pub use glitch::{GlitchParams, GlitchStats};
pub use post::RadialGradient;
