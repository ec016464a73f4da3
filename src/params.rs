//! Per-tick effect parameters and the catalogs of styles, filters and creative modes.
//!
//! The input layer never writes into a running tick. It publishes a whole
//! [`EffectParameters`] value (directly or through a [`ParameterSlot`]) and the
//! pipeline takes one immutable snapshot at the start of every active tick.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::error::PipelineError;

/// Photographic style applied after tone adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StyleId {
    /// No-op
    #[default]
    Standard,
    Vibrant,
    Warm,
    Cool,
    Dramatic,
    Natural,
}

impl StyleId {
    pub const ALL: [StyleId; 6] = [
        StyleId::Standard,
        StyleId::Vibrant,
        StyleId::Warm,
        StyleId::Cool,
        StyleId::Dramatic,
        StyleId::Natural,
    ];

    /// Parse style name from string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "standard" | "none" => Some(Self::Standard),
            "vibrant" => Some(Self::Vibrant),
            "warm" => Some(Self::Warm),
            "cool" => Some(Self::Cool),
            "dramatic" => Some(Self::Dramatic),
            "natural" => Some(Self::Natural),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Vibrant => "vibrant",
            Self::Warm => "warm",
            Self::Cool => "cool",
            Self::Dramatic => "dramatic",
            Self::Natural => "natural",
        }
    }
}

impl fmt::Display for StyleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Stylistic filter. Exactly one is active per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterId {
    #[default]
    None,
    Vintage,
    Cyberpunk,
    Vaporwave,
    Noir,
    Glitch,
    Neon,
    Thermal,
}

impl FilterId {
    pub const ALL: [FilterId; 8] = [
        FilterId::None,
        FilterId::Vintage,
        FilterId::Cyberpunk,
        FilterId::Vaporwave,
        FilterId::Noir,
        FilterId::Glitch,
        FilterId::Neon,
        FilterId::Thermal,
    ];

    /// Parse filter name from string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(Self::None),
            "vintage" => Some(Self::Vintage),
            "cyberpunk" => Some(Self::Cyberpunk),
            "vaporwave" => Some(Self::Vaporwave),
            "noir" => Some(Self::Noir),
            "glitch" => Some(Self::Glitch),
            "neon" => Some(Self::Neon),
            "thermal" => Some(Self::Thermal),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Vintage => "vintage",
            Self::Cyberpunk => "cyberpunk",
            Self::Vaporwave => "vaporwave",
            Self::Noir => "noir",
            Self::Glitch => "glitch",
            Self::Neon => "neon",
            Self::Thermal => "thermal",
        }
    }

    /// Check if this filter touches pixels at all
    pub fn is_active(self) -> bool {
        self != Self::None
    }
}

impl fmt::Display for FilterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Creative overlay mode. `None` in [`EffectParameters::creative_mode`] means no overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CreativeMode {
    Particles,
    DoubleExposure,
    Portrait,
    Kaleidoscope,
    Pixelate,
    /// Face tracking overlay; reported as unsupported
    FaceAr,
}

impl CreativeMode {
    pub const ALL: [CreativeMode; 6] = [
        CreativeMode::Particles,
        CreativeMode::DoubleExposure,
        CreativeMode::Portrait,
        CreativeMode::Kaleidoscope,
        CreativeMode::Pixelate,
        CreativeMode::FaceAr,
    ];

    /// Parse mode name from string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "particles" => Some(Self::Particles),
            "double-exposure" | "double_exposure" | "doubleexposure" => Some(Self::DoubleExposure),
            "portrait" => Some(Self::Portrait),
            "kaleidoscope" => Some(Self::Kaleidoscope),
            "pixelate" => Some(Self::Pixelate),
            "face-ar" | "face_ar" | "facear" => Some(Self::FaceAr),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Particles => "particles",
            Self::DoubleExposure => "double-exposure",
            Self::Portrait => "portrait",
            Self::Kaleidoscope => "kaleidoscope",
            Self::Pixelate => "pixelate",
            Self::FaceAr => "face-ar",
        }
    }

    /// Whether this mode draws onto the base buffer instead of the overlay layer
    pub fn mutates_base(self) -> bool {
        matches!(self, Self::Pixelate)
    }
}

impl fmt::Display for CreativeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub const EXPOSURE_RANGE: (f32, f32) = (-2.0, 2.0);
pub const BRIGHTNESS_RANGE: (i32, i32) = (-100, 100);
pub const CONTRAST_RANGE: (i32, i32) = (0, 200);
pub const SATURATION_RANGE: (i32, i32) = (0, 200);
pub const BLUR_MAX_PX: u32 = 20;

/// Immutable per-tick snapshot of every user-controlled effect setting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectParameters {
    /// Exposure in stops-ish units, [-2, 2]
    pub exposure: f32,
    /// Additive brightness, [-100, 100]
    pub brightness: i32,
    /// Contrast percentage, [0, 200], 100 = unchanged
    pub contrast: i32,
    /// Saturation percentage, [0, 200], 100 = unchanged
    pub saturation: i32,
    /// Blur radius in pixels, [0, 20]
    #[serde(rename = "blur")]
    pub blur_radius_px: u32,
    /// Vignette opacity at the edge, [0, 1]
    #[serde(rename = "vignette")]
    pub vignette_strength: f32,
    pub style: StyleId,
    pub filter: FilterId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creative_mode: Option<CreativeMode>,
}

impl Default for EffectParameters {
    fn default() -> Self {
        Self {
            exposure: 0.0,
            brightness: 0,
            contrast: 100,
            saturation: 100,
            blur_radius_px: 0,
            vignette_strength: 0.0,
            style: StyleId::Standard,
            filter: FilterId::None,
            creative_mode: None,
        }
    }
}

impl EffectParameters {
    pub fn with_filter(mut self, filter: FilterId) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_style(mut self, style: StyleId) -> Self {
        self.style = style;
        self
    }

    pub fn with_creative_mode(mut self, mode: Option<CreativeMode>) -> Self {
        self.creative_mode = mode;
        self
    }

    /// True when the tone stage would leave every pixel unchanged.
    pub fn is_neutral_tone(&self) -> bool {
        self.exposure == 0.0 && self.brightness == 0 && self.contrast == 100 && self.saturation == 100
    }

    /// Return a copy with every field clamped to its valid range.
    ///
    /// Each clamped field is reported as [`PipelineError::InvalidParameter`].
    /// Non-finite floats become 0.
    pub fn sanitized(&self) -> (Self, Vec<PipelineError>) {
        let mut out = *self;
        let mut clamped = Vec::new();

        out.exposure = clamp_f32("exposure", self.exposure, EXPOSURE_RANGE, &mut clamped);
        out.vignette_strength = clamp_f32("vignette", self.vignette_strength, (0.0, 1.0), &mut clamped);
        out.brightness = clamp_i32("brightness", self.brightness, BRIGHTNESS_RANGE, &mut clamped);
        out.contrast = clamp_i32("contrast", self.contrast, CONTRAST_RANGE, &mut clamped);
        out.saturation = clamp_i32("saturation", self.saturation, SATURATION_RANGE, &mut clamped);
        if self.blur_radius_px > BLUR_MAX_PX {
            clamped.push(PipelineError::InvalidParameter {
                name: "blur",
                value: self.blur_radius_px as f32,
                clamped: BLUR_MAX_PX as f32,
            });
            out.blur_radius_px = BLUR_MAX_PX;
        }

        (out, clamped)
    }
}

fn clamp_f32(name: &'static str, value: f32, (lo, hi): (f32, f32), clamped: &mut Vec<PipelineError>) -> f32 {
    let fixed = if value.is_finite() { value.clamp(lo, hi) } else { 0.0 };
    if fixed != value {
        clamped.push(PipelineError::InvalidParameter {
            name,
            value,
            clamped: fixed,
        });
    }
    fixed
}

fn clamp_i32(name: &'static str, value: i32, (lo, hi): (i32, i32), clamped: &mut Vec<PipelineError>) -> i32 {
    let fixed = value.clamp(lo, hi);
    if fixed != value {
        clamped.push(PipelineError::InvalidParameter {
            name,
            value: value as f32,
            clamped: fixed as f32,
        });
    }
    fixed
}

/// Where the pipeline reads its parameters from at the start of each active tick.
pub trait ParameterSource {
    fn snapshot(&self) -> EffectParameters;
}

impl ParameterSource for EffectParameters {
    fn snapshot(&self) -> EffectParameters {
        *self
    }
}

/// Shared, atomically replaced parameter value.
///
/// The input layer holds one clone and writes whole values; the pipeline holds
/// another and reads a snapshot per tick. A write during a tick takes effect on
/// the next one.
#[derive(Debug, Clone, Default)]
pub struct ParameterSlot {
    inner: Arc<Mutex<EffectParameters>>,
}

impl ParameterSlot {
    pub fn new(params: EffectParameters) -> Self {
        Self {
            inner: Arc::new(Mutex::new(params)),
        }
    }

    /// Replace the whole parameter set.
    pub fn set(&self, params: EffectParameters) {
        match self.inner.lock() {
            Ok(mut guard) => *guard = params,
            Err(poisoned) => *poisoned.into_inner() = params,
        }
    }

    /// Edit a copy of the current value and publish it in one step.
    pub fn update(&self, edit: impl FnOnce(&mut EffectParameters)) {
        let mut guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut next = *guard;
        edit(&mut next);
        *guard = next;
    }
}

impl ParameterSource for ParameterSlot {
    fn snapshot(&self) -> EffectParameters {
        match self.inner.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}
