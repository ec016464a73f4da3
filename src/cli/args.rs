//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::PatternArg;
use crate::params::{
    CreativeMode, FilterId, StyleId, BLUR_MAX_PX, BRIGHTNESS_RANGE, CONTRAST_RANGE, EXPOSURE_RANGE, SATURATION_RANGE,
};

/// Parse filter name
pub fn parse_filter(s: &str) -> Result<FilterId, String> {
    FilterId::from_str(s).ok_or_else(|| {
        format!(
            "Unknown filter '{}'. Available filters: {}",
            s,
            FilterId::ALL.map(FilterId::name).join(", ")
        )
    })
}

/// Parse style name
pub fn parse_style(s: &str) -> Result<StyleId, String> {
    StyleId::from_str(s).ok_or_else(|| {
        format!(
            "Unknown style '{}'. Available styles: {}",
            s,
            StyleId::ALL.map(StyleId::name).join(", ")
        )
    })
}

/// Parse creative mode name
pub fn parse_mode(s: &str) -> Result<CreativeMode, String> {
    CreativeMode::from_str(s).ok_or_else(|| {
        format!(
            "Unknown creative mode '{}'. Available modes: {}",
            s,
            CreativeMode::ALL.map(CreativeMode::name).join(", ")
        )
    })
}

/// Parse and validate exposure (-2.0 to 2.0)
fn parse_exposure(s: &str) -> Result<f32, String> {
    let value: f32 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if !(EXPOSURE_RANGE.0..=EXPOSURE_RANGE.1).contains(&value) {
        return Err(format!("Exposure must be between -2.0 and 2.0, got {}", value));
    }
    Ok(value)
}

/// Parse and validate vignette strength (0.0-1.0)
fn parse_vignette(s: &str) -> Result<f32, String> {
    let value: f32 = s.parse().map_err(|_| format!("'{}' is not a valid number", s))?;
    if !(0.0..=1.0).contains(&value) {
        return Err(format!("Vignette must be between 0.0 and 1.0, got {}", value));
    }
    Ok(value)
}

fn parse_in_range(s: &str, what: &str, (lo, hi): (i32, i32)) -> Result<i32, String> {
    let value: i32 = s.parse().map_err(|_| format!("'{}' is not a valid integer", s))?;
    if !(lo..=hi).contains(&value) {
        return Err(format!("{} must be between {} and {}, got {}", what, lo, hi, value));
    }
    Ok(value)
}

fn parse_brightness(s: &str) -> Result<i32, String> {
    parse_in_range(s, "Brightness", BRIGHTNESS_RANGE)
}

fn parse_contrast(s: &str) -> Result<i32, String> {
    parse_in_range(s, "Contrast", CONTRAST_RANGE)
}

fn parse_saturation(s: &str) -> Result<i32, String> {
    parse_in_range(s, "Saturation", SATURATION_RANGE)
}

/// Parse and validate blur radius (0-20 px)
fn parse_blur(s: &str) -> Result<u32, String> {
    let value: u32 = s.parse().map_err(|_| format!("'{}' is not a valid blur radius", s))?;
    if value > BLUR_MAX_PX {
        return Err(format!("Blur radius must be between 0 and {}, got {}", BLUR_MAX_PX, value));
    }
    Ok(value)
}

/// Parse and validate framerate (1-120 fps)
fn parse_framerate(s: &str) -> Result<u32, String> {
    let fps: u32 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid framerate", s))?;
    if !(1..=120).contains(&fps) {
        return Err(format!(
            "Framerate must be between 1 and 120 fps, got {}",
            fps
        ));
    }
    Ok(fps)
}

/// Parse and validate a frame dimension (1-7680)
fn parse_dimension(s: &str) -> Result<u32, String> {
    let value: u32 = s.parse().map_err(|_| format!("'{}' is not a valid size", s))?;
    if !(1..=7680).contains(&value) {
        return Err(format!("Frame size must be between 1 and 7680, got {}", value));
    }
    Ok(value)
}

/// camfx: real-time camera effects pipeline
#[derive(Parser, Debug)]
#[command(name = "camfx")]
#[command(version, about = "Real-time camera frame effects pipeline", long_about = None)]
#[command(after_help = "EXAMPLES:
    # Test pattern through the noir filter for 120 ticks
    camfx run --filter noir --ticks 120

    # Still image, kaleidoscope overlay, save the last frame
    camfx run --input photo.jpg --mode kaleidoscope --ticks 1 --snapshot out.png

    # Low-power cadence, record a PNG sequence until Ctrl+C
    camfx run --low-power --filter glitch --record frames/

    # Brightness histogram of an image
    camfx histogram photo.jpg")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Drive the pipeline at the nominal tick rate
    Run(RunArgs),
    /// Print the brightness histogram of an image
    Histogram {
        /// Image file (PNG or JPEG)
        image: PathBuf,
        /// Print the 256 bucket counts as JSON
        #[arg(long)]
        json: bool,
    },
    /// List filters, styles and creative modes
    List,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Still image to use as the frame source instead of a test pattern
    #[arg(long, short = 'i', conflicts_with = "pattern")]
    pub input: Option<PathBuf>,

    /// Test pattern to generate when no input image is given
    #[arg(long)]
    pub pattern: Option<PatternArg>,

    /// Test pattern width
    #[arg(long, default_value = "640", value_parser = parse_dimension)]
    pub width: u32,

    /// Test pattern height
    #[arg(long, default_value = "480", value_parser = parse_dimension)]
    pub height: u32,

    /// Number of scheduling ticks to run (0 = until Ctrl+C)
    #[arg(long, short = 'n', default_value = "0")]
    pub ticks: u64,

    /// Stylistic filter
    #[arg(long, short = 'f', value_parser = parse_filter)]
    pub filter: Option<FilterId>,

    /// Photographic style
    #[arg(long, short = 's', value_parser = parse_style)]
    pub style: Option<StyleId>,

    /// Creative overlay mode
    #[arg(long, short = 'm', value_parser = parse_mode)]
    pub mode: Option<CreativeMode>,

    /// Exposure (-2.0 to 2.0)
    #[arg(long, allow_negative_numbers = true, value_parser = parse_exposure)]
    pub exposure: Option<f32>,

    /// Brightness (-100 to 100)
    #[arg(long, allow_negative_numbers = true, value_parser = parse_brightness)]
    pub brightness: Option<i32>,

    /// Contrast percentage (0 to 200)
    #[arg(long, value_parser = parse_contrast)]
    pub contrast: Option<i32>,

    /// Saturation percentage (0 to 200)
    #[arg(long, value_parser = parse_saturation)]
    pub saturation: Option<i32>,

    /// Blur radius in pixels (0 to 20)
    #[arg(long, value_parser = parse_blur)]
    pub blur: Option<u32>,

    /// Vignette strength (0.0 to 1.0)
    #[arg(long, value_parser = parse_vignette)]
    pub vignette: Option<f32>,

    /// Mirror frames horizontally
    #[arg(long)]
    pub mirror: bool,

    /// Constrained-device cadence: every other tick, 0.75x resolution
    #[arg(long)]
    pub low_power: bool,

    /// Fixed RNG seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// Save the last composited frame as PNG
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Record every composited frame as a PNG sequence into this directory
    #[arg(long, short = 'r')]
    pub record: Option<PathBuf>,

    /// Recording framerate (1-120 fps, default: 30 or from config file)
    #[arg(long, value_parser = parse_framerate)]
    pub fps: Option<u32>,

    /// Compute and log the throttled histogram
    #[arg(long)]
    pub histogram: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}
