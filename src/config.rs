//! Configuration file handling for camfx.
//!
//! Loads configuration from `<config_dir>/camfx/config.toml` or a custom path.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::capture::DEFAULT_RECORDING_FPS;
use crate::params::EffectParameters;
use crate::scheduler::DeviceClass;

/// Configuration file structure for camfx.
/// Loaded from <config_dir>/camfx/config.toml (or custom path via --config).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub session: SessionConfig,
    /// Initial effect parameters
    #[serde(default)]
    pub effects: EffectParameters,
    #[serde(default)]
    pub recording: RecordingConfig,
}

/// Settings fixed for the whole session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// Constrained device: skip every other tick and pre-scale frames to 0.75
    #[serde(default)]
    pub low_power: bool,
    /// Flip frames horizontally (front-facing camera)
    #[serde(default)]
    pub mirror: bool,
    /// Compute the throttled histogram
    #[serde(default)]
    pub histogram: bool,
    /// Fixed RNG seed for reproducible glitch and particle output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingConfig {
    #[serde(default = "default_fps")]
    pub fps: u32,
    /// Default directory for `--record` when no path is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            fps: default_fps(),
            output_dir: None,
        }
    }
}

fn default_fps() -> u32 {
    DEFAULT_RECORDING_FPS
}

/// Commented template written by `camfx config init`.
pub const DEFAULT_CONFIG: &str = r#"# camfx configuration

[session]
# Constrained device: process every other tick at 0.75x resolution
low_power = false
# Mirror frames horizontally (front-facing camera)
mirror = false
# Compute the brightness histogram every few ticks
histogram = false
# seed = 42

[effects]
exposure = 0.0      # -2.0 .. 2.0
brightness = 0      # -100 .. 100
contrast = 100      # 0 .. 200
saturation = 100    # 0 .. 200
blur = 0            # pixels, 0 .. 20
vignette = 0.0      # 0.0 .. 1.0
style = "standard"  # standard, vibrant, warm, cool, dramatic, natural
filter = "none"     # none, vintage, cyberpunk, vaporwave, noir, glitch, neon, thermal
# creative_mode = "kaleidoscope"  # particles, double-exposure, portrait, kaleidoscope, pixelate, face-ar

[recording]
fps = 30
# output_dir = "recordings"
"#;

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?;
            log::debug!("loaded config from {}", path.display());
            Ok(config)
        } else {
            log::debug!("no config at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }

    /// Load from a path given on the command line. The file must exist.
    pub fn load_from_explicit(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Write the commented default template to `path`. Never overwrites.
    pub fn init(path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(path, DEFAULT_CONFIG).map_err(|e| ConfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::SerializeError)
    }

    pub fn device_class(&self) -> DeviceClass {
        DeviceClass::from_low_power(self.session.low_power)
    }
}

/// Errors that can occur when loading or writing configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    SerializeError(toml::ser::Error),
    AlreadyExists {
        path: PathBuf,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::SerializeError(source) => {
                write!(f, "Failed to serialize config: {}", source)
            }
            ConfigError::AlreadyExists { path } => {
                write!(
                    f,
                    "Config file '{}' already exists, not overwriting",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::SerializeError(source) => Some(source),
            ConfigError::AlreadyExists { .. } => None,
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("camfx").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/camfx/config.toml")
        })
}
