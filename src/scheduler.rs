//! Tick cadence: which ticks run the pipeline, when the histogram is due,
//! and the working resolution for the device class.

use std::fmt;
use std::time::Duration;

/// Resolution scale applied to every frame on constrained devices.
pub const LOW_POWER_SCALE: f32 = 0.75;

/// Nominal display rate the scheduler is driven at.
pub const NOMINAL_TICK_HZ: u32 = 60;

/// Capability signal provided once at session start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceClass {
    #[default]
    Standard,
    /// Low-power device: every other tick skipped, frames pre-scaled
    Constrained,
}

impl DeviceClass {
    pub fn from_low_power(low_power: bool) -> Self {
        if low_power {
            Self::Constrained
        } else {
            Self::Standard
        }
    }

    pub fn frame_skip(self) -> u32 {
        match self {
            Self::Standard => 1,
            Self::Constrained => 2,
        }
    }
}

impl fmt::Display for DeviceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard => write!(f, "standard"),
            Self::Constrained => write!(f, "constrained"),
        }
    }
}

/// Outcome of the per-tick decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickKind {
    /// Full pipeline runs
    Active,
    /// Nothing runs; the last composited buffer is kept
    Skipped,
}

impl TickKind {
    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

/// Frame-skip and histogram throttling state. Settings are fixed at construction.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    frame_count: u64,
    frame_skip: u32,
    is_low_power: bool,
    active_ticks: u64,
}

impl FrameScheduler {
    pub fn new(device: DeviceClass) -> Self {
        Self {
            frame_count: 0,
            frame_skip: device.frame_skip(),
            is_low_power: device == DeviceClass::Constrained,
            active_ticks: 0,
        }
    }

    /// Decide this tick. `frame_count` advances whether or not the tick is active.
    pub fn begin_tick(&mut self) -> TickKind {
        let kind = if self.frame_count % self.frame_skip as u64 == 0 {
            TickKind::Active
        } else {
            TickKind::Skipped
        };
        self.frame_count += 1;
        if kind.is_active() {
            self.active_ticks += 1;
        }
        kind
    }

    /// Whether the active tick just begun should compute the histogram.
    ///
    /// True on the first active tick and every `frame_skip * 3` active ticks after.
    pub fn histogram_due(&self) -> bool {
        if self.active_ticks == 0 {
            return false;
        }
        (self.active_ticks - 1) % self.histogram_period() == 0
    }

    pub fn histogram_period(&self) -> u64 {
        self.frame_skip as u64 * 3
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn active_ticks(&self) -> u64 {
        self.active_ticks
    }

    pub fn frame_skip(&self) -> u32 {
        self.frame_skip
    }

    pub fn is_low_power(&self) -> bool {
        self.is_low_power
    }

    /// Scale applied to source frames before they enter the pipeline.
    pub fn working_scale(&self) -> f32 {
        if self.is_low_power {
            LOW_POWER_SCALE
        } else {
            1.0
        }
    }

    /// Delay between scheduling callbacks at the nominal display rate.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(1) / NOMINAL_TICK_HZ
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new(DeviceClass::Standard)
    }
}
