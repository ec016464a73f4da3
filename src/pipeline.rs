//! Per-tick frame pipeline driver.
//!
//! One call to [`Pipeline::tick`] is one scheduling callback: the scheduler
//! decides whether it is active, and an active tick runs copy-in, tone, style,
//! filter, post, overlay and (throttled) histogram to completion. Requests made
//! between ticks (snapshot, mirror, parameter changes) take effect on the next one.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, TryLockError};

use crate::capture::Snapshot;
use crate::config::Config;
use crate::effects::{filter, post, style, tone, GlitchParams};
use crate::error::PipelineError;
use crate::frame::{FrameSource, PixelBuffer};
use crate::histogram::Histogram;
use crate::overlay::OverlayCompositor;
use crate::params::ParameterSource;
use crate::scheduler::{DeviceClass, FrameScheduler, TickKind};

/// Session-wide settings, fixed when the pipeline is built.
#[derive(Debug, Clone, Default)]
pub struct PipelineSettings {
    pub device: DeviceClass,
    pub mirror: bool,
    /// Compute the histogram on the throttled cadence
    pub histogram: bool,
    pub glitch: GlitchParams,
    /// Fixed RNG seed; `None` seeds from the OS
    pub seed: Option<u64>,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            device: config.device_class(),
            mirror: config.session.mirror,
            histogram: config.session.histogram,
            glitch: GlitchParams::default(),
            seed: config.session.seed,
        }
    }
}

/// What happened on one tick.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub kind: TickKind,
    /// Scheduler tick number, counting skipped ticks
    pub frame_index: u64,
    /// Present on the throttled histogram cadence when enabled
    pub histogram: Option<Histogram>,
    /// Present when a snapshot was requested before this tick
    pub snapshot: Option<Snapshot>,
    /// Non-fatal conditions raised during the tick
    pub warnings: Vec<PipelineError>,
    pub overlay_draws: u32,
}

impl TickReport {
    fn new(kind: TickKind, frame_index: u64) -> Self {
        Self {
            kind,
            frame_index,
            histogram: None,
            snapshot: None,
            warnings: Vec::new(),
            overlay_draws: 0,
        }
    }

    /// Whether the base buffer was recomposited this tick.
    pub fn composited(&self) -> bool {
        self.kind.is_active()
            && !self
                .warnings
                .iter()
                .any(|w| matches!(w, PipelineError::NoFrame | PipelineError::BufferSizeMismatch { .. }))
    }
}

pub struct Pipeline<S, P> {
    source: S,
    params: P,
    settings: PipelineSettings,
    scheduler: FrameScheduler,
    buffer: PixelBuffer,
    overlay: OverlayCompositor,
    rng: StdRng,
    snapshot_pending: bool,
    last_composited: u64,
    last_clamped: Vec<&'static str>,
}

impl<S: FrameSource, P: ParameterSource> Pipeline<S, P> {
    pub fn new(source: S, params: P, settings: PipelineSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let scheduler = FrameScheduler::new(settings.device);
        log::debug!(
            "pipeline: device {}, frame skip {}, scale {}",
            settings.device,
            scheduler.frame_skip(),
            scheduler.working_scale()
        );
        Self {
            source,
            params,
            settings,
            scheduler,
            buffer: PixelBuffer::default(),
            overlay: OverlayCompositor::new(),
            rng,
            snapshot_pending: false,
            last_composited: 0,
            last_clamped: Vec::new(),
        }
    }

    /// Run one scheduling callback.
    pub fn tick(&mut self) -> TickReport {
        let frame_index = self.scheduler.frame_count();
        let kind = self.scheduler.begin_tick();
        let mut report = TickReport::new(kind, frame_index);
        if !kind.is_active() {
            log::trace!("tick {} skipped", frame_index);
            return report;
        }

        let (params, clamped) = self.params.snapshot().sanitized();
        self.note_clamped(&clamped);
        report.warnings.extend(clamped);

        // Always advance the histogram cadence, even when disabled or frameless
        let histogram_due = self.scheduler.histogram_due();

        let Some(frame) = self.source.next_frame() else {
            log::debug!("tick {}: no frame from source", frame_index);
            report.warnings.push(PipelineError::NoFrame);
            return report;
        };

        match self
            .buffer
            .copy_from(&frame, self.settings.mirror, self.scheduler.working_scale())
        {
            Ok(true) => log::debug!(
                "working buffer resized to {}x{}",
                self.buffer.width(),
                self.buffer.height()
            ),
            Ok(false) => {}
            Err(e) => {
                log::warn!("tick {}: {}", frame_index, e);
                report.warnings.push(e);
                return report;
            }
        }

        tone::apply(&mut self.buffer, &params);
        style::apply(&mut self.buffer, params.style);
        filter::apply(&mut self.buffer, params.filter, &self.settings.glitch, &mut self.rng);
        post::apply(&mut self.buffer, &params);

        match self
            .overlay
            .render(params.creative_mode, &mut self.buffer, &mut self.rng)
        {
            Ok(outcome) => report.overlay_draws = outcome.draws,
            Err(e) => report.warnings.push(e),
        }

        self.last_composited = frame_index;

        if self.settings.histogram && histogram_due {
            report.histogram = Some(Histogram::from_buffer(&self.buffer));
        }

        if self.snapshot_pending {
            self.snapshot_pending = false;
            report.snapshot = Some(Snapshot::capture(&self.buffer, frame_index));
            log::info!("snapshot taken at tick {}", frame_index);
        }

        report
    }

    /// Warn once per change in the set of clamped parameters.
    fn note_clamped(&mut self, clamped: &[PipelineError]) {
        let names: Vec<&'static str> = clamped
            .iter()
            .filter_map(|e| match e {
                PipelineError::InvalidParameter { name, .. } => Some(*name),
                _ => None,
            })
            .collect();
        if names == self.last_clamped {
            return;
        }
        for e in clamped {
            log::warn!("{}", e);
        }
        self.last_clamped = names;
    }

    /// Last composited buffer. Retained unchanged across skipped ticks.
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Immediate owned copy of the last composited buffer.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.buffer, self.last_composited)
    }

    /// Capture at the end of the next tick that composites a frame.
    pub fn request_snapshot(&mut self) {
        self.snapshot_pending = true;
    }

    pub fn snapshot_pending(&self) -> bool {
        self.snapshot_pending
    }

    /// Applies from the next active tick.
    pub fn set_mirror(&mut self, mirror: bool) {
        self.settings.mirror = mirror;
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    pub fn overlay(&self) -> &OverlayCompositor {
        &self.overlay
    }

    pub fn params(&self) -> &P {
        &self.params
    }
}

/// Pipeline shared with an external timer. Ticks never overlap: a tick that
/// arrives while another is still running is dropped.
pub struct SharedPipeline<S, P> {
    inner: Arc<Mutex<Pipeline<S, P>>>,
}

impl<S, P> Clone for SharedPipeline<S, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: FrameSource, P: ParameterSource> SharedPipeline<S, P> {
    pub fn new(pipeline: Pipeline<S, P>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pipeline)),
        }
    }

    /// Run a tick unless one is already executing.
    pub fn try_tick(&self) -> Option<TickReport> {
        let mut guard = match self.inner.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                log::debug!("tick dropped: previous tick still running");
                return None;
            }
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };
        Some(guard.tick())
    }

    /// Run `f` with exclusive access, waiting for any running tick to finish.
    pub fn with<T>(&self, f: impl FnOnce(&mut Pipeline<S, P>) -> T) -> T {
        let mut guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}

/// Global flag for handling Ctrl+C across the application
static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Check if Ctrl+C has been received.
pub fn ctrlc_received() -> bool {
    CTRLC_RECEIVED.load(Ordering::SeqCst)
}

/// Set up the Ctrl+C handler.
///
/// This should be called once at program startup.
pub fn setup_ctrlc_handler() -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        CTRLC_RECEIVED.store(true, Ordering::SeqCst);
        eprintln!("\nReceived Ctrl+C, shutting down...");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Frame, FrameFormat};
    use crate::params::{CreativeMode, EffectParameters, FilterId, ParameterSlot};

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> impl FnMut() -> Option<Frame> {
        move || {
            let data = rgb.repeat((width * height) as usize);
            Some(Frame::new(data, width, height, FrameFormat::Rgb))
        }
    }

    fn settings() -> PipelineSettings {
        PipelineSettings {
            seed: Some(1),
            ..PipelineSettings::default()
        }
    }

    #[test]
    fn test_noir_end_to_end() {
        let params = EffectParameters::default().with_filter(FilterId::Noir);
        let mut pipeline = Pipeline::new(solid(4, 3, [200, 100, 50]), params, settings());
        let report = pipeline.tick();
        assert_eq!(report.kind, TickKind::Active);
        assert!(report.warnings.is_empty());
        assert!(pipeline.buffer().pixels().all(|px| px == [124, 124, 124, 255]));
    }

    #[test]
    fn test_skipped_tick_retains_buffer() {
        let mut counter = 0u8;
        let source = move || {
            counter = counter.wrapping_add(50);
            Some(Frame::new(vec![counter; 3 * 4], 2, 2, FrameFormat::Rgb))
        };
        let mut pipeline = Pipeline::new(
            source,
            EffectParameters::default(),
            PipelineSettings {
                device: DeviceClass::Constrained,
                ..settings()
            },
        );
        assert_eq!(pipeline.tick().kind, TickKind::Active);
        let after_active = pipeline.buffer().clone();
        let report = pipeline.tick();
        assert_eq!(report.kind, TickKind::Skipped);
        assert_eq!(pipeline.buffer(), &after_active);
        assert_eq!(pipeline.tick().kind, TickKind::Active);
        assert_ne!(pipeline.buffer(), &after_active);
    }

    #[test]
    fn test_low_power_scales_working_buffer() {
        let mut pipeline = Pipeline::new(
            solid(40, 20, [1, 2, 3]),
            EffectParameters::default(),
            PipelineSettings {
                device: DeviceClass::Constrained,
                ..settings()
            },
        );
        pipeline.tick();
        assert_eq!((pipeline.buffer().width(), pipeline.buffer().height()), (30, 15));
    }

    #[test]
    fn test_no_frame_is_reported_and_buffer_kept() {
        let mut frames = vec![None, Some(Frame::new(vec![9; 3], 1, 1, FrameFormat::Rgb))];
        let source = move || frames.pop().flatten();
        let mut pipeline = Pipeline::new(source, EffectParameters::default(), settings());

        let first = pipeline.tick();
        assert!(first.composited());
        let kept = pipeline.buffer().clone();

        let second = pipeline.tick();
        assert_eq!(second.warnings, vec![PipelineError::NoFrame]);
        assert!(!second.composited());
        assert_eq!(pipeline.buffer(), &kept);
    }

    #[test]
    fn test_bad_frame_skips_stages() {
        let source = || Some(Frame::new(vec![0; 5], 2, 1, FrameFormat::Rgb));
        let mut pipeline = Pipeline::new(source, EffectParameters::default(), settings());
        let report = pipeline.tick();
        assert!(matches!(
            report.warnings.as_slice(),
            [PipelineError::BufferSizeMismatch { expected: 6, actual: 5 }]
        ));
        assert!(pipeline.buffer().is_empty());
    }

    #[test]
    fn test_face_ar_warns_and_tick_completes() {
        let params = EffectParameters::default().with_creative_mode(Some(CreativeMode::FaceAr));
        let mut pipeline = Pipeline::new(solid(2, 2, [10, 20, 30]), params, settings());
        let report = pipeline.tick();
        assert_eq!(
            report.warnings,
            vec![PipelineError::UnsupportedMode {
                mode: CreativeMode::FaceAr
            }]
        );
        assert!(report.composited());
        assert_eq!(pipeline.buffer().get(0, 0), Some([10, 20, 30, 255]));
    }

    #[test]
    fn test_histogram_only_when_enabled_and_due() {
        let mut pipeline = Pipeline::new(
            solid(2, 2, [128, 128, 128]),
            EffectParameters::default(),
            PipelineSettings {
                histogram: true,
                ..settings()
            },
        );
        let due: Vec<bool> = (0..4).map(|_| pipeline.tick().histogram.is_some()).collect();
        assert_eq!(due, vec![true, false, false, true]);

        let mut disabled = Pipeline::new(solid(2, 2, [0, 0, 0]), EffectParameters::default(), settings());
        assert!(disabled.tick().histogram.is_none());
    }

    #[test]
    fn test_snapshot_request_honoured_next_tick() {
        let mut pipeline = Pipeline::new(solid(3, 3, [5, 6, 7]), EffectParameters::default(), settings());
        assert!(pipeline.tick().snapshot.is_none());
        pipeline.request_snapshot();
        assert!(pipeline.snapshot_pending());
        let report = pipeline.tick();
        let snapshot = report.snapshot.unwrap();
        assert_eq!(snapshot.frame_index, 1);
        assert_eq!(snapshot.buffer.get(1, 1), Some([5, 6, 7, 255]));
        assert!(!pipeline.snapshot_pending());
        assert!(pipeline.tick().snapshot.is_none());
    }

    #[test]
    fn test_parameter_change_applies_next_tick() {
        let slot = ParameterSlot::default();
        let mut pipeline = Pipeline::new(solid(1, 1, [200, 100, 50]), slot.clone(), settings());
        pipeline.tick();
        assert_eq!(pipeline.buffer().get(0, 0), Some([200, 100, 50, 255]));
        slot.update(|p| p.filter = FilterId::Noir);
        pipeline.tick();
        assert_eq!(pipeline.buffer().get(0, 0), Some([124, 124, 124, 255]));
    }

    #[test]
    fn test_clamped_parameters_reported() {
        let params = EffectParameters {
            contrast: 500,
            ..EffectParameters::default()
        };
        let mut pipeline = Pipeline::new(solid(1, 1, [10, 10, 10]), params, settings());
        let report = pipeline.tick();
        assert_eq!(report.warnings.len(), 1);
        assert!(report.composited());
    }

    #[test]
    fn test_shared_pipeline_drops_overlapping_tick() {
        let shared = SharedPipeline::new(Pipeline::new(
            solid(1, 1, [0, 0, 0]),
            EffectParameters::default(),
            settings(),
        ));
        assert!(shared.try_tick().is_some());

        let other = shared.clone();
        let nested = shared.with(|_| other.try_tick());
        assert!(nested.is_none());
        assert_eq!(shared.with(|p| p.scheduler().frame_count()), 1);
    }

    #[test]
    fn test_same_seed_same_glitch() {
        let params = EffectParameters::default().with_filter(FilterId::Glitch);
        let pattern = || crate::frame::TestPattern::new(32, 8, crate::frame::PatternKind::Gradient);
        let mut a = Pipeline::new(pattern(), params, settings());
        let mut b = Pipeline::new(pattern(), params, settings());
        a.tick();
        b.tick();
        assert_eq!(a.buffer(), b.buffer());
    }
}
