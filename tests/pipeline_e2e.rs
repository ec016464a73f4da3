//! End-to-end tests for the frame pipeline driver.
//!
//! These tests verify:
//! - Full tone/style/filter/post/overlay passes on synthetic frames
//! - Frame-skip scheduling on constrained devices
//! - Histogram cadence and totals
//! - Snapshot and mirror requests between ticks
//! - Behaviour when the source has nothing to give

use camfx::frame::{Frame, FrameFormat, PatternKind, TestPattern};
use camfx::params::{CreativeMode, EffectParameters, FilterId, ParameterSlot, StyleId};
use camfx::{DeviceClass, FrameSource, Pipeline, PipelineError, PipelineSettings, SharedPipeline, TickKind};

fn solid(width: u32, height: u32, rgb: [u8; 3]) -> impl FnMut() -> Option<Frame> {
    move || {
        Some(Frame::new(
            rgb.repeat((width * height) as usize),
            width,
            height,
            FrameFormat::Rgb,
        ))
    }
}

fn seeded(device: DeviceClass) -> PipelineSettings {
    PipelineSettings {
        device,
        seed: Some(1234),
        ..PipelineSettings::default()
    }
}

// ==================== Full Pass ====================

#[test]
fn test_noir_end_to_end() {
    let params = EffectParameters::default().with_filter(FilterId::Noir);
    let mut pipeline = Pipeline::new(solid(4, 4, [200, 100, 50]), params, seeded(DeviceClass::Standard));

    let report = pipeline.tick();
    assert!(report.composited());
    assert!(report.warnings.is_empty());
    assert_eq!(pipeline.buffer().width(), 4);
    assert!(pipeline.buffer().pixels().all(|px| px == [124, 124, 124, 255]));
}

#[test]
fn test_neutral_parameters_pass_frame_through() {
    let pattern = TestPattern::new(16, 8, PatternKind::Bars);
    let expected = pattern.clone().next_frame().unwrap();
    let mut pipeline = Pipeline::new(pattern, EffectParameters::default(), seeded(DeviceClass::Standard));
    pipeline.tick();

    let buffer = pipeline.buffer();
    for (px, rgb) in buffer.pixels().zip(expected.data.chunks_exact(3)) {
        assert_eq!(&px[..3], rgb);
        assert_eq!(px[3], 255);
    }
}

#[test]
fn test_every_style_and_filter_runs_on_pattern() {
    for style in StyleId::ALL {
        for filter in FilterId::ALL {
            let params = EffectParameters {
                blur_radius_px: 1,
                vignette_strength: 0.5,
                ..EffectParameters::default()
            }
            .with_style(style)
            .with_filter(filter);
            let source = TestPattern::new(24, 16, PatternKind::Gradient);
            let mut pipeline = Pipeline::new(source, params, seeded(DeviceClass::Standard));
            let report = pipeline.tick();
            assert!(report.composited(), "{} / {}", style, filter);
            assert_eq!(pipeline.buffer().len(), 24 * 16);
        }
    }
}

#[test]
fn test_mirror_flips_columns() {
    let mut frame = vec![0u8; 3 * 2];
    frame[..3].copy_from_slice(&[255, 0, 0]);
    frame[3..].copy_from_slice(&[0, 0, 255]);
    let source = move || Some(Frame::new(frame.clone(), 2, 1, FrameFormat::Rgb));
    let mut pipeline = Pipeline::new(source, EffectParameters::default(), seeded(DeviceClass::Standard));

    pipeline.tick();
    assert_eq!(pipeline.buffer().get(0, 0), Some([255, 0, 0, 255]));

    pipeline.set_mirror(true);
    pipeline.tick();
    assert_eq!(pipeline.buffer().get(0, 0), Some([0, 0, 255, 255]));
    assert_eq!(pipeline.buffer().get(1, 0), Some([255, 0, 0, 255]));
}

// ==================== Scheduling ====================

#[test]
fn test_constrained_device_alternates_ticks() {
    let mut pipeline = Pipeline::new(
        solid(8, 8, [10, 20, 30]),
        EffectParameters::default(),
        seeded(DeviceClass::Constrained),
    );
    let kinds: Vec<TickKind> = (0..6).map(|_| pipeline.tick().kind).collect();
    assert_eq!(
        kinds,
        vec![
            TickKind::Active,
            TickKind::Skipped,
            TickKind::Active,
            TickKind::Skipped,
            TickKind::Active,
            TickKind::Skipped,
        ]
    );
    assert_eq!(pipeline.scheduler().active_ticks(), 3);
    assert_eq!(pipeline.scheduler().frame_count(), 6);
}

#[test]
fn test_skipped_tick_keeps_previous_buffer() {
    let mut color = 0u8;
    let source = move || {
        color = color.wrapping_add(50);
        Some(Frame::new([color; 3].repeat(16), 4, 4, FrameFormat::Rgb))
    };
    let mut pipeline = Pipeline::new(source, EffectParameters::default(), seeded(DeviceClass::Constrained));

    pipeline.tick();
    let after_active = pipeline.buffer().clone();
    let report = pipeline.tick();
    assert_eq!(report.kind, TickKind::Skipped);
    assert!(!report.composited());
    assert_eq!(pipeline.buffer(), &after_active);
}

#[test]
fn test_constrained_device_scales_working_buffer() {
    let mut pipeline = Pipeline::new(
        solid(40, 20, [90, 90, 90]),
        EffectParameters::default(),
        seeded(DeviceClass::Constrained),
    );
    pipeline.tick();
    assert_eq!(pipeline.buffer().width(), 30);
    assert_eq!(pipeline.buffer().height(), 15);
}

// ==================== Histogram ====================

#[test]
fn test_histogram_totals_match_buffer() {
    let settings = PipelineSettings {
        histogram: true,
        ..seeded(DeviceClass::Standard)
    };
    let mut pipeline = Pipeline::new(
        TestPattern::new(12, 10, PatternKind::Gradient),
        EffectParameters::default(),
        settings,
    );
    let report = pipeline.tick();
    let histogram = report.histogram.expect("first active tick computes histogram");
    assert_eq!(histogram.total(), 120);
}

#[test]
fn test_histogram_cadence_standard_device() {
    let settings = PipelineSettings {
        histogram: true,
        ..seeded(DeviceClass::Standard)
    };
    let mut pipeline = Pipeline::new(solid(4, 4, [0, 0, 0]), EffectParameters::default(), settings);
    let due: Vec<bool> = (0..7).map(|_| pipeline.tick().histogram.is_some()).collect();
    assert_eq!(due, vec![true, false, false, true, false, false, true]);
}

#[test]
fn test_histogram_cadence_constrained_device() {
    let settings = PipelineSettings {
        histogram: true,
        ..seeded(DeviceClass::Constrained)
    };
    let mut pipeline = Pipeline::new(solid(4, 4, [0, 0, 0]), EffectParameters::default(), settings);
    let computed: Vec<u64> = (0..16)
        .filter_map(|_| {
            let report = pipeline.tick();
            report.histogram.map(|_| report.frame_index)
        })
        .collect();
    // Every sixth active tick, active ticks are the even ones
    assert_eq!(computed, vec![0, 12]);
}

#[test]
fn test_histogram_disabled_is_never_reported() {
    let mut pipeline = Pipeline::new(
        solid(4, 4, [0, 0, 0]),
        EffectParameters::default(),
        seeded(DeviceClass::Standard),
    );
    assert!((0..5).all(|_| pipeline.tick().histogram.is_none()));
}

// ==================== Overlays Through The Pipeline ====================

#[test]
fn test_kaleidoscope_keeps_solid_frame() {
    let params = EffectParameters::default().with_creative_mode(Some(CreativeMode::Kaleidoscope));
    let mut pipeline = Pipeline::new(solid(20, 20, [40, 160, 90]), params, seeded(DeviceClass::Standard));
    let report = pipeline.tick();
    assert_eq!(report.overlay_draws, 8);
    assert!(pipeline.buffer().pixels().all(|px| px == [40, 160, 90, 255]));
}

#[test]
fn test_face_ar_reports_unsupported_and_keeps_frame() {
    let params = EffectParameters::default().with_creative_mode(Some(CreativeMode::FaceAr));
    let mut pipeline = Pipeline::new(solid(6, 6, [1, 2, 3]), params, seeded(DeviceClass::Standard));
    let report = pipeline.tick();
    assert!(report.composited());
    assert!(report.warnings.iter().any(|w| matches!(
        w,
        PipelineError::UnsupportedMode {
            mode: CreativeMode::FaceAr
        }
    )));
    assert!(pipeline.buffer().pixels().all(|px| px == [1, 2, 3, 255]));
}

#[test]
fn test_particles_accumulate_then_freeze() {
    let params = ParameterSlot::new(EffectParameters::default().with_creative_mode(Some(CreativeMode::Particles)));
    let mut pipeline = Pipeline::new(solid(32, 32, [0, 0, 0]), params.clone(), seeded(DeviceClass::Standard));
    for _ in 0..40 {
        pipeline.tick();
    }
    let live = pipeline.overlay().particles().len();
    assert!(live > 0);

    params.update(|p| p.creative_mode = None);
    for _ in 0..10 {
        pipeline.tick();
    }
    assert_eq!(pipeline.overlay().particles().len(), live);
}

// ==================== Requests Between Ticks ====================

#[test]
fn test_snapshot_delivered_on_next_composited_tick() {
    let mut pipeline = Pipeline::new(
        solid(8, 8, [200, 100, 50]),
        EffectParameters::default().with_filter(FilterId::Noir),
        seeded(DeviceClass::Constrained),
    );
    pipeline.tick();
    pipeline.request_snapshot();

    // Skipped tick: still pending
    let skipped = pipeline.tick();
    assert!(skipped.snapshot.is_none());
    assert!(pipeline.snapshot_pending());

    let active = pipeline.tick();
    let snapshot = active.snapshot.expect("snapshot on active tick");
    assert_eq!(snapshot.frame_index, 2);
    assert_eq!((snapshot.width(), snapshot.height()), (6, 6));
    assert!(snapshot.buffer.pixels().all(|px| px == [124, 124, 124, 255]));
    assert!(!pipeline.snapshot_pending());
}

#[test]
fn test_parameter_change_applies_next_tick() {
    let params = ParameterSlot::new(EffectParameters::default());
    let mut pipeline = Pipeline::new(solid(2, 2, [200, 100, 50]), params.clone(), seeded(DeviceClass::Standard));
    pipeline.tick();
    assert_eq!(pipeline.buffer().get(0, 0), Some([200, 100, 50, 255]));

    params.set(EffectParameters::default().with_filter(FilterId::Noir));
    pipeline.tick();
    assert_eq!(pipeline.buffer().get(0, 0), Some([124, 124, 124, 255]));
}

#[test]
fn test_out_of_range_parameters_are_clamped_with_warning() {
    let params = EffectParameters {
        brightness: 500,
        ..EffectParameters::default()
    };
    let mut pipeline = Pipeline::new(solid(2, 2, [10, 10, 10]), params, seeded(DeviceClass::Standard));
    let report = pipeline.tick();
    assert!(report.composited());
    assert!(report.warnings.iter().any(|w| matches!(
        w,
        PipelineError::InvalidParameter {
            name: "brightness",
            ..
        }
    )));
    // Clamped to +100
    assert_eq!(pipeline.buffer().get(0, 0), Some([110, 110, 110, 255]));
}

// ==================== Source Failures ====================

#[test]
fn test_missing_frame_leaves_buffer() {
    let mut first = true;
    let source = move || {
        if first {
            first = false;
            Some(Frame::new([9u8, 9, 9].repeat(4), 2, 2, FrameFormat::Rgb))
        } else {
            None
        }
    };
    let mut pipeline = Pipeline::new(source, EffectParameters::default(), seeded(DeviceClass::Standard));
    pipeline.tick();
    let before = pipeline.buffer().clone();

    let report = pipeline.tick();
    assert!(!report.composited());
    assert!(report.warnings.iter().any(|w| matches!(w, PipelineError::NoFrame)));
    assert_eq!(pipeline.buffer(), &before);
}

#[test]
fn test_truncated_frame_is_rejected() {
    let source = || Some(Frame::new(vec![0u8; 5], 2, 2, FrameFormat::Rgb));
    let mut pipeline = Pipeline::new(source, EffectParameters::default(), seeded(DeviceClass::Standard));
    let report = pipeline.tick();
    assert!(!report.composited());
    assert!(report
        .warnings
        .iter()
        .any(|w| matches!(w, PipelineError::BufferSizeMismatch { .. })));
}

#[test]
fn test_shared_pipeline_runs_ticks() {
    let pipeline = Pipeline::new(
        solid(4, 4, [1, 1, 1]),
        EffectParameters::default(),
        seeded(DeviceClass::Standard),
    );
    let shared = SharedPipeline::new(pipeline);
    let timer = shared.clone();
    assert!(timer.try_tick().is_some());
    assert!(timer.try_tick().is_some());
    assert_eq!(shared.with(|p| p.scheduler().frame_count()), 2);
}

#[test]
fn test_same_seed_same_glitch_output() {
    let run = || {
        let params = EffectParameters::default().with_filter(FilterId::Glitch);
        let mut pipeline = Pipeline::new(
            TestPattern::new(32, 16, PatternKind::Gradient),
            params,
            seeded(DeviceClass::Standard),
        );
        for _ in 0..3 {
            pipeline.tick();
        }
        pipeline.buffer().clone()
    };
    assert_eq!(run(), run());
}
