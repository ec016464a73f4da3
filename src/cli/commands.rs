//! Subcommand handlers for run, histogram, list and config actions.

use std::path::Path;
use std::time::{Duration, Instant};

use super::args::{ConfigAction, RunArgs};
use super::enums::PatternArg;
use crate::capture::{PngSequenceSink, Recorder};
use crate::config::{default_path as get_config_path, Config};
use crate::frame::{FrameSource, PixelBuffer, StillImage, TestPattern};
use crate::histogram::{Histogram, BINS};
use crate::params::{CreativeMode, EffectParameters, FilterId, StyleId};
use crate::pipeline::{ctrlc_received, setup_ctrlc_handler, Pipeline, PipelineSettings};

/// Load the config for a command.
///
/// An explicit `--config` path must exist and parse. The default path falls
/// back to built-in settings with a warning if it cannot be loaded.
pub fn load_config(path: Option<&Path>) -> Result<Config, String> {
    match path {
        Some(path) => Config::load_from_explicit(path).map_err(|e| e.to_string()),
        None => match Config::load(None) {
            Ok(config) => Ok(config),
            Err(e) => {
                log::warn!("Failed to load config file: {}", e);
                log::warn!("Using default settings.");
                Ok(Config::default())
            }
        },
    }
}

/// Merge run flags over the config: CLI args > config file > built-in defaults.
pub fn merge_run_settings(args: &RunArgs, config: &Config) -> (EffectParameters, PipelineSettings) {
    let mut params = config.effects;
    if let Some(filter) = args.filter {
        params.filter = filter;
    }
    if let Some(style) = args.style {
        params.style = style;
    }
    if args.mode.is_some() {
        params.creative_mode = args.mode;
    }
    if let Some(exposure) = args.exposure {
        params.exposure = exposure;
    }
    if let Some(brightness) = args.brightness {
        params.brightness = brightness;
    }
    if let Some(contrast) = args.contrast {
        params.contrast = contrast;
    }
    if let Some(saturation) = args.saturation {
        params.saturation = saturation;
    }
    if let Some(blur) = args.blur {
        params.blur_radius_px = blur;
    }
    if let Some(vignette) = args.vignette {
        params.vignette_strength = vignette;
    }

    let mut config = config.clone();
    config.session.low_power |= args.low_power;
    config.session.mirror |= args.mirror;
    config.session.histogram |= args.histogram;
    if args.seed.is_some() {
        config.session.seed = args.seed;
    }

    (params, PipelineSettings::from_config(&config))
}

/// Run the pipeline until the tick budget is spent or Ctrl+C arrives.
pub fn run(args: RunArgs, config_path: Option<&Path>) -> Result<(), String> {
    let config = load_config(config_path)?;
    let (params, settings) = merge_run_settings(&args, &config);

    match &args.input {
        Some(path) => {
            let source = StillImage::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
            let (w, h) = source.dimensions();
            log::info!("Source: {} ({}x{})", path.display(), w, h);
            run_with(source, params, settings, &args, &config)
        }
        None => {
            let kind = args.pattern.unwrap_or_default();
            log::info!("Source: {:?} test pattern ({}x{})", kind, args.width, args.height);
            let source = TestPattern::new(args.width, args.height, kind.into());
            run_with(source, params, settings, &args, &config)
        }
    }
}

fn run_with<S: FrameSource>(
    source: S,
    params: EffectParameters,
    settings: PipelineSettings,
    args: &RunArgs,
    config: &Config,
) -> Result<(), String> {
    log::info!(
        "Effects: style {}, filter {}, mode {}",
        params.style,
        params.filter,
        params
            .creative_mode
            .map(|m| m.name())
            .unwrap_or("none")
    );

    let record_dir = args.record.clone().or_else(|| config.recording.output_dir.clone());
    let mut recorder = match record_dir {
        Some(dir) => {
            let sink = PngSequenceSink::create(&dir).map_err(|e| e.to_string())?;
            let fps = args.fps.unwrap_or(config.recording.fps);
            log::info!("Recording to {} at {} fps", dir.display(), fps);
            Some(Recorder::with_fps(sink, fps))
        }
        None => None,
    };

    if let Err(e) = setup_ctrlc_handler() {
        log::warn!("Could not set up Ctrl+C handler: {}", e);
    }

    let mut pipeline = Pipeline::new(source, params, settings);
    let interval = pipeline.scheduler().tick_interval();
    let mut stats = RunStats::default();
    let recording_started = Instant::now();

    while args.ticks == 0 || stats.ticks < args.ticks {
        if ctrlc_received() {
            break;
        }
        let started = Instant::now();
        let report = pipeline.tick();
        stats.ticks += 1;

        if !report.kind.is_active() {
            stats.skipped += 1;
        } else if report.composited() {
            stats.composited += 1;
            if let Some(recorder) = recorder.as_mut() {
                recorder
                    .offer(pipeline.buffer(), recording_started.elapsed())
                    .map_err(|e| e.to_string())?;
            }
        }
        stats.warnings += report.warnings.len() as u64;

        if let Some(histogram) = &report.histogram {
            log::info!(
                "tick {}: histogram mean {:.1}, peak {}",
                report.frame_index,
                histogram.mean().unwrap_or(0.0),
                histogram.peak().map(|p| p.to_string()).unwrap_or_else(|| "-".into())
            );
        }

        let elapsed = started.elapsed();
        if elapsed < interval {
            std::thread::sleep(interval - elapsed);
        }
    }

    if let Some(recorder) = recorder {
        let sink = recorder.finish().map_err(|e| e.to_string())?;
        println!("Recorded {} frames to {}", sink.written(), sink.dir().display());
    }

    if let Some(path) = &args.snapshot {
        let snapshot = pipeline.snapshot();
        snapshot.save_png(path).map_err(|e| e.to_string())?;
        println!(
            "Saved snapshot {}x{} to {}",
            snapshot.width(),
            snapshot.height(),
            path.display()
        );
    }

    println!("{}", stats);
    Ok(())
}

#[derive(Debug, Default)]
struct RunStats {
    ticks: u64,
    composited: u64,
    skipped: u64,
    warnings: u64,
}

impl std::fmt::Display for RunStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Processed {} ticks: {} composited, {} skipped, {} warnings",
            self.ticks, self.composited, self.skipped, self.warnings
        )
    }
}

/// Print the brightness histogram of an image file.
pub fn histogram(image: &Path, json: bool) -> Result<(), String> {
    let mut source = StillImage::open(image).map_err(|e| format!("{}: {}", image.display(), e))?;
    let frame = source
        .next_frame()
        .ok_or_else(|| format!("{}: no frame", image.display()))?;
    let mut buffer = PixelBuffer::default();
    buffer.copy_from(&frame, false, 1.0).map_err(|e| e.to_string())?;
    let histogram = Histogram::from_buffer(&buffer);

    if json {
        let text = serde_json::to_string(&histogram).map_err(|e| e.to_string())?;
        println!("{}", text);
        return Ok(());
    }

    println!("{} ({}x{})", image.display(), buffer.width(), buffer.height());
    println!("  Pixels: {}", histogram.total());
    if let Some(mean) = histogram.mean() {
        println!("  Mean:   {:.1}", mean);
    }
    if let Some(peak) = histogram.peak() {
        println!("  Peak:   {} ({} pixels)", peak, histogram.get(peak));
    }
    println!();
    for line in render_bars(&histogram, 16, 50) {
        println!("{}", line);
    }
    Ok(())
}

/// Text bar chart with `rows` groups of buckets, longest bar `width` characters.
pub fn render_bars(histogram: &Histogram, rows: usize, width: usize) -> Vec<String> {
    let rows = rows.clamp(1, BINS);
    let per_row = BINS.div_ceil(rows);
    let groups: Vec<u64> = histogram
        .bins()
        .chunks(per_row)
        .map(|chunk| chunk.iter().map(|&c| c as u64).sum())
        .collect();
    let max = groups.iter().copied().max().unwrap_or(0);

    groups
        .iter()
        .enumerate()
        .map(|(i, &count)| {
            let start = i * per_row;
            let end = (start + per_row).min(BINS) - 1;
            let len = if max == 0 {
                0
            } else {
                (count * width as u64 / max) as usize
            };
            format!("{:>3}-{:<3} |{}", start, end, "#".repeat(len))
        })
        .collect()
}

/// Print the filter, style and creative-mode catalogs.
pub fn list() {
    println!("Filters:");
    for filter in FilterId::ALL {
        println!("  {}", filter);
    }
    println!();
    println!("Styles:");
    for style in StyleId::ALL {
        println!("  {}", style);
    }
    println!();
    println!("Creative modes:");
    for mode in CreativeMode::ALL {
        if mode == CreativeMode::FaceAr {
            println!("  {} (not available)", mode);
        } else {
            println!("  {}", mode);
        }
    }
    println!();
    println!("Patterns: {:?}, {:?}", PatternArg::Gradient, PatternArg::Bars);
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, config_path: Option<&Path>) -> Result<(), String> {
    let path = config_path.map(Path::to_path_buf).unwrap_or_else(get_config_path);
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            if path.exists() {
                println!("# Config file: {} (exists)", path.display());
            } else {
                println!("# Config file: {} (not found, showing defaults)", path.display());
            }
            println!();
            print!("{}", config.to_toml().map_err(|e| e.to_string())?);
            Ok(())
        }
        ConfigAction::Init => {
            Config::init(&path).map_err(|e| e.to_string())?;
            println!("Created config file: {}", path.display());
            Ok(())
        }
    }
}
