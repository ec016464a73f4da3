//! Snapshot and recording output.
//!
//! Everything here works on owned copies of the composited buffer, so the next
//! tick can overwrite the working buffer while a capture is still being written.

mod errors;

pub use errors::CaptureError;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::frame::PixelBuffer;

/// Frame rate handed to the video encoder unless configured otherwise.
pub const DEFAULT_RECORDING_FPS: u32 = 30;

/// Point-in-time copy of a composited frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub buffer: PixelBuffer,
    /// Scheduler tick the frame was composited on
    pub frame_index: u64,
}

impl Snapshot {
    /// Copy `buffer` out.
    pub fn capture(buffer: &PixelBuffer, frame_index: u64) -> Self {
        Self {
            buffer: buffer.clone(),
            frame_index,
        }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Encode as PNG at `path`, creating parent directories as needed.
    pub fn save_png(&self, path: &Path) -> Result<(), CaptureError> {
        write_png(&self.buffer, path)
    }
}

fn write_png(buffer: &PixelBuffer, path: &Path) -> Result<(), CaptureError> {
    if buffer.is_empty() {
        return Err(CaptureError::EmptyFrame);
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| CaptureError::io(parent, e))?;
        }
    }
    let image = image::RgbaImage::from_raw(buffer.width(), buffer.height(), buffer.as_bytes().to_vec())
        .ok_or(CaptureError::EmptyFrame)?;
    image.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Downstream consumer of recorded frames (an encoder, a file writer, ...).
pub trait FrameSink {
    /// Take one frame with its presentation time from the start of the recording.
    fn push_frame(&mut self, frame: &PixelBuffer, pts: Duration) -> Result<(), CaptureError>;

    /// Called once when recording stops.
    fn finish(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }
}

/// Stamps frames at a fixed nominal rate and hands them to a sink.
pub struct Recorder<S: FrameSink> {
    sink: S,
    fps: u32,
    frames: u64,
}

impl<S: FrameSink> Recorder<S> {
    pub fn new(sink: S) -> Self {
        Self::with_fps(sink, DEFAULT_RECORDING_FPS)
    }

    /// A zero rate falls back to the default.
    pub fn with_fps(sink: S, fps: u32) -> Self {
        let fps = if fps == 0 { DEFAULT_RECORDING_FPS } else { fps };
        Self { sink, fps, frames: 0 }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn frames_recorded(&self) -> u64 {
        self.frames
    }

    /// Presentation time of frame `n`.
    pub fn pts_for(&self, n: u64) -> Duration {
        Duration::from_secs_f64(n as f64 / self.fps as f64)
    }

    /// Record one frame. Empty frames are ignored.
    pub fn record(&mut self, frame: &PixelBuffer) -> Result<(), CaptureError> {
        if frame.is_empty() {
            log::debug!("recorder: skipping empty frame");
            return Ok(());
        }
        let pts = self.pts_for(self.frames);
        self.sink.push_frame(frame, pts)?;
        self.frames += 1;
        Ok(())
    }

    /// Offer a frame composited `at` after the recording started.
    ///
    /// The frame is kept only once `at` reaches the presentation time of the
    /// next frame, so a pipeline ticking faster than `fps` is sampled down to
    /// `fps` and the recorded timeline never runs ahead of the wall clock.
    /// Returns whether the frame was recorded.
    pub fn offer(&mut self, frame: &PixelBuffer, at: Duration) -> Result<bool, CaptureError> {
        if frame.is_empty() || at < self.pts_for(self.frames) {
            return Ok(false);
        }
        self.record(frame)?;
        Ok(true)
    }

    /// Flush the sink and hand it back.
    pub fn finish(mut self) -> Result<S, CaptureError> {
        self.sink.finish()?;
        log::info!("recording finished: {} frames at {} fps", self.frames, self.fps);
        Ok(self.sink)
    }
}

/// Keeps owned copies of every frame pushed. Useful for tests and previews.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub frames: Vec<(PixelBuffer, Duration)>,
}

impl FrameSink for MemorySink {
    fn push_frame(&mut self, frame: &PixelBuffer, pts: Duration) -> Result<(), CaptureError> {
        self.frames.push((frame.clone(), pts));
        Ok(())
    }
}

/// Writes `frame_000000.png`, `frame_000001.png`, ... into a directory.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    written: u64,
}

impl PngSequenceSink {
    /// Create the output directory if it does not exist.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, CaptureError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| CaptureError::io(&dir, e))?;
        Ok(Self { dir, written: 0 })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn frame_path(&self, n: u64) -> PathBuf {
        self.dir.join(format!("frame_{:06}.png", n))
    }

    pub fn written(&self) -> u64 {
        self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn push_frame(&mut self, frame: &PixelBuffer, _pts: Duration) -> Result<(), CaptureError> {
        let path = self.frame_path(self.written);
        write_png(frame, &path)?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), CaptureError> {
        log::debug!("wrote {} frames to {}", self.written, self.dir.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut buffer = PixelBuffer::filled(2, 2, [1, 2, 3, 255]);
        let snapshot = Snapshot::capture(&buffer, 7);
        buffer.fill([9, 9, 9, 255]);
        assert_eq!(snapshot.buffer.get(0, 0), Some([1, 2, 3, 255]));
        assert_eq!(snapshot.frame_index, 7);
    }

    #[test]
    fn test_recorder_stamps_at_fixed_rate() {
        let mut recorder = Recorder::new(MemorySink::default());
        let frame = PixelBuffer::filled(2, 2, [0, 0, 0, 255]);
        for _ in 0..4 {
            recorder.record(&frame).unwrap();
        }
        let sink = recorder.finish().unwrap();
        let pts: Vec<Duration> = sink.frames.iter().map(|(_, pts)| *pts).collect();
        assert_eq!(pts[0], Duration::ZERO);
        assert_eq!(pts[3], Duration::from_millis(100));
    }

    #[test]
    fn test_offer_samples_down_to_fps() {
        let mut recorder = Recorder::with_fps(MemorySink::default(), 10);
        let frame = PixelBuffer::filled(1, 1, [0, 0, 0, 255]);
        let kept: Vec<bool> = [0, 40, 99, 100, 150, 210]
            .iter()
            .map(|&ms| recorder.offer(&frame, Duration::from_millis(ms)).unwrap())
            .collect();
        assert_eq!(kept, vec![true, false, false, true, false, true]);
        assert_eq!(recorder.frames_recorded(), 3);
    }

    #[test]
    fn test_recorder_zero_fps_falls_back() {
        let recorder = Recorder::with_fps(MemorySink::default(), 0);
        assert_eq!(recorder.fps(), DEFAULT_RECORDING_FPS);
    }

    #[test]
    fn test_recorder_skips_empty_frames() {
        let mut recorder = Recorder::new(MemorySink::default());
        recorder.record(&PixelBuffer::default()).unwrap();
        assert_eq!(recorder.frames_recorded(), 0);
    }

    #[test]
    fn test_save_empty_snapshot_fails() {
        let snapshot = Snapshot::capture(&PixelBuffer::default(), 0);
        let result = snapshot.save_png(Path::new("unused.png"));
        assert!(matches!(result, Err(CaptureError::EmptyFrame)));
    }

    #[test]
    fn test_frame_path_numbering() {
        let sink = PngSequenceSink {
            dir: PathBuf::from("out"),
            written: 0,
        };
        assert_eq!(sink.frame_path(42), PathBuf::from("out").join("frame_000042.png"));
    }
}
