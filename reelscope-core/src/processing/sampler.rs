// ============================================================================
// reelscope-core/src/processing/sampler.rs
// ============================================================================
//
// FRAME SAMPLER: Deterministic Access to Decoded Frames
//
// A `FrameSource` exposes a video's metadata and hands out frames for an
// explicit `FrameRange`. Every call gets a fresh decode view, so two scans of
// the same source never share a cursor and can be repeated with identical
// results. Higher-level helpers (`sample_at`, `sample_every`) are provided
// methods built on top of `frames`.
//
// KEY COMPONENTS:
// - VideoInfo: frame rate, frame count and dimensions
// - FrameRange / FrameSample: what to decode and what comes back
// - FrameSource: the decoding seam, implemented by FfmpegFrameSource and by
//   in-memory sources in tests
// - IntervalSamples: lazy fixed-interval iterator

use crate::error::{CoreError, CoreResult};
use crate::external::{probe_video, spawn_frame_decoder};
use crate::utils::safe_div;
use image::RgbImage;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Stream metadata for an opened video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VideoInfo {
    /// Frames per second; 0.0 when unknown.
    pub fps: f64,
    pub frame_count: u64,
    pub width: u32,
    pub height: u32,
}

impl VideoInfo {
    /// Duration in seconds, 0.0 when the frame rate is unknown.
    #[must_use]
    pub fn duration(&self) -> f64 {
        safe_div(self.frame_count as f64, self.fps)
    }

    /// Timestamp of a frame index, 0.0 when the frame rate is unknown.
    #[must_use]
    pub fn timestamp_of(&self, index: u64) -> f64 {
        safe_div(index as f64, self.fps)
    }
}

/// A contiguous run of frames starting at `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRange {
    pub start: u64,
    pub count: u64,
}

impl FrameRange {
    /// The first `count` frames of the video.
    #[must_use]
    pub const fn first(count: u64) -> Self {
        Self { start: 0, count }
    }

    /// A single frame.
    #[must_use]
    pub const fn single(index: u64) -> Self {
        Self {
            start: index,
            count: 1,
        }
    }
}

/// One decoded frame. The pixel buffer is owned and never mutated.
#[derive(Debug, Clone)]
pub struct FrameSample {
    pub index: u64,
    /// Seconds from the start of the video.
    pub timestamp: f64,
    pub image: RgbImage,
}

/// Boxed frame iterator returned by [`FrameSource::frames`].
pub type FrameIter<'a> = Box<dyn Iterator<Item = FrameSample> + 'a>;

/// Source of decoded video frames.
pub trait FrameSource {
    /// Metadata captured when the source was opened.
    fn info(&self) -> VideoInfo;

    /// Decodes `range` from a fresh position.
    ///
    /// The iterator ends early when the video runs out of frames or a frame
    /// cannot be decoded.
    fn frames(&self, range: FrameRange) -> CoreResult<FrameIter<'_>>;

    /// Decodes one frame. `None` beyond the end or when unreadable.
    ///
    /// A frame count of 0 means the length is unknown, so the decoder decides
    /// where the video ends.
    fn sample_at(&self, index: u64) -> Option<FrameSample> {
        let frame_count = self.info().frame_count;
        if frame_count > 0 && index >= frame_count {
            return None;
        }
        match self.frames(FrameRange::single(index)) {
            Ok(mut frames) => frames.next(),
            Err(e) => {
                log::debug!("Frame {} unreadable: {}", index, e);
                None
            }
        }
    }

    /// Lazily samples one frame every `interval_secs`, starting at frame 0.
    ///
    /// Unreadable frames are skipped. Calling this again restarts from the
    /// beginning. Yields nothing when the frame rate is unknown.
    fn sample_every(&self, interval_secs: f64) -> IntervalSamples<'_, Self>
    where
        Self: Sized,
    {
        IntervalSamples::new(self, interval_secs)
    }
}

/// Iterator returned by [`FrameSource::sample_every`].
pub struct IntervalSamples<'a, S: FrameSource + ?Sized> {
    source: &'a S,
    next_index: u64,
    step: u64,
    end: u64,
}

impl<'a, S: FrameSource + ?Sized> IntervalSamples<'a, S> {
    pub fn new(source: &'a S, interval_secs: f64) -> Self {
        let info = source.info();
        let (step, end) = if info.fps > 0.0 && interval_secs > 0.0 && interval_secs.is_finite() {
            (((info.fps * interval_secs) as u64).max(1), info.frame_count)
        } else {
            (1, 0)
        };
        Self {
            source,
            next_index: 0,
            step,
            end,
        }
    }

    /// Frame indices this iterator will attempt, in order.
    #[must_use]
    pub fn planned_indices(&self) -> Vec<u64> {
        (self.next_index..self.end).step_by(self.step as usize).collect()
    }
}

impl<S: FrameSource + ?Sized> Iterator for IntervalSamples<'_, S> {
    type Item = FrameSample;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_index < self.end {
            let index = self.next_index;
            self.next_index = self.next_index.saturating_add(self.step);
            match self.source.sample_at(index) {
                Some(sample) => return Some(sample),
                None => log::debug!("Skipping unreadable frame {}", index),
            }
        }
        None
    }
}

/// Frame source backed by ffprobe metadata and ffmpeg decoding.
#[derive(Debug, Clone)]
pub struct FfmpegFrameSource {
    path: PathBuf,
    info: VideoInfo,
}

impl FfmpegFrameSource {
    /// Opens a video and probes its metadata.
    ///
    /// This is the only hard failure point of an analysis: a missing or
    /// unprobeable file is reported as `VideoOpen`.
    pub fn open(path: &Path) -> CoreResult<Self> {
        if !path.is_file() {
            return Err(CoreError::VideoOpen(format!(
                "{} does not exist or is not a file",
                path.display()
            )));
        }
        let info = probe_video(path)
            .map_err(|e| CoreError::VideoOpen(format!("{}: {}", path.display(), e)))?;

        log::debug!(
            "Opened {} ({}x{}, {:.3} fps, {} frames)",
            path.display(),
            info.width,
            info.height,
            info.fps,
            info.frame_count
        );
        Ok(Self {
            path: path.to_path_buf(),
            info,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for FfmpegFrameSource {
    fn info(&self) -> VideoInfo {
        self.info
    }

    fn frames(&self, range: FrameRange) -> CoreResult<FrameIter<'_>> {
        if range.count == 0 {
            return Ok(Box::new(std::iter::empty()));
        }
        if range.start > 0 && self.info.fps <= 0.0 {
            return Err(CoreError::OperationFailed(format!(
                "cannot seek to frame {} without a known frame rate",
                range.start
            )));
        }

        let start_secs = self.info.timestamp_of(range.start);
        let stream = spawn_frame_decoder(&self.path, start_secs, range.count)?;
        let info = self.info;

        let samples = stream
            .take(range.count as usize)
            .enumerate()
            .map_while(move |(offset, frame)| {
                let index = range.start + offset as u64;
                match RgbImage::from_raw(frame.width, frame.height, frame.data) {
                    Some(image) => Some(FrameSample {
                        index,
                        timestamp: info.timestamp_of(index),
                        image,
                    }),
                    None => {
                        log::warn!("Frame {} has a truncated pixel buffer", index);
                        None
                    }
                }
            });
        Ok(Box::new(samples))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Solid frames whose red channel encodes the frame index.
    struct CountingSource {
        info: VideoInfo,
        unreadable: Vec<u64>,
        /// Frames the decoder can produce, which may exceed `info.frame_count`.
        decodable: u64,
        requests: RefCell<Vec<FrameRange>>,
    }

    impl CountingSource {
        fn new(fps: f64, frame_count: u64) -> Self {
            Self {
                info: VideoInfo {
                    fps,
                    frame_count,
                    width: 4,
                    height: 4,
                },
                unreadable: Vec::new(),
                decodable: frame_count,
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl FrameSource for CountingSource {
        fn info(&self) -> VideoInfo {
            self.info
        }

        fn frames(&self, range: FrameRange) -> CoreResult<FrameIter<'_>> {
            self.requests.borrow_mut().push(range);
            if self.unreadable.contains(&range.start) {
                return Err(CoreError::OperationFailed("corrupt".to_string()));
            }
            let end = (range.start + range.count).min(self.decodable);
            let info = self.info;
            Ok(Box::new((range.start..end).map(move |index| FrameSample {
                index,
                timestamp: info.timestamp_of(index),
                image: RgbImage::from_pixel(4, 4, image::Rgb([index as u8, 0, 0])),
            })))
        }
    }

    #[test]
    fn test_duration_handles_unknown_fps() {
        let info = VideoInfo {
            fps: 0.0,
            frame_count: 300,
            width: 1080,
            height: 1920,
        };
        assert_eq!(info.duration(), 0.0);
        assert_eq!(info.timestamp_of(10), 0.0);

        let info = VideoInfo { fps: 30.0, ..info };
        assert_eq!(info.duration(), 10.0);
        assert_eq!(info.timestamp_of(45), 1.5);

        let info = VideoInfo { fps: -5.0, ..info };
        assert_eq!(info.duration(), 0.0);
    }

    #[test]
    fn test_sample_at_bounds() {
        let source = CountingSource::new(30.0, 10);
        let sample = source.sample_at(3).unwrap();
        assert_eq!(sample.index, 3);
        assert_eq!(sample.image.get_pixel(0, 0).0[0], 3);
        assert!(source.sample_at(10).is_none());
        assert!(source.sample_at(u64::MAX).is_none());
    }

    #[test]
    fn test_sample_at_with_unknown_length_asks_the_decoder() {
        let mut source = CountingSource::new(0.0, 0);
        source.decodable = 5;
        let sample = source.sample_at(0).unwrap();
        assert_eq!(sample.index, 0);
        assert_eq!(sample.timestamp, 0.0);
        assert_eq!(*source.requests.borrow(), vec![FrameRange::single(0)]);
    }

    #[test]
    fn test_sample_every_steps_and_restarts() {
        let source = CountingSource::new(30.0, 300);
        let first: Vec<u64> = source.sample_every(2.0).map(|s| s.index).collect();
        assert_eq!(first, vec![0, 60, 120, 180, 240]);

        let second: Vec<u64> = source.sample_every(2.0).map(|s| s.index).collect();
        assert_eq!(first, second);

        let timestamps: Vec<f64> = source.sample_every(2.0).map(|s| s.timestamp).collect();
        assert_eq!(timestamps, vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_sample_every_skips_unreadable_frames() {
        let mut source = CountingSource::new(30.0, 300);
        source.unreadable = vec![60, 180];
        let indices: Vec<u64> = source.sample_every(2.0).map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 120, 240]);
    }

    #[test]
    fn test_sample_every_degenerate_inputs() {
        let source = CountingSource::new(0.0, 300);
        assert_eq!(source.sample_every(2.0).count(), 0);

        let source = CountingSource::new(30.0, 0);
        assert_eq!(source.sample_every(2.0).count(), 0);

        // Step never drops below one frame.
        let source = CountingSource::new(30.0, 5);
        assert_eq!(source.sample_every(0.001).planned_indices(), vec![0, 1, 2, 3, 4]);

        let source = CountingSource::new(30.0, 5);
        assert_eq!(source.sample_every(-1.0).count(), 0);
    }

    #[test]
    fn test_frame_ranges_are_independent() {
        let source = CountingSource::new(30.0, 100);
        let a: Vec<u64> = source.frames(FrameRange::first(3)).unwrap().map(|s| s.index).collect();
        let b: Vec<u64> = source.frames(FrameRange::first(3)).unwrap().map(|s| s.index).collect();
        assert_eq!(a, vec![0, 1, 2]);
        assert_eq!(a, b);
        assert_eq!(
            *source.requests.borrow(),
            vec![FrameRange::first(3), FrameRange::first(3)]
        );
    }

    #[test]
    fn test_open_missing_file_is_hard_error() {
        let err = FfmpegFrameSource::open(Path::new("/nonexistent/reel.mp4")).unwrap_err();
        assert!(matches!(err, CoreError::VideoOpen(_)));
    }
}
