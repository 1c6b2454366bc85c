// reelscope-core/tests/common/mod.rs
//
// Shared fixtures: an in-memory frame source and synthetic waveforms.

#![allow(dead_code)]

use image::{Rgb, RgbImage};
use reelscope_core::processing::sampler::FrameIter;
use reelscope_core::{CoreError, CoreResult, FrameRange, FrameSample, FrameSource, VideoInfo};
use std::collections::HashSet;

type FrameFn = Box<dyn Fn(u64) -> RgbImage + Send + Sync>;

/// Frame source that renders every frame from a closure.
pub struct SyntheticVideo {
    info: VideoInfo,
    render: FrameFn,
    unreadable: HashSet<u64>,
    /// Frames the decoder produces, independent of the reported metadata.
    decodable: u64,
}

impl SyntheticVideo {
    pub fn new(
        fps: f64,
        frame_count: u64,
        width: u32,
        height: u32,
        render: impl Fn(u64) -> RgbImage + Send + Sync + 'static,
    ) -> Self {
        Self {
            info: VideoInfo {
                fps,
                frame_count,
                width,
                height,
            },
            render: Box::new(render),
            unreadable: HashSet::new(),
            decodable: frame_count,
        }
    }

    /// Solid-color video.
    pub fn solid(fps: f64, frame_count: u64, width: u32, height: u32, color: [u8; 3]) -> Self {
        Self::new(fps, frame_count, width, height, move |_| {
            RgbImage::from_pixel(width, height, Rgb(color))
        })
    }

    /// Reports no frame rate and no frame count while still decoding frames.
    pub fn with_unknown_length(mut self) -> Self {
        self.info.fps = 0.0;
        self.info.frame_count = 0;
        self
    }

    /// Marks frames that fail to decode.
    pub fn with_unreadable(mut self, indices: &[u64]) -> Self {
        self.unreadable.extend(indices.iter().copied());
        self
    }
}

impl FrameSource for SyntheticVideo {
    fn info(&self) -> VideoInfo {
        self.info
    }

    fn frames(&self, range: FrameRange) -> CoreResult<FrameIter<'_>> {
        if range.start > 0 && self.info.fps <= 0.0 {
            return Err(CoreError::OperationFailed("cannot seek".to_string()));
        }
        let end = range.start.saturating_add(range.count).min(self.decodable);
        let info = self.info;
        // A decoder stops at the first bad frame.
        Ok(Box::new(
            (range.start..end)
                .take_while(move |index| !self.unreadable.contains(index))
                .map(move |index| FrameSample {
                    index,
                    timestamp: info.timestamp_of(index),
                    image: (self.render)(index),
                }),
        ))
    }
}

/// Frame with a bright, saturated square on a gray background.
pub fn square_frame(width: u32, height: u32, square: u32, color: [u8; 3]) -> RgbImage {
    let mut image = RgbImage::from_pixel(width, height, Rgb([90, 90, 90]));
    let (x0, y0) = (width / 3 - square / 2, height / 3 - square / 2);
    for y in y0..y0 + square {
        for x in x0..x0 + square {
            image.put_pixel(x, y, Rgb(color));
        }
    }
    image
}

/// Sine tone in [-amplitude, amplitude].
pub fn sine(freq: f64, amplitude: f32, sample_rate: u32, secs: f64) -> Vec<f32> {
    let n = (f64::from(sample_rate) * secs) as usize;
    (0..n)
        .map(|i| {
            amplitude
                * (2.0 * std::f64::consts::PI * freq * i as f64 / f64::from(sample_rate)).sin()
                    as f32
        })
        .collect()
}
