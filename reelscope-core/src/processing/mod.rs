//! Frame and audio analysis.
//!
//! The submodules are layered: `sampler` yields decoded frames, `imaging`
//! holds the per-frame pixel math, and the engines (`visual`, `audio`,
//! `composition`, `thumbnails`) turn those into the records a report is
//! built from.

/// Frame access and interval sampling
pub mod sampler;

/// Grayscale, edge and integral-image helpers
pub mod imaging;

/// Whole-video brightness, sharpness and scene-change metrics
pub mod visual;

/// Loudness, silence and noise metrics from the audio track
pub mod audio;

/// Face detection seam and the bundled Haar cascade detector
pub mod face;

/// Per-frame face, composition, vibrancy and text scores
pub mod composition;

/// Thumbnail candidate scoring and ranking
pub mod thumbnails;

pub use audio::{AudioMetrics, AudioReport, analyze_audio_file};
pub use sampler::{FfmpegFrameSource, FrameRange, FrameSample, FrameSource, VideoInfo};
pub use thumbnails::{ThumbnailSuggestion, suggest_thumbnails_from};
pub use visual::{VisualMetrics, analyze_visual};
