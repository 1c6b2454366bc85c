//! Core library for analyzing short-form videos before they are published.
//!
//! This crate samples frames with ffmpeg, measures picture and sound quality,
//! scores candidate thumbnails per platform, and merges everything with a
//! transcript into a report that a suggestion generator turns into advice.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use reelscope_core::{
//!     AnalysisConfig, DisabledTranscriber, Platform, RuleBasedSuggestions, analyze_reel,
//! };
//! use std::path::Path;
//!
//! let config = AnalysisConfig::default().with_env_overrides();
//! config.validate().unwrap();
//!
//! let report = analyze_reel(
//!     Path::new("/path/to/reel.mp4"),
//!     Platform::Instagram,
//!     &config,
//!     &DisabledTranscriber,
//!     &RuleBasedSuggestions,
//! )
//! .unwrap();
//!
//! for thumbnail in &report.thumbnails {
//!     println!("{:.1}s: {} ({})", thumbnail.timestamp, thumbnail.score, thumbnail.reasoning);
//! }
//! ```

pub mod config;
pub mod error;
pub mod external;
pub mod file_logging;
pub mod pipeline;
pub mod platform;
pub mod processing;
pub mod suggestions;
pub mod temp_files;
pub mod transcription;
pub mod utils;

// Re-exports for public API
pub use config::AnalysisConfig;
pub use error::{CoreError, CoreResult};
pub use external::{check_dependency, check_required_tools};
pub use pipeline::{
    OptimizationReport, analyze_audio, analyze_reel, analyze_visual, suggest_thumbnails,
};
pub use platform::{Platform, PlatformRules, ScoreWeights};
pub use processing::audio::{AudioMetrics, AudioReport, Waveform};
pub use processing::face::{FaceBox, FaceDetector, NoFaceDetector, load_face_detector};
pub use processing::sampler::{FfmpegFrameSource, FrameRange, FrameSample, FrameSource, VideoInfo};
pub use processing::thumbnails::{QualityMetrics, ThumbnailSuggestion};
pub use processing::visual::{HookQuality, VisualMetrics};
pub use suggestions::{RuleBasedSuggestions, SuggestionBundle, SuggestionGenerator};
pub use transcription::{DisabledTranscriber, Transcriber, Transcript};
pub use utils::format_timestamp;
