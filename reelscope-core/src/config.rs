//! Configuration structures and constants for the reelscope-core library.
//!
//! Every threshold used by the metric engines lives here as a named default
//! constant. Several of them (the scene-change threshold and the silence
//! threshold in particular) are heuristics without a derivation; they are
//! kept configurable rather than tuned.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// Visual metrics

/// Number of leading frames sampled for the brightness average.
pub const DEFAULT_BRIGHTNESS_SAMPLE_FRAMES: usize = 30;

/// Number of leading frames scanned for scene changes.
pub const DEFAULT_SCENE_SCAN_FRAMES: usize = 60;

/// Mean absolute grayscale difference (0-255) above which a frame pair
/// counts as a scene change.
pub const DEFAULT_SCENE_CHANGE_THRESHOLD: f64 = 30.0;

/// Average luma strictly below this value classifies a clip as dark.
pub const DEFAULT_DARK_THRESHOLD: f64 = 80.0;

/// Average luma strictly above this value classifies a clip as bright.
pub const DEFAULT_BRIGHT_THRESHOLD: f64 = 180.0;

/// First-frame brightness required for a "good" hook.
pub const DEFAULT_HOOK_MIN_BRIGHTNESS: f64 = 80.0;

/// First-frame Laplacian variance required for a "good" hook.
pub const DEFAULT_HOOK_MIN_SHARPNESS: f64 = 100.0;

// Audio metrics

/// Average loudness below this level (dB) is flagged as too quiet.
pub const DEFAULT_TOO_QUIET_DB: f64 = -30.0;

/// Average loudness above this level (dB) is flagged as too loud.
pub const DEFAULT_TOO_LOUD_DB: f64 = -10.0;

/// RMS level (dBFS) at or below which a window counts as silent.
pub const DEFAULT_SILENCE_THRESHOLD_DB: f64 = -40.0;

/// Minimum silence length in milliseconds.
pub const DEFAULT_MIN_SILENCE_MS: u32 = 500;

/// Maximum number of silence gaps reported.
pub const DEFAULT_MAX_SILENCE_GAPS: usize = 5;

/// Spectral flatness above which the track is considered noisy.
pub const DEFAULT_NOISE_FLATNESS_THRESHOLD: f64 = 0.5;

/// Average loudness below this level (dB) marks the track as silent or low.
pub const DEFAULT_SILENT_OR_LOW_DB: f64 = -40.0;

// Thumbnail ranking

/// Seconds between thumbnail candidate frames.
pub const DEFAULT_THUMBNAIL_INTERVAL_SECS: f64 = 2.0;

/// Number of thumbnail suggestions returned.
pub const DEFAULT_THUMBNAIL_COUNT: usize = 5;

/// Preview image width in pixels.
pub const DEFAULT_PREVIEW_WIDTH: u32 = 320;

/// Preview image height in pixels.
pub const DEFAULT_PREVIEW_HEIGHT: u32 = 180;

/// JPEG quality for preview images (1-100).
pub const DEFAULT_PREVIEW_QUALITY: u8 = 80;

// Face and composition scoring

/// Canny thresholds for the rule-of-thirds composition pass.
pub const DEFAULT_COMPOSITION_CANNY: (f64, f64) = (50.0, 150.0);

/// Canny thresholds for the text-overlay pass.
pub const DEFAULT_TEXT_CANNY: (f64, f64) = (100.0, 200.0);

/// Side length of the square region sampled around each thirds intersection.
pub const DEFAULT_THIRDS_REGION_SIZE: u32 = 50;

/// Whole-frame edge density above which a frame likely carries text.
pub const DEFAULT_TEXT_DENSITY_THRESHOLD: f64 = 0.1;

/// Scale step between face detection passes.
pub const DEFAULT_FACE_SCALE_FACTOR: f64 = 1.1;

/// Number of overlapping raw detections needed to keep a face.
pub const DEFAULT_FACE_MIN_NEIGHBORS: usize = 5;

/// Smallest face window considered, in pixels.
pub const DEFAULT_FACE_MIN_SIZE: u32 = 30;

/// Environment variable consulted for the face cascade path.
pub const FACE_CASCADE_ENV: &str = "REELSCOPE_FACE_CASCADE";

/// Configuration for every analysis stage.
///
/// All fields have defaults, so a JSON config file only needs to list the
/// values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub brightness_sample_frames: usize,
    pub scene_scan_frames: usize,
    pub scene_change_threshold: f64,
    pub dark_threshold: f64,
    pub bright_threshold: f64,
    pub hook_min_brightness: f64,
    pub hook_min_sharpness: f64,

    pub too_quiet_db: f64,
    pub too_loud_db: f64,
    pub silence_threshold_db: f64,
    pub min_silence_ms: u32,
    pub max_silence_gaps: usize,
    pub noise_flatness_threshold: f64,
    pub silent_or_low_db: f64,

    pub thumbnail_interval_secs: f64,
    pub thumbnail_count: usize,
    pub preview_width: u32,
    pub preview_height: u32,
    pub preview_quality: u8,

    pub composition_canny: (f64, f64),
    pub text_canny: (f64, f64),
    pub thirds_region_size: u32,
    pub text_density_threshold: f64,
    pub face_scale_factor: f64,
    pub face_min_neighbors: usize,
    pub face_min_size: u32,

    /// Cascade model used for face detection, either OpenCV cascade XML or
    /// its JSON form. `None` disables faces.
    pub face_cascade: Option<PathBuf>,

    /// Directory for the extracted waveform (defaults to the system temp dir).
    pub temp_dir: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            brightness_sample_frames: DEFAULT_BRIGHTNESS_SAMPLE_FRAMES,
            scene_scan_frames: DEFAULT_SCENE_SCAN_FRAMES,
            scene_change_threshold: DEFAULT_SCENE_CHANGE_THRESHOLD,
            dark_threshold: DEFAULT_DARK_THRESHOLD,
            bright_threshold: DEFAULT_BRIGHT_THRESHOLD,
            hook_min_brightness: DEFAULT_HOOK_MIN_BRIGHTNESS,
            hook_min_sharpness: DEFAULT_HOOK_MIN_SHARPNESS,
            too_quiet_db: DEFAULT_TOO_QUIET_DB,
            too_loud_db: DEFAULT_TOO_LOUD_DB,
            silence_threshold_db: DEFAULT_SILENCE_THRESHOLD_DB,
            min_silence_ms: DEFAULT_MIN_SILENCE_MS,
            max_silence_gaps: DEFAULT_MAX_SILENCE_GAPS,
            noise_flatness_threshold: DEFAULT_NOISE_FLATNESS_THRESHOLD,
            silent_or_low_db: DEFAULT_SILENT_OR_LOW_DB,
            thumbnail_interval_secs: DEFAULT_THUMBNAIL_INTERVAL_SECS,
            thumbnail_count: DEFAULT_THUMBNAIL_COUNT,
            preview_width: DEFAULT_PREVIEW_WIDTH,
            preview_height: DEFAULT_PREVIEW_HEIGHT,
            preview_quality: DEFAULT_PREVIEW_QUALITY,
            composition_canny: DEFAULT_COMPOSITION_CANNY,
            text_canny: DEFAULT_TEXT_CANNY,
            thirds_region_size: DEFAULT_THIRDS_REGION_SIZE,
            text_density_threshold: DEFAULT_TEXT_DENSITY_THRESHOLD,
            face_scale_factor: DEFAULT_FACE_SCALE_FACTOR,
            face_min_neighbors: DEFAULT_FACE_MIN_NEIGHBORS,
            face_min_size: DEFAULT_FACE_MIN_SIZE,
            face_cascade: None,
            temp_dir: None,
        }
    }
}

impl AnalysisConfig {
    /// Loads a config from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> CoreResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: AnalysisConfig = serde_json::from_str(&raw)?;
        log::debug!("Loaded analysis config from {}", path.display());
        Ok(config)
    }

    /// Fills `face_cascade` from the environment when it is not set.
    pub fn with_env_overrides(mut self) -> Self {
        if self.face_cascade.is_none() {
            if let Ok(path) = std::env::var(FACE_CASCADE_ENV) {
                if !path.trim().is_empty() {
                    self.face_cascade = Some(PathBuf::from(path));
                }
            }
        }
        self
    }

    /// Checks ranges that would otherwise produce degenerate output.
    pub fn validate(&self) -> CoreResult<()> {
        if self.brightness_sample_frames == 0 {
            return Err(CoreError::Config(
                "brightness_sample_frames must be at least 1".to_string(),
            ));
        }

        if self.scene_scan_frames < 2 {
            return Err(CoreError::Config(format!(
                "scene_scan_frames must be at least 2, got {}",
                self.scene_scan_frames
            )));
        }

        if !(self.thumbnail_interval_secs > 0.0 && self.thumbnail_interval_secs.is_finite()) {
            return Err(CoreError::Config(format!(
                "thumbnail_interval_secs must be positive, got {}",
                self.thumbnail_interval_secs
            )));
        }

        if self.thumbnail_count == 0 {
            return Err(CoreError::Config(
                "thumbnail_count must be at least 1".to_string(),
            ));
        }

        if self.preview_width == 0 || self.preview_height == 0 {
            return Err(CoreError::Config(format!(
                "preview size must be non-zero, got {}x{}",
                self.preview_width, self.preview_height
            )));
        }

        if self.preview_quality == 0 || self.preview_quality > 100 {
            return Err(CoreError::Config(format!(
                "preview_quality must be 1-100, got {}",
                self.preview_quality
            )));
        }

        if self.dark_threshold >= self.bright_threshold {
            return Err(CoreError::Config(format!(
                "dark_threshold ({}) must be below bright_threshold ({})",
                self.dark_threshold, self.bright_threshold
            )));
        }

        if self.face_scale_factor <= 1.0 {
            return Err(CoreError::Config(format!(
                "face_scale_factor must be greater than 1.0, got {}",
                self.face_scale_factor
            )));
        }

        if self.min_silence_ms == 0 {
            return Err(CoreError::Config(
                "min_silence_ms must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AnalysisConfig::default();

        assert_eq!(config.brightness_sample_frames, 30);
        assert_eq!(config.scene_scan_frames, 60);
        assert_eq!(config.scene_change_threshold, 30.0);
        assert_eq!(config.silence_threshold_db, -40.0);
        assert_eq!(config.min_silence_ms, 500);
        assert_eq!(config.thumbnail_count, DEFAULT_THUMBNAIL_COUNT);
        assert_eq!(
            (config.preview_width, config.preview_height),
            (DEFAULT_PREVIEW_WIDTH, DEFAULT_PREVIEW_HEIGHT)
        );
        assert!(config.face_cascade.is_none());

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"scene_change_threshold": 42.5, "thumbnail_count": 3}"#)
                .unwrap();

        assert_eq!(config.scene_change_threshold, 42.5);
        assert_eq!(config.thumbnail_count, 3);
        assert_eq!(config.silence_threshold_db, DEFAULT_SILENCE_THRESHOLD_DB);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AnalysisConfig::default();
        config.thumbnail_count = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("thumbnail_count"));

        let mut config = AnalysisConfig::default();
        config.preview_quality = 101;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("preview_quality"));

        let mut config = AnalysisConfig::default();
        config.thumbnail_interval_secs = 0.0;
        assert!(config.validate().is_err());

        let mut config = AnalysisConfig::default();
        config.dark_threshold = 200.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("dark_threshold"));

        let mut config = AnalysisConfig::default();
        config.face_scale_factor = 1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reelscope.json");
        std::fs::write(&path, r#"{"preview_width": 640, "preview_height": 360}"#).unwrap();

        let config = AnalysisConfig::from_json_file(&path).unwrap();
        assert_eq!(config.preview_width, 640);
        assert_eq!(config.preview_height, 360);

        let missing = dir.path().join("missing.json");
        assert!(AnalysisConfig::from_json_file(&missing).is_err());
    }
}
