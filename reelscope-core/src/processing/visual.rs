// ============================================================================
// reelscope-core/src/processing/visual.rs
// ============================================================================
//
// VISUAL METRICS: Clip-Level Quality Signals
//
// Computes duration, resolution, brightness, blur, a scene-change count and
// the first-frame ("hook") quality of a clip. Every sub-metric reads its own
// explicit frame range from the source and degrades on its own: an
// unreadable range turns that one value into its documented zero, never the
// whole record.
//
// The scene-change count is a coarse proxy (mean absolute frame difference
// over the first couple of seconds), not a shot-boundary detector.
//
// KEY COMPONENTS:
// - VisualMetrics and its nested records
// - analyze_visual: runs every sub-metric against a FrameSource

use crate::config::AnalysisConfig;
use crate::processing::imaging::{laplacian_variance, mean_abs_diff, mean_intensity, to_gray};
use crate::processing::sampler::{FrameRange, FrameSource};
use image::GrayImage;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

/// Average luma over the leading frames.
///
/// `is_dark` and `is_bright` use open comparisons, so at most one is set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BrightnessStats {
    pub average: f64,
    pub is_dark: bool,
    pub is_bright: bool,
}

impl BrightnessStats {
    #[must_use]
    pub fn classify(average: f64, config: &AnalysisConfig) -> Self {
        Self {
            average,
            is_dark: average < config.dark_threshold,
            is_bright: average > config.bright_threshold,
        }
    }

    /// Label used by the suggestion generator.
    #[must_use]
    pub fn label(&self) -> &'static str {
        if self.is_bright {
            "Bright"
        } else if self.is_dark {
            "Dark"
        } else {
            "Normal"
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HookQuality {
    Good,
    NeedsImprovement,
    Unknown,
}

impl HookQuality {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            HookQuality::Good => "good",
            HookQuality::NeedsImprovement => "needs_improvement",
            HookQuality::Unknown => "unknown",
        }
    }
}

/// Brightness and sharpness of frame 0. Both are 0 when `quality` is unknown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FirstFrameQuality {
    pub brightness: f64,
    pub sharpness: f64,
    pub quality: HookQuality,
}

impl FirstFrameQuality {
    const UNKNOWN: Self = Self {
        brightness: 0.0,
        sharpness: 0.0,
        quality: HookQuality::Unknown,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualMetrics {
    pub duration: f64,
    pub resolution: Resolution,
    pub fps: f64,
    pub brightness: BrightnessStats,
    /// Laplacian variance of frame 0.
    pub blur_score: f64,
    pub scene_changes: u32,
    pub first_frame_quality: FirstFrameQuality,
}

/// Computes every visual metric for `source`.
pub fn analyze_visual<S: FrameSource + ?Sized>(source: &S, config: &AnalysisConfig) -> VisualMetrics {
    let info = source.info();
    log::debug!(
        "Analyzing visual metrics ({}x{}, {:.3} fps, {} frames)",
        info.width,
        info.height,
        info.fps,
        info.frame_count
    );

    let first_gray = source.sample_at(0).map(|sample| to_gray(&sample.image));
    if first_gray.is_none() {
        log::warn!("First frame unreadable; blur and hook quality default to zero");
    }

    let brightness = BrightnessStats::classify(average_brightness(source, config), config);
    let blur_score = first_gray.as_ref().map_or(0.0, laplacian_variance);
    let scene_changes = count_scene_changes(source, config);
    let first_frame_quality = first_gray
        .as_ref()
        .map_or(FirstFrameQuality::UNKNOWN, |gray| first_frame_quality(gray, config));

    let metrics = VisualMetrics {
        duration: info.duration(),
        resolution: Resolution {
            width: info.width,
            height: info.height,
        },
        fps: info.fps,
        brightness,
        blur_score,
        scene_changes,
        first_frame_quality,
    };

    log::info!(
        "Visual metrics: brightness {:.1}, blur {:.1}, {} scene changes, hook {}",
        metrics.brightness.average,
        metrics.blur_score,
        metrics.scene_changes,
        metrics.first_frame_quality.quality.as_str()
    );
    metrics
}

fn average_brightness<S: FrameSource + ?Sized>(source: &S, config: &AnalysisConfig) -> f64 {
    let range = FrameRange::first(config.brightness_sample_frames as u64);
    let frames = match source.frames(range) {
        Ok(frames) => frames,
        Err(e) => {
            log::warn!("Brightness sampling failed: {}", e);
            return 0.0;
        }
    };

    let (sum, count) = frames
        .map(|sample| mean_intensity(&to_gray(&sample.image)))
        .fold((0.0, 0usize), |(sum, count), b| (sum + b, count + 1));

    if count == 0 { 0.0 } else { sum / count as f64 }
}

fn count_scene_changes<S: FrameSource + ?Sized>(source: &S, config: &AnalysisConfig) -> u32 {
    let range = FrameRange::first(config.scene_scan_frames as u64);
    let frames = match source.frames(range) {
        Ok(frames) => frames,
        Err(e) => {
            log::warn!("Scene change scan failed: {}", e);
            return 0;
        }
    };

    let mut changes = 0;
    let mut previous: Option<GrayImage> = None;
    for sample in frames {
        let gray = to_gray(&sample.image);
        if let Some(prev) = &previous {
            if mean_abs_diff(prev, &gray) > config.scene_change_threshold {
                changes += 1;
            }
        }
        previous = Some(gray);
    }
    changes
}

fn first_frame_quality(gray: &GrayImage, config: &AnalysisConfig) -> FirstFrameQuality {
    let brightness = mean_intensity(gray);
    let sharpness = laplacian_variance(gray);
    let quality = if brightness > config.hook_min_brightness && sharpness > config.hook_min_sharpness {
        HookQuality::Good
    } else {
        HookQuality::NeedsImprovement
    };
    FirstFrameQuality {
        brightness,
        sharpness,
        quality,
    }
}
