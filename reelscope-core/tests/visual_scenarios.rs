// reelscope-core/tests/visual_scenarios.rs

mod common;

use common::SyntheticVideo;
use image::{Rgb, RgbImage};
use reelscope_core::processing::visual::analyze_visual;
use reelscope_core::{AnalysisConfig, HookQuality};

#[test]
fn test_black_video_visual_metrics() {
    let video = SyntheticVideo::solid(30.0, 300, 64, 48, [0, 0, 0]);
    let metrics = analyze_visual(&video, &AnalysisConfig::default());

    assert!((metrics.duration - 10.0).abs() < 1e-9);
    assert_eq!(metrics.resolution.width, 64);
    assert_eq!(metrics.resolution.height, 48);
    assert!(metrics.brightness.is_dark);
    assert!(!metrics.brightness.is_bright);
    assert_eq!(metrics.brightness.average, 0.0);
    assert_eq!(metrics.blur_score, 0.0);
    assert_eq!(metrics.scene_changes, 0);
    assert_eq!(metrics.first_frame_quality.quality, HookQuality::NeedsImprovement);
}

#[test]
fn test_alternating_frames_count_every_transition() {
    let (w, h) = (32, 32);
    let video = SyntheticVideo::new(30.0, 120, w, h, move |index| {
        let level = if index % 2 == 0 { 10 } else { 240 };
        RgbImage::from_pixel(w, h, Rgb([level, level, level]))
    });

    let metrics = analyze_visual(&video, &AnalysisConfig::default());
    // Only the first 60 frames are scanned.
    assert_eq!(metrics.scene_changes, 59);
}

#[test]
fn test_scene_threshold_is_configurable() {
    let (w, h) = (32, 32);
    let video = SyntheticVideo::new(30.0, 60, w, h, move |index| {
        let level = if index % 2 == 0 { 100 } else { 120 };
        RgbImage::from_pixel(w, h, Rgb([level, level, level]))
    });

    let default = analyze_visual(&video, &AnalysisConfig::default());
    assert_eq!(default.scene_changes, 0);

    let sensitive = AnalysisConfig {
        scene_change_threshold: 10.0,
        ..AnalysisConfig::default()
    };
    assert_eq!(analyze_visual(&video, &sensitive).scene_changes, 59);
}

#[test]
fn test_unknown_frame_rate_gives_zero_duration() {
    let video = SyntheticVideo::solid(0.0, 300, 32, 32, [128, 128, 128]);
    let metrics = analyze_visual(&video, &AnalysisConfig::default());

    assert_eq!(metrics.duration, 0.0);
    assert_eq!(metrics.fps, 0.0);
    assert!(metrics.duration.is_finite());
    assert_eq!(metrics.scene_changes, 0);
}

#[test]
fn test_unknown_length_still_measures_first_frame() {
    let (w, h) = (64, 64);
    let video = SyntheticVideo::new(30.0, 90, w, h, move |_| {
        RgbImage::from_fn(w, h, |x, y| {
            if (x / 2 + y / 2) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([60, 60, 60])
            }
        })
    })
    .with_unknown_length();

    let metrics = analyze_visual(&video, &AnalysisConfig::default());
    assert_eq!(metrics.duration, 0.0);
    assert!(metrics.brightness.average > 0.0);
    assert!(metrics.blur_score > 0.0);
    assert_eq!(metrics.first_frame_quality.quality, HookQuality::Good);
    assert_eq!(metrics.first_frame_quality.sharpness, metrics.blur_score);
    assert_eq!(metrics.scene_changes, 0);
}

#[test]
fn test_unreadable_first_frame_degrades_hook() {
    let video = SyntheticVideo::solid(30.0, 90, 32, 32, [200, 200, 200]).with_unreadable(&[0]);
    let metrics = analyze_visual(&video, &AnalysisConfig::default());

    assert_eq!(metrics.first_frame_quality.quality, HookQuality::Unknown);
    assert_eq!(metrics.blur_score, 0.0);
    assert_eq!(metrics.brightness.average, 0.0);
    assert_eq!(metrics.scene_changes, 0);
}

#[test]
fn test_bright_sharp_opening_is_a_good_hook() {
    let (w, h) = (64, 64);
    let video = SyntheticVideo::new(30.0, 60, w, h, move |_| {
        RgbImage::from_fn(w, h, |x, y| {
            if (x / 2 + y / 2) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([60, 60, 60])
            }
        })
    });

    let metrics = analyze_visual(&video, &AnalysisConfig::default());
    assert_eq!(metrics.first_frame_quality.quality, HookQuality::Good);
    assert!(metrics.first_frame_quality.brightness > 80.0);
    assert!(metrics.blur_score > 100.0);
    assert!(!metrics.brightness.is_dark && !metrics.brightness.is_bright);
}
