//! Persistent log output for analysis runs.
//!
//! `setup` installs the log4rs file appender; `log_report_summary` writes a
//! compact, grep-friendly digest of a finished report to whatever logger is
//! active.

pub mod setup;

pub use setup::{file_logging_config, setup_file_logging};

use crate::pipeline::OptimizationReport;
use crate::processing::audio::AudioMetrics;
use log::{info, warn};

/// Logs the headline numbers of a finished report.
pub fn log_report_summary(report: &OptimizationReport) {
    let visual = &report.visual;
    info!("Report for platform {}:", report.platform);
    info!(
        "  Video: {}x{} @ {:.2} fps, {:.1}s",
        visual.resolution.width, visual.resolution.height, visual.fps, visual.duration
    );
    info!(
        "  Brightness: {:.1} ({}), blur score {:.1}, {} scene changes",
        visual.brightness.average,
        visual.brightness.label(),
        visual.blur_score,
        visual.scene_changes
    );
    info!(
        "  Hook: {} (brightness {:.1}, sharpness {:.1})",
        visual.first_frame_quality.quality.as_str(),
        visual.first_frame_quality.brightness,
        visual.first_frame_quality.sharpness
    );

    match &report.audio {
        AudioMetrics::Measured(audio) => info!(
            "  Audio: {:.1} dB, {} silence gaps, flatness {:.3}",
            audio.loudness.average_db,
            audio.silence_gaps.len(),
            audio.noise_level.spectral_flatness
        ),
        AudioMetrics::Unavailable(unavailable) => {
            warn!("  Audio: unavailable ({})", unavailable.error)
        }
    }

    if let Some(best) = report.thumbnails.first() {
        info!(
            "  Thumbnails: {} suggested, best at {:.1}s (score {:.1})",
            report.thumbnails.len(),
            best.timestamp,
            best.score
        );
    } else {
        warn!("  Thumbnails: none could be extracted");
    }

    info!(
        "  Suggestions ({}): {:?} pacing, {} issues",
        report.suggestions.generator,
        report.suggestions.pacing,
        report.suggestions.issues.len()
    );
}
