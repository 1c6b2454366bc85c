//! Terminal rendering of analysis results.
//!
//! Text output goes to stdout with `console` styling; the spinner and error
//! messages go to stderr so they never mix with `--json` output.

use crate::error::CliResult;
use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use reelscope_core::suggestions::SuggestionBundle;
use reelscope_core::{
    AudioMetrics, HookQuality, OptimizationReport, PlatformRules, ThumbnailSuggestion,
    VisualMetrics, format_timestamp,
};
use serde::Serialize;
use std::io::IsTerminal;
use std::time::Duration;

const LABEL_WIDTH: usize = 18;

/// Print a section header
pub fn print_section(title: &str) {
    println!();
    println!("{}", style(format!("===== {} =====", title.to_uppercase())).cyan().bold());
}

/// Print an aligned label/value line
pub fn print_status(label: &str, value: impl std::fmt::Display) {
    println!("  {:<width$} {}", format!("{label}:"), value, width = LABEL_WIDTH);
}

pub fn print_success(message: &str) {
    println!("  {} {}", style("✓").green().bold(), message);
}

pub fn print_warning(message: &str) {
    println!("  {} {}", style("⚠").yellow().bold(), style(message).yellow());
}

/// Print an error block to stderr
pub fn print_error(title: &str, message: &str) {
    eprintln!(
        "\n  {} {}",
        style("✗").bold().red(),
        style(title).bold().red()
    );
    eprintln!("  {:<width$} {}", "Message:", message, width = LABEL_WIDTH);
}

/// Serializes `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Starts a stderr spinner. Hidden when stderr is not a terminal or when
/// `visible` is false.
pub fn start_spinner(message: &str, visible: bool) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner()
        .template("  {spinner} {msg} ({elapsed})")
        .map(|s| s.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "))
    {
        pb.set_style(spinner_style);
    }
    if !visible || !std::io::stderr().is_terminal() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

pub fn print_visual(visual: &VisualMetrics) {
    print_section("Visual");
    print_status(
        "Resolution",
        format!("{}x{}", visual.resolution.width, visual.resolution.height),
    );
    print_status("Duration", format!("{:.1}s @ {:.2} fps", visual.duration, visual.fps));
    print_status(
        "Brightness",
        format!("{:.1} ({})", visual.brightness.average, visual.brightness.label()),
    );
    print_status("Blur score", format!("{:.1}", visual.blur_score));
    print_status("Scene changes", visual.scene_changes);

    let hook = &visual.first_frame_quality;
    let hook_label = match hook.quality {
        HookQuality::Good => style(hook.quality.as_str()).green(),
        HookQuality::NeedsImprovement => style(hook.quality.as_str()).yellow(),
        HookQuality::Unknown => style(hook.quality.as_str()).dim(),
    };
    print_status(
        "Opening frame",
        format!(
            "{} (brightness {:.1}, sharpness {:.1})",
            hook_label, hook.brightness, hook.sharpness
        ),
    );
}

pub fn print_audio(audio: &AudioMetrics) {
    print_section("Audio");
    match audio {
        AudioMetrics::Measured(report) => {
            print_status(
                "Track",
                format!("{:.1}s @ {} Hz", report.duration, report.sample_rate),
            );
            let loudness = if report.loudness.is_too_quiet {
                style("too quiet").yellow()
            } else if report.loudness.is_too_loud {
                style("too loud").yellow()
            } else {
                style("ok").green()
            };
            print_status(
                "Loudness",
                format!("{:.1} dB ({})", report.loudness.average_db, loudness),
            );
            print_status(
                "Noise",
                format!(
                    "flatness {:.3} (noisy: {})",
                    report.noise_level.spectral_flatness,
                    yes_no(report.noise_level.has_noise)
                ),
            );
            if report.silence_gaps.is_empty() {
                print_status("Silence gaps", "none");
            } else {
                let gaps: Vec<String> = report
                    .silence_gaps
                    .iter()
                    .map(|gap| format!("{:.1}-{:.1}s", gap.start, gap.end))
                    .collect();
                print_status("Silence gaps", gaps.join(", "));
            }
            if report.is_silent_or_low {
                print_warning("Audio is silent or very low");
            }
        }
        AudioMetrics::Unavailable(unavailable) => {
            print_warning(&format!("No usable audio: {}", unavailable.error));
        }
    }
}

pub fn print_thumbnails(thumbnails: &[ThumbnailSuggestion]) {
    print_section("Thumbnails");
    if thumbnails.is_empty() {
        print_warning("No frames could be sampled for thumbnails");
        return;
    }
    for (rank, thumbnail) in thumbnails.iter().enumerate() {
        let marker = if thumbnail.is_recommended {
            style("★").yellow().bold()
        } else {
            style(" ").dim()
        };
        println!(
            "  {} #{} at {:>7}  score {:>5.1}  {}",
            marker,
            rank + 1,
            format_timestamp(thumbnail.timestamp),
            thumbnail.score,
            style(&thumbnail.reasoning).dim()
        );
    }
}

pub fn print_platform_rules(rules: &PlatformRules) {
    print_status("Optimal duration", rules.optimal_duration);
    print_status("Aspect ratio", rules.aspect_ratio);
    print_status("Hook", rules.hook_time);
    print_status("Call to action", rules.cta_placement);
}

pub fn print_suggestions(suggestions: &SuggestionBundle) {
    print_section("Suggestions");
    print_status(
        "Pacing",
        format!(
            "{:?} ({:.2} scene changes/s)",
            suggestions.pacing, suggestions.scene_change_rate
        ),
    );

    if suggestions.issues.is_empty() {
        print_success("No issues found");
    } else {
        for issue in &suggestions.issues {
            print_warning(issue);
        }
    }

    let music = &suggestions.music_recommendation;
    print_status(
        "Music",
        format!("{} ({}, {})", music.genre, music.mood, music.bpm_range),
    );
    print_status("Search for", music.search_keywords.join(", "));
    print_status("Hashtags", suggestions.hashtag_suggestions.join(" "));
    for (i, title) in suggestions.title_suggestions.iter().enumerate() {
        print_status(if i == 0 { "Titles" } else { "" }, title);
    }
}

pub fn print_report(report: &OptimizationReport) {
    print_section(&format!("Platform: {}", report.platform.display_name()));
    print_platform_rules(&report.platform_rules);
    print_visual(&report.visual);
    print_audio(&report.audio);

    print_section("Transcript");
    match &report.transcript.error {
        Some(error) => print_warning(&format!("Unavailable: {error}")),
        None => {
            print_status("Words", report.transcript.word_count());
            if let Some(language) = &report.transcript.language {
                print_status("Language", language);
            }
        }
    }

    print_thumbnails(&report.thumbnails);
    print_suggestions(&report.suggestions);
}
