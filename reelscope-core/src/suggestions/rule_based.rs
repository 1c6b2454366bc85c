//! Deterministic suggestions derived from pacing, brightness and audio.

use super::{MusicRecommendation, Pacing, SuggestionBundle, SuggestionGenerator, SuggestionInput};
use crate::processing::audio::AudioMetrics;
use crate::processing::visual::HookQuality;

/// Suggestion generator that needs no external service.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedSuggestions;

impl SuggestionGenerator for RuleBasedSuggestions {
    fn generate(&self, input: &SuggestionInput<'_>) -> SuggestionBundle {
        let rate = input.scene_change_rate();
        let pacing = Pacing::from_rate(rate);
        let has_audio = match input.audio {
            AudioMetrics::Measured(report) => report.has_audio && !report.is_silent_or_low,
            AudioMetrics::Unavailable(_) => false,
        };

        log::debug!(
            "Rule-based suggestions: {:?} pacing ({:.2} changes/s), audio {}",
            pacing,
            rate,
            if has_audio { "present" } else { "absent" }
        );

        SuggestionBundle {
            generator: "rule_based".to_string(),
            pacing,
            scene_change_rate: rate,
            brightness: input.visual.brightness.label().to_string(),
            has_audio,
            issues: issues(input),
            music_recommendation: music_for(pacing, input),
            hashtag_suggestions: hashtags_for(pacing, input),
            title_suggestions: titles_for(pacing, input),
        }
    }
}

fn spaced_platform(input: &SuggestionInput<'_>) -> String {
    input.platform.as_str().replace('_', " ")
}

fn music_for(pacing: Pacing, input: &SuggestionInput<'_>) -> MusicRecommendation {
    let platform = input.platform.as_str();
    let spaced = spaced_platform(input);
    let (genre, mood, bpm_range, energy_level, reasoning, keywords) = match pacing {
        Pacing::Fast => (
            "Upbeat Pop",
            "Energetic, Dynamic",
            "120-140 BPM",
            "High",
            format!(
                "Based on your video's fast pacing ({} scene changes in {:.1}s) and {} trends, \
                 energetic music would keep viewers engaged.",
                input.visual.scene_changes, input.visual.duration, platform
            ),
            [
                "royalty free upbeat music".to_string(),
                "no copyright energetic".to_string(),
                format!("{spaced} music"),
            ],
        ),
        Pacing::Medium => (
            "Indie Pop",
            "Uplifting, Positive",
            "100-120 BPM",
            "Medium",
            format!(
                "Your video has a moderate pace that pairs well with uplifting indie music, \
                 perfect for {platform} content."
            ),
            [
                "royalty free indie music".to_string(),
                "no copyright positive".to_string(),
                format!("{spaced} background music"),
            ],
        ),
        Pacing::Slow => (
            "Lo-fi Instrumental",
            "Calm, Professional",
            "~95 BPM",
            "Low",
            format!(
                "Your video's calm pacing creates a professional atmosphere that complements \
                 lo-fi instrumental music, ideal for {platform}."
            ),
            [
                "royalty free lofi".to_string(),
                "no copyright chill music".to_string(),
                format!("{spaced} lofi"),
            ],
        ),
    };

    MusicRecommendation {
        genre: genre.to_string(),
        mood: mood.to_string(),
        bpm_range: bpm_range.to_string(),
        vocals_preference: "Instrumental only".to_string(),
        energy_level: energy_level.to_string(),
        reasoning,
        search_keywords: Vec::from(keywords),
        best_for: input.platform.display_name(),
    }
}

fn hashtags_for(pacing: Pacing, input: &SuggestionInput<'_>) -> Vec<String> {
    let tags: [&str; 4] = match pacing {
        Pacing::Fast => ["#viral", "#trending", "#fyp", "#contentcreator"],
        Pacing::Medium => ["#content", "#creative", "#video", "#explore"],
        Pacing::Slow => ["#chill", "#relaxing", "#aesthetic", "#vibes"],
    };
    std::iter::once(format!("#{}", input.platform.as_str().replace('_', "")))
        .chain(tags.iter().map(|t| (*t).to_string()))
        .collect()
}

fn titles_for(pacing: Pacing, input: &SuggestionInput<'_>) -> Vec<String> {
    let name = input.platform.display_name();
    match pacing {
        Pacing::Fast => vec![
            "🔥 This Will Blow Your Mind!".to_string(),
            "You Won't Believe What Happens Next".to_string(),
            format!("The Ultimate {name} Video"),
        ],
        Pacing::Medium => vec![
            "Check Out This Amazing Content".to_string(),
            "Something Special for You".to_string(),
            format!("Must-Watch {name} Video"),
        ],
        Pacing::Slow => vec![
            "Relax and Enjoy This Moment".to_string(),
            "Peaceful Vibes for Your Feed".to_string(),
            format!("Calm Content for {name}"),
        ],
    }
}

fn issues(input: &SuggestionInput<'_>) -> Vec<String> {
    let visual = input.visual;
    let mut issues = Vec::new();

    let (min_secs, max_secs) = input.platform.optimal_duration_secs();
    if visual.duration > 0.0 && (visual.duration < min_secs || visual.duration > max_secs) {
        issues.push(format!(
            "Duration {:.1}s is outside the optimal {} for {}",
            visual.duration,
            input.platform.rules().optimal_duration,
            input.platform.display_name()
        ));
    }

    if visual.brightness.is_dark {
        issues.push("Video is too dark; add light or raise exposure".to_string());
    } else if visual.brightness.is_bright {
        issues.push("Video is overexposed; lower brightness".to_string());
    }

    match visual.first_frame_quality.quality {
        HookQuality::NeedsImprovement => issues.push(format!(
            "Opening frame is weak; make the first moments brighter and sharper ({})",
            input.platform.rules().hook_time
        )),
        HookQuality::Unknown => issues.push("Opening frame could not be read".to_string()),
        HookQuality::Good => {}
    }

    match input.audio {
        AudioMetrics::Measured(report) => {
            if report.loudness.is_too_quiet {
                issues.push(format!(
                    "Audio is too quiet ({:.1} dB average)",
                    report.loudness.average_db
                ));
            } else if report.loudness.is_too_loud {
                issues.push(format!(
                    "Audio is too loud ({:.1} dB average)",
                    report.loudness.average_db
                ));
            }
            if report.noise_level.has_noise && !report.is_silent_or_low {
                issues.push("Background noise detected".to_string());
            }
            if !report.silence_gaps.is_empty() {
                issues.push(format!(
                    "{} silent gap(s) of 0.5s or more; tighten the edit",
                    report.silence_gaps.len()
                ));
            }
        }
        AudioMetrics::Unavailable(_) => {
            issues.push("No usable audio track; add music or voice-over".to_string());
        }
    }

    issues
}
