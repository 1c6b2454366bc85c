//! Target publishing platforms and their fixed scoring parameters.
//!
//! Each platform carries the thumbnail weight vector used by the ranker and a
//! small table of publishing rules that is attached to every report.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Short-form platform a reel is being optimized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Instagram,
    YoutubeShorts,
    #[default]
    Other,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Instagram, Platform::YoutubeShorts, Platform::Other];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::YoutubeShorts => "youtube_shorts",
            Platform::Other => "other",
        }
    }

    /// Human-readable name, e.g. "Youtube Shorts".
    #[must_use]
    pub fn display_name(self) -> String {
        self.as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Parses a platform name, mapping anything unrecognized to `Other`.
    #[must_use]
    pub fn parse_lossy(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            log::debug!("Unrecognized platform '{}', using 'other'", value);
            Platform::Other
        })
    }

    /// Thumbnail scoring weights for this platform.
    #[must_use]
    pub const fn weights(self) -> ScoreWeights {
        match self {
            Platform::Instagram => ScoreWeights {
                sharpness: 0.20,
                brightness: 0.15,
                contrast: 0.10,
                face_prominence: 0.25,
                composition: 0.15,
                color_vibrancy: 0.15,
            },
            Platform::YoutubeShorts => ScoreWeights {
                sharpness: 0.25,
                brightness: 0.15,
                contrast: 0.15,
                face_prominence: 0.10,
                composition: 0.20,
                color_vibrancy: 0.15,
            },
            Platform::Other => ScoreWeights {
                sharpness: 0.20,
                brightness: 0.15,
                contrast: 0.15,
                face_prominence: 0.15,
                composition: 0.20,
                color_vibrancy: 0.15,
            },
        }
    }

    /// Recommended clip length in seconds, inclusive.
    #[must_use]
    pub const fn optimal_duration_secs(self) -> (f64, f64) {
        match self {
            Platform::Instagram => (15.0, 30.0),
            Platform::YoutubeShorts => (30.0, 60.0),
            Platform::Other => (15.0, 60.0),
        }
    }

    /// Publishing guidance for this platform.
    #[must_use]
    pub const fn rules(self) -> PlatformRules {
        match self {
            Platform::Instagram => PlatformRules {
                optimal_duration: "15-30s",
                aspect_ratio: "9:16 (vertical)",
                hook_time: "First 3 seconds critical",
                cta_placement: "Last 5 seconds",
            },
            Platform::YoutubeShorts => PlatformRules {
                optimal_duration: "30-60s",
                aspect_ratio: "9:16 (vertical)",
                hook_time: "First 5 seconds",
                cta_placement: "Throughout + end",
            },
            Platform::Other => PlatformRules {
                optimal_duration: "15-60s",
                aspect_ratio: "Flexible",
                hook_time: "First 3-5 seconds",
                cta_placement: "End",
            },
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "instagram" => Ok(Platform::Instagram),
            "youtube_shorts" => Ok(Platform::YoutubeShorts),
            "other" => Ok(Platform::Other),
            _ => Err(format!(
                "Invalid platform: {s}. Valid platforms are: instagram, youtube_shorts, other"
            )),
        }
    }
}

/// Weights applied to the six thumbnail quality scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreWeights {
    pub sharpness: f64,
    pub brightness: f64,
    pub contrast: f64,
    pub face_prominence: f64,
    pub composition: f64,
    pub color_vibrancy: f64,
}

impl ScoreWeights {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.sharpness
            + self.brightness
            + self.contrast
            + self.face_prominence
            + self.composition
            + self.color_vibrancy
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlatformRules {
    pub optimal_duration: &'static str,
    pub aspect_ratio: &'static str,
    pub hook_time: &'static str,
    pub cta_placement: &'static str,
}
