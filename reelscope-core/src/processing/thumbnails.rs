// ============================================================================
// reelscope-core/src/processing/thumbnails.rs
// ============================================================================
//
// THUMBNAIL RANKER: Sampling -> Scoring -> Ranking -> Rendering
//
// 1. Sampling: one frame every `thumbnail_interval_secs` across the clip.
//    Unreadable frames are skipped and never abort the ranking.
// 2. Scoring: each candidate gets six 0-100 scores (sharpness, brightness,
//    contrast, face prominence, composition, color vibrancy) combined with
//    the platform's fixed weights. Frames are scored in parallel as they are
//    decoded and their pixels are dropped right after; the result keeps
//    sampling order.
// 3. Ranking: stable sort by combined score, descending, then truncation to
//    the requested count. Equal scores keep sampling order, so the earlier
//    frame wins a tie.
// 4. Rendering: each survivor is decoded again and becomes a suggestion with a
//    JPEG preview data URI and a short templated explanation. Only the first
//    is recommended.
//
// KEY COMPONENTS:
// - QualityMetrics / ThumbnailCandidate / ThumbnailSuggestion
// - score_frame / score_candidates / combined_score: streaming scoring
// - rank_candidates: ordering and recommendation
// - render_suggestion / reasoning: output assembly
// - suggest_thumbnails_from: the whole pipeline over a FrameSource

use crate::config::AnalysisConfig;
use crate::error::{CoreError, CoreResult};
use crate::platform::{Platform, ScoreWeights};
use crate::processing::composition::{CompositionScorer, TextOverlay};
use crate::processing::face::FaceDetector;
use crate::processing::imaging::{laplacian_variance, mean_intensity, std_intensity, to_gray};
use crate::processing::sampler::{FrameSample, FrameSource, IntervalSamples};
use crate::utils::round_to;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::RgbImage;
use rayon::prelude::*;
use serde::Serialize;

const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// Per-frame scores shown alongside every suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityMetrics {
    pub sharpness: f64,
    pub brightness: f64,
    pub contrast: f64,
    pub face_detected: bool,
    pub face_count: usize,
    pub composition_score: f64,
    pub color_vibrancy: f64,
}

/// A scored frame that may become a suggestion. Only the frame index is kept;
/// the pixels are decoded again for the previews of the shortlist.
#[derive(Debug, Clone)]
pub struct ThumbnailCandidate {
    pub index: u64,
    pub timestamp: f64,
    pub quality_metrics: QualityMetrics,
    pub face_prominence: f64,
    /// Computed for every candidate but not part of the weighted score.
    pub text_overlay: TextOverlay,
    pub combined_score: f64,
    pub is_recommended: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThumbnailSuggestion {
    pub timestamp: f64,
    /// Combined score rounded to one decimal.
    pub score: f64,
    /// `data:image/jpeg;base64,...`, empty if the preview could not be encoded.
    pub preview_image: String,
    pub reasoning: String,
    pub is_recommended: bool,
    pub quality_metrics: QualityMetrics,
}

impl ThumbnailSuggestion {
    /// Decodes the preview data URI back to JPEG bytes.
    pub fn preview_jpeg(&self) -> CoreResult<Vec<u8>> {
        let encoded = self.preview_image.strip_prefix(DATA_URI_PREFIX).ok_or_else(|| {
            CoreError::OperationFailed("preview is not a JPEG data URI".to_string())
        })?;
        STANDARD
            .decode(encoded)
            .map_err(|e| CoreError::OperationFailed(format!("invalid preview encoding: {e}")))
    }
}

/// Sharpness, brightness and contrast scores of a grayscale frame.
///
/// Brightness peaks at mid-gray (127) and is floored at 0.
#[must_use]
pub fn frame_quality(gray: &image::GrayImage) -> (f64, f64, f64) {
    let sharpness = (laplacian_variance(gray) / 10.0).min(100.0);
    let brightness = (100.0 - (mean_intensity(gray) - 127.0).abs() / 1.27).max(0.0);
    let contrast = (std_intensity(gray) / 0.8).min(100.0);
    (sharpness, brightness, contrast)
}

/// Weighted sum of the six candidate scores.
#[must_use]
pub fn combined_score(metrics: &QualityMetrics, face_prominence: f64, weights: &ScoreWeights) -> f64 {
    metrics.sharpness * weights.sharpness
        + metrics.brightness * weights.brightness
        + metrics.contrast * weights.contrast
        + face_prominence * weights.face_prominence
        + metrics.composition_score * weights.composition
        + metrics.color_vibrancy * weights.color_vibrancy
}

/// Scores one frame and drops its pixel buffer. Deterministic for a given
/// frame, scorer and weights.
#[must_use]
pub fn score_frame(
    sample: FrameSample,
    scorer: &CompositionScorer<'_>,
    weights: &ScoreWeights,
) -> ThumbnailCandidate {
    let gray = to_gray(&sample.image);
    let (sharpness, brightness, contrast) = frame_quality(&gray);
    let faces = scorer.face_score(&gray);

    let quality_metrics = QualityMetrics {
        sharpness,
        brightness,
        contrast,
        face_detected: faces.face_detected,
        face_count: faces.face_count,
        composition_score: scorer.composition_score(&gray),
        color_vibrancy: scorer.color_vibrancy(&sample.image),
    };
    let combined_score = combined_score(&quality_metrics, faces.prominence, weights);

    ThumbnailCandidate {
        index: sample.index,
        timestamp: sample.timestamp,
        quality_metrics,
        face_prominence: faces.prominence,
        text_overlay: scorer.text_overlay(&gray),
        combined_score,
        is_recommended: false,
    }
}

/// Orders candidates best-first, keeps `count`, and recommends the first.
#[must_use]
pub fn rank_candidates(mut candidates: Vec<ThumbnailCandidate>, count: usize) -> Vec<ThumbnailCandidate> {
    // sort_by is stable: equal scores stay in sampling order.
    candidates.sort_by(|a, b| b.combined_score.total_cmp(&a.combined_score));
    candidates.truncate(count);
    for (i, candidate) in candidates.iter_mut().enumerate() {
        candidate.is_recommended = i == 0;
    }
    candidates
}

/// Short explanation of why a candidate was picked.
#[must_use]
pub fn reasoning(candidate: &ThumbnailCandidate, is_best: bool) -> String {
    let metrics = &candidate.quality_metrics;
    let mut reasons: Vec<String> = Vec::new();

    if metrics.sharpness > 70.0 {
        reasons.push("sharp and clear image".to_string());
    } else if metrics.sharpness < 40.0 {
        reasons.push("image could be sharper".to_string());
    }

    if metrics.brightness > 60.0 && metrics.brightness < 90.0 {
        reasons.push("well-lit".to_string());
    } else if metrics.brightness < 50.0 {
        reasons.push("slightly dark".to_string());
    } else if metrics.brightness > 90.0 {
        reasons.push("very bright".to_string());
    }

    if metrics.face_detected {
        if metrics.face_count == 1 {
            reasons.push("prominent face in frame".to_string());
        } else {
            reasons.push(format!("{} faces visible", metrics.face_count));
        }
    }

    if metrics.composition_score > 60.0 {
        reasons.push("good composition".to_string());
    }

    if metrics.color_vibrancy > 70.0 {
        reasons.push("vibrant colors".to_string());
    }

    reasons.truncate(3);
    let summary = if reasons.is_empty() {
        "balanced overall quality".to_string()
    } else {
        reasons.join(", ")
    };
    let lead = if is_best { "Best thumbnail" } else { "Good option" };
    format!(
        "{lead} at {:.1}s: {summary}. This frame would make an eye-catching thumbnail.",
        candidate.timestamp
    )
}

/// Encodes a downscaled JPEG preview as a data URI.
pub fn render_preview(frame: &RgbImage, config: &AnalysisConfig) -> CoreResult<String> {
    let preview = imageops::resize(
        frame,
        config.preview_width,
        config.preview_height,
        FilterType::Triangle,
    );
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, config.preview_quality).encode_image(&preview)?;
    Ok(format!("{DATA_URI_PREFIX}{}", STANDARD.encode(&jpeg)))
}

/// Turns a ranked candidate into its output record.
///
/// `frame` is the candidate's decoded frame; without one the preview is empty.
#[must_use]
pub fn render_suggestion(
    candidate: &ThumbnailCandidate,
    frame: Option<&RgbImage>,
    config: &AnalysisConfig,
) -> ThumbnailSuggestion {
    let preview_image = match frame {
        Some(frame) => render_preview(frame, config).unwrap_or_else(|e| {
            log::warn!("Preview for {:.1}s could not be encoded: {}", candidate.timestamp, e);
            String::new()
        }),
        None => {
            log::warn!("Frame {} could not be decoded again for its preview", candidate.index);
            String::new()
        }
    };
    ThumbnailSuggestion {
        timestamp: candidate.timestamp,
        score: round_to(candidate.combined_score, 1),
        preview_image,
        reasoning: reasoning(candidate, candidate.is_recommended),
        is_recommended: candidate.is_recommended,
        quality_metrics: candidate.quality_metrics,
    }
}

/// Scores every interval sample as it is decoded.
///
/// At most one frame per worker thread is held in memory. The result is in
/// sampling order.
pub fn score_candidates<S: FrameSource + Sync + ?Sized>(
    source: &S,
    scorer: &CompositionScorer<'_>,
    weights: &ScoreWeights,
    interval_secs: f64,
) -> Vec<ThumbnailCandidate> {
    let mut candidates: Vec<ThumbnailCandidate> = IntervalSamples::new(source, interval_secs)
        .par_bridge()
        .map(|sample| score_frame(sample, scorer, weights))
        .collect();
    candidates.sort_by_key(|candidate| candidate.index);
    candidates
}

/// Samples, scores, ranks and renders thumbnail suggestions for `source`.
pub fn suggest_thumbnails_from<S: FrameSource + Sync + ?Sized>(
    source: &S,
    platform: Platform,
    count: usize,
    detector: &dyn FaceDetector,
    config: &AnalysisConfig,
) -> Vec<ThumbnailSuggestion> {
    if count == 0 {
        return Vec::new();
    }

    let scorer = CompositionScorer::new(detector, config);
    let weights = platform.weights();
    let candidates = score_candidates(source, &scorer, &weights, config.thumbnail_interval_secs);
    log::debug!("Scored {} thumbnail candidate frames", candidates.len());
    if candidates.is_empty() {
        return Vec::new();
    }

    let ranked = rank_candidates(candidates, count);
    let suggestions: Vec<ThumbnailSuggestion> = ranked
        .par_iter()
        .map(|candidate| {
            let frame = source.sample_at(candidate.index);
            render_suggestion(candidate, frame.as_ref().map(|sample| &sample.image), config)
        })
        .collect();

    log::info!(
        "Generated {} thumbnail suggestions for {} (face detector: {})",
        suggestions.len(),
        platform,
        detector.name()
    );
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::face::NoFaceDetector;
    use image::{Luma, Rgb};

    fn candidate(timestamp: f64, score: f64) -> ThumbnailCandidate {
        ThumbnailCandidate {
            index: (timestamp * 30.0) as u64,
            timestamp,
            quality_metrics: QualityMetrics {
                sharpness: 50.0,
                brightness: 55.0,
                contrast: 50.0,
                face_detected: false,
                face_count: 0,
                composition_score: 30.0,
                color_vibrancy: 30.0,
            },
            face_prominence: 0.0,
            text_overlay: TextOverlay {
                has_text: false,
                visibility: 0.0,
                edge_density: 0.0,
            },
            combined_score: score,
            is_recommended: false,
        }
    }

    #[test]
    fn test_frame_quality_black_and_gray() {
        let black = image::GrayImage::new(32, 32);
        let (sharp, bright, contrast) = frame_quality(&black);
        assert_eq!(sharp, 0.0);
        assert_eq!(bright, 0.0);
        assert_eq!(contrast, 0.0);

        let mid = image::GrayImage::from_pixel(32, 32, Luma([127]));
        assert_eq!(frame_quality(&mid).1, 100.0);

        let white = image::GrayImage::from_pixel(32, 32, Luma([255]));
        assert_eq!(frame_quality(&white).1, 0.0);
    }

    #[test]
    fn test_rank_is_stable_and_recommends_one() {
        let candidates = vec![
            candidate(0.0, 40.0),
            candidate(2.0, 70.0),
            candidate(4.0, 40.0),
            candidate(6.0, 70.0),
            candidate(8.0, 10.0),
        ];
        let ranked = rank_candidates(candidates, 3);
        let order: Vec<f64> = ranked.iter().map(|c| c.timestamp).collect();
        assert_eq!(order, vec![2.0, 6.0, 0.0]);
        assert_eq!(ranked.iter().filter(|c| c.is_recommended).count(), 1);
        assert!(ranked[0].is_recommended);
    }

    #[test]
    fn test_rank_respects_count_and_candidates() {
        let ranked = rank_candidates(vec![candidate(0.0, 1.0), candidate(2.0, 2.0)], 5);
        assert_eq!(ranked.len(), 2);
        assert!(rank_candidates(Vec::new(), 5).is_empty());
        assert!(rank_candidates(vec![candidate(0.0, 1.0)], 0).is_empty());
    }

    #[test]
    fn test_reasoning_templates() {
        let mut best = candidate(12.34, 80.0);
        best.quality_metrics.sharpness = 85.0;
        best.quality_metrics.brightness = 75.0;
        best.quality_metrics.face_detected = true;
        best.quality_metrics.face_count = 1;
        best.quality_metrics.composition_score = 65.0;
        assert_eq!(
            reasoning(&best, true),
            "Best thumbnail at 12.3s: sharp and clear image, well-lit, prominent face in frame. \
             This frame would make an eye-catching thumbnail."
        );

        let mut other = candidate(4.0, 20.0);
        other.quality_metrics.sharpness = 20.0;
        other.quality_metrics.brightness = 95.0;
        other.quality_metrics.face_detected = true;
        other.quality_metrics.face_count = 3;
        assert_eq!(
            reasoning(&other, false),
            "Good option at 4.0s: image could be sharper, very bright, 3 faces visible. \
             This frame would make an eye-catching thumbnail."
        );

        // 50 sharpness and 55 brightness match no clause.
        assert_eq!(
            reasoning(&candidate(2.0, 50.0), false),
            "Good option at 2.0s: balanced overall quality. \
             This frame would make an eye-catching thumbnail."
        );
    }

    #[test]
    fn test_render_preview_data_uri() {
        let config = AnalysisConfig::default();
        let frame = RgbImage::from_pixel(1080, 1920, Rgb([200, 40, 40]));
        let uri = render_preview(&frame, &config).unwrap();
        assert!(uri.starts_with("data:image/jpeg;base64,"));

        let suggestion = ThumbnailSuggestion {
            timestamp: 0.0,
            score: 0.0,
            preview_image: uri,
            reasoning: String::new(),
            is_recommended: true,
            quality_metrics: candidate(0.0, 0.0).quality_metrics,
        };
        let jpeg = suggestion.preview_jpeg().unwrap();
        let decoded = image::load_from_memory_with_format(&jpeg, image::ImageFormat::Jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (320, 180));
    }

    #[test]
    fn test_preview_jpeg_rejects_other_uris() {
        let frame = RgbImage::new(4, 4);
        let mut suggestion =
            render_suggestion(&candidate(0.0, 1.0), Some(&frame), &AnalysisConfig::default());
        assert!(suggestion.preview_jpeg().is_ok());
        suggestion.preview_image = "data:image/png;base64,AAAA".to_string();
        assert!(suggestion.preview_jpeg().is_err());
    }

    #[test]
    fn test_missing_frame_renders_empty_preview() {
        let suggestion = render_suggestion(&candidate(2.0, 1.0), None, &AnalysisConfig::default());
        assert!(suggestion.preview_image.is_empty());
        assert_eq!(suggestion.timestamp, 2.0);
        assert!(suggestion.preview_jpeg().is_err());
    }

    #[test]
    fn test_score_frame_is_deterministic() {
        let config = AnalysisConfig::default();
        let scorer = CompositionScorer::new(&NoFaceDetector, &config);
        let weights = Platform::Instagram.weights();
        let image = RgbImage::from_fn(96, 64, |x, y| Rgb([(x * 2) as u8, (y * 3) as u8, ((x + y) % 256) as u8]));
        let sample = FrameSample {
            index: 0,
            timestamp: 0.0,
            image,
        };

        let a = score_frame(sample.clone(), &scorer, &weights);
        let b = score_frame(sample, &scorer, &weights);
        assert_eq!(a.combined_score, b.combined_score);
        assert_eq!(a.quality_metrics, b.quality_metrics);
    }

    #[test]
    fn test_combined_score_uses_weights() {
        let metrics = QualityMetrics {
            sharpness: 100.0,
            brightness: 100.0,
            contrast: 100.0,
            face_detected: true,
            face_count: 1,
            composition_score: 100.0,
            color_vibrancy: 100.0,
        };
        for platform in Platform::ALL {
            let score = combined_score(&metrics, 100.0, &platform.weights());
            assert!((score - 100.0).abs() < 1e-9);
        }
        let no_face = combined_score(&metrics, 0.0, &Platform::Instagram.weights());
        assert!((no_face - 75.0).abs() < 1e-9);
    }
}
