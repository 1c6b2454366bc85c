//! Face, composition, color and text-overlay scoring for a single frame.
//!
//! All scores are on a 0-100 scale and capped there. Empty frames and empty
//! regions score zero rather than dividing by zero.

use crate::config::AnalysisConfig;
use crate::processing::face::FaceDetector;
use crate::processing::imaging::{canny, edge_density, hsv_saturation_value_stats, region_edge_density};
use image::{GrayImage, RgbImage};
use serde::Serialize;

/// Faces found in a frame and how much of the frame they cover.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FaceScore {
    pub face_detected: bool,
    pub face_count: usize,
    /// Sum of face areas as a percentage of the frame, capped at 100.
    pub prominence: f64,
}

/// Edge-density proxy for burned-in text or graphics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextOverlay {
    pub has_text: bool,
    pub visibility: f64,
    pub edge_density: f64,
}

/// Scores frames for faces, rule-of-thirds composition, vibrancy and text.
pub struct CompositionScorer<'a> {
    detector: &'a dyn FaceDetector,
    config: &'a AnalysisConfig,
}

impl<'a> CompositionScorer<'a> {
    #[must_use]
    pub fn new(detector: &'a dyn FaceDetector, config: &'a AnalysisConfig) -> Self {
        Self { detector, config }
    }

    pub fn face_score(&self, gray: &GrayImage) -> FaceScore {
        let faces = self.detector.detect(gray);
        let frame_area = f64::from(gray.width()) * f64::from(gray.height());
        let prominence = if faces.is_empty() || frame_area <= 0.0 {
            0.0
        } else {
            let total: f64 = faces
                .iter()
                .map(|face| face.area() as f64 / frame_area * 100.0)
                .sum();
            total.min(100.0)
        };
        FaceScore {
            face_detected: !faces.is_empty(),
            face_count: faces.len(),
            prominence,
        }
    }

    /// Edge density around the four rule-of-thirds intersections.
    pub fn composition_score(&self, gray: &GrayImage) -> f64 {
        let (low, high) = self.config.composition_canny;
        let edges = canny(gray, low, high);
        let (w, h) = (i64::from(gray.width()), i64::from(gray.height()));
        let (third_w, third_h) = (w / 3, h / 3);
        let half = i64::from(self.config.thirds_region_size / 2);

        let intersections = [
            (third_w, third_h),
            (2 * third_w, third_h),
            (third_w, 2 * third_h),
            (2 * third_w, 2 * third_h),
        ];

        let score: f64 = intersections
            .iter()
            .map(|&(x, y)| region_edge_density(&edges, x - half, y - half, x + half, y + half))
            .sum();
        (score * 100.0).min(100.0)
    }

    /// Saturation-weighted vibrancy with a contribution from value spread.
    pub fn color_vibrancy(&self, frame: &RgbImage) -> f64 {
        let (mean_saturation, value_std) = hsv_saturation_value_stats(frame);
        let score = (mean_saturation / 2.55) * 0.7 + (value_std / 1.28) * 0.3;
        score.min(100.0)
    }

    pub fn text_overlay(&self, gray: &GrayImage) -> TextOverlay {
        let (low, high) = self.config.text_canny;
        let density = edge_density(&canny(gray, low, high));
        TextOverlay {
            has_text: density > self.config.text_density_threshold,
            visibility: (density * 500.0).min(100.0),
            edge_density: density,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::face::{FaceBox, NoFaceDetector};
    use image::{Luma, Rgb};

    struct FixedFaces(Vec<FaceBox>);

    impl FaceDetector for FixedFaces {
        fn detect(&self, _gray: &GrayImage) -> Vec<FaceBox> {
            self.0.clone()
        }

        fn name(&self) -> &'static str {
            "fixed"
        }
    }

    #[test]
    fn test_face_prominence() {
        let config = AnalysisConfig::default();
        let detector = FixedFaces(vec![FaceBox {
            x: 0,
            y: 0,
            width: 50,
            height: 40,
        }]);
        let scorer = CompositionScorer::new(&detector, &config);
        let score = scorer.face_score(&GrayImage::new(100, 100));
        assert!(score.face_detected);
        assert_eq!(score.face_count, 1);
        assert!((score.prominence - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_face_prominence_is_capped() {
        let config = AnalysisConfig::default();
        let big = FaceBox {
            x: 0,
            y: 0,
            width: 90,
            height: 90,
        };
        let detector = FixedFaces(vec![big, big]);
        let scorer = CompositionScorer::new(&detector, &config);
        let score = scorer.face_score(&GrayImage::new(100, 100));
        assert_eq!(score.face_count, 2);
        assert_eq!(score.prominence, 100.0);
    }

    #[test]
    fn test_no_detector_means_no_faces() {
        let config = AnalysisConfig::default();
        let scorer = CompositionScorer::new(&NoFaceDetector, &config);
        let score = scorer.face_score(&GrayImage::new(64, 64));
        assert_eq!(
            score,
            FaceScore {
                face_detected: false,
                face_count: 0,
                prominence: 0.0
            }
        );
    }

    #[test]
    fn test_composition_flat_and_busy() {
        let config = AnalysisConfig::default();
        let scorer = CompositionScorer::new(&NoFaceDetector, &config);
        assert_eq!(scorer.composition_score(&GrayImage::from_pixel(300, 300, Luma([40]))), 0.0);

        let stripes = GrayImage::from_fn(300, 300, |x, _| Luma([if (x / 4) % 2 == 0 { 0 } else { 255 }]));
        let score = scorer.composition_score(&stripes);
        assert!(score > 60.0, "score = {score}");
        assert!(score <= 100.0);
    }

    #[test]
    fn test_composition_tiny_frame() {
        let config = AnalysisConfig::default();
        let scorer = CompositionScorer::new(&NoFaceDetector, &config);
        assert_eq!(scorer.composition_score(&GrayImage::new(2, 2)), 0.0);
        assert_eq!(scorer.composition_score(&GrayImage::new(0, 0)), 0.0);
    }

    #[test]
    fn test_color_vibrancy() {
        let config = AnalysisConfig::default();
        let scorer = CompositionScorer::new(&NoFaceDetector, &config);
        assert_eq!(scorer.color_vibrancy(&RgbImage::new(10, 10)), 0.0);

        let red = RgbImage::from_pixel(10, 10, Rgb([255, 0, 0]));
        assert!((scorer.color_vibrancy(&red) - 70.0).abs() < 1e-9);

        let gray = RgbImage::from_pixel(10, 10, Rgb([128, 128, 128]));
        assert_eq!(scorer.color_vibrancy(&gray), 0.0);
    }

    #[test]
    fn test_text_overlay() {
        let config = AnalysisConfig::default();
        let scorer = CompositionScorer::new(&NoFaceDetector, &config);

        let flat = scorer.text_overlay(&GrayImage::from_pixel(100, 100, Luma([10])));
        assert!(!flat.has_text);
        assert_eq!(flat.visibility, 0.0);

        let busy = GrayImage::from_fn(100, 100, |x, _| Luma([if (x / 3) % 2 == 0 { 0 } else { 255 }]));
        let text = scorer.text_overlay(&busy);
        assert!(text.has_text);
        assert_eq!(text.visibility, 100.0);
    }
}
