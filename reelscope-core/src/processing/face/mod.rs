// ============================================================================
// reelscope-core/src/processing/face/mod.rs
// ============================================================================
//
// FACE DETECTION: Detector Capability and Its Bindings
//
// Scoring code only ever sees `dyn FaceDetector`. A cascade model is either
// an OpenCV cascade XML file (e.g. haarcascade_frontalface_default.xml) or its
// JSON form. When no model is configured, or the configured one cannot be
// loaded, the no-op detector is bound instead and every frame reports zero
// faces.
//
// KEY COMPONENTS:
// - FaceBox: detected face rectangle in frame pixels
// - FaceDetector: detection capability
// - NoFaceDetector: always-empty binding
// - load_face_detector: picks the binding from configuration
// - opencv_xml: reader for OpenCV cascade XML

pub mod cascade;
pub mod opencv_xml;

use crate::config::AnalysisConfig;
use image::GrayImage;
use serde::Serialize;

pub use cascade::{CascadeParams, HaarCascade, HaarCascadeDetector};

/// An axis-aligned face rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FaceBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FaceBox {
    #[must_use]
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

/// Something that can find faces in a grayscale frame.
pub trait FaceDetector: Send + Sync {
    fn detect(&self, gray: &GrayImage) -> Vec<FaceBox>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Detector bound when face detection is unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFaceDetector;

impl FaceDetector for NoFaceDetector {
    fn detect(&self, _gray: &GrayImage) -> Vec<FaceBox> {
        Vec::new()
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Builds the configured face detector, falling back to [`NoFaceDetector`].
#[must_use]
pub fn load_face_detector(config: &AnalysisConfig) -> Box<dyn FaceDetector> {
    let Some(path) = config.face_cascade.as_deref() else {
        log::debug!("No face cascade configured; face detection disabled");
        return Box::new(NoFaceDetector);
    };

    match HaarCascade::from_file(path) {
        Ok(cascade) => {
            log::debug!(
                "Loaded face cascade {} ({} stages, {}x{} window)",
                path.display(),
                cascade.stages.len(),
                cascade.window_width,
                cascade.window_height
            );
            Box::new(HaarCascadeDetector::new(cascade, CascadeParams::from_config(config)))
        }
        Err(e) => {
            log::warn!(
                "Face detection disabled: could not load cascade {}: {}",
                path.display(),
                e
            );
            Box::new(NoFaceDetector)
        }
    }
}
