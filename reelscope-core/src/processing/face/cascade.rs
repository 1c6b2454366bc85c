//! Haar-feature cascade face detector.
//!
//! The model is a boosted cascade: a fixed detection window, and stages of
//! decision stumps over weighted rectangle sums. It is loaded from OpenCV's
//! cascade XML (see [`super::opencv_xml`]) or from the equivalent JSON form
//! of [`HaarCascade`]. A window is a face only if it passes every stage.
//! Detection runs over an image pyramid and overlapping raw hits are merged,
//! keeping only clusters with enough neighbors.

use super::opencv_xml::parse_opencv_cascade;
use super::{FaceBox, FaceDetector};
use crate::config::AnalysisConfig;
use crate::error::{CoreError, CoreResult};
use crate::processing::imaging::IntegralImage;
use image::GrayImage;
use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Overlap tolerance used when merging raw detections.
const GROUPING_EPS: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub weight: f64,
}

/// Decision stump over one Haar feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeakClassifier {
    pub rects: Vec<WeightedRect>,
    pub threshold: f64,
    /// Vote when the normalized feature is below the threshold.
    pub left: f64,
    /// Vote otherwise.
    pub right: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub threshold: f64,
    pub classifiers: Vec<WeakClassifier>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HaarCascade {
    pub window_width: u32,
    pub window_height: u32,
    pub stages: Vec<Stage>,
}

impl HaarCascade {
    /// Loads a model file. XML documents are read as OpenCV cascades,
    /// anything else as JSON.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        if raw.trim_start().starts_with('<') {
            parse_opencv_cascade(&raw)
        } else {
            Self::from_json_str(&raw)
        }
    }

    pub fn from_json_str(raw: &str) -> CoreResult<Self> {
        let cascade: HaarCascade = serde_json::from_str(raw)?;
        cascade.validate()?;
        Ok(cascade)
    }

    /// Rejects models whose features fall outside the detection window.
    pub fn validate(&self) -> CoreResult<()> {
        if self.window_width == 0 || self.window_height == 0 {
            return Err(CoreError::Cascade(format!(
                "window must be non-empty, got {}x{}",
                self.window_width, self.window_height
            )));
        }
        if self.stages.is_empty() {
            return Err(CoreError::Cascade("cascade has no stages".to_string()));
        }
        for (s, stage) in self.stages.iter().enumerate() {
            for (c, classifier) in stage.classifiers.iter().enumerate() {
                if classifier.rects.is_empty() {
                    return Err(CoreError::Cascade(format!(
                        "stage {s} classifier {c} has no rectangles"
                    )));
                }
                for rect in &classifier.rects {
                    let fits = |start: u32, len: u32, limit: u32| {
                        start.checked_add(len).is_some_and(|end| end <= limit)
                    };
                    if !fits(rect.x, rect.width, self.window_width)
                        || !fits(rect.y, rect.height, self.window_height)
                    {
                        return Err(CoreError::Cascade(format!(
                            "stage {s} classifier {c} has a rectangle outside the {}x{} window",
                            self.window_width, self.window_height
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    /// Runs every stage on the window at (`x`, `y`) of `integral`.
    ///
    /// Feature values are divided by the normalization area and compared
    /// against thresholds scaled by the window's standard deviation, so the
    /// decision does not depend on global lighting. As in OpenCV, the
    /// normalization area leaves out a one-pixel border of the window.
    #[must_use]
    pub fn window_passes(&self, integral: &IntegralImage, x: usize, y: usize) -> bool {
        let (ww, wh) = (self.window_width as usize, self.window_height as usize);
        let (nx, ny, nw, nh) = if ww > 2 && wh > 2 {
            (x + 1, y + 1, ww - 2, wh - 2)
        } else {
            (x, y, ww, wh)
        };
        let area = (nw * nh) as f64;
        let mean = integral.rect_sum(nx, ny, nw, nh) as f64 / area;
        let variance = integral.rect_sq_sum(nx, ny, nw, nh) as f64 / area - mean * mean;
        let norm = if variance > 0.0 { variance.sqrt() } else { 1.0 };

        self.stages.iter().all(|stage| {
            let sum: f64 = stage
                .classifiers
                .iter()
                .map(|classifier| {
                    let value: f64 = classifier
                        .rects
                        .iter()
                        .map(|r| {
                            r.weight
                                * integral.rect_sum(
                                    x + r.x as usize,
                                    y + r.y as usize,
                                    r.width as usize,
                                    r.height as usize,
                                ) as f64
                        })
                        .sum();
                    if value / area < classifier.threshold * norm {
                        classifier.left
                    } else {
                        classifier.right
                    }
                })
                .sum();
            sum >= stage.threshold
        })
    }
}

/// Multi-scale search parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeParams {
    pub scale_factor: f64,
    pub min_neighbors: usize,
    pub min_size: u32,
}

impl CascadeParams {
    #[must_use]
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            scale_factor: config.face_scale_factor,
            min_neighbors: config.face_min_neighbors,
            min_size: config.face_min_size,
        }
    }
}

impl Default for CascadeParams {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

/// [`FaceDetector`] backed by a [`HaarCascade`].
#[derive(Debug, Clone)]
pub struct HaarCascadeDetector {
    cascade: HaarCascade,
    params: CascadeParams,
}

impl HaarCascadeDetector {
    #[must_use]
    pub fn new(cascade: HaarCascade, params: CascadeParams) -> Self {
        Self { cascade, params }
    }

    /// Raw window hits across the pyramid, in frame coordinates.
    fn raw_detections(&self, gray: &GrayImage) -> Vec<FaceBox> {
        let (width, height) = gray.dimensions();
        let (ww, wh) = (self.cascade.window_width, self.cascade.window_height);
        let mut hits = Vec::new();
        if self.params.scale_factor <= 1.0 {
            return hits;
        }

        let mut factor = 1.0f64;
        loop {
            let scaled_w = (f64::from(width) / factor).round() as u32;
            let scaled_h = (f64::from(height) / factor).round() as u32;
            if scaled_w < ww || scaled_h < wh {
                break;
            }
            let win_w = (f64::from(ww) * factor).round() as u32;
            let win_h = (f64::from(wh) * factor).round() as u32;

            if win_w >= self.params.min_size && win_h >= self.params.min_size {
                let integral = if scaled_w == width && scaled_h == height {
                    IntegralImage::new(gray)
                } else {
                    IntegralImage::new(&imageops::resize(gray, scaled_w, scaled_h, FilterType::Triangle))
                };
                let step = if factor > 2.0 { 1 } else { 2 };
                for y in (0..=(scaled_h - wh) as usize).step_by(step) {
                    for x in (0..=(scaled_w - ww) as usize).step_by(step) {
                        if self.cascade.window_passes(&integral, x, y) {
                            let left = ((x as f64 * factor).round() as u32).min(width - 1);
                            let top = ((y as f64 * factor).round() as u32).min(height - 1);
                            hits.push(FaceBox {
                                x: left,
                                y: top,
                                width: win_w.min(width - left),
                                height: win_h.min(height - top),
                            });
                        }
                    }
                }
            }
            factor *= self.params.scale_factor;
        }
        hits
    }
}

impl FaceDetector for HaarCascadeDetector {
    fn detect(&self, gray: &GrayImage) -> Vec<FaceBox> {
        let (width, height) = gray.dimensions();
        let raw = self.raw_detections(gray);
        // Rounded cluster averages can overshoot the frame by a pixel.
        let faces: Vec<FaceBox> = group_rectangles(&raw, self.params.min_neighbors, GROUPING_EPS)
            .into_iter()
            .map(|face| FaceBox {
                width: face.width.min(width.saturating_sub(face.x)),
                height: face.height.min(height.saturating_sub(face.y)),
                ..face
            })
            .collect();
        log::trace!("Cascade: {} raw hits, {} faces", raw.len(), faces.len());
        faces
    }

    fn name(&self) -> &'static str {
        "haar-cascade"
    }
}

fn similar(a: &FaceBox, b: &FaceBox, eps: f64) -> bool {
    let delta = eps * (f64::from(a.width.min(b.width)) + f64::from(a.height.min(b.height))) * 0.5;
    let close = |p: u32, q: u32| (f64::from(p) - f64::from(q)).abs() <= delta;
    close(a.x, b.x)
        && close(a.y, b.y)
        && close(a.x + a.width, b.x + b.width)
        && close(a.y + a.height, b.y + b.height)
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Clusters similar rectangles and keeps the average of every cluster with
/// more than `min_neighbors` members, dropping clusters nested inside a
/// stronger one.
#[must_use]
pub fn group_rectangles(rects: &[FaceBox], min_neighbors: usize, eps: f64) -> Vec<FaceBox> {
    if rects.is_empty() {
        return Vec::new();
    }
    if min_neighbors == 0 {
        return rects.to_vec();
    }

    let mut parent: Vec<usize> = (0..rects.len()).collect();
    for i in 0..rects.len() {
        for j in (i + 1)..rects.len() {
            if similar(&rects[i], &rects[j], eps) {
                let (ri, rj) = (find(&mut parent, i), find(&mut parent, j));
                if ri != rj {
                    parent[rj] = ri;
                }
            }
        }
    }

    // Clusters in order of first appearance.
    let mut roots: Vec<usize> = Vec::new();
    let mut sums: Vec<[f64; 4]> = Vec::new();
    let mut counts: Vec<usize> = Vec::new();
    for (i, rect) in rects.iter().enumerate() {
        let root = find(&mut parent, i);
        let slot = match roots.iter().position(|&r| r == root) {
            Some(slot) => slot,
            None => {
                roots.push(root);
                sums.push([0.0; 4]);
                counts.push(0);
                roots.len() - 1
            }
        };
        sums[slot][0] += f64::from(rect.x);
        sums[slot][1] += f64::from(rect.y);
        sums[slot][2] += f64::from(rect.width);
        sums[slot][3] += f64::from(rect.height);
        counts[slot] += 1;
    }

    let averaged: Vec<FaceBox> = sums
        .iter()
        .zip(&counts)
        .map(|(s, &n)| {
            let n = n as f64;
            FaceBox {
                x: (s[0] / n).round() as u32,
                y: (s[1] / n).round() as u32,
                width: (s[2] / n).round() as u32,
                height: (s[3] / n).round() as u32,
            }
        })
        .collect();

    let mut faces = Vec::new();
    for (i, r1) in averaged.iter().enumerate() {
        let n1 = counts[i];
        if n1 <= min_neighbors {
            continue;
        }
        let nested = averaged.iter().enumerate().any(|(j, r2)| {
            let n2 = counts[j];
            if j == i || n2 <= min_neighbors {
                return false;
            }
            let dx = (f64::from(r2.width) * eps).round() as i64;
            let dy = (f64::from(r2.height) * eps).round() as i64;
            let (x1, y1) = (i64::from(r1.x), i64::from(r1.y));
            let (x2, y2) = (i64::from(r2.x), i64::from(r2.y));
            x1 >= x2 - dx
                && y1 >= y2 - dy
                && x1 + i64::from(r1.width) <= x2 + i64::from(r2.width) + dx
                && y1 + i64::from(r1.height) <= y2 + i64::from(r2.height) + dy
                && (n2 > n1.max(3) || n1 < 3)
        });
        if !nested {
            faces.push(*r1);
        }
    }
    faces
}
