//! Reader for cascade files written by OpenCV's `opencv_traincascade`
//! (`type_id="opencv-cascade-classifier"`), such as the stock
//! `haarcascade_frontalface_default.xml`.
//!
//! Only boosted Haar cascades made of decision stumps are accepted. Tilted
//! features and deeper trees are rejected with a `Cascade` error.

use super::cascade::{HaarCascade, Stage, WeakClassifier, WeightedRect};
use crate::error::{CoreError, CoreResult};
use serde::Deserialize;
use std::str::FromStr;

#[derive(Debug, Deserialize)]
struct Storage {
    cascade: CascadeNode,
}

/// OpenCV stores sequences as repeated `<_>` elements.
#[derive(Debug, Deserialize)]
struct Items<T> {
    #[serde(rename = "_", default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CascadeNode {
    stage_type: Option<String>,
    feature_type: Option<String>,
    width: u32,
    height: u32,
    stages: Items<StageNode>,
    features: Items<FeatureNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StageNode {
    stage_threshold: f64,
    weak_classifiers: Items<WeakNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WeakNode {
    internal_nodes: String,
    leaf_values: String,
}

#[derive(Debug, Deserialize)]
struct FeatureNode {
    rects: Items<String>,
    #[serde(default)]
    tilted: Option<u8>,
}

fn cascade_error(message: impl Into<String>) -> CoreError {
    CoreError::Cascade(message.into())
}

fn parse_list<T: FromStr>(text: &str, what: &str) -> CoreResult<Vec<T>> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse::<T>()
                .map_err(|_| cascade_error(format!("invalid number {token:?} in {what}")))
        })
        .collect()
}

fn parse_feature(index: usize, feature: &FeatureNode) -> CoreResult<Vec<WeightedRect>> {
    if feature.tilted.unwrap_or(0) != 0 {
        return Err(cascade_error(format!(
            "feature {index} is tilted; only upright Haar features are supported"
        )));
    }
    feature
        .rects
        .items
        .iter()
        .map(|text| {
            let tokens: Vec<&str> = text.split_whitespace().collect();
            let [x, y, width, height, weight] = tokens[..] else {
                return Err(cascade_error(format!(
                    "feature {index} has a rectangle with {} values instead of 5",
                    tokens.len()
                )));
            };
            let coord = |token: &str| {
                token
                    .parse::<u32>()
                    .map_err(|_| cascade_error(format!("invalid coordinate {token:?} in feature {index}")))
            };
            Ok(WeightedRect {
                x: coord(x)?,
                y: coord(y)?,
                width: coord(width)?,
                height: coord(height)?,
                weight: weight
                    .parse()
                    .map_err(|_| cascade_error(format!("invalid weight {weight:?} in feature {index}")))?,
            })
        })
        .collect()
}

fn parse_stump(
    stage: usize,
    classifier: usize,
    weak: &WeakNode,
    features: &[Vec<WeightedRect>],
) -> CoreResult<WeakClassifier> {
    let location = format!("stage {stage} classifier {classifier}");
    let nodes: Vec<f64> = parse_list(&weak.internal_nodes, &location)?;
    let leaves: Vec<f64> = parse_list(&weak.leaf_values, &location)?;

    // left right feature_index threshold
    let [left, right, feature, threshold] = nodes[..] else {
        return Err(cascade_error(format!(
            "{location} is not a decision stump ({} node values)",
            nodes.len()
        )));
    };
    // Leaves are referenced as 0, -1, ...; positive values point at other nodes.
    let leaf = |reference: f64| -> CoreResult<f64> {
        if reference > 0.0 || reference.fract() != 0.0 {
            return Err(cascade_error(format!("{location} is not a decision stump")));
        }
        leaves
            .get((-reference) as usize)
            .copied()
            .ok_or_else(|| cascade_error(format!("{location} references a missing leaf")))
    };
    let rects = features
        .get(feature as usize)
        .filter(|_| feature >= 0.0 && feature.fract() == 0.0)
        .ok_or_else(|| cascade_error(format!("{location} references unknown feature {feature}")))?;

    Ok(WeakClassifier {
        rects: rects.clone(),
        threshold,
        left: leaf(left)?,
        right: leaf(right)?,
    })
}

/// Parses an OpenCV cascade XML document into a validated [`HaarCascade`].
pub fn parse_opencv_cascade(xml: &str) -> CoreResult<HaarCascade> {
    if xml.contains("opencv-haar-classifier") {
        return Err(cascade_error(
            "legacy opencv-haar-classifier files are not supported; \
             use a model saved by opencv_traincascade",
        ));
    }
    let storage: Storage = quick_xml::de::from_str(xml)
        .map_err(|e| cascade_error(format!("invalid cascade XML: {e}")))?;
    let node = storage.cascade;

    if let Some(stage_type) = node.stage_type.as_deref().filter(|t| *t != "BOOST") {
        return Err(cascade_error(format!("unsupported stage type {stage_type}")));
    }
    if let Some(feature_type) = node.feature_type.as_deref().filter(|t| *t != "HAAR") {
        return Err(cascade_error(format!("unsupported feature type {feature_type}")));
    }

    let features = node
        .features
        .items
        .iter()
        .enumerate()
        .map(|(i, feature)| parse_feature(i, feature))
        .collect::<CoreResult<Vec<_>>>()?;

    let stages = node
        .stages
        .items
        .iter()
        .enumerate()
        .map(|(s, stage)| {
            let classifiers = stage
                .weak_classifiers
                .items
                .iter()
                .enumerate()
                .map(|(c, weak)| parse_stump(s, c, weak, &features))
                .collect::<CoreResult<Vec<_>>>()?;
            Ok(Stage {
                threshold: stage.stage_threshold,
                classifiers,
            })
        })
        .collect::<CoreResult<Vec<_>>>()?;

    let cascade = HaarCascade {
        window_width: node.width,
        window_height: node.height,
        stages,
    };
    cascade.validate()?;
    Ok(cascade)
}
