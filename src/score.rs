//! Classification result and score accumulation.

use crate::detectors::DetectorResult;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Verdict for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    /// Whether the request looks automated
    pub is_automated: bool,

    /// Confidence that the request is automated (0.0-1.0)
    pub confidence: f64,

    /// Unique category labels, in order of first detection
    pub categories: Vec<String>,

    /// Evidence, in detection order
    pub reasons: Vec<String>,
}

impl ClassificationResult {
    /// True when the given category was raised.
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

/// Folds detector results into a classification.
///
/// Confidence is summed without a cap and clamped to `[0, 1]` only when the
/// result is produced.
#[derive(Debug, Default)]
pub struct ScoreAccumulator {
    confidence: f64,
    categories: Vec<String>,
    seen: HashSet<String>,
    reasons: Vec<String>,
}

impl ScoreAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one detector's result.
    pub fn push(&mut self, result: DetectorResult) {
        self.confidence += result.confidence;
        for category in result.categories {
            if self.seen.insert(category.clone()) {
                self.categories.push(category);
            }
        }
        self.reasons.extend(result.reasons);
    }

    /// Confidence accumulated so far, unclamped.
    pub fn raw_confidence(&self) -> f64 {
        self.confidence
    }

    /// Produce the result. `is_automated` compares the clamped confidence
    /// against `threshold`.
    pub fn finish(self, threshold: f64) -> ClassificationResult {
        let confidence = if self.confidence.is_nan() {
            0.0
        } else {
            self.confidence.clamp(0.0, 1.0)
        };

        ClassificationResult {
            is_automated: confidence > threshold,
            confidence,
            categories: self.categories,
            reasons: self.reasons,
        }
    }
}
