//! Request classifier.
//!
//! Runs the detectors in a fixed order over a request and folds their
//! results. Classification has no side effects and never blocks.

use crate::catalog::SignatureCatalog;
use crate::config::ClassifierConfig;
use crate::detectors::{
    AutomationHeaderDetector, BrowserHeaderAnalyzer, Detector, KnownAgentDetector,
    RequestDescriptor, UserAgentAnalyzer,
};
use crate::score::{ClassificationResult, ScoreAccumulator};
use std::sync::Arc;
use tracing::trace;

/// Heuristic automation classifier.
pub struct Classifier {
    /// Detectors in evaluation order
    detectors: Vec<Box<dyn Detector>>,
    /// Confidence above which a request is automated
    threshold: f64,
}

impl Classifier {
    /// Build the standard detector pipeline over a catalog.
    pub fn new(catalog: Arc<SignatureCatalog>, config: &ClassifierConfig) -> Self {
        let weights = &config.weights;
        let detectors: Vec<Box<dyn Detector>> = vec![
            Box::new(KnownAgentDetector::new(Arc::clone(&catalog), weights.known_agent)),
            Box::new(AutomationHeaderDetector::new(
                Arc::clone(&catalog),
                weights.suspicious_header,
            )),
            Box::new(UserAgentAnalyzer::new(catalog)),
            Box::new(BrowserHeaderAnalyzer::new(
                weights.missing_browser_header,
                weights.content_negotiation,
            )),
        ];

        Self {
            detectors,
            threshold: config.automation_threshold,
        }
    }

    /// Build a classifier from custom detectors.
    pub fn with_detectors(detectors: Vec<Box<dyn Detector>>, threshold: f64) -> Self {
        Self {
            detectors,
            threshold,
        }
    }

    /// Classify a request.
    pub fn classify(&self, request: &RequestDescriptor) -> ClassificationResult {
        let mut acc = ScoreAccumulator::new();

        for detector in &self.detectors {
            let result = detector.analyze(request);
            trace!(
                detector = detector.name(),
                confidence = result.confidence,
                "Detector complete"
            );
            acc.push(result);
        }

        acc.finish(self.threshold)
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(
            Arc::new(SignatureCatalog::default()),
            &ClassifierConfig::default(),
        )
    }
}
