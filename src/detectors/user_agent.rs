//! User-Agent behavior detector.
//!
//! Applies the catalog's weighted behavior patterns (automation libraries,
//! scrapers, research crawlers, monitors) to the User-Agent string.

use super::{Detector, DetectorResult, RequestDescriptor};
use crate::catalog::SignatureCatalog;
use std::sync::Arc;

/// User-Agent behavior analyzer.
pub struct UserAgentAnalyzer {
    catalog: Arc<SignatureCatalog>,
}

impl UserAgentAnalyzer {
    pub fn new(catalog: Arc<SignatureCatalog>) -> Self {
        Self { catalog }
    }
}

impl Detector for UserAgentAnalyzer {
    fn analyze(&self, request: &RequestDescriptor) -> DetectorResult {
        let mut result = DetectorResult::new();

        for behavior in self.catalog.match_behaviors(&request.user_agent) {
            result.add(behavior.weight);
            result = result
                .with_category(behavior.category.clone())
                .with_reason(format!("User-Agent matches {} pattern", behavior.category));
        }

        result
    }

    fn name(&self) -> &'static str {
        "user_agent"
    }
}
