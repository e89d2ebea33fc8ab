//! Header analysis detectors.
//!
//! - `AutomationHeaderDetector` flags headers only SDKs and automation
//!   drivers send.
//! - `BrowserHeaderAnalyzer` flags missing standard browser headers and an
//!   Accept header that does not negotiate HTML.

use super::{Detector, DetectorResult, RequestDescriptor};
use crate::catalog::SignatureCatalog;
use std::sync::Arc;

/// Headers that real browsers always send, in reporting order.
pub const BROWSER_HEADERS: [&str; 3] = ["accept", "accept-language", "accept-encoding"];

/// Media type a browser navigation asks for.
const HTML_MEDIA_TYPE: &str = "text/html";

/// Flags catalog headers present with a non-empty value.
pub struct AutomationHeaderDetector {
    catalog: Arc<SignatureCatalog>,
    /// Confidence per suspicious header
    weight: f64,
}

impl AutomationHeaderDetector {
    pub fn new(catalog: Arc<SignatureCatalog>, weight: f64) -> Self {
        Self { catalog, weight }
    }
}

impl Detector for AutomationHeaderDetector {
    fn analyze(&self, request: &RequestDescriptor) -> DetectorResult {
        let mut result = DetectorResult::new();

        for header in self.catalog.suspicious_headers() {
            if request.has_non_empty_header(header) {
                result.add(self.weight);
                result = result.with_reason(format!("Suspicious header present: {}", header));
            }
        }

        result
    }

    fn name(&self) -> &'static str {
        "automation_headers"
    }
}

/// Checks for the headers and content negotiation of a real browser.
pub struct BrowserHeaderAnalyzer {
    /// Confidence per missing browser header
    missing_weight: f64,
    /// Confidence when Accept does not include HTML
    negotiation_weight: f64,
}

impl BrowserHeaderAnalyzer {
    pub fn new(missing_weight: f64, negotiation_weight: f64) -> Self {
        Self {
            missing_weight,
            negotiation_weight,
        }
    }
}

impl Default for BrowserHeaderAnalyzer {
    fn default() -> Self {
        Self::new(0.2, 0.4)
    }
}

impl Detector for BrowserHeaderAnalyzer {
    fn analyze(&self, request: &RequestDescriptor) -> DetectorResult {
        let mut result = DetectorResult::new();

        let missing: Vec<&str> = BROWSER_HEADERS
            .iter()
            .copied()
            .filter(|h| !request.has_header(h))
            .collect();

        if !missing.is_empty() {
            result.add(missing.len() as f64 * self.missing_weight);
            result = result.with_reason(format!(
                "Missing standard browser headers: {}",
                missing.join(", ")
            ));
        }

        // An absent Accept header cannot ask for HTML either
        let accepts_html = request
            .header_values("accept")
            .is_some_and(|values| values.iter().any(|v| v.to_lowercase().contains(HTML_MEDIA_TYPE)));
        if !accepts_html {
            result.add(self.negotiation_weight);
            result = result.with_reason("Accept header does not request text/html");
        }

        result
    }

    fn name(&self) -> &'static str {
        "browser_headers"
    }
}
