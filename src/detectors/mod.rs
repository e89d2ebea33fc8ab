//! Automation detection modules.
//!
//! Each detector inspects one aspect of the request and returns the
//! confidence it contributes along with its evidence.

pub mod headers;
pub mod known_agents;
pub mod user_agent;

pub use headers::{AutomationHeaderDetector, BrowserHeaderAnalyzer};
pub use known_agents::KnownAgentDetector;
pub use user_agent::UserAgentAnalyzer;

use std::collections::HashMap;

/// Normalized view of one inbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDescriptor {
    /// Raw User-Agent string (may be empty)
    pub user_agent: String,
    /// Request headers (lowercase keys)
    headers: HashMap<String, Vec<String>>,
}

impl RequestDescriptor {
    /// Create a descriptor with no headers.
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            headers: HashMap::new(),
        }
    }

    /// Build a descriptor from header pairs. Repeated names accumulate values.
    pub fn from_headers<I, K, V>(user_agent: impl Into<String>, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut descriptor = Self::new(user_agent);
        for (name, value) in headers {
            descriptor.insert_header(name.as_ref(), value);
        }
        descriptor
    }

    /// Add a header value.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert_header(name, value);
        self
    }

    fn insert_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers
            .entry(name.to_lowercase())
            .or_default()
            .push(value.into());
    }

    /// Get a single header value (first if multiple).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name)
            .and_then(|v| v.first())
            .map(|s| s.as_str())
    }

    /// All values of a header.
    pub fn header_values(&self, name: &str) -> Option<&[String]> {
        self.headers.get(&name.to_lowercase()).map(Vec::as_slice)
    }

    /// True when the header is present.
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(&name.to_lowercase())
    }

    /// True when the header has at least one non-blank value.
    pub fn has_non_empty_header(&self, name: &str) -> bool {
        self.header_values(name)
            .is_some_and(|values| values.iter().any(|v| !v.trim().is_empty()))
    }

    pub fn header_count(&self) -> usize {
        self.headers.len()
    }
}

/// Result from a detector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectorResult {
    /// Confidence contributed by this detector, unclamped
    pub confidence: f64,
    /// Category labels raised
    pub categories: Vec<String>,
    /// Human-readable evidence
    pub reasons: Vec<String>,
}

impl DetectorResult {
    /// Create an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add confidence.
    pub fn add(&mut self, weight: f64) {
        self.confidence += weight;
    }

    /// Add a category label.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    /// Add a reason for the score.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reasons.push(reason.into());
        self
    }

    /// True when nothing was detected.
    pub fn is_empty(&self) -> bool {
        self.confidence == 0.0 && self.categories.is_empty() && self.reasons.is_empty()
    }
}

/// Trait for automation detectors.
///
/// Detectors are pure: the same request always yields the same result.
pub trait Detector: Send + Sync {
    /// Analyze the request and return a detection result.
    fn analyze(&self, request: &RequestDescriptor) -> DetectorResult;

    /// Get the detector name.
    fn name(&self) -> &'static str;
}
