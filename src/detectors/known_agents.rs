//! Known AI agent detector.
//!
//! Matches the User-Agent against the catalog's AI crawler and assistant
//! identifiers. Every match contributes, so a User-Agent naming two agents
//! scores twice.

use super::{Detector, DetectorResult, RequestDescriptor};
use crate::catalog::SignatureCatalog;
use std::sync::Arc;

/// Known AI agent detector.
pub struct KnownAgentDetector {
    catalog: Arc<SignatureCatalog>,
    /// Confidence per matched identifier
    weight: f64,
}

impl KnownAgentDetector {
    pub fn new(catalog: Arc<SignatureCatalog>, weight: f64) -> Self {
        Self { catalog, weight }
    }
}

impl Detector for KnownAgentDetector {
    fn analyze(&self, request: &RequestDescriptor) -> DetectorResult {
        let mut result = DetectorResult::new();

        for agent in self.catalog.match_agents(&request.user_agent) {
            result.add(self.weight);
            result = result.with_category(agent.identifier.clone());
            result = match &agent.operator {
                Some(operator) => result.with_reason(format!(
                    "Known AI agent identifier: {} ({})",
                    agent.identifier, operator
                )),
                None => result.with_reason(format!("Known AI agent identifier: {}", agent.identifier)),
            };
        }

        result
    }

    fn name(&self) -> &'static str {
        "known_agents"
    }
}
