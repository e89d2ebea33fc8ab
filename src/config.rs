//! Configuration types for the AI Guard agent.

use crate::error::{AiGuardError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for the AI Guard agent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AiGuardConfig {
    /// Classifier threshold and signal weights
    pub classifier: ClassifierConfig,

    /// Threat ledger storage and risk adjustments
    pub ledger: LedgerConfig,

    /// Challenge verification settings
    pub challenge: ChallengeConfig,

    /// Redaction of client identities in responses and logs
    pub privacy: PrivacyConfig,
}

impl AiGuardConfig {
    /// Load configuration from a JSON or YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let config: Self = crate::error::load_data_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would break the scoring or risk invariants.
    pub fn validate(&self) -> Result<()> {
        let threshold = self.classifier.automation_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(AiGuardError::InvalidConfig(format!(
                "classifier.automation_threshold must be within [0, 1], got {threshold}"
            )));
        }

        let w = &self.classifier.weights;
        for (name, value) in [
            ("known_agent", w.known_agent),
            ("suspicious_header", w.suspicious_header),
            ("missing_browser_header", w.missing_browser_header),
            ("content_negotiation", w.content_negotiation),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AiGuardError::InvalidConfig(format!(
                    "classifier.weights.{name} must be a non-negative number"
                )));
            }
        }

        if self.classifier.detected_event_label.trim().is_empty() {
            return Err(AiGuardError::InvalidConfig(
                "classifier.detected_event_label must not be empty".to_string(),
            ));
        }

        for (name, value) in [
            ("success_reduction", self.ledger.success_reduction),
            ("failure_severity", self.ledger.failure_severity),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AiGuardError::InvalidConfig(format!(
                    "ledger.{name} must be a non-negative number"
                )));
            }
        }

        if self.ledger.backend == LedgerBackend::Expiring && self.ledger.max_clients == 0 {
            return Err(AiGuardError::InvalidConfig(
                "ledger.max_clients must be positive for the expiring backend".to_string(),
            ));
        }

        if self.challenge.verification == VerificationMode::Sealed
            && self.challenge.token_secret.is_empty()
        {
            return Err(AiGuardError::InvalidConfig(
                "challenge.token_secret is required for sealed verification".to_string(),
            ));
        }

        Ok(())
    }
}

/// Classifier settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Confidence above which a request counts as automated (0.0-1.0)
    pub automation_threshold: f64,

    /// Per-signal confidence contributions
    pub weights: SignalWeights,

    /// Ledger event recorded when a request is classified as automated
    pub detected_event_label: String,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            automation_threshold: 0.5,
            weights: SignalWeights::default(),
            detected_event_label: "ai-detected".to_string(),
        }
    }
}

/// Confidence added by each fixed signal.
///
/// Behavior pattern weights live in the signature catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalWeights {
    /// Per known AI agent identifier in the User-Agent
    pub known_agent: f64,
    /// Per suspicious header present
    pub suspicious_header: f64,
    /// Per standard browser header missing
    pub missing_browser_header: f64,
    /// Accept header does not ask for HTML
    pub content_negotiation: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            known_agent: 0.8,
            suspicious_header: 0.7,
            missing_browser_header: 0.2,
            content_negotiation: 0.4,
        }
    }
}

/// Threat ledger backends.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LedgerBackend {
    /// Unbounded in-process map, records live as long as the process
    #[default]
    Memory,
    /// Bounded cache that drops clients idle longer than the TTL
    Expiring,
}

/// Threat ledger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Storage backend
    pub backend: LedgerBackend,

    /// Maximum tracked clients (expiring backend only)
    pub max_clients: u64,

    /// Idle time after which a client is forgotten (expiring backend only)
    pub idle_ttl_seconds: u64,

    /// Risk removed after a solved challenge
    pub success_reduction: f64,

    /// Risk added after a failed challenge
    pub failure_severity: f64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            backend: LedgerBackend::Memory,
            max_clients: 100_000,
            idle_ttl_seconds: 86_400,
            success_reduction: 0.2,
            failure_severity: 0.1,
        }
    }
}

/// How a submitted answer is checked against the issued challenge.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMode {
    /// The plaintext solution is sent with the challenge and echoed back
    #[default]
    Echo,
    /// An HMAC seal over the solution is sent instead of the solution
    Sealed,
    /// The solution stays server-side, keyed by challenge id
    Stored,
}

/// Challenge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeConfig {
    /// Verification mode
    pub verification: VerificationMode,

    /// Secret for HMAC seals
    pub token_secret: String,

    /// Seal and stored challenge validity in seconds
    pub token_validity_seconds: u64,

    /// Maximum outstanding stored challenges
    pub max_stored_challenges: u64,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            verification: VerificationMode::Echo,
            token_secret: "change-me-in-production".to_string(),
            token_validity_seconds: 300,
            max_stored_challenges: 100_000,
        }
    }
}

/// Client identity redaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivacyConfig {
    /// Leading characters of the identity left visible
    pub visible_prefix: usize,

    /// Token appended in place of the hidden remainder
    pub mask: String,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self {
            visible_prefix: 8,
            mask: "***".to_string(),
        }
    }
}

impl PrivacyConfig {
    /// Redact an identity for display, keeping only the configured prefix.
    pub fn mask_identity(&self, identity: &str) -> String {
        let visible: String = identity.chars().take(self.visible_prefix).collect();
        format!("{}{}", visible, self.mask)
    }
}
