//! AI guard agent: the operations exposed to the transport.

use crate::catalog::SignatureCatalog;
use crate::challenge::{
    ChallengeEngine, ChallengeKind, ChallengePayload, ChallengePool, SolutionCustody,
};
use crate::classifier::Classifier;
use crate::config::{AiGuardConfig, VerificationMode};
use crate::detectors::RequestDescriptor;
use crate::error::Result;
use crate::ledger::{ThreatLedger, ThreatSummary};
use crate::score::ClassificationResult;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Event recorded when a challenge attempt fails.
pub const FAILED_CHALLENGE_EVENT: &str = "failed-challenge";

/// Classification of one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(flatten)]
    pub classification: ClassificationResult,
    pub timestamp: DateTime<Utc>,
}

/// A challenge as handed to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuedChallenge {
    pub challenge_id: Uuid,
    pub kind: ChallengeKind,
    pub payload: ChallengePayload,
    /// Plaintext solution (echo mode) or seal (sealed mode); absent when stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    pub issued_at: DateTime<Utc>,
}

/// A client's answer to a challenge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChallengeSubmission {
    pub challenge_id: String,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub expected_solution: Option<String>,
}

/// Result of a verification attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub verified: bool,
    pub challenge_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Runtime counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStats {
    pub tracked_clients: usize,
    pub ledger_backend: String,
    pub verification_mode: VerificationMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outstanding_challenges: Option<u64>,
}

/// AI guard agent.
pub struct AiGuardAgent {
    config: AiGuardConfig,
    classifier: Classifier,
    ledger: ThreatLedger,
    engine: ChallengeEngine,
    custody: SolutionCustody,
}

impl AiGuardAgent {
    /// Create an agent, loading signature and puzzle data where present.
    pub fn new(config: AiGuardConfig, signatures_path: &Path, puzzles_path: &Path) -> Result<Self> {
        config.validate()?;
        let catalog = SignatureCatalog::load(signatures_path)?;
        let pool = ChallengePool::load(puzzles_path)?;
        let ledger = ThreatLedger::from_config(&config.ledger);

        info!(
            agents = catalog.agents().len(),
            behaviors = catalog.behaviors().len(),
            ledger = ledger.backend(),
            verification = ?config.challenge.verification,
            "AI guard agent initialized"
        );

        Ok(Self::from_parts(config, catalog, pool, ledger))
    }

    /// Create with default configuration and built-in data.
    pub fn with_defaults() -> Self {
        let config = AiGuardConfig::default();
        let ledger = ThreatLedger::from_config(&config.ledger);
        Self::from_parts(
            config,
            SignatureCatalog::default(),
            ChallengePool::default(),
            ledger,
        )
    }

    /// Assemble an agent from already-built components.
    pub fn from_parts(
        config: AiGuardConfig,
        catalog: SignatureCatalog,
        pool: ChallengePool,
        ledger: ThreatLedger,
    ) -> Self {
        let classifier = Classifier::new(Arc::new(catalog), &config.classifier);
        let custody = SolutionCustody::from_config(&config.challenge);

        Self {
            engine: ChallengeEngine::new(Arc::new(pool)),
            classifier,
            ledger,
            custody,
            config,
        }
    }

    /// Classify a request and record a threat when it looks automated.
    pub fn analyze_request(&self, identity: &str, request: &RequestDescriptor) -> AnalysisReport {
        let classification = self.classifier.classify(request);

        if classification.is_automated {
            self.ledger.record_threat(
                identity,
                &self.config.classifier.detected_event_label,
                classification.confidence,
            );
        }

        info!(
            client = %self.mask(identity),
            automated = classification.is_automated,
            confidence = classification.confidence,
            categories = ?classification.categories,
            "Request analyzed"
        );

        AnalysisReport {
            classification,
            timestamp: Utc::now(),
        }
    }

    /// Read a client's standing.
    pub fn threat_summary(&self, identity: &str) -> ThreatSummary {
        self.ledger.summary(identity)
    }

    /// Issue a challenge using the thread-local RNG.
    pub fn issue_challenge(&self) -> IssuedChallenge {
        self.issue_challenge_with(&mut rand::rng())
    }

    /// Issue a challenge drawn from the given RNG.
    pub fn issue_challenge_with<R: Rng + ?Sized>(&self, rng: &mut R) -> IssuedChallenge {
        let challenge = self.engine.generate_with(rng);
        let solution = self.custody.release(&challenge);

        debug!(
            challenge_id = %challenge.challenge_id,
            kind = challenge.kind.as_str(),
            "Challenge issued"
        );

        IssuedChallenge {
            challenge_id: challenge.challenge_id,
            kind: challenge.kind,
            payload: challenge.payload,
            solution,
            issued_at: Utc::now(),
        }
    }

    /// Verify an answer and adjust the client's risk.
    pub fn verify_challenge(
        &self,
        identity: &str,
        submission: &ChallengeSubmission,
    ) -> VerificationOutcome {
        let verified = self.custody.check(
            &submission.challenge_id,
            submission.answer.as_deref(),
            submission.expected_solution.as_deref(),
        );

        let ledger_config = &self.config.ledger;
        let risk_score = if verified {
            self.ledger
                .reduce_risk(identity, ledger_config.success_reduction)
                .map(|r| r.risk_score)
        } else {
            let record = self.ledger.record_threat(
                identity,
                FAILED_CHALLENGE_EVENT,
                ledger_config.failure_severity,
            );
            Some(record.risk_score)
        };

        info!(
            client = %self.mask(identity),
            challenge_id = %submission.challenge_id,
            verified = verified,
            risk_score = ?risk_score,
            "Challenge verification"
        );

        VerificationOutcome {
            verified,
            challenge_id: submission.challenge_id.clone(),
            timestamp: Utc::now(),
        }
    }

    pub fn stats(&self) -> AgentStats {
        AgentStats {
            tracked_clients: self.ledger.len(),
            ledger_backend: self.ledger.backend().to_string(),
            verification_mode: self.custody.mode(),
            outstanding_challenges: self.custody.outstanding(),
        }
    }

    /// Redact an identity for logs and responses.
    pub fn mask(&self, identity: &str) -> String {
        self.config.privacy.mask_identity(identity)
    }

    pub fn ledger(&self) -> &ThreatLedger {
        &self.ledger
    }

    pub fn config(&self) -> &AiGuardConfig {
        &self.config
    }
}
