//! AI Guard Agent for Zentinel
//!
//! Classifies requests as automated (AI agents, scripted clients, headless
//! browsers) or human, accumulates per-client risk, and issues and verifies
//! small challenges that confirm human presence.
//!
//! # Features
//!
//! - Known AI agent identifiers and automation header detection
//! - Weighted User-Agent behavior patterns
//! - Browser header completeness and content negotiation checks
//! - Per-client threat ledger with in-memory or expiring storage
//! - Logic, pattern, math and riddle challenges with echo, sealed or stored
//!   verification
//!
//! # Example
//!
//! ```ignore
//! use zentinel_agent_ai_guard::{AiGuardAgent, RequestDescriptor};
//!
//! let agent = AiGuardAgent::with_defaults();
//! let request = RequestDescriptor::new("python-requests/2.31");
//! let report = agent.analyze_request("203.0.113.7", &request);
//! assert!(report.classification.is_automated);
//! ```

pub mod agent;
pub mod cache;
pub mod catalog;
pub mod challenge;
pub mod classifier;
pub mod config;
pub mod detectors;
pub mod error;
pub mod ledger;
pub mod score;
pub mod transport;

pub use agent::{AiGuardAgent, AnalysisReport, ChallengeSubmission, IssuedChallenge, VerificationOutcome};
pub use catalog::SignatureCatalog;
pub use challenge::{Challenge, ChallengeEngine, ChallengeKind};
pub use classifier::Classifier;
pub use config::AiGuardConfig;
pub use detectors::RequestDescriptor;
pub use error::{AiGuardError, Result};
pub use ledger::{ThreatLedger, ThreatRecord, ThreatSummary};
pub use score::ClassificationResult;
