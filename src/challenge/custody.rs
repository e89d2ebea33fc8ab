//! Where a challenge's solution lives between issue and verification.

use super::{normalize_answer, verify, Challenge};
use super::seal::SolutionSealer;
use crate::cache::TtlCache;
use crate::config::{ChallengeConfig, VerificationMode};
use std::time::Duration;

/// Solution custody strategy.
pub enum SolutionCustody {
    /// The plaintext solution goes to the client and comes back with the answer.
    Echo,
    /// The client receives an HMAC seal over the solution. Each seal
    /// verifies once; spent challenge ids are remembered until they expire.
    Sealed {
        sealer: SolutionSealer,
        spent: TtlCache<String, ()>,
    },
    /// The solution stays server-side and is consumed by the first attempt.
    Stored(TtlCache<String, String>),
}

impl SolutionCustody {
    pub fn from_config(config: &ChallengeConfig) -> Self {
        match config.verification {
            VerificationMode::Echo => SolutionCustody::Echo,
            VerificationMode::Sealed => SolutionCustody::Sealed {
                sealer: SolutionSealer::new(
                    config.token_secret.clone(),
                    config.token_validity_seconds,
                ),
                spent: TtlCache::new(
                    "spent-seals",
                    config.max_stored_challenges,
                    Duration::from_secs(config.token_validity_seconds),
                ),
            },
            VerificationMode::Stored => SolutionCustody::Stored(TtlCache::new(
                "stored-challenges",
                config.max_stored_challenges,
                Duration::from_secs(config.token_validity_seconds),
            )),
        }
    }

    pub fn mode(&self) -> VerificationMode {
        match self {
            SolutionCustody::Echo => VerificationMode::Echo,
            SolutionCustody::Sealed { .. } => VerificationMode::Sealed,
            SolutionCustody::Stored(_) => VerificationMode::Stored,
        }
    }

    /// Take custody of a freshly generated challenge.
    ///
    /// Returns what the client must send back as its solution, if anything.
    pub fn release(&self, challenge: &Challenge) -> Option<String> {
        let id = challenge.challenge_id.to_string();
        match self {
            SolutionCustody::Echo => Some(challenge.expected_solution.clone()),
            SolutionCustody::Sealed { sealer, .. } => {
                Some(sealer.seal(&id, &challenge.expected_solution))
            }
            SolutionCustody::Stored(cache) => {
                cache.insert(id, challenge.expected_solution.clone());
                None
            }
        }
    }

    /// Check an answer. A missing answer or solution never verifies.
    ///
    /// A seal verifies at most once. In stored mode the client solution is
    /// ignored and the stored solution is consumed whatever the outcome.
    pub fn check(&self, challenge_id: &str, answer: Option<&str>, solution: Option<&str>) -> bool {
        match self {
            SolutionCustody::Echo => match (answer, solution) {
                (Some(answer), Some(solution)) => verify(answer, solution),
                _ => false,
            },
            SolutionCustody::Sealed { sealer, spent } => match (answer, solution) {
                (Some(answer), Some(seal)) => {
                    let answer = normalize_answer(answer);
                    !answer.is_empty()
                        && sealer.verify(challenge_id, &answer, seal)
                        && spent.insert_if_absent(challenge_id.to_string(), ())
                }
                _ => false,
            },
            SolutionCustody::Stored(cache) => {
                let stored = cache.take(&challenge_id.to_string());
                match (answer, stored) {
                    (Some(answer), Some(stored)) => verify(answer, &stored),
                    _ => false,
                }
            }
        }
    }

    /// Outstanding stored challenges, when solutions are held server-side.
    pub fn outstanding(&self) -> Option<u64> {
        match self {
            SolutionCustody::Stored(cache) => Some(cache.entry_count()),
            _ => None,
        }
    }
}
