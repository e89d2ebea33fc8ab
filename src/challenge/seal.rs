//! HMAC seals for challenge solutions.
//!
//! A seal binds a challenge id, its issue time and the canonical solution
//! without revealing the solution. The client returns the seal with its
//! answer and the server recomputes the MAC over the submitted answer.
//!
//! Seal format: `{issued_at}|{hex hmac-sha256(challenge_id|issued_at|solution)}`

use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

/// Issues and checks solution seals.
pub struct SolutionSealer {
    /// Secret key for HMAC signing
    secret: Vec<u8>,
    /// Seal validity duration in seconds
    validity_seconds: u64,
}

impl SolutionSealer {
    /// Create a new sealer.
    pub fn new(secret: impl Into<String>, validity_seconds: u64) -> Self {
        Self {
            secret: secret.into().into_bytes(),
            validity_seconds,
        }
    }

    /// Seal a canonical solution issued now.
    pub fn seal(&self, challenge_id: &str, solution: &str) -> String {
        self.seal_at(challenge_id, solution, now_secs())
    }

    fn seal_at(&self, challenge_id: &str, solution: &str, issued_at: u64) -> String {
        let signature = hex::encode(self.mac(challenge_id, issued_at, solution).finalize().into_bytes());
        format!("{}|{}", issued_at, signature)
    }

    /// Check a canonical answer against a seal.
    ///
    /// Returns false for a malformed, expired or forged seal, or a wrong answer.
    pub fn verify(&self, challenge_id: &str, answer: &str, seal: &str) -> bool {
        let Some((issued, signature)) = seal.trim().split_once('|') else {
            return false;
        };

        let issued_at: u64 = match issued.parse() {
            Ok(ts) => ts,
            Err(_) => return false,
        };

        let elapsed = now_secs().saturating_sub(issued_at);
        if self.validity_seconds == 0 || elapsed > self.validity_seconds {
            return false;
        }

        let signature = match hex::decode(signature) {
            Ok(bytes) => bytes,
            Err(_) => return false,
        };

        // Constant-time comparison
        self.mac(challenge_id, issued_at, answer)
            .verify_slice(&signature)
            .is_ok()
    }

    fn mac(&self, challenge_id: &str, issued_at: u64, solution: &str) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .expect("HMAC can take key of any size");
        mac.update(challenge_id.as_bytes());
        mac.update(b"|");
        mac.update(issued_at.to_string().as_bytes());
        mac.update(b"|");
        mac.update(solution.as_bytes());
        mac
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
