//! Human-presence challenges.
//!
//! The engine draws a challenge kind uniformly, then a puzzle of that kind
//! from the pool. Arithmetic puzzles are generated from random operands and
//! stand in for any kind whose pool list is empty.

pub mod custody;
pub mod puzzles;
pub mod seal;

pub use custody::SolutionCustody;
pub use puzzles::{ArithmeticRange, ChallengePool, QuestionPuzzle, SequencePuzzle};
pub use seal::SolutionSealer;

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Challenge category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    Logic,
    Pattern,
    Math,
    Riddle,
}

/// Every kind, in the order they are drawn from.
pub const CHALLENGE_KINDS: [ChallengeKind; 4] = [
    ChallengeKind::Logic,
    ChallengeKind::Pattern,
    ChallengeKind::Math,
    ChallengeKind::Riddle,
];

impl ChallengeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChallengeKind::Logic => "logic",
            ChallengeKind::Pattern => "pattern",
            ChallengeKind::Math => "math",
            ChallengeKind::Riddle => "riddle",
        }
    }
}

/// Arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
}

const OPERATORS: [Operator; 3] = [Operator::Add, Operator::Subtract, Operator::Multiply];

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
        }
    }

    pub fn apply(&self, left: i64, right: i64) -> i64 {
        match self {
            Operator::Add => left + right,
            Operator::Subtract => left - right,
            Operator::Multiply => left * right,
        }
    }
}

/// What the client is shown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum ChallengePayload {
    Question {
        prompt: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        options: Vec<String>,
    },
    Sequence {
        prompt: String,
        sequence: Vec<i64>,
    },
    Arithmetic {
        prompt: String,
        left: i64,
        operator: Operator,
        right: i64,
    },
}

impl ChallengePayload {
    pub fn prompt(&self) -> &str {
        match self {
            ChallengePayload::Question { prompt, .. }
            | ChallengePayload::Sequence { prompt, .. }
            | ChallengePayload::Arithmetic { prompt, .. } => prompt,
        }
    }
}

/// A generated challenge with its canonical solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub challenge_id: Uuid,
    pub kind: ChallengeKind,
    pub payload: ChallengePayload,
    pub expected_solution: String,
}

/// Challenge generator over a puzzle pool.
#[derive(Debug, Clone, Default)]
pub struct ChallengeEngine {
    pool: Arc<ChallengePool>,
}

impl ChallengeEngine {
    pub fn new(pool: Arc<ChallengePool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &ChallengePool {
        &self.pool
    }

    /// Generate a challenge using the thread-local RNG.
    pub fn generate(&self) -> Challenge {
        self.generate_with(&mut rand::rng())
    }

    /// Generate a challenge from the given RNG.
    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Challenge {
        let mut id = [0u8; 16];
        rng.fill_bytes(&mut id);
        let challenge_id = uuid::Builder::from_random_bytes(id).into_uuid();

        let kind = CHALLENGE_KINDS
            .choose(rng)
            .copied()
            .unwrap_or(ChallengeKind::Math);

        let drawn = match kind {
            ChallengeKind::Logic => self.pool.logic.choose(rng).map(question),
            ChallengeKind::Riddle => self.pool.riddle.choose(rng).map(question),
            ChallengeKind::Pattern => self.pool.pattern.choose(rng).map(|p| {
                let payload = ChallengePayload::Sequence {
                    prompt: p.prompt.clone(),
                    sequence: p.sequence.clone(),
                };
                (payload, p.solution.clone())
            }),
            ChallengeKind::Math => None,
        };

        let (kind, (payload, expected_solution)) = match drawn {
            Some(drawn) => (kind, drawn),
            None => (ChallengeKind::Math, arithmetic(&self.pool.math, rng)),
        };

        Challenge {
            challenge_id,
            kind,
            payload,
            expected_solution,
        }
    }
}

fn question(puzzle: &QuestionPuzzle) -> (ChallengePayload, String) {
    let payload = ChallengePayload::Question {
        prompt: puzzle.prompt.clone(),
        options: puzzle.options.clone(),
    };
    (payload, puzzle.solution.clone())
}

fn arithmetic<R: Rng + ?Sized>(range: &ArithmeticRange, rng: &mut R) -> (ChallengePayload, String) {
    let operator = OPERATORS.choose(rng).copied().unwrap_or(Operator::Add);
    let mut left = rng.random_range(range.min_operand..=range.max_operand);
    let mut right = rng.random_range(range.min_operand..=range.max_operand);

    // Keep subtraction results non-negative
    if operator == Operator::Subtract && left < right {
        std::mem::swap(&mut left, &mut right);
    }

    let solution = operator.apply(left, right).to_string();
    let payload = ChallengePayload::Arithmetic {
        prompt: format!("What is {} {} {}?", left, operator.symbol(), right),
        left,
        operator,
        right,
    };
    (payload, solution)
}

/// Canonical form of an answer: trimmed and lower-cased.
pub fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Compare a submitted answer with the expected solution.
///
/// Exact match after normalization, no numeric tolerance. An expected
/// solution that normalizes to empty never verifies.
pub fn verify(submitted: &str, expected: &str) -> bool {
    let expected = normalize_answer(expected);
    !expected.is_empty() && normalize_answer(submitted) == expected
}
