//! Challenge puzzle pool.
//!
//! The wording of puzzles is data: a pool can be loaded from a JSON or YAML
//! file to replace the built-in set. Solutions are stored in canonical form
//! (trimmed, lower-cased). Kinds missing from a file keep the built-in
//! puzzles; an explicitly empty list disables the kind and the engine falls
//! back to arithmetic.

use super::normalize_answer;
use crate::error::{AiGuardError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Largest operand magnitude accepted for arithmetic puzzles.
const MAX_OPERAND: i64 = 1_000_000;

/// A question with a prose or numeric answer, optionally multiple choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionPuzzle {
    pub prompt: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub solution: String,
}

/// A number sequence whose next element is the answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencePuzzle {
    pub prompt: String,
    pub sequence: Vec<i64>,
    pub solution: String,
}

/// Operand bounds for generated arithmetic puzzles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArithmeticRange {
    pub min_operand: i64,
    pub max_operand: i64,
}

impl Default for ArithmeticRange {
    fn default() -> Self {
        Self {
            min_operand: 2,
            max_operand: 12,
        }
    }
}

/// Puzzles available to the challenge engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengePool {
    pub logic: Vec<QuestionPuzzle>,
    pub pattern: Vec<SequencePuzzle>,
    pub riddle: Vec<QuestionPuzzle>,
    pub math: ArithmeticRange,
}

impl ChallengePool {
    /// Load a pool from `path`, or the built-in pool when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let pool: Self = crate::error::load_data_file(path)?;
            let pool = pool.canonicalize()?;
            info!(
                path = %path.display(),
                logic = pool.logic.len(),
                pattern = pool.pattern.len(),
                riddle = pool.riddle.len(),
                "Loaded challenge pool"
            );
            Ok(pool)
        } else {
            debug!(path = %path.display(), "Puzzle file not found, using built-in pool");
            Ok(Self::default())
        }
    }

    /// Normalize solutions and reject puzzles that could never be solved.
    pub fn canonicalize(mut self) -> Result<Self> {
        for puzzle in self.logic.iter_mut().chain(self.riddle.iter_mut()) {
            puzzle.solution = canonical(&puzzle.prompt, &puzzle.solution)?;
        }
        for puzzle in self.pattern.iter_mut() {
            if puzzle.sequence.is_empty() {
                return Err(AiGuardError::InvalidConfig(format!(
                    "sequence puzzle `{}` has no terms",
                    puzzle.prompt
                )));
            }
            puzzle.solution = canonical(&puzzle.prompt, &puzzle.solution)?;
        }

        let math = &self.math;
        if math.min_operand > math.max_operand
            || math.min_operand.abs() > MAX_OPERAND
            || math.max_operand.abs() > MAX_OPERAND
        {
            return Err(AiGuardError::InvalidConfig(format!(
                "math operands must satisfy min <= max within +/-{}, got {}..={}",
                MAX_OPERAND, math.min_operand, math.max_operand
            )));
        }

        Ok(self)
    }
}

fn canonical(prompt: &str, solution: &str) -> Result<String> {
    if prompt.trim().is_empty() {
        return Err(AiGuardError::InvalidConfig(
            "puzzle prompt must not be empty".to_string(),
        ));
    }
    let solution = normalize_answer(solution);
    if solution.is_empty() {
        return Err(AiGuardError::InvalidConfig(format!(
            "puzzle `{}` has an empty solution",
            prompt
        )));
    }
    Ok(solution)
}

impl Default for ChallengePool {
    fn default() -> Self {
        let question = |prompt: &str, options: &[&str], solution: &str| QuestionPuzzle {
            prompt: prompt.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            solution: solution.to_string(),
        };
        let sequence = |sequence: &[i64], solution: &str| SequencePuzzle {
            prompt: "What number comes next in the sequence?".to_string(),
            sequence: sequence.to_vec(),
            solution: solution.to_string(),
        };

        Self {
            logic: vec![
                question(
                    "If all bloops are razzies and all razzies are lazzies, are all bloops definitely lazzies?",
                    &["yes", "no"],
                    "yes",
                ),
                question(
                    "A farmer has 17 sheep and all but 9 run away. How many sheep are left?",
                    &[],
                    "9",
                ),
                question(
                    "Which weighs more: a kilogram of feathers or a kilogram of iron?",
                    &["feathers", "iron", "neither"],
                    "neither",
                ),
                question(
                    "Tom is taller than Ana, and Ana is taller than Lee. Who is the shortest?",
                    &["tom", "ana", "lee"],
                    "lee",
                ),
            ],
            pattern: vec![
                sequence(&[2, 4, 8, 16], "32"),
                sequence(&[1, 1, 2, 3, 5, 8], "13"),
                sequence(&[3, 6, 9, 12], "15"),
                sequence(&[1, 4, 9, 16, 25], "36"),
            ],
            riddle: vec![
                question(
                    "I am not alive, but I grow; I don't have lungs, but I need air; I don't have a mouth, but water kills me. What am I?",
                    &[],
                    "fire",
                ),
                question("What has keys but can't open locks?", &[], "piano"),
                question("What has hands but can't clap?", &[], "clock"),
                question("What gets wetter the more it dries?", &[], "towel"),
            ],
            math: ArithmeticRange::default(),
        }
    }
}
