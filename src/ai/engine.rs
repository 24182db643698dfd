//! AI engine: trait definition and HeuristicAi.
//!
//! The `AiEngine` trait defines the interface for automated opponents.
//! `HeuristicAi` plays a uniformly random capture when one exists and a
//! uniformly random legal move otherwise. Its generator is owned by the
//! engine instance, so a fixed seed replays the same choices.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::engine::board::Position;
use crate::engine::movegen::legal_moves;
use crate::engine::types::{ChessError, GameStatus, Move};

// =========================================================================
// AiEngine trait
// =========================================================================

/// The automated opponent interface.
pub trait AiEngine: Send {
    /// Pick a legal move for the side to move in `pos`.
    fn choose_move(&mut self, pos: &Position) -> Result<Move, ChessError>;

    /// Human-readable name for this engine.
    fn name(&self) -> &str;
}

// =========================================================================
// HeuristicAi
// =========================================================================

/// Capture-preferring random mover.
pub struct HeuristicAi {
    rng: StdRng,
}

impl HeuristicAi {
    /// Seeded for reproducible play, or from OS entropy when `seed` is `None`.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl Default for HeuristicAi {
    fn default() -> Self {
        Self::new(None)
    }
}

impl AiEngine for HeuristicAi {
    fn choose_move(&mut self, pos: &Position) -> Result<Move, ChessError> {
        let moves = legal_moves(pos);
        let captures: Vec<Move> = moves.iter().copied().filter(Move::is_capture).collect();

        let pool = if captures.is_empty() { &moves } else { &captures };
        let mv = pool.choose(&mut self.rng).copied().ok_or_else(|| {
            let status = if pos.is_in_check().unwrap_or(false) {
                GameStatus::Checkmate
            } else {
                GameStatus::Stalemate
            };
            ChessError::TerminalStateViolation(status)
        })?;

        debug!(
            mv = %mv,
            candidates = pool.len(),
            captures = captures.len(),
            "heuristic move chosen"
        );
        Ok(mv)
    }

    fn name(&self) -> &str {
        "HeuristicAi"
    }
}

// =========================================================================
// Tests
// =========================================================================
