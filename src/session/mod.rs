//! Game session: the surface a presentation layer talks to.
//!
//! `GameSession` wraps a `Game` with the interactive concerns around it:
//! square selection and highlighting, the automated opponent toggle, and
//! automated turns that the caller may delay and that become stale as soon
//! as the game changes underneath them.

pub mod models;

use tracing::{debug, error, info};

use crate::ai::{AiEngine, HeuristicAi};
use crate::config::AppConfig;
use crate::engine::game::{AppliedMove, BoardSnapshot, CapturedPieces, Game};
use crate::engine::types::{ChessError, Color, GameStatus, Move, PieceType, Square};

pub use models::SessionState;

/// What a square click did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// An own piece is now selected; these are its destinations.
    Selected {
        square: Square,
        destinations: Vec<Square>,
    },
    /// The selection was cleared.
    Deselected,
    /// The click completed a move.
    Moved(AppliedMove),
    /// The click had no effect (game over, opponent's turn, or nothing to select).
    Ignored,
}

/// Permission to play one automated move against the state it was issued for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AutomatedTurn {
    generation: u64,
}

/// One game plus its interactive state.
pub struct GameSession {
    game: Game,
    engine: Box<dyn AiEngine>,
    automated_opponent: bool,
    automated_color: Color,

    selected: Option<Square>,
    destinations: Vec<Square>,

    /// Bumped on every change; outstanding tickets from older generations are void.
    generation: u64,
    thinking: bool,
}

impl GameSession {
    /// Session configured from `config`, with a `HeuristicAi` opponent.
    pub fn new(config: &AppConfig) -> Self {
        let mut session = Self::with_engine(
            Box::new(HeuristicAi::new(config.ai_seed)),
            config.automated_opponent,
            config.automated_color,
        );
        if let Err(e) = session.game.set_default_promotion(config.default_promotion) {
            error!(error = %e, "ignoring configured default promotion");
        }
        session
    }

    pub fn with_engine(
        engine: Box<dyn AiEngine>,
        automated_opponent: bool,
        automated_color: Color,
    ) -> Self {
        let game = Game::new();
        info!(
            game_id = %game.id,
            engine = engine.name(),
            automated_opponent,
            automated_color = %automated_color,
            "session started"
        );
        Self {
            game,
            engine,
            automated_opponent,
            automated_color,
            selected: None,
            destinations: Vec::new(),
            generation: 0,
            thinking: false,
        }
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn current_board(&self) -> BoardSnapshot {
        self.game.board_snapshot()
    }

    pub fn status(&self) -> &GameStatus {
        self.game.status()
    }

    pub fn side_to_move(&self) -> Color {
        self.game.side_to_move()
    }

    pub fn captured_pieces(&self) -> &CapturedPieces {
        self.game.captured()
    }

    pub fn last_move(&self) -> Option<Move> {
        self.game.last_move()
    }

    pub fn selected_square(&self) -> Option<Square> {
        self.selected
    }

    pub fn automated_opponent(&self) -> bool {
        self.automated_opponent
    }

    pub fn automated_color(&self) -> Color {
        self.automated_color
    }

    /// An automated turn has been issued and not yet played or voided.
    pub fn is_thinking(&self) -> bool {
        self.thinking
    }

    /// Is it the automated opponent's move in a live game?
    pub fn automated_to_move(&self) -> bool {
        self.automated_opponent
            && self.game.side_to_move() == self.automated_color
            && !self.game.is_game_over()
    }

    pub fn legal_destinations(&self, sq: Square) -> Vec<Square> {
        self.game.legal_destinations(sq)
    }

    /// Serializable snapshot of the whole session.
    pub fn state(&self) -> SessionState {
        let status = self.game.status();
        SessionState {
            id: self.game.id.clone(),
            board: models::board_to_map(&self.game.board_snapshot()),
            fen: self.game.to_fen(),
            status: status.as_str().to_string(),
            draw_reason: models::draw_reason(status),
            current_player: self.game.side_to_move().to_string(),
            captured_pieces: models::captured_to_view(self.game.captured()),
            last_move: self.game.last_move().map(models::last_move_view),
            selected_square: self.selected.map(|sq| sq.to_algebraic()),
            valid_moves: self.destinations.iter().map(|sq| sq.to_algebraic()).collect(),
            automated_opponent: self.automated_opponent,
            automated_color: self.automated_color.to_string(),
            automated_thinking: self.thinking,
        }
    }

    // -----------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------

    /// Play a move for the human side.
    pub fn attempt_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
    ) -> Result<AppliedMove, ChessError> {
        if self.game.is_game_over() {
            return Err(ChessError::TerminalStateViolation(self.game.status().clone()));
        }
        if self.automated_to_move() {
            return Err(ChessError::OpponentToMove);
        }
        self.apply(from, to, promotion)
    }

    /// Click on `sq`: select, reselect, deselect, or move to a highlighted square.
    pub fn select_square(&mut self, sq: Square) -> Result<Selection, ChessError> {
        if self.game.is_game_over() || self.automated_to_move() {
            return Ok(Selection::Ignored);
        }

        if let Some(current) = self.selected {
            if current == sq {
                self.clear_selection();
                return Ok(Selection::Deselected);
            }
            if self.destinations.contains(&sq) {
                let applied = self.apply(current, sq, None)?;
                return Ok(Selection::Moved(applied));
            }
        }

        let own_piece = self
            .game
            .position()
            .piece_at(sq)
            .is_some_and(|p| p.color == self.game.side_to_move());
        if own_piece {
            self.selected = Some(sq);
            self.destinations = self.game.legal_destinations(sq);
            return Ok(Selection::Selected {
                square: sq,
                destinations: self.destinations.clone(),
            });
        }

        if self.selected.is_some() {
            self.clear_selection();
            Ok(Selection::Deselected)
        } else {
            Ok(Selection::Ignored)
        }
    }

    /// Take back moves actually present in the record: one, then more while
    /// it is the automated side's turn. Returns the moves undone, latest first.
    pub fn undo(&mut self) -> Vec<Move> {
        let mut undone = Vec::new();
        if let Some(mv) = self.game.undo() {
            undone.push(mv);
        }
        while self.automated_opponent
            && self.game.side_to_move() == self.automated_color
            && let Some(mv) = self.game.undo()
        {
            undone.push(mv);
        }
        if !undone.is_empty() {
            self.invalidate();
            debug!(game_id = %self.game.id, count = undone.len(), "undo");
        }
        undone
    }

    /// Discard the game and start a new one. Outstanding automated turns are voided.
    pub fn reset(&mut self) {
        self.game.reset();
        self.invalidate();
    }

    /// Replace the position from FEN; history and captures are cleared.
    pub fn load_fen(&mut self, fen: &str) -> Result<(), ChessError> {
        self.game.load_fen(fen)?;
        self.invalidate();
        Ok(())
    }

    pub fn set_automated_opponent(&mut self, enabled: bool) {
        self.automated_opponent = enabled;
        self.invalidate();
        info!(game_id = %self.game.id, enabled, "automated opponent toggled");
    }

    pub fn set_automated_color(&mut self, color: Color) {
        self.automated_color = color;
        self.invalidate();
    }

    // -----------------------------------------------------------------
    // Automated turns
    // -----------------------------------------------------------------

    /// Issue a ticket if the automated opponent should move now.
    ///
    /// The caller may wait before redeeming it with `play_automated_turn`;
    /// any change to the session in between voids it.
    pub fn automated_turn(&mut self) -> Option<AutomatedTurn> {
        if !self.automated_to_move() {
            return None;
        }
        self.thinking = true;
        Some(AutomatedTurn {
            generation: self.generation,
        })
    }

    /// Play the automated move for `ticket`. A stale ticket is discarded
    /// and yields `Ok(None)`.
    pub fn play_automated_turn(
        &mut self,
        ticket: AutomatedTurn,
    ) -> Result<Option<AppliedMove>, ChessError> {
        if ticket.generation != self.generation || !self.automated_to_move() {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale automated turn"
            );
            return Ok(None);
        }

        let result = self
            .engine
            .choose_move(self.game.position())
            .and_then(|mv| self.apply(mv.from, mv.to, mv.promotion));
        let applied = match result {
            Ok(applied) => applied,
            Err(e) => {
                self.thinking = false;
                return Err(e);
            }
        };
        debug!(game_id = %self.game.id, engine = self.engine.name(), mv = %applied.mv, "automated move");
        Ok(Some(applied))
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    fn apply(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
    ) -> Result<AppliedMove, ChessError> {
        match self.game.attempt_move(from, to, promotion) {
            Ok(applied) => {
                self.invalidate();
                Ok(applied)
            }
            Err(e) => {
                if e.is_fatal() {
                    error!(game_id = %self.game.id, error = %e, "session aborted");
                }
                Err(e)
            }
        }
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.destinations.clear();
    }

    /// Every state change drops the selection and voids outstanding tickets.
    fn invalidate(&mut self) {
        self.clear_selection();
        self.generation += 1;
        self.thinking = false;
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

// =========================================================================
// Tests
// =========================================================================
