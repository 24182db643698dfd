//! Stateful game controller wrapping Position.
//!
//! `Game` validates and applies moves, keeps the undo record, captured-piece
//! lists and repetition hashes, and derives the game status (check,
//! checkmate, stalemate, draws) after every transition. A rejected move
//! leaves every field untouched.

use tracing::{debug, info};
use uuid::Uuid;

use crate::engine::board::{Position, UndoInfo};
use crate::engine::movegen;
use crate::engine::types::{
    ChessError, Color, DrawReason, GameStatus, Move, Piece, PieceType, Square,
};

// =========================================================================
// Records and snapshots
// =========================================================================

/// One applied move plus everything needed to take it back.
#[derive(Clone, Debug)]
pub struct MoveRecord {
    pub mv: Move,
    pub undo: UndoInfo,
    /// Status that resulted from this move.
    pub status_after: GameStatus,
}

/// Pieces removed from the board, keyed by the side that captured them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CapturedPieces {
    /// Black pieces taken by White, in capture order.
    pub white: Vec<Piece>,
    /// White pieces taken by Black, in capture order.
    pub black: Vec<Piece>,
}

impl CapturedPieces {
    pub fn by(&self, capturer: Color) -> &[Piece] {
        match capturer {
            Color::White => &self.white,
            Color::Black => &self.black,
        }
    }

    fn by_mut(&mut self, capturer: Color) -> &mut Vec<Piece> {
        match capturer {
            Color::White => &mut self.white,
            Color::Black => &mut self.black,
        }
    }
}

/// The outcome of a successful `attempt_move`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedMove {
    /// The fully-flagged move that was played.
    pub mv: Move,
    pub piece: Piece,
    pub captured: Option<Piece>,
    pub status: GameStatus,
}

/// Immutable copy of the piece placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardSnapshot {
    squares: [Option<Piece>; 64],
}

impl BoardSnapshot {
    pub fn get(&self, sq: Square) -> Option<Piece> {
        self.squares[sq.index()]
    }

    /// Every square in a1..h8 order with its occupant.
    pub fn iter(&self) -> impl Iterator<Item = (Square, Option<Piece>)> + '_ {
        Square::all().map(|sq| (sq, self.squares[sq.index()]))
    }

    /// Occupied squares only.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.iter().filter_map(|(sq, p)| p.map(|p| (sq, p)))
    }
}

// =========================================================================
// Game
// =========================================================================

/// A chess game with history, undo and status tracking.
#[derive(Clone, Debug)]
pub struct Game {
    pub id: String,

    position: Position,
    record: Vec<MoveRecord>,
    captured: CapturedPieces,
    /// Zobrist hashes of every position reached, the current one included.
    position_hashes: Vec<u64>,

    status: GameStatus,
    /// Status of the position the record starts from.
    initial_status: GameStatus,

    /// Piece a pawn becomes when the caller names none.
    default_promotion: PieceType,
}

impl Game {
    // -----------------------------------------------------------------
    // Constructors
    // -----------------------------------------------------------------

    /// Create a new game from the standard starting position.
    pub fn new() -> Self {
        let position = Position::starting();
        let hash = position.zobrist_hash;
        Self {
            id: Uuid::new_v4().to_string(),
            position,
            record: Vec::new(),
            captured: CapturedPieces::default(),
            position_hashes: vec![hash],
            status: GameStatus::Active,
            initial_status: GameStatus::Active,
            default_promotion: PieceType::Queen,
        }
    }

    /// Create a game from a FEN string.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let mut game = Self::new();
        game.load_fen(fen)?;
        Ok(game)
    }

    /// Replace the position with `fen`, clearing history and captures.
    ///
    /// The game is unchanged if the FEN is rejected.
    pub fn load_fen(&mut self, fen: &str) -> Result<(), ChessError> {
        let position = Position::from_fen(fen)?;
        let status = derive_status(&position, 1)?;
        self.position_hashes = vec![position.zobrist_hash];
        self.position = position;
        self.record.clear();
        self.captured = CapturedPieces::default();
        self.status = status.clone();
        self.initial_status = status;
        debug!(game_id = %self.id, fen, "loaded position");
        Ok(())
    }

    /// Start over from the standard position under a fresh id.
    pub fn reset(&mut self) {
        let default_promotion = self.default_promotion;
        *self = Self::new();
        self.default_promotion = default_promotion;
        info!(game_id = %self.id, "new game");
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    /// Current board position.
    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn status(&self) -> &GameStatus {
        &self.status
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move
    }

    pub fn is_game_over(&self) -> bool {
        self.status.is_game_over()
    }

    /// Applied moves, oldest first.
    pub fn record(&self) -> &[MoveRecord] {
        &self.record
    }

    pub fn captured(&self) -> &CapturedPieces {
        &self.captured
    }

    pub fn last_move(&self) -> Option<Move> {
        self.record.last().map(|r| r.mv)
    }

    pub fn default_promotion(&self) -> PieceType {
        self.default_promotion
    }

    /// Choose what an unspecified promotion becomes.
    pub fn set_default_promotion(&mut self, kind: PieceType) -> Result<(), ChessError> {
        if !kind.is_promotion_target() {
            return Err(ChessError::InvalidPromotion(kind.to_string()));
        }
        self.default_promotion = kind;
        Ok(())
    }

    /// Copy of the current placement.
    pub fn board_snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            squares: self.position.squares(),
        }
    }

    pub fn to_fen(&self) -> String {
        self.position.to_fen()
    }

    /// All legal moves in the current position.
    pub fn legal_moves(&self) -> Vec<Move> {
        movegen::legal_moves(&self.position)
    }

    /// Legal moves from a specific square.
    pub fn legal_moves_from(&self, sq: Square) -> Vec<Move> {
        movegen::legal_moves_from(&self.position, sq)
    }

    /// Distinct target squares reachable from `sq`, in generation order.
    ///
    /// The four promotion choices collapse into one destination.
    pub fn legal_destinations(&self, sq: Square) -> Vec<Square> {
        if self.is_game_over() {
            return Vec::new();
        }
        let mut out: Vec<Square> = Vec::new();
        for mv in self.legal_moves_from(sq) {
            if !out.contains(&mv.to) {
                out.push(mv.to);
            }
        }
        out
    }

    // -----------------------------------------------------------------
    // Move execution
    // -----------------------------------------------------------------

    /// Validate and play `from -> to`.
    ///
    /// `promotion` picks the piece for a promoting pawn; `None` uses the
    /// default promotion. It is ignored for moves that do not promote.
    pub fn attempt_move(
        &mut self,
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
    ) -> Result<AppliedMove, ChessError> {
        if self.status.is_game_over() {
            return Err(ChessError::TerminalStateViolation(self.status.clone()));
        }

        let us = self.position.side_to_move;
        match self.position.piece_at(from) {
            Some(p) if p.color == us => {}
            Some(_) => return Err(ChessError::illegal(from, to, "piece belongs to the opponent")),
            None => return Err(ChessError::illegal(from, to, "no piece on origin square")),
        }

        if let Some(kind) = promotion
            && !kind.is_promotion_target()
        {
            return Err(ChessError::InvalidPromotion(kind.to_string()));
        }

        let mv = self.select_move(from, to, promotion)?;

        // Work on a scratch copy so a failure leaves the game untouched.
        let mut next = self.position.clone();
        let undo = next.make_move(mv)?;
        next.validate()?;
        let repetitions = 1 + self
            .position_hashes
            .iter()
            .filter(|&&h| h == next.zobrist_hash)
            .count();
        let status = derive_status(&next, repetitions)?;

        // Commit.
        self.position = next;
        self.position_hashes.push(self.position.zobrist_hash);
        if let Some(piece) = undo.captured {
            self.captured.by_mut(us).push(piece);
        }
        let applied = AppliedMove {
            mv,
            piece: undo.moved,
            captured: undo.captured,
            status: status.clone(),
        };
        self.record.push(MoveRecord {
            mv,
            undo,
            status_after: status.clone(),
        });
        self.status = status;

        debug!(game_id = %self.id, mv = %mv, status = %self.status, "move applied");
        if self.status.is_game_over() {
            info!(game_id = %self.id, status = %self.status, "game over");
        }
        Ok(applied)
    }

    /// Match a request against the legal moves from `from`.
    fn select_move(
        &self,
        from: Square,
        to: Square,
        promotion: Option<PieceType>,
    ) -> Result<Move, ChessError> {
        let candidates: Vec<Move> = self
            .legal_moves_from(from)
            .into_iter()
            .filter(|m| m.to == to)
            .collect();

        let Some(first) = candidates.first() else {
            return Err(ChessError::illegal(from, to, "destination is not a legal target"));
        };
        if first.promotion.is_none() {
            return Ok(*first);
        }

        let wanted = promotion.unwrap_or(self.default_promotion);
        candidates
            .iter()
            .find(|m| m.promotion == Some(wanted))
            .copied()
            .ok_or_else(|| ChessError::InvalidPromotion(wanted.to_string()))
    }

    /// Take back the last move. `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Option<Move> {
        let record = self.record.pop()?;
        self.position.undo_move(record.mv, &record.undo);
        self.position_hashes.pop();
        if record.undo.captured.is_some() {
            self.captured.by_mut(record.undo.moved.color).pop();
        }
        self.status = self
            .record
            .last()
            .map(|r| r.status_after.clone())
            .unwrap_or_else(|| self.initial_status.clone());
        debug!(game_id = %self.id, mv = %record.mv, "move undone");
        Some(record.mv)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Status detection
// =========================================================================

/// Status of `pos`, given how many times its hash has occurred so far
/// (itself included).
pub fn derive_status(pos: &Position, repetitions: usize) -> Result<GameStatus, ChessError> {
    let has_moves = !movegen::legal_moves(pos).is_empty();
    let in_check = pos.is_in_check()?;

    let status = match (in_check, has_moves) {
        (true, false) => GameStatus::Checkmate,
        (true, true) => GameStatus::Check,
        (false, false) => GameStatus::Stalemate,
        (false, true) => {
            if pos.halfmove_clock >= 100 {
                GameStatus::Draw(DrawReason::FiftyMoveRule)
            } else if repetitions >= 3 {
                GameStatus::Draw(DrawReason::ThreefoldRepetition)
            } else if is_insufficient_material(pos) {
                GameStatus::Draw(DrawReason::InsufficientMaterial)
            } else {
                GameStatus::Active
            }
        }
    };
    Ok(status)
}

/// K v K, K+minor v K, and K+B v K+B with bishops on same-coloured squares.
pub fn is_insufficient_material(pos: &Position) -> bool {
    let mut minors = [0u8; 2];
    let mut bishop_squares: [Option<Square>; 2] = [None, None];

    for (sq, piece) in pos.occupied() {
        match piece.kind {
            PieceType::King => {}
            PieceType::Pawn | PieceType::Rook | PieceType::Queen => return false,
            PieceType::Knight => minors[piece.color.index()] += 1,
            PieceType::Bishop => {
                minors[piece.color.index()] += 1;
                bishop_squares[piece.color.index()] = Some(sq);
            }
        }
    }

    match (minors[0], minors[1]) {
        (0, 0) | (1, 0) | (0, 1) => true,
        (1, 1) => match (bishop_squares[0], bishop_squares[1]) {
            (Some(w), Some(b)) => w.is_light() == b.is_light(),
            _ => false,
        },
        _ => false,
    }
}

// =========================================================================
// Tests
// =========================================================================
