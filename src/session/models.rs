use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::engine::game::{BoardSnapshot, CapturedPieces};
use crate::engine::types::{GameStatus, Move, Piece};

// ---------------------------------------------------------------------------
// Snapshot models
// ---------------------------------------------------------------------------

/// Everything a presentation layer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub id: String,
    /// Square name ("e4") to piece code ("pw") or null, for all 64 squares.
    pub board: BTreeMap<String, Option<String>>,
    pub fen: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub draw_reason: Option<String>,
    pub current_player: String,
    pub captured_pieces: CapturedPiecesView,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub last_move: Option<LastMove>,
    pub selected_square: Option<String>,
    pub valid_moves: Vec<String>,
    pub automated_opponent: bool,
    pub automated_color: String,
    pub automated_thinking: bool,
}

/// Piece codes keyed by the side that captured them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedPiecesView {
    pub white: Vec<String>,
    pub black: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastMove {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub promotion: Option<String>,
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

pub fn board_to_map(board: &BoardSnapshot) -> BTreeMap<String, Option<String>> {
    board
        .iter()
        .map(|(sq, piece)| (sq.to_algebraic(), piece.map(Piece::code)))
        .collect()
}

pub fn captured_to_view(captured: &CapturedPieces) -> CapturedPiecesView {
    CapturedPiecesView {
        white: captured.white.iter().map(|p| p.code()).collect(),
        black: captured.black.iter().map(|p| p.code()).collect(),
    }
}

pub fn last_move_view(mv: Move) -> LastMove {
    LastMove {
        from: mv.from.to_algebraic(),
        to: mv.to.to_algebraic(),
        promotion: mv.promotion.map(|kind| kind.to_string()),
    }
}

pub fn draw_reason(status: &GameStatus) -> Option<String> {
    match status {
        GameStatus::Draw(reason) => Some(reason.as_str().to_string()),
        _ => None,
    }
}
