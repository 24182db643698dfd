//! Attack geometry shared by move generation and attack detection.
//!
//! Leaper tables (knight, king, pawn captures) are built once via `OnceLock`
//! and live for the lifetime of the process. Sliding pieces walk their rays
//! over the mailbox board and stop at the first occupied square, which is
//! included in the attack set whoever owns it.
//!
//! `attacks_from` is the single source of attack rules: the move generator
//! derives piece targets from it, and `Position::is_square_attacked` tests
//! membership in it.

use std::sync::OnceLock;

use crate::engine::board::Position;
use crate::engine::types::{Bitboard, Color, Piece, PieceType, Square};

pub const ROOK_DELTAS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
pub const BISHOP_DELTAS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_OFFSETS: [(i8, i8); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

// =========================================================================
// Leaper tables
// =========================================================================

/// Get a reference to the global leaper tables.
pub fn tables() -> &'static LeaperTables {
    static TABLES: OnceLock<LeaperTables> = OnceLock::new();
    TABLES.get_or_init(LeaperTables::init)
}

/// Pre-computed attack sets for pieces that jump to fixed offsets.
pub struct LeaperTables {
    pub knight: [Bitboard; 64],
    pub king: [Bitboard; 64],
    /// `pawn[color][square]`: squares a pawn on `square` attacks.
    pub pawn: [[Bitboard; 64]; 2],
}

impl LeaperTables {
    fn init() -> Self {
        let mut pawn = [[Bitboard::EMPTY; 64]; 2];
        for sq in Square::all() {
            pawn[Color::White.index()][sq.index()] = offsets_from(sq, &[(-1, 1), (1, 1)]);
            pawn[Color::Black.index()][sq.index()] = offsets_from(sq, &[(-1, -1), (1, -1)]);
        }
        LeaperTables {
            knight: std::array::from_fn(|i| offsets_from(Square(i as u8), &KNIGHT_OFFSETS)),
            king: std::array::from_fn(|i| offsets_from(Square(i as u8), &KING_OFFSETS)),
            pawn,
        }
    }

    #[inline]
    pub fn knight_attacks(&self, sq: Square) -> Bitboard {
        self.knight[sq.index()]
    }

    #[inline]
    pub fn king_attacks(&self, sq: Square) -> Bitboard {
        self.king[sq.index()]
    }

    #[inline]
    pub fn pawn_attacks(&self, color: Color, sq: Square) -> Bitboard {
        self.pawn[color.index()][sq.index()]
    }
}

/// Union of all on-board squares reachable by one (file, rank) offset.
fn offsets_from(sq: Square, offsets: &[(i8, i8)]) -> Bitboard {
    let mut bb = Bitboard::EMPTY;
    for &(df, dr) in offsets {
        if let Some(to) = sq.offset(df, dr) {
            bb.set(to);
        }
    }
    bb
}

// =========================================================================
// Attack sets on a concrete position
// =========================================================================

/// Squares attacked by `piece` standing on `from` in `pos`.
pub fn attacks_from(pos: &Position, from: Square, piece: Piece) -> Bitboard {
    let t = tables();
    match piece.kind {
        PieceType::Pawn => t.pawn_attacks(piece.color, from),
        PieceType::Knight => t.knight_attacks(from),
        PieceType::King => t.king_attacks(from),
        PieceType::Bishop => sliding_attacks(pos, from, &BISHOP_DELTAS),
        PieceType::Rook => sliding_attacks(pos, from, &ROOK_DELTAS),
        PieceType::Queen => {
            sliding_attacks(pos, from, &BISHOP_DELTAS) | sliding_attacks(pos, from, &ROOK_DELTAS)
        }
    }
}

/// Walk each ray from `from`, stopping at (and including) the first occupied square.
pub fn sliding_attacks(pos: &Position, from: Square, deltas: &[(i8, i8)]) -> Bitboard {
    let mut attacks = Bitboard::EMPTY;
    for &(df, dr) in deltas {
        let mut cur = from;
        while let Some(next) = cur.offset(df, dr) {
            attacks.set(next);
            if pos.piece_at(next).is_some() {
                break;
            }
            cur = next;
        }
    }
    attacks
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        Square::from_algebraic(name).unwrap()
    }

    #[test]
    fn knight_corner_and_center() {
        let t = tables();
        assert_eq!(t.knight_attacks(sq("a1")).pop_count(), 2);
        assert_eq!(t.knight_attacks(sq("e4")).pop_count(), 8);
        assert!(t.knight_attacks(sq("g1")).is_set(sq("f3")));
    }

    #[test]
    fn king_edges() {
        let t = tables();
        assert_eq!(t.king_attacks(sq("a1")).pop_count(), 3);
        assert_eq!(t.king_attacks(sq("e1")).pop_count(), 5);
        assert_eq!(t.king_attacks(sq("d5")).pop_count(), 8);
    }

    #[test]
    fn pawn_attacks_by_color() {
        let t = tables();
        let white = t.pawn_attacks(Color::White, sq("e4"));
        assert!(white.is_set(sq("d5")) && white.is_set(sq("f5")));
        let black = t.pawn_attacks(Color::Black, sq("a5"));
        assert_eq!(black.iter().collect::<Vec<_>>(), vec![sq("b4")]);
        assert!(t.pawn_attacks(Color::White, sq("c8")).is_empty());
    }

    #[test]
    fn rook_stops_at_first_blocker() {
        let pos = Position::from_fen("4k3/8/8/8/R2p4/8/8/4K3 w - - 0 1").unwrap();
        let rook = Piece::new(PieceType::Rook, Color::White);
        let atk = attacks_from(&pos, sq("a4"), rook);
        assert!(atk.is_set(sq("d4")), "blocker square is attacked");
        assert!(!atk.is_set(sq("e4")), "ray stops at the blocker");
        assert!(atk.is_set(sq("a8")));
        assert!(atk.is_set(sq("a1")));
    }

    #[test]
    fn starting_queen_is_boxed_in() {
        let pos = Position::starting();
        let queen = Piece::new(PieceType::Queen, Color::White);
        let atk = attacks_from(&pos, sq("d1"), queen);
        // Only the five adjacent own pieces.
        assert_eq!(atk.pop_count(), 5);
        assert!(!atk.is_set(sq("h5")));
    }

    #[test]
    fn square_attack_queries_use_the_same_geometry() {
        let pos = Position::starting();
        assert!(pos.is_square_attacked(sq("e3"), Color::White));
        assert!(pos.is_square_attacked(sq("f3"), Color::White));
        assert!(!pos.is_square_attacked(sq("e4"), Color::White));
        assert!(pos.is_square_attacked(sq("f6"), Color::Black));
        assert!(!pos.is_square_attacked(sq("e5"), Color::Black));
    }
}
