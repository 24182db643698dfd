//! Mailbox position: one `Option<Piece>` per square plus the FEN state
//! fields and an incrementally maintained Zobrist hash.

use std::fmt;

use crate::engine::attacks;
use crate::engine::types::{CastlingRights, ChessError, Color, Move, Piece, PieceType, Square};
use crate::engine::zobrist;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// What `make_move` overwrote, so `undo_move` can put it back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UndoInfo {
    pub moved: Piece,
    pub captured: Option<Piece>,
    pub castling_rights: CastlingRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
    pub zobrist_hash: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    board: [Option<Piece>; 64],
    pub side_to_move: Color,
    pub castling_rights: CastlingRights,
    /// Square passed over by the last double push, kept only while a pawn
    /// of the side to move stands beside the pushed pawn.
    pub en_passant: Option<Square>,
    /// Plies since the last pawn move or capture.
    pub halfmove_clock: u16,
    pub fullmove_number: u16,
    /// Covers placement, side to move, castling rights and the ep file.
    pub zobrist_hash: u64,
}

impl Position {
    pub fn empty() -> Self {
        Position {
            board: [None; 64],
            side_to_move: Color::White,
            castling_rights: CastlingRights::NONE,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            zobrist_hash: 0,
        }
    }

    pub fn starting() -> Self {
        Self::from_fen(STARTING_FEN).expect("starting FEN is always valid")
    }

    #[inline]
    pub fn piece_at(&self, sq: Square) -> Option<Piece> {
        self.board[sq.index()]
    }

    /// Overwrite `sq` and return its previous occupant, updating the hash.
    pub fn set_piece(&mut self, sq: Square, piece: Option<Piece>) -> Option<Piece> {
        let keys = zobrist::keys();
        let old = std::mem::replace(&mut self.board[sq.index()], piece);
        for p in old.iter().chain(piece.iter()) {
            self.zobrist_hash ^= keys.piece_key(*p, sq);
        }
        old
    }

    fn take_piece(&mut self, sq: Square) -> Option<Piece> {
        self.set_piece(sq, None)
    }

    /// Occupied squares in a1..h8 order.
    pub fn occupied(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| self.piece_at(sq).map(|p| (sq, p)))
    }

    /// One side's pieces in a1..h8 order.
    pub fn pieces_of(&self, color: Color) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.occupied().filter(move |(_, p)| p.color == color)
    }

    pub fn squares(&self) -> [Option<Piece>; 64] {
        self.board
    }

    /// The unique king of `color`. Zero or two kings is fatal.
    pub fn king_square(&self, color: Color) -> Result<Square, ChessError> {
        let king = Piece::new(PieceType::King, color);
        let mut kings = self.occupied().filter(|&(_, p)| p == king).map(|(sq, _)| sq);
        match (kings.next(), kings.next()) {
            (Some(sq), None) => Ok(sq),
            (None, _) => Err(ChessError::InvariantViolation(format!("{color} king is missing"))),
            (Some(a), Some(b)) => Err(ChessError::InvariantViolation(format!(
                "{color} has kings on {a} and {b}"
            ))),
        }
    }

    /// Both sides have exactly one king.
    pub fn validate(&self) -> Result<(), ChessError> {
        self.king_square(Color::White)
            .and(self.king_square(Color::Black))
            .map(|_| ())
    }

    /// Hash of the position built from nothing; must equal `zobrist_hash`.
    pub fn compute_zobrist(&self) -> u64 {
        let keys = zobrist::keys();
        let placement = self
            .occupied()
            .fold(0u64, |h, (sq, p)| h ^ keys.piece_key(p, sq));
        let side = match self.side_to_move {
            Color::White => 0,
            Color::Black => keys.side_key(),
        };
        let ep = self.en_passant.map_or(0, |sq| keys.ep_key(sq.file()));
        placement ^ side ^ ep ^ keys.castling_key(self.castling_rights.0)
    }

    /// Whether any piece of `by` attacks `sq`.
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        self.pieces_of(by)
            .any(|(from, piece)| attacks::attacks_from(self, from, piece).is_set(sq))
    }

    pub fn is_in_check(&self) -> Result<bool, ChessError> {
        let king = self.king_square(self.side_to_move)?;
        Ok(self.is_square_attacked(king, !self.side_to_move))
    }

    /// Play a generated move in place.
    ///
    /// Legality is not checked here. An origin that does not hold a piece of
    /// the side to move is reported as an invariant violation and the
    /// position is left unchanged.
    pub fn make_move(&mut self, mv: Move) -> Result<UndoInfo, ChessError> {
        let keys = zobrist::keys();
        let us = self.side_to_move;

        let moved = self
            .piece_at(mv.from)
            .filter(|p| p.color == us)
            .ok_or_else(|| {
                ChessError::InvariantViolation(format!("{mv}: {} holds no {us} piece", mv.from))
            })?;
        let rook_hop = if mv.flags.is_castling() {
            Some(castling_rook_squares(mv.to)?)
        } else {
            None
        };

        let saved = UndoInfo {
            moved,
            captured: None,
            castling_rights: self.castling_rights,
            en_passant: self.en_passant,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            zobrist_hash: self.zobrist_hash,
        };

        if let Some(ep) = self.en_passant.take() {
            self.zobrist_hash ^= keys.ep_key(ep.file());
        }

        let captured = self.take_piece(capture_square(mv));
        self.take_piece(mv.from);
        let landing = mv.promotion.map_or(moved, |kind| Piece::new(kind, us));
        self.set_piece(mv.to, Some(landing));

        if let Some((rook_from, rook_to)) = rook_hop {
            let rook = self.take_piece(rook_from);
            self.set_piece(rook_to, rook);
        }

        self.zobrist_hash ^= keys.castling_key(self.castling_rights.0);
        self.castling_rights.0 &= CASTLING_MASK[mv.from.index()] & CASTLING_MASK[mv.to.index()];
        self.zobrist_hash ^= keys.castling_key(self.castling_rights.0);

        if mv.flags.is_double_push() {
            let skipped = Square::from_file_rank(mv.from.file(), (mv.from.rank() + mv.to.rank()) / 2);
            if self.en_passant_capturable(skipped, !us) {
                self.en_passant = Some(skipped);
                self.zobrist_hash ^= keys.ep_key(skipped.file());
            }
        }

        // Clocks saturate so any FEN-supplied value can still be played on.
        self.halfmove_clock = if moved.kind == PieceType::Pawn || captured.is_some() {
            0
        } else {
            self.halfmove_clock.saturating_add(1)
        };
        if us == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }
        self.side_to_move = !us;
        self.zobrist_hash ^= keys.side_key();

        Ok(UndoInfo { captured, ..saved })
    }

    /// Take back `mv`, which must be the last move made with `make_move`.
    pub fn undo_move(&mut self, mv: Move, undo: &UndoInfo) {
        self.board[mv.to.index()] = None;
        self.board[capture_square(mv).index()] = undo.captured;
        self.board[mv.from.index()] = Some(undo.moved);

        if mv.flags.is_castling()
            && let Ok((rook_from, rook_to)) = castling_rook_squares(mv.to)
        {
            self.board.swap(rook_from.index(), rook_to.index());
        }

        self.side_to_move = undo.moved.color;
        self.castling_rights = undo.castling_rights;
        self.en_passant = undo.en_passant;
        self.halfmove_clock = undo.halfmove_clock;
        self.fullmove_number = undo.fullmove_number;
        self.zobrist_hash = undo.zobrist_hash;
    }

    /// Whether a pawn of `capturer` stands beside the pawn that just passed
    /// over `target`.
    fn en_passant_capturable(&self, target: Square, capturer: Color) -> bool {
        let Some(pushed) = target.offset(0, -capturer.forward()) else {
            return false;
        };
        let pawn = Some(Piece::new(PieceType::Pawn, capturer));
        [-1, 1]
            .into_iter()
            .filter_map(|df| pushed.offset(df, 0))
            .any(|sq| self.piece_at(sq) == pawn)
    }

    /// Text diagram, rank 8 on top, '.' for empty squares.
    pub fn board_string(&self) -> String {
        let mut rows: Vec<String> = (0..8u8)
            .rev()
            .map(|rank| {
                let cells: Vec<String> = (0..8u8)
                    .map(|file| {
                        self.piece_at(Square::from_file_rank(file, rank))
                            .map_or('.', Piece::fen_char)
                            .to_string()
                    })
                    .collect();
                format!("{} {}", rank + 1, cells.join(" "))
            })
            .collect();
        rows.push("  a b c d e f g h".to_string());
        rows.join("\n")
    }
}

/// Where the captured piece of `mv` stands. Differs from `mv.to` only for
/// en passant.
fn capture_square(mv: Move) -> Square {
    if mv.flags.is_en_passant() {
        Square::from_file_rank(mv.to.file(), mv.from.rank())
    } else {
        mv.to
    }
}

/// Rook origin and destination for a castling king landing on `king_to`.
pub(crate) fn castling_rook_squares(king_to: Square) -> Result<(Square, Square), ChessError> {
    let rank = king_to.rank();
    match (king_to.file(), rank) {
        (6, 0 | 7) => Ok((Square::from_file_rank(7, rank), Square::from_file_rank(5, rank))),
        (2, 0 | 7) => Ok((Square::from_file_rank(0, rank), Square::from_file_rank(3, rank))),
        _ => Err(ChessError::InvariantViolation(format!(
            "castling king cannot land on {king_to}"
        ))),
    }
}

/// Rights that survive a move touching each square. A move clears the
/// rights tied to its origin and its destination, so a captured rook on its
/// home square costs its owner that side.
const CASTLING_MASK: [u8; 64] = {
    let mut mask = [CastlingRights::ALL.0; 64];
    let mut side = 0;
    while side < 2 {
        let (color, home) = if side == 0 {
            (Color::White, 0)
        } else {
            (Color::Black, 56)
        };
        let short = CastlingRights::kingside(color);
        let long = CastlingRights::queenside(color);
        mask[home] &= !long;
        mask[home + 4] &= !(short | long);
        mask[home + 7] &= !short;
        side += 1;
    }
    mask
};

impl Position {
    /// Parse all six FEN fields. The result always has one king per side.
    pub fn from_fen(fen: &str) -> Result<Self, ChessError> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        let &[placement, side, castling, ep, halfmove, fullmove] = fields.as_slice() else {
            return Err(bad_fen(format!("need 6 fields, found {}", fields.len())));
        };

        let mut pos = Position::empty();
        pos.read_placement(placement)?;
        pos.validate().map_err(|e| bad_fen(e.to_string()))?;

        pos.side_to_move = match side {
            "w" => Color::White,
            "b" => Color::Black,
            _ => return Err(bad_fen(format!("side to move {side:?}"))),
        };
        pos.castling_rights =
            CastlingRights::from_fen(castling).ok_or_else(|| bad_fen(format!("castling {castling:?}")))?;
        if ep != "-" {
            let target = pos
                .en_passant_target(ep)
                .ok_or_else(|| bad_fen(format!("en passant square {ep:?}")))?;
            // A target nobody can use is dropped, as it would be after play.
            let usable = pos.en_passant_capturable(target, pos.side_to_move);
            pos.en_passant = usable.then_some(target);
        }
        pos.halfmove_clock = halfmove
            .parse()
            .map_err(|_| bad_fen(format!("halfmove clock {halfmove:?}")))?;
        pos.fullmove_number = match fullmove.parse::<u16>() {
            Ok(n) if n >= 1 => n,
            _ => return Err(bad_fen(format!("fullmove number {fullmove:?}"))),
        };

        pos.zobrist_hash = pos.compute_zobrist();
        Ok(pos)
    }

    /// A target behind an enemy pawn that could have just double-pushed:
    /// rank 6 with White to move, rank 3 with Black to move.
    fn en_passant_target(&self, ep: &str) -> Option<Square> {
        let us = self.side_to_move;
        let target = Square::from_algebraic(ep)?;
        let expected_rank = match us {
            Color::White => 5,
            Color::Black => 2,
        };
        let pushed = target.offset(0, -us.forward())?;
        let ok = target.rank() == expected_rank
            && self.piece_at(target).is_none()
            && self.piece_at(pushed) == Some(Piece::new(PieceType::Pawn, !us));
        ok.then_some(target)
    }

    fn read_placement(&mut self, placement: &str) -> Result<(), ChessError> {
        let rows: Vec<&str> = placement.split('/').collect();
        if rows.len() != 8 {
            return Err(bad_fen(format!("need 8 ranks, found {}", rows.len())));
        }
        for (rank, row) in (0..8u8).rev().zip(rows) {
            let mut file = 0u8;
            for c in row.chars() {
                match (c.to_digit(10), Piece::from_fen_char(c)) {
                    (Some(n @ 1..=8), _) => file += n as u8,
                    (None, Some(piece)) if file < 8 => {
                        self.set_piece(Square::from_file_rank(file, rank), Some(piece));
                        file += 1;
                    }
                    _ => return Err(bad_fen(format!("unexpected {c:?} on rank {}", rank + 1))),
                }
            }
            if file != 8 {
                return Err(bad_fen(format!("rank {} spans {file} files", rank + 1)));
            }
        }
        Ok(())
    }

    pub fn to_fen(&self) -> String {
        let rows: Vec<String> = (0..8u8)
            .rev()
            .map(|rank| {
                let mut row = String::new();
                let mut gap = 0;
                for file in 0..8 {
                    match self.piece_at(Square::from_file_rank(file, rank)) {
                        None => gap += 1,
                        Some(p) => {
                            if gap > 0 {
                                row.push_str(&gap.to_string());
                                gap = 0;
                            }
                            row.push(p.fen_char());
                        }
                    }
                }
                if gap > 0 {
                    row.push_str(&gap.to_string());
                }
                row
            })
            .collect();
        let ep = self.en_passant.map_or_else(|| "-".to_string(), |sq| sq.to_algebraic());
        format!(
            "{} {} {} {} {} {}",
            rows.join("/"),
            self.side_to_move.letter(),
            self.castling_rights,
            ep,
            self.halfmove_clock,
            self.fullmove_number
        )
    }
}

fn bad_fen(detail: String) -> ChessError {
    ChessError::InvalidFen(detail)
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.board_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::MoveFlags;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn white(kind: PieceType) -> Option<Piece> {
        Some(Piece::new(kind, Color::White))
    }

    fn black(kind: PieceType) -> Option<Piece> {
        Some(Piece::new(kind, Color::Black))
    }

    /// Make `mv`, run `check`, undo, and confirm nothing is left behind.
    fn make_and_undo(fen: &str, mv: Move, check: impl FnOnce(&Position, &UndoInfo)) {
        let mut pos = Position::from_fen(fen).unwrap();
        let before = pos.clone();
        let undo = pos.make_move(mv).unwrap();
        assert_eq!(pos.zobrist_hash, pos.compute_zobrist(), "hash drift after {mv}");
        check(&pos, &undo);
        pos.undo_move(mv, &undo);
        assert_eq!(pos, before, "undo of {mv} did not restore {fen}");
    }

    #[test]
    fn starting_layout() {
        let pos = Position::starting();
        assert_eq!(pos.to_fen(), STARTING_FEN);
        assert_eq!(pos.occupied().count(), 32);
        assert_eq!(pos.pieces_of(Color::White).count(), 16);
        assert_eq!(pos.piece_at(sq("d1")), white(PieceType::Queen));
        assert_eq!(pos.piece_at(sq("g8")), black(PieceType::Knight));
        assert!(Square::all()
            .filter(|s| (2..6).contains(&s.rank()))
            .all(|s| pos.piece_at(s).is_none()));
    }

    #[test]
    fn fen_survives_a_round_trip() {
        for fen in [
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
            "4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2",
            "8/8/8/8/8/8/1k6/K7 b - - 57 93",
        ] {
            assert_eq!(Position::from_fen(fen).unwrap().to_fen(), fen);
        }
    }

    #[test]
    fn set_piece_tracks_the_hash() {
        let mut pos = Position::starting();
        let pawn = pos.set_piece(sq("e2"), None);
        assert_eq!(pawn, white(PieceType::Pawn));
        pos.set_piece(sq("e4"), pawn);
        assert_eq!(pos.zobrist_hash, pos.compute_zobrist());
        assert_ne!(pos.zobrist_hash, Position::starting().zobrist_hash);
    }

    #[test]
    fn exactly_one_king_each() {
        let pos = Position::starting();
        assert_eq!(pos.king_square(Color::Black).unwrap(), sq("e8"));

        let mut kingless = pos.clone();
        kingless.set_piece(sq("e8"), None);
        assert!(kingless.validate().unwrap_err().is_fatal());

        let mut crowded = pos;
        crowded.set_piece(sq("a4"), white(PieceType::King));
        let err = crowded.king_square(Color::White).unwrap_err();
        assert!(matches!(err, ChessError::InvariantViolation(ref m) if m.contains("a4")));
    }

    #[test]
    fn malformed_fen_is_rejected() {
        for fen in [
            "",
            "8/8/8/8/8/8/8/8 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K2K w - - 0 1",
            "4k3/8/8/8/8/8/8/4K3 x - - 0 1",
            "4k3/8/8/8/8/8/8/4K3 w KX - 0 1",
            "4k3/8/8/8/8/8/8/4K3 w - e4 0 1",
            "4k3/8/8/8/4P3/8/8/4K3 w - e3 0 1",
            "4k3/8/8/3pP3/8/8/8/4K3 b - d6 0 2",
            "4k3/8/8/8/8/8/8/4K3 w - e6 0 1",
            "4k3/8/4p3/4p3/8/8/8/4K3 w - e6 0 1",
            "4k3/8/8/8/8/8/8/4K3 w - - -1 1",
            "4k3/8/8/8/8/8/8/4K3 w - - 0 0",
            "4k3/8/8/9/8/8/8/4K3 w - - 0 1",
            "4k3/8/8/8/8/8/8/4K3p w - - 0 1",
            "4k3/8/8/8/8/8/4K3 w - - 0 1",
        ] {
            let err = Position::from_fen(fen).unwrap_err();
            assert_eq!(err.code(), "INVALID_FEN", "{fen}");
        }
    }

    #[test]
    fn rook_lines_and_check() {
        let pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        assert!(pos.is_square_attacked(sq("a8"), Color::White));
        assert!(pos.is_square_attacked(sq("d1"), Color::White));
        assert!(!pos.is_square_attacked(sq("b3"), Color::White));
        assert!(!pos.is_in_check().unwrap());

        let checked = Position::from_fen("4k3/8/8/8/8/8/8/4K2r w - - 0 1").unwrap();
        assert!(checked.is_in_check().unwrap());
    }

    #[test]
    fn double_push_opens_en_passant() {
        let mv = Move::with_flags(sq("c7"), sq("c5"), MoveFlags::DOUBLE_PUSH);
        make_and_undo("4k3/2p5/8/3P4/8/8/8/4K3 b - - 4 9", mv, |pos, _| {
            assert_eq!(pos.en_passant, Some(sq("c6")));
            assert_eq!(pos.to_fen(), "4k3/8/8/2pP4/8/8/8/4K3 w - c6 0 10");
            assert_eq!(pos.halfmove_clock, 0);
            assert_eq!(pos.fullmove_number, 10);
        });
        // Nobody beside the pawn: no target, and the hash matches a plain move.
        make_and_undo("4k3/2p5/8/8/3P4/8/8/4K3 b - - 4 9", mv, |pos, _| {
            assert_eq!(pos.en_passant, None);
            assert_eq!(pos.to_fen(), "4k3/8/8/2p5/3P4/8/8/4K3 w - - 0 10");
            let same = Position::from_fen("4k3/8/8/2p5/3P4/8/8/4K3 w - - 0 10").unwrap();
            assert_eq!(pos.zobrist_hash, same.zobrist_hash);
        });
    }

    #[test]
    fn unusable_fen_target_is_dropped() {
        let pos = Position::from_fen("4k3/8/8/8/4P3/8/8/4K3 b - e3 0 1").unwrap();
        assert_eq!(pos.en_passant, None);
        assert_eq!(pos.to_fen(), "4k3/8/8/8/4P3/8/8/4K3 b - - 0 1");
        let usable = Position::from_fen("4k3/8/8/8/3pP3/8/8/4K3 b - e3 0 1").unwrap();
        assert_eq!(usable.en_passant, Some(sq("e3")));
    }

    #[test]
    fn clocks_saturate_at_their_limit() {
        let king_step = Move::new(sq("e8"), sq("d8"));
        make_and_undo("4k3/8/8/8/8/8/R7/4K3 b - - 0 65535", king_step, |pos, _| {
            assert_eq!(pos.fullmove_number, u16::MAX);
            assert_eq!(pos.halfmove_clock, 1);
        });
        let rook_step = Move::new(sq("a2"), sq("b2"));
        make_and_undo("4k3/8/8/8/8/8/R7/4K3 w - - 65535 1", rook_step, |pos, _| {
            assert_eq!(pos.halfmove_clock, u16::MAX);
            assert_eq!(pos.fullmove_number, 1);
        });
    }

    #[test]
    fn en_passant_removes_the_passed_pawn() {
        let mv = Move::with_flags(sq("e5"), sq("d6"), MoveFlags::CAPTURE | MoveFlags::EN_PASSANT);
        make_and_undo("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2", mv, |pos, undo| {
            assert_eq!(undo.captured, black(PieceType::Pawn));
            assert_eq!(pos.piece_at(sq("d5")), None);
            assert_eq!(pos.piece_at(sq("d6")), white(PieceType::Pawn));
        });
    }

    #[test]
    fn castling_carries_the_rook() {
        let fen = "r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1";
        let long = Move::with_flags(sq("e8"), sq("c8"), MoveFlags::CASTLING);
        make_and_undo(fen, long, |pos, _| {
            assert_eq!(pos.piece_at(sq("d8")), black(PieceType::Rook));
            assert_eq!(pos.piece_at(sq("a8")), None);
            assert_eq!(pos.castling_rights.to_fen(), "KQ");
        });
        assert!(castling_rook_squares(sq("g4")).unwrap_err().is_fatal());
    }

    #[test]
    fn rook_capture_on_home_square_costs_both_sides() {
        let mv = Move::with_flags(sq("h1"), sq("h8"), MoveFlags::CAPTURE);
        make_and_undo("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1", mv, |pos, undo| {
            assert_eq!(undo.captured, black(PieceType::Rook));
            assert_eq!(pos.castling_rights.to_fen(), "Qq");
        });
    }

    #[test]
    fn promotion_replaces_the_pawn() {
        let mv = Move::with_promotion(sq("a7"), sq("b8"), PieceType::Knight, MoveFlags::CAPTURE);
        make_and_undo("1r5k/P7/8/8/8/8/8/4K3 w - - 3 40", mv, |pos, _| {
            assert_eq!(pos.piece_at(sq("b8")), white(PieceType::Knight));
            assert_eq!(pos.halfmove_clock, 0);
        });
    }

    #[test]
    fn moving_from_an_empty_square_is_fatal() {
        let mut pos = Position::starting();
        let err = pos.make_move(Move::new(sq("e4"), sq("e5"))).unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(pos, Position::starting());
    }

    #[test]
    fn quiet_moves_advance_the_clocks() {
        let mut pos = Position::starting();
        pos.make_move(Move::new(sq("b1"), sq("c3"))).unwrap();
        assert_eq!((pos.halfmove_clock, pos.fullmove_number), (1, 1));
        pos.make_move(Move::new(sq("b8"), sq("c6"))).unwrap();
        assert_eq!((pos.halfmove_clock, pos.fullmove_number), (2, 2));
    }

    #[test]
    fn diagram_has_rank_labels() {
        let text = Position::starting().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "8 r n b q k b n r");
        assert_eq!(lines[7], "1 R N B Q K B N R");
        assert_eq!(lines[8], "  a b c d e f g h");
    }
}
