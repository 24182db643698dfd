//! Move generation for the side to move.
//!
//! Each piece first yields its geometric (pseudo-legal) moves. A move is then
//! kept only if playing it on a copy of the position leaves the mover's king
//! unattacked. Lists come out in a1..h8 origin order, and within one origin
//! in the order its targets are produced, so equal positions give equal lists.

use crate::engine::attacks;
use crate::engine::board::Position;
use crate::engine::types::{Bitboard, CastlingRights, Color, Move, MoveFlags, Piece, PieceType, Square};

/// Every legal move for the side to move.
pub fn legal_moves(pos: &Position) -> Vec<Move> {
    let mut legal = Vec::with_capacity(64);
    for (from, _) in pos.pieces_of(pos.side_to_move) {
        legal.extend(
            pseudo_legal_moves(pos, from)
                .into_iter()
                .filter(|mv| is_legal(pos, *mv)),
        );
    }
    legal
}

/// Legal moves of the piece on `from`.
///
/// An empty square or an opponent's piece yields an empty list.
pub fn legal_moves_from(pos: &Position, from: Square) -> Vec<Move> {
    pseudo_legal_moves(pos, from)
        .into_iter()
        .filter(|mv| is_legal(pos, *mv))
        .collect()
}

/// Moves from `from` that obey piece geometry, ignoring self-check.
///
/// Only the side to move has pseudo-legal moves; any other square yields an
/// empty list.
pub fn pseudo_legal_moves(pos: &Position, from: Square) -> Vec<Move> {
    let mut moves = Vec::new();
    let Some(piece) = pos.piece_at(from) else {
        return moves;
    };
    if piece.color != pos.side_to_move {
        return moves;
    }

    match piece.kind {
        PieceType::Pawn => generate_pawn_moves(pos, from, piece.color, &mut moves),
        _ => {
            let targets = attacks::attacks_from(pos, from, piece);
            push_targets(pos, from, piece.color, targets, &mut moves);
            if piece.kind == PieceType::King {
                generate_castling_moves(pos, from, piece.color, &mut moves);
            }
        }
    }
    moves
}

/// Would `mv` leave the mover's own king safe?
fn is_legal(pos: &Position, mv: Move) -> bool {
    let us = pos.side_to_move;
    let mut copy = pos.clone();
    if copy.make_move(mv).is_err() {
        return false;
    }
    match copy.king_square(us) {
        Ok(king) => !copy.is_square_attacked(king, !us),
        Err(_) => false,
    }
}

/// Turn an attack set into moves, skipping own pieces and flagging captures.
fn push_targets(pos: &Position, from: Square, us: Color, targets: Bitboard, moves: &mut Vec<Move>) {
    for to in targets.iter() {
        match pos.piece_at(to) {
            Some(p) if p.color == us => {}
            Some(_) => moves.push(Move::with_flags(from, to, MoveFlags::CAPTURE)),
            None => moves.push(Move::new(from, to)),
        }
    }
}

// =========================================================================
// Pawn moves
// =========================================================================

fn generate_pawn_moves(pos: &Position, from: Square, us: Color, moves: &mut Vec<Move>) {
    let dir = us.forward();
    let (start_rank, last_rank) = match us {
        Color::White => (1, 7),
        Color::Black => (6, 0),
    };

    // --- Pushes ---
    if let Some(one) = from.offset(0, dir)
        && pos.piece_at(one).is_none()
    {
        if one.rank() == last_rank {
            add_promotions(from, one, MoveFlags::NONE, moves);
        } else {
            moves.push(Move::new(from, one));
        }

        if from.rank() == start_rank
            && let Some(two) = one.offset(0, dir)
            && pos.piece_at(two).is_none()
        {
            moves.push(Move::with_flags(from, two, MoveFlags::DOUBLE_PUSH));
        }
    }

    // --- Diagonal captures (including promotion captures) ---
    let attack_bb = attacks::attacks_from(pos, from, Piece::new(PieceType::Pawn, us));
    for to in attack_bb.iter() {
        match pos.piece_at(to) {
            Some(p) if p.color != us => {
                if to.rank() == last_rank {
                    add_promotions(from, to, MoveFlags::CAPTURE, moves);
                } else {
                    moves.push(Move::with_flags(from, to, MoveFlags::CAPTURE));
                }
            }
            _ => {}
        }
    }

    // --- En passant ---
    if let Some(ep_sq) = pos.en_passant
        && attack_bb.is_set(ep_sq)
        && pos.piece_at(ep_sq).is_none()
    {
        let victim_sq = Square::from_file_rank(ep_sq.file(), from.rank());
        if pos.piece_at(victim_sq) == Some(Piece::new(PieceType::Pawn, !us)) {
            moves.push(Move::with_flags(
                from,
                ep_sq,
                MoveFlags::CAPTURE | MoveFlags::EN_PASSANT,
            ));
        }
    }
}

/// Add all four promotion variants for a pawn push or capture.
fn add_promotions(from: Square, to: Square, flags: MoveFlags, moves: &mut Vec<Move>) {
    for promo in PieceType::PROMOTIONS {
        moves.push(Move::with_promotion(from, to, promo, flags));
    }
}

// =========================================================================
// Castling
// =========================================================================

fn generate_castling_moves(pos: &Position, king_sq: Square, us: Color, moves: &mut Vec<Move>) {
    let them = !us;
    let home = match us {
        Color::White => 0,
        Color::Black => 7,
    };
    let on_home = |file: u8| Square::from_file_rank(file, home);
    let short = pos.castling_rights.has(CastlingRights::kingside(us));
    let long = pos.castling_rights.has(CastlingRights::queenside(us));

    if king_sq != on_home(4) || !(short || long) || pos.is_square_attacked(king_sq, them) {
        return;
    }

    let rook = Some(Piece::new(PieceType::Rook, us));
    let empty = |file: u8| pos.piece_at(on_home(file)).is_none();
    let safe = |file: u8| !pos.is_square_attacked(on_home(file), them);

    // King crosses f to g.
    if short && pos.piece_at(on_home(7)) == rook && [5, 6].into_iter().all(|f| empty(f) && safe(f)) {
        moves.push(Move::with_flags(king_sq, on_home(6), MoveFlags::CASTLING));
    }

    // King crosses d to c; the rook also passes b, which may be attacked.
    if long
        && pos.piece_at(on_home(0)) == rook
        && [1, 2, 3].into_iter().all(empty)
        && [2, 3].into_iter().all(safe)
    {
        moves.push(Move::with_flags(king_sq, on_home(2), MoveFlags::CASTLING));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(name: &str) -> Square {
        name.parse().unwrap()
    }

    fn pos(fen: &str) -> Position {
        Position::from_fen(fen).unwrap()
    }

    fn targets(p: &Position, from: &str) -> Vec<Square> {
        legal_moves_from(p, sq(from)).iter().map(|m| m.to).collect()
    }

    fn castles(fen: &str) -> Vec<Square> {
        legal_moves(&pos(fen))
            .into_iter()
            .filter(|m| m.flags.is_castling())
            .map(|m| m.to)
            .collect()
    }

    #[test]
    fn twenty_moves_each_side_at_the_start() {
        assert_eq!(legal_moves(&Position::starting()).len(), 20);
        let after_e4 = pos("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1");
        assert_eq!(legal_moves(&after_e4).len(), 20);
    }

    #[test]
    fn origins_come_in_board_order() {
        let moves = legal_moves(&Position::starting());
        assert_eq!((moves[0].from, moves[0].to), (sq("b1"), sq("a3")));
        assert!(moves.windows(2).all(|w| w[0].from <= w[1].from));
        assert_eq!(moves, legal_moves(&Position::starting()));
    }

    #[test]
    fn only_the_side_to_move_has_moves() {
        let p = Position::starting();
        assert!(pseudo_legal_moves(&p, sq("e4")).is_empty());
        assert!(pseudo_legal_moves(&p, sq("g8")).is_empty());
        assert!(legal_moves_from(&p, sq("d8")).is_empty());
    }

    #[test]
    fn pinned_knight_has_geometry_but_no_legal_moves() {
        let p = pos("4r2k/8/8/8/8/8/4N3/4K3 w - - 0 1");
        assert_eq!(pseudo_legal_moves(&p, sq("e2")).len(), 6);
        assert!(legal_moves_from(&p, sq("e2")).is_empty());
    }

    #[test]
    fn pawn_pushes_stop_at_pieces() {
        assert_eq!(targets(&pos("4k3/8/8/8/8/8/4P3/4K3 w - - 0 1"), "e2"), vec![sq("e3"), sq("e4")]);
        assert_eq!(targets(&pos("4k3/8/8/8/4p3/8/4P3/4K3 w - - 0 1"), "e2"), vec![sq("e3")]);
        assert!(targets(&pos("4k3/8/8/8/8/4p3/4P3/4K3 w - - 0 1"), "e2").is_empty());
        assert_eq!(targets(&pos("4k3/3p4/8/8/8/8/8/4K3 b - - 0 1"), "d7"), vec![sq("d6"), sq("d5")]);
    }

    #[test]
    fn only_the_two_square_push_is_flagged() {
        let moves = legal_moves_from(&Position::starting(), sq("c2"));
        let flagged: Vec<_> = moves.iter().filter(|m| m.flags.is_double_push()).map(|m| m.to).collect();
        assert_eq!(flagged, vec![sq("c4")]);
    }

    #[test]
    fn promotions_queen_first() {
        let p = pos("r6k/1P6/8/8/8/8/8/4K3 w - - 0 1");
        let moves = legal_moves_from(&p, sq("b7"));
        assert_eq!(moves.len(), 8);
        let onto_a8: Vec<_> = moves.iter().filter(|m| m.to == sq("a8")).collect();
        assert!(onto_a8.iter().all(|m| m.is_capture()));
        let kinds: Vec<_> = onto_a8.iter().filter_map(|m| m.promotion).collect();
        assert_eq!(kinds, PieceType::PROMOTIONS.to_vec());
    }

    #[test]
    fn en_passant_only_onto_the_target() {
        let p = pos("rnbqkbnr/ppp1p1pp/8/3pPp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3");
        let ep: Vec<_> = legal_moves(&p).into_iter().filter(|m| m.flags.is_en_passant()).collect();
        assert_eq!(ep.len(), 1);
        assert_eq!((ep[0].from, ep[0].to), (sq("e5"), sq("f6")));
        assert!(ep[0].is_capture());
    }

    #[test]
    fn sliders_stop_at_the_first_piece() {
        let start = Position::starting();
        for from in ["a1", "c1", "d1", "f1"] {
            assert!(targets(&start, from).is_empty(), "{from}");
        }
        let open = pos("rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2");
        assert_eq!(targets(&open, "d1"), vec![sq("e2"), sq("f3"), sq("g4"), sq("h5")]);
    }

    #[test]
    fn castling_conditions() {
        let cases: [(&str, &[&str]); 7] = [
            ("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/R3K2R w KQkq - 0 1", &["c1", "g1"]),
            ("r3k2r/pppppppp/8/8/8/8/PPPPPPPP/RN2K1NR w KQkq - 0 1", &[]),
            // f1 is covered by the f8 rook.
            ("4kr2/8/8/8/8/8/8/R3K2R w KQ - 0 1", &["c1"]),
            // Only the rook crosses b1.
            ("1r2k3/8/8/8/8/8/8/R3K3 w Q - 0 1", &["c1"]),
            ("4k3/8/8/8/8/8/8/R3K2r w Q - 0 1", &[]),
            ("4k3/8/8/8/8/8/8/4K3 w KQ - 0 1", &[]),
            ("r3k2r/8/8/8/8/8/8/R3K2R b kq - 0 1", &["c8", "g8"]),
        ];
        for (fen, expected) in cases {
            let mut got = castles(fen);
            got.sort();
            let want: Vec<Square> = expected.iter().map(|s| sq(s)).collect();
            assert_eq!(got, want, "{fen}");
        }
    }

    #[test]
    fn every_reply_to_check_resolves_it() {
        let p = pos("4k3/8/8/8/8/8/8/R3K2q w Q - 0 1");
        let moves = legal_moves(&p);
        assert!(!moves.is_empty());
        for mv in moves {
            let mut after = p.clone();
            after.make_move(mv).unwrap();
            let king = after.king_square(Color::White).unwrap();
            assert!(!after.is_square_attacked(king, Color::Black), "{mv}");
        }
    }
}
