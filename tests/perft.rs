//! Perft node counts for the standard test positions.
//!
//! Counts walk the tree with in-place make/undo, so a wrong total points at
//! generation, legality filtering or the undo path.
//!
//! Reference: <https://www.chessprogramming.org/Perft_Results>

use chess_core::engine::board::Position;
use chess_core::engine::movegen::legal_moves;

const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

fn perft(pos: &mut Position, depth: u32) -> u64 {
    let moves = legal_moves(pos);
    if depth <= 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0;
    for mv in moves {
        let undo = pos.make_move(mv).expect("generated move applies");
        nodes += perft(pos, depth - 1);
        pos.undo_move(mv, &undo);
    }
    nodes
}

fn check(fen: &str, expected: &[u64]) {
    let mut pos = Position::from_fen(fen).unwrap();
    let original = pos.clone();
    for (i, &count) in expected.iter().enumerate() {
        let depth = i as u32 + 1;
        assert_eq!(perft(&mut pos, depth), count, "{fen} at depth {depth}");
        assert_eq!(pos, original, "tree walk did not restore {fen}");
    }
}

#[test]
fn perft_starting_position() {
    check(
        chess_core::engine::board::STARTING_FEN,
        &[20, 400, 8_902, 197_281],
    );
}

#[test]
fn perft_kiwipete() {
    check(KIWIPETE, &[48, 2_039, 97_862]);
}

#[test]
fn perft_position_3() {
    check(POSITION_3, &[14, 191, 2_812, 43_238]);
}

#[test]
fn perft_position_4() {
    check(POSITION_4, &[6, 264, 9_467]);
}

#[test]
fn perft_position_5() {
    check(POSITION_5, &[44, 1_486, 62_379]);
}

#[test]
fn incremental_hash_matches_full_recompute() {
    for fen in [KIWIPETE, POSITION_3, POSITION_4, POSITION_5] {
        let pos = Position::from_fen(fen).unwrap();
        for mv in legal_moves(&pos) {
            let mut child = pos.clone();
            child.make_move(mv).unwrap();
            assert_eq!(child.zobrist_hash, child.compute_zobrist(), "{fen}: {mv}");
            for reply in legal_moves(&child) {
                let mut grandchild = child.clone();
                grandchild.make_move(reply).unwrap();
                assert_eq!(
                    grandchild.zobrist_hash,
                    grandchild.compute_zobrist(),
                    "{fen}: {mv} {reply}"
                );
            }
        }
    }
}
