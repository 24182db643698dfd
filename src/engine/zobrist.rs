//! Zobrist keys for repetition detection.
//!
//! A position hash XORs one key per placed piece, one for Black to move, one
//! for the castling-rights bitfield and one for the en-passant file. Move
//! counters are left out, so positions that differ only in their clocks hash
//! alike.

use std::sync::OnceLock;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use crate::engine::types::{Piece, Square};

/// Fixed so that hashes agree across runs.
const SEED: u64 = 0x3243_F6A8_885A_308D;

pub struct ZobristKeys {
    /// Indexed by colour, kind, square.
    placement: [[[u64; 64]; 6]; 2],
    black_to_move: u64,
    /// One per castling bitfield value.
    castling: [u64; 16],
    /// One per file.
    en_passant: [u64; 8],
}

pub fn keys() -> &'static ZobristKeys {
    static KEYS: OnceLock<ZobristKeys> = OnceLock::new();
    KEYS.get_or_init(|| ZobristKeys::generate(&mut StdRng::seed_from_u64(SEED)))
}

impl ZobristKeys {
    fn generate(rng: &mut StdRng) -> Self {
        let placement = std::array::from_fn(|_| {
            std::array::from_fn(|_| std::array::from_fn(|_| rng.next_u64()))
        });
        ZobristKeys {
            placement,
            black_to_move: rng.next_u64(),
            castling: std::array::from_fn(|_| rng.next_u64()),
            en_passant: std::array::from_fn(|_| rng.next_u64()),
        }
    }

    #[inline]
    pub fn piece_key(&self, piece: Piece, sq: Square) -> u64 {
        self.placement[piece.color.index()][piece.kind.index()][sq.index()]
    }

    #[inline]
    pub fn side_key(&self) -> u64 {
        self.black_to_move
    }

    #[inline]
    pub fn ep_key(&self, file: u8) -> u64 {
        self.en_passant[usize::from(file)]
    }

    #[inline]
    pub fn castling_key(&self, rights: u8) -> u64 {
        self.castling[usize::from(rights)]
    }
}
