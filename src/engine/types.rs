//! Value types shared across the engine: sides, pieces, squares, moves,
//! castling rights, game status and the error type.

use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// A side. `!color` gives the opponent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// White=0, Black=1.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 'w' or 'b', as used in FEN and in piece codes.
    pub const fn letter(self) -> char {
        match self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    /// Rank delta of a pawn advance.
    #[inline]
    pub const fn forward(self) -> i8 {
        match self {
            Color::White => 1,
            Color::Black => -1,
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

impl std::ops::Not for Color {
    type Output = Self;
    fn not(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts "white", "black", "w" or "b" in any case.
impl FromStr for Color {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" | "w" => Ok(Color::White),
            "black" | "b" => Ok(Color::Black),
            _ => Err(ChessError::InvalidColor(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// PieceType
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

const KIND_LETTERS: [char; 6] = ['p', 'n', 'b', 'r', 'q', 'k'];
const KIND_NAMES: [&str; 6] = ["pawn", "knight", "bishop", "rook", "queen", "king"];

impl PieceType {
    /// In index order, pawn first.
    pub const ALL: [PieceType; 6] = [
        PieceType::Pawn,
        PieceType::Knight,
        PieceType::Bishop,
        PieceType::Rook,
        PieceType::Queen,
        PieceType::King,
    ];

    /// Kinds a pawn may promote to, in generation order.
    pub const PROMOTIONS: [PieceType; 4] = [
        PieceType::Queen,
        PieceType::Rook,
        PieceType::Bishop,
        PieceType::Knight,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase kind letter.
    pub const fn letter(self) -> char {
        KIND_LETTERS[self.index()]
    }

    pub const fn name(self) -> &'static str {
        KIND_NAMES[self.index()]
    }

    /// Kind letter, case ignored.
    pub fn from_letter(c: char) -> Option<PieceType> {
        let c = c.to_ascii_lowercase();
        KIND_LETTERS
            .iter()
            .position(|&l| l == c)
            .map(|i| Self::ALL[i])
    }

    pub fn is_promotion_target(self) -> bool {
        Self::PROMOTIONS.contains(&self)
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts a full name ("knight") or a single kind letter ("n").
impl FromStr for PieceType {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let by_name = KIND_NAMES
            .iter()
            .position(|&n| n == lower)
            .map(|i| Self::ALL[i]);
        let by_letter = || match lower.as_bytes() {
            [b] => Self::from_letter(*b as char),
            _ => None,
        };
        by_name
            .or_else(by_letter)
            .ok_or_else(|| ChessError::InvalidPromotion(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Piece
// ---------------------------------------------------------------------------

/// A coloured piece. The board stores copies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub kind: PieceType,
    pub color: Color,
}

impl Piece {
    #[inline]
    pub const fn new(kind: PieceType, color: Color) -> Self {
        Piece { kind, color }
    }

    /// Kind letter followed by colour letter: "pw", "kb".
    pub fn code(self) -> String {
        [self.kind.letter(), self.color.letter()].iter().collect()
    }

    /// FEN letter: uppercase for white.
    pub fn fen_char(self) -> char {
        match self.color {
            Color::White => self.kind.letter().to_ascii_uppercase(),
            Color::Black => self.kind.letter(),
        }
    }

    pub fn from_fen_char(c: char) -> Option<Piece> {
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        PieceType::from_letter(c).map(|kind| Piece::new(kind, color))
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.letter(), self.color.letter())
    }
}

// ---------------------------------------------------------------------------
// Square
// ---------------------------------------------------------------------------

/// Board square as `rank * 8 + file`, so a1 = 0, h1 = 7 and h8 = 63.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(pub u8);

impl Square {
    #[inline]
    pub fn from_file_rank(file: u8, rank: u8) -> Self {
        debug_assert!(file < 8 && rank < 8);
        Square(rank * 8 + file)
    }

    #[inline]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    #[inline]
    pub fn file(self) -> u8 {
        self.0 % 8
    }

    #[inline]
    pub fn rank(self) -> u8 {
        self.0 / 8
    }

    /// Step by whole files and ranks; `None` past any edge.
    pub fn offset(self, file_delta: i8, rank_delta: i8) -> Option<Self> {
        let file = u8::try_from(self.file() as i8 + file_delta).ok()?;
        let rank = u8::try_from(self.rank() as i8 + rank_delta).ok()?;
        (file < 8 && rank < 8).then(|| Square::from_file_rank(file, rank))
    }

    /// a1, b1, ... h8.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..64u8).map(Square)
    }

    /// h1 and a8 are light.
    pub fn is_light(self) -> bool {
        (self.file() + self.rank()) % 2 == 1
    }

    pub fn from_algebraic(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        let (Some(file @ 'a'..='h'), Some(rank @ '1'..='8'), None) =
            (chars.next(), chars.next(), chars.next())
        else {
            return None;
        };
        Some(Square::from_file_rank(file as u8 - b'a', rank as u8 - b'1'))
    }

    pub fn to_algebraic(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file()) as char, self.rank() + 1)
    }
}

impl FromStr for Square {
    type Err = ChessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Square::from_algebraic(s.trim()).ok_or_else(|| ChessError::InvalidSquare(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Bitboard
// ---------------------------------------------------------------------------

/// Square set with one bit per square. Attack sets only; placement lives in
/// the mailbox.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Bitboard(pub u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);

    #[inline]
    pub fn is_set(self, sq: Square) -> bool {
        (self.0 >> sq.0) & 1 == 1
    }

    #[inline]
    pub fn set(&mut self, sq: Square) {
        self.0 |= 1 << sq.0;
    }

    #[cfg(test)]
    pub fn pop_count(self) -> u32 {
        self.0.count_ones()
    }

    #[cfg(test)]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members in ascending square order.
    pub fn iter(self) -> impl Iterator<Item = Square> {
        let mut rest = self.0;
        std::iter::from_fn(move || {
            if rest == 0 {
                return None;
            }
            let sq = Square(rest.trailing_zeros() as u8);
            rest &= rest - 1;
            Some(sq)
        })
    }
}

impl std::ops::BitOr for Bitboard {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Bitboard(self.0 | rhs.0)
    }
}

// ---------------------------------------------------------------------------
// Moves
// ---------------------------------------------------------------------------

/// Facts about a move, filled in by the generator. Callers never supply them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveFlags(pub u8);

impl MoveFlags {
    pub const NONE: MoveFlags = MoveFlags(0);
    pub const CAPTURE: MoveFlags = MoveFlags(1 << 0);
    pub const EN_PASSANT: MoveFlags = MoveFlags(1 << 1);
    pub const CASTLING: MoveFlags = MoveFlags(1 << 2);
    pub const DOUBLE_PUSH: MoveFlags = MoveFlags(1 << 3);

    #[inline]
    fn contains(self, other: MoveFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_capture(self) -> bool {
        self.contains(Self::CAPTURE)
    }

    pub fn is_en_passant(self) -> bool {
        self.contains(Self::EN_PASSANT)
    }

    pub fn is_castling(self) -> bool {
        self.contains(Self::CASTLING)
    }

    pub fn is_double_push(self) -> bool {
        self.contains(Self::DOUBLE_PUSH)
    }
}

impl std::ops::BitOr for MoveFlags {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        MoveFlags(self.0 | rhs.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceType>,
    pub flags: MoveFlags,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Self::with_flags(from, to, MoveFlags::NONE)
    }

    pub fn with_flags(from: Square, to: Square, flags: MoveFlags) -> Self {
        Move {
            from,
            to,
            promotion: None,
            flags,
        }
    }

    pub fn with_promotion(from: Square, to: Square, kind: PieceType, flags: MoveFlags) -> Self {
        Move {
            promotion: Some(kind),
            ..Self::with_flags(from, to, flags)
        }
    }

    pub fn is_capture(&self) -> bool {
        self.flags.is_capture()
    }
}

/// Coordinate form: "e2e4", "e7e8q".
impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        match self.promotion {
            Some(kind) => write!(f, "{}", kind.letter()),
            None => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// CastlingRights
// ---------------------------------------------------------------------------

/// Remaining castling permissions, one bit each for K, Q, k and q.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CastlingRights(pub u8);

impl CastlingRights {
    pub const WHITE_KINGSIDE: u8 = 0b0001;
    pub const WHITE_QUEENSIDE: u8 = 0b0010;
    pub const BLACK_KINGSIDE: u8 = 0b0100;
    pub const BLACK_QUEENSIDE: u8 = 0b1000;

    pub const NONE: CastlingRights = CastlingRights(0);
    pub const ALL: CastlingRights = CastlingRights(0b1111);

    /// FEN order.
    const SYMBOLS: [(u8, char); 4] = [
        (Self::WHITE_KINGSIDE, 'K'),
        (Self::WHITE_QUEENSIDE, 'Q'),
        (Self::BLACK_KINGSIDE, 'k'),
        (Self::BLACK_QUEENSIDE, 'q'),
    ];

    pub const fn kingside(color: Color) -> u8 {
        match color {
            Color::White => Self::WHITE_KINGSIDE,
            Color::Black => Self::BLACK_KINGSIDE,
        }
    }

    pub const fn queenside(color: Color) -> u8 {
        match color {
            Color::White => Self::WHITE_QUEENSIDE,
            Color::Black => Self::BLACK_QUEENSIDE,
        }
    }

    #[inline]
    pub fn has(self, flag: u8) -> bool {
        self.0 & flag != 0
    }

    /// "-" or any subset of "KQkq". Unknown letters are rejected.
    pub fn from_fen(s: &str) -> Option<Self> {
        if s == "-" {
            return Some(Self::NONE);
        }
        s.chars().try_fold(Self::NONE, |acc, c| {
            let (bit, _) = Self::SYMBOLS.iter().find(|(_, sym)| *sym == c)?;
            Some(CastlingRights(acc.0 | bit))
        })
    }

    pub fn to_fen(self) -> String {
        if self == Self::NONE {
            return "-".into();
        }
        Self::SYMBOLS
            .iter()
            .filter(|(bit, _)| self.has(*bit))
            .map(|(_, sym)| sym)
            .collect()
    }
}

impl fmt::Display for CastlingRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_fen())
    }
}

// ---------------------------------------------------------------------------
// GameStatus
// ---------------------------------------------------------------------------

/// Game status, derived from the position after every change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Active,
    Check,
    Checkmate,
    Stalemate,
    Draw(DrawReason),
}

impl GameStatus {
    pub fn as_str(&self) -> &str {
        match self {
            GameStatus::Active => "active",
            GameStatus::Check => "check",
            GameStatus::Checkmate => "checkmate",
            GameStatus::Stalemate => "stalemate",
            GameStatus::Draw(_) => "draw",
        }
    }

    pub fn is_game_over(&self) -> bool {
        !matches!(self, GameStatus::Active | GameStatus::Check)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())?;
        if let GameStatus::Draw(reason) = self {
            write!(f, " ({})", reason.as_str())?;
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawReason {
    FiftyMoveRule,
    ThreefoldRepetition,
    InsufficientMaterial,
}

impl DrawReason {
    pub fn as_str(&self) -> &str {
        match self {
            DrawReason::FiftyMoveRule => "fifty_move_rule",
            DrawReason::ThreefoldRepetition => "threefold_repetition",
            DrawReason::InsufficientMaterial => "insufficient_material",
        }
    }
}

// ---------------------------------------------------------------------------
// ChessError
// ---------------------------------------------------------------------------

/// Why an engine operation was refused.
///
/// Only `InvariantViolation` is fatal. Every other variant leaves the game
/// exactly as it was before the call.
#[derive(Debug, thiserror::Error)]
pub enum ChessError {
    #[error("{from}{to} is not legal: {reason}")]
    IllegalMove {
        from: String,
        to: String,
        reason: String,
    },

    #[error("no moves accepted once the game has ended ({0})")]
    TerminalStateViolation(GameStatus),

    #[error("board invariant broken: {0}")]
    InvariantViolation(String),

    #[error("bad FEN: {0}")]
    InvalidFen(String),

    #[error("not a square: {0:?}")]
    InvalidSquare(String),

    #[error("cannot promote to {0:?}")]
    InvalidPromotion(String),

    #[error("not a colour: {0:?}")]
    InvalidColor(String),

    #[error("waiting for the automated opponent")]
    OpponentToMove,
}

impl ChessError {
    pub(crate) fn illegal(from: Square, to: Square, reason: impl Into<String>) -> Self {
        ChessError::IllegalMove {
            from: from.to_algebraic(),
            to: to.to_algebraic(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable reason.
    pub fn code(&self) -> &'static str {
        match self {
            ChessError::IllegalMove { .. } => "ILLEGAL_MOVE",
            ChessError::TerminalStateViolation(_) => "GAME_OVER",
            ChessError::InvariantViolation(_) => "INVARIANT_VIOLATION",
            ChessError::InvalidFen(_) => "INVALID_FEN",
            ChessError::InvalidSquare(_) => "INVALID_SQUARE",
            ChessError::InvalidPromotion(_) => "INVALID_PROMOTION",
            ChessError::InvalidColor(_) => "INVALID_COLOR",
            ChessError::OpponentToMove => "OPPONENT_TO_MOVE",
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, ChessError::InvariantViolation(_))
    }
}
