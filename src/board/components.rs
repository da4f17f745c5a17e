use std::{
    fmt::Display,
    ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not},
    str::FromStr,
};

use miette::Context;
use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Default, Hash, PartialEq, Eq, PartialOrd, Clone, Copy)]
#[repr(transparent)]
pub struct BitBoard(pub u64);

impl BitAndAssign for BitBoard {
    #[inline(always)]
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0
    }
}

impl BitOrAssign for BitBoard {
    #[inline(always)]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0
    }
}

impl BitOr for BitBoard {
    type Output = Self;

    #[inline(always)]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitAnd for BitBoard {
    type Output = Self;

    #[inline(always)]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl Not for BitBoard {
    type Output = Self;

    #[inline(always)]
    fn not(self) -> Self::Output {
        Self(!self.0)
    }
}

impl BitBoard {
    pub const EMPTY: BitBoard = BitBoard(0);

    #[inline(always)]
    pub const fn from_square(square: Square) -> Self {
        Self(1 << square.index())
    }

    #[inline(always)]
    pub const fn set(&mut self, pos: usize) {
        self.0 |= 1 << pos;
    }

    #[inline(always)]
    pub const fn pop_count(&self) -> u32 {
        self.0.count_ones()
    }

    #[inline(always)]
    pub const fn lsb(&self) -> Option<u64> {
        if self.0 == 0 {
            return None;
        }
        Some(self.0.trailing_zeros() as u64)
    }

    #[inline(always)]
    pub const fn msb(&self) -> Option<u64> {
        if self.0 == 0 {
            return None;
        }
        Some(63 - self.0.leading_zeros() as u64)
    }

    #[inline(always)]
    pub fn pop_lsb(&mut self) -> Option<u64> {
        let idx = self.lsb()?;
        self.0 &= self.0 - 1; // Clear the least significant bit
        Some(idx)
    }

    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub const fn iter_bits(&self) -> BitBoardIterator {
        BitBoardIterator { remaining: self.0 }
    }

    /// Squares in ascending index order
    pub fn squares(&self) -> impl Iterator<Item = Square> {
        self.iter_bits().map(Square::from)
    }

    #[inline(always)]
    pub const fn contains_square(&self, index: usize) -> bool {
        (self.0 & (1 << index)) != 0
    }

    #[inline(always)]
    pub const fn get_closest_bit(&self, forward: bool) -> Option<u64> {
        if forward { self.lsb() } else { self.msb() }
    }
}

/// Iterator that yields each set bit position in a BitBoard
pub struct BitBoardIterator {
    remaining: u64,
}

impl Iterator for BitBoardIterator {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let idx = self.remaining.trailing_zeros() as usize;
        self.remaining &= self.remaining - 1;
        Some(idx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let exact = self.remaining.count_ones() as usize;
        (exact, Some(exact))
    }
}

impl ExactSizeIterator for BitBoardIterator {}

#[derive(Default, Debug, Hash, PartialEq, Eq, PartialOrd, Clone, Copy, Serialize, Deserialize)]
pub enum Side {
    #[default]
    White,
    Black,
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self {
            Side::White => write!(f, "White"),
            Side::Black => write!(f, "Black"),
        }
    }
}

impl Not for Side {
    type Output = Side;

    fn not(self) -> Self::Output {
        self.flip()
    }
}

impl Side {
    pub const SIDES: [Side; 2] = [Side::White, Side::Black];

    pub const fn flip(&self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    pub const fn index(&self) -> usize {
        match self {
            Side::White => 0,
            Side::Black => 1,
        }
    }

    /// Rank delta of a pawn push
    pub const fn pawn_direction(&self) -> i8 {
        match self {
            Side::White => 1,
            Side::Black => -1,
        }
    }

    /// Zero indexed row of the pieces' home rank
    pub const fn back_row(&self) -> usize {
        match self {
            Side::White => 0,
            Side::Black => 7,
        }
    }

    pub const fn pawn_start_row(&self) -> usize {
        match self {
            Side::White => 1,
            Side::Black => 6,
        }
    }

    pub const fn promotion_row(&self) -> usize {
        match self {
            Side::White => 7,
            Side::Black => 0,
        }
    }

    pub const fn fen_char(&self) -> char {
        match self {
            Side::White => 'w',
            Side::Black => 'b',
        }
    }
}

#[derive(Default, PartialEq, Eq, Debug, PartialOrd, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Piece {
    #[default]
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl Display for Piece {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self {
            Piece::Pawn => write!(f, "Pawn"),
            Piece::Knight => write!(f, "Knight"),
            Piece::Bishop => write!(f, "Bishop"),
            Piece::Rook => write!(f, "Rook"),
            Piece::Queen => write!(f, "Queen"),
            Piece::King => write!(f, "King"),
        }
    }
}

impl FromStr for Piece {
    type Err = miette::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "p" | "pawn" => Ok(Piece::Pawn),
            "n" | "knight" => Ok(Piece::Knight),
            "b" | "bishop" => Ok(Piece::Bishop),
            "r" | "rook" => Ok(Piece::Rook),
            "q" | "queen" => Ok(Piece::Queen),
            "k" | "king" => Ok(Piece::King),
            _ => miette::bail!("Unknown piece: {s}"),
        }
    }
}

impl Piece {
    pub const PIECE_CHARS: [[char; 6]; 2] = [
        ['P', 'N', 'B', 'R', 'Q', 'K'], // White
        ['p', 'n', 'b', 'r', 'q', 'k'], // Black
    ];

    #[inline(always)]
    pub const fn index(&self) -> usize {
        match self {
            Piece::Pawn => 0,
            Piece::Knight => 1,
            Piece::Bishop => 2,
            Piece::Rook => 3,
            Piece::Queen => 4,
            Piece::King => 5,
        }
    }

    /// Maps a FEN letter to piece and side. Uppercase is White.
    pub fn from_fen_char(c: char) -> Option<(Piece, Side)> {
        let side = if c.is_ascii_uppercase() {
            Side::White
        } else {
            Side::Black
        };
        let piece = match c.to_ascii_lowercase() {
            'p' => Piece::Pawn,
            'n' => Piece::Knight,
            'b' => Piece::Bishop,
            'r' => Piece::Rook,
            'q' => Piece::Queen,
            'k' => Piece::King,
            _ => return None,
        };
        Some((piece, side))
    }

    pub fn icon(&self, stm: Side) -> char {
        match (self, stm) {
            (Piece::Pawn, Side::White) => '♟',
            (Piece::Pawn, Side::Black) => '♙',
            (Piece::Knight, Side::White) => '♞',
            (Piece::Knight, Side::Black) => '♘',
            (Piece::Bishop, Side::White) => '♝',
            (Piece::Bishop, Side::Black) => '♗',
            (Piece::Rook, Side::White) => '♜',
            (Piece::Rook, Side::Black) => '♖',
            (Piece::Queen, Side::White) => '♛',
            (Piece::Queen, Side::Black) => '♕',
            (Piece::King, Side::White) => '♚',
            (Piece::King, Side::Black) => '♔',
        }
    }
}

/// Occupant of a board slot. `has_moved` only matters for castling.
#[derive(Debug, Default, Hash, PartialEq, Eq, PartialOrd, Clone, Copy, Serialize)]
pub struct PieceInfo {
    pub piece: Piece,
    pub side: Side,
    pub has_moved: bool,
}

impl PieceInfo {
    pub const fn new(piece: Piece, side: Side) -> Self {
        Self {
            piece,
            side,
            has_moved: false,
        }
    }

    pub const fn moved(self) -> Self {
        Self {
            has_moved: true,
            ..self
        }
    }

    #[inline(always)]
    pub const fn is(&self, piece: Piece, side: Side) -> bool {
        self.piece.index() == piece.index() && self.side.index() == side.index()
    }

    pub const fn fen_char(&self) -> char {
        Piece::PIECE_CHARS[self.side.index()][self.piece.index()]
    }
}

impl Display for PieceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.side, self.piece)
    }
}

/// Castling rights are stored in a [`u8`], which is divided into the following parts:
/// ```text
/// Bit: 7 6 5 4 3 2 1 0
///      - - - - q k Q K
///              | | | |
///              | | | +-- White kingside right
///              | | +---- White queenside right
///              | +------ Black kingside right
///              +-------- Black queenside right
/// ```
#[derive(Debug, Hash, PartialEq, Eq, PartialOrd, Clone, Copy)]
#[repr(transparent)]
pub struct CastlingRights(pub u8);

impl CastlingRights {
    pub const NO_CASTLING: u8 = 0;
    /// White King side castling
    pub const WHITE_00: u8 = 0b00000001;
    /// White Queen side castling
    pub const WHITE_000: u8 = 0b00000010;
    /// Black King side castling
    pub const BLACK_00: u8 = 0b00000100;
    /// Black Queen side castling
    pub const BLACK_000: u8 = 0b00001000;

    pub const WHITE_CASTLING: Self = Self(Self::WHITE_00 | Self::WHITE_000);
    pub const BLACK_CASTLING: Self = Self(Self::BLACK_00 | Self::BLACK_000);
    pub const ANY_CASTLING: Self = Self(Self::BLACK_CASTLING.0 | Self::WHITE_CASTLING.0);

    /// Single right bit for a side and wing
    #[inline(always)]
    pub const fn flag(side: Side, kingside: bool) -> u8 {
        match (side, kingside) {
            (Side::White, true) => Self::WHITE_00,
            (Side::White, false) => Self::WHITE_000,
            (Side::Black, true) => Self::BLACK_00,
            (Side::Black, false) => Self::BLACK_000,
        }
    }

    #[inline(always)]
    pub const fn add_right(&mut self, rights: u8) {
        self.0 |= rights;
    }
    #[inline(always)]
    pub const fn all() -> Self {
        Self::ANY_CASTLING
    }
    #[inline(always)]
    pub const fn can_castle(&self, side: Side, kingside: bool) -> bool {
        self.0 & Self::flag(side, kingside) != Self::NO_CASTLING
    }
    #[inline(always)]
    pub const fn empty() -> Self {
        Self(Self::NO_CASTLING)
    }
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.0 == Self::NO_CASTLING
    }
}

impl Display for CastlingRights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.can_castle(Side::White, true) {
            write!(f, "K")?;
        }
        if self.can_castle(Side::White, false) {
            write!(f, "Q")?;
        }
        if self.can_castle(Side::Black, true) {
            write!(f, "k")?;
        }
        if self.can_castle(Side::Black, false) {
            write!(f, "q")?;
        }
        if self.is_empty() {
            write!(f, "-")?;
        }
        Ok(())
    }
}

impl Default for CastlingRights {
    fn default() -> Self {
        Self::empty()
    }
}

/// Represents a single square on the board.
/// # Representation
/// ```text
///  A8, B8, C8, D8, E8, F8, G8, H8,  <- bit 63 at h8
///  ...
///  A1, B1, C1, D1, E1, F1, G1, H1,
///  ^(bit 0)
///```
#[derive(Default, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Clone, Copy)]
#[repr(transparent)]
pub struct Square(usize);

impl Square {
    /// Returns a Square from a given index. Will return None if index is out of bounds
    /// index should be [0, 63]
    #[inline(always)]
    pub const fn new(index: usize) -> Option<Self> {
        if index < 64 {
            return Some(Self(index));
        }
        None
    }

    /// Returns a Square from a given File and Rank.
    /// Will return None if either File or Rank are out of bounds.
    #[inline(always)]
    pub const fn from_coords(file: usize, rank: usize) -> Option<Self> {
        if file < 8 && rank < 8 {
            return Some(Square(rank * 8 + file));
        }
        None
    }

    /// Like [`Square::from_coords`] but accepts signed coordinates from offset arithmetic
    #[inline(always)]
    pub const fn offset(&self, d_rank: i8, d_file: i8) -> Option<Self> {
        let rank = self.row() as i8 + d_rank;
        let file = self.col() as i8 + d_file;
        if rank < 0 || rank >= 8 || file < 0 || file >= 8 {
            return None;
        }
        Some(Square(rank as usize * 8 + file as usize))
    }

    #[inline(always)]
    pub const fn row(&self) -> usize {
        self.0 / 8
    }

    #[inline(always)]
    pub const fn col(&self) -> usize {
        self.0 % 8
    }

    #[inline(always)]
    pub const fn index(&self) -> usize {
        self.0
    }
}

impl From<Square> for usize {
    fn from(value: Square) -> Self {
        value.0
    }
}

impl From<usize> for Square {
    fn from(value: usize) -> Self {
        debug_assert!(value < 64, "square index out of range: {value}");
        Self(value)
    }
}

impl FromStr for Square {
    type Err = miette::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        miette::ensure!(
            s.len() == 2,
            "Square needs 1 Letter and 1 Number to construct, got {s:?}"
        );
        let s = s.to_ascii_lowercase();
        let mut iter = s.chars();
        let letter = iter.next().context("1st char should be letter")?;
        let num = iter.next().context("2nd char should be number")?;
        miette::ensure!(
            ('a'..='h').contains(&letter),
            "File {letter:?} is not in 'a'..='h'"
        );
        miette::ensure!(
            ('1'..='8').contains(&num),
            "Rank {num:?} is not in '1'..='8'"
        );
        let file = (letter as u8 - b'a') as usize;
        let rank = (num as u8 - b'1') as usize;

        Ok(Self(8 * rank + file))
    }
}

impl Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let file = (self.0 % 8) as u8 + b'a';
        let rank = (self.0 / 8) as u8 + b'1';
        write!(f, "{}{}", file as char, rank as char)
    }
}

impl Serialize for Square {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
