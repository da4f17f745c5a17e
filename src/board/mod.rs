use crate::prelude::*;

pub mod components;
pub mod fen;


/// 64 slots, each either empty or holding exactly one piece.
/// Moving a piece transfers it to the destination slot and clears the source.
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub struct Board {
    squares: [Option<PieceInfo>; NUM_SQUARES],
}

impl Default for Board {
    fn default() -> Self {
        Self::empty()
    }
}

impl Board {
    pub const fn empty() -> Self {
        Self {
            squares: [None; NUM_SQUARES],
        }
    }

    /// Standard starting position
    pub fn new() -> Self {
        const BACK_RANK: [Piece; 8] = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        let mut board = Self::empty();
        for side in Side::SIDES {
            for (file, piece) in BACK_RANK.iter().enumerate() {
                board.squares[side.back_row() * 8 + file] = Some(PieceInfo::new(*piece, side));
            }
            for file in 0..8 {
                board.squares[side.pawn_start_row() * 8 + file] =
                    Some(PieceInfo::new(Piece::Pawn, side));
            }
        }
        board
    }

    #[inline(always)]
    pub const fn get_piece_at(&self, square: Square) -> Option<PieceInfo> {
        self.squares[square.index()]
    }

    #[inline(always)]
    pub const fn is_occupied(&self, square: Square) -> bool {
        self.squares[square.index()].is_some()
    }

    /// Removes and returns whatever occupies `square`
    #[inline(always)]
    pub fn take(&mut self, square: Square) -> Option<PieceInfo> {
        self.squares[square.index()].take()
    }

    /// Overwrites `square`, returning the previous occupant
    #[inline(always)]
    pub fn replace(&mut self, square: Square, slot: Option<PieceInfo>) -> Option<PieceInfo> {
        std::mem::replace(&mut self.squares[square.index()], slot)
    }

    pub fn set(&mut self, square: Square, info: PieceInfo) -> miette::Result<()> {
        miette::ensure!(
            self.get_piece_at(square).is_none(),
            "[set] Some piece already exists at ( {square} ) square"
        );
        self.squares[square.index()] = Some(info);
        Ok(())
    }

    /// Primary way to make moves.
    /// This does NOT handle captures, the destination must already be empty
    pub fn move_piece(&mut self, from: Square, to: Square) -> miette::Result<PieceInfo> {
        miette::ensure!(
            self.get_piece_at(to).is_none(),
            "[move_piece] Destination square {to} is not empty. Found: {:?}",
            self.get_piece_at(to)
        );
        let info = self
            .take(from)
            .with_context(|| format!("[move_piece] No piece at from ({from}) square"))?
            .moved();
        self.squares[to.index()] = Some(info);
        Ok(info)
    }

    /// Occupied squares of one side
    pub fn get_side_bb(&self, side: Side) -> BitBoard {
        let mut bb = BitBoard::EMPTY;
        for (index, slot) in self.squares.iter().enumerate() {
            if slot.is_some_and(|info| info.side == side) {
                bb.set(index);
            }
        }
        bb
    }

    pub fn get_occupied_bb(&self) -> BitBoard {
        let mut bb = BitBoard::EMPTY;
        for (index, slot) in self.squares.iter().enumerate() {
            if slot.is_some() {
                bb.set(index);
            }
        }
        bb
    }

    pub fn king_square(&self, side: Side) -> Option<Square> {
        self.squares
            .iter()
            .position(|slot| slot.is_some_and(|info| info.is(Piece::King, side)))
            .map(Square::from)
    }

    /// All occupied squares of `side`, in index order
    pub fn pieces(&self, side: Side) -> impl Iterator<Item = (Square, PieceInfo)> + '_ {
        self.squares
            .iter()
            .enumerate()
            .filter_map(move |(index, slot)| match slot {
                Some(info) if info.side == side => Some((Square::from(index), *info)),
                _ => None,
            })
    }

    pub fn to_fen_pieces(&self) -> String {
        let mut fen = String::new();

        for rank in (0..8).rev() {
            let mut empty_count = 0;
            for file in 0..8 {
                match self.squares[rank * 8 + file] {
                    Some(info) => {
                        if empty_count > 0 {
                            fen.push_str(&empty_count.to_string());
                            empty_count = 0;
                        }
                        fen.push(info.fen_char());
                    }
                    None => empty_count += 1,
                }
            }

            if empty_count > 0 {
                fen.push_str(&empty_count.to_string());
            }

            if rank > 0 {
                fen.push('/');
            }
        }

        fen
    }

    /// Inverse of [`Board::to_fen_pieces`]. Every piece starts with `has_moved == false`.
    pub fn place_pieces(&mut self, placement: &str) -> miette::Result<()> {
        let ranks: Vec<&str> = placement.split('/').collect();
        miette::ensure!(
            ranks.len() == 8,
            "Expected 8 ranks in piece placement, found {}",
            ranks.len()
        );
        *self = Self::empty();

        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i;
            let mut file = 0;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    miette::ensure!((1..=8).contains(&skip), "Invalid empty count {c}");
                    file += skip as usize;
                    continue;
                }
                let (piece, side) = Piece::from_fen_char(c)
                    .with_context(|| format!("Invalid piece char {c:?} in rank {}", rank + 1))?;
                let square = Square::from_coords(file, rank)
                    .with_context(|| format!("Rank {} overflows 8 files", rank + 1))?;
                self.set(square, PieceInfo::new(piece, side))?;
                file += 1;
            }
            miette::ensure!(
                file == 8,
                "Rank {} describes {file} files instead of 8",
                rank + 1
            );
        }
        Ok(())
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                match self.squares[rank * 8 + file] {
                    Some(info) => write!(f, "{} ", info.piece.icon(info.side))?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }
        write!(f, "  a b c d e f g h")
    }
}
