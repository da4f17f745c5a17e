//! Two-step castling.
//!
//! The king moves first (e1 to g1 or c1), the paired rook follows as a
//! separate request (h1 to f1 or a1 to d1). Between the two steps the game is
//! [`CastlingState::InProgress`] and the turn does not pass.
//!
//! Rights are never stored. They are derived from the `has_moved` flags, the
//! occupancy of the squares between king and rook, and attack checks on the
//! king's path, evaluated fresh on each query.

use serde::Serialize;

use crate::{moves::attack::is_square_attacked, prelude::*};

#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum CastleSide {
    KingSide,
    QueenSide,
}

impl CastleSide {
    pub const BOTH: [CastleSide; 2] = [CastleSide::KingSide, CastleSide::QueenSide];

    const fn on_rank(side: Side, file: usize) -> Square {
        match Square::from_coords(file, side.back_row()) {
            Some(sq) => sq,
            None => unreachable!(),
        }
    }

    pub const fn king_from(side: Side) -> Square {
        Self::on_rank(side, 4)
    }

    pub const fn king_to(&self, side: Side) -> Square {
        match self {
            CastleSide::KingSide => Self::on_rank(side, 6),
            CastleSide::QueenSide => Self::on_rank(side, 2),
        }
    }

    pub const fn rook_from(&self, side: Side) -> Square {
        match self {
            CastleSide::KingSide => Self::on_rank(side, 7),
            CastleSide::QueenSide => Self::on_rank(side, 0),
        }
    }

    pub const fn rook_to(&self, side: Side) -> Square {
        match self {
            CastleSide::KingSide => Self::on_rank(side, 5),
            CastleSide::QueenSide => Self::on_rank(side, 3),
        }
    }

    /// Files strictly between king and rook, all of which must be empty
    const fn between_files(&self) -> &'static [usize] {
        match self {
            CastleSide::KingSide => &[5, 6],
            CastleSide::QueenSide => &[1, 2, 3],
        }
    }

    /// Files the king stands on, crosses, or lands on. None may be attacked.
    const fn king_path_files(&self) -> &'static [usize] {
        match self {
            CastleSide::KingSide => &[4, 5, 6],
            CastleSide::QueenSide => &[4, 3, 2],
        }
    }

    pub const fn is_kingside(&self) -> bool {
        matches!(self, CastleSide::KingSide)
    }

    /// The castle a king move from the home square to `to` would start, if any
    pub fn from_king_move(side: Side, from: Square, to: Square) -> Option<CastleSide> {
        if from != Self::king_from(side) {
            return None;
        }
        Self::BOTH.into_iter().find(|castle| castle.king_to(side) == to)
    }
}

/// In-progress tracker. `RightsAvailable` is never stored, see [`available_castles`].
#[derive(Debug, Default, Hash, PartialEq, Eq, Clone, Copy)]
pub enum CastlingState {
    #[default]
    Idle,
    InProgress { side: Side, castle: CastleSide },
}

impl CastlingState {
    pub const fn is_in_progress(&self) -> bool {
        matches!(self, CastlingState::InProgress { .. })
    }

    /// The rook that has to move next, and where it has to go
    pub const fn pending_rook(&self) -> Option<(Square, Square)> {
        match self {
            CastlingState::Idle => None,
            CastlingState::InProgress { side, castle } => {
                Some((castle.rook_from(*side), castle.rook_to(*side)))
            }
        }
    }

    pub const fn castle_side(&self) -> Option<CastleSide> {
        match self {
            CastlingState::Idle => None,
            CastlingState::InProgress { castle, .. } => Some(*castle),
        }
    }
}

fn unmoved(board: &Board, square: Square, piece: Piece, side: Side) -> bool {
    board
        .get_piece_at(square)
        .is_some_and(|info| info.is(piece, side) && !info.has_moved)
}

/// King and paired rook both on their home squares and never moved
pub fn has_right(board: &Board, side: Side, castle: CastleSide) -> bool {
    unmoved(board, CastleSide::king_from(side), Piece::King, side)
        && unmoved(board, castle.rook_from(side), Piece::Rook, side)
}

/// Full castling test: rights, empty squares between, no attacked square on the king's path
pub fn can_castle(board: &Board, side: Side, castle: CastleSide) -> bool {
    if !has_right(board, side, castle) {
        return false;
    }

    let rank = side.back_row();
    let on_rank = |file: usize| Square::from(rank * 8 + file);

    if castle
        .between_files()
        .iter()
        .any(|&file| board.is_occupied(on_rank(file)))
    {
        return false;
    }

    !castle
        .king_path_files()
        .iter()
        .any(|&file| is_square_attacked(board, on_rank(file), side))
}

/// King destinations offered for castling right now
pub fn castle_destinations(board: &Board, side: Side) -> BitBoard {
    let mut moves = BitBoard::EMPTY;
    for castle in CastleSide::BOTH {
        if can_castle(board, side, castle) {
            trace!("{side} may castle {castle:?}");
            moves.set(castle.king_to(side).index());
        }
    }
    moves
}

/// Rights in the FEN sense: only the `has_moved` flags matter
pub fn castling_rights(board: &Board) -> CastlingRights {
    collect_rights(|side, castle| has_right(board, side, castle))
}

/// Castles that could be started immediately by either side
pub fn available_castles(board: &Board) -> CastlingRights {
    collect_rights(|side, castle| can_castle(board, side, castle))
}

fn collect_rights(allowed: impl Fn(Side, CastleSide) -> bool) -> CastlingRights {
    let mut rights = CastlingRights::empty();
    for side in Side::SIDES {
        for castle in CastleSide::BOTH {
            if allowed(side, castle) {
                rights.add_right(CastlingRights::flag(side, castle.is_kingside()));
            }
        }
    }
    rights
}
