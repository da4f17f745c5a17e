//! One-ply en passant window.
//!
//! The target is the square a double-pushed pawn skipped over. It is valid for
//! exactly the next ply and the game clears it after every other move.

use crate::prelude::*;

/// Target left behind by a move: the midpoint of a two-square pawn advance, else none.
pub fn target_after(from: Square, to: Square, moved: PieceInfo) -> Option<Square> {
    if moved.piece == Piece::Pawn && from.col() == to.col() && from.row().abs_diff(to.row()) == 2 {
        return Some(Square::from((from.index() + to.index()) / 2));
    }
    None
}

/// Square of the pawn removed when `capturer` lands on `target`: one rank
/// behind the target from the capturer's point of view.
pub fn victim_square(target: Square, capturer: Side) -> Square {
    match capturer {
        Side::White => Square::from(target.index() - 8),
        Side::Black => Square::from(target.index() + 8),
    }
}

/// The en passant destination available to a pawn of `side` on `from`, if any.
///
/// The capturing pawn must stand abreast of the double-pushed pawn (same rank,
/// adjacent file) and the target must be one rank ahead of it in its own push
/// direction. A pawn behind the victim, or one moving the wrong way, never
/// qualifies.
pub fn capture_destination(
    board: &Board,
    from: Square,
    side: Side,
    target: Option<Square>,
) -> BitBoard {
    let Some(target) = target else {
        return BitBoard::EMPTY;
    };
    let Some(ahead) = from.offset(side.pawn_direction(), 0) else {
        return BitBoard::EMPTY;
    };
    if ahead.row() != target.row() || from.col().abs_diff(target.col()) != 1 {
        return BitBoard::EMPTY;
    }

    let victim = victim_square(target, side);
    let victim_is_enemy_pawn = board
        .get_piece_at(victim)
        .is_some_and(|info| info.is(Piece::Pawn, side.flip()));

    if victim.row() == from.row() && !board.is_occupied(target) && victim_is_enemy_pawn {
        trace!("En passant available from {from} to {target}");
        BitBoard::from_square(target)
    } else {
        BitBoard::EMPTY
    }
}

/// Whether moving `moved` from `from` to `to` is an en passant capture given the current target
pub fn is_en_passant(board: &Board, moved: PieceInfo, to: Square, target: Option<Square>) -> bool {
    moved.piece == Piece::Pawn && target == Some(to) && !board.is_occupied(to)
}
