//! Legality filter.
//!
//! Every candidate destination is tried on the live board: the move is played,
//! the mover's king is tested for attack, and the board is restored exactly.
//! Candidates whose trial leaves the king attacked are dropped.

use crate::{
    moves::{attack::is_in_check, en_passant},
    prelude::*,
};

/// Everything needed to put the board back the way it was before a trial move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Simulation {
    pub from: Square,
    pub to: Square,
    /// Occupant of `from` before the trial, `has_moved` included
    pub moved: PieceInfo,
    pub captured: Option<PieceInfo>,
    pub en_passant_victim: Option<(Square, PieceInfo)>,
}

/// Plays `from -> to` on the board, capturing whatever stands on `to`. When the
/// move is an en passant capture the bypassed pawn is lifted too.
/// Returns `None` and leaves the board untouched when `from` is empty.
pub fn simulate(
    board: &mut Board,
    from: Square,
    to: Square,
    en_passant_target: Option<Square>,
) -> Option<Simulation> {
    let moved = board.get_piece_at(from)?;

    let en_passant_victim = if en_passant::is_en_passant(board, moved, to, en_passant_target) {
        let victim_sq = en_passant::victim_square(to, moved.side);
        board.take(victim_sq).map(|victim| (victim_sq, victim))
    } else {
        None
    };

    board.take(from);
    let captured = board.replace(to, Some(moved.moved()));

    Some(Simulation {
        from,
        to,
        moved,
        captured,
        en_passant_victim,
    })
}

/// Exact inverse of [`simulate`]
pub fn revert(board: &mut Board, sim: Simulation) {
    board.replace(sim.to, sim.captured);
    board.replace(sim.from, Some(sim.moved));
    if let Some((square, victim)) = sim.en_passant_victim {
        board.replace(square, Some(victim));
    }
}

/// Whether the mover's king is safe after playing `from -> to`
pub fn leaves_king_safe(
    board: &mut Board,
    from: Square,
    to: Square,
    en_passant_target: Option<Square>,
) -> bool {
    let Some(sim) = simulate(board, from, to, en_passant_target) else {
        return false;
    };
    let safe = !is_in_check(board, sim.moved.side);
    revert(board, sim);
    safe
}

/// Keeps the candidates that do not leave the mover's king attacked.
/// The board is identical before and after the call.
pub fn filter_legal(
    board: &mut Board,
    from: Square,
    candidates: BitBoard,
    en_passant_target: Option<Square>,
) -> BitBoard {
    let mut legal = BitBoard::EMPTY;
    for to in candidates.squares() {
        if leaves_king_safe(board, from, to, en_passant_target) {
            legal.set(to.index());
        } else {
            trace!("Dropping {from}{to}: king left in check");
        }
    }
    legal
}
