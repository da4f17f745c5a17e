//! Pseudo-legal move generation
//!
//! Each generator returns the destinations a piece could reach by its movement
//! pattern and the blocking/capture rules alone. Whether the move leaves the
//! mover's king in check is decided later by [`crate::moves::legality`].
//! Castling and en passant live in their own modules.

use crate::prelude::*;

/// Dispatches on the occupant of `from`. An empty square yields no moves.
pub fn pseudo_legal_moves(board: &Board, from: Square) -> BitBoard {
    let Some(info) = board.get_piece_at(from) else {
        return BitBoard::EMPTY;
    };
    let side = info.side;
    match info.piece {
        Piece::Pawn => gen_pawn_moves(board, from, side),
        Piece::Knight => gen_knight_moves(board, from, side),
        Piece::Bishop => gen_sliding_moves(board, from, side, &Direction::DIAG),
        Piece::Rook => gen_sliding_moves(board, from, side, &Direction::ORTHO),
        Piece::Queen => gen_sliding_moves(board, from, side, &Direction::ALL),
        Piece::King => gen_king_moves(board, from, side),
    }
}

pub fn gen_pawn_moves(board: &Board, from: Square, side: Side) -> BitBoard {
    let mut moves = BitBoard::EMPTY;
    let dir = side.pawn_direction();

    // Pushes
    if let Some(one_step) = from.offset(dir, 0) {
        if !board.is_occupied(one_step) {
            moves.set(one_step.index());

            if from.row() == side.pawn_start_row() {
                if let Some(two_steps) = from.offset(2 * dir, 0) {
                    if !board.is_occupied(two_steps) {
                        moves.set(two_steps.index());
                    }
                }
            }
        }
    }

    // Captures
    let enemy_pieces = board.get_side_bb(side.flip());
    moves |= MOVE_TABLES.get_pawn_attacks(from.index(), side) & enemy_pieces;

    moves
}

pub fn gen_knight_moves(board: &Board, from: Square, side: Side) -> BitBoard {
    MOVE_TABLES.knight_moves[from.index()] & !board.get_side_bb(side)
}

/// Adjacent squares only, castling destinations come from [`crate::moves::castling`]
pub fn gen_king_moves(board: &Board, from: Square, side: Side) -> BitBoard {
    MOVE_TABLES.king_moves[from.index()] & !board.get_side_bb(side)
}

/// Walks every ray in `dirs` until the first occupied square, keeping that
/// square only when it holds an enemy piece.
pub fn gen_sliding_moves(board: &Board, from: Square, side: Side, dirs: &[Direction]) -> BitBoard {
    let ally_pieces = board.get_side_bb(side);
    let occupied = board.get_occupied_bb();
    MOVE_TABLES.sliding_attacks(from.index(), dirs, occupied) & !ally_pieces
}
