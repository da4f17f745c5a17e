use crate::prelude::*;

/// Squares a piece standing on `from` attacks, independent of whose turn it is.
/// Pawns only attack diagonally forward, pushes never attack.
pub fn attacks_from(from: Square, info: PieceInfo, occupied: BitBoard) -> BitBoard {
    let index = from.index();
    match info.piece {
        Piece::Pawn => MOVE_TABLES.get_pawn_attacks(index, info.side),
        Piece::Knight => MOVE_TABLES.knight_moves[index],
        Piece::King => MOVE_TABLES.king_moves[index],
        Piece::Bishop => MOVE_TABLES.sliding_attacks(index, &Direction::DIAG, occupied),
        Piece::Rook => MOVE_TABLES.sliding_attacks(index, &Direction::ORTHO, occupied),
        Piece::Queen => MOVE_TABLES.sliding_attacks(index, &Direction::ALL, occupied),
    }
}

/// True if any piece of the side opposing `defender` attacks `target`.
pub fn is_square_attacked(board: &Board, target: Square, defender: Side) -> bool {
    let attacker = defender.flip();
    let occupied = board.get_occupied_bb();
    board
        .pieces(attacker)
        .any(|(from, info)| attacks_from(from, info, occupied).contains_square(target.index()))
}

/// Whether `side`'s king is attacked.
///
/// # Panics
/// When `side` has no king on the board. Every reachable position has both
/// kings, so a missing one means the board was corrupted earlier.
pub fn is_in_check(board: &Board, side: Side) -> bool {
    match board.king_square(side) {
        Some(king_sq) => is_square_attacked(board, king_sq, side),
        None => {
            error!("No {side} king on board:\n{board}");
            panic!("{side} king is missing from the board");
        }
    }
}
