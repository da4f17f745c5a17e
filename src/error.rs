use std::{error::Error, fmt};

use crate::prelude::*;

/// Rejected requests. None of them leave a mark on the game: the board and every
/// piece of derived state are exactly as they were before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineError {
    NoPieceAtSquare(Square),
    NoPieceAtOrigin(Square),
    NotMoversTurn { square: Square, turn: Side },
    IllegalDestination { from: Square, to: Square },
    NoPendingPromotion,
    InvalidPieceType(Piece),
    /// A pawn on this square still waits for its replacement
    PromotionPending(Square),
    NothingToUndo,
    NothingToRedo,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::NoPieceAtSquare(sq) => write!(f, "no piece at {sq}"),
            EngineError::NoPieceAtOrigin(sq) => write!(f, "no piece to move at {sq}"),
            EngineError::NotMoversTurn { square, turn } => {
                write!(f, "piece at {square} does not belong to {turn}, the side to move")
            }
            EngineError::IllegalDestination { from, to } => {
                write!(f, "{from}{to} is not a legal move")
            }
            EngineError::NoPendingPromotion => f.write_str("no promotion is pending"),
            EngineError::InvalidPieceType(piece) => {
                write!(f, "cannot promote to {piece:?}")
            }
            EngineError::PromotionPending(sq) => {
                write!(f, "promotion on {sq} must be resolved first")
            }
            EngineError::NothingToUndo => f.write_str("no move to undo"),
            EngineError::NothingToRedo => f.write_str("no move to redo"),
        }
    }
}

impl Error for EngineError {}

impl miette::Diagnostic for EngineError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self {
            EngineError::NoPieceAtSquare(_) => "castellan::no_piece_at_square",
            EngineError::NoPieceAtOrigin(_) => "castellan::no_piece_at_origin",
            EngineError::NotMoversTurn { .. } => "castellan::not_movers_turn",
            EngineError::IllegalDestination { .. } => "castellan::illegal_destination",
            EngineError::NoPendingPromotion => "castellan::no_pending_promotion",
            EngineError::InvalidPieceType(_) => "castellan::invalid_piece_type",
            EngineError::PromotionPending(_) => "castellan::promotion_pending",
            EngineError::NothingToUndo => "castellan::nothing_to_undo",
            EngineError::NothingToRedo => "castellan::nothing_to_redo",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match self {
            EngineError::NotMoversTurn { turn, .. } => format!("select a {turn} piece"),
            EngineError::IllegalDestination { from, .. } => {
                format!("run `select {from}` to list the legal destinations")
            }
            EngineError::InvalidPieceType(_) | EngineError::PromotionPending(_) => {
                "promote to one of: queen, rook, bishop, knight".to_string()
            }
            _ => return None,
        };
        Some(Box::new(help))
    }
}
