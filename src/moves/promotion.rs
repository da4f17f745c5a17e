use crate::prelude::*;

/// Promotion gate. While pending, the game accepts nothing but a piece choice (or undo).
#[derive(Debug, Default, Hash, PartialEq, Eq, Clone, Copy)]
pub enum PromotionState {
    #[default]
    Idle,
    Pending {
        square: Square,
        side: Side,
    },
}

impl PromotionState {
    pub const fn is_pending(&self) -> bool {
        matches!(self, PromotionState::Pending { .. })
    }

    pub const fn square(&self) -> Option<Square> {
        match self {
            PromotionState::Idle => None,
            PromotionState::Pending { square, .. } => Some(*square),
        }
    }
}

/// Pieces a pawn may become
pub const PROMOTION_PIECES: [Piece; 4] = [Piece::Queen, Piece::Rook, Piece::Bishop, Piece::Knight];

pub fn reaches_last_rank(info: PieceInfo, to: Square) -> bool {
    info.piece == Piece::Pawn && to.row() == info.side.promotion_row()
}

pub fn validate_choice(piece: Piece) -> Result<Piece, EngineError> {
    if PROMOTION_PIECES.contains(&piece) {
        Ok(piece)
    } else {
        Err(EngineError::InvalidPieceType(piece))
    }
}
