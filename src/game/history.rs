use crate::{
    game::status::{MoveKind, Outcome},
    moves::{castling::CastlingState, promotion::PromotionState},
    prelude::*,
};

/// Everything [`crate::game::Game`] derives from the moves played, captured
/// just before a step so undo can put it back bit for bit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub board: Board,
    pub turn: Side,
    pub castling: CastlingState,
    pub en_passant: Option<Square>,
    pub promotion: PromotionState,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
    pub outcome: Outcome,
    pub fifty_move_draw: bool,
    pub threefold_repetition: bool,
    /// Length of the position signature list at the time
    pub positions_len: usize,
}

/// One executed step. Castling produces two records, one per piece, and a
/// resolved promotion is folded into the pawn move that caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub from: Square,
    pub to: Square,
    pub moved: PieceInfo,
    pub captured: Option<PieceInfo>,
    pub kind: MoveKind,
    pub promotion: Option<Piece>,
    pub prior: GameSnapshot,
}

impl Display for MoveRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(piece) = self.promotion {
            write!(f, "{}", PieceInfo::new(piece, Side::Black).fen_char())?;
        }
        Ok(())
    }
}
