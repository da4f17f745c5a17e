use serde::Serialize;

use crate::{game::history::MoveRecord, moves::castling::CastleSide, prelude::*};

#[derive(Debug, Default, Hash, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum Outcome {
    #[default]
    InProgress,
    /// The side to move is mated
    Checkmate,
    Stalemate,
}

impl Outcome {
    pub const fn is_over(&self) -> bool {
        !matches!(self, Outcome::InProgress)
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::InProgress => write!(f, "in progress"),
            Outcome::Checkmate => write!(f, "checkmate"),
            Outcome::Stalemate => write!(f, "stalemate"),
        }
    }
}

/// How a step changed the board, decided before it is applied
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy, Serialize)]
pub enum MoveKind {
    Quiet,
    Capture,
    DoublePush,
    EnPassant,
    /// First half of a castle, the king's step
    CastleKing(CastleSide),
    /// Second half, the designated rook's step
    CastleRook(CastleSide),
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct AppliedMove {
    pub from: Square,
    pub to: Square,
    pub piece: PieceInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured: Option<PieceInfo>,
    pub kind: MoveKind,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct MoveOutcome {
    pub applied: AppliedMove,
    /// Square of a pawn waiting for [`crate::game::Game::promote`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_promotion: Option<Square>,
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct CastlingAvailability {
    pub white_kingside: bool,
    pub white_queenside: bool,
    pub black_kingside: bool,
    pub black_queenside: bool,
}

impl From<CastlingRights> for CastlingAvailability {
    fn from(rights: CastlingRights) -> Self {
        Self {
            white_kingside: rights.can_castle(Side::White, true),
            white_queenside: rights.can_castle(Side::White, false),
            black_kingside: rights.can_castle(Side::Black, true),
            black_queenside: rights.can_castle(Side::Black, false),
        }
    }
}

/// One played step as listed in [`GameStatus::moves`]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize)]
pub struct HistoryEntry {
    pub from: Square,
    pub to: Square,
    pub piece: Piece,
    pub side: Side,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured: Option<Piece>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion: Option<Piece>,
}

impl From<&MoveRecord> for HistoryEntry {
    fn from(record: &MoveRecord) -> Self {
        Self {
            from: record.from,
            to: record.to,
            piece: record.moved.piece,
            side: record.moved.side,
            captured: record.captured.map(|info| info.piece),
            promotion: record.promotion,
        }
    }
}

/// Read-only snapshot of everything a front end needs to render the game.
///
/// While a promotion is pending the turn has already passed but the outcome
/// is only decided once the piece is chosen, so `outcome` reads
/// [`Outcome::InProgress`] and `is_check` describes the board with the pawn
/// still on the last rank.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct GameStatus {
    pub fen: String,
    pub turn: Side,
    pub is_check: bool,
    pub outcome: Outcome,
    pub fifty_move_draw: bool,
    pub threefold_repetition: bool,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub en_passant: Option<Square>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_promotion: Option<Square>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub castling_in_progress: Option<CastleSide>,
    /// FEN of every position reached at a turn boundary, oldest first
    pub fen_history: Vec<String>,
    /// Castles either side could start right now
    pub castling_available: CastlingAvailability,
    pub moves: Vec<HistoryEntry>,
}

impl GameStatus {
    pub fn to_toml(&self) -> miette::Result<String> {
        toml::to_string_pretty(self)
            .into_diagnostic()
            .context("Serializing game status")
    }
}

impl Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.fen)?;
        write!(f, "{} to move, {}", self.turn, self.outcome)?;
        if self.is_check && !self.outcome.is_over() {
            write!(f, ", check")?;
        }
        if self.fifty_move_draw {
            write!(f, ", fifty-move rule may be claimed")?;
        }
        if self.threefold_repetition {
            write!(f, ", threefold repetition")?;
        }
        if let Some(sq) = self.pending_promotion {
            write!(f, ", promotion pending on {sq}")?;
        }
        if let Some(castle) = self.castling_in_progress {
            write!(f, ", {castle:?} castle in progress")?;
        }
        Ok(())
    }
}
