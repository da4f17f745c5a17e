//! The game state machine.
//!
//! [`Game`] owns the board and every piece of state derived from the moves
//! played: whose turn it is, the castling and promotion sub-machines, the en
//! passant window, the clocks, the draw flags and the undo/redo history.
//! Each executed step goes through the same pipeline: mutate the board and the
//! special-move state, update the half-move clock, then, if the turn passes,
//! record the position signature and recompute the outcome for the new mover.

use crate::{
    config::GameConfig,
    moves::{
        attack::is_in_check,
        castling::{self, CastleSide, CastlingState},
        en_passant,
        legality::filter_legal,
        move_gen::pseudo_legal_moves,
        promotion::{self, PromotionState},
    },
    prelude::*,
};

pub mod history;
pub mod status;

#[cfg(test)]
mod tests;

use history::{GameSnapshot, MoveRecord};
use status::{AppliedMove, GameStatus, HistoryEntry, MoveKind, MoveOutcome, Outcome};

/// Draw thresholds. Both flags are reported, never acted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rules {
    pub fifty_move_plies: u32,
    pub repetition_count: usize,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            fifty_move_plies: FIFTY_MOVE_PLIES,
            repetition_count: REPETITION_COUNT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    turn: Side,
    castling: CastlingState,
    en_passant: Option<Square>,
    promotion: PromotionState,
    halfmove_clock: u32,
    fullmove_number: u32,
    outcome: Outcome,
    fifty_move_draw: bool,
    threefold_repetition: bool,
    /// Signature of every position reached at a turn boundary, the first one included
    positions: Vec<String>,
    /// Full FEN of each entry in `positions`
    fen_history: Vec<String>,
    history: Vec<MoveRecord>,
    redo_stack: Vec<MoveRecord>,
    rules: Rules,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Standard starting position with the default draw rules
    pub fn new() -> Self {
        Self::from_parts(Board::new(), Side::White, None, 0, 1, Rules::default())
    }

    pub fn from_fen(fen: &str) -> miette::Result<Self> {
        Self::from_fen_with_rules(fen, Rules::default())
    }

    pub fn with_config(config: &GameConfig) -> miette::Result<Self> {
        config.validate()?;
        let rules = Rules {
            fifty_move_plies: config.fifty_move_plies,
            repetition_count: config.repetition_count,
        };
        Self::from_fen_with_rules(&config.start_fen, rules)
    }

    fn from_fen_with_rules(fen: &str, rules: Rules) -> miette::Result<Self> {
        let parsed = fen::parse_fen(fen)?;
        let castling_rights = castling::castling_rights(&parsed.board);
        if castling_rights != parsed.castling {
            warn!(
                "Castling rights {} in {fen:?} do not match the board, using {castling_rights}",
                parsed.castling
            );
        }
        Ok(Self::from_parts(
            parsed.board,
            parsed.turn,
            parsed.en_passant,
            parsed.halfmove_clock,
            parsed.fullmove_number,
            rules,
        ))
    }

    fn from_parts(
        board: Board,
        turn: Side,
        en_passant: Option<Square>,
        halfmove_clock: u32,
        fullmove_number: u32,
        rules: Rules,
    ) -> Self {
        let mut game = Self {
            board,
            turn,
            castling: CastlingState::Idle,
            en_passant,
            promotion: PromotionState::Idle,
            halfmove_clock,
            fullmove_number,
            outcome: Outcome::InProgress,
            fifty_move_draw: halfmove_clock >= rules.fifty_move_plies,
            threefold_repetition: false,
            positions: Vec::new(),
            fen_history: Vec::new(),
            history: Vec::new(),
            redo_stack: Vec::new(),
            rules,
        };
        game.conclude_turn();
        game
    }

    pub const fn board(&self) -> &Board {
        &self.board
    }

    pub const fn turn(&self) -> Side {
        self.turn
    }

    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub const fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    pub const fn castling_state(&self) -> CastlingState {
        self.castling
    }

    pub const fn pending_promotion(&self) -> Option<Square> {
        self.promotion.square()
    }

    pub const fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub const fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub const fn is_fifty_move_draw(&self) -> bool {
        self.fifty_move_draw
    }

    pub const fn is_threefold_repetition(&self) -> bool {
        self.threefold_repetition
    }

    pub fn is_check(&self) -> bool {
        is_in_check(&self.board, self.turn)
    }

    pub fn history(&self) -> &[MoveRecord] {
        &self.history
    }

    /// Repetition signatures of the positions reached so far, see [`Game::position_key`]
    pub fn positions(&self) -> &[String] {
        &self.positions
    }

    pub fn fen_history(&self) -> &[String] {
        &self.fen_history
    }

    /// Legal destinations of the mover's piece on `square`.
    ///
    /// The board is mutated while candidates are tried and is restored before
    /// this returns, so calling it twice yields the same squares.
    pub fn select_piece(&mut self, square: Square) -> Result<Vec<Square>, EngineError> {
        self.ensure_no_pending_promotion()?;
        let info = self
            .board
            .get_piece_at(square)
            .ok_or(EngineError::NoPieceAtSquare(square))?;
        if info.side != self.turn {
            return Err(EngineError::NotMoversTurn {
                square,
                turn: self.turn,
            });
        }
        Ok(self.legal_destinations(square).squares().collect())
    }

    /// Every legal (from, to) pair for the side to move. While a castle is in
    /// progress that is the designated rook's step only.
    pub fn legal_moves(&mut self) -> Vec<(Square, Square)> {
        if self.promotion.is_pending() {
            return Vec::new();
        }
        let origins: Vec<Square> = self.board.pieces(self.turn).map(|(sq, _)| sq).collect();
        let mut moves = Vec::new();
        for from in origins {
            moves.extend(self.legal_destinations(from).squares().map(|to| (from, to)));
        }
        moves
    }

    pub fn execute_move(&mut self, from: Square, to: Square) -> Result<MoveOutcome, EngineError> {
        self.ensure_no_pending_promotion()?;
        let info = self
            .board
            .get_piece_at(from)
            .ok_or(EngineError::NoPieceAtOrigin(from))?;
        if info.side != self.turn {
            return Err(EngineError::NotMoversTurn {
                square: from,
                turn: self.turn,
            });
        }
        if !self.legal_destinations(from).contains_square(to.index()) {
            return Err(EngineError::IllegalDestination { from, to });
        }

        self.redo_stack.clear();
        let applied = self.apply(from, to, info);
        Ok(MoveOutcome {
            applied,
            pending_promotion: self.promotion.square(),
        })
    }

    /// Replaces the pawn waiting on the last rank
    pub fn promote(&mut self, piece: Piece) -> Result<PieceInfo, EngineError> {
        let PromotionState::Pending { square, side } = self.promotion else {
            return Err(EngineError::NoPendingPromotion);
        };
        let piece = promotion::validate_choice(piece)?;

        let promoted = PieceInfo::new(piece, side).moved();
        self.board.replace(square, Some(promoted));
        self.promotion = PromotionState::Idle;
        if let Some(record) = self.history.last_mut() {
            record.promotion = Some(piece);
        }
        debug!("{side} pawn on {square} promoted to {piece}");

        self.conclude_turn();
        Ok(promoted)
    }

    pub fn undo(&mut self) -> Result<(), EngineError> {
        let record = self.history.pop().ok_or(EngineError::NothingToUndo)?;
        self.restore(&record.prior);
        debug!("Undid {record}");
        self.redo_stack.push(record);
        Ok(())
    }

    /// Replays the last undone step, promotion choice included
    pub fn redo(&mut self) -> Result<(), EngineError> {
        self.ensure_no_pending_promotion()?;
        let record = self.redo_stack.pop().ok_or(EngineError::NothingToRedo)?;
        let info = self
            .board
            .get_piece_at(record.from)
            .ok_or(EngineError::NoPieceAtOrigin(record.from))?;
        self.apply(record.from, record.to, info);
        if let Some(piece) = record.promotion {
            self.promote(piece)?;
        }
        debug!("Redid {record}");
        Ok(())
    }

    pub fn to_fen(&self) -> String {
        fen::write_fen(
            &self.board,
            self.turn,
            self.en_passant,
            self.halfmove_clock,
            self.fullmove_number,
        )
    }

    /// Board, side to move, castling rights and en passant square: the part of
    /// a position that decides repetition
    pub fn position_key(&self) -> String {
        let en_passant = self
            .en_passant
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());
        format!(
            "{} {} {} {}",
            self.board.to_fen_pieces(),
            self.turn.fen_char(),
            castling::castling_rights(&self.board),
            en_passant
        )
    }

    pub fn status(&self) -> GameStatus {
        GameStatus {
            fen: self.to_fen(),
            turn: self.turn,
            is_check: self.is_check(),
            outcome: match self.promotion {
                PromotionState::Pending { .. } => Outcome::InProgress,
                PromotionState::Idle => self.outcome,
            },
            fifty_move_draw: self.fifty_move_draw,
            threefold_repetition: self.threefold_repetition,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            en_passant: self.en_passant,
            pending_promotion: self.promotion.square(),
            castling_in_progress: self.castling.castle_side(),
            fen_history: self.fen_history.clone(),
            castling_available: castling::available_castles(&self.board).into(),
            moves: self.history.iter().map(HistoryEntry::from).collect(),
        }
    }

    fn ensure_no_pending_promotion(&self) -> Result<(), EngineError> {
        match self.promotion.square() {
            Some(square) => Err(EngineError::PromotionPending(square)),
            None => Ok(()),
        }
    }

    fn legal_destinations(&mut self, from: Square) -> BitBoard {
        let Some(info) = self.board.get_piece_at(from) else {
            return BitBoard::EMPTY;
        };

        let candidates = match self.castling.pending_rook() {
            Some((rook_from, rook_to)) if rook_from == from => BitBoard::from_square(rook_to),
            Some(_) => return BitBoard::EMPTY,
            None => {
                let mut candidates = pseudo_legal_moves(&self.board, from);
                match info.piece {
                    Piece::Pawn => {
                        candidates |= en_passant::capture_destination(
                            &self.board,
                            from,
                            info.side,
                            self.en_passant,
                        )
                    }
                    Piece::King => candidates |= castling::castle_destinations(&self.board, info.side),
                    _ => {}
                }
                candidates
            }
        };

        filter_legal(&mut self.board, from, candidates, self.en_passant)
    }

    fn classify(&self, from: Square, to: Square, info: PieceInfo) -> MoveKind {
        if let Some(castle) = self.castling.castle_side() {
            return MoveKind::CastleRook(castle);
        }
        if info.piece == Piece::King && !info.has_moved {
            if let Some(castle) = CastleSide::from_king_move(info.side, from, to) {
                return MoveKind::CastleKing(castle);
            }
        }
        if en_passant::is_en_passant(&self.board, info, to, self.en_passant) {
            return MoveKind::EnPassant;
        }
        if self.board.is_occupied(to) {
            return MoveKind::Capture;
        }
        if en_passant::target_after(from, to, info).is_some() {
            return MoveKind::DoublePush;
        }
        MoveKind::Quiet
    }

    /// Plays an already validated step
    fn apply(&mut self, from: Square, to: Square, info: PieceInfo) -> AppliedMove {
        let prior = self.snapshot();
        let kind = self.classify(from, to, info);

        let en_passant_victim = match kind {
            MoveKind::EnPassant => self
                .board
                .take(en_passant::victim_square(to, info.side)),
            _ => None,
        };
        self.board.take(from);
        let captured = self.board.replace(to, Some(info.moved())).or(en_passant_victim);

        self.halfmove_clock = match kind {
            MoveKind::CastleRook(_) => self.halfmove_clock,
            _ if info.piece == Piece::Pawn || captured.is_some() => 0,
            _ => self.halfmove_clock + 1,
        };
        self.fifty_move_draw = self.halfmove_clock >= self.rules.fifty_move_plies;

        self.en_passant = en_passant::target_after(from, to, info);
        self.castling = match kind {
            MoveKind::CastleKing(castle) => CastlingState::InProgress {
                side: info.side,
                castle,
            },
            _ => CastlingState::Idle,
        };
        if promotion::reaches_last_rank(info, to) {
            self.promotion = PromotionState::Pending {
                square: to,
                side: info.side,
            };
        }

        debug!("{} {from}{to} ({kind:?})", info);
        self.history.push(MoveRecord {
            from,
            to,
            moved: info,
            captured,
            kind,
            promotion: None,
            prior,
        });

        if !self.castling.is_in_progress() {
            if self.turn == Side::Black {
                self.fullmove_number += 1;
            }
            self.turn = self.turn.flip();
            if !self.promotion.is_pending() {
                self.conclude_turn();
            }
        }

        AppliedMove {
            from,
            to,
            piece: info,
            captured,
            kind,
        }
    }

    /// Records the position the new mover faces and decides the outcome for it
    fn conclude_turn(&mut self) {
        let key = self.position_key();
        let occurrences = self.positions.iter().filter(|p| **p == key).count() + 1;
        self.positions.push(key);
        self.fen_history.push(self.to_fen());
        if occurrences >= self.rules.repetition_count && !self.threefold_repetition {
            info!("Position repeated {occurrences} times");
            self.threefold_repetition = true;
        }
        if self.fifty_move_draw {
            debug!("{} plies without pawn move or capture", self.halfmove_clock);
        }

        let has_moves = !self.legal_moves().is_empty();
        self.outcome = match (has_moves, self.is_check()) {
            (true, _) => Outcome::InProgress,
            (false, true) => Outcome::Checkmate,
            (false, false) => Outcome::Stalemate,
        };
        if self.outcome.is_over() {
            info!("{} with {} to move", self.outcome, self.turn);
        }
    }

    fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board,
            turn: self.turn,
            castling: self.castling,
            en_passant: self.en_passant,
            promotion: self.promotion,
            halfmove_clock: self.halfmove_clock,
            fullmove_number: self.fullmove_number,
            outcome: self.outcome,
            fifty_move_draw: self.fifty_move_draw,
            threefold_repetition: self.threefold_repetition,
            positions_len: self.positions.len(),
        }
    }

    fn restore(&mut self, snapshot: &GameSnapshot) {
        self.board = snapshot.board;
        self.turn = snapshot.turn;
        self.castling = snapshot.castling;
        self.en_passant = snapshot.en_passant;
        self.promotion = snapshot.promotion;
        self.halfmove_clock = snapshot.halfmove_clock;
        self.fullmove_number = snapshot.fullmove_number;
        self.outcome = snapshot.outcome;
        self.fifty_move_draw = snapshot.fifty_move_draw;
        self.threefold_repetition = snapshot.threefold_repetition;
        self.positions.truncate(snapshot.positions_len);
        self.fen_history.truncate(snapshot.positions_len);
    }
}
