pub use crate::board::fen;
pub use crate::board::{
    self, Board,
    components::{BitBoard, BitBoardIterator, CastlingRights, Piece, PieceInfo, Side, Square},
};
pub use crate::config::GameConfig;
pub use crate::consts::*;
pub use crate::error::EngineError;
pub use crate::game::{
    self, Game,
    status::{GameStatus, Outcome},
};
pub use crate::moves::{self, Direction};
pub use crate::precomputed::move_tables::MOVE_TABLES;
pub use crate::utils::{self, cli::*, log::*, perft::*};
pub use miette::{self, Context, IntoDiagnostic, Result};
pub use crate::moves::move_gen;
pub use std::fmt::Display;
pub use std::str::FromStr;
pub use tracing::{Level, debug, error, info, span, trace, warn};
