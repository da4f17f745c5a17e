pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod moves;
pub mod precomputed;
pub mod prelude;
pub mod utils;

pub use utils::log::init;

pub mod consts {
    pub const NUM_SQUARES: usize = 64;

    /// Plies without a pawn move or capture that raise the fifty-move flag
    pub const FIFTY_MOVE_PLIES: u32 = 100;
    pub const REPETITION_COUNT: usize = 3;

    pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    pub const KIWIPETE: &str =
        "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
}
pub use consts::*;
