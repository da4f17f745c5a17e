use std::time::{Duration, Instant};

use crate::{moves::promotion::PROMOTION_PIECES, prelude::*};

/// A castle counts as one move, each promotion choice as its own move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerftMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<Piece>,
}

impl Display for PerftMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(piece) = self.promotion {
            write!(f, "{}", PieceInfo::new(piece, Side::Black).fen_char())?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct PerftResult {
    /// Total nodes counted
    pub nodes: u64,
    /// Time taken
    pub duration: Duration,
    /// Nodes per second
    pub nps: u64,
    /// Move breakdown showing count for each move
    pub move_counts: Option<Vec<(PerftMove, u64)>>,
}

impl PerftResult {
    /// Creates a new PerftResult with the given data
    pub fn new(nodes: u64, duration: Duration, move_counts: Option<Vec<(PerftMove, u64)>>) -> Self {
        let nanos = duration.as_nanos();
        let nps = if nanos > 0 {
            (nodes as u128 * 1_000_000_000 / nanos) as u64
        } else {
            0
        };

        Self {
            nodes,
            duration,
            nps,
            move_counts,
        }
    }
}

/// Plays `mv` through the public game interface, finishing a castle with its rook step
fn make(game: &mut Game, mv: PerftMove) -> Result<usize, EngineError> {
    let outcome = game.execute_move(mv.from, mv.to)?;
    let mut steps = 1;
    if let Some((rook_from, rook_to)) = game.castling_state().pending_rook() {
        game.execute_move(rook_from, rook_to)?;
        steps += 1;
    }
    if outcome.pending_promotion.is_some() {
        let piece = mv.promotion.unwrap_or(Piece::Queen);
        game.promote(piece)?;
    }
    Ok(steps)
}

fn unmake(game: &mut Game, steps: usize) -> Result<(), EngineError> {
    for _ in 0..steps {
        game.undo()?;
    }
    Ok(())
}

/// Legal moves of the side to move, promotions expanded to one entry per piece
pub fn perft_moves(game: &mut Game) -> Vec<PerftMove> {
    let mut moves = Vec::new();
    for (from, to) in game.legal_moves() {
        let promotes = game
            .board()
            .get_piece_at(from)
            .is_some_and(|info| crate::moves::promotion::reaches_last_rank(info, to));
        if promotes {
            moves.extend(PROMOTION_PIECES.iter().map(|&piece| PerftMove {
                from,
                to,
                promotion: Some(piece),
            }));
        } else {
            moves.push(PerftMove {
                from,
                to,
                promotion: None,
            });
        }
    }
    moves
}

fn count_nodes(game: &mut Game, depth: u8) -> Result<u64, EngineError> {
    if depth == 0 {
        return Ok(1);
    }
    let moves = perft_moves(game);
    if depth == 1 {
        return Ok(moves.len() as u64);
    }

    let mut nodes = 0;
    for mv in moves {
        let steps = make(game, mv)?;
        nodes += count_nodes(game, depth - 1)?;
        unmake(game, steps)?;
    }
    Ok(nodes)
}

pub fn perft(game: &mut Game, depth: u8, divide: bool) -> Result<PerftResult, EngineError> {
    let start_time = Instant::now();

    if !divide {
        let nodes = count_nodes(game, depth)?;
        return Ok(PerftResult::new(nodes, start_time.elapsed(), None));
    }

    let mut total_nodes = 0;
    let mut move_counts = Vec::new();
    for mv in perft_moves(game) {
        let steps = make(game, mv)?;
        let sub_nodes = count_nodes(game, depth.saturating_sub(1))?;
        unmake(game, steps)?;

        total_nodes += sub_nodes;
        move_counts.push((mv, sub_nodes));
    }

    Ok(PerftResult::new(
        total_nodes,
        start_time.elapsed(),
        Some(move_counts),
    ))
}

/// Performs a Perft test and prints a detailed breakdown
pub fn perft_divide(game: &mut Game, depth: u8) -> Result<PerftResult, EngineError> {
    println!("Starting perft...");
    let result = perft(game, depth, true)?;

    if let Some(ref move_counts) = result.move_counts {
        println!("Perft results at depth {depth}");
        println!("----------------------------");

        for (mov, count) in move_counts {
            println!("{mov}: {count}");
        }

        println!("----------------------------");
        println!("Total nodes: {}", result.nodes);
        println!("Time: {} ms", result.duration.as_millis());
        println!("Nodes per second: {}", result.nps);
    }

    Ok(result)
}

/// Runs a suite of perft tests for depths 1 through max_depth
pub fn run_perft_suite(game: &mut Game, max_depth: u8) -> Result<(), EngineError> {
    println!("Running Perft suite up to depth {max_depth}");
    println!("----------------------------");

    for depth in 1..=max_depth {
        let result = perft(game, depth, false)?;
        println!(
            "Depth {}: {} nodes in {} ms ({} nps)",
            depth,
            result.nodes,
            result.duration.as_millis(),
            result.nps
        );
    }

    println!("----------------------------");
    Ok(())
}
