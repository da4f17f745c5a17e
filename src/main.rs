use std::io::{BufRead, Write};

use castellan::prelude::*;
use clap::Parser;

fn main() -> miette::Result<()> {
    init();

    let span = span!(Level::DEBUG, "main");
    let _guard = span.enter();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => GameConfig::load_from_file(path)?,
        None => GameConfig::default(),
    };
    config.apply_logging()?;

    match cli.command {
        Some(Commands::Play { fen }) => {
            let config = GameConfig {
                start_fen: fen.unwrap_or_else(|| config.start_fen.clone()),
                ..config
            };
            trace!("Starting game with fen: {:?}", config.start_fen);
            game_loop(&config)?;
        }
        Some(Commands::Perft { fen, depth, divide }) => {
            trace!("Running perft with fen: {fen:?}, depth: {depth}, divide: {divide}");
            let mut game = Game::from_fen(&fen)?;
            println!("{}", game.board());
            if divide {
                perft_divide(&mut game, depth)?;
            } else {
                run_perft_suite(&mut game, depth)?;
            }
        }
        Some(Commands::Status { fen }) => {
            let game = Game::from_fen(&fen)?;
            println!("{}", game.status().to_toml()?);
        }
        None => {
            println!("Starting default game");
            game_loop(&config)?;
        }
    }
    Ok(())
}

fn game_loop(config: &GameConfig) -> miette::Result<()> {
    let mut game = Game::with_config(config)?;
    println!("{}", game.board());
    println!("{}", game.status());

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{} > ", game.turn());
        std::io::stdout().flush().into_diagnostic()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.into_diagnostic()?;
        let words = match shell_words::split(&line) {
            Ok(words) if words.is_empty() => continue,
            Ok(words) => words,
            Err(e) => {
                warn!("Could not parse input: {e}");
                continue;
            }
        };

        let cmd = match GameCommand::try_parse_from(words) {
            Ok(cmd) => cmd.cmd,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match run_command(&mut game, cmd, config) {
            Ok(true) => break,
            Ok(false) => {}
            Err(e) => warn!("{e:?}"),
        }
    }
    Ok(())
}

/// Returns true when the loop should stop
fn run_command(game: &mut Game, cmd: GameSubcommand, config: &GameConfig) -> miette::Result<bool> {
    match cmd {
        GameSubcommand::Select { square } => {
            let square = Square::from_str(&square)?;
            let moves = game.select_piece(square)?;
            let moves: Vec<String> = moves.iter().map(|s| s.to_string()).collect();
            println!("{square}: {}", moves.join(" "));
        }
        GameSubcommand::Move { from, to } => {
            let from = Square::from_str(&from)?;
            let to = Square::from_str(&to)?;
            let outcome = game.execute_move(from, to)?;
            println!("{}", game.board());
            if let Some(square) = outcome.pending_promotion {
                println!("Pawn on {square} promotes, choose with `promote <piece>`");
            } else if let Some((rook_from, rook_to)) = game.castling_state().pending_rook() {
                println!("Complete the castle with `move {rook_from} {rook_to}`");
            } else {
                println!("{}", game.status());
            }
        }
        GameSubcommand::Promote { piece } => {
            let piece = Piece::from_str(&piece)?;
            let promoted = game.promote(piece)?;
            println!("{}", game.board());
            println!("Promoted to {promoted}");
            println!("{}", game.status());
        }
        GameSubcommand::Undo => {
            game.undo()?;
            println!("{}", game.board());
        }
        GameSubcommand::Redo => {
            game.redo()?;
            println!("{}", game.board());
        }
        GameSubcommand::Fen { set } => match set {
            Some(fen) => {
                let config = GameConfig {
                    start_fen: fen,
                    ..config.clone()
                };
                *game = Game::with_config(&config)?;
                println!("{}", game.board());
            }
            None => println!("{}", game.to_fen()),
        },
        GameSubcommand::Status { toml } => {
            if toml {
                println!("{}", game.status().to_toml()?);
            } else {
                println!("{}", game.status());
            }
        }
        GameSubcommand::Print => println!("{}", game.board()),
        GameSubcommand::Log { level } => {
            let level = Level::from_str(&level).into_diagnostic()?;
            set_log_level(level)?;
        }
        GameSubcommand::Clear => utils::clear_screen()?,
        GameSubcommand::Quit => return Ok(true),
    }
    Ok(false)
}
