use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::START_FEN;

#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"), version = env!("APP_VERSION"), about = env!("CARGO_PKG_DESCRIPTION"))]
pub struct Cli {
    /// TOML file with game and logging settings
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive game from the given FEN, or the configured start position
    Play {
        /// FEN string for starting position
        #[arg(short, long)]
        fen: Option<String>,
    },

    /// Run perft on game with given FEN and depth, or use default fen
    Perft {
        /// FEN string for starting position
        #[arg(short, long, default_value = START_FEN)]
        fen: String,
        /// set search depth
        #[arg(short, long, default_value = "3")]
        depth: u8,
        /// set divide flag
        #[arg(long, default_value = "false")]
        divide: bool,
    },

    /// Print the status of a position
    Status {
        /// FEN string for the position
        #[arg(short, long, default_value = START_FEN)]
        fen: String,
    },
}

#[derive(Parser, Debug)]
#[command(name = "game_cmd", no_binary_name = true)]
pub struct GameCommand {
    #[command(subcommand)]
    pub cmd: GameSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum GameSubcommand {
    /// List the legal destinations of a piece
    #[clap(visible_alias = "s")]
    Select { square: String },

    /// Make a move on the board
    #[clap(visible_alias = "m")]
    Move { from: String, to: String },

    /// Choose the piece for a pawn waiting on the last rank
    #[clap(visible_alias = "pr")]
    Promote { piece: String },

    /// Undo the last step
    #[clap(visible_alias = "u")]
    Undo,

    /// Redo the last undone step
    #[clap(visible_alias = "r")]
    Redo,

    /// Show the current fen of the board, or load a new one
    #[clap(visible_alias = "f")]
    Fen { set: Option<String> },

    /// Show the game status
    #[clap(visible_alias = "st")]
    Status {
        /// Print as TOML
        #[arg(short, default_value = "false")]
        toml: bool,
    },

    /// Print the current board state
    #[clap(visible_alias = "p")]
    Print,

    /// Change the console log level
    #[clap(visible_alias = "l")]
    Log { level: String },

    /// Clear screen
    #[clap(visible_alias = "c")]
    Clear,

    /// Quit game
    #[clap(visible_alias = "q")]
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_command_aliases() {
        let cmd = GameCommand::try_parse_from(["m", "e2", "e4"]).unwrap();
        assert!(matches!(cmd.cmd, GameSubcommand::Move { ref from, ref to } if from == "e2" && to == "e4"));

        let cmd = GameCommand::try_parse_from(["promote", "queen"]).unwrap();
        assert!(matches!(cmd.cmd, GameSubcommand::Promote { ref piece } if piece == "queen"));

        assert!(GameCommand::try_parse_from(["fly"]).is_err());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["castellan", "perft", "-d", "2", "--divide"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Perft { depth: 2, divide: true, .. })
        ));

        let cli = Cli::try_parse_from(["castellan", "--config", "game.toml", "play"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("game.toml")));
    }
}
