use std::env;

use castellan::prelude::*;

fn main() -> miette::Result<()> {
    castellan::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        println!("Usage: perft [depth] [fen]");
        println!("    depth: Depth to search");
        println!("    fen: (optional) FEN string for position");
        return Ok(());
    }

    let depth = match args[1].parse::<u8>() {
        Ok(d) => d,
        Err(_) => {
            println!("Invalid depth: {}", args[1]);
            return Ok(());
        }
    };

    let mut game = if args.len() > 2 {
        Game::from_fen(&args[2])?
    } else {
        Game::new()
    };

    if depth == 0 {
        println!("running suite");
        run_perft_suite(&mut game, 4)?;
    } else {
        println!("running divide");
        perft_divide(&mut game, depth)?;
    }
    Ok(())
}
