use std::{
    str::FromStr,
    sync::{Arc, Mutex},
    thread,
};

use super::*;
use crate::moves::promotion::PROMOTION_PIECES;

fn sq(s: &str) -> Square {
    Square::from_str(s).unwrap()
}

/// Plays moves given as "e2e4" pairs, panicking on the first rejected one
fn play(game: &mut Game, moves: &[&str]) {
    for mv in moves {
        let (from, to) = mv.split_at(2);
        game.execute_move(sq(from), sq(to))
            .unwrap_or_else(|e| panic!("{mv} rejected: {e}"));
    }
}

fn selected(game: &mut Game, square: &str) -> Vec<String> {
    game.select_piece(sq(square))
        .unwrap()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[test]
fn test_start_position() {
    let mut game = Game::new();
    assert_eq!(game.to_fen(), START_FEN);
    assert_eq!(game.legal_moves().len(), 20);
    assert_eq!(game.outcome(), Outcome::InProgress);
    assert_eq!(selected(&mut game, "g1"), ["f3", "h3"]);
}

#[test]
fn test_select_errors() {
    let mut game = Game::new();
    assert_eq!(
        game.select_piece(sq("e4")),
        Err(EngineError::NoPieceAtSquare(sq("e4")))
    );
    assert_eq!(
        game.select_piece(sq("e7")),
        Err(EngineError::NotMoversTurn {
            square: sq("e7"),
            turn: Side::White
        })
    );
}

#[test]
fn test_execute_errors_leave_state_untouched() {
    let mut game = Game::new();
    let before = game.status();
    assert_eq!(
        game.execute_move(sq("e3"), sq("e4")),
        Err(EngineError::NoPieceAtOrigin(sq("e3")))
    );
    assert!(matches!(
        game.execute_move(sq("e7"), sq("e5")),
        Err(EngineError::NotMoversTurn { .. })
    ));
    assert_eq!(
        game.execute_move(sq("e2"), sq("e5")),
        Err(EngineError::IllegalDestination {
            from: sq("e2"),
            to: sq("e5")
        })
    );
    assert_eq!(game.status(), before);
    assert!(game.history().is_empty());
}

#[test]
fn test_select_is_idempotent_and_pure() {
    let mut game = Game::from_fen(KIWIPETE).unwrap();
    let board = *game.board();
    for square in ["e1", "e2", "f3", "d5", "a1"] {
        let first = game.select_piece(sq(square)).unwrap();
        let second = game.select_piece(sq(square)).unwrap();
        assert_eq!(first, second);
        assert_eq!(*game.board(), board);
    }
}

#[test]
fn test_no_friendly_destinations() {
    for fen in [START_FEN, KIWIPETE] {
        let mut game = Game::from_fen(fen).unwrap();
        let turn = game.turn();
        for (_, to) in game.legal_moves() {
            assert!(
                !game.board().get_piece_at(to).is_some_and(|p| p.side == turn),
                "{fen}: {to}"
            );
        }
    }
}

#[test]
fn test_kiwipete_move_count() {
    let mut game = Game::from_fen(KIWIPETE).unwrap();
    assert_eq!(game.legal_moves().len(), 48);
}

#[test]
fn test_pinned_piece() {
    // the bishop on e2 shields its king from the rook on e7
    let mut game = Game::from_fen("4k3/4r3/8/8/8/8/4B3/4K3 w - - 0 1").unwrap();
    assert!(game.select_piece(sq("e2")).unwrap().is_empty());
}

#[test]
fn test_must_answer_check() {
    let mut game = Game::from_fen("4k3/8/8/8/8/8/3PP3/r3K3 w - - 0 1").unwrap();
    assert!(game.is_check());
    // pawns cannot block the rank, only the king moves, and only off it
    assert!(game.select_piece(sq("d2")).unwrap().is_empty());
    assert_eq!(selected(&mut game, "e1"), ["f2"]);
}

#[test]
fn test_queen_sees_f7() {
    let mut game = Game::new();
    play(&mut game, &["e2e4", "e7e5", "d1h5"]);
    play(&mut game, &["b8c6"]);
    let moves = selected(&mut game, "h5");
    assert!(moves.contains(&"f7".to_string()));
    assert!(moves.contains(&"e5".to_string()));
}

#[test]
fn test_fools_mate() {
    let mut game = Game::new();
    play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);
    assert_eq!(game.outcome(), Outcome::Checkmate);
    assert!(game.is_check());
    assert!(game.legal_moves().is_empty());
    assert_eq!(game.turn(), Side::White);

    let status = game.status();
    assert_eq!(status.outcome, Outcome::Checkmate);
    assert!(status.is_check);
}

#[test]
fn test_stalemate() {
    let mut game = Game::from_fen("7k/8/6K1/8/8/8/8/5Q2 w - - 0 1").unwrap();
    play(&mut game, &["f1f7"]);
    assert_eq!(game.outcome(), Outcome::Stalemate);
    assert!(!game.is_check());
    assert!(game.legal_moves().is_empty());
}

#[test]
fn test_castling_is_two_steps() {
    let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    assert_eq!(selected(&mut game, "e1"), ["c1", "d1", "f1", "g1", "d2", "e2", "f2"]);

    let outcome = game.execute_move(sq("e1"), sq("g1")).unwrap();
    assert_eq!(outcome.applied.kind, MoveKind::CastleKing(CastleSide::KingSide));
    assert_eq!(game.turn(), Side::White);
    assert!(game.castling_state().is_in_progress());

    // only the designated rook may move, and only to f1
    assert!(game.select_piece(sq("g1")).unwrap().is_empty());
    assert!(game.select_piece(sq("a1")).unwrap().is_empty());
    assert_eq!(selected(&mut game, "h1"), ["f1"]);
    assert_eq!(game.legal_moves(), vec![(sq("h1"), sq("f1"))]);
    assert!(game.execute_move(sq("a1"), sq("b1")).is_err());

    play(&mut game, &["h1f1"]);
    assert_eq!(game.turn(), Side::Black);
    assert_eq!(game.castling_state(), CastlingState::Idle);
    assert_eq!(game.to_fen(), "r3k2r/8/8/8/8/8/8/R4RK1 b kq - 1 1");

    play(&mut game, &["e8c8", "a8d8"]);
    assert_eq!(game.to_fen(), "2kr3r/8/8/8/8/8/8/R4RK1 w - - 2 2");
}

#[test]
fn test_castling_right_lost_after_king_returns() {
    let mut game = Game::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1").unwrap();
    play(&mut game, &["e1f1", "a8b8", "f1e1", "b8a8"]);
    let moves = selected(&mut game, "e1");
    assert!(!moves.contains(&"g1".to_string()));
    assert!(!moves.contains(&"c1".to_string()));
    assert_eq!(game.to_fen(), "r3k2r/8/8/8/8/8/8/R3K2R w k - 4 3");
    assert!(game.status().castling_available.black_kingside);
    assert!(!game.status().castling_available.black_queenside);
}

#[test]
fn test_castling_refused_through_attack() {
    let mut game = Game::from_fen("r3k2r/8/8/8/8/8/5q2/R3K2R w KQkq - 0 1").unwrap();
    // in check from f2: no castling at all
    let moves = selected(&mut game, "e1");
    assert!(!moves.contains(&"g1".to_string()));
    assert!(!moves.contains(&"c1".to_string()));
}

#[test]
fn test_en_passant_window() {
    let mut game = Game::new();
    play(&mut game, &["e2e4", "a7a6", "e4e5", "d7d5"]);
    assert_eq!(game.en_passant(), Some(sq("d6")));
    assert!(selected(&mut game, "e5").contains(&"d6".to_string()));

    let outcome = game.execute_move(sq("e5"), sq("d6")).unwrap();
    assert_eq!(outcome.applied.kind, MoveKind::EnPassant);
    assert_eq!(outcome.applied.captured.map(|c| c.piece), Some(Piece::Pawn));
    assert!(!game.board().is_occupied(sq("d5")));
    assert_eq!(game.halfmove_clock(), 0);
}

#[test]
fn test_en_passant_expires_after_one_ply() {
    let mut game = Game::new();
    play(&mut game, &["e2e4", "a7a6", "e4e5", "d7d5", "h2h3", "h7h6"]);
    assert_eq!(game.en_passant(), None);
    assert!(!selected(&mut game, "e5").contains(&"d6".to_string()));
}

#[test]
fn test_en_passant_not_offered_from_behind() {
    let mut game = Game::new();
    play(&mut game, &["e2e4", "d7d5"]);
    assert_eq!(game.en_passant(), Some(sq("d6")));
    let moves = selected(&mut game, "e4");
    assert_eq!(moves, ["d5", "e5"]);
}

#[test]
fn test_promotion_to_each_piece() {
    for piece in PROMOTION_PIECES {
        let mut game = Game::from_fen("8/P6k/8/8/8/8/6K1/8 w - - 0 1").unwrap();
        let outcome = game.execute_move(sq("a7"), sq("a8")).unwrap();
        assert_eq!(outcome.pending_promotion, Some(sq("a8")));
        assert_eq!(game.turn(), Side::Black);

        let pending = Err(EngineError::PromotionPending(sq("a8")));
        assert_eq!(game.select_piece(sq("h7")).map(|_| ()), pending);
        assert_eq!(game.execute_move(sq("h7"), sq("h6")).map(|_| ()), pending);
        assert_eq!(game.redo(), pending);
        assert_eq!(
            game.promote(Piece::King),
            Err(EngineError::InvalidPieceType(Piece::King))
        );

        let promoted = game.promote(piece).unwrap();
        assert_eq!(promoted.piece, piece);
        assert_eq!(
            game.board().get_piece_at(sq("a8")).map(|p| (p.piece, p.side)),
            Some((piece, Side::White))
        );
        assert_eq!(game.pending_promotion(), None);
        assert!(!game.select_piece(sq("h7")).unwrap().is_empty());
    }
}

#[test]
fn test_promote_without_pawn() {
    let mut game = Game::new();
    assert_eq!(game.promote(Piece::Queen), Err(EngineError::NoPendingPromotion));
}

#[test]
fn test_promotion_outcome_waits_for_choice() {
    // a8=Q mates along the back rank, a8=N does not
    let mut game = Game::from_fen("7k/P5pp/8/8/8/8/8/6K1 w - - 0 1").unwrap();
    play(&mut game, &["a7a8"]);
    assert_eq!(game.outcome(), Outcome::InProgress);
    game.promote(Piece::Queen).unwrap();
    assert_eq!(game.outcome(), Outcome::Checkmate);

    game.undo().unwrap();
    play(&mut game, &["a7a8"]);
    game.promote(Piece::Knight).unwrap();
    assert_eq!(game.outcome(), Outcome::InProgress);
}

#[test]
fn test_undo_while_promotion_pending() {
    let mut game = Game::from_fen("8/P6k/8/8/8/8/6K1/8 w - - 0 1").unwrap();
    play(&mut game, &["a7a8"]);
    game.undo().unwrap();
    assert_eq!(game.pending_promotion(), None);
    assert_eq!(game.to_fen(), "8/P6k/8/8/8/8/6K1/8 w - - 0 1");
}

#[test]
fn test_fifty_move_flag() {
    let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
    let mut game = Game::new();
    for ply in 0..99 {
        play(&mut game, &[shuffle[ply % 4]]);
    }
    assert_eq!(game.halfmove_clock(), 99);
    assert!(!game.is_fifty_move_draw());

    play(&mut game, &[shuffle[99 % 4]]);
    assert_eq!(game.halfmove_clock(), 100);
    assert!(game.is_fifty_move_draw());
    assert_eq!(game.outcome(), Outcome::InProgress);

    play(&mut game, &["e2e4"]);
    assert_eq!(game.halfmove_clock(), 0);
    assert!(!game.is_fifty_move_draw());
}

#[test]
fn test_fifty_move_reset_by_capture() {
    let mut game = Game::from_fen("4k3/8/8/3p4/8/8/8/3RK3 w - - 99 70").unwrap();
    play(&mut game, &["e1f1"]);
    assert!(game.is_fifty_move_draw());
    play(&mut game, &["e8e7", "d1d5"]);
    assert_eq!(game.halfmove_clock(), 0);
    assert!(!game.is_fifty_move_draw());
}

#[test]
fn test_threefold_on_third_occurrence() {
    let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
    let mut game = Game::new();
    for ply in 0..7 {
        play(&mut game, &[shuffle[ply % 4]]);
        assert!(!game.is_threefold_repetition(), "flagged after ply {ply}");
    }
    play(&mut game, &[shuffle[7 % 4]]);
    assert!(game.is_threefold_repetition());
    assert_eq!(game.outcome(), Outcome::InProgress);
}

#[test]
fn test_en_passant_square_is_part_of_the_position() {
    let mut game = Game::new();
    play(&mut game, &["e2e4"]);
    let with_target = game.position_key();
    assert!(with_target.ends_with("b KQkq e3"));
}

#[test]
fn test_undo_redo_round_trip() {
    let mut game = Game::new();
    let mut statuses = vec![game.status()];
    for mv in ["e2e4", "d7d5", "e4d5", "g8f6", "f1b5", "c7c6"] {
        play(&mut game, &[mv]);
        statuses.push(game.status());
    }

    for expected in statuses.iter().rev().skip(1) {
        game.undo().unwrap();
        assert_eq!(&game.status(), expected);
    }
    assert_eq!(game.undo(), Err(EngineError::NothingToUndo));

    for expected in statuses.iter().skip(1) {
        game.redo().unwrap();
        assert_eq!(&game.status(), expected);
    }
    assert_eq!(game.redo(), Err(EngineError::NothingToRedo));
}

#[test]
fn test_new_move_clears_redo() {
    let mut game = Game::new();
    play(&mut game, &["e2e4", "e7e5"]);
    game.undo().unwrap();
    play(&mut game, &["c7c5"]);
    assert_eq!(game.redo(), Err(EngineError::NothingToRedo));
}

#[test]
fn test_undo_redo_castling_and_promotion() {
    let mut game = Game::from_fen("4k3/1P6/8/8/8/8/8/4K2R w K - 0 1").unwrap();
    let start = game.status();
    play(&mut game, &["e1g1", "h1f1", "e8e7", "b7b8"]);
    game.promote(Piece::Rook).unwrap();
    let end = game.status();

    for _ in 0..4 {
        game.undo().unwrap();
    }
    assert_eq!(game.status(), start);

    for _ in 0..4 {
        game.redo().unwrap();
    }
    assert_eq!(game.status(), end);
    assert_eq!(
        game.board().get_piece_at(sq("b8")).map(|p| p.piece),
        Some(Piece::Rook)
    );
}

#[test]
fn test_undo_restores_threefold_flag() {
    let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
    let mut game = Game::new();
    for ply in 0..8 {
        play(&mut game, &[shuffle[ply % 4]]);
    }
    assert!(game.is_threefold_repetition());
    game.undo().unwrap();
    assert!(!game.is_threefold_repetition());
    game.redo().unwrap();
    assert!(game.is_threefold_repetition());
}

#[test]
fn test_configured_rules() {
    let config = GameConfig {
        fifty_move_plies: 4,
        repetition_count: 2,
        ..Default::default()
    };
    let mut game = Game::with_config(&config).unwrap();
    play(&mut game, &["g1f3", "g8f6", "f3g1"]);
    assert!(!game.is_fifty_move_draw());
    assert!(!game.is_threefold_repetition());
    play(&mut game, &["f6g8"]);
    assert!(game.is_fifty_move_draw());
    assert!(game.is_threefold_repetition());
}

#[test]
fn test_status_serializes() {
    let mut game = Game::new();
    play(&mut game, &["e2e4"]);
    let toml = game.status().to_toml().unwrap();
    assert!(toml.contains("en_passant = \"e3\""));
    assert!(toml.contains("turn = \"Black\""));
    assert!(!toml.contains("pending_promotion"));
    assert!(toml.contains("fen_history = ["));
    assert!(toml.contains("[[moves]]"));
    assert!(toml.contains("piece = \"Pawn\""));
}

#[test]
fn test_status_lists_moves_and_positions() {
    let mut game = Game::new();
    play(&mut game, &["e2e4", "d7d5", "e4d5"]);
    let status = game.status();

    let moves: Vec<String> = status
        .moves
        .iter()
        .map(|m| format!("{}{}", m.from, m.to))
        .collect();
    assert_eq!(moves, ["e2e4", "d7d5", "e4d5"]);
    assert_eq!(status.moves[2].side, Side::White);
    assert_eq!(status.moves[2].captured, Some(Piece::Pawn));
    assert_eq!(status.moves[0].captured, None);

    assert_eq!(status.fen_history.len(), 4);
    assert_eq!(status.fen_history[0], START_FEN);
    assert_eq!(status.fen_history.last(), Some(&game.to_fen()));
    assert_eq!(game.positions().len(), status.fen_history.len());

    game.undo().unwrap();
    let status = game.status();
    assert_eq!(status.moves.len(), 2);
    assert_eq!(status.fen_history.len(), 3);
}

#[test]
fn test_status_while_promotion_pending() {
    let mut game = Game::from_fen("7k/P5pp/8/8/8/8/8/6K1 w - - 0 1").unwrap();
    play(&mut game, &["a7a8"]);
    let status = game.status();
    assert_eq!(status.outcome, Outcome::InProgress);
    assert_eq!(status.pending_promotion, Some(sq("a8")));
    assert_eq!(status.moves.last().and_then(|m| m.promotion), None);
    assert_eq!(status.fen_history.len(), 1);

    game.promote(Piece::Queen).unwrap();
    let status = game.status();
    assert_eq!(status.outcome, Outcome::Checkmate);
    assert_eq!(status.moves.last().and_then(|m| m.promotion), Some(Piece::Queen));
    assert_eq!(status.fen_history.len(), 2);
}

#[test]
fn test_from_fen_rejects_capturable_king() {
    assert!(Game::from_fen("4k3/8/8/8/8/8/8/K3R3 w - - 0 1").is_err());
}

#[test]
fn test_from_fen_rejects_backward_en_passant() {
    assert!(Game::from_fen("4k3/8/8/8/8/8/3Pp3/K7 w - e3 0 1").is_err());
    let mut game = Game::from_fen("4k3/8/8/8/8/8/3Pp3/K7 w - - 0 1").unwrap();
    assert_eq!(selected(&mut game, "d2"), ["d3", "d4"]);
}

#[test]
fn test_shared_behind_mutex() {
    let game = Arc::new(Mutex::new(Game::new()));
    let handles: Vec<_> = [("e2", "e4"), ("e7", "e5")]
        .into_iter()
        .map(|(from, to)| {
            let game = Arc::clone(&game);
            thread::spawn(move || {
                // each side retries until it is its turn
                loop {
                    let mut game = game.lock().unwrap();
                    match game.execute_move(sq(from), sq(to)) {
                        Ok(_) => break,
                        Err(EngineError::NotMoversTurn { .. }) => {}
                        Err(e) => panic!("{e}"),
                    }
                    drop(game);
                    thread::yield_now();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    let game = game.lock().unwrap();
    assert_eq!(
        game.to_fen(),
        "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2"
    );
}
