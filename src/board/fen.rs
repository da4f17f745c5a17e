use crate::{
    moves::{
        attack::is_in_check,
        castling::{CastleSide, castling_rights},
        en_passant,
    },
    prelude::*,
};

/// A position as described by the six FEN fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFen {
    pub board: Board,
    pub turn: Side,
    pub castling: CastlingRights,
    pub en_passant: Option<Square>,
    pub halfmove_clock: u32,
    pub fullmove_number: u32,
}

/// Castling rights are folded into the board's `has_moved` flags: a king or
/// rook on its home square counts as unmoved only when a matching right is
/// listed. Every other piece starts unmoved.
pub fn parse_fen(fen: &str) -> miette::Result<ParsedFen> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    miette::ensure!(
        parts.len() == 6,
        "Expected 6 segments in FEN string, found {}: {fen:?}",
        parts.len()
    );

    let mut board = Board::empty();
    board
        .place_pieces(parts[0])
        .with_context(|| format!("Placing pieces with given fen string {}", parts[0]))?;

    let turn = parse_stm(parts[1]).with_context(|| format!("parsed stm input: {}", parts[1]))?;
    let castling =
        parse_castle(parts[2]).with_context(|| format!("parsed input castle: {}", parts[2]))?;
    let en_passant = parse_enpassant(parts[3])
        .with_context(|| format!("parsed input enpassant: {}", parts[3]))?;
    let halfmove_clock = parts[4]
        .parse::<u32>()
        .into_diagnostic()
        .with_context(|| format!("attempt to parse {} to u32", parts[4]))?;
    let fullmove_number = parts[5]
        .parse::<u32>()
        .into_diagnostic()
        .with_context(|| format!("attempt to parse {} to u32", parts[5]))?;
    miette::ensure!(fullmove_number >= 1, "Full-move number starts at 1");

    for side in Side::SIDES {
        miette::ensure!(
            board.king_square(side).is_some(),
            "No {side} king in {}",
            parts[0]
        );
    }
    miette::ensure!(
        !is_in_check(&board, turn.flip()),
        "{} is in check but it is {turn}'s move",
        turn.flip()
    );
    if let Some(target) = en_passant {
        validate_en_passant(&board, turn, target)?;
    }
    apply_castling_rights(&mut board, castling);

    Ok(ParsedFen {
        board,
        turn,
        castling,
        en_passant,
        halfmove_clock,
        fullmove_number,
    })
}

/// Marks home-square kings and rooks as moved when their right is absent
fn apply_castling_rights(board: &mut Board, rights: CastlingRights) {
    for side in Side::SIDES {
        for castle in CastleSide::BOTH {
            if rights.can_castle(side, castle.is_kingside()) {
                continue;
            }
            mark_moved(board, castle.rook_from(side), Piece::Rook, side);
        }
        if !rights.can_castle(side, true) && !rights.can_castle(side, false) {
            mark_moved(board, CastleSide::king_from(side), Piece::King, side);
        }
    }
}

fn mark_moved(board: &mut Board, square: Square, piece: Piece, side: Side) {
    if let Some(info) = board.get_piece_at(square) {
        if info.is(piece, side) {
            board.replace(square, Some(info.moved()));
        }
    }
}

fn parse_stm(stm: &str) -> miette::Result<Side> {
    match stm {
        "w" => Ok(Side::White),
        "b" => Ok(Side::Black),
        _ => miette::bail!("Invalid stm"),
    }
}

fn parse_castle(castle: &str) -> miette::Result<CastlingRights> {
    if castle == "-" {
        return Ok(CastlingRights::empty());
    }
    let mut rights = CastlingRights::empty();
    for c in castle.chars() {
        match c {
            'K' => rights.add_right(CastlingRights::WHITE_00),
            'Q' => rights.add_right(CastlingRights::WHITE_000),
            'k' => rights.add_right(CastlingRights::BLACK_00),
            'q' => rights.add_right(CastlingRights::BLACK_000),
            _ => miette::bail!("Unexpected character {c:?} while parsing CastlingRights"),
        };
    }
    Ok(rights)
}

fn parse_enpassant(enpassant: &str) -> miette::Result<Option<Square>> {
    if enpassant == "-" {
        return Ok(None);
    }
    let square = Square::from_str(enpassant)?;
    miette::ensure!(
        square.row() == 2 || square.row() == 5,
        "En passant square {square} is not on the third or sixth rank"
    );
    Ok(Some(square))
}

/// The target has to sit behind a pawn that just double-pushed, on the
/// mover's capturing rank, with the pawn's start square vacated.
fn validate_en_passant(board: &Board, turn: Side, target: Square) -> miette::Result<()> {
    let pusher = turn.flip();
    let expected_row = pusher.pawn_start_row() as i8 + pusher.pawn_direction();
    miette::ensure!(
        target.row() as i8 == expected_row,
        "En passant square {target} is on the wrong side for {turn} to move"
    );
    let victim = en_passant::victim_square(target, turn);
    miette::ensure!(
        board
            .get_piece_at(victim)
            .is_some_and(|info| info.is(Piece::Pawn, pusher)),
        "No {pusher} pawn on {victim} behind en passant square {target}"
    );
    let start = Square::from(target.index() * 2 - victim.index());
    miette::ensure!(
        !board.is_occupied(target) && !board.is_occupied(start),
        "En passant square {target} and {start} have to be empty"
    );
    Ok(())
}

/// Ranks 8 to 1, side to move, castling letters, en passant square, half-move
/// clock and full-move number. Castling letters come from the `has_moved` flags.
pub fn write_fen(
    board: &Board,
    turn: Side,
    en_passant: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
) -> String {
    let en_passant = en_passant.map_or_else(|| "-".to_string(), |sq| sq.to_string());
    format!(
        "{} {} {} {} {} {}",
        board.to_fen_pieces(),
        turn.fen_char(),
        castling_rights(board),
        en_passant,
        halfmove_clock,
        fullmove_number
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fen() {
        let parsed = parse_fen(START_FEN).unwrap();
        assert_eq!(parsed.board, Board::new());
        assert_eq!(parsed.turn, Side::White);
        assert_eq!(parsed.castling, CastlingRights::all());
        assert_eq!(parsed.en_passant, None);
        assert_eq!(parsed.halfmove_clock, 0);
        assert_eq!(parsed.fullmove_number, 1);
    }

    #[test]
    fn test_write_is_inverse_of_parse() {
        for fen in [
            START_FEN,
            KIWIPETE,
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2",
            "r3k3/8/8/8/8/8/8/4K2R b Kq - 12 40",
            "4k3/8/8/8/8/8/8/4K3 w - - 99 80",
        ] {
            let parsed = parse_fen(fen).unwrap();
            let written = write_fen(
                &parsed.board,
                parsed.turn,
                parsed.en_passant,
                parsed.halfmove_clock,
                parsed.fullmove_number,
            );
            assert_eq!(written, fen);
        }
    }

    #[test]
    fn test_missing_rights_mark_pieces_moved() {
        let parsed = parse_fen("r3k2r/8/8/8/8/8/8/R3K2R w Kk - 0 1").unwrap();
        let a1 = Square::from_str("a1").unwrap();
        let h1 = Square::from_str("h1").unwrap();
        let e1 = Square::from_str("e1").unwrap();
        assert!(parsed.board.get_piece_at(a1).unwrap().has_moved);
        assert!(!parsed.board.get_piece_at(h1).unwrap().has_moved);
        assert!(!parsed.board.get_piece_at(e1).unwrap().has_moved);

        let parsed = parse_fen("r3k2r/8/8/8/8/8/8/R3K2R w - - 0 1").unwrap();
        assert!(parsed.board.get_piece_at(e1).unwrap().has_moved);
    }

    #[test]
    fn test_parse_enpassant() {
        assert_eq!(
            parse_enpassant("e3").unwrap(),
            Some(Square::new(20).unwrap())
        );
        assert!(parse_enpassant("e").is_err());
        assert!(parse_enpassant("").is_err());
        assert!(parse_enpassant("e4").is_err());
        assert_eq!(parse_enpassant("-").unwrap(), None);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(parse_fen("8/8/8/8/8/8/8/8 w - - 0 1").is_err());
        assert!(parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR x KQkq - 0 1").is_err());
        assert!(parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -").is_err());
        assert!(parse_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQxq - 0 1").is_err());
        // black king attacked with white to move
        assert!(parse_fen("4k3/8/8/8/8/8/8/K3R3 w - - 0 1").is_err());
        assert!(parse_fen("4k3/8/8/8/8/8/8/K3R3 b - - 0 1").is_ok());
    }

    #[test]
    fn test_en_passant_must_follow_a_double_push() {
        // target behind the mover's own side
        assert!(parse_fen("4k3/8/8/8/8/8/3Pp3/K7 w - e3 0 1").is_err());
        // no pawn in front of the target
        assert!(parse_fen("4k3/8/8/8/8/8/8/K7 w - e6 0 1").is_err());
        // pawn of the wrong colour
        assert!(parse_fen("4k3/8/8/4P3/8/8/8/K7 w - e6 0 1").is_err());
        // start square still occupied
        assert!(parse_fen("4k3/4p3/8/4p3/8/8/8/K7 w - e6 0 1").is_err());

        let parsed = parse_fen("4k3/8/8/8/3pP3/8/8/K7 b - e3 0 1").unwrap();
        assert_eq!(parsed.en_passant, Some(Square::from_str("e3").unwrap()));
    }
}
