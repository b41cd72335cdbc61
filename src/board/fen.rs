//! FEN input and output, covering the variant extensions the eight rule
//! sets need: bracketed Crazyhouse holdings, `~`-suffixed promoted pieces,
//! Shredder-style castling file letters, and positions without kings.

use std::{collections::HashMap, sync::LazyLock};

use crate::prelude::*;
use miette::Context;

pub static PIECE_CHAR_LOOKUP_TABLE: LazyLock<HashMap<char, (Piece, Side)>> = LazyLock::new(|| {
    [
        ('P', (Piece::Pawn, Side::White)),
        ('p', (Piece::Pawn, Side::Black)),
        ('B', (Piece::Bishop, Side::White)),
        ('b', (Piece::Bishop, Side::Black)),
        ('N', (Piece::Knight, Side::White)),
        ('n', (Piece::Knight, Side::Black)),
        ('R', (Piece::Rook, Side::White)),
        ('r', (Piece::Rook, Side::Black)),
        ('Q', (Piece::Queen, Side::White)),
        ('q', (Piece::Queen, Side::Black)),
        ('K', (Piece::King, Side::White)),
        ('k', (Piece::King, Side::Black)),
    ]
    .into()
});

pub fn parse_fen(fen: &str, variant: Variant) -> miette::Result<Position> {
    let parts: Vec<&str> = fen.split_whitespace().collect();
    miette::ensure!(
        parts.len() == 6,
        "Not enough segments in given FEN string '{fen}', need 6, got: {}",
        parts.len()
    );

    let mut pos = Position::empty(variant);

    parse_with_context(parts[0], "Placing pieces with given fen", |s| {
        place_pieces(s, &mut pos)
    })?;
    pos.stm = parse_with_context(parts[1], "Parsed stm input", parse_stm)?;
    parse_with_context(parts[2], "Parsed castle input", |s| {
        parse_castle(s, &mut pos)
    })?;
    pos.ep_square = parse_with_context(parts[3], "Parsed enpassant input", |s| {
        parse_enpassant(s, &pos)
    })?;
    pos.halfmove_clock = parse_with_context(parts[4], "Parsed halfmove to u8", |s| {
        s.parse::<u8>().into_diagnostic()
    })?;
    pos.fullmove_counter = parse_with_context(parts[5], "Parsed fullmove to u16", |s| {
        s.parse::<u16>().into_diagnostic()
    })?;

    Ok(pos)
}

pub fn to_fen(pos: &Position) -> String {
    let mut fen = String::new();

    for rank in (0..8).rev() {
        let mut empty_count = 0;
        for file in 0..8 {
            let sq = Square::from_coords(file, rank).unwrap();
            if let Some(info) = pos.piece_on(sq) {
                if empty_count > 0 {
                    fen.push_str(&empty_count.to_string());
                    empty_count = 0;
                }
                fen.push(info.piece.to_char(info.side));
                if pos.is_promoted(sq) {
                    fen.push('~');
                }
            } else {
                empty_count += 1;
            }
        }
        if empty_count > 0 {
            fen.push_str(&empty_count.to_string());
        }
        if rank > 0 {
            fen.push('/');
        }
    }

    if pos.is_house() {
        fen.push('[');
        for side in Side::SIDES {
            for piece in Piece::HAND_PIECES {
                for _ in 0..pos.count_in_hand(side, piece) {
                    fen.push(piece.to_char(side));
                }
            }
        }
        fen.push(']');
    }

    fen.push(' ');
    fen.push(match pos.stm {
        Side::White => 'w',
        Side::Black => 'b',
    });
    fen.push(' ');
    fen.push_str(&castle_string(pos));
    fen.push(' ');
    match pos.ep_square {
        Some(sq) => fen.push_str(&sq.to_string()),
        None => fen.push('-'),
    }
    fen.push(' ');
    fen.push_str(&pos.halfmove_clock.to_string());
    fen.push(' ');
    fen.push_str(&pos.fullmove_counter.to_string());
    fen
}

fn castle_string(pos: &Position) -> String {
    let mut out = String::new();
    for right in CastlingRight::ALL {
        if !pos.can_castle_right(right) {
            continue;
        }
        if pos.is_chess960() {
            let rook = pos.castling_rook_square(right).expect("granted right");
            let letter = (b'A' + rook.col() as u8) as char;
            out.push(match right.side() {
                Side::White => letter,
                Side::Black => letter.to_ascii_lowercase(),
            });
        } else {
            out.push(match right {
                CastlingRight::WhiteKingSide => 'K',
                CastlingRight::WhiteQueenSide => 'Q',
                CastlingRight::BlackKingSide => 'k',
                CastlingRight::BlackQueenSide => 'q',
            });
        }
    }
    if out.is_empty() {
        out.push('-');
    }
    out
}

fn parse_with_context<T, F>(input: &str, context_msg: &str, parser: F) -> miette::Result<T>
where
    F: FnOnce(&str) -> miette::Result<T>,
{
    parser(input).with_context(|| format!("{context_msg}: {input}"))
}

fn place_pieces(pieces: &str, pos: &mut Position) -> miette::Result<()> {
    let (placement, holdings) = match pieces.split_once('[') {
        Some((board, rest)) => {
            let holdings = rest
                .strip_suffix(']')
                .with_context(|| format!("Unterminated holdings in: {pieces}"))?;
            (board, Some(holdings))
        }
        None => (pieces, None),
    };

    let mut rank: i32 = 7;
    let mut file: usize = 0;
    let mut last_square: Option<Square> = None;

    for char in placement.chars() {
        match char {
            '1'..='8' => {
                file += char.to_digit(10).unwrap() as usize;
                last_square = None;
            }
            '/' => {
                rank -= 1;
                miette::ensure!(rank >= 0, "Too many ranks in FEN placement");
                file = 0;
                last_square = None;
            }
            '~' => {
                let sq = last_square
                    .with_context(|| "Promotion marker '~' must follow a piece".to_string())?;
                pos.mark_promoted(sq);
            }
            _ => {
                let (piece, side) = *PIECE_CHAR_LOOKUP_TABLE
                    .get(&char)
                    .with_context(|| format!("Invalid fen character: {char}"))?;
                let sq = Square::from_coords(file, rank as usize)
                    .with_context(|| format!("FEN placement overflows rank {rank}"))?;
                pos.board.set_piece(side, piece, sq)?;
                last_square = Some(sq);
                file += 1;
            }
        }
    }

    if let Some(holdings) = holdings {
        miette::ensure!(
            pos.is_house(),
            "Holdings given for a variant without a hand"
        );
        for char in holdings.chars() {
            if char == '-' {
                continue;
            }
            let (piece, side) = *PIECE_CHAR_LOOKUP_TABLE
                .get(&char)
                .with_context(|| format!("Invalid holdings character: {char}"))?;
            miette::ensure!(piece != Piece::King, "A king cannot be held in hand");
            pos.add_to_hand(side, piece);
        }
    }

    Ok(())
}

fn parse_stm(stm: &str) -> miette::Result<Side> {
    match stm {
        "w" => Ok(Side::White),
        "b" => Ok(Side::Black),
        _ => Err(miette::Error::msg("Invalid stm")),
    }
}

fn parse_castle(castle: &str, pos: &mut Position) -> miette::Result<()> {
    if castle == "-" {
        return Ok(());
    }
    for c in castle.chars() {
        let side = if c.is_ascii_uppercase() {
            Side::White
        } else {
            Side::Black
        };
        let back_rank = side.relative_rank_bb(0);
        let king_bb = pos.piece_bb(side, Piece::King) & back_rank;
        let king_sq = king_bb
            .lsb()
            .map(|i| Square::from(i as usize))
            .with_context(|| format!("Castling right '{c}' without a back-rank king"))?;
        let rooks = pos.piece_bb(side, Piece::Rook) & back_rank;

        let rook_sq = match c.to_ascii_uppercase() {
            'K' => {
                // Outermost rook east of the king (X-FEN).
                let east = BitBoard({
                    let mut bb = BitBoard::EMPTY;
                    for f in king_sq.col() + 1..8 {
                        bb.set(f);
                    }
                    bb.0
                });
                let east = if side == Side::White {
                    east
                } else {
                    BitBoard(east.0 << 56)
                };
                (rooks & east).msb()
            }
            'Q' => {
                let west = BitBoard({
                    let mut bb = BitBoard::EMPTY;
                    for f in 0..king_sq.col() {
                        bb.set(f);
                    }
                    bb.0
                });
                let west = if side == Side::White {
                    west
                } else {
                    BitBoard(west.0 << 56)
                };
                (rooks & west).lsb()
            }
            'A'..='H' => {
                let f = c.to_ascii_uppercase() as usize - 'A' as usize;
                let sq = Square::relative(side, f);
                (rooks & sq.bb()).lsb()
            }
            _ => miette::bail!("Unexpected character while parsing castling rights: {c}"),
        };
        let rook_sq = rook_sq
            .map(|i| Square::from(i as usize))
            .with_context(|| format!("Castling right '{c}' without a matching rook"))?;

        let king_side = rook_sq > king_sq;
        pos.castling
            .grant(CastlingRight::of(side, king_side), king_sq, rook_sq);

        // File letters or nonstandard start files mean Chess960 castling
        // semantics.
        if ('A'..='H').contains(&c.to_ascii_uppercase())
            || king_sq.col() != 4
            || !matches!(rook_sq.col(), 0 | 7)
        {
            pos.chess960 = true;
        }
    }
    Ok(())
}

/// A FEN en-passant square is kept only if the double push really just
/// happened and some pawn could take: phantom squares are dropped.
fn parse_enpassant(enpassant: &str, pos: &Position) -> miette::Result<Option<Square>> {
    if enpassant == "-" {
        return Ok(None);
    }
    let ep: Square = enpassant.parse()?;
    let us = pos.stm;
    let them = us.flip();
    miette::ensure!(
        ep.relative_row(us) == 5,
        "En passant square {ep} on the wrong rank for {us} to move"
    );

    let pushed_to = ep.get_neighbor(-us.up());
    let origin = ep.get_neighbor(us.up());
    let double_pushed = pos.piece_on(pushed_to)
        == Some(PieceInfo::new(Piece::Pawn, them))
        && pos.piece_on(origin).is_none()
        && pos.piece_on(ep).is_none();
    let capturable =
        (MOVE_TABLES.get_pawn_attacks(ep, them) & pos.piece_bb(us, Piece::Pawn)).any();

    if double_pushed && capturable {
        Ok(Some(ep))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    #[test]
    fn test_parse_fen_startpos() {
        let pos = Position::from_fen(START_FEN).unwrap();
        assert_eq!(pos.stm, Side::White);
        assert_eq!(pos.castling.rights, CastlingRights::all());
        assert_eq!(pos.ep_square, None);
        assert_eq!(pos.halfmove_clock, 0);
        assert_eq!(pos.fullmove_counter, 1);
        assert!(!pos.is_chess960());
        assert_eq!(pos.pieces().pop_count(), 32);
    }

    #[test]
    fn test_fen_round_trip() {
        for fen in [
            START_FEN,
            KIWIPETE,
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        ] {
            let pos = Position::from_fen(fen).unwrap();
            assert_eq!(pos.to_fen(), *fen, "round trip failed for {fen}");
        }
    }

    #[test]
    fn test_crazyhouse_holdings_round_trip() {
        let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR[PNq] w KQkq - 0 1";
        let pos = Position::from_fen_variant(fen, Variant::Crazyhouse).unwrap();
        assert_eq!(pos.count_in_hand(Side::White, Piece::Knight), 1);
        assert_eq!(pos.count_in_hand(Side::White, Piece::Pawn), 1);
        assert_eq!(pos.count_in_hand(Side::Black, Piece::Queen), 1);
        assert_eq!(pos.to_fen(), fen);
    }

    #[test]
    fn test_promoted_marker_round_trip() {
        let fen = "k6Q~/8/8/8/8/8/8/K7[] w - - 0 1";
        let pos = Position::from_fen_variant(fen, Variant::Crazyhouse).unwrap();
        assert!(pos.is_promoted("h8".parse().unwrap()));
        assert_eq!(pos.to_fen(), fen);
    }

    #[test]
    fn test_phantom_ep_square_is_dropped() {
        // Black just played b7b5, but no white pawn can take en passant.
        let fen = "rnbqkbnr/p1pppppp/8/1p6/8/8/PPPPPPPP/RNBQKBNR w KQkq b6 0 2";
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(pos.ep_square, None);
    }

    #[test]
    fn test_real_ep_square_is_kept() {
        let fen = "rnbqkbnr/ppppp1pp/8/4Pp2/8/8/PPPP1PPP/RNBQKBNR w KQkq f6 0 3";
        let pos = Position::from_fen(fen).unwrap();
        assert_eq!(pos.ep_square, Some("f6".parse().unwrap()));
    }

    #[test]
    fn test_shredder_castling_letters() {
        // Chess960: king on b1, rook on a1; the queenside right is file A.
        let fen = "3r4/5k2/8/8/8/8/8/RK6 w A - 0 1";
        let pos = Position::from_fen(fen).unwrap();
        assert!(pos.is_chess960());
        let right = CastlingRight::WhiteQueenSide;
        assert!(pos.can_castle_right(right));
        assert_eq!(pos.castling_rook_square(right), Some("a1".parse().unwrap()));
        assert_eq!(pos.castling_king_square(right), Some("b1".parse().unwrap()));
    }

    #[test]
    fn test_horde_has_no_white_king() {
        let pos = Position::startpos(Variant::Horde);
        assert_eq!(pos.king_sq(Side::White), None);
        assert!(pos.king_sq(Side::Black).is_some());
        assert_eq!(pos.piece_bb(Side::White, Piece::Pawn).pop_count(), 36);
    }
}
