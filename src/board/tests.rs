use crate::init;
use crate::moves::move_gen::{Legal, generate};
use crate::prelude::*;

fn sq(s: &str) -> Square {
    s.parse().unwrap()
}

fn pos(fen: &str, variant: Variant) -> Position {
    init();
    Position::from_fen_variant(fen, variant).unwrap()
}

fn legal_uci(p: &Position) -> Vec<String> {
    let mut list = MoveBuffer::new();
    generate::<Legal>(p, &mut list);
    let mut v: Vec<String> = list.iter().map(|&m| p.move_to_uci(m)).collect();
    v.sort_unstable();
    v
}

#[test]
fn test_do_move_basics() {
    let mut p = Position::startpos(Variant::Chess);
    p.do_move(Move::new(sq("e2"), sq("e4"))).unwrap();
    assert_eq!(p.stm, Side::Black);
    assert_eq!(
        p.piece_on(sq("e4")),
        Some(PieceInfo::new(Piece::Pawn, Side::White))
    );
    assert_eq!(p.piece_on(sq("e2")), None);
    // No black pawn attacks e3, so no en-passant square is recorded.
    assert_eq!(p.ep_square, None);
    assert_eq!(p.halfmove_clock, 0);
    assert_eq!(p.fullmove_counter, 1);

    p.do_move(Move::new(sq("g8"), sq("f6"))).unwrap();
    assert_eq!(p.stm, Side::White);
    assert_eq!(p.halfmove_clock, 1);
    assert_eq!(p.fullmove_counter, 2);
}

#[test]
fn test_do_move_keeps_the_original_untouched() {
    let p = Position::startpos(Variant::Chess);
    let snapshot = p;
    let mut child = p;
    child.do_move(Move::new(sq("b1"), sq("c3"))).unwrap();
    assert_ne!(child, snapshot);
    assert_eq!(p, snapshot);
}

#[test]
fn test_ep_square_set_when_capturable() {
    let mut p = pos(
        "rnbqkbnr/ppp1pppp/8/8/3p4/8/PPPPPPPP/RNBQKBNR w KQkq - 0 3",
        Variant::Chess,
    );
    p.do_move(Move::new(sq("e2"), sq("e4"))).unwrap();
    assert_eq!(p.ep_square, Some(sq("e3")));

    let moves = legal_uci(&p);
    assert!(moves.contains(&"d4e3".to_string()), "{moves:?}");

    p.do_move(Move::en_passant(sq("d4"), sq("e3"))).unwrap();
    assert_eq!(p.piece_on(sq("e4")), None, "captured pawn not removed");
    assert_eq!(
        p.piece_on(sq("e3")),
        Some(PieceInfo::new(Piece::Pawn, Side::Black))
    );
}

#[test]
fn test_castling_application() {
    let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";
    let mut p = pos(fen, Variant::Chess);
    p.do_move(Move::castling(sq("e1"), sq("h1"))).unwrap();
    assert_eq!(
        p.piece_on(sq("g1")),
        Some(PieceInfo::new(Piece::King, Side::White))
    );
    assert_eq!(
        p.piece_on(sq("f1")),
        Some(PieceInfo::new(Piece::Rook, Side::White))
    );
    assert!(!p.can_castle(Side::White));
    assert!(p.can_castle(Side::Black));

    let mut p = pos(fen, Variant::Chess);
    p.do_move(Move::castling(sq("e1"), sq("a1"))).unwrap();
    assert_eq!(
        p.piece_on(sq("c1")),
        Some(PieceInfo::new(Piece::King, Side::White))
    );
    assert_eq!(
        p.piece_on(sq("d1")),
        Some(PieceInfo::new(Piece::Rook, Side::White))
    );
}

#[test]
fn test_castling_rights_revocation() {
    let fen = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";

    // Moving the a1 rook drops the white queen-side right.
    let mut p = pos(fen, Variant::Chess);
    p.do_move(Move::new(sq("a1"), sq("a2"))).unwrap();
    assert!(!p.can_castle_right(CastlingRight::WhiteQueenSide));
    assert!(p.can_castle_right(CastlingRight::WhiteKingSide));

    // Capturing the a8 rook drops black's queen-side right too.
    let mut p = pos(fen, Variant::Chess);
    p.do_move(Move::new(sq("a1"), sq("a8"))).unwrap();
    assert!(!p.can_castle_right(CastlingRight::WhiteQueenSide));
    assert!(!p.can_castle_right(CastlingRight::BlackQueenSide));
    assert!(p.can_castle_right(CastlingRight::BlackKingSide));

    // Any king move drops both rights of its side.
    let mut p = pos(fen, Variant::Chess);
    p.do_move(Move::new(sq("e1"), sq("e2"))).unwrap();
    assert!(!p.can_castle(Side::White));
    assert!(p.can_castle(Side::Black));
}

#[test]
fn test_promotion_application() {
    let mut p = pos("6rk/7P/8/8/8/8/8/K6R w - - 0 1", Variant::Chess);
    p.do_move(Move::promotion(sq("h7"), sq("g8"), Piece::Queen))
        .unwrap();
    assert_eq!(
        p.piece_on(sq("g8")),
        Some(PieceInfo::new(Piece::Queen, Side::White))
    );
    assert!(p.piece_bb(Side::White, Piece::Pawn).is_empty());
    assert!(p.in_check(Side::Black));
}

#[test]
fn test_atomic_blast_spares_pawns() {
    let mut p = pos("k7/8/3p4/3nr3/8/8/3Q4/K7 w - - 0 1", Variant::Atomic);
    let m = Move::new(sq("d2"), sq("d5"));
    assert!(p.legal(m));
    p.do_move(m).unwrap();
    // Queen, knight and rook are all gone; the d6 pawn survives.
    assert_eq!(p.piece_on(sq("d5")), None);
    assert_eq!(p.piece_on(sq("e5")), None);
    assert!(p.piece_bb(Side::White, Piece::Queen).is_empty());
    assert_eq!(
        p.piece_on(sq("d6")),
        Some(PieceInfo::new(Piece::Pawn, Side::Black))
    );
    assert!(p.king_sq(Side::White).is_some());
    assert!(p.king_sq(Side::Black).is_some());
    assert!(!p.is_variant_end());
}

#[test]
fn test_atomic_exploding_the_king_ends_the_game() {
    let mut p = pos("kr6/8/8/8/8/8/8/1Q5K w - - 0 1", Variant::Atomic);
    let m = Move::new(sq("b1"), sq("b8"));
    assert!(p.legal(m));
    p.do_move(m).unwrap();
    assert_eq!(p.king_sq(Side::Black), None);
    assert!(p.is_variant_end());
    assert!(legal_uci(&p).is_empty());
}

#[test]
fn test_atomic_touching_kings_suspend_check() {
    // The rook "attacks" the black king, but the kings are adjacent.
    let p = pos("kK6/8/8/8/8/8/8/R7 b - - 0 1", Variant::Atomic);
    assert!(!p.in_check(Side::Black));
}

#[test]
fn test_crazyhouse_capture_goes_to_hand() {
    let mut p = pos("k6r/8/8/8/8/8/8/K6R[] w - - 0 1", Variant::Crazyhouse);
    p.do_move(Move::new(sq("h1"), sq("h8"))).unwrap();
    assert_eq!(p.count_in_hand(Side::White, Piece::Rook), 1);
    assert!(p.to_fen().contains("[R]"), "{}", p.to_fen());
}

#[test]
fn test_crazyhouse_promoted_capture_demotes_to_pawn() {
    let mut p = pos("k6q~/8/8/8/8/8/8/K6R[] w - - 0 1", Variant::Crazyhouse);
    p.do_move(Move::new(sq("h1"), sq("h8"))).unwrap();
    assert_eq!(p.count_in_hand(Side::White, Piece::Queen), 0);
    assert_eq!(p.count_in_hand(Side::White, Piece::Pawn), 1);
}

#[test]
fn test_crazyhouse_drop_application() {
    let mut p = pos("k7/8/8/8/8/8/8/K7[N] w - - 0 1", Variant::Crazyhouse);
    p.do_move(Move::drop(Piece::Knight, sq("f3"))).unwrap();
    assert_eq!(
        p.piece_on(sq("f3")),
        Some(PieceInfo::new(Piece::Knight, Side::White))
    );
    assert_eq!(p.count_in_hand(Side::White, Piece::Knight), 0);
}

#[test]
fn test_horde_wiped_out_is_variant_end() {
    let p = pos("k7/8/8/8/8/8/8/8 w - - 0 1", Variant::Horde);
    assert!(p.is_variant_end());
    assert!(legal_uci(&p).is_empty());
}

#[test]
fn test_losers_bare_king_is_variant_end() {
    let p = pos("k7/8/8/8/8/8/8/K6R w - - 0 1", Variant::Losers);
    assert!(p.is_variant_end());
}

#[test]
fn test_gives_check() {
    let p = Position::startpos(Variant::Chess);
    assert!(!p.gives_check(Move::new(sq("e2"), sq("e4"))));

    let p = pos("4k3/8/8/8/8/8/8/4KQ2 w - - 0 1", Variant::Chess);
    assert!(p.gives_check(Move::new(sq("f1"), sq("f8"))));
    assert!(!p.gives_check(Move::new(sq("f1"), sq("h3"))));
}

#[test]
fn test_pinned_pieces() {
    let p = pos("4k3/4r3/8/8/8/8/4R3/4K3 w - - 0 1", Variant::Chess);
    assert_eq!(p.pinned(Side::White), sq("e2").bb());
    // The black rook is pinned right back by the white one.
    assert_eq!(p.pinned(Side::Black), sq("e7").bb());
}

#[test]
fn test_discovered_check_candidates() {
    let p = pos("4k3/8/8/8/8/4N3/8/4R1K1 w - - 0 1", Variant::Chess);
    assert_eq!(p.discovered_check_candidates(), sq("e3").bb());
}

#[test]
fn test_checkers_and_double_check() {
    let p = pos("k3r3/8/8/8/8/5n2/8/4K3 w - - 0 1", Variant::Chess);
    let checkers = p.checkers();
    assert!(checkers.more_than_one());
    assert!(checkers.contains_square(sq("e8").index()));
    assert!(checkers.contains_square(sq("f3").index()));
}

#[test]
fn test_relay_check_detection() {
    let p = pos("k7/2R5/8/1N6/8/8/8/K7 b - - 0 1", Variant::Relay);
    assert!(p.in_check(Side::Black));
    assert!(p.checkers().contains_square(sq("c7").index()));

    // Without the defending knight there is no relayed check.
    let p = pos("k7/2R5/8/8/8/8/8/K7 b - - 0 1", Variant::Relay);
    assert!(!p.in_check(Side::Black));
}

#[test]
fn test_attackers_to() {
    let p = Position::startpos(Variant::Chess);
    let attackers = p.attackers_to(sq("f3"));
    assert_eq!(attackers.pop_count(), 3);
    assert!(attackers.contains_square(sq("e2").index()));
    assert!(attackers.contains_square(sq("g2").index()));
    assert!(attackers.contains_square(sq("g1").index()));
}

#[test]
fn test_antichess_can_capture_sees_en_passant() {
    // Only capture available is the en-passant take.
    let p = pos(
        "rnbqkbnr/pppp1ppp/8/8/3Pp3/8/PPP1PPPP/RNBQKBNR b - d3 0 3",
        Variant::Antichess,
    );
    assert!(p.can_capture());
    let moves = legal_uci(&p);
    assert_eq!(moves, vec!["e4d3"]);
}
