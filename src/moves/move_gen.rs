//! Move Generation
//!
//! This module enumerates moves for the side to move under any of the eight
//! supported rule sets, stratified by generation kind.
//!
//! # Pseudo-Legal vs. Legal Moves
//!
//! - **Pseudo-legal moves**: satisfy piece movement and variant capture
//!   rules but may leave the mover's king in check. Generated branch-free
//!   into a caller-owned buffer.
//!
//! - **Legal moves**: the `Legal` kind composes the pseudo-legal generators
//!   with a final filter. The filter only re-verifies moves that can
//!   actually be illegal (pinned pieces, king steps, en passant, Atomic
//!   captures), so the common case stays cheap.
//!
//! Preconditions follow the kind: the three non-evasion kinds require the
//! side to move not be in check, `Evasions` requires it be in check. In
//! Antichess and Racing Kings check is undefined or forbidden, so
//! `Evasions` and `QuietChecks` generate nothing there.

use crate::prelude::*;

/// What subset of moves a `generate` call produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenType {
    /// Captures and queen promotions.
    Captures,
    /// Non-captures and underpromotions.
    Quiets,
    /// Everything, when not in check.
    NonEvasions,
    /// Check-resolving moves, when in check.
    Evasions,
    /// Non-captures (plus knight underpromotions) that give check.
    QuietChecks,
    /// Strictly legal moves.
    Legal,
}

pub trait GenKind {
    const KIND: GenType;
}

pub struct Captures;
impl GenKind for Captures {
    const KIND: GenType = GenType::Captures;
}

pub struct Quiets;
impl GenKind for Quiets {
    const KIND: GenType = GenType::Quiets;
}

pub struct NonEvasions;
impl GenKind for NonEvasions {
    const KIND: GenType = GenType::NonEvasions;
}

pub struct Evasions;
impl GenKind for Evasions {
    const KIND: GenType = GenType::Evasions;
}

pub struct QuietChecks;
impl GenKind for QuietChecks {
    const KIND: GenType = GenType::QuietChecks;
}

pub struct Legal;
impl GenKind for Legal {
    const KIND: GenType = GenType::Legal;
}

/// The single entry point. Appends the requested kind of moves for the side
/// to move to `list`; the position is never mutated.
pub fn generate<T: GenKind>(pos: &Position, list: &mut MoveBuffer) {
    match T::KIND {
        GenType::Legal => gen_legal(pos, list),
        GenType::Evasions => gen_evasions(pos, list),
        GenType::QuietChecks => gen_quiet_checks(pos, list),
        kind => gen_main(pos, kind, list),
    }
}

// ===================================================================
//                       PER-KIND DRIVERS
// ===================================================================

/// CAPTURES / QUIETS / NON_EVASIONS: derive the target mask, apply the
/// variant overrides, and hand off to the composed generator.
fn gen_main(pos: &Position, kind: GenType, list: &mut MoveBuffer) {
    debug_assert!(pos.checkers().is_empty());
    let us = pos.stm;
    let them = us.flip();

    let mut target = match kind {
        GenType::Captures => pos.pieces_of(them),
        GenType::Quiets => !pos.pieces(),
        _ => !pos.pieces_of(us),
    };

    match pos.variant {
        // Forced capture: when a capture exists, nothing else is playable.
        Variant::Antichess if pos.can_capture() => target &= pos.pieces_of(them),
        Variant::Losers if pos.can_capture_losers() => target &= pos.pieces_of(them),
        // Capturing next to the own king would blow it up.
        Variant::Atomic if kind == GenType::Captures => {
            if let Some(ksq) = pos.king_sq(us) {
                target &= !MOVE_TABLES.get_king_attacks(ksq);
            }
        }
        _ => {}
    }

    gen_all(pos, us, kind, target, list);
}

/// QUIET_CHECKS: discovered checks from candidate pieces, then direct
/// checks via the composed generator over empty squares.
fn gen_quiet_checks(pos: &Position, list: &mut MoveBuffer) {
    if pos.is_anti() || pos.is_race() {
        return;
    }
    debug_assert!(pos.checkers().is_empty());

    let us = pos.stm;
    let them = us.flip();
    let mut dc = pos.discovered_check_candidates();

    while dc.any() {
        let from = Square::from(dc.pop_lsb() as usize);
        let Some(info) = pos.piece_on(from) else {
            continue;
        };
        if info.piece == Piece::Pawn {
            // Handled by the pawn enumerator to avoid double emission.
            continue;
        }

        let mut b = pos.attacks_from(info.piece, from, us) & !pos.pieces();
        if info.piece == Piece::King
            && let Some(their_ksq) = pos.king_sq(them)
        {
            // A king step along the shared slider ray discovers nothing.
            b &= !MOVE_TABLES.pseudo_attacks(Piece::Queen, their_ksq);
        }

        for to in b.squares() {
            list.push(Move::new(from, to));
        }
    }

    gen_all(pos, us, GenType::QuietChecks, !pos.pieces(), list);
}

/// EVASIONS: king steps out of the slider rays, then blocks and captures of
/// a lone checker.
fn gen_evasions(pos: &Position, list: &mut MoveBuffer) {
    if pos.is_anti() || pos.is_race() {
        return;
    }
    debug_assert!(pos.checkers().any());

    let us = pos.stm;
    let them = us.flip();
    let Some(ksq) = pos.king_sq(us) else {
        return;
    };
    let t = &*MOVE_TABLES;
    let checkers = pos.checkers();

    let enemy_king_zone = if pos.is_atomic() {
        pos.king_sq(them)
            .map_or(BitBoard::EMPTY, |k| t.get_king_attacks(k))
    } else {
        BitBoard::EMPTY
    };

    if pos.is_atomic() {
        // Blasts that explode the opposing king or every checker count as
        // evasions. Only enemy pieces away from our own king qualify.
        let mut target = pos.pieces_of(them);
        let mut b = checkers;
        while b.any() {
            let s = Square::from(b.pop_lsb() as usize);
            target &= t.get_king_attacks(s) | s.bb();
        }
        target |= enemy_king_zone;
        target &= pos.pieces_of(them) & !t.get_king_attacks(ksq);
        gen_all(pos, us, GenType::Captures, target, list);
    }

    // Squares along a sliding checker's ray through the king are known
    // illegal king destinations; skip them up front.
    let mut slider_attacks = BitBoard::EMPTY;
    let mut sliders = checkers & !pos.pieces_pt(Piece::Knight) & !pos.pieces_pt(Piece::Pawn);
    while sliders.any() {
        let checksq = Square::from(sliders.pop_lsb() as usize);
        slider_attacks |= t.line(checksq, ksq) ^ checksq.bb();
    }

    let mut b = if pos.is_atomic() {
        // The king cannot capture; attacks shielded by the enemy king's
        // zone stop mattering because the attacker would explode.
        t.get_king_attacks(ksq) & !pos.pieces() & !(slider_attacks & !enemy_king_zone)
    } else {
        t.get_king_attacks(ksq) & !pos.pieces_of(us) & !slider_attacks
    };
    if pos.is_losers() && pos.can_capture_losers() {
        b &= pos.pieces_of(them);
    }
    for to in b.squares() {
        list.push(Move::new(ksq, to));
    }

    if checkers.more_than_one() {
        // Double check, only a king move can save the day.
        return;
    }

    let checksq = Square::from(checkers.lsb().expect("checkers nonempty") as usize);
    let mut target = if pos.is_atomic() {
        // Capturing the checker would explode the own king; only blocks.
        t.between(checksq, ksq)
    } else {
        t.between(checksq, ksq) | checksq.bb()
    };
    if pos.is_losers() && pos.can_capture_losers() {
        target &= pos.pieces_of(them);
    }

    gen_all(pos, us, GenType::Evasions, target, list);
}

/// LEGAL: pseudo-legal generation plus the final filter. Only moves that
/// can actually be illegal are re-verified.
fn gen_legal(pos: &Position, list: &mut MoveBuffer) {
    if pos.is_variant_end() {
        return;
    }

    let us = pos.stm;
    let pinned = pos.pinned(us);
    // Racing Kings forbids giving check, so every move needs a look.
    let validate = pinned.any() || pos.is_race();
    let ksq = pos.king_sq(us);

    if pos.checkers().any() {
        gen_evasions(pos, list);
    } else {
        gen_main(pos, GenType::NonEvasions, list);
    }

    list.retain(|&m| {
        if pos.is_house() && m.is_drop() {
            // Drops cannot expose a king: nothing leaves the board.
            return true;
        }
        if pos.is_atomic() && pos.capture(m) {
            return pos.legal(m);
        }
        if validate || ksq == Some(m.from_sq()) || m.is_en_passant() {
            return pos.legal(m);
        }
        true
    });
}

// ===================================================================
//                      COMPOSED GENERATOR
// ===================================================================

/// Pawns, pieces, drops, king, castling — everything the variant allows
/// toward `target`, in that order.
fn gen_all(pos: &Position, us: Side, kind: GenType, target: BitBoard, list: &mut MoveBuffer) {
    let them = us.flip();
    let checks = kind == GenType::QuietChecks;
    let t = &*MOVE_TABLES;

    gen_pawn_moves(pos, us, kind, target, list);
    for piece in [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen] {
        gen_piece_moves(pos, us, piece, checks, target, list);
    }

    if pos.is_house() && kind != GenType::Captures && pos.has_hand(us) {
        let b = match kind {
            GenType::Evasions => target ^ pos.checkers(),
            GenType::NonEvasions => target ^ pos.pieces_of(them),
            _ => target,
        };
        gen_drops(
            pos,
            us,
            Piece::Pawn,
            checks,
            b & !(BitBoard::RANK_1 | BitBoard::RANK_8),
            list,
        );
        for piece in [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen] {
            gen_drops(pos, us, piece, checks, b, list);
        }
    }

    if pos.is_anti() {
        // Kings are ordinary movers, and there may be several of them.
        for ksq in pos.piece_bb(us, Piece::King).squares() {
            for to in (t.get_king_attacks(ksq) & target).squares() {
                list.push(Move::new(ksq, to));
            }
        }
        if pos.can_capture() {
            return;
        }
    } else if kind != GenType::QuietChecks && kind != GenType::Evasions {
        if let Some(ksq) = pos.king_sq(us) {
            let mut b = t.get_king_attacks(ksq) & target;
            if pos.is_race() {
                // The king only advances: captures gain the empty forward
                // cone, quiets lose everything inside it.
                if kind == GenType::Captures {
                    b |= t.get_king_attacks(ksq) & t.forward_cone(ksq) & !pos.pieces();
                }
                if kind == GenType::Quiets {
                    b &= !t.forward_cone(ksq);
                }
            }
            if pos.is_relay() {
                let defenders = pos.attackers_to(ksq) & pos.pieces_of(us);
                if (defenders & pos.pieces_pt(Piece::Knight)).any() {
                    b |= t.get_knight_attacks(ksq) & target;
                }
                if (defenders & pos.pieces_two(Piece::Queen, Piece::Bishop)).any() {
                    b |= t.bishop_attacks(ksq, pos.pieces()) & target;
                }
                if (defenders & pos.pieces_two(Piece::Queen, Piece::Rook)).any() {
                    b |= t.rook_attacks(ksq, pos.pieces()) & target;
                }
            }
            for to in b.squares() {
                list.push(Move::new(ksq, to));
            }
        }
    }

    if pos.is_losers() && pos.can_capture_losers() {
        return;
    }

    if kind != GenType::Captures && kind != GenType::Evasions && pos.can_castle(us) {
        for king_side in [true, false] {
            gen_castling(
                pos,
                us,
                CastlingRight::of(us, king_side),
                checks,
                pos.is_chess960(),
                list,
            );
        }
    }
}

// ===================================================================
//                       PAWN ENUMERATION
// ===================================================================

/// Emits the promotion fan for one landing square, by generation-kind
/// policy. Antichess adds the king promotion and ignores the usual
/// capture/quiet split of the promotion pieces.
fn make_promotions(
    kind: GenType,
    variant: Variant,
    to: Square,
    back: Direction,
    their_ksq: Option<Square>,
    list: &mut MoveBuffer,
) {
    let from = to.get_neighbor(back);

    if variant == Variant::Antichess {
        if matches!(
            kind,
            GenType::Quiets | GenType::Captures | GenType::NonEvasions
        ) {
            for promo in [
                Piece::Queen,
                Piece::Rook,
                Piece::Bishop,
                Piece::Knight,
                Piece::King,
            ] {
                list.push(Move::promotion(from, to, promo));
            }
        }
        return;
    }

    if matches!(
        kind,
        GenType::Captures | GenType::Evasions | GenType::NonEvasions
    ) {
        list.push(Move::promotion(from, to, Piece::Queen));
    }
    if matches!(
        kind,
        GenType::Quiets | GenType::Evasions | GenType::NonEvasions
    ) {
        list.push(Move::promotion(from, to, Piece::Rook));
        list.push(Move::promotion(from, to, Piece::Bishop));
        list.push(Move::promotion(from, to, Piece::Knight));
    }

    // The knight promotion is the only one that can give a direct check the
    // queen promotion would not already give.
    if kind == GenType::QuietChecks
        && their_ksq
            .is_some_and(|ksq| MOVE_TABLES.get_knight_attacks(to).contains_square(ksq.index()))
    {
        list.push(Move::promotion(from, to, Piece::Knight));
    }
}

fn gen_pawn_moves(pos: &Position, us: Side, kind: GenType, target: BitBoard, list: &mut MoveBuffer) {
    let them = us.flip();
    let t = &*MOVE_TABLES;

    let rank7 = us.relative_rank_bb(6);
    let rank8 = us.relative_rank_bb(7);
    let rank3 = us.relative_rank_bb(2);
    let rank2 = us.relative_rank_bb(1);

    let up = us.up();
    let up_east = us.up_east();
    let up_west = us.up_west();

    let pawns_on7 = pos.piece_bb(us, Piece::Pawn) & rank7;
    let pawns_not7 = pos.piece_bb(us, Piece::Pawn) & !rank7;

    let enemies = match kind {
        GenType::Evasions => pos.pieces_of(them) & target,
        GenType::Captures => target,
        _ => pos.pieces_of(them),
    };

    let mut empty = BitBoard::EMPTY;

    // Single and double pawn pushes, no promotions
    if kind != GenType::Captures {
        empty = if matches!(kind, GenType::Quiets | GenType::QuietChecks) {
            target
        } else {
            !pos.pieces()
        };
        if pos.is_anti() {
            empty &= target;
        }

        let mut b1 = pawns_not7.shift(up) & empty;
        let mut b2 = (b1 & rank3).shift(up) & empty;
        if pos.is_horde() {
            // Back-rank pawns may double push too.
            b2 = (b1 & (rank2 | rank3)).shift(up) & empty;
        }

        if pos.is_losers() || kind == GenType::Evasions {
            // Losers: forced-capture target; evasions: blocking squares.
            b1 &= target;
            b2 &= target;
        }

        if kind == GenType::QuietChecks {
            match pos.king_sq(them) {
                Some(their_ksq) => {
                    b1 &= t.get_pawn_attacks(their_ksq, them);
                    b2 &= t.get_pawn_attacks(their_ksq, them);

                    // Pushes by discovered-check candidates also check. The
                    // king's own file is excluded: uncovering along it would
                    // need a capture, and captures are not in this kind.
                    let dc = pos.discovered_check_candidates();
                    if (pawns_not7 & dc).any() {
                        let dc1 = (pawns_not7 & dc).shift(up) & empty & !their_ksq.file_bb();
                        let dc2 = (dc1 & rank3).shift(up) & empty;
                        b1 |= dc1;
                        b2 |= dc2;
                    }
                }
                None => {
                    b1 = BitBoard::EMPTY;
                    b2 = BitBoard::EMPTY;
                }
            }
        }

        for to in b1.squares() {
            list.push(Move::new(to.get_neighbor(-up), to));
        }
        for to in b2.squares() {
            list.push(Move::new(to.get_neighbor(-up).get_neighbor(-up), to));
        }
    }

    // Promotions and underpromotions
    if pawns_on7.any() && (kind != GenType::Evasions || (target & rank8).any()) {
        if kind == GenType::Captures {
            empty = !pos.pieces();
            // In check, a push promotion must still block or explode.
            if pos.is_atomic() && pos.checkers().any() {
                empty &= target;
            }
        }
        if pos.is_anti() || pos.is_losers() || kind == GenType::Evasions {
            empty &= target;
        }

        let b1 = pawns_on7.shift(up_east) & enemies;
        let b2 = pawns_on7.shift(up_west) & enemies;
        let b3 = pawns_on7.shift(up) & empty;
        let their_ksq = pos.king_sq(them);

        for to in b1.squares() {
            make_promotions(kind, pos.variant, to, -up_east, their_ksq, list);
        }
        for to in b2.squares() {
            make_promotions(kind, pos.variant, to, -up_west, their_ksq, list);
        }
        for to in b3.squares() {
            make_promotions(kind, pos.variant, to, -up, their_ksq, list);
        }
    }

    // Standard and en-passant captures
    if matches!(
        kind,
        GenType::Captures | GenType::Evasions | GenType::NonEvasions
    ) {
        let b1 = pawns_not7.shift(up_east) & enemies;
        let b2 = pawns_not7.shift(up_west) & enemies;

        for to in b1.squares() {
            list.push(Move::new(to.get_neighbor(-up_east), to));
        }
        for to in b2.squares() {
            list.push(Move::new(to.get_neighbor(-up_west), to));
        }

        if let Some(ep) = pos.ep_square() {
            debug_assert!(ep.relative_row(us) == 5);

            // En passant evades a check only when the checker is the
            // double-pushed pawn itself, i.e. the square it stands on is in
            // the target. Anything else is a discovered check we cannot
            // answer this way.
            if kind == GenType::Evasions && !(target & ep.get_neighbor(-up).bb()).any() {
                return;
            }

            let capturers = pawns_not7 & t.get_pawn_attacks(ep, them);
            debug_assert!(capturers.any());
            for from in capturers.squares() {
                list.push(Move::en_passant(from, ep));
            }
        }
    }
}

// ===================================================================
//                  PIECE / DROP / CASTLING ENUMERATION
// ===================================================================

/// Knight, bishop, rook and queen moves toward `target`. Relay chess unions
/// in the movement powers relayed by friendly defenders.
fn gen_piece_moves(
    pos: &Position,
    us: Side,
    piece: Piece,
    checks: bool,
    target: BitBoard,
    list: &mut MoveBuffer,
) {
    debug_assert!(piece != Piece::King && piece != Piece::Pawn);
    let t = &*MOVE_TABLES;

    for from in pos.piece_bb(us, piece).squares() {
        if checks {
            // A slider that cannot reach any checking square is skipped
            // wholesale; discovered checkers are handled by the driver.
            if matches!(piece, Piece::Bishop | Piece::Rook | Piece::Queen)
                && (t.pseudo_attacks(piece, from) & target & pos.check_squares(piece)).is_empty()
            {
                continue;
            }
            if pos.discovered_check_candidates().contains_square(from.index()) {
                continue;
            }
        }

        let mut b = pos.attacks_from(piece, from, us) & target;

        if pos.is_relay() {
            let defenders = pos.attackers_to(from) & pos.pieces_of(us);
            if (defenders & pos.pieces_pt(Piece::Knight)).any() {
                b |= t.get_knight_attacks(from) & target;
            }
            if (defenders & pos.pieces_two(Piece::Queen, Piece::Bishop)).any() {
                b |= t.bishop_attacks(from, pos.pieces()) & target;
            }
            if (defenders & pos.pieces_two(Piece::Queen, Piece::Rook)).any() {
                b |= t.rook_attacks(from, pos.pieces()) & target;
            }
            if (defenders & pos.pieces_pt(Piece::King)).any() {
                b |= t.get_king_attacks(from) & target;
            }
        }

        if checks {
            b &= pos.check_squares(piece);
        }

        for to in b.squares() {
            list.push(Move::new(from, to));
        }
    }
}

/// Crazyhouse drops of `piece` onto the candidate squares `b`.
fn gen_drops(
    pos: &Position,
    us: Side,
    piece: Piece,
    checks: bool,
    mut b: BitBoard,
    list: &mut MoveBuffer,
) {
    if pos.count_in_hand(us, piece) == 0 {
        return;
    }
    if checks {
        b &= pos.check_squares(piece);
    }
    for to in b.squares() {
        list.push(Move::drop(piece, to));
    }
}

fn gen_castling(
    pos: &Position,
    us: Side,
    right: CastlingRight,
    checks: bool,
    chess960: bool,
    list: &mut MoveBuffer,
) {
    if pos.castling_impeded(right) || !pos.can_castle_right(right) {
        return;
    }
    debug_assert!(pos.checkers().is_empty());
    let t = &*MOVE_TABLES;
    let them = us.flip();

    // After castling the king and rook land on the same squares in Chess960
    // as in standard chess.
    let kfrom = if pos.is_anti() {
        pos.castling_king_square(right)
    } else {
        pos.king_sq(us)
    };
    let Some(kfrom) = kfrom else {
        return;
    };
    let Some(rfrom) = pos.castling_rook_square(right) else {
        return;
    };
    let kto = Square::relative(us, if right.is_king_side() { 6 } else { 2 });
    let enemies = pos.pieces_of(them);

    // Scan from the destination back toward the king.
    let step: i8 = if chess960 {
        if kto > kfrom { -1 } else { 1 }
    } else if right.is_king_side() {
        -1
    } else {
        1
    };

    if !pos.is_anti() {
        let their_king_zone = pos
            .king_sq(them)
            .map_or(BitBoard::EMPTY, |k| t.get_king_attacks(k));

        let mut s = kto;
        while s != kfrom {
            if pos.is_atomic() {
                // An attacked transit square is fine if the enemy king sits
                // next to it: the attacker would explode itself.
                if !their_king_zone.contains_square(s.index())
                    && (pos.attackers_to_occ(s, pos.pieces() ^ kfrom.bb()) & enemies).any()
                {
                    return;
                }
            } else if (pos.attackers_to(s) & enemies).any() {
                return;
            }
            s = Square::from((s.index() as i8 + step) as usize);
        }

        // With the rook lifted, a slider may suddenly see the king's
        // destination, e.g. an enemy queen on a1 with the rook on b1.
        if chess960
            && (t.rook_attacks(kto, pos.pieces() ^ rfrom.bb())
                & (pos.pieces_two(Piece::Rook, Piece::Queen) & enemies))
                .any()
            && !(pos.is_atomic() && their_king_zone.contains_square(kto.index()))
        {
            return;
        }
    }

    let m = Move::castling(kfrom, rfrom);
    if checks && !pos.gives_check(m) {
        return;
    }
    list.push(m);
}
