use std::fmt::Display;

use miette::Context;

use crate::prelude::*;

pub mod components;
pub mod fen;

#[cfg(test)]
mod tests;

/// A complete game state for any of the eight supported rule sets.
///
/// `Position` is `Copy`: state transitions are copy-make, so `do_move`
/// mutates in place and callers snapshot first when they need to rewind.
/// Every query the move generator consumes is pure.
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub struct Position {
    pub board: BoardState,
    /// Side to move
    pub stm: Side,
    pub castling: CastlingData,
    /// En passant target square, if a double push just happened and an
    /// enemy pawn could actually capture onto it.
    pub ep_square: Option<Square>,
    /// Half-moves since the last capture or pawn move.
    pub halfmove_clock: u8,
    /// Incremented after each black move, starts at 1.
    pub fullmove_counter: u16,
    pub variant: Variant,
    pub chess960: bool,
    /// Crazyhouse holdings, indexed [side][piece].
    hands: [[u8; 6]; 2],
    /// Crazyhouse: squares holding a piece that arose by promotion; such a
    /// piece re-enters the capturer's hand as a pawn.
    promoted: BitBoard,
}

impl Position {
    pub fn empty(variant: Variant) -> Self {
        Self {
            board: BoardState::default(),
            stm: Side::White,
            castling: CastlingData::default(),
            ep_square: None,
            halfmove_clock: 0,
            fullmove_counter: 1,
            variant,
            chess960: false,
            hands: [[0; 6]; 2],
            promoted: BitBoard::EMPTY,
        }
    }

    pub fn from_fen(fen: &str) -> miette::Result<Self> {
        fen::parse_fen(fen, Variant::Chess)
    }

    pub fn from_fen_variant(fen: &str, variant: Variant) -> miette::Result<Self> {
        fen::parse_fen(fen, variant)
    }

    pub fn startpos(variant: Variant) -> Self {
        Self::from_fen_variant(variant.start_fen(), variant).expect("start FEN parses")
    }

    pub fn to_fen(&self) -> String {
        fen::to_fen(self)
    }

    // =========================================================
    //                      PIECE QUERIES
    // =========================================================

    /// All occupied squares.
    #[inline(always)]
    pub fn pieces(&self) -> BitBoard {
        self.board.get_occupied_bb()
    }

    #[inline(always)]
    pub fn pieces_of(&self, side: Side) -> BitBoard {
        self.board.get_side_bb(side)
    }

    /// Both colors' pieces of one type.
    #[inline(always)]
    pub fn pieces_pt(&self, piece: Piece) -> BitBoard {
        self.board.get_piece_bb(Side::White, piece) | self.board.get_piece_bb(Side::Black, piece)
    }

    /// Both colors' pieces of either type.
    #[inline(always)]
    pub fn pieces_two(&self, p1: Piece, p2: Piece) -> BitBoard {
        self.pieces_pt(p1) | self.pieces_pt(p2)
    }

    #[inline(always)]
    pub fn piece_bb(&self, side: Side, piece: Piece) -> BitBoard {
        self.board.get_piece_bb(side, piece)
    }

    #[inline(always)]
    pub fn piece_on(&self, sq: Square) -> Option<PieceInfo> {
        self.board.get_piece_at(sq)
    }

    /// The primary king square. `None` for the kingless Horde side; in
    /// Antichess (where promotion can create several kings) this is just
    /// the lowest-indexed one.
    #[inline(always)]
    pub fn king_sq(&self, side: Side) -> Option<Square> {
        self.board
            .get_piece_bb(side, Piece::King)
            .lsb()
            .map(|i| Square::from(i as usize))
    }

    #[inline(always)]
    pub fn ep_square(&self) -> Option<Square> {
        self.ep_square
    }

    // =========================================================
    //                     VARIANT PREDICATES
    // =========================================================

    #[inline(always)]
    pub fn is_anti(&self) -> bool {
        self.variant == Variant::Antichess
    }

    #[inline(always)]
    pub fn is_atomic(&self) -> bool {
        self.variant == Variant::Atomic
    }

    #[inline(always)]
    pub fn is_house(&self) -> bool {
        self.variant == Variant::Crazyhouse
    }

    #[inline(always)]
    pub fn is_horde(&self) -> bool {
        self.variant == Variant::Horde
    }

    #[inline(always)]
    pub fn is_losers(&self) -> bool {
        self.variant == Variant::Losers
    }

    #[inline(always)]
    pub fn is_race(&self) -> bool {
        self.variant == Variant::RacingKings
    }

    #[inline(always)]
    pub fn is_relay(&self) -> bool {
        self.variant == Variant::Relay
    }

    #[inline(always)]
    pub fn is_chess960(&self) -> bool {
        self.chess960
    }

    /// True once the variant's own winning condition has triggered and no
    /// further moves exist. Checkmate and stalemate are not variant ends;
    /// they surface as an empty legal move list.
    pub fn is_variant_end(&self) -> bool {
        match self.variant {
            Variant::Chess | Variant::Crazyhouse | Variant::Relay => false,
            Variant::Antichess => self.pieces_of(self.stm).is_empty(),
            Variant::Atomic => {
                self.king_sq(Side::White).is_none() || self.king_sq(Side::Black).is_none()
            }
            Variant::Horde => self.pieces_of(Side::White).is_empty(),
            Variant::Losers => Side::SIDES.iter().any(|&s| {
                let all = self.pieces_of(s);
                all.any() && all == self.piece_bb(s, Piece::King)
            }),
            Variant::RacingKings => {
                let white_home = self.piece_bb(Side::White, Piece::King) & BitBoard::RANK_8;
                let black_home = self.piece_bb(Side::Black, Piece::King) & BitBoard::RANK_8;
                // White reaching rank 8 leaves black one equalizing reply.
                black_home.any() || (white_home.any() && self.stm == Side::White)
            }
        }
    }

    // =========================================================
    //                      ATTACK QUERIES
    // =========================================================

    /// Attack set of a `piece` of `side` standing on `sq`, under the current
    /// occupancy. `side` only matters for pawns.
    pub fn attacks_from(&self, piece: Piece, sq: Square, side: Side) -> BitBoard {
        let t = &*MOVE_TABLES;
        match piece {
            Piece::Pawn => t.get_pawn_attacks(sq, side),
            Piece::Knight => t.get_knight_attacks(sq),
            Piece::King => t.get_king_attacks(sq),
            Piece::Bishop => t.bishop_attacks(sq, self.pieces()),
            Piece::Rook => t.rook_attacks(sq, self.pieces()),
            Piece::Queen => t.queen_attacks(sq, self.pieces()),
        }
    }

    /// All pieces of either color attacking `sq` under `occupied`. Leaper
    /// attacks ignore the occupancy mask; only sliders see through removed
    /// blockers.
    pub fn attackers_to_occ(&self, sq: Square, occupied: BitBoard) -> BitBoard {
        let t = &*MOVE_TABLES;
        (t.get_pawn_attacks(sq, Side::White) & self.piece_bb(Side::Black, Piece::Pawn))
            | (t.get_pawn_attacks(sq, Side::Black) & self.piece_bb(Side::White, Piece::Pawn))
            | (t.get_knight_attacks(sq) & self.pieces_pt(Piece::Knight))
            | (t.get_king_attacks(sq) & self.pieces_pt(Piece::King))
            | (t.bishop_attacks(sq, occupied) & self.pieces_two(Piece::Bishop, Piece::Queen))
            | (t.rook_attacks(sq, occupied) & self.pieces_two(Piece::Rook, Piece::Queen))
    }

    #[inline(always)]
    pub fn attackers_to(&self, sq: Square) -> BitBoard {
        self.attackers_to_occ(sq, self.pieces())
    }

    /// Relay chess: pieces of `by` that attack `sq` only through a power
    /// relayed by a friendly defender. The relayed rays go through the
    /// normal occupancy-aware lookups, so blockers apply.
    fn relay_attackers_to(&self, sq: Square, by: Side, occupied: BitBoard) -> BitBoard {
        let t = &*MOVE_TABLES;
        let mut attackers = BitBoard::EMPTY;
        for s in self.pieces_of(by).squares() {
            let defenders = self.attackers_to_occ(s, occupied) & self.pieces_of(by);
            if defenders.is_empty() {
                continue;
            }
            let mut powers = BitBoard::EMPTY;
            if (defenders & self.pieces_pt(Piece::Knight)).any() {
                powers |= t.get_knight_attacks(s);
            }
            if (defenders & self.pieces_two(Piece::Queen, Piece::Bishop)).any() {
                powers |= t.bishop_attacks(s, occupied);
            }
            if (defenders & self.pieces_two(Piece::Queen, Piece::Rook)).any() {
                powers |= t.rook_attacks(s, occupied);
            }
            if (defenders & self.pieces_pt(Piece::King)).any() {
                powers |= t.get_king_attacks(s);
            }
            if powers.contains_square(sq.index()) {
                attackers |= s.bb();
            }
        }
        attackers
    }

    /// Enemy pieces currently giving check to `side`'s king.
    pub fn checkers_of(&self, side: Side) -> BitBoard {
        if self.is_anti() {
            return BitBoard::EMPTY;
        }
        let Some(ksq) = self.king_sq(side) else {
            return BitBoard::EMPTY;
        };
        let them = side.flip();
        if self.is_atomic()
            && let Some(their_ksq) = self.king_sq(them)
            && MOVE_TABLES
                .get_king_attacks(ksq)
                .contains_square(their_ksq.index())
        {
            // Touching kings suspend check in Atomic.
            return BitBoard::EMPTY;
        }
        let occ = self.pieces();
        let mut checkers = self.attackers_to_occ(ksq, occ) & self.pieces_of(them);
        if self.is_relay() {
            checkers |= self.relay_attackers_to(ksq, them, occ);
        }
        checkers
    }

    #[inline(always)]
    pub fn checkers(&self) -> BitBoard {
        self.checkers_of(self.stm)
    }

    #[inline(always)]
    pub fn in_check(&self, side: Side) -> bool {
        self.checkers_of(side).any()
    }

    /// Pieces (of either color) that alone block a slider in `sliders` from
    /// reaching `sq`.
    pub fn slider_blockers(&self, sliders: BitBoard, sq: Square) -> BitBoard {
        let t = &*MOVE_TABLES;
        let mut blockers = BitBoard::EMPTY;
        let snipers = ((t.pseudo_attacks(Piece::Rook, sq)
            & self.pieces_two(Piece::Queen, Piece::Rook))
            | (t.pseudo_attacks(Piece::Bishop, sq)
                & self.pieces_two(Piece::Queen, Piece::Bishop)))
            & sliders;
        for sniper in snipers.squares() {
            let b = t.between(sq, sniper) & self.pieces();
            if b.any() && !b.more_than_one() {
                blockers |= b;
            }
        }
        blockers
    }

    /// `side`'s pieces pinned to `side`'s own king.
    pub fn pinned(&self, side: Side) -> BitBoard {
        if self.is_anti() {
            return BitBoard::EMPTY;
        }
        let Some(ksq) = self.king_sq(side) else {
            return BitBoard::EMPTY;
        };
        self.slider_blockers(self.pieces_of(side.flip()), ksq) & self.pieces_of(side)
    }

    /// Side-to-move pieces whose departure would uncover a check on the
    /// enemy king by a friendly slider.
    pub fn discovered_check_candidates(&self) -> BitBoard {
        if self.is_anti() {
            return BitBoard::EMPTY;
        }
        let them = self.stm.flip();
        let Some(ksq) = self.king_sq(them) else {
            return BitBoard::EMPTY;
        };
        self.slider_blockers(self.pieces_of(self.stm), ksq) & self.pieces_of(self.stm)
    }

    /// Squares from which a side-to-move `piece` would give direct check.
    pub fn check_squares(&self, piece: Piece) -> BitBoard {
        let them = self.stm.flip();
        let Some(ksq) = self.king_sq(them) else {
            return BitBoard::EMPTY;
        };
        let t = &*MOVE_TABLES;
        let occ = self.pieces();
        match piece {
            Piece::Pawn => t.get_pawn_attacks(ksq, them),
            Piece::Knight => t.get_knight_attacks(ksq),
            Piece::Bishop => t.bishop_attacks(ksq, occ),
            Piece::Rook => t.rook_attacks(ksq, occ),
            Piece::Queen => t.queen_attacks(ksq, occ),
            Piece::King => BitBoard::EMPTY,
        }
    }

    // =========================================================
    //                  CASTLING / HAND QUERIES
    // =========================================================

    #[inline(always)]
    pub fn can_castle(&self, side: Side) -> bool {
        self.castling.rights.allows_side(side)
    }

    #[inline(always)]
    pub fn can_castle_right(&self, right: CastlingRight) -> bool {
        self.castling.rights.allows(right)
    }

    /// True if a piece stands on the squares the king or rook must cross.
    #[inline(always)]
    pub fn castling_impeded(&self, right: CastlingRight) -> bool {
        (self.castling.path(right) & self.pieces()).any()
    }

    #[inline(always)]
    pub fn castling_rook_square(&self, right: CastlingRight) -> Option<Square> {
        self.castling.rook_square(right)
    }

    /// The king participating in this right. Matters in Antichess, where
    /// promotion can create extra kings and `king_sq` is ambiguous.
    #[inline(always)]
    pub fn castling_king_square(&self, right: CastlingRight) -> Option<Square> {
        self.castling.king_square(right)
    }

    #[inline(always)]
    pub fn count_in_hand(&self, side: Side, piece: Piece) -> u8 {
        self.hands[side.index()][piece.index()]
    }

    #[inline(always)]
    pub fn has_hand(&self, side: Side) -> bool {
        self.hands[side.index()].iter().any(|&c| c > 0)
    }

    pub(crate) fn add_to_hand(&mut self, side: Side, piece: Piece) {
        self.hands[side.index()][piece.index()] += 1;
    }

    pub(crate) fn mark_promoted(&mut self, sq: Square) {
        self.promoted.set(sq.index());
    }

    #[inline(always)]
    pub fn is_promoted(&self, sq: Square) -> bool {
        self.promoted.contains_square(sq.index())
    }

    // =========================================================
    //                    CAPTURE AVAILABILITY
    // =========================================================

    /// Antichess: is any pseudo-legal capture (including en passant)
    /// available to the side to move?
    pub fn can_capture(&self) -> bool {
        let us = self.stm;
        let them = us.flip();
        let enemies = self.pieces_of(them);

        let pawns = self.piece_bb(us, Piece::Pawn);
        let mut pawn_targets = enemies;
        if let Some(ep) = self.ep_square {
            pawn_targets |= ep.bb();
        }
        if (pawns.shift(us.up_east()) & pawn_targets).any()
            || (pawns.shift(us.up_west()) & pawn_targets).any()
        {
            return true;
        }

        for piece in [
            Piece::Knight,
            Piece::Bishop,
            Piece::Rook,
            Piece::Queen,
            Piece::King,
        ] {
            for from in self.piece_bb(us, piece).squares() {
                if (self.attacks_from(piece, from, us) & enemies).any() {
                    return true;
                }
            }
        }
        false
    }

    /// Losers: is any *legal* capture available? The king is royal here, so
    /// a capture that exposes it does not count.
    pub fn can_capture_losers(&self) -> bool {
        let us = self.stm;
        let them = us.flip();
        let enemies = self.pieces_of(them);

        for from in self.piece_bb(us, Piece::Pawn).squares() {
            let attacks = self.attacks_from(Piece::Pawn, from, us);
            for to in (attacks & enemies).squares() {
                if self.legal(Move::new(from, to)) {
                    return true;
                }
            }
            if let Some(ep) = self.ep_square
                && attacks.contains_square(ep.index())
                && self.legal(Move::en_passant(from, ep))
            {
                return true;
            }
        }
        for piece in [
            Piece::Knight,
            Piece::Bishop,
            Piece::Rook,
            Piece::Queen,
            Piece::King,
        ] {
            for from in self.piece_bb(us, piece).squares() {
                for to in (self.attacks_from(piece, from, us) & enemies).squares() {
                    if self.legal(Move::new(from, to)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    // =========================================================
    //                       LEGALITY
    // =========================================================

    /// Does `m` leave the opponent in check?
    pub fn gives_check(&self, m: Move) -> bool {
        let them = self.stm.flip();
        let mut sim = *self;
        if sim.do_move(m).is_err() {
            return false;
        }
        sim.in_check(them)
    }

    /// Is the pseudo-legal move `m` strictly legal under this variant?
    pub fn legal(&self, m: Move) -> bool {
        if self.is_anti() {
            // No royal king, no checks; every pseudo-legal move stands.
            return true;
        }
        let us = self.stm;
        let mut sim = *self;
        if sim.do_move(m).is_err() {
            return false;
        }
        match self.variant {
            Variant::Atomic => {
                if sim.king_sq(us).is_none() {
                    return false;
                }
                if sim.king_sq(us.flip()).is_none() {
                    return true;
                }
                !sim.in_check(us)
            }
            // Giving check is forbidden outright.
            Variant::RacingKings => !sim.in_check(us) && !sim.in_check(us.flip()),
            _ => !sim.in_check(us),
        }
    }

    /// Does `m` capture something? Castling is encoded king-takes-rook and
    /// is never a capture.
    pub fn capture(&self, m: Move) -> bool {
        match m.kind() {
            MoveKind::EnPassant => true,
            MoveKind::Castling | MoveKind::Drop => false,
            _ => self.board.get_piece_at(m.to_sq()).is_some(),
        }
    }

    // =========================================================
    //                      STATE TRANSITION
    // =========================================================

    /// Applies `m`. The move must be pseudo-legal for the side to move;
    /// anything else is a programming error and surfaces as a diagnostic.
    pub fn do_move(&mut self, m: Move) -> miette::Result<()> {
        let us = self.stm;
        let them = us.flip();
        self.ep_square = None;
        let mut reset_clock = false;

        match m.kind() {
            MoveKind::Drop => {
                let piece = m.dropped_piece();
                let to = m.to_sq();
                miette::ensure!(
                    self.hands[us.index()][piece.index()] > 0,
                    "[do_move] no {piece} in hand for {us}"
                );
                self.hands[us.index()][piece.index()] -= 1;
                self.board.set_piece(us, piece, to)?;
                if piece == Piece::Pawn {
                    reset_clock = true;
                }
            }
            MoveKind::Castling => {
                let kfrom = m.from_sq();
                let rfrom = m.to_sq();
                let king_side = rfrom > kfrom;
                let kto = Square::relative(us, if king_side { 6 } else { 2 });
                let rto = Square::relative(us, if king_side { 5 } else { 3 });
                // Remove both before placing either; in Chess960 the
                // destinations can overlap the start squares.
                let king = self.board.remove_piece(kfrom)?;
                let rook = self.board.remove_piece(rfrom)?;
                self.board.set_piece(king.side, king.piece, kto)?;
                self.board.set_piece(rook.side, rook.piece, rto)?;
            }
            MoveKind::EnPassant => {
                let from = m.from_sq();
                let to = m.to_sq();
                let cap_sq = to.get_neighbor(-us.up());
                self.board.remove_piece(cap_sq)?;
                reset_clock = true;
                if self.is_house() {
                    self.hands[us.index()][Piece::Pawn.index()] += 1;
                }
                if self.is_atomic() {
                    self.board.remove_piece(from)?;
                    self.explode(to)?;
                } else {
                    self.board.move_piece(from, to)?;
                }
            }
            MoveKind::Promotion => {
                let from = m.from_sq();
                let to = m.to_sq();
                reset_clock = true;
                self.board.remove_piece(from)?;
                let captured = self.board.get_piece_at(to);
                if let Some(victim) = captured {
                    miette::ensure!(victim.side == them, "[do_move] promotion onto own piece");
                    self.board.remove_piece(to)?;
                    self.capture_bookkeeping(victim, to);
                }
                if self.is_atomic() && captured.is_some() {
                    self.explode(to)?;
                } else {
                    self.board.set_piece(us, m.promoted_to(), to)?;
                    if self.is_house() {
                        self.promoted.set(to.index());
                    }
                }
            }
            MoveKind::Normal => {
                let from = m.from_sq();
                let to = m.to_sq();
                let mover = self
                    .board
                    .get_piece_at(from)
                    .with_context(|| format!("[do_move] no piece on {from}"))?;
                if mover.piece == Piece::Pawn {
                    reset_clock = true;
                }
                let captured = self.board.get_piece_at(to);
                if let Some(victim) = captured {
                    miette::ensure!(victim.side == them, "[do_move] capturing own piece");
                    self.board.remove_piece(to)?;
                    self.capture_bookkeeping(victim, to);
                    reset_clock = true;
                }
                if self.is_atomic() && captured.is_some() {
                    self.board.remove_piece(from)?;
                    self.explode(to)?;
                } else {
                    self.board.move_piece(from, to)?;
                    if self.is_house() && self.promoted.contains_square(from.index()) {
                        self.promoted.clear(from.index());
                        self.promoted.set(to.index());
                    }
                    if mover.piece == Piece::Pawn
                        && to.index().abs_diff(from.index()) == 16
                        && from.relative_row(us) == 1
                    {
                        let ep = from.get_neighbor(us.up());
                        // Record the square only when an enemy pawn could
                        // actually take en passant.
                        if (MOVE_TABLES.get_pawn_attacks(ep, us)
                            & self.piece_bb(them, Piece::Pawn))
                        .any()
                        {
                            self.ep_square = Some(ep);
                        }
                    }
                }
            }
        }

        if m.kind() != MoveKind::Drop {
            self.castling.touch(m.from_sq());
            self.castling.touch(m.to_sq());
        }
        self.halfmove_clock = if reset_clock {
            0
        } else {
            self.halfmove_clock.saturating_add(1)
        };
        if us == Side::Black {
            self.fullmove_counter += 1;
        }
        self.stm = them;
        Ok(())
    }

    /// Crazyhouse: the victim changes color and enters our hand; promoted
    /// pieces re-enter as pawns.
    fn capture_bookkeeping(&mut self, victim: PieceInfo, sq: Square) {
        if self.is_house() {
            let piece = if self.promoted.contains_square(sq.index()) {
                Piece::Pawn
            } else {
                victim.piece
            };
            self.promoted.clear(sq.index());
            self.hands[self.stm.index()][piece.index()] += 1;
        }
    }

    /// Atomic blast around `center`: every adjacent non-pawn piece goes,
    /// the capturer and victim having been removed by the caller already.
    fn explode(&mut self, center: Square) -> miette::Result<()> {
        for s in MOVE_TABLES.get_king_attacks(center).squares() {
            if let Some(info) = self.board.get_piece_at(s)
                && info.piece != Piece::Pawn
            {
                self.board.remove_piece(s)?;
                self.castling.touch(s);
            }
        }
        self.castling.touch(center);
        Ok(())
    }

    // =========================================================
    //                        FORMATTING
    // =========================================================

    /// UCI rendering. Chess960 castling keeps the king-takes-rook form;
    /// everything else matches `Move`'s own `Display`.
    pub fn move_to_uci(&self, m: Move) -> String {
        if m.kind() == MoveKind::Castling && self.chess960 {
            format!("{}{}", m.from_sq(), m.to_sq())
        } else {
            m.to_string()
        }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let sq = Square::from_coords(file, rank).unwrap();
                match self.board.get_piece_at(sq) {
                    Some(info) => write!(f, "{} ", info.piece.to_char(info.side))?,
                    None => write!(f, ". ")?,
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")?;
        writeln!(f, "{} [{}] {}", self.variant, self.stm, self.to_fen())
    }
}
