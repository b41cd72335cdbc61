//! Bitboard move generation for eight chess variants: standard chess
//! (including Chess960), Antichess, Atomic, Crazyhouse, Horde, Losers,
//! Racing Kings and Relay.
//!
//! The library is a move generator plus the position machinery it needs:
//! callers build a [`Position`] from FEN and ask [`moves::move_gen::generate`]
//! for any generation kind, from fast pseudo-legal capture lists up to the
//! strictly legal move set. Perft over the legal generator is the
//! correctness oracle.

pub mod board;
pub mod consts;
pub mod moves;
pub mod precomputed;
pub mod prelude;
pub mod utils;

pub use board::components::*;
pub use board::*;
pub use moves::move_gen;
pub use utils::cli;
pub use utils::perft;

/// Initialize tracing, backtraces and the attack tables. Call once at
/// startup; generator calls themselves never initialize anything.
pub fn init() {
    utils::log::init();
}
