//! Crate-wide constants: buffer sizing and the canonical start positions
//! for every supported variant.

/// Upper bound on the number of moves a single position can produce.
/// 218 is the known maximum for standard chess; Crazyhouse drops push the
/// practical ceiling higher, so the buffer is sized generously.
pub const MAX_MOVES: usize = 256;

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// "Kiwipete", the classic castling/pin/en-passant torture position.
pub const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

/// Antichess start: no castling, king is an ordinary piece.
pub const ANTICHESS_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w - - 0 1";

/// Crazyhouse start: empty holdings in brackets.
pub const CRAZYHOUSE_START_FEN: &str =
    "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR[] w KQkq - 0 1";

/// Horde start: white is a wall of 36 pawns and has no king.
pub const HORDE_START_FEN: &str =
    "rnbqkbnr/pppppppp/8/1PP2PP1/PPPPPPPP/PPPPPPPP/PPPPPPPP/PPPPPPPP w kq - 0 1";

/// Racing Kings start: both armies on ranks 1-2, racing for rank 8.
pub const RACING_KINGS_START_FEN: &str = "8/8/8/8/8/8/krbnNBRK/qrbnNBRQ w - - 0 1";
