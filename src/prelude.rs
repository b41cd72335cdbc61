pub use crate::board::fen;
pub use crate::board::{
    self, Position,
    components::{
        BitBoard, BitBoardIterator, BoardState, CastlingData, CastlingRight, CastlingRights,
        Piece, PieceInfo, Side, Square, Variant,
    },
};
pub use crate::consts::*;
pub use crate::moves::{
    self, Direction,
    move_buffer::MoveBuffer,
    move_gen::{self, GenType},
    move_info::{Move, MoveKind},
};
pub use crate::precomputed::move_tables::MOVE_TABLES;
pub use crate::utils::{self, log, perft::*};
pub use miette::{self, Context, IntoDiagnostic, Result};
pub use std::fmt::Display;
pub use std::str::FromStr;
pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
