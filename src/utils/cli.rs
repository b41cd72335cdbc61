use clap::{Parser, Subcommand};

use crate::consts::START_FEN;

#[derive(Parser)]
#[command(name = env!("CARGO_PKG_NAME"), version = env!("CARGO_PKG_VERSION"), about = env!("CARGO_PKG_DESCRIPTION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Count leaf nodes of the legal move tree to the given depth
    Perft {
        /// FEN string for the starting position
        #[arg(short, long, default_value = START_FEN)]
        fen: String,
        /// Search depth
        #[arg(short, long, default_value = "5")]
        depth: u8,
        /// Rule set (chess, antichess, atomic, crazyhouse, horde, losers,
        /// racingkings, relay)
        #[arg(short, long, default_value = "chess")]
        variant: String,
        /// Print a per-root-move breakdown
        #[arg(long, default_value = "false")]
        divide: bool,
    },

    /// List the legal moves of a position in UCI, sorted
    Moves {
        /// FEN string for the position
        #[arg(short, long, default_value = START_FEN)]
        fen: String,
        /// Rule set
        #[arg(short, long, default_value = "chess")]
        variant: String,
    },
}
