//! Perft: the primary correctness oracle. Counts the leaves of the legal
//! move tree by recursive `generate::<Legal>` + `do_move`.

use std::time::{Duration, Instant};

use crate::prelude::*;

#[derive(Debug)]
pub struct PerftResult {
    /// Total nodes counted
    pub nodes: u64,
    /// Time taken
    pub duration: Duration,
    /// Nodes per second
    pub nps: u64,
    /// Per-root-move breakdown in UCI, when divide was requested
    pub move_counts: Option<Vec<(String, u64)>>,
}

impl PerftResult {
    pub fn new(nodes: u64, duration: Duration, move_counts: Option<Vec<(String, u64)>>) -> Self {
        let nanos = duration.as_nanos();
        let nps = if nanos > 0 {
            (nodes as u128 * 1_000_000_000 / nanos) as u64
        } else {
            0
        };
        Self {
            nodes,
            duration,
            nps,
            move_counts,
        }
    }
}

pub fn perft(pos: &Position, depth: u8) -> u64 {
    if depth == 0 {
        return 1;
    }

    let mut list = MoveBuffer::new();
    move_gen::generate::<move_gen::Legal>(pos, &mut list);

    if depth == 1 {
        return list.len() as u64;
    }

    let mut nodes = 0;
    for &m in &list {
        let mut child = *pos;
        child
            .do_move(m)
            .expect("legal move applies to its own position");
        nodes += perft(&child, depth - 1);
    }
    nodes
}

/// Root-split perft over all cores. Depths 0 and 1 fall through to the
/// sequential version.
#[cfg(feature = "parallel")]
pub fn perft_parallel(pos: &Position, depth: u8) -> u64 {
    use rayon::prelude::*;

    if depth <= 1 {
        return perft(pos, depth);
    }
    let mut list = MoveBuffer::new();
    move_gen::generate::<move_gen::Legal>(pos, &mut list);
    list.as_slice()
        .par_iter()
        .map(|&m| {
            let mut child = *pos;
            child
                .do_move(m)
                .expect("legal move applies to its own position");
            perft(&child, depth - 1)
        })
        .sum()
}

/// Perft with a per-root-move breakdown, sorted by UCI for stable output.
pub fn perft_divide(pos: &Position, depth: u8) -> PerftResult {
    let start_time = Instant::now();

    let mut list = MoveBuffer::new();
    move_gen::generate::<move_gen::Legal>(pos, &mut list);

    let mut total_nodes = 0;
    let mut move_counts = Vec::with_capacity(list.len());
    for &m in &list {
        let sub_nodes = if depth <= 1 {
            1
        } else {
            let mut child = *pos;
            child
                .do_move(m)
                .expect("legal move applies to its own position");
            perft(&child, depth - 1)
        };
        total_nodes += sub_nodes;
        move_counts.push((pos.move_to_uci(m), sub_nodes));
    }
    move_counts.sort();

    PerftResult::new(total_nodes, start_time.elapsed(), Some(move_counts))
}

/// Prints a perft divide table for `pos`.
pub fn print_perft_divide(pos: &Position, depth: u8) -> PerftResult {
    let result = perft_divide(pos, depth);

    if let Some(ref move_counts) = result.move_counts {
        println!("Perft results at depth {depth}");
        println!("----------------------------");
        for (mov, count) in move_counts {
            println!("{mov}: {count}");
        }
        println!("----------------------------");
        println!("Total nodes: {}", result.nodes);
        println!("Time: {} ms", result.duration.as_millis());
        println!("Nodes per second: {}", result.nps);
    }

    result
}

/// Runs a suite of perft tests for depths 1 through max_depth
pub fn run_perft_suite(pos: &Position, max_depth: u8) {
    println!("Running Perft suite up to depth {max_depth} ({})", pos.variant);
    println!("----------------------------");

    for depth in 1..=max_depth {
        let start = Instant::now();
        let nodes = perft(pos, depth);
        let duration = start.elapsed();

        let nanos = duration.as_nanos();
        let nps = if nanos > 0 {
            (nodes as u128 * 1_000_000_000 / nanos) as u64
        } else {
            0
        };

        println!(
            "Depth {}: {} nodes in {} ms ({} nps)",
            depth,
            nodes,
            duration.as_millis(),
            nps
        );
    }

    println!("----------------------------");
}

#[cfg(test)]
mod perft_tests {
    use super::*;
    use crate::consts::*;
    use crate::init;

    fn assert_perft(fen: &str, variant: Variant, expected: &[(u8, u64)]) {
        init();
        let pos = Position::from_fen_variant(fen, variant).unwrap();
        for &(depth, nodes) in expected {
            let got = perft(&pos, depth);
            assert_eq!(
                got, nodes,
                "Perft failed for {variant} '{fen}' at depth {depth}: got {got} expected {nodes}",
            );
        }
    }

    #[test]
    fn test_perft_starting_position() {
        assert_perft(
            START_FEN,
            Variant::Chess,
            &[(1, 20), (2, 400), (3, 8902), (4, 197_281)],
        );
    }

    #[test]
    fn test_perft_kiwipete() {
        assert_perft(
            KIWIPETE,
            Variant::Chess,
            &[(1, 48), (2, 2039), (3, 97_862)],
        );
    }

    #[test]
    fn test_perft_position3() {
        assert_perft(
            "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
            Variant::Chess,
            &[(1, 14), (2, 191), (3, 2812), (4, 43_238)],
        );
    }

    #[test]
    fn test_perft_position4() {
        assert_perft(
            "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1",
            Variant::Chess,
            &[(1, 6), (2, 264), (3, 9467)],
        );
    }

    #[test]
    fn test_perft_antichess_start() {
        // Captures become forced from ply 3 on.
        assert_perft(
            ANTICHESS_START_FEN,
            Variant::Antichess,
            &[(1, 20), (2, 400), (3, 8067), (4, 153_299)],
        );
    }

    #[test]
    fn test_perft_atomic_start() {
        // No captures (hence no explosions) can occur before ply 3, so the
        // early counts coincide with standard chess.
        assert_perft(
            START_FEN,
            Variant::Atomic,
            &[(1, 20), (2, 400), (3, 8902)],
        );
    }

    #[test]
    fn test_perft_crazyhouse_start() {
        // The first capture can happen at ply 3, so hands stay empty and
        // dropless through depth 4.
        assert_perft(
            CRAZYHOUSE_START_FEN,
            Variant::Crazyhouse,
            &[(1, 20), (2, 400), (3, 8902), (4, 197_281)],
        );
    }

    #[test]
    fn test_perft_horde_start() {
        assert_perft(
            HORDE_START_FEN,
            Variant::Horde,
            &[(1, 8), (2, 128), (3, 1274)],
        );
    }

    #[test]
    fn test_perft_racing_kings_start() {
        assert_perft(
            RACING_KINGS_START_FEN,
            Variant::RacingKings,
            &[(1, 21), (2, 421)],
        );
    }

    #[test]
    fn test_perft_chess960_castling() {
        // BQNNRKRB start array. The g-file rights castle "in place" (king
        // f1, rook g1, nothing between), the e-file rights are impeded by
        // the knights, so depth 1 is 16 pawn moves, 4 knight moves and the
        // king-side castle; depth 2 squares that with no interactions.
        assert_perft(
            "bqnnrkrb/pppppppp/8/8/8/8/PPPPPPPP/BQNNRKRB w GEge - 0 1",
            Variant::Chess,
            &[(1, 21), (2, 441)],
        );
    }
}
