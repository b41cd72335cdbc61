use clap::Parser;
use menagerie::cli::{Cli, Commands};
use menagerie::move_gen::{self, Legal};
use menagerie::perft::{print_perft_divide, run_perft_suite};
use menagerie::prelude::*;
use tracing::info;

fn main() -> miette::Result<()> {
    menagerie::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Perft {
            fen,
            depth,
            variant,
            divide,
        } => {
            let variant: Variant = variant.parse()?;
            let pos = Position::from_fen_variant(&fen, variant)?;
            info!("perft {} to depth {depth}", pos.to_fen());
            if divide {
                print_perft_divide(&pos, depth);
            } else {
                run_perft_suite(&pos, depth);
            }
        }
        Commands::Moves { fen, variant } => {
            let variant: Variant = variant.parse()?;
            let pos = Position::from_fen_variant(&fen, variant)?;
            let mut list = MoveBuffer::new();
            move_gen::generate::<Legal>(&pos, &mut list);
            let mut moves: Vec<String> = list.iter().map(|&m| pos.move_to_uci(m)).collect();
            moves.sort_unstable();
            println!("{}", pos);
            println!("{} legal moves: {}", moves.len(), moves.join(" "));
        }
    }

    Ok(())
}
