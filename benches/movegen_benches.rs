use criterion::{Criterion, black_box, criterion_group, criterion_main};
use menagerie::consts::KIWIPETE;
use menagerie::move_gen::{self, Captures, Legal, NonEvasions, QuietChecks};
use menagerie::perft::perft;
use menagerie::prelude::*;

fn gen_count<T: move_gen::GenKind>(pos: &Position) -> usize {
    let mut list = MoveBuffer::new();
    move_gen::generate::<T>(pos, &mut list);
    list.len()
}

fn bench_generation_kinds(c: &mut Criterion) {
    menagerie::init();
    let kiwipete = Position::from_fen(KIWIPETE).unwrap();

    c.bench_function("kiwipete_legal", |b| {
        b.iter(|| gen_count::<Legal>(black_box(&kiwipete)))
    });
    c.bench_function("kiwipete_captures", |b| {
        b.iter(|| gen_count::<Captures>(black_box(&kiwipete)))
    });
    c.bench_function("kiwipete_non_evasions", |b| {
        b.iter(|| gen_count::<NonEvasions>(black_box(&kiwipete)))
    });
    c.bench_function("kiwipete_quiet_checks", |b| {
        b.iter(|| gen_count::<QuietChecks>(black_box(&kiwipete)))
    });
}

fn bench_variants(c: &mut Criterion) {
    menagerie::init();
    let atomic = Position::from_fen_variant(KIWIPETE, Variant::Atomic).unwrap();
    let house = Position::from_fen_variant(
        "r1bqk2r/ppp2ppp/2n2n2/3pp3/1b2P3/2NP1N2/PPP2PPP/R1BQKB1R[Pn] w KQkq - 0 1",
        Variant::Crazyhouse,
    )
    .unwrap();

    c.bench_function("atomic_legal", |b| {
        b.iter(|| gen_count::<Legal>(black_box(&atomic)))
    });
    c.bench_function("crazyhouse_legal", |b| {
        b.iter(|| gen_count::<Legal>(black_box(&house)))
    });
}

fn bench_perft(c: &mut Criterion) {
    menagerie::init();
    let start = Position::startpos(Variant::Chess);

    c.bench_function("perft_3_startpos", |b| {
        b.iter(|| perft(black_box(&start), 3))
    });
}

criterion_group!(benches, bench_generation_kinds, bench_variants, bench_perft);
criterion_main!(benches);
