//! Benchmarks for engine output parsing and queue hand-off.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use uci_host::uci::{parse_best_move, parse_option};
use uci_host::{parse_command, OverwriteQueue, UnboundedQueue};

const SHORT_INFO: &str = "info depth 12 seldepth 18 score cp 34 nodes 1048576 nps 2097152 time 500";
const LONG_PV: &str = "info depth 24 seldepth 31 multipv 1 score cp -15 lowerbound nodes 91827364 \
     nps 3500000 hashfull 712 tbhits 0 time 26236 pv e2e4 e7e5 g1f3 b8c6 f1b5 a7a6 b5a4 g8f6 \
     e1g1 f8e7 f1e1 b7b5 a4b3 d7d6 c2c3 e8g8 h2h3 c6a5 b3c2 c7c5 d2d4 d8c7 b1d2 c5d4";
const STRING_INFO: &str = "info string NNUE evaluation using nn-5af11540bbfe.nnue enabled";

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    for (name, line) in [
        ("short_info", SHORT_INFO),
        ("long_pv", LONG_PV),
        ("string_info", STRING_INFO),
    ] {
        group.bench_with_input(BenchmarkId::new("command", name), line, |b, line| {
            b.iter(|| parse_command(black_box(line)))
        });
    }

    group.bench_function("bestmove", |b| {
        b.iter(|| parse_best_move(black_box("bestmove e2e4 ponder e7e5")))
    });
    group.bench_function("option", |b| {
        b.iter(|| {
            parse_option(black_box(
                "option name Style type combo default Normal var Solid var Normal var Risky",
            ))
        })
    });

    group.finish();
}

fn bench_queues(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue");

    for capacity in [1, 32, 256] {
        let queue = OverwriteQueue::new(capacity);
        group.bench_with_input(
            BenchmarkId::new("overwrite_push", capacity),
            &capacity,
            |b, _| b.iter(|| queue.push(black_box(7u64))),
        );
    }

    let queue = UnboundedQueue::new();
    group.bench_function("unbounded_push_next", |b| {
        b.iter(|| {
            queue.push(black_box(7u64));
            queue.next()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_queues);
criterion_main!(benches);
