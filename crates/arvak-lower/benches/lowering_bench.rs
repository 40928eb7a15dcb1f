//! Benchmarks for Arvak arithmetic lowering
//!
//! Run with: cargo bench -p arvak-lower

use arvak_arith::{Command, Operation, QubitId, Register};
use arvak_lower::{AutoReplacer, LimitedCapability, StaticHost};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

fn toffoli_engine() -> AutoReplacer<StaticHost> {
    AutoReplacer::new(StaticHost::new(LimitedCapability::toffoli()))
}

/// Benchmark lowering an addition with a cold cache
fn bench_addition(c: &mut Criterion) {
    let mut group = c.benchmark_group("addition");

    for n in &[4u32, 8, 16, 32] {
        let add = Command::add(Register::contiguous(0, *n), Register::contiguous(*n, *n)).unwrap();
        let live: Vec<QubitId> = add.qubits().collect();
        group.bench_with_input(BenchmarkId::new("cold", n), &add, |b, cmd| {
            b.iter(|| toffoli_engine().lower_within(black_box(cmd), &live).unwrap());
        });
    }

    group.finish();
}

/// Benchmark increments that borrow a single dirty qubit
fn bench_increment(c: &mut Criterion) {
    let mut group = c.benchmark_group("increment");

    for n in &[4u32, 8, 16, 32] {
        let inc = Command::single(Operation::Increment, Register::contiguous(0, *n)).unwrap();
        let live: Vec<QubitId> = (0..=*n).map(QubitId).collect();
        group.bench_with_input(BenchmarkId::new("one_dirty", n), &inc, |b, cmd| {
            b.iter(|| toffoli_engine().lower_within(black_box(cmd), &live).unwrap());
        });
    }

    group.finish();
}

/// Benchmark modular offsets, cold and with a warm shape cache
fn bench_modular_offset(c: &mut Criterion) {
    let mut group = c.benchmark_group("modular_offset");

    for n in &[4u32, 8, 16] {
        let modulus = (1i64 << n) - 3;
        let op = Operation::modular_offset(5, modulus).unwrap();
        let cmd = Command::single(op, Register::contiguous(0, *n)).unwrap();
        let live: Vec<QubitId> = (0..*n + 2).map(QubitId).collect();

        group.bench_with_input(BenchmarkId::new("cold", n), &cmd, |b, cmd| {
            b.iter(|| toffoli_engine().lower_within(black_box(cmd), &live).unwrap());
        });

        let mut warm = toffoli_engine();
        warm.lower_within(&cmd, &live).unwrap();
        group.bench_with_input(BenchmarkId::new("cached", n), &cmd, |b, cmd| {
            b.iter(|| warm.lower_within(black_box(cmd), &live).unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_addition, bench_increment, bench_modular_offset);
criterion_main!(benches);
