use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mr_primes::miller_rabin;
use mr_primes::search::{find_prime, SearchContext, SearchStats};
use mr_primes::{Candidate, LowPrimeTable, RandomSource, ResultSink};
use num_bigint::BigUint;

/// 2^521 - 1
fn mersenne_521() -> BigUint {
    (BigUint::from(1u32) << 521u32) - 1u32
}

fn bench_low_prime_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("low_prime_table");
    for count in [1_000usize, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| LowPrimeTable::generate(black_box(count)).unwrap())
        });
    }
    group.finish();
}

fn bench_sieve_step(c: &mut Criterion) {
    let table = LowPrimeTable::generate(10_000).unwrap();
    let random = RandomSource::new(1);
    let start = random.gen_start(300);

    c.bench_function("sieve_skip_300_digits", |b| {
        b.iter(|| {
            let mut candidate = Candidate::new(start.clone(), &table);
            for _ in 0..100 {
                candidate.advance();
                candidate.skip_to_candidate();
            }
            black_box(candidate.value().bits())
        })
    });
}

fn bench_miller_rabin(c: &mut Criterion) {
    let n = mersenne_521();
    let random = RandomSource::new(7);
    let mut group = c.benchmark_group("miller_rabin_m521");
    for rounds in [1u32, 8, 25] {
        group.bench_with_input(BenchmarkId::from_parameter(rounds), &rounds, |b, &rounds| {
            b.iter(|| miller_rabin::test(black_box(&n), rounds, &random))
        });
    }
    group.finish();
}

fn bench_find_prime(c: &mut Criterion) {
    let dir = std::env::temp_dir().join("mr_primes_bench.txt");
    let table = LowPrimeTable::generate(10_000).unwrap();
    let random = RandomSource::new(42);
    let sink = ResultSink::create(&dir, false).unwrap();
    let stats = SearchStats::default();

    let mut group = c.benchmark_group("find_prime");
    group.sample_size(10);
    for digits in [50u32, 100] {
        let ctx = SearchContext {
            table: &table,
            random: &random,
            sink: &sink,
            stats: &stats,
            digits,
            rounds: 8,
        };
        group.bench_with_input(BenchmarkId::from_parameter(digits), &digits, |b, _| {
            b.iter(|| find_prime(&ctx))
        });
    }
    group.finish();
    let _ = std::fs::remove_file(dir);
}

criterion_group!(
    benches,
    bench_low_prime_table,
    bench_sieve_step,
    bench_miller_rabin,
    bench_find_prime
);
criterion_main!(benches);
