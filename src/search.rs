use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::low_primes::LowPrimeTable;
use crate::miller_rabin::{self, Verdict};
use crate::offsets::Candidate;
use crate::random_source::RandomSource;
use crate::sink::ResultSink;
use num_bigint::BigUint;
use rayon::prelude::*;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// Counters shared by all workers of one search.
#[derive(Debug, Default)]
pub struct SearchStats {
    candidates_examined: AtomicU64,
    miller_rabin_tests: AtomicU64,
}

impl SearchStats {
    pub fn candidates_examined(&self) -> u64 {
        self.candidates_examined.load(Ordering::Relaxed)
    }

    pub fn miller_rabin_tests(&self) -> u64 {
        self.miller_rabin_tests.load(Ordering::Relaxed)
    }
}

/// Everything a worker shares with the others. The table is read-only; the
/// random source and the sink do their own locking.
pub struct SearchContext<'a> {
    pub table: &'a LowPrimeTable,
    pub random: &'a RandomSource,
    pub sink: &'a ResultSink,
    pub stats: &'a SearchStats,
    pub digits: u32,
    pub rounds: u32,
}

#[derive(Debug)]
pub struct SearchResults {
    pub primes_found: u64,
    /// Primes in discovery order, matching the lines written by this run.
    pub primes: Vec<BigUint>,
    pub seed: u64,
    pub threads: usize,
    pub candidates_examined: u64,
    pub miller_rabin_tests: u64,
    pub init_time: Duration,
    pub elapsed_time: Duration,
}

/// Run one search to completion and return the probable prime it found.
///
/// Start from a random odd `digits`-digit integer, step past anything a
/// table prime divides, test what survives, and on a composite verdict
/// step once more and repeat. The search never gives up.
pub fn find_prime(ctx: &SearchContext) -> BigUint {
    let start = ctx.random.gen_start(ctx.digits);
    trace!(start = %start, "worker drew start point");

    let mut candidate = Candidate::new(start, ctx.table);
    let mut examined = 1 + candidate.skip_to_candidate();
    let mut tests = 0u64;

    loop {
        tests += 1;
        match miller_rabin::test(candidate.value(), ctx.rounds, ctx.random) {
            Verdict::ProbablePrime => break,
            Verdict::Composite => {
                trace!(tests, "composite, moving to next candidate");
                candidate.advance();
                examined += 1 + candidate.skip_to_candidate();
            }
        }
    }

    ctx.stats
        .candidates_examined
        .fetch_add(examined, Ordering::Relaxed);
    ctx.stats
        .miller_rabin_tests
        .fetch_add(tests, Ordering::Relaxed);

    candidate.into_value()
}

/// One unit of work: find a prime, append it to the sink, report it.
///
/// Returns the discovery index together with the prime.
pub fn run_worker<F>(ctx: &SearchContext, on_found: &F) -> Result<(u64, BigUint)>
where
    F: Fn(u64, &BigUint) + Sync,
{
    let prime = find_prime(ctx);
    let index = ctx.sink.record(&prime)?;
    debug!(index, digits = ctx.digits, "probable prime recorded");
    on_found(index, &prime);
    Ok((index, prime))
}

/// Search for `config.prime_count` probable primes in parallel
///
/// Builds the low-prime table, prepares the output file, then runs one unit
/// of work per requested prime on a bounded Rayon pool. Every unit appends
/// its prime to the output file as soon as it is found, and `on_found` is
/// called with the discovery index (1, 2, ...) and the prime.
///
/// The config is expected to be validated; the only check made here is that
/// the table primes are smaller than any candidate.
///
/// # Errors
///
/// Fails before any work starts on an invalid table size, when the output
/// file cannot be prepared, or when the pool cannot be built. An append
/// failure during the search stops further units from being scheduled and is
/// returned; primes written before it stay in the file.
///
/// # Examples
///
/// ```no_run
/// use mr_primes::{run_search, SearchConfig};
///
/// let config = SearchConfig {
///     output: "primes.txt".to_string(),
///     prime_count: 4,
///     digits: 50,
///     seed: Some(42),
///     ..Default::default()
/// };
///
/// let results = run_search(&config, |index, prime| {
///     println!("Prime #{} found: {}", index, prime);
/// })
/// .unwrap();
/// assert_eq!(results.primes_found, 4);
/// ```
pub fn run_search<F>(config: &SearchConfig, on_found: F) -> Result<SearchResults>
where
    F: Fn(u64, &BigUint) + Sync,
{
    let init_start = Instant::now();

    let table = LowPrimeTable::generate(config.low_primes)?;
    let smallest_candidate = BigUint::from(10u32).pow(config.digits.saturating_sub(1));
    if BigUint::from(table.largest()) >= smallest_candidate {
        return Err(SearchError::InvalidConfig(format!(
            "largest offset prime {} is not below the smallest {}-digit candidate",
            table.largest(),
            config.digits
        )));
    }

    let seed = config.resolved_seed();
    let threads = config.resolved_threads();
    let random = RandomSource::new(seed);
    let sink = ResultSink::create(&config.output, config.append)?;
    let stats = SearchStats::default();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("prime-worker-{}", i))
        .build()?;

    let init_time = init_start.elapsed();
    info!(
        primes = config.prime_count,
        digits = config.digits,
        rounds = config.rounds,
        seed,
        threads,
        low_primes = table.len(),
        "starting prime search"
    );

    let ctx = SearchContext {
        table: &table,
        random: &random,
        sink: &sink,
        stats: &stats,
        digits: config.digits,
        rounds: config.rounds,
    };

    let search_start = Instant::now();
    let mut found: Vec<(u64, BigUint)> = pool.install(|| {
        (0..config.prime_count)
            .into_par_iter()
            .map(|_| run_worker(&ctx, &on_found))
            .collect::<Result<Vec<_>>>()
    })?;
    let elapsed_time = search_start.elapsed();

    found.sort_by_key(|(index, _)| *index);
    let primes: Vec<BigUint> = found.into_iter().map(|(_, prime)| prime).collect();

    info!(
        found = primes.len(),
        elapsed_secs = elapsed_time.as_secs_f64(),
        "prime search complete"
    );

    Ok(SearchResults {
        primes_found: sink.found(),
        primes,
        seed,
        threads,
        candidates_examined: stats.candidates_examined(),
        miller_rabin_tests: stats.miller_rabin_tests(),
        init_time,
        elapsed_time,
    })
}

/// Summary of a finished run, suitable for writing as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub output: String,
    pub primes_found: u64,
    pub digits: u32,
    pub rounds: u32,
    pub seed: u64,
    pub low_primes: usize,
    pub threads: usize,
    pub candidates_examined: u64,
    pub miller_rabin_tests: u64,
    pub init_secs: f64,
    pub elapsed_secs: f64,
    pub finished_at: String,
}

impl SearchReport {
    pub fn new(config: &SearchConfig, results: &SearchResults) -> Self {
        SearchReport {
            output: config.output.clone(),
            primes_found: results.primes_found,
            digits: config.digits,
            rounds: config.rounds,
            seed: results.seed,
            low_primes: config.low_primes,
            threads: results.threads,
            candidates_examined: results.candidates_examined,
            miller_rabin_tests: results.miller_rabin_tests,
            init_secs: results.init_time.as_secs_f64(),
            elapsed_secs: results.elapsed_time.as_secs_f64(),
            finished_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }

    pub fn save(&self, path: impl AsRef<std::path::Path>) -> std::io::Result<()> {
        crate::io_utils::save_to_file(self, path)
    }
}
