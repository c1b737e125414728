use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mr_primes::verify::LineProblem;
use mr_primes::{
    is_probable_prime, run_search, verify_file, RandomSource, SearchConfig, SearchReport,
    VerifyConfig,
};
use num_bigint::BigUint;
use std::path::Path;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "mr-primes")]
#[command(version)]
#[command(about = "Generate large probable primes with the Miller-Rabin test", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Search for probable primes and write them to a file")]
    Generate {
        #[arg(long, help = "Configuration file (JSON) - CLI options override config file values")]
        config: Option<String>,

        #[arg(short, long, help = "Output file (default: primes.txt)")]
        output: Option<String>,

        #[arg(short = 'n', long, help = "Number of primes to generate (default: 10)")]
        num_primes: Option<u64>,

        #[arg(short = 'd', long, help = "Number of digits of each prime, at least 10 (default: 300)")]
        num_digits: Option<u32>,

        #[arg(short = 'p', long, help = "Rounds of the Miller-Rabin test, 1 to 199 (default: 8)")]
        precision: Option<u32>,

        #[arg(short = 'O', long, help = "Number of low odd primes used to sieve candidates (default: 10000)")]
        num_offsets: Option<usize>,

        #[arg(short, long, help = "Random seed (default: current time)")]
        seed: Option<u64>,

        #[arg(short, long, help = "Append to the output file instead of truncating it")]
        append: bool,

        #[arg(short, long, help = "Worker threads (default: one per prime, capped at CPU count)")]
        threads: Option<usize>,

        #[arg(long, help = "Write a JSON run report to this file")]
        report: Option<String>,
    },

    #[command(about = "Test a single number for probable primality")]
    Test {
        #[arg(help = "The number to test")]
        number: String,

        #[arg(short = 'p', long, default_value = "25")]
        precision: u32,

        #[arg(short, long, default_value = "0")]
        seed: u64,
    },

    #[command(about = "Re-test every prime in an output file")]
    Verify {
        #[arg(help = "Path to the output file")]
        file: String,

        #[arg(short = 'p', long, default_value = "25")]
        precision: u32,

        #[arg(short, long, default_value = "0")]
        seed: u64,

        #[arg(short = 'd', long, help = "Require every prime to have exactly this many digits")]
        num_digits: Option<u32>,
    },

    #[command(about = "Generate a default configuration file")]
    InitConfig {
        #[arg(help = "Output file path (default: mr_primes_config.json)")]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            config,
            output,
            num_primes,
            num_digits,
            precision,
            num_offsets,
            seed,
            append,
            threads,
            report,
        } => {
            let mut search_config = match config {
                Some(path) => {
                    let loaded = SearchConfig::load_from_file(Path::new(&path))
                        .with_context(|| format!("failed to load config file '{}'", path))?;
                    println!("Loaded configuration from: {}", path);
                    loaded
                }
                None => SearchConfig::default(),
            };

            // Apply CLI overrides
            if let Some(v) = output {
                search_config.output = v;
            }
            if let Some(v) = num_primes {
                search_config.prime_count = v;
            }
            if let Some(v) = num_digits {
                search_config.digits = v;
            }
            if let Some(v) = precision {
                search_config.rounds = v;
            }
            if let Some(v) = num_offsets {
                search_config.low_primes = v;
            }
            if let Some(v) = seed {
                search_config.seed = Some(v);
            }
            if append {
                search_config.append = true;
            }
            if let Some(v) = threads {
                search_config.threads = v;
            }

            generate_primes(search_config, report.as_deref())
        }
        Commands::Test {
            number,
            precision,
            seed,
        } => test_number(&number, precision, seed),
        Commands::Verify {
            file,
            precision,
            seed,
            num_digits,
        } => verify_primes(&file, precision, seed, num_digits),
        Commands::InitConfig { output } => {
            init_config_file(output.as_deref().unwrap_or("mr_primes_config.json"))
        }
    }
}

fn generate_primes(mut config: SearchConfig, report_file: Option<&str>) -> Result<()> {
    config.validate()?;
    // Pin the seed so the printed value reproduces this run.
    config.seed = Some(config.resolved_seed());

    println!("Generating {} primes of {} digits", config.prime_count, config.digits);
    println!("  Miller-Rabin rounds: {}", config.rounds);
    println!("  Offset primes:       {}", config.low_primes);
    println!("  Seed:                {}", config.resolved_seed());
    println!(
        "  Output file:         {} ({})",
        config.output,
        if config.append { "append" } else { "truncate" }
    );
    println!();

    let results = run_search(&config, |index, _prime| {
        println!("Prime #{} found", index);
    })?;

    println!();
    println!("Initialization time: {:.6} seconds.", results.init_time.as_secs_f64());
    println!("Execution time: {:.6} seconds.", results.elapsed_time.as_secs_f64());
    println!(
        "Candidates examined: {} | Miller-Rabin tests: {} | Threads: {}",
        results.candidates_examined, results.miller_rabin_tests, results.threads
    );

    if let Some(path) = report_file {
        SearchReport::new(&config, &results)
            .save(path)
            .with_context(|| format!("failed to write report '{}'", path))?;
        println!("Report saved to {}", path);
    }

    Ok(())
}

fn check_rounds(rounds: u32) -> Result<()> {
    if rounds == 0 || rounds > mr_primes::config::MAX_ROUNDS {
        bail!("Miller-Rabin rounds must be a valid integer greater than 0 and less than 200");
    }
    Ok(())
}

fn test_number(number_str: &str, rounds: u32, seed: u64) -> Result<()> {
    check_rounds(rounds)?;
    let number: BigUint = mr_primes::verify::parse_line(number_str)?;

    let start_time = Instant::now();
    let random = RandomSource::new(seed);
    let probable = is_probable_prime(&number, rounds, &random);
    let elapsed = start_time.elapsed();

    let digits = number.to_string().len();
    println!("Testing number ({} digits) with {} rounds", digits, rounds);
    if probable {
        println!("  Status: PROBABLE PRIME (error probability <= 4^-{})", rounds);
    } else {
        println!("  Status: COMPOSITE");
    }
    println!("\nTime elapsed: {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

fn verify_primes(file: &str, rounds: u32, seed: u64, digits: Option<u32>) -> Result<()> {
    check_rounds(rounds)?;
    let config = VerifyConfig {
        rounds,
        seed,
        digits,
    };

    let start_time = Instant::now();
    let result = verify_file(Path::new(file), &config, |line, problem| match problem {
        None => {}
        Some(LineProblem::Composite) => println!("  Line {}: COMPOSITE", line),
        Some(LineProblem::Malformed(text)) => println!("  Line {}: not a number: '{}'", line, text),
        Some(LineProblem::WrongDigits { expected, actual }) => {
            println!("  Line {}: {} digits, expected {}", line, actual, expected)
        }
    })
    .with_context(|| format!("failed to verify '{}'", file))?;

    println!(
        "Checked {} lines in {:.3}s: {} failed",
        result.lines_checked,
        start_time.elapsed().as_secs_f64(),
        result.failures.len()
    );

    if !result.is_clean() {
        bail!("{} of {} lines failed verification", result.failures.len(), result.lines_checked);
    }
    Ok(())
}

fn init_config_file(output: &str) -> Result<()> {
    let config = SearchConfig::default();
    config
        .save_to_file(Path::new(output))
        .with_context(|| format!("failed to create config file '{}'", output))?;

    println!("Default configuration file created: {}", output);
    println!("\nConfiguration:");
    println!("  Output file:      {}", config.output);
    println!("  Primes:           {}", config.prime_count);
    println!("  Digits:           {}", config.digits);
    println!("  Rounds:           {}", config.rounds);
    println!("  Offset primes:    {}", config.low_primes);
    println!("  Threads:          {} (0 = auto)", config.threads);
    println!("\nYou can now edit this file and use:");
    println!("  mr-primes generate --config {}", output);
    Ok(())
}
