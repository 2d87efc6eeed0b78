use clap::{Parser, Subcommand};
use num_bigint::BigUint;
use std::path::{Path, PathBuf};

use spectral_search::error::SearchError;
use spectral_search::numeric::{MillerRabin, PrimalityOracle, ReductionError};
use spectral_search::report::select::{select, SelectionConfig, DEFAULT_QUANTILE, DEFAULT_TOP};
use spectral_search::report::{
    format_multiplier, format_score, read_candidates, CandidateWriter,
};
use spectral_search::search::candidate::{DEFAULT_THRESHOLD, MODULUS_SHIFT, TOP_BITS};
use spectral_search::search::config::{DEFAULT_PROGRESS_INTERVAL, DEFAULT_TOTAL_ITERATIONS};
use spectral_search::search::parallel::coordinator::process_seed;
use spectral_search::search::parallel::{
    partition, run_parallel_search, FailurePolicy, ParallelConfig,
};
use spectral_search::search::{SearchConfig, SearchStatistics};
use spectral_search::spectral::{harmonic_score, SpectralConfig, SpectralTest, MAX_DIMENSION};

// --- Command Line Arguments ---

#[derive(Parser)]
#[command(name = "spectral-search")]
#[command(about = "spectral-search - LCG multiplier search")]
#[command(version)]
#[command(subcommand_required = true)]
#[command(arg_required_else_help = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search random multipliers and write the survivors to a CSV table
    Search {
        /// Output table
        #[arg(long, short, default_value = "candidates.csv")]
        output: PathBuf,
        /// Total number of draws over all workers
        #[arg(long, default_value_t = DEFAULT_TOTAL_ITERATIONS)]
        iterations: u64,
        /// Number of workers (default: number of CPUs)
        #[arg(long, short = 'j')]
        workers: Option<usize>,
        /// Process seed for reproducibility (default: drawn from the OS)
        #[arg(long)]
        seed: Option<u64>,
        /// Minimum figure of merit in every dimension
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,
        /// Highest spectral test dimension
        #[arg(long, default_value_t = MAX_DIMENSION)]
        max_dim: usize,
        /// Iterations between progress lines of each worker
        #[arg(long, default_value_t = DEFAULT_PROGRESS_INTERVAL)]
        progress_interval: u64,
        /// Miller-Rabin rounds
        #[arg(long, default_value_t = 10)]
        rounds: usize,
        /// Write the surviving workers' candidates when a worker fails
        #[arg(long)]
        keep_partial: bool,
        /// Disable progress lines
        #[arg(long)]
        no_progress: bool,
        /// Enable verbose output
        #[arg(long, short)]
        verbose: bool,
    },
    /// Print the spectral test of one multiplier
    Score {
        /// Multiplier in hexadecimal (e.g., 0xd1342543de82ef95)
        multiplier: String,
        /// Highest spectral test dimension
        #[arg(long, default_value_t = MAX_DIMENSION)]
        max_dim: usize,
        /// Minimum figure of merit in every dimension
        #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
        threshold: f64,
        /// Miller-Rabin rounds
        #[arg(long, default_value_t = 10)]
        rounds: usize,
    },
    /// Shortlist the best-scoring candidates of a search
    Choose {
        /// Candidates table written by `search`
        #[arg(long, short, default_value = "candidates.csv")]
        input: PathBuf,
        /// Keep scores at or above this quantile
        #[arg(long, default_value_t = DEFAULT_QUANTILE)]
        quantile: f64,
        /// Number of rows listed, by descending period
        #[arg(long, default_value_t = DEFAULT_TOP)]
        top: usize,
    },
}

/// Options for a search run
struct SearchOptions {
    output: PathBuf,
    iterations: u64,
    workers: Option<usize>,
    seed: Option<u64>,
    threshold: f64,
    max_dim: usize,
    progress_interval: u64,
    rounds: usize,
    keep_partial: bool,
    no_progress: bool,
    verbose: bool,
}

// --- Search ---

/// Returns `Ok(false)` when some workers failed and only partial results
/// were written.
fn run_search(options: &SearchOptions) -> Result<bool, SearchError> {
    let spectral = SpectralTest::new(SpectralConfig::default().with_max_dim(options.max_dim))?;
    let search_config = SearchConfig::default()
        .with_iterations(options.iterations)
        .with_threshold(options.threshold)
        .with_progress_interval(options.progress_interval)
        .with_verbose(options.verbose);
    search_config.validate()?;

    // Fail before any work if the table cannot be written.
    let mut writer = CandidateWriter::create(&options.output)?;

    let seed = options.seed.unwrap_or_else(process_seed);
    let policy = if options.keep_partial {
        FailurePolicy::KeepPartial
    } else {
        FailurePolicy::Abort
    };
    let mut parallel_config = ParallelConfig::default()
        .with_seed(seed)
        .with_failure_policy(policy)
        .with_progress(!options.no_progress);
    if let Some(workers) = options.workers {
        parallel_config = parallel_config.with_workers(workers);
    }

    println!("Seed: {}", seed);
    println!("Workers: {}", parallel_config.num_workers);
    println!("Iterations: {}", options.iterations);
    if options.verbose {
        println!("Output: {}", writer.path().display());
        println!("Threshold: {}", options.threshold);
        println!("Dimensions: 2..={}", options.max_dim);
        println!("Miller-Rabin rounds: {}", options.rounds);
        println!(
            "Spawned threads: {} (last worker runs on the main thread)",
            parallel_config.num_spawned_workers()
        );
        let budgets = partition(options.iterations, parallel_config.num_workers);
        for (worker_id, budget) in budgets.iter().enumerate() {
            println!("  Worker #{}: {} iterations", worker_id, budget);
        }
    }

    let result = run_parallel_search(
        spectral,
        MillerRabin::new(options.rounds),
        &search_config,
        &parallel_config,
    )?;

    writer.write_candidates(&result.candidates)?;
    writer.finish()?;

    print_search_statistics(&result.total_statistics);
    if options.verbose {
        println!("\nPer-worker statistics:");
        for (worker_id, stats) in &result.worker_statistics {
            println!(
                "  Worker #{}: {} iterations, {} spectral tests, {} found in {:.2?}",
                worker_id,
                stats.iterations,
                stats.spectral_tests(),
                stats.accepted,
                stats.elapsed_time
            );
        }
    }
    println!(
        "Wrote {} candidates to {}",
        result.candidates.len(),
        options.output.display()
    );

    for failure in &result.failures {
        eprintln!("Worker failed: {}", failure);
    }
    Ok(result.failures.is_empty())
}

/// Print search statistics
fn print_search_statistics(stats: &SearchStatistics) {
    println!("\nSearch Statistics:");
    for line in stats.format_summary().lines() {
        println!("  {}", line);
    }
}

// --- Score ---

fn parse_multiplier(s: &str) -> Result<u64, SearchError> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u64::from_str_radix(digits, 16)
        .map_err(|e| SearchError::InvalidConfig(format!("invalid multiplier '{}': {}", s, e)))
}

fn score_multiplier(
    multiplier: &str,
    max_dim: usize,
    threshold: f64,
    rounds: usize,
) -> Result<(), SearchError> {
    let multiplier = parse_multiplier(multiplier)?;
    let spectral = SpectralTest::new(SpectralConfig::default().with_max_dim(max_dim))?;
    let primality = MillerRabin::new(rounds);

    let a = BigUint::from(multiplier);
    let m = (&a << MODULUS_SHIFT) - 1u32;
    let p = &m >> 1u32;
    let verdict = |prime: bool| if prime { "prime" } else { "composite" };

    println!("Multiplier: {}", format_multiplier(multiplier));
    if multiplier & TOP_BITS != TOP_BITS {
        println!("  (outside the searched range: top two bits not set)");
    }
    println!(
        "(a << {}) - 1: {}",
        MODULUS_SHIFT,
        verdict(primality.is_probably_prime(&m))
    );
    println!(
        "((a << {}) - 1) >> 1: {}",
        MODULUS_SHIFT,
        verdict(primality.is_probably_prime(&p))
    );

    let invalid = |source: ReductionError| SearchError::Numeric {
        worker_id: 0,
        multiplier,
        source,
    };
    let merits = spectral.figures_of_merit(&a).map_err(invalid)?;
    println!("\n{:>4} {:>24} {:>16}", "dim", "min norm^2", "figure of merit");
    for merit in &merits {
        println!(
            "{:>4} {:>24} {:>16.6}",
            merit.dimension, merit.min_norm_sq, merit.figure_of_merit
        );
    }

    let min_fom = merits
        .iter()
        .map(|m| m.figure_of_merit)
        .fold(f64::INFINITY, f64::min);
    println!("\nMinimum figure of merit: {}", format_score(min_fom));
    println!("Harmonic score: {}", format_score(harmonic_score(&merits)));
    let score = spectral.test(&a, threshold).map_err(invalid)?;
    println!(
        "Spectral score (threshold {}): {}",
        threshold,
        format_score(score)
    );
    Ok(())
}

// --- Choose ---

fn choose_candidates(input: &Path, quantile: f64, top: usize) -> Result<(), SearchError> {
    let config = SelectionConfig::default()
        .with_quantile(quantile)
        .with_top(top);
    config.validate()?;
    let candidates = read_candidates(input)?;
    let selection = select(&candidates, &config)?;
    print!("{}", selection.format_report(config.top));
    Ok(())
}

fn main() {
    let args = Args::parse();

    match args.command {
        Commands::Search {
            output,
            iterations,
            workers,
            seed,
            threshold,
            max_dim,
            progress_interval,
            rounds,
            keep_partial,
            no_progress,
            verbose,
        } => {
            let options = SearchOptions {
                output,
                iterations,
                workers,
                seed,
                threshold,
                max_dim,
                progress_interval,
                rounds,
                keep_partial,
                no_progress,
                verbose,
            };
            match run_search(&options) {
                Ok(true) => {}
                Ok(false) => {
                    eprintln!("Search finished with failed workers; results are partial");
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Commands::Score {
            multiplier,
            max_dim,
            threshold,
            rounds,
        } => {
            if let Err(e) = score_multiplier(&multiplier, max_dim, threshold, rounds) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        Commands::Choose {
            input,
            quantile,
            top,
        } => {
            if let Err(e) = choose_candidates(&input, quantile, top) {
                eprintln!("Error reading candidates: {}", e);
                std::process::exit(1);
            }
        }
    }
}
