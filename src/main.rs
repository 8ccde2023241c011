//! quorum - CLI entry point.
//!
//! Drives a public-goods lattice simulation and owns the output
//! collaborators (CSV loggers, snapshots, checkpoints) for the lifetime of
//! one run.

use clap::{Parser, Subcommand};
use quorum::checkpoint::Checkpoint;
use quorum::sim::Simulation;
use quorum::snapshot;
use quorum::stats::{CensusLogger, CensusCounts, Stats, StatsHistory, StatsLogger};
use quorum::{Config, Lattice, Microbe};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "quorum")]
#[command(version)]
#[command(about = "Stochastic lattice simulation of microbial public-goods cooperation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a new simulation
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of ticks to simulate
        #[arg(short, long, default_value = "1000000")]
        steps: u64,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Override the movement rate
        #[arg(long)]
        move_rate: Option<f64>,

        /// Override the mutation rate
        #[arg(long)]
        mutation_rate: Option<f64>,

        /// Override the death rate
        #[arg(long)]
        death_rate: Option<f64>,

        /// Start from a text grid snapshot instead of random seeding
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Resume simulation from a binary checkpoint
    Resume {
        /// Checkpoint file to resume from
        #[arg(short, long)]
        checkpoint: PathBuf,

        /// Number of additional ticks
        #[arg(short, long, default_value = "1000000")]
        steps: u64,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of ticks
        #[arg(short, long, default_value = "1000")]
        steps: u64,

        /// Interior grid edge length
        #[arg(short, long, default_value = "100")]
        grid: usize,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },

    /// Summarize a text grid snapshot
    Inspect {
        /// Snapshot file
        snapshot: PathBuf,

        /// Interior rows of the grid the snapshot was taken from
        #[arg(long, default_value = "100")]
        rows: usize,

        /// Interior columns of the grid the snapshot was taken from
        #[arg(long, default_value = "100")]
        cols: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            steps,
            output,
            seed,
            move_rate,
            mutation_rate,
            death_rate,
            input,
            quiet,
        } => run_simulation(
            config,
            steps,
            output,
            seed,
            move_rate,
            mutation_rate,
            death_rate,
            input,
            quiet,
        ),

        Commands::Resume {
            checkpoint,
            steps,
            output,
            quiet,
        } => resume_simulation(checkpoint, steps, output, quiet),

        Commands::Benchmark { steps, grid } => run_benchmark(steps, grid),

        Commands::Init { output } => generate_config(output),

        Commands::Inspect { snapshot, rows, cols } => inspect_snapshot(snapshot, rows, cols),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_simulation(
    config_path: PathBuf,
    steps: u64,
    output: PathBuf,
    seed: Option<u64>,
    move_rate: Option<f64>,
    mutation_rate: Option<f64>,
    death_rate: Option<f64>,
    input: Option<PathBuf>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = if config_path.exists() {
        println!("Loading config from: {:?}", config_path);
        Config::from_file(&config_path)?
    } else {
        println!("Using default configuration");
        Config::default()
    };

    if let Some(rate) = move_rate {
        config.rates.move_rate = rate;
    }
    if let Some(rate) = mutation_rate {
        config.rates.mutation_rate = rate;
    }
    if let Some(rate) = death_rate {
        config.rates.death_rate = rate;
    }
    config.validate()?;

    let seed = seed.unwrap_or_else(|| rand::random());
    println!("Using seed: {}", seed);

    let sim = match input {
        Some(path) => {
            println!("Loading grid snapshot: {:?}", path);
            Simulation::from_snapshot(config.clone(), seed, path)?
        }
        None => Simulation::new_with_seed(config.clone(), seed),
    };

    println!("Starting simulation");
    println!("  Grid: {}x{}", config.grid.rows, config.grid.cols);
    println!("  Initial population: {}", sim.population());
    println!("  Ticks: {}", steps);
    println!();

    drive(sim, steps, &output, quiet)
}

fn resume_simulation(
    checkpoint_path: PathBuf,
    steps: u64,
    output: PathBuf,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading checkpoint: {:?}", checkpoint_path);

    let checkpoint = Checkpoint::load(&checkpoint_path)?;
    let sim = Simulation::from_checkpoint(checkpoint);

    println!("Resumed at tick {}", sim.tick());
    println!("Population: {}", sim.population());
    println!("Running {} additional ticks", steps);
    println!();

    drive(sim, steps, &output, quiet)
}

/// Shared run loop: steps the simulation and owns every output collaborator.
fn drive(
    mut sim: Simulation,
    steps: u64,
    output: &Path,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(output)?;

    let mut stats_log = StatsLogger::create(output.join("cell_states.csv"))?;
    let mut census_log = CensusLogger::create(output.join("ancestor_states.csv"))?;
    let mut history = StatsHistory::new();
    let snapshot_path = output.join("grid_state.txt");
    let snapshot_interval = sim.config().schedule.snapshot_interval;

    let start = Instant::now();
    let mut extinct = None;

    for _ in 0..steps {
        let report = sim.step();

        if let Some(counts) = report.census {
            if let Err(e) = census_log.append(&counts) {
                log::error!("census row failed: {}", e);
            }
        }
        if let Some(stats) = report.stats {
            if let Err(e) = stats_log.append(&stats) {
                log::error!("stats row failed: {}", e);
            }
            history.record(stats);
            if !quiet {
                println!("{}", stats.summary());
            }
        }
        if report.extinct.is_none() && report.tick % snapshot_interval == 0 {
            if let Err(e) = snapshot::save_grid(sim.lattice(), &snapshot_path) {
                log::error!("grid snapshot failed: {}", e);
            }
        }

        if let Some(system) = report.extinct {
            println!("\n{system:?} system extinct at tick {}", report.tick);
            extinct = Some(system);
            break;
        }
    }

    // Final flush: statistics, grid snapshot, resumable checkpoint.
    let final_stats = Stats::collect(sim.lattice(), sim.tick());
    stats_log.append(&final_stats)?;
    history.record(final_stats);
    snapshot::save_grid(sim.lattice(), &snapshot_path)?;

    let checkpoint_path = output.join("checkpoint_final.bin");
    sim.create_checkpoint().save(&checkpoint_path)?;

    let history_path = output.join("stats_history.json");
    history.save(&history_path)?;

    let elapsed = start.elapsed();
    println!();
    println!("=== Simulation Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Final tick: {}", sim.tick());
    println!(
        "Speed: {:.1} ticks/s",
        sim.tick() as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    println!("Population: {}", sim.population());
    if let Some(system) = extinct {
        println!("Outcome: {system:?} extinction");
    }
    println!("Grid snapshot: {:?}", snapshot_path);
    println!("Checkpoint: {:?}", checkpoint_path);
    println!("Stats history: {:?}", history_path);

    Ok(())
}

fn run_benchmark(steps: u64, grid: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== quorum Benchmark ===");
    println!("Ticks: {}", steps);
    println!("Grid: {0}x{0}", grid);
    println!();

    let result = quorum::benchmark(steps, grid);
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}

fn inspect_snapshot(
    path: PathBuf,
    rows: usize,
    cols: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Snapshot Analysis ===");
    println!("File: {:?}", path);
    println!();

    let mut lattice: Lattice<Microbe> = Lattice::new(rows, cols);
    snapshot::load_grid(&mut lattice, &path)?;

    let stats = Stats::collect(&lattice, 0);
    println!("DolA: {:6}  mean k {:.4}  mean d {:.4}", stats.dol_a.count, stats.dol_a.mean_k, stats.dol_a.mean_d);
    println!("DolB: {:6}  mean k {:.4}  mean d {:.4}", stats.dol_b.count, stats.dol_b.mean_k, stats.dol_b.mean_d);
    println!("PureA:{:6}  mean k {:.4}", stats.pure_a.count, stats.pure_a.mean_k);
    println!("PureB:{:6}  mean k {:.4}", stats.pure_b.count, stats.pure_b.mean_k);
    println!("Total living: {}", stats.total());

    let census = CensusCounts::collect(&lattice, 0);
    println!(
        "Ancestry: {} from A founders, {} from B founders",
        census.ancestor_a, census.ancestor_b
    );

    Ok(())
}
