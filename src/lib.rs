//! # quorum
//!
//! Stochastic lattice simulation of microbial public-goods cooperation.
//!
//! Microbes live on a 2D toroidal lattice, produce a locally shared public
//! good, and reproduce into empty sites at a rate gated by the public-good
//! concentration their neighbors sense. Offspring inherit the parent's
//! strategy traits, occasionally perturbed by bounded multiplicative
//! mutation, so production and differentiation strategies evolve.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use quorum::{Config, Simulation};
//!
//! let config = Config::default();
//! let mut sim = Simulation::new_with_seed(config, 42);
//!
//! let extinct = sim.run(100_000);
//! println!("population: {}", sim.population());
//! if let Some(system) = extinct {
//!     println!("{system:?} went extinct at tick {}", sim.tick());
//! }
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use quorum::Config;
//!
//! let mut config = Config::default();
//! config.grid.rows = 200;
//! config.rates.mutation_rate = 0.05;
//! ```

pub mod checkpoint;
pub mod config;
pub mod lattice;
pub mod microbe;
pub mod shade;
pub mod sim;
pub mod snapshot;
pub mod stats;

// Re-export main types
pub use config::Config;
pub use lattice::{Dir, Dir2, Lattice};
pub use microbe::{CellState, Microbe, System};
pub use sim::Simulation;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run a quick benchmark
pub fn benchmark(ticks: u64, grid_size: usize) -> BenchmarkResult {
    use std::time::Instant;

    let mut config = Config::default();
    config.grid.rows = grid_size;
    config.grid.cols = grid_size;
    config.schedule.cull_interval = 0;

    let mut sim = Simulation::new(config);
    let initial_population = sim.population();

    let start = Instant::now();
    let extinct = sim.run(ticks);
    let elapsed = start.elapsed();

    BenchmarkResult {
        ticks: sim.tick(),
        grid_size,
        initial_population,
        final_population: sim.population(),
        elapsed_secs: elapsed.as_secs_f64(),
        ticks_per_second: sim.tick() as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
        extinct,
    }
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub ticks: u64,
    pub grid_size: usize,
    pub initial_population: usize,
    pub final_population: usize,
    pub elapsed_secs: f64,
    pub ticks_per_second: f64,
    pub extinct: Option<System>,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Ticks: {}", self.ticks)?;
        writeln!(f, "Grid: {0}x{0}", self.grid_size)?;
        writeln!(f, "Population: {} -> {}", self.initial_population, self.final_population)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} ticks/s", self.ticks_per_second)?;
        if let Some(system) = self.extinct {
            writeln!(f, "Outcome: {system:?} extinction")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_quick_simulation() {
        let mut config = Config::default();
        config.grid.rows = 20;
        config.grid.cols = 20;
        let mut sim = Simulation::new_with_seed(config, 17);

        sim.run(50);

        assert!(sim.tick() <= 50);
        assert!(sim.population() > 0 || sim.tick() < 50);
    }

    #[test]
    fn test_benchmark() {
        let result = benchmark(10, 20);

        assert!(result.ticks <= 10);
        assert!(result.ticks_per_second > 0.0);
    }
}
