//! Configuration for quorum runs.
//!
//! YAML files with sensible defaults, mirroring the historical parameter set
//! of the model (100x100 lattice, death 0.1, movement 0.5).

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub grid: GridConfig,
    pub rates: RatesConfig,
    pub reproduction: ReproductionConfig,
    pub init: InitConfig,
    pub schedule: ScheduleConfig,
    pub logging: LoggingConfig,
}

/// Lattice dimensions (interior extent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
}

/// Per-microbe event rates and the time-step multiplier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatesConfig {
    /// Random movement probability per trial.
    pub move_rate: f64,
    /// Fixed mortality per trial.
    pub death_rate: f64,
    /// Probability that a birth inherits mutated traits.
    pub mutation_rate: f64,
    /// Time-step multiplier applied to death/move/birth thresholds.
    pub dt: f64,
}

/// How an empty site finds a reproduction candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReproductionRange {
    /// A random first-order neighbor (spatially structured population).
    Neighborhood,
    /// A uniform random interior site (well-mixed population).
    Global,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReproductionConfig {
    pub range: ReproductionRange,
}

/// Which systems are seeded at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedMix {
    /// Division-of-labor pair only.
    Dol,
    /// Pure-strategy pair only.
    Pure,
    /// Both systems, split evenly among seeded cells.
    Both,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitConfig {
    /// Probability that an interior site starts occupied.
    pub density: f64,
    pub mix: SeedMix,
}

/// Tick intervals for the periodic events of the main loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Ticks between statistics rows.
    pub stats_interval: u64,
    /// Ticks between lineage census rows.
    pub census_interval: u64,
    /// Ticks between text grid snapshots.
    pub snapshot_interval: u64,
    /// Ticks between mass-culling events (0 disables culling).
    pub cull_interval: u64,
    /// Fraction of the living population killed by a cull.
    pub cull_fraction: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            rates: RatesConfig::default(),
            reproduction: ReproductionConfig::default(),
            init: InitConfig::default(),
            schedule: ScheduleConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { rows: 100, cols: 100 }
    }
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            move_rate: 0.5,
            death_rate: 0.1,
            mutation_rate: 0.01,
            dt: 1.0,
        }
    }
}

impl Default for ReproductionConfig {
    fn default() -> Self {
        Self {
            range: ReproductionRange::Neighborhood,
        }
    }
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            density: 0.5,
            mix: SeedMix::Dol,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            stats_interval: 10_000,
            census_interval: 10_000,
            snapshot_interval: 10_000,
            cull_interval: 5_000_000,
            cull_fraction: 0.9,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.grid.rows == 0 || self.grid.cols == 0 {
            return Err("grid dimensions must be nonzero".to_string());
        }
        if self.grid.rows < 5 || self.grid.cols < 5 {
            return Err("grid must be at least 5x5 for the sensing patch".to_string());
        }
        for (name, value) in [
            ("move_rate", self.rates.move_rate),
            ("death_rate", self.rates.death_rate),
            ("mutation_rate", self.rates.mutation_rate),
            ("density", self.init.density),
            ("cull_fraction", self.schedule.cull_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be within [0, 1], got {value}"));
            }
        }
        if self.rates.dt <= 0.0 {
            return Err("dt must be positive".to_string());
        }
        if self.schedule.stats_interval == 0 || self.schedule.census_interval == 0 {
            return Err("stats and census intervals must be nonzero".to_string());
        }
        if self.schedule.snapshot_interval == 0 {
            return Err("snapshot interval must be nonzero".to_string());
        }
        Ok(())
    }
}
