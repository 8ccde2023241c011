//! Simulation driver: per-tick schedule and randomized per-site update
//! trials.
//!
//! Single-threaded by design: every trial consumes pseudorandom draws in a
//! fixed order (trial row, trial col, decision probability, then any
//! conditional draws), so a run is exactly reproducible for a fixed seed.

use crate::checkpoint::Checkpoint;
use crate::config::{Config, ReproductionRange, SeedMix};
use crate::lattice::{Dir, Lattice};
use crate::microbe::{average_public_good, CellState, Microbe, MicrobeId, System};
use crate::snapshot::{self, SnapshotError};
use crate::stats::{CensusCounts, Stats};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::path::Path;

/// What one tick produced, for the driver's loggers.
#[derive(Clone, Copy, Debug, Default)]
pub struct TickReport {
    pub tick: u64,
    /// Census counts, at the census interval.
    pub census: Option<CensusCounts>,
    /// Cells killed by a mass-culling event this tick.
    pub culled: Option<usize>,
    /// Aggregate statistics, at the stats interval.
    pub stats: Option<Stats>,
    /// Set when a tracked system died out; the tick's trials do not run.
    pub extinct: Option<System>,
}

/// The simulation world: lattice, parameters, and one seeded generator.
pub struct Simulation {
    lattice: Lattice<Microbe>,
    config: Config,
    tick: u64,
    next_id: MicrobeId,
    last_cull: u64,
    tracked_dol: bool,
    tracked_pure: bool,
    rng: ChaCha8Rng,
    seed: u64,
}

impl Simulation {
    /// Create a simulation with a random seed.
    pub fn new(config: Config) -> Self {
        let seed = rand::thread_rng().gen();
        Self::new_with_seed(config, seed)
    }

    /// Create a simulation with a specific seed for reproducibility.
    pub fn new_with_seed(config: Config, seed: u64) -> Self {
        let mut sim = Self::empty(config, seed);
        sim.seed_population();
        sim.track_systems();
        sim
    }

    /// Create a simulation whose lattice is loaded from a text snapshot
    /// instead of randomly seeded.
    pub fn from_snapshot<P: AsRef<Path>>(
        config: Config,
        seed: u64,
        path: P,
    ) -> Result<Self, SnapshotError> {
        let mut sim = Self::empty(config, seed);
        snapshot::load_grid(&mut sim.lattice, path)?;
        sim.apply_rates();
        sim.track_systems();
        Ok(sim)
    }

    /// Restore a simulation from a binary checkpoint.
    ///
    /// The generator is reseeded from the stored seed; the stream position
    /// of the interrupted run is not preserved.
    pub fn from_checkpoint(checkpoint: Checkpoint) -> Self {
        let mut sim = Self {
            lattice: checkpoint.lattice,
            config: checkpoint.config,
            tick: checkpoint.tick,
            next_id: checkpoint.next_id,
            last_cull: checkpoint.last_cull,
            tracked_dol: false,
            tracked_pure: false,
            rng: ChaCha8Rng::seed_from_u64(checkpoint.random_seed),
            seed: checkpoint.random_seed,
        };
        sim.track_systems();
        sim
    }

    /// Capture the complete resumable state.
    pub fn create_checkpoint(&self) -> Checkpoint {
        Checkpoint::new(
            self.tick,
            self.config.clone(),
            self.lattice.clone(),
            self.next_id,
            self.last_cull,
            self.seed,
        )
    }

    fn empty(config: Config, seed: u64) -> Self {
        let lattice = Lattice::new(config.grid.rows, config.grid.cols);
        Self {
            lattice,
            config,
            tick: 0,
            next_id: 0,
            last_cull: 0,
            tracked_dol: false,
            tracked_pure: false,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed the interior at the configured density and mix, and stamp the
    /// configured rates on every site.
    fn seed_population(&mut self) {
        let rows = self.lattice.rows();
        let cols = self.lattice.cols();
        let density = self.config.init.density;
        let mix = self.config.init.mix;

        for row in 1..=rows {
            for col in 1..=cols {
                if self.rng.gen::<f64>() < density {
                    let system = match mix {
                        SeedMix::Dol => System::Dol,
                        SeedMix::Pure => System::Pure,
                        SeedMix::Both => {
                            if self.rng.gen::<f64>() < 0.5 {
                                System::Dol
                            } else {
                                System::Pure
                            }
                        }
                    };
                    let a_type = self.rng.gen::<f64>() < 0.5;
                    let state = match (system, a_type) {
                        (System::Dol, true) => CellState::DolA,
                        (System::Dol, false) => CellState::DolB,
                        (System::Pure, true) => CellState::PureA,
                        (System::Pure, false) => CellState::PureB,
                    };
                    let id = self.next_id;
                    self.next_id += 1;

                    let cell = self.lattice.cell_mut(row, col);
                    cell.state = state;
                    cell.ancestor = state;
                    cell.id = id;
                }
            }
        }

        self.apply_rates();
    }

    /// Stamp the configured death and movement rates on every interior site.
    fn apply_rates(&mut self) {
        let rows = self.lattice.rows();
        let cols = self.lattice.cols();
        for row in 1..=rows {
            for col in 1..=cols {
                let cell = self.lattice.cell_mut(row, col);
                cell.death_rate = self.config.rates.death_rate;
                cell.move_rate = self.config.rates.move_rate;
            }
        }
    }

    /// Record which systems are present; only those are tracked for
    /// extinction.
    fn track_systems(&mut self) {
        self.tracked_dol = false;
        self.tracked_pure = false;
        for (_, _, cell) in self.lattice.interior() {
            match cell.state.system() {
                Some(System::Dol) => self.tracked_dol = true,
                Some(System::Pure) => self.tracked_pure = true,
                None => {}
            }
        }
    }

    /// Advance one tick: census, culling, statistics and the extinction
    /// check, then `rows * cols` randomized site trials.
    pub fn step(&mut self) -> TickReport {
        let mut report = TickReport {
            tick: self.tick,
            ..TickReport::default()
        };

        if self.tick % self.config.schedule.census_interval == 0 {
            let counts = CensusCounts::collect(&self.lattice, self.tick);
            if counts.lineage_extinct() {
                // One lineage is gone; re-tag so the census keeps measuring
                // descent within the survivors instead of locking up.
                self.reset_lineage_tags();
            }
            report.census = Some(counts);
        }

        let cull_interval = self.config.schedule.cull_interval;
        if cull_interval > 0 && self.tick >= self.last_cull + cull_interval {
            report.culled = Some(self.cull());
        }

        let stats = Stats::collect(&self.lattice, self.tick);
        if self.tick % self.config.schedule.stats_interval == 0 {
            report.stats = Some(stats);
        }

        if self.tracked_dol && stats.dol_total() == 0 {
            report.extinct = Some(System::Dol);
            return report;
        }
        if self.tracked_pure && stats.pure_total() == 0 {
            report.extinct = Some(System::Pure);
            return report;
        }

        let trials = self.lattice.rows() * self.lattice.cols();
        for _ in 0..trials {
            self.trial();
        }

        self.tick += 1;
        report
    }

    /// Run up to `ticks` ticks, stopping early on extinction.
    pub fn run(&mut self, ticks: u64) -> Option<System> {
        for _ in 0..ticks {
            let report = self.step();
            if report.extinct.is_some() {
                return report.extinct;
            }
        }
        None
    }

    /// One randomized site trial: death, movement, or birth.
    fn trial(&mut self) {
        let rows = self.lattice.rows();
        let cols = self.lattice.cols();
        let row = self.rng.gen_range(1..=rows);
        let col = self.rng.gen_range(1..=cols);
        let p: f64 = self.rng.gen();
        let dt = self.config.rates.dt;

        if self.lattice.cell(row, col).state.is_alive() {
            let death_rate = self.lattice.cell(row, col).death_rate;
            let move_rate = self.lattice.cell(row, col).move_rate;

            if death_rate * dt > p {
                // Traits and lineage stay in place; they are dead weight
                // until the next birth overwrites them.
                self.lattice.cell_mut(row, col).state = CellState::Empty;
            } else if (move_rate + death_rate) * dt > p {
                let dir = Dir::MOVES[self.rng.gen_range(0..Dir::MOVES.len())];
                let (nei_row, nei_col) = self.lattice.xy_neighbor_wrapped(row, col, dir);
                self.lattice.swap_cells(row, col, nei_row, nei_col);
            }
        } else {
            let (parent_row, parent_col) = match self.config.reproduction.range {
                ReproductionRange::Neighborhood => {
                    let dir = Dir::MOVES[self.rng.gen_range(0..Dir::MOVES.len())];
                    self.lattice.xy_neighbor_wrapped(row, col, dir)
                }
                ReproductionRange::Global => (
                    self.rng.gen_range(1..=rows),
                    self.rng.gen_range(1..=cols),
                ),
            };

            let parent = self.lattice.cell(parent_row, parent_col).clone();
            if !parent.state.is_alive() {
                return;
            }

            let avg_k = average_public_good(&self.lattice, parent_row, parent_col);
            let own_k = parent.active_k();
            let own_d = parent.active_d();

            // Strict priority: the differentiated-offspring threshold is
            // carved out of the broader one against the same p.
            let offspring_state = match parent.state.system() {
                Some(System::Dol) => {
                    if avg_k * (1.0 - own_k) * own_d * dt > p {
                        Some(parent.state.differentiated())
                    } else if avg_k * (1.0 - own_k) * dt > p {
                        Some(parent.state)
                    } else {
                        None
                    }
                }
                Some(System::Pure) => {
                    if avg_k * (1.0 - own_k) * dt > p {
                        Some(parent.state)
                    } else {
                        None
                    }
                }
                None => None,
            };

            if let Some(state) = offspring_state {
                let mutate = self.config.rates.mutation_rate > self.rng.gen::<f64>();
                let id = self.next_id;
                self.next_id += 1;

                let child = self.lattice.cell_mut(row, col);
                child.state = state;
                child.ancestor = parent.ancestor;
                child.id = id;
                child.parent_id = parent.id;
                if mutate {
                    child.inherit_mutated(&mut self.rng, parent.da, parent.ka, parent.db, parent.kb);
                } else {
                    child.inherit_exact(parent.da, parent.ka, parent.db, parent.kb);
                }
                if parent.state.system() == Some(System::Pure) {
                    child.zero_differentiation();
                }
            }
        }
    }

    /// Kill a fixed fraction of the living population by rejection sampling
    /// until the quota is met.
    fn cull(&mut self) -> usize {
        let rows = self.lattice.rows();
        let cols = self.lattice.cols();
        let living = self.population();
        let quota = (living as f64 * self.config.schedule.cull_fraction) as usize;

        let mut killed = 0;
        while killed < quota {
            let row = self.rng.gen_range(1..=rows);
            let col = self.rng.gen_range(1..=cols);
            let cell = self.lattice.cell_mut(row, col);
            if cell.state.is_alive() {
                cell.state = CellState::Empty;
                killed += 1;
            }
        }

        self.last_cull = self.tick;
        log::info!(
            "culled {} of {} living cells at tick {}",
            killed,
            living,
            self.tick
        );
        killed
    }

    /// Reassign every living cell's ancestor tag to its current state.
    fn reset_lineage_tags(&mut self) {
        let rows = self.lattice.rows();
        let cols = self.lattice.cols();
        for row in 1..=rows {
            for col in 1..=cols {
                let cell = self.lattice.cell_mut(row, col);
                if cell.state.is_alive() {
                    cell.ancestor = cell.state;
                }
            }
        }
    }

    pub fn lattice(&self) -> &Lattice<Microbe> {
        &self.lattice
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Current number of living cells.
    pub fn population(&self) -> usize {
        self.lattice
            .interior()
            .filter(|(_, _, cell)| cell.state.is_alive())
            .count()
    }
}
