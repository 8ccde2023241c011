//! Statistics tracking for the simulation.

use crate::lattice::Lattice;
use crate::microbe::{CellState, Microbe};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Mean active traits and live count for one cell type.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct TypeAggregate {
    pub count: usize,
    /// Mean public-good production over the type's active trait.
    pub mean_k: f64,
    /// Mean differentiation probability over the type's active trait.
    pub mean_d: f64,
}

impl TypeAggregate {
    fn add(&mut self, k: f64, d: f64) {
        self.count += 1;
        self.mean_k += k;
        self.mean_d += d;
    }

    fn finish(&mut self) {
        if self.count > 0 {
            self.mean_k /= self.count as f64;
            self.mean_d /= self.count as f64;
        }
    }
}

/// Aggregate statistics for one tick.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Stats {
    pub tick: u64,
    pub dol_a: TypeAggregate,
    pub dol_b: TypeAggregate,
    pub pure_a: TypeAggregate,
    pub pure_b: TypeAggregate,
}

impl Stats {
    /// Scan the interior and aggregate per-type trait means and counts.
    pub fn collect(lattice: &Lattice<Microbe>, tick: u64) -> Self {
        let mut stats = Stats {
            tick,
            ..Stats::default()
        };

        for (_, _, cell) in lattice.interior() {
            match cell.state {
                CellState::Empty => {}
                CellState::DolA => stats.dol_a.add(cell.ka, cell.da),
                CellState::DolB => stats.dol_b.add(cell.kb, cell.db),
                CellState::PureA => stats.pure_a.add(cell.ka, cell.da),
                CellState::PureB => stats.pure_b.add(cell.kb, cell.db),
            }
        }

        stats.dol_a.finish();
        stats.dol_b.finish();
        stats.pure_a.finish();
        stats.pure_b.finish();
        stats
    }

    /// Live cells in the division-of-labor system.
    pub fn dol_total(&self) -> usize {
        self.dol_a.count + self.dol_b.count
    }

    /// Live cells in the pure-strategy system.
    pub fn pure_total(&self) -> usize {
        self.pure_a.count + self.pure_b.count
    }

    pub fn total(&self) -> usize {
        self.dol_total() + self.pure_total()
    }

    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "T:{:8} | DolA:{:5} kA:{:.3} | DolB:{:5} kB:{:.3} | PureA:{:5} | PureB:{:5} | Total:{:5}",
            self.tick,
            self.dol_a.count,
            self.dol_a.mean_k,
            self.dol_b.count,
            self.dol_b.mean_k,
            self.pure_a.count,
            self.pure_b.count,
            self.total(),
        )
    }
}

/// Per-ancestor live counts from one census.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct CensusCounts {
    pub tick: u64,
    /// Living cells founded by an A-type ancestor.
    pub ancestor_a: usize,
    /// Living cells founded by a B-type ancestor.
    pub ancestor_b: usize,
}

impl CensusCounts {
    /// Count living cells per founder tag.
    pub fn collect(lattice: &Lattice<Microbe>, tick: u64) -> Self {
        let mut counts = CensusCounts {
            tick,
            ..CensusCounts::default()
        };

        for (_, _, cell) in lattice.interior() {
            if cell.state.is_alive() {
                if cell.ancestor.produces_a() {
                    counts.ancestor_a += 1;
                } else if cell.ancestor.is_alive() {
                    counts.ancestor_b += 1;
                }
            }
        }

        counts
    }

    /// Whether either lineage has died out (census tag reset trigger).
    pub fn lineage_extinct(&self) -> bool {
        self.ancestor_a == 0 || self.ancestor_b == 0
    }
}

/// Historical statistics tracker, serializable for post-run analysis.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    pub snapshots: Vec<Stats>,
}

impl StatsHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, stats: Stats) {
        self.snapshots.push(stats);
    }

    /// Population over time as `(tick, total)` pairs.
    pub fn population_series(&self) -> Vec<(u64, usize)> {
        self.snapshots.iter().map(|s| (s.tick, s.total())).collect()
    }

    /// Save history to a JSON file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)
    }

    /// Load history from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}

/// CSV logger for aggregate statistics. Every row is flushed as soon as it is
/// written so partial runs still leave usable output.
pub struct StatsLogger {
    writer: BufWriter<File>,
}

impl StatsLogger {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(
            writer,
            "tick,dol_a_mean_k,dol_a_mean_d,dol_b_mean_k,dol_b_mean_d,\
             pure_a_mean_k,pure_a_mean_d,pure_b_mean_k,pure_b_mean_d,\
             dol_a,dol_b,pure_a,pure_b,dol_total,pure_total"
        )?;
        writer.flush()?;
        Ok(Self { writer })
    }

    pub fn append(&mut self, stats: &Stats) -> std::io::Result<()> {
        writeln!(
            self.writer,
            "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
            stats.tick,
            stats.dol_a.mean_k,
            stats.dol_a.mean_d,
            stats.dol_b.mean_k,
            stats.dol_b.mean_d,
            stats.pure_a.mean_k,
            stats.pure_a.mean_d,
            stats.pure_b.mean_k,
            stats.pure_b.mean_d,
            stats.dol_a.count,
            stats.dol_b.count,
            stats.pure_a.count,
            stats.pure_b.count,
            stats.dol_total(),
            stats.pure_total(),
        )?;
        self.writer.flush()
    }
}

/// CSV logger for the lineage census, flushed per row like [`StatsLogger`].
pub struct CensusLogger {
    writer: BufWriter<File>,
}

impl CensusLogger {
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "tick,ancestor_a,ancestor_b")?;
        writer.flush()?;
        Ok(Self { writer })
    }

    pub fn append(&mut self, counts: &CensusCounts) -> std::io::Result<()> {
        writeln!(
            self.writer,
            "{},{},{}",
            counts.tick, counts.ancestor_a, counts.ancestor_b
        )?;
        self.writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_lattice() -> Lattice<Microbe> {
        let mut lattice: Lattice<Microbe> = Lattice::new(6, 6);
        for (state, ka, kb, row) in [
            (CellState::DolA, 0.2, 0.0, 1),
            (CellState::DolA, 0.4, 0.0, 2),
            (CellState::DolB, 0.0, 0.8, 3),
            (CellState::PureA, 0.6, 0.0, 4),
        ] {
            let cell = lattice.cell_mut(row, 1);
            cell.state = state;
            cell.ka = ka;
            cell.kb = kb;
            cell.ancestor = state;
        }
        lattice
    }

    #[test]
    fn test_collect_counts_and_means() {
        let lattice = seeded_lattice();
        let stats = Stats::collect(&lattice, 42);

        assert_eq!(stats.tick, 42);
        assert_eq!(stats.dol_a.count, 2);
        assert!((stats.dol_a.mean_k - 0.3).abs() < 1e-12);
        assert_eq!(stats.dol_b.count, 1);
        assert!((stats.dol_b.mean_k - 0.8).abs() < 1e-12);
        assert_eq!(stats.pure_a.count, 1);
        assert_eq!(stats.dol_total(), 3);
        assert_eq!(stats.pure_total(), 1);
        assert_eq!(stats.total(), 4);
    }

    #[test]
    fn test_collect_empty_lattice() {
        let lattice: Lattice<Microbe> = Lattice::new(5, 5);
        let stats = Stats::collect(&lattice, 0);
        assert_eq!(stats.total(), 0);
        assert_eq!(stats.dol_a.mean_k, 0.0);
    }

    #[test]
    fn test_census_counts_by_ancestor() {
        let mut lattice = seeded_lattice();
        // A DolB cell founded by an A-type ancestor still counts for A.
        let cell = lattice.cell_mut(3, 1);
        cell.ancestor = CellState::DolA;

        let counts = CensusCounts::collect(&lattice, 7);
        assert_eq!(counts.ancestor_a, 4);
        assert_eq!(counts.ancestor_b, 0);
        assert!(counts.lineage_extinct());
    }

    #[test]
    fn test_stats_history_series() {
        let mut history = StatsHistory::new();
        let lattice = seeded_lattice();
        for tick in [0, 10] {
            history.record(Stats::collect(&lattice, tick));
        }
        let series = history.population_series();
        assert_eq!(series, vec![(0, 4), (10, 4)]);
    }

    #[test]
    fn test_stats_logger_writes_rows() {
        let path = "/tmp/quorum_test_stats.csv";
        {
            let mut logger = StatsLogger::create(path).unwrap();
            let lattice = seeded_lattice();
            logger.append(&Stats::collect(&lattice, 5)).unwrap();
        }
        let contents = std::fs::read_to_string(path).unwrap();
        let mut lines = contents.lines();
        assert!(lines.next().unwrap().starts_with("tick,dol_a_mean_k"));
        assert!(lines.next().unwrap().starts_with("5,"));
        std::fs::remove_file(path).ok();
    }
}
