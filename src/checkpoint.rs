//! Checkpoint system for saving and loading complete simulation state.
//!
//! Binary, versioned, behind a magic tag. Complements the plain-text grid
//! snapshots: a checkpoint restores the whole run (configuration, tick, cull
//! bookkeeping), not just the lattice contents.

use crate::config::Config;
use crate::lattice::Lattice;
use crate::microbe::{Microbe, MicrobeId};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Complete simulation state for checkpointing
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Version for compatibility checking
    pub version: u32,
    /// Simulation tick
    pub tick: u64,
    /// Configuration
    pub config: Config,
    /// The full lattice, border included
    pub lattice: Lattice<Microbe>,
    /// Next microbe ID
    pub next_id: MicrobeId,
    /// Tick of the last mass-culling event
    pub last_cull: u64,
    /// Random seed (for reproducibility)
    pub random_seed: u64,
}

impl Checkpoint {
    /// Current checkpoint version
    pub const VERSION: u32 = 1;

    const MAGIC: &'static [u8; 4] = b"QRMC";

    /// Create a new checkpoint
    pub fn new(
        tick: u64,
        config: Config,
        lattice: Lattice<Microbe>,
        next_id: MicrobeId,
        last_cull: u64,
        random_seed: u64,
    ) -> Self {
        Self {
            version: Self::VERSION,
            tick,
            config,
            lattice,
            next_id,
            last_cull,
            random_seed,
        }
    }

    /// Save checkpoint to binary file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CheckpointError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writer.write_all(Self::MAGIC)?;

        let encoded = bincode::serialize(self)?;
        writer.write_all(&encoded)?;

        Ok(())
    }

    /// Load checkpoint from binary file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CheckpointError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != Self::MAGIC {
            return Err(CheckpointError::InvalidFormat(
                "invalid magic bytes".to_string(),
            ));
        }

        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        let checkpoint: Checkpoint = bincode::deserialize(&buffer)?;

        if checkpoint.version != Self::VERSION {
            return Err(CheckpointError::VersionMismatch {
                expected: Self::VERSION,
                found: checkpoint.version,
            });
        }

        Ok(checkpoint)
    }

    /// Get approximate size in bytes
    pub fn size_bytes(&self) -> usize {
        bincode::serialized_size(self).unwrap_or(0) as usize
    }
}

/// Errors that can occur during checkpoint operations
#[derive(Debug)]
pub enum CheckpointError {
    Io(std::io::Error),
    Serialization(bincode::Error),
    InvalidFormat(String),
    VersionMismatch { expected: u32, found: u32 },
}

impl std::fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
            Self::InvalidFormat(msg) => write!(f, "Invalid format: {}", msg),
            Self::VersionMismatch { expected, found } => {
                write!(f, "Version mismatch: expected {}, found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for CheckpointError {}

impl From<std::io::Error> for CheckpointError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<bincode::Error> for CheckpointError {
    fn from(e: bincode::Error) -> Self {
        Self::Serialization(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::microbe::CellState;

    fn create_test_checkpoint() -> Checkpoint {
        let config = Config::default();
        let mut lattice: Lattice<Microbe> = Lattice::new(5, 5);
        lattice.cell_mut(2, 2).state = CellState::DolA;
        Checkpoint::new(1000, config, lattice, 7, 0, 12345)
    }

    #[test]
    fn test_checkpoint_roundtrip() {
        let checkpoint = create_test_checkpoint();
        let temp_path = "/tmp/quorum_test_checkpoint.bin";

        checkpoint.save(temp_path).unwrap();
        let loaded = Checkpoint::load(temp_path).unwrap();

        assert_eq!(loaded.tick, checkpoint.tick);
        assert_eq!(loaded.random_seed, checkpoint.random_seed);
        assert_eq!(loaded.lattice.cell(2, 2).state, CellState::DolA);

        std::fs::remove_file(temp_path).ok();
    }

    #[test]
    fn test_bad_magic_rejected() {
        let temp_path = "/tmp/quorum_test_checkpoint_magic.bin";
        std::fs::write(temp_path, b"NOPE garbage").unwrap();

        let err = Checkpoint::load(temp_path).unwrap_err();
        assert!(matches!(err, CheckpointError::InvalidFormat(_)));

        std::fs::remove_file(temp_path).ok();
    }

    #[test]
    fn test_checkpoint_size() {
        let checkpoint = create_test_checkpoint();
        let size = checkpoint.size_bytes();

        assert!(size > 0);
        assert!(size < 1_000_000);
    }
}
