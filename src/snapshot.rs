//! Plain-text grid snapshots: one line per interior cell.
//!
//! Format, space-separated, row-major over the interior:
//!
//! ```text
//! row col state da ka db kb
//! ```
//!
//! Floats are written with Rust's shortest round-trip formatting, so a saved
//! grid loads back bit-for-bit.

use crate::lattice::Lattice;
use crate::microbe::{CellState, Microbe};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Errors raised by snapshot save/load.
#[derive(Debug)]
pub enum SnapshotError {
    Io(std::io::Error),
    /// A line that does not parse as `row col state da ka db kb`.
    Malformed { line: usize, reason: String },
    /// A coordinate outside the interior of the target lattice.
    OutOfRange { line: usize, row: usize, col: usize },
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Malformed { line, reason } => {
                write!(f, "malformed snapshot line {}: {}", line, reason)
            }
            Self::OutOfRange { line, row, col } => {
                write!(f, "snapshot line {}: cell ({}, {}) outside the grid", line, row, col)
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

impl From<std::io::Error> for SnapshotError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Write every interior cell's state and trait quadruple.
pub fn save_grid<P: AsRef<Path>>(lattice: &Lattice<Microbe>, path: P) -> Result<(), SnapshotError> {
    let mut writer = BufWriter::new(File::create(path)?);

    for (row, col, cell) in lattice.interior() {
        writeln!(
            writer,
            "{} {} {} {} {} {} {}",
            row,
            col,
            cell.state.code(),
            cell.da,
            cell.ka,
            cell.db,
            cell.kb,
        )?;
    }

    writer.flush()?;
    Ok(())
}

/// Apply a snapshot onto an existing lattice.
///
/// Any malformed line is a hard failure: the lattice may be partially
/// written at that point and must not be simulated on. Cells not named in
/// the file keep their previous contents.
pub fn load_grid<P: AsRef<Path>>(lattice: &mut Lattice<Microbe>, path: P) -> Result<(), SnapshotError> {
    let reader = BufReader::new(File::open(path)?);

    for (number, line) in reader.lines().enumerate() {
        let number = number + 1;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let mut fields = line.split_whitespace();
        let row: usize = parse_field(&mut fields, number, "row")?;
        let col: usize = parse_field(&mut fields, number, "col")?;
        let state_code: u8 = parse_field(&mut fields, number, "state")?;
        let da: f64 = parse_field(&mut fields, number, "da")?;
        let ka: f64 = parse_field(&mut fields, number, "ka")?;
        let db: f64 = parse_field(&mut fields, number, "db")?;
        let kb: f64 = parse_field(&mut fields, number, "kb")?;

        if fields.next().is_some() {
            return Err(SnapshotError::Malformed {
                line: number,
                reason: "trailing fields".to_string(),
            });
        }

        let state = CellState::from_code(state_code).ok_or_else(|| SnapshotError::Malformed {
            line: number,
            reason: format!("unknown state code {state_code}"),
        })?;

        if row == 0 || row > lattice.rows() || col == 0 || col > lattice.cols() {
            return Err(SnapshotError::OutOfRange { line: number, row, col });
        }

        let cell = lattice.cell_mut(row, col);
        cell.state = state;
        cell.inherit_exact(da, ka, db, kb);
    }

    Ok(())
}

fn parse_field<'a, T: std::str::FromStr>(
    fields: &mut impl Iterator<Item = &'a str>,
    line: usize,
    name: &str,
) -> Result<T, SnapshotError> {
    let raw = fields.next().ok_or_else(|| SnapshotError::Malformed {
        line,
        reason: format!("missing field {name}"),
    })?;
    raw.parse().map_err(|_| SnapshotError::Malformed {
        line,
        reason: format!("bad value {raw:?} for field {name}"),
    })
}
