//! Color-bucket mapping for external renderers.
//!
//! The core exposes a `(state, active trait)` pair per cell; this module
//! names the bucket a renderer should paint it. Pixel coordinates equal grid
//! coordinates; nothing here knows about images.

use crate::lattice::Lattice;
use crate::microbe::{CellState, Microbe};

/// Named color buckets. Division-of-labor types band on their active
/// production trait so cheats (low k) and over-producers (high k) stand out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shade {
    Black,
    Yellow,
    White,
    Red,
    Violet,
    Blue,
    Gray,
    Green,
    Cyan,
}

impl Shade {
    /// Bucket for one cell.
    pub fn of(cell: &Microbe) -> Shade {
        match cell.state {
            CellState::Empty => Shade::Black,
            CellState::DolA => {
                if cell.ka < 0.2 {
                    Shade::Yellow
                } else if cell.ka > 0.8 {
                    Shade::White
                } else {
                    Shade::Red
                }
            }
            CellState::DolB => {
                if cell.kb < 0.2 {
                    Shade::Violet
                } else if cell.kb > 0.8 {
                    Shade::Blue
                } else {
                    Shade::Gray
                }
            }
            CellState::PureA => Shade::Green,
            CellState::PureB => Shade::Cyan,
        }
    }
}

/// Row-major interior frame for a renderer: one `(row, col, shade)` triple
/// per cell.
pub fn shade_frame(lattice: &Lattice<Microbe>) -> Vec<(usize, usize, Shade)> {
    lattice
        .interior()
        .map(|(row, col, cell)| (row, col, Shade::of(cell)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_black() {
        assert_eq!(Shade::of(&Microbe::default()), Shade::Black);
    }

    #[test]
    fn test_dol_banding_on_active_trait() {
        let mut cell = Microbe {
            state: CellState::DolA,
            ..Microbe::default()
        };
        cell.ka = 0.1;
        assert_eq!(Shade::of(&cell), Shade::Yellow);
        cell.ka = 0.5;
        assert_eq!(Shade::of(&cell), Shade::Red);
        cell.ka = 0.9;
        assert_eq!(Shade::of(&cell), Shade::White);

        cell.state = CellState::DolB;
        cell.kb = 0.1;
        assert_eq!(Shade::of(&cell), Shade::Violet);
        cell.kb = 0.9;
        assert_eq!(Shade::of(&cell), Shade::Blue);
    }

    #[test]
    fn test_frame_covers_interior() {
        let lattice: Lattice<Microbe> = Lattice::new(4, 6);
        let frame = shade_frame(&lattice);
        assert_eq!(frame.len(), 24);
        assert_eq!(frame[0], (1, 1, Shade::Black));
        assert_eq!(frame[23], (4, 6, Shade::Black));
    }
}
