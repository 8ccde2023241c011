//! Per-site microbe record, heritable traits, and the local public-good
//! aggregator.

use crate::lattice::Lattice;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Unique microbe identifier.
pub type MicrobeId = u64;

/// Standard deviation of the multiplicative trait perturbation.
pub const TRAIT_SIGMA: f64 = 0.02;

/// Occupancy tag of a lattice site.
///
/// `DolA`/`DolB` are the division-of-labor pair: each can differentiate into
/// the other on reproduction. `PureA`/`PureB` breed true and carry zeroed
/// differentiation traits; they form the rival system sharing the lattice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CellState {
    #[default]
    Empty = 0,
    DolA = 1,
    DolB = 2,
    PureA = 3,
    PureB = 4,
}

/// The two competing systems tracked for extinction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum System {
    Dol,
    Pure,
}

impl CellState {
    pub fn from_code(code: u8) -> Option<CellState> {
        match code {
            0 => Some(CellState::Empty),
            1 => Some(CellState::DolA),
            2 => Some(CellState::DolB),
            3 => Some(CellState::PureA),
            4 => Some(CellState::PureB),
            _ => None,
        }
    }

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn is_alive(self) -> bool {
        self != CellState::Empty
    }

    /// Whether this type senses and produces through the `ka` trait pair
    /// (`kb` otherwise).
    #[inline]
    pub fn produces_a(self) -> bool {
        matches!(self, CellState::DolA | CellState::PureA)
    }

    #[inline]
    pub fn system(self) -> Option<System> {
        match self {
            CellState::Empty => None,
            CellState::DolA | CellState::DolB => Some(System::Dol),
            CellState::PureA | CellState::PureB => Some(System::Pure),
        }
    }

    /// The type a differentiated offspring takes. Division-of-labor types map
    /// to their partner; pure types breed true.
    pub fn differentiated(self) -> CellState {
        match self {
            CellState::DolA => CellState::DolB,
            CellState::DolB => CellState::DolA,
            other => other,
        }
    }
}

/// One lattice site's occupant: occupancy tag, heritable traits, fixed rates,
/// and lineage bookkeeping.
///
/// A site that dies keeps its last occupant's traits until the next birth
/// overwrites them; dead traits are never read.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Microbe {
    pub state: CellState,
    /// Differentiation probability when living as an A-type.
    pub da: f64,
    /// Differentiation probability when living as a B-type.
    pub db: f64,
    /// Public-good production as an A-type.
    pub ka: f64,
    /// Public-good production as a B-type.
    pub kb: f64,
    pub death_rate: f64,
    pub move_rate: f64,
    /// Founder tag, inherited unchanged; reset only by the census when a
    /// lineage has died out.
    pub ancestor: CellState,
    pub id: MicrobeId,
    pub parent_id: MicrobeId,
}

impl Default for Microbe {
    fn default() -> Self {
        Self {
            state: CellState::Empty,
            da: 0.5,
            db: 0.5,
            ka: 0.5,
            kb: 0.5,
            death_rate: 0.1,
            move_rate: 0.5,
            ancestor: CellState::Empty,
            id: 0,
            parent_id: 0,
        }
    }
}

impl Microbe {
    /// The production trait read for this microbe's current type.
    #[inline]
    pub fn active_k(&self) -> f64 {
        if self.state.produces_a() {
            self.ka
        } else {
            self.kb
        }
    }

    /// The differentiation trait read for this microbe's current type.
    #[inline]
    pub fn active_d(&self) -> f64 {
        if self.state.produces_a() {
            self.da
        } else {
            self.db
        }
    }

    /// Multiplicative-exponential perturbation of one trait: draws
    /// `delta ~ Normal(0, TRAIT_SIGMA)` and returns
    /// `clamp(p * exp(-delta), 0, 1)`.
    pub fn mutate_trait<R: Rng>(rng: &mut R, p: f64) -> f64 {
        let delta: f64 = rng.sample::<f64, _>(StandardNormal) * TRAIT_SIGMA;
        (p * (-delta).exp()).clamp(0.0, 1.0)
    }

    /// Inherit all four traits with independent mutation of each.
    pub fn inherit_mutated<R: Rng>(&mut self, rng: &mut R, da: f64, ka: f64, db: f64, kb: f64) {
        self.da = Self::mutate_trait(rng, da);
        self.ka = Self::mutate_trait(rng, ka);
        self.db = Self::mutate_trait(rng, db);
        self.kb = Self::mutate_trait(rng, kb);
    }

    /// Inherit all four traits verbatim.
    pub fn inherit_exact(&mut self, da: f64, ka: f64, db: f64, kb: f64) {
        self.da = da;
        self.ka = ka;
        self.db = db;
        self.kb = kb;
    }

    /// Pure-strategy offspring never differentiate.
    pub fn zero_differentiation(&mut self) {
        self.da = 0.0;
        self.db = 0.0;
    }
}

/// Mean public-good production sensed at `(row, col)`: the live neighbors of
/// the 5x5 patch around the site, center excluded, each contributing the
/// trait of its active type. Returns `0.0` when no neighbor lives.
///
/// Wraparound is computed directly from the coordinate arithmetic rather
/// than the lattice's neighbor tables, so the patch is correct on every
/// interior site of any lattice at least 5 wide.
pub fn average_public_good(lattice: &Lattice<Microbe>, row: usize, col: usize) -> f64 {
    let rows = lattice.rows() as isize;
    let cols = lattice.cols() as isize;
    let row = row as isize;
    let col = col as isize;

    let mut total = 0.0;
    let mut alive = 0u32;

    for r in row - 2..=row + 2 {
        for c in col - 2..=col + 2 {
            let wrapped_r = if r <= 0 {
                rows + r
            } else if r > rows {
                r - rows
            } else {
                r
            };
            let wrapped_c = if c <= 0 {
                cols + c
            } else if c > cols {
                c - cols
            } else {
                c
            };

            if wrapped_r == row && wrapped_c == col {
                continue;
            }

            let neighbor = lattice.cell(wrapped_r as usize, wrapped_c as usize);
            if neighbor.state.is_alive() {
                total += neighbor.active_k();
                alive += 1;
            }
        }
    }

    if alive > 0 {
        total / f64::from(alive)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn live(state: CellState, ka: f64, kb: f64) -> Microbe {
        Microbe {
            state,
            ka,
            kb,
            ..Microbe::default()
        }
    }

    #[test]
    fn test_default_is_empty_with_midpoint_traits() {
        let m = Microbe::default();
        assert_eq!(m.state, CellState::Empty);
        assert_eq!((m.da, m.db, m.ka, m.kb), (0.5, 0.5, 0.5, 0.5));
        assert_eq!(m.death_rate, 0.1);
        assert_eq!(m.move_rate, 0.5);
    }

    #[test]
    fn test_mutate_trait_stays_in_unit_interval() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for &p in &[0.0, 1e-9, 0.25, 0.5, 0.999, 1.0] {
            for _ in 0..2000 {
                let q = Microbe::mutate_trait(&mut rng, p);
                assert!((0.0..=1.0).contains(&q), "p={p} q={q}");
            }
        }
    }

    #[test]
    fn test_mutate_trait_is_multiplicative() {
        // Zero never escapes zero under multiplicative noise.
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for _ in 0..100 {
            assert_eq!(Microbe::mutate_trait(&mut rng, 0.0), 0.0);
        }
    }

    #[test]
    fn test_inherit_exact_copies_verbatim() {
        let mut m = Microbe::default();
        m.inherit_exact(0.1, 0.2, 0.3, 0.4);
        assert_eq!((m.da, m.ka, m.db, m.kb), (0.1, 0.2, 0.3, 0.4));
    }

    #[test]
    fn test_differentiated_pairs() {
        assert_eq!(CellState::DolA.differentiated(), CellState::DolB);
        assert_eq!(CellState::DolB.differentiated(), CellState::DolA);
        assert_eq!(CellState::PureA.differentiated(), CellState::PureA);
        assert_eq!(CellState::PureB.differentiated(), CellState::PureB);
    }

    #[test]
    fn test_active_trait_follows_type() {
        let a = live(CellState::DolA, 0.7, 0.2);
        let b = live(CellState::DolB, 0.7, 0.2);
        assert_eq!(a.active_k(), 0.7);
        assert_eq!(b.active_k(), 0.2);
        let p = live(CellState::PureB, 0.7, 0.2);
        assert_eq!(p.active_k(), 0.2);
    }

    #[test]
    fn test_average_public_good_all_dead_is_zero() {
        let lattice: Lattice<Microbe> = Lattice::new(7, 7);
        assert_eq!(average_public_good(&lattice, 4, 4), 0.0);
    }

    #[test]
    fn test_average_public_good_excludes_center() {
        let mut lattice: Lattice<Microbe> = Lattice::new(7, 7);
        *lattice.cell_mut(4, 4) = live(CellState::DolA, 1.0, 1.0);
        // Only occupant is the center itself.
        assert_eq!(average_public_good(&lattice, 4, 4), 0.0);
    }

    #[test]
    fn test_average_public_good_mixes_active_traits() {
        let mut lattice: Lattice<Microbe> = Lattice::new(7, 7);
        *lattice.cell_mut(3, 4) = live(CellState::DolA, 0.8, 0.0);
        *lattice.cell_mut(5, 4) = live(CellState::DolB, 0.0, 0.4);
        *lattice.cell_mut(2, 2) = live(CellState::PureA, 0.6, 0.0);
        let avg = average_public_good(&lattice, 4, 4);
        assert!((avg - (0.8 + 0.4 + 0.6) / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_average_public_good_wraps_at_seam() {
        let mut lattice: Lattice<Microbe> = Lattice::new(6, 6);
        // Two rows north of (1,3) wraps to row 5.
        *lattice.cell_mut(5, 3) = live(CellState::DolA, 0.9, 0.0);
        let avg = average_public_good(&lattice, 1, 3);
        assert!((avg - 0.9).abs() < 1e-12);
    }
}
