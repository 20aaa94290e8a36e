use serde::{Deserialize, Serialize};

/// A position on the hydrogen-passivated silicon surface lattice.
///
/// `x` counts dimer columns, `y` counts dimer rows, and `z` selects one of
/// the two dangling-bond positions within a dimer row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LatticeCoordinate {
    pub x: i64,
    pub y: i64,
    pub z: u8,
}

impl LatticeCoordinate {
    pub fn new(x: i64, y: i64, z: u8) -> Self {
        Self { x, y, z }
    }
}

impl From<(i64, i64, u8)> for LatticeCoordinate {
    fn from((x, y, z): (i64, i64, u8)) -> Self {
        Self { x, y, z }
    }
}

/// The crystal orientation of the silicon surface carrying the layout.
///
/// The orientation enters the engine only through this mapping from lattice
/// coordinates to nanometer positions; everything downstream is
/// orientation-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LatticeOrientation {
    /// The H-Si(100)-2×1 surface.
    #[default]
    Si100,
    /// The H-Si(111)-1×1 surface.
    Si111,
}

impl LatticeOrientation {
    /// The lattice vectors in ångström: the inter-column spacing `a`, the
    /// inter-row spacing `b`, and the intra-row offset `c` of the second
    /// dangling-bond position.
    fn lattice_vectors(self) -> (f64, f64, (f64, f64)) {
        match self {
            Self::Si100 => (3.84, 7.68, (0.0, 2.25)),
            Self::Si111 => (6.65, 3.84, (3.3255, 1.92)),
        }
    }

    /// Computes the position of a lattice coordinate in nanometers from the
    /// layout origin.
    pub fn nm_position(self, coordinate: LatticeCoordinate) -> (f64, f64) {
        let (lat_a, lat_b, lat_c) = self.lattice_vectors();
        let x = (coordinate.x as f64 * lat_a + coordinate.z as f64 * lat_c.0) * 0.1;
        let y = (coordinate.y as f64 * lat_b + coordinate.z as f64 * lat_c.1) * 0.1;
        (x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    fn positions_approx_equal(a: (f64, f64), b: (f64, f64)) -> bool {
        (a.0 - b.0).abs() < TOLERANCE && (a.1 - b.1).abs() < TOLERANCE
    }

    #[test]
    fn origin_maps_to_origin_on_both_surfaces() {
        let origin = LatticeCoordinate::new(0, 0, 0);
        assert_eq!(LatticeOrientation::Si100.nm_position(origin), (0.0, 0.0));
        assert_eq!(LatticeOrientation::Si111.nm_position(origin), (0.0, 0.0));
    }

    #[test]
    fn si_100_columns_advance_by_the_dimer_pitch() {
        let position = LatticeOrientation::Si100.nm_position(LatticeCoordinate::new(2, 1, 0));
        assert!(positions_approx_equal(position, (0.768, 0.768)));
    }

    #[test]
    fn si_100_second_dangling_bond_is_offset_within_the_row() {
        let position = LatticeOrientation::Si100.nm_position(LatticeCoordinate::new(0, 0, 1));
        assert!(positions_approx_equal(position, (0.0, 0.225)));
    }

    #[test]
    fn si_111_offset_applies_to_both_axes() {
        let position = LatticeOrientation::Si111.nm_position(LatticeCoordinate::new(1, 1, 1));
        assert!(positions_approx_equal(position, (0.99755, 0.576)));
    }

    #[test]
    fn negative_coordinates_map_to_negative_positions() {
        let position = LatticeOrientation::Si100.nm_position(LatticeCoordinate::new(-1, -1, 0));
        assert!(positions_approx_equal(position, (-0.384, -0.768)));
    }
}
