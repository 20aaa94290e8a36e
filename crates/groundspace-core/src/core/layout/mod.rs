//! # Layout Module
//!
//! Read-only geometric description of an SiDB layout: the nanometer
//! positions of all dangling-bond sites, addressed by dense site indices.
//!
//! A [`Layout`] is the boundary object handed to the engine. It can be built
//! directly from nanometer positions or from surface-lattice coordinates via
//! a [`lattice::LatticeOrientation`]. Site indices are assigned in insertion
//! order and are stable for the lifetime of the layout.

pub mod lattice;

use lattice::{LatticeCoordinate, LatticeOrientation};
use nalgebra::Point2;

/// Dense index identifying one dangling-bond site of a [`Layout`].
pub type SiteIndex = usize;

/// A fixed arrangement of dangling-bond sites on the surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    positions: Vec<Point2<f64>>,
}

impl Layout {
    /// Builds a layout from explicit nanometer positions.
    pub fn from_nm_positions<I>(positions: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        Self {
            positions: positions
                .into_iter()
                .map(|(x, y)| Point2::new(x, y))
                .collect(),
        }
    }

    /// Builds a layout from surface-lattice coordinates.
    ///
    /// Each coordinate is mapped to nanometers through the given lattice
    /// orientation; site indices follow the order of the input.
    pub fn from_lattice_coordinates<I, C>(orientation: LatticeOrientation, coordinates: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<LatticeCoordinate>,
    {
        Self::from_nm_positions(
            coordinates
                .into_iter()
                .map(|c| orientation.nm_position(c.into())),
        )
    }

    /// The number of sites in the layout.
    pub fn num_sites(&self) -> usize {
        self.positions.len()
    }

    /// Returns an iterator over all site indices.
    pub fn sites(&self) -> impl Iterator<Item = SiteIndex> {
        0..self.positions.len()
    }

    /// The nanometer position of a site.
    pub fn position(&self, site: SiteIndex) -> Point2<f64> {
        self.positions[site]
    }

    /// The Euclidean distance between two sites in nanometers.
    pub fn distance(&self, a: SiteIndex, b: SiteIndex) -> f64 {
        (self.positions[a] - self.positions[b]).norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_from_nm_positions_preserves_order() {
        let layout = Layout::from_nm_positions([(0.0, 0.0), (1.5, 2.0)]);
        assert_eq!(layout.num_sites(), 2);
        assert_eq!(layout.position(0), Point2::new(0.0, 0.0));
        assert_eq!(layout.position(1), Point2::new(1.5, 2.0));
    }

    #[test]
    fn distance_is_euclidean_and_symmetric() {
        let layout = Layout::from_nm_positions([(0.0, 0.0), (3.0, 4.0)]);
        assert!((layout.distance(0, 1) - 5.0).abs() < 1e-12);
        assert_eq!(layout.distance(0, 1), layout.distance(1, 0));
    }

    #[test]
    fn lattice_coordinates_are_mapped_through_the_orientation() {
        let layout = Layout::from_lattice_coordinates(
            LatticeOrientation::Si100,
            [(0, 0, 0), (0, 0, 1), (2, 1, 1)],
        );
        assert_eq!(layout.num_sites(), 3);
        assert!((layout.position(1).y - 0.225).abs() < 1e-12);
        assert!((layout.position(2).x - 0.768).abs() < 1e-12);
    }

    #[test]
    fn empty_layout_has_no_sites() {
        let layout = Layout::default();
        assert_eq!(layout.num_sites(), 0);
        assert_eq!(layout.sites().count(), 0);
    }
}
