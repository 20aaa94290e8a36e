use super::charge::ChargeMultiset;
use std::collections::BTreeMap;
use std::ops::{Add, AddAssign};

/// The direction of a one-sided potential bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundDirection {
    Lower,
    Upper,
}

impl BoundDirection {
    pub const BOTH: [BoundDirection; 2] = [BoundDirection::Lower, BoundDirection::Upper];

    /// The identity element of [`Self::meet`]: the value that any real
    /// potential improves upon.
    #[inline]
    pub fn top(self) -> f64 {
        match self {
            Self::Lower => f64::INFINITY,
            Self::Upper => f64::NEG_INFINITY,
        }
    }

    /// The conservative combination of two bounds in this direction: the
    /// minimum of two lower bounds, the maximum of two upper bounds.
    #[inline]
    pub fn meet(self, a: f64, b: f64) -> f64 {
        match self {
            Self::Lower => a.min(b),
            Self::Upper => a.max(b),
        }
    }

    /// Whether `candidate` is strictly more extremal than `current`.
    #[inline]
    fn improves(self, candidate: f64, current: f64) -> bool {
        match self {
            Self::Lower => candidate < current,
            Self::Upper => candidate > current,
        }
    }
}

/// An aggregate pair of lower and upper potential bounds at one site.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PotentialBounds {
    pub lower: f64,
    pub upper: f64,
}

impl PotentialBounds {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    #[inline]
    pub fn get(&self, direction: BoundDirection) -> f64 {
        match direction {
            BoundDirection::Lower => self.lower,
            BoundDirection::Upper => self.upper,
        }
    }

    #[inline]
    pub fn set(&mut self, direction: BoundDirection, value: f64) {
        match direction {
            BoundDirection::Lower => self.lower = value,
            BoundDirection::Upper => self.upper = value,
        }
    }

    #[inline]
    pub fn shift(&mut self, direction: BoundDirection, delta: f64) {
        match direction {
            BoundDirection::Lower => self.lower += delta,
            BoundDirection::Upper => self.upper += delta,
        }
    }
}

/// One potential projection: the signed potential (in volts) a source
/// cluster contributes at some site, tagged with the source's charge
/// multiset that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PotentialProjection {
    pub volts: f64,
    pub source: ChargeMultiset,
}

impl PotentialProjection {
    pub fn new(volts: f64, source: ChargeMultiset) -> Self {
        Self { volts, source }
    }
}

impl Add for PotentialProjection {
    type Output = Self;

    /// Summing projections models two source clusters acting jointly: the
    /// potentials add and the tags concatenate into the merged multiset.
    fn add(self, rhs: Self) -> Self {
        Self {
            volts: self.volts + rhs.volts,
            source: self.source + rhs.source,
        }
    }
}

impl AddAssign for PotentialProjection {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// An ordered multiset of potential projections onto one site.
///
/// Entries are grouped by source multiset, each group kept sorted by
/// potential, which supports the four queries the engine needs: global
/// extremal lookup, the runner-up after the extremal, per-tag extremal
/// lookup, and mass removal of a tag. Iteration order over groups follows
/// the multiset ordering, so all queries are deterministic; ties in
/// potential resolve to the smallest tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectionOrder {
    entries: BTreeMap<ChargeMultiset, Vec<f64>>,
}

impl ProjectionOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts a projection, keeping its tag group sorted.
    pub fn add(&mut self, projection: PotentialProjection) {
        let group = self.entries.entry(projection.source).or_default();
        let at = group.partition_point(|&v| v < projection.volts);
        group.insert(at, projection.volts);
    }

    /// The projection with the extremal potential in the given direction,
    /// or `None` if the store is empty.
    pub fn extremal(&self, direction: BoundDirection) -> Option<PotentialProjection> {
        let mut best: Option<PotentialProjection> = None;
        for (&source, group) in &self.entries {
            let candidate = match direction {
                BoundDirection::Lower => *group.first().unwrap(),
                BoundDirection::Upper => *group.last().unwrap(),
            };
            if best.is_none_or(|b| direction.improves(candidate, b.volts)) {
                best = Some(PotentialProjection::new(candidate, source));
            }
        }
        best
    }

    /// The potential that would become extremal if one instance of the
    /// current extremal projection were removed.
    pub fn next_extremal(&self, direction: BoundDirection) -> Option<f64> {
        let current = self.extremal(direction)?;
        let mut best: Option<f64> = None;
        for (&source, group) in &self.entries {
            let candidate = if source == current.source {
                // Skip one instance of the extremal within its own group.
                let index = match direction {
                    BoundDirection::Lower => 1,
                    BoundDirection::Upper => group.len().wrapping_sub(2),
                };
                match group.get(index) {
                    Some(&v) => v,
                    None => continue,
                }
            } else {
                match direction {
                    BoundDirection::Lower => *group.first().unwrap(),
                    BoundDirection::Upper => *group.last().unwrap(),
                }
            };
            if best.is_none_or(|b| direction.improves(candidate, b)) {
                best = Some(candidate);
            }
        }
        best
    }

    /// The extremal potential among the projections tagged with `source`.
    pub fn extremal_for(
        &self,
        source: ChargeMultiset,
        direction: BoundDirection,
    ) -> Option<PotentialProjection> {
        let group = self.entries.get(&source)?;
        let volts = match direction {
            BoundDirection::Lower => *group.first().unwrap(),
            BoundDirection::Upper => *group.last().unwrap(),
        };
        Some(PotentialProjection::new(volts, source))
    }

    /// Removes every projection tagged with `source`.
    pub fn remove_all(&mut self, source: ChargeMultiset) {
        self.entries.remove(&source);
    }
}
