use super::charge::ChargeMultiset;
use crate::core::layout::SiteIndex;
use std::collections::BTreeSet;

/// The witness bookkeeping for one candidate multiset of one cluster.
///
/// A site *witnesses* a charge role when its received-potential bounds do
/// not refute that role. The multiset is realizable only if the witnesses
/// can be partitioned so that every required charge count is covered by
/// distinct sites; this type carries the three witness sets and the exact
/// backtracking search over them.
#[derive(Debug, Clone)]
pub(crate) struct WitnessPartitioning {
    negative: BTreeSet<SiteIndex>,
    positive: BTreeSet<SiteIndex>,
    neutral: BTreeSet<SiteIndex>,
    required_negative: usize,
    required_positive: usize,
    required_neutral: usize,
}

impl WitnessPartitioning {
    pub fn new(multiset: ChargeMultiset, cluster_size: usize) -> Self {
        Self {
            negative: BTreeSet::new(),
            positive: BTreeSet::new(),
            neutral: BTreeSet::new(),
            required_negative: multiset.negatives() as usize,
            required_positive: multiset.positives() as usize,
            required_neutral: multiset.neutrals(cluster_size) as usize,
        }
    }

    pub fn required_negative(&self) -> usize {
        self.required_negative
    }

    pub fn required_positive(&self) -> usize {
        self.required_positive
    }

    pub fn required_neutral(&self) -> usize {
        self.required_neutral
    }

    pub fn add_negative_witness(&mut self, site: SiteIndex) {
        self.negative.insert(site);
    }

    pub fn add_positive_witness(&mut self, site: SiteIndex) {
        self.positive.insert(site);
    }

    pub fn add_neutral_witness(&mut self, site: SiteIndex) {
        self.neutral.insert(site);
    }

    /// The necessary cardinality condition: each role must have at least as
    /// many witnesses as sites it needs.
    pub fn counts_satisfied(&self) -> bool {
        self.negative.len() >= self.required_negative
            && self.positive.len() >= self.required_positive
            && self.neutral.len() >= self.required_neutral
    }

    /// Removes witnesses that appear in exactly one set, crediting them
    /// against that set's required count. Only overlapping witnesses remain
    /// to be partitioned, which shrinks the search exponentially.
    pub fn omit_free_witnesses(&mut self) {
        let free_negative: Vec<_> = self
            .negative
            .iter()
            .filter(|s| !self.positive.contains(s) && !self.neutral.contains(s))
            .copied()
            .collect();
        for site in free_negative {
            self.negative.remove(&site);
            self.required_negative = self.required_negative.saturating_sub(1);
        }

        let free_positive: Vec<_> = self
            .positive
            .iter()
            .filter(|s| !self.negative.contains(s) && !self.neutral.contains(s))
            .copied()
            .collect();
        for site in free_positive {
            self.positive.remove(&site);
            self.required_positive = self.required_positive.saturating_sub(1);
        }

        let free_neutral: Vec<_> = self
            .neutral
            .iter()
            .filter(|s| !self.negative.contains(s) && !self.positive.contains(s))
            .copied()
            .collect();
        for site in free_neutral {
            self.neutral.remove(&site);
            self.required_neutral = self.required_neutral.saturating_sub(1);
        }
    }

    /// Searches for an assignment of the remaining witnesses that covers
    /// every required count with distinct sites: negative slots are filled
    /// first, then positive, then neutral, backtracking on failure.
    pub fn has_valid_partition(&mut self) -> bool {
        let remaining = self.required_negative;
        self.fill_negative(remaining)
    }

    fn fill_negative(&mut self, remaining: usize) -> bool {
        if remaining == 0 {
            let positive_slots = self.required_positive;
            return self.fill_positive(positive_slots);
        }

        let candidates: Vec<_> = self.negative.iter().copied().collect();
        for site in candidates {
            self.negative.remove(&site);
            let was_positive = self.positive.remove(&site);
            let was_neutral = self.neutral.remove(&site);

            if self.fill_negative(remaining - 1) {
                return true;
            }

            self.negative.insert(site);
            if was_positive {
                self.positive.insert(site);
            }
            if was_neutral {
                self.neutral.insert(site);
            }
        }

        false
    }

    fn fill_positive(&mut self, remaining: usize) -> bool {
        if remaining == 0 {
            return self.neutral.len() >= self.required_neutral;
        }

        let candidates: Vec<_> = self.positive.iter().copied().collect();
        for site in candidates {
            self.positive.remove(&site);
            let was_neutral = self.neutral.remove(&site);

            if self.fill_positive(remaining - 1) {
                return true;
            }

            self.positive.insert(site);
            if was_neutral {
                self.neutral.insert(site);
            }
        }

        false
    }
}
