//! The greedy allocator: a deterministic bootstrap partition biased
//! toward high pairwise compatibility.

use super::Cohort;
use crate::error::{CohortError, Result};
use crate::group::Group;
use crate::pair::PairKey;
use crate::person::{GroupId, PersonId};

impl Cohort {
    /// Produces a feasible partition by greedily placing the
    /// highest-scoring pairs first.
    ///
    /// 1. Sorts all pairs by PCS descending (ties broken by a canonical
    ///    `PairKey` order, since this crate's pair table is a `HashMap`
    ///    and has no inherent iteration order to fall back on).
    /// 2. Creates `nGroups` empty groups, where `nGroups` is the smallest
    ///    count with `nGroups * nMin >= N`.
    /// 3. Walks the sorted pairs; an unassigned pair is placed into the
    ///    first group (creation order) with room for both endpoints.
    ///    Pairs that don't fit anywhere are skipped, not retried.
    /// 4. Any person left unassigned after the pair pass goes into the
    ///    currently smallest group that still has room (ties broken by
    ///    creation order).
    ///
    /// Returns [`CohortError::Unplaceable`] if step 4 still leaves
    /// someone unassigned — this happens when total capacity
    /// (`nGroups * nMax`) is smaller than the cohort size, which can occur
    /// even though step 2 guarantees enough capacity at `nMin` (see the
    /// "greedy under-capacity" case: undersized `nMin`
    /// relative to `nMax` can produce more, smaller groups than strictly
    /// needed, but never fewer than required to hold everyone at `nMax`).
    pub fn allocate_greedy(&mut self) -> Result<()> {
        let n = self.people.len();

        for person in &mut self.people {
            person.group = None;
        }
        self.groups.clear();

        let mut n_groups = 0usize;
        while n_groups * self.n_min < n {
            n_groups += 1;
        }
        for _ in 0..n_groups {
            self.groups.push(Group::new(self.n_min, self.n_max));
        }

        let mut sorted_pairs: Vec<PairKey> = self.pairs.iter().map(|p| p.key()).collect();
        sorted_pairs.sort_by(|a, b| {
            let pcs_a = self.pairs.lookup(a.a(), a.b()).expect("pair exists").pcs();
            let pcs_b = self.pairs.lookup(b.a(), b.b()).expect("pair exists").pcs();
            pcs_b
                .partial_cmp(&pcs_a)
                .expect("PCS is never NaN")
                .then_with(|| a.cmp(b))
        });

        for key in &sorted_pairs {
            let (p1, p2) = (key.a(), key.b());
            if self.people[p1.index()].group.is_some() || self.people[p2.index()].group.is_some() {
                continue;
            }

            let target = (0..self.groups.len()).find(|&g| self.groups[g].size() + 2 <= self.n_max);
            if let Some(g) = target {
                self.add_member(GroupId(g), p1)?;
                self.add_member(GroupId(g), p2)?;
            } else {
                log::debug!(
                    "no group has room for pair ({}, {}); skipping",
                    self.people[p1.index()].name(),
                    self.people[p2.index()].name()
                );
            }
        }

        for idx in 0..n {
            if self.people[idx].group.is_some() {
                continue;
            }
            let smallest = (0..self.groups.len())
                .filter(|&g| self.groups[g].size() < self.n_max)
                .min_by_key(|&g| self.groups[g].size());
            if let Some(g) = smallest {
                self.add_member(GroupId(g), PersonId(idx))?;
            }
        }

        let unplaced = (0..n).filter(|&i| self.people[i].group.is_none()).count();
        if unplaced > 0 {
            return Err(CohortError::Unplaceable {
                unplaced,
                total: n,
                capacity: self.groups.len() * self.n_max,
            });
        }

        Ok(())
    }
}
