//! Groups: bounded collections of persons with cached compatibility metrics.

use crate::error::{CohortError, Result};
use crate::pair::{PairKey, PairTable};
use crate::person::PersonId;

/// A bounded group of persons with cached Group Compatibility Score (GCS)
/// and intra-group PCS variance.
///
/// `Group` itself holds only person indices and bounds: it does not own a
/// reference back to its [`crate::Cohort`] or the persons it contains.
/// Mutations that must also update a person's group back-reference
/// (`add_member`, `add_pair`, `remove_member`) are exposed on `Cohort`
/// instead, which is the sole owner of both the group list and the people
/// list — see the ownership summary in the data model. `Group` exposes
/// the read side directly (`members`, `gcs`, `pcs_variance`, the
/// most/least-compatible-pair queries) since those only need this
/// group's own state plus the cohort's `PairTable`.
#[derive(Debug, Clone)]
pub struct Group {
    members: Vec<PersonId>,
    min_size: usize,
    max_size: usize,
    gcs: f64,
    pcs_variance: f64,
}

impl Group {
    pub(crate) fn new(min_size: usize, max_size: usize) -> Self {
        Group {
            members: Vec::new(),
            min_size,
            max_size,
            gcs: 0.0,
            pcs_variance: 0.0,
        }
    }

    pub fn members(&self) -> &[PersonId] {
        &self.members
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn min_size(&self) -> usize {
        self.min_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Mean PCS over all intra-group pairs; `0.0` if fewer than two members.
    pub fn gcs(&self) -> f64 {
        self.gcs
    }

    /// Population variance of PCS over all intra-group pairs; `0.0` if
    /// fewer than two members.
    pub fn pcs_variance(&self) -> f64 {
        self.pcs_variance
    }

    fn intra_pairs(&self) -> impl Iterator<Item = PairKey> + '_ {
        self.members.iter().enumerate().flat_map(move |(i, &p1)| {
            self.members[i + 1..]
                .iter()
                .map(move |&p2| PairKey::new(p1, p2))
        })
    }

    /// Recomputes and caches `gcs`/`pcs_variance` from the current member
    /// list. Called by `Cohort` after every membership change.
    pub(crate) fn recompute(&mut self, pairs: &PairTable) {
        if self.members.len() < 2 {
            self.gcs = 0.0;
            self.pcs_variance = 0.0;
            return;
        }

        let scores: Vec<f64> = self
            .intra_pairs()
            .filter_map(|key| pairs.lookup(key.a(), key.b()))
            .map(|pair| pair.pcs())
            .collect();

        if scores.is_empty() {
            self.gcs = 0.0;
            self.pcs_variance = 0.0;
            return;
        }

        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / scores.len() as f64;

        self.gcs = mean;
        self.pcs_variance = variance;
    }

    /// Appends `person` if the group has room and they are not already a
    /// member. Does not recompute cached metrics or touch the person's
    /// group back-reference — callers (`Cohort`) do both after this
    /// succeeds.
    pub(crate) fn push_member(&mut self, person: PersonId) -> Result<()> {
        if self.members.len() >= self.max_size {
            return Err(CohortError::GroupState(format!(
                "cannot add member: group has reached its maximum size of {}",
                self.max_size
            )));
        }
        if self.members.contains(&person) {
            return Err(CohortError::GroupState(format!(
                "person {} is already a member of this group",
                person.index()
            )));
        }
        self.members.push(person);
        Ok(())
    }

    /// Removes `person` from the member list. Fails if they are not a
    /// member. Does not recompute cached metrics or touch the back-reference.
    pub(crate) fn pop_member(&mut self, person: PersonId) -> Result<()> {
        let pos = self
            .members
            .iter()
            .position(|&m| m == person)
            .ok_or_else(|| {
                CohortError::GroupState(format!(
                    "person {} is not a member of this group",
                    person.index()
                ))
            })?;
        self.members.remove(pos);
        Ok(())
    }

    /// The intra-group pair with the highest PCS, if any (ties broken by
    /// stable iteration order over the member list: the first-encountered
    /// pair wins, matching `least_compatible_pair`'s tie-break).
    ///
    /// A manual fold is used instead of `Iterator::max_by` because
    /// `max_by` keeps the *last* maximal element on ties, which would
    /// tie-break the opposite way from `min_by` below.
    pub fn most_compatible_pair(&self, pairs: &PairTable) -> Option<&crate::pair::Pair> {
        self.intra_pairs()
            .filter_map(|key| pairs.lookup(key.a(), key.b()))
            .fold(None, |best, candidate| match best {
                None => Some(candidate),
                Some(current) if candidate.pcs() > current.pcs() => Some(candidate),
                Some(current) => Some(current),
            })
    }

    /// The intra-group pair with the lowest PCS, if any (ties broken by
    /// stable iteration order over the member list).
    pub fn least_compatible_pair(&self, pairs: &PairTable) -> Option<&crate::pair::Pair> {
        self.intra_pairs()
            .filter_map(|key| pairs.lookup(key.a(), key.b()))
            .min_by(|a, b| a.pcs().partial_cmp(&b.pcs()).unwrap())
    }
}
