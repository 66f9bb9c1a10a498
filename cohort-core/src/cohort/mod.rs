//! The [`Cohort`]: the full population under allocation.
//!
//! A `Cohort` owns its people, its [`AttributeCatalog`], the eagerly
//! materialized [`PairTable`], and the current groups. It is the only
//! thing in this crate that mutates group membership or a person's group
//! back-reference — see the module doc on [`crate::group::Group`] for why.

mod anneal;
mod greedy;

pub use anneal::{AnnealParams, MetropolisDirection};

use crate::attribute::AttributeCatalog;
use crate::error::{CohortError, Result};
use crate::group::Group;
use crate::pair::{Pair, PairKey, PairTable};
use crate::person::{GroupId, Person, PersonId};

/// Tunables that don't change the documented API surface but resolve the
/// open design questions. Defaults reproduce the source's literal
/// behavior; see `DESIGN.md` for the reasoning behind each default.
#[derive(Debug, Clone, Copy)]
pub struct CohortOptions {
    /// Whether `PCS_raw`/`PCS` are clamped to `0.0` when their weighted
    /// sum is non-positive. Default `true`, matching the source. Set to
    /// `false` to preserve negative signal from matrices with negative
    /// entries.
    pub clamp_negative_pcs: bool,
    /// Which direction the simulated-annealing acceptance rule runs.
    /// Default [`MetropolisDirection::Canonical`].
    pub metropolis_direction: MetropolisDirection,
}

impl Default for CohortOptions {
    fn default() -> Self {
        CohortOptions {
            clamp_negative_pcs: true,
            metropolis_direction: MetropolisDirection::default(),
        }
    }
}

/// The full cohort under allocation: people, attribute catalog, pair
/// table, and the current group partition.
#[derive(Debug, Clone)]
pub struct Cohort {
    people: Vec<Person>,
    catalog: AttributeCatalog,
    pairs: PairTable,
    groups: Vec<Group>,
    n_min: usize,
    n_max: usize,
    gcs_mean: f64,
    gcs_variance: f64,
    options: CohortOptions,
}

impl Cohort {
    /// Builds a cohort over `people` and `catalog`, eagerly materializing
    /// the pair table. Fails if `n_min`/`n_max` are degenerate, or if pair
    /// scoring hits a missing selection anywhere in the cohort (a fatal
    /// fatal error).
    pub fn new(
        people: Vec<Person>,
        catalog: AttributeCatalog,
        n_min: usize,
        n_max: usize,
    ) -> Result<Self> {
        Self::with_options(people, catalog, n_min, n_max, CohortOptions::default())
    }

    /// As [`Cohort::new`], with the open-question tunables in
    /// [`CohortOptions`] made explicit.
    pub fn with_options(
        people: Vec<Person>,
        catalog: AttributeCatalog,
        n_min: usize,
        n_max: usize,
        options: CohortOptions,
    ) -> Result<Self> {
        if n_min == 0 {
            return Err(CohortError::Validation(
                "nMin must be at least 1".to_string(),
            ));
        }
        if n_max == 0 {
            return Err(CohortError::Validation(
                "nMax must be at least 1".to_string(),
            ));
        }
        // Deliberately does not require n_max >= n_min: a caller that passes
        // nMax < nMin has a degenerate but constructible cohort, and the
        // greedy allocator's capacity check (nGroups * nMax < N) is what
        // surfaces that misconfiguration, as `CohortError::Unplaceable`,
        // rather than rejecting it here. See the "greedy
        // under-capacity" open question.

        let pairs = PairTable::build_with_clamp(&people, &catalog, options.clamp_negative_pcs)?;

        Ok(Cohort {
            people,
            catalog,
            pairs,
            groups: Vec::new(),
            n_min,
            n_max,
            gcs_mean: 0.0,
            gcs_variance: 0.0,
            options,
        })
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn catalog(&self) -> &AttributeCatalog {
        &self.catalog
    }

    pub fn pairs(&self) -> &PairTable {
        &self.pairs
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    /// The stable `PersonId` for `people()[index]`. Indices are assigned
    /// once, at construction, in the order `people` was passed in.
    pub fn person_id_at(&self, index: usize) -> Option<PersonId> {
        (index < self.people.len()).then_some(PersonId(index))
    }

    /// Finds the `PersonId` of the (first) person with the given
    /// `identifier`. Identifier uniqueness is the caller's responsibility
    /// per the data model; this returns the first match.
    pub fn person_id_by_identifier(&self, identifier: i64) -> Option<PersonId> {
        self.people
            .iter()
            .position(|p| p.identifier() == identifier)
            .map(PersonId)
    }

    /// The stable `GroupId` for `groups()[index]`.
    pub fn group_id_at(&self, index: usize) -> Option<GroupId> {
        (index < self.groups.len()).then_some(GroupId(index))
    }

    pub fn n_min(&self) -> usize {
        self.n_min
    }

    pub fn n_max(&self) -> usize {
        self.n_max
    }

    /// Arithmetic mean of GCS across groups; `0.0` if there are no groups
    /// yet.
    pub fn gcs_mean(&self) -> f64 {
        self.gcs_mean
    }

    /// Population variance of GCS across groups; `0.0` when there are
    /// fewer than two groups. Not an error case — see the
    /// out-of-range-metric note.
    pub fn gcs_variance(&self) -> f64 {
        self.gcs_variance
    }

    pub fn pair(&self, p: PersonId, q: PersonId) -> Option<&Pair> {
        self.pairs.lookup(p, q)
    }

    /// Adds `person` to `group`. Fails on overflow or if the person is
    /// already a member of that specific group's list (distinct from the
    /// global group back-reference check `add_pair` performs).
    pub fn add_member(&mut self, group: GroupId, person: PersonId) -> Result<()> {
        self.groups[group.index()].push_member(person)?;
        self.groups[group.index()].recompute(&self.pairs);
        self.people[person.index()].group = Some(group);
        self.recompute_cohort_metrics();
        Ok(())
    }

    /// Removes `person` from `group`. Fails if they are not a member.
    pub fn remove_member(&mut self, group: GroupId, person: PersonId) -> Result<()> {
        self.groups[group.index()].pop_member(person)?;
        self.groups[group.index()].recompute(&self.pairs);
        self.people[person.index()].group = None;
        self.recompute_cohort_metrics();
        Ok(())
    }

    /// For each endpoint of `pair`, adds it to `group` iff that person's
    /// global group back-reference is currently `None`; otherwise logs a
    /// non-fatal warning and skips that endpoint. This is the soft,
    /// revisit-tolerant variant the greedy allocator uses.
    pub fn add_pair(&mut self, group: GroupId, pair: PairKey) -> Result<()> {
        for person in [pair.a(), pair.b()] {
            if self.people[person.index()].group.is_none() {
                self.add_member(group, person)?;
            } else {
                log::warn!(
                    "person '{}' is already assigned to a group; skipping duplicate assignment",
                    self.people[person.index()].name()
                );
            }
        }
        Ok(())
    }

    fn recompute_cohort_metrics(&mut self) {
        if self.groups.is_empty() {
            self.gcs_mean = 0.0;
            self.gcs_variance = 0.0;
            return;
        }

        let scores: Vec<f64> = self.groups.iter().map(Group::gcs).collect();
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        self.gcs_mean = mean;
        self.gcs_variance = if scores.len() < 2 {
            0.0
        } else {
            scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / scores.len() as f64
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{Attribute, AttributeCatalog};

    fn tiny_catalog() -> AttributeCatalog {
        let time = Attribute::new(
            "time",
            "",
            vec!["AM".into(), "PM".into()],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            1.0,
            true,
        )
        .unwrap();
        AttributeCatalog::build(vec![time], &["time".to_string()]).unwrap()
    }

    fn people_all_am(n: usize, catalog: &AttributeCatalog) -> Vec<Person> {
        let time = catalog.find_by_name("time").unwrap();
        (0..n)
            .map(|i| {
                let mut p = Person::new(format!("P{i}"), i as i64);
                p.update_selection(time, "AM").unwrap();
                p
            })
            .collect()
    }

    #[test]
    fn rejects_degenerate_bounds() {
        let catalog = tiny_catalog();
        let people = people_all_am(2, &catalog);
        assert!(Cohort::new(people.clone(), catalog.clone(), 0, 3).is_err());
        assert!(Cohort::new(people, catalog, 3, 0).is_err());
    }

    #[test]
    fn accepts_n_max_below_n_min_as_a_constructible_but_degenerate_cohort() {
        // nMax < nMin is unusual but not rejected at construction; the
        // greedy allocator's capacity check is what catches it.
        let catalog = tiny_catalog();
        let people = people_all_am(2, &catalog);
        assert!(Cohort::new(people, catalog, 3, 2).is_ok());
    }

    #[test]
    fn gcs_variance_is_zero_below_two_groups() {
        let catalog = tiny_catalog();
        let people = people_all_am(2, &catalog);
        let mut cohort = Cohort::new(people, catalog, 2, 2).unwrap();
        cohort.groups.push(Group::new(2, 2));
        cohort.add_member(GroupId(0), PersonId(0)).unwrap();
        cohort.add_member(GroupId(0), PersonId(1)).unwrap();
        assert_eq!(cohort.gcs_variance(), 0.0);
    }

    #[test]
    fn add_pair_skips_already_assigned_endpoint() {
        let catalog = tiny_catalog();
        let people = people_all_am(3, &catalog);
        let mut cohort = Cohort::new(people, catalog, 1, 3).unwrap();
        cohort.groups.push(Group::new(1, 3));
        cohort.groups.push(Group::new(1, 3));

        cohort.add_member(GroupId(0), PersonId(0)).unwrap();
        // Person 0 is already assigned; add_pair should warn and skip them
        // while still placing person 1.
        let pair = PairKey::new(PersonId(0), PersonId(1));
        cohort.add_pair(GroupId(1), pair).unwrap();

        assert_eq!(cohort.people()[0].group(), Some(GroupId(0)));
        assert_eq!(cohort.people()[1].group(), Some(GroupId(1)));
    }
}
