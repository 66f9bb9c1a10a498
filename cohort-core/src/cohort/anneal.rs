//! The simulated-annealing refiner: reduces cohort-level GCS variance by
//! repeatedly swapping one member between two randomly chosen groups.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::Cohort;
use crate::error::Result;
use crate::person::{GroupId, PersonId};

/// Which direction the acceptance rule for a worsening swap runs.
///
/// Accepting a worse swap (higher variance) is done with
/// probability `1 - exp((V - V') / T)`, rejecting it with probability
/// `exp((V - V') / T)` — the inverse of canonical Metropolis, which
/// *accepts* worse moves with probability `exp((V - V') / T)`. `Canonical`
/// implements the textbook rule; `SourceReplica` reproduces the inverted
/// rule literally. See `DESIGN.md` for why `Canonical` is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetropolisDirection {
    /// Accept a worse swap with probability `exp((V - V') / T)`.
    Canonical,
    /// Accept a worse swap with probability `1 - exp((V - V') / T)`,
    /// matching the source's literal (inverted) acceptance rule.
    SourceReplica,
}

impl Default for MetropolisDirection {
    fn default() -> Self {
        MetropolisDirection::Canonical
    }
}

/// Tunables for [`Cohort::allocate_sa_with`]. [`Default`] reproduces the
/// source's literal defaults (`T0 = 100.0`, `alpha = 0.95`, `T_min = 0.01`).
#[derive(Debug, Clone, Copy)]
pub struct AnnealParams {
    pub initial_temperature: f64,
    pub cooling_rate: f64,
    pub min_temperature: f64,
}

impl Default for AnnealParams {
    fn default() -> Self {
        AnnealParams {
            initial_temperature: 100.0,
            cooling_rate: 0.95,
            min_temperature: 0.01,
        }
    }
}

impl Cohort {
    /// Runs the simulated-annealing refiner with the default
    /// parameters and a caller-supplied seed.
    ///
    /// Deterministic: the refiner seeds a [`ChaCha8Rng`] from `seed`, so
    /// identical inputs and seed reproduce identical group memberships
    /// and `gcs_variance`, so repeated runs and parallel callers agree.
    pub fn allocate_sa(&mut self, seed: u64) -> Result<()> {
        self.allocate_sa_with(seed, AnnealParams::default())
    }

    /// As [`Cohort::allocate_sa`], with the temperature schedule made
    /// explicit.
    ///
    /// Each step picks two distinct, nonempty groups and one member from
    /// each uniformly at random, swaps them, and recomputes the cohort's
    /// GCS variance. The swap is kept or reverted per
    /// `self.options.metropolis_direction`; the loop runs until the
    /// temperature decays below `params.min_temperature`.
    pub fn allocate_sa_with(&mut self, seed: u64, params: AnnealParams) -> Result<()> {
        if self.groups.len() < 2 {
            self.recompute_cohort_metrics();
            return Ok(());
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut temperature = params.initial_temperature;
        let mut current_variance = self.gcs_variance();

        while temperature > params.min_temperature {
            let g1 = rng.random_range(0..self.groups.len());
            let mut g2 = rng.random_range(0..self.groups.len());
            while g2 == g1 {
                g2 = rng.random_range(0..self.groups.len());
            }

            if self.groups[g1].size() == 0 || self.groups[g2].size() == 0 {
                temperature *= params.cooling_rate;
                continue;
            }

            let p1 = self.groups[g1].members()[rng.random_range(0..self.groups[g1].size())];
            let p2 = self.groups[g2].members()[rng.random_range(0..self.groups[g2].size())];

            self.swap_members(GroupId(g1), p1, GroupId(g2), p2)?;
            let new_variance = self.gcs_variance();

            let keep_swap = if new_variance < current_variance {
                true
            } else {
                // delta <= 0 here, so p is in (0, 1].
                let p = ((current_variance - new_variance) / temperature).exp();
                match self.options.metropolis_direction {
                    MetropolisDirection::Canonical => rng.random::<f64>() < p,
                    MetropolisDirection::SourceReplica => rng.random::<f64>() >= p,
                }
            };

            if keep_swap {
                log::debug!(
                    "T={temperature:.4}: accepted swap between groups {g1}/{g2}, variance {current_variance:.6} -> {new_variance:.6}"
                );
                current_variance = new_variance;
            } else {
                self.swap_members(GroupId(g1), p2, GroupId(g2), p1)?;
                current_variance = self.gcs_variance();
                log::debug!(
                    "T={temperature:.4}: rejected swap between groups {g1}/{g2}, variance held at {current_variance:.6}"
                );
            }

            temperature *= params.cooling_rate;
        }

        self.recompute_cohort_metrics();
        Ok(())
    }

    fn swap_members(&mut self, g1: GroupId, p1: PersonId, g2: GroupId, p2: PersonId) -> Result<()> {
        self.remove_member(g1, p1)?;
        self.remove_member(g2, p2)?;
        self.add_member(g1, p2)?;
        self.add_member(g2, p1)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::{Attribute, AttributeCatalog};
    use crate::person::Person;

    /// Two camps that clash perfectly across camps and match perfectly
    /// within a camp, so the greedy allocator produces groups with very
    /// unequal GCS when capacity forces a mixed group.
    fn camp_catalog() -> AttributeCatalog {
        let camp = Attribute::new(
            "camp",
            "",
            vec!["X".into(), "Y".into()],
            vec![vec![1.0, -1.0], vec![-1.0, 1.0]],
            1.0,
            true,
        )
        .unwrap();
        AttributeCatalog::build(vec![camp], &["camp".to_string()]).unwrap()
    }

    fn lopsided_cohort() -> Cohort {
        let catalog = camp_catalog();
        let camp = catalog.find_by_name("camp").unwrap();

        let mut people = Vec::new();
        for i in 0..4 {
            let mut p = Person::new(format!("X{i}"), i as i64);
            p.update_selection(camp, "X").unwrap();
            p.update_flexibility(camp, 1).unwrap();
            people.push(p);
        }
        for i in 0..4 {
            let mut p = Person::new(format!("Y{i}"), (i + 4) as i64);
            p.update_selection(camp, "Y").unwrap();
            p.update_flexibility(camp, 1).unwrap();
            people.push(p);
        }

        let options = super::super::CohortOptions {
            clamp_negative_pcs: false,
            ..Default::default()
        };
        let mut cohort = Cohort::with_options(people, catalog, 2, 3, options).unwrap();
        cohort.allocate_greedy().unwrap();
        cohort
    }

    #[test]
    fn s5_sa_does_not_increase_variance() {
        let mut cohort = lopsided_cohort();
        let greedy_variance = cohort.gcs_variance();

        cohort.allocate_sa(42).unwrap();
        assert!(cohort.gcs_variance() <= greedy_variance + 1e-9);
    }

    #[test]
    fn determinism_same_seed_same_result() {
        let mut a = lopsided_cohort();
        let mut b = lopsided_cohort();

        a.allocate_sa(42).unwrap();
        b.allocate_sa(42).unwrap();

        let names = |c: &Cohort| -> Vec<Vec<&str>> {
            c.groups()
                .iter()
                .map(|g| {
                    g.members()
                        .iter()
                        .map(|&id| c.people()[id.index()].name())
                        .collect()
                })
                .collect()
        };

        assert_eq!(names(&a), names(&b));
        assert!((a.gcs_variance() - b.gcs_variance()).abs() < 1e-9);
    }

    #[test]
    fn size_bounds_hold_throughout() {
        let mut cohort = lopsided_cohort();
        cohort.allocate_sa(7).unwrap();
        for group in cohort.groups() {
            assert!(group.size() <= cohort.n_max());
        }
    }

    #[test]
    fn no_groups_is_a_no_op() {
        let catalog = camp_catalog();
        let camp = catalog.find_by_name("camp").unwrap();
        let mut p0 = Person::new("A", 0);
        p0.update_selection(camp, "X").unwrap();
        let mut p1 = Person::new("B", 1);
        p1.update_selection(camp, "Y").unwrap();

        let mut cohort = Cohort::new(vec![p0, p1], catalog, 1, 2).unwrap();
        assert!(cohort.allocate_sa(1).is_ok());
        assert_eq!(cohort.gcs_variance(), 0.0);
    }
}
