//! Property-based tests for the cohort compatibility engine.
//!
//! These use proptest to verify the universal properties from the
//! specification hold across randomly generated cohorts, rather than
//! just the handful of fixed examples in the unit tests.

use proptest::prelude::*;

use cohort_core::{Attribute, AttributeCatalog, Cohort, CohortOptions, Person};

/// A catalog with a single binary attribute; `weight` and whether the
/// compatibility matrix carries negative entries are both varied so the
/// clamp and flexibility formulas see both signs.
fn camp_catalog(weight: f64, negative_entries: bool) -> AttributeCatalog {
    let off_diagonal = if negative_entries { -1.0 } else { 0.0 };
    let camp = Attribute::new(
        "camp",
        "",
        vec!["X".into(), "Y".into()],
        vec![vec![1.0, off_diagonal], vec![off_diagonal, 1.0]],
        weight,
        true,
    )
    .unwrap();
    AttributeCatalog::build(vec![camp], &["camp".to_string()]).unwrap()
}

fn people_strategy(max_n: usize) -> impl Strategy<Value = Vec<(String, bool, u8)>> {
    prop::collection::vec(
        ("[A-Za-z0-9]{0,8}", any::<bool>(), 1u8..=10u8),
        2..=max_n,
    )
}

fn build_people(specs: &[(String, bool, u8)], catalog: &AttributeCatalog) -> Vec<Person> {
    let camp = catalog.find_by_name("camp").unwrap();
    specs
        .iter()
        .enumerate()
        .map(|(i, (name, is_x, flex))| {
            let mut p = Person::new(if name.is_empty() { format!("P{i}") } else { name.clone() }, i as i64);
            p.update_selection(camp, if *is_x { "X" } else { "Y" }).unwrap();
            p.update_flexibility(camp, *flex).unwrap();
            p
        })
        .collect()
}

proptest! {
    /// Property 1: pair lookup is order-independent — PairTable::lookup(p, q)
    /// and PairTable::lookup(q, p) are the identical `Pair`.
    #[test]
    fn pair_lookup_is_symmetric(specs in people_strategy(8), weight in 0.0f64..=1.0, negative in any::<bool>()) {
        let catalog = camp_catalog(weight, negative);
        let people = build_people(&specs, &catalog);
        let cohort = Cohort::new(people, catalog, 1, specs.len()).unwrap();

        for pair in cohort.pairs().iter() {
            let (p1, p2) = (pair.p1(), pair.p2());
            let via_pq = cohort.pair(p1, p2);
            let via_qp = cohort.pair(p2, p1);
            prop_assert!(via_pq.is_some());
            prop_assert!(std::ptr::eq(via_pq.unwrap(), via_qp.unwrap()));
        }
    }

    /// Property 2: PCS is the weighted sum of adjusted per-attribute
    /// scores over the active attribute set, within 1e-9, for every pair.
    #[test]
    fn pcs_matches_weighted_sum_of_adjusted_scores(specs in people_strategy(8), weight in 0.0f64..=1.0, negative in any::<bool>()) {
        let catalog = camp_catalog(weight, negative);
        let people = build_people(&specs, &catalog);
        let cohort = Cohort::with_options(
            people,
            catalog.clone(),
            1,
            specs.len(),
            CohortOptions { clamp_negative_pcs: false, ..Default::default() },
        ).unwrap();

        for pair in cohort.pairs().iter() {
            let expected: f64 = catalog
                .active()
                .map(|a| pair.selection_scores()[&a.id()] * a.weight())
                .sum();
            prop_assert!((pair.pcs() - expected).abs() < 1e-9);
        }
    }

    /// Property 5 & 6: when capacity at nMax is sufficient, the greedy
    /// allocator places everyone exactly once and never exceeds nMax.
    #[test]
    fn greedy_partition_invariant_when_feasible(specs in people_strategy(12), n_max in 2usize..=6) {
        let n = specs.len();
        let n_min = 1usize.max(n_max.saturating_sub(1));

        let catalog = camp_catalog(1.0, false);
        let people = build_people(&specs, &catalog);
        let mut cohort = Cohort::new(people, catalog, n_min, n_max).unwrap();

        if cohort.allocate_greedy().is_ok() {
            let assigned = cohort.people().iter().filter(|p| p.group().is_some()).count();
            prop_assert_eq!(assigned, n);
            for group in cohort.groups() {
                prop_assert!(group.size() <= n_max);
            }

            // Property 6 (size bounds): at most one group may fall below nMin.
            let undersized = cohort.groups().iter().filter(|g| g.size() < n_min).count();
            prop_assert!(undersized <= 1);
        }
    }

    /// Property 8: Cohort::gcs_variance always equals the population
    /// variance of the per-group GCS values, recomputed independently.
    #[test]
    fn cohort_variance_matches_population_variance_of_group_gcs(specs in people_strategy(10), n_max in 2usize..=5) {
        let n = specs.len();
        let n_min = 1usize.max(n_max.saturating_sub(1));
        let catalog = camp_catalog(1.0, false);
        let people = build_people(&specs, &catalog);
        let mut cohort = Cohort::new(people, catalog, n_min, n_max).unwrap();

        if cohort.allocate_greedy().is_ok() {
            let scores: Vec<f64> = cohort.groups().iter().map(|g| g.gcs()).collect();
            let expected = if scores.len() < 2 {
                0.0
            } else {
                let mean = scores.iter().sum::<f64>() / scores.len() as f64;
                scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / scores.len() as f64
            };
            prop_assert!((cohort.gcs_variance() - expected).abs() < 1e-9);
        }
    }

    /// Property 7: identical inputs and seed reproduce identical group
    /// memberships and identical GCS variance from `allocate_sa`.
    #[test]
    fn sa_is_deterministic_given_a_seed(specs in people_strategy(10), seed in any::<u64>()) {
        let n = specs.len();
        let n_max = 4usize.min(n).max(2);
        let n_min = 1usize.max(n_max.saturating_sub(1));

        let catalog_a = camp_catalog(1.0, true);
        let people_a = build_people(&specs, &catalog_a);
        let mut cohort_a = Cohort::new(people_a, catalog_a, n_min, n_max).unwrap();

        let catalog_b = camp_catalog(1.0, true);
        let people_b = build_people(&specs, &catalog_b);
        let mut cohort_b = Cohort::new(people_b, catalog_b, n_min, n_max).unwrap();

        if cohort_a.allocate_greedy().is_ok() && cohort_b.allocate_greedy().is_ok() {
            cohort_a.allocate_sa(seed).unwrap();
            cohort_b.allocate_sa(seed).unwrap();

            let membership = |c: &Cohort| -> Vec<Vec<i64>> {
                c.groups()
                    .iter()
                    .map(|g| g.members().iter().map(|&id| c.people()[id.index()].identifier()).collect())
                    .collect()
            };

            prop_assert_eq!(membership(&cohort_a), membership(&cohort_b));
            prop_assert!((cohort_a.gcs_variance() - cohort_b.gcs_variance()).abs() < 1e-9);
        }
    }
}
