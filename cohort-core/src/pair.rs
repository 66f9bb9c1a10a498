//! Pairwise compatibility scoring.
//!
//! A [`Pair`] is an unordered pair of persons together with their raw and
//! flexibility-adjusted per-attribute scores and the two derived scalars,
//! `PCS_raw` and `PCS`. A [`PairTable`] memoizes every pair in a cohort,
//! keyed canonically so lookup is order-independent.

use std::collections::HashMap;

use crate::attribute::{Attribute, AttributeCatalog, AttributeId};
use crate::error::{CohortError, Result};
use crate::person::{Person, PersonId};

/// Canonical, order-independent key for an unordered pair of persons.
///
/// `a()` is always the lower `PersonId`; `b()` the higher. This is the
/// "canonical ordering": removing the
/// need to probe both `(p, q)` and `(q, p)` on lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(PersonId, PersonId);

impl PairKey {
    /// Panics if `p == q`: a pair must be two distinct persons.
    pub fn new(p: PersonId, q: PersonId) -> Self {
        assert_ne!(p, q, "a pair must be two distinct persons");
        if p.index() < q.index() {
            PairKey(p, q)
        } else {
            PairKey(q, p)
        }
    }

    pub fn a(&self) -> PersonId {
        self.0
    }

    pub fn b(&self) -> PersonId {
        self.1
    }
}

/// A scored, unordered pair of persons.
///
/// Raw and adjusted scores are computed once, eagerly, when the pair is
/// built and never recomputed: changing a person's selection after the
/// owning cohort is constructed does not retroactively update any `Pair`.
#[derive(Debug, Clone)]
pub struct Pair {
    key: PairKey,
    raw_scores: HashMap<AttributeId, f64>,
    adj_scores: HashMap<AttributeId, f64>,
    pcs_raw: f64,
    pcs: f64,
}

impl Pair {
    pub fn key(&self) -> PairKey {
        self.key
    }

    pub fn p1(&self) -> PersonId {
        self.key.a()
    }

    pub fn p2(&self) -> PersonId {
        self.key.b()
    }

    /// Weighted sum of raw (pre-flexibility) per-attribute scores.
    pub fn pcs_raw(&self) -> f64 {
        self.pcs_raw
    }

    /// Weighted sum of flexibility-adjusted per-attribute scores. This is
    /// the scalar used everywhere else in the engine (group/cohort
    /// scoring, the allocators).
    pub fn pcs(&self) -> f64 {
        self.pcs
    }

    pub fn selection_scores_raw(&self) -> &HashMap<AttributeId, f64> {
        &self.raw_scores
    }

    pub fn selection_scores(&self) -> &HashMap<AttributeId, f64> {
        &self.adj_scores
    }

    /// Computes a pair's scores from scratch over `catalog`'s active
    /// attributes.
    ///
    /// `person_a`/`person_b` must be passed in the pair's canonical order
    /// (`key.a()`, `key.b()`): on matrix
    /// symmetry, the compatibility matrix is consulted as
    /// `C[sel(a)][sel(b)]`, not re-sorted by selection value, so callers
    /// that canonicalize by `PersonId` get a deterministic, order-stable
    /// result even for asymmetric matrices.
    fn compute(
        key: PairKey,
        person_a: &Person,
        person_b: &Person,
        catalog: &AttributeCatalog,
        clamp_negative: bool,
    ) -> Result<Pair> {
        let mut raw_scores = HashMap::new();
        let mut adj_scores = HashMap::new();
        let mut raw_sum = 0.0;
        let mut adj_sum = 0.0;

        for attribute in catalog.active() {
            let raw = raw_attribute_score(attribute, person_a, person_b)?;
            let adj = adjust_for_flexibility(attribute, person_a, person_b, raw);

            raw_sum += raw * attribute.weight();
            adj_sum += adj * attribute.weight();
            raw_scores.insert(attribute.id(), raw);
            adj_scores.insert(attribute.id(), adj);
        }

        let clamp = |v: f64| if clamp_negative && v <= 0.0 { 0.0 } else { v };

        Ok(Pair {
            key,
            raw_scores,
            adj_scores,
            pcs_raw: clamp(raw_sum),
            pcs: clamp(adj_sum),
        })
    }
}

fn raw_attribute_score(attribute: &Attribute, person_a: &Person, person_b: &Person) -> Result<f64> {
    let s1 = person_a.get_selection(attribute).ok_or_else(|| CohortError::MissingSelection {
        attribute: attribute.name().to_string(),
        person: person_a.name().to_string(),
    })?;
    let s2 = person_b.get_selection(attribute).ok_or_else(|| CohortError::MissingSelection {
        attribute: attribute.name().to_string(),
        person: person_b.name().to_string(),
    })?;
    attribute.selection_score(s1, s2)
}

/// `raw * (1 - max(flex_a, flex_b) / 10)`. A higher individual flexibility
/// *reduces* the attribute's contribution: the max (not average) is used
/// so one highly flexible member is enough to discount the attribute.
fn adjust_for_flexibility(attribute: &Attribute, person_a: &Person, person_b: &Person, raw: f64) -> f64 {
    let flex_a = person_a.get_flexibility(attribute) as f64;
    let flex_b = person_b.get_flexibility(attribute) as f64;
    raw * (1.0 - flex_a.max(flex_b) / 10.0)
}

/// Memoizes every pairwise [`Pair`] for a cohort, keyed canonically so
/// lookup doesn't care about argument order.
#[derive(Debug, Clone)]
pub struct PairTable {
    pairs: HashMap<PairKey, Pair>,
    clamp_negative: bool,
}

impl PairTable {
    /// Eagerly computes all `C(n, 2)` pairs for `people` (the PCS clamp
    /// enabled, matching the source behavior).
    pub fn build(people: &[Person], catalog: &AttributeCatalog) -> Result<Self> {
        Self::build_with_clamp(people, catalog, true)
    }

    /// As [`PairTable::build`], but lets the caller disable the
    /// non-positive-sum clamp —
    /// useful when compatibility matrices carry meaningful negative
    /// entries that should not be lost.
    pub fn build_with_clamp(
        people: &[Person],
        catalog: &AttributeCatalog,
        clamp_negative: bool,
    ) -> Result<Self> {
        let mut pairs = HashMap::with_capacity(people.len() * people.len() / 2);
        for i in 0..people.len() {
            for j in (i + 1)..people.len() {
                let key = PairKey::new(PersonId(i), PersonId(j));
                let pair = Pair::compute(key, &people[i], &people[j], catalog, clamp_negative)?;
                pairs.insert(key, pair);
            }
        }
        Ok(PairTable {
            pairs,
            clamp_negative,
        })
    }

    /// Looks up the pair for `(p, q)` regardless of argument order.
    pub fn lookup(&self, p: PersonId, q: PersonId) -> Option<&Pair> {
        self.pairs.get(&PairKey::new(p, q))
    }

    /// Looks up `(p, q)`, computing and storing it first if absent. Used
    /// for dynamic group edits that introduce a person outside the set
    /// the table was originally built over.
    pub fn lookup_or_insert(
        &mut self,
        p: PersonId,
        q: PersonId,
        people: &[Person],
        catalog: &AttributeCatalog,
    ) -> Result<&Pair> {
        let key = PairKey::new(p, q);
        if !self.pairs.contains_key(&key) {
            let pair = Pair::compute(
                key,
                &people[key.a().index()],
                &people[key.b().index()],
                catalog,
                self.clamp_negative,
            )?;
            self.pairs.insert(key, pair);
        }
        Ok(self.pairs.get(&key).expect("just inserted"))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Pair> {
        self.pairs.values()
    }
}
