//! Attributes and the attribute catalog.
//!
//! An [`Attribute`] is one dimension of compatibility: a nonempty ordered
//! list of selections, a square compatibility matrix over those
//! selections, a weight in `[0, 1]`, and a description. An
//! [`AttributeCatalog`] holds every declared attribute and tracks which of
//! them are active (participate in scoring) versus inactive.

use crate::error::{CohortError, Result};

/// Stable identifier for an [`Attribute`] within an [`AttributeCatalog`].
///
/// This is the attribute's index in the catalog's `options` list, assigned
/// once at catalog construction and never reused. Using an index instead
/// of object identity (the source language's approach) lets [`crate::Person`]
/// and [`crate::Pair`] key their per-attribute maps on a small `Copy` type
/// instead of threading `Attribute` references through the ownership graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeId(pub(crate) usize);

/// A named dimension of compatibility with a caller-supplied scoring
/// matrix over its selections.
#[derive(Debug, Clone)]
pub struct Attribute {
    id: AttributeId,
    name: String,
    description: String,
    selections: Vec<String>,
    /// `compatibility_matrix[i][j]` is the score for `(selections[i], selections[j])`.
    compatibility_matrix: Vec<Vec<f64>>,
    weight: f64,
    enabled_by_default: bool,
}

impl Attribute {
    /// Builds a new attribute, validating the invariants from the data
    /// model: a nonempty selection list, a matrix with one row and one
    /// column per selection, and a weight in `[0, 1]`.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        selections: Vec<String>,
        compatibility_matrix: Vec<Vec<f64>>,
        weight: f64,
        enabled_by_default: bool,
    ) -> Result<Self> {
        let name = name.into();

        if selections.is_empty() {
            return Err(CohortError::Validation(format!(
                "attribute '{name}' has an empty selection list"
            )));
        }

        let n = selections.len();
        if compatibility_matrix.len() != n
            || compatibility_matrix.iter().any(|row| row.len() != n)
        {
            return Err(CohortError::Validation(format!(
                "attribute '{name}' compatibility matrix must be {n}x{n} to match its {n} selections"
            )));
        }

        if !(0.0..=1.0).contains(&weight) {
            return Err(CohortError::Validation(format!(
                "attribute '{name}' weight {weight} is outside [0, 1]"
            )));
        }

        Ok(Attribute {
            id: AttributeId(0), // overwritten by AttributeCatalog::build
            name,
            description: description.into(),
            selections,
            compatibility_matrix,
            weight,
            enabled_by_default,
        })
    }

    pub fn id(&self) -> AttributeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn selections(&self) -> &[String] {
        &self.selections
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Recorded only for completeness; the external loader is the only
    /// consumer of this flag (§3 of the data model).
    pub fn enabled_by_default(&self) -> bool {
        self.enabled_by_default
    }

    fn selection_index(&self, selection: &str) -> Option<usize> {
        self.selections.iter().position(|s| s == selection)
    }

    pub fn has_selection(&self, selection: &str) -> bool {
        self.selection_index(selection).is_some()
    }

    /// Looks up `compatibility_matrix[s1][s2]`.
    ///
    /// The order of `s1`/`s2` matters: the matrix is not required to be
    /// symmetric, and the canonical-pair-ordering convention (the
    /// row selection belongs to whichever person the pair treats as
    /// "first") is the caller's responsibility to preserve. See
    /// `Pair::raw` for where that ordering is fixed.
    pub(crate) fn selection_score(&self, s1: &str, s2: &str) -> Result<f64> {
        let i = self.selection_index(s1).ok_or_else(|| {
            CohortError::Validation(format!(
                "'{s1}' is not a valid selection for attribute '{}'",
                self.name
            ))
        })?;
        let j = self.selection_index(s2).ok_or_else(|| {
            CohortError::Validation(format!(
                "'{s2}' is not a valid selection for attribute '{}'",
                self.name
            ))
        })?;
        Ok(self.compatibility_matrix[i][j])
    }

    /// Overrides this attribute's weight, re-validating it is in `[0, 1]`.
    /// Exposed for external loaders applying a customization overlay
    /// before the attribute is handed to
    /// [`AttributeCatalog::build`].
    pub fn set_weight(&mut self, weight: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&weight) {
            return Err(CohortError::Validation(format!(
                "attribute '{}' weight {weight} is outside [0, 1]",
                self.name
            )));
        }
        self.weight = weight;
        Ok(())
    }
}

/// The full set of declared attributes, split into the subset that
/// actually participates in scoring (`active`) and the rest (`inactive`).
///
/// Immutable once handed to a [`crate::Cohort`]. Iteration order over
/// `active()` is the catalog's insertion order, and every scoring
/// consumer (pair, group, cohort) relies on that order being stable.
#[derive(Debug, Clone)]
pub struct AttributeCatalog {
    options: Vec<Attribute>,
    active: Vec<AttributeId>,
    inactive: Vec<AttributeId>,
}

impl AttributeCatalog {
    /// Builds a catalog from the full option list and the subset of names
    /// that should be active. Every name in `active_subset` must name an
    /// attribute present in `options`; anything in `options` not named is
    /// inactive.
    pub fn build(mut options: Vec<Attribute>, active_subset: &[String]) -> Result<Self> {
        for (idx, attr) in options.iter_mut().enumerate() {
            attr.id = AttributeId(idx);
        }

        let mut active = Vec::with_capacity(active_subset.len());
        for name in active_subset {
            let attr = options.iter().find(|a| &a.name == name).ok_or_else(|| {
                CohortError::Validation(format!(
                    "active attribute '{name}' is not present in the catalog's options"
                ))
            })?;
            active.push(attr.id());
        }

        let inactive = options
            .iter()
            .map(Attribute::id)
            .filter(|id| !active.contains(id))
            .collect();

        Ok(AttributeCatalog {
            options,
            active,
            inactive,
        })
    }

    /// All active attributes, in stable insertion order.
    pub fn active(&self) -> impl Iterator<Item = &Attribute> {
        self.active.iter().map(move |id| &self.options[id.0])
    }

    /// Every declared attribute, active or not, in stable insertion order.
    pub fn options(&self) -> &[Attribute] {
        &self.options
    }

    /// Attributes declared but not active.
    pub fn inactive(&self) -> impl Iterator<Item = &Attribute> {
        self.inactive.iter().map(move |id| &self.options[id.0])
    }

    pub(crate) fn get(&self, id: AttributeId) -> &Attribute {
        &self.options[id.0]
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Attribute> {
        self.options.iter().find(|a| a.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binary_attribute(weight: f64) -> Result<Attribute> {
        Attribute::new(
            "time",
            "meeting time preference",
            vec!["AM".to_string(), "PM".to_string()],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            weight,
            true,
        )
    }

    #[test]
    fn rejects_empty_selections() {
        let err = Attribute::new("x", "", vec![], vec![], 0.5, true).unwrap_err();
        assert!(matches!(err, CohortError::Validation(_)));
    }

    #[test]
    fn rejects_non_square_matrix() {
        let err = Attribute::new(
            "x",
            "",
            vec!["a".into(), "b".into()],
            vec![vec![1.0, 0.0]],
            0.5,
            true,
        )
        .unwrap_err();
        assert!(matches!(err, CohortError::Validation(_)));
    }

    #[test]
    fn rejects_weight_out_of_range() {
        assert!(binary_attribute(1.5).is_err());
        assert!(binary_attribute(-0.1).is_err());
    }

    #[test]
    fn catalog_splits_active_and_inactive() {
        let time = binary_attribute(1.0).unwrap();
        let mode = Attribute::new(
            "mode",
            "",
            vec!["online".into(), "inperson".into()],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            0.5,
            false,
        )
        .unwrap();

        let catalog =
            AttributeCatalog::build(vec![time, mode], &["time".to_string()]).unwrap();

        assert_eq!(catalog.active().count(), 1);
        assert_eq!(catalog.inactive().count(), 1);
        assert_eq!(catalog.active().next().unwrap().name(), "time");
        assert_eq!(catalog.inactive().next().unwrap().name(), "mode");
    }

    #[test]
    fn catalog_rejects_unknown_active_name() {
        let time = binary_attribute(1.0).unwrap();
        let err = AttributeCatalog::build(vec![time], &["nonexistent".to_string()]).unwrap_err();
        assert!(matches!(err, CohortError::Validation(_)));
    }
}
