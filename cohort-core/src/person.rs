//! Persons: the individuals being partitioned into groups.

use std::collections::HashMap;

use crate::attribute::{Attribute, AttributeId};
use crate::error::{CohortError, Result};

/// Stable identifier for a [`Person`] within a [`crate::Cohort`] — its
/// index in the cohort's people list. Identity here is positional, not
/// the source's object identity; a canonical, `Copy` identifier is what
/// lets [`crate::PairTable`] key pairs without a two-way lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersonId(pub(crate) usize);

impl PersonId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Stable identifier for a [`crate::Group`] within a [`crate::Cohort`] — its
/// index in the cohort's group list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub(crate) usize);

impl GroupId {
    pub fn index(self) -> usize {
        self.0
    }
}

const DEFAULT_FLEXIBILITY: u8 = 10;

/// A person carrying per-attribute selections and flexibility scores, plus
/// a back-reference to whichever group currently contains them.
///
/// Mutating a person's selections or flexibility after it has been handed
/// to a [`crate::Cohort`] is not supported: pair scores are computed once,
/// eagerly, at cohort construction, and will not reflect the change.
#[derive(Debug, Clone)]
pub struct Person {
    name: String,
    identifier: i64,
    selections: HashMap<AttributeId, String>,
    flexibility_scores: HashMap<AttributeId, u8>,
    pub(crate) group: Option<GroupId>,
}

impl Person {
    pub fn new(name: impl Into<String>, identifier: i64) -> Self {
        Person {
            name: name.into(),
            identifier,
            selections: HashMap::new(),
            flexibility_scores: HashMap::new(),
            group: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn identifier(&self) -> i64 {
        self.identifier
    }

    /// The group currently containing this person, if any. Maintained by
    /// `Cohort`'s group mutators, never by the caller.
    pub fn group(&self) -> Option<GroupId> {
        self.group
    }

    pub fn get_selection(&self, attribute: &Attribute) -> Option<&str> {
        self.selections.get(&attribute.id()).map(String::as_str)
    }

    /// Flexibility for `attribute`, defaulting to 10 (fully flexible) when
    /// the person has not set one.
    pub fn get_flexibility(&self, attribute: &Attribute) -> u8 {
        self.flexibility_scores
            .get(&attribute.id())
            .copied()
            .unwrap_or(DEFAULT_FLEXIBILITY)
    }

    /// Sets the selection for `attribute`. Fails if `selection` is not one
    /// of the attribute's declared selections.
    pub fn update_selection(&mut self, attribute: &Attribute, selection: impl Into<String>) -> Result<()> {
        let selection = selection.into();
        if !attribute.has_selection(&selection) {
            return Err(CohortError::Validation(format!(
                "'{selection}' is not a valid selection for attribute '{}'",
                attribute.name()
            )));
        }
        self.selections.insert(attribute.id(), selection);
        Ok(())
    }

    /// Sets the flexibility score for `attribute`. Fails if `score` is
    /// outside `[1, 10]`.
    pub fn update_flexibility(&mut self, attribute: &Attribute, score: u8) -> Result<()> {
        if !(1..=10).contains(&score) {
            return Err(CohortError::Validation(format!(
                "flexibility score must be between 1 and 10, received {score}"
            )));
        }
        self.flexibility_scores.insert(attribute.id(), score);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::Attribute;

    fn time_attribute() -> Attribute {
        let mut a = Attribute::new(
            "time",
            "",
            vec!["AM".into(), "PM".into()],
            vec![vec![1.0, 0.0], vec![0.0, 1.0]],
            1.0,
            true,
        )
        .unwrap();
        // Simulate catalog assignment of a stable id.
        a.set_weight(a.weight()).unwrap();
        a
    }

    #[test]
    fn default_flexibility_is_ten() {
        let p = Person::new("Alice", 1);
        let time = time_attribute();
        assert_eq!(p.get_flexibility(&time), 10);
        assert_eq!(p.get_selection(&time), None);
    }

    #[test]
    fn update_selection_validates_membership() {
        let mut p = Person::new("Alice", 1);
        let time = time_attribute();
        assert!(p.update_selection(&time, "AM").is_ok());
        assert_eq!(p.get_selection(&time), Some("AM"));
        assert!(p.update_selection(&time, "evening").is_err());
    }

    #[test]
    fn update_flexibility_validates_range() {
        let mut p = Person::new("Alice", 1);
        let time = time_attribute();
        assert!(p.update_flexibility(&time, 0).is_err());
        assert!(p.update_flexibility(&time, 11).is_err());
        assert!(p.update_flexibility(&time, 5).is_ok());
        assert_eq!(p.get_flexibility(&time), 5);
    }
}
