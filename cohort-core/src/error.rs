//! Error taxonomy for the cohort compatibility engine.
//!
//! Every fallible operation in this crate returns a [`CohortError`]. The
//! variants correspond to the error taxonomy described for this engine:
//! validation failures on construction, missing pair-scoring data, illegal
//! state transitions on groups, and allocator failures. The single
//! "out-of-range metric" case (cohort variance requested with fewer than
//! two groups) is not an error at all — it is defined to return `0.0` — so
//! it has no variant here.

use thiserror::Error;

/// Errors that can occur while building or mutating a cohort.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CohortError {
    /// An attribute, weight, or selection update failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Pair scoring was requested for an attribute with no recorded
    /// selection on one or both persons.
    #[error("missing selection for attribute '{attribute}' on person '{person}'")]
    MissingSelection { attribute: String, person: String },

    /// A group mutation violated the group's invariants: overflow,
    /// double membership, or removing a non-member.
    #[error("group state error: {0}")]
    GroupState(String),

    /// The greedy allocator could not place every person because total
    /// capacity (`nGroups * nMax`) was smaller than the cohort size.
    #[error("allocator could not place {unplaced} of {total} people: capacity is {capacity}")]
    Unplaceable {
        unplaced: usize,
        total: usize,
        capacity: usize,
    },
}

pub type Result<T> = std::result::Result<T, CohortError>;
