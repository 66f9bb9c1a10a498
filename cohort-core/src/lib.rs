//! # cohort-core: compatibility scoring and group-allocation engine
//!
//! This crate partitions a cohort of people into bounded groups so that
//! each group's members are as mutually compatible as possible while
//! keeping group quality uniform across the cohort. It is a pure,
//! single-threaded library: no file I/O, no argument parsing, no
//! persistence between calls.
//!
//! ## Quick example
//!
//! ```
//! use cohort_core::{Attribute, AttributeCatalog, Cohort, Person};
//!
//! let time = Attribute::new(
//!     "time",
//!     "meeting time preference",
//!     vec!["AM".to_string(), "PM".to_string()],
//!     vec![vec![1.0, 0.0], vec![0.0, 1.0]],
//!     1.0,
//!     true,
//! ).unwrap();
//! let catalog = AttributeCatalog::build(vec![time], &["time".to_string()]).unwrap();
//! let time = catalog.find_by_name("time").unwrap();
//!
//! let mut people = Vec::new();
//! for i in 0..6 {
//!     let mut p = Person::new(format!("P{i}"), i as i64);
//!     p.update_selection(time, if i % 2 == 0 { "AM" } else { "PM" }).unwrap();
//!     people.push(p);
//! }
//!
//! let mut cohort = Cohort::new(people, catalog, 2, 3).unwrap();
//! cohort.allocate_greedy().unwrap();
//! cohort.allocate_sa(42).unwrap();
//!
//! println!("groups: {}, GCS mean: {:.3}", cohort.n_groups(), cohort.gcs_mean());
//! ```
//!
//! ## Module map
//!
//! - [`attribute`] — [`Attribute`] and [`AttributeCatalog`], the
//!   compatibility-model inputs.
//! - [`person`] — [`Person`] and the stable [`PersonId`]/[`GroupId`]
//!   index types.
//! - [`pair`] — [`Pair`], [`PairTable`], and the pairwise scoring
//!   algebra (PCS_raw, PCS, flexibility damping).
//! - [`group`] — [`Group`]: bounded membership plus cached GCS/variance.
//! - [`cohort`] — [`Cohort`]: owns the population and runs the greedy
//!   and simulated-annealing allocators.
//! - [`error`] — the [`CohortError`] taxonomy shared by every fallible
//!   operation.

pub mod attribute;
pub mod cohort;
pub mod error;
pub mod group;
pub mod pair;
pub mod person;

pub use attribute::{Attribute, AttributeCatalog, AttributeId};
pub use cohort::{AnnealParams, Cohort, CohortOptions, MetropolisDirection};
pub use error::{CohortError, Result};
pub use group::Group;
pub use pair::{Pair, PairKey, PairTable};
pub use person::{GroupId, Person, PersonId};
