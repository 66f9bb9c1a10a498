//! JSON presentation of a partitioned cohort: a list of groups, each a
//! list of persons with original identifiers preserved, plus the metric
//! bundle.

use cohort_core::Cohort;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct PersonOutput {
    pub name: String,
    pub identifier: i64,
}

#[derive(Debug, Serialize)]
pub struct GroupOutput {
    pub members: Vec<PersonOutput>,
    pub gcs: f64,
    pub pcs_variance: f64,
}

#[derive(Debug, Serialize)]
pub struct PartitionOutput {
    pub groups: Vec<GroupOutput>,
    pub gcs_mean: f64,
    pub gcs_variance: f64,
}

impl PartitionOutput {
    pub fn from_cohort(cohort: &Cohort) -> Self {
        let groups = cohort
            .groups()
            .iter()
            .map(|group| GroupOutput {
                members: group
                    .members()
                    .iter()
                    .map(|&id| {
                        let person = &cohort.people()[id.index()];
                        PersonOutput {
                            name: person.name().to_string(),
                            identifier: person.identifier(),
                        }
                    })
                    .collect(),
                gcs: group.gcs(),
                pcs_variance: group.pcs_variance(),
            })
            .collect();

        PartitionOutput {
            groups,
            gcs_mean: cohort.gcs_mean(),
            gcs_variance: cohort.gcs_variance(),
        }
    }
}
