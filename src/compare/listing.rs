use std::collections::HashSet;

use serde::Serialize;

use crate::compare::partition::Partition;
use crate::model::{Group, ParameterCode, ParameterRecord};

/// Distinct `(code, description, default value)` triple of a parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ParameterSummary {
    pub code: ParameterCode,
    pub description: String,
    pub default_value: Option<String>,
}

impl From<&ParameterRecord> for ParameterSummary {
    fn from(record: &ParameterRecord) -> Self {
        Self {
            code: record.parameter_code.clone(),
            description: record.description.clone(),
            default_value: record.default_value.clone(),
        }
    }
}

/// Distinct summaries of `records`, in first-seen order.
pub fn distinct_parameters<'a>(
    records: impl IntoIterator<Item = &'a ParameterRecord>,
) -> Vec<ParameterSummary> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .map(ParameterSummary::from)
        .filter(|summary| seen.insert(summary.clone()))
        .collect()
}

/// Parameters listed under `group`, sorted by code.
///
/// One-sided groups read from their own system; `Both` lists the distinct
/// rows of either system, so a code whose description differs between
/// systems appears once per variant.
pub fn group_listing(
    records: &[ParameterRecord],
    partition: &Partition,
    group: Group,
) -> Vec<ParameterSummary> {
    let codes = partition.codes(group);
    let members = records.iter().filter(|record| {
        let in_scope = match group.source() {
            Some(system) => record.is_classified_as(system),
            None => record.source.is_some() && record.has_code(),
        };
        in_scope && codes.contains(&record.parameter_code)
    });

    let mut listing = distinct_parameters(members);
    listing.sort_by(|lhs, rhs| lhs.code.cmp(&rhs.code));
    listing
}
