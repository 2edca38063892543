use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::model::{Group, ParameterCode, ParameterRecord, SourceSystem};

/// Three-way classification of the parameter codes found in a dataset.
///
/// `only_a`, `both` and `only_b` are pairwise disjoint and together cover
/// every code of either system. Records with an empty code or an
/// unrecognised source never contribute.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Partition {
    pub codes_a: BTreeSet<ParameterCode>,
    pub codes_b: BTreeSet<ParameterCode>,
    pub only_a: BTreeSet<ParameterCode>,
    pub both: BTreeSet<ParameterCode>,
    pub only_b: BTreeSet<ParameterCode>,
}

/// Cardinality of one group, as rendered by the summary chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupCount {
    pub group: Group,
    pub label: &'static str,
    pub count: usize,
}

/// Classifies every code of `records`.
pub fn partition(records: &[ParameterRecord]) -> Partition {
    let codes_a = source_codes(records, SourceSystem::SystemA);
    let codes_b = source_codes(records, SourceSystem::SystemB);

    let only_a: BTreeSet<_> = codes_a.difference(&codes_b).cloned().collect();
    let only_b: BTreeSet<_> = codes_b.difference(&codes_a).cloned().collect();
    let both: BTreeSet<_> = codes_a.intersection(&codes_b).cloned().collect();

    debug!(
        only_a = only_a.len(),
        both = both.len(),
        only_b = only_b.len(),
        "partitioned parameter codes"
    );

    Partition {
        codes_a,
        codes_b,
        only_a,
        both,
        only_b,
    }
}

fn source_codes(records: &[ParameterRecord], system: SourceSystem) -> BTreeSet<ParameterCode> {
    records
        .iter()
        .filter(|record| record.is_classified_as(system))
        .map(|record| record.parameter_code.clone())
        .collect()
}

impl Partition {
    /// Codes belonging to `group`.
    pub fn codes(&self, group: Group) -> &BTreeSet<ParameterCode> {
        match group {
            Group::OnlyA => &self.only_a,
            Group::Both => &self.both,
            Group::OnlyB => &self.only_b,
        }
    }

    pub fn count(&self, group: Group) -> usize {
        self.codes(group).len()
    }

    /// Group the code was classified into, if it appears at all.
    pub fn group_of(&self, code: &str) -> Option<Group> {
        Group::DISPLAY_ORDER
            .into_iter()
            .find(|group| self.codes(*group).contains(code))
    }

    /// Union of the codes of both systems.
    pub fn all_codes(&self) -> BTreeSet<ParameterCode> {
        self.codes_a.union(&self.codes_b).cloned().collect()
    }

    /// Group cardinalities in display order.
    pub fn counts(&self) -> Vec<GroupCount> {
        Group::DISPLAY_ORDER
            .into_iter()
            .map(|group| GroupCount {
                group,
                label: group.label(),
                count: self.count(group),
            })
            .collect()
    }
}
