use serde::Serialize;
use tracing::debug;

use crate::compare::join::full_outer_join;
use crate::model::{Group, Location, ParameterRecord, SourceSystem};

/// Per-location row of a single system, with the values as loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailRow {
    pub per_location_value: Option<String>,
    pub organization: Option<String>,
    pub center: Option<String>,
    pub service: Option<String>,
}

impl From<&ParameterRecord> for DetailRow {
    fn from(record: &ParameterRecord) -> Self {
        Self {
            per_location_value: record.per_location_value.clone(),
            organization: record.organization.clone(),
            center: record.center.clone(),
            service: record.service.clone(),
        }
    }
}

/// One side of a joined row: the normalised location and its value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailSide {
    pub location: Location,
    pub value: Option<String>,
}

impl From<&ParameterRecord> for DetailSide {
    fn from(record: &ParameterRecord) -> Self {
        Self {
            location: record.location(),
            value: record.per_location_value.clone(),
        }
    }
}

/// Result of outer-joining both systems' rows of one code on location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinedDetailRow {
    /// Location shared by the present sides.
    pub location: Location,
    pub side_a: Option<DetailSide>,
    pub side_b: Option<DetailSide>,
    pub matches: bool,
}

impl JoinedDetailRow {
    fn new(side_a: Option<DetailSide>, side_b: Option<DetailSide>) -> Self {
        let location = side_a
            .as_ref()
            .or(side_b.as_ref())
            .map(|side| side.location.clone())
            .unwrap_or_default();
        let matches = rows_match(side_a.as_ref(), side_b.as_ref());
        Self {
            location,
            side_a,
            side_b,
            matches,
        }
    }

    pub fn value_a(&self) -> Option<&str> {
        self.side_a.as_ref().and_then(|side| side.value.as_deref())
    }

    pub fn value_b(&self) -> Option<&str> {
        self.side_b.as_ref().and_then(|side| side.value.as_deref())
    }
}

/// Whether two sides of a joined row are equivalent.
///
/// Value, organization, center and service must all be equal under nullable
/// equality: absent equals absent, while an absent field never equals a
/// present one, even an empty string. A missing side makes every one of its
/// fields absent.
pub fn rows_match(side_a: Option<&DetailSide>, side_b: Option<&DetailSide>) -> bool {
    fn value(side: Option<&DetailSide>) -> Option<&str> {
        side.and_then(|side| side.value.as_deref())
    }
    fn organization(side: Option<&DetailSide>) -> Option<&str> {
        side.map(|side| side.location.organization.as_str())
    }
    fn center(side: Option<&DetailSide>) -> Option<&str> {
        side.map(|side| side.location.center.as_str())
    }
    fn service(side: Option<&DetailSide>) -> Option<&str> {
        side.map(|side| side.location.service.as_str())
    }

    value(side_a) == value(side_b)
        && organization(side_a) == organization(side_b)
        && center(side_a) == center(side_b)
        && service(side_a) == service(side_b)
}

/// Detail for a code within a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GroupDetail {
    /// Rows of a one-sided group, straight from its system.
    Single {
        system: SourceSystem,
        rows: Vec<DetailRow>,
    },
    /// Rows of a code present in both systems, joined on location.
    Joined { rows: Vec<JoinedDetailRow> },
}

impl GroupDetail {
    pub fn len(&self) -> usize {
        match self {
            GroupDetail::Single { rows, .. } => rows.len(),
            GroupDetail::Joined { rows } => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn records_for<'a>(
    records: &'a [ParameterRecord],
    system: SourceSystem,
    code: &'a str,
) -> impl Iterator<Item = &'a ParameterRecord> + 'a {
    records
        .iter()
        .filter(move |record| record.is_classified_as(system) && record.parameter_code == code)
}

/// All rows of `system` carrying `code`, in input order.
pub fn source_details(
    records: &[ParameterRecord],
    system: SourceSystem,
    code: &str,
) -> Vec<DetailRow> {
    records_for(records, system, code).map(DetailRow::from).collect()
}

/// Full outer join of both systems' rows for `code`, keyed on location.
pub fn join_details(records: &[ParameterRecord], code: &str) -> Vec<JoinedDetailRow> {
    let left: Vec<&ParameterRecord> = records_for(records, SourceSystem::SystemA, code).collect();
    let right: Vec<&ParameterRecord> = records_for(records, SourceSystem::SystemB, code).collect();

    let rows: Vec<JoinedDetailRow> = full_outer_join(
        &left,
        &right,
        |record| record.location().key(),
        |record| record.location().key(),
    )
    .into_iter()
    .map(|(a, b)| JoinedDetailRow::new(a.map(DetailSide::from), b.map(DetailSide::from)))
    .collect();

    debug!(
        code,
        left = left.len(),
        right = right.len(),
        joined = rows.len(),
        "joined detail rows"
    );
    rows
}

/// Detail rows for `code` as seen from `group`.
///
/// One-sided groups read from their system only; `Both` joins across systems.
/// A code without records yields an empty result.
pub fn details_for(records: &[ParameterRecord], group: Group, code: &str) -> GroupDetail {
    match group.source() {
        Some(system) => GroupDetail::Single {
            system,
            rows: source_details(records, system, code),
        },
        None => GroupDetail::Joined {
            rows: join_details(records, code),
        },
    }
}
