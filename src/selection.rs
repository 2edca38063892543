//! Group → code → comparison progression used by interactive front ends.

use serde::Serialize;
use tracing::debug;

use crate::compare::detail::{self, DetailRow, JoinedDetailRow};
use crate::compare::listing::{self, ParameterSummary};
use crate::dataset::Dataset;
use crate::error::{Result, ToolError};
use crate::model::{Group, ParameterCode, SourceSystem};

/// Rows shown once a parameter code has been chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CodeView {
    /// The code's rows in the single system of a one-sided group.
    Single {
        system: SourceSystem,
        rows: Vec<DetailRow>,
    },
    /// The code's rows in each system, not yet joined.
    SideBySide {
        system_a: Vec<DetailRow>,
        system_b: Vec<DetailRow>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Selection {
    GroupSelected {
        group: Group,
        listing: Vec<ParameterSummary>,
    },
    CodeSelected {
        group: Group,
        code: ParameterCode,
        view: CodeView,
    },
    Compared {
        group: Group,
        code: ParameterCode,
        rows: Vec<JoinedDetailRow>,
    },
}

impl Selection {
    /// Starts a selection by choosing a group.
    pub fn select_group(dataset: &Dataset, group: Group) -> Self {
        let listing = listing::group_listing(dataset.records(), dataset.partition(), group);
        debug!(%group, parameters = listing.len(), "group selected");
        Selection::GroupSelected { group, listing }
    }

    pub fn group(&self) -> Group {
        match self {
            Selection::GroupSelected { group, .. }
            | Selection::CodeSelected { group, .. }
            | Selection::Compared { group, .. } => *group,
        }
    }

    /// Chooses a code from the current group. Allowed from any state.
    pub fn select_code(self, dataset: &Dataset, code: &str) -> Result<Self> {
        let group = self.group();
        if !dataset.partition().codes(group).contains(code) {
            return Err(ToolError::UnknownCode {
                group: group.label().to_string(),
                code: code.to_string(),
            });
        }

        let records = dataset.records();
        let view = match group.source() {
            Some(system) => CodeView::Single {
                system,
                rows: detail::source_details(records, system, code),
            },
            None => CodeView::SideBySide {
                system_a: detail::source_details(records, SourceSystem::SystemA, code),
                system_b: detail::source_details(records, SourceSystem::SystemB, code),
            },
        };

        debug!(%group, code, "code selected");
        Ok(Selection::CodeSelected {
            group,
            code: code.to_string(),
            view,
        })
    }

    /// Joins the selected code across systems. Only codes present in both
    /// systems can be compared.
    pub fn compare(self, dataset: &Dataset) -> Result<Self> {
        match self {
            Selection::CodeSelected { group: Group::Both, code, .. } => {
                let rows = detail::join_details(dataset.records(), &code);
                Ok(Selection::Compared {
                    group: Group::Both,
                    code,
                    rows,
                })
            }
            Selection::CodeSelected { group, .. } => Err(ToolError::InvalidSelection(format!(
                "comparison is only available for '{}', not '{group}'",
                Group::Both.label()
            ))),
            compared @ Selection::Compared { .. } => Ok(compared),
            Selection::GroupSelected { .. } => Err(ToolError::InvalidSelection(
                "select a parameter before comparing".into(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParameterRecord;

    fn dataset() -> Dataset {
        Dataset::new(vec![
            ParameterRecord::new(SourceSystem::SystemA, "P1").with_value("x"),
            ParameterRecord::new(SourceSystem::SystemA, "P2").with_value("1"),
            ParameterRecord::new(SourceSystem::SystemB, "P2").with_value("1"),
        ])
    }

    #[test]
    fn progresses_through_every_state() {
        let dataset = dataset();
        let selection = Selection::select_group(&dataset, Group::Both);
        assert!(matches!(
            &selection,
            Selection::GroupSelected { listing, .. } if listing.len() == 1
        ));

        let selection = selection.select_code(&dataset, "P2").expect("code in group");
        assert!(matches!(selection, Selection::CodeSelected { .. }));

        match selection.compare(&dataset).expect("comparison") {
            Selection::Compared { rows, .. } => {
                assert_eq!(rows.len(), 1);
                assert!(rows[0].matches);
            }
            other => panic!("unexpected state {other:?}"),
        }
    }

    #[test]
    fn rejects_codes_outside_the_group() {
        let dataset = dataset();
        let error = Selection::select_group(&dataset, Group::OnlyA)
            .select_code(&dataset, "P2")
            .expect_err("P2 is shared");
        assert!(matches!(error, ToolError::UnknownCode { .. }));
    }

    #[test]
    fn one_sided_groups_cannot_be_compared() {
        let dataset = dataset();
        let selection = Selection::select_group(&dataset, Group::OnlyA)
            .select_code(&dataset, "P1")
            .expect("code in group");
        assert!(matches!(
            selection.compare(&dataset),
            Err(ToolError::InvalidSelection(_))
        ));
    }
}
