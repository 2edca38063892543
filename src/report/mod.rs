//! Assembly of the five named tables that make up the comparison report.
//!
//! Sheet names and column headers are consumed verbatim by downstream
//! tooling and must not change.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::compare::detail::{DetailSide, rows_match};
use crate::compare::join::full_outer_join;
use crate::compare::listing::{ParameterSummary, distinct_parameters};
use crate::compare::partition::Partition;
use crate::model::{Group, ParameterRecord, SourceSystem};

pub const SUMMARY_SHEET: &str = "Resumen general";
pub const ONLY_A_SHEET: &str = "Solo en TiCares";
pub const ONLY_B_SHEET: &str = "Solo en SFERE";
pub const BOTH_SHEET: &str = "Ambos Sistemas";
pub const DETAIL_SHEET: &str = "Comparativa detallada";

pub const GROUP_COLUMN: &str = "Grupo";
pub const COUNT_COLUMN: &str = "Cantidad";
pub const CODE_COLUMN: &str = "CODIGOPARAMETRO";
pub const DESCRIPTION_COLUMN: &str = "DESCRIPCIONPARAMETRO";
pub const DEFAULT_VALUE_COLUMN: &str = "VALORPORDEFECTO";
/// Match flag closing every row of the detailed comparison.
pub const MATCH_COLUMN: &str = "COINCIDE";

const DETAIL_FIELDS: [&str; 7] = [
    "CODIGOPARAMETRO",
    "DESCRIPCIONPARAMETRO",
    "VALORPORDEFECTO",
    "VALORPORCENTRO",
    "ORGANIZACION",
    "CENTRO",
    "SERVICIO",
];

/// A single typed cell of a report table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    /// No value. Serialised as a blank cell.
    Empty,
    Text(String),
    Integer(u64),
    Bool(bool),
}

impl Cell {
    /// Text cell, or [`Cell::Empty`] for an empty string.
    pub fn text(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }

    /// Nullable value cell. A present empty string stays a text cell so it
    /// remains distinguishable from an absent value.
    pub fn optional(value: Option<&str>) -> Self {
        match value {
            Some(value) => Cell::Text(value.to_string()),
            None => Cell::Empty,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(value) => Some(value),
            _ => None,
        }
    }
}

/// A named table that will be materialised as one sheet of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTable {
    pub sheet_name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ReportTable {
    fn new(sheet_name: &str, columns: Vec<String>) -> Self {
        Self {
            sheet_name: sheet_name.to_string(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Index of `column` in the header row.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|name| name == column)
    }
}

/// All tables of the comparison report, in sheet order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub tables: Vec<ReportTable>,
}

impl Report {
    pub fn table(&self, sheet_name: &str) -> Option<&ReportTable> {
        self.tables.iter().find(|table| table.sheet_name == sheet_name)
    }
}

/// Builds the full comparison report from the records and their partition.
#[instrument(level = "debug", skip_all, fields(records = records.len()))]
pub fn build_report(records: &[ParameterRecord], partition: &Partition) -> Report {
    let tables = vec![
        summary_table(partition),
        listing_table(ONLY_A_SHEET, records, partition, Group::OnlyA),
        listing_table(ONLY_B_SHEET, records, partition, Group::OnlyB),
        both_basic_table(records, partition),
        detailed_table(records, partition),
    ];

    for table in &tables {
        debug!(sheet = %table.sheet_name, rows = table.rows.len(), "report table built");
    }

    Report { tables }
}

fn summary_table(partition: &Partition) -> ReportTable {
    let mut table = ReportTable::new(
        SUMMARY_SHEET,
        vec![GROUP_COLUMN.to_string(), COUNT_COLUMN.to_string()],
    );
    table.rows = partition
        .counts()
        .into_iter()
        .map(|entry| vec![Cell::text(entry.label), Cell::Integer(entry.count as u64)])
        .collect();
    table
}

/// Records of `system` whose code belongs to `group`.
fn group_records<'a>(
    records: &'a [ParameterRecord],
    partition: &'a Partition,
    system: SourceSystem,
    group: Group,
) -> impl Iterator<Item = &'a ParameterRecord> + 'a {
    let codes = partition.codes(group);
    records
        .iter()
        .filter(move |record| {
            record.is_classified_as(system) && codes.contains(&record.parameter_code)
        })
}

fn listing_table(
    sheet_name: &str,
    records: &[ParameterRecord],
    partition: &Partition,
    group: Group,
) -> ReportTable {
    let mut table = ReportTable::new(
        sheet_name,
        vec![
            CODE_COLUMN.to_string(),
            DESCRIPTION_COLUMN.to_string(),
            DEFAULT_VALUE_COLUMN.to_string(),
        ],
    );

    let Some(system) = group.source() else {
        return table;
    };

    table.rows = distinct_parameters(group_records(records, partition, system, group))
        .into_iter()
        .map(|summary| {
            vec![
                Cell::text(&summary.code),
                Cell::text(&summary.description),
                Cell::optional(summary.default_value.as_deref()),
            ]
        })
        .collect();
    table
}

fn suffixed(column: &str, system: SourceSystem) -> String {
    format!("{column}_{}", system.column_suffix())
}

fn both_basic_table(records: &[ParameterRecord], partition: &Partition) -> ReportTable {
    let mut columns = vec![CODE_COLUMN.to_string()];
    for system in SourceSystem::ALL {
        columns.push(suffixed(DESCRIPTION_COLUMN, system));
        columns.push(suffixed(DEFAULT_VALUE_COLUMN, system));
    }
    let mut table = ReportTable::new(BOTH_SHEET, columns);

    let left = distinct_parameters(group_records(
        records,
        partition,
        SourceSystem::SystemA,
        Group::Both,
    ));
    let right = distinct_parameters(group_records(
        records,
        partition,
        SourceSystem::SystemB,
        Group::Both,
    ));
    let left: Vec<&ParameterSummary> = left.iter().collect();
    let right: Vec<&ParameterSummary> = right.iter().collect();

    let summary_cells = |summary: Option<&ParameterSummary>| match summary {
        Some(summary) => [
            Cell::text(&summary.description),
            Cell::optional(summary.default_value.as_deref()),
        ],
        None => [Cell::Empty, Cell::Empty],
    };

    for (a, b) in full_outer_join(&left, &right, |row| row.code.clone(), |row| row.code.clone()) {
        let code = a.or(b).map(|summary| summary.code.as_str()).unwrap_or_default();
        let mut row = vec![Cell::text(code)];
        row.extend(summary_cells(a));
        row.extend(summary_cells(b));
        table.rows.push(row);
    }
    table
}

fn record_cells(record: Option<&ParameterRecord>) -> Vec<Cell> {
    match record {
        Some(record) => {
            let location = record.location();
            vec![
                Cell::text(&record.parameter_code),
                Cell::text(&record.description),
                Cell::optional(record.default_value.as_deref()),
                Cell::optional(record.per_location_value.as_deref()),
                Cell::text(&location.organization),
                Cell::text(&location.center),
                Cell::text(&location.service),
            ]
        }
        None => vec![Cell::Empty; DETAIL_FIELDS.len()],
    }
}

/// Outer join of every shared code's records, keyed on code plus location.
fn detailed_table(records: &[ParameterRecord], partition: &Partition) -> ReportTable {
    let mut columns: Vec<String> = SourceSystem::ALL
        .into_iter()
        .flat_map(|system| DETAIL_FIELDS.into_iter().map(move |field| suffixed(field, system)))
        .collect();
    columns.push(MATCH_COLUMN.to_string());
    let mut table = ReportTable::new(DETAIL_SHEET, columns);

    let left: Vec<&ParameterRecord> =
        group_records(records, partition, SourceSystem::SystemA, Group::Both).collect();
    let right: Vec<&ParameterRecord> =
        group_records(records, partition, SourceSystem::SystemB, Group::Both).collect();

    let key = |record: &&ParameterRecord| record.location().qualified_key(&record.parameter_code);
    for (a, b) in full_outer_join(&left, &right, key, key) {
        let matches = rows_match(
            a.map(DetailSide::from).as_ref(),
            b.map(DetailSide::from).as_ref(),
        );
        let mut row = record_cells(a);
        row.extend(record_cells(b));
        row.push(Cell::Bool(matches));
        table.rows.push(row);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::partition::partition;

    #[test]
    fn detailed_columns_are_side_by_side() {
        let report = build_report(&[], &Partition::default());
        let detail = report.table(DETAIL_SHEET).expect("detail table");

        assert_eq!(detail.columns.len(), 15);
        assert_eq!(detail.columns[0], "CODIGOPARAMETRO_TICARES");
        assert_eq!(detail.columns[7], "CODIGOPARAMETRO_SFERE");
        assert_eq!(detail.columns[14], MATCH_COLUMN);
    }

    #[test]
    fn both_basic_places_descriptions_side_by_side() {
        let records = vec![
            ParameterRecord::new(SourceSystem::SystemA, "P")
                .with_description("uno")
                .with_default_value("1"),
            ParameterRecord::new(SourceSystem::SystemA, "P")
                .with_description("uno")
                .with_default_value("1"),
            ParameterRecord::new(SourceSystem::SystemB, "P").with_description("one"),
        ];
        let report = build_report(&records, &partition(&records));
        let both = report.table(BOTH_SHEET).expect("both table");

        assert_eq!(
            both.rows,
            vec![vec![
                Cell::text("P"),
                Cell::text("uno"),
                Cell::text("1"),
                Cell::text("one"),
                Cell::Empty,
            ]]
        );
    }

    #[test]
    fn present_empty_value_differs_from_absent_value() {
        let records = vec![
            ParameterRecord::new(SourceSystem::SystemA, "P")
                .with_value("")
                .at(Some("O"), None, None),
            ParameterRecord::new(SourceSystem::SystemB, "P").at(Some("O"), None, None),
        ];
        let report = build_report(&records, &partition(&records));
        let detail = report.table(DETAIL_SHEET).expect("detail table");
        let value_a = detail.column_index("VALORPORCENTRO_TICARES").expect("value A");
        let value_b = detail.column_index("VALORPORCENTRO_SFERE").expect("value B");
        let matches = detail.column_index(MATCH_COLUMN).expect("match column");

        assert_eq!(detail.rows.len(), 1);
        assert_eq!(detail.rows[0][value_a], Cell::Text(String::new()));
        assert_eq!(detail.rows[0][value_b], Cell::Empty);
        assert_eq!(detail.rows[0][matches], Cell::Bool(false));
    }
}
