use std::path::Path;

use tracing::{debug, info, instrument};

use crate::compare::detail::{self, GroupDetail};
use crate::compare::listing::{self, ParameterSummary};
use crate::compare::partition::GroupCount;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::io::dataset_read::LoadOptions;
use crate::io::excel_write;
use crate::model::Group;
use crate::report::{Report, build_report};
use crate::selection::Selection;

/// Group cardinalities of the dataset, in chart order.
#[instrument(level = "info", skip_all, fields(records = dataset.len()))]
pub fn summary(dataset: &Dataset) -> Vec<GroupCount> {
    let counts = dataset.partition().counts();
    for entry in &counts {
        debug!(group = entry.label, count = entry.count, "group size");
    }
    counts
}

/// Parameters of `group`, sorted by code.
#[instrument(level = "info", skip_all, fields(group = %group))]
pub fn group_listing(dataset: &Dataset, group: Group) -> Vec<ParameterSummary> {
    let listing = listing::group_listing(dataset.records(), dataset.partition(), group);
    info!(parameter_count = listing.len(), "group listed");
    listing
}

/// Detail rows for `code` under `group`, joined across systems for `Both`.
#[instrument(level = "info", skip_all, fields(group = %group, code = %code))]
pub fn code_detail(dataset: &Dataset, group: Group, code: &str) -> GroupDetail {
    let detail = detail::details_for(dataset.records(), group, code);
    info!(row_count = detail.len(), "detail rows computed");
    detail
}

/// Walks the selection flow up to the selected code, optionally comparing it.
#[instrument(level = "info", skip_all, fields(group = %group, code = %code, compare = compare))]
pub fn inspect(dataset: &Dataset, group: Group, code: &str, compare: bool) -> Result<Selection> {
    let selection = Selection::select_group(dataset, group).select_code(dataset, code)?;
    if compare {
        selection.compare(dataset)
    } else {
        Ok(selection)
    }
}

/// Builds the five-table comparison report.
#[instrument(level = "info", skip_all, fields(records = dataset.len()))]
pub fn report(dataset: &Dataset) -> Report {
    let report = build_report(dataset.records(), dataset.partition());
    debug!(sheet_count = report.tables.len(), "report constructed");
    report
}

/// Builds the report for `dataset` and writes it to `output`.
#[instrument(level = "info", skip_all, fields(output = %output.display()))]
pub fn export_report(dataset: &Dataset, output: &Path) -> Result<Report> {
    let report = report(dataset);
    excel_write::write_report(output, &report)?;
    info!(sheet_count = report.tables.len(), "report exported");
    Ok(report)
}

/// Loads the dataset at `input` and exports its comparison report to `output`.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = %output.display())
)]
pub fn dataset_to_excel(input: &Path, output: &Path, options: &LoadOptions) -> Result<()> {
    let dataset = Dataset::load(input, options)?;
    info!(record_count = dataset.len(), "loaded parameter records");
    export_report(&dataset, output)?;
    Ok(())
}
