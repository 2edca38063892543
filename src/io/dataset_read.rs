use std::fs::File;
use std::io::Read;
use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use tracing::{debug, info, instrument, warn};

use crate::error::{Result, ToolError};
use crate::model::{ParameterRecord, SourceTags, normalize_tag};

pub const SOURCE_COLUMN: &str = "FUENTE";
pub const CODE_COLUMN: &str = "CODIGOPARAMETRO";
pub const DESCRIPTION_COLUMN: &str = "DESCRIPCIONPARAMETRO";
pub const DEFAULT_VALUE_COLUMN: &str = "VALORPORDEFECTO";
pub const LOCATION_VALUE_COLUMN: &str = "VALORPORCENTRO";
pub const ORGANIZATION_COLUMN: &str = "ORGANIZACION";
pub const CENTER_COLUMN: &str = "CENTRO";
pub const SERVICE_COLUMN: &str = "SERVICIO";

/// Delimiter of the exported parameter review CSV.
pub const DEFAULT_DELIMITER: u8 = b';';

/// Options controlling how a dataset file is parsed.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Field delimiter for CSV input.
    pub delimiter: u8,
    /// Worksheet to read from workbook input; the first sheet when unset.
    pub sheet: Option<String>,
    /// Tags identifying the two systems in the source column.
    pub tags: SourceTags,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            sheet: None,
            tags: SourceTags::default(),
        }
    }
}

/// Positions of the dataset columns within a header row.
struct ColumnIndex {
    source: usize,
    code: usize,
    description: usize,
    default_value: usize,
    location_value: usize,
    organization: usize,
    center: usize,
    service: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &[String]) -> Result<Self> {
        let position = |name: &str| {
            headers
                .iter()
                .position(|header| header == name)
                .ok_or_else(|| ToolError::MissingColumn(name.to_string()))
        };

        Ok(Self {
            source: position(SOURCE_COLUMN)?,
            code: position(CODE_COLUMN)?,
            description: position(DESCRIPTION_COLUMN)?,
            default_value: position(DEFAULT_VALUE_COLUMN)?,
            location_value: position(LOCATION_VALUE_COLUMN)?,
            organization: position(ORGANIZATION_COLUMN)?,
            center: position(CENTER_COLUMN)?,
            service: position(SERVICE_COLUMN)?,
        })
    }

    fn build<'a>(
        &self,
        cell: impl Fn(usize) -> Option<&'a str>,
        tags: &SourceTags,
    ) -> ParameterRecord {
        let optional = |idx: usize| {
            cell(idx)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        let raw_tag = cell(self.source).unwrap_or_default();

        ParameterRecord {
            source_tag: normalize_tag(raw_tag),
            source: tags.resolve(raw_tag),
            parameter_code: cell(self.code).unwrap_or_default().to_string(),
            description: cell(self.description).unwrap_or_default().to_string(),
            default_value: optional(self.default_value),
            per_location_value: optional(self.location_value),
            organization: optional(self.organization),
            center: optional(self.center),
            service: optional(self.service),
        }
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_uppercase()
}

/// Loads a dataset, choosing the parser from the file extension.
///
/// `.xlsx`/`.xlsm` files are read as workbooks, anything else as CSV.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn load_dataset(path: &Path, options: &LoadOptions) -> Result<Vec<ParameterRecord>> {
    let is_workbook = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("xlsx") || ext.eq_ignore_ascii_case("xlsm"))
        .unwrap_or(false);

    let records = if is_workbook {
        load_workbook(path, options)?
    } else {
        load_csv(File::open(path)?, options)?
    };

    log_unclassified(&records);
    info!(record_count = records.len(), "dataset loaded");
    Ok(records)
}

/// Parses the delimited dataset layout from `reader`.
pub fn load_csv<R: Read>(reader: R, options: &LoadOptions) -> Result<Vec<ParameterRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    let columns = ColumnIndex::from_headers(&headers)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        records.push(columns.build(|idx| row.get(idx), &options.tags));
    }

    debug!(rows = records.len(), "parsed CSV rows");
    Ok(records)
}

/// Reads the dataset layout from a worksheet of an Excel workbook.
pub fn load_workbook(path: &Path, options: &LoadOptions) -> Result<Vec<ParameterRecord>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let sheet = match &options.sheet {
        Some(name) => name.clone(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| ToolError::InvalidDataset("workbook has no sheets".into()))?,
    };

    let range = workbook
        .worksheet_range(&sheet)
        .ok_or_else(|| ToolError::InvalidDataset(format!("missing sheet '{sheet}'")))??;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| normalize_header(&cell_to_string(Some(cell))))
            .collect(),
        None => return Err(ToolError::InvalidDataset(format!("sheet '{sheet}' is empty"))),
    };
    let columns = ColumnIndex::from_headers(&headers)?;

    let mut records = Vec::new();
    for row in rows {
        let cells: Vec<String> = row.iter().map(|cell| cell_to_string(Some(cell))).collect();
        records.push(columns.build(|idx| cells.get(idx).map(String::as_str), &options.tags));
    }

    debug!(sheet = %sheet, rows = records.len(), "parsed worksheet rows");
    Ok(records)
}

fn log_unclassified(records: &[ParameterRecord]) {
    let unknown_source = records.iter().filter(|record| record.source.is_none()).count();
    let missing_code = records.iter().filter(|record| !record.has_code()).count();
    if unknown_source > 0 {
        warn!(count = unknown_source, "rows with an unrecognised source tag are not classified");
    }
    if missing_code > 0 {
        warn!(count = missing_code, "rows without a parameter code are not classified");
    }
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
