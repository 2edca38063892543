use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::Duration;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use paramcmp::io::dataset_read::{LoadOptions, load_dataset};
use paramcmp::io::excel_write;
use paramcmp::model::{ParameterRecord, SourceSystem};
use paramcmp::report::{DETAIL_SHEET, SUMMARY_SHEET};
use paramcmp::{Dataset, DatasetCache, ToolError, sync};
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/parametros.csv")
}

fn cell_text(cell: &DataType) -> String {
    match cell {
        DataType::String(value) => value.clone(),
        DataType::Float(value) => value.to_string(),
        DataType::Int(value) => value.to_string(),
        DataType::Bool(value) => value.to_string(),
        DataType::Empty => String::new(),
        other => other.to_string(),
    }
}

#[test]
fn exported_workbook_contains_every_sheet() {
    let temp_dir = tempdir().expect("temporary directory");
    let output = temp_dir.path().join("report.xlsx");

    sync::dataset_to_excel(&fixture_path(), &output, &LoadOptions::default())
        .expect("report exported");

    let mut workbook: Xlsx<_> = open_workbook(&output).expect("workbook opened");
    let names: Vec<String> = workbook.sheet_names().to_vec();
    assert_eq!(
        names,
        vec![
            "Resumen general",
            "Solo en TiCares",
            "Solo en SFERE",
            "Ambos Sistemas",
            "Comparativa detallada",
        ]
    );

    let summary = workbook
        .worksheet_range(SUMMARY_SHEET)
        .expect("summary sheet")
        .expect("summary range");
    let rows: Vec<Vec<String>> = summary
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    assert_eq!(rows[0], vec!["Grupo", "Cantidad"]);
    assert_eq!(rows[1], vec!["Solo en TiCares", "1"]);
    assert_eq!(rows[2], vec!["En ambos sistemas", "2"]);
    assert_eq!(rows[3], vec!["Solo en SFERE", "1"]);

    let detail = workbook
        .worksheet_range(DETAIL_SHEET)
        .expect("detail sheet")
        .expect("detail range");
    assert_eq!(detail.height(), 3);
    assert!(!fs::exists(temp_dir.path().join("report.xlsx.partial")).unwrap_or(true));
}

#[test]
fn failed_export_leaves_no_file_behind() {
    let temp_dir = tempdir().expect("temporary directory");
    let output = temp_dir.path().join("missing-dir").join("report.xlsx");
    let dataset = Dataset::new(vec![ParameterRecord::new(SourceSystem::SystemA, "P1")]);

    let error = sync::export_report(&dataset, &output).expect_err("export should fail");

    assert!(matches!(error, ToolError::Io(_)));
    assert!(!output.exists());
}

#[test]
fn export_buffer_is_a_valid_workbook() {
    let dataset = Dataset::new(vec![
        ParameterRecord::new(SourceSystem::SystemA, "P1").with_value("1"),
        ParameterRecord::new(SourceSystem::SystemB, "P1").with_value("2"),
    ]);
    let report = sync::report(&dataset);

    let bytes = excel_write::report_to_buffer(&report).expect("buffer written");

    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn workbook_input_loads_like_csv() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("parametros.xlsx");

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let header = [
        "FUENTE",
        "CODIGOPARAMETRO",
        "DESCRIPCIONPARAMETRO",
        "VALORPORDEFECTO",
        "VALORPORCENTRO",
        "ORGANIZACION",
        "CENTRO",
        "SERVICIO",
    ];
    for (col, name) in header.iter().enumerate() {
        worksheet.write_string(0, col as u16, *name).expect("header written");
    }
    let rows = [
        ["ticares", "P1", "Uno", "1", "1", "ORG", "C", "S"],
        ["SFERE", "P1", "Uno", "1", "2", "ORG", "C", "S"],
    ];
    for (row_idx, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            worksheet
                .write_string((row_idx + 1) as u32, col as u16, *value)
                .expect("cell written");
        }
    }
    workbook.save(&input).expect("workbook saved");

    let records = load_dataset(&input, &LoadOptions::default()).expect("workbook loaded");
    let dataset = Dataset::new(records);

    assert_eq!(dataset.len(), 2);
    assert!(dataset.partition().both.contains("P1"));
    let compared = sync::code_detail(&dataset, paramcmp::model::Group::Both, "P1");
    assert_eq!(compared.len(), 1);
}

#[test]
fn missing_header_is_reported() {
    let csv = "FUENTE;CODIGOPARAMETRO\nTICARES;P1\n";

    let error = paramcmp::io::dataset_read::load_csv(csv.as_bytes(), &LoadOptions::default())
        .expect_err("incomplete header");

    assert!(matches!(error, ToolError::MissingColumn(column) if column == "DESCRIPCIONPARAMETRO"));
}

const CSV_HEADER: &str = "FUENTE;CODIGOPARAMETRO;DESCRIPCIONPARAMETRO;VALORPORDEFECTO;\
                          VALORPORCENTRO;ORGANIZACION;CENTRO;SERVICIO\n";

fn write_csv(path: &Path, rows: &[&str]) {
    let mut contents = CSV_HEADER.to_string();
    for row in rows {
        contents.push_str(row);
        contents.push('\n');
    }
    fs::write(path, contents).expect("csv written");
}

#[test]
fn cache_reuses_dataset_until_invalidated() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("parametros.csv");
    fs::copy(fixture_path(), &input).expect("fixture copied");

    let mut cache = DatasetCache::new(LoadOptions::default());
    let first = cache.get_or_load(&input).expect("first load");
    let second = cache.get_or_load(&input).expect("cached load");
    assert!(std::ptr::eq(first.records(), second.records()));

    cache.invalidate();
    let third = cache.get_or_load(&input).expect("reload");
    assert!(!std::ptr::eq(first.records(), third.records()));
    assert_eq!(first.records(), third.records());
}

#[test]
fn cache_reloads_when_the_file_is_modified() {
    let temp_dir = tempdir().expect("temporary directory");
    let input = temp_dir.path().join("parametros.csv");
    write_csv(&input, &["TICARES;P1;Uno;1;1;ORG;C;S"]);

    let mut cache = DatasetCache::new(LoadOptions::default());
    let before = cache.get_or_load(&input).expect("first load");
    assert_eq!(before.len(), 1);

    let previous = fs::metadata(&input)
        .and_then(|meta| meta.modified())
        .expect("modification time");
    write_csv(
        &input,
        &["TICARES;P1;Uno;1;1;ORG;C;S", "SFERE;P1;Uno;1;1;ORG;C;S"],
    );
    File::options()
        .write(true)
        .open(&input)
        .and_then(|file| file.set_modified(previous + Duration::from_secs(10)))
        .expect("modification time bumped");

    let after = cache.get_or_load(&input).expect("reload");
    assert_eq!(after.len(), 2);
    assert!(after.partition().both.contains("P1"));
    assert!(!std::ptr::eq(before.records(), after.records()));
}

#[test]
fn cache_loads_a_different_path() {
    let temp_dir = tempdir().expect("temporary directory");
    let first_input = temp_dir.path().join("primero.csv");
    let second_input = temp_dir.path().join("segundo.csv");
    write_csv(&first_input, &["TICARES;P1;Uno;1;1;ORG;C;S"]);
    write_csv(
        &second_input,
        &["SFERE;P7;Siete;;;ORG;C;S", "SFERE;P8;Ocho;;;ORG;C;S"],
    );

    let mut cache = DatasetCache::new(LoadOptions::default());
    let first = cache.get_or_load(&first_input).expect("first path");
    let second = cache.get_or_load(&second_input).expect("second path");

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 2);
    assert_eq!(second.partition().count(paramcmp::model::Group::OnlyB), 2);
    assert!(first.partition().only_b.is_empty());
}
