//! Reading datasets from disk, and writing processed tables back out.
//!
//! The format is picked from the file extension. CSV and JSON are read
//! natively; spreadsheet and Parquet files are recognized so the error can
//! say so, but are not supported.

use super::table::{Column, Table, Value};
use crate::utils::paths::extension_lowercase;
use anyhow::Context as _;
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

/// Options for reading a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// CSV field delimiter.
    pub delimiter: u8,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Dataset file formats known to the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    /// Comma (or otherwise) separated values with a header row.
    Csv,
    /// JSON records or columns.
    Json,
    /// `.xlsx` / `.xls` workbooks. Not supported.
    Spreadsheet,
    /// Apache Parquet. Not supported.
    Parquet,
}

/// Work out the format of `path` from its extension.
///
/// # Errors
/// Errors if the extension doesn't correspond to a dataset format.
pub fn detect_format(path: &Path) -> anyhow::Result<DatasetFormat> {
    let ext = extension_lowercase(path);
    if ext == "parquet" {
        return Ok(DatasetFormat::Parquet);
    }
    let Some(mime) = mime_guess::from_ext(&ext).first() else {
        anyhow::bail!("Unsupported file format: .{ext}");
    };
    let subtype = mime.subtype().as_str();
    if mime.type_() == mime::TEXT && subtype == "csv" {
        Ok(DatasetFormat::Csv)
    } else if mime.type_() == mime::APPLICATION && subtype == "json" {
        Ok(DatasetFormat::Json)
    } else if mime.type_() == mime::APPLICATION
        && (subtype == "vnd.ms-excel"
            || subtype == "vnd.openxmlformats-officedocument.spreadsheetml.sheet")
    {
        Ok(DatasetFormat::Spreadsheet)
    } else {
        anyhow::bail!("Unsupported file format: .{ext}")
    }
}

/// Load the dataset at `path`.
///
/// # Errors
/// Errors if the format is unsupported, the file can't be read, or its
/// contents are malformed.
#[tracing::instrument(skip(options))]
pub fn load_dataset(path: &Path, options: &LoadOptions) -> anyhow::Result<Table> {
    let format = detect_format(path)?;
    let open = || {
        File::open(path)
            .map(BufReader::new)
            .with_context(|| format!("Couldn't open dataset {}", path.display()))
    };
    let table = match format {
        DatasetFormat::Csv => read_csv(open()?, options.delimiter)?,
        DatasetFormat::Json => read_json(open()?)?,
        DatasetFormat::Spreadsheet | DatasetFormat::Parquet => anyhow::bail!(
            "Unsupported file format: .{} (convert the dataset to CSV or JSON)",
            extension_lowercase(path)
        ),
    };
    tracing::debug!(shape = ?table.shape(), "Loaded dataset");
    Ok(table)
}

/// Read a CSV document with a header row.
///
/// Rows shorter than the header are padded with missing cells.
///
/// # Errors
/// Errors on I/O failures or rows with more fields than the header.
pub fn read_csv<R: Read>(reader: R, delimiter: u8) -> anyhow::Result<Table> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut columns: Vec<Column> = csv_reader
        .headers()?
        .iter()
        .map(|header| Column::new(header, Vec::new()))
        .collect();

    for (idx, record) in csv_reader.records().enumerate() {
        let record = record.with_context(|| format!("Malformed CSV record {}", idx + 1))?;
        if record.len() > columns.len() {
            anyhow::bail!(
                "Malformed CSV record {}: expected {} fields, found {}",
                idx + 1,
                columns.len(),
                record.len()
            );
        }
        for (pos, column) in columns.iter_mut().enumerate() {
            column
                .values
                .push(record.get(pos).map_or(Value::Missing, Value::parse));
        }
    }
    Table::from_columns(columns)
}

/// Read a JSON dataset.
///
/// Two layouts are accepted: an array of records (`[{"col": 1}, ...]`) and
/// a column-oriented object whose values are either arrays
/// (`{"col": [1, 2]}`) or row-index maps (`{"col": {"0": 1, "1": 2}}`).
/// Keys absent from a record or index map become missing cells.
///
/// # Errors
/// Errors if the document isn't valid JSON or has another layout.
pub fn read_json<R: Read>(reader: R) -> anyhow::Result<Table> {
    let document: serde_json::Value = serde_json::from_reader(reader)?;
    match document {
        serde_json::Value::Array(records) => records_to_table(&records),
        serde_json::Value::Object(columns) => columns_to_table(&columns),
        _ => anyhow::bail!("JSON dataset must be an array of records or an object of columns"),
    }
}

fn records_to_table(records: &[serde_json::Value]) -> anyhow::Result<Table> {
    let mut names: Vec<&str> = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        let Some(object) = record.as_object() else {
            anyhow::bail!("JSON record {idx} is not an object");
        };
        for key in object.keys() {
            if !names.contains(&key.as_str()) {
                names.push(key);
            }
        }
    }
    let columns = names
        .iter()
        .map(|name| {
            let values = records
                .iter()
                .map(|record| record.get(*name).map_or(Value::Missing, json_cell))
                .collect();
            Column::new(*name, values)
        })
        .collect();
    Table::from_columns(columns)
}

fn columns_to_table(
    columns: &serde_json::Map<String, serde_json::Value>,
) -> anyhow::Result<Table> {
    if columns.values().all(serde_json::Value::is_array) {
        let columns = columns
            .iter()
            .map(|(name, values)| {
                let values = values
                    .as_array()
                    .map(|cells| cells.iter().map(json_cell).collect())
                    .unwrap_or_default();
                Column::new(name.as_str(), values)
            })
            .collect();
        return Table::from_columns(columns);
    }

    if columns.values().all(serde_json::Value::is_object) {
        let mut index: Vec<&str> = Vec::new();
        for cells in columns.values().filter_map(serde_json::Value::as_object) {
            for key in cells.keys() {
                if !index.contains(&key.as_str()) {
                    index.push(key);
                }
            }
        }
        let columns = columns
            .iter()
            .map(|(name, cells)| {
                let values = index
                    .iter()
                    .map(|key| cells.get(*key).map_or(Value::Missing, json_cell))
                    .collect();
                Column::new(name.as_str(), values)
            })
            .collect();
        return Table::from_columns(columns);
    }

    anyhow::bail!("JSON columns must all be arrays or all be index objects")
}

fn json_cell(value: &serde_json::Value) -> Value {
    match *value {
        serde_json::Value::Null => Value::Missing,
        serde_json::Value::Number(ref number) => {
            number.as_f64().map_or(Value::Missing, Value::Number)
        }
        serde_json::Value::String(ref text) => Value::parse(text),
        serde_json::Value::Bool(flag) => Value::Text(flag.to_string()),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            Value::Text(value.to_string())
        }
    }
}

/// Write `table` as CSV with a header row. Missing cells are written empty.
///
/// # Errors
/// Errors if writing fails.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(table.column_names())?;
    for idx in 0..table.row_count() {
        csv_writer.write_record(table.row(idx).iter().map(ToString::to_string))?;
    }
    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_detect_format() {
        let cut = |name: &str| detect_format(&PathBuf::from(name));
        assert_eq!(cut("cells.csv").unwrap(), DatasetFormat::Csv);
        assert_eq!(cut("CELLS.CSV").unwrap(), DatasetFormat::Csv);
        assert_eq!(cut("cells.json").unwrap(), DatasetFormat::Json);
        assert_eq!(cut("cells.xlsx").unwrap(), DatasetFormat::Spreadsheet);
        assert_eq!(cut("cells.xls").unwrap(), DatasetFormat::Spreadsheet);
        assert_eq!(cut("cells.parquet").unwrap(), DatasetFormat::Parquet);
    }

    #[test]
    fn test_detect_format_when_unknown_expect_error() {
        let actual = detect_format(&PathBuf::from("cells.txt")).unwrap_err();
        assert_eq!(actual.to_string(), "Unsupported file format: .txt");
    }

    #[test]
    fn test_read_csv_parses_cells_and_headers() {
        let data = "Voltage_V, Current_A ,Cell\n3.7,-1.5,a\n3.6,,b\n";
        let table = read_csv(data.as_bytes(), b',').unwrap();
        assert_eq!(table.column_names(), vec!["Voltage_V", "Current_A", "Cell"]);
        assert_eq!(table.shape(), (2, 3));
        assert_eq!(
            table.row(1),
            vec![&Value::Number(3.6), &Value::Missing, &Value::Text("b".into())]
        );
    }

    #[test]
    fn test_read_csv_when_semicolon_delimiter_expect_columns() {
        let table = read_csv("a;b\n1;2\n".as_bytes(), b';').unwrap();
        assert_eq!(table.shape(), (1, 2));
    }

    #[test]
    fn test_read_csv_when_ragged_row_expect_error() {
        let err = read_csv("a,b\n1,2,3\n".as_bytes(), b',').unwrap_err();
        let actual = err.to_string();
        let expected = "Malformed CSV record 1: expected 2 fields, found 3";
        assert!(actual.contains(expected), "\"{actual}\" doesn't contain {expected}");
    }

    #[test]
    fn test_read_csv_when_short_row_expect_missing_padding() {
        let table = read_csv("a,b,c\n1,2,3\n4\n5,6\n".as_bytes(), b',').unwrap();
        assert_eq!(table.shape(), (3, 3));
        assert_eq!(
            table.row(1),
            vec![&Value::Number(4.0), &Value::Missing, &Value::Missing]
        );
        assert_eq!(table.column("c").unwrap().missing_count(), 2);
    }

    #[test]
    fn test_read_json_records_fill_absent_keys() {
        let data = r#"[{"voltage": 3.7, "temp": 25}, {"voltage": null, "cycle": "7"}]"#;
        let table = read_json(data.as_bytes()).unwrap();
        assert_eq!(table.column_names(), vec!["voltage", "temp", "cycle"]);
        assert_eq!(
            table.row(1),
            vec![&Value::Missing, &Value::Missing, &Value::Number(7.0)]
        );
    }

    #[test]
    fn test_read_json_columns_of_arrays() {
        let table = read_json(r#"{"v": [1, 2], "i": [0.5, null]}"#.as_bytes()).unwrap();
        assert_eq!(table.shape(), (2, 2));
        assert_eq!(table.missing_count(), 1);
    }

    #[test]
    fn test_read_json_columns_of_index_maps() {
        let table =
            read_json(r#"{"v": {"0": 1, "1": 2}, "i": {"1": 0.5}}"#.as_bytes()).unwrap();
        assert_eq!(table.shape(), (2, 2));
        assert_eq!(table.row(0), vec![&Value::Number(1.0), &Value::Missing]);
    }

    #[test]
    fn test_read_json_when_scalar_expect_error() {
        assert!(read_json("42".as_bytes()).is_err());
    }

    #[test]
    fn test_write_csv_leaves_missing_cells_empty() {
        let table = read_csv("a,b\n1,\n2.5,x\n".as_bytes(), b',').unwrap();
        let mut out = Vec::new();
        write_csv(&table, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a,b\n1,\n2.5,x\n");
    }
}
