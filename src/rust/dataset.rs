//! Loading labeled datasets from CSV files.
//!
//! The first row is the header and names the columns; every following record
//! becomes a [`RowItem`].

use std::collections::BTreeMap;
use std::path::Path;

use csv::ReaderBuilder;

use crate::classifier::ClassifierError;

/// One dataset record: column name → value.
pub type RowItem = BTreeMap<String, String>;

/// Reads every record of the CSV file at `path`.
pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Vec<RowItem>, ClassifierError> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(ClassifierError::ValidationError("Dataset path cannot be empty".into()));
    }

    let reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    let rows = read_records(reader)?;
    log::info!("Loaded {} rows from {:?}", rows.len(), path);
    Ok(rows)
}

/// Reads CSV records from any reader, e.g. an in-memory buffer.
pub fn read_csv_from<R: std::io::Read>(input: R) -> Result<Vec<RowItem>, ClassifierError> {
    let reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input);
    read_records(reader)
}

fn read_records<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<RowItem>, ClassifierError> {
    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: RowItem = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}
