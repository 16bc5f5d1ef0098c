// Ingestion adapter: CSV exports of the ORDERED and LOADED worksheets.
//
// Rows come out untyped, keyed by the header exactly as it appears in the
// sheet. Cleaning is left to `normalize`.
use crate::error::KpiError;
use crate::types::{FieldValue, RawRecord};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub parse_errors: usize,
    /// Header names that appeared more than once; only the first is kept.
    pub duplicate_headers: Vec<String>,
}

/// Read every row of a worksheet export.
///
/// Short rows simply lack the trailing fields. Rows the CSV reader cannot
/// decode are counted and skipped.
pub fn load_records<R: Read>(reader: R) -> Result<(Vec<RawRecord>, LoadReport), KpiError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut report = LoadReport::default();
    for (i, h) in headers.iter().enumerate() {
        let repeated = headers.iter().take(i).any(|earlier| earlier == h);
        if repeated && !report.duplicate_headers.iter().any(|d| d == h) {
            report.duplicate_headers.push(h.to_string());
        }
    }

    let mut records = Vec::new();
    for result in rdr.records() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                log::debug!("skipping unreadable row {}: {}", report.total_rows, e);
                report.parse_errors += 1;
                continue;
            }
        };
        let mut record = RawRecord::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            record
                .entry(header.to_string())
                .or_insert_with(|| FieldValue::from(cell));
        }
        records.push(record);
    }
    Ok((records, report))
}

pub fn load_file(path: &Path) -> Result<(Vec<RawRecord>, LoadReport), KpiError> {
    let file = File::open(path)?;
    let (records, report) = load_records(file)?;
    log::info!(
        "loaded {} rows from {} ({} unreadable)",
        records.len(),
        path.display(),
        report.parse_errors
    );
    if !report.duplicate_headers.is_empty() {
        log::warn!(
            "{}: duplicate headers {:?}, keeping the first of each",
            path.display(),
            report.duplicate_headers
        );
    }
    Ok((records, report))
}
