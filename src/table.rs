//! Delimited read count and enrichment tables.

use crate::{counts::ReadCountTable, enrichment::EnrichmentTable, error::Error, Result};
use log::debug;
use std::path::Path;

/// Loads a `read,count` table from a delimited file with a header row, optionally gzipped.
/// The first two columns are used whatever their header says.
pub fn read_count_table<P: AsRef<Path>>(path: P) -> Result<ReadCountTable> {
    let (rdr, format) = niffler::from_path(path.as_ref())?;
    debug!(
        "Reading read counts from {} ({:?})",
        path.as_ref().display(),
        format
    );
    parse_count_table(rdr)
}

/// Parses a `read,count` table from any reader
pub fn parse_count_table<R: std::io::Read>(rdr: R) -> Result<ReadCountTable> {
    let mut csv_rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(rdr);

    let mut table = ReadCountTable::new();
    for (i, record) in csv_rdr.records().enumerate() {
        let record = record?;
        // header is line 1
        let line = i + 2;
        let (read, count) = match (record.get(0), record.get(1)) {
            (Some(read), Some(count)) if record.len() == 2 && !read.is_empty() => (read, count),
            _ => {
                return Err(Error::InvalidInput(format!(
                    "line {} must contain exactly a read and a count but has {} fields",
                    line,
                    record.len()
                )))
            }
        };
        let count = count.parse::<i64>().map_err(|_| {
            Error::InvalidInput(format!("line {}: `{}` is not an integer count", line, count))
        })?;
        table
            .insert(read, count)
            .map_err(|e| Error::InvalidInput(format!("line {}: {}", line, e)))?;
    }
    Ok(table)
}

/// Writes a read count table with header `read,<label>`, least observed reads first
pub fn write_count_table<W: std::io::Write>(
    table: &ReadCountTable,
    label: &str,
    wtr: W,
) -> Result<()> {
    let mut csv_wtr = csv::Writer::from_writer(wtr);
    csv_wtr.write_record(&["read", label])?;

    let mut rows = table.iter().collect::<Vec<_>>();
    rows.sort_by_key(|(_, count)| *count);
    for (read, count) in rows {
        let count = count.to_string();
        csv_wtr.write_record(&[read, count.as_str()])?;
    }
    csv_wtr.flush()?;
    Ok(())
}

/// Writes every row of an enrichment table in its current order
pub fn write_enrichment_table<W: std::io::Write>(table: &EnrichmentTable, wtr: W) -> Result<()> {
    let mut csv_wtr = csv::Writer::from_writer(wtr);
    for row in table.rows() {
        csv_wtr.serialize(row)?;
    }
    if table.is_empty() {
        csv_wtr.write_record(&[
            "read",
            "control",
            "sample",
            "control_norm",
            "sample_norm",
            "ratio",
            "log_ratio",
        ])?;
    }
    csv_wtr.flush()?;
    Ok(())
}
