//! FASTA output of enriched reads.

use crate::{enrichment::EnrichmentTable, Result};
use bio::io::fasta;
use log::info;

/// Default number of FASTA records emitted per unit of enrichment ratio
pub const DEFAULT_REPLICATES_PER_RATIO: f64 = 10.0;
/// Default cap on FASTA records emitted over a whole run
pub const DEFAULT_MAX_ENTRIES: usize = 500_000;
/// Default character appended to every emitted read
pub const DEFAULT_SENTINEL: char = 'N';

/// Controls how enriched reads are expanded into FASTA records
#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    /// An enriched read is emitted `floor(ratio * replicates_per_ratio)` times
    pub replicates_per_ratio: f64,
    /// Emission stops once this many records were written
    pub max_entries: usize,
    /// Appended to each emitted read
    pub sentinel: char,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            replicates_per_ratio: DEFAULT_REPLICATES_PER_RATIO,
            max_entries: DEFAULT_MAX_ENTRIES,
            sentinel: DEFAULT_SENTINEL,
        }
    }
}

/// Writes the reads whose `log_ratio` exceeds `threshold`, highest ratio first, each
/// repeated in proportion to its ratio as records `r1`, `r2`, ... and returns the number
/// of records written.
pub fn write_enriched_fasta<W: std::io::Write>(
    table: &EnrichmentTable,
    threshold: f64,
    config: &ReportConfig,
    fasta: &mut fasta::Writer<W>,
) -> Result<usize> {
    let mut written = 0;

    'rows: for row in table.enriched(threshold) {
        info!(
            "enriched_sequence={} ratio={:.7} log_ratio={:.7}",
            row.read, row.ratio, row.log_ratio
        );
        let mut seq = row.read.clone();
        seq.push(config.sentinel);

        let replicates = (row.ratio * config.replicates_per_ratio).floor() as usize;
        for _ in 0..replicates {
            if written >= config.max_entries {
                break 'rows;
            }
            written += 1;
            fasta.write(&format!("r{}", written), None, seq.as_bytes())?;
        }
    }
    fasta.flush()?;

    Ok(written)
}
