//! Normalized enrichment of reads between a control and a sample library.

use crate::{counts::ReadCountTable, error::Error, Result};
use log::trace;
use serde::Serialize;
use std::collections::BTreeSet;

/// Pseudocount added to every count on both sides before normalization
pub const PSEUDOCOUNT: u64 = 1;

/// Comparison of a single read between the control and sample libraries
#[derive(Debug, Clone, PartialEq, Serialize)]
#[allow(missing_docs)]
pub struct EnrichmentRow {
    pub read: String,
    #[serde(rename = "control")]
    pub control_count: u64,
    #[serde(rename = "sample")]
    pub sample_count: u64,
    pub control_norm: f64,
    pub sample_norm: f64,
    pub ratio: f64,
    pub log_ratio: f64,
}

/// Every read of two libraries with its normalized enrichment ratio, sorted by
/// descending `ratio`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentTable {
    rows: Vec<EnrichmentRow>,
}

impl EnrichmentTable {
    /// Scores `control` against `sample` with the default pseudocount of 1
    pub fn compute(control: &ReadCountTable, sample: &ReadCountTable) -> Result<Self> {
        Self::compute_with_pseudocount(control, sample, PSEUDOCOUNT)
    }

    /// Scores `control` against `sample`.
    ///
    /// 1. Reads of both tables are merged into one key set (full outer join).
    /// 2. A read absent from one table takes the count 0 on that side.
    /// 3. `pseudocount` is added to every count on both sides.
    /// 4. Each side is divided by its own adjusted total, giving the read's frequency
    ///    within its library.
    /// 5. `ratio = control_norm / sample_norm` and `log_ratio = log10(ratio)`.
    ///
    /// Zero frequencies and non-finite values, which only a pseudocount of 0 can
    /// produce, fail with [`Error::NumericError`].
    pub fn compute_with_pseudocount(
        control: &ReadCountTable,
        sample: &ReadCountTable,
        pseudocount: u64,
    ) -> Result<Self> {
        let reads = control
            .iter()
            .chain(sample.iter())
            .map(|(read, _)| read)
            .collect::<BTreeSet<&str>>();

        let counts = reads
            .into_iter()
            .map(|read| {
                match (
                    control.get(read).checked_add(pseudocount),
                    sample.get(read).checked_add(pseudocount),
                ) {
                    (Some(control_count), Some(sample_count)) => {
                        Ok((read, control_count, sample_count))
                    }
                    _ => Err(numeric_error(read, "count overflows with the pseudocount")),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let control_total = adjusted_total(counts.iter().map(|(_, c, _)| *c), "control")? as f64;
        let sample_total = adjusted_total(counts.iter().map(|(_, _, s)| *s), "sample")? as f64;
        trace!(
            "Adjusted totals are {} in control and {} in sample over {} reads",
            control_total,
            sample_total,
            counts.len()
        );

        let mut rows = counts
            .into_iter()
            .map(|(read, control_count, sample_count)| {
                let control_norm = control_count as f64 / control_total;
                let sample_norm = sample_count as f64 / sample_total;
                if sample_norm == 0.0 {
                    return Err(numeric_error(read, "sample frequency is zero"));
                }
                let ratio = control_norm / sample_norm;
                let log_ratio = ratio.log10();
                if !ratio.is_finite() || !log_ratio.is_finite() {
                    return Err(numeric_error(
                        read,
                        &format!("ratio {} has no finite log10", ratio),
                    ));
                }
                Ok(EnrichmentRow {
                    read: read.to_string(),
                    control_count,
                    sample_count,
                    control_norm,
                    sample_norm,
                    ratio,
                    log_ratio,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        rows.sort_by(|a, b| b.ratio.total_cmp(&a.ratio));

        Ok(Self { rows })
    }

    /// Rows in descending `ratio` order
    pub fn rows(&self) -> &[EnrichmentRow] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Checks if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row with the highest ratio
    pub fn top(&self) -> Option<&EnrichmentRow> {
        self.rows.first()
    }

    /// Largest `log_ratio` in the table
    pub fn max_log_ratio(&self) -> Option<f64> {
        self.top().map(|row| row.log_ratio)
    }

    /// Rows whose `log_ratio` exceeds `threshold`, highest first
    pub fn enriched(&self, threshold: f64) -> impl Iterator<Item = &EnrichmentRow> + '_ {
        self.rows
            .iter()
            .take_while(move |row| row.log_ratio > threshold)
    }
}

fn adjusted_total<I: Iterator<Item = u64>>(mut counts: I, library: &str) -> Result<u64> {
    counts
        .try_fold(0u64, |total, count| total.checked_add(count))
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "adjusted {} total overflows after adding pseudocounts",
                library
            ))
        })
}

fn numeric_error(read: &str, detail: &str) -> Error {
    Error::NumericError {
        read: read.to_string(),
        detail: detail.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn table(entries: &[(&str, i64)]) -> ReadCountTable {
        let mut table = ReadCountTable::new();
        for (read, count) in entries {
            table.insert(*read, *count).unwrap();
        }
        table
    }

    #[test]
    fn worked_example() {
        let control = table(&[("A", 1), ("B", 3)]);
        let sample = table(&[("B", 2)]);

        let enrichment = EnrichmentTable::compute(&control, &sample).unwrap();
        let rows = enrichment.rows();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].read, "A");
        assert_eq!(rows[0].control_count, 2);
        assert_eq!(rows[0].sample_count, 1);
        assert_approx_eq!(rows[0].control_norm, 2.0 / 6.0);
        assert_approx_eq!(rows[0].sample_norm, 0.25);
        assert_approx_eq!(rows[0].ratio, 4.0 / 3.0);
        assert_approx_eq!(rows[0].log_ratio, 0.1249387, 1e-6);

        assert_eq!(rows[1].read, "B");
        assert_eq!(rows[1].control_count, 4);
        assert_eq!(rows[1].sample_count, 3);
        assert_approx_eq!(rows[1].ratio, 8.0 / 9.0);
        assert_approx_eq!(rows[1].log_ratio, -0.0511525, 1e-6);
    }

    #[test]
    fn columns_are_consistent() {
        let control = table(&[("AAA", 10), ("CCC", 0), ("GGG", 7), ("TTT", 120)]);
        let sample = table(&[("AAA", 3), ("ACG", 9), ("TTT", 40), ("GGG", 0)]);

        let enrichment = EnrichmentTable::compute(&control, &sample).unwrap();

        assert_eq!(enrichment.len(), 5);
        assert_approx_eq!(enrichment.rows().iter().map(|r| r.control_norm).sum::<f64>(), 1.0);
        assert_approx_eq!(enrichment.rows().iter().map(|r| r.sample_norm).sum::<f64>(), 1.0);
        for row in enrichment.rows() {
            assert_approx_eq!(row.ratio, row.control_norm / row.sample_norm);
            assert_approx_eq!(row.log_ratio, row.ratio.log10());
            assert!(row.control_count >= 1);
            assert!(row.sample_count >= 1);
        }
        assert!(enrichment
            .rows()
            .windows(2)
            .all(|pair| pair[0].ratio >= pair[1].ratio));
    }

    #[test]
    fn sample_only_reads_get_pseudocount() {
        let control = table(&[("AAA", 5)]);
        let sample = table(&[("AAA", 5), ("CCC", 4)]);

        let enrichment = EnrichmentTable::compute(&control, &sample).unwrap();
        let ccc = enrichment.rows().iter().find(|r| r.read == "CCC").unwrap();

        assert_eq!(ccc.control_count, 1);
        assert_eq!(ccc.sample_count, 5);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let control = table(&[("AAA", 10), ("CCC", 3), ("GGG", 7)]);
        let sample = table(&[("AAA", 3), ("GGG", 12)]);

        let first = EnrichmentTable::compute(&control, &sample).unwrap();
        let second = EnrichmentTable::compute(&control, &sample).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn empty_inputs() {
        let enrichment =
            EnrichmentTable::compute(&ReadCountTable::new(), &ReadCountTable::new()).unwrap();
        assert!(enrichment.is_empty());
        assert_eq!(enrichment.max_log_ratio(), None);
    }

    #[test]
    fn zero_pseudocount_is_guarded() {
        let control = table(&[("AAA", 5)]);
        let sample = table(&[("CCC", 4)]);

        let err = EnrichmentTable::compute_with_pseudocount(&control, &sample, 0).unwrap_err();
        assert!(matches!(err, Error::NumericError { .. }));
    }

    #[test]
    fn adjusted_totals_do_not_overflow() {
        // raw total is u64::MAX - 1, the two pseudocounts push it past the limit
        let full = table(&[("AAA", i64::MAX), ("CCC", i64::MAX)]);
        let small = table(&[("AAA", 1)]);

        let err = EnrichmentTable::compute(&full, &small).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let err = EnrichmentTable::compute_with_pseudocount(&small, &small, u64::MAX).unwrap_err();
        assert!(matches!(err, Error::NumericError { .. }));
    }

    #[test]
    fn enriched_rows_above_threshold() {
        let control = table(&[("AAA", 50), ("CCC", 10), ("GGG", 10)]);
        let sample = table(&[("AAA", 1), ("CCC", 10), ("GGG", 30)]);

        let enrichment = EnrichmentTable::compute(&control, &sample).unwrap();
        let enriched = enrichment.enriched(0.5).collect::<Vec<_>>();

        assert_eq!(enriched.len(), 1);
        assert_eq!(enriched[0].read, "AAA");
        assert_eq!(enrichment.enriched(10.0).count(), 0);
    }
}
