#![warn(missing_debug_implementations, rust_2018_idioms, missing_docs)]

//! Enrichment analysis of MazF cleavage sites.
//!
//! Reads trimmed from a control and a cleaved sample library are compared by their
//! normalized frequencies. Reads relatively depleted by the cleavage show up with a
//! high `control / sample` ratio. Whether a ratio is higher than chance is decided by
//! a bootstrap: the control library is resampled down to the depth of the smaller
//! library, scored against itself, and a quantile of the per-trial maxima becomes the
//! `log_ratio` threshold.
//!
//! ```no_run
//! use rustymazf::{bootstrap::Bootstrap, enrichment::EnrichmentTable, table};
//!
//! # fn main() -> rustymazf::Result<()> {
//! let control = table::read_count_table("control.csv")?;
//! let sample = table::read_count_table("sample.csv")?;
//!
//! let dist = Bootstrap::new(100).seed(1).estimate(&control, &sample)?;
//! let threshold = dist.quantile(0.95)?;
//!
//! let enrichment = EnrichmentTable::compute(&control, &sample)?;
//! for row in enrichment.enriched(threshold) {
//!     println!("{}\t{}", row.read, row.log_ratio);
//! }
//! # Ok(())
//! # }
//! ```

pub mod bootstrap;
pub mod counts;
pub mod enrichment;
pub mod error;
pub mod extract;
pub mod report;
pub mod table;

pub use crate::error::Error;

/// Result type used across the crate
pub type Result<T> = std::result::Result<T, crate::error::Error>;
