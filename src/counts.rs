//! Read count tables.

use crate::{error::Error, Result};
use std::collections::BTreeMap;

/// Number of observations of each exact read in one sequencing library.
///
/// Reads are kept in lexicographic order so that iterating the table, and any
/// seeded resampling built on top of it, is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadCountTable {
    counts: BTreeMap<String, u64>,
    total: u64,
}

impl ReadCountTable {
    /// Creates an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a read with its count. Fails if the count is negative, the read is already
    /// present, or the library depth would no longer fit in a `u64`.
    pub fn insert<S: Into<String>>(&mut self, read: S, count: i64) -> Result<()> {
        let read = read.into();
        if count < 0 {
            return Err(Error::InvalidInput(format!(
                "read `{}` has negative count {}",
                read, count
            )));
        }
        if self.counts.contains_key(&read) {
            return Err(Error::InvalidInput(format!(
                "read `{}` appears more than once",
                read
            )));
        }
        self.total = self.total.checked_add(count as u64).ok_or_else(|| {
            Error::InvalidInput(format!(
                "count {} of read `{}` overflows the library total",
                count, read
            ))
        })?;
        self.counts.insert(read, count as u64);
        Ok(())
    }

    /// Records one more observation of `read`
    pub fn increment(&mut self, read: &str) -> Result<()> {
        self.total = self.total.checked_add(1).ok_or_else(|| {
            Error::InvalidInput(format!("read `{}` overflows the library total", read))
        })?;
        match self.counts.get_mut(read) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(read.to_string(), 1);
            }
        }
        Ok(())
    }

    /// Count for `read`, zero when absent
    pub fn get(&self, read: &str) -> u64 {
        self.counts.get(read).copied().unwrap_or(0)
    }

    /// Sum of all counts, i.e. the library depth
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct reads
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Checks if no read is present
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterates `(read, count)` in read order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> + '_ {
        self.counts.iter().map(|(read, count)| (read.as_str(), *count))
    }

    /// `total` must be the sum of the counts in `counts`
    pub(crate) fn from_parts(counts: BTreeMap<String, u64>, total: u64) -> Self {
        Self { counts, total }
    }
}
