//! Trimming reads between fixed flanking motifs and counting them.

use crate::{counts::ReadCountTable, error::Error, Result};
use bio::io::{fasta, fastq};
use log::{debug, info};
use std::{fmt, str::FromStr};

/// Preset used by the MazF assay: reads between `CAA` and `TAA` of length 7
pub const DEFAULT_PRESET: &str = "CAA,7,TAA";

/// Flanking motifs and expected length of the sequence between them.
/// An empty motif disables trimming on that side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    /// Motif preceding the read, first occurrence is used
    pub five_prime: String,
    /// Exact length a trimmed read must have
    pub length: usize,
    /// Motif following the read, last occurrence is used
    pub three_prime: String,
}

/// Outcome of trimming one sequence
#[derive(Debug, PartialEq, Eq)]
pub enum Trimmed<'a> {
    /// Sequence between the anchors
    Read(&'a [u8]),
    /// Sequence contains an `N`
    Ambiguous,
    /// One of the anchor motifs was not found
    MissingAnchor,
    /// Sequence between the anchors is not of the expected length
    WrongLength,
}

impl Preset {
    /// Extracts the read between the anchor motifs
    pub fn trim<'a>(&self, seq: &'a [u8]) -> Trimmed<'a> {
        if seq.iter().any(|nuc| matches!(nuc, b'N' | b'n')) {
            return Trimmed::Ambiguous;
        }

        let start = if self.five_prime.is_empty() {
            0
        } else {
            let motif = self.five_prime.as_bytes();
            match find(seq, motif) {
                Some(pos) => pos + motif.len(),
                None => return Trimmed::MissingAnchor,
            }
        };

        let end = if self.three_prime.is_empty() {
            seq.len()
        } else {
            match rfind(seq, self.three_prime.as_bytes()) {
                Some(pos) => pos,
                None => return Trimmed::MissingAnchor,
            }
        };

        if end < start || end - start != self.length {
            Trimmed::WrongLength
        } else {
            Trimmed::Read(&seq[start..end])
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self {
            five_prime: "CAA".to_string(),
            length: 7,
            three_prime: "TAA".to_string(),
        }
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let fields = s.split(',').map(str::trim).collect::<Vec<_>>();
        if fields.len() != 3 {
            return Err(Error::InvalidInput(format!(
                "preset `{}` must be `5'motif,length,3'motif`",
                s
            )));
        }
        let length = fields[1].parse::<usize>().map_err(|_| {
            Error::InvalidInput(format!("preset length `{}` is not a number", fields[1]))
        })?;
        for motif in [fields[0], fields[2]].iter() {
            if !motif
                .bytes()
                .all(|nuc| matches!(nuc.to_ascii_uppercase(), b'A' | b'C' | b'G' | b'T'))
            {
                return Err(Error::InvalidInput(format!(
                    "Only A, G, C and T nucleotides are allowed in motifs but got `{}`",
                    motif
                )));
            }
        }

        Ok(Self {
            five_prime: fields[0].to_string(),
            length,
            three_prime: fields[2].to_string(),
        })
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.five_prime, self.length, self.three_prime)
    }
}

/// Tally of how the FASTQ records were handled
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct ExtractStats {
    pub records: usize,
    pub accepted: usize,
    pub ambiguous: usize,
    pub missing_anchor: usize,
    pub wrong_length: usize,
}

/// Trims every record of a FASTQ stream with `preset`, counts the accepted reads and
/// writes each accepted read to `fasta` under the record's id and description.
pub fn extract<R: std::io::Read, W: std::io::Write>(
    rdr: fastq::Reader<R>,
    preset: &Preset,
    fasta: &mut fasta::Writer<W>,
) -> Result<(ReadCountTable, ExtractStats)> {
    let mut counts = ReadCountTable::new();
    let mut stats = ExtractStats::default();

    for (i, record) in rdr.records().enumerate() {
        let record = record.map_err(|_| Error::FastqRecordError(i + 1))?;
        stats.records += 1;

        match preset.trim(record.seq()) {
            Trimmed::Read(read) => {
                let read = String::from_utf8(read.to_vec())?;
                fasta.write(record.id(), record.desc(), read.as_bytes())?;
                counts.increment(&read)?;
                stats.accepted += 1;
            }
            Trimmed::Ambiguous => stats.ambiguous += 1,
            Trimmed::MissingAnchor => stats.missing_anchor += 1,
            Trimmed::WrongLength => stats.wrong_length += 1,
        }
    }
    fasta.flush()?;

    debug!("{:?}", stats);
    info!(
        "Accepted {} of {} records ({} distinct reads) with preset {}",
        stats.accepted,
        stats.records,
        counts.len(),
        preset
    );
    Ok((counts, stats))
}

fn find(seq: &[u8], motif: &[u8]) -> Option<usize> {
    seq.windows(motif.len()).position(|window| window == motif)
}

fn rfind(seq: &[u8], motif: &[u8]) -> Option<usize> {
    seq.windows(motif.len()).rposition(|window| window == motif)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FASTQ: &[u8] = b"@r1 first
GGCAAACGTACGTAAGG
+
IIIIIIIIIIIIIIIII
@r2 second
GGCAAACGTACGTAAGG
+
IIIIIIIIIIIIIIIII
@r3
GGCAAACGNACGTAAGG
+
IIIIIIIIIIIIIIIII
@r4
GGCATACGTACGTAAGG
+
IIIIIIIIIIIIIIIII
@r5
GGCAAACGTACGTTAAGG
+
IIIIIIIIIIIIIIIIII
@r6
CAATTTTTTTTAA
+
IIIIIIIIIIIII
";

    #[test]
    fn parse_preset() {
        let preset = "CAA,7,TAA".parse::<Preset>().unwrap();
        assert_eq!(preset, Preset::default());
        assert_eq!(preset.to_string(), DEFAULT_PRESET);

        let open = ",5,".parse::<Preset>().unwrap();
        assert!(open.five_prime.is_empty() && open.three_prime.is_empty());

        assert!(matches!("CAA,7".parse::<Preset>(), Err(Error::InvalidInput(_))));
        assert!(matches!("CAA,x,TAA".parse::<Preset>(), Err(Error::InvalidInput(_))));
        assert!(matches!("CAX,7,TAA".parse::<Preset>(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn trim_between_anchors() {
        let preset = Preset::default();
        assert_eq!(preset.trim(b"GGCAAACGTACGTAAGG"), Trimmed::Read(&b"ACGTACG"[..]));
        assert_eq!(preset.trim(b"GGCAAACGNACGTAAGG"), Trimmed::Ambiguous);
        assert_eq!(preset.trim(b"GGCATACGTACGTAAGG"), Trimmed::MissingAnchor);
        assert_eq!(preset.trim(b"GGCAAACGTACGTTAAGG"), Trimmed::WrongLength);
        // 3' anchor found before the 5' anchor
        assert_eq!(preset.trim(b"TAAGGCAA"), Trimmed::WrongLength);
        assert_eq!(preset.trim(b"CA"), Trimmed::MissingAnchor);
    }

    #[test]
    fn trim_uses_first_five_prime_and_last_three_prime() {
        let preset = "CAA,10,TAA".parse::<Preset>().unwrap();
        assert_eq!(preset.trim(b"CAAGCAAGGTAAGTAA"), Trimmed::Read(&b"GCAAGGTAAG"[..]));
    }

    #[test]
    fn trim_without_anchors() {
        let preset = ",4,".parse::<Preset>().unwrap();
        assert_eq!(preset.trim(b"ACGT"), Trimmed::Read(&b"ACGT"[..]));
        assert_eq!(preset.trim(b"ACGTA"), Trimmed::WrongLength);

        let five_only = "CAA,3,".parse::<Preset>().unwrap();
        assert_eq!(five_only.trim(b"TTCAAGGG"), Trimmed::Read(&b"GGG"[..]));
    }

    #[test]
    fn extract_counts_and_dumps_reads() {
        let rdr = fastq::Reader::new(FASTQ);
        let mut out = Vec::new();
        let (counts, stats) = {
            let mut writer = fasta::Writer::new(&mut out);
            extract(rdr, &Preset::default(), &mut writer).unwrap()
        };

        assert_eq!(counts.get("ACGTACG"), 2);
        assert_eq!(counts.get("TTTTTTT"), 1);
        assert_eq!(counts.total(), 3);
        assert_eq!(
            stats,
            ExtractStats {
                records: 6,
                accepted: 3,
                ambiguous: 1,
                missing_anchor: 1,
                wrong_length: 1,
            }
        );

        let fasta = String::from_utf8(out).unwrap();
        assert!(fasta.starts_with(">r1 first\nACGTACG\n>r2 second\nACGTACG\n"));
        assert!(fasta.contains(">r6\nTTTTTTT\n"));
    }
}
