//! Error type shared by the library and the binary.

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors raised while scoring libraries, bootstrapping, or reading and writing tables
pub enum Error {
    #[error("Invalid input: {0}")]
    /// Malformed or negative counts, malformed rows or configuration
    InvalidInput(String),
    #[error("The {0} library has a total count of zero")]
    /// Weighted sampling over a library without observations
    EmptyLibrary(&'static str),
    #[error("Insufficient data: {0}")]
    /// No bootstrap trials to take a quantile of, or a quantile outside [0, 1]
    InsufficientData(String),
    #[error("Numeric error for read `{read}`: {detail}")]
    /// Zero frequency or non-finite value in the ratio computation
    NumericError {
        /// Read the value was computed for
        read: String,
        /// What went wrong
        detail: String,
    },
    #[error("Bootstrap trial {trial} failed during {stage}: {source}")]
    /// A single bootstrap trial failed
    TrialFailed {
        /// Zero based trial index
        trial: usize,
        /// `resampling`, `scoring` or `statistic`
        stage: &'static str,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },
    #[error("Bootstrap stopped before trial {0}")]
    /// Stop signal raised between trials
    Cancelled(usize),
    #[error("Could not read or write file")]
    /// I/O Error
    Io(#[from] std::io::Error),
    #[error("Could not read/write delimited table")]
    /// CSV Error
    Csv(#[from] csv::Error),
    #[error("Could not open possibly compressed input")]
    /// Compression detection error
    Niffler(#[from] niffler::Error),
    #[error("Could not build sampling weights")]
    /// Weighted index construction error
    Weights(#[from] rand::distributions::WeightedError),
    #[error("Could not convert bytes as it is invalid UTF-8")]
    /// Data is not in UTF-8 format
    NotUTF8(#[from] std::string::FromUtf8Error),
    #[error("Could not read FASTQ entry at record {0}")]
    /// Malformed FASTQ record
    FastqRecordError(usize),
    #[error("Could not spawn threads")]
    /// Create thread pools erorr
    ThreadError,
}

impl Error {
    pub(crate) fn in_trial(self, trial: usize, stage: &'static str) -> Self {
        Error::TrialFailed {
            trial,
            stage,
            source: Box::new(self),
        }
    }
}
