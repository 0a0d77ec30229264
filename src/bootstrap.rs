//! Bootstrap null distribution of the top enrichment statistic.

use crate::{counts::ReadCountTable, enrichment::EnrichmentTable, error::Error, Result};
use log::{debug, info};
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Instant;

/// Default number of bootstrap trials
pub const DEFAULT_TRIALS: usize = 100;

/// Maximum `log_ratio` of each bootstrap trial, in trial order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BootstrapSample(Vec<f64>);

impl BootstrapSample {
    /// Recorded maxima
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Number of trials recorded
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Checks if no trial was recorded
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Largest recorded maximum
    pub fn max(&self) -> Result<f64> {
        self.0
            .iter()
            .copied()
            .fold(None, |max: Option<f64>, v| Some(max.map_or(v, |m| m.max(v))))
            .ok_or_else(|| Error::InsufficientData("no bootstrap trials were run".to_string()))
    }

    /// The `q`-quantile with linear interpolation between the closest ranks
    pub fn quantile(&self, q: f64) -> Result<f64> {
        if !(0.0..=1.0).contains(&q) {
            return Err(Error::InsufficientData(format!(
                "quantile {} is outside [0, 1]",
                q
            )));
        }
        if self.0.is_empty() {
            return Err(Error::InsufficientData(
                "no bootstrap trials were run".to_string(),
            ));
        }

        let mut sorted = self.0.clone();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let h = (sorted.len() - 1) as f64 * q;
        let lo = h.floor() as usize;
        let hi = (lo + 1).min(sorted.len() - 1);

        Ok(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
    }
}

impl From<Vec<f64>> for BootstrapSample {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Builds a null distribution of the top enrichment statistic by repeatedly
/// resampling the control library.
///
/// Each trial draws `min(total(control), total(sample))` reads with replacement from
/// the control library, weighted by their counts, and scores the draw as the sample
/// against the untouched control. Trial `i` uses a ChaCha8 stream seeded from
/// `seed` with stream id `i`, so a run is reproducible regardless of how trials are
/// spread over threads.
#[derive(Clone)]
pub struct Bootstrap {
    trials: usize,
    seed: u64,
    pseudocount: u64,
    stop: Option<Arc<AtomicBool>>,
    on_trial: Option<Arc<dyn Fn(usize, f64) + Send + Sync>>,
}

impl fmt::Debug for Bootstrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bootstrap")
            .field("trials", &self.trials)
            .field("seed", &self.seed)
            .field("pseudocount", &self.pseudocount)
            .field("stop", &self.stop)
            .field("on_trial", &self.on_trial.is_some())
            .finish()
    }
}

impl Default for Bootstrap {
    fn default() -> Self {
        Self::new(DEFAULT_TRIALS)
    }
}

impl Bootstrap {
    /// Configures `trials` trials with a random seed
    pub fn new(trials: usize) -> Self {
        Self {
            trials,
            seed: rand::thread_rng().gen(),
            pseudocount: crate::enrichment::PSEUDOCOUNT,
            stop: None,
            on_trial: None,
        }
    }

    /// Fixes the seed of the random streams
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Pseudocount used when scoring each trial
    pub fn pseudocount(mut self, pseudocount: u64) -> Self {
        self.pseudocount = pseudocount;
        self
    }

    /// Signal checked before every trial, once raised the estimate fails with [`Error::Cancelled`]
    pub fn stop_signal(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Called with the trial index and its maximum `log_ratio` after every successful
    /// trial, from whichever worker thread ran it
    pub fn on_trial<F>(mut self, callback: F) -> Self
    where
        F: Fn(usize, f64) + Send + Sync + 'static,
    {
        self.on_trial = Some(Arc::new(callback));
        self
    }

    /// Seed of the random streams
    pub fn get_seed(&self) -> u64 {
        self.seed
    }

    /// Pseudocount used when scoring each trial
    pub fn get_pseudocount(&self) -> u64 {
        self.pseudocount
    }

    /// Number of configured trials
    pub fn trials(&self) -> usize {
        self.trials
    }

    /// Number of reads drawn per trial
    pub fn resample_size(control: &ReadCountTable, sample: &ReadCountTable) -> u64 {
        control.total().min(sample.total())
    }

    /// Draws `n` reads with replacement from `control`, each read chosen with
    /// probability proportional to its count, and tallies them into a new table.
    pub fn resample<R: Rng + ?Sized>(
        control: &ReadCountTable,
        n: u64,
        rng: &mut R,
    ) -> Result<ReadCountTable> {
        Resampler::new(control)?.draw(n, rng)
    }

    /// Runs all trials and collects the maximum `log_ratio` of each
    pub fn estimate(
        &self,
        control: &ReadCountTable,
        sample: &ReadCountTable,
    ) -> Result<BootstrapSample> {
        if control.total() == 0 {
            return Err(Error::EmptyLibrary("control"));
        }
        if sample.total() == 0 {
            return Err(Error::EmptyLibrary("sample"));
        }

        let n = Self::resample_size(control, sample);
        info!("Control library           : {:>9}", control.total());
        info!("Sample library            : {:>9}", sample.total());
        info!("Bootstrap control library : {:>9}", n);
        info!("Running {} bootstrap trials with seed {}", self.trials, self.seed);

        let resampler = Resampler::new(control)?;

        let maxima = (0..self.trials)
            .into_par_iter()
            .map(|trial| self.run_trial(trial, &resampler, control, n))
            .collect::<Result<Vec<f64>>>()?;

        Ok(BootstrapSample(maxima))
    }

    fn run_trial(
        &self,
        trial: usize,
        resampler: &Resampler<'_>,
        control: &ReadCountTable,
        n: u64,
    ) -> Result<f64> {
        if let Some(ref stop) = self.stop {
            if stop.load(Ordering::Relaxed) {
                return Err(Error::Cancelled(trial));
            }
        }
        let start = Instant::now();

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(trial as u64);

        let resampled = resampler
            .draw(n, &mut rng)
            .map_err(|e| e.in_trial(trial, "resampling"))?;
        let enrichment =
            EnrichmentTable::compute_with_pseudocount(control, &resampled, self.pseudocount)
                .map_err(|e| e.in_trial(trial, "scoring"))?;
        let max_log_ratio = enrichment.max_log_ratio().ok_or_else(|| {
            Error::InsufficientData("enrichment table has no rows".to_string())
                .in_trial(trial, "statistic")
        })?;

        debug!(
            "trial={} max_log_ratio={:.7} time={:.3}s",
            trial,
            max_log_ratio,
            start.elapsed().as_secs_f64()
        );
        if let Some(ref callback) = self.on_trial {
            callback(trial, max_log_ratio);
        }
        Ok(max_log_ratio)
    }
}

/// Categorical sampler over the reads of one library. Each draw is a binary
/// search over the cumulative counts.
struct Resampler<'a> {
    reads: Vec<&'a str>,
    weights: WeightedIndex<u64>,
}

impl<'a> Resampler<'a> {
    fn new(library: &'a ReadCountTable) -> Result<Self> {
        if library.total() == 0 {
            return Err(Error::EmptyLibrary("control"));
        }
        let (reads, counts): (Vec<&str>, Vec<u64>) = library.iter().unzip();
        let weights = WeightedIndex::new(counts)?;
        Ok(Self { reads, weights })
    }

    fn draw<R: Rng + ?Sized>(&self, n: u64, rng: &mut R) -> Result<ReadCountTable> {
        let mut tally = vec![0u64; self.reads.len()];
        for _ in 0..n {
            tally[self.weights.sample(rng)] += 1;
        }

        let drawn = self
            .reads
            .iter()
            .zip(tally)
            .filter(|(_, count)| *count > 0)
            .map(|(read, count)| (read.to_string(), count))
            .collect::<BTreeMap<String, u64>>();

        Ok(ReadCountTable::from_parts(drawn, n))
    }
}

/// Runs `trials` bootstrap trials with a random seed
pub fn estimate(
    control: &ReadCountTable,
    sample: &ReadCountTable,
    trials: usize,
) -> Result<BootstrapSample> {
    Bootstrap::new(trials).estimate(control, sample)
}

/// Significance threshold on `log_ratio`: the `q`-quantile of the bootstrap maxima
pub fn threshold(sample_dist: &BootstrapSample, q: f64) -> Result<f64> {
    sample_dist.quantile(q)
}
