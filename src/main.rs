#![warn(missing_debug_implementations, rust_2018_idioms)]

//! Command line front end: `extract` builds read count tables from FASTQ, `enrich`
//! scores two tables and calls enriched reads against a bootstrap threshold.
mod cli;

use crate::cli::{Command, RustyMazf};
use bio::io::{fasta, fastq};
use log::info;
use rustymazf::{
    bootstrap::Bootstrap,
    enrichment::EnrichmentTable,
    error::Error,
    extract::{extract, Preset},
    report::{write_enriched_fasta, ReportConfig},
    table, Result,
};
use std::{fs::File, io::BufWriter, path::Path};
use structopt::StructOpt;

fn main() -> Result<()> {
    let opt = RustyMazf::from_args();
    opt.set_logging();

    rayon::ThreadPoolBuilder::new()
        .num_threads(opt.threads)
        .build_global()
        .map_err(|_| Error::ThreadError)?;

    match opt.cmd {
        Command::Extract {
            ref fastq,
            ref output_file,
            ref output_fasta,
            ref label,
            ref preset,
        } => run_extract(fastq, output_file, output_fasta, label, preset),
        Command::Enrich {
            ref control,
            ref sample,
            bootstrap,
            quantile,
            seed,
            pseudocount,
            ref output_csv,
            gen_fasta,
            ref output_fasta,
            max_entries,
            replicates_per_ratio,
        } => {
            let mut trials = Bootstrap::new(bootstrap).pseudocount(pseudocount);
            if let Some(seed) = seed {
                trials = trials.seed(seed);
            }
            let report = if gen_fasta {
                Some((
                    output_fasta.as_path(),
                    ReportConfig {
                        replicates_per_ratio,
                        max_entries,
                        ..ReportConfig::default()
                    },
                ))
            } else {
                None
            };
            run_enrich(control, sample, &trials, quantile, output_csv, report)
        }
    }
}

fn run_extract(
    input: &Path,
    output_file: &Path,
    output_fasta: &Path,
    label: &str,
    preset: &Preset,
) -> Result<()> {
    let (rdr, _) = niffler::from_path(input)?;
    let fastq_rdr = fastq::Reader::new(rdr);
    let mut fasta_wtr = fasta::Writer::new(BufWriter::new(File::create(output_fasta)?));

    let (counts, stats) = extract(fastq_rdr, preset, &mut fasta_wtr)?;
    info!(
        "Discarded {} ambiguous, {} without anchors and {} of wrong length",
        stats.ambiguous, stats.missing_anchor, stats.wrong_length
    );

    table::write_count_table(&counts, label, BufWriter::new(File::create(output_file)?))?;
    Ok(())
}

fn run_enrich(
    control: &Path,
    sample: &Path,
    bootstrap: &Bootstrap,
    quantile: f64,
    output_csv: &Path,
    report: Option<(&Path, ReportConfig)>,
) -> Result<()> {
    let control = table::read_count_table(control)?;
    let sample = table::read_count_table(sample)?;

    println!("control_library={}", control.total());
    println!("sample_library={}", sample.total());
    println!(
        "bootstrap_library={}",
        Bootstrap::resample_size(&control, &sample)
    );
    println!("seed={}", bootstrap.get_seed());

    let dist = bootstrap.estimate(&control, &sample)?;

    println!("q95_log_ratio={:.7}", dist.quantile(0.95)?);
    println!("q99_log_ratio={:.7}", dist.quantile(0.99)?);
    println!("max_log_ratio={:.7}", dist.max()?);

    let threshold = dist.quantile(quantile)?;
    println!("threshold={:.7}", threshold);

    let enrichment =
        EnrichmentTable::compute_with_pseudocount(&control, &sample, bootstrap.get_pseudocount())?;
    table::write_enrichment_table(&enrichment, BufWriter::new(File::create(output_csv)?))?;
    println!("enriched={}", enrichment.enriched(threshold).count());

    if let Some((path, config)) = report {
        let mut fasta_wtr = fasta::Writer::new(BufWriter::new(File::create(path)?));
        let written = write_enriched_fasta(&enrichment, threshold, &config, &mut fasta_wtr)?;
        info!("Wrote {} enriched records to {}", written, path.display());
    }

    Ok(())
}
