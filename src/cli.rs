use log::LevelFilter;
use rustymazf::extract::Preset;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "rustymazf",
    about = "Bootstrap-thresholded enrichment of MazF cleavage site reads"
)]
pub(crate) struct RustyMazf {
    #[structopt(
        short,
        long,
        global = true,
        parse(from_occurrences),
        help = "Logging verbosity, repeat for more (-v info, -vv debug, -vvv trace)"
    )]
    pub verbosity: u8,
    #[structopt(
        short,
        long,
        global = true,
        default_value = "0",
        help = "Number of threads, 0 uses all available cores"
    )]
    pub threads: usize,
    #[structopt(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, StructOpt)]
pub(crate) enum Command {
    /// Trims reads between the preset anchors and counts them
    Extract {
        #[structopt(help = "FASTQ file, optionally gzipped", parse(from_os_str))]
        fastq: PathBuf,
        #[structopt(
            long,
            default_value = "read_count.csv",
            help = "Read count table",
            parse(from_os_str)
        )]
        output_file: PathBuf,
        #[structopt(
            long,
            default_value = "trimmed_reads.fa",
            help = "FASTA with every accepted trimmed read",
            parse(from_os_str)
        )]
        output_fasta: PathBuf,
        #[structopt(long, default_value = "count", help = "Header of the count column")]
        label: String,
        #[structopt(
            long,
            default_value = "CAA,7,TAA",
            help = "5' motif, read length and 3' motif separated by commas"
        )]
        preset: Preset,
    },
    /// Scores control against sample and calls reads enriched above the bootstrap threshold
    Enrich {
        #[structopt(help = "Control read count table", parse(from_os_str))]
        control: PathBuf,
        #[structopt(help = "Sample read count table", parse(from_os_str))]
        sample: PathBuf,
        #[structopt(long, default_value = "100", help = "Number of bootstrap trials")]
        bootstrap: usize,
        #[structopt(
            long,
            default_value = "0.95",
            help = "Quantile of the bootstrap maxima used as log ratio threshold"
        )]
        quantile: f64,
        #[structopt(long, help = "Seed for the bootstrap random streams")]
        seed: Option<u64>,
        #[structopt(long, default_value = "1", help = "Pseudocount added to every count")]
        pseudocount: u64,
        #[structopt(
            long,
            default_value = "output.csv",
            help = "Enrichment table",
            parse(from_os_str)
        )]
        output_csv: PathBuf,
        #[structopt(long, help = "Write enriched reads as FASTA")]
        gen_fasta: bool,
        #[structopt(
            long,
            default_value = "output.fasta",
            help = "FASTA of enriched reads",
            parse(from_os_str)
        )]
        output_fasta: PathBuf,
        #[structopt(
            long,
            default_value = "500000",
            help = "Maximum number of FASTA records written"
        )]
        max_entries: usize,
        #[structopt(
            long,
            default_value = "10",
            help = "FASTA records written per unit of enrichment ratio"
        )]
        replicates_per_ratio: f64,
    },
}

impl RustyMazf {
    pub fn set_logging(&self) {
        let level = match self.verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        env_logger::Builder::new().filter_level(level).init();
    }
}
