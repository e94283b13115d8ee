//! snp-stack command line interface

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};

use snp_stack::output::{write_counts, write_genes, write_table};
use snp_stack::pipeline::{self, load_genes};
use snp_stack::stack::DEFAULT_SUFFIXES;
use snp_stack::summary::count_by;
use snp_stack::{MissingMetadata, PipelineConfig, RowFilter, SampleNaming};

/// Commonly used command line arguments.
#[derive(Debug, clap::Args)]
struct CommonArgs {
    /// Verbosity of the program
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Stack per-sample VCF files with gene and run metadata",
    long_about = "Stacks the variant-call files of a directory, tags every record with its \
                  sample, and joins the result with the genes of an annotation file and the \
                  rows of a run table"
)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Build the annotated variant table.
    Stack(StackArgs),
    /// Print the genes of an annotation file.
    Genes(GenesArgs),
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
enum Delimiter {
    Tab,
    Comma,
}

impl Delimiter {
    fn byte(self) -> u8 {
        match self {
            Delimiter::Tab => b'\t',
            Delimiter::Comma => b',',
        }
    }
}

#[derive(Debug, clap::Args)]
struct StackArgs {
    /// GFF-like annotation of the reference.
    #[arg(long)]
    gff: PathBuf,
    /// Directory with one VCF file per sample.
    #[arg(long)]
    vcf_dir: PathBuf,
    /// Comma-separated run table (e.g. SraRunTable.txt).
    #[arg(long)]
    run_table: PathBuf,
    /// Keep only rows matching this expression, e.g. `round(QUAL) > 100`.
    #[arg(long)]
    filter: Option<String>,
    /// Print row counts per value of this field instead of the table.
    #[arg(long)]
    count_by: Option<String>,
    /// Output file, standard output if omitted.
    #[arg(long, short)]
    output: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Delimiter::Tab)]
    delimiter: Delimiter,
    /// Keep samples without a run table row, with empty metadata.
    #[arg(long)]
    allow_missing_metadata: bool,
    /// Suffix to strip from file names and run identifiers; replaces the
    /// defaults when given.
    #[arg(long)]
    strip_suffix: Vec<String>,
}

#[derive(Debug, clap::Args)]
struct GenesArgs {
    /// GFF-like annotation of the reference.
    #[arg(long)]
    gff: PathBuf,
    #[arg(long, short)]
    output: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Delimiter::Tab)]
    delimiter: Delimiter,
}

fn open_output(path: Option<&PathBuf>) -> Result<Box<dyn Write>, anyhow::Error> {
    let out: Box<dyn Write> = match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };
    Ok(out)
}

fn run_stack(args: &StackArgs) -> Result<(), anyhow::Error> {
    let mut config = PipelineConfig::new(&args.gff, &args.vcf_dir, &args.run_table);
    if !args.strip_suffix.is_empty() {
        config.naming = SampleNaming::new(args.strip_suffix.iter().cloned());
    }
    if args.allow_missing_metadata {
        config.missing_metadata = MissingMetadata::NullFill;
    }
    tracing::debug!(
        "stripping suffixes {:?} (defaults {:?})",
        config.naming.suffixes,
        DEFAULT_SUFFIXES
    );

    let mut table = pipeline::run(&config)?;
    if let Some(expr) = &args.filter {
        let before = table.len();
        table = RowFilter::new(expr)?.filter_table(table)?;
        tracing::info!("filter kept {} of {} rows", table.len(), before);
    }

    let out = open_output(args.output.as_ref())?;
    match &args.count_by {
        Some(field) => {
            let counts = count_by(table.iter(), field);
            write_counts(field, &counts, out, args.delimiter.byte())?
        }
        None => write_table(&table, out, args.delimiter.byte())?,
    }
    Ok(())
}

fn run_genes(args: &GenesArgs) -> Result<(), anyhow::Error> {
    let genes = load_genes(&args.gff)?;
    write_genes(&genes, open_output(args.output.as_ref())?, args.delimiter.byte())?;
    Ok(())
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    // Build a tracing subscriber according to the configuration in `cli.common`.
    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(io::stderr)
        .with_max_level(match cli.common.verbose.log_level() {
            Some(level) => match level {
                log::Level::Error => tracing::Level::ERROR,
                log::Level::Warn => tracing::Level::WARN,
                log::Level::Info => tracing::Level::INFO,
                log::Level::Debug => tracing::Level::DEBUG,
                log::Level::Trace => tracing::Level::TRACE,
            },
            None => tracing::Level::ERROR,
        })
        .compact()
        .finish();

    tracing::subscriber::with_default(collector, || {
        match &cli.command {
            Commands::Stack(args) => run_stack(args)?,
            Commands::Genes(args) => run_genes(args)?,
        }

        Ok::<(), anyhow::Error>(())
    })
}
