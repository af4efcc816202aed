//! nirvana-filter CLI
//!
//! Keeps variants below a gnomAD allele-frequency threshold from a Nirvana
//! JSON file and writes one CSV row per (variant, transcript) pair.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use nirvana_filter::{process, segment, Compression, Config, FilterOptions};

#[derive(Parser)]
#[command(name = "nirvana-filter")]
#[command(author, version, about = "Filter Nirvana JSON variants by gnomAD allele frequency")]
struct Cli {
    /// Nirvana JSON output (.json.gz)
    input: PathBuf,

    /// Flattened (variant, transcript) CSV table
    #[arg(short, long, default_value = "variants_under_gnomad_0001.csv")]
    output: PathBuf,

    /// Keep variants whose gnomAD allAf is strictly below this value
    #[arg(short, long, default_value_t = 0.0001)]
    threshold: f64,

    /// Also write the frequency-only variant table
    #[arg(long)]
    variants_output: Option<PathBuf>,

    /// Also write the gene / OMIM gene name table
    #[arg(long)]
    genes_output: Option<PathBuf>,

    /// Input compression (detected from the extension by default)
    #[arg(short, long, value_enum, default_value_t = InputCompression::Auto)]
    compression: InputCompression,

    /// Log level
    #[arg(short, long, value_enum, default_value_t = LogLevel::Info)]
    level: LogLevel,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum InputCompression {
    Auto,
    None,
    Gzip,
    Zstd,
    Bzip2,
}

impl From<InputCompression> for Compression {
    fn from(value: InputCompression) -> Self {
        match value {
            InputCompression::Auto => Compression::Auto,
            InputCompression::None => Compression::None,
            InputCompression::Gzip => Compression::Gzip,
            InputCompression::Zstd => Compression::Zstd,
            InputCompression::Bzip2 => Compression::Bzip2,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    simple_logger::SimpleLogger::new()
        .with_level(cli.level.into())
        .init()?;

    let mut config = Config::new(&cli.input)
        .output(&cli.output)
        .compression(cli.compression.into())
        .filter(FilterOptions::new().threshold(cli.threshold));
    if let Some(path) = &cli.variants_output {
        config = config.variants_output(path);
    }
    if let Some(path) = &cli.genes_output {
        config = config.genes_output(path);
    }

    let doc = segment(&config)?;
    println!("header object: {}", doc.header);
    println!("number of positions: {}", doc.position_count());
    println!("number of genes: {}", doc.gene_count());

    let summary = process(&config, doc)?;
    log::info!(
        "{} rare variants, {} with transcripts, {} rows written to {}",
        summary.variant_count,
        summary.transcript_variant_count,
        summary.transcript_row_count,
        config.output_path().display()
    );

    Ok(())
}
