//! End-to-end run: read, segment, filter, flatten, write.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::flatten::flatten_transcripts;
use crate::gene::decode_genes;
use crate::options::{FilterOptions, FlattenOptions, GeneOptions};
use crate::position::{filter_variants, filter_variants_with_transcripts};
use crate::reader::{Compression, Reader, ReaderError, ReaderResult};
use crate::section::{Markers, SegmentedDocument, Segmenter};
use crate::writer::{Writer, WriterError};

const DEFAULT_OUTPUT: &str = "variants_under_gnomad_0001.csv";

/// Any failure of a pipeline run.
#[derive(Debug)]
pub enum PipelineError {
    /// Reading, segmenting or decoding failed.
    Reader(ReaderError),
    /// Writing an output table failed.
    Writer(WriterError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Reader(err) => write!(f, "{err}"),
            PipelineError::Writer(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Reader(err) => Some(err),
            PipelineError::Writer(err) => Some(err),
        }
    }
}

impl From<ReaderError> for PipelineError {
    fn from(err: ReaderError) -> Self {
        PipelineError::Reader(err)
    }
}

impl From<WriterError> for PipelineError {
    fn from(err: WriterError) -> Self {
        PipelineError::Writer(err)
    }
}

/// Everything a run needs, passed explicitly to [`run`].
///
/// # Example
///
/// ```rust,no_run
/// use nirvana_filter::{run, Config, FilterOptions};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = Config::new("sample.json.gz")
///         .output("rare_transcripts.csv")
///         .genes_output("genes.csv")
///         .filter(FilterOptions::new().threshold(0.001));
///     let summary = run(&config)?;
///     println!("{summary}");
///     Ok(())
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    input: PathBuf,
    output: PathBuf,
    variants_output: Option<PathBuf>,
    genes_output: Option<PathBuf>,
    filter: FilterOptions,
    genes: GeneOptions,
    flatten: FlattenOptions,
    markers: Markers,
    compression: Compression,
}

impl Config {
    /// Creates a configuration reading `input` with default settings.
    pub fn new<P: AsRef<Path>>(input: P) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            variants_output: None,
            genes_output: None,
            filter: FilterOptions::default(),
            genes: GeneOptions::default(),
            flatten: FlattenOptions::default(),
            markers: Markers::default(),
            compression: Compression::default(),
        }
    }

    /// Sets the path of the flattened (variant, transcript) table.
    pub fn output<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output = path.as_ref().to_path_buf();
        self
    }

    /// Also writes the frequency-only variant table to `path`.
    pub fn variants_output<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.variants_output = Some(path.as_ref().to_path_buf());
        self
    }

    /// Also writes the gene table to `path`.
    pub fn genes_output<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.genes_output = Some(path.as_ref().to_path_buf());
        self
    }

    /// Replaces the frequency filter options.
    pub fn filter(mut self, options: FilterOptions) -> Self {
        self.filter = options;
        self
    }

    /// Replaces the gene decoder options.
    pub fn genes(mut self, options: GeneOptions) -> Self {
        self.genes = options;
        self
    }

    /// Replaces the flattener options.
    pub fn flatten(mut self, options: FlattenOptions) -> Self {
        self.flatten = options;
        self
    }

    /// Replaces the section markers.
    pub fn markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }

    /// Forces a compression format instead of detecting it from the input
    /// extension.
    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Returns the input path.
    pub fn input_path(&self) -> &Path {
        &self.input
    }

    /// Returns the flattened table path.
    pub fn output_path(&self) -> &Path {
        &self.output
    }
}

/// Counts and header text of a finished run.
///
/// Its `Display` form is the three-line report printed by the command-line
/// tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// The recovered header object text.
    pub header: String,
    /// Number of position fragments.
    pub position_count: usize,
    /// Number of gene fragments.
    pub gene_count: usize,
    /// Rows in the frequency-only variant table.
    pub variant_count: usize,
    /// Rare variants that also carry transcripts.
    pub transcript_variant_count: usize,
    /// Rows in the flattened (variant, transcript) table.
    pub transcript_row_count: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "header object: {}", self.header)?;
        writeln!(f, "number of positions: {}", self.position_count)?;
        write!(f, "number of genes: {}", self.gene_count)
    }
}

/// Runs the whole pipeline described by `config`.
///
/// Equivalent to [`segment`] followed by [`process`].
pub fn run(config: &Config) -> Result<Summary, PipelineError> {
    let doc = segment(config)?;
    process(config, doc)
}

/// Reads the input and buffers its three sections without decoding them.
///
/// Section counts are therefore known before any fragment is decoded.
pub fn segment(config: &Config) -> ReaderResult<SegmentedDocument> {
    let reader = Reader::builder()
        .from_path(&config.input)
        .compression(config.compression)
        .build()?;

    Segmenter::new(config.markers.clone()).collect(reader)
}

/// Decodes, filters and flattens a segmented document and writes every
/// configured table.
pub fn process(config: &Config, doc: SegmentedDocument) -> Result<Summary, PipelineError> {
    let variants = filter_variants(&doc.positions, &config.filter)?;
    if let Some(path) = &config.variants_output {
        Writer::to_path(path, variants.as_slice())?;
    }

    let genes = decode_genes(&doc.genes, &config.genes)?;
    if let Some(path) = &config.genes_output {
        Writer::to_path(path, genes.as_slice())?;
    }

    let transcript_variants = filter_variants_with_transcripts(&doc.positions, &config.filter)?;
    let table = flatten_transcripts(&transcript_variants, &config.flatten);
    Writer::to_path(&config.output, &table)?;

    Ok(Summary {
        position_count: doc.position_count(),
        gene_count: doc.gene_count(),
        header: doc.header,
        variant_count: variants.len(),
        transcript_variant_count: transcript_variants.len(),
        transcript_row_count: table.len(),
    })
}
