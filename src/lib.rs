//! # nirvana-filter
//!
//! Extract, filter and flatten variant annotations from Nirvana JSON output.
//!
//! ## Overview
//!
//! A Nirvana annotation file is one JSON object holding a `header`, a
//! `positions` array and a `genes` array. Whole-genome outputs run into
//! gigabytes, so instead of parsing the document as a single value this crate
//! relies on Nirvana's line layout: one structural marker or one complete
//! record object per line. Each record line is decoded on its own.
//!
//! The stages are:
//!
//! 1. [`Reader`] – decoded lines from a (gzip, zstd or bzip2) compressed file
//! 2. [`Segmenter`] – header text plus raw position and gene fragments
//! 3. [`filter_variants`] / [`filter_variants_with_transcripts`] – variants
//!    whose gnomAD `allAf` is strictly below a threshold
//! 4. [`decode_genes`] – gene symbol and primary OMIM gene name
//! 5. [`flatten_transcripts`] – one row per (variant, transcript) pair
//! 6. [`Writer`] – CSV export
//!
//! [`run`] chains all of them from a [`Config`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nirvana_filter::{run, Config, FilterOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::new("HG002.json.gz")
//!         .output("rare_variants.csv")
//!         .filter(FilterOptions::new().threshold(0.0001));
//!
//!     let summary = run(&config)?;
//!     println!("{summary}");
//!     Ok(())
//! }
//! ```
//!
//! ## Working with the stages directly
//!
//! ```rust,no_run
//! use nirvana_filter::{decode_genes, filter_variants, FilterOptions, GeneOptions, Reader, Segmenter};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let reader = Reader::from_path("HG002.json.gz")?;
//!     let doc = Segmenter::default().collect(reader)?;
//!     println!("{} positions, {} genes", doc.position_count(), doc.gene_count());
//!
//!     for row in filter_variants(&doc.positions, &FilterOptions::default())? {
//!         println!("{}\t{}", row.variant_id(), row.allele_frequency());
//!     }
//!
//!     for gene in decode_genes(&doc.genes, &GeneOptions::default())? {
//!         println!("{}\t{}", gene.gene_symbol(), gene.cross_reference_name());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Streaming
//!
//! [`Segmenter::collect`] buffers every fragment. For bounded memory use
//! [`Segmenter::fragments`], which yields fragments as lines are read.
//!
//! ## Feature Flags
//!
//! - `gzip` (default): gzip/bgzip input and `.gz` output (adds `flate2`)
//! - `zstd`: Zstandard input (adds `zstd`)
//! - `bz2`: bzip2 input (adds `bzip2`)
//! - `cli`: the `nirvana-filter` binary (adds `clap` and `simple_logger`)

#![cfg_attr(doc, warn(missing_docs))]

pub mod flatten;
pub mod gene;
pub mod options;
pub mod pipeline;
pub mod position;
pub mod reader;
pub mod record;
pub mod section;
pub mod writer;

pub use flatten::{flatten_transcripts, FlatValue, TranscriptRow, TranscriptTable};
pub use gene::decode_genes;
pub use options::{FilterOptions, FlattenOptions, GeneOptions};
pub use pipeline::{process, run, segment, Config, PipelineError, Summary};
pub use position::{filter_variants, filter_variants_with_transcripts};
pub use reader::{Compression, Reader, ReaderBuilder, ReaderError, ReaderResult, Section};
pub use record::{GeneRow, JsonObject, TranscriptVariant, VariantRow};
pub use section::{Fragment, Markers, SectionMarker, SegmentedDocument, Segmenter};
pub use writer::{Tabular, Writer, WriterError, WriterResult};
