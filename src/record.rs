//! Row types produced by the decoders.

use serde_json::{Map, Value};

use crate::reader::{ReaderError, ReaderResult, Section};

/// A JSON object whose keys are not known ahead of time.
pub type JsonObject = Map<String, Value>;

/// A variant retained by the frequency filter.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantRow {
    /// Nirvana variant identifier (`vid`).
    pub variant_id: String,
    /// Reference-population allele frequency.
    pub allele_frequency: f64,
}

impl VariantRow {
    /// Creates a row from a variant identifier and its allele frequency.
    pub fn new(variant_id: String, allele_frequency: f64) -> Self {
        Self {
            variant_id,
            allele_frequency,
        }
    }

    /// Returns the variant identifier.
    #[inline]
    pub fn variant_id(&self) -> &str {
        &self.variant_id
    }

    /// Returns the allele frequency.
    #[inline]
    pub fn allele_frequency(&self) -> f64 {
        self.allele_frequency
    }
}

/// A retained variant together with its transcript annotations.
///
/// Transcripts are kept as opaque JSON objects; their shape varies between
/// annotation sources and releases.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptVariant {
    /// Nirvana variant identifier (`vid`).
    pub variant_id: String,
    /// Reference-population allele frequency.
    pub allele_frequency: f64,
    /// Transcript annotations in document order.
    pub transcripts: Vec<JsonObject>,
}

impl TranscriptVariant {
    /// Creates a row that keeps the variant's transcript objects.
    pub fn new(variant_id: String, allele_frequency: f64, transcripts: Vec<JsonObject>) -> Self {
        Self {
            variant_id,
            allele_frequency,
            transcripts,
        }
    }

    /// Returns the variant identifier.
    #[inline]
    pub fn variant_id(&self) -> &str {
        &self.variant_id
    }

    /// Returns the transcript annotations.
    #[inline]
    pub fn transcripts(&self) -> &[JsonObject] {
        &self.transcripts
    }

    /// Drops the transcripts, keeping the frequency row.
    pub fn into_row(self) -> VariantRow {
        VariantRow::new(self.variant_id, self.allele_frequency)
    }
}

/// A gene symbol with its primary OMIM gene name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneRow {
    /// Gene symbol (`name`).
    pub gene_symbol: String,
    /// `geneName` of the first `omim` entry, or empty.
    pub cross_reference_name: String,
}

impl GeneRow {
    /// Creates a row from a gene symbol and its OMIM gene name.
    pub fn new(gene_symbol: String, cross_reference_name: String) -> Self {
        Self {
            gene_symbol,
            cross_reference_name,
        }
    }

    /// Returns the gene symbol.
    #[inline]
    pub fn gene_symbol(&self) -> &str {
        &self.gene_symbol
    }

    /// Returns the cross-reference name (empty when absent).
    #[inline]
    pub fn cross_reference_name(&self) -> &str {
        &self.cross_reference_name
    }
}

/// Decodes one fragment, requiring a JSON object at the top level.
pub(crate) fn decode_object(
    section: Section,
    index: usize,
    text: &str,
) -> ReaderResult<JsonObject> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(other) => Err(ReaderError::structural(
            None,
            format!(
                "ERROR: {section} fragment {index} is a JSON {}, expected an object",
                json_kind(&other)
            ),
        )),
        Err(err) => Err(ReaderError::decode(section, index, err)),
    }
}

/// Names the JSON type of a value for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
