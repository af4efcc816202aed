//! Configuration for the decoding stages.
//!
//! Field names default to the keys Nirvana writes; every one can be
//! overridden so the decoders never hard-code the annotation schema.

const DEFAULT_THRESHOLD: f64 = 0.0001;

/// Configuration for the position decoder and frequency filter.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterOptions {
    threshold: f64,
    variants_field: String,
    population_field: String,
    frequency_field: String,
    id_field: String,
    transcripts_field: String,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            variants_field: "variants".to_string(),
            population_field: "gnomad".to_string(),
            frequency_field: "allAf".to_string(),
            id_field: "vid".to_string(),
            transcripts_field: "transcripts".to_string(),
        }
    }
}

impl FilterOptions {
    /// Creates a new options builder with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the exclusive upper bound on the allele frequency.
    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Overrides the key holding a position's variant list.
    pub fn variants_field<S: Into<String>>(mut self, field: S) -> Self {
        self.variants_field = field.into();
        self
    }

    /// Overrides the key holding a variant's reference-population annotation.
    pub fn population_field<S: Into<String>>(mut self, field: S) -> Self {
        self.population_field = field.into();
        self
    }

    /// Overrides the allele-frequency key inside the population annotation.
    pub fn frequency_field<S: Into<String>>(mut self, field: S) -> Self {
        self.frequency_field = field.into();
        self
    }

    /// Overrides the variant identifier key.
    pub fn id_field<S: Into<String>>(mut self, field: S) -> Self {
        self.id_field = field.into();
        self
    }

    /// Overrides the key holding a variant's transcript list.
    pub fn transcripts_field<S: Into<String>>(mut self, field: S) -> Self {
        self.transcripts_field = field.into();
        self
    }

    /// Returns the frequency threshold.
    #[inline]
    pub fn threshold_value(&self) -> f64 {
        self.threshold
    }

    pub(crate) fn variants_key(&self) -> &str {
        &self.variants_field
    }

    pub(crate) fn population_key(&self) -> &str {
        &self.population_field
    }

    pub(crate) fn frequency_key(&self) -> &str {
        &self.frequency_field
    }

    pub(crate) fn id_key(&self) -> &str {
        &self.id_field
    }

    pub(crate) fn transcripts_key(&self) -> &str {
        &self.transcripts_field
    }
}

/// Configuration for the gene decoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneOptions {
    name_field: String,
    cross_reference_field: String,
    cross_reference_name_field: String,
}

impl Default for GeneOptions {
    fn default() -> Self {
        Self {
            name_field: "name".to_string(),
            cross_reference_field: "omim".to_string(),
            cross_reference_name_field: "geneName".to_string(),
        }
    }
}

impl GeneOptions {
    /// Creates a new options builder with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the gene symbol key.
    pub fn name_field<S: Into<String>>(mut self, field: S) -> Self {
        self.name_field = field.into();
        self
    }

    /// Overrides the key holding the cross-reference list.
    pub fn cross_reference_field<S: Into<String>>(mut self, field: S) -> Self {
        self.cross_reference_field = field.into();
        self
    }

    /// Overrides the name key inside a cross-reference entry.
    pub fn cross_reference_name_field<S: Into<String>>(mut self, field: S) -> Self {
        self.cross_reference_name_field = field.into();
        self
    }

    pub(crate) fn name_key(&self) -> &str {
        &self.name_field
    }

    pub(crate) fn cross_reference_key(&self) -> &str {
        &self.cross_reference_field
    }

    pub(crate) fn cross_reference_name_key(&self) -> &str {
        &self.cross_reference_name_field
    }
}

/// Configuration for the transcript flattener.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlattenOptions {
    separator: String,
    id_column: String,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            separator: ".".to_string(),
            id_column: "variant_id".to_string(),
        }
    }
}

impl FlattenOptions {
    /// Creates a new options builder with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the string joining parent and child keys of nested objects.
    pub fn separator<S: Into<String>>(mut self, separator: S) -> Self {
        self.separator = separator.into();
        self
    }

    /// Sets the name of the leading identifier column.
    pub fn id_column<S: Into<String>>(mut self, column: S) -> Self {
        self.id_column = column.into();
        self
    }

    pub(crate) fn separator_str(&self) -> &str {
        &self.separator
    }

    pub(crate) fn id_column_name(&self) -> &str {
        &self.id_column
    }
}
