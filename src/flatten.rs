//! One-to-many expansion of variants into (variant, transcript) rows.
//!
//! Transcript objects are schema-opaque: their keys differ between
//! annotation sources (RefSeq vs Ensembl), between releases, and between
//! variants. The table keeps the union of every flattened key seen so far,
//! in first-seen order, and leaves cells empty where a transcript has no
//! value for a column.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde_json::{Number, Value};

use crate::options::FlattenOptions;
use crate::record::{JsonObject, TranscriptVariant};

/// A single primitive cell of a flattened transcript.
#[derive(Debug, Clone, PartialEq)]
pub enum FlatValue {
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// JSON number, kept in its original representation.
    Number(Number),
    /// JSON string.
    String(String),
    /// JSON array, kept whole (e.g. `consequence` lists).
    List(Vec<Value>),
}

impl FlatValue {
    /// Returns the string payload, if this is a string cell.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FlatValue::String(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for FlatValue {
    /// Renders the cell as CSV text; `Null` renders empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlatValue::Null => Ok(()),
            FlatValue::Bool(flag) => write!(f, "{flag}"),
            FlatValue::Number(number) => write!(f, "{number}"),
            FlatValue::String(text) => f.write_str(text),
            FlatValue::List(items) => {
                let rendered = serde_json::to_string(items).map_err(|_| fmt::Error)?;
                f.write_str(&rendered)
            }
        }
    }
}

/// One (variant, transcript) row.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptRow {
    variant_id: String,
    cells: BTreeMap<usize, FlatValue>,
}

impl TranscriptRow {
    /// Returns the variant identifier of the row.
    #[inline]
    pub fn variant_id(&self) -> &str {
        &self.variant_id
    }
}

/// The flattened transcript table.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptTable {
    id_column: String,
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<TranscriptRow>,
}

impl TranscriptTable {
    /// Creates an empty table whose first column is `id_column`.
    pub fn new<S: Into<String>>(id_column: S) -> Self {
        Self {
            id_column: id_column.into(),
            columns: Vec::new(),
            index: HashMap::new(),
            rows: Vec::new(),
        }
    }

    /// Returns the identifier column name.
    #[inline]
    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    /// Returns the transcript columns in first-seen order, without the
    /// identifier column.
    #[inline]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the rows in insertion order.
    #[inline]
    pub fn rows(&self) -> &[TranscriptRow] {
        &self.rows
    }

    /// Returns the number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Looks up the cell of `row` under `column`.
    ///
    /// The identifier column is not stored as a cell; use
    /// [`TranscriptRow::variant_id`] for it.
    pub fn get(&self, row: usize, column: &str) -> Option<&FlatValue> {
        let column = *self.index.get(column)?;
        self.rows.get(row)?.cells.get(&column)
    }

    /// Iterates the cells of `row` in column order, `None` for gaps.
    pub fn cells<'a>(
        &'a self,
        row: &'a TranscriptRow,
    ) -> impl Iterator<Item = Option<&'a FlatValue>> + 'a {
        (0..self.columns.len()).map(move |column| row.cells.get(&column))
    }

    /// Appends one transcript for `variant_id`, widening the column set as
    /// needed.
    pub fn push(&mut self, variant_id: &str, transcript: &JsonObject, separator: &str) {
        let mut flat = Vec::new();
        flatten_object(transcript, None, separator, &mut flat);

        let mut cells = BTreeMap::new();
        for (key, value) in flat {
            let column = self.column_index(key);
            cells.insert(column, value);
        }

        self.rows.push(TranscriptRow {
            variant_id: variant_id.to_string(),
            cells,
        });
    }

    fn column_index(&mut self, key: String) -> usize {
        if let Some(&column) = self.index.get(&key) {
            return column;
        }
        let column = self.columns.len();
        self.columns.push(key.clone());
        self.index.insert(key, column);
        column
    }
}

/// Expands every retained variant into one row per transcript.
///
/// Variants with an empty transcript list produce no rows. Rows follow the
/// order of `variants`, then the order of each variant's transcripts.
///
/// # Example
///
/// ```
/// use nirvana_filter::{flatten_transcripts, FlattenOptions, TranscriptVariant};
/// use serde_json::json;
///
/// let transcript = |id: &str| json!({"transcript": id, "hgnc": {"id": 1100}});
/// let variants = vec![TranscriptVariant::new(
///     "17-43045712-T-C".to_string(),
///     0.00003,
///     vec![
///         transcript("NM_007294.4").as_object().unwrap().clone(),
///         transcript("NM_007297.4").as_object().unwrap().clone(),
///     ],
/// )];
///
/// let table = flatten_transcripts(&variants, &FlattenOptions::default());
/// assert_eq!(table.len(), 2);
/// assert_eq!(table.columns(), ["transcript", "hgnc.id"]);
/// ```
pub fn flatten_transcripts(
    variants: &[TranscriptVariant],
    options: &FlattenOptions,
) -> TranscriptTable {
    let mut table = TranscriptTable::new(options.id_column_name());
    for variant in variants {
        for transcript in variant.transcripts() {
            table.push(variant.variant_id(), transcript, options.separator_str());
        }
    }

    log::info!(
        "flattened {} variants into {} transcript rows over {} columns",
        variants.len(),
        table.len(),
        table.columns().len()
    );
    table
}

/// Flattens nested objects into `parent<sep>child` keys, depth first, in
/// key order. Empty nested objects produce no key.
fn flatten_object(
    object: &JsonObject,
    prefix: Option<&str>,
    separator: &str,
    out: &mut Vec<(String, FlatValue)>,
) {
    for (key, value) in object {
        let name = match prefix {
            Some(prefix) => format!("{prefix}{separator}{key}"),
            None => key.clone(),
        };

        match value {
            Value::Object(child) => flatten_object(child, Some(&name), separator, out),
            Value::Null => out.push((name, FlatValue::Null)),
            Value::Bool(flag) => out.push((name, FlatValue::Bool(*flag))),
            Value::Number(number) => out.push((name, FlatValue::Number(number.clone()))),
            Value::String(text) => out.push((name, FlatValue::String(text.clone()))),
            Value::Array(items) => out.push((name, FlatValue::List(items.clone()))),
        }
    }
}
