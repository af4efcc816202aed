use serde_json::Value;

use crate::options::GeneOptions;
use crate::reader::{ReaderError, ReaderResult, Section};
use crate::record::{decode_object, json_kind, GeneRow};

/// Decodes gene fragments into `(symbol, OMIM gene name)` rows.
///
/// Only the first `omim` entry is consulted. A gene without `omim`, with
/// an empty `omim` list, or whose first entry has no `geneName` gets an
/// empty cross-reference name.
///
/// # Errors
///
/// Any fragment that is not a JSON object or lacks `name` aborts the pass.
///
/// # Example
///
/// ```
/// use nirvana_filter::{decode_genes, GeneOptions};
///
/// let genes = vec![
///     r#"{"name":"BRCA1","omim":[{"mimNumber":113705,"geneName":"BRCA1 DNA repair associated"}]}"#,
///     r#"{"name":"LINC01128"}"#,
/// ];
/// let rows = decode_genes(&genes, &GeneOptions::default()).unwrap();
/// assert_eq!(rows[0].cross_reference_name(), "BRCA1 DNA repair associated");
/// assert_eq!(rows[1].cross_reference_name(), "");
/// ```
pub fn decode_genes<S: AsRef<str>>(
    genes: &[S],
    options: &GeneOptions,
) -> ReaderResult<Vec<GeneRow>> {
    let mut rows = Vec::with_capacity(genes.len());
    for (index, text) in genes.iter().enumerate() {
        let gene = decode_object(Section::Genes, index, text.as_ref())?;

        let name_key = options.name_key();
        let symbol = match gene.get(name_key) {
            Some(Value::String(name)) => name.clone(),
            Some(other) => {
                return Err(ReaderError::invalid_field(
                    Section::Genes,
                    index,
                    name_key,
                    format!("expected a string, got a {}", json_kind(other)),
                ))
            }
            None => return Err(ReaderError::missing_field(Section::Genes, index, name_key)),
        };

        let cross_reference = match gene.get(options.cross_reference_key()) {
            Some(value) => first_cross_reference_name(value, index, options)?,
            None => String::new(),
        };

        rows.push(GeneRow::new(symbol, cross_reference));
    }

    log::info!("decoded {} genes", rows.len());
    Ok(rows)
}

/// Reads `geneName` from the first entry of the `omim` list.
fn first_cross_reference_name(
    value: &Value,
    index: usize,
    options: &GeneOptions,
) -> ReaderResult<String> {
    let field = options.cross_reference_key();
    let Value::Array(entries) = value else {
        return Err(ReaderError::invalid_field(
            Section::Genes,
            index,
            field,
            format!("expected an array, got a {}", json_kind(value)),
        ));
    };

    let name_key = options.cross_reference_name_key();
    match entries.first().and_then(|entry| entry.get(name_key)) {
        Some(Value::String(name)) => Ok(name.clone()),
        Some(other) => Err(ReaderError::invalid_field(
            Section::Genes,
            index,
            name_key,
            format!("expected a string, got a {}", json_kind(other)),
        )),
        None => Ok(String::new()),
    }
}
