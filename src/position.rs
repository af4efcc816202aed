//! Position decoding and the gnomAD allele-frequency filter.
//!
//! Two independent passes are offered over the same fragments:
//! [`filter_variants`] keeps every rare variant that carries a population
//! annotation, while [`filter_variants_with_transcripts`] additionally
//! requires transcript data. A rare variant without transcripts therefore
//! appears in the first table but not in the second.

use serde_json::Value;

use crate::options::FilterOptions;
use crate::reader::{ReaderError, ReaderResult, Section};
use crate::record::{decode_object, json_kind, JsonObject, TranscriptVariant, VariantRow};

/// Returns the variants whose allele frequency is strictly below the
/// configured threshold.
///
/// Positions without variants and variants without a population
/// annotation contribute nothing.
///
/// # Errors
///
/// Fails on the first fragment that is not a JSON object, on a population
/// annotation without a frequency, and on a retained variant without an
/// identifier.
///
/// # Example
///
/// ```
/// use nirvana_filter::{filter_variants, FilterOptions};
///
/// let positions = vec![
///     r#"{"variants":[{"vid":"1-100-A-G","gnomad":{"allAf":0.00002}}]}"#.to_string(),
///     r#"{"position":200}"#.to_string(),
/// ];
/// let rows = filter_variants(&positions, &FilterOptions::default()).unwrap();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].variant_id(), "1-100-A-G");
/// ```
pub fn filter_variants<S: AsRef<str>>(
    positions: &[S],
    options: &FilterOptions,
) -> ReaderResult<Vec<VariantRow>> {
    let mut rows = Vec::new();
    for (index, text) in positions.iter().enumerate() {
        let position = decode_object(Section::Positions, index, text.as_ref())?;
        for variant in variants_of(&position, index, options)? {
            if let Some((id, frequency)) = rare_variant(variant, index, options)? {
                rows.push(VariantRow::new(id, frequency));
            }
        }
    }

    log::info!(
        "{} variants below allele frequency {}",
        rows.len(),
        options.threshold_value()
    );
    Ok(rows)
}

/// Like [`filter_variants`], but only keeps variants that also carry a
/// transcript list, and returns the transcripts with each row.
///
/// # Errors
///
/// In addition to the errors of [`filter_variants`], fails when the
/// transcript field is not an array of objects.
pub fn filter_variants_with_transcripts<S: AsRef<str>>(
    positions: &[S],
    options: &FilterOptions,
) -> ReaderResult<Vec<TranscriptVariant>> {
    let mut rows = Vec::new();
    for (index, text) in positions.iter().enumerate() {
        let position = decode_object(Section::Positions, index, text.as_ref())?;
        for variant in variants_of(&position, index, options)? {
            let Some(transcripts) = variant.get(options.transcripts_key()) else {
                continue;
            };
            if let Some((id, frequency)) = rare_variant(variant, index, options)? {
                let transcripts = transcript_objects(transcripts, index, options)?;
                rows.push(TranscriptVariant::new(id, frequency, transcripts));
            }
        }
    }

    log::info!(
        "{} variants with transcripts below allele frequency {}",
        rows.len(),
        options.threshold_value()
    );
    Ok(rows)
}

/// Returns the variant objects of a position, or nothing when it has none.
fn variants_of<'a>(
    position: &'a JsonObject,
    index: usize,
    options: &FilterOptions,
) -> ReaderResult<Vec<&'a JsonObject>> {
    let field = options.variants_key();
    let Some(value) = position.get(field) else {
        return Ok(Vec::new());
    };

    let Value::Array(variants) = value else {
        return Err(ReaderError::invalid_field(
            Section::Positions,
            index,
            field,
            format!("expected an array, got a {}", json_kind(value)),
        ));
    };

    variants
        .iter()
        .map(|variant| {
            variant.as_object().ok_or_else(|| {
                ReaderError::invalid_field(
                    Section::Positions,
                    index,
                    field,
                    format!("expected variant objects, got a {}", json_kind(variant)),
                )
            })
        })
        .collect()
}

/// Returns `(vid, allAf)` when the variant is annotated and rare.
fn rare_variant(
    variant: &JsonObject,
    index: usize,
    options: &FilterOptions,
) -> ReaderResult<Option<(String, f64)>> {
    let Some(population) = variant.get(options.population_key()) else {
        return Ok(None);
    };

    let frequency_key = options.frequency_key();
    let frequency = match population.get(frequency_key) {
        Some(value) => value.as_f64().ok_or_else(|| {
            ReaderError::invalid_field(
                Section::Positions,
                index,
                frequency_key,
                format!("expected a number, got a {}", json_kind(value)),
            )
        })?,
        None => {
            return Err(ReaderError::missing_field(
                Section::Positions,
                index,
                frequency_key,
            ))
        }
    };

    if frequency >= options.threshold_value() {
        return Ok(None);
    }

    let id_key = options.id_key();
    match variant.get(id_key) {
        Some(Value::String(id)) => Ok(Some((id.clone(), frequency))),
        Some(other) => Err(ReaderError::invalid_field(
            Section::Positions,
            index,
            id_key,
            format!("expected a string, got a {}", json_kind(other)),
        )),
        None => Err(ReaderError::missing_field(Section::Positions, index, id_key)),
    }
}

/// Clones the transcript list, checking every entry is an object.
fn transcript_objects(
    value: &Value,
    index: usize,
    options: &FilterOptions,
) -> ReaderResult<Vec<JsonObject>> {
    let field = options.transcripts_key();
    let invalid = |kind: &str| {
        ReaderError::invalid_field(
            Section::Positions,
            index,
            field,
            format!("expected an array of objects, got a {kind}"),
        )
    };

    let Value::Array(transcripts) = value else {
        return Err(invalid(json_kind(value)));
    };

    transcripts
        .iter()
        .map(|transcript| match transcript {
            Value::Object(object) => Ok(object.clone()),
            other => Err(invalid(json_kind(other))),
        })
        .collect()
}
