//! Line-level segmentation of a Nirvana document.
//!
//! Nirvana writes its JSON output with one structural element per line:
//!
//! ```text
//! {"header":{...},"positions":[
//! {"chromosome":"chr1","position":10019,...},
//! {"chromosome":"chr1","position":10020,...}
//! ],"genes":[
//! {"name":"A1BG",...},
//! {"name":"A2M",...}
//! ]}
//! ```
//!
//! Every record line is a complete JSON object apart from a trailing
//! separator, so the document can be split into independently decodable
//! fragments without a streaming JSON tokenizer. [`Segmenter`] runs that
//! split; [`Markers`] holds the literals it relies on.

use std::fmt;

use crate::reader::{ReaderError, ReaderResult};

const HEADER_PREFIX: &str = r#"{"header":"#;
const HEADER_SUFFIX: &str = r#","positions":["#;
const GENES_MARKER: &str = r#"],"genes":["#;
const END_MARKER: &str = "]}";
const SEPARATOR: char = ',';

/// A structural line that moves the parser to another section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionMarker {
    /// Closes the positions array and opens the genes array.
    Genes,
    /// Closes the document.
    End,
}

/// The literal boundaries of the Nirvana line layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Markers {
    header_prefix: String,
    header_suffix: String,
    genes: String,
    end: String,
    separator: char,
}

impl Default for Markers {
    fn default() -> Self {
        Self {
            header_prefix: HEADER_PREFIX.to_string(),
            header_suffix: HEADER_SUFFIX.to_string(),
            genes: GENES_MARKER.to_string(),
            end: END_MARKER.to_string(),
            separator: SEPARATOR,
        }
    }
}

impl Markers {
    /// Creates the default Nirvana markers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the literal that opens the document before the header value.
    pub fn header_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.header_prefix = prefix.into();
        self
    }

    /// Overrides the literal that follows the header value on the first line.
    pub fn header_suffix<S: Into<String>>(mut self, suffix: S) -> Self {
        self.header_suffix = suffix.into();
        self
    }

    /// Overrides the positions/genes boundary line.
    pub fn genes<S: Into<String>>(mut self, marker: S) -> Self {
        self.genes = marker.into();
        self
    }

    /// Overrides the end-of-document line.
    pub fn end<S: Into<String>>(mut self, marker: S) -> Self {
        self.end = marker.into();
        self
    }

    /// Overrides the record separator stripped from fragment lines.
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Classifies a trimmed line as a section boundary, if it is one.
    ///
    /// # Example
    ///
    /// ```
    /// use nirvana_filter::section::{Markers, SectionMarker};
    ///
    /// let markers = Markers::default();
    /// assert_eq!(markers.detect(r#"],"genes":["#), Some(SectionMarker::Genes));
    /// assert_eq!(markers.detect("]}"), Some(SectionMarker::End));
    /// assert_eq!(markers.detect(r#"{"name":"A1BG"},"#), None);
    /// ```
    pub fn detect(&self, line: &str) -> Option<SectionMarker> {
        if line == self.genes {
            Some(SectionMarker::Genes)
        } else if line == self.end {
            Some(SectionMarker::End)
        } else {
            None
        }
    }

    /// Recovers the header value text from the first document line.
    ///
    /// The prefix and suffix must both be present and must not overlap.
    pub fn extract_header<'a>(&self, line: &'a str) -> Option<&'a str> {
        if line.len() < self.header_prefix.len() + self.header_suffix.len() {
            return None;
        }
        line.strip_prefix(self.header_prefix.as_str())?
            .strip_suffix(self.header_suffix.as_str())
    }

    /// Removes one trailing separator from a fragment line.
    pub fn strip_separator<'a>(&self, line: &'a str) -> &'a str {
        line.strip_suffix(self.separator).unwrap_or(line)
    }
}

/// The parser state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Waiting for the first line.
    ExpectHeader,
    /// Reading position fragments.
    InPositions,
    /// Reading gene fragments.
    InGenes,
    /// The end marker was seen (or the stream ran out).
    Done,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::ExpectHeader => f.write_str("header"),
            State::InPositions => f.write_str("positions"),
            State::InGenes => f.write_str("genes"),
            State::Done => f.write_str("done"),
        }
    }
}

/// One raw (undecoded) piece of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// The header object text.
    Header(String),
    /// One position object text.
    Position(String),
    /// One gene object text.
    Gene(String),
}

/// The three raw sections of a document, fully buffered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentedDocument {
    /// The header object text.
    pub header: String,
    /// Position object texts in document order.
    pub positions: Vec<String>,
    /// Gene object texts in document order.
    pub genes: Vec<String>,
}

impl SegmentedDocument {
    /// Returns the number of position fragments.
    #[inline]
    pub fn position_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns the number of gene fragments.
    #[inline]
    pub fn gene_count(&self) -> usize {
        self.genes.len()
    }
}

/// Splits a line-formatted Nirvana document into its sections.
///
/// # Example
///
/// ```
/// use nirvana_filter::section::Segmenter;
///
/// let lines = vec![
///     r#"{"header":{"annotator":"Nirvana"},"positions":["#,
///     r#"{"position":100},"#,
///     r#"],"genes":["#,
///     r#"{"name":"A1BG"}"#,
///     "]}",
/// ];
///
/// let doc = Segmenter::default()
///     .collect(lines.into_iter().map(|line| Ok(line.to_string())))
///     .unwrap();
/// assert_eq!(doc.header, r#"{"annotator":"Nirvana"}"#);
/// assert_eq!(doc.positions, vec![r#"{"position":100}"#]);
/// assert_eq!(doc.genes, vec![r#"{"name":"A1BG"}"#]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    markers: Markers,
}

impl Segmenter {
    /// Creates a segmenter with custom markers.
    pub fn new(markers: Markers) -> Self {
        Self { markers }
    }

    /// Lazily yields fragments as lines are pulled from `lines`.
    pub fn fragments<I>(&self, lines: I) -> Fragments<'_, I::IntoIter>
    where
        I: IntoIterator<Item = ReaderResult<String>>,
    {
        Fragments {
            lines: lines.into_iter(),
            markers: &self.markers,
            state: State::ExpectHeader,
            line_number: 0,
        }
    }

    /// Buffers every fragment of the document.
    pub fn collect<I>(&self, lines: I) -> ReaderResult<SegmentedDocument>
    where
        I: IntoIterator<Item = ReaderResult<String>>,
    {
        let mut doc = SegmentedDocument::default();
        for fragment in self.fragments(lines) {
            match fragment? {
                Fragment::Header(header) => doc.header = header,
                Fragment::Position(text) => doc.positions.push(text),
                Fragment::Gene(text) => doc.genes.push(text),
            }
        }

        log::info!(
            "segmented document: {} positions, {} genes",
            doc.position_count(),
            doc.gene_count()
        );
        Ok(doc)
    }
}

/// Lazy fragment iterator returned by [`Segmenter::fragments`].
pub struct Fragments<'m, I> {
    lines: I,
    markers: &'m Markers,
    state: State,
    line_number: usize,
}

impl<I> Fragments<'_, I> {
    /// Returns the current parser state.
    pub fn state(&self) -> State {
        self.state
    }

    fn transition(&mut self, next: State) {
        log::debug!(
            "line {}: {} -> {}",
            self.line_number,
            self.state,
            next
        );
        self.state = next;
    }
}

impl<I> Iterator for Fragments<'_, I>
where
    I: Iterator<Item = ReaderResult<String>>,
{
    type Item = ReaderResult<Fragment>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.state == State::Done {
                return None;
            }

            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(err)) => {
                    self.state = State::Done;
                    return Some(Err(err));
                }
                None => {
                    let state = self.state;
                    self.state = State::Done;
                    if state == State::ExpectHeader {
                        return Some(Err(ReaderError::structural(
                            None,
                            "ERROR: empty document, expected a header line",
                        )));
                    }
                    log::warn!(
                        "stream ended in the {} section without an end-of-document marker",
                        state
                    );
                    return None;
                }
            };
            self.line_number += 1;
            let trimmed = line.trim();

            match self.state {
                State::ExpectHeader => {
                    let Some(header) = self.markers.extract_header(trimmed) else {
                        self.state = State::Done;
                        return Some(Err(ReaderError::structural(
                            Some(self.line_number),
                            format!(
                                "ERROR: first line must start with '{}' and end with '{}'",
                                self.markers.header_prefix, self.markers.header_suffix
                            ),
                        )));
                    };
                    let header = header.to_string();
                    self.transition(State::InPositions);
                    return Some(Ok(Fragment::Header(header)));
                }
                State::InPositions => match self.markers.detect(trimmed) {
                    Some(SectionMarker::Genes) => self.transition(State::InGenes),
                    Some(SectionMarker::End) => self.transition(State::Done),
                    None => {
                        let text = self.markers.strip_separator(trimmed).to_string();
                        return Some(Ok(Fragment::Position(text)));
                    }
                },
                State::InGenes => match self.markers.detect(trimmed) {
                    Some(SectionMarker::End) => self.transition(State::Done),
                    _ => {
                        let text = self.markers.strip_separator(trimmed).to_string();
                        return Some(Ok(Fragment::Gene(text)));
                    }
                },
                State::Done => return None,
            }
        }
    }
}
