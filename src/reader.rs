//! Line reader over plain or compressed Nirvana output, and the error
//! type shared by the decoding stages.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

#[cfg(feature = "bz2")]
use bzip2::read::BzDecoder;
#[cfg(feature = "gzip")]
use flate2::read::MultiGzDecoder;
#[cfg(feature = "zstd")]
use zstd::stream::read::Decoder as ZstdDecoder;

/// Result alias for reader operations.
pub type ReaderResult<T> = Result<T, ReaderError>;

/// The fragment sequence a decoding error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// The `positions` array.
    Positions,
    /// The `genes` array.
    Genes,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Positions => f.write_str("positions"),
            Section::Genes => f.write_str("genes"),
        }
    }
}

/// An error that can occur when reading or decoding a Nirvana document.
#[derive(Debug)]
pub enum ReaderError {
    /// An I/O error.
    Io(io::Error),
    /// An error that occurred when decoding a line.
    InvalidEncoding {
        /// The line number where the error occurred.
        line: usize,
        /// The error message.
        message: String,
    },
    /// The document layout does not match the expected line structure.
    StructuralMismatch {
        /// The line number where the mismatch was detected, when it is tied
        /// to one.
        line: Option<usize>,
        /// The error message.
        message: String,
    },
    /// A fragment is not valid JSON.
    Decode {
        /// The section the fragment belongs to.
        section: Section,
        /// The 0-based fragment index inside its section.
        index: usize,
        /// The error message.
        message: String,
    },
    /// A required key is absent.
    MissingField {
        /// The section the fragment belongs to.
        section: Section,
        /// The 0-based fragment index inside its section.
        index: usize,
        /// The name of the missing key.
        field: String,
    },
    /// A key is present but holds a value of the wrong shape.
    InvalidField {
        /// The section the fragment belongs to.
        section: Section,
        /// The 0-based fragment index inside its section.
        index: usize,
        /// The name of the offending key.
        field: String,
        /// The error message.
        message: String,
    },
    /// An error that occurred when building a reader.
    Builder(String),
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReaderError::Io(err) => write!(f, "I/O error: {err}"),
            ReaderError::InvalidEncoding { line, message } => {
                write!(f, "invalid UTF-8 at line {line}: {message}")
            }
            ReaderError::StructuralMismatch {
                line: Some(line),
                message,
            } => write!(f, "unexpected document layout at line {line}: {message}"),
            ReaderError::StructuralMismatch {
                line: None,
                message,
            } => write!(f, "unexpected document layout: {message}"),
            ReaderError::Decode {
                section,
                index,
                message,
            } => write!(f, "malformed JSON in {section} fragment {index}: {message}"),
            ReaderError::MissingField {
                section,
                index,
                field,
            } => write!(f, "missing field '{field}' in {section} fragment {index}"),
            ReaderError::InvalidField {
                section,
                index,
                field,
                message,
            } => write!(f, "invalid '{field}' in {section} fragment {index}: {message}"),
            ReaderError::Builder(msg) => write!(f, "builder error: {msg}"),
        }
    }
}

impl std::error::Error for ReaderError {
    /// Returns the source error, if any.
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReaderError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ReaderError {
    /// Creates a new `ReaderError` from an `io::Error`.
    fn from(err: io::Error) -> Self {
        ReaderError::Io(err)
    }
}

impl ReaderError {
    /// Creates a new `ReaderError` for a layout mismatch.
    pub(crate) fn structural(line: Option<usize>, message: impl Into<String>) -> ReaderError {
        ReaderError::StructuralMismatch {
            line,
            message: message.into(),
        }
    }

    /// Creates a new `ReaderError` for a fragment that failed JSON decoding.
    pub(crate) fn decode(section: Section, index: usize, err: serde_json::Error) -> ReaderError {
        ReaderError::Decode {
            section,
            index,
            message: err.to_string(),
        }
    }

    /// Creates a new `ReaderError` for a missing required key.
    pub(crate) fn missing_field(section: Section, index: usize, field: &str) -> ReaderError {
        ReaderError::MissingField {
            section,
            index,
            field: field.to_string(),
        }
    }

    /// Creates a new `ReaderError` for a key holding the wrong JSON type.
    pub(crate) fn invalid_field(
        section: Section,
        index: usize,
        field: &str,
        message: impl Into<String>,
    ) -> ReaderError {
        ReaderError::InvalidField {
            section,
            index,
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Creates a new `ReaderError` for an invalid encoding.
    fn invalid_encoding(line: usize, message: impl Into<String>) -> ReaderError {
        ReaderError::InvalidEncoding {
            line,
            message: message.into(),
        }
    }
}

/// The compression format of the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Automatically detect the compression format from the file extension.
    ///
    /// This is the default.
    #[default]
    Auto,
    /// No compression.
    None,
    /// Gzip compression (single or multi-member, e.g. bgzip).
    Gzip,
    /// Zstandard compression.
    Zstd,
    /// Bzip2 compression.
    Bzip2,
}

/// Detect compression from file extension
fn detect_compression_from_extension(path: &Path) -> Compression {
    let ext = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
    match ext {
        "gz" | "bgz" => Compression::Gzip,
        "zst" | "zstd" => Compression::Zstd,
        "bz2" | "bzip2" => Compression::Bzip2,
        _ => Compression::None,
    }
}

/// A builder for creating a `Reader`.
///
/// # Example
///
/// ```rust,no_run
/// use nirvana_filter::Reader;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let reader = Reader::builder()
///         .from_path("sample.json.gz")
///         .buffer_capacity(256 * 1024)
///         .build()?;
///
///     for line in reader {
///         let line = line?;
///         // ...
///     }
///
///     Ok(())
/// }
/// ```
pub struct ReaderBuilder {
    source: Option<ReaderSource>,
    buffer_capacity: usize,
    compression: Compression,
}

impl Default for ReaderBuilder {
    fn default() -> Self {
        Self {
            source: None,
            buffer_capacity: 64 * 1024,
            compression: Compression::default(),
        }
    }
}

impl ReaderBuilder {
    /// Reads from a filesystem path.
    pub fn from_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source = Some(ReaderSource::Path(path.as_ref().into()));
        self
    }

    /// Reads from an arbitrary byte stream.
    ///
    /// The stream is decompressed only when `compression` is set explicitly;
    /// `Compression::Auto` has no extension to inspect and reads it as is.
    pub fn from_reader<T>(mut self, reader: T) -> Self
    where
        T: Read + Send + 'static,
    {
        self.source = Some(ReaderSource::Reader(Box::new(reader)));
        self
    }

    /// Sets the buffer capacity for the reader.
    ///
    /// The default is 64 KB.
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(8 * 1024);
        self
    }

    /// Sets the compression format of the input.
    pub fn compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Builds the `Reader`.
    pub fn build(mut self) -> ReaderResult<Reader> {
        let source = self
            .source
            .take()
            .ok_or_else(|| ReaderError::Builder("ERROR: no input source configured".into()))?;

        let stream = match source {
            ReaderSource::Path(path) => {
                let compression = match self.compression {
                    Compression::Auto => detect_compression_from_extension(&path),
                    other => other,
                };
                let file = File::open(&path)?;
                log::debug!("opening {} as {:?}", path.display(), compression);
                wrap_decoder(Box::new(file), compression)?
            }
            ReaderSource::Reader(reader) => wrap_decoder(reader, self.compression)?,
        };

        Ok(Reader {
            inner: BufReader::with_capacity(self.buffer_capacity, stream),
            buffer: Vec::with_capacity(1024),
            line_number: 0,
        })
    }
}

/// Wraps a raw byte stream in the decoder for `compression`.
fn wrap_decoder(
    raw: Box<dyn Read + Send>,
    compression: Compression,
) -> ReaderResult<Box<dyn Read + Send>> {
    match compression {
        Compression::None | Compression::Auto => Ok(raw),
        Compression::Gzip => {
            #[cfg(feature = "gzip")]
            {
                Ok(Box::new(MultiGzDecoder::new(raw)))
            }
            #[cfg(not(feature = "gzip"))]
            {
                drop(raw);
                Err(ReaderError::Builder(
                    "gzip compression requested but the `gzip` feature is disabled".into(),
                ))
            }
        }
        Compression::Zstd => {
            #[cfg(feature = "zstd")]
            {
                Ok(Box::new(ZstdDecoder::new(raw)?))
            }
            #[cfg(not(feature = "zstd"))]
            {
                drop(raw);
                Err(ReaderError::Builder(
                    "zstd compression requested but the `zstd` feature is disabled".into(),
                ))
            }
        }
        Compression::Bzip2 => {
            #[cfg(feature = "bz2")]
            {
                Ok(Box::new(BzDecoder::new(raw)))
            }
            #[cfg(not(feature = "bz2"))]
            {
                drop(raw);
                Err(ReaderError::Builder(
                    "bzip2 compression requested but the `bz2` feature is disabled".into(),
                ))
            }
        }
    }
}

/// Reader source
enum ReaderSource {
    Path(PathBuf),
    Reader(Box<dyn Read + Send>),
}

/// A line reader over a (possibly compressed) text stream.
///
/// Each item is one decoded line with its terminator removed. The reader is
/// lazy: a consumer that stops iterating never pulls the rest of the stream
/// through the decoder.
///
/// # Example
///
/// ```rust,no_run
/// use nirvana_filter::Reader;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut reader = Reader::from_path("sample.json.gz")?;
///     if let Some(first) = reader.next() {
///         println!("{}", first?);
///     }
///     Ok(())
/// }
/// ```
pub struct Reader {
    inner: BufReader<Box<dyn Read + Send>>,
    buffer: Vec<u8>,
    line_number: usize,
}

impl Reader {
    /// Creates a new `ReaderBuilder` to configure a `Reader`.
    pub fn builder() -> ReaderBuilder {
        ReaderBuilder::default()
    }

    /// Creates a new `Reader` from a path, detecting compression from its
    /// extension.
    pub fn from_path<P: AsRef<Path>>(path: P) -> ReaderResult<Self> {
        Self::builder().from_path(path).build()
    }

    /// Creates a new `Reader` over an uncompressed byte stream.
    pub fn from_reader<T>(reader: T) -> ReaderResult<Self>
    where
        T: Read + Send + 'static,
    {
        Self::builder().from_reader(reader).build()
    }

    /// Returns the number of lines read so far.
    pub fn current_line(&self) -> usize {
        self.line_number
    }

    /// Reads the next line into the internal buffer.
    ///
    /// Returns `Ok(false)` at end of stream.
    fn fill_buffer(&mut self) -> ReaderResult<bool> {
        self.buffer.clear();
        let bytes = self.inner.read_until(b'\n', &mut self.buffer)?;
        if bytes == 0 {
            return Ok(false);
        }
        self.line_number += 1;
        trim_line(&mut self.buffer);
        Ok(true)
    }

    /// Returns the next decoded line.
    fn next_line(&mut self) -> Option<ReaderResult<String>> {
        match self.fill_buffer() {
            Ok(true) => {
                let line = std::str::from_utf8(&self.buffer)
                    .map(str::to_owned)
                    .map_err(|err| ReaderError::invalid_encoding(self.line_number, err.to_string()));
                Some(line)
            }
            Ok(false) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

impl Iterator for Reader {
    type Item = ReaderResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line()
    }
}

/// Strips a trailing `\n` or `\r\n`.
fn trim_line(line: &mut Vec<u8>) {
    while line.ends_with(b"\n") || line.ends_with(b"\r") {
        line.pop();
    }
}
