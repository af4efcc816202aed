use std::fmt;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[cfg(feature = "gzip")]
use flate2::write::GzEncoder;
#[cfg(feature = "gzip")]
use flate2::Compression as GzCompression;

use crate::flatten::TranscriptTable;
use crate::record::{GeneRow, VariantRow};

/// Result alias for writer operations.
pub type WriterResult<T> = Result<T, WriterError>;

/// Errors that can occur while writing tables.
#[derive(Debug)]
pub enum WriterError {
    /// An I/O error occurred while writing.
    Io(io::Error),
    /// The CSV encoder rejected a record.
    Csv(csv::Error),
    /// The requested operation cannot be performed with the current feature set.
    Unsupported(String),
}

impl fmt::Display for WriterError {
    /// Formats the writer error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriterError::Io(err) => write!(f, "write error: {err}"),
            WriterError::Csv(err) => write!(f, "csv error: {err}"),
            WriterError::Unsupported(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for WriterError {
    /// Returns the source error, if any.
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WriterError::Io(err) => Some(err),
            WriterError::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for WriterError {
    /// Creates a new `WriterError` from an `io::Error`.
    fn from(err: io::Error) -> Self {
        WriterError::Io(err)
    }
}

impl From<csv::Error> for WriterError {
    /// Creates a new `WriterError` from a `csv::Error`.
    fn from(err: csv::Error) -> Self {
        WriterError::Csv(err)
    }
}

/// Trait implemented by every table that can be exported as CSV.
pub trait Tabular {
    /// Returns the header row.
    fn header(&self) -> Vec<String>;

    /// Writes every data row in order.
    fn write_rows<W: Write>(&self, writer: &mut csv::Writer<W>) -> WriterResult<()>;
}

impl Tabular for [VariantRow] {
    fn header(&self) -> Vec<String> {
        vec!["variant_id".to_string(), "gnomAD_allele_freq".to_string()]
    }

    fn write_rows<W: Write>(&self, writer: &mut csv::Writer<W>) -> WriterResult<()> {
        for row in self {
            let frequency = row.allele_frequency().to_string();
            writer.write_record([row.variant_id(), frequency.as_str()])?;
        }
        Ok(())
    }
}

impl Tabular for [GeneRow] {
    fn header(&self) -> Vec<String> {
        vec!["gene".to_string(), "OMIM_gene_name".to_string()]
    }

    fn write_rows<W: Write>(&self, writer: &mut csv::Writer<W>) -> WriterResult<()> {
        for row in self {
            writer.write_record([row.gene_symbol(), row.cross_reference_name()])?;
        }
        Ok(())
    }
}

impl Tabular for TranscriptTable {
    fn header(&self) -> Vec<String> {
        let mut header = Vec::with_capacity(self.columns().len() + 1);
        header.push(self.id_column().to_string());
        header.extend(self.columns().iter().cloned());
        header
    }

    fn write_rows<W: Write>(&self, writer: &mut csv::Writer<W>) -> WriterResult<()> {
        let mut record = Vec::with_capacity(self.columns().len() + 1);
        for row in self.rows() {
            record.clear();
            record.push(row.variant_id().to_string());
            for cell in self.cells(row) {
                record.push(cell.map(ToString::to_string).unwrap_or_default());
            }
            writer.write_record(&record)?;
        }
        Ok(())
    }
}

/// Writes tables as comma-separated text with a header row.
pub struct Writer;

impl Writer {
    /// Writes `table` into `sink`.
    ///
    /// # Example
    ///
    /// ```
    /// use nirvana_filter::{GeneRow, Writer};
    ///
    /// let genes = vec![GeneRow::new("TP53".into(), "Tumor protein p53".into())];
    /// let mut buf = Vec::new();
    /// Writer::to_writer(genes.as_slice(), &mut buf).unwrap();
    /// assert_eq!(
    ///     String::from_utf8(buf).unwrap(),
    ///     "gene,OMIM_gene_name\nTP53,Tumor protein p53\n"
    /// );
    /// ```
    pub fn to_writer<T, W>(table: &T, sink: W) -> WriterResult<()>
    where
        T: Tabular + ?Sized,
        W: Write,
    {
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(sink);
        writer.write_record(table.header())?;
        table.write_rows(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Creates `path` and writes `table` into it, gzip-compressing the
    /// output when the path ends in `.gz`.
    pub fn to_path<T, P>(path: P, table: &T) -> WriterResult<()>
    where
        T: Tabular + ?Sized,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let gzip = path.extension().is_some_and(|ext| ext == "gz");

        #[cfg(not(feature = "gzip"))]
        if gzip {
            return Err(WriterError::Unsupported(
                "enable the `gzip` feature to write gzip outputs".into(),
            ));
        }

        let file = std::fs::File::create(path)?;

        #[cfg(feature = "gzip")]
        if gzip {
            let mut writer =
                BufWriter::with_capacity(64 * 1024, GzEncoder::new(file, GzCompression::default()));
            Self::to_writer(table, &mut writer)?;
            // `finish` writes the gzip trailer
            let encoder = writer.into_inner().map_err(|err| err.into_error())?;
            encoder.finish()?;
            log::info!("wrote {}", path.display());
            return Ok(());
        }

        let mut writer = BufWriter::with_capacity(64 * 1024, file);
        Self::to_writer(table, &mut writer)?;
        writer.flush()?;
        log::info!("wrote {}", path.display());
        Ok(())
    }
}
