//! Import entry points and the diagnostics they report

use crate::record::RecordStream;
use crate::{Error, FieldMap, Mapper, MappingError, Qso, Segment};
use crate::{SegmentsExt, scan};
use futures::StreamExt;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use tokio::io::AsyncRead;

#[cfg(test)]
mod test;

/// A candidate record that could not be mapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordError {
    /// Position of the record among all candidate records, starting at 1.
    pub index: usize,
    /// Callsign of the record, if it had one.
    pub callsign: Option<String>,
    /// Why the record was rejected.
    pub error: MappingError,
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.callsign {
            Some(call) => {
                write!(f, "Record {} ({}): {}", self.index, call, self.error)
            }
            None => write!(f, "Record {}: {}", self.index, self.error),
        }
    }
}

/// Everything an import produced: the mapped records and what went wrong.
///
/// An import never fails on content.  Empty or unparseable input yields a
/// report with no records and no errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Header fields, if the input had a header.
    pub header: Option<FieldMap>,
    /// Mapped records, in input order.
    pub records: Vec<Qso>,
    /// Number of candidate records seen, mapped or not.
    pub total_records: usize,
    /// Rejected records, in input order.
    pub errors: Vec<RecordError>,
    /// Number of malformed tags skipped by the scanner.
    pub malformed_tags: usize,
}

impl ImportReport {
    /// Return the number of records mapped successfully.
    pub fn successful_records(&self) -> usize {
        self.records.len()
    }

    /// Return one human-readable line per rejected record.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Summarize the import once storage has dropped `duplicates` of the
    /// mapped records.
    pub fn summary(&self, duplicates: usize) -> ImportSummary {
        let successful_records = self.successful_records();
        ImportSummary {
            total_records: self.total_records,
            successful_records,
            imported_records: successful_records.saturating_sub(duplicates),
            errors: self.error_messages(),
        }
    }
}

/// Counts shown to the operator after an import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Number of candidate records in the input.
    pub total_records: usize,
    /// Number of records that mapped.
    pub successful_records: usize,
    /// Number of records actually stored.
    pub imported_records: usize,
    /// One message per rejected record.
    pub errors: Vec<String>,
}

struct Collector<'a> {
    mapper: &'a Mapper,
    report: ImportReport,
}

impl<'a> Collector<'a> {
    fn new(mapper: &'a Mapper) -> Self {
        Self {
            mapper,
            report: ImportReport::default(),
        }
    }

    fn push(&mut self, segment: Segment) {
        let fields = match segment {
            Segment::Header(fields) => {
                self.report.header.get_or_insert(fields);
                return;
            }
            Segment::Record(fields) => fields,
        };

        self.report.total_records += 1;
        match self.mapper.map(&fields) {
            Ok(qso) => self.report.records.push(qso),
            Err(error) => {
                let callsign = fields
                    .get("CALL")
                    .map(|c| c.trim().to_uppercase())
                    .filter(|c| !c.is_empty());
                let e = RecordError {
                    index: self.report.total_records,
                    callsign,
                    error,
                };
                debug!("rejecting {}", e);
                self.report.errors.push(e);
            }
        }
    }

    fn finish(mut self, malformed_tags: usize) -> ImportReport {
        self.report.malformed_tags = malformed_tags;
        info!(
            "mapped {} of {} record(s), {} rejected, {} malformed tag(s)",
            self.report.successful_records(),
            self.report.total_records,
            self.report.errors.len(),
            malformed_tags
        );
        self.report
    }
}

/// Import ADIF text with default options.
///
/// ```
/// let report = hamhub_adif::import(
///     "<eoh><call:4>W1AW<qso_date:8>20240115<eor><qso_date:8>20240115<eor>",
/// );
/// assert_eq!(report.total_records, 2);
/// assert_eq!(report.successful_records(), 1);
/// assert_eq!(report.errors[0].index, 2);
/// ```
pub fn import(text: &str) -> ImportReport {
    import_with(text, &Mapper::default())
}

/// Import ADIF text using a specific mapper.
pub fn import_with(text: &str, mapper: &Mapper) -> ImportReport {
    let mut segments = scan(text).segments();
    let mut collector = Collector::new(mapper);
    for segment in segments.by_ref() {
        collector.push(segment);
    }
    collector.finish(segments.malformed())
}

/// Import ADIF data from an async reader.
///
/// Only I/O errors are returned; content problems go into the report.
///
/// ```
/// # tokio_test::block_on(async {
/// use hamhub_adif::{Mapper, import_reader};
/// let text = "<call:4>W1AW<qso_date:8>20240115<mode:3>USB<eor>";
/// let report = import_reader(text.as_bytes(), &Mapper::default())
///     .await
///     .unwrap();
/// assert_eq!(report.records[0].mode.as_str(), "SSB");
/// # });
/// ```
pub async fn import_reader<R>(
    reader: R, mapper: &Mapper,
) -> Result<ImportReport, Error>
where
    R: AsyncRead + Unpin,
{
    let mut stream = RecordStream::new(reader);
    let mut collector = Collector::new(mapper);
    while let Some(segment) = stream.next().await {
        collector.push(segment?);
    }
    Ok(collector.finish(stream.malformed()))
}
