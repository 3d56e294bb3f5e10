//! Rendering records as ADIF text, in memory or to async writers

use crate::{Error, ExportFilter, Qso};
use bytes::{BufMut, BytesMut};
use chrono::{DateTime, Utc};
use futures::sink::Sink;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::AsyncWrite;
use tokio_util::codec::{Encoder, FramedWrite};


/// ADIF version written to the header.
pub const ADIF_VERSION: &str = "3.1.4";
/// Program identifier written to the header.
pub const PROGRAM_ID: &str = "HamHub";
/// Program version written to the header.
pub const PROGRAM_VERSION: &str = "1.0.0";

const BANNER: &[u8] = b"HamHub ADIF export\n";

// tags written from typed attributes; extra fields never override them
const RECORD_TAGS: [&str; 20] = [
    "CALL",
    "QSO_DATE",
    "TIME_ON",
    "BAND",
    "MODE",
    "FREQ",
    "RST_SENT",
    "RST_RCVD",
    "NAME",
    "QTH",
    "GRIDSQUARE",
    "COUNTRY",
    "DXCC",
    "STATE",
    "TX_PWR",
    "COMMENT",
    "QSL_SENT",
    "QSL_RCVD",
    "CONTEST_ID",
    "SRX_STRING",
];

/// Header settings for an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Value of `ADIF_VER`.
    pub adif_version: String,
    /// Value of `PROGRAMID`.
    pub program_id: String,
    /// Value of `PROGRAMVERSION`.
    pub program_version: String,
    /// Value of `CREATED_TIMESTAMP`, omitted if `None`.
    pub created: Option<DateTime<Utc>>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            adif_version: ADIF_VERSION.to_string(),
            program_id: PROGRAM_ID.to_string(),
            program_version: PROGRAM_VERSION.to_string(),
            created: None,
        }
    }
}

impl ExportOptions {
    /// Stamp the header with a creation time.
    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.created = Some(at);
        self
    }
}

// blank values read back as absent, so they are not written
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn valid_tag_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_graphic() && !b"<>:,{}".contains(&b))
}

/// Encoder that renders records as ADIF, preceded by a header.
///
/// The header is written before the first record.  Call
/// [`finish`](QsoEncoder::finish) after the last record so that an export
/// with no records still gets one.
#[derive(Debug, Default)]
pub struct QsoEncoder {
    options: ExportOptions,
    started: bool,
}

impl QsoEncoder {
    /// Create an encoder with the default header.
    ///
    /// ```
    /// use bytes::BytesMut;
    /// use chrono::{NaiveDate, NaiveTime};
    /// use hamhub_adif::{Band, Mode, Qso, QsoEncoder};
    /// use tokio_util::codec::Encoder;
    ///
    /// let qso = Qso::new(
    ///     "W1AW",
    ///     NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
    ///     NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
    ///     Band::M20,
    ///     Mode::Ft8,
    /// );
    /// let mut buf = BytesMut::new();
    /// QsoEncoder::new().encode(&qso, &mut buf).unwrap();
    /// assert!(buf.ends_with(
    ///     b"<CALL:4>W1AW <QSO_DATE:8>20240115 <TIME_ON:4>1430 \
    ///       <BAND:3>20m <MODE:3>FT8 <EOR>\n"
    /// ));
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an encoder with the given header settings.
    pub fn with_options(options: ExportOptions) -> Self {
        Self {
            options,
            started: false,
        }
    }

    /// Create a sink from this encoder and a writer.
    pub fn qso_sink_with<W>(self, writer: W) -> QsoSink<W>
    where
        W: AsyncWrite,
    {
        QsoSink {
            inner: FramedWrite::new(writer, SinkEncoder(self)),
        }
    }

    fn put_field(name: &str, value: &str, dst: &mut BytesMut) {
        dst.put_u8(b'<');
        dst.put_slice(name.as_bytes());
        dst.put_u8(b':');
        let mut buf = itoa::Buffer::new();
        dst.put_slice(buf.format(value.len()).as_bytes());
        dst.put_u8(b'>');
        dst.put_slice(value.as_bytes());
    }

    fn put_header(&mut self, dst: &mut BytesMut) {
        self.started = true;
        dst.put_slice(BANNER);
        let o = &self.options;
        let mut fields = vec![
            ("ADIF_VER", o.adif_version.clone()),
            ("PROGRAMID", o.program_id.clone()),
            ("PROGRAMVERSION", o.program_version.clone()),
        ];
        if let Some(at) = o.created {
            let ts = at.format("%Y%m%d %H%M%S").to_string();
            fields.push(("CREATED_TIMESTAMP", ts));
        }
        for (name, value) in fields {
            Self::put_field(name, &value, dst);
            dst.put_u8(b'\n');
        }
        dst.put_slice(b"<EOH>\n\n");
    }

    fn put_qso(qso: &Qso, dst: &mut BytesMut) {
        let mut put = |name: &str, value: &str| {
            Self::put_field(name, value, dst);
            dst.put_u8(b' ');
        };
        let mut num = itoa::Buffer::new();

        put("CALL", &qso.callsign);
        put("QSO_DATE", &qso.date.format("%Y%m%d").to_string());
        put("TIME_ON", &qso.time_utc.format("%H%M").to_string());
        put("BAND", &qso.band.as_str().to_lowercase());
        put("MODE", &qso.mode.as_str().to_uppercase());

        if let Some(freq) = qso.frequency_mhz {
            put("FREQ", &freq.to_string());
        }
        let text = [
            ("RST_SENT", &qso.rst_sent),
            ("RST_RCVD", &qso.rst_received),
            ("NAME", &qso.name),
            ("QTH", &qso.qth),
            ("GRIDSQUARE", &qso.grid_square),
            ("COUNTRY", &qso.country),
        ];
        for (name, value) in text {
            if let Some(v) = present(value) {
                put(name, v);
            }
        }
        if let Some(dxcc) = qso.dxcc {
            put("DXCC", num.format(dxcc));
        }
        if let Some(state) = present(&qso.state) {
            put("STATE", state);
        }
        if let Some(pwr) = qso.power_watts {
            put("TX_PWR", num.format(pwr));
        }
        if let Some(notes) = present(&qso.notes) {
            put("COMMENT", notes);
        }
        if qso.qsl_sent {
            put("QSL_SENT", "Y");
        }
        if qso.qsl_received {
            put("QSL_RCVD", "Y");
        }
        if let Some(contest) = present(&qso.contest_name) {
            put("CONTEST_ID", contest);
        }
        if let Some(exchange) = present(&qso.contest_exchange) {
            put("SRX_STRING", exchange);
        }

        for (name, value) in &qso.extra {
            let name = name.to_ascii_uppercase();
            if RECORD_TAGS.contains(&name.as_str()) {
                continue;
            }
            if !valid_tag_name(&name) {
                debug!("{}: skipping field {:?}", qso.callsign, name);
                continue;
            }
            put(&name, value);
        }

        dst.put_slice(b"<EOR>\n");
    }

    /// Render one record, writing the header first if needed.
    pub fn encode_qso(&mut self, qso: &Qso, dst: &mut BytesMut) {
        if !self.started {
            self.put_header(dst);
        }
        Self::put_qso(qso, dst);
    }

    /// Write the header if no record has been written.
    pub fn finish(&mut self, dst: &mut BytesMut) {
        if !self.started {
            self.put_header(dst);
        }
    }
}

impl Encoder<&Qso> for QsoEncoder {
    type Error = Error;

    fn encode(
        &mut self, item: &Qso, dst: &mut BytesMut,
    ) -> Result<(), Self::Error> {
        self.encode_qso(item, dst);
        Ok(())
    }
}

enum Item<'a> {
    Qso(&'a Qso),
    Eof,
}

struct SinkEncoder(QsoEncoder);

impl Encoder<Item<'_>> for SinkEncoder {
    type Error = Error;

    fn encode(
        &mut self, item: Item<'_>, dst: &mut BytesMut,
    ) -> Result<(), Self::Error> {
        match item {
            Item::Qso(qso) => self.0.encode_qso(qso, dst),
            Item::Eof => self.0.finish(dst),
        }
        Ok(())
    }
}

/// Sink for writing records as an ADIF file to an async writer.
///
/// The header goes out with the first record, or on close if no record was
/// sent.
pub struct QsoSink<W> {
    inner: FramedWrite<W, SinkEncoder>,
}

impl<W> QsoSink<W>
where
    W: AsyncWrite,
{
    /// Create a sink with the default header.
    ///
    /// ```
    /// use chrono::{NaiveDate, NaiveTime};
    /// use futures::SinkExt;
    /// use hamhub_adif::{Band, Mode, Qso, QsoSink};
    ///
    /// # tokio_test::block_on(async {
    /// let mut buf = Vec::new();
    /// let mut sink = QsoSink::new(&mut buf);
    /// let qso = Qso::new(
    ///     "W1AW",
    ///     NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
    ///     NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
    ///     Band::M20,
    ///     Mode::Cw,
    /// );
    /// sink.send(qso).await.unwrap();
    /// sink.close().await.unwrap();
    /// let text = String::from_utf8(buf).unwrap();
    /// assert!(text.contains("<PROGRAMID:6>HamHub"));
    /// assert!(text.ends_with("<MODE:2>CW <EOR>\n"));
    /// # })
    /// ```
    pub fn new(writer: W) -> Self {
        QsoEncoder::new().qso_sink_with(writer)
    }

    /// Create a sink with the given header settings.
    pub fn with_options(writer: W, options: ExportOptions) -> Self {
        QsoEncoder::with_options(options).qso_sink_with(writer)
    }
}

impl<W> Sink<Qso> for QsoSink<W>
where
    W: AsyncWrite + Unpin,
{
    type Error = Error;

    fn poll_ready(
        mut self: Pin<&mut Self>, cx: &mut Context<'_>,
    ) -> Poll<Result<(), Error>> {
        Pin::new(&mut self.inner).poll_ready(cx)
    }

    fn start_send(mut self: Pin<&mut Self>, item: Qso) -> Result<(), Error> {
        Pin::new(&mut self.inner).start_send(Item::Qso(&item))
    }

    fn poll_flush(
        mut self: Pin<&mut Self>, cx: &mut Context<'_>,
    ) -> Poll<Result<(), Error>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_close(
        mut self: Pin<&mut Self>, cx: &mut Context<'_>,
    ) -> Poll<Result<(), Error>> {
        Pin::new(&mut self.inner).start_send(Item::Eof)?;
        Pin::new(&mut self.inner).poll_close(cx)
    }
}

/// Render records as an ADIF file with the default header.
///
/// ```
/// let text = hamhub_adif::serialize(&[]);
/// assert!(text.contains("<ADIF_VER:5>3.1.4"));
/// assert!(text.contains("<EOH>"));
/// assert!(!text.contains("<EOR>"));
/// ```
pub fn serialize<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a Qso>,
{
    serialize_with(records, &ExportOptions::default())
}

/// Render records as an ADIF file with the given header settings.
pub fn serialize_with<'a, I>(records: I, options: &ExportOptions) -> String
where
    I: IntoIterator<Item = &'a Qso>,
{
    let mut encoder = QsoEncoder::with_options(options.clone());
    let mut buf = BytesMut::new();
    let mut count = 0;
    for qso in records {
        encoder.encode_qso(qso, &mut buf);
        count += 1;
    }
    encoder.finish(&mut buf);
    info!("serialized {} record(s)", count);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Render only the records that pass a filter.
pub fn serialize_filtered<'a, I>(records: I, filter: &ExportFilter) -> String
where
    I: IntoIterator<Item = &'a Qso>,
{
    serialize(filter.apply(records))
}

/// Return a file name of the form `{prefix}_{YYYYMMDD_HHMMSS}.adi`.
///
/// Uses the current time if none is given.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 30).unwrap();
/// assert_eq!(
///     hamhub_adif::export_filename("hamhub_log", Some(at)),
///     "hamhub_log_20240309_070530.adi"
/// );
/// ```
pub fn export_filename(prefix: &str, at: Option<DateTime<Utc>>) -> String {
    let at = at.unwrap_or_else(Utc::now);
    format!("{}_{}.adi", prefix, at.format("%Y%m%d_%H%M%S"))
}
