use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::ReadBuf;

use super::*;
use crate::test::helpers::*;
use crate::{Band, MapOptions, Mode};

fn mapper() -> Mapper {
    Mapper::at(MapOptions::default(), now())
}

const THREE: &str = "\
Exported by some logger
<ADIF_VER:5>3.1.4 <PROGRAMID:4>Test <EOH>
<CALL:4>W1AW <QSO_DATE:8>20240115 <TIME_ON:4>1430 <BAND:3>20m <MODE:3>FT8 <EOR>
<QSO_DATE:8>20240116 <TIME_ON:4>1500 <BAND:3>40m <MODE:2>CW <EOR>
<CALL:5>K1ABC <QSO_DATE:8>20240117 <FREQ:6>14.250 <MODE:3>USB <EOR>
";

#[test]
fn partial_failure() {
    let report = import_with(THREE, &mapper());
    assert_eq!(report.total_records, 3);
    assert_eq!(report.successful_records(), 2);
    assert_eq!(
        report.errors,
        vec![RecordError {
            index: 2,
            callsign: None,
            error: MappingError::MissingCallsign,
        }]
    );
    let calls: Vec<_> =
        report.records.iter().map(|q| q.callsign.as_str()).collect();
    assert_eq!(calls, vec!["W1AW", "K1ABC"]);
    assert_eq!(report.records[1].band, Band::M20);
    assert_eq!(report.records[1].mode, Mode::Ssb);
    assert_eq!(report.records[1].time_utc, time(0, 0));
    assert_eq!(
        report.header.unwrap().get("PROGRAMID"),
        Some("Test")
    );
}

#[test]
fn error_messages() {
    let text = "<CALL:4>W1AW<QSO_DATE:8>2024XX15<EOR>\
                <QSO_DATE:8>20240115<EOR>";
    let report = import(text);
    assert_eq!(
        report.error_messages(),
        vec![
            "Record 1 (W1AW): missing or invalid QSO_DATE",
            "Record 2: missing CALL",
        ]
    );
}

#[test]
fn empty_input() {
    for text in ["", "   \n", "<EOH>", "header prose only <EOH>\n", "<eor><eor>"]
    {
        let report = import(text);
        assert_eq!(report.total_records, 0, "{text:?}");
        assert!(report.records.is_empty());
        assert!(report.errors.is_empty());
    }
}

#[test]
fn garbage_input() {
    let report = import("<<<:>>> no tags here <b>");
    assert_eq!(report.total_records, 0);
    assert!(report.errors.is_empty());
    assert!(report.malformed_tags > 0);
}

#[test]
fn header_optional() {
    let report = import("<CALL:4>W1AW<QSO_DATE:8>20240115<EOR>");
    assert_eq!(report.header, None);
    assert_eq!(report.successful_records(), 1);
}

#[test]
fn malformed_tags_counted() {
    let text = "<CALL:4>W1AW<QSO_DATE:8>20240115<NAME:x>Bob<EOR>";
    let report = import(text);
    assert_eq!(report.malformed_tags, 1);
    assert_eq!(report.successful_records(), 1);
}

#[test]
fn malformed_only_record_reported() {
    let text = "<CALL:4>W1AW<QSO_DATE:8>20240115<EOR>\
                <CALL:x>K1AB<QSO_DATE:8x>20240115<EOR>\
                <CALL:4>N0CA<QSO_DATE:8>20240117<EOR>";
    let report = import_with(text, &mapper());
    assert_eq!(report.total_records, 3);
    assert_eq!(report.successful_records(), 2);
    assert_eq!(report.malformed_tags, 2);
    assert_eq!(
        report.errors,
        vec![RecordError {
            index: 2,
            callsign: None,
            error: MappingError::MissingCallsign,
        }]
    );
    assert_eq!(report.error_messages(), vec!["Record 2: missing CALL"]);
}

#[test]
fn strict_policy_rejects() {
    let text = "<CALL:4>W1AW<QSO_DATE:8>20240115<FREQ:4>1000<MODE:2>CW<EOR>\
                <CALL:4>K1AB<QSO_DATE:8>20240115<BAND:2>6m<MODE:4>VARA<EOR>";
    let report = import_with(text, &Mapper::at(MapOptions::strict(), now()));
    assert_eq!(report.total_records, 2);
    assert!(report.records.is_empty());
    let errors: Vec<_> = report.errors.iter().map(|e| &e.error).collect();
    assert_eq!(
        errors,
        vec![&MappingError::UnresolvableBand, &MappingError::UnresolvableMode]
    );
    assert_eq!(report.errors[1].callsign.as_deref(), Some("K1AB"));
}

#[test]
fn lotw_eof() {
    let text = "<CALL:4>W1AW<QSO_DATE:8>20240115<EOR>\n<APP_LoTW_EOF>\n\
                <CALL:4>K1AB<QSO_DATE:8>20240115<EOR>";
    let report = import(text);
    assert_eq!(report.total_records, 1);
}

#[test]
fn summary() {
    let report = import_with(THREE, &mapper());
    let summary = report.summary(1);
    assert_eq!(
        summary,
        ImportSummary {
            total_records: 3,
            successful_records: 2,
            imported_records: 1,
            errors: vec!["Record 2: missing CALL".to_string()],
        }
    );
    assert_eq!(report.summary(5).imported_records, 0);
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["total_records"], 3);
}

#[tokio::test]
async fn reader_matches_text() {
    let report = import_reader(THREE.as_bytes(), &mapper()).await.unwrap();
    assert_eq!(report, import_with(THREE, &mapper()));
}

#[tokio::test]
async fn reader_trickle() {
    let reader = TrickleReader::new(THREE, 5);
    let report = import_reader(reader, &mapper()).await.unwrap();
    assert_eq!(report, import_with(THREE, &mapper()));
}

struct FailingReader;

impl AsyncRead for FailingReader {
    fn poll_read(
        self: Pin<&mut Self>, _cx: &mut Context<'_>, _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone")))
    }
}

#[tokio::test]
async fn reader_io_error() {
    let err = import_reader(FailingReader, &mapper()).await.unwrap_err();
    assert_eq!(err, Error::Io(io::Error::from(io::ErrorKind::BrokenPipe)));
}
