use chrono::{NaiveDate, NaiveTime, Utc};
use futures::SinkExt;
use hamhub_adif::{
    Band, ExportFilter, ExportOptions, Mode, Qso, QsoSink, export_filename,
    serialize_filtered,
};
use rust_decimal::Decimal;

fn contact(
    call: &str, day: u32, band: Band, mode: Mode,
) -> Result<Qso, Box<dyn std::error::Error>> {
    let date = NaiveDate::from_ymd_opt(2024, 2, day).ok_or("bad date")?;
    let time = NaiveTime::from_hms_opt(18, 30, 0).ok_or("bad time")?;
    Ok(Qso::new(call, date, time, band, mode))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut w1aw = contact("w1aw", 1, Band::M20, Mode::Ft8)?;
    w1aw.frequency_mhz = Some(Decimal::new(14074, 3));
    w1aw.rst_sent = Some("-12".to_string());
    let mut ab9bh = contact("ab9bh", 29, Band::M40, Mode::Cw)?;
    ab9bh.notes = Some("Nice <fist>".to_string());
    ab9bh.qsl_sent = true;
    let records = vec![
        w1aw,
        ab9bh,
        contact("w6rq", 3, Band::M20, Mode::Ssb)?,
    ];

    println!("# {}", export_filename("hamhub_log", None));
    let options = ExportOptions::default().created(Utc::now());
    let mut sink = QsoSink::with_options(tokio::io::stdout(), options);
    for qso in records.clone() {
        sink.send(qso).await?;
    }
    sink.close().await?;

    let filter = ExportFilter::new().band("20m").end_date("2024-02-02");
    println!("\n# 20m through 2024-02-02");
    print!("{}", serialize_filtered(&records, &filter));

    Ok(())
}
