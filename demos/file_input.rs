use hamhub_adif::{MapOptions, Mapper, import_reader};
use tokio::fs::File;
use tokio::io::BufReader;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demos/sample.adi".to_string());
    let file = File::open(&path).await?;
    let reader = BufReader::new(file);
    let report = import_reader(reader, &Mapper::new(MapOptions::default()))
        .await?;

    if let Some(header) = &report.header {
        println!("Header:");
        if let Some(version) = header.get("adif_ver") {
            println!("  ADIF Version: {}", version);
        }
        if let Some(program) = header.get("programid") {
            println!("  Program: {}", program);
        }
        println!();
    }

    for qso in &report.records {
        println!("Contact:");
        println!("  Call: {}", qso.callsign);
        println!("  Date: {}", qso.date_string());
        println!("  Time: {}", qso.time_string());
        println!("  Band: {}", qso.band);
        println!("  Mode: {}", qso.mode);
        if let Some(freq) = qso.frequency_mhz {
            println!("  Frequency: {} MHz", freq);
        }
        for (name, value) in &qso.extra {
            println!("  {}: {}", name, value);
        }
        println!();
    }

    let summary = report.summary(0);
    println!(
        "{} of {} record(s), {} malformed tag(s)",
        summary.successful_records, summary.total_records,
        report.malformed_tags
    );
    for error in &summary.errors {
        println!("  {}", error);
    }
    Ok(())
}
