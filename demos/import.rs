use hamhub_adif::{MapOptions, Mapper, import_with};

const SAMPLE_ADIF: &str = "\
This is some ADIF data from WhizzBangHamLogger version 12345!!!

<adif_ver:5>3.1.4
<programid:6>Example
<eoh>

<call:4>W1AW<qso_date:8>20240115<time_on:6>143000<freq:6>14.074<mode:3>FT8<eor>
<call:5>AB9BH<qso_date:8>20240115<time_on:6>150000<freq:5>7.074<mode:3>USB<eor>
<call:4>W6RQ<qso_date:8>2024011<time_on:6>120000<freq:6>21.074<mode:3>FT4<eor>
<call:4>K6XX<qso_date:8>20240116<time_on:4>1300<freq:4>1000<mode:4>VARA<eor>
";

fn main() {
    env_logger::init();

    for (label, options) in
        [("lenient", MapOptions::default()), ("strict", MapOptions::strict())]
    {
        let report = import_with(SAMPLE_ADIF, &Mapper::new(options));
        println!("{} import:", label);
        for qso in &report.records {
            println!(
                "  {} {} {} {} {}",
                qso.callsign,
                qso.date_string(),
                qso.time_string(),
                qso.band,
                qso.mode
            );
        }
        println!(
            "  {} of {} record(s) imported",
            report.successful_records(),
            report.total_records
        );
        for message in report.error_messages() {
            println!("  {}", message);
        }
        println!();
    }
}
