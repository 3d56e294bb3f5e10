use chrono::{Days, NaiveDate, NaiveTime, TimeZone, Utc};
use hamhub_adif::{Band, Mode, Qso, serialize};
use rust_decimal::Decimal;
use std::str::FromStr;

const BANDS: &[Band] = &[
    Band::M160,
    Band::M80,
    Band::M60,
    Band::M40,
    Band::M30,
    Band::M20,
    Band::M17,
    Band::M15,
    Band::M12,
    Band::M10,
    Band::M6,
    Band::M2,
    Band::Cm70,
];

const MODES: &[Mode] = &[
    Mode::Ft8,
    Mode::Ssb,
    Mode::Cw,
    Mode::Ft4,
    Mode::Rtty,
    Mode::Psk31,
    Mode::Jt65,
    Mode::Fm,
];

const STATES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID",
    "IL", "IN", "IA", "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS",
    "MO", "MT", "NE", "NV", "NH", "NJ", "NM", "NY", "NC", "ND", "OH", "OK",
    "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA", "WA", "WV",
    "WI", "WY",
];

const POWERS: &[u32] = &[5, 10, 50, 100, 500, 1000, 1500];

fn grid(i: usize) -> String {
    let field = (i / 100) % 324;
    let square = i % 100;
    let f1 = ((field / 18) as u8 + b'A') as char;
    let f2 = ((field % 18) as u8 + b'A') as char;
    let s1 = ((square / 10) as u8 + b'0') as char;
    let s2 = ((square % 10) as u8 + b'0') as char;
    format!("{f1}{f2}{s1}{s2}")
}

fn call(i: usize) -> String {
    let p1 = (((i / 676) % 26) as u8 + b'A') as char;
    let p2 = (((i / 26) % 26) as u8 + b'A') as char;
    let n = ((i % 10) as u8 + b'0') as char;
    let s1 = (((i / 2) % 26) as u8 + b'A') as char;
    let s2 = (((i / 3) % 26) as u8 + b'A') as char;
    let s3 = (((i / 5) % 26) as u8 + b'A') as char;
    format!("{p1}{p2}{n}{s1}{s2}{s3}")
}

fn freq_for_band(band: Band) -> &'static str {
    match band {
        Band::M160 => "1.84",
        Band::M80 => "3.573",
        Band::M60 => "5.357",
        Band::M40 => "7.074",
        Band::M30 => "10.136",
        Band::M20 => "14.074",
        Band::M17 => "18.1",
        Band::M15 => "21.074",
        Band::M12 => "24.915",
        Band::M10 => "28.074",
        Band::M6 => "50.313",
        Band::M2 => "146.52",
        Band::Cm70 => "446.0",
        _ => "14.074",
    }
}

fn qso(i: usize) -> Qso {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let date = base.checked_add_days(Days::new((i % 365) as u64)).unwrap();
    let h = (i % 24) as u32;
    let m = (i % 60) as u32;
    let time = NaiveTime::from_hms_opt(h, m, 0).unwrap();
    let band = BANDS[i % BANDS.len()];
    let mode = MODES[i % MODES.len()].clone();

    let mut q = Qso::new(&call(i), date, time, band, mode);
    q.frequency_mhz = Some(Decimal::from_str(freq_for_band(band)).unwrap());
    q.grid_square = Some(grid(i));
    q.state = Some(STATES[i % STATES.len()].to_string());
    let rst = format!("5{}9", i % 10);
    q.rst_sent = Some(rst.clone());
    q.rst_received = Some(rst);
    q.power_watts = Some(POWERS[i % POWERS.len()]);
    let off = format!("{:02}{:02}", (h + 1) % 24, m);
    q.extra.insert("TIME_OFF".to_string(), off);
    q.created_at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    q.updated_at = q.created_at;
    q
}

pub fn records(count: usize) -> Vec<Qso> {
    (0..count).map(qso).collect()
}

pub fn generate(count: usize) -> String {
    serialize(&records(count))
}
