use chrono::{Days, NaiveDate, NaiveTime, TimeZone, Utc};
use hamhub_adif::{
    Band, MapOptions, Mapper, Mode, Qso, import_with, scan, serialize,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn callsign_strategy() -> impl Strategy<Value = String> {
    "[A-Z0-9]{1,3}[0-9][A-Z]{1,4}(/[A-Z0-9]{1,2})?"
}

fn text_strategy() -> impl Strategy<Value = Option<String>> {
    // must not be blank; blank values read back as absent
    prop::option::of(any::<String>().prop_filter("not blank", |s| {
        !s.trim().is_empty()
    }))
}

fn upper_strategy(re: &'static str) -> impl Strategy<Value = Option<String>> {
    prop::option::of(re.prop_map(|s: String| s.to_uppercase()))
}

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    let base = NaiveDate::from_ymd_opt(1950, 1, 1).unwrap();
    let max = 100 * 365 + 25;

    (0u64..=max).prop_filter_map("valid date", move |days| {
        base.checked_add_days(Days::new(days))
    })
}

fn time_strategy() -> impl Strategy<Value = NaiveTime> {
    (0u32..24, 0u32..60)
        .prop_map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap())
}

fn band_strategy() -> impl Strategy<Value = Band> {
    prop::sample::select(Band::ALL.to_vec())
}

fn mode_strategy() -> impl Strategy<Value = Mode> {
    prop_oneof![
        prop::sample::select(vec![
            Mode::Ssb,
            Mode::Cw,
            Mode::Fm,
            Mode::Ft8,
            Mode::Ft4,
            Mode::Js8,
            Mode::Msk144,
            Mode::Olivia,
        ]),
        "(DSTAR|VARA HF|C4FM|HELL)".prop_map(Mode::Other),
    ]
}

fn extra_strategy() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(
        ("(MY|APP_X)_[A-Z]{1,8}", "[ -~]{1,20}"),
        0..=4,
    )
}

#[derive(Debug)]
struct Details {
    freq: Option<Decimal>,
    rst_sent: Option<String>,
    name: Option<String>,
    qth: Option<String>,
    grid: Option<String>,
    dxcc: Option<u32>,
    power: Option<u32>,
    notes: Option<String>,
    qsl: (bool, bool),
    contest: Option<String>,
    extra: Vec<(String, String)>,
}

prop_compose! {
    fn details_strategy()(
        freq in prop::option::of((1i64..=2_500_000, 0u32..=4)),
        rst_sent in upper_strategy("[1-5][1-9][1-9]?"),
        name in text_strategy(),
        qth in text_strategy(),
        grid in upper_strategy("[A-R]{2}[0-9]{2}([a-x]{2})?"),
        dxcc in prop::option::of(1u32..=999),
        power in prop::option::of(1u32..=1500),
        notes in text_strategy(),
        qsl in any::<(bool, bool)>(),
        contest in upper_strategy("[A-Z]{2,4}-[A-Z]{2,4}"),
        extra in extra_strategy(),
    ) -> Details {
        Details {
            freq: freq.map(|(n, scale)| Decimal::new(n, scale)),
            rst_sent,
            name,
            qth,
            grid,
            dxcc,
            power,
            notes,
            qsl,
            contest,
            extra,
        }
    }
}

prop_compose! {
    fn qso_strategy()(
        callsign in callsign_strategy(),
        date in date_strategy(),
        time in time_strategy(),
        band in band_strategy(),
        mode in mode_strategy(),
        d in details_strategy(),
    ) -> Qso {
        let mut q = Qso::new(&callsign, date, time, band, mode);
        q.frequency_mhz = d.freq;
        q.rst_sent = d.rst_sent;
        q.name = d.name;
        q.qth = d.qth;
        q.grid_square = d.grid;
        q.dxcc = d.dxcc;
        q.power_watts = d.power;
        q.notes = d.notes;
        (q.qsl_sent, q.qsl_received) = d.qsl;
        q.contest_name = d.contest;
        q.extra = d.extra.into_iter().collect();
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        q.created_at = at;
        q.updated_at = at;
        q
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn roundtrip(records in prop::collection::vec(qso_strategy(), 0..=20)) {
        let at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let mapper = Mapper::at(MapOptions::default(), at);
        let report = import_with(&serialize(&records), &mapper);
        prop_assert_eq!(report.total_records, records.len());
        prop_assert!(report.errors.is_empty());
        prop_assert_eq!(report.malformed_tags, 0);
        prop_assert_eq!(report.records, records);
    }

    #[test]
    fn scanner_never_panics(text in any::<String>()) {
        let tokens: Vec<_> = scan(&text).collect();
        prop_assert!(tokens.len() <= text.len());
    }

    #[test]
    fn import_never_fails(text in "[<>:A-Za-z0-9 \n]{0,200}") {
        let report = hamhub_adif::import(&text);
        prop_assert_eq!(
            report.total_records,
            report.successful_records() + report.errors.len()
        );
    }
}
