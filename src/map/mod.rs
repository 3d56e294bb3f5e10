//! Conversion of assembled field maps into canonical records

use crate::{Band, FieldMap, Mode, Qso};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use indexmap::IndexMap;
use log::debug;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use thiserror::Error;


/// Band used when neither `BAND` nor `FREQ` resolves one.
pub const DEFAULT_BAND: Band = Band::M20;

/// Why a record could not be mapped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// `CALL` is absent or empty.
    #[error("missing CALL")]
    MissingCallsign,
    /// `QSO_DATE` is absent or not a valid `YYYYMMDD` date.
    #[error("missing or invalid QSO_DATE")]
    MissingOrInvalidDate,
    /// No band from `BAND` or `FREQ`, under the strict band policy.
    #[error("band not given and not inferable from FREQ")]
    UnresolvableBand,
    /// Missing or unrecognized `MODE`, under the strict mode policy.
    #[error("missing or unrecognized MODE")]
    UnresolvableMode,
}

/// What to do when a band or mode cannot be resolved.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Fallback {
    /// Substitute a default: [`DEFAULT_BAND`], `SSB` for a missing mode, or
    /// the upper-cased value for an unrecognized mode.
    #[default]
    Lenient,
    /// Reject the record.
    Strict,
}

/// Mapping policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    /// Policy for records whose band cannot be resolved.
    pub band: Fallback,
    /// Policy for records whose mode is missing or unrecognized.
    pub mode: Fallback,
    /// Keep fields without a typed attribute in [`Qso::extra`].
    pub preserve_unknown: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            band: Fallback::Lenient,
            mode: Fallback::Lenient,
            preserve_unknown: true,
        }
    }
}

impl MapOptions {
    /// Options that reject rather than guess.
    pub fn strict() -> Self {
        Self {
            band: Fallback::Strict,
            mode: Fallback::Strict,
            ..Self::default()
        }
    }
}

/// Tracks which fields of a record have been consumed.
struct Source<'a> {
    fields: &'a FieldMap,
    taken: HashSet<&'static str>,
}

impl<'a> Source<'a> {
    fn new(fields: &'a FieldMap) -> Self {
        Self {
            fields,
            taken: HashSet::new(),
        }
    }

    // consumes the field if present; empty values read as absent
    fn take(&mut self, name: &'static str) -> Option<&'a str> {
        let value = self.fields.get(name)?;
        self.taken.insert(name);
        Some(value).filter(|v| !v.trim().is_empty())
    }

    fn first(&mut self, names: &[&'static str]) -> Option<&'a str> {
        names.iter().find_map(|&name| self.take(name))
    }

    fn peek(&self, name: &str) -> Option<&'a str> {
        self.fields.get(name).filter(|v| !v.trim().is_empty())
    }

    fn rest(&self) -> IndexMap<String, String> {
        self.fields
            .iter()
            .filter(|(name, _)| !self.taken.contains(*name))
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y%m%d").ok()
}

// first four digits as HHMM; colons are tolerated
fn parse_time(s: &str) -> Option<NaiveTime> {
    let digits: String =
        s.trim().chars().filter(|&c| c != ':').take(4).collect();
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hour = digits.get(..2)?.parse().ok()?;
    let min = digits.get(2..)?.parse().ok()?;
    NaiveTime::from_hms_opt(hour, min, 0)
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s.trim()).ok()
}

fn is_yes(s: Option<&str>) -> bool {
    s.is_some_and(|s| s.trim().eq_ignore_ascii_case("Y"))
}

/// Converts field maps into [`Qso`] records under a [`MapOptions`] policy.
///
/// The mapper's clock stamps `created_at` and `updated_at` of every record
/// it produces.
#[derive(Debug, Clone)]
pub struct Mapper {
    options: MapOptions,
    now: DateTime<Utc>,
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new(MapOptions::default())
    }
}

impl Mapper {
    /// Create a mapper that stamps records with the current time.
    pub fn new(options: MapOptions) -> Self {
        Self::at(options, Utc::now())
    }

    /// Create a mapper that stamps records with a fixed time.
    pub fn at(options: MapOptions, now: DateTime<Utc>) -> Self {
        Self { options, now }
    }

    /// Return the policy in effect.
    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    /// Map one record.
    ///
    /// ```
    /// use hamhub_adif::{Band, FieldMap, Mapper, Mode};
    /// let fields: FieldMap = [
    ///     ("CALL", "w1aw"),
    ///     ("QSO_DATE", "20240115"),
    ///     ("TIME_ON", "143000"),
    ///     ("FREQ", "14.074"),
    ///     ("MODE", "ft8"),
    /// ]
    /// .into_iter()
    /// .collect();
    /// let qso = Mapper::default().map(&fields).unwrap();
    /// assert_eq!(qso.callsign, "W1AW");
    /// assert_eq!(qso.date_string(), "2024-01-15");
    /// assert_eq!(qso.time_string(), "14:30");
    /// assert_eq!(qso.band, Band::M20);
    /// assert_eq!(qso.mode, Mode::Ft8);
    /// ```
    pub fn map(&self, fields: &FieldMap) -> Result<Qso, MappingError> {
        let mut src = Source::new(fields);

        let callsign = src
            .take("CALL")
            .map(|c| c.trim().to_uppercase())
            .ok_or(MappingError::MissingCallsign)?;
        let date = src
            .take("QSO_DATE")
            .and_then(parse_date)
            .ok_or(MappingError::MissingOrInvalidDate)?;
        let time_utc = src
            .first(&["TIME_ON", "TIME_OFF"])
            .and_then(parse_time)
            .unwrap_or(NaiveTime::MIN);

        let frequency_mhz = src.take("FREQ").and_then(parse_decimal);
        let band = self.band(&callsign, &mut src, frequency_mhz)?;
        let mode = self.mode(&callsign, &mut src)?;

        let text = |v: &str| v.to_string();
        let upper = |v: &str| v.to_uppercase();
        let mut qso = Qso {
            date,
            time_utc,
            callsign,
            band,
            mode,
            frequency_mhz,
            rst_sent: src.take("RST_SENT").map(text),
            rst_received: src.take("RST_RCVD").map(text),
            name: src.take("NAME").map(text),
            qth: src.take("QTH").map(text),
            grid_square: src.take("GRIDSQUARE").map(upper),
            country: src.take("COUNTRY").map(text),
            dxcc: src.take("DXCC").and_then(|v| v.trim().parse().ok()),
            state: src.take("STATE").map(upper),
            power_watts: src
                .take("TX_PWR")
                .and_then(parse_decimal)
                .and_then(|p| p.trunc().to_u32()),
            notes: src.first(&["COMMENT", "NOTES"]).map(text),
            qsl_sent: is_yes(src.take("QSL_SENT")),
            qsl_received: is_yes(src.take("QSL_RCVD")),
            contest_name: src.take("CONTEST_ID").map(text),
            contest_exchange: src
                .first(&["SRX_STRING", "STX_STRING"])
                .map(text),
            extra: IndexMap::new(),
            created_at: self.now,
            updated_at: self.now,
        };
        if self.options.preserve_unknown {
            qso.extra = src.rest();
        }
        Ok(qso)
    }

    fn band(
        &self, callsign: &str, src: &mut Source<'_>, freq: Option<Decimal>,
    ) -> Result<Band, MappingError> {
        let named = src.take("BAND");
        let band = named.and_then(|b| b.parse::<Band>().ok());
        if let (Some(named), None) = (named, band) {
            debug!("{}: unknown band {:?}", callsign, named);
        }

        match band.or_else(|| freq.and_then(Band::from_frequency)) {
            Some(band) => Ok(band),
            None if self.options.band == Fallback::Strict => {
                Err(MappingError::UnresolvableBand)
            }
            None => {
                debug!(
                    "{}: no band, defaulting to {}",
                    callsign, DEFAULT_BAND
                );
                Ok(DEFAULT_BAND)
            }
        }
    }

    fn mode(
        &self, callsign: &str, src: &mut Source<'_>,
    ) -> Result<Mode, MappingError> {
        let strict = self.options.mode == Fallback::Strict;
        let Some(raw) = src.take("MODE") else {
            if strict {
                return Err(MappingError::UnresolvableMode);
            }
            debug!("{}: no mode, defaulting to {}", callsign, Mode::Ssb);
            return Ok(Mode::Ssb);
        };

        let submode =
            src.peek("SUBMODE").filter(|s| Mode::promotes(raw, s));
        if submode.is_some() {
            src.take("SUBMODE");
        }

        match Mode::resolve(raw, submode) {
            Some(mode) => Ok(mode),
            None if strict => Err(MappingError::UnresolvableMode),
            None => Ok(Mode::normalize(raw, submode)),
        }
    }
}

/// Map one record with default options, stamped with the current time.
pub fn map(fields: &FieldMap) -> Result<Qso, MappingError> {
    Mapper::default().map(fields)
}
