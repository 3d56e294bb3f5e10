//! The canonical contact record exchanged with the rest of the logbook

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

mod band;
mod mode;


pub use band::{Band, UnknownBand};
pub use mode::Mode;

/// A single two-way contact.
///
/// Records coming out of the mapper always have a non-empty upper-case
/// callsign, a band from the enumeration and a normalized mode.  The codec
/// assigns no identity; that belongs to whoever stores the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Qso {
    /// Date of the contact (UTC).
    pub date: NaiveDate,
    /// Start time of the contact (UTC), minute precision.
    pub time_utc: NaiveTime,
    /// Station worked, upper case.
    pub callsign: String,
    /// Band of the contact.
    pub band: Band,
    /// Operating mode.
    pub mode: Mode,
    /// Frequency in MHz.
    pub frequency_mhz: Option<Decimal>,
    /// Signal report sent.
    pub rst_sent: Option<String>,
    /// Signal report received.
    pub rst_received: Option<String>,
    /// Operator name of the station worked.
    pub name: Option<String>,
    /// Location of the station worked.
    pub qth: Option<String>,
    /// Maidenhead locator, upper case.
    pub grid_square: Option<String>,
    /// Country name.
    pub country: Option<String>,
    /// DXCC entity code.
    pub dxcc: Option<u32>,
    /// State or province, upper case.
    pub state: Option<String>,
    /// Transmit power in watts.
    pub power_watts: Option<u32>,
    /// Free-form comment.
    pub notes: Option<String>,
    /// QSL card sent.
    pub qsl_sent: bool,
    /// QSL card received.
    pub qsl_received: bool,
    /// Contest identifier.
    pub contest_name: Option<String>,
    /// Contest exchange received.
    pub contest_exchange: Option<String>,
    /// ADIF fields with no typed attribute, in input order.
    #[serde(default)]
    pub extra: IndexMap<String, String>,
    /// When the record was created, set by the caller.
    pub created_at: DateTime<Utc>,
    /// When the record was last changed, set by the caller.
    pub updated_at: DateTime<Utc>,
}

/// Key under which the storage layer detects duplicate contacts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DuplicateKey {
    /// Callsign, upper case.
    pub callsign: String,
    /// Date of the contact.
    pub date: NaiveDate,
    /// Band of the contact.
    pub band: Band,
    /// Mode name, upper case.
    pub mode: String,
}

impl Qso {
    /// Create a record with only the required attributes, stamped now.
    ///
    /// ```
    /// use chrono::{NaiveDate, NaiveTime};
    /// use hamhub_adif::{Band, Mode, Qso};
    /// let qso = Qso::new(
    ///     "w1aw",
    ///     NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
    ///     NaiveTime::from_hms_opt(14, 5, 0).unwrap(),
    ///     Band::M20,
    ///     Mode::Ft8,
    /// );
    /// assert_eq!(qso.callsign, "W1AW");
    /// assert_eq!(qso.date_string(), "2024-02-29");
    /// assert_eq!(qso.time_string(), "14:05");
    /// ```
    pub fn new(
        callsign: &str, date: NaiveDate, time_utc: NaiveTime, band: Band,
        mode: Mode,
    ) -> Self {
        let now = Utc::now();
        Self {
            date,
            time_utc,
            callsign: callsign.trim().to_uppercase(),
            band,
            mode,
            frequency_mhz: None,
            rst_sent: None,
            rst_received: None,
            name: None,
            qth: None,
            grid_square: None,
            country: None,
            dxcc: None,
            state: None,
            power_watts: None,
            notes: None,
            qsl_sent: false,
            qsl_received: false,
            contest_name: None,
            contest_exchange: None,
            extra: IndexMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Return the date in `YYYY-MM-DD` form.
    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// Return the time in `HH:MM` form.
    pub fn time_string(&self) -> String {
        self.time_utc.format("%H:%M").to_string()
    }

    /// Return the callsign+date+band+mode key used to spot duplicates.
    pub fn duplicate_key(&self) -> DuplicateKey {
        DuplicateKey {
            callsign: self.callsign.to_uppercase(),
            date: self.date,
            band: self.band,
            mode: self.mode.as_str().to_uppercase(),
        }
    }
}
