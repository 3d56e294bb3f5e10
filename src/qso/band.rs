use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// Amateur radio band, by its ADIF name.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
    Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum Band {
    /// 2190 m (136 kHz)
    M2190,
    /// 630 m (472 kHz)
    M630,
    /// 160 m
    M160,
    /// 80 m
    M80,
    /// 60 m
    M60,
    /// 40 m
    M40,
    /// 30 m
    M30,
    /// 20 m
    M20,
    /// 17 m
    M17,
    /// 15 m
    M15,
    /// 12 m
    M12,
    /// 10 m
    M10,
    /// 6 m
    M6,
    /// 4 m
    M4,
    /// 2 m
    M2,
    /// 1.25 m
    M1_25,
    /// 70 cm
    Cm70,
    /// 33 cm
    Cm33,
    /// 23 cm
    Cm23,
    /// 13 cm
    Cm13,
}

/// Band name that is not in the enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown band: {0}")]
pub struct UnknownBand(pub String);

impl Band {
    /// Every band, from lowest to highest frequency.
    pub const ALL: [Band; 20] = [
        Band::M2190,
        Band::M630,
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
        Band::M4,
        Band::M2,
        Band::M1_25,
        Band::Cm70,
        Band::Cm33,
        Band::Cm23,
        Band::Cm13,
    ];

    /// Return the lower-case ADIF name of the band.
    pub fn as_str(self) -> &'static str {
        match self {
            Band::M2190 => "2190m",
            Band::M630 => "630m",
            Band::M160 => "160m",
            Band::M80 => "80m",
            Band::M60 => "60m",
            Band::M40 => "40m",
            Band::M30 => "30m",
            Band::M20 => "20m",
            Band::M17 => "17m",
            Band::M15 => "15m",
            Band::M12 => "12m",
            Band::M10 => "10m",
            Band::M6 => "6m",
            Band::M4 => "4m",
            Band::M2 => "2m",
            Band::M1_25 => "1.25m",
            Band::Cm70 => "70cm",
            Band::Cm33 => "33cm",
            Band::Cm23 => "23cm",
            Band::Cm13 => "13cm",
        }
    }

    /// Return the inclusive frequency range, in MHz, used to infer this
    /// band from a frequency.
    ///
    /// Only the bands a logbook commonly sees have a range.
    pub fn inference_range(self) -> Option<(Decimal, Decimal)> {
        let (lo, hi) = match self {
            Band::M160 => ((18, 1), (20, 1)),
            Band::M80 => ((35, 1), (40, 1)),
            Band::M60 => ((53, 1), (55, 1)),
            Band::M40 => ((70, 1), (73, 1)),
            Band::M30 => ((101, 1), (1015, 2)),
            Band::M20 => ((140, 1), (1435, 2)),
            Band::M17 => ((18068, 3), (18168, 3)),
            Band::M15 => ((210, 1), (2145, 2)),
            Band::M12 => ((2489, 2), (2499, 2)),
            Band::M10 => ((280, 1), (297, 1)),
            Band::M6 => ((500, 1), (540, 1)),
            Band::M2 => ((1440, 1), (1480, 1)),
            Band::Cm70 => ((4200, 1), (4500, 1)),
            _ => return None,
        };
        Some((Decimal::new(lo.0, lo.1), Decimal::new(hi.0, hi.1)))
    }

    /// Infer the band containing a frequency in MHz.
    ///
    /// ```
    /// use hamhub_adif::Band;
    /// use rust_decimal::Decimal;
    /// assert_eq!(Band::from_frequency(Decimal::new(14250, 3)), Some(Band::M20));
    /// assert_eq!(Band::from_frequency(Decimal::from(1000)), None);
    /// ```
    pub fn from_frequency(mhz: Decimal) -> Option<Band> {
        Band::ALL.into_iter().find(|band| {
            band.inference_range()
                .is_some_and(|(lo, hi)| lo <= mhz && mhz <= hi)
        })
    }
}

impl FromStr for Band {
    type Err = UnknownBand;

    /// Parse a band name, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Band::ALL
            .into_iter()
            .find(|band| band.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownBand(s.to_string()))
    }
}

impl TryFrom<String> for Band {
    type Error = UnknownBand;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Band> for String {
    fn from(band: Band) -> Self {
        band.as_str().to_string()
    }
}

impl Display for Band {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
