use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Operating mode, normalized to a small vocabulary.
///
/// Values outside the vocabulary are kept upper-cased in [`Mode::Other`] so
/// that newer modes survive a round trip.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(from = "String", into = "String")]
pub enum Mode {
    /// Single sideband voice, including USB, LSB and generic phone
    #[default]
    Ssb,
    /// Morse code
    Cw,
    /// Frequency modulation
    Fm,
    /// Amplitude modulation
    Am,
    /// FT8
    Ft8,
    /// FT4
    Ft4,
    /// JS8Call
    Js8,
    /// JT65
    Jt65,
    /// JT9
    Jt9,
    /// Q65
    Q65,
    /// MSK144 meteor scatter
    Msk144,
    /// Radioteletype
    Rtty,
    /// BPSK31
    Psk31,
    /// Olivia MFSK
    Olivia,
    /// Slow-scan television
    Sstv,
    /// Anything else, upper-cased
    Other(String),
}

impl Mode {
    const KNOWN: [Mode; 15] = [
        Mode::Ssb,
        Mode::Cw,
        Mode::Fm,
        Mode::Am,
        Mode::Ft8,
        Mode::Ft4,
        Mode::Js8,
        Mode::Jt65,
        Mode::Jt9,
        Mode::Q65,
        Mode::Msk144,
        Mode::Rtty,
        Mode::Psk31,
        Mode::Olivia,
        Mode::Sstv,
    ];

    // ADIF submodes that should be logged as their own mode
    const SUBMODES: [(&'static str, &'static str); 5] = [
        ("MFSK", "FT4"),
        ("MFSK", "JS8"),
        ("MFSK", "Q65"),
        ("PSK", "PSK31"),
        ("PSK", "BPSK31"),
    ];

    /// Return the upper-case name of the mode.
    pub fn as_str(&self) -> &str {
        match self {
            Mode::Ssb => "SSB",
            Mode::Cw => "CW",
            Mode::Fm => "FM",
            Mode::Am => "AM",
            Mode::Ft8 => "FT8",
            Mode::Ft4 => "FT4",
            Mode::Js8 => "JS8",
            Mode::Jt65 => "JT65",
            Mode::Jt9 => "JT9",
            Mode::Q65 => "Q65",
            Mode::Msk144 => "MSK144",
            Mode::Rtty => "RTTY",
            Mode::Psk31 => "PSK31",
            Mode::Olivia => "OLIVIA",
            Mode::Sstv => "SSTV",
            Mode::Other(s) => s,
        }
    }

    /// True unless this is [`Mode::Other`].
    pub fn is_known(&self) -> bool {
        !matches!(self, Mode::Other(_))
    }

    /// Look a mode name up in the vocabulary, including synonyms.
    ///
    /// Returns `None` for names outside the vocabulary.
    pub fn lookup(name: &str) -> Option<Mode> {
        let name = name.trim().to_ascii_uppercase();
        let mode = match name.as_str() {
            "USB" | "LSB" | "PHONE" => Mode::Ssb,
            "BPSK31" => Mode::Psk31,
            "JS8CALL" => Mode::Js8,
            "A1A" => Mode::Cw,
            _ => return Mode::KNOWN.into_iter().find(|m| m.as_str() == name),
        };
        Some(mode)
    }

    /// Normalize a mode, and optionally its ADIF submode, leniently.
    ///
    /// ```
    /// use hamhub_adif::Mode;
    /// assert_eq!(Mode::normalize("usb", None), Mode::Ssb);
    /// assert_eq!(Mode::normalize("MFSK", Some("FT4")), Mode::Ft4);
    /// assert_eq!(Mode::normalize("vara hf", None).as_str(), "VARA HF");
    /// ```
    pub fn normalize(mode: &str, submode: Option<&str>) -> Mode {
        Self::resolve(mode, submode).unwrap_or_else(|| {
            Mode::Other(mode.trim().to_ascii_uppercase())
        })
    }

    /// Like [`Mode::normalize`], but `None` for modes outside the
    /// vocabulary.
    pub fn resolve(mode: &str, submode: Option<&str>) -> Option<Mode> {
        match submode {
            Some(sub) if Self::promotes(mode, sub) => Self::lookup(sub),
            _ => Self::lookup(mode),
        }
    }

    /// True if `submode` replaces `mode`, as FT4 does for MFSK.
    pub(crate) fn promotes(mode: &str, submode: &str) -> bool {
        let (mode, submode) = (mode.trim(), submode.trim());
        Self::SUBMODES.iter().any(|(parent, child)| {
            mode.eq_ignore_ascii_case(parent)
                && submode.eq_ignore_ascii_case(child)
        })
    }
}

impl From<String> for Mode {
    fn from(s: String) -> Self {
        Mode::normalize(&s, None)
    }
}

impl From<Mode> for String {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Other(s) => s,
            m => m.as_str().to_string(),
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
