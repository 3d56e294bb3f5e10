//! Selection of records for export

use crate::{Error, Qso};
use futures::stream::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use std::task::{Context, Poll};


// trimmed value, or None for a blank criterion
fn criterion(s: &str) -> Option<&str> {
    Some(s.trim()).filter(|s| !s.is_empty())
}

/// Band, mode and date range a record must match to be exported.
///
/// Each criterion is ignored when blank.  Band and mode compare without
/// regard to case.  Dates are `YYYY-MM-DD` strings compared as text, so
/// both ends of the range are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportFilter {
    /// Band name, e.g. `20m`.
    pub band: String,
    /// Mode name, e.g. `FT8`.
    pub mode: String,
    /// Earliest date to include.
    pub start_date: String,
    /// Latest date to include.
    pub end_date: String,
}

impl ExportFilter {
    /// Create a filter that passes everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only pass records on this band.
    pub fn band(mut self, band: impl Into<String>) -> Self {
        self.band = band.into();
        self
    }

    /// Only pass records in this mode.
    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = mode.into();
        self
    }

    /// Only pass records on or after this date.
    pub fn start_date(mut self, date: impl Into<String>) -> Self {
        self.start_date = date.into();
        self
    }

    /// Only pass records on or before this date.
    pub fn end_date(mut self, date: impl Into<String>) -> Self {
        self.end_date = date.into();
        self
    }

    /// True if no criterion is set.
    pub fn is_empty(&self) -> bool {
        [&self.band, &self.mode, &self.start_date, &self.end_date]
            .into_iter()
            .all(|c| criterion(c).is_none())
    }

    /// True if the record passes every criterion that is set.
    ///
    /// ```
    /// use chrono::{NaiveDate, NaiveTime};
    /// use hamhub_adif::{Band, ExportFilter, Mode, Qso};
    /// let qso = Qso::new(
    ///     "W1AW",
    ///     NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
    ///     NaiveTime::MIN,
    ///     Band::M20,
    ///     Mode::Ft8,
    /// );
    /// let feb = ExportFilter::new()
    ///     .start_date("2024-02-01")
    ///     .end_date("2024-02-29");
    /// assert!(feb.matches(&qso));
    /// assert!(!feb.band("40m").matches(&qso));
    /// ```
    pub fn matches(&self, qso: &Qso) -> bool {
        let band = criterion(&self.band);
        if band.is_some_and(|b| !b.eq_ignore_ascii_case(qso.band.as_str())) {
            return false;
        }
        let mode = criterion(&self.mode);
        if mode.is_some_and(|m| !m.eq_ignore_ascii_case(qso.mode.as_str())) {
            return false;
        }

        let start = criterion(&self.start_date);
        let end = criterion(&self.end_date);
        if start.is_none() && end.is_none() {
            return true;
        }
        let date = qso.date_string();
        start.is_none_or(|s| date.as_str() >= s)
            && end.is_none_or(|e| date.as_str() <= e)
    }

    /// Return the records that pass, in order.
    pub fn apply<'a, I>(&self, records: I) -> impl Iterator<Item = &'a Qso>
    where
        I: IntoIterator<Item = &'a Qso>,
    {
        records.into_iter().filter(move |qso| self.matches(qso))
    }

    /// Wrap a stream of records, yielding only those that pass.
    pub fn stream<S>(self, stream: S) -> Filtered<S> {
        Filtered {
            stream,
            filter: self,
        }
    }
}

/// Stream adapter that drops records an [`ExportFilter`] rejects.
pub struct Filtered<S> {
    stream: S,
    filter: ExportFilter,
}

impl<S> Stream for Filtered<S>
where
    S: Stream<Item = Result<Qso, Error>> + Unpin,
{
    type Item = Result<Qso, Error>;

    fn poll_next(
        self: Pin<&mut Self>, cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            match Pin::new(&mut this.stream).poll_next(cx) {
                Poll::Ready(Some(Ok(qso))) => {
                    if this.filter.matches(&qso) {
                        return Poll::Ready(Some(Ok(qso)));
                    }
                }
                res => return res,
            }
        }
    }
}
