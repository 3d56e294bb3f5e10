use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use futures::Stream;
use tokio::io::{AsyncRead, ReadBuf};

use crate::{Band, FieldMap, Mode, Position, Qso};

pub(crate) fn position(line: usize, column: usize, byte: usize) -> Position {
    Position { line, column, byte }
}

pub(crate) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub(crate) fn time(hour: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, min, 0).unwrap()
}

pub(crate) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

pub(crate) fn fields(pairs: &[(&str, &str)]) -> FieldMap {
    let mut map = FieldMap::new();
    for (name, value) in pairs {
        map.insert(*name, *value);
    }
    map
}

pub(crate) fn qso(call: &str, d: NaiveDate, band: Band, mode: Mode) -> Qso {
    let mut q = Qso::new(call, d, time(14, 30), band, mode);
    q.created_at = now();
    q.updated_at = now();
    q
}

pub(crate) struct TrickleReader {
    data: Vec<u8>,
    pos: usize,
    chunk: usize,
    delayed: bool,
}

impl TrickleReader {
    pub(crate) fn new(data: &str, chunk: usize) -> Self {
        Self {
            data: data.as_bytes().to_vec(),
            pos: 0,
            chunk,
            delayed: false,
        }
    }
}

impl AsyncRead for TrickleReader {
    fn poll_read(
        mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let remaining = self.data.len() - self.pos;
        if remaining == 0 {
            return Poll::Ready(Ok(()));
        }

        if !self.delayed {
            self.delayed = true;
            cx.waker().wake_by_ref();
            return Poll::Pending;
        }

        let to_read = remaining.min(self.chunk).min(buf.remaining());
        buf.put_slice(&self.data[self.pos..self.pos + to_read]);
        self.pos += to_read;
        self.delayed = false;
        Poll::Ready(Ok(()))
    }
}

pub(crate) struct TrickleStream<S> {
    inner: S,
    delayed: bool,
}

impl<S> TrickleStream<S> {
    pub(crate) fn new(inner: S) -> Self {
        Self {
            inner,
            delayed: false,
        }
    }
}

impl<S> Stream for TrickleStream<S>
where
    S: Stream + Unpin,
{
    type Item = S::Item;

    fn poll_next(
        mut self: Pin<&mut Self>, cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        if !self.delayed {
            self.delayed = true;
            cx.waker().wake_by_ref();
            return Poll::Pending;
        }

        self.delayed = false;
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
