//! Grouping of scanned tokens into header and record field maps

use crate::parse::TagStream;
use crate::{Error, TagDecoder, Token};
use futures::stream::Stream;
use indexmap::IndexMap;
use log::{debug, warn};
use std::iter::FusedIterator;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::io::AsyncRead;


/// Fields of one header or record, keyed by upper-cased tag name.
///
/// Insertion order is preserved.  Inserting a name that is already present
/// replaces the value in place, so the last occurrence in the input wins.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldMap {
    fields: IndexMap<String, String>,
}

impl FieldMap {
    /// Create an empty field map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value.
    ///
    /// ```
    /// use hamhub_adif::FieldMap;
    /// let mut fields = FieldMap::new();
    /// fields.insert("call", "W1AW");
    /// fields.insert("CALL", "K1AB");
    /// assert_eq!(fields.get("Call"), Some("K1AB"));
    /// assert_eq!(fields.len(), 1);
    /// ```
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.fields
            .insert(name.as_ref().to_ascii_uppercase(), value.into());
    }

    /// Return the value of the named field, compared case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .or_else(|| self.fields.get(&name.to_ascii_uppercase()))
            .map(String::as_str)
    }

    /// True if the named field is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Return the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True if there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Return an iterator over all fields in input order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl IntoIterator for FieldMap {
    type Item = (String, String);
    type IntoIter = indexmap::map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<K, V> FromIterator<(K, V)> for FieldMap
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// A header or a candidate record delimited by `<EOH>` or `<EOR>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Fields that preceded `<EOH>`
    Header(FieldMap),
    /// Fields of one `<EOR>`-terminated record
    Record(FieldMap),
}

impl Segment {
    /// Returns `true` if this is the header.
    pub fn is_header(&self) -> bool {
        matches!(self, Segment::Header(_))
    }

    /// Return the fields of either kind of segment.
    pub fn fields(&self) -> &FieldMap {
        match self {
            Segment::Header(f) | Segment::Record(f) => f,
        }
    }
}

/// Incremental grouping of tokens into segments.
///
/// Malformed tokens are counted and logged, never fatal.  A segment that saw
/// no tokens at all (e.g. a doubled `<EOR>`) is not a candidate record and is
/// dropped silently; one that saw only malformed tags is still a record.
#[derive(Debug, Default)]
pub struct Assembler {
    pending: FieldMap,
    // any field or malformed tag since the last <EOH>/<EOR>
    seen: bool,
    malformed: usize,
    records: usize,
}

impl Assembler {
    /// Create an assembler with nothing pending.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one token, returning a segment when it completes one.
    pub fn push(&mut self, token: Token) -> Option<Segment> {
        match token {
            Token::Field(field) => {
                let (name, value) = field.into_parts();
                self.pending.insert(name, value);
                self.seen = true;
                None
            }
            Token::Malformed(m) => {
                debug!("skipping {}", m);
                self.malformed += 1;
                self.seen = true;
                None
            }
            Token::HeaderEnd => {
                self.seen = false;
                Some(Segment::Header(std::mem::take(&mut self.pending)))
            }
            Token::RecordEnd => {
                let fields = std::mem::take(&mut self.pending);
                if !std::mem::take(&mut self.seen) {
                    debug!("skipping empty record");
                    return None;
                }
                self.records += 1;
                Some(Segment::Record(fields))
            }
        }
    }

    /// Signal the end of input, discarding any unterminated record.
    pub fn finish(&mut self) {
        self.seen = false;
        let pending = std::mem::take(&mut self.pending);
        if !pending.is_empty() {
            warn!(
                "ignoring {} field(s) after the last <EOR>",
                pending.len()
            );
        }
    }

    /// Return the number of malformed tags seen so far.
    pub fn malformed(&self) -> usize {
        self.malformed
    }

    /// Return the number of records produced so far.
    pub fn records(&self) -> usize {
        self.records
    }
}

/// Iterator that aggregates tokens into segments.
#[derive(Debug)]
pub struct Segments<I> {
    tokens: I,
    assembler: Assembler,
    done: bool,
}

impl<I> Segments<I> {
    /// Return the number of malformed tags skipped so far.
    pub fn malformed(&self) -> usize {
        self.assembler.malformed()
    }

    /// Return the number of records produced so far.
    pub fn records(&self) -> usize {
        self.assembler.records()
    }
}

impl<I> Iterator for Segments<I>
where
    I: Iterator<Item = Token>,
{
    type Item = Segment;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        for token in self.tokens.by_ref() {
            if let Some(segment) = self.assembler.push(token) {
                return Some(segment);
            }
        }
        self.assembler.finish();
        self.done = true;
        None
    }
}

impl<I> FusedIterator for Segments<I> where I: Iterator<Item = Token> {}

/// Extension trait providing the `segments` method on token iterators.
pub trait SegmentsExt: Iterator<Item = Token> {
    /// Aggregate tokens into segments.
    ///
    /// ```
    /// use hamhub_adif::{SegmentsExt, scan};
    /// let segments: Vec<_> =
    ///     scan("<programid:6>HamHub<eoh><call:4>W1AW<eor>")
    ///         .segments()
    ///         .collect();
    /// assert!(segments[0].is_header());
    /// assert_eq!(segments[1].fields().get("call"), Some("W1AW"));
    /// ```
    fn segments(self) -> Segments<Self>
    where
        Self: Sized,
    {
        Segments {
            tokens: self,
            assembler: Assembler::new(),
            done: false,
        }
    }
}

impl<I> SegmentsExt for I where I: Iterator<Item = Token> {}

/// Stream that aggregates ADIF tokens into segments.
#[derive(Debug)]
pub struct RecordStream<S> {
    stream: S,
    assembler: Assembler,
}

impl<S> RecordStream<S> {
    /// Wrap a stream of tokens.
    pub fn from_tokens(stream: S) -> Self {
        Self {
            stream,
            assembler: Assembler::new(),
        }
    }

    /// Return the number of malformed tags skipped so far.
    pub fn malformed(&self) -> usize {
        self.assembler.malformed()
    }

    /// Return the number of records produced so far.
    pub fn records(&self) -> usize {
        self.assembler.records()
    }
}

impl<R> RecordStream<TagStream<R>>
where
    R: AsyncRead,
{
    /// Create a new stream that returns ADIF segments from a reader.
    ///
    /// ```
    /// # tokio_test::block_on(async {
    /// use futures::StreamExt;
    /// use hamhub_adif::RecordStream;
    /// let mut r = RecordStream::new("<call:4>W1AW<eor>".as_bytes());
    /// let segment = r.next().await.unwrap().unwrap();
    /// assert!(!segment.is_header());
    /// assert_eq!(segment.fields().get("call"), Some("W1AW"));
    /// assert!(r.next().await.is_none());
    /// # });
    /// ```
    pub fn new(reader: R) -> Self {
        Self::from_tokens(TagDecoder::new_stream(reader))
    }
}

impl<S> Stream for RecordStream<S>
where
    S: Stream<Item = Result<Token, Error>> + Unpin,
{
    type Item = Result<Segment, Error>;

    fn poll_next(
        mut self: Pin<&mut Self>, cx: &mut Context<'_>,
    ) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.stream).poll_next(cx) {
                Poll::Ready(Some(Ok(token))) => {
                    if let Some(segment) = self.assembler.push(token) {
                        return Poll::Ready(Some(Ok(segment)));
                    }
                }
                Poll::Ready(Some(Err(e))) => return Poll::Ready(Some(Err(e))),
                Poll::Ready(None) => {
                    self.assembler.finish();
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
