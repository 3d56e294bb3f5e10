#![warn(missing_docs)]
#![deny(clippy::unimplemented)]
#![deny(clippy::unreachable)]
#![deny(clippy::todo)]
#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]
#![doc = include_str!("../README.md")]

use std::fmt::{self, Display, Formatter};
use std::io;
use thiserror::Error;

pub mod filter;
pub mod import;
pub mod map;
pub mod parse;
pub mod qso;
pub mod record;
pub mod write;


pub use filter::{ExportFilter, Filtered};
pub use import::{
    ImportReport, ImportSummary, RecordError, import, import_reader,
    import_with,
};
pub use map::{Fallback, MapOptions, Mapper, MappingError, map};
pub use parse::{TagDecoder, TagStream, Tags, scan};
pub use qso::{Band, DuplicateKey, Mode, Qso};
pub use record::{
    Assembler, FieldMap, RecordStream, Segment, Segments, SegmentsExt,
};
pub use write::{
    ExportOptions, QsoEncoder, QsoSink, export_filename, serialize,
    serialize_filtered, serialize_with,
};

/// Errors raised by the async reader and writer adapters.
///
/// Content problems never surface here: malformed tags become
/// [`Token::Malformed`] and bad records become [`MappingError`]s in the
/// [`ImportReport`].
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error occurred while reading or writing ADIF data.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Error::Io(a), Error::Io(b)) => a.kind() == b.kind(),
        }
    }
}

/// Location of a tag within the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    /// Line number, starting from 1.
    pub line: usize,
    /// Column number, starting from 1.
    pub column: usize,
    /// Byte offset from the start of the input.
    pub byte: usize,
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A single `<NAME:LEN[:TYPE]>VALUE` field scanned from ADIF text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    name: String,
    length: usize,
    data_type: Option<String>,
    value: String,
}

impl Field {
    /// Create a field with no type indicator.
    ///
    /// The name is normalized to upper case and the declared length is the
    /// byte length of the value.
    ///
    /// ```
    /// use hamhub_adif::Field;
    /// let field = Field::new("call", "W1AW");
    /// assert_eq!(field.name(), "CALL");
    /// assert_eq!(field.length(), 4);
    /// ```
    pub fn new(name: impl AsRef<str>, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            name: name.as_ref().to_ascii_uppercase(),
            length: value.len(),
            data_type: None,
            value,
        }
    }

    /// Return the upper-cased name of the tag.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the length declared in the tag.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Return the type indicator, if the tag carried one.
    ///
    /// The scanner does not interpret it.
    pub fn data_type(&self) -> Option<&str> {
        self.data_type.as_deref()
    }

    /// Return the value of the tag.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Split the field into its name and value.
    pub fn into_parts(self) -> (String, String) {
        (self.name, self.value)
    }
}

/// A tag the scanner could not make sense of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Malformed {
    text: String,
    position: Position,
}

impl Malformed {
    pub(crate) fn new(text: String, position: Position) -> Self {
        Self { text, position }
    }

    /// Return the raw text of the offending tag, without the brackets.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Return where the offending tag starts.
    pub fn position(&self) -> Position {
        self.position
    }
}

impl Display for Malformed {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "malformed tag <{}> at {}", self.text, self.position)
    }
}

/// A single item in an ADIF token stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A data field with name and value
    Field(Field),
    /// A tag that violated the grammar and was skipped
    Malformed(Malformed),
    /// End of header
    HeaderEnd,
    /// End of record
    RecordEnd,
}

impl Token {
    /// Returns `Some` if this is a `Field` token, otherwise `None`.
    pub fn as_field(&self) -> Option<&Field> {
        let Token::Field(field) = self else {
            return None;
        };
        Some(field)
    }

    /// Returns `true` if this is a malformed tag.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Token::Malformed(_))
    }

    /// Returns `true` if this is an end-of-header marker.
    pub fn is_header_end(&self) -> bool {
        matches!(self, Token::HeaderEnd)
    }

    /// Returns `true` if this is an end-of-record marker.
    pub fn is_record_end(&self) -> bool {
        matches!(self, Token::RecordEnd)
    }
}
