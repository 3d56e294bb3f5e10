//! Tokenizing of ADIF text into fields and structural markers

use crate::{Error, Field, Malformed, Position, Token};
use bytes::{Buf, BytesMut};
use std::iter::FusedIterator;
use tokio::io::AsyncRead;
use tokio_util::codec::{Decoder, FramedRead};


#[derive(Debug)]
enum ParserTag {
    Token(Token),
    Eof,
}

/// What the text between `<` and `>` turned out to be.
enum TagSpec {
    Eoh,
    Eor,
    Eof,
    Field {
        name: String,
        len: usize,
        typ: Option<String>,
    },
    Invalid,
}

impl TagSpec {
    fn parse(tag: &[u8]) -> Self {
        if tag.eq_ignore_ascii_case(b"eoh") {
            return Self::Eoh;
        } else if tag.eq_ignore_ascii_case(b"eor") {
            return Self::Eor;
        } else if tag.eq_ignore_ascii_case(b"app_lotw_eof") {
            return Self::Eof;
        }

        let Ok(tag) = std::str::from_utf8(tag) else {
            return Self::Invalid;
        };
        let mut parts = tag.split(':');
        let (Some(name), Some(len), typ, None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Self::Invalid;
        };

        let name = name.trim();
        if name.is_empty() {
            return Self::Invalid;
        }
        let Ok(len) = len.trim().parse::<usize>() else {
            return Self::Invalid;
        };
        let typ = typ.map(str::trim).filter(|t| !t.is_empty());

        Self::Field {
            name: name.to_ascii_uppercase(),
            len,
            typ: typ.map(str::to_string),
        }
    }
}

/// Stream of ADIF tokens from an async reader.
pub type TagStream<R> = FramedRead<R, TagDecoder>;

/// Decoder for scanning individual ADIF tags from a byte buffer.
///
/// Values are sliced by their declared length, so they may contain `<` and
/// `>`.  Anything between the end of a value and the next `<` is dropped.
/// Tags that break the grammar come out as [`Token::Malformed`] and scanning
/// carries on after them; the decoder itself never fails.
#[derive(Debug, Clone)]
pub struct TagDecoder {
    consumed: usize,
    line: usize,
    column: usize,
    finished: bool,
}

impl Default for TagDecoder {
    fn default() -> Self {
        Self {
            consumed: 0,
            line: 1,
            column: 1,
            finished: false,
        }
    }
}

impl TagDecoder {
    /// Create a decoder positioned at the start of the input.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new stream that returns ADIF tokens.
    ///
    /// ```
    /// # tokio_test::block_on(async {
    /// use futures::StreamExt;
    /// use hamhub_adif::TagDecoder;
    /// let mut t = TagDecoder::new_stream("<call:4>W1AW".as_bytes());
    /// let token = t.next().await.unwrap().unwrap();
    /// let field = token.as_field().unwrap();
    /// assert_eq!(field.name(), "CALL");
    /// assert_eq!(field.value(), "W1AW");
    /// # });
    /// ```
    pub fn new_stream<R>(reader: R) -> TagStream<R>
    where
        R: AsyncRead,
    {
        FramedRead::new(reader, Self::new())
    }

    fn position(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
            byte: self.consumed,
        }
    }

    fn advance_slice(&mut self, data: &[u8]) {
        for &byte in data {
            if byte == b'\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.consumed += data.len();
    }

    fn advance(&mut self, src: &mut BytesMut, consumed: usize) {
        let consumed = consumed.min(src.len());
        if let Some(data) = src.get(..consumed) {
            self.advance_slice(data);
        }
        src.advance(consumed);
    }

    // src begins with the '<' of the offending tag
    fn malformed(
        &mut self, src: &mut BytesMut, text_end: usize, consumed: usize,
    ) -> ParserTag {
        let position = self.position();
        let text = src.get(1..text_end).unwrap_or_default();
        let text = String::from_utf8_lossy(text).into_owned();
        self.advance(src, consumed);
        ParserTag::Token(Token::Malformed(Malformed::new(text, position)))
    }

    fn decode_inner(
        &mut self, src: &mut BytesMut, eof: bool,
    ) -> Option<ParserTag> {
        if self.finished {
            let n = src.len();
            self.advance(src, n);
            return None;
        }

        let Some(begin) = src.iter().position(|&b| b == b'<') else {
            // nothing but prose or whitespace between tags
            let n = src.len();
            self.advance(src, n);
            return None;
        };
        self.advance(src, begin);

        let close = src
            .iter()
            .skip(1)
            .position(|&b| b == b'>' || b == b'<')
            .map(|i| i + 1);
        let Some(close) = close else {
            if !eof {
                return None;
            }
            let n = src.len();
            return Some(self.malformed(src, n, n));
        };
        if src.get(close) == Some(&b'<') {
            // unterminated tag; resume at the next one
            return Some(self.malformed(src, close, close));
        }

        let after = close + 1;
        let spec = TagSpec::parse(src.get(1..close).unwrap_or_default());
        match spec {
            TagSpec::Eoh => {
                self.advance(src, after);
                Some(ParserTag::Token(Token::HeaderEnd))
            }
            TagSpec::Eor => {
                self.advance(src, after);
                Some(ParserTag::Token(Token::RecordEnd))
            }
            TagSpec::Eof => {
                // ignore the rest of the input
                self.finished = true;
                let n = src.len();
                self.advance(src, n);
                Some(ParserTag::Eof)
            }
            TagSpec::Invalid => Some(self.malformed(src, close, after)),
            TagSpec::Field { name, len, typ } => {
                let end = match after.checked_add(len) {
                    Some(end) if end <= src.len() => end,
                    _ if !eof => return None,
                    _ => return Some(self.malformed(src, close, after)),
                };
                let value = src.get(after..end).unwrap_or_default();
                let Ok(value) = std::str::from_utf8(value) else {
                    return Some(self.malformed(src, close, end));
                };
                let field = Field {
                    name,
                    length: len,
                    data_type: typ,
                    value: value.to_string(),
                };
                self.advance(src, end);
                Some(ParserTag::Token(Token::Field(field)))
            }
        }
    }

    fn decode_token(&mut self, src: &mut BytesMut, eof: bool) -> Option<Token> {
        match self.decode_inner(src, eof)? {
            ParserTag::Token(token) => Some(token),
            ParserTag::Eof => None,
        }
    }
}

impl Decoder for TagDecoder {
    type Item = Token;
    type Error = Error;

    fn decode(
        &mut self, src: &mut BytesMut,
    ) -> Result<Option<Self::Item>, Self::Error> {
        Ok(self.decode_token(src, false))
    }

    fn decode_eof(
        &mut self, src: &mut BytesMut,
    ) -> Result<Option<Self::Item>, Self::Error> {
        Ok(self.decode_token(src, true))
    }
}

/// Lazy iterator of ADIF tokens over in-memory text.
///
/// Cloning a `Tags` forks the scan at its current position.  Call [`scan`]
/// again to start over.
#[derive(Debug, Clone)]
pub struct Tags {
    decoder: TagDecoder,
    buf: BytesMut,
    done: bool,
}

impl Iterator for Tags {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let token = self.decoder.decode_token(&mut self.buf, true);
        if token.is_none() {
            self.done = true;
        }
        token
    }
}

impl FusedIterator for Tags {}

/// Scan ADIF text into a sequence of tokens.
///
/// ```
/// use hamhub_adif::{Token, scan};
/// let tokens: Vec<_> = scan("junk <call:4>W1AW <eor>").collect();
/// assert_eq!(tokens.len(), 2);
/// assert_eq!(tokens[0].as_field().unwrap().value(), "W1AW");
/// assert_eq!(tokens[1], Token::RecordEnd);
/// ```
pub fn scan(text: &str) -> Tags {
    Tags {
        decoder: TagDecoder::new(),
        buf: BytesMut::from(text.as_bytes()),
        done: false,
    }
}
