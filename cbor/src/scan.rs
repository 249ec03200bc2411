/*!
A resumable, byte-at-a-time CBOR tokenizer.

The scanner moves between three states: expecting a head byte, gathering
the bytes of an argument, and gathering the payload of a definite-length
string. Input may therefore be split at any byte boundary. Each [`Token`] is
one head with its argument and, for definite strings, its payload; nesting is
left to the consumer (see [`StreamDecoder`](crate::StreamDecoder)).
*/

use super::*;
use head::{Argument, Head};
use tracing::debug;

// Payload buffers grow from here rather than trusting the declared length
const MAX_PREALLOC: usize = 4096;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Unsigned(u64),
    Negative(u64),
    Bytes(Vec<u8>),
    Text(String),
    /// Start of an indefinite-length byte string
    BytesStart,
    /// Start of an indefinite-length text string
    TextStart,
    Array(u64),
    ArrayStart,
    Map(u64),
    MapStart,
    Tag(u64),
    Bool(bool),
    Null,
    Undefined,
    Simple(u8),
    Float(Float),
    Break,
}

/// Set while the scanner is inside an indefinite-length string, where only
/// definite chunks of the same major type or a Break may follow.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Chunking {
    pub major: Major,
    pub accumulated: u64,
    pub start: usize,
}

#[derive(Debug)]
enum State {
    Head,
    Argument {
        head: Head,
        value: u64,
        pending: usize,
    },
    Payload {
        major: Major,
        bytes: Vec<u8>,
        pending: usize,
        start: usize,
    },
    Failed(Error),
}

#[derive(Debug)]
pub struct Scanner {
    config: Config,
    state: State,
    offset: usize,
    token_start: usize,
    chunking: Option<Chunking>,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl Scanner {
    /// Only the string length and indefinite-length settings of `config`
    /// apply to tokens; the rest is enforced by the consumer.
    pub fn new(config: &Config) -> Self {
        Self {
            config: config.clone(),
            state: State::Head,
            offset: 0,
            token_start: 0,
            chunking: None,
        }
    }

    /// Total bytes pushed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Offset of the head byte of the current, or most recent, token.
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    /// `true` when the next byte will be read as a head.
    pub fn is_idle(&self) -> bool {
        matches!(self.state, State::Head)
    }

    /// Where the read of an unfinished argument or payload began.
    pub fn pending_since(&self) -> Option<usize> {
        match &self.state {
            State::Argument { .. } => Some(self.token_start + 1),
            State::Payload { start, .. } => Some(*start),
            State::Head | State::Failed(_) => None,
        }
    }

    pub(crate) fn set_chunking(&mut self, chunking: Option<Chunking>) {
        self.chunking = chunking;
    }

    pub(crate) fn add_chunk(&mut self, len: usize) {
        if let Some(chunking) = &mut self.chunking {
            chunking.accumulated += len as u64;
        }
    }

    /// Consumes one byte, returning a token if it completed one.
    ///
    /// After an error the scanner stays failed and keeps returning it.
    pub fn push(&mut self, byte: u8) -> Result<Option<Token>, Error> {
        if let State::Failed(e) = self.state {
            return Err(e);
        }

        let at = self.offset;
        self.offset += 1;
        let r = match core::mem::replace(&mut self.state, State::Head) {
            State::Head => {
                self.token_start = at;
                self.head(Head::classify(byte))
            }
            State::Argument {
                head,
                value,
                pending,
            } => {
                let value = (value << 8) | byte as u64;
                if pending > 1 {
                    self.state = State::Argument {
                        head,
                        value,
                        pending: pending - 1,
                    };
                    Ok(None)
                } else {
                    self.argument(head, value)
                }
            }
            State::Payload {
                major,
                mut bytes,
                pending,
                start,
            } => {
                bytes.push(byte);
                if pending > 1 {
                    self.state = State::Payload {
                        major,
                        bytes,
                        pending: pending - 1,
                        start,
                    };
                    Ok(None)
                } else {
                    string_token(major, bytes, start).map(Some)
                }
            }
            State::Failed(_) => unreachable!(),
        };

        if let Err(e) = r {
            self.state = State::Failed(e);
        }
        r
    }

    /// Pushes every byte of `data`, collecting the completed tokens.
    pub fn feed(&mut self, data: &[u8]) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();
        for byte in data {
            if let Some(token) = self.push(*byte)? {
                tokens.push(token);
            }
        }
        Ok(tokens)
    }

    /// Fails if input ended in the middle of a token.
    pub fn finish(&self) -> Result<(), Error> {
        match (&self.state, self.pending_since()) {
            (State::Failed(e), _) => Err(*e),
            (_, Some(at)) => Err(Error::new(ErrorKind::UnexpectedEndOfInput, at)),
            _ => Ok(()),
        }
    }

    fn error(&self, kind: ErrorKind) -> Error {
        Error::new(kind, self.token_start)
    }

    fn head(&mut self, head: Head) -> Result<Option<Token>, Error> {
        if head.is_break() {
            return Ok(Some(Token::Break));
        }
        if matches!(self.chunking, Some(c) if c.major != head.major) {
            return Err(self.error(ErrorKind::InvalidChunk));
        }

        match Argument::resolve(head.info).map_err(|kind| self.error(kind))? {
            Argument::Immediate(value) => self.argument(head, value),
            Argument::Follows(width) => {
                self.state = State::Argument {
                    head,
                    value: 0,
                    pending: width,
                };
                Ok(None)
            }
            Argument::Indefinite => self.indefinite(head).map(Some),
        }
    }

    fn indefinite(&self, head: Head) -> Result<Token, Error> {
        if self.chunking.is_some() {
            return Err(self.error(ErrorKind::InvalidChunk));
        }
        let token = match head.major {
            Major::Bytes => Token::BytesStart,
            Major::Text => Token::TextStart,
            Major::Array => Token::ArrayStart,
            Major::Map => Token::MapStart,
            _ => return Err(self.error(ErrorKind::ReservedAdditionalInfo(head.info))),
        };
        if !self.config.allow_indefinite_length {
            return Err(self.error(ErrorKind::IndefiniteLength));
        }
        Ok(token)
    }

    fn argument(&mut self, head: Head, value: u64) -> Result<Option<Token>, Error> {
        match head.major {
            Major::Unsigned => Ok(Some(Token::Unsigned(value))),
            Major::Negative => Ok(Some(Token::Negative(value))),
            Major::Array => Ok(Some(Token::Array(value))),
            Major::Map => Ok(Some(Token::Map(value))),
            Major::Tag => Ok(Some(Token::Tag(value))),
            Major::Bytes | Major::Text => self.begin_string(head.major, value),
            Major::Simple => self.simple(head.info, value).map(Some),
        }
    }

    fn begin_string(&mut self, major: Major, len: u64) -> Result<Option<Token>, Error> {
        let (total, string_start) = match self.chunking {
            Some(c) => (c.accumulated.saturating_add(len), c.start),
            None => (len, self.token_start),
        };
        if self.config.string_too_long(total) {
            debug!("String of {total} bytes at offset {string_start} exceeds the limit");
            return Err(Error::new(ErrorKind::StringTooLong(total), string_start));
        }

        if len == 0 {
            return string_token(major, Vec::new(), self.offset).map(Some);
        }
        let pending = usize::try_from(len)
            .map_err(|_| Error::new(ErrorKind::UnexpectedEndOfInput, self.offset))?;
        self.state = State::Payload {
            major,
            bytes: Vec::with_capacity(pending.min(MAX_PREALLOC)),
            pending,
            start: self.offset,
        };
        Ok(None)
    }

    fn simple(&self, info: u8, value: u64) -> Result<Token, Error> {
        match info {
            20 => Ok(Token::Bool(false)),
            21 => Ok(Token::Bool(true)),
            22 => Ok(Token::Null),
            23 => Ok(Token::Undefined),
            0..=19 => Ok(Token::Simple(info)),
            24 if value < 32 => Err(self.error(ErrorKind::UnsupportedSimpleValue(value as u8))),
            24 => Ok(Token::Simple(value as u8)),
            25 => Ok(Token::Float(Float::from_bits(2, value))),
            26 => Ok(Token::Float(Float::from_bits(4, value))),
            27 => Ok(Token::Float(Float::from_bits(8, value))),
            _ => Err(self.error(ErrorKind::ReservedAdditionalInfo(info))),
        }
    }
}

fn string_token(major: Major, bytes: Vec<u8>, start: usize) -> Result<Token, Error> {
    if major == Major::Text {
        String::from_utf8(bytes).map(Token::Text).map_err(|e| {
            Error::new(
                ErrorKind::InvalidUtf8,
                start + e.utf8_error().valid_up_to(),
            )
        })
    } else {
        Ok(Token::Bytes(bytes))
    }
}
