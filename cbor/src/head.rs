/*!
Initial byte classification, argument resolution, and the slice cursor.
*/

use super::*;

/// The 3-bit major type of a CBOR initial byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Major {
    Unsigned,
    Negative,
    Bytes,
    Text,
    Array,
    Map,
    Tag,
    Simple,
}

impl Major {
    fn from_bits(bits: u8) -> Self {
        match bits & 0x07 {
            0 => Self::Unsigned,
            1 => Self::Negative,
            2 => Self::Bytes,
            3 => Self::Text,
            4 => Self::Array,
            5 => Self::Map,
            6 => Self::Tag,
            _ => Self::Simple,
        }
    }

    pub fn bits(self) -> u8 {
        match self {
            Self::Unsigned => 0,
            Self::Negative => 1,
            Self::Bytes => 2,
            Self::Text => 3,
            Self::Array => 4,
            Self::Map => 5,
            Self::Tag => 6,
            Self::Simple => 7,
        }
    }
}

pub(crate) const BREAK: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Head {
    pub major: Major,
    pub info: u8,
}

impl Head {
    pub fn classify(byte: u8) -> Self {
        Self {
            major: Major::from_bits(byte >> 5),
            info: byte & 0x1F,
        }
    }

    pub fn is_break(&self) -> bool {
        self.major == Major::Simple && self.info == 31
    }
}

/// How the argument of a head is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Argument {
    Immediate(u64),
    Follows(usize),
    Indefinite,
}

impl Argument {
    pub fn resolve(info: u8) -> Result<Self, ErrorKind> {
        match info {
            0..=23 => Ok(Self::Immediate(info as u64)),
            24 => Ok(Self::Follows(1)),
            25 => Ok(Self::Follows(2)),
            26 => Ok(Self::Follows(4)),
            27 => Ok(Self::Follows(8)),
            31 => Ok(Self::Indefinite),
            _ => Err(ErrorKind::ReservedAdditionalInfo(info)),
        }
    }
}

pub(crate) fn be_uint(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0, |acc, b| (acc << 8) | *b as u64)
}

/// Read position within one source buffer. Owned by a single decode.
pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.offset).copied()
    }

    /// Consumes a Break marker if one is next.
    pub fn take_break(&mut self) -> Result<bool, Error> {
        match self.peek() {
            None => Err(Error::new(ErrorKind::UnexpectedEndOfInput, self.offset)),
            Some(BREAK) => {
                self.offset += 1;
                Ok(true)
            }
            Some(_) => Ok(false),
        }
    }

    pub fn read_head(&mut self) -> Result<Head, Error> {
        let byte = self
            .peek()
            .ok_or(Error::new(ErrorKind::UnexpectedEndOfInput, self.offset))?;
        self.offset += 1;
        Ok(Head::classify(byte))
    }

    pub fn read_bytes(&mut self, len: u64) -> Result<&'a [u8], Error> {
        let eof = Error::new(ErrorKind::UnexpectedEndOfInput, self.offset);
        let len = usize::try_from(len).map_err(|_| eof)?;
        if len > self.remaining() {
            return Err(eof);
        }
        let bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    pub fn read_uint(&mut self, width: usize) -> Result<u64, Error> {
        self.read_bytes(width as u64).map(be_uint)
    }

    /// Resolves the argument of `head`, read at `start`.
    /// `None` means indefinite length.
    pub fn read_argument(&mut self, head: Head, start: usize) -> Result<Option<u64>, Error> {
        match Argument::resolve(head.info).map_err(|kind| Error::new(kind, start))? {
            Argument::Immediate(value) => Ok(Some(value)),
            Argument::Follows(width) => self.read_uint(width).map(Some),
            Argument::Indefinite => Ok(None),
        }
    }
}
