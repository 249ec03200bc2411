/*!
Recursive decoding of in-memory buffers.

Containers recurse one call per nesting level with an explicit depth
counter, so hostile nesting ends in [`ErrorKind::NestingTooDeep`] rather than
stack exhaustion. Definite and indefinite containers share one loop: the
definite case counts down, the indefinite case stops at a Break marker.
*/

use super::*;
use head::{Cursor, Head};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: Config,
}

impl Decoder {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Decodes the one item at the start of `data`.
    ///
    /// Returns the item and the number of bytes it occupied; any bytes after
    /// it are left alone.
    pub fn decode(&self, data: &[u8]) -> Result<(Item, usize), Error> {
        let mut cursor = Cursor::new(data);
        let item = self.decode_item(&mut cursor, 0)?;
        Ok((item, cursor.offset()))
    }

    /// Decodes `data` as a CBOR sequence, one top-level item after another,
    /// until the buffer is exhausted.
    pub fn decode_all(&self, data: &[u8]) -> Result<Vec<Item>, SequenceError> {
        let mut decoded = Vec::new();
        for item in self.items(data) {
            match item {
                Ok(item) => decoded.push(item),
                Err(error) => return Err(SequenceError { decoded, error }),
            }
        }
        Ok(decoded)
    }

    pub fn items<'a>(&'a self, data: &'a [u8]) -> Items<'a> {
        Items {
            decoder: self,
            cursor: Cursor::new(data),
            failed: false,
        }
    }

    fn decode_item(&self, cursor: &mut Cursor<'_>, depth: usize) -> Result<Item, Error> {
        let start = cursor.offset();
        let head = cursor.read_head()?;
        if head.is_break() {
            return Err(Error::new(ErrorKind::UnexpectedBreak, start));
        }

        match head.major {
            Major::Unsigned => self.definite(cursor, head, start).map(Item::Unsigned),
            Major::Negative => {
                let n = self.definite(cursor, head, start)?;
                if !self.config.allow_wide_negative && n > i64::MAX as u64 {
                    debug!("Rejecting negative integer below i64::MIN at offset {start}");
                    return Err(Error::new(ErrorKind::IntegerOverflow, start));
                }
                Ok(Item::Negative(n))
            }
            Major::Bytes => match self.length(cursor, head, start)? {
                Some(len) => self.read_string(cursor, len, start).map(|b| Item::Bytes(b.to_vec())),
                None => self.decode_chunks(cursor, Major::Bytes, start).map(Item::Bytes),
            },
            Major::Text => {
                let bytes = match self.length(cursor, head, start)? {
                    Some(len) => {
                        let payload = cursor.offset();
                        let bytes = self.read_string(cursor, len, start)?;
                        validate_utf8(bytes, payload)?;
                        bytes.to_vec()
                    }
                    None => self.decode_chunks(cursor, Major::Text, start)?,
                };
                String::from_utf8(bytes)
                    .map(Item::Text)
                    .map_err(|e| Error::new(ErrorKind::InvalidUtf8, start + e.utf8_error().valid_up_to()))
            }
            Major::Array => {
                let count = self.length(cursor, head, start)?;
                let depth = self.enter(depth, start)?;
                self.check_count(count, start)?;
                self.decode_array(cursor, count, depth).map(Item::Array)
            }
            Major::Map => {
                let count = self.length(cursor, head, start)?;
                let depth = self.enter(depth, start)?;
                self.check_count(count, start)?;
                self.decode_map(cursor, count, depth).map(Item::Map)
            }
            Major::Tag => {
                let tag = self.definite(cursor, head, start)?;
                let depth = self.enter(depth, start)?;
                let item = self.decode_item(cursor, depth)?;
                Ok(Item::Tagged(tag, Box::new(item)))
            }
            Major::Simple => decode_simple(cursor, head, start),
        }
    }

    /// Arguments of integers and tags can never be indefinite.
    fn definite(&self, cursor: &mut Cursor<'_>, head: Head, start: usize) -> Result<u64, Error> {
        cursor
            .read_argument(head, start)?
            .ok_or(Error::new(ErrorKind::ReservedAdditionalInfo(head.info), start))
    }

    fn length(
        &self,
        cursor: &mut Cursor<'_>,
        head: Head,
        start: usize,
    ) -> Result<Option<u64>, Error> {
        let len = cursor.read_argument(head, start)?;
        if len.is_none() && !self.config.allow_indefinite_length {
            return Err(Error::new(ErrorKind::IndefiniteLength, start));
        }
        Ok(len)
    }

    fn enter(&self, depth: usize, start: usize) -> Result<usize, Error> {
        if depth >= self.config.max_nesting_depth {
            debug!(
                "Nesting deeper than {} at offset {start}",
                self.config.max_nesting_depth
            );
            return Err(Error::new(
                ErrorKind::NestingTooDeep(self.config.max_nesting_depth),
                start,
            ));
        }
        Ok(depth + 1)
    }

    fn check_count(&self, count: Option<u64>, start: usize) -> Result<(), Error> {
        match count {
            Some(count) if self.config.too_many_items(count) => {
                debug!("Container of {count} entries at offset {start} exceeds the limit");
                Err(Error::new(ErrorKind::TooManyItems(count), start))
            }
            _ => Ok(()),
        }
    }

    fn check_string(&self, len: u64, start: usize) -> Result<(), Error> {
        if self.config.string_too_long(len) {
            debug!("String of {len} bytes at offset {start} exceeds the limit");
            return Err(Error::new(ErrorKind::StringTooLong(len), start));
        }
        Ok(())
    }

    fn read_string<'a>(
        &self,
        cursor: &mut Cursor<'a>,
        len: u64,
        start: usize,
    ) -> Result<&'a [u8], Error> {
        self.check_string(len, start)?;
        cursor.read_bytes(len)
    }

    fn decode_chunks(
        &self,
        cursor: &mut Cursor<'_>,
        major: Major,
        start: usize,
    ) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::new();
        while !cursor.take_break()? {
            let chunk_start = cursor.offset();
            let head = cursor.read_head()?;
            if head.major != major {
                return Err(Error::new(ErrorKind::InvalidChunk, chunk_start));
            }
            let Some(len) = cursor.read_argument(head, chunk_start)? else {
                return Err(Error::new(ErrorKind::InvalidChunk, chunk_start));
            };
            self.check_string((buf.len() as u64).saturating_add(len), start)?;

            let payload = cursor.offset();
            let chunk = cursor.read_bytes(len)?;
            if major == Major::Text {
                validate_utf8(chunk, payload)?;
            }
            buf.extend_from_slice(chunk);
        }
        Ok(buf)
    }

    /// `true` while another entry follows; consumes the Break of an
    /// indefinite container.
    fn next_entry(
        &self,
        cursor: &mut Cursor<'_>,
        remaining: &mut Option<u64>,
        seen: usize,
    ) -> Result<bool, Error> {
        match remaining {
            Some(0) => Ok(false),
            Some(n) => {
                *n -= 1;
                Ok(true)
            }
            None => {
                if cursor.take_break()? {
                    return Ok(false);
                }
                let count = seen as u64 + 1;
                if self.config.too_many_items(count) {
                    debug!("Indefinite container exceeds the limit at offset {}", cursor.offset());
                    return Err(Error::new(ErrorKind::TooManyItems(count), cursor.offset()));
                }
                Ok(true)
            }
        }
    }

    fn decode_array(
        &self,
        cursor: &mut Cursor<'_>,
        mut remaining: Option<u64>,
        depth: usize,
    ) -> Result<Vec<Item>, Error> {
        // Every item takes at least one byte
        let mut items = Vec::with_capacity(capacity(remaining, cursor.remaining()));
        while self.next_entry(cursor, &mut remaining, items.len())? {
            items.push(self.decode_item(cursor, depth)?);
        }
        Ok(items)
    }

    fn decode_map(
        &self,
        cursor: &mut Cursor<'_>,
        mut remaining: Option<u64>,
        depth: usize,
    ) -> Result<Vec<(Item, Item)>, Error> {
        let mut entries: Vec<(Item, Item)> =
            Vec::with_capacity(capacity(remaining, cursor.remaining() / 2));
        let indefinite = remaining.is_none();
        while self.next_entry(cursor, &mut remaining, entries.len())? {
            let key_start = cursor.offset();
            let key = self.decode_item(cursor, depth)?;
            if self.config.reject_duplicate_keys && entries.iter().any(|(k, _)| *k == key) {
                return Err(Error::new(ErrorKind::DuplicateKey, key_start));
            }
            if indefinite && cursor.peek() == Some(head::BREAK) {
                return Err(Error::new(ErrorKind::TruncatedMapPair, cursor.offset()));
            }
            let value = self.decode_item(cursor, depth)?;
            entries.push((key, value));
        }
        Ok(entries)
    }
}

fn capacity(count: Option<u64>, bound: usize) -> usize {
    count.map_or(0, |count| count.min(bound as u64) as usize)
}

fn validate_utf8(bytes: &[u8], at: usize) -> Result<(), Error> {
    core::str::from_utf8(bytes)
        .map(|_| ())
        .map_err(|e| Error::new(ErrorKind::InvalidUtf8, at + e.valid_up_to()))
}

fn decode_simple(cursor: &mut Cursor<'_>, head: Head, start: usize) -> Result<Item, Error> {
    match head.info {
        20 => Ok(Item::Bool(false)),
        21 => Ok(Item::Bool(true)),
        22 => Ok(Item::Null),
        23 => Ok(Item::Undefined),
        0..=19 => Ok(Item::Simple(head.info)),
        24 => match cursor.read_uint(1)? as u8 {
            v if v < 32 => Err(Error::new(ErrorKind::UnsupportedSimpleValue(v), start)),
            v => Ok(Item::Simple(v)),
        },
        25 => cursor.read_uint(2).map(|b| Item::Float(Float::from_bits(2, b))),
        26 => cursor.read_uint(4).map(|b| Item::Float(Float::from_bits(4, b))),
        27 => cursor.read_uint(8).map(|b| Item::Float(Float::from_bits(8, b))),
        info => Err(Error::new(ErrorKind::ReservedAdditionalInfo(info), start)),
    }
}

/// Iterator over the top-level items of a CBOR sequence.
///
/// Yields `Err` at most once, then ends.
pub struct Items<'a> {
    decoder: &'a Decoder,
    cursor: Cursor<'a>,
    failed: bool,
}

impl Items<'_> {
    /// Bytes consumed by the items yielded so far.
    pub fn offset(&self) -> usize {
        self.cursor.offset()
    }
}

impl Iterator for Items<'_> {
    type Item = Result<Item, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor.is_empty() {
            return None;
        }

        let r = if self.cursor.peek() == Some(head::BREAK) {
            Err(Error::new(ErrorKind::TrailingGarbage, self.cursor.offset()))
        } else {
            self.decoder.decode_item(&mut self.cursor, 0)
        };
        self.failed = r.is_err();
        Some(r)
    }
}

/// Decodes one item with the default [`Config`].
pub fn decode(data: &[u8]) -> Result<(Item, usize), Error> {
    Decoder::default().decode(data)
}

/// Decodes a CBOR sequence with the default [`Config`].
pub fn decode_all(data: &[u8]) -> Result<Vec<Item>, SequenceError> {
    Decoder::default().decode_all(data)
}
