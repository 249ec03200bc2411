/*!
Incremental decoding of CBOR sequences from input that arrives in pieces.

[`StreamDecoder`] drives a [`Scanner`] and assembles its tokens into
[`Item`]s with an explicit stack of open containers, so memory use is bounded
by the nesting limit rather than by the call stack. For any split of the
input it produces the same items, errors, and offsets as
[`Decoder::decode_all`].
*/

use super::*;
use alloc::collections::VecDeque;
use scan::Chunking;
use tracing::{debug, trace};

#[derive(Debug)]
enum Frame {
    Array {
        start: usize,
        items: Vec<Item>,
        remaining: Option<u64>,
    },
    Map {
        start: usize,
        entries: Vec<(Item, Item)>,
        key: Option<Item>,
        remaining: Option<u64>,
    },
    Tag {
        start: usize,
        tag: u64,
    },
    Chunks {
        start: usize,
        major: Major,
        buf: Vec<u8>,
    },
}

#[derive(Debug)]
pub struct StreamDecoder {
    config: Config,
    scanner: Scanner,
    stack: Vec<Frame>,
    ready: VecDeque<Item>,
    failed: Option<Error>,
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl StreamDecoder {
    pub fn new(config: Config) -> Self {
        Self {
            scanner: Scanner::new(&config),
            config,
            stack: Vec::new(),
            ready: VecDeque::new(),
            failed: None,
        }
    }

    /// Total bytes fed so far.
    pub fn offset(&self) -> usize {
        self.scanner.offset()
    }

    /// `true` when no item is partially decoded.
    pub fn is_idle(&self) -> bool {
        self.stack.is_empty() && self.scanner.is_idle()
    }

    /// Decodes as much of `chunk` as possible.
    ///
    /// Items completed before an error remain available from
    /// [`next_item`](Self::next_item). Once an error is returned, every
    /// further call returns it again.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<(), Error> {
        if let Some(e) = self.failed {
            return Err(e);
        }
        for byte in chunk {
            if let Err(e) = self.push(*byte) {
                self.failed = Some(e);
                return Err(e);
            }
        }
        Ok(())
    }

    /// Takes the next completed top-level item.
    pub fn next_item(&mut self) -> Option<Item> {
        self.ready.pop_front()
    }

    /// Takes every completed top-level item.
    pub fn drain(&mut self) -> Vec<Item> {
        self.ready.drain(..).collect()
    }

    /// Signals end of input, failing if an item was left incomplete.
    pub fn finish(&self) -> Result<(), Error> {
        if let Some(e) = self.failed {
            return Err(e);
        }
        if let Some(at) = self.scanner.pending_since() {
            return Err(Error::new(ErrorKind::UnexpectedEndOfInput, at));
        }
        if !self.stack.is_empty() {
            return Err(Error::new(
                ErrorKind::UnexpectedEndOfInput,
                self.scanner.offset(),
            ));
        }
        Ok(())
    }

    fn push(&mut self, byte: u8) -> Result<(), Error> {
        if self.scanner.is_idle() && byte != head::BREAK {
            self.begin_entry()?;
        }
        if let Some(token) = self.scanner.push(byte)? {
            let start = self.scanner.token_start();
            self.token(token, start)?;
        }
        Ok(())
    }

    /// Enforces the container limit on indefinite containers, which is only
    /// known as each entry begins.
    fn begin_entry(&self) -> Result<(), Error> {
        let seen = match self.stack.last() {
            Some(Frame::Array {
                items,
                remaining: None,
                ..
            }) => items.len(),
            Some(Frame::Map {
                entries,
                key: None,
                remaining: None,
                ..
            }) => entries.len(),
            _ => return Ok(()),
        };

        let count = seen as u64 + 1;
        if self.config.too_many_items(count) {
            let at = self.scanner.offset();
            debug!("Indefinite container exceeds the limit at offset {at}");
            return Err(Error::new(ErrorKind::TooManyItems(count), at));
        }
        Ok(())
    }

    fn token(&mut self, token: Token, start: usize) -> Result<(), Error> {
        let item = match token {
            Token::Break => return self.end(start),
            Token::BytesStart => {
                self.open_chunks(Major::Bytes, start);
                return Ok(());
            }
            Token::TextStart => {
                self.open_chunks(Major::Text, start);
                return Ok(());
            }
            Token::Array(n) => {
                return self.open(Frame::Array {
                    start,
                    items: Vec::new(),
                    remaining: Some(n),
                });
            }
            Token::ArrayStart => {
                return self.open(Frame::Array {
                    start,
                    items: Vec::new(),
                    remaining: None,
                });
            }
            Token::Map(n) => {
                return self.open(Frame::Map {
                    start,
                    entries: Vec::new(),
                    key: None,
                    remaining: Some(n),
                });
            }
            Token::MapStart => {
                return self.open(Frame::Map {
                    start,
                    entries: Vec::new(),
                    key: None,
                    remaining: None,
                });
            }
            Token::Tag(tag) => return self.open(Frame::Tag { start, tag }),
            Token::Bytes(bytes) => {
                if self.append_chunk(&bytes) {
                    return Ok(());
                }
                Item::Bytes(bytes)
            }
            Token::Text(text) => {
                if self.append_chunk(text.as_bytes()) {
                    return Ok(());
                }
                Item::Text(text)
            }
            Token::Unsigned(n) => Item::Unsigned(n),
            Token::Negative(n) => {
                if !self.config.allow_wide_negative && n > i64::MAX as u64 {
                    debug!("Rejecting negative integer below i64::MIN at offset {start}");
                    return Err(Error::new(ErrorKind::IntegerOverflow, start));
                }
                Item::Negative(n)
            }
            Token::Bool(b) => Item::Bool(b),
            Token::Null => Item::Null,
            Token::Undefined => Item::Undefined,
            Token::Simple(v) => Item::Simple(v),
            Token::Float(f) => Item::Float(f),
        };
        self.complete(item, start)
    }

    fn open(&mut self, frame: Frame) -> Result<(), Error> {
        let (start, count) = match &frame {
            Frame::Array {
                start, remaining, ..
            }
            | Frame::Map {
                start, remaining, ..
            } => (*start, *remaining),
            Frame::Tag { start, .. } | Frame::Chunks { start, .. } => (*start, None),
        };

        if self.stack.len() >= self.config.max_nesting_depth {
            debug!(
                "Nesting deeper than {} at offset {start}",
                self.config.max_nesting_depth
            );
            return Err(Error::new(
                ErrorKind::NestingTooDeep(self.config.max_nesting_depth),
                start,
            ));
        }
        if let Some(count) = count
            && self.config.too_many_items(count)
        {
            debug!("Container of {count} entries at offset {start} exceeds the limit");
            return Err(Error::new(ErrorKind::TooManyItems(count), start));
        }

        match frame {
            Frame::Array {
                items,
                remaining: Some(0),
                ..
            } => self.complete(Item::Array(items), start),
            Frame::Map {
                entries,
                remaining: Some(0),
                ..
            } => self.complete(Item::Map(entries), start),
            frame => {
                self.stack.push(frame);
                Ok(())
            }
        }
    }

    fn open_chunks(&mut self, major: Major, start: usize) {
        self.scanner.set_chunking(Some(Chunking {
            major,
            accumulated: 0,
            start,
        }));
        self.stack.push(Frame::Chunks {
            start,
            major,
            buf: Vec::new(),
        });
    }

    /// Adds a string chunk to an open indefinite string, if there is one.
    fn append_chunk(&mut self, chunk: &[u8]) -> bool {
        let Some(Frame::Chunks { buf, .. }) = self.stack.last_mut() else {
            return false;
        };
        buf.extend_from_slice(chunk);
        self.scanner.add_chunk(chunk.len());
        true
    }

    fn end(&mut self, at: usize) -> Result<(), Error> {
        let (item, start) = match self.stack.pop() {
            None => return Err(Error::new(ErrorKind::TrailingGarbage, at)),
            Some(Frame::Array {
                start,
                items,
                remaining: None,
            }) => (Item::Array(items), start),
            Some(Frame::Map {
                key: Some(_),
                remaining: None,
                ..
            }) => return Err(Error::new(ErrorKind::TruncatedMapPair, at)),
            Some(Frame::Map {
                start,
                entries,
                remaining: None,
                ..
            }) => (Item::Map(entries), start),
            Some(Frame::Chunks { start, major, buf }) => {
                self.scanner.set_chunking(None);
                let item = if major == Major::Text {
                    String::from_utf8(buf).map(Item::Text).map_err(|e| {
                        Error::new(
                            ErrorKind::InvalidUtf8,
                            start + e.utf8_error().valid_up_to(),
                        )
                    })?
                } else {
                    Item::Bytes(buf)
                };
                (item, start)
            }
            Some(_) => return Err(Error::new(ErrorKind::UnexpectedBreak, at)),
        };
        self.complete(item, start)
    }

    /// Hands a finished item to its parent, closing every container it
    /// fills up.
    fn complete(&mut self, mut item: Item, mut start: usize) -> Result<(), Error> {
        loop {
            let Some(frame) = self.stack.last_mut() else {
                trace!("Decoded item at offset {start}");
                self.ready.push_back(item);
                return Ok(());
            };

            let inner = match frame {
                Frame::Array {
                    items, remaining, ..
                } => {
                    items.push(item);
                    if !count_down(remaining) {
                        return Ok(());
                    }
                    None
                }
                Frame::Map {
                    entries,
                    key,
                    remaining,
                    ..
                } => match key.take() {
                    None => {
                        if self.config.reject_duplicate_keys
                            && entries.iter().any(|(k, _)| *k == item)
                        {
                            return Err(Error::new(ErrorKind::DuplicateKey, start));
                        }
                        *key = Some(item);
                        return Ok(());
                    }
                    Some(k) => {
                        entries.push((k, item));
                        if !count_down(remaining) {
                            return Ok(());
                        }
                        None
                    }
                },
                Frame::Tag { .. } => Some(item),
                // The scanner only yields chunks or Break inside a string
                Frame::Chunks { .. } => unreachable!(),
            };

            (item, start) = match (self.stack.pop(), inner) {
                (Some(Frame::Array { start, items, .. }), None) => (Item::Array(items), start),
                (Some(Frame::Map { start, entries, .. }), None) => (Item::Map(entries), start),
                (Some(Frame::Tag { start, tag }), Some(inner)) => {
                    (Item::Tagged(tag, Box::new(inner)), start)
                }
                _ => unreachable!(),
            };
        }
    }
}

/// `true` once a definite container has received its last entry.
fn count_down(remaining: &mut Option<u64>) -> bool {
    match remaining {
        Some(n) => {
            *n -= 1;
            *n == 0
        }
        None => false,
    }
}
