/*!
Serialization of [`Item`] trees back to CBOR.

Arguments always use their shortest form and containers and strings are
written with definite lengths. Floats keep the width they were decoded with,
so any decoded item re-encodes to bytes that decode to an equal item.
[`Item::Simple`] values in 20..=31, which decoding never produces, are the
exception.
*/

use super::*;

pub trait ToCbor {
    fn to_cbor(&self, encoder: &mut Encoder);
}

#[derive(Debug, Default)]
pub struct Encoder {
    data: Vec<u8>,
}

impl Encoder {
    pub fn new() -> Self {
        Self { data: Vec::new() }
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }

    pub fn offset(&self) -> usize {
        self.data.len()
    }

    fn emit_uint_minor(&mut self, major: Major, val: u64) {
        let major = major.bits() << 5;
        if val < 24 {
            self.data.push(major | (val as u8))
        } else if val <= u8::MAX as u64 {
            self.data.push(major | 24u8);
            self.data.push(val as u8)
        } else if val <= u16::MAX as u64 {
            self.data.push(major | 25u8);
            self.data.extend((val as u16).to_be_bytes())
        } else if val <= u32::MAX as u64 {
            self.data.push(major | 26u8);
            self.data.extend((val as u32).to_be_bytes())
        } else {
            self.data.push(major | 27u8);
            self.data.extend(val.to_be_bytes())
        }
    }

    fn emit_string(&mut self, major: Major, bytes: &[u8]) {
        self.emit_uint_minor(major, bytes.len() as u64);
        self.data.extend_from_slice(bytes)
    }

    pub fn emit<T>(&mut self, value: &T)
    where
        T: ToCbor + ?Sized,
    {
        value.to_cbor(self)
    }
}

impl ToCbor for Float {
    fn to_cbor(&self, encoder: &mut Encoder) {
        let bits = self.to_bits();
        match self.width() {
            2 => {
                encoder.data.push((7 << 5) | 25);
                encoder.data.extend((bits as u16).to_be_bytes())
            }
            4 => {
                encoder.data.push((7 << 5) | 26);
                encoder.data.extend((bits as u32).to_be_bytes())
            }
            _ => {
                encoder.data.push((7 << 5) | 27);
                encoder.data.extend(bits.to_be_bytes())
            }
        }
    }
}

impl ToCbor for Item {
    fn to_cbor(&self, encoder: &mut Encoder) {
        match self {
            Self::Unsigned(n) => encoder.emit_uint_minor(Major::Unsigned, *n),
            Self::Negative(n) => encoder.emit_uint_minor(Major::Negative, *n),
            Self::Bytes(b) => encoder.emit_string(Major::Bytes, b),
            Self::Text(s) => encoder.emit_string(Major::Text, s.as_bytes()),
            Self::Array(items) => {
                encoder.emit_uint_minor(Major::Array, items.len() as u64);
                for item in items {
                    item.to_cbor(encoder);
                }
            }
            Self::Map(entries) => {
                encoder.emit_uint_minor(Major::Map, entries.len() as u64);
                for (k, v) in entries {
                    k.to_cbor(encoder);
                    v.to_cbor(encoder);
                }
            }
            Self::Tagged(tag, item) => {
                encoder.emit_uint_minor(Major::Tag, *tag);
                item.to_cbor(encoder)
            }
            Self::Bool(b) => encoder.data.push((7 << 5) | if *b { 21 } else { 20 }),
            Self::Null => encoder.data.push((7 << 5) | 22),
            Self::Undefined => encoder.data.push((7 << 5) | 23),
            Self::Simple(v @ 20..=23) => encoder.data.push((7 << 5) | v),
            // Reserved, and the two-byte form below 32 is not well-formed
            Self::Simple(24..=31) => encoder.data.push((7 << 5) | 23),
            Self::Simple(v) => encoder.emit_uint_minor(Major::Simple, *v as u64),
            Self::Float(f) => f.to_cbor(encoder),
        }
    }
}

impl<T> ToCbor for [T]
where
    T: ToCbor,
{
    /// Concatenates the items as a CBOR sequence, not an array.
    fn to_cbor(&self, encoder: &mut Encoder) {
        for value in self {
            value.to_cbor(encoder)
        }
    }
}

pub fn encode<T>(value: &T) -> Vec<u8>
where
    T: ToCbor + ?Sized,
{
    let mut e = Encoder::new();
    e.emit(value);
    e.build()
}

/// Encodes `items` back to back as a CBOR sequence (RFC 8742).
pub fn encode_sequence(items: &[Item]) -> Vec<u8> {
    encode(items)
}
