/*!
The decoded CBOR data model.

An [`Item`] tree is built bottom-up by a single decode call and handed to the
caller; decoders keep no reference to it afterwards.
*/

use super::*;
use num_traits::FromPrimitive;

/// A floating-point value, keeping the width it was encoded with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Float {
    Half(half::f16),
    Single(f32),
    Double(f64),
}

impl Float {
    pub fn to_f64(self) -> f64 {
        match self {
            Self::Half(f) => f.to_f64(),
            Self::Single(f) => f as f64,
            Self::Double(f) => f,
        }
    }

    /// Payload width in bytes.
    pub fn width(self) -> usize {
        match self {
            Self::Half(_) => 2,
            Self::Single(_) => 4,
            Self::Double(_) => 8,
        }
    }

    pub(crate) fn from_bits(width: usize, bits: u64) -> Self {
        match width {
            2 => Self::Half(half::f16::from_bits(bits as u16)),
            4 => Self::Single(f32::from_bits(bits as u32)),
            _ => Self::Double(f64::from_bits(bits)),
        }
    }

    pub(crate) fn to_bits(self) -> u64 {
        match self {
            Self::Half(f) => f.to_bits() as u64,
            Self::Single(f) => f.to_bits() as u64,
            Self::Double(f) => f.to_bits(),
        }
    }
}

/// A decoded CBOR data item.
///
/// Indefinite-length strings are delivered concatenated, and map entries keep
/// their encoded order, duplicates included unless the decoder rejects them.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Unsigned(u64),
    /// Holds the encoded argument `n`; the value is `-1 - n`.
    Negative(u64),
    Bytes(Vec<u8>),
    Text(String),
    Array(Vec<Item>),
    Map(Vec<(Item, Item)>),
    Tagged(u64, Box<Item>),
    Bool(bool),
    Null,
    Undefined,
    /// An unassigned simple value (0..=19 or 32..=255).
    ///
    /// Decoding never produces 20..=31: 20..=23 are [`Bool`](Self::Bool),
    /// [`Null`](Self::Null) and [`Undefined`](Self::Undefined), and 24..=31
    /// have no well-formed encoding. Such values do not round trip; the
    /// encoder writes 20..=23 as their named values and 24..=31 as `undefined`.
    Simple(u8),
    Float(Float),
}

impl Item {
    pub fn major_type(&self) -> Major {
        match self {
            Self::Unsigned(_) => Major::Unsigned,
            Self::Negative(_) => Major::Negative,
            Self::Bytes(_) => Major::Bytes,
            Self::Text(_) => Major::Text,
            Self::Array(_) => Major::Array,
            Self::Map(_) => Major::Map,
            Self::Tagged(..) => Major::Tag,
            Self::Bool(_)
            | Self::Null
            | Self::Undefined
            | Self::Simple(_)
            | Self::Float(_) => Major::Simple,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Unsigned(n) => Some(*n),
            _ => None,
        }
    }

    /// The exact integer value; every CBOR integer fits an `i128`.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::Unsigned(n) => Some(*n as i128),
            Self::Negative(n) => Some(-1 - *n as i128),
            _ => None,
        }
    }

    /// `None` if this is not an integer, or is one outside the `i64` range.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_i128().and_then(|n| i64::try_from(n).ok())
    }

    /// Converts an integer item to any primitive that can hold its value.
    pub fn as_int<T: FromPrimitive>(&self) -> Option<T> {
        match self {
            Self::Unsigned(n) => T::from_u64(*n),
            Self::Negative(_) => self.as_i128().and_then(T::from_i128),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(f.to_f64()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Item]> {
        match self {
            Self::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Item, Item)]> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_tagged(&self) -> Option<(u64, &Item)> {
        match self {
            Self::Tagged(tag, item) => Some((*tag, item)),
            _ => None,
        }
    }

    /// First value whose key equals `key`, if this is a map.
    pub fn map_get(&self, key: &Item) -> Option<&Item> {
        self.as_map()?
            .iter()
            .find_map(|(k, v)| (k == key).then_some(v))
    }
}

macro_rules! impl_uint_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Item {
                fn from(value: $ty) -> Self {
                    Self::Unsigned(value as u64)
                }
            }
        )*
    };
}

impl_uint_from!(u8, u16, u32, u64, usize);

macro_rules! impl_int_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Item {
                fn from(value: $ty) -> Self {
                    let value = value as i64;
                    if value >= 0 {
                        Self::Unsigned(value as u64)
                    } else {
                        Self::Negative(!value as u64)
                    }
                }
            }
        )*
    };
}

impl_int_from!(i8, i16, i32, i64, isize);

impl From<bool> for Item {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<half::f16> for Item {
    fn from(value: half::f16) -> Self {
        Self::Float(Float::Half(value))
    }
}

impl From<f32> for Item {
    fn from(value: f32) -> Self {
        Self::Float(Float::Single(value))
    }
}

impl From<f64> for Item {
    fn from(value: f64) -> Self {
        Self::Float(Float::Double(value))
    }
}

impl From<&str> for Item {
    fn from(value: &str) -> Self {
        Self::Text(value.into())
    }
}

impl From<String> for Item {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&[u8]> for Item {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl From<Vec<u8>> for Item {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<Vec<Item>> for Item {
    fn from(value: Vec<Item>) -> Self {
        Self::Array(value)
    }
}

impl From<Vec<(Item, Item)>> for Item {
    fn from(value: Vec<(Item, Item)>) -> Self {
        Self::Map(value)
    }
}
