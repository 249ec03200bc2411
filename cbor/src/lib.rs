/*!
A `no_std` decoder for Concise Binary Object Representation (RFC 8949).

Two front ends share one item model and one set of limits:

- [`Decoder`] decodes an in-memory buffer recursively into an owned [`Item`]
  tree, one top-level item or a whole CBOR sequence at a time.
- [`StreamDecoder`] accepts input in arbitrary chunks and assembles items with
  an explicit frame stack, driven by the byte-at-a-time [`Scanner`].

Both report failures as an [`Error`]: an [`ErrorKind`] plus the byte offset at
which the fault was detected. No partially decoded item is ever returned.

```
use cbor_decoder::{Item, decode};

let (item, len) = decode(&[0x9f, 0x01, 0x02, 0xff]).unwrap();
assert_eq!(item, Item::Array(vec![Item::Unsigned(1), Item::Unsigned(2)]));
assert_eq!(len, 4);
```
*/
#![no_std]
extern crate alloc;

use alloc::{boxed::Box, string::String, vec::Vec};

mod diag;
mod head;

pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod item;
pub mod scan;
pub mod stream;

pub use config::Config;
pub use decode::{Decoder, Items, decode, decode_all};
pub use encode::{Encoder, ToCbor, encode, encode_sequence};
pub use error::{Error, ErrorKind, SequenceError};
pub use head::Major;
pub use item::{Float, Item};
pub use scan::{Scanner, Token};
pub use stream::StreamDecoder;



#[cfg(test)]
mod item_tests;


#[cfg(test)]
mod stream_tests;
