/*!
Decoding of a whole input, as one item or as a CBOR sequence.
*/

use anyhow::Context;
use cbor_decoder::{Config, Decoder, Item, StreamDecoder};
use clap::Args;
use tracing::{debug, warn};

#[derive(Args, Debug)]
pub struct Mode {
    /// Treat the input as a CBOR sequence (RFC 8742) of items
    #[arg(short, long)]
    sequence: bool,

    /// Decode incrementally, feeding the decoder this many bytes at a time
    #[arg(long, value_name = "BYTES", requires = "sequence", value_parser = clap::value_parser!(u64).range(1..))]
    stream_chunk: Option<u64>,
}

/// The decoded items, and how many input bytes they occupy.
#[derive(Debug)]
pub struct Decoded {
    pub items: Vec<Item>,
    pub len: usize,
}

impl Mode {
    pub fn decode(&self, data: &[u8], config: &Config) -> anyhow::Result<Decoded> {
        if let Some(chunk_size) = self.stream_chunk {
            return stream(data, config, chunk_size as usize);
        }

        let decoder = Decoder::new(config.clone());
        if self.sequence {
            let items = decoder.decode_all(data).context("Failed to decode CBOR sequence")?;
            return Ok(Decoded {
                items,
                len: data.len(),
            });
        }

        let (item, len) = decoder.decode(data).context("Failed to decode CBOR item")?;
        if len < data.len() {
            warn!(
                "Ignoring {} bytes after the first item, use --sequence to decode them",
                data.len() - len
            );
        }
        Ok(Decoded {
            items: vec![item],
            len,
        })
    }
}

fn stream(data: &[u8], config: &Config, chunk_size: usize) -> anyhow::Result<Decoded> {
    let mut decoder = StreamDecoder::new(config.clone());
    let mut items = Vec::new();
    for chunk in data.chunks(chunk_size) {
        decoder
            .feed(chunk)
            .with_context(|| format!("Failed to decode CBOR stream after {} items", items.len()))?;
        items.extend(decoder.drain());
        debug!("Fed {} of {} bytes", decoder.offset(), data.len());
    }
    decoder.finish().context("CBOR stream ended mid-item")?;
    Ok(Decoded {
        items,
        len: data.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cbor_decoder::{Error, ErrorKind, SequenceError};

    fn mode(sequence: bool, stream_chunk: Option<u64>) -> Mode {
        Mode {
            sequence,
            stream_chunk,
        }
    }

    fn data(s: &str) -> Vec<u8> {
        hex::decode(s).unwrap()
    }

    #[test]
    fn single_item_ignores_trailing_bytes() {
        let decoded = mode(false, None)
            .decode(&data("0102"), &Config::default())
            .unwrap();
        assert_eq!(decoded.items, vec![Item::Unsigned(1)]);
        assert_eq!(decoded.len, 1);
    }

    #[test]
    fn sequence_and_stream_agree() {
        let expected = vec![Item::Unsigned(1), Item::Array(vec![Item::Unsigned(2)])];
        for m in [mode(true, None), mode(true, Some(1)), mode(true, Some(2))] {
            let decoded = m.decode(&data("018102"), &Config::default()).unwrap();
            assert_eq!(decoded.items, expected, "{m:?}");
            assert_eq!(decoded.len, 3, "{m:?}");
        }
    }

    #[test]
    fn sequence_errors() {
        let err = mode(true, None)
            .decode(&data("01ff"), &Config::default())
            .unwrap_err();
        let err = err.downcast_ref::<SequenceError>().unwrap();
        assert_eq!(err.decoded, vec![Item::Unsigned(1)]);
        assert_eq!(err.error, Error::new(ErrorKind::TrailingGarbage, 1));

        let err = mode(true, Some(1))
            .decode(&data("01ff"), &Config::default())
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::new(ErrorKind::TrailingGarbage, 1))
        );
    }

    #[test]
    fn stream_ends_mid_item() {
        let err = mode(true, Some(4))
            .decode(&data("8201"), &Config::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "CBOR stream ended mid-item");
        assert_eq!(
            err.downcast_ref::<Error>(),
            Some(&Error::new(ErrorKind::UnexpectedEndOfInput, 2))
        );
    }
}
