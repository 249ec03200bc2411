#![no_main]

use cbor_decoder::{Config, Decoder, SequenceError, StreamDecoder};
use libfuzzer_sys::fuzz_target;

// The first byte picks the chunk size, the rest is the CBOR input
fuzz_target!(|data: &[u8]| {
    let Some((split, data)) = data.split_first() else {
        return;
    };
    let chunk_size = (*split as usize).max(1);

    let mut decoder = StreamDecoder::new(Config::default());
    let mut decoded = Vec::new();
    let mut result = Ok(());
    for chunk in data.chunks(chunk_size) {
        result = decoder.feed(chunk);
        decoded.extend(decoder.drain());
        if result.is_err() {
            break;
        }
    }
    let streamed = match result.and_then(|_| decoder.finish()) {
        Ok(()) => Ok(decoded),
        Err(error) => Err(SequenceError { decoded, error }),
    };

    let expected = Decoder::default().decode_all(data);
    // Items are compared by count, NaN floats never compare equal
    match (&streamed, &expected) {
        (Ok(a), Ok(b)) => assert_eq!(a.len(), b.len()),
        (Err(a), Err(b)) => {
            assert_eq!(a.error, b.error);
            assert_eq!(a.decoded.len(), b.decoded.len());
        }
        _ => panic!("stream {streamed:?} disagrees with slice {expected:?}"),
    }
});
