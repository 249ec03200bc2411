#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(items) = cbor_decoder::decode_all(data) {
        for item in items {
            _ = format!("{item}");
        }
    }
});
