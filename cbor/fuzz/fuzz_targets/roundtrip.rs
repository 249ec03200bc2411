#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok((item, _)) = cbor_decoder::decode(data) {
        let encoded = cbor_decoder::encode(&item);
        let (again, len) = cbor_decoder::decode(&encoded).expect("Re-encoded item must decode");
        assert_eq!(len, encoded.len());
        // NaN payloads compare unequal, so compare the canonical bytes instead
        assert_eq!(cbor_decoder::encode(&again), encoded);
    }
});
