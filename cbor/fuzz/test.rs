#![cfg(test)]

use std::io::Read;

#[test]
fn test_all() {
    match std::fs::read_dir("./corpus/decode") {
        Err(e) => {
            eprintln!(
                "Failed to open dir: {e}, curr dir: {}",
                std::env::current_dir().unwrap().to_string_lossy()
            );
        }
        Ok(dir) => {
            for entry in dir.flatten() {
                let path = entry.path();
                if path.is_file()
                    && let Ok(mut file) = std::fs::File::open(&path)
                {
                    let mut buffer = Vec::new();
                    if file.read_to_end(&mut buffer).is_ok() {
                        let expected = cbor_decoder::decode_all(&buffer);
                        let mut decoder = cbor_decoder::StreamDecoder::default();
                        let streamed = decoder.feed(&buffer).and_then(|_| decoder.finish());
                        match (&expected, streamed) {
                            (Ok(items), Ok(())) => assert_eq!(items.len(), decoder.drain().len()),
                            (Err(e), Err(error)) => assert_eq!(e.error, error),
                            _ => panic!("{} decodes differently when streamed", path.display()),
                        }
                    }
                }
            }
        }
    }
}
