use super::*;
use alloc::vec;
use hex_literal::hex;

fn stream(config: &Config, data: &[u8], chunk_size: usize) -> Result<Vec<Item>, SequenceError> {
    let mut decoder = StreamDecoder::new(config.clone());
    let mut decoded = Vec::new();
    for chunk in data.chunks(chunk_size) {
        let r = decoder.feed(chunk);
        decoded.extend(decoder.drain());
        if let Err(error) = r {
            return Err(SequenceError { decoded, error });
        }
    }
    match decoder.finish() {
        Ok(()) => Ok(decoded),
        Err(error) => Err(SequenceError { decoded, error }),
    }
}

fn assert_agrees(config: &Config, data: &[u8]) {
    let expected = Decoder::new(config.clone()).decode_all(data);
    for chunk_size in 1..=data.len().max(1) {
        assert_eq!(
            stream(config, data, chunk_size),
            expected,
            "input {data:02x?} fed in chunks of {chunk_size}"
        );
    }
}

const INPUTS: &[&[u8]] = &[
    &[],
    &hex!("00"),
    &hex!("1b000000e8d4a51000"),
    &hex!("3bffffffffffffffff"),
    &hex!("c249010000000000000000"),
    &hex!("fb3ff199999999999a"),
    &hex!("f8ff"),
    &hex!("64f0908591"),
    &hex!("a56161614161626142616361436164614461656145"),
    &hex!("5f42010243030405ff"),
    &hex!("7f657374726561646d696e67ff"),
    &hex!("9f018202039f0405ffff"),
    &hex!("83019f0203ff820405"),
    &hex!("bf61610161629f0203ffff"),
    &hex!("826161bf61626163ff"),
    &hex!("5f40ff"),
    &hex!("80a09fffbfff"),
    &hex!("c1c2c3f6"),
    &hex!("01626869f6"),
    &hex!("a3010261610201f6"),
    // Malformed
    &hex!("19"),
    &hex!("1903"),
    &hex!("44010203"),
    &hex!("8301"),
    &hex!("9f01"),
    &hex!("5f4101"),
    &hex!("c1"),
    &hex!("9bffffffffffffffff"),
    &hex!("5bffffffffffffffff"),
    &hex!("1c"),
    &hex!("001f"),
    &hex!("fd"),
    &hex!("bf6161ff"),
    &hex!("ff"),
    &hex!("8201ff"),
    &hex!("a1ff"),
    &hex!("c1ff"),
    &hex!("0102ff03"),
    &hex!("01820102820a"),
    &hex!("f818"),
    &hex!("61ff"),
    &hex!("7f61ffff"),
    &hex!("7f61c361bcff"),
    &hex!("5f41016101ff"),
    &hex!("5f5fffff"),
    &hex!("7f01ff"),
    &hex!("5f5c"),
];

#[test]
fn agrees_with_slice_decoder() {
    for data in INPUTS {
        assert_agrees(&Config::default(), data);
    }
}

#[test]
fn agrees_under_limits() {
    let configs = [
        Config {
            max_nesting_depth: 1,
            ..Default::default()
        },
        Config {
            max_nesting_depth: 0,
            ..Default::default()
        },
        Config {
            max_string_length: Some(3),
            ..Default::default()
        },
        Config {
            max_container_length: Some(2),
            ..Default::default()
        },
        Config {
            allow_indefinite_length: false,
            ..Default::default()
        },
        Config {
            allow_wide_negative: false,
            ..Default::default()
        },
        Config {
            reject_duplicate_keys: true,
            ..Default::default()
        },
    ];
    let extra: &[&[u8]] = &[
        &hex!("c1c100"),
        &hex!("4100"),
        &hex!("43010203"),
        &hex!("4401020304"),
        &hex!("82006461626364"),
        &hex!("5f420102420304ff"),
        &hex!("820102"),
        &hex!("83010203"),
        &hex!("a3010203040506"),
        &hex!("9f010203ff"),
        &hex!("bf0102030405ff"),
        &hex!("8380809f"),
        &hex!("3b8000000000000000"),
        &hex!("3b7fffffffffffffff"),
        &hex!("a2616101616202"),
    ];
    for config in &configs {
        for data in INPUTS.iter().chain(extra) {
            assert_agrees(config, data);
        }
    }
}

#[test]
fn deep_nesting() {
    let mut data = vec![0x81; 100];
    data.push(0x00);
    let mut decoder = StreamDecoder::default();
    assert_eq!(
        decoder.feed(&data),
        Err(Error::new(ErrorKind::NestingTooDeep(64), 64))
    );
    assert_agrees(&Config::default(), &data[36..]);
}

#[test]
fn items_as_they_complete() {
    let mut decoder = StreamDecoder::default();
    assert!(decoder.is_idle());

    decoder.feed(&hex!("0182")).unwrap();
    assert_eq!(decoder.next_item(), Some(Item::Unsigned(1)));
    assert_eq!(decoder.next_item(), None);
    assert!(!decoder.is_idle());
    assert_eq!(
        decoder.finish(),
        Err(Error::new(ErrorKind::UnexpectedEndOfInput, 2))
    );

    decoder.feed(&hex!("0203")).unwrap();
    assert!(decoder.is_idle());
    assert_eq!(decoder.offset(), 4);
    assert_eq!(
        decoder.drain(),
        vec![Item::Array(vec![Item::Unsigned(2), Item::Unsigned(3)])]
    );
    assert_eq!(decoder.finish(), Ok(()));
}

#[test]
fn stays_failed() {
    let mut decoder = StreamDecoder::default();
    let e = Error::new(ErrorKind::TrailingGarbage, 1);
    assert_eq!(decoder.feed(&hex!("01ff02")), Err(e));
    assert_eq!(decoder.drain(), vec![Item::Unsigned(1)]);
    assert_eq!(decoder.feed(&hex!("00")), Err(e));
    assert_eq!(decoder.finish(), Err(e));
}

#[test]
fn duplicate_keys_with_container_limit() {
    let config = Config {
        reject_duplicate_keys: true,
        max_container_length: Some(1024),
        ..Default::default()
    };
    let data = hex!("bbffffffffffffffff");
    assert_eq!(
        stream(&config, &data, 1),
        Err(SequenceError {
            decoded: Vec::new(),
            error: Error::new(ErrorKind::TooManyItems(u64::MAX), 0)
        })
    );
    assert_agrees(&config, &data);
}
