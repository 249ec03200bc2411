use super::*;
use alloc::{string::ToString, vec};
use hex_literal::hex;

fn diag(data: &[u8]) -> String {
    decode(data).unwrap().0.to_string()
}

#[test]
fn integer_accessors() {
    let n = Item::from(-500);
    assert_eq!(n, Item::Negative(499));
    assert_eq!(n.as_i64(), Some(-500));
    assert_eq!(n.as_i128(), Some(-500));
    assert_eq!(n.as_int::<i16>(), Some(-500));
    assert_eq!(n.as_int::<i8>(), None);
    assert_eq!(n.as_int::<u32>(), None);
    assert_eq!(n.as_u64(), None);

    let wide = Item::Negative(u64::MAX);
    assert_eq!(wide.as_i64(), None);
    assert_eq!(wide.as_i128(), Some(-18446744073709551616));

    let big = Item::Unsigned(u64::MAX);
    assert_eq!(big.as_u64(), Some(u64::MAX));
    assert_eq!(big.as_i64(), None);
    assert_eq!(big.as_int::<u8>(), None);
    assert_eq!(Item::from(200u8).as_int::<u8>(), Some(200));
}

#[test]
fn other_accessors() {
    let (item, _) = decode(&hex!("a3616101616282f5f66163c1fa3fc00000")).unwrap();
    assert_eq!(item.major_type(), Major::Map);
    assert_eq!(item.map_get(&Item::from("a")), Some(&Item::from(1)));
    assert_eq!(item.map_get(&Item::from("z")), None);

    let b = item.map_get(&Item::from("b")).unwrap().as_array().unwrap();
    assert_eq!(b[0].as_bool(), Some(true));
    assert!(b[1].is_null());
    assert!(!b[1].is_undefined());

    let (tag, inner) = item.map_get(&Item::from("c")).unwrap().as_tagged().unwrap();
    assert_eq!(tag, 1);
    assert_eq!(inner.as_f64(), Some(1.5));
    assert_eq!(inner.major_type(), Major::Simple);

    assert_eq!(Item::from("x").as_text(), Some("x"));
    assert_eq!(Item::from(vec![1u8, 2]).as_bytes(), Some(&[1u8, 2][..]));
    assert_eq!(Item::from("x").as_bytes(), None);
    assert_eq!(Item::Null.as_map(), None);
}

#[test]
fn float_width() {
    assert_eq!(Float::Half(half::f16::ONE).width(), 2);
    assert_eq!(Float::Single(1.0).width(), 4);
    assert_eq!(Float::Double(1.0).width(), 8);
    assert_eq!(Float::Single(0.5).to_f64(), 0.5);
}

#[test]
fn diagnostic_notation() {
    assert_eq!(diag(&hex!("1bffffffffffffffff")), "18446744073709551615");
    assert_eq!(diag(&hex!("3bffffffffffffffff")), "-18446744073709551616");
    assert_eq!(diag(&hex!("3903e7")), "-1000");
    assert_eq!(diag(&hex!("4401020304")), "h'01020304'");
    assert_eq!(diag(&hex!("62225c")), r#""\"\\""#);
    assert_eq!(diag(&hex!("62c3bc")), "\"\u{00fc}\"");
    assert_eq!(diag(&hex!("8301820203820405")), "[1, [2, 3], [4, 5]]");
    assert_eq!(
        diag(&hex!("a26161016162820203")),
        r#"{"a": 1, "b": [2, 3]}"#
    );
    assert_eq!(
        diag(&hex!("c074323031332d30332d32315432303a30343a30305a")),
        r#"0("2013-03-21T20:04:00Z")"#
    );
    assert_eq!(diag(&hex!("f4")), "false");
    assert_eq!(diag(&hex!("f6")), "null");
    assert_eq!(diag(&hex!("f7")), "undefined");
    assert_eq!(diag(&hex!("f0")), "simple(16)");
    assert_eq!(diag(&hex!("f93e00")), "1.5");
    assert_eq!(diag(&hex!("fb3ff199999999999a")), "1.1");
    assert_eq!(diag(&hex!("fa47c35000")), "100000.0");
    assert_eq!(diag(&hex!("f97c00")), "Infinity");
    assert_eq!(diag(&hex!("f9fc00")), "-Infinity");
    assert_eq!(diag(&hex!("f97e00")), "NaN");
    assert_eq!(diag(&hex!("6161")), "\"a\"");
    assert_eq!(Item::from("a\nb").to_string(), r#""a\nb""#);
}
