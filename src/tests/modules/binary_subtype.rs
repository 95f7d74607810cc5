use std::convert::TryFrom;

use crate::{spec::BinarySubtype, tests::LOCK, Binary};

#[test]
fn subtype_byte_mapping() {
    let _guard = LOCK.run_concurrently();

    let cases = [
        (0x00, BinarySubtype::Generic),
        (0x01, BinarySubtype::Function),
        (0x02, BinarySubtype::BinaryOld),
        (0x03, BinarySubtype::UuidOld),
        (0x04, BinarySubtype::Uuid),
        (0x05, BinarySubtype::Md5),
        (0x06, BinarySubtype::Encrypted),
        (0x07, BinarySubtype::Column),
        (0x80, BinarySubtype::UserDefined(0x80)),
        (0xFF, BinarySubtype::UserDefined(0xFF)),
    ];

    for (byte, subtype) in cases {
        assert_eq!(BinarySubtype::try_from(byte).unwrap(), subtype);
        assert_eq!(u8::from(subtype), byte);
    }
}

#[test]
fn reserved_range_rejected() {
    let _guard = LOCK.run_concurrently();

    for byte in 0x08..=0x7Fu8 {
        let err = BinarySubtype::try_from(byte).unwrap_err();
        assert!(err.is_invalid_argument(), "subtype {:#04x}", byte);
    }
}

#[test]
fn uuid_length_validation() {
    let _guard = LOCK.run_concurrently();

    assert!(Binary::new(0x04, vec![0u8; 16]).is_ok());
    assert!(Binary::new(0x04, vec![0u8; 15]).unwrap_err().is_invalid_argument());
    assert!(Binary::new(0x04, vec![0u8; 17]).unwrap_err().is_invalid_argument());

    // the deprecated UUID subtype is not length checked
    assert!(Binary::new(0x03, vec![0u8; 4]).is_ok());
}

#[test]
fn from_base64() {
    let _guard = LOCK.run_concurrently();

    let binary = Binary::from_base64("aGVsbG8=", None).unwrap();
    assert_eq!(binary.subtype, BinarySubtype::Generic);
    assert_eq!(binary.bytes, b"hello");

    let binary = Binary::from_base64("aGVsbG8=", BinarySubtype::UserDefined(0x81)).unwrap();
    assert_eq!(binary.subtype, BinarySubtype::UserDefined(0x81));

    assert!(Binary::from_base64("not base64!!", None)
        .unwrap_err()
        .is_invalid_argument());
}
