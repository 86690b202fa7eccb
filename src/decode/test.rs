#![cfg(test)]
//! End-to-end decoding tests on hand-assembled data.

use crate::{Ber, Der, Tag, Value};
use crate::decode::{DecodeError, Decoder, ErrorKind};
use crate::value::Content;

fn ber(data: &[u8]) -> Result<Value, DecodeError> {
    Value::decode::<Ber, _>(data)
}

fn der(data: &[u8]) -> Result<Value, DecodeError> {
    Value::decode::<Der, _>(data)
}

fn kind(res: Result<Value, DecodeError>) -> ErrorKind {
    res.unwrap_err().kind()
}

fn assert_integer(value: &Value, expected: i64) {
    match value {
        Value::Integer(n) => assert!(*n == expected),
        _ => panic!("not an INTEGER: {:?}", value),
    }
}

#[test]
fn primitive_values() {
    assert_integer(&ber(b"\x02\x01\x05").unwrap(), 5);
    assert_eq!(ber(b"\x01\x01\xff").unwrap(), Value::Boolean(true));
    assert_eq!(ber(b"\x01\x01\x00").unwrap(), Value::Boolean(false));
    assert_eq!(ber(b"\x05\x00").unwrap(), Value::Null);
    match ber(b"\x06\x03\x2a\x03\x04").unwrap() {
        Value::Oid(oid) => assert_eq!(oid.to_string(), "1.2.3.4"),
        other => panic!("not an OBJECT IDENTIFIER: {:?}", other),
    }
    match ber(b"\x04\x02\xab\xcd").unwrap() {
        Value::OctetString(octets) => {
            assert_eq!(octets.as_ref(), b"\xab\xcd")
        }
        other => panic!("not an OCTET STRING: {:?}", other),
    }
    assert_eq!(
        ber(b"\x0c\x02\x68\x69").unwrap(),
        Value::Utf8String("hi".into())
    );
    match ber(b"\x0a\x01\x02").unwrap() {
        Value::Enumerated(n) => assert!(n == 2),
        other => panic!("not an ENUMERATED: {:?}", other),
    }
}

#[test]
fn positions() {
    let data = b"\x30\x03\x02\x01\x05\x05\x00";
    let mut decoder = Decoder::<Ber, _>::new(&data[..]);
    assert_eq!(decoder.pos().to_u64(), 0);
    decoder.next_object().unwrap().unwrap().skip().unwrap();
    assert_eq!(decoder.pos().to_u64(), 5);
    let obj = decoder.next_object().unwrap().unwrap();
    assert_eq!(obj.start().to_u64(), 5);
    obj.into_value().unwrap();
    assert_eq!(decoder.pos().to_u64(), 7);
    decoder.check_exhausted().unwrap();
}

#[test]
fn malformed_primitive_values() {
    // BOOLEAN with the wrong number of content octets.
    assert_eq!(kind(ber(b"\x01\x00")), ErrorKind::InvalidEncoding);
    assert_eq!(kind(ber(b"\x01\x02\x00\x00")), ErrorKind::InvalidEncoding);
    // NULL with content.
    assert_eq!(kind(ber(b"\x05\x01\x00")), ErrorKind::InvalidEncoding);
    // INTEGER with empty or non-minimal content.
    assert_eq!(kind(ber(b"\x02\x00")), ErrorKind::InvalidEncoding);
    assert_eq!(kind(ber(b"\x02\x02\x00\x05")), ErrorKind::InvalidEncoding);
    // UTF8String that is not UTF-8.
    assert_eq!(kind(ber(b"\x0c\x01\xff")), ErrorKind::InvalidEncoding);
}

#[test]
fn sequences() {
    match ber(b"\x30\x06\x02\x01\x01\x02\x01\x02").unwrap() {
        Value::Sequence(items) => {
            assert_eq!(items.len(), 2);
            assert_integer(&items[0], 1);
            assert_integer(&items[1], 2);
        }
        other => panic!("not a SEQUENCE: {:?}", other),
    }
    assert_eq!(ber(b"\x30\x00").unwrap(), Value::Sequence(Vec::new()));
    match ber(b"\x31\x03\x02\x01\x07").unwrap() {
        Value::Set(items) => assert_integer(&items[0], 7),
        other => panic!("not a SET: {:?}", other),
    }
}

#[test]
fn indefinite_length() {
    match ber(b"\x30\x80\x02\x01\x05\x00\x00").unwrap() {
        Value::Sequence(items) => {
            assert_eq!(items.len(), 1);
            assert_integer(&items[0], 5);
        }
        other => panic!("not a SEQUENCE: {:?}", other),
    }
    assert_eq!(
        kind(der(b"\x30\x80\x02\x01\x05\x00\x00")),
        ErrorKind::IndefiniteInDer
    );
    // Constructed OCTET STRING with indefinite length.
    match ber(b"\x24\x80\x04\x01\xab\x04\x01\xcd\x00\x00").unwrap() {
        Value::OctetString(octets) => {
            assert_eq!(octets.as_ref(), b"\xab\xcd")
        }
        other => panic!("not an OCTET STRING: {:?}", other),
    }
    // Indefinite length on a primitive value.
    assert_eq!(
        kind(ber(b"\x04\x80\x00\x00")),
        ErrorKind::IndefiniteOnPrimitive
    );
}

#[test]
fn end_of_contents_placement() {
    // Inside a definite length value.
    assert_eq!(kind(ber(b"\x30\x02\x00\x00")), ErrorKind::InvalidEncoding);
    // At the top level.
    assert_eq!(kind(ber(b"\x00\x00")), ErrorKind::InvalidEncoding);
    // With content octets of its own.
    assert_eq!(
        kind(ber(b"\x30\x80\x00\x01\x00")),
        ErrorKind::InvalidEncoding
    );
}

#[test]
fn unterminated_indefinite_in_definite() {
    // The parent's definite length runs out before the nested
    // indefinite length value is terminated.
    assert_eq!(kind(ber(b"\x30\x02\x30\x80")), ErrorKind::UnexpectedEnd);
    assert_eq!(
        kind(ber(b"\x30\x04\x30\x80\x05\x00")),
        ErrorKind::UnexpectedEnd
    );

    // Skipping catches the same violation.
    let data = b"\x30\x02\x30\x80";
    let mut decoder = Decoder::<Ber, _>::new(&data[..]);
    let obj = decoder.next_object().unwrap().unwrap();
    assert_eq!(obj.skip().unwrap_err().kind(), ErrorKind::UnexpectedEnd);
}

#[test]
fn length_violations() {
    assert_eq!(kind(ber(b"\x04\xff")), ErrorKind::ReservedLength);
    // Nested value longer than its parent.
    assert_eq!(kind(ber(b"\x30\x03\x02\x05\x00")), ErrorKind::LengthOverflow);
    // Top level value longer than the data.
    assert_eq!(kind(ber(b"\x02\x05\x00")), ErrorKind::UnexpectedEnd);
}

#[test]
fn truncation_sweep() {
    let full = b"\x30\x80\xa0\x03\x02\x01\x05\x00\x00";
    assert!(ber(full).is_ok());
    for len in 0..full.len() {
        assert!(
            ber(&full[..len]).is_err(),
            "prefix of length {} decoded", len
        );
    }
}

#[test]
fn explicit_tagging() {
    let data = b"\xa0\x03\x02\x01\x05";
    let mut decoder = Decoder::<Ber, _>::new(&data[..]);
    let value = {
        let mut tagged = decoder
            .next_object().unwrap().unwrap()
            .into_tagged().unwrap();
        assert_eq!(tagged.tag(), Tag::ctx(0));
        assert!(tagged.is_constructed());
        tagged.explicit().unwrap().into_value().unwrap()
    };
    decoder.check_exhausted().unwrap();
    assert_integer(&value, 5);
}

#[test]
fn explicit_requires_constructed() {
    let data = b"\x80\x01\x05";
    let mut decoder = Decoder::<Ber, _>::new(&data[..]);
    let mut tagged = decoder
        .next_object().unwrap().unwrap()
        .into_tagged().unwrap();
    assert!(!tagged.is_constructed());
    assert_eq!(
        tagged.explicit().unwrap_err().kind(),
        ErrorKind::ExplicitNotConstructed
    );
}

#[test]
fn explicit_requires_content() {
    let data = b"\xa0\x00";
    let mut decoder = Decoder::<Ber, _>::new(&data[..]);
    let mut tagged = decoder
        .next_object().unwrap().unwrap()
        .into_tagged().unwrap();
    assert_eq!(
        tagged.explicit().unwrap_err().kind(),
        ErrorKind::InvalidEncoding
    );
}

#[test]
fn explicit_with_trailing_value() {
    let data = b"\xa0\x06\x02\x01\x01\x02\x01\x02";
    let mut decoder = Decoder::<Ber, _>::new(&data[..]);
    {
        let mut tagged = decoder
            .next_object().unwrap().unwrap()
            .into_tagged().unwrap();
        let value = tagged.explicit().unwrap().into_value().unwrap();
        assert_integer(&value, 1);
        // Dropping the handle with the second inner value unread
        // poisons the decoder.
    }
    assert!(decoder.next_object().is_err());
}

#[test]
fn implicit_tagging() {
    let data = b"\xa0\x03\x02\x01\x05";

    // The wire is constructed, so resolving to a type that must be
    // primitive fails when the content is interpreted.
    let mut decoder = Decoder::<Ber, _>::new(&data[..]);
    let tagged = decoder
        .next_object().unwrap().unwrap()
        .into_tagged().unwrap();
    assert_eq!(
        tagged.implicit(Tag::INTEGER).into_value().unwrap_err().kind(),
        ErrorKind::InvalidEncoding
    );

    // Resolving to a constructed type works.
    let mut decoder = Decoder::<Ber, _>::new(&data[..]);
    let tagged = decoder
        .next_object().unwrap().unwrap()
        .into_tagged().unwrap();
    match tagged.implicit(Tag::SEQUENCE).into_value().unwrap() {
        Value::Sequence(items) => {
            assert_eq!(items.len(), 1);
            assert_integer(&items[0], 5);
        }
        other => panic!("not a SEQUENCE: {:?}", other),
    }
    decoder.check_exhausted().unwrap();

    // A primitive wire value resolves to a primitive type.
    let data = b"\x80\x01\x05";
    let mut decoder = Decoder::<Ber, _>::new(&data[..]);
    let tagged = decoder
        .next_object().unwrap().unwrap()
        .into_tagged().unwrap();
    let value = tagged.implicit(Tag::INTEGER).into_value().unwrap();
    assert_integer(&value, 5);
    decoder.check_exhausted().unwrap();
}

#[test]
fn unresolved_tagged_value() {
    match ber(b"\xa0\x03\x02\x01\x05").unwrap() {
        Value::Tagged(tagged) => {
            assert_eq!(tagged.tag(), Tag::ctx(0));
            assert!(tagged.is_constructed());
            match tagged.content() {
                Content::Constructed(items) => {
                    assert_integer(&items[0], 5)
                }
                other => panic!("not constructed: {:?}", other),
            }
        }
        other => panic!("not a tagged value: {:?}", other),
    }
    match ber(b"\x80\x01\x05").unwrap() {
        Value::Tagged(tagged) => {
            assert!(!tagged.is_constructed());
            assert_eq!(
                tagged.content(),
                &Content::Primitive(b"\x05".as_ref().into())
            );
        }
        other => panic!("not a tagged value: {:?}", other),
    }
}

#[test]
fn high_tag_numbers() {
    match ber(b"\xbf\x87\x68\x03\x02\x01\x05").unwrap() {
        Value::Tagged(tagged) => {
            assert_eq!(tagged.tag(), Tag::ctx(1000));
            assert!(tagged.is_constructed());
        }
        other => panic!("not a tagged value: {:?}", other),
    }
}

#[test]
fn uninterpreted_universal() {
    // UTCTime is handed through with its raw content.
    match ber(b"\x17\x03\x61\x62\x63").unwrap() {
        Value::Other(other) => {
            assert_eq!(other.tag(), Tag::UTC_TIME);
            assert_eq!(
                other.content(),
                &Content::Primitive(b"abc".as_ref().into())
            );
        }
        other => panic!("not an uninterpreted value: {:?}", other),
    }
}

#[test]
fn bit_strings() {
    match ber(b"\x03\x04\x06\x6e\x5d\xc0").unwrap() {
        Value::BitString(bits) => {
            assert_eq!(bits.unused(), 6);
            assert_eq!(bits.bit_len(), 18);
            assert_eq!(bits.as_slice(), b"\x6e\x5d\xc0");
        }
        other => panic!("not a BIT STRING: {:?}", other),
    }
    assert_eq!(kind(ber(b"\x03\x00")), ErrorKind::InvalidEncoding);
    assert_eq!(kind(ber(b"\x03\x01\x03")), ErrorKind::InvalidEncoding);
    match ber(b"\x03\x01\x00").unwrap() {
        Value::BitString(bits) => assert_eq!(bits.bit_len(), 0),
        other => panic!("not a BIT STRING: {:?}", other),
    }

    // Segmented BIT STRING: only the last segment may have unused bits.
    match ber(
        b"\x23\x80\x03\x02\x00\xab\x03\x02\x04\xb0\x00\x00"
    ).unwrap() {
        Value::BitString(bits) => {
            assert_eq!(bits.unused(), 4);
            assert_eq!(bits.as_slice(), b"\xab\xb0");
        }
        other => panic!("not a BIT STRING: {:?}", other),
    }
    assert_eq!(
        kind(ber(b"\x23\x80\x03\x02\x04\xb0\x03\x02\x00\xab\x00\x00")),
        ErrorKind::InvalidEncoding
    );
}

#[test]
fn der_content_restrictions() {
    // BOOLEAN true must be 0xFF.
    assert_eq!(ber(b"\x01\x01\x01").unwrap(), Value::Boolean(true));
    assert_eq!(kind(der(b"\x01\x01\x01")), ErrorKind::InvalidEncoding);
    assert_eq!(der(b"\x01\x01\xff").unwrap(), Value::Boolean(true));

    // No string segmentation, not even with definite lengths.
    match ber(b"\x24\x04\x04\x02\xab\xcd").unwrap() {
        Value::OctetString(octets) => {
            assert_eq!(octets.as_ref(), b"\xab\xcd")
        }
        other => panic!("not an OCTET STRING: {:?}", other),
    }
    assert_eq!(
        kind(der(b"\x24\x04\x04\x02\xab\xcd")),
        ErrorKind::InvalidEncoding
    );

    // Unused BIT STRING bits must be zero.
    match ber(b"\x03\x02\x04\xb1").unwrap() {
        Value::BitString(bits) => assert_eq!(bits.unused(), 4),
        other => panic!("not a BIT STRING: {:?}", other),
    }
    assert_eq!(kind(der(b"\x03\x02\x04\xb1")), ErrorKind::InvalidEncoding);
}

#[test]
fn skipping() {
    let data = b"\x30\x06\x02\x01\x01\x02\x01\x02\x02\x01\x03";
    let mut decoder = Decoder::<Ber, _>::new(&data[..]);
    decoder.next_object().unwrap().unwrap().skip().unwrap();
    let value = decoder
        .next_object().unwrap().unwrap()
        .into_value().unwrap();
    assert_integer(&value, 3);
    decoder.check_exhausted().unwrap();

    // Nested indefinite length values.
    let data = b"\x30\x80\x30\x80\x02\x01\x05\x00\x00\x00\x00";
    let mut decoder = Decoder::<Ber, _>::new(&data[..]);
    decoder.next_object().unwrap().unwrap().skip().unwrap();
    decoder.check_exhausted().unwrap();

    // Skipping still checks the framing.
    let data = b"\x30\x03\x02\x05\x00";
    let mut decoder = Decoder::<Ber, _>::new(&data[..]);
    let obj = decoder.next_object().unwrap().unwrap();
    assert_eq!(obj.skip().unwrap_err().kind(), ErrorKind::LengthOverflow);
}

#[test]
fn partial_consumption_poisons() {
    // A primitive value dropped with unread content.
    let data = b"\x04\x02\xab\xcd";
    let mut decoder = Decoder::<Ber, _>::new(&data[..]);
    {
        let mut prim = decoder
            .next_object().unwrap().unwrap()
            .into_primitive().unwrap();
        prim.read_u8().unwrap();
    }
    assert!(decoder.check_exhausted().is_err());

    // A constructed value dropped with an unread child.
    let data = b"\x30\x03\x02\x01\x05";
    let mut decoder = Decoder::<Ber, _>::new(&data[..]);
    {
        decoder.next_object().unwrap().unwrap();
    }
    assert!(decoder.next_object().is_err());
}

#[test]
fn empty_input() {
    assert_eq!(kind(ber(b"")), ErrorKind::UnexpectedEnd);
    assert_eq!(kind(der(b"")), ErrorKind::UnexpectedEnd);
}

#[test]
fn foreign_string_segment() {
    // A BIT STRING segment inside a constructed OCTET STRING.
    assert_eq!(
        kind(ber(b"\x24\x80\x03\x02\x00\xab\x00\x00")),
        ErrorKind::InvalidEncoding
    );
}

#[test]
fn trailing_data() {
    let data = b"\x05\x00\x05\x00";
    let mut decoder = Decoder::<Ber, _>::new(&data[..]);
    decoder.next_object().unwrap().unwrap().into_value().unwrap();
    assert!(decoder.check_exhausted().is_err());
}

#[test]
fn nesting_limit() {
    // 70 nested SEQUENCEs with indefinite length around a NULL.
    let mut data = Vec::new();
    for _ in 0..70 {
        data.extend_from_slice(b"\x30\x80");
    }
    data.extend_from_slice(b"\x05\x00");
    for _ in 0..70 {
        data.extend_from_slice(b"\x00\x00");
    }
    assert_eq!(kind(ber(&data)), ErrorKind::InvalidEncoding);

    let mut decoder = Decoder::<Ber, _>::new(&data[..]);
    let obj = decoder.next_object().unwrap().unwrap();
    assert_eq!(
        obj.skip().unwrap_err().kind(), ErrorKind::InvalidEncoding
    );
}
