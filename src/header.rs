//! The identifier octets of a BER encoded value.
//!
//! Every encoded value starts with its identifier octets carrying three
//! pieces of information: the class and number of the tag identifying the
//! value's type, and whether the value is primitive or constructed. The
//! [`Header`] type represents all three, [`Tag`] and [`Class`] just the
//! type identity.

use std::{fmt, io};
use crate::decode::{read_u8, DecodeError, ErrorKind, Pos};


//------------ Class ---------------------------------------------------------

/// The class of a tag.
///
/// Only tags of the universal class have a meaning independent of context.
/// All other classes are interpreted according to the schema the caller is
/// processing.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Class {
    Universal,
    Application,
    Context,
    Private,
}

impl Class {
    /// Returns the class encoded in the first identifier octet.
    const fn from_octet(octet: u8) -> Self {
        match octet >> 6 {
            0 => Self::Universal,
            1 => Self::Application,
            2 => Self::Context,
            _ => Self::Private,
        }
    }
}


//------------ Tag -----------------------------------------------------------

/// The tag of a value.
///
/// In ASN.1, tags identify the type of a value. A tag consists of one of
/// four classes, represented by the [`Class`] enum, and a number within
/// this class.
///
/// # Limitations
///
/// Only tag numbers that fit into a `u32` are supported. This should be
/// more than enough in practice.
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Tag {
    class: Class,
    number: u32,
}

impl Tag {
    /// Creates a tag from a class and number.
    pub const fn new(class: Class, number: u32) -> Self {
        Self { class, number }
    }

    /// Creates a tag of the context-specific class with the given number.
    pub const fn ctx(number: u32) -> Self {
        Self::new(Class::Context, number)
    }

    /// Creates a tag of the application class with the given number.
    pub const fn application(number: u32) -> Self {
        Self::new(Class::Application, number)
    }

    /// Creates a tag of the private class with the given number.
    pub const fn private(number: u32) -> Self {
        Self::new(Class::Private, number)
    }

    /// Returns the class of the tag.
    pub const fn class(self) -> Class {
        self.class
    }

    /// Returns the number of the tag.
    pub const fn number(self) -> u32 {
        self.number
    }

    /// Returns whether the tag is of the universal class.
    pub const fn is_universal(self) -> bool {
        matches!(self.class, Class::Universal)
    }
}

/// # Constants for universal tags.
///
/// See clause 8.4 of ITU Recommendation X.690.
///
impl Tag {
    /// The tag for the BOOLEAN type, UNIVERSAL 1.
    pub const BOOLEAN: Self = Self::new(Class::Universal, 1);

    /// The tag for the INTEGER type, UNIVERSAL 2.
    pub const INTEGER: Self = Self::new(Class::Universal, 2);

    /// The tag for the BIT STRING type, UNIVERSAL 3.
    pub const BIT_STRING: Self = Self::new(Class::Universal, 3);

    /// The tag for the OCTET STRING type, UNIVERSAL 4.
    pub const OCTET_STRING: Self = Self::new(Class::Universal, 4);

    /// The tag for the NULL type, UNIVERSAL 5.
    pub const NULL: Self = Self::new(Class::Universal, 5);

    /// The tag for the OBJECT IDENTIFIER type, UNIVERSAL 6.
    pub const OID: Self = Self::new(Class::Universal, 6);

    /// The tag for the ObjectDescriptor type, UNIVERSAL 7.
    pub const OBJECT_DESCRIPTOR: Self = Self::new(Class::Universal, 7);

    /// The tag for the EXTERNAL and Instance-of types, UNIVERSAL 8.
    pub const EXTERNAL: Self = Self::new(Class::Universal, 8);

    /// The tag for the REAL type, UNIVERSAL 9.
    pub const REAL: Self = Self::new(Class::Universal, 9);

    /// The tag for the ENUMERATED type, UNIVERSAL 10.
    pub const ENUMERATED: Self = Self::new(Class::Universal, 10);

    /// The tag for the UTF8String type, UNIVERSAL 12.
    pub const UTF8_STRING: Self = Self::new(Class::Universal, 12);

    /// The tag for the RELATIVE-OID type, UNIVERSAL 13.
    pub const RELATIVE_OID: Self = Self::new(Class::Universal, 13);

    /// The tag for the SEQUENCE and SEQUENCE OF types, UNIVERSAL 16.
    pub const SEQUENCE: Self = Self::new(Class::Universal, 16);

    /// The tag for the SET and SET OF types, UNIVERSAL 17.
    pub const SET: Self = Self::new(Class::Universal, 17);

    /// The tag for the NumericString type, UNIVERSAL 18.
    pub const NUMERIC_STRING: Self = Self::new(Class::Universal, 18);

    /// The tag for the PrintableString type, UNIVERSAL 19.
    pub const PRINTABLE_STRING: Self = Self::new(Class::Universal, 19);

    /// The tag for the TeletexString type, UNIVERSAL 20.
    pub const TELETEX_STRING: Self = Self::new(Class::Universal, 20);

    /// The tag for the IA5String type, UNIVERSAL 22.
    pub const IA5_STRING: Self = Self::new(Class::Universal, 22);

    /// The tag for the UTCTime type, UNIVERSAL 23.
    pub const UTC_TIME: Self = Self::new(Class::Universal, 23);

    /// The tag for the GeneralizedTime type, UNIVERSAL 24.
    pub const GENERALIZED_TIME: Self = Self::new(Class::Universal, 24);

    /// The tag for the VisibleString type, UNIVERSAL 26.
    pub const VISIBLE_STRING: Self = Self::new(Class::Universal, 26);

    /// The tag for the GeneralString type, UNIVERSAL 27.
    pub const GENERAL_STRING: Self = Self::new(Class::Universal, 27);

    /// The tag for the UniversalString type, UNIVERSAL 28.
    pub const UNIVERSAL_STRING: Self = Self::new(Class::Universal, 28);

    /// The tag for the BMPString type, UNIVERSAL 30.
    pub const BMP_STRING: Self = Self::new(Class::Universal, 30);
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Tag::BOOLEAN => write!(f, "BOOLEAN"),
            Tag::INTEGER => write!(f, "INTEGER"),
            Tag::BIT_STRING => write!(f, "BIT STRING"),
            Tag::OCTET_STRING => write!(f, "OCTET STRING"),
            Tag::NULL => write!(f, "NULL"),
            Tag::OID => write!(f, "OBJECT IDENTIFIER"),
            Tag::OBJECT_DESCRIPTOR => write!(f, "ObjectDescriptor"),
            Tag::EXTERNAL => write!(f, "EXTERNAL"),
            Tag::REAL => write!(f, "REAL"),
            Tag::ENUMERATED => write!(f, "ENUMERATED"),
            Tag::UTF8_STRING => write!(f, "UTF8String"),
            Tag::RELATIVE_OID => write!(f, "RELATIVE-OID"),
            Tag::SEQUENCE => write!(f, "SEQUENCE"),
            Tag::SET => write!(f, "SET"),
            Tag::NUMERIC_STRING => write!(f, "NumericString"),
            Tag::PRINTABLE_STRING => write!(f, "PrintableString"),
            Tag::TELETEX_STRING => write!(f, "TeletexString"),
            Tag::IA5_STRING => write!(f, "IA5String"),
            Tag::UTC_TIME => write!(f, "UTCTime"),
            Tag::GENERALIZED_TIME => write!(f, "GeneralizedTime"),
            Tag::VISIBLE_STRING => write!(f, "VisibleString"),
            Tag::GENERAL_STRING => write!(f, "GeneralString"),
            Tag::UNIVERSAL_STRING => write!(f, "UniversalString"),
            Tag::BMP_STRING => write!(f, "BMPString"),
            tag => {
                match tag.class {
                    Class::Universal => write!(f, "[UNIVERSAL ")?,
                    Class::Application => write!(f, "[APPLICATION ")?,
                    Class::Context => write!(f, "[")?,
                    Class::Private => write!(f, "[PRIVATE ")?,
                }
                write!(f, "{}]", tag.number)
            }
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag({})", self)
    }
}


//------------ Header --------------------------------------------------------

/// The decoded identifier octets of a value.
///
/// Apart from the tag, the identifier octets state whether the value is
/// primitive, i.e., its content are the octets of an actual value, or
/// constructed, i.e., its content is a sequence of further encoded values.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Header {
    tag: Tag,
    constructed: bool,
}

/// The largest number of continuation octets accepted in a tag number.
///
/// Five septets are enough for any number that fits into a `u32`.
const MAX_NUMBER_OCTETS: usize = 5;

impl Header {
    /// The header marking the end of an indefinite length value.
    pub const END_OF_CONTENTS: Self = Self::new(
        Tag::new(Class::Universal, 0), false
    );

    /// Creates a new header from a tag and the constructed flag.
    pub const fn new(tag: Tag, constructed: bool) -> Self {
        Self { tag, constructed }
    }

    /// Returns the tag of the value.
    pub const fn tag(self) -> Tag {
        self.tag
    }

    /// Returns whether the value is constructed.
    pub const fn is_constructed(self) -> bool {
        self.constructed
    }

    /// Reads the identifier octets from a reader.
    ///
    /// Returns `Ok(None)` if the reader ends cleanly before the first
    /// octet. A reader ending in the middle of the identifier octets is an
    /// error. The position `start` is only used for reporting errors.
    pub fn read_opt(
        reader: &mut impl io::Read, start: Pos
    ) -> Result<Option<Self>, DecodeError> {
        let first = match read_u8(reader) {
            Ok(octet) => octet,
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                return Ok(None)
            }
            Err(err) => return Err(DecodeError::io(err, start)),
        };

        let class = Class::from_octet(first);
        let constructed = first & 0x20 != 0;

        // Low tag number form: the number lives in the lower five bits.
        if first & 0x1f != 0x1f {
            return Ok(Some(Self::new(
                Tag::new(class, (first & 0x1f) as u32), constructed
            )))
        }

        // High tag number form: base 128, big endian, bit 8 of each octet
        // set except for the last one.
        let mut number = 0u32;
        for i in 0..MAX_NUMBER_OCTETS {
            let octet = Self::read_number_octet(reader, start)?;
            if i == 0 && octet == 0x80 {
                return Err(DecodeError::with_detail(
                    ErrorKind::MalformedHeader,
                    "padded tag number", start
                ))
            }
            number = match number.checked_mul(0x80) {
                Some(number) => number | (octet & 0x7f) as u32,
                None => {
                    return Err(DecodeError::with_detail(
                        ErrorKind::MalformedHeader,
                        "tag number too large", start
                    ))
                }
            };
            if octet & 0x80 == 0 {
                return Ok(Some(Self::new(
                    Tag::new(class, number), constructed
                )))
            }
        }
        Err(DecodeError::with_detail(
            ErrorKind::MalformedHeader, "tag number too large", start
        ))
    }

    /// Reads the identifier octets, requiring them to be present.
    pub fn read(
        reader: &mut impl io::Read, start: Pos
    ) -> Result<Self, DecodeError> {
        match Self::read_opt(reader, start)? {
            Some(header) => Ok(header),
            None => Err(DecodeError::new(ErrorKind::UnexpectedEnd, start)),
        }
    }

    /// Reads a single octet of a multi-octet tag number.
    fn read_number_octet(
        reader: &mut impl io::Read, start: Pos
    ) -> Result<u8, DecodeError> {
        read_u8(reader).map_err(|err| {
            if err.kind() == io::ErrorKind::UnexpectedEof {
                DecodeError::with_detail(
                    ErrorKind::MalformedHeader,
                    "truncated identifier octets", start
                )
            }
            else {
                DecodeError::io(err, start)
            }
        })
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    fn read(mut data: &[u8]) -> Result<Option<Header>, DecodeError> {
        Header::read_opt(&mut data, Pos::default())
    }

    #[test]
    fn low_tag_numbers() {
        assert_eq!(
            read(b"\x02").unwrap().unwrap(),
            Header::new(Tag::INTEGER, false)
        );
        assert_eq!(
            read(b"\x30").unwrap().unwrap(),
            Header::new(Tag::SEQUENCE, true)
        );
        assert_eq!(
            read(b"\xa3").unwrap().unwrap(),
            Header::new(Tag::ctx(3), true)
        );
        assert_eq!(
            read(b"\x41").unwrap().unwrap(),
            Header::new(Tag::application(1), false)
        );
        assert_eq!(
            read(b"\xc0").unwrap().unwrap(),
            Header::new(Tag::private(0), false)
        );
        assert_eq!(
            read(b"\x00").unwrap().unwrap(),
            Header::END_OF_CONTENTS
        );
    }

    #[test]
    fn high_tag_numbers() {
        assert_eq!(
            read(b"\x1f\x1f").unwrap().unwrap(),
            Header::new(Tag::new(Class::Universal, 31), false)
        );
        assert_eq!(
            read(b"\xbf\x87\x68").unwrap().unwrap(),
            Header::new(Tag::ctx(1000), true)
        );
        assert_eq!(
            read(b"\x1f\x8f\xff\xff\xff\x7f").unwrap().unwrap(),
            Header::new(Tag::new(Class::Universal, u32::MAX), false)
        );
    }

    #[test]
    fn malformed_tag_numbers() {
        // Padded first continuation octet.
        assert_eq!(
            read(b"\x1f\x80\x01").unwrap_err().kind(),
            ErrorKind::MalformedHeader
        );
        // Number does not fit into a u32.
        assert_eq!(
            read(b"\x1f\x9f\xff\xff\xff\x7f").unwrap_err().kind(),
            ErrorKind::MalformedHeader
        );
        // Continuation that never terminates.
        assert_eq!(
            read(b"\x1f\xff\xff\xff\xff\xff\xff").unwrap_err().kind(),
            ErrorKind::MalformedHeader
        );
        // Truncated in the middle of the number.
        assert_eq!(
            read(b"\x1f\xff").unwrap_err().kind(),
            ErrorKind::MalformedHeader
        );
    }

    #[test]
    fn end_of_data() {
        assert!(read(b"").unwrap().is_none());
    }
}
