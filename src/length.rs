//! The length octets of a BER encoded value.
//!
//! This is a private module. Its public items are re-exported by the
//! crate root.

use std::{fmt, io};
use crate::decode::{read_u8, DecodeError, ErrorKind, Pos};
use crate::mode::Mode;


//------------ Length --------------------------------------------------------

/// The length of a value.
///
/// In the long and short definite forms, the length octets state the exact
/// number of content octets. In the indefinite form, only allowed for
/// constructed values under BER, the content instead runs until a special
/// end-of-contents marker.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Length {
    /// The value has the given number of content octets.
    Definite(usize),

    /// The content continues until an end-of-contents marker.
    Indefinite,
}

impl Length {
    /// Reads the length octets from a reader.
    ///
    /// The type parameter `M` selects the encoding rules. The position
    /// `start` is only used for reporting errors.
    pub fn read<M: Mode>(
        reader: &mut impl io::Read, start: Pos
    ) -> Result<Self, DecodeError> {
        let first = Self::read_octet(reader, start)?;

        // Short form: bit 8 clear, the lower seven bits are the length.
        if first & 0x80 == 0 {
            return Ok(Self::Definite(first as usize))
        }

        // The 0x80 octet on its own announces the indefinite form.
        if first == 0x80 {
            if !M::ALLOW_INDEFINITE {
                return Err(DecodeError::new(
                    ErrorKind::IndefiniteInDer, start
                ))
            }
            return Ok(Self::Indefinite)
        }

        // 0xFF is reserved by X.690 for future extension.
        if first == 0xff {
            return Err(DecodeError::new(ErrorKind::ReservedLength, start))
        }

        // Long form: the lower seven bits give the number of subsequent
        // octets holding the length in big-endian order.
        let count = (first & 0x7f) as usize;
        let mut res = 0u64;
        for i in 0..count {
            let octet = Self::read_octet(reader, start)?;
            if i == 0 {
                if octet == 0 && M::IS_RESTRICTED {
                    return Err(DecodeError::with_detail(
                        ErrorKind::NonCanonicalLength,
                        "leading zero in length octets", start
                    ))
                }
                if count == 1 && octet < 0x80 && M::IS_RESTRICTED {
                    return Err(DecodeError::with_detail(
                        ErrorKind::NonCanonicalLength,
                        "long form length below 128", start
                    ))
                }
            }
            if res >> 56 != 0 {
                return Err(DecodeError::new(
                    ErrorKind::LengthOverflow, start
                ))
            }
            res = res << 8 | octet as u64;
        }
        match usize::try_from(res) {
            Ok(res) => Ok(Self::Definite(res)),
            Err(_) => Err(DecodeError::new(ErrorKind::LengthOverflow, start)),
        }
    }

    /// Reads a single length octet.
    fn read_octet(
        reader: &mut impl io::Read, start: Pos
    ) -> Result<u8, DecodeError> {
        read_u8(reader).map_err(|err| {
            if err.kind() == io::ErrorKind::UnexpectedEof {
                DecodeError::with_detail(
                    ErrorKind::UnexpectedEnd, "truncated length octets",
                    start
                )
            }
            else {
                DecodeError::io(err, start)
            }
        })
    }

    /// Returns whether the length is the indefinite form.
    pub fn is_indefinite(self) -> bool {
        matches!(self, Self::Indefinite)
    }
}


//--- Display

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Self::Definite(len) => len.fmt(f),
            Self::Indefinite => f.write_str("indefinite"),
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::mode::{Ber, Der};

    fn ber(mut data: &[u8]) -> Result<Length, DecodeError> {
        Length::read::<Ber>(&mut data, Pos::default())
    }

    fn der(mut data: &[u8]) -> Result<Length, DecodeError> {
        Length::read::<Der>(&mut data, Pos::default())
    }

    #[test]
    fn short_form() {
        assert_eq!(ber(b"\x00").unwrap(), Length::Definite(0));
        assert_eq!(ber(b"\x05").unwrap(), Length::Definite(5));
        assert_eq!(ber(b"\x7f").unwrap(), Length::Definite(127));
        assert_eq!(der(b"\x7f").unwrap(), Length::Definite(127));
    }

    #[test]
    fn long_form() {
        assert_eq!(ber(b"\x81\x80").unwrap(), Length::Definite(128));
        assert_eq!(ber(b"\x82\xf0\x0e").unwrap(), Length::Definite(0xf00e));
        assert_eq!(
            ber(b"\x84\x01\x02\x03\x04").unwrap(),
            Length::Definite(0x0102_0304)
        );
        assert_eq!(der(b"\x82\xf0\x0e").unwrap(), Length::Definite(0xf00e));
    }

    #[test]
    fn indefinite_form() {
        assert_eq!(ber(b"\x80").unwrap(), Length::Indefinite);
        assert_eq!(
            der(b"\x80").unwrap_err().kind(),
            ErrorKind::IndefiniteInDer
        );
    }

    #[test]
    fn reserved_octet() {
        assert_eq!(
            ber(b"\xff").unwrap_err().kind(),
            ErrorKind::ReservedLength
        );
        assert_eq!(
            der(b"\xff").unwrap_err().kind(),
            ErrorKind::ReservedLength
        );
    }

    #[test]
    fn non_canonical_forms() {
        // BER tolerates both, DER rejects both.
        assert_eq!(ber(b"\x81\x05").unwrap(), Length::Definite(5));
        assert_eq!(
            der(b"\x81\x05").unwrap_err().kind(),
            ErrorKind::NonCanonicalLength
        );
        assert_eq!(ber(b"\x82\x00\x80").unwrap(), Length::Definite(128));
        assert_eq!(
            der(b"\x82\x00\x80").unwrap_err().kind(),
            ErrorKind::NonCanonicalLength
        );
    }

    #[test]
    fn overflow() {
        assert_eq!(
            ber(
                b"\x89\x01\x00\x00\x00\x00\x00\x00\x00\x00"
            ).unwrap_err().kind(),
            ErrorKind::LengthOverflow
        );
    }

    #[test]
    fn truncated() {
        assert_eq!(
            ber(b"\x82\xf0").unwrap_err().kind(),
            ErrorKind::UnexpectedEnd
        );
        assert_eq!(
            ber(b"").unwrap_err().kind(),
            ErrorKind::UnexpectedEnd
        );
    }
}
