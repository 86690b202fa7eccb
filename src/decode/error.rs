//! Errors while decoding data.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::{error, fmt, io};


//------------ Pos -----------------------------------------------------------

/// The byte offset of an octet in the encoded data.
///
/// Offsets count from the first octet handed to the decoder. They appear in
/// errors to point at the value that violated a rule.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd
)]
pub struct Pos(u64);

impl Pos {
    /// Returns the offset as a plain integer.
    pub fn to_u64(self) -> u64 {
        self.0
    }
}

impl From<u64> for Pos {
    fn from(pos: u64) -> Self {
        Self(pos)
    }
}

impl From<Pos> for u64 {
    fn from(pos: Pos) -> Self {
        pos.0
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}


//------------ ErrorKind -----------------------------------------------------

/// The structural rule violated by the encoded data.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// The identifier octets could not be decoded.
    MalformedHeader,

    /// The length octets started with the reserved octet 0xFF.
    ReservedLength,

    /// A length does not fit the implementation or its enclosing value.
    LengthOverflow,

    /// A primitive value used the indefinite length form.
    IndefiniteOnPrimitive,

    /// The indefinite length form appeared under DER.
    IndefiniteInDer,

    /// The length octets were not in their canonical form under DER.
    NonCanonicalLength,

    /// The data ended in the middle of a value.
    UnexpectedEnd,

    /// An explicitly tagged value was not constructed.
    ///
    /// See clause 8.14.2 of ITU Recommendation X.690.
    ExplicitNotConstructed,

    /// The content octets of a value did not match its type.
    InvalidEncoding,

    /// Reading from the underlying source failed.
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Self::MalformedHeader => "malformed identifier octets",
            Self::ReservedLength => "reserved length octet 0xFF",
            Self::LengthOverflow => "excessive length",
            Self::IndefiniteOnPrimitive => {
                "indefinite length on a primitive value"
            }
            Self::IndefiniteInDer => "indefinite length not allowed in DER",
            Self::NonCanonicalLength => "length octets not in canonical form",
            Self::UnexpectedEnd => "unexpected end of data",
            Self::ExplicitNotConstructed => {
                "explicitly tagged value must be constructed"
            }
            Self::InvalidEncoding => "invalid encoding",
            Self::Io => "I/O error",
        })
    }
}


//------------ DecodeError ---------------------------------------------------

/// An error happened while decoding data.
///
/// Every error carries the [kind][ErrorKind] of rule that was violated and
/// the [position][Pos] of the value the rule was violated by. Many errors
/// also carry a short static detail string refining the kind.
#[derive(Debug)]
pub struct DecodeError {
    kind: ErrorKind,
    detail: Option<&'static str>,
    pos: Pos,
    io: Option<io::Error>,
}

impl DecodeError {
    /// Creates a new error from a kind and a position.
    pub fn new(kind: ErrorKind, pos: Pos) -> Self {
        Self { kind, detail: None, pos, io: None }
    }

    /// Creates a new error that carries an additional detail string.
    pub fn with_detail(
        kind: ErrorKind, detail: &'static str, pos: Pos
    ) -> Self {
        Self { kind, detail: Some(detail), pos, io: None }
    }

    /// Creates an error from an IO error.
    ///
    /// An unexpected end of the underlying reader is translated into
    /// [`ErrorKind::UnexpectedEnd`], everything else is kept as the source
    /// of an [`ErrorKind::Io`] error.
    pub fn io(err: io::Error, pos: Pos) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::new(ErrorKind::UnexpectedEnd, pos)
        }
        else {
            Self { kind: ErrorKind::Io, detail: None, pos, io: Some(err) }
        }
    }

    /// Returns the kind of rule violated by the data.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the position of the offending value.
    pub fn pos(&self) -> Pos {
        self.pos
    }

    /// Returns the detail string if the error carries one.
    pub fn detail(&self) -> Option<&'static str> {
        self.detail
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.kind.fmt(f)?;
        if let Some(detail) = self.detail {
            write!(f, " ({})", detail)?;
        }
        if let Some(io) = self.io.as_ref() {
            write!(f, " ({})", io)?;
        }
        write!(f, " at position {}", self.pos)
    }
}

impl error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.io.as_ref().map(|err| err as &(dyn error::Error + 'static))
    }
}
