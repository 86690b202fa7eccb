//! A single encoded value.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::{fmt, io};
use crate::header::Tag;
use crate::mode::Mode;
use super::constructed::Constructed;
use super::error::{DecodeError, ErrorKind, Pos};
use super::primitive::Primitive;
use super::tagged::TaggedObject;


//------------ Object --------------------------------------------------------

/// A single value encountered in the data.
///
/// A value of the universal class comes out as either a
/// [`Primitive`] or a [`Constructed`] handle, depending on its encoding.
/// A value of any other class cannot be interpreted from the wire alone
/// and comes out as a [`TaggedObject`] awaiting resolution.
///
/// The object mutably borrows whatever handed it out. It must be fully
/// consumed, skipped, or resolved before that parent can be used again;
/// dropping it with unconsumed content puts the decoder into an error
/// state.
pub enum Object<'a, M: Mode, R: io::Read> {
    /// A primitive value of the universal class.
    Primitive(Primitive<'a, M, R>),

    /// A constructed value of the universal class.
    Constructed(Constructed<'a, M, R>),

    /// A value of the application, context, or private class.
    Tagged(TaggedObject<'a, M, R>),
}

impl<'a, M: Mode, R: io::Read> Object<'a, M, R> {
    /// Returns the tag of the value.
    pub fn tag(&self) -> Tag {
        match *self {
            Self::Primitive(ref inner) => inner.tag(),
            Self::Constructed(ref inner) => inner.tag(),
            Self::Tagged(ref inner) => inner.tag(),
        }
    }

    /// Returns the position of the value's first octet.
    pub fn start(&self) -> Pos {
        match *self {
            Self::Primitive(ref inner) => inner.start(),
            Self::Constructed(ref inner) => inner.start(),
            Self::Tagged(ref inner) => inner.start(),
        }
    }

    /// Returns whether the value is a universal primitive value.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    /// Returns whether the value is a universal constructed value.
    pub fn is_constructed(&self) -> bool {
        matches!(self, Self::Constructed(_))
    }

    /// Returns whether the value awaits tag resolution.
    pub fn is_tagged(&self) -> bool {
        matches!(self, Self::Tagged(_))
    }

    /// Converts the object into a primitive value.
    pub fn into_primitive(
        self
    ) -> Result<Primitive<'a, M, R>, DecodeError> {
        match self {
            Self::Primitive(inner) => Ok(inner),
            other => {
                Err(DecodeError::with_detail(
                    ErrorKind::InvalidEncoding, "expected a primitive value",
                    other.start()
                ))
            }
        }
    }

    /// Converts the object into a constructed value.
    pub fn into_constructed(
        self
    ) -> Result<Constructed<'a, M, R>, DecodeError> {
        match self {
            Self::Constructed(inner) => Ok(inner),
            other => {
                Err(DecodeError::with_detail(
                    ErrorKind::InvalidEncoding,
                    "expected a constructed value", other.start()
                ))
            }
        }
    }

    /// Converts the object into a value awaiting tag resolution.
    pub fn into_tagged(
        self
    ) -> Result<TaggedObject<'a, M, R>, DecodeError> {
        match self {
            Self::Tagged(inner) => Ok(inner),
            other => {
                Err(DecodeError::with_detail(
                    ErrorKind::InvalidEncoding,
                    "expected a tagged value", other.start()
                ))
            }
        }
    }

    /// Discards the value, content and all.
    ///
    /// The content is still checked for well-formed framing while being
    /// discarded.
    pub fn skip(self) -> Result<(), DecodeError>
    where R: io::BufRead {
        match self {
            Self::Primitive(mut inner) => inner.skip_all(),
            Self::Constructed(mut inner) => inner.skip_all(),
            Self::Tagged(mut inner) => inner.skip_all(),
        }
    }
}

impl<'a, M: Mode, R: io::Read> fmt::Debug for Object<'a, M, R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match *self {
            Self::Primitive(_) => "Primitive",
            Self::Constructed(_) => "Constructed",
            Self::Tagged(_) => "Tagged",
        };
        f.debug_tuple(name).field(&self.tag()).finish()
    }
}
