//! Resolving explicitly and implicitly tagged values.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::io;
use std::marker::PhantomData;
use crate::header::{Class, Tag};
use crate::mode::Mode;
use super::constructed::{Constructed, Region};
use super::error::{DecodeError, ErrorKind, Pos};
use super::object::Object;
use super::primitive::Primitive;


//------------ TaggedObject --------------------------------------------------

/// A value whose tag needs the schema to be interpreted.
///
/// Values of the application, context, and private classes carry no
/// information about the type of their content: under explicit tagging the
/// content is a complete encoded value, under implicit tagging it is the
/// bare content of a value whose tag the schema knows. The wire looks the
/// same either way, so the handle waits for the caller to pick.
///
/// Calling [`explicit`][Self::explicit] treats the value as an explicitly
/// tagged one and returns the single value encoded in its content. Calling
/// [`implicit`][Self::implicit] treats it as implicitly tagged: the caller
/// supplies the tag the schema implies and receives the value relabeled
/// accordingly. Neither call reads ahead, so the decision can be based on
/// [`tag`][Self::tag] and [`is_constructed`][Self::is_constructed].
pub struct TaggedObject<'a, M: Mode, R: io::Read> {
    tag: Tag,
    constructed: bool,
    start: Pos,
    region: Region<'a, R>,
    marker: PhantomData<M>,
}

impl<'a, M: Mode, R: io::Read> TaggedObject<'a, M, R> {
    pub(crate) fn new(
        tag: Tag, constructed: bool, start: Pos, region: Region<'a, R>
    ) -> Self {
        Self { tag, constructed, start, region, marker: PhantomData }
    }

    /// Returns the tag of the value.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the class of the value's tag.
    pub fn class(&self) -> Class {
        self.tag.class()
    }

    /// Returns the number of the value's tag.
    pub fn number(&self) -> u32 {
        self.tag.number()
    }

    /// Returns whether the value is constructed.
    pub fn is_constructed(&self) -> bool {
        self.constructed
    }

    /// Returns the position of the value's first octet.
    pub fn start(&self) -> Pos {
        self.start
    }

    /// Resolves the value as explicitly tagged.
    ///
    /// An explicitly tagged value is a constructed value whose content is
    /// exactly one complete encoded value, which is returned. A primitive
    /// value cannot be explicitly tagged; see clause 8.14.2 of ITU
    /// Recommendation X.690.
    ///
    /// The returned value borrows the handle. Once it has been processed
    /// and dropped, the handle itself must be dropped; anything beyond the
    /// one inner value puts the decoder into an error state.
    pub fn explicit(
        &mut self
    ) -> Result<Object<'_, M, R>, DecodeError> {
        if !self.constructed {
            return Err(DecodeError::new(
                ErrorKind::ExplicitNotConstructed, self.start
            ))
        }
        match self.region.next_object::<M>()? {
            Some(obj) => Ok(obj),
            None => {
                Err(DecodeError::with_detail(
                    ErrorKind::InvalidEncoding,
                    "explicitly tagged value without content", self.start
                ))
            }
        }
    }

    /// Resolves the value as implicitly tagged with the given tag.
    ///
    /// The value is relabeled in place: its content window stays exactly
    /// where it is and only the tag changes to the one the schema implies.
    /// The constructed flag from the wire is kept, so a relabeling that
    /// contradicts the flag is not caught here but when the content is
    /// interpreted.
    pub fn implicit(self, tag: Tag) -> Object<'a, M, R> {
        let Self { constructed, start, region, .. } = self;
        if constructed {
            Object::Constructed(Constructed::new(tag, start, region))
        }
        else {
            Object::Primitive(Primitive::new(tag, start, region))
        }
    }

    /// Discards the value, content and all.
    pub fn skip_all(&mut self) -> Result<(), DecodeError>
    where R: io::BufRead {
        self.region.skip_all::<M>()
    }

    /// Decomposes the handle for materialization.
    pub(crate) fn into_parts(self) -> (Tag, bool, Pos, Region<'a, R>) {
        let Self { tag, constructed, start, region, .. } = self;
        (tag, constructed, start, region)
    }
}
