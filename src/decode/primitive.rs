//! Decoding the content of primitive values.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::io;
use std::marker::PhantomData;
use bytes::Bytes;
use crate::header::Tag;
use crate::mode::Mode;
use super::constructed::Region;
use super::error::{DecodeError, ErrorKind, Pos};


//------------ Primitive -----------------------------------------------------

/// The handle for the content of a primitive value.
///
/// The content octets are read through the various `read_` methods. A
/// primitive value always has a definite length, so the number of content
/// octets left is known at all times via [`remaining`][Self::remaining].
///
/// All content must be read (or discarded via [`skip_all`][Self::skip_all])
/// before the handle is dropped, otherwise the decoder goes into an error
/// state.
pub struct Primitive<'a, M: Mode, R: io::Read> {
    tag: Tag,
    start: Pos,
    region: Region<'a, R>,
    marker: PhantomData<M>,
}

impl<'a, M: Mode, R: io::Read> Primitive<'a, M, R> {
    pub(crate) fn new(tag: Tag, start: Pos, region: Region<'a, R>) -> Self {
        Self { tag, start, region, marker: PhantomData }
    }

    /// Returns the tag of the value.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the position of the value's first octet.
    pub fn start(&self) -> Pos {
        self.start
    }

    /// Returns the current position.
    pub fn pos(&self) -> Pos {
        self.region.pos().into()
    }

    /// Returns the number of content octets not yet read.
    pub fn remaining(&self) -> usize {
        self.region.remaining() as usize
    }

    /// Fills `buf` from the content octets.
    pub fn read_exact(
        &mut self, buf: &mut [u8]
    ) -> Result<(), DecodeError> {
        if buf.len() > self.remaining() {
            return Err(DecodeError::with_detail(
                ErrorKind::UnexpectedEnd, "unexpected end of content octets",
                self.pos()
            ))
        }
        let pos = self.pos();
        io::Read::read_exact(&mut self.region, buf).map_err(|err| {
            DecodeError::io(err, pos)
        })
    }

    /// Reads a single content octet.
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// Reads all remaining content octets.
    pub fn read_all(&mut self) -> Result<Bytes, DecodeError> {
        let mut buf = vec![0u8; self.remaining()];
        self.read_exact(&mut buf)?;
        Ok(buf.into())
    }

    /// Reads all remaining content octets into a boxed slice.
    pub fn read_all_into_box(
        &mut self
    ) -> Result<Box<[u8]>, DecodeError> {
        let mut buf = vec![0u8; self.remaining()];
        self.read_exact(&mut buf)?;
        Ok(buf.into_boxed_slice())
    }

    /// Checks that all content octets have been read.
    pub fn check_exhausted(&self) -> Result<(), DecodeError> {
        if self.remaining() != 0 {
            return Err(self.err_at_current("trailing content octets"))
        }
        Ok(())
    }

    /// Discards all remaining content octets.
    pub fn skip_all(&mut self) -> Result<(), DecodeError>
    where R: io::BufRead {
        self.region.skip_remaining()
    }

    /// Produces an encoding error at the start of the value.
    ///
    /// This is for callers that interpret the content according to a
    /// schema and find it in violation of that schema.
    pub fn err_at_start(&self, detail: &'static str) -> DecodeError {
        DecodeError::with_detail(
            ErrorKind::InvalidEncoding, detail, self.start
        )
    }

    /// Produces an encoding error at the current position.
    pub fn err_at_current(&self, detail: &'static str) -> DecodeError {
        DecodeError::with_detail(
            ErrorKind::InvalidEncoding, detail, self.pos()
        )
    }
}
