//! Decoding the top level and constructed values.
//!
//! This is a private module. Its public items are re-exported by the
//! parent.

use std::io;
use std::io::Read;
use std::marker::PhantomData;
use smallvec::SmallVec;
use crate::header::{Header, Tag};
use crate::length::Length;
use crate::mode::Mode;
use super::{read_u8, MAX_DEPTH};
use super::error::{DecodeError, ErrorKind, Pos};
use super::object::Object;
use super::primitive::Primitive;
use super::source::{Source, Window};
use super::tagged::TaggedObject;


//------------ Decoder -------------------------------------------------------

/// A decoder for a sequence of BER or DER encoded values.
///
/// The decoder wraps a reader and hands out the values found in it one by
/// one via [`next_object`][Self::next_object]. The type argument `M`
/// selects the encoding rules: [`Ber`][crate::Ber] or [`Der`][crate::Der].
///
/// Each object handed out mutably borrows the decoder, so the next object
/// can only be requested once the previous one has been fully processed.
/// Dropping an object with unconsumed content puts the decoder into an
/// error state from which all further operations fail. Use
/// [`Object::skip`] to deliberately discard a value.
///
/// The decoder itself does not limit how much data it reads; when decoding
/// from an untrusted connection, wrap the reader in [`io::Read::take`].
pub struct Decoder<M, R> {
    source: Source<R>,
    marker: PhantomData<M>,
}

impl<M: Mode, R: io::Read> Decoder<M, R> {
    /// Creates a decoder reading from `reader`.
    pub fn new(reader: R) -> Self {
        Self { source: Source::new(reader), marker: PhantomData }
    }

    /// Returns the current position in the data.
    pub fn pos(&self) -> Pos {
        self.source.pos().into()
    }

    /// Returns the next value in the data.
    ///
    /// Returns `Ok(None)` if the reader ends cleanly at a value boundary.
    /// An end-of-contents marker is never a value and results in an error
    /// at the top level.
    pub fn next_object(
        &mut self
    ) -> Result<Option<Object<'_, M, R>>, DecodeError> {
        self.source.check_status()?;
        let start = Pos::from(self.source.pos());
        let header = match Header::read_opt(&mut self.source, start)? {
            Some(header) => header,
            None => return Ok(None),
        };
        if header == Header::END_OF_CONTENTS {
            return Err(DecodeError::with_detail(
                ErrorKind::InvalidEncoding,
                "end-of-contents outside indefinite length value", start
            ))
        }
        let len_pos = Pos::from(self.source.pos());
        let length = Length::read::<M>(&mut self.source, len_pos)?;
        read_object(&mut self.source, header, length, None, start).map(Some)
    }

    /// Checks that the reader contains no further data.
    pub fn check_exhausted(mut self) -> Result<(), DecodeError> {
        self.source.check_status()?;
        let pos = Pos::from(self.source.pos());
        match read_u8(&mut self.source) {
            Ok(_) => {
                Err(DecodeError::with_detail(
                    ErrorKind::InvalidEncoding, "trailing data", pos
                ))
            }
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(()),
            Err(err) => Err(DecodeError::io(err, pos)),
        }
    }

    /// Decodes a reader holding exactly one value.
    ///
    /// The closure receives the value and can process it in any way it
    /// likes. Afterwards, the reader must be exhausted.
    pub fn process<T, F>(reader: R, op: F) -> Result<T, DecodeError>
    where F: FnOnce(Object<M, R>) -> Result<T, DecodeError> {
        let mut decoder = Self::new(reader);
        let start = decoder.pos();
        let res = match decoder.next_object()? {
            Some(obj) => op(obj)?,
            None => {
                return Err(DecodeError::with_detail(
                    ErrorKind::UnexpectedEnd, "empty input", start
                ))
            }
        };
        decoder.check_exhausted()?;
        Ok(res)
    }
}


//------------ Constructed ---------------------------------------------------

/// The handle for the content of a constructed value.
///
/// The contained values are requested one by one via
/// [`next_object`][Self::next_object], which returns `Ok(None)` once the
/// content is finished. The handle mutably borrows its parent; dropping it
/// while content remains puts the decoder into an error state.
pub struct Constructed<'a, M: Mode, R: io::Read> {
    tag: Tag,
    start: Pos,
    region: Region<'a, R>,
    marker: PhantomData<M>,
}

impl<'a, M: Mode, R: io::Read> Constructed<'a, M, R> {
    pub(crate) fn new(
        tag: Tag, start: Pos, region: Region<'a, R>
    ) -> Self {
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

    /// Returns the next contained value.
    ///
    /// Returns `Ok(None)` when the content is finished, i.e., when the
    /// definite length is used up or the end-of-contents marker has been
    /// read.
    pub fn next_object(
        &mut self
    ) -> Result<Option<Object<'_, M, R>>, DecodeError> {
        self.region.next_object::<M>()
    }

    /// Discards all remaining content.
    pub fn skip_all(&mut self) -> Result<(), DecodeError>
    where R: io::BufRead {
        self.region.skip_all::<M>()
    }
}


//------------ Region --------------------------------------------------------

/// The content window of a value currently being decoded.
///
/// A region knows where the content of its value ends: at an absolute
/// position for the definite length form, at the end-of-contents marker
/// for the indefinite form. An indefinite region additionally remembers
/// the window of its nearest definite ancestor so that nothing can read
/// past that.
///
/// Dropping a region drives the source to the end of the content if that
/// takes no reading, otherwise it poisons the source.
pub(crate) struct Region<'a, R: io::Read> {
    source: &'a mut Source<R>,
    kind: RegionKind,
}

#[derive(Clone, Copy)]
enum RegionKind {
    /// The content ends at the given absolute position.
    Definite { end: u64 },

    /// The content ends with an end-of-contents marker.
    Indefinite { limit: Option<u64>, done: bool },
}

impl<'a, R: io::Read> Region<'a, R> {
    fn definite(source: &'a mut Source<R>, end: u64) -> Self {
        Self { source, kind: RegionKind::Definite { end } }
    }

    fn indefinite(source: &'a mut Source<R>, limit: Option<u64>) -> Self {
        Self { source, kind: RegionKind::Indefinite { limit, done: false } }
    }

    /// Returns the current position.
    pub(crate) fn pos(&self) -> u64 {
        self.source.pos()
    }

    /// Returns the absolute position nothing may read past, if any.
    fn window(&self) -> Option<u64> {
        match self.kind {
            RegionKind::Definite { end } => Some(end),
            RegionKind::Indefinite { limit, .. } => limit,
        }
    }

    /// Returns the number of content octets left in a definite region.
    pub(crate) fn remaining(&self) -> u64 {
        match self.kind {
            RegionKind::Definite { end } => {
                end.saturating_sub(self.source.pos())
            }
            RegionKind::Indefinite { .. } => 0,
        }
    }

    /// Returns the next value in the region.
    pub(crate) fn next_object<M: Mode>(
        &mut self
    ) -> Result<Option<Object<'_, M, R>>, DecodeError> {
        self.source.check_status()?;
        match self.kind {
            RegionKind::Definite { end } => {
                if self.source.pos() == end {
                    return Ok(None)
                }
            }
            RegionKind::Indefinite { done, .. } => {
                if done {
                    return Ok(None)
                }
            }
        }
        let start = Pos::from(self.source.pos());
        let header = match Header::read_opt(&mut *self, start)? {
            Some(header) => header,
            None => {
                return Err(DecodeError::with_detail(
                    ErrorKind::UnexpectedEnd, "truncated content octets",
                    start
                ))
            }
        };
        if header == Header::END_OF_CONTENTS {
            return match self.kind {
                RegionKind::Definite { .. } => {
                    Err(DecodeError::with_detail(
                        ErrorKind::InvalidEncoding,
                        "end-of-contents in definite length value", start
                    ))
                }
                RegionKind::Indefinite { limit, .. } => {
                    let len_pos = Pos::from(self.source.pos());
                    let length = Length::read::<M>(&mut *self, len_pos)?;
                    if length != Length::Definite(0) {
                        return Err(DecodeError::with_detail(
                            ErrorKind::InvalidEncoding,
                            "end-of-contents with content octets", start
                        ))
                    }
                    self.kind = RegionKind::Indefinite { limit, done: true };
                    Ok(None)
                }
            }
        }
        let len_pos = Pos::from(self.source.pos());
        let length = Length::read::<M>(&mut *self, len_pos)?;
        let window = self.window();
        read_object(
            &mut *self.source, header, length, window, start
        ).map(Some)
    }

    /// Discards all remaining content of the region.
    ///
    /// This walks the contained values without building anything,
    /// iteratively with an explicit stack so that nesting depth never
    /// translates into call stack depth.
    pub(crate) fn skip_all<M: Mode>(&mut self) -> Result<(), DecodeError>
    where R: io::BufRead {
        self.source.check_status()?;
        let mut stack = SmallVec::<[Frame; 8]>::new();
        match self.kind {
            RegionKind::Definite { end } => {
                stack.push(Frame { window: Some(end), indefinite: false });
            }
            RegionKind::Indefinite { limit, done } => {
                if done {
                    return Ok(())
                }
                stack.push(Frame { window: limit, indefinite: true });
            }
        }
        while let Some(frame) = stack.last().copied() {
            if !frame.indefinite && frame.window == Some(self.source.pos()) {
                stack.pop();
                continue
            }
            let start = Pos::from(self.source.pos());
            let header = {
                let mut window = Window::new(&mut *self.source, frame.window);
                match Header::read_opt(&mut window, start)? {
                    Some(header) => header,
                    None => {
                        return Err(DecodeError::with_detail(
                            ErrorKind::UnexpectedEnd,
                            "truncated content octets", start
                        ))
                    }
                }
            };
            let len_pos = Pos::from(self.source.pos());
            let length = {
                let mut window = Window::new(&mut *self.source, frame.window);
                Length::read::<M>(&mut window, len_pos)?
            };
            if header == Header::END_OF_CONTENTS {
                if !frame.indefinite {
                    return Err(DecodeError::with_detail(
                        ErrorKind::InvalidEncoding,
                        "end-of-contents in definite length value", start
                    ))
                }
                if length != Length::Definite(0) {
                    return Err(DecodeError::with_detail(
                        ErrorKind::InvalidEncoding,
                        "end-of-contents with content octets", start
                    ))
                }
                stack.pop();
                continue
            }
            match length {
                Length::Definite(len) => {
                    let end = match self.source.pos().checked_add(
                        len as u64
                    ) {
                        Some(end) => end,
                        None => {
                            return Err(DecodeError::new(
                                ErrorKind::LengthOverflow, start
                            ))
                        }
                    };
                    if let Some(window) = frame.window {
                        if end > window {
                            return Err(DecodeError::with_detail(
                                ErrorKind::LengthOverflow,
                                "nested value too long", start
                            ))
                        }
                    }
                    if header.is_constructed() {
                        if stack.len() >= MAX_DEPTH {
                            return Err(DecodeError::with_detail(
                                ErrorKind::InvalidEncoding,
                                "nesting too deep", start
                            ))
                        }
                        stack.push(Frame {
                            window: Some(end), indefinite: false
                        });
                    }
                    else {
                        self.source.skip_bytes(len as u64).map_err(|err| {
                            DecodeError::io(err, start)
                        })?;
                    }
                }
                Length::Indefinite => {
                    if !header.is_constructed() {
                        return Err(DecodeError::new(
                            ErrorKind::IndefiniteOnPrimitive, start
                        ))
                    }
                    if stack.len() >= MAX_DEPTH {
                        return Err(DecodeError::with_detail(
                            ErrorKind::InvalidEncoding,
                            "nesting too deep", start
                        ))
                    }
                    stack.push(Frame {
                        window: frame.window, indefinite: true
                    });
                }
            }
        }
        if let RegionKind::Indefinite { done, .. } = &mut self.kind {
            *done = true;
        }
        Ok(())
    }

    /// Discards the remaining content of a definite region.
    pub(crate) fn skip_remaining(&mut self) -> Result<(), DecodeError>
    where R: io::BufRead {
        self.source.check_status()?;
        let len = self.remaining();
        let pos = Pos::from(self.source.pos());
        self.source.skip_bytes(len).map_err(|err| {
            DecodeError::io(err, pos)
        })
    }
}

impl<'a, R: io::Read> io::Read for Region<'a, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let window = self.window();
        Window::new(&mut *self.source, window).read(buf)
    }
}

impl<'a, R: io::Read> Drop for Region<'a, R> {
    fn drop(&mut self) {
        if self.source.is_poisoned() {
            return
        }
        match self.kind {
            RegionKind::Definite { end } => {
                if self.source.pos() != end {
                    self.source.set_err(
                        ErrorKind::InvalidEncoding,
                        "value dropped with unconsumed content"
                    );
                }
            }
            RegionKind::Indefinite { done, .. } => {
                if done {
                    return
                }
                // The only valid remaining content is the marker itself.
                let mut octets = [0u8; 2];
                match self.read_exact(&mut octets) {
                    Ok(()) if octets == [0, 0] => { }
                    _ => {
                        self.source.set_err(
                            ErrorKind::UnexpectedEnd,
                            "missing end-of-contents marker"
                        );
                    }
                }
            }
        }
    }
}


//------------ Frame ---------------------------------------------------------

/// One level of nesting while skipping over a value.
#[derive(Clone, Copy)]
struct Frame {
    /// The absolute position nothing on this level may read past.
    window: Option<u64>,

    /// Does this level end with an end-of-contents marker?
    indefinite: bool,
}


//------------ Reading a single value ----------------------------------------

/// Builds the handle for a value whose header and length have been read.
///
/// The `window` is the absolute position the enclosing value does not
/// extend past, if there is one. A definite length reaching past it is
/// rejected right here rather than when reading the content later.
pub(crate) fn read_object<'a, M: Mode, R: io::Read>(
    source: &'a mut Source<R>,
    header: Header,
    length: Length,
    window: Option<u64>,
    start: Pos,
) -> Result<Object<'a, M, R>, DecodeError> {
    let region = match length {
        Length::Definite(len) => {
            let end = match source.pos().checked_add(len as u64) {
                Some(end) => end,
                None => {
                    return Err(DecodeError::new(
                        ErrorKind::LengthOverflow, start
                    ))
                }
            };
            if let Some(window) = window {
                if end > window {
                    return Err(DecodeError::with_detail(
                        ErrorKind::LengthOverflow,
                        "nested value too long", start
                    ))
                }
            }
            Region::definite(source, end)
        }
        Length::Indefinite => {
            if !header.is_constructed() {
                return Err(DecodeError::new(
                    ErrorKind::IndefiniteOnPrimitive, start
                ))
            }
            Region::indefinite(source, window)
        }
    };
    if !header.tag().is_universal() {
        Ok(Object::Tagged(TaggedObject::new(
            header.tag(), header.is_constructed(), start, region
        )))
    }
    else if header.is_constructed() {
        Ok(Object::Constructed(Constructed::new(
            header.tag(), start, region
        )))
    }
    else {
        Ok(Object::Primitive(Primitive::new(header.tag(), start, region)))
    }
}
