//! The octet source underneath a decoder.
//!
//! This is a private module. It is only used by the other modules of the
//! parent.

use std::{cmp, io};
use super::error::{DecodeError, ErrorKind};


//------------ Source --------------------------------------------------------

/// A position-counting reader with a sticky error state.
///
/// All octets a decoder consumes flow through a single source, which is how
/// the current position is always known. The sticky error state is set when
/// a value handle is dropped in a way that leaves the source somewhere in
/// the middle of that value. Every subsequent decoding operation checks the
/// state first, so a partially consumed value reliably fails the overall
/// decoding run rather than silently de-synchronizing it.
pub(crate) struct Source<R> {
    reader: R,
    pos: u64,
    err: Option<(ErrorKind, &'static str, u64)>,
}

impl<R> Source<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self { reader, pos: 0, err: None }
    }

    /// Returns the current position.
    pub(crate) fn pos(&self) -> u64 {
        self.pos
    }

    /// Sets the sticky error state unless it is already set.
    pub(crate) fn set_err(&mut self, kind: ErrorKind, detail: &'static str) {
        if self.err.is_none() {
            self.err = Some((kind, detail, self.pos));
        }
    }

    /// Returns whether the sticky error state is set.
    pub(crate) fn is_poisoned(&self) -> bool {
        self.err.is_some()
    }

    /// Errors out if the sticky error state is set.
    pub(crate) fn check_status(&self) -> Result<(), DecodeError> {
        match self.err {
            Some((kind, detail, pos)) => {
                Err(DecodeError::with_detail(kind, detail, pos.into()))
            }
            None => Ok(())
        }
    }
}

impl<R: io::BufRead> Source<R> {
    /// Discards the next `len` octets.
    pub(crate) fn skip_bytes(&mut self, mut len: u64) -> io::Result<()> {
        while len > 0 {
            let available = self.reader.fill_buf()?;
            if available.is_empty() {
                return Err(io::ErrorKind::UnexpectedEof.into())
            }
            let step = cmp::min(available.len() as u64, len) as usize;
            self.reader.consume(step);
            self.pos += step as u64;
            len -= step as u64;
        }
        Ok(())
    }
}

impl<R: io::Read> io::Read for Source<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let read = self.reader.read(buf)?;
        self.pos += read as u64;
        Ok(read)
    }
}


//------------ Window --------------------------------------------------------

/// A read adapter that refuses to read past an absolute position.
///
/// Once the limit is reached, reads return `Ok(0)`, which turns into an
/// `UnexpectedEof` error for anyone using `read_exact`. A window without a
/// limit reads straight through to the source.
pub(crate) struct Window<'a, R> {
    source: &'a mut Source<R>,
    end: Option<u64>,
}

impl<'a, R> Window<'a, R> {
    pub(crate) fn new(source: &'a mut Source<R>, end: Option<u64>) -> Self {
        Self { source, end }
    }
}

impl<'a, R: io::Read> io::Read for Window<'a, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let max = match self.end {
            Some(end) => {
                cmp::min(
                    end.saturating_sub(self.source.pos), buf.len() as u64
                ) as usize
            }
            None => buf.len(),
        };
        io::Read::read(&mut *self.source, &mut buf[..max])
    }
}
