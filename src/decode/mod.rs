//! Decoding BER and DER encoded data.
//!
//! Decoding is done in the pull style. A [`Decoder`] wraps a reader and
//! hands out the values it finds one by one as [`Object`]s. An object is a
//! handle onto the undecoded content of the value: a [`Primitive`] hands
//! out content octets, a [`Constructed`] hands out the contained values in
//! turn, and a [`TaggedObject`] waits for the caller to resolve its tag as
//! explicit or implicit. Each handle mutably borrows its parent, so values
//! are always processed strictly in wire order.
//!
//! Every error is a [`DecodeError`] naming the violated rule and the
//! position of the offending value.

pub use self::constructed::{Constructed, Decoder};
pub use self::error::{DecodeError, ErrorKind, Pos};
pub use self::object::Object;
pub use self::primitive::Primitive;
pub use self::tagged::TaggedObject;

pub(crate) mod constructed;
mod error;
mod object;
mod primitive;
mod source;
mod tagged;

mod test;

/// The maximum nesting depth accepted when walking values.
///
/// Skipping over a value and materializing a value both refuse to nest
/// deeper than this, so that maliciously nested data cannot exhaust the
/// stack or the walker's frame storage.
pub const MAX_DEPTH: usize = 64;

/// Reads a single octet from a reader.
pub(crate) fn read_u8(reader: &mut impl std::io::Read) -> std::io::Result<u8> {
    let mut buf = [0u8; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}
