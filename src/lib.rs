//! Lazy decoding of BER and DER encoded ASN.1 values.
//!
//! This crate decodes data encoded according to the Basic Encoding Rules
//! or their restricted variant, the Distinguished Encoding Rules, as
//! defined in ITU-T recommendation X.690. It does not try to understand
//! any particular ASN.1 schema. Instead, it hands out the values found in
//! the data one by one and leaves their interpretation to the caller, the
//! way schema-aware code such as an X.509 certificate parser needs it.
//!
//! Decoding starts with a [`Decoder`][decode::Decoder] wrapped around
//! anything that implements `std::io::Read`. Its `next_object` method
//! returns the next value as an [`Object`][decode::Object]: a handle that
//! provides access to the value's content without reading ahead. The
//! content of a constructed value is decoded by asking its handle for the
//! contained values in turn, so even deeply nested or very large data is
//! processed with memory proportional to the nesting depth.
//!
//! Values with a tag outside the universal class cannot be interpreted
//! from the wire alone. They are handed out as a
//! [`TaggedObject`][decode::TaggedObject] which the caller resolves
//! according to whether the schema uses explicit or implicit tagging.
//!
//! Where streaming access is not needed, any handle can be converted into
//! a fully decoded, immutable [`Value`] instead.

pub use self::header::{Class, Header, Tag};
pub use self::length::Length;
pub use self::mode::{Ber, Der, Mode};
pub use self::value::{BitString, Integer, Oid, Value};

pub mod decode;

pub mod header;
pub mod length;
pub mod mode;
pub mod value;
