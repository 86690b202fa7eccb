//! Fully decoded values.
//!
//! Where streaming access to the content is not needed, any
//! [`Object`][crate::decode::Object] can be materialized into a [`Value`]:
//! an owned, immutable tree over the universal types this crate knows how
//! to interpret. Values of other universal types keep their raw content in
//! an [`OtherValue`], values of the remaining classes in a
//! [`TaggedValue`].

use std::{fmt, io, str};
use bytes::Bytes;
use crate::decode::{
    Constructed, DecodeError, Decoder, ErrorKind, Object, Pos, Primitive,
    TaggedObject, MAX_DEPTH,
};
use crate::header::Tag;
use crate::mode::Mode;


//------------ Value ---------------------------------------------------------

/// A fully decoded value.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    /// A BOOLEAN value.
    Boolean(bool),

    /// An INTEGER value of any size.
    Integer(Integer),

    /// An ENUMERATED value, represented like an INTEGER.
    Enumerated(Integer),

    /// A BIT STRING value.
    BitString(BitString),

    /// An OCTET STRING value.
    OctetString(Bytes),

    /// The NULL value.
    Null,

    /// An OBJECT IDENTIFIER value.
    Oid(Oid),

    /// A UTF8String value.
    Utf8String(String),

    /// A SEQUENCE or SEQUENCE OF value.
    Sequence(Vec<Value>),

    /// A SET or SET OF value.
    Set(Vec<Value>),

    /// A value of the application, context, or private class.
    Tagged(TaggedValue),

    /// A value of a universal type this crate does not interpret.
    Other(OtherValue),
}

impl Value {
    /// Decodes a reader holding exactly one value.
    pub fn decode<M: Mode, R: io::Read>(
        reader: R
    ) -> Result<Self, DecodeError> {
        Decoder::<M, R>::process(reader, |obj| obj.into_value())
    }
}


//------------ Content -------------------------------------------------------

/// The content of a value kept in its wire form.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Content {
    /// The raw content octets of a primitive value.
    Primitive(Bytes),

    /// The materialized content of a constructed value.
    Constructed(Vec<Value>),
}


//------------ TaggedValue ---------------------------------------------------

/// A materialized value of the application, context, or private class.
///
/// Without the schema, neither explicit nor implicit resolution can be
/// applied, so the content is kept the way it appeared on the wire.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TaggedValue {
    tag: Tag,
    content: Content,
}

impl TaggedValue {
    pub(crate) fn new(tag: Tag, content: Content) -> Self {
        Self { tag, content }
    }

    /// Returns the tag of the value.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns whether the value was constructed on the wire.
    pub fn is_constructed(&self) -> bool {
        matches!(self.content, Content::Constructed(_))
    }

    /// Returns the content of the value.
    pub fn content(&self) -> &Content {
        &self.content
    }
}


//------------ OtherValue ----------------------------------------------------

/// A materialized value of an uninterpreted universal type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OtherValue {
    tag: Tag,
    content: Content,
}

impl OtherValue {
    pub(crate) fn new(tag: Tag, content: Content) -> Self {
        Self { tag, content }
    }

    /// Returns the tag of the value.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// Returns the content of the value.
    pub fn content(&self) -> &Content {
        &self.content
    }
}


//------------ Integer -------------------------------------------------------

/// An INTEGER value of any size.
///
/// The value is kept in its wire form: a big-endian, two's complement
/// sequence of octets of the minimum necessary length. Conversion into
/// native integer types is available for values that fit.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Integer(Bytes);

impl Integer {
    /// Creates a value from content octets, checking the minimum form.
    ///
    /// See clause 8.3.2 of ITU Recommendation X.690: the first nine bits
    /// must not be all zero or all one.
    pub(crate) fn from_content(
        content: Bytes, start: Pos
    ) -> Result<Self, DecodeError> {
        match (content.first().copied(), content.get(1).copied()) {
            (None, _) => {
                Err(DecodeError::with_detail(
                    ErrorKind::InvalidEncoding,
                    "INTEGER with empty content", start
                ))
            }
            (Some(0), Some(second)) if second < 0x80 => {
                Err(DecodeError::with_detail(
                    ErrorKind::InvalidEncoding,
                    "INTEGER not in minimum form", start
                ))
            }
            (Some(0xff), Some(second)) if second >= 0x80 => {
                Err(DecodeError::with_detail(
                    ErrorKind::InvalidEncoding,
                    "INTEGER not in minimum form", start
                ))
            }
            _ => Ok(Self(content))
        }
    }

    /// Returns whether the value is negative.
    pub fn is_negative(&self) -> bool {
        self.0.first().map_or(false, |octet| octet & 0x80 != 0)
    }

    /// Returns the content octets of the value.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Converts the value into an `i64` if it fits.
    pub fn to_i64(&self) -> Option<i64> {
        if self.0.len() > 8 {
            return None
        }
        let mut res: i64 = if self.is_negative() { -1 } else { 0 };
        for &octet in self.0.iter() {
            res = res << 8 | octet as i64;
        }
        Some(res)
    }

    /// Converts the value into a `u64` if it fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.is_negative() {
            return None
        }
        let octets = match self.0.first() {
            Some(0) => &self.0[1..],
            _ => &self.0[..],
        };
        if octets.len() > 8 {
            return None
        }
        let mut res = 0u64;
        for &octet in octets {
            res = res << 8 | octet as u64;
        }
        Some(res)
    }

    /// Converts the value into a `u32` if it fits.
    pub fn to_u32(&self) -> Option<u32> {
        self.to_u64().and_then(|res| res.try_into().ok())
    }
}

impl PartialEq<i64> for Integer {
    fn eq(&self, other: &i64) -> bool {
        self.to_i64() == Some(*other)
    }
}


//------------ BitString -----------------------------------------------------

/// A BIT STRING value.
///
/// A bit string is a sequence of bits of any length, stored in octets with
/// the first bit in the most significant bit of the first octet. The last
/// octet can be partial; the number of its bits that are not part of the
/// string is kept separately.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct BitString {
    unused: u8,
    octets: Bytes,
}

impl BitString {
    pub(crate) fn new(unused: u8, octets: Bytes) -> Self {
        Self { unused, octets }
    }

    /// Returns the number of unused bits in the last octet.
    pub fn unused(&self) -> u8 {
        self.unused
    }

    /// Returns the octets holding the bits.
    pub fn as_slice(&self) -> &[u8] {
        &self.octets
    }

    /// Returns the number of bits in the string.
    pub fn bit_len(&self) -> usize {
        self.octets.len() * 8 - self.unused as usize
    }

    /// Returns the bit at the given index.
    ///
    /// Bits past the end of the string are reported as unset.
    pub fn bit(&self, idx: usize) -> bool {
        if idx >= self.bit_len() {
            return false
        }
        self.octets[idx / 8] & (0x80 >> (idx % 8)) != 0
    }
}


//------------ Oid -----------------------------------------------------------

/// An OBJECT IDENTIFIER value.
///
/// An object identifier is a sequence of integer components identifying an
/// object in a global, hierarchical namespace. The value is kept in its
/// wire form; [`iter`][Self::iter] produces the components, with the
/// packing of the first two already undone.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Oid(Bytes);

impl Oid {
    /// Creates a value from content octets, checking their form.
    ///
    /// Each subidentifier is base 128 with the high bit marking
    /// continuation; the first octet of a subidentifier must not be the
    /// padding octet 0x80. Subidentifiers larger than a `u64` are rejected.
    pub(crate) fn from_content(
        content: Bytes, start: Pos
    ) -> Result<Self, DecodeError> {
        let err = |detail| {
            Err(DecodeError::with_detail(
                ErrorKind::InvalidEncoding, detail, start
            ))
        };
        if content.is_empty() {
            return err("OBJECT IDENTIFIER with empty content")
        }
        let mut len = 0;
        for &octet in content.iter() {
            if len == 0 && octet == 0x80 {
                return err("padded subidentifier")
            }
            len += 1;
            if len > 9 {
                return err("subidentifier too large")
            }
            if octet & 0x80 == 0 {
                len = 0;
            }
        }
        if len != 0 {
            return err("truncated subidentifier")
        }
        Ok(Self(content))
    }

    /// Returns the content octets of the value.
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// Returns an iterator over the components.
    pub fn iter(&self) -> Arcs<'_> {
        Arcs { data: &self.0, pending: None, first: true }
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for arc in self.iter() {
            if first {
                write!(f, "{}", arc)?;
                first = false;
            }
            else {
                write!(f, ".{}", arc)?;
            }
        }
        Ok(())
    }
}


//------------ Arcs ----------------------------------------------------------

/// An iterator over the components of an object identifier.
pub struct Arcs<'a> {
    data: &'a [u8],
    pending: Option<u64>,
    first: bool,
}

impl<'a> Iterator for Arcs<'a> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if let Some(arc) = self.pending.take() {
            return Some(arc)
        }
        if self.data.is_empty() {
            return None
        }
        let mut res = 0u64;
        while let Some((&octet, tail)) = self.data.split_first() {
            self.data = tail;
            res = res << 7 | (octet & 0x7f) as u64;
            if octet & 0x80 == 0 {
                break
            }
        }
        if self.first {
            self.first = false;
            // The first two components share one subidentifier.
            let (head, tail) = if res < 40 { (0, res) }
                else if res < 80 { (1, res - 40) }
                else { (2, res - 80) };
            self.pending = Some(tail);
            Some(head)
        }
        else {
            Some(res)
        }
    }
}


//============ Materialization ===============================================

impl<'a, M: Mode, R: io::Read> Object<'a, M, R> {
    /// Materializes the value into an owned [`Value`].
    ///
    /// This reads the entire content, interprets the universal types the
    /// crate knows, and recurses into constructed values up to
    /// [`MAX_DEPTH`] levels deep.
    pub fn into_value(self) -> Result<Value, DecodeError> {
        from_object(self, 0)
    }
}

fn from_object<M: Mode, R: io::Read>(
    obj: Object<'_, M, R>, depth: usize
) -> Result<Value, DecodeError> {
    if depth >= MAX_DEPTH {
        return Err(DecodeError::with_detail(
            ErrorKind::InvalidEncoding, "nesting too deep", obj.start()
        ))
    }
    match obj {
        Object::Primitive(prim) => from_primitive(prim),
        Object::Constructed(cons) => from_constructed(cons, depth),
        Object::Tagged(tagged) => from_tagged(tagged, depth),
    }
}

fn from_primitive<M: Mode, R: io::Read>(
    mut prim: Primitive<'_, M, R>
) -> Result<Value, DecodeError> {
    let tag = prim.tag();
    let start = prim.start();
    if !tag.is_universal() {
        // Relabeled by an implicit resolution; keep the raw content.
        let content = prim.read_all()?;
        return Ok(Value::Tagged(
            TaggedValue::new(tag, Content::Primitive(content))
        ))
    }
    match tag {
        Tag::BOOLEAN => {
            if prim.remaining() != 1 {
                return Err(prim.err_at_start("BOOLEAN with invalid length"))
            }
            let octet = prim.read_u8()?;
            if M::IS_RESTRICTED && octet != 0 && octet != 0xff {
                return Err(prim.err_at_start(
                    "BOOLEAN with non-canonical content"
                ))
            }
            Ok(Value::Boolean(octet != 0))
        }
        Tag::INTEGER => {
            Ok(Value::Integer(
                Integer::from_content(prim.read_all()?, start)?
            ))
        }
        Tag::ENUMERATED => {
            Ok(Value::Enumerated(
                Integer::from_content(prim.read_all()?, start)?
            ))
        }
        Tag::BIT_STRING => {
            let content = prim.read_all()?;
            let (unused, _) = bit_string_content::<M>(&content, start)?;
            Ok(Value::BitString(BitString::new(unused, content.slice(1..))))
        }
        Tag::OCTET_STRING => Ok(Value::OctetString(prim.read_all()?)),
        Tag::NULL => {
            if prim.remaining() != 0 {
                return Err(prim.err_at_start("NULL with content octets"))
            }
            Ok(Value::Null)
        }
        Tag::OID => {
            Ok(Value::Oid(Oid::from_content(prim.read_all()?, start)?))
        }
        Tag::UTF8_STRING => {
            let content = prim.read_all()?;
            match str::from_utf8(&content) {
                Ok(s) => Ok(Value::Utf8String(s.into())),
                Err(_) => {
                    Err(prim.err_at_start("invalid UTF-8 in UTF8String"))
                }
            }
        }
        Tag::SEQUENCE | Tag::SET => {
            Err(prim.err_at_start("constructed type encoded as primitive"))
        }
        _ => {
            Ok(Value::Other(
                OtherValue::new(tag, Content::Primitive(prim.read_all()?))
            ))
        }
    }
}

fn from_constructed<M: Mode, R: io::Read>(
    mut cons: Constructed<'_, M, R>, depth: usize
) -> Result<Value, DecodeError> {
    let tag = cons.tag();
    let start = cons.start();
    if !tag.is_universal() {
        // Relabeled by an implicit resolution; keep the content as is.
        let children = collect_children(&mut cons, depth)?;
        return Ok(Value::Tagged(
            TaggedValue::new(tag, Content::Constructed(children))
        ))
    }
    match tag {
        Tag::SEQUENCE => {
            Ok(Value::Sequence(collect_children(&mut cons, depth)?))
        }
        Tag::SET => Ok(Value::Set(collect_children(&mut cons, depth)?)),
        Tag::OCTET_STRING | Tag::UTF8_STRING => {
            if M::IS_RESTRICTED {
                return Err(DecodeError::with_detail(
                    ErrorKind::InvalidEncoding,
                    "constructed string not allowed here", start
                ))
            }
            let mut octets = Vec::new();
            collect_octets(&mut cons, tag, depth, &mut octets)?;
            if tag == Tag::OCTET_STRING {
                Ok(Value::OctetString(octets.into()))
            }
            else {
                match String::from_utf8(octets) {
                    Ok(s) => Ok(Value::Utf8String(s)),
                    Err(_) => {
                        Err(DecodeError::with_detail(
                            ErrorKind::InvalidEncoding,
                            "invalid UTF-8 in UTF8String", start
                        ))
                    }
                }
            }
        }
        Tag::BIT_STRING => {
            if M::IS_RESTRICTED {
                return Err(DecodeError::with_detail(
                    ErrorKind::InvalidEncoding,
                    "constructed string not allowed here", start
                ))
            }
            let mut octets = Vec::new();
            let mut unused = 0;
            collect_bits(&mut cons, depth, &mut octets, &mut unused)?;
            Ok(Value::BitString(BitString::new(unused, octets.into())))
        }
        Tag::BOOLEAN | Tag::INTEGER | Tag::ENUMERATED | Tag::NULL
        | Tag::OID => {
            Err(DecodeError::with_detail(
                ErrorKind::InvalidEncoding,
                "primitive type encoded as constructed", start
            ))
        }
        _ => {
            Ok(Value::Other(OtherValue::new(
                tag, Content::Constructed(collect_children(&mut cons, depth)?)
            )))
        }
    }
}

fn from_tagged<M: Mode, R: io::Read>(
    tagged: TaggedObject<'_, M, R>, depth: usize
) -> Result<Value, DecodeError> {
    let (tag, constructed, start, mut region) = tagged.into_parts();
    if constructed {
        let mut children = Vec::new();
        while let Some(obj) = region.next_object::<M>()? {
            children.push(from_object(obj, depth + 1)?);
        }
        Ok(Value::Tagged(
            TaggedValue::new(tag, Content::Constructed(children))
        ))
    }
    else {
        let mut prim = Primitive::<M, R>::new(tag, start, region);
        let content = prim.read_all()?;
        Ok(Value::Tagged(TaggedValue::new(tag, Content::Primitive(content))))
    }
}

fn collect_children<M: Mode, R: io::Read>(
    cons: &mut Constructed<'_, M, R>, depth: usize
) -> Result<Vec<Value>, DecodeError> {
    let mut res = Vec::new();
    while let Some(obj) = cons.next_object()? {
        res.push(from_object(obj, depth + 1)?);
    }
    Ok(res)
}

/// Gathers the segments of a constructed string value under BER.
///
/// Every segment must carry the tag of the overall string and can itself
/// be constructed again.
fn collect_octets<M: Mode, R: io::Read>(
    cons: &mut Constructed<'_, M, R>,
    tag: Tag,
    depth: usize,
    out: &mut Vec<u8>,
) -> Result<(), DecodeError> {
    if depth >= MAX_DEPTH {
        return Err(DecodeError::with_detail(
            ErrorKind::InvalidEncoding, "nesting too deep", cons.start()
        ))
    }
    while let Some(obj) = cons.next_object()? {
        if obj.tag() != tag {
            return Err(DecodeError::with_detail(
                ErrorKind::InvalidEncoding,
                "string segment with foreign tag", obj.start()
            ))
        }
        match obj {
            Object::Primitive(mut prim) => {
                let content = prim.read_all()?;
                out.extend_from_slice(&content);
            }
            Object::Constructed(mut inner) => {
                collect_octets(&mut inner, tag, depth + 1, out)?;
            }
            Object::Tagged(inner) => {
                return Err(DecodeError::with_detail(
                    ErrorKind::InvalidEncoding,
                    "string segment with foreign tag", inner.start()
                ))
            }
        }
    }
    Ok(())
}

/// Gathers the segments of a constructed BIT STRING under BER.
///
/// Only the final segment can have unused bits, so `unused` is the number
/// of unused bits in the last segment seen so far and must be zero when
/// another segment turns up.
fn collect_bits<M: Mode, R: io::Read>(
    cons: &mut Constructed<'_, M, R>,
    depth: usize,
    out: &mut Vec<u8>,
    unused: &mut u8,
) -> Result<(), DecodeError> {
    if depth >= MAX_DEPTH {
        return Err(DecodeError::with_detail(
            ErrorKind::InvalidEncoding, "nesting too deep", cons.start()
        ))
    }
    while let Some(obj) = cons.next_object()? {
        if obj.tag() != Tag::BIT_STRING {
            return Err(DecodeError::with_detail(
                ErrorKind::InvalidEncoding,
                "string segment with foreign tag", obj.start()
            ))
        }
        if *unused != 0 {
            return Err(DecodeError::with_detail(
                ErrorKind::InvalidEncoding,
                "BIT STRING segment after partial segment", obj.start()
            ))
        }
        match obj {
            Object::Primitive(mut prim) => {
                let start = prim.start();
                let content = prim.read_all()?;
                let (segment_unused, data) =
                    bit_string_content::<M>(&content, start)?;
                out.extend_from_slice(data);
                *unused = segment_unused;
            }
            Object::Constructed(mut inner) => {
                collect_bits(&mut inner, depth + 1, out, unused)?;
            }
            Object::Tagged(inner) => {
                return Err(DecodeError::with_detail(
                    ErrorKind::InvalidEncoding,
                    "string segment with foreign tag", inner.start()
                ))
            }
        }
    }
    Ok(())
}

/// Splits BIT STRING content octets into the unused count and the bits.
fn bit_string_content<M: Mode>(
    content: &[u8], start: Pos
) -> Result<(u8, &[u8]), DecodeError> {
    let err = |detail| {
        Err(DecodeError::with_detail(
            ErrorKind::InvalidEncoding, detail, start
        ))
    };
    let (&unused, data) = match content.split_first() {
        Some(split) => split,
        None => return err("BIT STRING without initial octet"),
    };
    if unused > 7 {
        return err("invalid number of unused bits")
    }
    if data.is_empty() && unused != 0 {
        return err("unused bits in empty BIT STRING")
    }
    if M::IS_RESTRICTED && unused > 0 {
        if let Some(&last) = data.last() {
            if last & ((1 << unused) - 1) != 0 {
                return err("unused bits not zero")
            }
        }
    }
    Ok((unused, data))
}


//============ Tests =========================================================
