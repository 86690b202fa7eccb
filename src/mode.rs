//! The encoding rules.
//!
//! BER gives an encoder choices: lengths can be definite or indefinite,
//! some content octets have alternative forms. DER takes all of these
//! choices away. Since the differences matter in many places all over the
//! decoder, the rules are represented by zero-sized marker types and a
//! trait with associated constants, so that checking them disappears
//! after monomorphisation.

/// Basic Encoding Rules.
///
/// These are the most flexible rules, allowing alternative encodings for
/// some types as well as indefinite length values.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Ber;

/// Distinguished Encoding Rules.
///
/// These rules always employ definite length values and require the
/// shortest possible encoding. Additional rules apply to some types.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Der;

/// One of the encoding rules.
pub trait Mode {
    /// Does this mode require the canonical form of encodings?
    ///
    /// If `true`, lengths must use their shortest form and content octets
    /// with alternative representations must use their canonical one.
    const IS_RESTRICTED: bool;

    /// Does this mode allow indefinite length values?
    const ALLOW_INDEFINITE: bool;
}

impl Mode for Ber {
    const IS_RESTRICTED: bool = false;
    const ALLOW_INDEFINITE: bool = true;
}

impl Mode for Der {
    const IS_RESTRICTED: bool = true;
    const ALLOW_INDEFINITE: bool = false;
}
