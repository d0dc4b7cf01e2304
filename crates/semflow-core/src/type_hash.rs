//! Deterministic hash-based type identity.
//!
//! [`TypeHash`] identifies a type by a 64-bit hash of its display name.
//! Hashes are computed, not allocated, so the binder, the operation builder
//! and the dumpers agree on identities without sharing a counter, and the
//! well-known primitives are compile-time constants.
//!
//! # Examples
//!
//! ```
//! use semflow_core::{TypeHash, primitives};
//!
//! assert_eq!(TypeHash::from_name("int"), primitives::INT32);
//! let ptr = TypeHash::pointer_to(primitives::INT32);
//! assert_ne!(ptr, primitives::INT32);
//! ```

use std::fmt;
use xxhash_rust::const_xxh64::xxh64;

/// Domain-specific mixing constants.
///
/// Keep derived identities (pointers, constructed generics) apart from plain
/// names even when the spelled names coincide.
pub mod hash_constants {
    /// Domain marker for named types
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;

    /// Domain marker for pointer types
    pub const POINTER: u64 = 0x6a09e667f3bcc909;

    /// Domain marker for constructed generic types
    pub const CONSTRUCTED: u64 = 0xbb67ae8584caa73b;

    /// Multiplier mixing generic argument positions
    pub const SEP: u64 = 0x4bc94d6bd06053ad;
}

/// A deterministic 64-bit type identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty hash, never produced by [`TypeHash::from_name`] for real names.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Hash of a type's display name.
    #[inline]
    pub const fn from_name(name: &str) -> Self {
        TypeHash(hash_constants::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Hash of the unmanaged pointer type `element*`.
    #[inline]
    pub const fn pointer_to(element: TypeHash) -> Self {
        TypeHash(hash_constants::POINTER ^ element.0.rotate_left(17))
    }

    /// Hash of a constructed generic type; argument order matters.
    pub fn constructed(definition: TypeHash, args: &[TypeHash]) -> Self {
        let mut hash = hash_constants::CONSTRUCTED ^ definition.0;
        for (i, arg) in args.iter().enumerate() {
            hash = hash
                .wrapping_mul(hash_constants::SEP)
                .wrapping_add(arg.0 ^ (i as u64 + 1));
        }
        TypeHash(hash)
    }

    /// Check if this is the empty hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Well-known hashes for the built-in types.
pub mod primitives {
    use super::TypeHash;

    pub const VOID: TypeHash = TypeHash::from_name("void");
    pub const BOOL: TypeHash = TypeHash::from_name("bool");
    pub const CHAR: TypeHash = TypeHash::from_name("char");
    pub const INT8: TypeHash = TypeHash::from_name("sbyte");
    pub const UINT8: TypeHash = TypeHash::from_name("byte");
    pub const INT16: TypeHash = TypeHash::from_name("short");
    pub const UINT16: TypeHash = TypeHash::from_name("ushort");
    pub const INT32: TypeHash = TypeHash::from_name("int");
    pub const UINT32: TypeHash = TypeHash::from_name("uint");
    pub const INT64: TypeHash = TypeHash::from_name("long");
    pub const UINT64: TypeHash = TypeHash::from_name("ulong");
    pub const FLOAT: TypeHash = TypeHash::from_name("float");
    pub const DOUBLE: TypeHash = TypeHash::from_name("double");
    pub const STRING: TypeHash = TypeHash::from_name("string");
    pub const OBJECT: TypeHash = TypeHash::from_name("object");

    /// The dynamic escape hatch: member lookups are deferred to run time.
    pub const DYNAMIC: TypeHash = TypeHash::from_name("dynamic");

    /// The error type produced when binding fails; displayed as `?`.
    pub const ERROR: TypeHash = TypeHash::from_name("?");

    /// Base type of every caught exception.
    pub const EXCEPTION: TypeHash = TypeHash::from_name("System.Exception");

    /// `?*`, the type of an address-of whose operand failed to bind.
    pub const ERROR_POINTER: TypeHash = TypeHash::pointer_to(ERROR);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_is_deterministic() {
        assert_eq!(TypeHash::from_name("Widget"), TypeHash::from_name("Widget"));
        assert_ne!(TypeHash::from_name("Widget"), TypeHash::from_name("widget"));
    }

    #[test]
    fn primitives_are_distinct() {
        let all = [
            primitives::VOID,
            primitives::BOOL,
            primitives::CHAR,
            primitives::INT8,
            primitives::UINT8,
            primitives::INT16,
            primitives::UINT16,
            primitives::INT32,
            primitives::UINT32,
            primitives::INT64,
            primitives::UINT64,
            primitives::FLOAT,
            primitives::DOUBLE,
            primitives::STRING,
            primitives::OBJECT,
            primitives::DYNAMIC,
            primitives::ERROR,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn pointer_differs_from_element() {
        let p = TypeHash::pointer_to(primitives::INT32);
        assert_ne!(p, primitives::INT32);
        assert_ne!(p, TypeHash::pointer_to(primitives::INT64));
        assert_eq!(primitives::ERROR_POINTER, TypeHash::pointer_to(primitives::ERROR));
    }

    #[test]
    fn constructed_argument_order_matters() {
        let dict = TypeHash::from_name("Dictionary");
        let a = TypeHash::constructed(dict, &[primitives::INT32, primitives::STRING]);
        let b = TypeHash::constructed(dict, &[primitives::STRING, primitives::INT32]);
        assert_ne!(a, b);
    }
}
