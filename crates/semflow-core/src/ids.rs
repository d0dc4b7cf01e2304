//! Index newtypes shared by the builders.
//!
//! Every id is a dense `u32` index into a per-body (or per-table) arena.
//! Keeping them distinct types stops a block ordinal from being used where
//! a capture id is expected.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// Create an id from a raw index.
            #[inline]
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            /// Get the underlying index.
            #[inline]
            pub const fn index(self) -> u32 {
                self.0
            }

            /// The index as a `usize`, for arena access.
            #[inline]
            pub const fn as_usize(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl From<u32> for $name {
            fn from(index: u32) -> Self {
                Self::new(index)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id!(
    /// Handle into a [`SymbolTable`](crate::SymbolTable).
    SymbolId,
    "sym"
);

define_id!(
    /// A jump target resolved by the binder (loop break/continue, switch
    /// exit, user label).
    LabelId,
    "L"
);

define_id!(
    /// Identifies a transient value slot inside one body's flow graph.
    ///
    /// Allocated densely in the order the first capture is emitted.
    CaptureId,
    ""
);

define_id!(
    /// Ordinal of a basic block; the entry block is always `B0`.
    BlockId,
    "B"
);

define_id!(
    /// Index of a region in a flow graph's region tree; the root is `R0`.
    RegionId,
    "R"
);
