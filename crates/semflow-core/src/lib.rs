//! Core types shared by the semflow crates.
//!
//! - [`Span`]: source back-references
//! - [`TypeHash`] and [`primitives`]: deterministic type identities
//! - [`SymbolTable`]: arena of resolved symbols addressed by [`SymbolId`]
//! - [`ConstantValue`]: compile-time constants
//! - [`ops`]: operator and conversion classifications
//! - id newtypes for captures, blocks, regions and labels
//! - [`SymbolError`]

pub mod constant;
pub mod error;
pub mod ids;
pub mod ops;
pub mod span;
pub mod symbols;
pub mod type_hash;

pub use constant::ConstantValue;
pub use error::SymbolError;
pub use ids::{BlockId, CaptureId, LabelId, RegionId, SymbolId};
pub use ops::{BinaryOperatorKind, Conversion, ConversionKind, UnaryOperatorKind};
pub use span::Span;
pub use symbols::{
    EventSymbol, FieldSymbol, LocalSymbol, MethodKind, MethodSymbol, NumericKind, ParameterSymbol,
    PropertySymbol, RefKind, Symbol, SymbolTable, TypeEntry, TypeKind,
};
pub use type_hash::{TypeHash, hash_constants, primitives};
