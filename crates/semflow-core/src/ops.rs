//! Operator and conversion classifications.
//!
//! Both the bound tree and the operation tree use these: type checking
//! decides them, lowering carries them through unchanged.

use std::fmt;

use crate::SymbolId;

/// Binary operators after overload resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperatorKind {
    // Arithmetic operators
    /// `+`
    Add,
    /// `-`
    Subtract,
    /// `*`
    Multiply,
    /// `/`
    Divide,
    /// `%`
    Remainder,

    // Bitwise operators
    /// `<<`
    LeftShift,
    /// `>>`
    RightShift,
    /// `&` (also non-short-circuit logical and on bools)
    And,
    /// `|`
    Or,
    /// `^`
    ExclusiveOr,

    // Short-circuit operators
    /// `&&`
    ConditionalAnd,
    /// `||`
    ConditionalOr,

    // Equality and relational operators
    /// `==`
    Equals,
    /// `!=`
    NotEquals,
    /// `<`
    LessThan,
    /// `<=`
    LessThanOrEqual,
    /// `>`
    GreaterThan,
    /// `>=`
    GreaterThanOrEqual,
}

impl BinaryOperatorKind {
    /// Short-circuiting operators branch and are linearized by the flow
    /// graph builder.
    pub fn is_short_circuit(self) -> bool {
        matches!(self, Self::ConditionalAnd | Self::ConditionalOr)
    }

    /// Operators that always produce `bool`.
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Equals
                | Self::NotEquals
                | Self::LessThan
                | Self::LessThanOrEqual
                | Self::GreaterThan
                | Self::GreaterThanOrEqual
        )
    }

    /// Operators allowed in relational patterns.
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            Self::LessThan | Self::LessThanOrEqual | Self::GreaterThan | Self::GreaterThanOrEqual
        )
    }
}

impl fmt::Display for BinaryOperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Add => "Add",
            Self::Subtract => "Subtract",
            Self::Multiply => "Multiply",
            Self::Divide => "Divide",
            Self::Remainder => "Remainder",
            Self::LeftShift => "LeftShift",
            Self::RightShift => "RightShift",
            Self::And => "And",
            Self::Or => "Or",
            Self::ExclusiveOr => "ExclusiveOr",
            Self::ConditionalAnd => "ConditionalAnd",
            Self::ConditionalOr => "ConditionalOr",
            Self::Equals => "Equals",
            Self::NotEquals => "NotEquals",
            Self::LessThan => "LessThan",
            Self::LessThanOrEqual => "LessThanOrEqual",
            Self::GreaterThan => "GreaterThan",
            Self::GreaterThanOrEqual => "GreaterThanOrEqual",
        };
        f.write_str(name)
    }
}

/// Unary prefix operators. Increment and decrement are separate nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperatorKind {
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `!`
    Not,
    /// `~`
    BitwiseNegation,
}

impl fmt::Display for UnaryOperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Plus => "Plus",
            Self::Minus => "Minus",
            Self::Not => "Not",
            Self::BitwiseNegation => "BitwiseNegation",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Conversions
// ============================================================================

/// How a value is converted from its natural type to the target type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversionKind {
    Identity,
    Numeric,
    Reference,
    Boxing,
    Unboxing,
    NullLiteral,
    UserDefined,
    /// Method group to delegate or function pointer.
    MethodGroup,
    Pointer,
    Dynamic,
    /// No conversion exists; the node is in error.
    NoConversion,
}

/// A conversion classified by type checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Conversion {
    pub kind: ConversionKind,
    pub exists: bool,
    /// Not written in source.
    pub is_implicit: bool,
    /// Operator method of a user-defined conversion.
    pub method: Option<SymbolId>,
}

impl Conversion {
    pub const fn new(kind: ConversionKind, is_implicit: bool) -> Self {
        Self {
            kind,
            exists: !matches!(kind, ConversionKind::NoConversion),
            is_implicit,
            method: None,
        }
    }

    pub const fn identity() -> Self {
        Self::new(ConversionKind::Identity, true)
    }

    /// A conversion type checking could not find.
    pub const fn none(is_implicit: bool) -> Self {
        Self::new(ConversionKind::NoConversion, is_implicit)
    }

    pub const fn user_defined(method: SymbolId, is_implicit: bool) -> Self {
        Self {
            method: Some(method),
            ..Self::new(ConversionKind::UserDefined, is_implicit)
        }
    }

    pub fn is_identity(&self) -> bool {
        self.kind == ConversionKind::Identity
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == ConversionKind::Numeric
    }

    pub fn is_reference(&self) -> bool {
        self.kind == ConversionKind::Reference
    }

    pub fn is_user_defined(&self) -> bool {
        self.kind == ConversionKind::UserDefined
    }
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Conversion (Exists: {}, IsIdentity: {}, IsNumeric: {}, IsReference: {}, IsUserDefined: {})",
            self.exists,
            self.is_identity(),
            self.is_numeric(),
            self.is_reference(),
            self.is_user_defined()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_conversion_does_not_exist() {
        assert!(!Conversion::none(true).exists);
        assert!(Conversion::identity().exists);
        assert!(Conversion::identity().is_identity());
    }

    #[test]
    fn operator_classes() {
        assert!(BinaryOperatorKind::ConditionalOr.is_short_circuit());
        assert!(!BinaryOperatorKind::Or.is_short_circuit());
        assert!(BinaryOperatorKind::LessThan.is_relational());
        assert!(!BinaryOperatorKind::Equals.is_relational());
        assert!(BinaryOperatorKind::Equals.is_comparison());
    }

    #[test]
    fn conversion_display() {
        let text = Conversion::new(ConversionKind::Numeric, true).to_string();
        assert_eq!(
            text,
            "Conversion (Exists: true, IsIdentity: false, IsNumeric: true, IsReference: false, IsUserDefined: false)"
        );
    }
}
