//! Compile-time constant values.
//!
//! Bound nodes and operations carry an optional [`ConstantValue`]. Floats
//! are wrapped in [`OrderedFloat`] so constants stay `Eq + Hash` and whole
//! operation trees can be compared in tests.

use std::fmt;

use ordered_float::OrderedFloat;

/// A value known at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstantValue {
    /// The null literal (or a defaulted reference type).
    Null,
    Bool(bool),
    Char(char),
    /// Any signed integer, widened to 64 bits.
    Int(i64),
    /// Any unsigned integer, widened to 64 bits.
    UInt(u64),
    Float(OrderedFloat<f64>),
    String(String),
}

impl ConstantValue {
    /// Convenience for building float constants.
    pub fn float(value: f64) -> Self {
        ConstantValue::Float(OrderedFloat(value))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstantValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Widen any integral value (including `char`) to `i128`.
    pub fn as_integer(&self) -> Option<i128> {
        match self {
            ConstantValue::Int(v) => Some(*v as i128),
            ConstantValue::UInt(v) => Some(*v as i128),
            ConstantValue::Char(c) => Some(*c as u32 as i128),
            _ => None,
        }
    }

    /// Any numeric value as `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConstantValue::Float(v) => Some(v.0),
            ConstantValue::Int(v) => Some(*v as f64),
            ConstantValue::UInt(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstantValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConstantValue::Null)
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Null => write!(f, "null"),
            ConstantValue::Bool(true) => write!(f, "True"),
            ConstantValue::Bool(false) => write!(f, "False"),
            ConstantValue::Char(c) => write!(f, "{c:?}"),
            ConstantValue::Int(v) => write!(f, "{v}"),
            ConstantValue::UInt(v) => write!(f, "{v}"),
            ConstantValue::Float(v) => write!(f, "{}", v.0),
            ConstantValue::String(s) => write!(f, "\"{s}\""),
        }
    }
}

impl From<bool> for ConstantValue {
    fn from(value: bool) -> Self {
        ConstantValue::Bool(value)
    }
}

impl From<i32> for ConstantValue {
    fn from(value: i32) -> Self {
        ConstantValue::Int(value as i64)
    }
}

impl From<i64> for ConstantValue {
    fn from(value: i64) -> Self {
        ConstantValue::Int(value)
    }
}

impl From<&str> for ConstantValue {
    fn from(value: &str) -> Self {
        ConstantValue::String(value.to_string())
    }
}
