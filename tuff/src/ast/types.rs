//! Type expressions and integer width tags

use num_bigint::BigInt;
use num_traits::One;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signedness half of an integer tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Signedness {
    Signed,
    Unsigned,
}

/// Width half of an integer tag; `Size` is the pointer width (64-bit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Width {
    W8,
    W16,
    W32,
    W64,
    Size,
}

impl Width {
    pub fn bits(self) -> u32 {
        match self {
            Width::W8 => 8,
            Width::W16 => 16,
            Width::W32 => 32,
            Width::W64 | Width::Size => 64,
        }
    }
}

/// A sized-integer tag such as `U8` or `ISize`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntTag {
    pub signedness: Signedness,
    pub width: Width,
}

impl IntTag {
    pub fn new(signedness: Signedness, width: Width) -> Self {
        IntTag { signedness, width }
    }

    /// Parse a tag name like `U8` or `ISize`
    pub fn from_name(name: &str) -> Option<IntTag> {
        let (signedness, rest) = if let Some(rest) = name.strip_prefix('U') {
            (Signedness::Unsigned, rest)
        } else if let Some(rest) = name.strip_prefix('I') {
            (Signedness::Signed, rest)
        } else {
            return None;
        };
        let width = match rest {
            "8" => Width::W8,
            "16" => Width::W16,
            "32" => Width::W32,
            "64" => Width::W64,
            "Size" => Width::Size,
            _ => return None,
        };
        Some(IntTag { signedness, width })
    }

    pub fn min(&self) -> BigInt {
        match self.signedness {
            Signedness::Unsigned => BigInt::ZERO,
            Signedness::Signed => -(BigInt::one() << (self.width.bits() - 1)),
        }
    }

    pub fn max(&self) -> BigInt {
        match self.signedness {
            Signedness::Unsigned => (BigInt::one() << self.width.bits()) - 1,
            Signedness::Signed => (BigInt::one() << (self.width.bits() - 1)) - 1,
        }
    }

    pub fn contains(&self, value: &BigInt) -> bool {
        *value >= self.min() && *value <= self.max()
    }
}

impl fmt::Display for IntTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = match self.signedness {
            Signedness::Unsigned => "U",
            Signedness::Signed => "I",
        };
        let width = match self.width {
            Width::W8 => "8",
            Width::W16 => "16",
            Width::W32 => "32",
            Width::W64 => "64",
            Width::Size => "Size",
        };
        write!(f, "{sign}{width}")
    }
}

/// A declared (static) type expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypeExpr {
    /// A sized integer such as `I32`
    Int(IntTag),
    /// `Bool`
    Bool,
    /// `String`
    Str,
    /// `[T]`, `[T; len]` or `[T; len; cap]`
    Array {
        elem: Box<TypeExpr>,
        len: Option<u64>,
        capacity: Option<u64>,
    },
    /// `fn(T1, T2): Rt`
    Fn {
        params: Vec<TypeExpr>,
        ret: Option<Box<TypeExpr>>,
    },
    /// Ordered struct fields, registered via a `struct` declaration
    Struct(Vec<(String, TypeExpr)>),
    /// An alias or type variable, resolved (or not) at evaluation time
    Named(String),
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Int(tag) => write!(f, "{tag}"),
            TypeExpr::Bool => write!(f, "Bool"),
            TypeExpr::Str => write!(f, "String"),
            TypeExpr::Array { elem, len, capacity } => match (len, capacity) {
                (Some(l), Some(c)) => write!(f, "[{elem}; {l}; {c}]"),
                (Some(l), None) => write!(f, "[{elem}; {l}]"),
                _ => write!(f, "[{elem}]"),
            },
            TypeExpr::Fn { params, ret } => {
                write!(f, "fn(")?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ")")?;
                if let Some(ret) = ret {
                    write!(f, ": {ret}")?;
                }
                Ok(())
            }
            TypeExpr::Struct(fields) => {
                write!(f, "{{ ")?;
                for (i, (name, ty)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name} : {ty}")?;
                }
                write!(f, " }}")
            }
            TypeExpr::Named(name) => write!(f, "{name}"),
        }
    }
}
