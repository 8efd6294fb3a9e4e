//! Runtime values

use crate::ast::{FnDef, IntTag, TypeExpr};
use num_bigint::BigInt;
use std::fmt;
use std::rc::Rc;

/// An array value: logical elements plus a fill capacity.
///
/// `elems.len()` is the logical length; writes may land anywhere below
/// `capacity`, growing the logical length.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayValue {
    pub elems: Vec<Value>,
    pub elem_ty: Option<TypeExpr>,
    pub capacity: usize,
}

/// A runtime value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Arbitrary-precision integer with an optional width tag
    Int { value: BigInt, tag: Option<IntTag> },
    Bool(bool),
    /// Immutable text; `is_char` marks one-character strings produced by
    /// indexing, which display single-quoted
    Str { text: String, is_char: bool },
    Array(ArrayValue),
    /// Ordered fields, fixed at the owning type's declaration
    Struct {
        name: String,
        fields: Vec<(String, Value)>,
    },
    Fn(Rc<FnDef>),
}

impl Value {
    /// The untagged zero used for empty blocks and pending declarations
    pub fn untyped_zero() -> Value {
        Value::Int {
            value: BigInt::ZERO,
            tag: None,
        }
    }

    pub fn int(value: impl Into<BigInt>, tag: Option<IntTag>) -> Value {
        Value::Int {
            value: value.into(),
            tag,
        }
    }

    pub fn string(text: impl Into<String>) -> Value {
        Value::Str {
            text: text.into(),
            is_char: false,
        }
    }

    /// Coarse category used for operator kind checks
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Int { .. } => "integer",
            Value::Bool(_) => "boolean",
            Value::Str { is_char: true, .. } => "char",
            Value::Str { .. } => "string",
            Value::Array(_) => "array",
            Value::Struct { .. } => "struct",
            Value::Fn(_) => "function",
        }
    }

    /// The display form used for program output and `print`
    pub fn render(&self) -> String {
        match self {
            Value::Int { value, .. } => value.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Str { text, is_char: true } => format!("'{text}'"),
            Value::Str { text, .. } => format!("\"{text}\""),
            // arrays, structs and functions have no top-level display
            Value::Array(_) | Value::Struct { .. } | Value::Fn(_) => String::new(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_scalars() {
        assert_eq!(Value::int(42, None).render(), "42");
        assert_eq!(Value::int(-7, IntTag::from_name("I8")).render(), "-7");
        assert_eq!(Value::Bool(true).render(), "true");
        assert_eq!(Value::string("hi").render(), "\"hi\"");
        assert_eq!(
            Value::Str {
                text: "h".into(),
                is_char: true
            }
            .render(),
            "'h'"
        );
    }

    #[test]
    fn test_render_aggregates_empty() {
        let arr = Value::Array(ArrayValue {
            elems: vec![],
            elem_ty: None,
            capacity: 0,
        });
        assert_eq!(arr.render(), "");
        let st = Value::Struct {
            name: "P".into(),
            fields: vec![],
        };
        assert_eq!(st.render(), "");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(Value::int(1, None).kind_name(), "integer");
        assert_eq!(Value::Bool(false).kind_name(), "boolean");
        assert_eq!(Value::string("s").kind_name(), "string");
    }
}
