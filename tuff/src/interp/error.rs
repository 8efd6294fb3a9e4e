//! Runtime errors and control-flow signals
//!
//! `break` and `return` travel through the same error channel as real
//! failures and are intercepted by loop and call sites; everything else
//! aborts the interpretation.

use super::value::Value;
use std::fmt;

/// Error kind, including the control-flow signals
#[derive(Debug, Clone)]
pub enum ErrorKind {
    UndefinedVariable,
    UndefinedField,
    MutationOfImmutable,
    DuplicateDeclaration,
    DivisionByZero,
    Range,
    UnsignedNegative,
    MixedType,
    Type,
    Arity,
    NoMatchingArm,
    IndexOutOfBounds,
    BreakOutsideLoop,
    ContinueOutsideLoop,
    ReturnOutsideFunction,
    /// `break` signal, caught by the nearest enclosing loop
    Break,
    /// `continue` signal, caught by the nearest enclosing loop
    Continue,
    /// `return` signal carrying the value, caught by the call site
    Return(Box<Value>),
}

impl PartialEq for ErrorKind {
    fn eq(&self, other: &Self) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// Runtime error with a typed kind and human-readable message
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub kind: ErrorKind,
    pub message: String,
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Runtime error: {}", self.message)
    }
}

impl std::error::Error for RuntimeError {}

pub type InterpResult<T> = Result<T, RuntimeError>;

impl RuntimeError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        RuntimeError {
            kind,
            message: message.into(),
        }
    }

    pub fn undefined_variable(name: &str) -> Self {
        Self::new(
            ErrorKind::UndefinedVariable,
            format!("undefined variable: {name}"),
        )
    }

    pub fn undefined_module(name: &str) -> Self {
        Self::new(
            ErrorKind::UndefinedVariable,
            format!("undefined module: {name}"),
        )
    }

    pub fn undefined_field(name: &str) -> Self {
        Self::new(ErrorKind::UndefinedField, format!("unknown field: {name}"))
    }

    pub fn mutation_of_immutable(name: &str) -> Self {
        Self::new(
            ErrorKind::MutationOfImmutable,
            format!("cannot assign to immutable variable: {name}"),
        )
    }

    pub fn duplicate_declaration(name: &str) -> Self {
        Self::new(
            ErrorKind::DuplicateDeclaration,
            format!("duplicate declaration: {name}"),
        )
    }

    pub fn division_by_zero() -> Self {
        Self::new(ErrorKind::DivisionByZero, "division by zero")
    }

    pub fn range_error(value: impl fmt::Display, tag: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::Range,
            format!("value {value} out of range for {tag}"),
        )
    }

    pub fn unsigned_negative(tag: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::UnsignedNegative,
            format!("negative literal with unsigned tag {tag}"),
        )
    }

    pub fn mixed_types(a: impl fmt::Display, b: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::MixedType,
            format!("mixed integer types: {a} and {b}"),
        )
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Type, message)
    }

    pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> Self {
        Self::new(
            ErrorKind::Arity,
            format!("function {name} expects {expected} arguments, got {got}"),
        )
    }

    pub fn no_matching_arm(control: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::NoMatchingArm,
            format!("no matching arm for {control}"),
        )
    }

    pub fn index_out_of_bounds(index: impl fmt::Display, len: usize) -> Self {
        Self::new(
            ErrorKind::IndexOutOfBounds,
            format!("index {index} out of bounds (length {len})"),
        )
    }

    pub fn break_outside_loop() -> Self {
        Self::new(ErrorKind::BreakOutsideLoop, "break outside of loop")
    }

    pub fn continue_outside_loop() -> Self {
        Self::new(ErrorKind::ContinueOutsideLoop, "continue outside of loop")
    }

    pub fn return_outside_function() -> Self {
        Self::new(ErrorKind::ReturnOutsideFunction, "return outside of function")
    }

    pub fn brk() -> Self {
        Self::new(ErrorKind::Break, "break")
    }

    pub fn cont() -> Self {
        Self::new(ErrorKind::Continue, "continue")
    }

    pub fn ret(value: Value) -> Self {
        Self::new(ErrorKind::Return(Box::new(value)), "return")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_equality_ignores_payload() {
        let a = ErrorKind::Return(Box::new(Value::Bool(true)));
        let b = ErrorKind::Return(Box::new(Value::Bool(false)));
        assert_eq!(a, b);
        assert_ne!(a, ErrorKind::Break);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            RuntimeError::undefined_variable("x").message,
            "undefined variable: x"
        );
        assert_eq!(
            RuntimeError::arity_mismatch("add", 2, 3).message,
            "function add expects 2 arguments, got 3"
        );
    }
}
