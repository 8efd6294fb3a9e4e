//! Tree-walking interpreter

mod env;
mod error;
mod eval;
mod value;

pub use env::{Binding, Environment};
pub use error::{ErrorKind, InterpResult, RuntimeError};
pub use eval::Interpreter;
pub use value::{ArrayValue, Value};
