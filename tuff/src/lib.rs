//! Tuff - a small statically-flavored expression language
//!
//! Pipeline: `lexer` tokenizes, `parser` builds a spanned AST, `interp`
//! walks it. `linker` combines multi-file programs into one source text
//! before the pipeline runs.

pub mod ast;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod linker;
pub mod parser;
pub mod repl;

pub use error::{CompileError, Error};
pub use interp::{Interpreter, RuntimeError, Value};

use std::collections::HashMap;

/// Interpret a single source text and return its display result: the last
/// statement's value, or the `print` output when any occurred
pub fn interpret(source: &str) -> Result<String, Error> {
    let tokens = lexer::tokenize(source)?;
    let program = parser::parse(tokens)?;
    let mut interpreter = Interpreter::new();
    let value = interpreter.run(&program)?;
    let output = interpreter.take_output();
    Ok(if output.is_empty() {
        value.render()
    } else {
        output
    })
}

/// Link the named sources into one program and interpret it
pub fn interpret_sources(
    main_name: &str,
    sources: &HashMap<String, String>,
) -> Result<String, Error> {
    let combined = linker::combine(main_name, sources)?;
    interpret(&combined)
}
