//! Lexer built on logos

mod token;

pub use token::{IntLit, Token};

use crate::ast::Span;
use crate::error::{CompileError, Result};
use logos::Logos;

/// Tokenize source text into (token, span) pairs
pub fn tokenize(source: &str) -> Result<Vec<(Token, Span)>> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::from(lexer.span());
        match result {
            Ok(token) => tokens.push((token, span)),
            Err(()) => {
                return Err(CompileError::lexer(
                    format!("unexpected character: {:?}", &source[lexer.span()]),
                    span,
                ));
            }
        }
    }

    Ok(tokens)
}
