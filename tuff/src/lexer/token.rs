//! Token definitions for the Tuff lexer

use crate::ast::IntTag;
use logos::{Lexer, Logos};
use num_bigint::BigInt;

/// An integer literal: digits plus an optional width tag (`255U8`)
#[derive(Debug, Clone, PartialEq)]
pub struct IntLit {
    pub value: BigInt,
    pub tag: Option<IntTag>,
}

fn lex_int(lex: &mut Lexer<Token>) -> IntLit {
    let slice = lex.slice();
    let digits_end = slice
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(slice.len());
    let (digits, suffix) = slice.split_at(digits_end);
    // the regex guarantees well-formed digits and suffix
    let value = digits.parse::<BigInt>().unwrap_or_default();
    IntLit {
        value,
        tag: IntTag::from_name(suffix),
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn lex_string(lex: &mut Lexer<Token>) -> String {
    let slice = lex.slice();
    unescape(&slice[1..slice.len() - 1])
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    // Literals
    #[regex(r"[0-9]+((U|I)(8|16|32|64|Size))?", lex_int)]
    Int(IntLit),
    #[regex(r#""([^"\\]|\\.)*""#, lex_string)]
    Str(String),
    #[regex(r"'([^'\\]|\\.)'", lex_string)]
    Char(String),

    // Keywords
    #[token("let")]
    Let,
    #[token("mut")]
    Mut,
    #[token("fn")]
    Fn,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("while")]
    While,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("return")]
    Return,
    #[token("match")]
    Match,
    #[token("case")]
    Case,
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("is")]
    Is,
    #[token("type")]
    Type,
    #[token("struct")]
    Struct,
    #[token("module")]
    Module,
    #[token("extern")]
    Extern,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Ident(String),

    // Operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("%=")]
    PercentEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token(">=")]
    Ge,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Not,
    #[token("=")]
    Eq,
    #[token("=>")]
    Arrow,

    // Punctuation
    #[token("::")]
    ColonColon,
    #[token(":")]
    Colon,
    #[token(";")]
    Semi,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
}
