//! Expression nodes

use super::span::{Span, Spanned};
use super::stmt::{FnDef, Stmt};
use super::types::{IntTag, TypeExpr};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnOp {
    /// Boolean negation `!`
    Not,
}

/// A `match` arm pattern: a literal or the wildcard `_`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Pattern {
    Int { value: BigInt, tag: Option<IntTag> },
    Bool(bool),
    Wildcard,
}

/// One `case pattern => result;` arm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchArm {
    pub pattern: Pattern,
    pub result: Spanned<Expr>,
    pub span: Span,
}

/// Expression nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Integer literal with optional width tag, sign folded in
    Int { value: BigInt, tag: Option<IntTag> },
    Bool(bool),
    /// String or character literal
    Str { text: String, is_char: bool },
    /// `[e1, e2, ...]`
    Array(Vec<Spanned<Expr>>),
    Ident(String),
    /// `Module::name`
    ModuleAccess { module: String, name: String },
    /// Positional struct construction `Name { v1, v2 }`
    StructLit { name: String, args: Vec<Spanned<Expr>> },
    Unary {
        op: UnOp,
        operand: Box<Spanned<Expr>>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Spanned<Expr>>,
        rhs: Box<Spanned<Expr>>,
    },
    /// `value is Type`
    Is {
        operand: Box<Spanned<Expr>>,
        ty: TypeExpr,
    },
    Call {
        callee: Box<Spanned<Expr>>,
        type_args: Vec<TypeExpr>,
        args: Vec<Spanned<Expr>>,
    },
    /// `expr.name`
    Field {
        object: Box<Spanned<Expr>>,
        name: String,
    },
    /// `expr[index]`
    Index {
        object: Box<Spanned<Expr>>,
        index: Box<Spanned<Expr>>,
    },
    If {
        cond: Box<Spanned<Expr>>,
        then_branch: Box<Spanned<Expr>>,
        else_branch: Box<Spanned<Expr>>,
    },
    Match {
        control: Box<Spanned<Expr>>,
        arms: Vec<MatchArm>,
    },
    Block(Vec<Spanned<Stmt>>),
    /// Anonymous function literal `(a: T): R => body`
    FnLit(FnDef),
}
