//! Statement nodes, function definitions and the program root

use super::expr::{BinOp, Expr};
use super::span::Spanned;
use super::types::TypeExpr;
use serde::{Deserialize, Serialize};

/// A function parameter with an optional declared type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: Option<TypeExpr>,
}

/// A function definition, named (`fn add(..) => ..`) or anonymous.
///
/// `body` is `None` for `extern fn` declarations, which are dispatched to a
/// built-in implementation by name at call time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FnDef {
    pub name: Option<String>,
    pub type_params: Vec<String>,
    pub params: Vec<Param>,
    pub ret: Option<TypeExpr>,
    pub body: Option<Box<Spanned<Expr>>>,
}

/// The left-hand side of an assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AssignTarget {
    Name(String),
    Index { name: String, index: Spanned<Expr> },
    Field { name: String, field: String },
}

/// Statement nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Let {
        name: String,
        mutable: bool,
        ty: Option<TypeExpr>,
        init: Option<Spanned<Expr>>,
    },
    /// `target = value` or a compound form (`op` carries the `+` of `+=`)
    Assign {
        target: AssignTarget,
        op: Option<BinOp>,
        value: Spanned<Expr>,
    },
    Fn(FnDef),
    TypeAlias {
        name: String,
        ty: TypeExpr,
    },
    StructDef {
        name: String,
        fields: Vec<(String, TypeExpr)>,
    },
    Module {
        name: String,
        body: Vec<Spanned<Stmt>>,
    },
    While {
        cond: Spanned<Expr>,
        body: Box<Spanned<Stmt>>,
    },
    /// Statement-level `if (cond) stmt [else stmt]`; unlike the expression
    /// form the `else` is optional, so it can guard `break`/`continue`
    If {
        cond: Spanned<Expr>,
        then_branch: Box<Spanned<Stmt>>,
        else_branch: Option<Box<Spanned<Stmt>>>,
    },
    Break,
    Continue,
    Return(Option<Spanned<Expr>>),
    Expr(Spanned<Expr>),
}

/// A parsed program: the top-level statement sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub stmts: Vec<Spanned<Stmt>>,
}
