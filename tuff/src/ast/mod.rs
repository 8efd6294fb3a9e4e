//! AST node definitions

mod expr;
mod span;
mod stmt;
mod types;

pub use expr::{BinOp, Expr, MatchArm, Pattern, UnOp};
pub use span::{Span, Spanned};
pub use stmt::{AssignTarget, FnDef, Param, Program, Stmt};
pub use types::{IntTag, Signedness, TypeExpr, Width};
