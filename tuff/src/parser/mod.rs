//! Recursive-descent parser
//!
//! Consumes the token stream into a spanned AST. The grammar needs
//! backtracking in two places: an opening paren may start a parenthesized
//! expression or an anonymous function literal, and `name <` may start a
//! generic call or a comparison. Both are handled by saving and restoring
//! the token position.

use crate::ast::{
    AssignTarget, BinOp, Expr, FnDef, IntTag, MatchArm, Param, Pattern, Program, Span, Spanned,
    Stmt, TypeExpr, UnOp,
};
use crate::error::{CompileError, Result};
use crate::lexer::Token;
use num_traits::ToPrimitive;

/// Parse a token stream into a program
pub fn parse(tokens: Vec<(Token, Span)>) -> Result<Program> {
    let mut parser = Parser {
        tokens,
        pos: 0,
        no_struct: false,
    };
    parser.parse_program()
}

struct Parser {
    tokens: Vec<(Token, Span)>,
    pos: usize,
    /// set while parsing a `match` control so `ident {` is not taken as a
    /// struct literal; reset inside any bracketed sub-expression
    no_struct: bool,
}

impl Parser {
    // ---- token plumbing ----

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some((_, span)) => *span,
            None => self
                .tokens
                .last()
                .map(|(_, s)| Span::new(s.end, s.end))
                .unwrap_or(Span::new(0, 0)),
        }
    }

    fn prev_span(&self) -> Span {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some((_, span)) => *span,
            None => Span::new(0, 0),
        }
    }

    fn prev_is_rbrace(&self) -> bool {
        matches!(
            self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)),
            Some((Token::RBrace, _))
        )
    }

    fn bump(&mut self) -> Option<(Token, Span)> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat(&mut self, token: Token) -> bool {
        if self.peek() == Some(&token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<Span> {
        if self.peek() == Some(&token) {
            let span = self.span();
            self.pos += 1;
            Ok(span)
        } else {
            Err(self.error(format!("expected {what}")))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<(String, Span)> {
        match self.peek() {
            Some(Token::Ident(_)) => match self.bump() {
                Some((Token::Ident(name), span)) => Ok((name, span)),
                _ => Err(self.error(format!("expected {what}"))),
            },
            _ => Err(self.error(format!("expected {what}"))),
        }
    }

    fn error(&self, message: impl Into<String>) -> CompileError {
        let mut message = message.into();
        match self.peek() {
            Some(token) => message.push_str(&format!(", found {token:?}")),
            None => message.push_str(", found end of input"),
        }
        CompileError::parser(message, self.span())
    }

    // ---- statements ----

    fn parse_program(&mut self) -> Result<Program> {
        let mut stmts = Vec::new();
        while !self.at_end() {
            let stmt = self.parse_stmt()?;
            self.finish_stmt()?;
            stmts.push(stmt);
        }
        Ok(Program { stmts })
    }

    /// Statement terminator: a `;`, or a statement that ended with `}`,
    /// or the end of the enclosing block/program
    fn finish_stmt(&mut self) -> Result<()> {
        if self.eat(Token::Semi) {
            return Ok(());
        }
        if self.at_end() || self.peek() == Some(&Token::RBrace) || self.prev_is_rbrace() {
            return Ok(());
        }
        Err(self.error("expected ';'"))
    }

    fn parse_stmt(&mut self) -> Result<Spanned<Stmt>> {
        let start = self.span();
        let node = match self.peek() {
            Some(Token::Let) => self.parse_let()?,
            Some(Token::Extern) => {
                self.pos += 1;
                Stmt::Fn(self.parse_fn_def(true)?)
            }
            Some(Token::Fn) => Stmt::Fn(self.parse_fn_def(false)?),
            Some(Token::Type) => {
                self.pos += 1;
                let (name, _) = self.expect_ident("a type alias name")?;
                self.expect(Token::Eq, "'='")?;
                let ty = self.parse_type()?;
                Stmt::TypeAlias { name, ty }
            }
            Some(Token::Struct) => self.parse_struct_def()?,
            Some(Token::Module) => {
                self.pos += 1;
                let (name, _) = self.expect_ident("a module name")?;
                self.expect(Token::LBrace, "'{'")?;
                let body = self.parse_stmts_until_rbrace()?;
                self.expect(Token::RBrace, "'}'")?;
                Stmt::Module { name, body }
            }
            Some(Token::While) => {
                self.pos += 1;
                self.expect(Token::LParen, "'(' after while")?;
                let cond = self.parse_expr_reset()?;
                self.expect(Token::RParen, "')'")?;
                let body = self.parse_stmt()?;
                Stmt::While {
                    cond,
                    body: Box::new(body),
                }
            }
            // at statement position `if` takes statement branches and the
            // `else` is optional; expression positions go through parse_if
            Some(Token::If) => {
                self.pos += 1;
                self.expect(Token::LParen, "'(' after if")?;
                let cond = self.parse_expr_reset()?;
                self.expect(Token::RParen, "')'")?;
                let then_branch = Box::new(self.parse_stmt()?);
                let else_branch = if self.eat(Token::Else) {
                    Some(Box::new(self.parse_stmt()?))
                } else {
                    None
                };
                Stmt::If {
                    cond,
                    then_branch,
                    else_branch,
                }
            }
            Some(Token::Break) => {
                self.pos += 1;
                Stmt::Break
            }
            Some(Token::Continue) => {
                self.pos += 1;
                Stmt::Continue
            }
            Some(Token::Return) => {
                self.pos += 1;
                let value = match self.peek() {
                    Some(Token::Semi) | Some(Token::RBrace) | None => None,
                    _ => Some(self.parse_expr()?),
                };
                Stmt::Return(value)
            }
            Some(Token::Ident(_)) => {
                let save = self.pos;
                match self.parse_assign_opt()? {
                    Some(stmt) => stmt,
                    None => {
                        self.pos = save;
                        Stmt::Expr(self.parse_expr()?)
                    }
                }
            }
            _ => Stmt::Expr(self.parse_expr()?),
        };
        Ok(Spanned::new(node, start.merge(self.prev_span())))
    }

    fn parse_let(&mut self) -> Result<Stmt> {
        self.pos += 1;
        let mutable = self.eat(Token::Mut);
        let (name, _) = self.expect_ident("a variable name")?;
        let ty = if self.eat(Token::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let init = if self.eat(Token::Eq) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        if ty.is_none() && init.is_none() {
            return Err(self.error(format!("declaration of {name} needs a type or '='")));
        }
        Ok(Stmt::Let {
            name,
            mutable,
            ty,
            init,
        })
    }

    fn parse_struct_def(&mut self) -> Result<Stmt> {
        self.pos += 1;
        let (name, _) = self.expect_ident("a struct name")?;
        self.expect(Token::LBrace, "'{'")?;
        let mut fields = Vec::new();
        while self.peek() != Some(&Token::RBrace) {
            let (field, _) = self.expect_ident("a field name")?;
            self.expect(Token::Colon, "':'")?;
            let ty = self.parse_type()?;
            fields.push((field, ty));
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.expect(Token::RBrace, "'}'")?;
        Ok(Stmt::StructDef { name, fields })
    }

    /// Parse `name [op]= value`, `name[idx] [op]= value` or
    /// `name.field [op]= value`; `None` means this is not an assignment and
    /// the caller should rewind
    fn parse_assign_opt(&mut self) -> Result<Option<Stmt>> {
        let Some((Token::Ident(name), _)) = self.bump() else {
            return Ok(None);
        };
        let target = match self.peek() {
            Some(Token::Dot) => {
                self.pos += 1;
                match self.bump() {
                    Some((Token::Ident(field), _)) => AssignTarget::Field { name, field },
                    _ => return Ok(None),
                }
            }
            Some(Token::LBracket) => {
                self.pos += 1;
                let Ok(index) = self.parse_expr_reset() else {
                    return Ok(None);
                };
                if !self.eat(Token::RBracket) {
                    return Ok(None);
                }
                AssignTarget::Index { name, index }
            }
            _ => AssignTarget::Name(name),
        };
        let op = match self.peek() {
            Some(Token::Eq) => None,
            Some(Token::PlusEq) => Some(BinOp::Add),
            Some(Token::MinusEq) => Some(BinOp::Sub),
            Some(Token::StarEq) => Some(BinOp::Mul),
            Some(Token::SlashEq) => Some(BinOp::Div),
            Some(Token::PercentEq) => Some(BinOp::Rem),
            _ => return Ok(None),
        };
        self.pos += 1;
        let value = self.parse_expr()?;
        Ok(Some(Stmt::Assign { target, op, value }))
    }

    fn parse_stmts_until_rbrace(&mut self) -> Result<Vec<Spanned<Stmt>>> {
        let saved = std::mem::replace(&mut self.no_struct, false);
        let mut stmts = Vec::new();
        let result = loop {
            if self.at_end() || self.peek() == Some(&Token::RBrace) {
                break Ok(());
            }
            match self.parse_stmt().and_then(|stmt| {
                self.finish_stmt()?;
                Ok(stmt)
            }) {
                Ok(stmt) => stmts.push(stmt),
                Err(e) => break Err(e),
            }
        };
        self.no_struct = saved;
        result?;
        Ok(stmts)
    }

    // ---- functions ----

    fn parse_fn_def(&mut self, is_extern: bool) -> Result<FnDef> {
        self.expect(Token::Fn, "'fn'")?;
        let (name, _) = self.expect_ident("a function name")?;
        let type_params = if self.eat(Token::Lt) {
            let mut params = Vec::new();
            loop {
                let (param, _) = self.expect_ident("a type parameter")?;
                params.push(param);
                if !self.eat(Token::Comma) {
                    break;
                }
            }
            self.expect(Token::Gt, "'>'")?;
            params
        } else {
            Vec::new()
        };
        let params = self.parse_params()?;
        let ret = if self.eat(Token::Colon) {
            Some(self.parse_type()?)
        } else {
            None
        };
        let body = if is_extern {
            None
        } else {
            self.expect(Token::Arrow, "'=>'")?;
            Some(Box::new(self.parse_fn_body()?))
        };
        Ok(FnDef {
            name: Some(name),
            type_params,
            params,
            ret,
            body,
        })
    }

    fn parse_params(&mut self) -> Result<Vec<Param>> {
        self.expect(Token::LParen, "'('")?;
        let mut params = Vec::new();
        while self.peek() != Some(&Token::RParen) {
            let (name, _) = self.expect_ident("a parameter name")?;
            let ty = if self.eat(Token::Colon) {
                Some(self.parse_type()?)
            } else {
                None
            };
            params.push(Param { name, ty });
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.expect(Token::RParen, "')'")?;
        Ok(params)
    }

    /// A function body: a block, or a single statement up to `;`
    fn parse_fn_body(&mut self) -> Result<Spanned<Expr>> {
        if self.peek() == Some(&Token::LBrace) {
            return self.parse_block_expr();
        }
        let stmt = self.parse_stmt()?;
        let span = stmt.span;
        Ok(Spanned::new(Expr::Block(vec![stmt]), span))
    }

    /// Anonymous `(params) [: ret] => body`; `None` means the paren did not
    /// start a function literal and the caller should rewind
    fn parse_anon_fn_opt(&mut self) -> Result<Option<FnDef>> {
        let save = self.pos;
        let params = match self.parse_params() {
            Ok(params) => params,
            Err(_) => {
                self.pos = save;
                return Ok(None);
            }
        };
        let ret = if self.eat(Token::Colon) {
            match self.parse_type() {
                Ok(ty) => Some(ty),
                Err(_) => {
                    self.pos = save;
                    return Ok(None);
                }
            }
        } else {
            None
        };
        if !self.eat(Token::Arrow) {
            self.pos = save;
            return Ok(None);
        }
        let body = self.parse_fn_body()?;
        Ok(Some(FnDef {
            name: None,
            type_params: Vec::new(),
            params,
            ret,
            body: Some(Box::new(body)),
        }))
    }

    // ---- types ----

    fn parse_type(&mut self) -> Result<TypeExpr> {
        match self.peek() {
            Some(Token::Ident(_)) => {
                let (name, _) = self.expect_ident("a type")?;
                Ok(match name.as_str() {
                    "Bool" => TypeExpr::Bool,
                    "String" => TypeExpr::Str,
                    _ => match IntTag::from_name(&name) {
                        Some(tag) => TypeExpr::Int(tag),
                        None => TypeExpr::Named(name),
                    },
                })
            }
            Some(Token::LBracket) => {
                self.pos += 1;
                let elem = self.parse_type()?;
                let len = if self.eat(Token::Semi) {
                    Some(self.parse_type_len()?)
                } else {
                    None
                };
                let capacity = if len.is_some() && self.eat(Token::Semi) {
                    Some(self.parse_type_len()?)
                } else {
                    None
                };
                self.expect(Token::RBracket, "']'")?;
                Ok(TypeExpr::Array {
                    elem: Box::new(elem),
                    len,
                    capacity,
                })
            }
            Some(Token::Fn) => {
                self.pos += 1;
                self.expect(Token::LParen, "'('")?;
                let mut params = Vec::new();
                while self.peek() != Some(&Token::RParen) {
                    params.push(self.parse_type()?);
                    if !self.eat(Token::Comma) {
                        break;
                    }
                }
                self.expect(Token::RParen, "')'")?;
                let ret = if self.eat(Token::Colon) {
                    Some(Box::new(self.parse_type()?))
                } else {
                    None
                };
                Ok(TypeExpr::Fn { params, ret })
            }
            _ => Err(self.error("expected a type")),
        }
    }

    fn parse_type_len(&mut self) -> Result<u64> {
        match self.bump() {
            Some((Token::Int(lit), span)) => {
                if lit.tag.is_some() {
                    return Err(CompileError::parser(
                        "array lengths take no width tag",
                        span,
                    ));
                }
                lit.value
                    .to_u64()
                    .ok_or_else(|| CompileError::parser("array length too large", span))
            }
            _ => Err(self.error("expected an array length")),
        }
    }

    // ---- expressions ----

    /// Parse an expression with the struct-literal restriction lifted, for
    /// use inside any bracketed context
    fn parse_expr_reset(&mut self) -> Result<Spanned<Expr>> {
        let saved = std::mem::replace(&mut self.no_struct, false);
        let result = self.parse_expr();
        self.no_struct = saved;
        result
    }

    fn parse_expr(&mut self) -> Result<Spanned<Expr>> {
        self.parse_logical_or()
    }

    fn parse_logical_or(&mut self) -> Result<Spanned<Expr>> {
        let mut lhs = self.parse_logical_and()?;
        while self.eat(Token::OrOr) {
            let rhs = self.parse_logical_and()?;
            lhs = binary(BinOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_logical_and(&mut self) -> Result<Spanned<Expr>> {
        let mut lhs = self.parse_comparison()?;
        while self.eat(Token::AndAnd) {
            let rhs = self.parse_comparison()?;
            lhs = binary(BinOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    /// Equality, relational and `is` share one precedence level
    fn parse_comparison(&mut self) -> Result<Spanned<Expr>> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                Some(Token::EqEq) => BinOp::Eq,
                Some(Token::NotEq) => BinOp::Ne,
                Some(Token::Lt) => BinOp::Lt,
                Some(Token::Le) => BinOp::Le,
                Some(Token::Gt) => BinOp::Gt,
                Some(Token::Ge) => BinOp::Ge,
                Some(Token::Is) => {
                    self.pos += 1;
                    let ty = self.parse_type()?;
                    let span = lhs.span.merge(self.prev_span());
                    lhs = Spanned::new(
                        Expr::Is {
                            operand: Box::new(lhs),
                            ty,
                        },
                        span,
                    );
                    continue;
                }
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_additive()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Spanned<Expr>> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinOp::Add,
                Some(Token::Minus) => BinOp::Sub,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_multiplicative()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Spanned<Expr>> {
        let mut lhs = self.parse_factor()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinOp::Mul,
                Some(Token::Slash) => BinOp::Div,
                Some(Token::Percent) => BinOp::Rem,
                _ => break,
            };
            self.pos += 1;
            let rhs = self.parse_factor()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_factor(&mut self) -> Result<Spanned<Expr>> {
        let start = self.span();
        match self.peek() {
            Some(Token::Int(_)) => {
                let Some((Token::Int(lit), span)) = self.bump() else {
                    unreachable!()
                };
                let expr = Expr::Int {
                    value: lit.value,
                    tag: lit.tag,
                };
                self.parse_postfix(Spanned::new(expr, span))
            }
            // a sign is part of the literal, not a general unary operator
            Some(Token::Minus) | Some(Token::Plus) => {
                let negative = self.peek() == Some(&Token::Minus);
                self.pos += 1;
                match self.bump() {
                    Some((Token::Int(lit), span)) => {
                        let value = if negative { -lit.value } else { lit.value };
                        Ok(Spanned::new(
                            Expr::Int {
                                value,
                                tag: lit.tag,
                            },
                            start.merge(span),
                        ))
                    }
                    _ => Err(self.error("expected a numeric literal after sign")),
                }
            }
            Some(Token::Str(_)) | Some(Token::Char(_)) => {
                let Some((token, span)) = self.bump() else {
                    unreachable!()
                };
                let expr = match token {
                    Token::Str(text) => Expr::Str {
                        text,
                        is_char: false,
                    },
                    Token::Char(text) => Expr::Str {
                        text,
                        is_char: true,
                    },
                    _ => unreachable!(),
                };
                self.parse_postfix(Spanned::new(expr, span))
            }
            Some(Token::True) | Some(Token::False) => {
                let value = self.peek() == Some(&Token::True);
                self.pos += 1;
                Ok(Spanned::new(Expr::Bool(value), start))
            }
            Some(Token::Not) => {
                self.pos += 1;
                let operand = self.parse_factor()?;
                let span = start.merge(operand.span);
                Ok(Spanned::new(
                    Expr::Unary {
                        op: UnOp::Not,
                        operand: Box::new(operand),
                    },
                    span,
                ))
            }
            Some(Token::LBracket) => {
                self.pos += 1;
                let mut elems = Vec::new();
                while self.peek() != Some(&Token::RBracket) {
                    elems.push(self.parse_expr_reset()?);
                    if !self.eat(Token::Comma) {
                        break;
                    }
                }
                let end = self.expect(Token::RBracket, "']'")?;
                self.parse_postfix(Spanned::new(Expr::Array(elems), start.merge(end)))
            }
            Some(Token::LParen) => {
                if let Some(def) = self.parse_anon_fn_opt()? {
                    let span = start.merge(self.prev_span());
                    return Ok(Spanned::new(Expr::FnLit(def), span));
                }
                self.pos += 1;
                let inner = self.parse_expr_reset()?;
                let end = self.expect(Token::RParen, "')'")?;
                self.parse_postfix(Spanned::new(inner.node, start.merge(end)))
            }
            Some(Token::LBrace) => self.parse_block_expr(),
            Some(Token::If) => self.parse_if(),
            Some(Token::Match) => self.parse_match(),
            Some(Token::Ident(_)) => {
                let (name, span) = self.expect_ident("an identifier")?;
                self.parse_postfix(Spanned::new(Expr::Ident(name), span))
            }
            _ => Err(self.error("expected an expression")),
        }
    }

    fn parse_block_expr(&mut self) -> Result<Spanned<Expr>> {
        let start = self.expect(Token::LBrace, "'{'")?;
        let stmts = self.parse_stmts_until_rbrace()?;
        let end = self.expect(Token::RBrace, "'}'")?;
        Ok(Spanned::new(Expr::Block(stmts), start.merge(end)))
    }

    fn parse_if(&mut self) -> Result<Spanned<Expr>> {
        let start = self.expect(Token::If, "'if'")?;
        self.expect(Token::LParen, "'(' after if")?;
        let cond = self.parse_expr_reset()?;
        self.expect(Token::RParen, "')'")?;
        let then_branch = self.parse_expr()?;
        self.expect(Token::Else, "'else'")?;
        let else_branch = self.parse_expr()?;
        let span = start.merge(else_branch.span);
        Ok(Spanned::new(
            Expr::If {
                cond: Box::new(cond),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
            span,
        ))
    }

    fn parse_match(&mut self) -> Result<Spanned<Expr>> {
        let start = self.expect(Token::Match, "'match'")?;
        let saved = std::mem::replace(&mut self.no_struct, true);
        let control = self.parse_expr();
        self.no_struct = saved;
        let control = control?;
        self.expect(Token::LBrace, "'{'")?;
        let mut arms = Vec::new();
        while self.peek() == Some(&Token::Case) {
            let arm_start = self.span();
            self.pos += 1;
            let pattern = self.parse_pattern()?;
            self.expect(Token::Arrow, "'=>'")?;
            let result = self.parse_expr_reset()?;
            if !self.eat(Token::Semi) && !self.prev_is_rbrace() {
                return Err(self.error("expected ';' after match arm"));
            }
            let span = arm_start.merge(self.prev_span());
            arms.push(MatchArm {
                pattern,
                result,
                span,
            });
        }
        let end = self.expect(Token::RBrace, "'}'")?;
        if arms.is_empty() {
            return Err(CompileError::parser(
                "match needs at least one arm",
                start.merge(end),
            ));
        }
        Ok(Spanned::new(
            Expr::Match {
                control: Box::new(control),
                arms,
            },
            start.merge(end),
        ))
    }

    /// Patterns are literal booleans, literal (optionally signed and
    /// tagged) integers, or the wildcard `_`
    fn parse_pattern(&mut self) -> Result<Pattern> {
        match self.peek() {
            Some(Token::True) => {
                self.pos += 1;
                Ok(Pattern::Bool(true))
            }
            Some(Token::False) => {
                self.pos += 1;
                Ok(Pattern::Bool(false))
            }
            Some(Token::Ident(name)) if name.as_str() == "_" => {
                self.pos += 1;
                Ok(Pattern::Wildcard)
            }
            Some(Token::Minus) | Some(Token::Plus) => {
                let negative = self.peek() == Some(&Token::Minus);
                self.pos += 1;
                match self.bump() {
                    Some((Token::Int(lit), _)) => Ok(Pattern::Int {
                        value: if negative { -lit.value } else { lit.value },
                        tag: lit.tag,
                    }),
                    _ => Err(self.error("expected a numeric literal after sign")),
                }
            }
            Some(Token::Int(_)) => match self.bump() {
                Some((Token::Int(lit), _)) => Ok(Pattern::Int {
                    value: lit.value,
                    tag: lit.tag,
                }),
                _ => Err(self.error("expected a literal pattern")),
            },
            _ => Err(self.error("expected a literal pattern or '_'")),
        }
    }

    /// Trailing chain elements after a primary: namespace access, generic
    /// or plain calls, struct literals, field access and indexing
    fn parse_postfix(&mut self, mut expr: Spanned<Expr>) -> Result<Spanned<Expr>> {
        loop {
            match self.peek() {
                Some(Token::ColonColon) => {
                    self.pos += 1;
                    let (name, end) = self.expect_ident("a member name")?;
                    let Expr::Ident(module) = expr.node else {
                        return Err(self.error("namespace access needs a module name"));
                    };
                    expr = Spanned::new(
                        Expr::ModuleAccess { module, name },
                        expr.span.merge(end),
                    );
                }
                Some(Token::Lt) => {
                    // `name<` may be a generic call or a comparison
                    let save = self.pos;
                    match self.parse_generic_call(&expr) {
                        Ok(Some(call)) => expr = call,
                        _ => {
                            self.pos = save;
                            break;
                        }
                    }
                }
                Some(Token::LParen) => {
                    self.pos += 1;
                    let (args, end) = self.parse_call_args()?;
                    let span = expr.span.merge(end);
                    expr = Spanned::new(
                        Expr::Call {
                            callee: Box::new(expr),
                            type_args: Vec::new(),
                            args,
                        },
                        span,
                    );
                }
                Some(Token::LBrace) if !self.no_struct => {
                    let Expr::Ident(name) = &expr.node else {
                        break;
                    };
                    let name = name.clone();
                    self.pos += 1;
                    let mut args = Vec::new();
                    while self.peek() != Some(&Token::RBrace) {
                        args.push(self.parse_expr_reset()?);
                        if !self.eat(Token::Comma) {
                            break;
                        }
                    }
                    let end = self.expect(Token::RBrace, "'}'")?;
                    expr = Spanned::new(
                        Expr::StructLit { name, args },
                        expr.span.merge(end),
                    );
                }
                Some(Token::Dot) => {
                    self.pos += 1;
                    let (name, end) = self.expect_ident("a field name")?;
                    let span = expr.span.merge(end);
                    expr = Spanned::new(
                        Expr::Field {
                            object: Box::new(expr),
                            name,
                        },
                        span,
                    );
                }
                Some(Token::LBracket) => {
                    self.pos += 1;
                    let index = self.parse_expr_reset()?;
                    let end = self.expect(Token::RBracket, "']'")?;
                    let span = expr.span.merge(end);
                    expr = Spanned::new(
                        Expr::Index {
                            object: Box::new(expr),
                            index: Box::new(index),
                        },
                        span,
                    );
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_generic_call(&mut self, callee: &Spanned<Expr>) -> Result<Option<Spanned<Expr>>> {
        self.expect(Token::Lt, "'<'")?;
        let mut type_args = Vec::new();
        loop {
            type_args.push(self.parse_type()?);
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.expect(Token::Gt, "'>'")?;
        if self.peek() != Some(&Token::LParen) {
            return Ok(None);
        }
        self.pos += 1;
        let (args, end) = self.parse_call_args()?;
        Ok(Some(Spanned::new(
            Expr::Call {
                callee: Box::new(callee.clone()),
                type_args,
                args,
            },
            callee.span.merge(end),
        )))
    }

    /// Call arguments after the opening paren was consumed
    fn parse_call_args(&mut self) -> Result<(Vec<Spanned<Expr>>, Span)> {
        let mut args = Vec::new();
        while self.peek() != Some(&Token::RParen) {
            args.push(self.parse_expr_reset()?);
            if !self.eat(Token::Comma) {
                break;
            }
        }
        let end = self.expect(Token::RParen, "')'")?;
        Ok((args, end))
    }
}

fn binary(op: BinOp, lhs: Spanned<Expr>, rhs: Spanned<Expr>) -> Spanned<Expr> {
    let span = lhs.span.merge(rhs.span);
    Spanned::new(
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        span,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn parse_source(source: &str) -> Result<Program> {
        parse(tokenize(source).unwrap())
    }

    fn parse_one(source: &str) -> Stmt {
        let mut program = parse_source(source).unwrap();
        assert_eq!(program.stmts.len(), 1, "expected one statement");
        program.stmts.pop().unwrap().node
    }

    #[test]
    fn test_precedence() {
        let Stmt::Expr(expr) = parse_one("1 + 2 * 3") else {
            panic!("expected expression statement");
        };
        let Expr::Binary { op: BinOp::Add, rhs, .. } = expr.node else {
            panic!("expected addition at the top");
        };
        assert!(matches!(rhs.node, Expr::Binary { op: BinOp::Mul, .. }));
    }

    #[test]
    fn test_let_forms() {
        assert!(matches!(
            parse_one("let x = 5;"),
            Stmt::Let {
                mutable: false,
                ty: None,
                init: Some(_),
                ..
            }
        ));
        assert!(matches!(
            parse_one("let mut x : I32;"),
            Stmt::Let {
                mutable: true,
                ty: Some(TypeExpr::Int(_)),
                init: None,
                ..
            }
        ));
        assert!(parse_source("let x;").is_err());
    }

    #[test]
    fn test_array_types() {
        let Stmt::Let { ty: Some(ty), .. } = parse_one("let a : [U8; 3; 5];") else {
            panic!("expected typed let");
        };
        assert_eq!(
            ty,
            TypeExpr::Array {
                elem: Box::new(TypeExpr::Int(IntTag::from_name("U8").unwrap())),
                len: Some(3),
                capacity: Some(5),
            }
        );
    }

    #[test]
    fn test_named_fn() {
        let Stmt::Fn(def) = parse_one("fn add(a: I32, b: I32): I32 => a + b;") else {
            panic!("expected fn definition");
        };
        assert_eq!(def.name.as_deref(), Some("add"));
        assert_eq!(def.params.len(), 2);
        assert!(def.ret.is_some());
        assert!(def.body.is_some());
    }

    #[test]
    fn test_extern_fn() {
        let Stmt::Fn(def) = parse_one("extern fn createArray<T>(length: USize): [T];") else {
            panic!("expected extern fn");
        };
        assert_eq!(def.type_params, vec!["T".to_string()]);
        assert!(def.body.is_none());
    }

    #[test]
    fn test_anonymous_fn_vs_paren() {
        let Stmt::Let { init: Some(init), .. } = parse_one("let f = (a) => a + 1;") else {
            panic!("expected let");
        };
        assert!(matches!(init.node, Expr::FnLit(_)));

        let Stmt::Expr(expr) = parse_one("(1 + 2) * 3") else {
            panic!("expected expression");
        };
        assert!(matches!(expr.node, Expr::Binary { op: BinOp::Mul, .. }));
    }

    #[test]
    fn test_generic_call_vs_comparison() {
        let Stmt::Expr(expr) = parse_one("f<I32>(1)") else {
            panic!("expected expression");
        };
        let Expr::Call { type_args, .. } = expr.node else {
            panic!("expected generic call");
        };
        assert_eq!(type_args, vec![TypeExpr::Int(IntTag::from_name("I32").unwrap())]);

        let Stmt::Expr(expr) = parse_one("a < b") else {
            panic!("expected expression");
        };
        assert!(matches!(expr.node, Expr::Binary { op: BinOp::Lt, .. }));
    }

    #[test]
    fn test_match_with_wildcard() {
        let Stmt::Expr(expr) = parse_one("match 3 { case 1 => 10; case _ => 0; }") else {
            panic!("expected expression");
        };
        let Expr::Match { arms, .. } = expr.node else {
            panic!("expected match");
        };
        assert_eq!(arms.len(), 2);
        assert!(matches!(arms[1].pattern, Pattern::Wildcard));
    }

    #[test]
    fn test_match_control_identifier() {
        let Stmt::Expr(expr) = parse_one("match x { case 1 => 10; }") else {
            panic!("expected expression");
        };
        let Expr::Match { control, .. } = expr.node else {
            panic!("expected match");
        };
        assert!(matches!(control.node, Expr::Ident(_)));
    }

    #[test]
    fn test_match_requires_arms() {
        assert!(parse_source("match 1 { }").is_err());
    }

    #[test]
    fn test_if_expression_requires_else() {
        assert!(parse_source("let x = if (true) 1;").is_err());
        assert!(parse_source("let x = if (true) 1 else 2;").is_ok());
    }

    #[test]
    fn test_statement_if_with_optional_else() {
        let Stmt::If { else_branch, .. } = parse_one("if (x < 1) break;") else {
            panic!("expected if statement");
        };
        assert!(else_branch.is_none());

        let Stmt::If {
            then_branch,
            else_branch,
            ..
        } = parse_one("if (x < 1) { break; } else { x = 1; }")
        else {
            panic!("expected if statement");
        };
        assert!(matches!(then_branch.node, Stmt::Expr(_)));
        assert!(else_branch.is_some());
    }

    #[test]
    fn test_continue_statement() {
        assert!(matches!(parse_one("continue;"), Stmt::Continue));
    }

    #[test]
    fn test_while_with_statement_body() {
        let Stmt::While { body, .. } = parse_one("while (x < 4) x += 1;") else {
            panic!("expected while");
        };
        assert!(matches!(body.node, Stmt::Assign { .. }));
    }

    #[test]
    fn test_assignment_forms() {
        assert!(matches!(
            parse_one("x = 1;"),
            Stmt::Assign {
                target: AssignTarget::Name(_),
                op: None,
                ..
            }
        ));
        assert!(matches!(
            parse_one("x += 1;"),
            Stmt::Assign {
                op: Some(BinOp::Add),
                ..
            }
        ));
        assert!(matches!(
            parse_one("a[0] = 1;"),
            Stmt::Assign {
                target: AssignTarget::Index { .. },
                ..
            }
        ));
        assert!(matches!(
            parse_one("p.x = 1;"),
            Stmt::Assign {
                target: AssignTarget::Field { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_struct_def_and_literal() {
        let program = parse_source("struct Point { x : I32, y : I32 } let p = Point { 1, 2 };")
            .unwrap();
        assert!(matches!(program.stmts[0].node, Stmt::StructDef { .. }));
        let Stmt::Let { init: Some(init), .. } = &program.stmts[1].node else {
            panic!("expected let");
        };
        assert!(matches!(init.node, Expr::StructLit { .. }));
    }

    #[test]
    fn test_module_and_namespace_access() {
        let program = parse_source("module Math { let pi = 3; } Math::pi").unwrap();
        assert!(matches!(program.stmts[0].node, Stmt::Module { .. }));
        let Stmt::Expr(expr) = &program.stmts[1].node else {
            panic!("expected expression");
        };
        assert!(matches!(expr.node, Expr::ModuleAccess { .. }));
    }

    #[test]
    fn test_negative_literal_and_subtraction() {
        let Stmt::Expr(expr) = parse_one("-5") else {
            panic!("expected expression");
        };
        assert!(matches!(expr.node, Expr::Int { .. }));

        let Stmt::Expr(expr) = parse_one("a - 5") else {
            panic!("expected expression");
        };
        assert!(matches!(expr.node, Expr::Binary { op: BinOp::Sub, .. }));
    }

    #[test]
    fn test_is_operator() {
        let Stmt::Expr(expr) = parse_one("x is [I32]") else {
            panic!("expected expression");
        };
        assert!(matches!(
            expr.node,
            Expr::Is {
                ty: TypeExpr::Array { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_missing_semicolon() {
        assert!(parse_source("let x = 1 let y = 2;").is_err());
    }

    #[test]
    fn test_block_statement_then_expression() {
        let program = parse_source("let mut x = 1; { x = 2; } x").unwrap();
        assert_eq!(program.stmts.len(), 3);
    }

    #[test]
    fn test_postfix_chain() {
        let Stmt::Expr(expr) = parse_one("points[0].x") else {
            panic!("expected expression");
        };
        assert!(matches!(expr.node, Expr::Field { .. }));
    }
}
