//! Tree-walking evaluator
//!
//! Walks the parsed AST with a scope-stack environment. `break` and
//! `return` unwind through the `InterpResult` channel and are intercepted
//! by `while` loops and call sites. Loop `while` bodies and conditions are
//! re-evaluated from their cached AST nodes each iteration.

use super::env::{Binding, Environment};
use super::error::{ErrorKind, InterpResult, RuntimeError};
use super::value::{ArrayValue, Value};
use crate::ast::{
    AssignTarget, BinOp, Expr, FnDef, IntTag, MatchArm, Pattern, Program, Signedness, Spanned,
    Stmt, TypeExpr, UnOp,
};
use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};
use std::collections::HashMap;
use std::rc::Rc;

const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

type BuiltinFn = fn(&mut Interpreter, &[TypeExpr], &[Value]) -> InterpResult<Value>;

/// The interpreter: environment, builtin table and the run-scoped output
/// buffer filled by `print`
pub struct Interpreter {
    env: Environment,
    builtins: HashMap<String, BuiltinFn>,
    output: String,
    loop_depth: usize,
    call_depth: usize,
}

impl Interpreter {
    pub fn new() -> Self {
        let mut builtins: HashMap<String, BuiltinFn> = HashMap::new();
        builtins.insert("print".to_string(), builtin_print);
        builtins.insert("createArray".to_string(), builtin_create_array);

        Interpreter {
            env: Environment::new(),
            builtins,
            output: String::new(),
            loop_depth: 0,
            call_depth: 0,
        }
    }

    /// Evaluate a program; the result is the last statement's value
    pub fn run(&mut self, program: &Program) -> InterpResult<Value> {
        let mut last = Value::untyped_zero();
        for stmt in &program.stmts {
            last = self.exec(stmt)?;
        }
        Ok(last)
    }

    /// Drain the `print` buffer accumulated by the current run
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    fn exec(&mut self, stmt: &Spanned<Stmt>) -> InterpResult<Value> {
        match &stmt.node {
            Stmt::Let {
                name,
                mutable,
                ty,
                init,
            } => self.exec_let(name, *mutable, ty.as_ref(), init.as_ref()),
            Stmt::Assign { target, op, value } => self.exec_assign(target, *op, value),
            Stmt::Fn(def) => {
                let value = Value::Fn(Rc::new(def.clone()));
                let name = def.name.as_deref().unwrap_or("<anonymous>");
                self.env.declare(name, Binding::new(value, false, None))?;
                Ok(Value::untyped_zero())
            }
            Stmt::TypeAlias { name, ty } => {
                self.env.define_alias(name, ty.clone());
                Ok(Value::untyped_zero())
            }
            Stmt::StructDef { name, fields } => {
                self.env.define_alias(name, TypeExpr::Struct(fields.clone()));
                Ok(Value::untyped_zero())
            }
            Stmt::Module { name, body } => self.exec_module(name, body),
            Stmt::While { cond, body } => self.exec_while(cond, body),
            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let Value::Bool(cond) = self.eval(cond)? else {
                    return Err(RuntimeError::type_error("if condition must be a boolean"));
                };
                if cond {
                    self.exec(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.exec(else_branch)
                } else {
                    Ok(Value::untyped_zero())
                }
            }
            Stmt::Break => {
                if self.loop_depth == 0 {
                    Err(RuntimeError::break_outside_loop())
                } else {
                    Err(RuntimeError::brk())
                }
            }
            Stmt::Continue => {
                if self.loop_depth == 0 {
                    Err(RuntimeError::continue_outside_loop())
                } else {
                    Err(RuntimeError::cont())
                }
            }
            Stmt::Return(expr) => {
                if self.call_depth == 0 {
                    return Err(RuntimeError::return_outside_function());
                }
                let value = match expr {
                    Some(e) => self.eval(e)?,
                    None => Value::untyped_zero(),
                };
                Err(RuntimeError::ret(value))
            }
            Stmt::Expr(expr) => self.eval(expr),
        }
    }

    fn exec_let(
        &mut self,
        name: &str,
        mutable: bool,
        ty: Option<&TypeExpr>,
        init: Option<&Spanned<Expr>>,
    ) -> InterpResult<Value> {
        match (ty, init) {
            (Some(ty), Some(init)) => {
                let value = self.eval(init)?;
                let value = self.validate(value, ty)?;
                self.env
                    .declare(name, Binding::new(value, mutable, Some(ty.clone())))?;
            }
            (None, Some(init)) => {
                let value = self.eval(init)?;
                self.env.declare(name, Binding::new(value, mutable, None))?;
            }
            (Some(ty), None) => {
                // sized array declarations are materialized right away so
                // they can be filled by indexed assignment; the binding
                // stays pending so the one permitted first assignment also
                // applies to the array as a whole
                let resolved = self.resolve_type(ty).clone();
                if let TypeExpr::Array {
                    elem,
                    len: Some(len),
                    capacity,
                } = &resolved
                {
                    let len = *len as usize;
                    let capacity = capacity.map(|c| c as usize).unwrap_or(len).max(len);
                    let zero = zero_of(self.resolve_type(elem));
                    let value = Value::Array(ArrayValue {
                        elems: vec![zero; len],
                        elem_ty: Some((**elem).clone()),
                        capacity,
                    });
                    let mut binding = Binding::new(value, mutable, Some(ty.clone()));
                    binding.pending = true;
                    self.env.declare(name, binding)?;
                } else {
                    self.env.declare(name, Binding::pending(ty.clone(), mutable))?;
                }
            }
            (None, None) => {
                return Err(RuntimeError::type_error(format!(
                    "declaration of {name} needs a type or an initializer"
                )));
            }
        }
        // declarations are not expressions; a program ending in one shows 0
        Ok(Value::untyped_zero())
    }

    fn exec_assign(
        &mut self,
        target: &AssignTarget,
        op: Option<BinOp>,
        value: &Spanned<Expr>,
    ) -> InterpResult<Value> {
        let rhs = self.eval(value)?;
        match target {
            AssignTarget::Name(name) => {
                let binding = self
                    .env
                    .get(name)
                    .ok_or_else(|| RuntimeError::undefined_variable(name))?;
                if !binding.mutable && !binding.pending {
                    return Err(RuntimeError::mutation_of_immutable(name));
                }
                let declared = binding.declared.clone();
                let current = binding.value.clone();

                let next = match op {
                    Some(op) => apply_binary(op, &current, &rhs)?,
                    None => rhs,
                };
                let next = match &declared {
                    Some(ty) => self.validate(next, ty)?,
                    None => next,
                };

                let binding = self
                    .env
                    .get_mut(name)
                    .ok_or_else(|| RuntimeError::undefined_variable(name))?;
                binding.value = next.clone();
                binding.pending = false;
                Ok(next)
            }
            AssignTarget::Index { name, index } => {
                let index = self.eval(index)?;
                let index = as_index(&index)?;
                let binding = self
                    .env
                    .get(name)
                    .ok_or_else(|| RuntimeError::undefined_variable(name))?;
                if !binding.mutable && !binding.pending {
                    return Err(RuntimeError::mutation_of_immutable(name));
                }
                let Value::Array(arr) = &binding.value else {
                    return Err(RuntimeError::type_error(format!(
                        "cannot index into {}",
                        binding.value.kind_name()
                    )));
                };
                let elem_ty = arr.elem_ty.clone();

                let next = match op {
                    Some(op) => {
                        let current = arr.elems.get(index).ok_or_else(|| {
                            RuntimeError::index_out_of_bounds(index, arr.elems.len())
                        })?;
                        apply_binary(op, current, &rhs)?
                    }
                    None => rhs,
                };
                let next = match &elem_ty {
                    Some(ty) => self.validate(next, ty)?,
                    None => next,
                };

                let zero = elem_ty
                    .as_ref()
                    .map(|ty| zero_of(self.resolve_type(ty)))
                    .unwrap_or_else(Value::untyped_zero);
                let binding = self
                    .env
                    .get_mut(name)
                    .ok_or_else(|| RuntimeError::undefined_variable(name))?;
                binding.pending = false;
                let Value::Array(arr) = &mut binding.value else {
                    return Err(RuntimeError::type_error("cannot index into non-array"));
                };
                if index < arr.elems.len() {
                    arr.elems[index] = next.clone();
                } else if index < arr.capacity {
                    // writes below capacity extend the logical length,
                    // zero-filling any gap
                    while arr.elems.len() < index {
                        arr.elems.push(zero.clone());
                    }
                    arr.elems.push(next.clone());
                } else {
                    return Err(RuntimeError::index_out_of_bounds(index, arr.capacity));
                }
                Ok(next)
            }
            AssignTarget::Field { name, field } => {
                let binding = self
                    .env
                    .get(name)
                    .ok_or_else(|| RuntimeError::undefined_variable(name))?;
                if !binding.mutable && !binding.pending {
                    return Err(RuntimeError::mutation_of_immutable(name));
                }
                let Value::Struct {
                    name: type_name,
                    fields,
                } = &binding.value
                else {
                    return Err(RuntimeError::type_error(format!(
                        "field assignment on {}",
                        binding.value.kind_name()
                    )));
                };
                if !fields.iter().any(|(f, _)| f == field) {
                    return Err(RuntimeError::undefined_field(field));
                }
                let field_ty = match self.env.resolve_alias(type_name) {
                    Some(TypeExpr::Struct(tys)) => tys
                        .iter()
                        .find(|(f, _)| f == field)
                        .map(|(_, ty)| ty.clone()),
                    _ => None,
                };
                let current = fields
                    .iter()
                    .find(|(f, _)| f == field)
                    .map(|(_, v)| v.clone());

                let next = match op {
                    Some(op) => {
                        let current = current.ok_or_else(|| RuntimeError::undefined_field(field))?;
                        apply_binary(op, &current, &rhs)?
                    }
                    None => rhs,
                };
                let next = match &field_ty {
                    Some(ty) => self.validate(next, ty)?,
                    None => next,
                };

                let binding = self
                    .env
                    .get_mut(name)
                    .ok_or_else(|| RuntimeError::undefined_variable(name))?;
                binding.pending = false;
                if let Value::Struct { fields, .. } = &mut binding.value {
                    if let Some(slot) = fields.iter_mut().find(|(f, _)| f == field) {
                        slot.1 = next.clone();
                    }
                }
                Ok(next)
            }
        }
    }

    fn exec_module(&mut self, name: &str, body: &[Spanned<Stmt>]) -> InterpResult<Value> {
        self.env.push_scope();
        for stmt in body {
            if let Err(e) = self.exec(stmt) {
                self.env.pop_scope();
                return Err(e);
            }
        }
        let bindings = self.env.pop_scope_bindings();
        let members = bindings
            .into_iter()
            .map(|(name, binding)| (name, binding.value))
            .collect();
        self.env.define_module(name, members);
        Ok(Value::untyped_zero())
    }

    fn exec_while(&mut self, cond: &Spanned<Expr>, body: &Spanned<Stmt>) -> InterpResult<Value> {
        loop {
            let Value::Bool(keep_going) = self.eval(cond)? else {
                return Err(RuntimeError::type_error(
                    "while condition must be a boolean",
                ));
            };
            if !keep_going {
                break;
            }
            self.loop_depth += 1;
            let result = self.exec(body);
            self.loop_depth -= 1;
            match result {
                Err(e) if matches!(e.kind, ErrorKind::Break) => break,
                Err(e) if matches!(e.kind, ErrorKind::Continue) => continue,
                Err(e) => return Err(e),
                Ok(_) => {}
            }
        }
        Ok(Value::untyped_zero())
    }

    fn eval(&mut self, expr: &Spanned<Expr>) -> InterpResult<Value> {
        stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.eval_inner(expr))
    }

    fn eval_inner(&mut self, expr: &Spanned<Expr>) -> InterpResult<Value> {
        match &expr.node {
            Expr::Int { value, tag } => eval_int_literal(value, *tag),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Str { text, is_char } => Ok(Value::Str {
                text: text.clone(),
                is_char: *is_char,
            }),
            Expr::Array(elems) => {
                let mut values = Vec::with_capacity(elems.len());
                for elem in elems {
                    values.push(self.eval(elem)?);
                }
                let capacity = values.len();
                Ok(Value::Array(ArrayValue {
                    elems: values,
                    elem_ty: None,
                    capacity,
                }))
            }
            Expr::Ident(name) => self
                .env
                .get(name)
                .map(|b| b.value.clone())
                .ok_or_else(|| RuntimeError::undefined_variable(name)),
            Expr::ModuleAccess { module, name } => {
                let members = self
                    .env
                    .module(module)
                    .ok_or_else(|| RuntimeError::undefined_module(module))?;
                members
                    .get(name)
                    .cloned()
                    .ok_or_else(|| RuntimeError::undefined_variable(&format!("{module}::{name}")))
            }
            Expr::StructLit { name, args } => self.eval_struct_lit(name, args),
            Expr::Unary { op, operand } => {
                let value = self.eval(operand)?;
                match op {
                    UnOp::Not => match value {
                        Value::Bool(b) => Ok(Value::Bool(!b)),
                        other => Err(RuntimeError::type_error(format!(
                            "operand of ! must be a boolean, got {}",
                            other.kind_name()
                        ))),
                    },
                }
            }
            Expr::Binary { op, lhs, rhs } => {
                // both sides are always evaluated, including for && and ||
                let lhs = self.eval(lhs)?;
                let rhs = self.eval(rhs)?;
                apply_binary(*op, &lhs, &rhs)
            }
            Expr::Is { operand, ty } => {
                let value = self.eval(operand)?;
                Ok(Value::Bool(self.conforms(&value, ty)?))
            }
            Expr::Call {
                callee,
                type_args,
                args,
            } => self.eval_call(callee, type_args, args),
            Expr::Field { object, name } => {
                let value = self.eval(object)?;
                self.eval_field(&value, name)
            }
            Expr::Index { object, index } => {
                let value = self.eval(object)?;
                let index = self.eval(index)?;
                eval_index(&value, &index)
            }
            Expr::If {
                cond,
                then_branch,
                else_branch,
            } => self.eval_if(cond, then_branch, else_branch),
            Expr::Match { control, arms } => self.eval_match(control, arms),
            Expr::Block(stmts) => {
                self.env.push_scope();
                let result = self.exec_block(stmts);
                self.env.pop_scope();
                result
            }
            Expr::FnLit(def) => Ok(Value::Fn(Rc::new(def.clone()))),
        }
    }

    fn exec_block(&mut self, stmts: &[Spanned<Stmt>]) -> InterpResult<Value> {
        let mut last = Value::untyped_zero();
        for stmt in stmts {
            last = self.exec(stmt)?;
        }
        Ok(last)
    }

    fn eval_struct_lit(&mut self, name: &str, args: &[Spanned<Expr>]) -> InterpResult<Value> {
        let named = TypeExpr::Named(name.to_string());
        let TypeExpr::Struct(field_tys) = self.resolve_type(&named).clone() else {
            return Err(RuntimeError::type_error(format!(
                "unknown struct type: {name}"
            )));
        };
        if args.len() != field_tys.len() {
            return Err(RuntimeError::new(
                ErrorKind::Arity,
                format!(
                    "struct {name} expects {} fields, got {}",
                    field_tys.len(),
                    args.len()
                ),
            ));
        }
        let mut fields = Vec::with_capacity(args.len());
        for (arg, (field_name, field_ty)) in args.iter().zip(&field_tys) {
            let value = self.eval(arg)?;
            let value = self.validate(value, field_ty)?;
            fields.push((field_name.clone(), value));
        }
        Ok(Value::Struct {
            name: name.to_string(),
            fields,
        })
    }

    fn eval_field(&self, value: &Value, name: &str) -> InterpResult<Value> {
        match value {
            Value::Str { text, .. } if name == "length" => {
                Ok(Value::int(text.chars().count() as i64, None))
            }
            Value::Struct { fields, .. } => {
                if let Some((_, v)) = fields.iter().find(|(f, _)| f == name) {
                    Ok(v.clone())
                } else if name == "length" {
                    Ok(Value::int(fields.len() as i64, None))
                } else {
                    Err(RuntimeError::undefined_field(name))
                }
            }
            other => Err(RuntimeError::type_error(format!(
                "no field {name} on {}",
                other.kind_name()
            ))),
        }
    }

    fn eval_if(
        &mut self,
        cond: &Spanned<Expr>,
        then_branch: &Spanned<Expr>,
        else_branch: &Spanned<Expr>,
    ) -> InterpResult<Value> {
        let Value::Bool(cond) = self.eval(cond)? else {
            return Err(RuntimeError::type_error("if condition must be a boolean"));
        };
        // only the taken branch runs, so the other branch may recurse or
        // divide freely behind its guard
        if cond {
            self.eval(then_branch)
        } else {
            self.eval(else_branch)
        }
    }

    fn eval_match(&mut self, control: &Spanned<Expr>, arms: &[MatchArm]) -> InterpResult<Value> {
        let control = self.eval(control)?;

        // first matching arm wins and is the only one evaluated
        for arm in arms {
            if pattern_matches(&arm.pattern, &control)? {
                return self.eval(&arm.result);
            }
        }
        Err(RuntimeError::no_matching_arm(control))
    }

    fn eval_call(
        &mut self,
        callee: &Spanned<Expr>,
        type_args: &[TypeExpr],
        args: &[Spanned<Expr>],
    ) -> InterpResult<Value> {
        let callee_value = self.eval(callee)?;
        let Value::Fn(def) = callee_value else {
            return Err(RuntimeError::type_error(format!(
                "{} is not callable",
                callee_value.kind_name()
            )));
        };
        let mut arg_values = Vec::with_capacity(args.len());
        for arg in args {
            arg_values.push(self.eval(arg)?);
        }
        self.call_function(&def, type_args, arg_values)
    }

    fn call_function(
        &mut self,
        def: &FnDef,
        type_args: &[TypeExpr],
        args: Vec<Value>,
    ) -> InterpResult<Value> {
        let name = def.name.as_deref().unwrap_or("<anonymous>").to_string();

        if args.len() != def.params.len() {
            return Err(RuntimeError::arity_mismatch(&name, def.params.len(), args.len()));
        }
        if !type_args.is_empty() && type_args.len() != def.type_params.len() {
            return Err(RuntimeError::new(
                ErrorKind::Arity,
                format!(
                    "function {name} expects {} type arguments, got {}",
                    def.type_params.len(),
                    type_args.len()
                ),
            ));
        }

        // explicit type arguments bind positionally; omitted ones leave the
        // type variables unbound, and unbound positions skip validation
        let bindings: HashMap<&str, &TypeExpr> = def
            .type_params
            .iter()
            .map(String::as_str)
            .zip(type_args)
            .collect();

        let mut bound = Vec::with_capacity(args.len());
        for (param, value) in def.params.iter().zip(args) {
            let value = match &param.ty {
                Some(ty) => {
                    let ty = substitute(ty, &bindings);
                    self.validate(value, &ty)?
                }
                None => value,
            };
            bound.push((param.name.clone(), value));
        }

        let Some(body) = &def.body else {
            return self.call_builtin(&name, type_args, bound);
        };

        let mut call_env = Environment::for_call(&self.env);
        call_env.push_scope();
        for (param_name, value) in bound {
            call_env.declare(&param_name, Binding::new(value, false, None))?;
        }

        let saved_env = std::mem::replace(&mut self.env, call_env);
        let saved_loop_depth = std::mem::replace(&mut self.loop_depth, 0);
        self.call_depth += 1;

        let result = self.eval(body);

        self.env = saved_env;
        self.loop_depth = saved_loop_depth;
        self.call_depth -= 1;

        let value = match result {
            Ok(v) => v,
            Err(e) => match e.kind {
                ErrorKind::Return(v) => *v,
                _ => return Err(e),
            },
        };

        match &def.ret {
            Some(ret) => {
                let ret = substitute(ret, &bindings);
                self.validate(value, &ret)
            }
            None => Ok(value),
        }
    }

    fn call_builtin(
        &mut self,
        name: &str,
        type_args: &[TypeExpr],
        args: Vec<(String, Value)>,
    ) -> InterpResult<Value> {
        let Some(builtin) = self.builtins.get(name).copied() else {
            return Err(RuntimeError::type_error(format!(
                "unknown extern function: {name}"
            )));
        };
        let values: Vec<Value> = args.into_iter().map(|(_, v)| v).collect();
        builtin(self, type_args, &values)
    }

    /// Validate (and retag) a value against a declared type. Unresolved
    /// names are type variables and accept anything unchecked.
    fn validate(&self, value: Value, ty: &TypeExpr) -> InterpResult<Value> {
        let ty = self.resolve_type(ty).clone();
        match &ty {
            TypeExpr::Named(_) => Ok(value),
            TypeExpr::Int(tag) => match value {
                Value::Int { value, tag: vtag } => {
                    if let Some(vtag) = vtag {
                        if vtag != *tag {
                            return Err(RuntimeError::mixed_types(vtag, tag));
                        }
                    }
                    if !tag.contains(&value) {
                        return Err(RuntimeError::range_error(value, tag));
                    }
                    Ok(Value::Int {
                        value,
                        tag: Some(*tag),
                    })
                }
                other => Err(RuntimeError::type_error(format!(
                    "expected {tag}, got {}",
                    other.kind_name()
                ))),
            },
            TypeExpr::Bool => match value {
                Value::Bool(_) => Ok(value),
                other => Err(RuntimeError::type_error(format!(
                    "expected Bool, got {}",
                    other.kind_name()
                ))),
            },
            TypeExpr::Str => match value {
                Value::Str { .. } => Ok(value),
                other => Err(RuntimeError::type_error(format!(
                    "expected String, got {}",
                    other.kind_name()
                ))),
            },
            TypeExpr::Array {
                elem,
                len,
                capacity,
            } => match value {
                Value::Array(arr) => {
                    // a declared length admits exactly that length, or an
                    // empty pre-allocation buffer
                    if let Some(len) = len {
                        if !arr.elems.is_empty() && arr.elems.len() as u64 != *len {
                            return Err(RuntimeError::type_error(format!(
                                "array length mismatch: expected {len}, got {}",
                                arr.elems.len()
                            )));
                        }
                    }
                    let mut elems = Vec::with_capacity(arr.elems.len());
                    for item in arr.elems {
                        elems.push(self.validate(item, elem)?);
                    }
                    let min_capacity = capacity.map(|c| c as usize).unwrap_or(0);
                    let capacity = arr.capacity.max(min_capacity).max(elems.len());
                    Ok(Value::Array(ArrayValue {
                        elems,
                        elem_ty: Some((**elem).clone()),
                        capacity,
                    }))
                }
                other => Err(RuntimeError::type_error(format!(
                    "expected an array, got {}",
                    other.kind_name()
                ))),
            },
            TypeExpr::Fn { .. } => match value {
                Value::Fn(_) => Ok(value),
                other => Err(RuntimeError::type_error(format!(
                    "expected a function, got {}",
                    other.kind_name()
                ))),
            },
            TypeExpr::Struct(field_tys) => match value {
                Value::Struct { name, fields } => {
                    if fields.len() != field_tys.len() {
                        return Err(RuntimeError::type_error(format!(
                            "struct {name} has {} fields, expected {}",
                            fields.len(),
                            field_tys.len()
                        )));
                    }
                    let mut checked = Vec::with_capacity(fields.len());
                    for ((field_name, value), (ty_name, field_ty)) in
                        fields.into_iter().zip(field_tys)
                    {
                        if field_name != *ty_name {
                            return Err(RuntimeError::type_error(format!(
                                "unexpected field {field_name}, expected {ty_name}"
                            )));
                        }
                        checked.push((field_name, self.validate(value, field_ty)?));
                    }
                    Ok(Value::Struct {
                        name,
                        fields: checked,
                    })
                }
                other => Err(RuntimeError::type_error(format!(
                    "expected a struct, got {}",
                    other.kind_name()
                ))),
            },
        }
    }

    /// Structural conformance for the `is` operator
    fn conforms(&self, value: &Value, ty: &TypeExpr) -> InterpResult<bool> {
        let ty = self.resolve_type(ty);
        Ok(match ty {
            TypeExpr::Named(name) => {
                return Err(RuntimeError::type_error(format!("unknown type: {name}")));
            }
            TypeExpr::Int(tag) => match value {
                Value::Int { tag: Some(t), .. } => t == tag,
                Value::Int { value, tag: None } => tag.contains(value),
                _ => false,
            },
            TypeExpr::Bool => matches!(value, Value::Bool(_)),
            TypeExpr::Str => matches!(value, Value::Str { .. }),
            TypeExpr::Array { elem, len, .. } => match value {
                Value::Array(arr) => {
                    if let Some(len) = len {
                        if arr.elems.len() as u64 != *len {
                            return Ok(false);
                        }
                    }
                    for item in &arr.elems {
                        if !self.conforms(item, elem)? {
                            return Ok(false);
                        }
                    }
                    true
                }
                _ => false,
            },
            TypeExpr::Fn { .. } => matches!(value, Value::Fn(_)),
            TypeExpr::Struct(field_tys) => match value {
                Value::Struct { fields, .. } => {
                    if fields.len() != field_tys.len() {
                        return Ok(false);
                    }
                    for ((field_name, value), (ty_name, field_ty)) in
                        fields.iter().zip(field_tys)
                    {
                        if field_name != ty_name || !self.conforms(value, field_ty)? {
                            return Ok(false);
                        }
                    }
                    true
                }
                _ => false,
            },
        })
    }

    /// Chase alias names to the underlying type; unregistered names are
    /// left as-is (type variables)
    fn resolve_type<'a>(&'a self, ty: &'a TypeExpr) -> &'a TypeExpr {
        let mut ty = ty;
        let mut hops = 0;
        while let TypeExpr::Named(name) = ty {
            match self.env.resolve_alias(name) {
                Some(next) if hops < 64 => {
                    ty = next;
                    hops += 1;
                }
                _ => break,
            }
        }
        ty
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn eval_int_literal(value: &BigInt, tag: Option<IntTag>) -> InterpResult<Value> {
    if let Some(tag) = tag {
        if value.is_negative() && tag.signedness == Signedness::Unsigned {
            return Err(RuntimeError::unsigned_negative(tag));
        }
        if !tag.contains(value) {
            return Err(RuntimeError::range_error(value, tag));
        }
    }
    Ok(Value::Int {
        value: value.clone(),
        tag,
    })
}

fn pattern_matches(pattern: &Pattern, control: &Value) -> InterpResult<bool> {
    match pattern {
        Pattern::Wildcard => Ok(true),
        Pattern::Bool(b) => match control {
            Value::Bool(c) => Ok(b == c),
            other => Err(RuntimeError::type_error(format!(
                "boolean pattern against {} control",
                other.kind_name()
            ))),
        },
        Pattern::Int { value, tag } => match control {
            Value::Int {
                value: cv,
                tag: ctag,
            } => {
                // pattern literals obey the usual literal rules
                eval_int_literal(value, *tag)?;
                if let (Some(a), Some(b)) = (tag, ctag) {
                    if a != b {
                        return Err(RuntimeError::mixed_types(a, b));
                    }
                }
                Ok(value == cv)
            }
            other => Err(RuntimeError::type_error(format!(
                "numeric pattern against {} control",
                other.kind_name()
            ))),
        },
    }
}

fn combine_tags(a: Option<IntTag>, b: Option<IntTag>) -> InterpResult<Option<IntTag>> {
    match (a, b) {
        (Some(a), Some(b)) if a != b => Err(RuntimeError::mixed_types(a, b)),
        (Some(a), _) => Ok(Some(a)),
        (_, b) => Ok(b),
    }
}

fn apply_binary(op: BinOp, lhs: &Value, rhs: &Value) -> InterpResult<Value> {
    match op {
        BinOp::And | BinOp::Or => {
            let (Value::Bool(a), Value::Bool(b)) = (lhs, rhs) else {
                return Err(RuntimeError::type_error(format!(
                    "operands of {} must be booleans, got {} and {}",
                    op.symbol(),
                    lhs.kind_name(),
                    rhs.kind_name()
                )));
            };
            Ok(Value::Bool(match op {
                BinOp::And => *a && *b,
                _ => *a || *b,
            }))
        }
        BinOp::Eq | BinOp::Ne => match (lhs, rhs) {
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(match op {
                BinOp::Eq => a == b,
                _ => a != b,
            })),
            (
                Value::Int { value: a, tag: at },
                Value::Int { value: b, tag: bt },
            ) => {
                combine_tags(*at, *bt)?;
                Ok(Value::Bool(match op {
                    BinOp::Eq => a == b,
                    _ => a != b,
                }))
            }
            _ => Err(RuntimeError::type_error(format!(
                "cannot compare {} and {}",
                lhs.kind_name(),
                rhs.kind_name()
            ))),
        },
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            let (
                Value::Int { value: a, tag: at },
                Value::Int { value: b, tag: bt },
            ) = (lhs, rhs)
            else {
                return Err(RuntimeError::type_error(format!(
                    "operands of {} must be integers, got {} and {}",
                    op.symbol(),
                    lhs.kind_name(),
                    rhs.kind_name()
                )));
            };
            combine_tags(*at, *bt)?;
            Ok(Value::Bool(match op {
                BinOp::Lt => a < b,
                BinOp::Le => a <= b,
                BinOp::Gt => a > b,
                _ => a >= b,
            }))
        }
        BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Rem => {
            let (
                Value::Int { value: a, tag: at },
                Value::Int { value: b, tag: bt },
            ) = (lhs, rhs)
            else {
                return Err(RuntimeError::type_error(format!(
                    "operands of {} must be integers, got {} and {}",
                    op.symbol(),
                    lhs.kind_name(),
                    rhs.kind_name()
                )));
            };
            let tag = combine_tags(*at, *bt)?;
            let result = match op {
                BinOp::Add => a + b,
                BinOp::Sub => a - b,
                BinOp::Mul => a * b,
                BinOp::Div | BinOp::Rem => {
                    if b.is_zero() {
                        return Err(RuntimeError::division_by_zero());
                    }
                    if op == BinOp::Div { a / b } else { a % b }
                }
                _ => unreachable!(),
            };
            if let Some(tag) = &tag {
                if !tag.contains(&result) {
                    return Err(RuntimeError::range_error(result, tag));
                }
            }
            Ok(Value::Int { value: result, tag })
        }
    }
}

fn eval_index(value: &Value, index: &Value) -> InterpResult<Value> {
    let index = as_index(index)?;
    match value {
        Value::Array(arr) => arr
            .elems
            .get(index)
            .cloned()
            .ok_or_else(|| RuntimeError::index_out_of_bounds(index, arr.elems.len())),
        Value::Str { text, .. } => match text.chars().nth(index) {
            Some(c) => Ok(Value::Str {
                text: c.to_string(),
                is_char: true,
            }),
            None => Err(RuntimeError::index_out_of_bounds(
                index,
                text.chars().count(),
            )),
        },
        other => Err(RuntimeError::type_error(format!(
            "cannot index into {}",
            other.kind_name()
        ))),
    }
}

fn as_index(value: &Value) -> InterpResult<usize> {
    match value {
        Value::Int { value, .. } => value.to_usize().ok_or_else(|| {
            RuntimeError::type_error(format!("invalid array index: {value}"))
        }),
        other => Err(RuntimeError::type_error(format!(
            "array index must be an integer, got {}",
            other.kind_name()
        ))),
    }
}

fn zero_of(ty: &TypeExpr) -> Value {
    match ty {
        TypeExpr::Int(tag) => Value::int(0, Some(*tag)),
        TypeExpr::Bool => Value::Bool(false),
        TypeExpr::Str => Value::string(""),
        _ => Value::untyped_zero(),
    }
}

fn substitute(ty: &TypeExpr, bindings: &HashMap<&str, &TypeExpr>) -> TypeExpr {
    match ty {
        TypeExpr::Named(name) => match bindings.get(name.as_str()) {
            Some(bound) => (*bound).clone(),
            None => ty.clone(),
        },
        TypeExpr::Array {
            elem,
            len,
            capacity,
        } => TypeExpr::Array {
            elem: Box::new(substitute(elem, bindings)),
            len: *len,
            capacity: *capacity,
        },
        TypeExpr::Fn { params, ret } => TypeExpr::Fn {
            params: params.iter().map(|p| substitute(p, bindings)).collect(),
            ret: ret.as_ref().map(|r| Box::new(substitute(r, bindings))),
        },
        TypeExpr::Struct(fields) => TypeExpr::Struct(
            fields
                .iter()
                .map(|(n, t)| (n.clone(), substitute(t, bindings)))
                .collect(),
        ),
        _ => ty.clone(),
    }
}

fn builtin_print(
    interp: &mut Interpreter,
    _type_args: &[TypeExpr],
    args: &[Value],
) -> InterpResult<Value> {
    let value = args
        .first()
        .ok_or_else(|| RuntimeError::arity_mismatch("print", 1, 0))?;
    interp.output.push_str(&value.render());
    Ok(Value::untyped_zero())
}

fn builtin_create_array(
    _interp: &mut Interpreter,
    type_args: &[TypeExpr],
    args: &[Value],
) -> InterpResult<Value> {
    let length = args
        .first()
        .ok_or_else(|| RuntimeError::arity_mismatch("createArray", 1, 0))?;
    let capacity = as_index(length)?;
    Ok(Value::Array(ArrayValue {
        elems: Vec::new(),
        elem_ty: type_args.first().cloned(),
        capacity,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Width;

    fn tag(name: &str) -> IntTag {
        IntTag::from_name(name).unwrap()
    }

    fn int(n: i64) -> Value {
        Value::int(n, None)
    }

    fn tagged(n: i64, name: &str) -> Value {
        Value::int(n, Some(tag(name)))
    }

    #[test]
    fn test_combine_tags() {
        assert_eq!(combine_tags(None, None).unwrap(), None);
        assert_eq!(
            combine_tags(Some(tag("U8")), None).unwrap(),
            Some(tag("U8"))
        );
        assert_eq!(
            combine_tags(None, Some(tag("I32"))).unwrap(),
            Some(tag("I32"))
        );
        assert!(combine_tags(Some(tag("U8")), Some(tag("U16"))).is_err());
    }

    #[test]
    fn test_arithmetic_adopts_tag() {
        let result = apply_binary(BinOp::Add, &tagged(100, "U8"), &int(50)).unwrap();
        assert_eq!(result, tagged(150, "U8"));
    }

    #[test]
    fn test_arithmetic_overflow() {
        let err = apply_binary(BinOp::Add, &tagged(200, "U8"), &tagged(100, "U8")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Range);
    }

    #[test]
    fn test_mixed_tags_rejected() {
        let err = apply_binary(BinOp::Add, &tagged(100, "U8"), &tagged(200, "U16")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MixedType);
    }

    #[test]
    fn test_division_by_zero() {
        let err = apply_binary(BinOp::Div, &int(1), &int(0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
        let err = apply_binary(BinOp::Rem, &int(1), &int(0)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DivisionByZero);
    }

    #[test]
    fn test_division_truncates_toward_zero() {
        assert_eq!(apply_binary(BinOp::Div, &int(-7), &int(2)).unwrap(), int(-3));
        assert_eq!(apply_binary(BinOp::Rem, &int(-7), &int(2)).unwrap(), int(-1));
    }

    #[test]
    fn test_boolean_and_numeric_kinds_never_mix() {
        assert!(apply_binary(BinOp::Add, &int(1), &Value::Bool(true)).is_err());
        assert!(apply_binary(BinOp::Eq, &int(1), &Value::Bool(true)).is_err());
        assert!(apply_binary(BinOp::And, &int(1), &int(1)).is_err());
    }

    #[test]
    fn test_comparison_is_untagged_boolean() {
        let result = apply_binary(BinOp::Lt, &tagged(1, "U8"), &tagged(2, "U8")).unwrap();
        assert_eq!(result, Value::Bool(true));
    }

    #[test]
    fn test_unsigned_negative_literal() {
        let err = eval_int_literal(&BigInt::from(-100), Some(tag("U8"))).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsignedNegative);
    }

    #[test]
    fn test_literal_range() {
        assert!(eval_int_literal(&BigInt::from(255), Some(tag("U8"))).is_ok());
        let err = eval_int_literal(&BigInt::from(256), Some(tag("U8"))).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Range);
        assert!(eval_int_literal(&BigInt::from(-1), Some(tag("I8"))).is_ok());
    }

    #[test]
    fn test_zero_of() {
        assert_eq!(
            zero_of(&TypeExpr::Int(tag("I32"))),
            Value::int(0, Some(tag("I32")))
        );
        assert_eq!(zero_of(&TypeExpr::Bool), Value::Bool(false));
    }

    #[test]
    fn test_substitute_binds_positional_names() {
        let t = TypeExpr::Named("T".to_string());
        let bound = TypeExpr::Int(IntTag::new(Signedness::Signed, Width::W32));
        let mut bindings: HashMap<&str, &TypeExpr> = HashMap::new();
        bindings.insert("T", &bound);
        assert_eq!(substitute(&t, &bindings), bound);
        assert_eq!(
            substitute(&TypeExpr::Named("U".to_string()), &bindings),
            TypeExpr::Named("U".to_string())
        );
    }

    #[test]
    fn test_string_index() {
        let s = Value::string("hey");
        let c = eval_index(&s, &int(1)).unwrap();
        assert_eq!(
            c,
            Value::Str {
                text: "e".to_string(),
                is_char: true
            }
        );
        let err = eval_index(&s, &int(3)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IndexOutOfBounds);
    }
}
