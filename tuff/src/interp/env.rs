//! Scope-stack environment
//!
//! A `Vec<HashMap>` scope stack: block entry pushes a frame, block exit pops
//! it. Declarations land in the top frame and vanish on exit; assignments to
//! names from outer frames mutate those frames in place, so mutations of
//! pre-existing names leak outward while new declarations never do.

use super::error::{InterpResult, RuntimeError};
use super::value::Value;
use crate::ast::TypeExpr;
use std::collections::HashMap;

/// A variable binding
#[derive(Debug, Clone)]
pub struct Binding {
    pub value: Value,
    pub mutable: bool,
    pub declared: Option<TypeExpr>,
    /// Declared with a type but not yet assigned; the first assignment is
    /// permitted even on immutable bindings and clears this flag
    pub pending: bool,
}

impl Binding {
    pub fn new(value: Value, mutable: bool, declared: Option<TypeExpr>) -> Self {
        Binding {
            value,
            mutable,
            declared,
            pending: false,
        }
    }

    pub fn pending(declared: TypeExpr, mutable: bool) -> Self {
        Binding {
            value: Value::untyped_zero(),
            mutable,
            declared: Some(declared),
            pending: true,
        }
    }
}

/// Visible names at a point in evaluation: the variable scope stack plus
/// type aliases and frozen module namespaces
#[derive(Debug)]
pub struct Environment {
    scopes: Vec<HashMap<String, Binding>>,
    aliases: HashMap<String, TypeExpr>,
    modules: HashMap<String, HashMap<String, Value>>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            scopes: vec![HashMap::new()],
            aliases: HashMap::new(),
            modules: HashMap::new(),
        }
    }

    /// Build the disjoint environment for a function call: a by-value
    /// snapshot of the caller's visible locals, with the caller's aliases
    /// and modules along for the ride
    pub fn for_call(caller: &Environment) -> Self {
        Environment {
            scopes: vec![caller.flattened()],
            aliases: caller.aliases.clone(),
            modules: caller.modules.clone(),
        }
    }

    /// All visible bindings flattened into one frame, inner shadowing outer
    fn flattened(&self) -> HashMap<String, Binding> {
        let mut flat = HashMap::new();
        for scope in &self.scopes {
            for (name, binding) in scope {
                flat.insert(name.clone(), binding.clone());
            }
        }
        flat
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        debug_assert!(self.scopes.len() > 1, "cannot pop the global scope");
        self.scopes.pop();
    }

    /// Pop the current scope and hand back its bindings (module freezing)
    pub fn pop_scope_bindings(&mut self) -> HashMap<String, Binding> {
        debug_assert!(self.scopes.len() > 1, "cannot pop the global scope");
        self.scopes.pop().unwrap_or_default()
    }

    /// Declare in the current scope; redeclaration in the same scope fails
    pub fn declare(&mut self, name: &str, binding: Binding) -> InterpResult<()> {
        let scope = self
            .scopes
            .last_mut()
            .ok_or_else(|| RuntimeError::type_error("no active scope"))?;
        if scope.contains_key(name) {
            return Err(RuntimeError::duplicate_declaration(name));
        }
        scope.insert(name.to_string(), binding);
        Ok(())
    }

    /// Look up a binding, innermost scope first
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
    }

    /// Register or overwrite a type alias
    pub fn define_alias(&mut self, name: &str, ty: TypeExpr) {
        self.aliases.insert(name.to_string(), ty);
    }

    pub fn resolve_alias(&self, name: &str) -> Option<&TypeExpr> {
        self.aliases.get(name)
    }

    pub fn define_module(&mut self, name: &str, members: HashMap<String, Value>) {
        self.modules.insert(name.to_string(), members);
    }

    pub fn module(&self, name: &str) -> Option<&HashMap<String, Value>> {
        self.modules.get(name)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
