use rustc_hash::FxHashMap;
use std::{cell::RefCell, rc::Rc};

use super::expr::EvalErr;
use super::value::{Kind, Val};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    Mutable,
    Constant,
    Function,
}

#[derive(Debug, PartialEq, Clone)]
pub struct Binding {
    /// `None` until a `var` declared without initializer is assigned.
    value: Option<Val>,
    mutability: Mutability,
    /// Annotated kind, checked on every assignment.
    ty: Option<Kind>,
}

impl Binding {
    pub fn var(value: Option<Val>, ty: Option<Kind>) -> Self {
        Binding {
            value,
            mutability: Mutability::Mutable,
            ty,
        }
    }

    pub fn constant(value: Val, ty: Option<Kind>) -> Self {
        Binding {
            value: Some(value),
            mutability: Mutability::Constant,
            ty,
        }
    }

    pub fn function(value: Val) -> Self {
        Binding {
            value: Some(value),
            mutability: Mutability::Function,
            ty: None,
        }
    }
}

/// One level of name bindings.
///
/// A scope only borrows its parent, so every parent outlives its children:
/// the global scope is owned by the interpreter, call frames and block
/// scopes live on the host stack for the duration of the call or block.
#[derive(Debug, Default)]
pub struct Scope<'p> {
    vars: RefCell<FxHashMap<Rc<str>, Binding>>,
    parent: Option<&'p Scope<'p>>,
}

impl<'p> Scope<'p> {
    pub fn new_child(parent: &'p Scope<'p>) -> Scope<'p> {
        Scope {
            vars: Default::default(),
            parent: Some(parent),
        }
    }

    /// The outermost scope of the chain, i.e. the globals.
    pub fn root(&self) -> &Scope<'p> {
        let mut cur = self;
        while let Some(parent) = cur.parent {
            cur = parent;
        }
        cur
    }

    pub fn try_get_here(&self, id: &str) -> Option<Val> {
        self.vars.borrow().get(id).and_then(|b| b.value.clone())
    }

    pub fn get(&self, id: &str) -> Result<Val, EvalErr> {
        match self.vars.borrow().get(id) {
            Some(Binding { value: Some(val), .. }) => Ok(val.clone()),
            Some(Binding { value: None, .. }) => Err(EvalErr::Unset(id.into())),
            None => match self.parent {
                Some(parent) => parent.get(id),
                None => Err(EvalErr::UndefinedName(id.into())),
            },
        }
    }

    /// Binds `id` in this scope, shadowing any outer binding. Redeclaring
    /// a constant in the same scope is refused.
    pub fn declare(&self, id: Rc<str>, binding: Binding) -> Result<(), EvalErr> {
        let mut vars = self.vars.borrow_mut();
        if vars
            .get(&id)
            .is_some_and(|b| b.mutability == Mutability::Constant)
        {
            return Err(EvalErr::ConstRedeclaration(id));
        }
        vars.insert(id, binding);
        Ok(())
    }

    /// Rebinds `id` in the scope where it was declared.
    pub fn assign(&self, id: &str, val: Val) -> Result<(), EvalErr> {
        if !self.vars.borrow().contains_key(id) {
            return match self.parent {
                Some(parent) => parent.assign(id, val),
                None => Err(EvalErr::UndeclaredAssignment(id.into())),
            };
        }

        let mut vars = self.vars.borrow_mut();
        let Some(binding) = vars.get_mut(id) else {
            return Err(EvalErr::UndeclaredAssignment(id.into()));
        };

        match binding.mutability {
            Mutability::Constant => return Err(EvalErr::ConstAssignment(id.into())),
            Mutability::Function => return Err(EvalErr::FunctionAssignment(id.into())),
            Mutability::Mutable => {}
        }
        if let Some(expected) = binding.ty {
            if val.kind() != expected {
                return Err(EvalErr::AnnotationMismatch {
                    name: id.into(),
                    expected,
                    found: val.kind(),
                });
            }
        }
        binding.value = Some(val);
        Ok(())
    }
}
