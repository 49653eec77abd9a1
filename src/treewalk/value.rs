use std::fmt;
use std::rc::Rc;

use crate::ast::{FuncDecl, Typename};
use crate::format::write_float;

use super::expr::EvalErr;

/// The kind of a runtime value. Type annotations resolve to one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Int,
    Float,
    Bool,
    Char,
    Void,
    Func,
}

impl Kind {
    /// Resolves an annotation. Functions have no nameable type.
    pub fn resolve(ty: &Typename) -> Result<Kind, EvalErr> {
        match &*ty.0 {
            "int" => Ok(Kind::Int),
            "float" => Ok(Kind::Float),
            "bool" => Ok(Kind::Bool),
            "char" => Ok(Kind::Char),
            "void" => Ok(Kind::Void),
            _ => Err(EvalErr::UnknownType(ty.0.clone())),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Char => "char",
            Self::Void => "void",
            Self::Func => "func",
        })
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum Val {
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
    Void,
    /// Function bodies see the global scope only; nothing else is captured.
    Func(Rc<FuncDecl>),
}

impl Val {
    pub fn kind(&self) -> Kind {
        match self {
            Self::Int(_) => Kind::Int,
            Self::Float(_) => Kind::Float,
            Self::Bool(_) => Kind::Bool,
            Self::Char(_) => Kind::Char,
            Self::Void => Kind::Void,
            Self::Func(_) => Kind::Func,
        }
    }
}

impl fmt::Display for Val {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Int(x) => write!(f, "{}", x),
            Self::Float(x) => write_float(f, *x),
            Self::Bool(x) => write!(f, "{}", x),
            Self::Char(x) => write!(f, "{}", x),
            Self::Void => write!(f, "void"),
            Self::Func(decl) => write!(f, "<func {}>", decl.name),
        }
    }
}
