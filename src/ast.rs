//! Syntax tree produced by the parser and consumed by the formatter,
//! the resolver and both backends. Nodes are immutable once built.

use std::fmt;
use std::rc::Rc;

pub type ExprRef = Box<Expr>;

#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    /// Decimal source text, converted when evaluated.
    Integer(Rc<str>),
    Float(Rc<str>),
    Bool(bool),
    Char(char),
    Name(Rc<str>),
    Unary(UnaryOp, ExprRef),
    Binary(BinOp, ExprRef, ExprRef),
    Grouping(ExprRef),
    Call(Rc<str>, Vec<Expr>),
}

#[derive(Debug, PartialEq, Clone)]
pub enum Stmt {
    Print(Expr),
    Break,
    Continue,
    Return(Expr),
    Assign(Rc<str>, Expr),
    Var(Rc<str>, Option<Typename>, Option<Expr>),
    Const(Rc<str>, Option<Typename>, Expr),
    If(Expr, Vec<Stmt>, Option<Vec<Stmt>>),
    While(Expr, Vec<Stmt>),
    Func(Rc<FuncDecl>),
    /// An expression evaluated for its side effects, e.g. a bare call.
    Expr(Expr),
}

/// A type annotation. Only a name; it is resolved when the program runs.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Typename(pub Rc<str>);

#[derive(Debug, PartialEq, Clone)]
pub struct Param {
    pub name: Rc<str>,
    pub ty: Typename,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FuncDecl {
    pub name: Rc<str>,
    pub params: Vec<Param>,
    pub ret: Typename,
    pub body: Vec<Stmt>,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UnaryOp {
    Neg,
    Pos,
    Not,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Pos => "+",
            Self::Not => "!",
        }
    }
}

impl BinOp {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl fmt::Display for Typename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Typename {
    fn from(name: &str) -> Self {
        Typename(name.into())
    }
}
