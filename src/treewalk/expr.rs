use std::rc::Rc;

use thiserror::Error;

use crate::arith::floor_div;
use crate::ast::{BinOp, Expr, FuncDecl, UnaryOp};
use crate::error::ErrorKind;
use crate::stack::ensure_sufficient_stack;

use super::context::Context;
use super::scope::{Binding, Scope};
use super::statement::{exec_block, Signal};
use super::value::{Kind, Val};

#[derive(Debug, Error)]
pub enum EvalErr {
    #[error("undefined name `{0}`")]
    UndefinedName(Rc<str>),
    #[error("assignment to undeclared name `{0}`")]
    UndeclaredAssignment(Rc<str>),
    #[error("cannot assign to constant `{0}`")]
    ConstAssignment(Rc<str>),
    #[error("cannot assign to function `{0}`")]
    FunctionAssignment(Rc<str>),
    #[error("constant `{0}` is already declared in this scope")]
    ConstRedeclaration(Rc<str>),
    #[error("variable `{0}` is read before it is assigned")]
    Unset(Rc<str>),
    #[error("unary `{0}` cannot be applied to {1}")]
    UnaryType(UnaryOp, Kind),
    #[error("binary `{0}` cannot be applied to {1} and {2}")]
    BinaryType(BinOp, Kind, Kind),
    #[error("`{0}` requires bool operands, found {1}")]
    LogicalType(BinOp, Kind),
    #[error("`{0}` test must be bool, found {1}")]
    ConditionType(&'static str, Kind),
    #[error("`{name}` is declared {expected} but was given {found}")]
    AnnotationMismatch {
        name: Rc<str>,
        expected: Kind,
        found: Kind,
    },
    #[error("unknown type `{0}`")]
    UnknownType(Rc<str>),
    #[error("`{0}` is {1}, not a function")]
    NotCallable(Rc<str>, Kind),
    #[error("`{name}` expects {expected} arguments, got {found}")]
    WrongArgumentCount {
        name: Rc<str>,
        expected: usize,
        found: usize,
    },
    #[error("function `{name}` returns {expected} but returned {found}")]
    ReturnType {
        name: Rc<str>,
        expected: Kind,
        found: Kind,
    },
    #[error("function `{0}` ends without returning a value")]
    MissingReturn(Rc<str>),
    #[error("`break` outside of a loop")]
    BreakOutsideLoop,
    #[error("`continue` outside of a loop")]
    ContinueOutsideLoop,
    #[error("`return` outside of a function")]
    ReturnOutsideFunction,
    #[error("division by zero")]
    DivisionByZero,
    #[error("integer overflow in `{0}`")]
    Overflow(&'static str),
    #[error("malformed {0} literal `{1}`")]
    BadLiteral(Kind, Rc<str>),
    #[error("call depth exceeded {0} frames")]
    RecursionLimit(usize),
    #[error("cannot write output: {0}")]
    Io(#[from] std::io::Error),
}

impl EvalErr {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UndefinedName(_)
            | Self::UndeclaredAssignment(_)
            | Self::ConstAssignment(_)
            | Self::FunctionAssignment(_)
            | Self::ConstRedeclaration(_) => ErrorKind::NameError,
            Self::Unset(_)
            | Self::UnaryType(..)
            | Self::BinaryType(..)
            | Self::LogicalType(..)
            | Self::ConditionType(..)
            | Self::AnnotationMismatch { .. }
            | Self::UnknownType(_)
            | Self::NotCallable(..)
            | Self::WrongArgumentCount { .. }
            | Self::ReturnType { .. } => ErrorKind::TypeError,
            Self::MissingReturn(_)
            | Self::BreakOutsideLoop
            | Self::ContinueOutsideLoop
            | Self::ReturnOutsideFunction => ErrorKind::ControlFlowError,
            Self::DivisionByZero | Self::Overflow(_) | Self::BadLiteral(..) => {
                ErrorKind::ArithmeticError
            }
            Self::RecursionLimit(_) => ErrorKind::ResourceError,
            Self::Io(_) => ErrorKind::IoError,
        }
    }
}

impl Expr {
    pub fn eval(&self, scope: &Scope<'_>, ctx: &mut Context<'_>) -> Result<Val, EvalErr> {
        ensure_sufficient_stack(|| self.eval_inner(scope, ctx))
    }

    fn eval_inner(&self, scope: &Scope<'_>, ctx: &mut Context<'_>) -> Result<Val, EvalErr> {
        match self {
            Self::Integer(text) => text
                .parse()
                .map(Val::Int)
                .map_err(|_| EvalErr::BadLiteral(Kind::Int, text.clone())),
            Self::Float(text) => text
                .parse()
                .map(Val::Float)
                .map_err(|_| EvalErr::BadLiteral(Kind::Float, text.clone())),
            Self::Bool(b) => Ok(Val::Bool(*b)),
            Self::Char(c) => Ok(Val::Char(*c)),
            Self::Name(id) => scope.get(id),
            Self::Grouping(inner) => inner.eval(scope, ctx),
            Self::Unary(op, x) => unary(*op, x.eval(scope, ctx)?),
            Self::Binary(op @ (BinOp::And | BinOp::Or), x, y) => {
                let l = logical_operand(*op, x.eval(scope, ctx)?)?;
                // `false && _` and `true || _` are decided without the right side.
                if l == (*op == BinOp::Or) {
                    return Ok(Val::Bool(l));
                }
                let r = logical_operand(*op, y.eval(scope, ctx)?)?;
                Ok(Val::Bool(r))
            }
            Self::Binary(op, x, y) => {
                let l = x.eval(scope, ctx)?;
                let r = y.eval(scope, ctx)?;
                binary(*op, l, r)
            }
            Self::Call(id, args) => {
                let func = match scope.get(id)? {
                    Val::Func(func) => func,
                    other => return Err(EvalErr::NotCallable(id.clone(), other.kind())),
                };

                let mut evaluated = Vec::with_capacity(args.len());
                for arg in args {
                    evaluated.push(arg.eval(scope, ctx)?);
                }

                call(&func, evaluated, scope.root(), ctx)
            }
        }
    }
}

/// Runs `func` in a fresh frame whose parent is `globals`. The caller's
/// local scopes are deliberately not visible to the callee.
pub fn call(
    func: &FuncDecl,
    args: Vec<Val>,
    globals: &Scope<'_>,
    ctx: &mut Context<'_>,
) -> Result<Val, EvalErr> {
    if args.len() != func.params.len() {
        return Err(EvalErr::WrongArgumentCount {
            name: func.name.clone(),
            expected: func.params.len(),
            found: args.len(),
        });
    }
    let ret = Kind::resolve(&func.ret)?;

    let frame = Scope::new_child(globals);
    for (param, arg) in func.params.iter().zip(args) {
        let ty = Kind::resolve(&param.ty)?;
        if arg.kind() != ty {
            return Err(EvalErr::AnnotationMismatch {
                name: param.name.clone(),
                expected: ty,
                found: arg.kind(),
            });
        }
        frame.declare(param.name.clone(), Binding::var(Some(arg), Some(ty)))?;
    }

    ctx.enter_call()?;
    tracing::trace!(func = %func.name, depth = ctx.depth(), "call");
    let signal = exec_block(&func.body, &frame, ctx);
    ctx.leave_call();
    tracing::trace!(func = %func.name, "return");

    match signal? {
        Signal::Return(val) if ret != Kind::Void && val.kind() == ret => Ok(val),
        Signal::Return(val) => Err(EvalErr::ReturnType {
            name: func.name.clone(),
            expected: ret,
            found: val.kind(),
        }),
        Signal::Normal if ret == Kind::Void => Ok(Val::Void),
        Signal::Normal => Err(EvalErr::MissingReturn(func.name.clone())),
        Signal::Break => Err(EvalErr::BreakOutsideLoop),
        Signal::Continue => Err(EvalErr::ContinueOutsideLoop),
    }
}

fn unary(op: UnaryOp, val: Val) -> Result<Val, EvalErr> {
    match (op, val) {
        (UnaryOp::Neg, Val::Int(a)) => a.checked_neg().map(Val::Int).ok_or(EvalErr::Overflow("-")),
        (UnaryOp::Neg, Val::Float(a)) => Ok(Val::Float(-a)),
        (UnaryOp::Pos, val @ (Val::Int(_) | Val::Float(_))) => Ok(val),
        (UnaryOp::Not, Val::Bool(a)) => Ok(Val::Bool(!a)),
        (op, val) => Err(EvalErr::UnaryType(op, val.kind())),
    }
}

fn logical_operand(op: BinOp, val: Val) -> Result<bool, EvalErr> {
    match val {
        Val::Bool(b) => Ok(b),
        other => Err(EvalErr::LogicalType(op, other.kind())),
    }
}

fn compare<T: PartialOrd>(op: BinOp, a: T, b: T) -> Option<bool> {
    let res = match op {
        BinOp::Eq => a == b,
        BinOp::Ne => a != b,
        BinOp::Lt => a < b,
        BinOp::Gt => a > b,
        BinOp::Le => a <= b,
        BinOp::Ge => a >= b,
        _ => return None,
    };
    Some(res)
}

fn int_arith(op: BinOp, a: i64, b: i64) -> Option<Result<i64, EvalErr>> {
    let res = match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Sub => a.checked_sub(b),
        BinOp::Mul => a.checked_mul(b),
        BinOp::Div if b == 0 => return Some(Err(EvalErr::DivisionByZero)),
        BinOp::Div => floor_div(a, b),
        _ => return None,
    };
    Some(res.ok_or(EvalErr::Overflow(op.symbol())))
}

fn float_arith(op: BinOp, a: f64, b: f64) -> Option<Result<f64, EvalErr>> {
    let res = match op {
        BinOp::Add => a + b,
        BinOp::Sub => a - b,
        BinOp::Mul => a * b,
        BinOp::Div if b == 0.0 => return Some(Err(EvalErr::DivisionByZero)),
        BinOp::Div => a / b,
        _ => return None,
    };
    Some(Ok(res))
}

/// Both operands must have the same kind; there is no numeric promotion.
fn binary(op: BinOp, l: Val, r: Val) -> Result<Val, EvalErr> {
    let res = match (&l, &r) {
        (Val::Int(a), Val::Int(b)) => match int_arith(op, *a, *b) {
            Some(res) => Some(Val::Int(res?)),
            None => compare(op, a, b).map(Val::Bool),
        },
        (Val::Float(a), Val::Float(b)) => match float_arith(op, *a, *b) {
            Some(res) => Some(Val::Float(res?)),
            None => compare(op, a, b).map(Val::Bool),
        },
        (Val::Char(a), Val::Char(b)) => compare(op, a, b).map(Val::Bool),
        _ => None,
    };
    res.ok_or_else(|| EvalErr::BinaryType(op, l.kind(), r.kind()))
}
