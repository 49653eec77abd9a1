use crate::ast::{Expr, Stmt, Typename};
use crate::stack::ensure_sufficient_stack;

use super::context::Context;
use super::expr::EvalErr;
use super::scope::{Binding, Scope};
use super::value::{Kind, Val};

/// How a statement finished. Loops consume `Break`/`Continue`, calls
/// consume `Return`; anything else keeps propagating outward.
#[derive(Debug, PartialEq, Clone)]
pub enum Signal {
    Normal,
    Break,
    Continue,
    Return(Val),
}

impl Stmt {
    pub fn exec(&self, scope: &Scope<'_>, ctx: &mut Context<'_>) -> Result<Signal, EvalErr> {
        ensure_sufficient_stack(|| self.exec_inner(scope, ctx))
    }

    fn exec_inner(&self, scope: &Scope<'_>, ctx: &mut Context<'_>) -> Result<Signal, EvalErr> {
        match self {
            Self::Print(expr) => match expr.eval(scope, ctx)? {
                Val::Char(c) => write!(ctx.out(), "{c}")?,
                val => writeln!(ctx.out(), "{val}")?,
            },
            Self::Expr(expr) => {
                expr.eval(scope, ctx)?;
            }
            Self::Var(id, ty, value) => {
                let ty = annotation(ty)?;
                let value = match value {
                    Some(value) => Some(checked(id, ty, value.eval(scope, ctx)?)?),
                    None => None,
                };
                scope.declare(id.clone(), Binding::var(value, ty))?;
            }
            Self::Const(id, ty, value) => {
                let ty = annotation(ty)?;
                let value = checked(id, ty, value.eval(scope, ctx)?)?;
                scope.declare(id.clone(), Binding::constant(value, ty))?;
            }
            Self::Assign(id, value) => {
                let value = value.eval(scope, ctx)?;
                scope.assign(id, value)?;
            }
            Self::If(test, consequence, alternative) => {
                if condition("if", test, scope, ctx)? {
                    return exec_child_block(consequence, scope, ctx);
                } else if let Some(alternative) = alternative {
                    return exec_child_block(alternative, scope, ctx);
                }
            }
            Self::While(test, body) => {
                while condition("while", test, scope, ctx)? {
                    match exec_child_block(body, scope, ctx)? {
                        Signal::Break => break,
                        Signal::Normal | Signal::Continue => {}
                        ret @ Signal::Return(_) => return Ok(ret),
                    }
                }
            }
            Self::Func(decl) => {
                scope.declare(decl.name.clone(), Binding::function(Val::Func(decl.clone())))?;
            }
            Self::Break => return Ok(Signal::Break),
            Self::Continue => return Ok(Signal::Continue),
            Self::Return(expr) => return Ok(Signal::Return(expr.eval(scope, ctx)?)),
        }
        Ok(Signal::Normal)
    }
}

/// Runs statements in order, stopping at the first non-`Normal` signal.
pub fn exec_block(
    stmts: &[Stmt],
    scope: &Scope<'_>,
    ctx: &mut Context<'_>,
) -> Result<Signal, EvalErr> {
    for stmt in stmts {
        match stmt.exec(scope, ctx)? {
            Signal::Normal => continue,
            other => return Ok(other),
        }
    }
    Ok(Signal::Normal)
}

fn exec_child_block(
    stmts: &[Stmt],
    scope: &Scope<'_>,
    ctx: &mut Context<'_>,
) -> Result<Signal, EvalErr> {
    let child = Scope::new_child(scope);
    exec_block(stmts, &child, ctx)
}

fn condition(
    construct: &'static str,
    test: &Expr,
    scope: &Scope<'_>,
    ctx: &mut Context<'_>,
) -> Result<bool, EvalErr> {
    match test.eval(scope, ctx)? {
        Val::Bool(b) => Ok(b),
        other => Err(EvalErr::ConditionType(construct, other.kind())),
    }
}

fn annotation(ty: &Option<Typename>) -> Result<Option<Kind>, EvalErr> {
    ty.as_ref().map(Kind::resolve).transpose()
}

fn checked(id: &std::rc::Rc<str>, ty: Option<Kind>, val: Val) -> Result<Val, EvalErr> {
    match ty {
        Some(expected) if val.kind() != expected => Err(EvalErr::AnnotationMismatch {
            name: id.clone(),
            expected,
            found: val.kind(),
        }),
        _ => Ok(val),
    }
}
