use thiserror::Error;

use crate::ast::{BinOp, Expr, Stmt, UnaryOp};
use crate::error::ErrorKind;

use super::chunk::{Chunk, OpCode, Value};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileErr {
    #[error("the stack machine cannot run {0}")]
    Unsupported(&'static str),
    #[error("operator `{0}` is not available on the stack machine")]
    UnsupportedOp(&'static str),
    #[error("`{0}` mixes int and float operands")]
    MixedOperands(BinOp),
    #[error("malformed literal `{0}`")]
    BadLiteral(String),
    #[error("more than 256 constants in one chunk")]
    TooManyConstants,
}

impl CompileErr {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unsupported(_) | Self::UnsupportedOp(_) => ErrorKind::ParseError,
            Self::MixedOperands(_) => ErrorKind::TypeError,
            Self::BadLiteral(_) => ErrorKind::ArithmeticError,
            Self::TooManyConstants => ErrorKind::ResourceError,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumKind {
    Int,
    Float,
}

/// Compiles straight-line `print` statements over numeric literals.
/// Anything else is rejected; the stack machine has no names or jumps.
pub fn compile(program: &[Stmt]) -> Result<Chunk, CompileErr> {
    let mut chunk = Chunk::default();
    for stmt in program {
        match stmt {
            Stmt::Print(expr) => {
                expr_code(&mut chunk, expr)?;
                chunk.write_op(OpCode::Print);
            }
            Stmt::Break | Stmt::Continue => return Err(CompileErr::Unsupported("loop control")),
            Stmt::Return(_) | Stmt::Func(_) => return Err(CompileErr::Unsupported("functions")),
            Stmt::Assign(..) | Stmt::Var(..) | Stmt::Const(..) => {
                return Err(CompileErr::Unsupported("variables"))
            }
            Stmt::If(..) | Stmt::While(..) => return Err(CompileErr::Unsupported("branches")),
            Stmt::Expr(_) => return Err(CompileErr::Unsupported("expression statements")),
        }
    }
    chunk.write_op(OpCode::Return);
    tracing::debug!(bytes = chunk.len(), "compiled chunk");
    Ok(chunk)
}

fn constant(chunk: &mut Chunk, val: Value) -> Result<(), CompileErr> {
    let idx = u8::try_from(chunk.add_const(val)).map_err(|_| CompileErr::TooManyConstants)?;
    chunk.write_op(OpCode::Const);
    chunk.write_byte(idx);
    Ok(())
}

fn expr_code(chunk: &mut Chunk, expr: &Expr) -> Result<NumKind, CompileErr> {
    match expr {
        Expr::Integer(text) => {
            let val = text.parse().map_err(|_| CompileErr::BadLiteral(text.to_string()))?;
            constant(chunk, Value::Int(val))?;
            Ok(NumKind::Int)
        }
        Expr::Float(text) => {
            let val = text.parse().map_err(|_| CompileErr::BadLiteral(text.to_string()))?;
            constant(chunk, Value::Float(val))?;
            Ok(NumKind::Float)
        }
        Expr::Grouping(inner) | Expr::Unary(UnaryOp::Pos, inner) => expr_code(chunk, inner),
        Expr::Unary(UnaryOp::Neg, inner) => {
            let kind = expr_code(chunk, inner)?;
            chunk.write_op(OpCode::Neg);
            Ok(kind)
        }
        Expr::Unary(op, _) => Err(CompileErr::UnsupportedOp(op.symbol())),
        Expr::Binary(op, l, r) => {
            let arith = match op {
                BinOp::Add => OpCode::Add,
                BinOp::Sub => OpCode::Sub,
                BinOp::Mul => OpCode::Mul,
                BinOp::Div => OpCode::IDiv,
                other => return Err(CompileErr::UnsupportedOp(other.symbol())),
            };
            let lk = expr_code(chunk, l)?;
            let rk = expr_code(chunk, r)?;
            if lk != rk {
                return Err(CompileErr::MixedOperands(*op));
            }
            chunk.write_op(match (arith, lk) {
                (OpCode::IDiv, NumKind::Float) => OpCode::FDiv,
                (op, _) => op,
            });
            Ok(lk)
        }
        Expr::Bool(_) | Expr::Char(_) => Err(CompileErr::Unsupported("non-numeric values")),
        Expr::Name(_) => Err(CompileErr::Unsupported("variables")),
        Expr::Call(..) => Err(CompileErr::Unsupported("functions")),
    }
}
